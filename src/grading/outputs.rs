/// Captured program output per test, in insertion order.
///
/// The grading service receives the outputs as a bare list, so the order
/// tests were recorded in is significant and must be kept.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TestOutputs(Vec<(String, String)>);

impl TestOutputs {
    /// Creates an empty collection.
    pub fn new() -> Self {
        Self::default()
    }

    /// Records `output` for `name`, replacing an earlier output in place.
    pub fn insert(&mut self, name: impl Into<String>, output: impl Into<String>) {
        let name = name.into();
        let output = output.into();
        match self.0.iter_mut().find(|(existing, _)| *existing == name) {
            Some((_, slot)) => *slot = output,
            None => self.0.push((name, output)),
        }
    }

    /// Returns the output recorded for `name`.
    pub fn get(&self, name: &str) -> Option<&str> {
        self.0
            .iter()
            .find(|(existing, _)| existing == name)
            .map(|(_, output)| output.as_str())
    }

    /// Iterates over `(name, output)` pairs.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.0
            .iter()
            .map(|(name, output)| (name.as_str(), output.as_str()))
    }

    /// Iterates over the outputs alone.
    pub fn values(&self) -> impl Iterator<Item = &str> {
        self.0.iter().map(|(_, output)| output.as_str())
    }

    /// Number of recorded tests.
    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// True when nothing has been recorded.
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl<K, V> FromIterator<(K, V)> for TestOutputs
where
    K: Into<String>,
    V: Into<String>,
{
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        let mut outputs = Self::new();
        for (name, output) in iter {
            outputs.insert(name, output);
        }
        outputs
    }
}
