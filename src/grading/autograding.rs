//! Model of the GitHub Classroom autograding document.

use std::path::Path;

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use super::points::Points;

/// One graded item of the autograding document.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct TestDescriptor {
    /// Name the item is graded under.
    pub name:   String,
    /// Command that runs the item, e.g. `pytest tests/test_hello.py`.
    #[serde(default)]
    pub run:    String,
    /// Points the item is worth.
    #[serde(default)]
    pub points: Points,
    /// Remaining keys (`setup`, `input`, `timeout`, ...), passed through as-is.
    #[serde(flatten)]
    pub extra:  Map<String, Value>,
}

/// The whole autograding document.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct AutogradingConfig {
    /// Graded items, in document order.
    pub tests: Vec<TestDescriptor>,
    /// Remaining top-level keys, passed through as-is.
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl AutogradingConfig {
    /// Reads and parses the document at `path`.
    pub fn load(path: &Path) -> Result<Self> {
        let text = std::fs::read_to_string(path)
            .with_context(|| format!("Could not read {}", path.display()))?;
        Self::from_json(&text).with_context(|| format!("Could not parse {}", path.display()))
    }

    /// Parses a document from JSON text.
    pub fn from_json(text: &str) -> Result<Self> {
        serde_json::from_str(text).context("Invalid autograding configuration")
    }

    /// Serializes the document back to a JSON string.
    pub fn to_json_string(&self) -> Result<String> {
        serde_json::to_string(self).context("Could not serialize autograding configuration")
    }

    /// Returns the item named `name`, if any.
    pub fn find(&self, name: &str) -> Option<&TestDescriptor> {
        self.tests.iter().find(|test| test.name == name)
    }

    /// Points configured for `name`, or zero when there is no such item.
    pub fn points_for(&self, name: &str) -> Points {
        self.find(name).map(|test| test.points).unwrap_or_default()
    }

    /// Narrows the document to the items whose run command mentions
    /// `/{test_name}.py`.
    pub fn filtered_for(&self, test_name: &str) -> Self {
        let needle = format!("/{test_name}.py");
        Self {
            tests: self
                .tests
                .iter()
                .filter(|test| test.run.contains(&needle))
                .cloned()
                .collect(),
            extra: self.extra.clone(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const DOC: &str = r#"{
        "tests": [
            {"name": "Hello", "setup": "", "run": "pytest tests/test_hello.py", "input": "", "points": 10, "timeout": 10},
            {"name": "Loops", "run": "pytest tests/test_loops.py", "points": 5},
            {"name": "Loops bonus", "run": "pytest tests/test_loops.py::bonus", "points": 2.5}
        ]
    }"#;

    #[test]
    fn points_lookup_defaults_to_zero() {
        let config = AutogradingConfig::from_json(DOC).unwrap();
        assert_eq!(config.points_for("Hello"), Points(10.0));
        assert_eq!(config.points_for("Loops bonus"), Points(2.5));
        assert_eq!(config.points_for("Missing"), Points(0.0));
    }

    #[test]
    fn filtering_matches_on_run_path() {
        let config = AutogradingConfig::from_json(DOC).unwrap();
        let filtered = config.filtered_for("test_loops");
        let names: Vec<_> = filtered.tests.iter().map(|t| t.name.as_str()).collect();
        assert_eq!(names, ["Loops", "Loops bonus"]);

        assert!(config.filtered_for("test_nothing").tests.is_empty());
    }

    #[test]
    fn unknown_keys_survive_serialization() {
        let config = AutogradingConfig::from_json(DOC).unwrap();
        let json: Value = serde_json::from_str(&config.to_json_string().unwrap()).unwrap();
        assert_eq!(json["tests"][0]["timeout"], 10);
        assert_eq!(json["tests"][0]["points"], 10);
        assert_eq!(json["tests"][0]["setup"], "");
    }

    #[test]
    fn missing_document_is_an_error() {
        let err = AutogradingConfig::load(Path::new("/nonexistent/autograding.json"))
            .expect_err("missing file");
        assert!(err.to_string().contains("Could not read"));
    }
}
