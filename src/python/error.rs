use anyhow::Error as AnyhowError;
use pyo3::{
    PyErr, create_exception,
    exceptions::{PyAssertionError, PyException},
};

use crate::grading::TestFailure;

create_exception!(autograde, AutogradeError, PyException);
create_exception!(autograde, DispatchError, AutogradeError);

pub(crate) fn anyhow_to_py(err: AnyhowError) -> PyErr {
    PyErr::new::<AutogradeError, _>(format!("{err:#}"))
}

pub(crate) fn dispatch_error_to_py(err: AnyhowError) -> PyErr {
    PyErr::new::<DispatchError, _>(format!("{err:#}"))
}

/// Failed checks surface as plain `AssertionError`s so pytest reports them
/// as test failures rather than errors.
pub(crate) fn failure_to_py(failure: TestFailure) -> PyErr {
    match failure {
        TestFailure::Setup(err) => anyhow_to_py(err),
        other => PyAssertionError::new_err(other.to_string()),
    }
}
