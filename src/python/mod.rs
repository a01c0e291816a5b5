#![allow(unsafe_op_in_unsafe_fn)]

//! `import autograde` from Python.
//!
//! Function names and argument orders mirror the helpers per-assignment
//! pytest files already call, so a test file switches over by changing its
//! import.

use std::path::PathBuf;

use indexmap::IndexMap;

use pyo3::{
    Bound,
    prelude::*,
    types::{PyAny, PyDict, PyModule},
};

mod error;

use error::{AutogradeError, DispatchError, anyhow_to_py, dispatch_error_to_py, failure_to_py};

use crate::{
    config::Settings,
    credential::{Credential, CredentialProvider, PlatformCredentials},
    grading::{self, AutogradingConfig, DispatchOutcome, GradingResponse, Harness, Points, TestOutputs},
    identity::IdentityResolver,
    logging,
    probe::{Connectivity, TcpProbe},
    runner::ProgramRunner,
};

/// Serializes a Python object with the stdlib `json` module.
fn to_json_string(obj: &Bound<'_, PyAny>) -> PyResult<String> {
    obj.py()
        .import("json")?
        .call_method1("dumps", (obj,))?
        .extract()
}

/// Parses JSON text into Python objects with the stdlib `json` module.
fn from_json_string<'py>(py: Python<'py>, text: &str) -> PyResult<Bound<'py, PyAny>> {
    py.import("json")?.call_method1("loads", (text,))
}

/// Copies a `{name: output}` dict, keeping its iteration order.
fn outputs_from_dict(dict: &Bound<'_, PyDict>) -> PyResult<TestOutputs> {
    let mut outputs = TestOutputs::new();
    for (name, output) in dict.iter() {
        outputs.insert(name.extract::<String>()?, output.extract::<String>()?);
    }
    Ok(outputs)
}

/// Builds a `{name: points}` dict, using `int` for whole numbers.
fn points_to_dict<'py>(
    py: Python<'py>,
    points: &IndexMap<String, Points>,
) -> PyResult<Bound<'py, PyDict>> {
    let dict = PyDict::new(py);
    for (name, value) in points {
        match value.as_whole() {
            Some(whole) => dict.set_item(name, whole)?,
            None => dict.set_item(name, value.value())?,
        }
    }
    Ok(dict)
}

/// Calls a Python `pre_test_setup(test_name=...)` and converts its
/// `(outputs, points, feedback, response)` tuple.
fn outcome_from_setup(
    py: Python<'_>,
    setup: &Bound<'_, PyAny>,
    test_name: &str,
) -> PyResult<DispatchOutcome> {
    let kwargs = PyDict::new(py);
    kwargs.set_item("test_name", test_name)?;
    let returned = setup.call((), Some(&kwargs))?;

    let (outputs, points, feedback, response): (
        Bound<'_, PyDict>,
        Bound<'_, PyDict>,
        String,
        Bound<'_, PyAny>,
    ) = returned.extract()?;

    let mut points_awarded = IndexMap::new();
    for (name, value) in points.iter() {
        points_awarded.insert(name.extract::<String>()?, Points(value.extract::<f64>()?));
    }

    // The raw response is informational only; a shape we cannot read is not
    // a reason to fail the check.
    let response = to_json_string(&response)
        .ok()
        .and_then(|text| serde_json::from_str::<GradingResponse>(&text).ok())
        .unwrap_or_default();

    Ok(DispatchOutcome {
        outputs: outputs_from_dict(&outputs)?,
        points_awarded,
        feedback,
        response,
    })
}

/// Runs `program_name` with `inputs` on stdin and returns its output text.
#[pyfunction]
fn run_program(py: Python<'_>, inputs: Vec<String>, program_name: PathBuf) -> String {
    let runner = ProgramRunner::from_settings(&Settings::from_env());
    py.detach(move || runner.run(&inputs, &program_name))
}

/// Returns whether the connectivity probe succeeds.
#[pyfunction]
fn check_internet_connection(py: Python<'_>) -> bool {
    py.detach(|| TcpProbe::from_settings(&Settings::from_env()).is_online())
}

/// Returns the locally stored GitHub token, if any.
#[pyfunction]
fn get_github_token(py: Python<'_>) -> Option<String> {
    py.detach(|| {
        PlatformCredentials::for_current_platform(&Settings::from_env())
            .credential()
            .map(|credential| credential.expose().to_string())
    })
}

/// Returns `(username, slug)`, or `(None, None)` when either is unknown.
#[pyfunction]
fn get_github_username_and_slug(
    py: Python<'_>,
    github_token: Option<String>,
) -> PyResult<(Option<String>, Option<String>)> {
    let resolver = IdentityResolver::from_settings(&Settings::from_env()).map_err(anyhow_to_py)?;
    let credential = github_token.map(Credential::new);
    let identity = py.detach(|| resolver.resolve(credential.as_ref()));

    Ok(match identity {
        Some(identity) => (
            Some(identity.username().to_string()),
            Some(identity.slug().to_string()),
        ),
        None => (None, None),
    })
}

/// Dispatches outputs to the grading service.
///
/// Returns `(test_outputs, points_awarded, feedback, response)`.
#[pyfunction]
fn execute_logic<'py>(
    py: Python<'py>,
    test_name: Option<String>,
    test_outputs: Bound<'py, PyDict>,
    student_code: String,
    pytest_code: String,
    autograding_config: Bound<'py, PyAny>,
) -> PyResult<(Bound<'py, PyDict>, Bound<'py, PyDict>, String, Bound<'py, PyAny>)> {
    let outputs = outputs_from_dict(&test_outputs)?;
    let config = AutogradingConfig::from_json(&to_json_string(&autograding_config)?)
        .map_err(anyhow_to_py)?;

    let outcome = py
        .detach(move || {
            grading::dispatch(test_name.as_deref(), outputs, &student_code, &pytest_code, &config)
        })
        .map_err(dispatch_error_to_py)?;

    let points = points_to_dict(py, &outcome.points_awarded)?;
    let response_text =
        serde_json::to_string(&outcome.response).map_err(|e| anyhow_to_py(e.into()))?;
    let response = from_json_string(py, &response_text)?;

    Ok((test_outputs, points, outcome.feedback, response))
}

/// Asserts a single graded item, raising `AssertionError` on failure.
#[pyfunction]
fn run_single_test(
    py: Python<'_>,
    test_name: String,
    test_point_key: String,
    offline_feedback: String,
    pre_test_setup: Bound<'_, PyAny>,
) -> PyResult<()> {
    let harness = Harness::new(&Settings::from_env());
    let mut setup_error: Option<PyErr> = None;

    let result = harness.assert_test(&test_name, &test_point_key, &offline_feedback, |name| {
        outcome_from_setup(py, &pre_test_setup, name).map_err(|err| {
            let message = err.to_string();
            setup_error = Some(err);
            anyhow::anyhow!(message)
        })
    });

    // Re-raise whatever the setup function raised, unchanged.
    if let Some(err) = setup_error {
        return Err(err);
    }
    result.map_err(failure_to_py)
}

/// PyO3 entry module. Importing it loads `.env` and routes diagnostics to
/// stderr.
#[pymodule]
pub fn autograde(py: Python<'_>, m: &Bound<'_, PyModule>) -> PyResult<()> {
    logging::bootstrap();

    m.add("AutogradeError", py.get_type::<AutogradeError>())?;
    m.add("DispatchError", py.get_type::<DispatchError>())?;

    m.add_function(wrap_pyfunction!(run_program, m)?)?;
    m.add_function(wrap_pyfunction!(check_internet_connection, m)?)?;
    m.add_function(wrap_pyfunction!(get_github_token, m)?)?;
    m.add_function(wrap_pyfunction!(get_github_username_and_slug, m)?)?;
    m.add_function(wrap_pyfunction!(execute_logic, m)?)?;
    m.add_function(wrap_pyfunction!(run_single_test, m)?)?;

    Ok(())
}
