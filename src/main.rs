#![warn(missing_docs)]
#![warn(clippy::missing_docs_in_private_items)]

//! # autograde
//!
//! Command line front end for the autograding client: run a student program,
//! send its output to the grading service, print the feedback, or check a
//! single graded item the way a CI job would.

use std::{fs, path::PathBuf};

use anyhow::{Context, Result};
use autograde::{
    Connectivity, IdentityResolver, ProgramRunner, Settings, TcpProbe,
    logging,
    credential::{CredentialProvider, PlatformCredentials},
    grading::{
        AutogradingConfig, DispatchOutcome, Dispatcher, GradingResponse, Harness, TestOutputs,
        points_table, render_feedback,
    },
};
use bpaf::*;
use colored::Colorize;

/// What to run and what grades it.
#[derive(Debug, Clone)]
struct Submission {
    /// Lines fed to the program's stdin.
    inputs:     Vec<String>,
    /// Pytest file sent along as the grading context.
    tests_file: PathBuf,
    /// The student's program.
    program:    PathBuf,
}

/// Top-level CLI commands.
#[derive(Debug, Clone)]
enum Cmd {
    /// Report whether the connectivity probe succeeds
    Probe,
    /// Print the resolved username and slug
    Whoami,
    /// Run a program and print its output
    Run {
        /// Lines fed to stdin.
        inputs:  Vec<String>,
        /// Program to run.
        program: PathBuf,
    },
    /// Run a program, dispatch its output and print the feedback
    Grade {
        /// Optional test name narrowing the autograding document.
        test:       Option<String>,
        /// What to run.
        submission: Submission,
    },
    /// Assert a single graded item
    Check {
        /// Test the output is recorded under.
        test:           String,
        /// Autograding item whose points are compared.
        point_key:      String,
        /// Text expected in the output when offline.
        offline_marker: String,
        /// What to run.
        submission:     Submission,
    },
    /// Render a saved grading response
    Feedback(PathBuf),
}

/// Parse the command line arguments and return a `Cmd` enum
fn options() -> OptionParser<Cmd> {
    /// parses stdin lines
    fn inputs() -> impl Parser<Vec<String>> {
        short('i')
            .long("input")
            .help("Line fed to the program's stdin; repeat for more lines")
            .argument::<String>("LINE")
            .many()
    }

    /// parses the program path
    fn program() -> impl Parser<PathBuf> {
        positional::<PathBuf>("PROGRAM").help("Path to the student's program")
    }

    /// parses everything needed to run and grade a program
    fn submission() -> impl Parser<Submission> {
        let inputs = inputs();
        let tests_file = long("tests")
            .help("Path to the pytest file grading the program")
            .argument::<PathBuf>("PATH");
        let program = program();
        construct!(Submission {
            inputs,
            tests_file,
            program
        })
    }

    let probe = pure(Cmd::Probe)
        .to_options()
        .command("probe")
        .help("Check whether the network is reachable");

    let whoami = pure(Cmd::Whoami)
        .to_options()
        .command("whoami")
        .help("Print the GitHub username and assignment slug");

    let run = {
        let inputs = inputs();
        let program = program();
        construct!(Cmd::Run { inputs, program })
            .to_options()
            .command("run")
            .help("Run a program with the given input lines")
    };

    let grade = {
        let test = short('t')
            .long("test")
            .help("Only grade autograding items run by `<NAME>.py`")
            .argument::<String>("NAME")
            .optional();
        let submission = submission();
        construct!(Cmd::Grade { test, submission })
            .to_options()
            .command("grade")
            .help("Run a program and send its output to the grading service")
    };

    let check = {
        let test = short('t')
            .long("test")
            .help("Test the output is recorded under")
            .argument::<String>("NAME");
        let point_key = long("points-key")
            .help("Autograding item whose points must match")
            .argument::<String>("KEY");
        let offline_marker = long("offline")
            .help("Text the output must contain when offline")
            .argument::<String>("MARKER");
        let submission = submission();
        construct!(Cmd::Check {
            test,
            point_key,
            offline_marker,
            submission
        })
        .to_options()
        .command("check")
        .help("Grade a single item and fail unless it earns its points")
    };

    let feedback = positional::<PathBuf>("RESPONSE")
        .help("JSON file holding a grading service response")
        .map(Cmd::Feedback)
        .to_options()
        .command("feedback")
        .help("Render a saved grading response");

    construct!([probe, whoami, run, grade, check, feedback])
        .to_options()
        .descr("Autograding client for student programs")
}

/// Runs the submission and dispatches its output, recording it under `test`
/// (or the program's file stem).
fn grade_submission(
    settings: &Settings,
    test: Option<&str>,
    submission: &Submission,
) -> Result<DispatchOutcome> {
    let output = ProgramRunner::from_settings(settings).run(&submission.inputs, &submission.program);
    let key = match test {
        Some(test) => test.to_string(),
        None => submission
            .program
            .file_stem()
            .map(|stem| stem.to_string_lossy().into_owned())
            .unwrap_or_default(),
    };
    let outputs: TestOutputs = [(key, output)].into_iter().collect();

    let student_code = fs::read_to_string(&submission.program)
        .with_context(|| format!("Could not read {}", submission.program.display()))?;
    let pytest_code = fs::read_to_string(&submission.tests_file)
        .with_context(|| format!("Could not read {}", submission.tests_file.display()))?;
    let config = AutogradingConfig::load(settings.autograding_config_path())?;

    Dispatcher::new(settings.clone())?.dispatch(test, outputs, &student_code, &pytest_code, &config)
}

fn main() -> Result<()> {
    logging::bootstrap();

    let cmd = options().run();
    let settings = Settings::from_env();

    match cmd {
        Cmd::Probe => {
            if TcpProbe::from_settings(&settings).is_online() {
                println!("online");
            } else {
                println!("offline");
            }
        }
        Cmd::Whoami => {
            let credential =
                PlatformCredentials::for_current_platform(&settings).credential();
            match IdentityResolver::from_settings(&settings)?.resolve(credential.as_ref()) {
                Some(identity) => println!("{} ({})", identity.username(), identity.slug()),
                None => println!("unknown"),
            }
        }
        Cmd::Run { inputs, program } => {
            print!("{}", ProgramRunner::from_settings(&settings).run(&inputs, &program));
        }
        Cmd::Grade { test, submission } => {
            let outcome = grade_submission(&settings, test.as_deref(), &submission)?;
            if !outcome.feedback.is_empty() {
                println!("{}", outcome.feedback);
            }
            println!("{}", points_table(&outcome.response));
        }
        Cmd::Check {
            test,
            point_key,
            offline_marker,
            submission,
        } => {
            let result = Harness::new(&settings).assert_test(
                &test,
                &point_key,
                &offline_marker,
                |name| grade_submission(&settings, Some(name), &submission),
            );
            match result {
                Ok(()) => println!("{} {point_key}", "PASS".green().bold()),
                Err(failure) => {
                    eprintln!("{} {point_key}\n{failure}", "FAIL".red().bold());
                    std::process::exit(1);
                }
            }
        }
        Cmd::Feedback(path) => {
            let text = fs::read_to_string(&path)
                .with_context(|| format!("Could not read {}", path.display()))?;
            let response: GradingResponse = serde_json::from_str(&text)
                .with_context(|| format!("{} is not a grading response", path.display()))?;
            println!("{}", render_feedback(&response));
            println!("{}", points_table(&response));
        }
    };

    Ok(())
}
