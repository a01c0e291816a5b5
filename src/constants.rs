#![warn(missing_docs)]
#![warn(clippy::missing_docs_in_private_items)]

use std::time::Duration;

/// Grading service endpoint used when `AUTOGRADING_BASE_URL` is not set.
pub const DEFAULT_GRADING_URL: &str = "https://autograding-api-next.vercel.app/api/autograde";

/// Environment variable that overrides the grading service endpoint.
pub const GRADING_URL_ENV: &str = "AUTOGRADING_BASE_URL";

/// Endpoint returning the profile of the user a token belongs to.
pub const GITHUB_USER_URL: &str = "https://api.github.com/user";

/// Environment variable that overrides the identity endpoint.
pub const IDENTITY_URL_ENV: &str = "AUTOGRADE_IDENTITY_URL";

/// Well-known address dialed to decide whether we are online (Google's public
/// DNS).
pub const PROBE_ADDR: &str = "8.8.8.8:53";

/// Environment variable that overrides [`PROBE_ADDR`].
pub const PROBE_ADDR_ENV: &str = "AUTOGRADE_PROBE_ADDR";

/// How long the connectivity probe waits for a connection.
pub const PROBE_TIMEOUT: Duration = Duration::from_secs(5);

/// Location of the GitHub Classroom autograding document, relative to the
/// repository root.
pub const AUTOGRADING_CONFIG_PATH: &str = ".github/classroom/autograding.json";

/// Interpreter student programs are run with.
pub const DEFAULT_INTERPRETER: &str = "python3";

/// Environment variable that overrides [`DEFAULT_INTERPRETER`].
pub const INTERPRETER_ENV: &str = "AUTOGRADE_PYTHON";

/// Environment variable holding an optional deadline (in seconds) for student
/// program runs.
pub const RUN_TIMEOUT_ENV: &str = "AUTOGRADE_RUN_TIMEOUT_SECS";

/// Environment variable the token is read from on Linux.
pub const TOKEN_ENV_VAR: &str = "GITHUB_TOKEN";

/// Host whose stored credential is looked up on macOS and Windows.
pub const CREDENTIAL_HOST: &str = "github.com";

/// Sent with every request; the identity endpoint rejects requests without
/// one.
pub const USER_AGENT: &str = concat!(env!("CARGO_PKG_NAME"), "/", env!("CARGO_PKG_VERSION"));

/// Printed when feedback cannot be rendered because we appear to be offline.
pub const OFFLINE_ADVISORY: &str = "No active internet connection or API response. Run the test \
                                    again with an active internet connection and a working API \
                                    to receive more user-friendly feedback.";
