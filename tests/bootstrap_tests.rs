mod common;

use std::fs;

use autograde::{Settings, logging};
use common::temp_dir;

// Changes the working directory, so this file holds a single test.
#[test]
fn dotenv_in_working_directory_configures_settings() {
    let dir = temp_dir("autograde-dotenv");
    fs::write(
        dir.join(".env"),
        "AUTOGRADING_BASE_URL=http://127.0.0.1:1/from-dotenv\n",
    )
    .expect("write .env");
    std::env::set_current_dir(&dir).expect("enter temp dir");

    logging::bootstrap();

    assert_eq!(
        Settings::from_env().grading_url(),
        "http://127.0.0.1:1/from-dotenv"
    );
    assert!(!logging::init(), "subscriber is installed only once");
    let _ = fs::remove_dir_all(dir);
}
