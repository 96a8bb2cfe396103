use std::{fs::create_dir_all, path::PathBuf};

use super::failure::Failure;

/// Path to the config directory, created if missing.
pub fn config_dir() -> PathBuf {
    let dir = dirs::config_dir()
        .report_and_panic("The config directory could not be retrieved")
        .join("Capture Viewer");

    create_dir_all(&dir).report_and_panic("Could not create the config directory");

    dir
}
