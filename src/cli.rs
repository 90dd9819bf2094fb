//! Argument parsing and exit codes shared by the binaries.

use clap::error::ErrorKind;
use clap::Parser;
use std::path::{Path, PathBuf};
use std::process;
use uploader_core::{Error, Result};

/// Process exit codes.
pub mod exit {
    pub const SUCCESS: i32 = 0;
    /// Runtime failure, e.g. some remote deletions failed
    pub const FAILURE: i32 = 1;
    pub const USAGE: i32 = 2;
    pub const INVALID_DIRECTORY: i32 = 3;
    pub const INVALID_DATE: i32 = 4;
}

/// Parses the command line, exiting with [`exit::USAGE`] on bad arguments.
///
/// `--help` and `--version` print and exit successfully.
pub fn parse_args<T: Parser>() -> T {
    match T::try_parse() {
        Ok(args) => args,
        Err(e) => {
            let code = match e.kind() {
                ErrorKind::DisplayHelp | ErrorKind::DisplayVersion => exit::SUCCESS,
                _ => exit::USAGE,
            };
            let _ = e.print();
            process::exit(code);
        }
    }
}

/// Checks that `path` is an existing directory and returns it absolute.
pub fn require_dir(path: &Path) -> Result<PathBuf> {
    if !path.is_dir() {
        return Err(Error::NotADirectory(path.to_path_buf()));
    }
    Ok(path.canonicalize()?)
}

/// [`require_dir`], exiting with [`exit::INVALID_DIRECTORY`] on failure.
pub fn require_dir_or_exit(path: &Path, what: &str) -> PathBuf {
    match require_dir(path) {
        Ok(dir) => dir,
        Err(e) => {
            eprintln!("error: invalid {}: {}", what, e);
            process::exit(exit::INVALID_DIRECTORY);
        }
    }
}
