//! Running the F-Secure binaries.
//!
//! Process execution sits behind the [`CommandRunner`] trait so the scanner
//! can be driven by canned output in tests. [`SystemRunner`] is the real
//! implementation.
//!
//! # Example
//!
//! ```no_run
//! use fsecure::scanner::{FSecure, ScannerPaths, SystemRunner};
//! use std::path::Path;
//!
//! let scanner = FSecure::new(ScannerPaths::default(), SystemRunner);
//! let version = scanner.version()?;
//! let findings = scanner.scan(Path::new("/malware/eicar.com.txt"))?;
//!
//! println!("{} / {}: {:?}", version.engine, version.database, findings);
//! # Ok::<(), fsecure::PluginError>(())
//! ```

mod fsecure;

pub use fsecure::FSecure;

use serde::{Deserialize, Serialize};
use std::ffi::OsStr;
use std::path::{Path, PathBuf};
use std::process::Command;
use tracing::debug;

use crate::error::{PluginError, Result};

/// Locations of the F-Secure binaries and update tooling.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ScannerPaths {
    /// Command line scanner.
    pub fsav: PathBuf,
    /// Scanner daemon, started before querying versions.
    pub fsavd: PathBuf,
    /// Signature database updater.
    pub dbupdate: PathBuf,
    /// Update package passed to `dbupdate`.
    pub update_package: PathBuf,
    /// Services started before updating.
    pub update_services: Vec<PathBuf>,
}

impl Default for ScannerPaths {
    fn default() -> Self {
        Self {
            fsav: PathBuf::from("/opt/f-secure/fsav/bin/fsav"),
            fsavd: PathBuf::from("/opt/f-secure/fsav/bin/fsavd"),
            dbupdate: PathBuf::from("/opt/f-secure/fsav/bin/dbupdate"),
            update_package: PathBuf::from("/opt/f-secure/fsdbupdate9.run"),
            update_services: vec![
                PathBuf::from("/etc/init.d/fsaua"),
                PathBuf::from("/etc/init.d/fsupdate"),
            ],
        }
    }
}

/// Executes an external program and returns its console output.
pub trait CommandRunner {
    /// Runs `program` with `args`, returning stdout followed by stderr.
    ///
    /// # Errors
    ///
    /// Fails when the program cannot be started, or when it exits
    /// unsuccessfully without writing anything.
    fn run(&self, program: &Path, args: &[&OsStr]) -> Result<String>;
}

/// Runs programs with [`std::process::Command`].
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemRunner;

impl CommandRunner for SystemRunner {
    fn run(&self, program: &Path, args: &[&OsStr]) -> Result<String> {
        let output = Command::new(program)
            .args(args)
            .output()
            .map_err(|e| PluginError::spawn(program, e))?;

        let mut text = String::from_utf8_lossy(&output.stdout).into_owned();
        text.push_str(&String::from_utf8_lossy(&output.stderr));

        if !output.status.success() {
            // fsav exits non-zero when it finds something, so output still counts
            if text.trim().is_empty() {
                return Err(PluginError::CommandFailed {
                    program: program.display().to_string(),
                    status: output.status.to_string(),
                });
            }
            debug!(program = %program.display(), status = %output.status, "non-zero exit");
        }

        Ok(text)
    }
}

impl<R: CommandRunner + ?Sized> CommandRunner for &R {
    fn run(&self, program: &Path, args: &[&OsStr]) -> Result<String> {
        (**self).run(program, args)
    }
}
