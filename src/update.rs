//! Signature database updates.

use chrono::Local;
use std::ffi::OsStr;
use std::fs;
use std::path::Path;
use tracing::{info, warn};

use crate::error::Result;
use crate::scanner::{CommandRunner, ScannerPaths};
use crate::updated::UPDATED_FORMAT;

/// Updates the F-Secure signature databases.
///
/// Starts the update services, runs `dbupdate` with the update package and
/// records today's date in `sentinel`. Returns the updater's console output.
///
/// # Errors
///
/// Fails when `dbupdate` cannot be run or the sentinel cannot be written.
/// Services that fail to start are only logged.
pub fn update_av<R: CommandRunner>(paths: &ScannerPaths, runner: &R, sentinel: &Path) -> Result<String> {
    info!("updating F-Secure signature databases");

    for service in &paths.update_services {
        if let Err(e) = runner.run(service, &[OsStr::new("start")]) {
            warn!(service = %service.display(), error = %e, "failed to start update service");
        }
    }

    let output = runner.run(&paths.dbupdate, &[paths.update_package.as_os_str()])?;

    let today = Local::now().format(UPDATED_FORMAT).to_string();
    if let Some(parent) = sentinel.parent() {
        if !parent.as_os_str().is_empty() && !parent.exists() {
            fs::create_dir_all(parent)?;
        }
    }
    fs::write(sentinel, &today)?;
    info!(updated = %today, "signature databases updated");

    Ok(output)
}
