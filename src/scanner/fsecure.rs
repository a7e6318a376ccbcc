use std::ffi::OsStr;
use std::path::Path;
use tracing::{debug, info, warn};

use super::{CommandRunner, ScannerPaths};
use crate::error::Result;
use crate::model::{EngineFindings, VersionInfo};
use crate::parser::{parse_scan_output, parse_version_output};

/// Disables automatic remediation so the scanned file is left untouched.
const NO_ACTION_FLAG: &str = "--virus-action1=none";

/// The F-Secure command line scanner.
pub struct FSecure<R> {
    paths: ScannerPaths,
    runner: R,
}

impl<R: CommandRunner> FSecure<R> {
    pub fn new(paths: ScannerPaths, runner: R) -> Self {
        Self { paths, runner }
    }

    /// Starts the scanner daemon. `fsav` needs it for version queries.
    pub fn start_daemon(&self) {
        if let Err(e) = self.runner.run(&self.paths.fsavd, &[]) {
            warn!(error = %e, "failed to start fsavd");
        }
    }

    /// Queries the engine and signature database versions.
    pub fn version(&self) -> Result<VersionInfo> {
        self.start_daemon();
        let output = self
            .runner
            .run(&self.paths.fsav, &[OsStr::new("--version")])?;
        let version = parse_version_output(&output);
        debug!(engine = %version.engine, database = %version.database, "scanner version");
        Ok(version)
    }

    /// Returns the raw console output of scanning `path`.
    pub fn scan_output(&self, path: &Path) -> Result<String> {
        info!(path = %path.display(), "scanning file");
        self.runner
            .run(&self.paths.fsav, &[OsStr::new(NO_ACTION_FLAG), path.as_os_str()])
    }

    /// Scans `path` and parses the engine verdicts.
    pub fn scan(&self, path: &Path) -> Result<EngineFindings> {
        let output = self.scan_output(path)?;
        Ok(parse_scan_output(&output))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::PluginError;
    use crate::scanner::fake::ScriptedRunner;

    #[test]
    fn test_version_starts_daemon_first() {
        let runner = ScriptedRunner::new()
            .ok("")
            .ok("F-Secure Linux Security version 11.00 build 79\nDatabase version: 2016-09-19_01\n");
        let scanner = FSecure::new(ScannerPaths::default(), &runner);

        let version = scanner.version().unwrap();
        assert_eq!(version, VersionInfo::new("11.00 build 79", "2016-09-19_01"));

        let calls = runner.calls.borrow();
        assert!(calls[0][0].ends_with("fsavd"));
        assert_eq!(calls[1][1], "--version");
    }

    #[test]
    fn test_version_ignores_daemon_failure() {
        let runner = ScriptedRunner::new()
            .fail("exit status: 1")
            .ok("Database version: 2016-09-19_01");
        let scanner = FSecure::new(ScannerPaths::default(), &runner);

        assert_eq!(scanner.version().unwrap().database, "2016-09-19_01");
    }

    #[test]
    fn test_scan_passes_no_action_flag() {
        let runner = ScriptedRunner::new().ok("eicar.com.txt: Infected: EICAR_Test_File [FSE]\n");
        let scanner = FSecure::new(ScannerPaths::default(), &runner);

        let findings = scanner.scan(Path::new("/malware/eicar.com.txt")).unwrap();
        assert_eq!(findings.fse, "EICAR_Test_File");

        let calls = runner.calls_to("fsav");
        assert_eq!(
            calls[0][1..],
            ["--virus-action1=none".to_string(), "/malware/eicar.com.txt".to_string()]
        );
    }

    #[test]
    fn test_scan_propagates_execution_failure() {
        let runner = ScriptedRunner::new().fail("signal: 9");
        let scanner = FSecure::new(ScannerPaths::default(), &runner);

        let err = scanner.scan(Path::new("/malware/sample")).unwrap_err();
        assert!(matches!(err, PluginError::CommandFailed { .. }));
    }
}
