//! Assembling a [`ScanResult`] for one file.

use std::path::Path;
use tracing::{info, warn};

use crate::config::Config;
use crate::error::{PluginError, Result};
use crate::model::{ScanResult, VersionInfo};
use crate::retry::retry;
use crate::scanner::{CommandRunner, FSecure};
use crate::updated::last_updated;

/// Scans `path` and assembles the result.
///
/// The version query runs before the scan, so the result carries version
/// metadata even when the version query itself failed (the fields are then
/// empty). Scanner failures are retried according to `config.retry`; the
/// last failure is returned once the policy is exhausted.
pub fn scan_file<R: CommandRunner>(
    config: &Config,
    scanner: &FSecure<R>,
    path: &Path,
) -> Result<ScanResult> {
    if !path.exists() {
        return Err(PluginError::file_not_found(path));
    }

    let version = scanner.version().unwrap_or_else(|e| {
        warn!(error = %e, "version query failed");
        VersionInfo::default()
    });
    let updated = last_updated(&config.sentinel_path, &config.build_time);

    let findings = retry(&config.retry, |_| scanner.scan(path))?;
    let result = ScanResult::new(findings, version, updated);

    info!(
        path = %path.display(),
        infected = result.infected(),
        "scan complete"
    );
    Ok(result)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::retry::RetryConfig;
    use crate::scanner::fake::ScriptedRunner;
    use crate::scanner::ScannerPaths;
    use std::fs;
    use tempfile::TempDir;

    const VERSION: &str = "F-Secure Linux Security version 11.00 build 79\nDatabase version: 2016-09-19_01\n";
    const EICAR: &str = "eicar.com.txt: Infected: EICAR_Test_File [FSE]\n\
                         eicar.com.txt: Infected: EICAR-Test-File (not a virus) [Aquarius]\n";

    struct Fixture {
        dir: TempDir,
        config: Config,
    }

    impl Fixture {
        fn new() -> Self {
            let dir = TempDir::new().unwrap();
            let config = Config {
                build_time: "20170123".to_string(),
                sentinel_path: dir.path().join("UPDATED"),
                ..Config::default()
            };
            Self { dir, config }
        }

        fn sample(&self) -> std::path::PathBuf {
            let path = self.dir.path().join("eicar.com.txt");
            fs::write(&path, "X5O!P%@AP[4\\PZX54(P^)7CC)7}$EICAR").unwrap();
            path
        }
    }

    #[test]
    fn test_scan_file_assembles_result() {
        let fixture = Fixture::new();
        let runner = ScriptedRunner::new().ok("").ok(VERSION).ok(EICAR);
        let scanner = FSecure::new(ScannerPaths::default(), &runner);

        let result = scan_file(&fixture.config, &scanner, &fixture.sample()).unwrap();

        assert!(result.infected());
        assert_eq!(result.findings().fse, "EICAR_Test_File");
        assert_eq!(result.findings().aquarius, "EICAR-Test-File (not a virus)");
        assert_eq!(result.engine(), "11.00 build 79");
        assert_eq!(result.database(), "2016-09-19_01");
        assert_eq!(result.updated(), "20170123");
    }

    #[test]
    fn test_version_query_precedes_scan() {
        let fixture = Fixture::new();
        let runner = ScriptedRunner::new().ok("").ok(VERSION).ok("");
        let scanner = FSecure::new(ScannerPaths::default(), &runner);

        scan_file(&fixture.config, &scanner, &fixture.sample()).unwrap();

        let calls = runner.calls_to("fsav");
        assert_eq!(calls.len(), 2);
        assert_eq!(calls[0][1], "--version");
        assert_eq!(calls[1][1], "--virus-action1=none");
    }

    #[test]
    fn test_missing_file_is_fatal() {
        let fixture = Fixture::new();
        let runner = ScriptedRunner::new();
        let scanner = FSecure::new(ScannerPaths::default(), &runner);

        let err = scan_file(&fixture.config, &scanner, &fixture.dir.path().join("missing")).unwrap_err();

        assert!(matches!(err, PluginError::FileNotFound { .. }));
        assert!(runner.calls.borrow().is_empty());
    }

    #[test]
    fn test_scan_retried_once() {
        let fixture = Fixture::new();
        let runner = ScriptedRunner::new()
            .ok("")
            .ok(VERSION)
            .fail("signal: 9")
            .ok(EICAR);
        let scanner = FSecure::new(ScannerPaths::default(), &runner);

        let result = scan_file(&fixture.config, &scanner, &fixture.sample()).unwrap();

        assert!(result.infected());
        assert_eq!(runner.calls_to("fsav").len(), 3);
    }

    #[test]
    fn test_scan_fails_after_retries_exhausted() {
        let fixture = Fixture::new();
        let runner = ScriptedRunner::new()
            .ok("")
            .ok(VERSION)
            .fail("signal: 9")
            .fail("signal: 9");
        let scanner = FSecure::new(ScannerPaths::default(), &runner);

        let err = scan_file(&fixture.config, &scanner, &fixture.sample()).unwrap_err();

        assert!(matches!(err, PluginError::CommandFailed { .. }));
        assert_eq!(runner.calls_to("fsav").len(), 3);
    }

    #[test]
    fn test_no_retry_policy() {
        let mut fixture = Fixture::new();
        fixture.config.retry = RetryConfig::no_retry();
        let runner = ScriptedRunner::new()
            .ok("")
            .ok(VERSION)
            .fail("signal: 9")
            .ok(EICAR);
        let scanner = FSecure::new(ScannerPaths::default(), &runner);

        assert!(scan_file(&fixture.config, &scanner, &fixture.sample()).is_err());
        assert_eq!(runner.calls_to("fsav").len(), 2);
    }

    #[test]
    fn test_version_failure_leaves_fields_empty() {
        let fixture = Fixture::new();
        let runner = ScriptedRunner::new().ok("").fail("exit status: 1").ok("");
        let scanner = FSecure::new(ScannerPaths::default(), &runner);

        let result = scan_file(&fixture.config, &scanner, &fixture.sample()).unwrap();

        assert!(!result.infected());
        assert_eq!(result.engine(), "");
        assert_eq!(result.database(), "");
    }

    #[test]
    fn test_sentinel_date_used_when_present() {
        let fixture = Fixture::new();
        fs::write(&fixture.config.sentinel_path, "20160919").unwrap();
        let runner = ScriptedRunner::new().ok("").ok(VERSION).ok("");
        let scanner = FSecure::new(ScannerPaths::default(), &runner);

        let result = scan_file(&fixture.config, &scanner, &fixture.sample()).unwrap();
        assert_eq!(result.updated(), "20160919");
    }
}
