//! Parsers for F-Secure console output.
//!
//! `fsav` writes human-oriented text with no stable format: evaluation
//! banners, license notices and blank lines are mixed in with the lines we
//! care about. Both parsers match on substrings line by line and never fail;
//! anything they do not recognise is ignored.
//!
//! A typical scan of the EICAR test file looks like this:
//!
//! ```text
//! EVALUATION VERSION - FULLY FUNCTIONAL - FREE TO USE FOR 30 DAYS.
//!
//! F-Secure Anti-Virus CLI version 1.0  build 0060
//!
//! Scan started at Mon Aug 22 02:43:50 2016
//! Database version: 2016-08-22_01
//!
//! eicar.com.txt: Infected: EICAR_Test_File [FSE]
//! eicar.com.txt: Infected: EICAR-Test-File (not a virus) [Aquarius]
//!
//! Scan ended at Mon Aug 22 02:43:50 2016
//! 1 file scanned
//! 1 file infected
//! ```

use tracing::{debug, error};

use crate::model::{EngineFindings, VersionInfo};

const INFECTED_MARKER: &str = "Infected:";
const FSE_TAG: &str = "[FSE]";
const AQUARIUS_TAG: &str = "[Aquarius]";

const ENGINE_VERSION_PREFIX: &str = "F-Secure Linux Security version";
const DATABASE_VERSION_MARKER: &str = "Database version:";

/// Extracts the per-engine verdicts from `fsav` scan output.
///
/// Output without any `Infected:` line is a clean scan.
///
/// # Example
///
/// ```
/// use fsecure::parser::parse_scan_output;
///
/// let findings = parse_scan_output("eicar.com.txt: Infected: EICAR_Test_File [FSE]");
/// assert_eq!(findings.fse, "EICAR_Test_File");
/// assert!(findings.is_infected());
/// ```
pub fn parse_scan_output(output: &str) -> EngineFindings {
    debug!(%output, "parsing scan output");

    let mut findings = EngineFindings::default();

    for line in output.lines() {
        if let Some(verdict) = engine_verdict(line, FSE_TAG) {
            findings.fse = verdict;
            continue;
        }
        if let Some(verdict) = engine_verdict(line, AQUARIUS_TAG) {
            findings.aquarius = verdict;
        }
    }

    findings
}

/// Returns the text between `Infected:` and `tag` when the line carries both.
fn engine_verdict(line: &str, tag: &str) -> Option<String> {
    if !line.contains(tag) {
        return None;
    }
    let (_, rest) = line.split_once(INFECTED_MARKER)?;
    let verdict = match rest.find(tag) {
        Some(end) => &rest[..end],
        None => rest,
    };
    Some(verdict.trim().to_string())
}

/// Extracts the engine and database versions from `fsav --version` output.
///
/// The first well-formed `Database version:` line wins. A line with extra
/// colons is logged and skipped, leaving the database version empty unless a
/// later line supplies it.
pub fn parse_version_output(output: &str) -> VersionInfo {
    let mut version = VersionInfo::default();

    for line in output.lines() {
        if let Some(start) = line.find(ENGINE_VERSION_PREFIX) {
            version.engine = line[start + ENGINE_VERSION_PREFIX.len()..]
                .trim()
                .to_string();
        }

        if line.contains(DATABASE_VERSION_MARKER) {
            let parts: Vec<&str> = line.split(':').collect();
            if parts.len() == 2 {
                version.database = parts[1].trim().to_string();
                break;
            }
            error!(?parts, "unexpected database version line");
        }
    }

    version
}
