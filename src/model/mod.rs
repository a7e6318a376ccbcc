//! Core data types for scan results.
//!
//! - [`EngineFindings`] - Verdicts reported by the FSE and Aquarius engines
//! - [`VersionInfo`] - Engine and signature database versions
//! - [`ScanResult`] - The assembled result of one scan
//! - [`Report`] - The `{"f-secure": ...}` envelope printed and posted
//! - [`PluginRecord`] - The document stored in the database
//!
//! # Example
//!
//! ```
//! use fsecure::{EngineFindings, ScanResult, VersionInfo};
//!
//! let findings = EngineFindings::new("EICAR_Test_File", "");
//! let version = VersionInfo::new("11.00 build 79", "2016-08-22_01");
//! let result = ScanResult::new(findings, version, "20160822");
//!
//! assert!(result.infected());
//! ```

mod result;

pub use result::*;
