use crate::error::Result;
use crate::model::{Report, ScanResult};

/// Serializes the `{"f-secure": ...}` envelope as compact JSON.
pub fn report_json(result: &ScanResult) -> Result<String> {
    Ok(serde_json::to_string(&Report::new(result))?)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{EngineFindings, VersionInfo};

    #[test]
    fn test_report_json_is_compact() {
        let result = ScanResult::new(EngineFindings::default(), VersionInfo::default(), "20170123");
        assert_eq!(
            report_json(&result).unwrap(),
            r#"{"f-secure":{"infected":false,"results":{"fse":"","aquarius":""},"engine":"","database":"","updated":"20170123"}}"#
        );
    }
}
