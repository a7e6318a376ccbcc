use serde::Serialize;

/// Plugin name used when storing results.
pub const PLUGIN_NAME: &str = "fsecure";

/// Plugin category used when storing results.
pub const PLUGIN_CATEGORY: &str = "av";

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct EngineFindings {
    /// Verdict of the primary (FSE) engine.
    pub fse: String,
    /// Verdict of the secondary (Aquarius) engine.
    pub aquarius: String,
}

impl EngineFindings {
    pub fn new(fse: impl Into<String>, aquarius: impl Into<String>) -> Self {
        Self {
            fse: fse.into(),
            aquarius: aquarius.into(),
        }
    }

    /// True when either engine reported a threat.
    pub fn is_infected(&self) -> bool {
        !self.fse.is_empty() || !self.aquarius.is_empty()
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct VersionInfo {
    pub engine: String,
    pub database: String,
}

impl VersionInfo {
    pub fn new(engine: impl Into<String>, database: impl Into<String>) -> Self {
        Self {
            engine: engine.into(),
            database: database.into(),
        }
    }
}

/// The result of scanning one file.
///
/// `infected` is derived from the findings when the result is built, so it
/// always agrees with the verdicts.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ScanResult {
    infected: bool,
    results: EngineFindings,
    engine: String,
    database: String,
    updated: String,
}

impl ScanResult {
    pub fn new(findings: EngineFindings, version: VersionInfo, updated: impl Into<String>) -> Self {
        Self {
            infected: findings.is_infected(),
            results: findings,
            engine: version.engine,
            database: version.database,
            updated: updated.into(),
        }
    }

    pub fn infected(&self) -> bool {
        self.infected
    }

    pub fn findings(&self) -> &EngineFindings {
        &self.results
    }

    pub fn engine(&self) -> &str {
        &self.engine
    }

    pub fn database(&self) -> &str {
        &self.database
    }

    /// Last signature database update as `YYYYMMDD`.
    pub fn updated(&self) -> &str {
        &self.updated
    }
}

/// JSON envelope written to stdout and posted to the webhook.
#[derive(Debug, Serialize)]
pub struct Report<'a> {
    #[serde(rename = "f-secure")]
    pub results: &'a ScanResult,
}

impl<'a> Report<'a> {
    pub fn new(results: &'a ScanResult) -> Self {
        Self { results }
    }
}

/// A scan result keyed for the document store.
#[derive(Debug, Serialize)]
pub struct PluginRecord<'a> {
    pub id: String,
    pub name: &'static str,
    pub category: &'static str,
    pub data: &'a ScanResult,
}

impl<'a> PluginRecord<'a> {
    pub fn new(id: impl Into<String>, data: &'a ScanResult) -> Self {
        Self {
            id: id.into(),
            name: PLUGIN_NAME,
            category: PLUGIN_CATEGORY,
            data,
        }
    }
}
