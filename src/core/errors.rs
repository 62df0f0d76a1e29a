use std::fmt;

use thiserror::Error;

use super::models::FileRef;

#[derive(Error, Debug)]
pub enum NotetypeError {
    #[error("I/O error: {0}")]
    Io(Box<std::io::Error>),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Regex error: {0}")]
    Regex(#[from] regex::Error),

    #[error(transparent)]
    Setting(#[from] SettingError),

    #[error("notetype '{notetype}' has {count} templates, expected exactly one")]
    TemplateCount { notetype: String, count: usize },

    #[error("notetype not found: {0}")]
    NotetypeNotFound(String),

    #[error("'{0}' is not a known base notetype")]
    UnknownBaseNotetype(String),

    #[error("failed to load packaged notetype '{name}': {reason}")]
    PackagedTemplate { name: String, reason: String },

    #[error("backup failed: {0}")]
    Backup(String),

    #[error("NotetypeError: {0}")]
    Custom(String),
}

impl From<std::io::Error> for NotetypeError {
    fn from(error: std::io::Error) -> Self {
        NotetypeError::Io(Box::new(error))
    }
}

/// Recoverable failure scoped to a single setting.
///
/// Extraction and injection failures are collected per setting and reported
/// together; they never abort the other settings of the same notetype.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum SettingError {
    #[error("{setting}: {message}")]
    Parse { setting: String, message: String },

    #[error("could not find '{setting}' in {file} template of notetype '{notetype}'")]
    SectionNotFound { setting: String, file: FileRef, notetype: String },

    #[error("invalid value for {setting}: expected {expected} but got {found}")]
    InvalidValue { setting: String, expected: String, found: String },

    #[error("unknown setting: {0}")]
    UnknownSetting(String),
}

impl SettingError {
    pub fn parse(setting: &str, message: impl Into<String>) -> Self {
        SettingError::Parse { setting: setting.to_string(), message: message.into() }
    }
}

/// Aggregated per-notetype setting failures from a batch read or write.
#[derive(Debug, Default, Clone, PartialEq)]
pub struct ParseReport {
    failures: Vec<(String, SettingError)>,
}

impl ParseReport {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, notetype: &str, error: SettingError) {
        self.failures.push((notetype.to_string(), error));
    }

    pub fn extend(&mut self, other: ParseReport) {
        self.failures.extend(other.failures);
    }

    pub fn is_empty(&self) -> bool {
        self.failures.is_empty()
    }

    pub fn len(&self) -> usize {
        self.failures.len()
    }

    pub fn failures(&self) -> &[(String, SettingError)] {
        &self.failures
    }

    pub fn failing_notetypes(&self) -> Vec<&str> {
        let mut names: Vec<&str> = Vec::new();
        for (name, _) in &self.failures {
            if !names.contains(&name.as_str()) {
                names.push(name);
            }
        }
        names
    }
}

impl fmt::Display for ParseReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (notetype, error) in &self.failures {
            write!(f, "failed parsing {}:\n{}\n\n", notetype, error)?;
        }
        Ok(())
    }
}
