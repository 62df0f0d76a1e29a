//! Packaged notetype templates: the newest version of every base notetype.

use std::{
    collections::BTreeMap,
    fs,
    path::{
        Path,
        PathBuf,
    },
};

use tracing::debug;

use crate::core::{
    constants::TEMPLATE_VERSION_RE,
    FileRef,
    NotetypeError,
    NotetypeTemplate,
};

pub const FRONT_FILE: &str = "Front Template.html";
pub const BACK_FILE: &str = "Back Template.html";
pub const STYLE_FILE: &str = "Styling.css";

/// Read-only access to the packaged base notetypes.
pub trait TemplateSource {
    /// Base notetype names, sorted.
    fn base_names(&self) -> Result<Vec<String>, NotetypeError>;

    /// The newest packaged version of `base_name`, texts and field metadata included.
    fn load(&self, base_name: &str) -> Result<NotetypeTemplate, NotetypeError>;
}

/// Templates laid out as `<root>/<base>/{Front Template.html, Back Template.html, Styling.css, <base>.json}`.
#[derive(Debug, Clone)]
pub struct DirectoryTemplateSource {
    root: PathBuf,
}

impl DirectoryTemplateSource {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    fn read_text(&self, base_name: &str, file_name: &str) -> Result<String, NotetypeError> {
        let path = self.root.join(base_name).join(file_name);
        let bytes = fs::read(&path).map_err(|e| NotetypeError::PackagedTemplate {
            name: base_name.to_string(),
            reason: format!("{}: {}", path.display(), e),
        })?;
        // packaged files are not always clean utf-8
        Ok(String::from_utf8_lossy(&bytes).into_owned())
    }
}

impl TemplateSource for DirectoryTemplateSource {
    fn base_names(&self) -> Result<Vec<String>, NotetypeError> {
        let mut names = Vec::new();
        for entry in fs::read_dir(&self.root)? {
            let entry = entry?;
            if !entry.file_type()?.is_dir() {
                continue;
            }
            if let Some(name) = entry.file_name().to_str() {
                names.push(name.to_string());
            }
        }
        names.sort();
        Ok(names)
    }

    fn load(&self, base_name: &str) -> Result<NotetypeTemplate, NotetypeError> {
        let metadata = self.read_text(base_name, &format!("{}.json", base_name))?;
        let mut model: NotetypeTemplate =
            serde_json::from_str(&metadata).map_err(|e| NotetypeError::PackagedTemplate {
                name: base_name.to_string(),
                reason: e.to_string(),
            })?;

        model.set_text(FileRef::Front, self.read_text(base_name, FRONT_FILE)?)?;
        model.set_text(FileRef::Back, self.read_text(base_name, BACK_FILE)?)?;
        model.set_text(FileRef::Style, self.read_text(base_name, STYLE_FILE)?)?;
        debug!("loaded packaged notetype {} from {}", base_name, self.root.display());
        Ok(model)
    }
}

/// In-memory templates, keyed by base name.
#[derive(Debug, Clone, Default)]
pub struct MemoryTemplateSource {
    templates: BTreeMap<String, NotetypeTemplate>,
}

impl MemoryTemplateSource {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with(mut self, template: NotetypeTemplate) -> Self {
        self.insert(template);
        self
    }

    pub fn insert(&mut self, template: NotetypeTemplate) {
        self.templates.insert(template.name.clone(), template);
    }
}

impl TemplateSource for MemoryTemplateSource {
    fn base_names(&self) -> Result<Vec<String>, NotetypeError> {
        Ok(self.templates.keys().cloned().collect())
    }

    fn load(&self, base_name: &str) -> Result<NotetypeTemplate, NotetypeError> {
        self.templates
            .get(base_name)
            .cloned()
            .ok_or_else(|| NotetypeError::UnknownBaseNotetype(base_name.to_string()))
    }
}

/// Version tag from the `<!-- version X -->` line heading the front template.
pub fn template_version(model: &NotetypeTemplate) -> Option<&str> {
    TEMPLATE_VERSION_RE.captures(model.front()).and_then(|c| c.get(1)).map(|m| m.as_str())
}

/// Whether `installed` carries a different version tag than `packaged`.
///
/// A model without a tag counts as outdated once the packaged one has one.
pub fn has_update(installed: &NotetypeTemplate, packaged: &NotetypeTemplate) -> bool {
    template_version(installed) != template_version(packaged)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn write_packaged(root: &Path, name: &str, front: &str) {
        let dir = root.join(name);
        fs::create_dir_all(&dir).unwrap();
        fs::write(dir.join(FRONT_FILE), front).unwrap();
        fs::write(dir.join(BACK_FILE), "{{Extra}}").unwrap();
        fs::write(dir.join(STYLE_FILE), ".card {}").unwrap();
        let metadata = format!(
            r#"{{"id": 1, "name": "{}", "type": 0, "tmpls": [{{"name": "Card 1", "qfmt": "", "afmt": "", "ord": 0}}],
                "flds": [{{"name": "Text", "ord": 0, "sticky": false}},
                         {{"name": "Extra", "ord": 1, "sticky": false}}]}}"#,
            name
        );
        fs::write(dir.join(format!("{}.json", name)), metadata).unwrap();
    }

    #[test]
    fn test_directory_source_reads_all_parts() {
        let dir = tempfile::tempdir().unwrap();
        write_packaged(dir.path(), "AnKingOverhaul", "<!-- version 1a2b3 -->\n{{Text}}");
        write_packaged(dir.path(), "AnKing", "{{Text}}");
        fs::write(dir.path().join("README.md"), "not a notetype").unwrap();

        let source = DirectoryTemplateSource::new(dir.path());
        assert_eq!(source.base_names().unwrap(), vec!["AnKing", "AnKingOverhaul"]);

        let model = source.load("AnKingOverhaul").unwrap();
        assert_eq!(model.name, "AnKingOverhaul");
        assert_eq!(model.back(), "{{Extra}}");
        assert_eq!(model.css, ".card {}");
        assert_eq!(model.field_names(), vec!["Text", "Extra"]);
        assert_eq!(template_version(&model), Some("1a2b3"));
    }

    #[test]
    fn test_missing_packaged_file_names_the_notetype() {
        let dir = tempfile::tempdir().unwrap();
        write_packaged(dir.path(), "AnKing", "{{Text}}");
        fs::remove_file(dir.path().join("AnKing").join(STYLE_FILE)).unwrap();

        let err = DirectoryTemplateSource::new(dir.path()).load("AnKing").unwrap_err();
        assert!(matches!(err, NotetypeError::PackagedTemplate { ref name, .. } if name == "AnKing"));
    }

    #[test]
    fn test_version_comparison() {
        let old = NotetypeTemplate::new("AnKing", "<!-- version aaaaa -->\nfront", "", "", &[]);
        let new = NotetypeTemplate::new("AnKing", "<!-- version bbbbb -->\nfront", "", "", &[]);
        let untagged = NotetypeTemplate::new("AnKing", "front", "", "", &[]);

        assert!(has_update(&old, &new));
        assert!(!has_update(&new, &new));
        assert!(has_update(&untagged, &new));
        assert_eq!(template_version(&untagged), None);
    }

    #[test]
    fn test_memory_source_unknown_name() {
        let source = MemoryTemplateSource::new().with(NotetypeTemplate::new("AnKing", "", "", "", &[]));
        assert!(matches!(source.load("Nope"), Err(NotetypeError::UnknownBaseNotetype(_))));
        assert_eq!(source.base_names().unwrap(), vec!["AnKing"]);
    }
}
