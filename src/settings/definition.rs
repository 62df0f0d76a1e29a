use regex::Regex;
use tracing::debug;

use super::{
    handlers,
    locator::{
        self,
        Section,
    },
    value::SettingValue,
};
use crate::{
    config::ConfigStore,
    core::{
        FileRef,
        NotetypeError,
        NotetypeTemplate,
        SettingError,
    },
};

/// Patterns describing the repeated constructs an order setting rearranges.
#[derive(Debug, Clone)]
pub struct OrderPattern {
    pub element: Regex,
    /// An element only counts if it matches this.
    pub has_to_contain: Regex,
    /// Elements containing this substring are skipped.
    pub exclude: Option<String>,
    /// Tried in order, group 1 of the first hit is the element name.
    pub name_patterns: Vec<Regex>,
}

impl OrderPattern {
    pub fn new(element: &str, has_to_contain: &str, name_patterns: &[&str]) -> Result<Self, regex::Error> {
        Ok(Self {
            element: Regex::new(element)?,
            has_to_contain: Regex::new(has_to_contain)?,
            exclude: None,
            name_patterns: name_patterns.iter().map(|p| Regex::new(p)).collect::<Result<_, _>>()?,
        })
    }

    pub fn excluding(mut self, substring: &str) -> Self {
        self.exclude = Some(substring.to_string());
        self
    }
}

#[derive(Debug, Clone)]
pub enum SettingKind {
    Checkbox,
    ReCheckbox { replacement_pairs: Vec<(String, String)> },
    WrapCheckbox { start: String, end: String },
    Text,
    Shortcut,
    FontFamily,
    Number { decimal: bool, min: Option<f64>, max: Option<f64>, step: f64 },
    Dropdown { options: Vec<String> },
    UserAction { options: Vec<String>, labels: Vec<String> },
    Color { with_inherit_option: bool },
    Order(OrderPattern),
}

impl SettingKind {
    pub fn number() -> Self {
        SettingKind::Number { decimal: false, min: Some(0.0), max: Some(1000.0), step: 1.0 }
    }

    pub fn decimal(min: f64, max: f64, step: f64) -> Self {
        SettingKind::Number { decimal: true, min: Some(min), max: Some(max), step }
    }

    pub fn number_in(min: Option<f64>, max: Option<f64>) -> Self {
        SettingKind::Number { decimal: false, min, max, step: 1.0 }
    }

    pub fn dropdown(options: &[&str]) -> Self {
        SettingKind::Dropdown { options: options.iter().map(|o| o.to_string()).collect() }
    }

    pub fn re_checkbox(pairs: &[(&str, &str)]) -> Self {
        SettingKind::ReCheckbox {
            replacement_pairs: pairs.iter().map(|(u, c)| (u.to_string(), c.to_string())).collect(),
        }
    }

    pub fn wrap_checkbox(start: &str, end: &str) -> Self {
        SettingKind::WrapCheckbox { start: start.to_string(), end: end.to_string() }
    }

    pub fn tag(&self) -> &'static str {
        match self {
            SettingKind::Checkbox => "checkbox",
            SettingKind::ReCheckbox { .. } => "re_checkbox",
            SettingKind::WrapCheckbox { .. } => "wrap_checkbox",
            SettingKind::Text => "text",
            SettingKind::Shortcut => "shortcut",
            SettingKind::FontFamily => "font_family",
            SettingKind::Number { .. } => "number",
            SettingKind::Dropdown { .. } => "dropdown",
            SettingKind::UserAction { .. } => "useraction",
            SettingKind::Color { .. } => "color",
            SettingKind::Order(_) => "order",
        }
    }

    fn needs_capture_group(&self) -> bool {
        !matches!(
            self,
            SettingKind::ReCheckbox { .. } | SettingKind::WrapCheckbox { .. } | SettingKind::Order(_)
        )
    }

    /// Whether `value` has the shape this kind stores.
    pub fn accepts(&self, value: &SettingValue) -> bool {
        match (self, value) {
            (
                SettingKind::Checkbox
                | SettingKind::ReCheckbox { .. }
                | SettingKind::WrapCheckbox { .. },
                SettingValue::Bool(_),
            ) => true,
            (
                SettingKind::Text | SettingKind::Shortcut | SettingKind::FontFamily | SettingKind::Color { .. },
                SettingValue::Text(_),
            ) => true,
            (SettingKind::Number { decimal: true, .. }, SettingValue::Decimal(_) | SettingValue::Integer(_)) => {
                true
            }
            (SettingKind::Number { decimal: false, .. }, SettingValue::Integer(_)) => true,
            (SettingKind::Number { decimal: false, .. }, SettingValue::Decimal(d)) => d.fract() == 0.0,
            (SettingKind::Dropdown { options }, SettingValue::Text(s)) => options.contains(s),
            (SettingKind::UserAction { options, .. }, SettingValue::Text(s)) => {
                s == handlers::CUSTOM_USER_ACTION || options.contains(s)
            }
            (SettingKind::Order(_), SettingValue::List(_)) => true,
            _ => false,
        }
    }
}

/// Declarative description of one tunable parameter embedded in template text.
#[derive(Debug, Clone)]
pub struct SettingDefinition {
    name: String,
    label: String,
    tooltip: Option<String>,
    files: Vec<FileRef>,
    regex: Regex,
    kind: SettingKind,
    default: Option<SettingValue>,
    group: Option<String>,
    related_field: Option<String>,
}

impl SettingDefinition {
    pub fn new(name: &str, kind: SettingKind, file: FileRef, pattern: &str) -> Result<Self, NotetypeError> {
        Self::in_files(name, kind, &[file], pattern)
    }

    pub fn in_files(
        name: &str,
        kind: SettingKind,
        files: &[FileRef],
        pattern: &str,
    ) -> Result<Self, NotetypeError> {
        let regex = Regex::new(pattern)?;
        if kind.needs_capture_group() && regex.captures_len() < 2 {
            return Err(NotetypeError::Custom(format!(
                "pattern of {} setting '{}' has no capture group",
                kind.tag(),
                name
            )));
        }
        if files.is_empty() {
            return Err(NotetypeError::Custom(format!("setting '{}' references no file", name)));
        }

        Ok(Self {
            name: name.to_string(),
            label: name.to_string(),
            tooltip: None,
            files: files.to_vec(),
            regex,
            kind,
            default: None,
            group: None,
            related_field: None,
        })
    }

    pub fn label(mut self, label: &str) -> Self {
        self.label = label.to_string();
        self
    }

    pub fn tooltip(mut self, tooltip: &str) -> Self {
        self.tooltip = Some(tooltip.to_string());
        self
    }

    pub fn default_value(mut self, value: impl Into<SettingValue>) -> Self {
        self.default = Some(value.into());
        self
    }

    pub fn group(mut self, group: &str) -> Self {
        self.group = Some(group.to_string());
        self
    }

    pub fn related_field(mut self, field_name: &str) -> Self {
        self.related_field = Some(field_name.to_string());
        self
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn text(&self) -> &str {
        &self.label
    }

    pub fn tooltip_text(&self) -> Option<&str> {
        self.tooltip.as_deref()
    }

    pub fn files(&self) -> &[FileRef] {
        &self.files
    }

    pub fn kind(&self) -> &SettingKind {
        &self.kind
    }

    pub fn default(&self) -> Option<&SettingValue> {
        self.default.as_ref()
    }

    pub fn group_name(&self) -> Option<&str> {
        self.group.as_deref()
    }

    pub fn related_field_name(&self) -> Option<&str> {
        self.related_field.as_deref()
    }

    /// Config key of this setting inside `scope`.
    pub fn key(&self, scope: &str) -> String {
        format!("{}.{}", scope, self.name)
    }

    /// Whether any referenced file of `model` contains this setting's section.
    pub fn is_present(&self, model: &NotetypeTemplate) -> bool {
        self.files
            .iter()
            .filter_map(|file| model.text(*file).ok())
            .any(|text| locator::is_present(&self.regex, text))
    }

    pub fn locate<'t>(&self, file: FileRef, text: &'t str) -> Option<Section<'t>> {
        locator::locate(&self.regex, file, text)
    }

    /// Reads the current value from the first referenced file that has the section.
    pub fn extract(&self, model: &NotetypeTemplate) -> Result<SettingValue, SettingError> {
        for file in &self.files {
            let text = self.file_text(model, *file)?;
            if let Some(section) = self.locate(*file, text) {
                return handlers::extract(&self.name, &self.kind, &section);
            }
        }
        Err(self.not_found(model, self.files[0]))
    }

    /// Writes `value` into every referenced file that has the section.
    pub fn inject(&self, model: &mut NotetypeTemplate, value: &SettingValue) -> Result<(), SettingError> {
        if !self.kind.accepts(value) {
            return Err(SettingError::InvalidValue {
                setting: self.name.clone(),
                expected: self.kind.tag().to_string(),
                found: value.to_string(),
            });
        }

        let mut updated: Vec<(FileRef, String)> = Vec::new();
        for file in &self.files {
            let text = self.file_text(model, *file)?;
            let Some(section) = self.locate(*file, text) else {
                continue;
            };
            let new_section = handlers::inject(&self.name, &self.kind, &section, value)?;
            updated.push((*file, locator::splice(text, &section, &new_section)));
        }

        if updated.is_empty() {
            return Err(self.not_found(model, self.files[0]));
        }

        for (file, text) in updated {
            model
                .set_text(file, text)
                .map_err(|e| SettingError::parse(&self.name, e.to_string()))?;
        }
        Ok(())
    }

    /// Returns a copy of `model` with the configured value of this setting applied.
    ///
    /// The value comes from `{scope}.{name}` in `config`, falling back to the
    /// definition's default. With neither present the copy is returned unchanged.
    pub fn updated_model(
        &self,
        model: &NotetypeTemplate,
        scope: &str,
        config: &ConfigStore,
    ) -> Result<NotetypeTemplate, SettingError> {
        let mut result = model.clone();

        let value = match config.get(&self.key(scope)) {
            Some(json) => SettingValue::from_json(json).ok_or_else(|| SettingError::InvalidValue {
                setting: self.name.clone(),
                expected: self.kind.tag().to_string(),
                found: json.to_string(),
            })?,
            None => match &self.default {
                Some(default) => default.clone(),
                None => {
                    debug!("no value or default for {}, leaving {} unchanged", self.key(scope), model.name);
                    return Ok(result);
                }
            },
        };

        self.inject(&mut result, &value)?;
        Ok(result)
    }

    fn file_text<'m>(&self, model: &'m NotetypeTemplate, file: FileRef) -> Result<&'m str, SettingError> {
        model.text(file).map_err(|e| SettingError::parse(&self.name, e.to_string()))
    }

    fn not_found(&self, model: &NotetypeTemplate, file: FileRef) -> SettingError {
        SettingError::SectionNotFound {
            setting: self.name.clone(),
            file,
            notetype: model.name.clone(),
        }
    }
}
