use std::collections::{
    BTreeMap,
    HashMap,
};

use regex::Regex;
use serde_json::{
    Map,
    Value,
};
use tracing::info;

use super::{
    catalog,
    definition::SettingDefinition,
    locator,
    value::SettingValue,
};
use crate::{
    core::{
        NotetypeError,
        NotetypeTemplate,
    },
    templates::TemplateSource,
};

pub const GENERAL_SCOPE: &str = "general";

const FIRST_TAB: &str = "AnKingOverhaul";
const OVERLAPPING_TAB: &str = "AnKingOverlapping";
const OVERLAPPING_AFTER: &str = "IO-one by one";
const IO_NOTETYPES: &[&str] = &["IO-one by one", "Physeo-IO one by one"];

/// Every setting definition known for the packaged notetypes.
///
/// The hand-written catalog is extended with the per-field settings found by
/// scanning each packaged back template.
#[derive(Debug, Clone)]
pub struct SettingRegistry {
    definitions: Vec<SettingDefinition>,
    index: HashMap<String, usize>,
    base_names: Vec<String>,
    configurable_fields: HashMap<String, Vec<String>>,
}

impl SettingRegistry {
    pub fn build(source: &dyn TemplateSource) -> Result<Self, NotetypeError> {
        let mut registry = Self {
            definitions: Vec::new(),
            index: HashMap::new(),
            base_names: source.base_names()?,
            configurable_fields: HashMap::new(),
        };
        for def in catalog::builtin_definitions()? {
            registry.insert(def);
        }

        for base_name in registry.base_names.clone() {
            let model = source.load(&base_name)?;
            let fields = configurable_fields_in(model.back())?;
            let shortcuts = button_shortcuts_in(model.back());

            for field in &fields {
                let shortcut = shortcuts.iter().find(|(name, _)| name == field).map(|(_, s)| s.as_str());
                for def in catalog::field_definitions(field, shortcut)? {
                    registry.insert(def);
                }
            }
            if fields.iter().any(|f| f == catalog::OME_FIELD_NAME) {
                registry.insert(catalog::disable_ome_mobile()?);
            }
            registry.configurable_fields.insert(base_name, fields);
        }

        info!(
            "built setting registry with {} definitions for {} notetypes",
            registry.definitions.len(),
            registry.base_names.len()
        );
        Ok(registry)
    }

    /// Adds `def`, replacing an earlier definition of the same name in place.
    fn insert(&mut self, def: SettingDefinition) {
        match self.index.get(def.name()) {
            Some(&i) => self.definitions[i] = def,
            None => {
                self.index.insert(def.name().to_string(), self.definitions.len());
                self.definitions.push(def);
            }
        }
    }

    pub fn get(&self, name: &str) -> Option<&SettingDefinition> {
        self.index.get(name).map(|&i| &self.definitions[i])
    }

    pub fn iter(&self) -> impl Iterator<Item = &SettingDefinition> {
        self.definitions.iter()
    }

    pub fn len(&self) -> usize {
        self.definitions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.definitions.is_empty()
    }

    /// Definitions whose section exists somewhere in `model`.
    pub fn definitions_for_model(&self, model: &NotetypeTemplate) -> Vec<&SettingDefinition> {
        self.definitions.iter().filter(|def| def.is_present(model)).collect()
    }

    pub fn is_general(&self, name: &str) -> bool {
        catalog::GENERAL_SETTINGS.contains(&name) && self.index.contains_key(name)
    }

    pub fn general_definitions(&self) -> Vec<&SettingDefinition> {
        catalog::GENERAL_SETTINGS.iter().filter_map(|name| self.get(name)).collect()
    }

    pub fn general_defaults(&self) -> Vec<(String, SettingValue)> {
        self.general_definitions()
            .into_iter()
            .filter_map(|def| def.default().map(|v| (def.name().to_string(), v.clone())))
            .collect()
    }

    /// The document a fresh installation starts from: general defaults only.
    pub fn default_config_document(&self) -> Value {
        let general: Map<String, Value> =
            self.general_defaults().into_iter().map(|(name, value)| (name, value.to_json())).collect();
        let mut document = Map::new();
        document.insert(GENERAL_SCOPE.to_string(), Value::Object(general));
        Value::Object(document)
    }

    pub fn base_names(&self) -> &[String] {
        &self.base_names
    }

    /// The packaged base notetype `model_name` is a version of.
    ///
    /// Matches the base name followed by the end of the name, a space or a dash.
    pub fn base_name_of(&self, model_name: &str) -> Option<&str> {
        self.base_names
            .iter()
            .find(|base| {
                model_name
                    .strip_prefix(base.as_str())
                    .is_some_and(|rest| rest.is_empty() || rest.starts_with(' ') || rest.starts_with('-'))
            })
            .map(String::as_str)
    }

    pub fn is_io_notetype(&self, model_name: &str) -> bool {
        self.base_name_of(model_name).is_some_and(|base| IO_NOTETYPES.contains(&base))
    }

    /// Configurable fields of a packaged base notetype, in template order.
    pub fn configurable_fields(&self, base_name: &str) -> &[String] {
        self.configurable_fields.get(base_name).map(Vec::as_slice).unwrap_or(&[])
    }

    /// Base names in tab order.
    pub fn tab_order(&self) -> Vec<&str> {
        let mut names: Vec<&str> = self.base_names.iter().map(String::as_str).collect();
        names.sort();

        if let Some(i) = names.iter().position(|n| *n == FIRST_TAB) {
            let first = names.remove(i);
            names.insert(0, first);
        }
        if names.contains(&OVERLAPPING_AFTER) {
            if let Some(i) = names.iter().position(|n| *n == OVERLAPPING_TAB) {
                let overlapping = names.remove(i);
                let after = names.iter().position(|n| *n == OVERLAPPING_AFTER).map_or(names.len(), |i| i + 1);
                names.insert(after, overlapping);
            }
        }
        names
    }

    /// Field-related settings moved to the end, in the packaged field order of `base_name`.
    pub fn in_field_order<'a>(&self, defs: Vec<&'a SettingDefinition>, base_name: &str) -> Vec<&'a SettingDefinition> {
        let fields = self.configurable_fields(base_name);
        let (mut field_defs, mut others): (Vec<_>, Vec<_>) =
            defs.into_iter().partition(|def| def.related_field_name().is_some());

        // unknown names sort first, quoting differs between template versions
        field_defs.sort_by_key(|def| {
            def.related_field_name()
                .and_then(|name| fields.iter().position(|f| f == name))
                .map_or(-1, |i| i as i64)
        });
        others.extend(field_defs);
        others
    }
}

/// Definitions grouped by their group tag, groups sorted by name.
///
/// Definitions without a group are returned separately, in input order.
pub fn grouped<'a>(
    defs: &[&'a SettingDefinition],
) -> (Vec<(String, Vec<&'a SettingDefinition>)>, Vec<&'a SettingDefinition>) {
    let mut groups: BTreeMap<String, Vec<&'a SettingDefinition>> = BTreeMap::new();
    let mut ungrouped = Vec::new();
    for def in defs {
        match def.group_name() {
            Some(group) => groups.entry(group.to_string()).or_default().push(*def),
            None => ungrouped.push(*def),
        }
    }
    (groups.into_iter().collect(), ungrouped)
}

/// Names of the configurable field blocks in a back template.
pub fn configurable_fields_in(back: &str) -> Result<Vec<String>, NotetypeError> {
    let pattern = catalog::configurable_field_pattern()?;
    let elements = locator::locate_elements(back, &pattern).map_err(NotetypeError::Custom)?;
    Ok(elements.into_iter().map(|e| e.name).collect())
}

/// `(button, shortcut)` pairs of the `ButtonShortcuts` table in a back template.
pub fn button_shortcuts_in(back: &str) -> Vec<(String, String)> {
    let (Ok(table_re), Ok(pair_re)) =
        (Regex::new(catalog::BUTTON_SHORTCUTS_RE), Regex::new(catalog::BUTTON_SHORTCUT_PAIR_RE))
    else {
        return Vec::new();
    };
    let Some(table) = table_re.captures(back).and_then(|c| c.get(1)) else {
        return Vec::new();
    };

    pair_re
        .captures_iter(table.as_str())
        .map(|c| (c[1].to_string(), c[2].to_string()))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::templates::MemoryTemplateSource;

    const OVERHAUL_BACK: &str = r#"{{Text}}
<script>
var ButtonShortcuts = {
  "Lecture Notes" : "Ctrl+Shift+L",
  "Missed Questions" : "Ctrl+Shift+M",
}
var ButtonAutoReveal = {
  "Lecture Notes" : false,
  "Missed Questions" : false,
}
var ToggleNextButtonShortcut = "H";
</script>
{{#Lecture Notes}}<a class="hint" data-name="Lecture Notes">LN</a>{{/Lecture Notes}}
{{#Missed Questions}}<a class="hint" data-name="Missed Questions">MQ</a>{{/Missed Questions}}
{{#OME}}<span id="hint-ome" class="hint">OME</span>{{/OME}}
{{#Extra}}<div id="extra">{{Extra}}</div>{{/Extra}}
"#;

    fn source() -> MemoryTemplateSource {
        MemoryTemplateSource::new()
            .with(NotetypeTemplate::new(
                "AnKingOverhaul",
                "var autoflip = true;",
                OVERHAUL_BACK,
                "",
                &["Text", "Extra", "Lecture Notes", "Missed Questions", "OME"],
            ))
            .with(NotetypeTemplate::new("AnKing", "", "{{#Extra}}<div id=\"extra\"></div>{{/Extra}}", "", &["Extra"]))
            .with(NotetypeTemplate::new("AnKingOverlapping", "", "", "", &[]))
            .with(NotetypeTemplate::new("IO-one by one", "", "", "", &[]))
            .with(NotetypeTemplate::new("Basic-AnKing", "", "", "", &[]))
    }

    #[test]
    fn test_scanned_fields_generate_settings() {
        let registry = SettingRegistry::build(&source()).unwrap();

        assert_eq!(
            registry.configurable_fields("AnKingOverhaul"),
            ["Lecture Notes", "Missed Questions", "OME", "Extra"]
        );
        assert!(registry.get("disable_lecture_notes").is_some());
        assert!(registry.get("disable_extra").is_some());
        assert!(registry.get("btn_shortcut_extra").is_none());
        assert!(registry.get("disable_ome_mobile").is_some());

        let shortcut = registry.get("btn_shortcut_missed_questions").unwrap();
        assert_eq!(shortcut.default(), Some(&SettingValue::text("Ctrl+Shift+M")));
        assert_eq!(shortcut.related_field_name(), Some("Missed Questions"));
        assert!(registry.get("autoreveal_lecture_notes").is_some());
    }

    #[test]
    fn test_definitions_for_model_only_lists_present_sections() {
        let registry = SettingRegistry::build(&source()).unwrap();
        let model = source().load("AnKingOverhaul").unwrap();

        let names: Vec<&str> = registry.definitions_for_model(&model).iter().map(|d| d.name()).collect();
        assert!(names.contains(&"autoflip"));
        assert!(names.contains(&"toggle_next_button"));
        assert!(names.contains(&"field_order"));
        assert!(!names.contains(&"timer_secs"));
    }

    #[test]
    fn test_base_name_resolution() {
        let registry = SettingRegistry::build(&source()).unwrap();

        assert_eq!(registry.base_name_of("AnKing"), Some("AnKing"));
        assert_eq!(registry.base_name_of("AnKing-1dgs0"), Some("AnKing"));
        assert_eq!(registry.base_name_of("AnKing (AnKing / user)"), Some("AnKing"));
        assert_eq!(registry.base_name_of("AnKingOverhaul"), Some("AnKingOverhaul"));
        assert_eq!(registry.base_name_of("AnKingX"), None);
        assert_eq!(registry.base_name_of("Cloze"), None);
        assert!(registry.is_io_notetype("IO-one by one-abcde"));
        assert!(!registry.is_io_notetype("AnKing"));
    }

    #[test]
    fn test_tab_order() {
        let registry = SettingRegistry::build(&source()).unwrap();
        assert_eq!(
            registry.tab_order(),
            vec!["AnKingOverhaul", "AnKing", "Basic-AnKing", "IO-one by one", "AnKingOverlapping"]
        );
    }

    #[test]
    fn test_default_config_document_holds_general_defaults() {
        let registry = SettingRegistry::build(&source()).unwrap();
        let document = registry.default_config_document();

        assert_eq!(document["general"]["toggle_next_button"], serde_json::json!("H"));
        assert_eq!(document["general"]["timer_secs"], serde_json::json!(9));
        assert_eq!(document["general"]["back_tts_speed"], serde_json::json!(1.4));
        assert_eq!(document["general"]["user_action_8"], serde_json::json!("undefined"));
        assert_eq!(document["general"].as_object().unwrap().len(), catalog::GENERAL_SETTINGS.len());
    }

    #[test]
    fn test_field_order_and_grouping_helpers() {
        let registry = SettingRegistry::build(&source()).unwrap();
        let defs: Vec<&SettingDefinition> = ["autoreveal_missed_questions", "autoflip", "btn_shortcut_lecture_notes"]
            .iter()
            .filter_map(|name| registry.get(name))
            .collect();

        let ordered: Vec<&str> =
            registry.in_field_order(defs.clone(), "AnKingOverhaul").iter().map(|d| d.name()).collect();
        assert_eq!(ordered, vec!["autoflip", "btn_shortcut_lecture_notes", "autoreveal_missed_questions"]);

        let (groups, ungrouped) = grouped(&defs);
        assert_eq!(groups.len(), 1);
        assert_eq!(groups[0].0, "Hint Buttons");
        assert_eq!(ungrouped.iter().map(|d| d.name()).collect::<Vec<_>>(), vec!["autoflip"]);
    }

    #[test]
    fn test_button_shortcut_table() {
        assert_eq!(
            button_shortcuts_in(OVERHAUL_BACK),
            vec![
                ("Lecture Notes".to_string(), "Ctrl+Shift+L".to_string()),
                ("Missed Questions".to_string(), "Ctrl+Shift+M".to_string()),
            ]
        );
        assert!(button_shortcuts_in("no table").is_empty());
    }
}
