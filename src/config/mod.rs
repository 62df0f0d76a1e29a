//! Nested key-value configuration with change hooks and general-scope broadcast.

use std::{
    collections::BTreeMap,
    fmt,
    path::Path,
};

use serde_json::{
    Map,
    Value,
};
use tracing::{
    debug,
    warn,
};

use crate::{
    core::NotetypeError,
    persistence,
    settings::SettingValue,
};

pub const CONFIG_FILE: &str = "config.json";

pub type ChangeHook = Box<dyn FnMut(&str, &Value)>;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct HookId(u64);

/// A JSON document addressed by dotted keys such as `general.timer_secs`.
///
/// Settings registered as general are broadcast: a notifying change of
/// `general.X` is written to `scope.X` for every scope registered for `X`.
/// Those scope writes fire the change hooks but never broadcast again.
pub struct ConfigStore {
    document: Map<String, Value>,
    hooks: Vec<(HookId, ChangeHook)>,
    next_hook_id: u64,
    general: BTreeMap<String, Vec<String>>,
}

impl fmt::Debug for ConfigStore {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ConfigStore")
            .field("document", &self.document)
            .field("hooks", &self.hooks.len())
            .field("general", &self.general)
            .finish()
    }
}

impl Default for ConfigStore {
    fn default() -> Self {
        Self::new()
    }
}

impl ConfigStore {
    pub fn new() -> Self {
        Self { document: Map::new(), hooks: Vec::new(), next_hook_id: 0, general: BTreeMap::new() }
    }

    pub fn from_document(document: Value) -> Result<Self, NotetypeError> {
        let mut store = Self::new();
        match document {
            Value::Object(map) => store.document = map,
            Value::Null => {}
            other => {
                return Err(NotetypeError::Custom(format!(
                    "configuration must be a JSON object, found {}",
                    other
                )))
            }
        }
        Ok(store)
    }

    pub fn from_json(json: &str) -> Result<Self, NotetypeError> {
        Self::from_document(serde_json::from_str(json)?)
    }

    pub fn to_json(&self) -> Result<String, NotetypeError> {
        Ok(serde_json::to_string(&self.document)?)
    }

    pub fn load(path: &Path) -> Result<Self, NotetypeError> {
        let document: Value = persistence::load_json_from(path)?;
        debug!("loaded configuration from {}", path.display());
        Self::from_document(document)
    }

    pub fn save(&self, path: &Path) -> Result<(), NotetypeError> {
        persistence::save_json_to(&self.document, path)
    }

    /// Loads the per-user configuration, starting empty if it is missing or unreadable.
    pub fn load_default() -> Self {
        let document: Value = persistence::load_json_or_default(CONFIG_FILE);
        Self::from_document(document).unwrap_or_else(|e| {
            warn!("ignoring stored configuration: {}", e);
            Self::new()
        })
    }

    pub fn save_default(&self) -> Result<(), NotetypeError> {
        persistence::save_json(&self.document, CONFIG_FILE)
    }

    pub fn get(&self, key: &str) -> Option<&Value> {
        let mut levels = key.split('.');
        let mut current = self.document.get(levels.next()?)?;
        for level in levels {
            current = current.as_object()?.get(level)?;
        }
        Some(current)
    }

    pub fn get_or(&self, key: &str, default: Value) -> Value {
        self.get(key).cloned().unwrap_or(default)
    }

    /// The value at `key` as a setting value, if it has one of the setting shapes.
    pub fn get_setting(&self, key: &str) -> Option<SettingValue> {
        self.get(key).and_then(SettingValue::from_json)
    }

    pub fn contains(&self, key: &str) -> bool {
        self.get(key).is_some()
    }

    /// Deep copy of the whole document.
    pub fn copy(&self) -> Value {
        Value::Object(self.document.clone())
    }

    pub fn scopes(&self) -> impl Iterator<Item = &str> {
        self.document.keys().map(String::as_str)
    }

    /// Writes `value` at `key`, creating missing levels.
    ///
    /// Returns whether the stored value changed. Hooks only run when it did
    /// and `notify` is set.
    pub fn set(&mut self, key: &str, value: Value, notify: bool) -> bool {
        self.write(key, value, notify, true)
    }

    fn write(&mut self, key: &str, value: Value, notify: bool, broadcast: bool) -> bool {
        let changed = self.store(key, value.clone());
        if !(notify && changed) {
            return changed;
        }

        for (_, hook) in self.hooks.iter_mut() {
            hook(key, &value);
        }

        if broadcast {
            if let Some(name) = key.strip_prefix("general.") {
                if let Some(scopes) = self.general.get(name).cloned() {
                    for scope in scopes {
                        self.write(&format!("{}.{}", scope, name), value.clone(), true, false);
                    }
                }
            }
        }
        changed
    }

    fn store(&mut self, key: &str, value: Value) -> bool {
        let levels: Vec<&str> = key.split('.').collect();
        let Some((last, parents)) = levels.split_last() else {
            return false;
        };

        let mut current = &mut self.document;
        for level in parents {
            let entry = current.entry(level.to_string()).or_insert_with(|| Value::Object(Map::new()));
            if !entry.is_object() {
                warn!("replacing non-object value at '{}' while setting {}", level, key);
                *entry = Value::Object(Map::new());
            }
            current = match entry {
                Value::Object(map) => map,
                _ => return false,
            };
        }

        let old = current.insert(last.to_string(), value.clone());
        old.as_ref() != Some(&value)
    }

    pub fn pop(&mut self, key: &str) -> Option<Value> {
        let levels: Vec<&str> = key.split('.').collect();
        let (last, parents) = levels.split_last()?;

        let mut current = &mut self.document;
        for level in parents {
            current = current.get_mut(*level)?.as_object_mut()?;
        }
        current.remove(*last)
    }

    /// Fills every key missing from this document with the one from `defaults`, without notifying.
    pub fn merge_defaults(&mut self, defaults: &Value) {
        fn merge(target: &mut Map<String, Value>, defaults: &Map<String, Value>) {
            for (key, default) in defaults {
                match (target.get_mut(key), default) {
                    (Some(Value::Object(existing)), Value::Object(nested)) => merge(existing, nested),
                    (Some(_), _) => {}
                    (None, _) => {
                        target.insert(key.clone(), default.clone());
                    }
                }
            }
        }

        if let Value::Object(defaults) = defaults {
            merge(&mut self.document, defaults);
        }
    }

    pub fn on_change(&mut self, hook: impl FnMut(&str, &Value) + 'static) -> HookId {
        let id = HookId(self.next_hook_id);
        self.next_hook_id += 1;
        self.hooks.push((id, Box::new(hook)));
        id
    }

    pub fn remove_on_change(&mut self, id: HookId) -> bool {
        let before = self.hooks.len();
        self.hooks.retain(|(hook_id, _)| *hook_id != id);
        self.hooks.len() != before
    }

    /// Registers `name` as general, broadcasting to `scopes`.
    pub fn register_general_setting(&mut self, name: &str, scopes: Vec<String>) {
        self.general.insert(name.to_string(), scopes);
    }

    pub fn unregister_general_setting(&mut self, name: &str) -> bool {
        self.general.remove(name).is_some()
    }

    pub fn general_scopes(&self, name: &str) -> &[String] {
        self.general.get(name).map(Vec::as_slice).unwrap_or(&[])
    }
}
