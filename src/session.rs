//! A configuration session: one open settings surface and the state behind it.
//!
//! The caller owns the session and keeps at most one open. Everything the
//! settings window did through module globals goes through here instead.

use std::{
    cell::RefCell,
    collections::BTreeMap,
    rc::Rc,
};

use tracing::{
    debug,
    info,
    warn,
};

use crate::{
    anki::{
        most_basic_version,
        note_type_versions,
        NotetypeStore,
    },
    config::{
        ConfigStore,
        HookId,
    },
    core::{
        NotetypeError,
        NotetypeId,
        NotetypeTemplate,
        ParseReport,
        SettingError,
    },
    preview::{
        self,
        PreviewSurface,
    },
    settings::{
        registry::GENERAL_SCOPE,
        SettingRegistry,
        SettingValue,
    },
    templates::TemplateSource,
    upgrade::{
        self,
        apply_settings,
        upgrade_notetype,
    },
};

pub struct ConfigSession {
    source: Box<dyn TemplateSource>,
    registry: SettingRegistry,
    config: ConfigStore,
    preview: Option<Box<dyn PreviewSurface>>,
    changed_keys: Rc<RefCell<Vec<String>>>,
    preview_hook: Option<HookId>,
}

impl ConfigSession {
    /// Opens a session over the packaged templates of `source`.
    ///
    /// A general setting broadcasts into the scope of every base notetype
    /// whose packaged templates define it. With a `preview` attached,
    /// per-notetype changes are applied to the previewed model as they are
    /// made.
    pub fn open(
        source: Box<dyn TemplateSource>,
        mut config: ConfigStore,
        preview: Option<Box<dyn PreviewSurface>>,
    ) -> Result<Self, NotetypeError> {
        let registry = SettingRegistry::build(source.as_ref())?;
        config.merge_defaults(&registry.default_config_document());

        let mut packaged = Vec::new();
        for base_name in registry.base_names() {
            packaged.push((base_name.clone(), source.load(base_name)?));
        }
        for def in registry.general_definitions() {
            let scopes = packaged
                .iter()
                .filter(|(_, model)| def.is_present(model))
                .map(|(base_name, _)| base_name.clone())
                .collect();
            config.register_general_setting(def.name(), scopes);
        }

        let changed_keys = Rc::new(RefCell::new(Vec::new()));
        let preview_hook = preview.as_ref().map(|_| {
            let sink = changed_keys.clone();
            config.on_change(move |key, _| sink.borrow_mut().push(key.to_string()))
        });

        Ok(Self { source, registry, config, preview, changed_keys, preview_hook })
    }

    pub fn registry(&self) -> &SettingRegistry {
        &self.registry
    }

    pub fn config(&self) -> &ConfigStore {
        &self.config
    }

    pub fn preview(&self) -> Option<&dyn PreviewSurface> {
        self.preview.as_deref()
    }

    pub fn value(&self, key: &str) -> Option<SettingValue> {
        self.config.get_setting(key)
    }

    /// Sets `scope.name` as a widget edit would, checking the value's shape
    /// against the setting's kind.
    ///
    /// Returns the failures of applying the change to the preview, if any.
    pub fn set_value(&mut self, key: &str, value: impl Into<SettingValue>) -> Result<ParseReport, SettingError> {
        let value = value.into();
        let (_, name) = key.split_once('.').ok_or_else(|| SettingError::UnknownSetting(key.to_string()))?;
        let def = self.registry.get(name).ok_or_else(|| SettingError::UnknownSetting(name.to_string()))?;
        if !def.kind().accepts(&value) {
            return Err(SettingError::InvalidValue {
                setting: name.to_string(),
                expected: def.kind().tag().to_string(),
                found: value.to_string(),
            });
        }

        self.config.set(key, value.to_json(), true);
        Ok(self.flush_preview())
    }

    /// Re-applies every setting changed since the last flush to the preview
    /// model, when the change is scoped to the previewed notetype.
    pub fn flush_preview(&mut self) -> ParseReport {
        let keys: Vec<String> = self.changed_keys.borrow_mut().drain(..).collect();
        let mut report = ParseReport::new();
        let Some(surface) = self.preview.as_mut() else {
            return report;
        };

        let mut applied = false;
        for key in keys {
            let Some((scope, name)) = key.split_once('.') else {
                continue;
            };
            let model = surface.current_model();
            if self.registry.base_name_of(&model.name) != Some(scope) {
                continue;
            }
            let Some(def) = self.registry.get(name) else {
                continue;
            };
            // broadcast general values reach notetypes without the setting
            if !def.is_present(model) {
                continue;
            }

            match def.updated_model(model, scope, &self.config) {
                Ok(updated) => {
                    *surface.current_model_mut() = updated;
                    applied = true;
                }
                Err(e) => report.push(&surface.current_model().name, e),
            }
        }

        if applied {
            preview::refresh(&mut **surface);
        }
        if !report.is_empty() {
            warn!("failed parsing {}:\n{}", surface.current_model().name, report);
        }
        report
    }

    /// Reads the current values of the installed notetypes into the config.
    pub fn read_in_settings(&mut self, store: &dyn NotetypeStore) -> Result<ParseReport, NotetypeError> {
        let report = self.read_in_notetype_settings(store)?;
        self.read_in_general_settings(store)?;
        Ok(report)
    }

    /// Per-notetype values from the most basic installed version of every
    /// base notetype, or from the preview model when it is a version of it.
    pub fn read_in_notetype_settings(&mut self, store: &dyn NotetypeStore) -> Result<ParseReport, NotetypeError> {
        let mut report = ParseReport::new();
        for base_name in self.registry.base_names().to_vec() {
            report.extend(self.read_in_scope(store, &base_name)?);
        }
        if !report.is_empty() {
            warn!("{}", report);
        }
        Ok(report)
    }

    fn read_in_scope(&mut self, store: &dyn NotetypeStore, base_name: &str) -> Result<ParseReport, NotetypeError> {
        let mut report = ParseReport::new();
        let Some(model) = self.source_model(store, base_name)? else {
            return Ok(report);
        };

        for def in self.registry.definitions_for_model(&model) {
            match def.extract(&model) {
                Ok(value) => {
                    self.config.set(&def.key(base_name), value.to_json(), false);
                }
                Err(e) => report.push(base_name, e),
            }
        }
        debug!("read in settings of {} from {}", base_name, model.name);
        Ok(report)
    }

    fn source_model(
        &self,
        store: &dyn NotetypeStore,
        base_name: &str,
    ) -> Result<Option<NotetypeTemplate>, NotetypeError> {
        if let Some(surface) = &self.preview {
            let model = surface.current_model();
            if self.registry.base_name_of(&model.name) == Some(base_name) {
                return Ok(Some(model.clone()));
            }
        }
        most_basic_version(store, base_name)
    }

    /// General values: the defaults, replaced by the installed value where
    /// every notetype having the setting agrees on it.
    pub fn read_in_general_settings(&mut self, store: &dyn NotetypeStore) -> Result<(), NotetypeError> {
        for (name, value) in self.registry.general_defaults() {
            self.config.set(&general_key(&name), value.to_json(), false);
        }

        let mut models = Vec::new();
        for base_name in self.registry.base_names() {
            if let Some(model) = most_basic_version(store, base_name)? {
                models.push(model);
            }
        }

        let mut common: BTreeMap<String, SettingValue> = BTreeMap::new();
        for def in self.registry.general_definitions() {
            let values: Result<Vec<SettingValue>, SettingError> =
                models.iter().filter(|m| def.is_present(m)).map(|m| def.extract(m)).collect();
            let Ok(values) = values else {
                continue;
            };
            if let Some((first, rest)) = values.split_first() {
                if rest.iter().all(|v| v == first) {
                    common.insert(def.name().to_string(), first.clone());
                }
            }
        }

        for (name, value) in common {
            self.config.set(&general_key(&name), value.to_json(), false);
        }
        Ok(())
    }

    /// Writes the configured values into every installed version of every
    /// base notetype.
    pub fn apply_all(&mut self, store: &mut dyn NotetypeStore) -> Result<ParseReport, NotetypeError> {
        let mut report = ParseReport::new();
        let mut saved = 0;
        for base_name in self.registry.base_names() {
            for mut model in note_type_versions(store, base_name)? {
                let definitions = self.registry.definitions_for_model(&model);
                report.extend(apply_settings(&mut model, base_name, definitions, &self.config));
                store.save_template(&model)?;
                saved += 1;
            }
        }
        info!("applied settings to {} notetypes", saved);
        Ok(report)
    }

    /// Resets every version of `model_name`'s base notetype to the packaged
    /// texts, dropping its settings, and reads the packaged values back in.
    pub fn reset_notetype(
        &mut self,
        store: &mut dyn NotetypeStore,
        model_name: &str,
    ) -> Result<ParseReport, NotetypeError> {
        let base_name = self
            .registry
            .base_name_of(model_name)
            .ok_or_else(|| NotetypeError::UnknownBaseNotetype(model_name.to_string()))?
            .to_string();
        let packaged = self.source.load(&base_name)?;

        for version in note_type_versions(store, &base_name)? {
            let reset = upgrade_notetype(&version, &packaged)?;
            store.save_template(&reset)?;
            self.show_if_previewed(&reset);
        }
        info!("reset notetype {}", base_name);
        self.read_in_scope(store, &base_name)
    }

    /// Writes the general defaults into the general scope and into every
    /// installed base notetype scope that has the setting, then saves all
    /// notetypes.
    pub fn reset_general_settings(&mut self, store: &mut dyn NotetypeStore) -> Result<ParseReport, NotetypeError> {
        for (name, value) in self.registry.general_defaults() {
            self.config.set(&general_key(&name), value.to_json(), false);
            for scope in self.config.general_scopes(&name).to_vec() {
                if most_basic_version(store, &scope)?.is_some() {
                    self.config.set(&format!("{}.{}", scope, name), value.to_json(), false);
                }
            }
        }
        self.apply_all(store)
    }

    /// Upgrades every outdated installed notetype, keeping its settings.
    pub fn update_all_notetypes(
        &mut self,
        store: &mut dyn NotetypeStore,
    ) -> Result<(Vec<NotetypeTemplate>, ParseReport), NotetypeError> {
        let (updated, report) =
            upgrade::update_all_notetypes(store, self.source.as_ref(), &self.registry, &self.config)?;
        for model in &updated {
            self.show_if_previewed(model);
        }
        Ok((updated, report))
    }

    /// Adds the packaged version of `base_name` to the store as a new notetype.
    pub fn import_notetype(
        &mut self,
        store: &mut dyn NotetypeStore,
        base_name: &str,
    ) -> Result<NotetypeId, NotetypeError> {
        let mut model = self.source.load(base_name)?;
        model.id = 0;
        let id = store.create_template(model)?;
        info!("imported notetype {}", base_name);
        self.read_in_scope(store, base_name)?;
        Ok(id)
    }

    fn show_if_previewed(&mut self, model: &NotetypeTemplate) {
        if let Some(surface) = self.preview.as_mut() {
            if surface.current_model().name == model.name {
                preview::show_model(&mut **surface, model.clone());
            }
        }
    }

    /// Ends the session, returning the configuration without session hooks.
    pub fn close(mut self) -> ConfigStore {
        if let Some(id) = self.preview_hook.take() {
            self.config.remove_on_change(id);
        }
        for def in self.registry.general_definitions() {
            self.config.unregister_general_setting(def.name());
        }
        self.config
    }
}

fn general_key(name: &str) -> String {
    format!("{}.{}", GENERAL_SCOPE, name)
}
