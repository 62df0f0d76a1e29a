//! Upgrading installed notetypes to the newest packaged version.
//!
//! An upgrade takes the packaged texts and fields but keeps the installed
//! notetype's identity, the note content of every field (matched by name),
//! the configured setting values and two user-protected regions of every
//! text: the modification snippet and everything below the end comment.

use regex::Regex;
use tracing::{
    info,
    warn,
};

use crate::{
    anki::{
        note_type_versions,
        NotetypeStore,
    },
    config::ConfigStore,
    core::{
        constants::{
            CSS_END_COMMENT,
            CSS_END_COMMENT_RE,
            CSS_SNIPPET_RE,
            HTML_END_COMMENT,
            HTML_END_COMMENT_RE,
            HTML_SNIPPET_RE,
            SENTINEL_FIELD_NAME,
        },
        FieldSpec,
        FileRef,
        NotetypeError,
        NotetypeTemplate,
        ParseReport,
        USN_NEEDS_FULL_SYNC,
    },
    settings::{
        SettingDefinition,
        SettingRegistry,
    },
    templates::{
        has_update,
        TemplateSource,
    },
};

pub mod copies;


/// Returns `packaged` carrying the identity, field content mapping and
/// protected regions of `installed`.
///
/// Settings are not restored here, see [`upgrade_and_restore`].
pub fn upgrade_notetype(
    installed: &NotetypeTemplate,
    packaged: &NotetypeTemplate,
) -> Result<NotetypeTemplate, NotetypeError> {
    let mut upgraded = packaged.clone();
    upgraded.id = installed.id;
    upgraded.name = installed.name.clone();
    upgraded.usn = USN_NEEDS_FULL_SYNC;
    upgraded.mtime_secs = chrono::Utc::now().timestamp();
    upgraded.fields = reconcile_fields(&installed.fields, &packaged.fields);

    for file in FileRef::ALL {
        let text = retain_protected_regions(installed.text(file)?, packaged.text(file)?, file);
        upgraded.set_text(file, text)?;
    }
    Ok(upgraded)
}

/// Field list of the new version with ords pointing at the installed fields.
///
/// A new field named like an installed one (ignoring case) takes its ord so
/// existing note content stays in it. Other new fields get ords past the end
/// of the installed list and start empty. Installed fields the new version
/// lacks are appended with their ords, and the sentinel field stays last.
pub fn reconcile_fields(installed: &[FieldSpec], new: &[FieldSpec]) -> Vec<FieldSpec> {
    let installed_ord = |i: usize, field: &FieldSpec| field.ord.unwrap_or(i as u32);
    let find_installed = |name: &str| {
        installed.iter().enumerate().find(|(_, f)| f.name.to_lowercase() == name.to_lowercase())
    };

    let mut next_new_ord = installed.len() as u32;
    let mut result: Vec<FieldSpec> = Vec::with_capacity(installed.len().max(new.len()));
    for field in new {
        let ord = match find_installed(&field.name) {
            Some((i, old)) => installed_ord(i, old),
            None => {
                let ord = next_new_ord;
                next_new_ord += 1;
                ord
            }
        };
        result.push(FieldSpec { name: field.name.clone(), ord: Some(ord) });
    }

    for (i, old) in installed.iter().enumerate() {
        let kept = result.iter().any(|f| f.name.to_lowercase() == old.name.to_lowercase());
        if !kept {
            result.push(FieldSpec { name: old.name.clone(), ord: Some(installed_ord(i, old)) });
        }
    }

    if let Some(i) = result.iter().position(|f| f.name == SENTINEL_FIELD_NAME) {
        let sentinel = result.remove(i);
        result.push(sentinel);
    }
    result
}

fn protected_patterns(file: FileRef) -> (&'static Regex, &'static Regex, &'static str) {
    if file.is_html() {
        (&*HTML_SNIPPET_RE, &*HTML_END_COMMENT_RE, HTML_END_COMMENT)
    } else {
        (&*CSS_SNIPPET_RE, &*CSS_END_COMMENT_RE, CSS_END_COMMENT)
    }
}

/// New text followed by the installed snippet and end comment region.
///
/// The snippet is only looked for above the end comment, anything below it
/// is carried over as part of the protected tail. Without an end comment in
/// the installed text a fresh one is appended.
pub fn retain_protected_regions(installed: &str, packaged: &str, file: FileRef) -> String {
    let (snippet_re, end_re, end_comment) = protected_patterns(file);

    // a packaged text never brings its own protected tail
    let packaged = match end_re.find(packaged) {
        Some(m) => &packaged[..m.start()],
        None => packaged,
    };
    let mut result = packaged.trim_end_matches(['\n', ' ']).to_string();

    let tail = end_re.find(installed);
    let above_tail = match &tail {
        Some(m) => &installed[..m.start()],
        None => installed,
    };
    if let Some(snippet) = snippet_re.find(above_tail) {
        result.push_str("\n\n");
        result.push_str(snippet.as_str());
    }

    result.push_str("\n\n");
    match tail {
        Some(m) => result.push_str(m.as_str()),
        None => {
            result.push_str(end_comment);
            result.push_str("\n\n");
        }
    }
    result
}

/// Applies the configured value of every definition present in `model`.
///
/// Failures are collected per setting; the settings that succeed are kept.
pub fn apply_settings<'a>(
    model: &mut NotetypeTemplate,
    scope: &str,
    definitions: impl IntoIterator<Item = &'a SettingDefinition>,
    config: &ConfigStore,
) -> ParseReport {
    let mut report = ParseReport::new();
    for def in definitions {
        match def.updated_model(model, scope, config) {
            Ok(updated) => *model = updated,
            Err(e) => report.push(&model.name, e),
        }
    }
    if !report.is_empty() {
        warn!("failed parsing {}:\n{}", model.name, report);
    }
    report
}

/// Upgrades `installed` to the newest packaged version, re-applies its
/// settings from `config` and writes it to `store`.
pub fn upgrade_and_restore(
    store: &mut dyn NotetypeStore,
    source: &dyn TemplateSource,
    registry: &SettingRegistry,
    config: &ConfigStore,
    installed: &NotetypeTemplate,
) -> Result<(NotetypeTemplate, ParseReport), NotetypeError> {
    let base_name = registry
        .base_name_of(&installed.name)
        .ok_or_else(|| NotetypeError::UnknownBaseNotetype(installed.name.clone()))?;
    let packaged = source.load(base_name)?;

    let mut upgraded = upgrade_notetype(installed, &packaged)?;
    let definitions = registry.definitions_for_model(&upgraded);
    let report = apply_settings(&mut upgraded, base_name, definitions, config);

    store.save_template(&upgraded)?;
    info!("upgraded {} to the newest {} version", upgraded.name, base_name);
    Ok((upgraded, report))
}

/// Installed versions of every packaged notetype whose version tag differs
/// from the packaged one.
pub fn models_with_available_updates(
    store: &dyn NotetypeStore,
    source: &dyn TemplateSource,
    registry: &SettingRegistry,
) -> Result<Vec<NotetypeTemplate>, NotetypeError> {
    let mut outdated = Vec::new();
    for base_name in registry.base_names() {
        let versions = note_type_versions(store, base_name)?;
        if versions.is_empty() {
            continue;
        }
        let packaged = source.load(base_name)?;
        outdated.extend(versions.into_iter().filter(|model| has_update(model, &packaged)));
    }
    Ok(outdated)
}

/// Upgrades every outdated installed notetype, keeping settings.
pub fn update_all_notetypes(
    store: &mut dyn NotetypeStore,
    source: &dyn TemplateSource,
    registry: &SettingRegistry,
    config: &ConfigStore,
) -> Result<(Vec<NotetypeTemplate>, ParseReport), NotetypeError> {
    let outdated = models_with_available_updates(store, source, registry)?;
    let mut updated = Vec::with_capacity(outdated.len());
    let mut report = ParseReport::new();

    for model in &outdated {
        let (upgraded, failures) = upgrade_and_restore(store, source, registry, config, model)?;
        report.extend(failures);
        updated.push(upgraded);
    }
    info!("updated {} notetypes", updated.len());
    Ok((updated, report))
}
