//! Collapsing host-made copies (`{base}-XXXXX`) back into their base notetype.

use std::collections::BTreeMap;

use tracing::{
    info,
    warn,
};

use super::reconcile_fields;
use crate::{
    anki::{
        notetype_copies,
        NotetypeStore,
    },
    core::{
        tasks::{
            spawn_backup,
            Backup,
            TaskHandle,
        },
        NameId,
        NotetypeError,
        NotetypeTemplate,
        USN_NEEDS_FULL_SYNC,
    },
    settings::SettingRegistry,
};

/// Installed copies of every packaged base notetype that is itself installed.
pub fn copies_by_base(
    store: &dyn NotetypeStore,
    registry: &SettingRegistry,
) -> Result<BTreeMap<String, Vec<NameId>>, NotetypeError> {
    let mut result = BTreeMap::new();
    for base_name in registry.base_names() {
        if store.get_by_name(base_name).is_none() {
            continue;
        }
        let copies = notetype_copies(store, base_name)?;
        if !copies.is_empty() {
            result.insert(base_name.clone(), copies);
        }
    }
    Ok(result)
}

/// Backs the collection up on a worker thread, then merges every copy into
/// its base notetype. Returns the number of copies removed.
pub fn convert_extra_versions(
    store: &mut dyn NotetypeStore,
    registry: &SettingRegistry,
    backup: impl Backup,
) -> Result<usize, NotetypeError> {
    convert_after_backup(spawn_backup(backup), store, registry)
}

/// Waits for `backup` and only touches `store` once it succeeded.
pub fn convert_after_backup(
    backup: TaskHandle,
    store: &mut dyn NotetypeStore,
    registry: &SettingRegistry,
) -> Result<usize, NotetypeError> {
    if let Err(e) = backup.wait() {
        warn!("not converting notetype copies, backup failed: {}", e);
        return Err(e);
    }

    let mut converted = 0;
    for (base_name, copies) in copies_by_base(store, registry)? {
        let base = store
            .get_by_name(&base_name)
            .ok_or_else(|| NotetypeError::NotetypeNotFound(base_name.clone()))?;
        for copy in copies {
            merge_copy(store, &base, &copy)?;
            converted += 1;
        }
    }
    info!("converted {} notetype copies", converted);
    Ok(converted)
}

fn merge_copy(store: &mut dyn NotetypeStore, base: &NotetypeTemplate, copy: &NameId) -> Result<(), NotetypeError> {
    let installed = store.get(copy.id).ok_or_else(|| NotetypeError::NotetypeNotFound(copy.name.clone()))?;

    let mut aligned = base.clone();
    aligned.id = installed.id;
    aligned.name = installed.name.clone();
    aligned.usn = USN_NEEDS_FULL_SYNC;
    aligned.mtime_secs = chrono::Utc::now().timestamp();
    aligned.fields = reconcile_fields(&installed.fields, &base.fields);
    store.save_template(&aligned)?;

    let field_map = field_map_by_name(&aligned, base);
    let notes = store.find_notes_by_type(&copy.name);
    store.change_notetype(copy.id, base.id, &notes, &field_map)?;
    store.remove_template(copy.id)?;

    info!("moved {} notes from {} to {}", notes.len(), copy.name, base.name);
    Ok(())
}

/// Field index in `from` to the index of the same-named field in `to`.
///
/// After alignment this is the identity over the base fields, except that
/// the sentinel can sit behind fields only the copy had.
fn field_map_by_name(from: &NotetypeTemplate, to: &NotetypeTemplate) -> BTreeMap<usize, usize> {
    from.fields
        .iter()
        .enumerate()
        .filter_map(|(i, field)| {
            to.fields
                .iter()
                .position(|f| f.name.to_lowercase() == field.name.to_lowercase())
                .map(|j| (i, j))
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use std::sync::{
        atomic::{
            AtomicBool,
            Ordering,
        },
        Arc,
    };

    use super::*;
    use crate::{
        anki::MemoryNotetypeStore,
        templates::MemoryTemplateSource,
    };

    fn backup_ok() -> Result<(), NotetypeError> {
        Ok(())
    }

    fn setup() -> (MemoryNotetypeStore, SettingRegistry, i64, i64) {
        let packaged = NotetypeTemplate::new("AnKing", "{{Text}}", "{{Extra}}", "", &["Text", "Extra"]);
        let registry = SettingRegistry::build(&MemoryTemplateSource::new().with(packaged.clone())).unwrap();

        let mut store = MemoryNotetypeStore::new();
        let base = store.create_template(packaged).unwrap();
        let copy = store
            .create_template(NotetypeTemplate::new("AnKing-1dgs0", "old", "old", "", &["Extra", "Text"]))
            .unwrap();
        store.create_template(NotetypeTemplate::new("AnKing (Step / user)", "", "", "", &["Text"])).unwrap();
        (store, registry, base, copy)
    }

    #[test]
    fn test_copies_are_merged_into_base() {
        let (mut store, registry, base, copy) = setup();
        let note = store.add_note(copy, &["extra", "text"]).unwrap();

        let found = copies_by_base(&store, &registry).unwrap();
        assert_eq!(found["AnKing"].len(), 1);

        let converted = convert_extra_versions(&mut store, &registry, backup_ok).unwrap();
        assert_eq!(converted, 1);

        assert!(store.get(copy).is_none());
        assert_eq!(store.note(note).unwrap().notetype_id, base);
        let fields = store.note_fields(note).unwrap();
        assert_eq!(fields["Text"], "text");
        assert_eq!(fields["Extra"], "extra");

        // forks are left alone
        assert!(store.get_by_name("AnKing (Step / user)").is_some());
        assert!(copies_by_base(&store, &registry).unwrap().is_empty());
    }

    #[test]
    fn test_failed_backup_leaves_store_untouched() {
        let (mut store, registry, _, copy) = setup();
        let note = store.add_note(copy, &["extra", "text"]).unwrap();
        let before = store.clone();

        let result = convert_extra_versions(&mut store, &registry, || -> Result<(), NotetypeError> {
            Err(NotetypeError::Backup("no space".into()))
        });
        assert!(matches!(result, Err(NotetypeError::Backup(_))));
        assert_eq!(store.get(copy), before.get(copy));
        assert_eq!(store.note(note), before.note(note));
        assert_eq!(store.notetype_count(), before.notetype_count());
    }

    #[test]
    fn test_conversion_waits_for_backup() {
        let (mut store, registry, _, _) = setup();
        let backed_up = Arc::new(AtomicBool::new(false));
        let flag = backed_up.clone();

        let handle = spawn_backup(move || -> Result<(), NotetypeError> {
            flag.store(true, Ordering::SeqCst);
            Ok(())
        });
        convert_after_backup(handle, &mut store, &registry).unwrap();
        assert!(backed_up.load(Ordering::SeqCst));
    }

    #[test]
    fn test_copies_without_installed_base_are_skipped() {
        let registry = SettingRegistry::build(
            &MemoryTemplateSource::new().with(NotetypeTemplate::new("AnKing", "", "", "", &["Text"])),
        )
        .unwrap();
        let mut store = MemoryNotetypeStore::new();
        store.create_template(NotetypeTemplate::new("AnKing-abcde", "", "", "", &["Text"])).unwrap();

        assert_eq!(convert_extra_versions(&mut store, &registry, backup_ok).unwrap(), 0);
        assert_eq!(store.notetype_count(), 1);
    }
}
