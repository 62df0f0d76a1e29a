use std::collections::BTreeMap;

use tracing::debug;

use crate::core::{
    NameId,
    NoteId,
    NotetypeError,
    NotetypeId,
    NotetypeTemplate,
};

/// Host-side storage of notetypes and their notes.
///
/// Writes are expected to commit before the next read; nothing beyond that
/// is assumed about atomicity.
pub trait NotetypeStore {
    fn get(&self, id: NotetypeId) -> Option<NotetypeTemplate>;

    fn get_by_name(&self, name: &str) -> Option<NotetypeTemplate>;

    fn all_names_and_ids(&self) -> Vec<NameId>;

    /// Replaces the stored notetype with the same id.
    ///
    /// Field `ord`s of `model` refer to the fields of the stored version:
    /// note content moves along with them and fields without an `ord` start
    /// empty.
    fn save_template(&mut self, model: &NotetypeTemplate) -> Result<(), NotetypeError>;

    /// Adds `model` as a new notetype and returns its id.
    fn create_template(&mut self, model: NotetypeTemplate) -> Result<NotetypeId, NotetypeError>;

    fn remove_template(&mut self, id: NotetypeId) -> Result<(), NotetypeError>;

    fn find_notes_by_type(&self, name: &str) -> Vec<NoteId>;

    /// Moves `note_ids` from notetype `from` to `to`.
    ///
    /// `field_map` maps a field index of `from` to a field index of `to`;
    /// unmapped target fields start empty.
    fn change_notetype(
        &mut self,
        from: NotetypeId,
        to: NotetypeId,
        note_ids: &[NoteId],
        field_map: &BTreeMap<usize, usize>,
    ) -> Result<(), NotetypeError>;
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Note {
    pub id: NoteId,
    pub notetype_id: NotetypeId,
    pub fields: Vec<String>,
}

/// A [`NotetypeStore`] kept entirely in memory.
#[derive(Debug, Clone, Default)]
pub struct MemoryNotetypeStore {
    notetypes: BTreeMap<NotetypeId, NotetypeTemplate>,
    notes: BTreeMap<NoteId, Note>,
    next_id: i64,
}

impl MemoryNotetypeStore {
    pub fn new() -> Self {
        Self { next_id: 1, ..Self::default() }
    }

    fn allocate_id(&mut self) -> i64 {
        self.next_id = self.next_id.max(1);
        let id = self.next_id;
        self.next_id += 1;
        id
    }

    pub fn add_note(&mut self, notetype_id: NotetypeId, fields: &[&str]) -> Result<NoteId, NotetypeError> {
        let field_count = self
            .notetypes
            .get(&notetype_id)
            .ok_or_else(|| NotetypeError::NotetypeNotFound(notetype_id.to_string()))?
            .fields
            .len();

        let mut values: Vec<String> = fields.iter().map(|f| f.to_string()).collect();
        values.resize(field_count, String::new());

        let id = self.allocate_id();
        self.notes.insert(id, Note { id, notetype_id, fields: values });
        Ok(id)
    }

    pub fn note(&self, id: NoteId) -> Option<&Note> {
        self.notes.get(&id)
    }

    /// Field contents of `id` keyed by field name.
    pub fn note_fields(&self, id: NoteId) -> Option<BTreeMap<String, String>> {
        let note = self.notes.get(&id)?;
        let notetype = self.notetypes.get(&note.notetype_id)?;
        Some(
            notetype
                .fields
                .iter()
                .zip(note.fields.iter())
                .map(|(field, value)| (field.name.clone(), value.clone()))
                .collect(),
        )
    }

    pub fn notetype_count(&self) -> usize {
        self.notetypes.len()
    }
}

/// Field ords are indices once the host has stored a notetype.
fn renumber_fields(model: &mut NotetypeTemplate) {
    for (i, field) in model.fields.iter_mut().enumerate() {
        field.ord = Some(i as u32);
    }
}

impl NotetypeStore for MemoryNotetypeStore {
    fn get(&self, id: NotetypeId) -> Option<NotetypeTemplate> {
        self.notetypes.get(&id).cloned()
    }

    fn get_by_name(&self, name: &str) -> Option<NotetypeTemplate> {
        self.notetypes.values().find(|nt| nt.name == name).cloned()
    }

    fn all_names_and_ids(&self) -> Vec<NameId> {
        self.notetypes.values().map(|nt| NameId { name: nt.name.clone(), id: nt.id }).collect()
    }

    fn save_template(&mut self, model: &NotetypeTemplate) -> Result<(), NotetypeError> {
        if !self.notetypes.contains_key(&model.id) {
            return Err(NotetypeError::NotetypeNotFound(model.name.clone()));
        }

        for note in self.notes.values_mut().filter(|n| n.notetype_id == model.id) {
            note.fields = model
                .fields
                .iter()
                .map(|field| {
                    field
                        .ord
                        .and_then(|ord| note.fields.get(ord as usize))
                        .cloned()
                        .unwrap_or_default()
                })
                .collect();
        }

        let mut stored = model.clone();
        renumber_fields(&mut stored);
        debug!("saved notetype {} ({})", stored.name, stored.id);
        self.notetypes.insert(stored.id, stored);
        Ok(())
    }

    fn create_template(&mut self, mut model: NotetypeTemplate) -> Result<NotetypeId, NotetypeError> {
        if model.id == 0 || self.notetypes.contains_key(&model.id) {
            model.id = self.allocate_id();
        } else {
            self.next_id = self.next_id.max(model.id + 1);
        }
        renumber_fields(&mut model);
        let id = model.id;
        debug!("created notetype {} ({})", model.name, id);
        self.notetypes.insert(id, model);
        Ok(id)
    }

    fn remove_template(&mut self, id: NotetypeId) -> Result<(), NotetypeError> {
        let removed = self.notetypes.remove(&id).ok_or_else(|| NotetypeError::NotetypeNotFound(id.to_string()))?;
        self.notes.retain(|_, note| note.notetype_id != id);
        debug!("removed notetype {} ({})", removed.name, id);
        Ok(())
    }

    fn find_notes_by_type(&self, name: &str) -> Vec<NoteId> {
        let Some(notetype) = self.get_by_name(name) else {
            return Vec::new();
        };
        self.notes.values().filter(|n| n.notetype_id == notetype.id).map(|n| n.id).collect()
    }

    fn change_notetype(
        &mut self,
        from: NotetypeId,
        to: NotetypeId,
        note_ids: &[NoteId],
        field_map: &BTreeMap<usize, usize>,
    ) -> Result<(), NotetypeError> {
        let target_len = self
            .notetypes
            .get(&to)
            .ok_or_else(|| NotetypeError::NotetypeNotFound(to.to_string()))?
            .fields
            .len();
        if !self.notetypes.contains_key(&from) {
            return Err(NotetypeError::NotetypeNotFound(from.to_string()));
        }

        for id in note_ids {
            let Some(note) = self.notes.get_mut(id) else {
                continue;
            };
            if note.notetype_id != from {
                continue;
            }

            let mut fields = vec![String::new(); target_len];
            for (old, new) in field_map {
                if let (Some(value), Some(slot)) = (note.fields.get(*old), fields.get_mut(*new)) {
                    *slot = value.clone();
                }
            }
            note.fields = fields;
            note.notetype_id = to;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::FieldSpec;

    fn store_with_basic() -> (MemoryNotetypeStore, NotetypeId) {
        let mut store = MemoryNotetypeStore::new();
        let id = store
            .create_template(NotetypeTemplate::new("AnKing", "{{Text}}", "{{Extra}}", "", &["Text", "Extra"]))
            .unwrap();
        (store, id)
    }

    #[test]
    fn test_save_moves_note_content_with_field_ords() {
        let (mut store, id) = store_with_basic();
        let note = store.add_note(id, &["front", "extra"]).unwrap();

        let mut model = store.get(id).unwrap();
        // swap the fields and add a new one
        model.fields = vec![
            FieldSpec::new("Extra", 1),
            FieldSpec::new("Text", 0),
            FieldSpec { name: "New".into(), ord: None },
        ];
        store.save_template(&model).unwrap();

        let fields = store.note_fields(note).unwrap();
        assert_eq!(fields["Text"], "front");
        assert_eq!(fields["Extra"], "extra");
        assert_eq!(fields["New"], "");
        assert_eq!(store.get(id).unwrap().fields[2].ord, Some(2));
    }

    #[test]
    fn test_change_notetype_uses_field_map() {
        let (mut store, base) = store_with_basic();
        let copy = store
            .create_template(NotetypeTemplate::new("AnKing-1dgs0", "", "", "", &["Text", "Extra"]))
            .unwrap();
        let note = store.add_note(copy, &["a", "b"]).unwrap();

        let notes = store.find_notes_by_type("AnKing-1dgs0");
        assert_eq!(notes, vec![note]);

        let identity = BTreeMap::from([(0, 0), (1, 1)]);
        store.change_notetype(copy, base, &notes, &identity).unwrap();
        assert_eq!(store.note(note).unwrap().notetype_id, base);
        assert_eq!(store.find_notes_by_type("AnKing"), vec![note]);
        assert_eq!(store.note_fields(note).unwrap()["Extra"], "b");
    }

    #[test]
    fn test_remove_drops_notes_and_unknown_ids_fail() {
        let (mut store, id) = store_with_basic();
        let note = store.add_note(id, &["x"]).unwrap();
        assert_eq!(store.note(note).unwrap().fields, vec!["x".to_string(), String::new()]);

        store.remove_template(id).unwrap();
        assert!(store.note(note).is_none());
        assert!(matches!(store.remove_template(id), Err(NotetypeError::NotetypeNotFound(_))));
        assert!(store.save_template(&NotetypeTemplate::new("Ghost", "", "", "", &[])).is_err());
    }

    #[test]
    fn test_create_assigns_fresh_ids() {
        let (mut store, first) = store_with_basic();
        let mut clash = NotetypeTemplate::new("Other", "", "", "", &[]);
        clash.id = first;
        let second = store.create_template(clash).unwrap();
        assert_ne!(first, second);
        assert_eq!(store.notetype_count(), 2);
    }
}
