use regex::Regex;

use crate::core::{
    constants::{
        imported_fork_pattern,
        notetype_copy_pattern,
    },
    NameId,
    NotetypeError,
    NotetypeTemplate,
};

pub mod store;

pub use store::{
    MemoryNotetypeStore,
    Note,
    NotetypeStore,
};

/// Installed notetypes that are versions of `base_name`.
///
/// That is the base itself, copies named `{base}-XXXXX` and imported forks
/// named `{base} (x / y)`.
pub fn note_type_versions(
    store: &dyn NotetypeStore,
    base_name: &str,
) -> Result<Vec<NotetypeTemplate>, NotetypeError> {
    let copy_re = Regex::new(&notetype_copy_pattern(base_name))?;
    let fork_re = Regex::new(&imported_fork_pattern(base_name))?;

    Ok(store
        .all_names_and_ids()
        .into_iter()
        .filter(|x| x.name == base_name || copy_re.is_match(&x.name) || fork_re.is_match(&x.name))
        .filter_map(|x| store.get(x.id))
        .collect())
}

/// The version with the shortest name, ties broken alphabetically.
///
/// This is a naming convention, copies and forks append to the base name,
/// not a guarantee that the result is the original notetype.
pub fn most_basic_version(
    store: &dyn NotetypeStore,
    base_name: &str,
) -> Result<Option<NotetypeTemplate>, NotetypeError> {
    Ok(note_type_versions(store, base_name)?
        .into_iter()
        .min_by(|a, b| (a.name.len(), &a.name).cmp(&(b.name.len(), &b.name))))
}

/// Copies of `base_name` the host created on import, excluding forks.
pub fn notetype_copies(store: &dyn NotetypeStore, base_name: &str) -> Result<Vec<NameId>, NotetypeError> {
    let copy_re = Regex::new(&notetype_copy_pattern(base_name))?;
    Ok(store.all_names_and_ids().into_iter().filter(|x| copy_re.is_match(&x.name)).collect())
}
