pub mod constants;
pub mod errors;
pub mod models;
pub mod tasks;

pub use errors::{
    NotetypeError,
    ParseReport,
    SettingError,
};
pub use models::{
    CardTemplate,
    FieldSpec,
    FileRef,
    NameId,
    NoteId,
    NotetypeId,
    NotetypeTemplate,
    USN_NEEDS_FULL_SYNC,
};
