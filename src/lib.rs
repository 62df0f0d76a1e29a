pub mod anki;
pub mod config;
pub mod core;
pub mod persistence;
pub mod preview;
pub mod session;
pub mod settings;
pub mod templates;
pub mod upgrade;

pub use crate::{
    anki::{
        MemoryNotetypeStore,
        NotetypeStore,
    },
    config::ConfigStore,
    core::{
        FileRef,
        NotetypeError,
        NotetypeTemplate,
        ParseReport,
        SettingError,
    },
    preview::PreviewSurface,
    session::ConfigSession,
    settings::{
        SettingDefinition,
        SettingRegistry,
        SettingValue,
    },
    templates::{
        DirectoryTemplateSource,
        MemoryTemplateSource,
        TemplateSource,
    },
};
