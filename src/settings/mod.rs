pub mod catalog;

pub mod definition;

pub mod handlers;

pub mod locator;

pub mod order;

pub mod registry;

pub mod value;

pub use definition::{
    OrderPattern,
    SettingDefinition,
    SettingKind,
};
pub use locator::Section;
pub use order::merge_order;
pub use registry::SettingRegistry;
pub use value::SettingValue;

#[cfg(test)]
mod catalog_tests;
