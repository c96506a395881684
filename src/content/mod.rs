//! Content types and the generic action layer that manages them.

pub mod actions;
pub mod error;
pub mod kind;
pub mod settings;
pub mod validate;

pub use actions::{ContentActions, ListView};
pub use error::ContentError;
pub use kind::{ContentKind, ContentSpec, FieldType, KeyStyle, UnknownKind};
pub use settings::SiteSettings;
