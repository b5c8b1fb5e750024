//! YAML-backed configuration and profile storage.
//!
//! Values are validated on every load and every save, so an invalid level pack or a hand-edited
//! profile is rejected before it reaches a game session.

mod config_content_provider;
mod config_serializer;
mod config_store;
mod validate;

pub use config_content_provider::{ConfigContentProvider, FileContentConfigProvider, MemoryContentProvider};
pub use config_serializer::{ConfigSerializer, YamlConfigSerializer};
pub use config_store::ConfigStore;
pub use validate::Validate;
