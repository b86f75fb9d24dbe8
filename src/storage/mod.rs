pub mod backend;
pub mod models;

pub use backend::{ClickStore, ConnectionDescriptor, InitOutcome, InitState, StoreKind};
pub use models::{ClickEvent, LinkClickCount, StorageConfig};
