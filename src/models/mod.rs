pub mod collection;
pub mod export;
pub mod group;
pub mod snippet;
pub mod storage;

pub use collection::{Collection, Container};
pub use export::{ExportBundle, MergeStats, export_collection, import_bundle, merge_bundle};
pub use group::Group;
pub use snippet::{DEFAULT_COMMAND_SEPARATOR, Snippet, ValidationError};
pub use storage::{MemoryStore, PersistenceStore, StorageManager};
