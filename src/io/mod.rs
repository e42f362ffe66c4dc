//! I/O modules: background page loading and the in-memory collection.

pub mod collection_loader;
pub mod virtual_collection;

// Re-export commonly used types
pub use collection_loader::{load_range, CollectionLoader, LoadResult};
pub use virtual_collection::{
    generate_assets, CollectionFixture, MutationGate, VirtualAsset, VirtualCollection,
    DOWNLOAD_FILE_NAME,
};
