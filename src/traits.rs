use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::dispatch::{GroupTarget, TagOps};

/// Type alias for item IDs (opaque asset identifiers from the collection service)
pub type ItemId = u64;

/// Identifies one collection view (the query the current page was loaded with).
///
/// Navigating from one query to a different one resets selection state; loading
/// further pages of the same query keeps it.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(default)]
pub struct ViewQuery {
    /// Restrict to one folder
    pub folder_id: Option<u64>,
    /// Restrict to one asset type ("image", "video", ...)
    pub asset_type: Option<String>,
    /// Free-text search
    pub search: Option<String>,
    /// Whether the search is semantic (AI) rather than keyword
    pub ai_search: bool,
    /// Show soft-deleted items instead of live ones
    pub trash: bool,
}

impl ViewQuery {
    /// The unfiltered library view.
    pub fn library() -> Self {
        Self::default()
    }

    /// The trash (soft-deleted items) view.
    pub fn trash() -> Self {
        Self {
            trash: true,
            ..Self::default()
        }
    }
}

/// One page of the ordered Item Index as returned by the collection service.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CollectionPage {
    /// Item IDs in display order
    pub items: Vec<ItemId>,
    /// Total number of items matching the query (all pages)
    pub total: usize,
    /// 1-based page number
    pub page: u32,
    /// Whether another page can be requested
    pub has_more: bool,
}

/// Aggregate result of a server-side batch endpoint.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct BatchOperationResult {
    pub total: usize,
    pub success: usize,
    pub failed: usize,
    pub failed_ids: Vec<ItemId>,
    pub message: String,
}

impl BatchOperationResult {
    /// A result reporting that every requested id succeeded.
    pub fn all_ok(count: usize) -> Self {
        Self {
            total: count,
            success: count,
            failed: 0,
            failed_ids: Vec::new(),
            message: String::new(),
        }
    }
}

/// Archive produced by a batch download.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DownloadArchive {
    pub file_name: String,
    pub bytes: Vec<u8>,
}

/// Collaborator that supplies the ordered Item Index for a view.
#[async_trait]
pub trait CollectionSource: Send + Sync {
    /// Loads one page of item IDs in display order.
    ///
    /// # Arguments
    /// * `query` - The view being browsed
    /// * `page` - 1-based page number
    /// * `page_size` - Maximum number of items in the page
    async fn load_page(&self, query: &ViewQuery, page: u32, page_size: u32) -> anyhow::Result<CollectionPage>;
}

/// Collaborator that applies bulk mutations on the asset service.
///
/// Every method receives the ids captured when the batch was prepared. Methods
/// backed by a server batch endpoint return its aggregate result; `move_to_vault`
/// is a per-item endpoint and is fanned out by the dispatcher.
#[async_trait]
pub trait MutationService: Send + Sync {
    /// Soft-deletes the items (moves them to trash).
    async fn delete(&self, ids: &[ItemId]) -> anyhow::Result<BatchOperationResult>;

    /// Restores soft-deleted items.
    async fn restore(&self, ids: &[ItemId]) -> anyhow::Result<BatchOperationResult>;

    /// Moves the items into a folder (`None` = library root).
    async fn move_to_folder(&self, ids: &[ItemId], folder_id: Option<u64>) -> anyhow::Result<BatchOperationResult>;

    /// Adds and removes tags on every item.
    async fn update_tags(&self, ids: &[ItemId], ops: &TagOps) -> anyhow::Result<BatchOperationResult>;

    /// Adds the items to an album.
    async fn add_to_album(&self, ids: &[ItemId], album: &GroupTarget) -> anyhow::Result<()>;

    /// Adds the items to a collection.
    async fn add_to_collection(&self, ids: &[ItemId], collection: &GroupTarget) -> anyhow::Result<()>;

    /// Moves a single item into the vault.
    async fn move_to_vault(&self, id: ItemId) -> anyhow::Result<()>;

    /// Packs the items into a downloadable archive.
    ///
    /// `preset_id` selects a stored download preset (format, size); `None`
    /// downloads the originals.
    async fn download(&self, ids: &[ItemId], preset_id: Option<u64>) -> anyhow::Result<DownloadArchive>;
}
