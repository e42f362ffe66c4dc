//! In-memory asset collection.
//!
//! `VirtualCollection` implements both collaborator traits over a seeded,
//! generated asset list. It backs the replay tool and serves as the test
//! double: individual ids can be made to fail, the whole service can go
//! offline, and mutations can be held at a gate to observe in-flight state.

use std::collections::{HashMap, HashSet};
use std::sync::{Arc, Mutex, MutexGuard};
use std::time::Duration;

use anyhow::{anyhow, bail};
use async_trait::async_trait;
use rand::rngs::StdRng;
use rand::seq::SliceRandom;
use rand::{Rng, SeedableRng};
use serde::{Deserialize, Serialize};
use tokio::sync::watch;

use crate::dispatch::{ActionKind, GroupTarget, TagOps};
use crate::traits::{
    BatchOperationResult, CollectionPage, CollectionSource, DownloadArchive, ItemId,
    MutationService, ViewQuery,
};

const DEFAULT_SEED: u64 = 42;
const FOLDER_COUNT: u64 = 6;
const ASSET_TYPES: &[&str] = &["image", "video", "audio", "document"];
const TAG_POOL: &[&str] = &[
    "sunset", "beach", "family", "work", "travel", "portrait", "city", "nature", "pets", "food",
];

/// Name of the archive produced by a batch download.
pub const DOWNLOAD_FILE_NAME: &str = "zmage_download.zip";

/// One asset in the virtual library.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct VirtualAsset {
    pub id: ItemId,
    pub name: String,
    pub asset_type: String,
    pub folder_id: Option<u64>,
    #[serde(default)]
    pub tags: Vec<String>,
    #[serde(default)]
    pub trashed: bool,
    #[serde(default)]
    pub vaulted: bool,
    #[serde(default)]
    pub albums: Vec<u64>,
    #[serde(default)]
    pub collections: Vec<u64>,
}

impl VirtualAsset {
    fn plain(id: ItemId) -> Self {
        Self {
            id,
            name: format!("IMG_{id:04}.jpg"),
            asset_type: "image".to_string(),
            folder_id: None,
            tags: Vec::new(),
            trashed: false,
            vaulted: false,
            albums: Vec::new(),
            collections: Vec::new(),
        }
    }

    fn generate(rng: &mut StdRng, id: ItemId) -> Self {
        let asset_type = ASSET_TYPES[rng.gen_range(0..ASSET_TYPES.len())];
        let extension = match asset_type {
            "video" => "mp4",
            "audio" => "mp3",
            "document" => "pdf",
            _ => "jpg",
        };
        let folder_id = rng.gen_bool(0.7).then(|| rng.gen_range(1..=FOLDER_COUNT));
        let tag_count = rng.gen_range(0..=3);
        let tags = TAG_POOL
            .choose_multiple(rng, tag_count)
            .map(|t| t.to_string())
            .collect();
        Self {
            id,
            name: format!("{}_{id:04}.{extension}", asset_type.to_uppercase()),
            asset_type: asset_type.to_string(),
            folder_id,
            tags,
            trashed: false,
            vaulted: false,
            albums: Vec::new(),
            collections: Vec::new(),
        }
    }

    fn matches(&self, query: &ViewQuery) -> bool {
        if self.vaulted || self.trashed != query.trash {
            return false;
        }
        if query.folder_id.is_some() && self.folder_id != query.folder_id {
            return false;
        }
        if let Some(asset_type) = &query.asset_type {
            if &self.asset_type != asset_type {
                return false;
            }
        }
        match &query.search {
            Some(term) if !term.trim().is_empty() => {
                let term = term.trim().to_lowercase();
                self.name.to_lowercase().contains(&term)
                    || self.tags.iter().any(|t| t.to_lowercase().contains(&term))
            }
            _ => true,
        }
    }
}

/// Serializable snapshot of a virtual collection, as written by the generator.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CollectionFixture {
    pub seed: u64,
    pub assets: Vec<VirtualAsset>,
}

/// Handle that keeps mutations waiting until released.
#[derive(Debug, Clone)]
pub struct MutationGate {
    open: Arc<watch::Sender<bool>>,
}

impl MutationGate {
    /// Lets every waiting and future mutation proceed.
    pub fn release(&self) {
        self.open.send_replace(true);
    }
}

#[derive(Debug, Default)]
struct Library {
    assets: Vec<VirtualAsset>,
    failing: HashSet<ItemId>,
    offline: bool,
    groups: HashMap<String, u64>,
    next_group_id: u64,
    /// Every mutation received, in arrival order
    requests: Vec<(ActionKind, Vec<ItemId>)>,
}

impl Library {
    fn asset_mut(&mut self, id: ItemId) -> Option<&mut VirtualAsset> {
        self.assets.iter_mut().find(|a| a.id == id)
    }

    fn resolve_group(&mut self, target: &GroupTarget, kind: &str) -> u64 {
        match target {
            GroupTarget::Existing(id) => *id,
            GroupTarget::New { name } => {
                let key = format!("{kind}:{}", name.trim());
                if let Some(id) = self.groups.get(&key) {
                    return *id;
                }
                self.next_group_id += 1;
                let id = self.next_group_id;
                self.groups.insert(key, id);
                id
            }
        }
    }

    /// Applies `apply` to each id that exists and is not marked failing.
    fn apply_each(
        &mut self,
        ids: &[ItemId],
        mut apply: impl FnMut(&mut VirtualAsset),
    ) -> BatchOperationResult {
        let mut failed_ids = Vec::new();
        for &id in ids {
            if self.failing.contains(&id) {
                failed_ids.push(id);
                continue;
            }
            match self.asset_mut(id) {
                Some(asset) => apply(asset),
                None => failed_ids.push(id),
            }
        }
        let failed = failed_ids.len();
        BatchOperationResult {
            total: ids.len(),
            success: ids.len() - failed,
            failed,
            message: if failed > 0 {
                format!("{failed} item(s) could not be updated")
            } else {
                String::new()
            },
            failed_ids,
        }
    }
}

/// Seeded in-memory collection implementing `CollectionSource` and `MutationService`.
#[derive(Debug)]
pub struct VirtualCollection {
    library: Mutex<Library>,
    gate: Arc<watch::Sender<bool>>,
    latency: Option<Duration>,
}

impl Default for VirtualCollection {
    fn default() -> Self {
        Self::generate(200, DEFAULT_SEED)
    }
}

impl VirtualCollection {
    fn from_assets(assets: Vec<VirtualAsset>) -> Self {
        let (gate, _) = watch::channel(true);
        Self {
            library: Mutex::new(Library {
                assets,
                ..Library::default()
            }),
            gate: Arc::new(gate),
            latency: None,
        }
    }

    /// Generates `count` assets deterministically from `seed`.
    pub fn generate(count: usize, seed: u64) -> Self {
        Self::from_assets(generate_assets(count, seed))
    }

    /// Plain image assets with the given ids, in that order.
    pub fn with_ids(ids: impl IntoIterator<Item = ItemId>) -> Self {
        Self::from_assets(ids.into_iter().map(VirtualAsset::plain).collect())
    }

    pub fn from_fixture(fixture: CollectionFixture) -> Self {
        Self::from_assets(fixture.assets)
    }

    /// Delays every collaborator call by `latency`.
    pub fn with_latency(mut self, latency: Duration) -> Self {
        self.latency = Some(latency);
        self
    }

    fn lock(&self) -> MutexGuard<'_, Library> {
        self.library.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    // ===== Failure injection =====

    /// Makes mutations of these ids fail until `clear_failures`.
    pub fn fail_on(&self, ids: impl IntoIterator<Item = ItemId>) {
        self.lock().failing.extend(ids);
    }

    pub fn clear_failures(&self) {
        self.lock().failing.clear();
    }

    /// While offline, every call returns an error.
    pub fn set_offline(&self, offline: bool) {
        self.lock().offline = offline;
    }

    /// Holds all subsequent mutations until the returned gate is released.
    pub fn hold_mutations(&self) -> MutationGate {
        self.gate.send_replace(false);
        MutationGate {
            open: Arc::clone(&self.gate),
        }
    }

    // ===== Inspection =====

    /// Mutations received so far, with the ids each one carried.
    pub fn requests(&self) -> Vec<(ActionKind, Vec<ItemId>)> {
        self.lock().requests.clone()
    }

    pub fn trashed_ids(&self) -> Vec<ItemId> {
        self.ids_where(|a| a.trashed)
    }

    pub fn vaulted_ids(&self) -> Vec<ItemId> {
        self.ids_where(|a| a.vaulted)
    }

    pub fn asset(&self, id: ItemId) -> Option<VirtualAsset> {
        self.lock().assets.iter().find(|a| a.id == id).cloned()
    }

    pub fn len(&self) -> usize {
        self.lock().assets.len()
    }

    pub fn is_empty(&self) -> bool {
        self.lock().assets.is_empty()
    }

    pub fn to_fixture(&self, seed: u64) -> CollectionFixture {
        CollectionFixture {
            seed,
            assets: self.lock().assets.clone(),
        }
    }

    fn ids_where(&self, pred: impl Fn(&VirtualAsset) -> bool) -> Vec<ItemId> {
        let mut ids: Vec<ItemId> = self
            .lock()
            .assets
            .iter()
            .filter(|a| pred(a))
            .map(|a| a.id)
            .collect();
        ids.sort_unstable();
        ids
    }

    /// Records the request, then waits for latency and the gate.
    async fn begin(&self, kind: ActionKind, ids: &[ItemId]) -> anyhow::Result<()> {
        self.lock().requests.push((kind, ids.to_vec()));
        self.pause().await;
        if self.lock().offline {
            bail!("asset service unreachable");
        }
        Ok(())
    }

    async fn pause(&self) {
        if let Some(latency) = self.latency {
            tokio::time::sleep(latency).await;
        }
        let mut open = self.gate.subscribe();
        // The sender lives as long as self, so this only returns once released
        let _ = open.wait_for(|open| *open).await;
    }
}

/// Generates a deterministic asset list.
pub fn generate_assets(count: usize, seed: u64) -> Vec<VirtualAsset> {
    let mut rng = StdRng::seed_from_u64(seed);
    (1..=count as u64)
        .map(|id| VirtualAsset::generate(&mut rng, id))
        .collect()
}

#[async_trait]
impl CollectionSource for VirtualCollection {
    async fn load_page(&self, query: &ViewQuery, page: u32, page_size: u32) -> anyhow::Result<CollectionPage> {
        if let Some(latency) = self.latency {
            tokio::time::sleep(latency).await;
        }
        let library = self.lock();
        if library.offline {
            bail!("asset service unreachable");
        }
        let matching: Vec<ItemId> = library
            .assets
            .iter()
            .filter(|a| a.matches(query))
            .map(|a| a.id)
            .collect();
        let page = page.max(1);
        let size = page_size.max(1) as usize;
        let start = (page as usize - 1) * size;
        let items: Vec<ItemId> = matching.iter().skip(start).take(size).copied().collect();
        Ok(CollectionPage {
            has_more: start + items.len() < matching.len(),
            total: matching.len(),
            page,
            items,
        })
    }
}

#[async_trait]
impl MutationService for VirtualCollection {
    async fn delete(&self, ids: &[ItemId]) -> anyhow::Result<BatchOperationResult> {
        self.begin(ActionKind::Delete, ids).await?;
        Ok(self.lock().apply_each(ids, |a| a.trashed = true))
    }

    async fn restore(&self, ids: &[ItemId]) -> anyhow::Result<BatchOperationResult> {
        self.begin(ActionKind::Restore, ids).await?;
        Ok(self.lock().apply_each(ids, |a| a.trashed = false))
    }

    async fn move_to_folder(&self, ids: &[ItemId], folder_id: Option<u64>) -> anyhow::Result<BatchOperationResult> {
        self.begin(ActionKind::Move, ids).await?;
        Ok(self.lock().apply_each(ids, |a| a.folder_id = folder_id))
    }

    async fn update_tags(&self, ids: &[ItemId], ops: &TagOps) -> anyhow::Result<BatchOperationResult> {
        self.begin(ActionKind::Tag, ids).await?;
        Ok(self.lock().apply_each(ids, |a| {
            a.tags.retain(|t| !ops.remove.contains(t));
            for tag in &ops.add {
                if !a.tags.contains(tag) {
                    a.tags.push(tag.clone());
                }
            }
        }))
    }

    async fn add_to_album(&self, ids: &[ItemId], album: &GroupTarget) -> anyhow::Result<()> {
        self.begin(ActionKind::AddToAlbum, ids).await?;
        let mut library = self.lock();
        if let Some(id) = ids.iter().find(|id| library.failing.contains(*id)) {
            return Err(anyhow!("asset {id} cannot be added to an album"));
        }
        let album_id = library.resolve_group(album, "album");
        library.apply_each(ids, |a| {
            if !a.albums.contains(&album_id) {
                a.albums.push(album_id);
            }
        });
        Ok(())
    }

    async fn add_to_collection(&self, ids: &[ItemId], collection: &GroupTarget) -> anyhow::Result<()> {
        self.begin(ActionKind::AddToCollection, ids).await?;
        let mut library = self.lock();
        if let Some(id) = ids.iter().find(|id| library.failing.contains(*id)) {
            return Err(anyhow!("asset {id} cannot be added to a collection"));
        }
        let collection_id = library.resolve_group(collection, "collection");
        library.apply_each(ids, |a| {
            if !a.collections.contains(&collection_id) {
                a.collections.push(collection_id);
            }
        });
        Ok(())
    }

    async fn move_to_vault(&self, id: ItemId) -> anyhow::Result<()> {
        self.begin(ActionKind::MoveToVault, &[id]).await?;
        let mut library = self.lock();
        if library.failing.contains(&id) {
            bail!("asset {id} is locked");
        }
        let asset = library
            .asset_mut(id)
            .ok_or_else(|| anyhow!("asset {id} not found"))?;
        asset.vaulted = true;
        Ok(())
    }

    async fn download(&self, ids: &[ItemId], preset_id: Option<u64>) -> anyhow::Result<DownloadArchive> {
        self.begin(ActionKind::Download, ids).await?;
        let library = self.lock();
        let mut lines: Vec<String> = preset_id.map(|p| format!("preset {p}")).into_iter().collect();
        let names: Vec<&str> = ids
            .iter()
            .filter_map(|id| library.assets.iter().find(|a| a.id == *id))
            .map(|a| a.name.as_str())
            .collect();
        if names.is_empty() {
            bail!("nothing to download");
        }
        lines.extend(names.into_iter().map(str::to_string));
        Ok(DownloadArchive {
            file_name: DOWNLOAD_FILE_NAME.to_string(),
            bytes: lines.join("\n").into_bytes(),
        })
    }
}
