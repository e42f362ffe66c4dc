//! Background loading of collection pages.
//!
//! Page requests run on a tokio runtime while the UI keeps responding. Every
//! request carries the generation it was issued in; navigating to a new view
//! bumps the generation, so a slow response for the old view is dropped
//! instead of overwriting the new one.

use std::sync::mpsc::{channel, Receiver, Sender};
use std::sync::Arc;

use tokio::runtime::Handle;

use crate::traits::{CollectionPage, CollectionSource, ViewQuery};

/// Result of a completed page load.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LoadResult {
    /// A page for the current view arrived
    Loaded { query: ViewQuery, page: CollectionPage },
    /// A refresh of every loaded page arrived, merged into one page whose
    /// `page` is the last one fetched
    Reloaded { query: ViewQuery, page: CollectionPage },
    /// Loading the current view failed
    Error(String),
    /// Nothing current has arrived (still loading, idle, or only stale results)
    None,
}

struct Delivery {
    generation: u64,
    query: ViewQuery,
    /// Covers pages 1 through `page` rather than a single page
    reload: bool,
    result: Result<CollectionPage, String>,
}

/// Loads pages 1 through `pages` in order and merges them.
///
/// Stops early when the source reports no further pages.
pub async fn load_range(
    source: &dyn CollectionSource,
    query: &ViewQuery,
    pages: u32,
    page_size: u32,
) -> anyhow::Result<CollectionPage> {
    let mut merged = CollectionPage::default();
    for number in 1..=pages.max(1) {
        let page = source.load_page(query, number, page_size).await?;
        merged.items.extend(page.items);
        merged.total = page.total;
        merged.page = page.page;
        merged.has_more = page.has_more;
        if !page.has_more {
            break;
        }
    }
    Ok(merged)
}

/// Loads collection pages asynchronously and discards superseded results.
pub struct CollectionLoader {
    source: Arc<dyn CollectionSource>,
    runtime: Handle,
    page_size: u32,
    /// Bumped whenever the view changes
    generation: u64,
    /// Outstanding requests for the current generation
    in_flight: usize,
    sender: Sender<Delivery>,
    receiver: Receiver<Delivery>,
}

impl CollectionLoader {
    pub fn new(source: Arc<dyn CollectionSource>, runtime: Handle, page_size: u32) -> Self {
        let (sender, receiver) = channel();
        Self {
            source,
            runtime,
            page_size,
            generation: 0,
            in_flight: 0,
            sender,
            receiver,
        }
    }

    /// Checks if a request for the current view is outstanding.
    pub fn is_loading(&self) -> bool {
        self.in_flight > 0
    }

    pub fn generation(&self) -> u64 {
        self.generation
    }

    /// Starts loading the first page of a (possibly new) view.
    ///
    /// Any request still running for an earlier view becomes stale.
    pub fn load_first(&mut self, query: ViewQuery) {
        self.generation += 1;
        self.in_flight = 0;
        self.spawn(query, 1, false);
    }

    /// Starts loading a further page of the current view.
    pub fn load_more(&mut self, query: ViewQuery, page: u32) {
        self.spawn(query, page, false);
    }

    /// Re-queries pages 1 through `pages` of the current view after a mutation.
    ///
    /// Earlier requests become stale, including a pending "load more".
    pub fn reload(&mut self, query: ViewQuery, pages: u32) {
        self.generation += 1;
        self.in_flight = 0;
        self.spawn(query, pages.max(1), true);
    }

    fn spawn(&mut self, query: ViewQuery, page: u32, reload: bool) {
        self.in_flight += 1;
        let generation = self.generation;
        let source = Arc::clone(&self.source);
        let sender = self.sender.clone();
        let page_size = self.page_size;
        tracing::debug!(generation, page, reload, "loading collection page");

        self.runtime.spawn(async move {
            let result = if reload {
                load_range(&*source, &query, page, page_size).await
            } else {
                source.load_page(&query, page, page_size).await
            };
            let _ = sender.send(Delivery {
                generation,
                query,
                reload,
                result: result.map_err(|e| format!("{e:#}")),
            });
        });
    }

    /// Returns the next current-generation result, skipping stale ones.
    ///
    /// Call once per frame.
    pub fn check_completion(&mut self) -> LoadResult {
        while let Ok(delivery) = self.receiver.try_recv() {
            if delivery.generation != self.generation {
                tracing::debug!(
                    stale = delivery.generation,
                    current = self.generation,
                    "discarding stale page"
                );
                continue;
            }
            self.in_flight = self.in_flight.saturating_sub(1);
            return match delivery.result {
                Ok(page) if delivery.reload => LoadResult::Reloaded {
                    query: delivery.query,
                    page,
                },
                Ok(page) => LoadResult::Loaded {
                    query: delivery.query,
                    page,
                },
                Err(message) => LoadResult::Error(message),
            };
        }
        LoadResult::None
    }
}
