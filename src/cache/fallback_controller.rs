//! Live/offline catalog controller
//!
//! Drives what a catalog consumer shows. Each load fetches from the
//! `CatalogSource` with a bounded timeout. A successful fetch makes the
//! controller `Live` and overwrites the cache entry with the accumulated
//! list. A failed fetch makes it `Offline` and serves the cache entry while
//! it is younger than `max_age`, or reports the catalog as unavailable.
//!
//! Loads are tagged with a `RequestTicket`. Only the most recently issued
//! ticket may change the visible state, so a slow response to an older
//! filter can never overwrite the result of a newer one.

use chrono::{DateTime, Utc};
use std::sync::Arc;
use tokio::sync::Mutex;
use tracing::{debug, info, warn};

use super::cache_config::CacheConfig;
use super::catalog_cache::{CacheEntry, CacheStorage};
use crate::client::{CatalogSource, ClientError};
use crate::models::VehicleRecord;
use crate::services::{QueryPage, SortKey, VehicleQuery, ALL_TYPES, DEFAULT_PAGE};

/// Filters chosen by the user
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CatalogFilters {
    pub vehicle_type: String,
    pub search: String,
    pub sort: SortKey,
}

impl Default for CatalogFilters {
    fn default() -> Self {
        Self {
            vehicle_type: ALL_TYPES.to_string(),
            search: String::new(),
            sort: SortKey::default(),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ConnectionState {
    #[default]
    Live,
    Offline,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FetchMode {
    /// First page of the current filters; replaces the visible list
    Replace,
    /// Next page; concatenated onto the visible list
    Append,
}

/// Issued by `begin`, redeemed by `apply`
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RequestTicket {
    pub sequence: u64,
    pub mode: FetchMode,
    pub page: u64,
}

#[derive(Debug, Clone, PartialEq)]
pub enum LoadOutcome {
    /// Fresh data from the server
    Live,
    /// Cached data saved at the given time
    Stale { saved_at: DateTime<Utc> },
    /// Neither the server nor a usable cache entry answered
    Unavailable,
    /// A newer load was issued; nothing was applied
    Superseded,
    /// `load_more` with no further pages
    Exhausted,
}

/// What the consumer currently shows
#[derive(Debug, Clone, PartialEq, Default)]
pub struct CatalogView {
    pub vehicles: Vec<VehicleRecord>,
    pub state: ConnectionState,
    pub page: u64,
    pub total: u64,
    pub has_more: bool,
    /// Set while showing cached data
    pub stale_since: Option<DateTime<Utc>>,
    pub unavailable: bool,
}

#[derive(Debug, Default)]
struct ControllerState {
    filters: CatalogFilters,
    view: CatalogView,
    last_issued: u64,
}

pub struct FallbackController {
    source: Arc<dyn CatalogSource>,
    storage: Arc<dyn CacheStorage>,
    config: CacheConfig,
    state: Mutex<ControllerState>,
}

impl FallbackController {
    pub fn new(
        source: Arc<dyn CatalogSource>,
        storage: Arc<dyn CacheStorage>,
        config: CacheConfig,
    ) -> Self {
        Self {
            source,
            storage,
            config,
            state: Mutex::new(ControllerState {
                view: CatalogView {
                    page: DEFAULT_PAGE,
                    ..CatalogView::default()
                },
                ..ControllerState::default()
            }),
        }
    }

    pub async fn view(&self) -> CatalogView {
        self.state.lock().await.view.clone()
    }

    pub async fn connection_state(&self) -> ConnectionState {
        self.state.lock().await.view.state
    }

    pub async fn filters(&self) -> CatalogFilters {
        self.state.lock().await.filters.clone()
    }

    /// Change filters and reload from page 1
    pub async fn set_filters(&self, filters: CatalogFilters) -> LoadOutcome {
        self.state.lock().await.filters = filters;
        self.load(FetchMode::Replace).await
    }

    /// Reload page 1 of the current filters
    pub async fn refresh(&self) -> LoadOutcome {
        self.load(FetchMode::Replace).await
    }

    /// Append the next page, if any
    pub async fn load_more(&self) -> LoadOutcome {
        let (ticket, query) = {
            let mut state = self.state.lock().await;
            if !state.view.has_more {
                return LoadOutcome::Exhausted;
            }
            self.issue(&mut state, FetchMode::Append)
        };
        let result = self.fetch(&query).await;
        self.apply(ticket, result).await
    }

    async fn load(&self, mode: FetchMode) -> LoadOutcome {
        let (ticket, query) = self.begin(mode).await;
        let result = self.fetch(&query).await;
        self.apply(ticket, result).await
    }

    /// Issue a ticket and the query it stands for
    pub async fn begin(&self, mode: FetchMode) -> (RequestTicket, VehicleQuery) {
        let mut state = self.state.lock().await;
        self.issue(&mut state, mode)
    }

    fn issue(&self, state: &mut ControllerState, mode: FetchMode) -> (RequestTicket, VehicleQuery) {
        state.last_issued += 1;

        let page = match mode {
            FetchMode::Replace => {
                // No page of the old accumulation may be appended after this
                state.view.page = DEFAULT_PAGE;
                state.view.has_more = false;
                DEFAULT_PAGE
            }
            FetchMode::Append => state.view.page + 1,
        };
        let ticket = RequestTicket {
            sequence: state.last_issued,
            mode,
            page,
        };

        let filters = &state.filters;
        let query = VehicleQuery {
            vehicle_type: Some(filters.vehicle_type.trim().to_string())
                .filter(|t| !t.is_empty() && t != ALL_TYPES),
            search: filters.search.trim().to_lowercase(),
            sort: filters.sort,
            page,
            limit: self.config.page_limit,
        };
        debug!("🎫 Issued request #{} ({:?}, page {})", ticket.sequence, mode, page);
        (ticket, query)
    }

    /// Fetch through the source, bounded by `fetch_timeout`
    pub async fn fetch(&self, query: &VehicleQuery) -> Result<QueryPage<VehicleRecord>, ClientError> {
        match tokio::time::timeout(self.config.fetch_timeout, self.source.fetch_page(query)).await {
            Ok(result) => result,
            Err(_) => Err(ClientError::Timeout),
        }
    }

    /// Apply a fetch result; results for anything but the latest ticket are dropped
    ///
    /// Cache reads and writes happen outside the state lock.
    pub async fn apply(
        &self,
        ticket: RequestTicket,
        result: Result<QueryPage<VehicleRecord>, ClientError>,
    ) -> LoadOutcome {
        let cached = match &result {
            Ok(_) => None,
            Err(_) => self.read_cache().await,
        };

        let (outcome, to_save) = {
            let mut state = self.state.lock().await;
            if ticket.sequence != state.last_issued {
                debug!(
                    "⏭️ Dropping response #{} (latest is #{})",
                    ticket.sequence, state.last_issued
                );
                return LoadOutcome::Superseded;
            }

            match result {
                Ok(page) => {
                    Self::apply_live(&mut state.view, ticket, page);
                    (LoadOutcome::Live, Some(state.view.vehicles.clone()))
                }
                Err(e) => {
                    warn!("⚠️ Catalog fetch failed, trying cache: {}", e);
                    (self.apply_fallback(&mut state.view, ticket, cached), None)
                }
            }
        };

        if let Some(vehicles) = to_save {
            let entry = CacheEntry::new(vehicles, Utc::now());
            if let Err(e) = self.storage.write(&entry).await {
                warn!("⚠️ Could not save catalog cache: {:#}", e);
            }
        }
        outcome
    }

    async fn read_cache(&self) -> Option<CacheEntry> {
        match self.storage.read().await {
            Ok(entry) => entry,
            Err(e) => {
                warn!("⚠️ Could not read catalog cache: {:#}", e);
                None
            }
        }
    }

    fn apply_live(view: &mut CatalogView, ticket: RequestTicket, page: QueryPage<VehicleRecord>) {
        match ticket.mode {
            FetchMode::Replace => view.vehicles = page.data,
            FetchMode::Append => view.vehicles.extend(page.data),
        }
        view.state = ConnectionState::Live;
        view.page = ticket.page;
        view.total = page.total;
        view.has_more = ticket.page < page.total_pages;
        view.stale_since = None;
        view.unavailable = false;
    }

    fn apply_fallback(
        &self,
        view: &mut CatalogView,
        ticket: RequestTicket,
        cached: Option<CacheEntry>,
    ) -> LoadOutcome {
        view.state = ConnectionState::Offline;
        view.has_more = false;

        let now = Utc::now();
        match cached {
            Some(entry) if !entry.data.is_empty() && entry.is_fresh_at(now, self.config.max_age) => {
                info!(
                    "📴 Offline: showing {} cached vehicles saved {}s ago",
                    entry.data.len(),
                    entry.age_at(now).as_secs()
                );
                view.total = entry.data.len() as u64;
                view.vehicles = entry.data;
                view.page = DEFAULT_PAGE;
                view.stale_since = Some(entry.saved_at);
                view.unavailable = false;
                LoadOutcome::Stale {
                    saved_at: entry.saved_at,
                }
            }
            _ => {
                warn!("📴 Offline and no usable cache: catalog unavailable");
                if ticket.mode == FetchMode::Replace {
                    view.vehicles.clear();
                    view.total = 0;
                }
                view.stale_since = None;
                view.unavailable = true;
                LoadOutcome::Unavailable
            }
        }
    }
}
