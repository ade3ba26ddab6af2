use std::collections::HashMap;
use std::sync::atomic::{AtomicU64, Ordering};
use std::time::{Duration, Instant};

use tokio::sync::RwLock;
use tracing::{debug, error, info};

use crate::{
    models::{dto::SessionView, error::FetchError, CoinDetail, CoinSummary},
    Config,
};

use super::{
    derive::{by_multiplier, market_cap_at_price, parse_operand},
    Catalog, DerivedFigures,
};

const DETAIL_FETCH_ERROR: &str = "Error fetching coin data";

/// Identifies the selection a detail fetch was started for.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SelectionTicket {
    generation: u64,
    coin_id: String,
}

impl SelectionTicket {
    pub fn coin_id(&self) -> &str {
        &self.coin_id
    }
}

/// State behind one search box: what was typed, what was picked and what it derives to.
#[derive(Debug, Default, Clone)]
pub struct LookupSession {
    search_term: String,
    results: Vec<CoinSummary>,
    selected: Option<CoinSummary>,
    detail: Option<CoinDetail>,
    multiplier: String,
    target_price: String,
    derived: DerivedFigures,
    error: Option<String>,
    generation: u64,
}

impl LookupSession {
    /// Starts a session, carrying over a catalog load failure as its error.
    pub fn new(catalog: &Catalog) -> Self {
        Self {
            error: catalog.load_error().map(str::to_owned),
            ..Default::default()
        }
    }

    pub fn set_search_term(&mut self, term: &str, catalog: &Catalog) {
        self.search_term = term.to_owned();
        self.results = catalog.search(term);
    }

    /// Picks a coin and clears everything tied to the previous pick.
    ///
    /// The returned ticket must accompany the detail fetch result; results for
    /// older tickets are dropped by [`LookupSession::apply_detail`].
    pub fn select(&mut self, coin: CoinSummary) -> SelectionTicket {
        self.generation += 1;
        let ticket = SelectionTicket {
            generation: self.generation,
            coin_id: coin.id.clone(),
        };

        self.selected = Some(coin);
        self.detail = None;
        self.search_term.clear();
        self.results.clear();
        self.multiplier.clear();
        self.target_price.clear();
        self.derived = DerivedFigures::default();
        self.error = None;

        ticket
    }

    /// Stores the outcome of a detail fetch. Returns `false` if a newer
    /// selection has superseded `ticket`, in which case nothing changes.
    pub fn apply_detail(
        &mut self,
        ticket: &SelectionTicket,
        result: Result<CoinDetail, FetchError>,
    ) -> bool {
        if ticket.generation != self.generation {
            debug!(
                coin_id = %ticket.coin_id,
                "discarding detail for superseded selection"
            );
            return false;
        }
        match result {
            Ok(detail) => {
                self.detail = Some(detail);
                self.error = None;
            }
            Err(e) => {
                error!(coin_id = %ticket.coin_id, "{}: {}", DETAIL_FETCH_ERROR, e);
                self.error = Some(DETAIL_FETCH_ERROR.to_string());
            }
        }
        true
    }

    /// Multiplier mode: rewrites both the price and the market cap.
    pub fn set_multiplier(&mut self, input: &str) {
        self.multiplier = input.to_owned();
        let Some(detail) = &self.detail else {
            return;
        };
        self.derived = match parse_operand(input) {
            Some(multiplier) => by_multiplier(&detail.market_data, multiplier),
            None => DerivedFigures::default(),
        };
    }

    /// Target-price mode: rewrites only the market cap.
    pub fn set_target_price(&mut self, input: &str) {
        self.target_price = input.to_owned();
        let Some(detail) = &self.detail else {
            return;
        };
        self.derived.calculated_market_cap =
            parse_operand(input).and_then(|price| market_cap_at_price(&detail.market_data, price));
    }

    pub fn detail(&self) -> Option<&CoinDetail> {
        self.detail.as_ref()
    }

    pub fn derived(&self) -> DerivedFigures {
        self.derived
    }

    pub fn error(&self) -> Option<&str> {
        self.error.as_deref()
    }

    pub fn view(&self, id: u64, surface_errors: bool) -> SessionView {
        SessionView {
            id,
            search_term: self.search_term.clone(),
            results: self.results.clone(),
            selected: self.selected.clone(),
            detail: self.detail.clone(),
            multiplier: self.multiplier.clone(),
            target_price: self.target_price.clone(),
            derived: self.derived,
            error: if surface_errors {
                self.error.clone()
            } else {
                None
            },
        }
    }
}

#[derive(Debug)]
struct Entry {
    session: LookupSession,
    touched: Instant,
}

/// In-memory registry of lookup sessions.
///
/// Sessions idle for longer than `idle_timeout` are evicted when a new one is
/// inserted; past `max_sessions` live sessions, inserts are refused.
#[derive(Debug)]
pub struct SessionStore {
    next_id: AtomicU64,
    idle_timeout: Duration,
    max_sessions: usize,
    sessions: RwLock<HashMap<u64, Entry>>,
}

impl SessionStore {
    pub fn new(idle_timeout: Duration, max_sessions: usize) -> Self {
        Self {
            next_id: AtomicU64::new(0),
            idle_timeout,
            max_sessions,
            sessions: RwLock::new(HashMap::new()),
        }
    }

    pub fn from_config(config: &Config) -> Self {
        Self::new(
            Duration::from_secs(config.session_idle_secs),
            config.max_sessions,
        )
    }

    /// Returns `None` when the store is full even after evicting idle sessions.
    pub async fn insert(&self, session: LookupSession) -> Option<u64> {
        let mut sessions = self.sessions.write().await;

        let before = sessions.len();
        let idle_timeout = self.idle_timeout;
        sessions.retain(|_, entry| entry.touched.elapsed() < idle_timeout);
        let evicted = before - sessions.len();
        if evicted > 0 {
            info!(evicted, "evicted idle lookup sessions");
        }

        if sessions.len() >= self.max_sessions {
            return None;
        }
        let id = self.next_id.fetch_add(1, Ordering::Relaxed) + 1;
        sessions.insert(
            id,
            Entry {
                session,
                touched: Instant::now(),
            },
        );
        Some(id)
    }

    /// Runs `f` against session `id` under the write lock and marks it as active.
    pub async fn update<R>(&self, id: u64, f: impl FnOnce(&mut LookupSession) -> R) -> Option<R> {
        let mut sessions = self.sessions.write().await;
        sessions.get_mut(&id).map(|entry| {
            entry.touched = Instant::now();
            f(&mut entry.session)
        })
    }

    pub async fn read<R>(&self, id: u64, f: impl FnOnce(&LookupSession) -> R) -> Option<R> {
        let sessions = self.sessions.read().await;
        sessions.get(&id).map(|entry| f(&entry.session))
    }

    pub async fn remove(&self, id: u64) -> bool {
        self.sessions.write().await.remove(&id).is_some()
    }
}
