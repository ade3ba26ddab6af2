use std::sync::Arc;

use crate::config::Config;
use crate::database::PostgreDatabase;
use crate::external::CoinSource;
use crate::lookup::{Catalog, SessionStore};

pub struct AppState {
    pub db: PostgreDatabase,
    pub config: Config,
    pub ext: Arc<dyn CoinSource>,
    pub catalog: Catalog,
    pub sessions: SessionStore,
}
