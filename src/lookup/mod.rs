//! Coin lookup: catalog search, derived figures and the interactive session state.

pub mod catalog;
pub mod derive;
pub mod filter;
pub mod session;

pub use catalog::Catalog;
pub use derive::DerivedFigures;
pub use filter::filter_coins;
pub use session::{LookupSession, SessionStore};
