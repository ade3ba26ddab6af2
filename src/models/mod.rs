pub mod coin;
pub mod dto;
pub mod error;
pub mod token_claim;
pub mod user;
pub use coin::{CoinDetail, CoinImage, CoinSummary, MarketData, UsdQuote};
pub use error::Error;
pub use token_claim::TokenClaim;
pub use user::User;
