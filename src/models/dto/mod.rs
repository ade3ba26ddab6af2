pub mod coin;
pub mod message;
pub mod user;
pub use coin::*;
pub use message::Message;
pub use user::*;

use utoipa::{
    openapi::security::{Http, HttpAuthScheme, SecurityScheme},
    Modify, OpenApi,
};

use crate::{
    lookup::DerivedFigures,
    models::{CoinDetail, CoinImage, CoinSummary, MarketData, UsdQuote},
};

#[derive(OpenApi)]
#[openapi(
    components(
        schemas(
            Message,
            Profile,
            LoginInfo,
            RegisterInfo,
            UpdateUser,
            TokenResponse,
            CoinSummary,
            CoinDetail,
            CoinImage,
            MarketData,
            UsdQuote,
            DerivedFigures,
            SearchInput,
            SelectInput,
            FigureInput,
            SessionView,
        ),
    ),
    modifiers(&SecurityAddon)
)]
/// Captures OpenAPI schemas and canned responses defined in the DTO module
pub struct OpenApiSchemas;

pub struct SecurityAddon;
impl Modify for SecurityAddon {
    fn modify(&self, openapi: &mut utoipa::openapi::OpenApi) {
        if let Some(components) = openapi.components.as_mut() {
            components.add_security_scheme(
                "bearerAuth",
                SecurityScheme::Http(Http::new(HttpAuthScheme::Bearer)),
            )
        }
    }
}
