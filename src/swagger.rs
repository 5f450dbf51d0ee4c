use actix_web::web;
use utoipa::OpenApi;
use utoipa::{
    Modify,
    openapi::security::{Http, HttpAuthScheme, SecurityScheme},
};
use utoipa_swagger_ui::SwaggerUi;

use crate::gacha::BoostFormula;
use crate::handlers;
use crate::models::*;

struct SecurityAddon;

impl Modify for SecurityAddon {
    fn modify(&self, openapi: &mut utoipa::openapi::OpenApi) {
        if let Some(components) = openapi.components.as_mut() {
            components.add_security_scheme(
                "bearer_auth",
                SecurityScheme::Http(Http::new(HttpAuthScheme::Bearer)),
            )
        }
    }
}

#[derive(OpenApi)]
#[openapi(
    paths(
        handlers::gacha::roll,
        handlers::gacha::get_odds,
        handlers::gacha::get_records,
        handlers::app_state::get_pity_config,
        handlers::app_state::update_pity_config,
    ),
    components(
        schemas(
            RolledItem,
            RollResponse,
            GroupOddsResponse,
            OddsResponse,
            OwnershipRecordQuery,
            OwnershipRecordResponse,
            PityConfigResponse,
            UpdatePityConfigRequest,
            BoostFormula,
            ApiError,
        )
    ),
    modifiers(&SecurityAddon),
    tags(
        (name = "gacha", description = "Gacha roll API"),
        (name = "app_state", description = "Application state API"),
    ),
    info(
        title = "Gacha Backend API",
        version = "1.0.0",
        description = "Gacha Backend REST API documentation"
    ),
    servers(
        (url = "/api/v1", description = "Local server")
    )
)]
pub struct ApiDoc;

pub fn swagger_config(cfg: &mut web::ServiceConfig) {
    cfg.service(
        SwaggerUi::new("/swagger-ui/{_:.*}").url("/api-docs/openapi.json", ApiDoc::openapi()),
    )
    .route(
        "/swagger-ui",
        web::get().to(|| async {
            actix_web::HttpResponse::Found()
                .append_header(("Location", "/swagger-ui/"))
                .finish()
        }),
    );
}
