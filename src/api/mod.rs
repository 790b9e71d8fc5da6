// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Custodia

use axum::{
    routing::{get, post},
    Router,
};
use tower_http::{cors::CorsLayer, trace::TraceLayer};
use utoipa::{
    openapi::security::{HttpAuthScheme, HttpBuilder, SecurityScheme},
    Modify, OpenApi,
};
use utoipa_swagger_ui::SwaggerUi;

use crate::state::AppState;

pub mod health;
pub mod wallets;

pub fn router(state: AppState) -> Router {
    let v1_routes = Router::new()
        .route(
            "/wallets",
            get(wallets::list_wallets).post(wallets::create_wallet),
        )
        .route("/wallets/{wallet_id}", get(wallets::get_wallet))
        .route("/wallets/{wallet_id}/sign", post(wallets::sign_message))
        .route("/wallets/{wallet_id}/send", post(wallets::send_transaction));

    Router::new()
        .nest("/v1", v1_routes)
        .route("/health", get(health::health))
        .route("/health/live", get(health::liveness))
        .route("/health/ready", get(health::readiness))
        .route("/ready", get(health::readiness))
        .with_state(state)
        .merge(SwaggerUi::new("/docs").url("/api-doc/openapi.json", ApiDoc::openapi()))
        .layer(CorsLayer::permissive())
        .layer(TraceLayer::new_for_http())
}

struct SecurityAddon;

impl Modify for SecurityAddon {
    fn modify(&self, openapi: &mut utoipa::openapi::OpenApi) {
        if let Some(components) = openapi.components.as_mut() {
            components.add_security_scheme(
                "bearer_auth",
                SecurityScheme::Http(
                    HttpBuilder::new()
                        .scheme(HttpAuthScheme::Bearer)
                        .bearer_format("JWT")
                        .build(),
                ),
            );
        }
    }
}

#[derive(OpenApi)]
#[openapi(
    paths(
        wallets::create_wallet,
        wallets::list_wallets,
        wallets::get_wallet,
        wallets::sign_message,
        wallets::send_transaction,
        health::health,
        health::liveness,
        health::readiness
    ),
    components(
        schemas(
            wallets::CreateWalletRequest,
            wallets::SignMessageRequest,
            wallets::SignMessageResponse,
            wallets::SendTransactionRequest,
            wallets::SendTransactionResponse,
            wallets::WalletResponse,
            health::HealthResponse,
            health::ReadyResponse,
            health::HealthChecks
        )
    ),
    modifiers(&SecurityAddon),
    tags(
        (name = "Wallets", description = "Custodial wallet operations"),
        (name = "Health", description = "Liveness and readiness probes")
    )
)]
struct ApiDoc;
