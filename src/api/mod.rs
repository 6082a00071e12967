// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

use axum::{
    middleware::from_fn_with_state,
    routing::{delete, get, patch, post},
    Router,
};
use tower_http::{cors::CorsLayer, trace::TraceLayer};
use utoipa::{
    openapi::security::{HttpAuthScheme, HttpBuilder, SecurityScheme},
    Modify, OpenApi,
};
use utoipa_swagger_ui::SwaggerUi;

use crate::{
    auth::{
        permissions::{DELETE_DRINKS, GET_DRINKS_DETAIL, PATCH_DRINKS, POST_DRINKS},
        require_permission,
    },
    error::{self, ErrorBody},
    models::{
        CreateDrinkRequest, DeleteResponse, Drink, DrinkList, DrinkSummary, DrinkSummaryList,
        Ingredient, IngredientSummary, RecipeInput, UpdateDrinkRequest,
    },
    state::AppState,
};

pub mod drinks;
pub mod health;

pub fn router(state: AppState) -> Router {
    let auth = state.auth.clone();

    // Each protected route gets its own gate; public routes get none.
    let api_routes = Router::new()
        .route("/drinks", get(drinks::list_drinks))
        .route(
            "/drinks",
            post(drinks::create_drink)
                .route_layer(from_fn_with_state(auth.gate(POST_DRINKS), require_permission)),
        )
        .route(
            "/drinks-detail",
            get(drinks::list_drinks_detail).route_layer(from_fn_with_state(
                auth.gate(GET_DRINKS_DETAIL),
                require_permission,
            )),
        )
        .route(
            "/drinks/{id}",
            patch(drinks::update_drink)
                .route_layer(from_fn_with_state(auth.gate(PATCH_DRINKS), require_permission)),
        )
        .route(
            "/drinks/{id}",
            delete(drinks::delete_drink)
                .route_layer(from_fn_with_state(auth.gate(DELETE_DRINKS), require_permission)),
        )
        .with_state(state.clone());

    let health_routes = Router::new()
        .route("/health", get(health::health))
        .route("/health/live", get(health::liveness))
        .with_state(state);

    Router::new()
        .nest("/api", api_routes)
        .merge(health_routes)
        .merge(SwaggerUi::new("/docs").url("/api-doc/openapi.json", ApiDoc::openapi()))
        .fallback(error::not_found)
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive())
}

struct BearerSecurity;

impl Modify for BearerSecurity {
    fn modify(&self, openapi: &mut utoipa::openapi::OpenApi) {
        if let Some(components) = openapi.components.as_mut() {
            components.add_security_scheme(
                "bearer",
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
        drinks::list_drinks,
        drinks::list_drinks_detail,
        drinks::create_drink,
        drinks::update_drink,
        drinks::delete_drink,
        health::health,
        health::liveness
    ),
    components(
        schemas(
            Drink,
            DrinkSummary,
            Ingredient,
            IngredientSummary,
            RecipeInput,
            CreateDrinkRequest,
            UpdateDrinkRequest,
            DrinkList,
            DrinkSummaryList,
            DeleteResponse,
            ErrorBody
        )
    ),
    modifiers(&BearerSecurity),
    tags(
        (name = "Drinks", description = "Drink menu and management"),
        (name = "Health", description = "Liveness and readiness")
    )
)]
struct ApiDoc;
