// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

use axum::{
    extract::{
        rejection::{JsonRejection, PathRejection},
        Path, State,
    },
    Json,
};
use tracing::info;

use crate::{
    auth::Authorized,
    error::{ApiError, ErrorBody},
    models::{
        CreateDrinkRequest, DeleteResponse, DrinkList, DrinkSummaryList, NewDrink,
        UpdateDrinkRequest,
    },
    state::AppState,
};

/// Non-numeric ids cannot name a drink.
fn drink_id(path: Result<Path<u64>, PathRejection>) -> Result<u64, ApiError> {
    path.map(|Path(id)| id)
        .map_err(|_| ApiError::not_found("resource not found"))
}

fn json_body<T>(body: Result<Json<T>, JsonRejection>) -> Result<T, ApiError> {
    body.map(|Json(value)| value)
        .map_err(|rejection| ApiError::unprocessable(rejection.body_text()))
}

#[utoipa::path(
    get,
    path = "/api/drinks",
    tag = "Drinks",
    responses((status = 200, body = DrinkSummaryList))
)]
pub async fn list_drinks(State(state): State<AppState>) -> Json<DrinkSummaryList> {
    let store = state.store.read().await;
    Json(DrinkSummaryList {
        success: true,
        drinks: store.query_all().iter().map(|drink| drink.summary()).collect(),
    })
}

#[utoipa::path(
    get,
    path = "/api/drinks-detail",
    tag = "Drinks",
    security(("bearer" = ["get:drinks-detail"])),
    responses(
        (status = 200, body = DrinkList),
        (status = 401, body = ErrorBody),
        (status = 403, body = ErrorBody)
    )
)]
pub async fn list_drinks_detail(
    Authorized(_claims): Authorized,
    State(state): State<AppState>,
) -> Json<DrinkList> {
    let store = state.store.read().await;
    Json(DrinkList {
        success: true,
        drinks: store.query_all(),
    })
}

#[utoipa::path(
    post,
    path = "/api/drinks",
    request_body = CreateDrinkRequest,
    tag = "Drinks",
    security(("bearer" = ["post:drinks"])),
    responses(
        (status = 200, body = DrinkList),
        (status = 400, body = ErrorBody),
        (status = 422, body = ErrorBody)
    )
)]
pub async fn create_drink(
    Authorized(claims): Authorized,
    State(state): State<AppState>,
    body: Result<Json<CreateDrinkRequest>, JsonRejection>,
) -> Result<Json<DrinkList>, ApiError> {
    let request = json_body(body)?;
    let (Some(title), Some(recipe)) = (request.title, request.recipe) else {
        return Err(ApiError::bad_request("title and recipe are required"));
    };

    let drink = state.store.write().await.insert(NewDrink {
        title,
        recipe: recipe.into(),
    })?;

    info!(drink_id = drink.id, subject = claims.subject(), "Drink created");
    Ok(Json(DrinkList {
        success: true,
        drinks: vec![drink],
    }))
}

#[utoipa::path(
    patch,
    path = "/api/drinks/{id}",
    params(("id" = u64, Path, description = "Identifier of the drink to update")),
    request_body = UpdateDrinkRequest,
    tag = "Drinks",
    security(("bearer" = ["patch:drinks"])),
    responses(
        (status = 200, body = DrinkList),
        (status = 404, body = ErrorBody),
        (status = 422, body = ErrorBody)
    )
)]
pub async fn update_drink(
    Authorized(claims): Authorized,
    path: Result<Path<u64>, PathRejection>,
    State(state): State<AppState>,
    body: Result<Json<UpdateDrinkRequest>, JsonRejection>,
) -> Result<Json<DrinkList>, ApiError> {
    let id = drink_id(path)?;
    let mut store = state.store.write().await;
    // Unknown ids are reported before body problems
    store.get(id)?;
    let changes = json_body(body)?;

    let drink = store.update(id, changes.into())?;

    info!(drink_id = drink.id, subject = claims.subject(), "Drink updated");
    Ok(Json(DrinkList {
        success: true,
        drinks: vec![drink],
    }))
}

#[utoipa::path(
    delete,
    path = "/api/drinks/{id}",
    params(("id" = u64, Path, description = "Identifier of the drink to delete")),
    tag = "Drinks",
    security(("bearer" = ["delete:drinks"])),
    responses(
        (status = 200, body = DeleteResponse),
        (status = 404, body = ErrorBody)
    )
)]
pub async fn delete_drink(
    Authorized(claims): Authorized,
    path: Result<Path<u64>, PathRejection>,
    State(state): State<AppState>,
) -> Result<Json<DeleteResponse>, ApiError> {
    let id = drink_id(path)?;
    state.store.write().await.delete(id)?;

    info!(drink_id = id, subject = claims.subject(), "Drink deleted");
    Ok(Json(DeleteResponse {
        success: true,
        delete: id,
    }))
}
