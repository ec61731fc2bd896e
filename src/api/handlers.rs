use axum::{extract::State, http::StatusCode, Json};
use std::sync::Arc;
use tokio::sync::mpsc;
use tracing::debug;

use crate::{
    api::models::*,
    config::Settings,
    maintainer::{Readiness, RecipeEvent},
    matcher::{search_query, FridgeQuery, IngredientIndex, MatchMode},
    Error, Result,
};

/// Shared application state
#[derive(Clone)]
pub struct AppState {
    pub index: Arc<IngredientIndex>,
    pub events: mpsc::Sender<RecipeEvent>,
    pub readiness: Arc<Readiness>,
    pub settings: Settings,
}

/// POST /api/search/frigo - Find recipes makeable from the given ingredients
pub async fn fridge_search(
    State(state): State<AppState>,
    Json(request): Json<FridgeSearchRequest>,
) -> Result<Json<Vec<FridgeMatch>>> {
    debug!("Fridge search request: {:?}", request);

    if !state.readiness.is_ready() {
        return Err(Error::NotReady(
            "Ingredient index is still bootstrapping".to_string(),
        ));
    }

    // Blank and repeated entries do not count towards the limit
    let query = FridgeQuery::parse(&request.ingredients);
    if query.is_empty() {
        return Err(Error::Validation(
            "At least one ingredient is required".to_string(),
        ));
    }

    let max = state.settings.matching.max_query_ingredients;
    if query.len() > max {
        return Err(Error::Validation(format!(
            "Too many ingredients: {} (maximum {max})",
            query.len()
        )));
    }

    let mode = MatchMode::from_strict(request.strict);
    let matches = search_query(&state.index.snapshot(), &query, mode);

    debug!(
        "Fridge search matched {} recipes ({:?}, {} tokens)",
        matches.len(),
        mode,
        query.len()
    );

    Ok(Json(matches.into_iter().map(FridgeMatch::from).collect()))
}

/// POST /api/recipes/events - Queue a recipe store change for indexing
pub async fn recipe_event(
    State(state): State<AppState>,
    Json(event): Json<RecipeEvent>,
) -> Result<(StatusCode, Json<EventAccepted>)> {
    let recipe_id = event.recipe_id();
    debug!("Recipe event received for recipe {}", recipe_id);

    state
        .events
        .send(event)
        .await
        .map_err(|_| Error::Internal("Recipe event queue is closed".to_string()))?;

    Ok((
        StatusCode::ACCEPTED,
        Json(EventAccepted {
            recipe_id,
            queued: true,
        }),
    ))
}

/// GET /api/stats - Index statistics
pub async fn get_stats(State(state): State<AppState>) -> Result<Json<Stats>> {
    let snapshot = state.index.snapshot();

    Ok(Json(Stats {
        recipes: snapshot.recipe_count(),
        tokens: snapshot.token_count(),
    }))
}

/// GET /health - Health check endpoint
pub async fn health_check() -> Result<Json<HealthResponse>> {
    Ok(Json(HealthResponse {
        status: "ok".to_string(),
    }))
}

/// GET /ready - Readiness check endpoint
pub async fn readiness_check(
    State(state): State<AppState>,
) -> Result<(StatusCode, Json<ReadinessResponse>)> {
    let response = match state.readiness.report() {
        Some(report) => ReadinessResponse {
            ready: true,
            degraded: report.is_degraded(),
            indexed_recipes: report.indexed,
            omitted_recipes: report.failed.len(),
        },
        None => ReadinessResponse {
            ready: false,
            degraded: false,
            indexed_recipes: 0,
            omitted_recipes: 0,
        },
    };

    let status = if response.ready {
        StatusCode::OK
    } else {
        StatusCode::SERVICE_UNAVAILABLE
    };

    Ok((status, Json(response)))
}
