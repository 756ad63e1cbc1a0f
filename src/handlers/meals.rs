use axum::{
    extract::State,
    http::{StatusCode, header},
    response::{IntoResponse, Response},
    Extension,
};
use serde::Serialize;
use tower_cookies::{Cookie, Cookies};
use tower_cookies::cookie::{SameSite, time::Duration};

use crate::{
    config::Config,
    error::{AppError, Result},
    models::{meal::{Meal, MealSummary}, session::SessionId},
    services::{meals as meal_service, session::{SESSION_COOKIE, ensure_session}},
    state::AppState,
    validation::meal::{CreateMealRequest, MealId, UpdateMealRequest, ValidJson},
};

#[derive(Serialize)]
struct MealsBody {
    meals: Vec<Meal>,
}

#[derive(Serialize)]
struct MealBody {
    meal: Vec<Meal>,
}

#[derive(Serialize)]
struct SummaryBody {
    summary: MealSummary,
}

/// Serializes `body` with sonic-rs into a JSON response.
fn json_response<T: Serialize>(status: StatusCode, body: &T) -> Result<Response> {
    let body = sonic_rs::to_string(body)
        .map_err(|e| AppError::Internal(format!("Response serialization failed: {}", e)))?;
    Ok((status, [(header::CONTENT_TYPE, "application/json")], body).into_response())
}

/// Builds the cookie that hands a freshly minted session back to the client.
fn session_cookie(session_id: SessionId, config: &Config) -> Cookie<'static> {
    let mut cookie = Cookie::new(SESSION_COOKIE, session_id.to_string());

    cookie.set_http_only(true);
    if config.secure_cookies {
        cookie.set_secure(true);
    }
    cookie.set_same_site(SameSite::Lax);
    cookie.set_max_age(Duration::days(config.session_duration_days));
    cookie.set_path("/");

    cookie
}

/// Creates a meal, minting a session cookie if the caller has none.
#[axum::debug_handler]
pub async fn create_meal(
    State(state): State<AppState>,
    cookies: Cookies,
    ValidJson(req): ValidJson<CreateMealRequest>,
) -> Result<Response> {
    let existing = cookies.get(SESSION_COOKIE);
    let (session_id, is_new) = ensure_session(existing.as_ref().map(|c| c.value()));

    meal_service::create_meal(&state, session_id, req.into()).await?;

    if is_new {
        cookies.add(session_cookie(session_id, &state.config));
        tracing::info!("✅ New session minted: {}", session_id);
    }

    Ok(StatusCode::CREATED.into_response())
}

/// Lists the caller's meals.
#[axum::debug_handler]
pub async fn list_meals(
    State(state): State<AppState>,
    Extension(session_id): Extension<SessionId>,
) -> Result<Response> {
    let meals = meal_service::list_meals(&state, session_id).await?;
    json_response(StatusCode::OK, &MealsBody { meals })
}

/// Fetches one meal. An unknown id yields `{"meal": []}`.
#[axum::debug_handler]
pub async fn get_meal(
    State(state): State<AppState>,
    Extension(session_id): Extension<SessionId>,
    MealId(meal_id): MealId,
) -> Result<Response> {
    let meal = meal_service::get_meal(&state, session_id, meal_id).await?;
    json_response(StatusCode::OK, &MealBody { meal })
}

/// Applies a partial update to one of the caller's meals.
#[axum::debug_handler]
pub async fn update_meal(
    State(state): State<AppState>,
    Extension(session_id): Extension<SessionId>,
    MealId(meal_id): MealId,
    ValidJson(req): ValidJson<UpdateMealRequest>,
) -> Result<Response> {
    meal_service::update_meal(&state, session_id, meal_id, req.into()).await?;
    Ok(StatusCode::ACCEPTED.into_response())
}

/// Deletes one of the caller's meals.
#[axum::debug_handler]
pub async fn delete_meal(
    State(state): State<AppState>,
    Extension(session_id): Extension<SessionId>,
    MealId(meal_id): MealId,
) -> Result<Response> {
    meal_service::delete_meal(&state, session_id, meal_id).await?;
    Ok(StatusCode::ACCEPTED.into_response())
}

/// Returns the caller's totals and adherence ratio.
#[axum::debug_handler]
pub async fn summary(
    State(state): State<AppState>,
    Extension(session_id): Extension<SessionId>,
) -> Result<Response> {
    let summary = meal_service::summarize_meals(&state, session_id).await?;
    json_response(StatusCode::OK, &SummaryBody { summary })
}
