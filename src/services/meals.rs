use uuid::Uuid;
use crate::{
    error::{AppError, Result},
    models::{
        meal::{Meal, MealChanges, MealSummary, NewMeal},
        session::SessionId,
    },
    state::AppState,
};

/// Creates a new meal under the caller's session.
///
/// # Arguments
///
/// * `state` - The application state.
/// * `session_id` - The caller's session.
/// * `new_meal` - The validated meal fields.
///
/// # Returns
///
/// A `Result` containing the stored `Meal`.
pub async fn create_meal(state: &AppState, session_id: SessionId, new_meal: NewMeal) -> Result<Meal> {
    let meal = Meal::new(session_id, new_meal);
    state.store.insert(&meal).await?;
    tracing::debug!("🍽️ Meal {} created for session {}", meal.id, session_id);
    Ok(meal)
}

/// Lists every meal of the caller's session.
pub async fn list_meals(state: &AppState, session_id: SessionId) -> Result<Vec<Meal>> {
    state.store.list(session_id).await
}

/// Fetches a meal by id.
///
/// A miss is an empty collection, not an error.
pub async fn get_meal(state: &AppState, session_id: SessionId, meal_id: Uuid) -> Result<Vec<Meal>> {
    Ok(state
        .store
        .find(session_id, meal_id)
        .await?
        .into_iter()
        .collect())
}

/// Merges `changes` into a meal owned by the caller.
///
/// # Arguments
///
/// * `state` - The application state.
/// * `session_id` - The caller's session.
/// * `meal_id` - The meal to update.
/// * `changes` - The fields to overwrite. Absent fields keep their stored value.
///
/// # Returns
///
/// `AppError::MealNotFound` if the session does not own `meal_id`.
pub async fn update_meal(
    state: &AppState,
    session_id: SessionId,
    meal_id: Uuid,
    changes: MealChanges,
) -> Result<Meal> {
    let mut meal = state
        .store
        .find(session_id, meal_id)
        .await?
        .ok_or(AppError::MealNotFound)?;

    if changes.is_empty() {
        return Ok(meal);
    }

    changes.apply_to(&mut meal);
    state.store.update(&meal).await?;
    tracing::debug!("✏️ Meal {} updated", meal.id);

    Ok(meal)
}

/// Deletes a meal owned by the caller.
///
/// Ownership is checked first; the delete itself targets the id.
pub async fn delete_meal(state: &AppState, session_id: SessionId, meal_id: Uuid) -> Result<()> {
    let meal = state
        .store
        .find(session_id, meal_id)
        .await?
        .ok_or(AppError::MealNotFound)?;

    state.store.delete(meal.id).await?;
    tracing::debug!("🗑️ Meal {} deleted", meal.id);

    Ok(())
}

/// Computes totals and the adherence ratio for the caller's session.
pub async fn summarize_meals(state: &AppState, session_id: SessionId) -> Result<MealSummary> {
    let total_meals = state.store.count(session_id, None).await?;
    let total_meals_in_diet = state.store.count(session_id, Some(true)).await?;
    let total_off_diet_meals = state.store.count(session_id, Some(false)).await?;

    Ok(MealSummary::from_counts(
        total_meals,
        total_meals_in_diet,
        total_off_diet_meals,
    ))
}
