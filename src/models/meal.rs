use chrono::{DateTime, FixedOffset};
use serde::{Deserialize, Serialize};
use tokio_postgres::Row;
use uuid::Uuid;

use crate::{
    error::{AppError, Result},
    models::session::SessionId,
};

/// A logged meal, owned by exactly one session.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Meal {
    /// The unique identifier for the meal.
    pub id: Uuid,
    /// The name of the meal. Never empty.
    pub name: String,
    /// Free-form description.
    pub description: String,
    /// When the meal was eaten, with the offset the client sent.
    pub date: DateTime<FixedOffset>,
    /// Whether the meal complies with the diet.
    pub is_diet: bool,
    /// The session that created the meal.
    pub session_id: SessionId,
}

impl Meal {
    /// Builds a new meal with a fresh id under `session_id`.
    pub fn new(session_id: SessionId, new_meal: NewMeal) -> Self {
        Self {
            id: Uuid::new_v4(),
            name: new_meal.name,
            description: new_meal.description,
            date: new_meal.date,
            is_diet: new_meal.is_diet,
            session_id,
        }
    }
}

impl TryFrom<&Row> for Meal {
    type Error = AppError;

    fn try_from(row: &Row) -> Result<Self> {
        Ok(Self {
            id: row.try_get("id").map_err(|_| AppError::MissingData("id".to_string()))?,
            name: row.try_get("name").map_err(|_| AppError::MissingData("name".to_string()))?,
            description: row.try_get("description").map_err(|_| AppError::MissingData("description".to_string()))?,
            date: row.try_get("date").map_err(|_| AppError::MissingData("date".to_string()))?,
            is_diet: row.try_get("is_diet").map_err(|_| AppError::MissingData("is_diet".to_string()))?,
            session_id: row
                .try_get("session_id")
                .map(SessionId)
                .map_err(|_| AppError::MissingData("session_id".to_string()))?,
        })
    }
}

/// The fields supplied when creating a meal.
#[derive(Debug, Clone)]
pub struct NewMeal {
    pub name: String,
    pub description: String,
    pub date: DateTime<FixedOffset>,
    pub is_diet: bool,
}

/// A partial update. `None` keeps the stored value, `Some` always overwrites it.
#[derive(Debug, Clone, Default)]
pub struct MealChanges {
    pub name: Option<String>,
    pub description: Option<String>,
    pub date: Option<DateTime<FixedOffset>>,
    pub is_diet: Option<bool>,
}

impl MealChanges {
    pub fn is_empty(&self) -> bool {
        self.name.is_none()
            && self.description.is_none()
            && self.date.is_none()
            && self.is_diet.is_none()
    }

    /// Merges the supplied fields into `meal`. `id` and `session_id` are untouched.
    pub fn apply_to(self, meal: &mut Meal) {
        if let Some(name) = self.name {
            meal.name = name;
        }
        if let Some(description) = self.description {
            meal.description = description;
        }
        if let Some(date) = self.date {
            meal.date = date;
        }
        if let Some(is_diet) = self.is_diet {
            meal.is_diet = is_diet;
        }
    }
}

/// Per-session totals.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct MealSummary {
    pub total_meals: i64,
    pub total_meals_in_diet: i64,
    pub total_off_diet_meals: i64,
    /// `round(total_meals_in_diet / total_meals)`, or 0 for a session with no meals.
    pub adherence_ratio: i64,
}

impl MealSummary {
    pub fn from_counts(total_meals: i64, total_meals_in_diet: i64, total_off_diet_meals: i64) -> Self {
        let adherence_ratio = if total_meals == 0 {
            0
        } else {
            (total_meals_in_diet as f64 / total_meals as f64).round() as i64
        };

        Self {
            total_meals,
            total_meals_in_diet,
            total_off_diet_meals,
            adherence_ratio,
        }
    }
}
