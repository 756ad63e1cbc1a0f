use axum::{
    Json,
    extract::{FromRequest, FromRequestParts, Path, Request},
    http::request::Parts,
};
use chrono::{DateTime, FixedOffset};
use garde::Validate;
use serde::{Deserialize, de::DeserializeOwned};
use uuid::Uuid;

use crate::{
    error::AppError,
    models::meal::{MealChanges, NewMeal},
};

/// The request payload for creating a meal.
///
/// `date` must be RFC 3339 with an offset (`Z` counts).
#[derive(Deserialize, Validate, Debug)]
pub struct CreateMealRequest {
    #[garde(length(min = 1))]
    pub name: String,
    #[garde(skip)]
    pub description: String,
    #[garde(skip)]
    pub date: DateTime<FixedOffset>,
    #[garde(skip)]
    pub is_diet: bool,
}

impl From<CreateMealRequest> for NewMeal {
    fn from(req: CreateMealRequest) -> Self {
        Self {
            name: req.name,
            description: req.description,
            date: req.date,
            is_diet: req.is_diet,
        }
    }
}

/// The request payload for updating a meal. Absent and `null` fields are kept.
#[derive(Deserialize, Validate, Debug, Default)]
pub struct UpdateMealRequest {
    #[garde(length(min = 1))]
    #[serde(default)]
    pub name: Option<String>,
    #[garde(skip)]
    #[serde(default)]
    pub description: Option<String>,
    #[garde(skip)]
    #[serde(default)]
    pub date: Option<DateTime<FixedOffset>>,
    #[garde(skip)]
    #[serde(default)]
    pub is_diet: Option<bool>,
}

impl From<UpdateMealRequest> for MealChanges {
    fn from(req: UpdateMealRequest) -> Self {
        Self {
            name: req.name,
            description: req.description,
            date: req.date,
            is_diet: req.is_diet,
        }
    }
}

/// A JSON body that has been deserialized and passed its `garde` rules.
pub struct ValidJson<T>(pub T);

impl<T, S> FromRequest<S> for ValidJson<T>
where
    T: DeserializeOwned + Validate,
    T::Context: Default,
    S: Send + Sync,
{
    type Rejection = AppError;

    async fn from_request(req: Request, state: &S) -> Result<Self, Self::Rejection> {
        let Json(value) = Json::<T>::from_request(req, state).await?;
        value
            .validate()
            .map_err(|report| AppError::Validation(report.to_string().trim_end().to_string()))?;
        Ok(Self(value))
    }
}

/// The `{id}` path segment, required to be a UUID.
pub struct MealId(pub Uuid);

impl<S> FromRequestParts<S> for MealId
where
    S: Send + Sync,
{
    type Rejection = AppError;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        let Path(raw) = Path::<String>::from_request_parts(parts, state).await?;
        Uuid::parse_str(&raw)
            .map(Self)
            .map_err(|_| AppError::Validation(format!("id: invalid uuid `{}`", raw)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn create_request_rejects_empty_name() {
        let req: CreateMealRequest = serde_json::from_str(
            r#"{"name":"","description":"x","date":"2024-01-01T12:00:00Z","is_diet":true}"#,
        )
        .unwrap();
        let report = req.validate().unwrap_err();
        assert!(report.to_string().contains("name"));
    }

    #[test]
    fn create_request_requires_offset_in_date() {
        let parsed = serde_json::from_str::<CreateMealRequest>(
            r#"{"name":"Lunch","description":"x","date":"2024-01-01T12:00:00","is_diet":true}"#,
        );
        assert!(parsed.is_err());
    }

    #[test]
    fn update_request_treats_null_as_absent() {
        let req: UpdateMealRequest =
            serde_json::from_str(r#"{"name":null,"is_diet":false}"#).unwrap();
        assert!(req.validate().is_ok());

        let changes = MealChanges::from(req);
        assert!(changes.name.is_none());
        assert_eq!(changes.is_diet, Some(false));
    }

    #[test]
    fn update_request_rejects_explicit_empty_name() {
        let req: UpdateMealRequest = serde_json::from_str(r#"{"name":""}"#).unwrap();
        assert!(req.validate().is_err());
    }
}
