use async_trait::async_trait;
use deadpool_postgres::Pool;
use uuid::Uuid;

use crate::{
    error::{AppError, Result},
    models::{meal::Meal, session::SessionId},
};

/// Persistence seam for the meal ledger.
///
/// Every read is scoped to a session. Writes after the existence check
/// (`update`, `delete`) address the row by id alone.
#[async_trait]
pub trait MealStore: Send + Sync {
    /// A short name for logs.
    fn backend_tag(&self) -> &'static str;

    /// Inserts a new meal.
    async fn insert(&self, meal: &Meal) -> Result<()>;

    /// Returns every meal owned by `session_id`, in storage order.
    async fn list(&self, session_id: SessionId) -> Result<Vec<Meal>>;

    /// Finds the meal `id` if `session_id` owns it.
    async fn find(&self, session_id: SessionId, id: Uuid) -> Result<Option<Meal>>;

    /// Overwrites the mutable fields of the meal with `meal.id`.
    async fn update(&self, meal: &Meal) -> Result<()>;

    /// Deletes the meal with `id`.
    async fn delete(&self, id: Uuid) -> Result<()>;

    /// Counts the session's meals, optionally restricted to one `is_diet` value.
    async fn count(&self, session_id: SessionId, is_diet: Option<bool>) -> Result<i64>;
}

/// `MealStore` backed by PostgreSQL through a deadpool connection pool.
#[derive(Clone)]
pub struct PgMealStore {
    pool: Pool,
}

impl PgMealStore {
    pub fn new(pool: Pool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl MealStore for PgMealStore {
    fn backend_tag(&self) -> &'static str {
        "postgres"
    }

    async fn insert(&self, meal: &Meal) -> Result<()> {
        let client = self.pool.get().await?;
        client
            .execute(
                r#"
                INSERT INTO meal (id, name, description, date, is_diet, session_id)
                VALUES ($1, $2, $3, $4, $5, $6)
                "#,
                &[
                    &meal.id,
                    &meal.name,
                    &meal.description,
                    &meal.date,
                    &meal.is_diet,
                    meal.session_id.as_uuid(),
                ],
            )
            .await?;
        Ok(())
    }

    async fn list(&self, session_id: SessionId) -> Result<Vec<Meal>> {
        let client = self.pool.get().await?;
        let rows = client
            .query(
                r#"
                SELECT id, name, description, date, is_diet, session_id
                FROM meal
                WHERE session_id = $1
                "#,
                &[session_id.as_uuid()],
            )
            .await?;
        rows.iter().map(Meal::try_from).collect()
    }

    async fn find(&self, session_id: SessionId, id: Uuid) -> Result<Option<Meal>> {
        let client = self.pool.get().await?;
        let row = client
            .query_opt(
                r#"
                SELECT id, name, description, date, is_diet, session_id
                FROM meal
                WHERE session_id = $1 AND id = $2
                "#,
                &[session_id.as_uuid(), &id],
            )
            .await?;
        row.as_ref().map(Meal::try_from).transpose()
    }

    async fn update(&self, meal: &Meal) -> Result<()> {
        let client = self.pool.get().await?;
        client
            .execute(
                r#"
                UPDATE meal
                SET
                    name = $1,
                    description = $2,
                    date = $3,
                    is_diet = $4
                WHERE id = $5
                "#,
                &[&meal.name, &meal.description, &meal.date, &meal.is_diet, &meal.id],
            )
            .await?;
        Ok(())
    }

    async fn delete(&self, id: Uuid) -> Result<()> {
        let client = self.pool.get().await?;
        client
            .execute("DELETE FROM meal WHERE id = $1", &[&id])
            .await?;
        Ok(())
    }

    async fn count(&self, session_id: SessionId, is_diet: Option<bool>) -> Result<i64> {
        let client = self.pool.get().await?;
        let row = match is_diet {
            Some(is_diet) => {
                client
                    .query_one(
                        "SELECT COUNT(*) AS total FROM meal WHERE session_id = $1 AND is_diet = $2",
                        &[session_id.as_uuid(), &is_diet],
                    )
                    .await?
            }
            None => {
                client
                    .query_one(
                        "SELECT COUNT(*) AS total FROM meal WHERE session_id = $1",
                        &[session_id.as_uuid()],
                    )
                    .await?
            }
        };
        row.try_get("total")
            .map_err(|_| AppError::MissingData("total".to_string()))
    }
}
