use async_trait::async_trait;
use tokio::sync::RwLock;
use uuid::Uuid;

use crate::{
    error::Result,
    models::{meal::Meal, session::SessionId},
    repositories::meal::MealStore,
};

/// `MealStore` held in process memory, in insertion order.
///
/// Used by the test suite and when no `DATABASE_URL` is configured.
#[derive(Default)]
pub struct InMemoryMealStore {
    meals: RwLock<Vec<Meal>>,
}

impl InMemoryMealStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl MealStore for InMemoryMealStore {
    fn backend_tag(&self) -> &'static str {
        "memory"
    }

    async fn insert(&self, meal: &Meal) -> Result<()> {
        self.meals.write().await.push(meal.clone());
        Ok(())
    }

    async fn list(&self, session_id: SessionId) -> Result<Vec<Meal>> {
        Ok(self
            .meals
            .read()
            .await
            .iter()
            .filter(|meal| meal.session_id == session_id)
            .cloned()
            .collect())
    }

    async fn find(&self, session_id: SessionId, id: Uuid) -> Result<Option<Meal>> {
        Ok(self
            .meals
            .read()
            .await
            .iter()
            .find(|meal| meal.session_id == session_id && meal.id == id)
            .cloned())
    }

    async fn update(&self, meal: &Meal) -> Result<()> {
        let mut meals = self.meals.write().await;
        if let Some(stored) = meals.iter_mut().find(|stored| stored.id == meal.id) {
            stored.name = meal.name.clone();
            stored.description = meal.description.clone();
            stored.date = meal.date;
            stored.is_diet = meal.is_diet;
        }
        Ok(())
    }

    async fn delete(&self, id: Uuid) -> Result<()> {
        self.meals.write().await.retain(|meal| meal.id != id);
        Ok(())
    }

    async fn count(&self, session_id: SessionId, is_diet: Option<bool>) -> Result<i64> {
        let count = self
            .meals
            .read()
            .await
            .iter()
            .filter(|meal| meal.session_id == session_id)
            .filter(|meal| is_diet.is_none_or(|flag| meal.is_diet == flag))
            .count();
        Ok(count as i64)
    }
}
