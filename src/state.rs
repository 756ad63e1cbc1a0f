use std::sync::Arc;
use crate::config::Config;
use crate::error::Result;
use crate::repositories::{meal::{MealStore, PgMealStore}, memory::InMemoryMealStore};

/// The application's state.
#[derive(Clone)]
pub struct AppState {
    /// The meal store every request goes through.
    pub store: Arc<dyn MealStore>,
    /// The application's configuration.
    pub config: Config,
}

impl AppState {
    /// Creates a new `AppState`.
    ///
    /// Connects to PostgreSQL and prepares the schema when `DATABASE_URL` is
    /// set; otherwise falls back to the in-memory store.
    ///
    /// # Arguments
    ///
    /// * `config` - The application's configuration.
    ///
    /// # Returns
    ///
    /// A `Result` containing the `AppState`.
    pub async fn new(config: &Config) -> Result<Self> {
        let store: Arc<dyn MealStore> = match config.database_url.as_deref() {
            Some(database_url) => {
                let pool = crate::db::create_pool(database_url, config.db_pool_max_size)?;
                tracing::info!("✅ PostgreSQL Pool initialized (max {} connections)", config.db_pool_max_size);

                crate::db::run_migrations(&pool).await?;
                Arc::new(PgMealStore::new(pool))
            }
            None => {
                tracing::warn!("⚠️ DATABASE_URL not set, meals are kept in memory and lost on restart");
                Arc::new(InMemoryMealStore::new())
            }
        };

        Ok(Self::with_store(store, config.clone()))
    }

    /// Builds the state around an already constructed store.
    pub fn with_store(store: Arc<dyn MealStore>, config: Config) -> Self {
        tracing::info!("✅ Meal store ready (backend: {})", store.backend_tag());
        Self { store, config }
    }
}
