pub mod config;
pub mod error;
pub mod state;
pub mod db;
pub mod routes;

pub mod models {
    pub mod meal;
    pub mod session;
}

pub mod repositories {
    pub mod meal;
    pub mod memory;
}

pub mod services {
    pub mod meals;
    pub mod session;
}

pub mod handlers {
    pub mod meals;
}

pub mod middleware_layer {
    pub mod session;
}

pub mod validation {
    pub mod meal;
}

pub use config::Config;
pub use error::{AppError, Result};
pub use routes::router;
pub use state::AppState;
