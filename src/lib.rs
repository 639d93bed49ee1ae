use std::sync::Arc;

pub mod authoring;
pub mod config;
pub mod errors;
pub mod handlers;
pub mod middlewares;
pub mod models;
pub mod schema;
pub mod store;
pub mod utils;
pub mod wizard;

#[cfg(test)]
mod test_init_app;

use config::AppConfig;
use store::Store;

pub struct GlobalState{
    pub store: Arc<dyn Store>,
    pub config: AppConfig,
}
