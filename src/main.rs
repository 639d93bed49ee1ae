use std::sync::Arc;

use actix_web::{middleware::Logger, web, App, HttpServer};
use course_admin::{config::{AppConfig, StoreKind}, errors::AppError, handlers, store::{MemoryStore, PgStore, Store}, GlobalState};
use dotenv::dotenv;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

async fn open_store(config: &AppConfig) -> Result<Arc<dyn Store>, AppError> {
    match config.store {
        StoreKind::Memory => {
            tracing::warn!("using the in-memory store, data is lost on restart");
            Ok(Arc::new(MemoryStore::new()))
        }
        StoreKind::Postgres => {
            let database_url = config
                .database_url
                .as_deref()
                .ok_or_else(|| AppError::Config("DATABASE_URL must be set".to_string()))?;

            let store = PgStore::connect(database_url, config.db_max_connections)
                .await
                .map_err(|e| {
                    tracing::error!(error = %e, "database connection failed");
                    AppError::DbConnect
                })?;

            store.migrate().await.map_err(|e| {
                tracing::error!(error = %e, "migrations failed");
                AppError::Migration
            })?;
            tracing::info!("database migrations applied");

            Ok(Arc::new(store))
        }
    }
}

#[actix_web::main]
async fn main() -> Result<(), AppError> {

    dotenv().ok();

    tracing_subscriber::registry()
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| "course_admin=debug,actix_web=info".into()))
        .with(tracing_subscriber::fmt::layer())
        .init();

    let config = AppConfig::from_env()?;
    let address = config.address();

    let store = open_store(&config).await?;

    let app_data = web::Data::new(GlobalState{store, config});

    tracing::info!(%address, "server starting");

    HttpServer::new(
        move||{
            App::new()
            .wrap(Logger::default())
            .app_data(app_data.clone())
            .configure(handlers::configure)
        }
    ).bind(&address)
    .map_err(|_e|AppError::SocketBind)?
    .run()
    .await
    .map_err(|_e|AppError::ServerStart)?;

    Ok(())

}
