use std::sync::Arc;

use actix_web::{body::MessageBody, dev::ServiceResponse, test::{self, TestRequest}, web, App, Error};
use actix_service::Service;
use actix_http::Request;

use crate::{config::{AppConfig, StoreKind}, handlers, schema::{admin::CreateAdmin, ApiResponse, EmailAndPassword, SigninResponse}, store::MemoryStore, GlobalState};

pub const TEST_JWT_SECRET: &str = "test-jwt-secret";
pub const TEST_PASSWORD: &str = "adminpass123";

pub fn test_config() -> AppConfig {
    AppConfig {
        store: StoreKind::Memory,
        database_url: None,
        host: "127.0.0.1".to_string(),
        port: 0,
        jwt_secret: TEST_JWT_SECRET.to_string(),
        session_ttl_hours: 1,
        db_max_connections: 1,
    }
}

/// The full `/api` app over a fresh in-memory store. The store is returned too so
/// tests can inspect what the routes wrote.
pub async fn init() -> (impl Service<Request, Response = ServiceResponse<impl MessageBody>, Error = Error>, Arc<MemoryStore>) {
    let store = Arc::new(MemoryStore::new());

    let global_state = GlobalState{ store: store.clone(), config: test_config() };
    let app_data = web::Data::new(global_state);

    let app = test::init_service(
        App::new()
            .app_data(app_data.clone())
            .configure(handlers::configure)
    ).await;

    (app, store)
}

/// Signs up (if needed) and signs in an admin, returning the bearer token.
pub async fn signed_in<S, B>(app: &S, email: &str) -> String
where
    S: Service<Request, Response = ServiceResponse<B>, Error = Error>,
    B: MessageBody,
{
    let admin = CreateAdmin {
        email: email.to_string(),
        name: String::from("Test Admin"),
        password: String::from(TEST_PASSWORD),
    };

    let _ = test::call_service(app, TestRequest::post().set_json(admin).uri("/api/auth/signup").to_request()).await;

    let creds = EmailAndPassword {
        email: email.to_string(),
        password: TEST_PASSWORD.to_string(),
    };

    let res = test::call_service(app, TestRequest::post().set_json(creds).uri("/api/auth/signin").to_request()).await;
    let body: ApiResponse<SigninResponse> = test::read_body_json(res).await;

    body.data.expect("signin returns a token").token
}

pub fn bearer(token: &str) -> (&'static str, String) {
    ("Authorization", format!("Bearer {token}"))
}
