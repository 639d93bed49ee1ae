use actix_web::{cookie::{time, Cookie, SameSite}, post, web::{self, Json}, HttpResponse};
use validator::Validate;

use crate::{errors::AppError, middlewares::session::SESSION_COOKIE, schema::{admin::CreateAdmin, ApiResponse, EmailAndPassword, SigninResponse, SignupResponse}, utils::{hash_password, issue_token, verify_password}, GlobalState};

use super::{created, success};

#[post("/signup")]
async fn signup_admin(data:web::Data<GlobalState>, admin:Json<CreateAdmin>) -> Result<HttpResponse, AppError>{
    admin.validate()?;

    let password_hash = hash_password(&admin.password).map_err(|e| {
        tracing::error!(error = %e, "password hashing failed");
        AppError::InternalError
    })?;

    let admin_meta = CreateAdmin{
        email: admin.email.trim().to_string(),
        name: admin.name.trim().to_string(),
        password: password_hash,
    };

    let created_admin = data.store.create_admin(&admin_meta).await?;
    tracing::info!(admin_id = %created_admin.id, "admin signed up");

    Ok(created(SignupResponse{message:String::from("Signed up successfully"), id: created_admin.id}))
}

#[post("/signin")]
async fn signin_admin(data:web::Data<GlobalState>, admin_data:Json<EmailAndPassword>) -> Result<HttpResponse, AppError> {
    let invalid = || AppError::Unauthorized("Invalid email or password".to_string());

    let admin = data
        .store
        .find_admin_by_email(admin_data.email.trim())
        .await?
        .ok_or_else(invalid)?;

    verify_password(&admin_data.password, &admin.password).map_err(|_| invalid())?;

    let config = &data.config;
    let token = issue_token(&admin.email, &config.jwt_secret, config.session_ttl_hours).map_err(|e| {
        tracing::error!(error = %e, "token signing failed");
        AppError::InternalError
    })?;

    let cookie = Cookie::build(SESSION_COOKIE, token.clone())
        .path("/")
        .http_only(true)
        .same_site(SameSite::Lax)
        .max_age(time::Duration::hours(config.session_ttl_hours))
        .finish();

    Ok(HttpResponse::Ok()
        .cookie(cookie)
        .json(ApiResponse::ok(SigninResponse{message:String::from("Signed in successfully"), token})))
}

#[post("/signout")]
async fn signout_admin() -> HttpResponse {
    let mut cookie = Cookie::build(SESSION_COOKIE, "").path("/").finish();
    cookie.make_removal();

    let mut response = success("Signed out");
    if let Err(e) = response.add_cookie(&cookie) {
        tracing::warn!(error = %e, "could not clear session cookie");
    }
    response
}
