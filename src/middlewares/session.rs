use actix_web::{
    body::{EitherBody, MessageBody},
    dev::{ServiceRequest, ServiceResponse},
    http::header,
    middleware::Next,
    web, Error, HttpMessage, HttpResponse, ResponseError,
};

use crate::{errors::AppError, schema::SessionAdmin, utils::decode_token, GlobalState};

pub const SESSION_COOKIE: &str = "session";
pub const LOGIN_PATH: &str = "/login";

/// Token from `Authorization: Bearer <token>`, falling back to the `session` cookie.
/// An explicit header wins over whatever cookie the client still carries.
fn session_token(req: &ServiceRequest) -> Option<String> {
    let from_header = req
        .headers()
        .get(header::AUTHORIZATION)
        .and_then(|value| value.to_str().ok())
        .map(|value| value.strip_prefix("Bearer ").unwrap_or(value).trim())
        .filter(|token| !token.is_empty())
        .map(str::to_string);

    from_header.or_else(|| req.cookie(SESSION_COOKIE).map(|cookie| cookie.value().to_string()))
}

fn wants_html(req: &ServiceRequest) -> bool {
    req.headers()
        .get(header::ACCEPT)
        .and_then(|accept| accept.to_str().ok())
        .is_some_and(|accept| accept.contains("text/html"))
}

fn authenticate(req: &ServiceRequest) -> Result<SessionAdmin, AppError> {
    let state = req
        .app_data::<web::Data<GlobalState>>()
        .ok_or(AppError::InternalError)?;

    let token = session_token(req).ok_or_else(|| AppError::Unauthorized("token missing".to_string()))?;

    let claims = decode_token(&token, &state.config.jwt_secret).map_err(|e| {
        tracing::debug!(error = %e, "rejected session token");
        AppError::Unauthorized("invalid or expired session".to_string())
    })?;

    Ok(SessionAdmin { email: claims.sub })
}

/// Rejects requests without a valid admin session. API clients get a 401 envelope;
/// browsers are sent to the login page.
pub async fn session_middleware(
    req: ServiceRequest,
    next: Next<impl MessageBody>,
) -> Result<ServiceResponse<EitherBody<impl MessageBody>>, Error> {
    match authenticate(&req) {
        Ok(admin) => {
            req.extensions_mut().insert(admin);
            next.call(req).await.map(ServiceResponse::map_into_left_body)
        }
        Err(err) => {
            let response = if wants_html(&req) {
                HttpResponse::SeeOther()
                    .insert_header((header::LOCATION, LOGIN_PATH))
                    .finish()
            } else {
                err.error_response()
            };
            Ok(req.into_response(response).map_into_right_body())
        }
    }
}
