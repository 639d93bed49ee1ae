use actix_web::{get, web, HttpResponse};

use crate::{errors::AppError, GlobalState};

use super::success;

#[get("")]
pub async fn get_dashboard(data:web::Data<GlobalState>) -> Result<HttpResponse, AppError> {
    Ok(success(data.store.dashboard_stats().await?))
}
