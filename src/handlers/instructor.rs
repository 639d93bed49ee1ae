use actix_web::{delete, get, post, put, web::{self, Json}, HttpResponse};
use sqlx::types::Uuid;
use validator::Validate;

use crate::{errors::AppError, schema::{people::InstructorInput, Deleted}, GlobalState};

use super::{created, success};

#[get("")]
pub async fn list_instructors(data:web::Data<GlobalState>) -> Result<HttpResponse, AppError> {
    Ok(success(data.store.list_instructors().await?))
}

#[post("")]
pub async fn create_instructor(data:web::Data<GlobalState>, instructor:Json<InstructorInput>) -> Result<HttpResponse, AppError> {
    instructor.validate()?;
    Ok(created(data.store.create_instructor(&instructor).await?))
}

#[get("/{id}")]
pub async fn get_instructor(data:web::Data<GlobalState>, path:web::Path<Uuid>) -> Result<HttpResponse, AppError> {
    Ok(success(data.store.get_instructor(path.into_inner()).await?))
}

#[put("/{id}")]
pub async fn update_instructor(data:web::Data<GlobalState>, path:web::Path<Uuid>, instructor:Json<InstructorInput>) -> Result<HttpResponse, AppError> {
    instructor.validate()?;
    Ok(success(data.store.update_instructor(path.into_inner(), &instructor).await?))
}

#[delete("/{id}")]
pub async fn delete_instructor(data:web::Data<GlobalState>, path:web::Path<Uuid>) -> Result<HttpResponse, AppError> {
    let id = path.into_inner();
    data.store.delete_instructor(id).await?;
    Ok(success(Deleted{id}))
}
