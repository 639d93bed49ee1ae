use actix_web::{delete, get, post, put, web::{self, Json}, HttpResponse};
use sqlx::types::Uuid;
use validator::Validate;

use crate::{errors::AppError, schema::{people::StudentInput, Deleted}, GlobalState};

use super::{created, success};

#[get("")]
pub async fn list_students(data:web::Data<GlobalState>) -> Result<HttpResponse, AppError> {
    Ok(success(data.store.list_students().await?))
}

#[post("")]
pub async fn create_student(data:web::Data<GlobalState>, student:Json<StudentInput>) -> Result<HttpResponse, AppError> {
    student.validate()?;
    Ok(created(data.store.create_student(&student).await?))
}

#[get("/{id}")]
pub async fn get_student(data:web::Data<GlobalState>, path:web::Path<Uuid>) -> Result<HttpResponse, AppError> {
    Ok(success(data.store.get_student(path.into_inner()).await?))
}

#[put("/{id}")]
pub async fn update_student(data:web::Data<GlobalState>, path:web::Path<Uuid>, student:Json<StudentInput>) -> Result<HttpResponse, AppError> {
    student.validate()?;
    Ok(success(data.store.update_student(path.into_inner(), &student).await?))
}

#[delete("/{id}")]
pub async fn delete_student(data:web::Data<GlobalState>, path:web::Path<Uuid>) -> Result<HttpResponse, AppError> {
    let id = path.into_inner();
    data.store.delete_student(id).await?;
    Ok(success(Deleted{id}))
}
