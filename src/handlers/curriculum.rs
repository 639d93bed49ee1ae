use actix_web::{delete, get, post, web::{self, Json}, HttpResponse};
use sqlx::types::Uuid;

use crate::{authoring, errors::AppError, schema::{course::{LessonInput, ModuleInput, ResourceInput}, Deleted}, GlobalState};

use super::success;

#[get("/{id}/modules")]
pub async fn list_modules(data:web::Data<GlobalState>, path:web::Path<Uuid>) -> Result<HttpResponse, AppError> {
    let outline = authoring::course_outline(data.store.as_ref(), path.into_inner()).await?;
    Ok(success(outline.modules))
}

/// Creates the module when the body carries no id, updates it otherwise.
#[post("/{id}/modules")]
pub async fn upsert_module(data:web::Data<GlobalState>, path:web::Path<Uuid>, module:Json<ModuleInput>) -> Result<HttpResponse, AppError> {
    let module = authoring::upsert_module(data.store.as_ref(), path.into_inner(), &module).await?;
    Ok(success(module))
}

#[delete("/{id}/modules/{module_id}")]
pub async fn delete_module(data:web::Data<GlobalState>, path:web::Path<(Uuid, Uuid)>) -> Result<HttpResponse, AppError> {
    let (course_id, module_id) = path.into_inner();
    authoring::delete_module(data.store.as_ref(), course_id, module_id).await?;
    Ok(success(Deleted{id: module_id}))
}

#[post("/{id}/modules/{module_id}/lessons")]
pub async fn upsert_lesson(data:web::Data<GlobalState>, path:web::Path<(Uuid, Uuid)>, lesson:Json<LessonInput>) -> Result<HttpResponse, AppError> {
    let (course_id, module_id) = path.into_inner();
    let lesson = authoring::upsert_lesson(data.store.as_ref(), course_id, module_id, &lesson).await?;
    Ok(success(lesson))
}

#[delete("/{id}/modules/{module_id}/lessons/{lesson_id}")]
pub async fn delete_lesson(data:web::Data<GlobalState>, path:web::Path<(Uuid, Uuid, Uuid)>) -> Result<HttpResponse, AppError> {
    let (course_id, module_id, lesson_id) = path.into_inner();
    authoring::delete_lesson(data.store.as_ref(), course_id, module_id, lesson_id).await?;
    Ok(success(Deleted{id: lesson_id}))
}

#[get("/{id}/resources")]
pub async fn list_resources(data:web::Data<GlobalState>, path:web::Path<Uuid>) -> Result<HttpResponse, AppError> {
    let course_id = path.into_inner();
    data.store.get_course(course_id).await?;
    let resources = data.store.list_resources(course_id).await?;
    Ok(success(resources))
}

#[post("/{id}/resources")]
pub async fn upsert_resource(data:web::Data<GlobalState>, path:web::Path<Uuid>, resource:Json<ResourceInput>) -> Result<HttpResponse, AppError> {
    let resource = authoring::upsert_resource(data.store.as_ref(), path.into_inner(), &resource).await?;
    Ok(success(resource))
}

#[delete("/{id}/resources/{resource_id}")]
pub async fn delete_resource(data:web::Data<GlobalState>, path:web::Path<(Uuid, Uuid)>) -> Result<HttpResponse, AppError> {
    let (course_id, resource_id) = path.into_inner();
    authoring::delete_resource(data.store.as_ref(), course_id, resource_id).await?;
    Ok(success(Deleted{id: resource_id}))
}
