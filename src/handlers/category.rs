use actix_web::{delete, get, post, put, web::{self, Json}, HttpResponse};
use sqlx::types::Uuid;
use validator::Validate;

use crate::{errors::AppError, models::category::Category, schema::{category::CategoryInput, Deleted}, utils::slugify, GlobalState};

use super::{created, success};

fn to_category(id:Uuid, input:&CategoryInput) -> Result<Category, AppError> {
    input.validate()?;

    let slug = match input.slug.as_deref() {
        Some(slug) => slugify(slug),
        None => slugify(&input.name),
    };
    if slug.is_empty() {
        return Err(AppError::Validation("slug: must contain letters or digits".to_string()));
    }

    Ok(Category{
        id,
        name: input.name.trim().to_string(),
        slug,
        description: input.description.clone(),
    })
}

#[get("")]
pub async fn list_categories(data:web::Data<GlobalState>) -> Result<HttpResponse, AppError> {
    Ok(success(data.store.list_categories().await?))
}

#[post("")]
pub async fn create_category(data:web::Data<GlobalState>, category:Json<CategoryInput>) -> Result<HttpResponse, AppError> {
    let category = to_category(Uuid::new_v4(), &category)?;
    Ok(created(data.store.create_category(&category).await?))
}

#[get("/{id}")]
pub async fn get_category(data:web::Data<GlobalState>, path:web::Path<Uuid>) -> Result<HttpResponse, AppError> {
    Ok(success(data.store.get_category(path.into_inner()).await?))
}

#[put("/{id}")]
pub async fn update_category(data:web::Data<GlobalState>, path:web::Path<Uuid>, category:Json<CategoryInput>) -> Result<HttpResponse, AppError> {
    let category = to_category(path.into_inner(), &category)?;
    Ok(success(data.store.update_category(&category).await?))
}

#[delete("/{id}")]
pub async fn delete_category(data:web::Data<GlobalState>, path:web::Path<Uuid>) -> Result<HttpResponse, AppError> {
    let id = path.into_inner();
    data.store.delete_category(id).await?;
    Ok(success(Deleted{id}))
}
