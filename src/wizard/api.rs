//! The wizard's view of the course routes.

use std::sync::Arc;

use actix_web::ResponseError;
use async_trait::async_trait;
use reqwest::{header, Client, Method, RequestBuilder};
use serde::{de::DeserializeOwned, Serialize};
use uuid::Uuid;

use crate::{
    authoring,
    errors::AppError,
    models::{course::Course, lesson::Lesson, module::Module, resource::Resource},
    schema::{
        course::{CourseDetails, CoursePatch, CreateCourse, LessonInput, ModuleInput, PublishRequest, ResourceInput},
        ApiResponse, Deleted,
    },
    store::Store,
};

#[derive(Debug, thiserror::Error)]
pub enum ApiError {
    #[error("request failed: {0}")]
    Http(#[from] reqwest::Error),
    /// The server answered with `success: false`.
    #[error("{message}")]
    Status { status: u16, message: String },
    #[error("server response carried no data")]
    EmptyResponse,
    #[error("{0}")]
    Rejected(String),
}

impl ApiError {
    pub fn status(&self) -> Option<u16> {
        match self {
            ApiError::Status { status, .. } => Some(*status),
            _ => None,
        }
    }
}

impl From<AppError> for ApiError {
    fn from(err: AppError) -> Self {
        ApiError::Status { status: err.status_code().as_u16(), message: err.to_string() }
    }
}

/// Course routes the wizard calls. Upserts create when the payload has no id
/// and update the identified record otherwise.
#[async_trait]
pub trait CourseApi: Send + Sync {
    /// Creates the course when `id` is `None`, otherwise replaces its details.
    async fn save_course(&self, id: Option<Uuid>, details: &CourseDetails) -> Result<Course, ApiError>;

    async fn set_published(&self, id: Uuid, published: bool) -> Result<Course, ApiError>;

    async fn upsert_module(&self, course_id: Uuid, input: &ModuleInput) -> Result<Module, ApiError>;

    async fn delete_module(&self, course_id: Uuid, module_id: Uuid) -> Result<(), ApiError>;

    async fn upsert_lesson(&self, course_id: Uuid, module_id: Uuid, input: &LessonInput) -> Result<Lesson, ApiError>;

    async fn delete_lesson(&self, course_id: Uuid, module_id: Uuid, lesson_id: Uuid) -> Result<(), ApiError>;

    async fn upsert_resource(&self, course_id: Uuid, input: &ResourceInput) -> Result<Resource, ApiError>;

    async fn delete_resource(&self, course_id: Uuid, resource_id: Uuid) -> Result<(), ApiError>;
}

/// Talks to a running server over HTTP with a bearer token from `/api/auth/signin`.
pub struct HttpCourseApi {
    base_url: String,
    token: Option<String>,
    client: Client,
}

impl HttpCourseApi {
    pub fn new(base_url: &str) -> Self {
        HttpCourseApi {
            base_url: base_url.trim_end_matches('/').to_string(),
            token: None,
            client: Client::builder()
                .timeout(std::time::Duration::from_secs(30))
                .build()
                .unwrap_or_else(|_| Client::new()),
        }
    }

    pub fn with_token(mut self, token: impl Into<String>) -> Self {
        self.token = Some(token.into());
        self
    }

    fn request(&self, method: Method, path: &str) -> RequestBuilder {
        let request = self
            .client
            .request(method, format!("{}/api{path}", self.base_url))
            .header(header::ACCEPT, "application/json");
        match &self.token {
            Some(token) => request.bearer_auth(token),
            None => request,
        }
    }

    async fn send<T: DeserializeOwned>(&self, request: RequestBuilder) -> Result<T, ApiError> {
        let response = request.send().await?;
        let status = response.status();
        let body: ApiResponse<T> = response.json().await?;
        if !body.success {
            return Err(ApiError::Status {
                status: status.as_u16(),
                message: body.error.unwrap_or_else(|| status.to_string()),
            });
        }
        body.data.ok_or(ApiError::EmptyResponse)
    }

    async fn send_json<B: Serialize + Sync, T: DeserializeOwned>(&self, method: Method, path: &str, body: &B) -> Result<T, ApiError> {
        self.send(self.request(method, path).json(body)).await
    }

    async fn delete(&self, path: &str) -> Result<(), ApiError> {
        self.send::<Deleted>(self.request(Method::DELETE, path)).await?;
        Ok(())
    }
}

#[async_trait]
impl CourseApi for HttpCourseApi {
    async fn save_course(&self, id: Option<Uuid>, details: &CourseDetails) -> Result<Course, ApiError> {
        match id {
            None => self.send_json(Method::POST, "/courses", &CreateCourse::from(details)).await,
            Some(id) => self.send_json(Method::PUT, &format!("/courses/{id}"), details).await,
        }
    }

    async fn set_published(&self, id: Uuid, published: bool) -> Result<Course, ApiError> {
        self.send_json(Method::PATCH, &format!("/courses/{id}"), &PublishRequest { published }).await
    }

    async fn upsert_module(&self, course_id: Uuid, input: &ModuleInput) -> Result<Module, ApiError> {
        self.send_json(Method::POST, &format!("/courses/{course_id}/modules"), input).await
    }

    async fn delete_module(&self, course_id: Uuid, module_id: Uuid) -> Result<(), ApiError> {
        self.delete(&format!("/courses/{course_id}/modules/{module_id}")).await
    }

    async fn upsert_lesson(&self, course_id: Uuid, module_id: Uuid, input: &LessonInput) -> Result<Lesson, ApiError> {
        self.send_json(Method::POST, &format!("/courses/{course_id}/modules/{module_id}/lessons"), input).await
    }

    async fn delete_lesson(&self, course_id: Uuid, module_id: Uuid, lesson_id: Uuid) -> Result<(), ApiError> {
        self.delete(&format!("/courses/{course_id}/modules/{module_id}/lessons/{lesson_id}")).await
    }

    async fn upsert_resource(&self, course_id: Uuid, input: &ResourceInput) -> Result<Resource, ApiError> {
        self.send_json(Method::POST, &format!("/courses/{course_id}/resources"), input).await
    }

    async fn delete_resource(&self, course_id: Uuid, resource_id: Uuid) -> Result<(), ApiError> {
        self.delete(&format!("/courses/{course_id}/resources/{resource_id}")).await
    }
}

/// Runs the same authoring operations as the HTTP routes directly against a store.
#[derive(Clone)]
pub struct StoreApi {
    store: Arc<dyn Store>,
}

impl StoreApi {
    pub fn new(store: Arc<dyn Store>) -> Self {
        StoreApi { store }
    }
}

#[async_trait]
impl CourseApi for StoreApi {
    async fn save_course(&self, id: Option<Uuid>, details: &CourseDetails) -> Result<Course, ApiError> {
        let store = self.store.as_ref();
        let course = match id {
            None => authoring::create_course(store, &CreateCourse::from(details)).await?,
            Some(id) => authoring::replace_course(store, id, details).await?,
        };
        Ok(course)
    }

    async fn set_published(&self, id: Uuid, published: bool) -> Result<Course, ApiError> {
        let patch = CoursePatch { published: Some(published), ..Default::default() };
        Ok(authoring::patch_course(self.store.as_ref(), id, &patch).await?)
    }

    async fn upsert_module(&self, course_id: Uuid, input: &ModuleInput) -> Result<Module, ApiError> {
        Ok(authoring::upsert_module(self.store.as_ref(), course_id, input).await?)
    }

    async fn delete_module(&self, course_id: Uuid, module_id: Uuid) -> Result<(), ApiError> {
        Ok(authoring::delete_module(self.store.as_ref(), course_id, module_id).await?)
    }

    async fn upsert_lesson(&self, course_id: Uuid, module_id: Uuid, input: &LessonInput) -> Result<Lesson, ApiError> {
        Ok(authoring::upsert_lesson(self.store.as_ref(), course_id, module_id, input).await?)
    }

    async fn delete_lesson(&self, course_id: Uuid, module_id: Uuid, lesson_id: Uuid) -> Result<(), ApiError> {
        Ok(authoring::delete_lesson(self.store.as_ref(), course_id, module_id, lesson_id).await?)
    }

    async fn upsert_resource(&self, course_id: Uuid, input: &ResourceInput) -> Result<Resource, ApiError> {
        Ok(authoring::upsert_resource(self.store.as_ref(), course_id, input).await?)
    }

    async fn delete_resource(&self, course_id: Uuid, resource_id: Uuid) -> Result<(), ApiError> {
        Ok(authoring::delete_resource(self.store.as_ref(), course_id, resource_id).await?)
    }
}
