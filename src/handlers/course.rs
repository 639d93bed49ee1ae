use actix_web::{delete, get, patch, post, put, web::{self, Json}, HttpResponse};
use sqlx::types::Uuid;

use crate::{authoring, errors::AppError, schema::{course::{CourseDetails, CourseFilter, CoursePatch, CreateCourse}, Deleted}, GlobalState};

use super::{created, success};

#[get("")]
pub async fn list_courses(data:web::Data<GlobalState>, filter:web::Query<CourseFilter>) -> Result<HttpResponse, AppError> {
    let courses = data.store.list_courses(&filter).await?;
    Ok(success(courses))
}

#[post("")]
pub async fn create_course(data:web::Data<GlobalState>, course:Json<CreateCourse>) -> Result<HttpResponse, AppError> {
    let course = authoring::create_course(data.store.as_ref(), &course).await?;
    Ok(created(course))
}

#[get("/{id}")]
pub async fn get_course(data:web::Data<GlobalState>, path:web::Path<Uuid>) -> Result<HttpResponse, AppError> {
    let outline = authoring::course_outline(data.store.as_ref(), path.into_inner()).await?;
    Ok(success(outline))
}

#[put("/{id}")]
pub async fn replace_course(data:web::Data<GlobalState>, path:web::Path<Uuid>, details:Json<CourseDetails>) -> Result<HttpResponse, AppError> {
    let course = authoring::replace_course(data.store.as_ref(), path.into_inner(), &details).await?;
    Ok(success(course))
}

#[patch("/{id}")]
pub async fn patch_course(data:web::Data<GlobalState>, path:web::Path<Uuid>, patch:Json<CoursePatch>) -> Result<HttpResponse, AppError> {
    let course = authoring::patch_course(data.store.as_ref(), path.into_inner(), &patch).await?;
    Ok(success(course))
}

#[delete("/{id}")]
pub async fn delete_course(data:web::Data<GlobalState>, path:web::Path<Uuid>) -> Result<HttpResponse, AppError> {
    let id = path.into_inner();
    data.store.delete_course(id).await?;
    tracing::info!(course_id = %id, "course deleted");
    Ok(success(Deleted{id}))
}

#[cfg(test)]
mod tests {
    use actix_web::test::{self, TestRequest};

    use crate::{models::course::Course, schema::{course::CourseOutline, ApiResponse}, test_init_app::{bearer, init, signed_in}};
    use super::*;

    #[actix_web::test]
    async fn test_course_crud() {
        let (app, _store) = init().await;
        let token = signed_in(&app, "admin_course@test.com").await;

        let req = TestRequest::post()
            .uri("/api/courses")
            .insert_header(bearer(&token))
            .set_json(CreateCourse{ title: "Test Course".to_string(), price: Some(5000), ..Default::default() })
            .to_request();
        let res = test::call_service(&app, req).await;
        assert_eq!(res.status(), 201);
        let body: ApiResponse<Course> = test::read_body_json(res).await;
        let course = body.data.unwrap();
        assert!(!course.published);

        let req = TestRequest::get()
            .uri(&format!("/api/courses/{}", course.id))
            .insert_header(bearer(&token))
            .to_request();
        let body: ApiResponse<CourseOutline> = test::call_and_read_body_json(&app, req).await;
        let outline = body.data.unwrap();
        assert_eq!(outline.course.title, "Test Course");
        assert!(outline.modules.is_empty());

        let req = TestRequest::patch()
            .uri(&format!("/api/courses/{}", course.id))
            .insert_header(bearer(&token))
            .set_json(CoursePatch{ title: Some("Renamed Course".to_string()), ..Default::default() })
            .to_request();
        let body: ApiResponse<Course> = test::call_and_read_body_json(&app, req).await;
        assert_eq!(body.data.unwrap().title, "Renamed Course");

        let req = TestRequest::delete()
            .uri(&format!("/api/courses/{}", course.id))
            .insert_header(bearer(&token))
            .to_request();
        let res = test::call_service(&app, req).await;
        assert!(res.status().is_success());

        let req = TestRequest::get()
            .uri(&format!("/api/courses/{}", course.id))
            .insert_header(bearer(&token))
            .to_request();
        let res = test::call_service(&app, req).await;
        assert_eq!(res.status(), 404);
        let body: ApiResponse<()> = test::read_body_json(res).await;
        assert_eq!(body.error.as_deref(), Some("course not found"));
    }

    #[actix_web::test]
    async fn test_publish_gate_and_validation() {
        let (app, _store) = init().await;
        let token = signed_in(&app, "admin_publish@test.com").await;

        let req = TestRequest::post()
            .uri("/api/courses")
            .insert_header(bearer(&token))
            .set_json(CreateCourse{ title: "  ".to_string(), ..Default::default() })
            .to_request();
        let res = test::call_service(&app, req).await;
        assert_eq!(res.status(), 400);

        let req = TestRequest::post()
            .uri("/api/courses")
            .insert_header(bearer(&token))
            .set_json(CreateCourse{ title: "Draft Course".to_string(), ..Default::default() })
            .to_request();
        let body: ApiResponse<Course> = test::call_and_read_body_json(&app, req).await;
        let course = body.data.unwrap();

        let req = TestRequest::patch()
            .uri(&format!("/api/courses/{}", course.id))
            .insert_header(bearer(&token))
            .set_json(CoursePatch{ published: Some(true), ..Default::default() })
            .to_request();
        let res = test::call_service(&app, req).await;
        assert_eq!(res.status(), 400);
        let body: ApiResponse<()> = test::read_body_json(res).await;
        assert!(body.error.unwrap().starts_with("course cannot be published without"));
    }

    #[actix_web::test]
    async fn test_bad_id_is_rejected() {
        let (app, _store) = init().await;
        let token = signed_in(&app, "admin_badid@test.com").await;

        let req = TestRequest::get()
            .uri("/api/courses/not-a-uuid")
            .insert_header(bearer(&token))
            .to_request();
        let res = test::call_service(&app, req).await;
        assert_eq!(res.status(), 400);
    }
}
