pub mod auth;
pub mod category;
pub mod course;
pub mod curriculum;
pub mod dashboard;
pub mod instructor;
pub mod payment;
pub mod student;

use actix_web::{get, middleware::from_fn, web, HttpResponse, Responder};
use serde::Serialize;

use crate::{errors::AppError, middlewares::session::session_middleware, schema::ApiResponse};

pub(crate) fn success<T: Serialize>(data: T) -> HttpResponse {
    HttpResponse::Ok().json(ApiResponse::ok(data))
}

pub(crate) fn created<T: Serialize>(data: T) -> HttpResponse {
    HttpResponse::Created().json(ApiResponse::ok(data))
}

#[get("/health")]
pub async fn health() -> impl Responder{
    success("ok")
}

/// Mounts every `/api` route. Everything outside `/api/auth` and `/api/health`
/// sits behind the session middleware.
pub fn configure(cfg: &mut web::ServiceConfig) {
    cfg.app_data(web::JsonConfig::default().error_handler(|err, _req| {
        AppError::Validation(format!("invalid JSON body: {err}")).into()
    }))
    .app_data(web::QueryConfig::default().error_handler(|err, _req| {
        AppError::Validation(format!("invalid query: {err}")).into()
    }))
    .app_data(web::PathConfig::default().error_handler(|err, _req| {
        AppError::Validation(format!("invalid path: {err}")).into()
    }))
    .service(
        web::scope("/api")
            .service(health)
            .service(
                web::scope("/auth")
                    .service(auth::signup_admin)
                    .service(auth::signin_admin)
                    .service(auth::signout_admin),
            )
            .service(
                web::scope("/courses")
                    .wrap(from_fn(session_middleware))
                    .service(curriculum::list_modules)
                    .service(curriculum::upsert_module)
                    .service(curriculum::delete_module)
                    .service(curriculum::upsert_lesson)
                    .service(curriculum::delete_lesson)
                    .service(curriculum::list_resources)
                    .service(curriculum::upsert_resource)
                    .service(curriculum::delete_resource)
                    .service(course::list_courses)
                    .service(course::create_course)
                    .service(course::get_course)
                    .service(course::replace_course)
                    .service(course::patch_course)
                    .service(course::delete_course),
            )
            .service(
                web::scope("/course-category")
                    .wrap(from_fn(session_middleware))
                    .service(category::list_categories)
                    .service(category::create_category)
                    .service(category::get_category)
                    .service(category::update_category)
                    .service(category::delete_category),
            )
            .service(
                web::scope("/students")
                    .wrap(from_fn(session_middleware))
                    .service(student::list_students)
                    .service(student::create_student)
                    .service(student::get_student)
                    .service(student::update_student)
                    .service(student::delete_student),
            )
            .service(
                web::scope("/instructors")
                    .wrap(from_fn(session_middleware))
                    .service(instructor::list_instructors)
                    .service(instructor::create_instructor)
                    .service(instructor::get_instructor)
                    .service(instructor::update_instructor)
                    .service(instructor::delete_instructor),
            )
            .service(
                web::scope("/payment")
                    .wrap(from_fn(session_middleware))
                    .service(payment::list_payments)
                    .service(payment::create_payment)
                    .service(payment::get_payment)
                    .service(payment::update_payment_status)
                    .service(payment::delete_payment),
            )
            .service(
                web::scope("/dashboard")
                    .wrap(from_fn(session_middleware))
                    .service(dashboard::get_dashboard),
            ),
    );
}
