use actix_web::{delete, get, patch, post, web::{self, Json}, HttpResponse};
use sqlx::types::Uuid;
use validator::Validate;

use crate::{errors::AppError, schema::{payment::{PaymentFilter, PaymentInput, PaymentStatusUpdate}, Deleted}, GlobalState};

use super::{created, success};

#[get("")]
pub async fn list_payments(data:web::Data<GlobalState>, filter:web::Query<PaymentFilter>) -> Result<HttpResponse, AppError> {
    Ok(success(data.store.list_payments(&filter).await?))
}

#[post("")]
pub async fn create_payment(data:web::Data<GlobalState>, payment:Json<PaymentInput>) -> Result<HttpResponse, AppError> {
    payment.validate()?;
    data.store.get_student(payment.student_id).await?;
    data.store.get_course(payment.course_id).await?;

    let payment = data.store.create_payment(&payment).await?;
    tracing::info!(payment_id = %payment.id, status = %payment.status, "payment recorded");
    Ok(created(payment))
}

#[get("/{id}")]
pub async fn get_payment(data:web::Data<GlobalState>, path:web::Path<Uuid>) -> Result<HttpResponse, AppError> {
    Ok(success(data.store.get_payment(path.into_inner()).await?))
}

#[patch("/{id}")]
pub async fn update_payment_status(data:web::Data<GlobalState>, path:web::Path<Uuid>, update:Json<PaymentStatusUpdate>) -> Result<HttpResponse, AppError> {
    let payment = data.store.update_payment_status(path.into_inner(), update.status).await?;
    Ok(success(payment))
}

#[delete("/{id}")]
pub async fn delete_payment(data:web::Data<GlobalState>, path:web::Path<Uuid>) -> Result<HttpResponse, AppError> {
    let id = path.into_inner();
    data.store.delete_payment(id).await?;
    Ok(success(Deleted{id}))
}

#[cfg(test)]
mod tests {
    use actix_web::test::{self, TestRequest};

    use crate::{models::{course::CourseFields, dashboard::DashboardStats, payment::{Payment, PaymentStatus}}, schema::{people::StudentInput, ApiResponse}, store::Store, test_init_app::{bearer, init, signed_in}};
    use super::*;

    #[actix_web::test]
    async fn test_payments_and_dashboard() {
        let (app, store) = init().await;
        let token = signed_in(&app, "admin_payments@test.com").await;

        let student = store
            .create_student(&StudentInput{ name: "Alan".to_string(), email: "alan@example.com".to_string(), avatar_url: None })
            .await
            .unwrap();
        let course = store
            .create_course(&CourseFields{ title: "Computability".to_string(), ..Default::default() })
            .await
            .unwrap();

        let req = TestRequest::post()
            .uri("/api/payment")
            .insert_header(bearer(&token))
            .set_json(PaymentInput{ student_id: student.id, course_id: course.id, amount: 4200, status: None })
            .to_request();
        let res = test::call_service(&app, req).await;
        assert_eq!(res.status(), 201);
        let body: ApiResponse<Payment> = test::read_body_json(res).await;
        let payment = body.data.unwrap();
        assert_eq!(payment.status, PaymentStatus::Pending);

        let req = TestRequest::patch()
            .uri(&format!("/api/payment/{}", payment.id))
            .insert_header(bearer(&token))
            .set_json(PaymentStatusUpdate{ status: PaymentStatus::Completed })
            .to_request();
        let body: ApiResponse<Payment> = test::call_and_read_body_json(&app, req).await;
        assert_eq!(body.data.unwrap().status, PaymentStatus::Completed);

        let req = TestRequest::get()
            .uri("/api/payment?status=completed&limit=10")
            .insert_header(bearer(&token))
            .to_request();
        let body: ApiResponse<Vec<Payment>> = test::call_and_read_body_json(&app, req).await;
        assert_eq!(body.data.unwrap().len(), 1);

        let req = TestRequest::get()
            .uri("/api/payment?status=refunded")
            .insert_header(bearer(&token))
            .to_request();
        let body: ApiResponse<Vec<Payment>> = test::call_and_read_body_json(&app, req).await;
        assert!(body.data.unwrap().is_empty());

        let req = TestRequest::get().uri("/api/dashboard").insert_header(bearer(&token)).to_request();
        let body: ApiResponse<DashboardStats> = test::call_and_read_body_json(&app, req).await;
        let stats = body.data.unwrap();
        assert_eq!(stats.counts.courses, 1);
        assert_eq!(stats.counts.students, 1);
        assert_eq!(stats.counts.revenue, 4200);
        assert_eq!(stats.recent_payments.len(), 1);
    }

    #[actix_web::test]
    async fn test_payment_for_unknown_student() {
        let (app, _store) = init().await;
        let token = signed_in(&app, "admin_payments2@test.com").await;

        let req = TestRequest::post()
            .uri("/api/payment")
            .insert_header(bearer(&token))
            .set_json(PaymentInput{ student_id: Uuid::new_v4(), course_id: Uuid::new_v4(), amount: 100, status: None })
            .to_request();
        let res = test::call_service(&app, req).await;
        assert_eq!(res.status(), 404);
    }
}
