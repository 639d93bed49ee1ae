use serde::{Deserialize, Serialize};
use sqlx::types::Uuid;
use validator::Validate;

use crate::models::payment::PaymentStatus;

pub const DEFAULT_PAGE_SIZE: i64 = 50;
pub const MAX_PAGE_SIZE: i64 = 100;

#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct PaymentInput {
    pub student_id: Uuid,
    pub course_id: Uuid,
    #[validate(range(min = 0))]
    pub amount: i32,
    pub status: Option<PaymentStatus>,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct PaymentStatusUpdate {
    pub status: PaymentStatus,
}

#[derive(Debug, Default, Clone, Deserialize)]
pub struct PaymentFilter {
    pub status: Option<PaymentStatus>,
    pub course_id: Option<Uuid>,
    pub student_id: Option<Uuid>,
    pub limit: Option<i64>,
    pub offset: Option<i64>,
}

impl PaymentFilter {
    pub fn limit(&self) -> i64 {
        self.limit.unwrap_or(DEFAULT_PAGE_SIZE).clamp(1, MAX_PAGE_SIZE)
    }

    pub fn offset(&self) -> i64 {
        self.offset.unwrap_or(0).max(0)
    }
}
