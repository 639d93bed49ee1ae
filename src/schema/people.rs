use serde::{Deserialize, Serialize};
use validator::Validate;

use crate::schema::rules::not_blank;

#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct InstructorInput {
    #[validate(length(max = 120), custom(function = "not_blank"))]
    pub name: String,
    #[validate(email)]
    pub email: String,
    #[validate(length(max = 2000))]
    pub bio: Option<String>,
    #[validate(url)]
    pub avatar_url: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct StudentInput {
    #[validate(length(max = 120), custom(function = "not_blank"))]
    pub name: String,
    #[validate(email)]
    pub email: String,
    #[validate(url)]
    pub avatar_url: Option<String>,
}
