use serde::{Deserialize, Serialize};
use validator::Validate;

use crate::schema::rules::not_blank;

#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct CategoryInput {
    #[validate(length(max = 80), custom(function = "not_blank"))]
    pub name: String,
    /// Derived from `name` when omitted.
    #[validate(length(min = 1, max = 80))]
    pub slug: Option<String>,
    #[validate(length(max = 1000))]
    pub description: Option<String>,
}
