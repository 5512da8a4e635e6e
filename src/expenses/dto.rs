use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use time::Date;
use uuid::Uuid;

use crate::error::ApiError;
use crate::expenses::repo::InputMethod;

/// Request body for recording an expense. `userId` must match the session
/// user; the server rejects attempts to write into another account.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateExpenseRequest {
    pub amount: Decimal,
    pub category: String,
    #[serde(default)]
    pub description: String,
    pub date: Date,
    pub user_id: Uuid,
    #[serde(default, alias = "method")]
    pub input_method: InputMethod,
}

impl CreateExpenseRequest {
    pub fn validate(&self) -> Result<(), ApiError> {
        if self.amount < Decimal::ZERO {
            return Err(ApiError::InvalidArgument(
                "Amount must be non-negative".into(),
            ));
        }
        Ok(())
    }
}

#[derive(Debug, Serialize)]
pub struct MessageResponse {
    pub message: String,
}
