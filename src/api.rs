//! JSON response envelope
//!
//! Wraps a service result as `{ "data": ... }` or `{ "error": "..." }` with an
//! HTTP-style status. Authentication failures map to 401, every other error
//! to 500.

use serde::Serialize;

use crate::error::{SpendwiseError, SpendwiseResult};

pub const STATUS_OK: u16 = 200;
pub const STATUS_UNAUTHORIZED: u16 = 401;
pub const STATUS_SERVER_ERROR: u16 = 500;

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum Body<T> {
    Data { data: T },
    Error { error: String },
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ApiResponse<T> {
    #[serde(skip)]
    pub status: u16,
    #[serde(flatten)]
    pub body: Body<T>,
}

impl<T: Serialize> ApiResponse<T> {
    pub fn ok(data: T) -> Self {
        Self {
            status: STATUS_OK,
            body: Body::Data { data },
        }
    }

    pub fn error(err: &SpendwiseError) -> Self {
        let status = if err.is_auth() {
            STATUS_UNAUTHORIZED
        } else {
            STATUS_SERVER_ERROR
        };
        Self {
            status,
            body: Body::Error {
                error: err.to_string(),
            },
        }
    }

    pub fn from_result(result: SpendwiseResult<T>) -> Self {
        match result {
            Ok(data) => Self::ok(data),
            Err(err) => Self::error(&err),
        }
    }

    pub fn is_success(&self) -> bool {
        self.status == STATUS_OK
    }

    pub fn to_json(&self) -> SpendwiseResult<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }
}

impl<T: Serialize> From<SpendwiseResult<T>> for ApiResponse<T> {
    fn from(result: SpendwiseResult<T>) -> Self {
        Self::from_result(result)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::Money;
    use serde_json::json;

    #[test]
    fn test_success_envelope() {
        let response = ApiResponse::ok(vec![1, 2]);
        assert_eq!(response.status, 200);
        let value = serde_json::to_value(&response).unwrap();
        assert_eq!(value, json!({ "data": [1, 2] }));
    }

    #[test]
    fn test_auth_error_is_401() {
        let response: ApiResponse<()> = Err(SpendwiseError::InvalidCredentials).into();
        assert_eq!(response.status, 401);
        assert!(!response.is_success());
        let value = serde_json::to_value(&response).unwrap();
        assert_eq!(value, json!({ "error": "Invalid username or password" }));
    }

    #[test]
    fn test_other_errors_are_500() {
        let err = SpendwiseError::InsufficientBudget {
            category: "Food".into(),
            needed: Money::from_units(400),
            available: Money::from_units(300),
        };
        let response: ApiResponse<()> = ApiResponse::from_result(Err(err));
        assert_eq!(response.status, 500);

        let response: ApiResponse<()> =
            ApiResponse::from_result(Err(SpendwiseError::category_not_found("7")));
        assert_eq!(response.status, 500);
        assert!(response.to_json().unwrap().contains("Category not found: 7"));
    }
}
