//! Success envelope shared by every handler.

use actix_web::HttpResponse;
use serde::Serialize;

/// `{success: true, message, data}`
#[derive(Debug, Serialize)]
pub struct ApiResponse<T: Serialize> {
    pub success: bool,
    pub message: &'static str,
    pub data: T,
}

impl<T: Serialize> ApiResponse<T> {
    pub fn new(message: &'static str, data: T) -> Self {
        Self {
            success: true,
            message,
            data,
        }
    }
}

/// `200 OK` with the success envelope.
pub fn ok<T: Serialize>(message: &'static str, data: T) -> HttpResponse {
    HttpResponse::Ok().json(ApiResponse::new(message, data))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_null_data_is_serialized() {
        let body = serde_json::to_value(ApiResponse::new("Logout successful", ())).unwrap();

        assert_eq!(body["success"], true);
        assert_eq!(body["message"], "Logout successful");
        assert!(body["data"].is_null());
        assert!(body.as_object().unwrap().contains_key("data"));
    }
}
