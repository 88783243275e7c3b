//! Body extractors that keep failures inside the JSON error envelopes.

use axum::body::Bytes;
use axum::extract::FromRequest;
use axum::extract::rejection::JsonRejection;
use serde::de::DeserializeOwned;

use super::error::{ApiError, LendingError};
use crate::domain::DomainError;

/// `Json<T>` whose rejection is an inventory `{message, kind}` body
#[derive(FromRequest)]
#[from_request(via(axum::Json), rejection(ApiError))]
pub struct ApiJson<T>(pub T);

/// `Json<T>` whose rejection is a lending `{success: false, ...}` body
#[derive(FromRequest)]
#[from_request(via(axum::Json), rejection(LendingError))]
pub struct LendingJson<T>(pub T);

fn rejected(rejection: JsonRejection) -> DomainError {
    DomainError::validation(format!("Invalid request body: {}", rejection.body_text()))
}

impl From<JsonRejection> for ApiError {
    fn from(rejection: JsonRejection) -> Self {
        ApiError(rejected(rejection))
    }
}

impl From<JsonRejection> for LendingError {
    fn from(rejection: JsonRejection) -> Self {
        LendingError(rejected(rejection))
    }
}

/// Decode an optional JSON body. Only an empty body means "absent"; anything
/// else must deserialize into `T`.
pub fn optional_json<T: DeserializeOwned>(body: &Bytes) -> Result<Option<T>, DomainError> {
    if body.iter().all(u8::is_ascii_whitespace) {
        return Ok(None);
    }
    serde_json::from_slice(body)
        .map(Some)
        .map_err(|e| DomainError::validation(format!("Invalid request body: {}", e)))
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde::Deserialize;

    #[derive(Debug, Deserialize)]
    #[serde(rename_all = "camelCase")]
    struct Body {
        copy_id: Option<i32>,
    }

    #[test]
    fn test_empty_body_is_absent() {
        assert!(optional_json::<Body>(&Bytes::new()).unwrap().is_none());
        assert!(optional_json::<Body>(&Bytes::from_static(b" \n")).unwrap().is_none());
    }

    #[test]
    fn test_malformed_body_is_rejected() {
        let err = optional_json::<Body>(&Bytes::from_static(br#"{"copyId":"2"}"#)).unwrap_err();
        assert!(matches!(err, DomainError::Validation(_)));
        assert!(optional_json::<Body>(&Bytes::from_static(b"{oops")).is_err());
    }

    #[test]
    fn test_well_formed_body_is_decoded() {
        let body = optional_json::<Body>(&Bytes::from_static(br#"{"copyId":2}"#))
            .unwrap()
            .unwrap();
        assert_eq!(body.copy_id, Some(2));
    }
}
