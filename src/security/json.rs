use axum::{
    async_trait,
    body::to_bytes,
    extract::{FromRequest, Request},
    http::{HeaderMap, header::CONTENT_TYPE},
};
use serde::de::DeserializeOwned;
use serde_json::{self, Deserializer};

use crate::errors::AppError;

pub const MAX_BODY_SIZE_BYTES: usize = 64 * 1024; // 64 KiB upper bound for request bodies

/// JSON body extractor that insists on a JSON content type, caps the body at
/// [`MAX_BODY_SIZE_BYTES`] and reports the path of the first bad field.
#[derive(Debug)]
pub struct ValidatedJson<T>(pub T);

#[async_trait]
impl<S, T> FromRequest<S> for ValidatedJson<T>
where
    T: DeserializeOwned + Send,
    S: Send + Sync,
{
    type Rejection = AppError;

    async fn from_request(req: Request, _state: &S) -> Result<Self, Self::Rejection> {
        validate_content_type(req.headers())?;

        let body_bytes = to_bytes(req.into_body(), MAX_BODY_SIZE_BYTES)
            .await
            .map_err(|err| {
                tracing::debug!(error = %err, limit = MAX_BODY_SIZE_BYTES, "Request body rejected");
                AppError::PayloadTooLarge
            })?;

        let mut deserializer = Deserializer::from_slice(body_bytes.as_ref());
        let result =
            serde_path_to_error::deserialize(&mut deserializer).map_err(parsing_error)?;

        deserializer
            .end()
            .map_err(|err| AppError::InvalidJson(format!("unexpected trailing data: {err}")))?;

        Ok(ValidatedJson(result))
    }
}

fn parsing_error(err: serde_path_to_error::Error<serde_json::Error>) -> AppError {
    let path = err.path().to_string();
    let error = err.into_inner();
    if path.is_empty() || path == "." {
        AppError::InvalidJson(error.to_string())
    } else {
        AppError::InvalidJson(format!("at {path}: {error}"))
    }
}

fn validate_content_type(headers: &HeaderMap) -> Result<(), AppError> {
    if let Some(value) = headers.get(CONTENT_TYPE)
        && let Ok(value) = value.to_str()
        && (value.starts_with("application/json") || value.ends_with("+json"))
    {
        return Ok(());
    }

    Err(AppError::UnsupportedMediaType)
}

#[cfg(test)]
mod tests {
    use axum::body::Body;
    use axum::http::{HeaderValue, Request as HttpRequest, StatusCode};
    use serde::Deserialize;

    use super::*;

    #[derive(Debug, Deserialize)]
    #[serde(deny_unknown_fields)]
    struct Payload {
        email: String,
    }

    fn request(content_type: Option<&str>, body: &str) -> Request {
        let mut builder = HttpRequest::builder().method("POST").uri("/");
        if let Some(content_type) = content_type {
            builder = builder.header(CONTENT_TYPE, content_type);
        }
        builder.body(Body::from(body.to_string())).unwrap()
    }

    #[tokio::test]
    async fn test_accepts_json() {
        let ValidatedJson(payload) = ValidatedJson::<Payload>::from_request(
            request(Some("application/json"), r#"{"email":"ana@duoc.cl"}"#),
            &(),
        )
        .await
        .unwrap();
        assert_eq!(payload.email, "ana@duoc.cl");
    }

    #[tokio::test]
    async fn test_rejects_missing_content_type() {
        let err = ValidatedJson::<Payload>::from_request(request(None, "{}"), &())
            .await
            .unwrap_err();
        assert_eq!(err.status_code(), StatusCode::UNSUPPORTED_MEDIA_TYPE);
    }

    #[tokio::test]
    async fn test_rejects_unknown_fields_with_path() {
        let err = ValidatedJson::<Payload>::from_request(
            request(
                Some("application/json"),
                r#"{"email":"ana@duoc.cl","admin":true}"#,
            ),
            &(),
        )
        .await
        .unwrap_err();
        assert_eq!(err.status_code(), StatusCode::BAD_REQUEST);
        assert!(err.to_string().contains("admin"));
    }

    #[tokio::test]
    async fn test_rejects_trailing_data() {
        let err = ValidatedJson::<Payload>::from_request(
            request(
                Some("application/json"),
                r#"{"email":"ana@duoc.cl"} {"email":"otra@duoc.cl"}"#,
            ),
            &(),
        )
        .await
        .unwrap_err();
        assert!(matches!(err, AppError::InvalidJson(_)));
    }

    #[tokio::test]
    async fn test_rejects_oversized_body() {
        let body = format!(r#"{{"email":"{}"}}"#, "a".repeat(MAX_BODY_SIZE_BYTES));
        let err = ValidatedJson::<Payload>::from_request(
            request(Some("application/json"), &body),
            &(),
        )
        .await
        .unwrap_err();
        assert!(matches!(err, AppError::PayloadTooLarge));
        assert_eq!(err.status_code(), StatusCode::PAYLOAD_TOO_LARGE);
    }

    #[test]
    fn test_content_type_suffix() {
        let mut headers = HeaderMap::new();
        headers.insert(
            CONTENT_TYPE,
            HeaderValue::from_static("application/problem+json"),
        );
        assert!(validate_content_type(&headers).is_ok());
    }
}
