use crate::error::HttpError;
use bytes::Bytes;
use http::Response;
use http_body_util::BodyExt;
use serde::de::DeserializeOwned;

/// Longest body preview kept in `HttpError::HttpStatus` (8 KB).
pub const ERROR_BODY_PREVIEW_LIMIT: usize = 8 * 1024;

pub(crate) type ResponseBody =
    http_body_util::combinators::BoxBody<Bytes, Box<dyn std::error::Error + Send + Sync>>;

/// Response whose body has not been read yet.
#[derive(Debug)]
pub struct HttpResponse {
    pub(crate) inner: Response<ResponseBody>,
    pub(crate) max_body_size: usize,
}

impl HttpResponse {
    /// Parses a 2xx body as JSON. An empty or whitespace-only body is `None`.
    ///
    /// # Errors
    /// `HttpError::HttpStatus` for non-2xx, `HttpError::BodyTooLarge` or
    /// `HttpError::Json`.
    pub async fn json_opt<T: DeserializeOwned>(self) -> Result<Option<T>, HttpError> {
        let status = self.inner.status();
        if !status.is_success() {
            let content_type = self
                .inner
                .headers()
                .get(http::header::CONTENT_TYPE)
                .and_then(|v| v.to_str().ok())
                .map(String::from);
            let limit = self.max_body_size.min(ERROR_BODY_PREVIEW_LIMIT);
            // the status error wins over an oversized preview
            let body_preview = match read_limited(self.inner, limit).await {
                Ok(bytes) => String::from_utf8_lossy(&bytes).into_owned(),
                Err(HttpError::BodyTooLarge { .. }) => "<body too large for preview>".to_owned(),
                Err(e) => return Err(e),
            };
            return Err(HttpError::HttpStatus {
                status,
                body_preview,
                content_type,
            });
        }

        let body = read_limited(self.inner, self.max_body_size).await?;
        if body.iter().all(u8::is_ascii_whitespace) {
            return Ok(None);
        }
        Ok(Some(serde_json::from_slice(&body)?))
    }
}

async fn read_limited(response: Response<ResponseBody>, limit: usize) -> Result<Bytes, HttpError> {
    let mut body = std::pin::pin!(response.into_body());
    let mut collected = Vec::new();
    while let Some(frame) = body.frame().await {
        let frame = frame.map_err(HttpError::Transport)?;
        if let Some(chunk) = frame.data_ref() {
            let actual = collected.len() + chunk.len();
            if actual > limit {
                return Err(HttpError::BodyTooLarge { limit, actual });
            }
            collected.extend_from_slice(chunk);
        }
    }
    Ok(Bytes::from(collected))
}

#[cfg(test)]
#[cfg_attr(coverage_nightly, coverage(off))]
mod tests {
    use super::*;
    use http_body_util::Full;
    use serde_json::{Value, json};

    fn response(status: u16, body: &'static str) -> HttpResponse {
        let body: ResponseBody = Full::new(Bytes::from_static(body.as_bytes()))
            .map_err(|never: std::convert::Infallible| -> Box<dyn std::error::Error + Send + Sync> {
                match never {}
            })
            .boxed();
        HttpResponse {
            inner: Response::builder().status(status).body(body).unwrap(),
            max_body_size: 16,
        }
    }

    #[tokio::test]
    async fn blank_success_body_is_none() {
        assert_eq!(response(200, "").json_opt::<Value>().await.unwrap(), None);
        assert_eq!(response(200, " \n").json_opt::<Value>().await.unwrap(), None);
    }

    #[tokio::test]
    async fn success_body_is_parsed() {
        let value = response(200, r#"{"a":1}"#).json_opt::<Value>().await.unwrap();
        assert_eq!(value, Some(json!({"a": 1})));
    }

    #[tokio::test]
    async fn large_error_body_keeps_status() {
        let err = response(404, "not found, and then a lot more text")
            .json_opt::<Value>()
            .await
            .unwrap_err();
        assert!(matches!(
            err,
            HttpError::HttpStatus { status, ref body_preview, .. }
                if status.as_u16() == 404 && body_preview == "<body too large for preview>"
        ));
    }
}
