//! HTTP client for the school-management REST backend

use std::path::Path;
use std::sync::atomic::{AtomicU8, Ordering};
use std::sync::Arc;

use async_trait::async_trait;
use reqwest::{Client, Method, RequestBuilder};
use serde_json::{json, Value};
use tracing::{debug, warn};

use crate::config::Config;
use crate::records::Record;

use super::envelope::Envelope;
use super::errors::ApiError;

const UPLOAD_CHUNK_BYTES: usize = 64 * 1024;

/// Client-side view of the REST backend.
///
/// Object-safe so screens hold an `Arc<dyn ApiClient>` and tests can
/// substitute a scripted mock. No retries, no request de-duplication, no
/// cancellation of in-flight requests; every failure is terminal for that
/// user action until the user re-triggers it.
#[async_trait]
pub trait ApiClient: Send + Sync {
    /// GET a collection.
    async fn fetch_list(&self, path: &str) -> Result<Vec<Record>, ApiError>;

    /// GET a single value (balance probes and the like).
    async fn fetch_value(&self, path: &str) -> Result<Value, ApiError>;

    /// POST a new record. The server assigns `_id` and timestamps.
    async fn create(&self, path: &str, body: &Value) -> Result<Value, ApiError>;

    /// PUT a full-object replacement.
    async fn update(&self, path: &str, id: &str, body: &Value) -> Result<Value, ApiError>;

    /// DELETE by id. Hard or soft is the backend's business.
    async fn delete(&self, path: &str, id: &str) -> Result<(), ApiError>;

    /// Flip the `isActive` flag in place via the dedicated endpoint.
    async fn toggle_active(&self, path: &str, id: &str, active: bool) -> Result<(), ApiError>;

    /// Upload a file as `multipart/form-data`; returns the stored filename.
    /// Progress percentage is published through the shared atomic.
    async fn upload(
        &self,
        path: &str,
        file: &Path,
        progress: Arc<AtomicU8>,
    ) -> Result<String, ApiError>;
}

/// reqwest-backed implementation adding base URL, bearer auth, user agent
/// and timeout from [`Config`].
pub struct HttpApiClient {
    client: Client,
    base_url: String,
    api_token: Option<String>,
}

impl HttpApiClient {
    pub fn new(config: &Config) -> Result<Self, ApiError> {
        let client = Client::builder()
            .user_agent(config.http.user_agent.clone())
            .timeout(config.http_timeout())
            .build()?;

        Ok(Self {
            client,
            base_url: config.base_url.trim_end_matches('/').to_string(),
            api_token: config.api_token.clone(),
        })
    }

    fn url(&self, path: &str) -> String {
        format!("{}/{}", self.base_url, path.trim_start_matches('/'))
    }

    fn request(&self, method: Method, url: &str) -> RequestBuilder {
        let mut builder = self.client.request(method, url);
        if let Some(ref token) = self.api_token {
            builder = builder.bearer_auth(token);
        }
        builder
    }

    /// Send a request and decode the envelope, turning `success:false` into
    /// a server error. Error statuses still carry an envelope body; when
    /// even that is missing, the status line is all there is to report.
    async fn execute(&self, request: RequestBuilder) -> Result<Value, ApiError> {
        let response = request.send().await?;
        let status = response.status();
        debug!("backend answered {}", status);

        let body: Value = match response.json().await {
            Ok(body) => body,
            Err(e) if status.is_success() => return Err(ApiError::Transport(e)),
            Err(_) => {
                return Err(ApiError::Server(format!(
                    "Request failed with status {}",
                    status
                )))
            }
        };

        Envelope::decode(&body)?.into_data()
    }

    fn as_records(data: Value) -> Result<Vec<Record>, ApiError> {
        match data {
            Value::Null => Ok(Vec::new()),
            Value::Array(items) => items
                .into_iter()
                .map(|item| match item {
                    Value::Object(map) => Ok(map),
                    other => Err(ApiError::Decode(format!(
                        "expected an object in the collection, got {}",
                        other
                    ))),
                })
                .collect(),
            other => Err(ApiError::Decode(format!(
                "expected a collection, got {}",
                other
            ))),
        }
    }
}

#[async_trait]
impl ApiClient for HttpApiClient {
    async fn fetch_list(&self, path: &str) -> Result<Vec<Record>, ApiError> {
        let data = self
            .execute(self.request(Method::GET, &self.url(path)))
            .await?;
        Self::as_records(data)
    }

    async fn fetch_value(&self, path: &str) -> Result<Value, ApiError> {
        self.execute(self.request(Method::GET, &self.url(path)))
            .await
    }

    async fn create(&self, path: &str, body: &Value) -> Result<Value, ApiError> {
        self.execute(self.request(Method::POST, &self.url(path)).json(body))
            .await
    }

    async fn update(&self, path: &str, id: &str, body: &Value) -> Result<Value, ApiError> {
        let url = format!("{}/{}", self.url(path), id);
        self.execute(self.request(Method::PUT, &url).json(body))
            .await
    }

    async fn delete(&self, path: &str, id: &str) -> Result<(), ApiError> {
        let url = format!("{}/{}", self.url(path), id);
        self.execute(self.request(Method::DELETE, &url)).await?;
        Ok(())
    }

    async fn toggle_active(&self, path: &str, id: &str, active: bool) -> Result<(), ApiError> {
        let url = format!("{}/{}/active", self.url(path), id);
        self.execute(
            self.request(Method::PATCH, &url)
                .json(&json!({ "isActive": active })),
        )
        .await?;
        Ok(())
    }

    async fn upload(
        &self,
        path: &str,
        file: &Path,
        progress: Arc<AtomicU8>,
    ) -> Result<String, ApiError> {
        let bytes = tokio::fs::read(file).await?;
        let total = bytes.len().max(1);
        let file_name = file
            .file_name()
            .and_then(|n| n.to_str())
            .unwrap_or("upload.bin")
            .to_string();

        progress.store(0, Ordering::Relaxed);

        // Stream the file in chunks, publishing how much has been handed to
        // the transport so the form can show a percentage.
        let chunks: Vec<Vec<u8>> = bytes
            .chunks(UPLOAD_CHUNK_BYTES)
            .map(|chunk| chunk.to_vec())
            .collect();
        let counter = progress.clone();
        let stream = futures::stream::iter(chunks.into_iter().scan(0usize, move |sent, chunk| {
            *sent += chunk.len();
            counter.store((*sent * 100 / total) as u8, Ordering::Relaxed);
            Some(Ok::<Vec<u8>, std::io::Error>(chunk))
        }));

        let part = reqwest::multipart::Part::stream_with_length(
            reqwest::Body::wrap_stream(stream),
            total as u64,
        )
        .file_name(file_name);
        let form = reqwest::multipart::Form::new().part("file", part);

        let url = format!("{}/upload", self.url(path).trim_end_matches('/'));
        let data = self
            .execute(self.request(Method::POST, &url).multipart(form))
            .await?;
        progress.store(100, Ordering::Relaxed);

        match data {
            Value::String(name) => Ok(name),
            Value::Object(ref map) => map
                .get("filename")
                .and_then(Value::as_str)
                .map(str::to_string)
                .ok_or_else(|| {
                    warn!("upload response missing filename: {}", data);
                    ApiError::Decode("upload response missing filename".to_string())
                }),
            other => Err(ApiError::Decode(format!(
                "unexpected upload response: {}",
                other
            ))),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_as_records_accepts_object_arrays() {
        let rows = HttpApiClient::as_records(json!([{"_id": "a"}, {"_id": "b"}])).unwrap();
        assert_eq!(rows.len(), 2);
        assert_eq!(rows[1]["_id"], "b");
    }

    #[test]
    fn test_as_records_treats_null_as_empty() {
        assert!(HttpApiClient::as_records(Value::Null).unwrap().is_empty());
    }

    #[test]
    fn test_as_records_rejects_scalars() {
        assert!(HttpApiClient::as_records(json!(7)).is_err());
        assert!(HttpApiClient::as_records(json!(["a", "b"])).is_err());
    }
}
