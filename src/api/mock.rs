//! Scripted API client for tests
//!
//! Records every request so tests can assert that a given user action did
//! (or did not) hit the network, and replays queued responses keyed by
//! `"METHOD /path"`.

use std::collections::{HashMap, VecDeque};
use std::path::Path;
use std::sync::atomic::{AtomicU8, Ordering};
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use serde_json::Value;

use crate::records::Record;

use super::client::ApiClient;
use super::errors::ApiError;

/// One request as seen by the backend.
#[derive(Debug, Clone, PartialEq)]
pub enum ApiCall {
    FetchList(String),
    FetchValue(String),
    Create(String, Value),
    Update(String, String, Value),
    Delete(String, String),
    ToggleActive(String, String, bool),
    Upload(String),
}

#[derive(Default)]
pub struct MockApiClient {
    calls: Mutex<Vec<ApiCall>>,
    scripts: Mutex<HashMap<String, VecDeque<Result<Value, String>>>>,
}

impl MockApiClient {
    pub fn new() -> Self {
        Self::default()
    }

    /// Queue a response for `key`, e.g. `"GET /holidays"` or
    /// `"POST /holidays"`. `Err` becomes a server-reported business failure
    /// with that exact message.
    pub fn script(&self, key: &str, result: Result<Value, &str>) {
        self.scripts
            .lock()
            .unwrap()
            .entry(key.to_string())
            .or_default()
            .push_back(result.map_err(str::to_string));
    }

    pub fn calls(&self) -> Vec<ApiCall> {
        self.calls.lock().unwrap().clone()
    }

    pub fn call_count(&self) -> usize {
        self.calls.lock().unwrap().len()
    }

    fn record(&self, call: ApiCall) {
        self.calls.lock().unwrap().push(call);
    }

    /// Unscripted keys answer an empty collection so reference-dropdown
    /// fetches in unrelated tests do not need scripting.
    fn take(&self, key: &str) -> Result<Value, ApiError> {
        let mut scripts = self.scripts.lock().unwrap();
        match scripts.get_mut(key).and_then(VecDeque::pop_front) {
            Some(Ok(value)) => Ok(value),
            Some(Err(message)) => Err(ApiError::Server(message)),
            None => Ok(Value::Array(Vec::new())),
        }
    }
}

#[async_trait]
impl ApiClient for MockApiClient {
    async fn fetch_list(&self, path: &str) -> Result<Vec<Record>, ApiError> {
        self.record(ApiCall::FetchList(path.to_string()));
        let data = self.take(&format!("GET {}", path))?;
        match data {
            Value::Array(items) => Ok(items
                .into_iter()
                .filter_map(|item| item.as_object().cloned())
                .collect()),
            other => Err(ApiError::Decode(format!("expected a collection, got {}", other))),
        }
    }

    async fn fetch_value(&self, path: &str) -> Result<Value, ApiError> {
        self.record(ApiCall::FetchValue(path.to_string()));
        self.take(&format!("GET {}", path))
    }

    async fn create(&self, path: &str, body: &Value) -> Result<Value, ApiError> {
        self.record(ApiCall::Create(path.to_string(), body.clone()));
        self.take(&format!("POST {}", path))
    }

    async fn update(&self, path: &str, id: &str, body: &Value) -> Result<Value, ApiError> {
        self.record(ApiCall::Update(path.to_string(), id.to_string(), body.clone()));
        self.take(&format!("PUT {}/{}", path, id))
    }

    async fn delete(&self, path: &str, id: &str) -> Result<(), ApiError> {
        self.record(ApiCall::Delete(path.to_string(), id.to_string()));
        self.take(&format!("DELETE {}/{}", path, id)).map(|_| ())
    }

    async fn toggle_active(&self, path: &str, id: &str, active: bool) -> Result<(), ApiError> {
        self.record(ApiCall::ToggleActive(path.to_string(), id.to_string(), active));
        self.take(&format!("PATCH {}/{}/active", path, id)).map(|_| ())
    }

    async fn upload(
        &self,
        path: &str,
        _file: &Path,
        progress: Arc<AtomicU8>,
    ) -> Result<String, ApiError> {
        self.record(ApiCall::Upload(path.to_string()));
        progress.store(100, Ordering::Relaxed);
        match self.take(&format!("UPLOAD {}", path))? {
            Value::String(name) => Ok(name),
            _ => Ok("stored-upload.png".to_string()),
        }
    }
}
