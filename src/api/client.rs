use crate::config::Config;
use reqwest::header::{HeaderMap, HeaderName, HeaderValue, CONTENT_TYPE};
use reqwest::multipart::Form;
use reqwest::Method;
use serde::de::DeserializeOwned;
use serde::Serialize;
use thiserror::Error;
use tracing::{debug, warn};

/// Failure of a single backend call.
///
/// Every call is fire-once: there is no retry state, so the caller decides
/// what the user sees.
#[derive(Debug, Error)]
pub enum ApiError {
    /// The request never produced a response (connection refused, DNS, reset).
    #[error("Network error on {method} {path}: {source}")]
    Network {
        method: Method,
        path: String,
        #[source]
        source: reqwest::Error,
    },

    /// The backend answered with a non-2xx status.
    #[error("{method} {path} failed: {status} {body}")]
    Http {
        method: Method,
        path: String,
        status: u16,
        body: String,
    },

    /// The response body was not the JSON shape the caller asked for.
    #[error("Failed to decode response of {method} {path}: {source}")]
    Decode {
        method: Method,
        path: String,
        #[source]
        source: serde_json::Error,
    },

    /// The request could not be built (bad header override, unserializable body).
    #[error("Invalid request: {0}")]
    InvalidRequest(String),
}

impl ApiError {
    /// HTTP status for `Http` errors.
    pub fn status(&self) -> Option<u16> {
        match self {
            ApiError::Http { status, .. } => Some(*status),
            _ => None,
        }
    }

    /// True for transport failures.
    pub fn is_network(&self) -> bool {
        matches!(self, ApiError::Network { .. })
    }

    /// The backend-provided `message` field of an error body, if any.
    pub fn backend_message(&self) -> Option<String> {
        let ApiError::Http { body, .. } = self else {
            return None;
        };

        serde_json::from_str::<serde_json::Value>(body)
            .ok()
            .and_then(|v| v.get("message").and_then(|m| m.as_str()).map(str::to_string))
            .filter(|m| !m.is_empty())
    }
}

/// Description of one backend call: method, path, optional JSON body and
/// header overrides.
#[derive(Debug, Clone)]
pub struct ApiRequest {
    method: Method,
    path: String,
    body: Option<serde_json::Value>,
    headers: Vec<(String, String)>,
}

impl ApiRequest {
    pub fn new(method: Method, path: impl Into<String>) -> Self {
        Self {
            method,
            path: path.into(),
            body: None,
            headers: Vec::new(),
        }
    }

    pub fn get(path: impl Into<String>) -> Self {
        Self::new(Method::GET, path)
    }

    pub fn post(path: impl Into<String>) -> Self {
        Self::new(Method::POST, path)
    }

    /// Attach a JSON body.
    pub fn json<B: Serialize + ?Sized>(mut self, body: &B) -> Result<Self, ApiError> {
        let value = serde_json::to_value(body)
            .map_err(|e| ApiError::InvalidRequest(format!("body for {}: {}", self.path, e)))?;
        self.body = Some(value);
        Ok(self)
    }

    /// Override (or add) a request header. Later overrides win.
    pub fn header(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.headers.push((name.into(), value.into()));
        self
    }

    pub fn method(&self) -> &Method {
        &self.method
    }

    pub fn path(&self) -> &str {
        &self.path
    }
}

/// Thin JSON client for the dashboard backend.
#[derive(Debug, Clone)]
pub struct ApiClient {
    http: reqwest::Client,
    base_url: String,
}

impl ApiClient {
    pub fn new(base_url: impl Into<String>) -> Self {
        Self::with_http_client(reqwest::Client::new(), base_url)
    }

    pub fn with_http_client(http: reqwest::Client, base_url: impl Into<String>) -> Self {
        let base_url = base_url.into().trim_end_matches('/').to_string();
        Self { http, base_url }
    }

    pub fn from_config(config: &Config) -> Self {
        Self::new(config.api_base_url.clone())
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// Absolute URL for a backend path.
    pub fn url(&self, path: &str) -> String {
        if path.starts_with('/') {
            format!("{}{}", self.base_url, path)
        } else {
            format!("{}/{}", self.base_url, path)
        }
    }

    /// GET `path` and decode the JSON response.
    pub async fn get<T: DeserializeOwned>(&self, path: &str) -> Result<T, ApiError> {
        self.execute(ApiRequest::get(path)).await
    }

    /// POST `body` as JSON to `path` and decode the JSON response.
    pub async fn post<T, B>(&self, path: &str, body: &B) -> Result<T, ApiError>
    where
        T: DeserializeOwned,
        B: Serialize + ?Sized,
    {
        self.execute(ApiRequest::post(path).json(body)?).await
    }

    /// Issue a described request once.
    pub async fn execute<T: DeserializeOwned>(&self, request: ApiRequest) -> Result<T, ApiError> {
        let mut headers = HeaderMap::new();
        headers.insert(CONTENT_TYPE, HeaderValue::from_static("application/json"));
        for (name, value) in &request.headers {
            let name = HeaderName::from_bytes(name.as_bytes())
                .map_err(|e| ApiError::InvalidRequest(format!("header name '{}': {}", name, e)))?;
            let value = HeaderValue::from_str(value)
                .map_err(|e| ApiError::InvalidRequest(format!("header value for '{}': {}", name, e)))?;
            headers.insert(name, value);
        }

        let mut builder = self
            .http
            .request(request.method.clone(), self.url(&request.path))
            .headers(headers);
        if let Some(body) = &request.body {
            let bytes = serde_json::to_vec(body)
                .map_err(|e| ApiError::InvalidRequest(format!("body for {}: {}", request.path, e)))?;
            builder = builder.body(bytes);
        }

        debug!("{} {}", request.method, request.path);
        let response = builder.send().await.map_err(|source| ApiError::Network {
            method: request.method.clone(),
            path: request.path.clone(),
            source,
        })?;

        read_json(&request.method, &request.path, response).await
    }

    /// POST a multipart form (file uploads) and decode the JSON response.
    ///
    /// The multipart boundary header is set by the form itself.
    pub async fn post_multipart<T: DeserializeOwned>(
        &self,
        path: &str,
        form: Form,
    ) -> Result<T, ApiError> {
        debug!("POST {} (multipart)", path);
        let response = self
            .http
            .post(self.url(path))
            .multipart(form)
            .send()
            .await
            .map_err(|source| ApiError::Network {
                method: Method::POST,
                path: path.to_string(),
                source,
            })?;

        read_json(&Method::POST, path, response).await
    }
}

async fn read_json<T: DeserializeOwned>(
    method: &Method,
    path: &str,
    response: reqwest::Response,
) -> Result<T, ApiError> {
    let status = response.status();
    if !status.is_success() {
        let body = response.text().await.unwrap_or_default();
        warn!("{} {} returned {}", method, path, status);
        return Err(ApiError::Http {
            method: method.clone(),
            path: path.to_string(),
            status: status.as_u16(),
            body,
        });
    }

    let bytes = response.bytes().await.map_err(|source| ApiError::Network {
        method: method.clone(),
        path: path.to_string(),
        source,
    })?;

    serde_json::from_slice(&bytes).map_err(|source| ApiError::Decode {
        method: method.clone(),
        path: path.to_string(),
        source,
    })
}
