//! Per-request context handed to hooks and actions.
//!
//! # Responsibilities
//! - Carry the resolved endpoint, method, URI and headers
//! - Expose path parameters and submitted form fields
//! - Hold request-scoped state written by before hooks
//!
//! # Design Decisions
//! - Form data parsed by the method-override layer is reused, never re-read
//! - Hook state lives here, so controllers can be shared across requests

use std::collections::HashMap;

use axum::{
    body::{Body, Bytes},
    http::{header, Extensions, HeaderMap, Method, Request, StatusCode, Uri},
    response::{IntoResponse, Response},
};

use crate::http::form::FormData;
use crate::routing::Endpoint;

/// Request line and headers, kept by after and teardown hooks.
#[derive(Debug, Clone)]
pub struct RequestHead {
    pub endpoint: Endpoint,
    pub method: Method,
    pub uri: Uri,
    pub headers: HeaderMap,
}

/// Everything an action needs about the current request.
#[derive(Debug)]
pub struct Context {
    head: RequestHead,
    params: HashMap<String, String>,
    form: FormData,
    body: Bytes,
    extensions: Extensions,
}

impl Context {
    /// Buffer the request body (up to `body_limit` bytes) and build a context.
    pub async fn from_request(
        endpoint: Endpoint,
        params: HashMap<String, String>,
        request: Request<Body>,
        body_limit: usize,
    ) -> Result<Self, Response> {
        let (mut parts, body) = request.into_parts();

        let body = axum::body::to_bytes(body, body_limit).await.map_err(|e| {
            tracing::warn!(endpoint = %endpoint, error = %e, "Failed to read request body");
            (StatusCode::PAYLOAD_TOO_LARGE, "Request body too large").into_response()
        })?;

        let form = match parts.extensions.remove::<FormData>() {
            Some(form) => form,
            None => FormData::from_body(&parts.headers, body.clone())
                .await
                .map_err(|e| {
                    tracing::warn!(endpoint = %endpoint, error = %e, "Failed to parse form body");
                    (StatusCode::BAD_REQUEST, "Malformed form body").into_response()
                })?
                .unwrap_or_default(),
        };

        Ok(Self {
            head: RequestHead {
                endpoint,
                method: parts.method,
                uri: parts.uri,
                headers: parts.headers,
            },
            params,
            form,
            body,
            extensions: parts.extensions,
        })
    }

    /// Context for an endpoint with no request behind it.
    pub fn detached(endpoint: Endpoint, method: Method, uri: Uri) -> Self {
        Self {
            head: RequestHead {
                endpoint,
                method,
                uri,
                headers: HeaderMap::new(),
            },
            params: HashMap::new(),
            form: FormData::default(),
            body: Bytes::new(),
            extensions: Extensions::new(),
        }
    }

    pub fn head(&self) -> &RequestHead {
        &self.head
    }

    pub fn endpoint(&self) -> &Endpoint {
        &self.head.endpoint
    }

    pub fn method(&self) -> &Method {
        &self.head.method
    }

    pub fn uri(&self) -> &Uri {
        &self.head.uri
    }

    pub fn headers(&self) -> &HeaderMap {
        &self.head.headers
    }

    /// Path parameter captured by the route template, e.g. `id`.
    pub fn param(&self, name: &str) -> Option<&str> {
        self.params.get(name).map(String::as_str)
    }

    pub fn params(&self) -> &HashMap<String, String> {
        &self.params
    }

    pub fn form(&self) -> &FormData {
        &self.form
    }

    pub fn body(&self) -> &Bytes {
        &self.body
    }

    /// Store request-scoped state, returning any previous value of that type.
    pub fn insert<T: Clone + Send + Sync + 'static>(&mut self, value: T) -> Option<T> {
        self.extensions.insert(value)
    }

    pub fn get<T: Send + Sync + 'static>(&self) -> Option<&T> {
        self.extensions.get::<T>()
    }

    pub fn remove<T: Send + Sync + 'static>(&mut self) -> Option<T> {
        self.extensions.remove::<T>()
    }

    pub fn extensions(&self) -> &Extensions {
        &self.extensions
    }

    /// Value of the `Content-Length` header, if any.
    pub fn content_length(&self) -> Option<u64> {
        self.head
            .headers
            .get(header::CONTENT_LENGTH)
            .and_then(|v| v.to_str().ok())
            .and_then(|v| v.parse().ok())
    }
}
