//! Form-based HTTP method override.
//!
//! # Responsibilities
//! - Let HTML forms (GET/POST only) reach PUT, PATCH and DELETE routes
//! - Read the override field from url-encoded and multipart POST bodies
//! - Hand the parsed form downstream so actions never re-read the body
//!
//! # Design Decisions
//! - Wraps the whole router: the method must change before routing
//! - Only POST with a form body is inspected; everything else passes
//!   through untouched
//! - Override to a bodyless method empties the body and sets
//!   `Content-Length: 0`

use std::sync::Arc;
use std::task::{Context, Poll};

use axum::{
    body::Body,
    extract::Request,
    http::{header, HeaderValue, Method, StatusCode},
    response::{IntoResponse, Response},
};
use futures_util::future::BoxFuture;
use tower::{Layer, Service};

use crate::config::MethodOverrideConfig;
use crate::http::form::{is_form_content, FormData};
use crate::observability::metrics;

/// Form field carrying the override.
pub const DEFAULT_FIELD: &str = "_method";

/// Methods a form may switch to.
pub const ALLOWED_METHODS: [Method; 5] = [Method::GET, Method::POST, Method::DELETE, Method::PUT, Method::PATCH];

/// Methods whose requests carry no body.
pub const BODYLESS_METHODS: [Method; 4] = [Method::GET, Method::HEAD, Method::OPTIONS, Method::DELETE];

/// Method to switch to for a (case-insensitive) override value.
pub fn override_target(value: &str) -> Option<Method> {
    let value = value.to_ascii_uppercase();
    ALLOWED_METHODS.into_iter().find(|m| m.as_str() == value)
}

/// Whether an override value names a bodyless method.
pub fn is_bodyless(value: &str) -> bool {
    let value = value.to_ascii_uppercase();
    BODYLESS_METHODS.iter().any(|m| m.as_str() == value)
}

/// Layer installing [`MethodOverride`].
#[derive(Debug, Clone)]
pub struct MethodOverrideLayer {
    enabled: bool,
    field: Arc<str>,
    max_form_bytes: usize,
}

impl MethodOverrideLayer {
    pub fn new(field: &str, max_form_bytes: usize) -> Self {
        Self {
            enabled: true,
            field: Arc::from(field),
            max_form_bytes,
        }
    }

    pub fn from_config(config: &MethodOverrideConfig) -> Self {
        Self {
            enabled: config.enabled,
            field: Arc::from(config.field.as_str()),
            max_form_bytes: config.max_form_bytes,
        }
    }
}

impl Default for MethodOverrideLayer {
    fn default() -> Self {
        Self::from_config(&MethodOverrideConfig::default())
    }
}

impl<S> Layer<S> for MethodOverrideLayer {
    type Service = MethodOverride<S>;

    fn layer(&self, inner: S) -> Self::Service {
        MethodOverride {
            inner,
            layer: self.clone(),
        }
    }
}

/// Rewrites `POST` form submissions to the method named by the override field.
#[derive(Debug, Clone)]
pub struct MethodOverride<S> {
    inner: S,
    layer: MethodOverrideLayer,
}

impl<S> MethodOverride<S> {
    pub fn inner(&self) -> &S {
        &self.inner
    }
}

impl<S> Service<Request> for MethodOverride<S>
where
    S: Service<Request, Response = Response> + Clone + Send + 'static,
    S::Future: Send + 'static,
    S::Error: Send + 'static,
{
    type Response = Response;
    type Error = S::Error;
    type Future = BoxFuture<'static, Result<Response, S::Error>>;

    fn poll_ready(&mut self, cx: &mut Context<'_>) -> Poll<Result<(), Self::Error>> {
        self.inner.poll_ready(cx)
    }

    fn call(&mut self, request: Request) -> Self::Future {
        if !self.layer.enabled || request.method() != Method::POST || !is_form_content(request.headers()) {
            return Box::pin(self.inner.call(request));
        }

        // The clone may not be ready; keep the one that was polled.
        let clone = self.inner.clone();
        let mut inner = std::mem::replace(&mut self.inner, clone);
        let layer = self.layer.clone();

        Box::pin(async move {
            match apply_override(request, &layer.field, layer.max_form_bytes).await {
                Ok(request) => inner.call(request).await,
                Err(response) => Ok(response),
            }
        })
    }
}

/// Buffer a form POST and switch its method if the override field asks for it.
pub async fn apply_override(request: Request, field: &str, max_form_bytes: usize) -> Result<Request, Response> {
    let declared = request
        .headers()
        .get(header::CONTENT_LENGTH)
        .and_then(|v| v.to_str().ok())
        .and_then(|v| v.parse::<u64>().ok());
    if declared.is_some_and(|len| len > max_form_bytes as u64) {
        tracing::warn!(content_length = ?declared, limit = max_form_bytes, "Form body over override limit");
        return Err((StatusCode::PAYLOAD_TOO_LARGE, "Form body too large").into_response());
    }

    let (mut parts, body) = request.into_parts();
    let bytes = axum::body::to_bytes(body, max_form_bytes).await.map_err(|e| {
        tracing::warn!(error = %e, "Failed to read form body");
        (StatusCode::BAD_REQUEST, "Failed to read form body").into_response()
    })?;

    let form = match FormData::from_body(&parts.headers, bytes.clone()).await {
        Ok(form) => form.unwrap_or_default(),
        Err(e) => {
            tracing::warn!(error = %e, "Failed to parse form body");
            return Err((StatusCode::BAD_REQUEST, "Malformed form body").into_response());
        }
    };
    let value = form.get(field).unwrap_or_default().to_string();
    let mut body = Body::from(bytes);

    if let Some(method) = override_target(&value) {
        tracing::debug!(path = %parts.uri.path(), method = %method, "Method overridden");
        metrics::record_method_override(method.as_str());
        parts.method = method;
        parts.extensions.insert(form);
    }

    if is_bodyless(&value) {
        parts.headers.insert(header::CONTENT_LENGTH, HeaderValue::from_static("0"));
        body = Body::empty();
    }

    Ok(Request::from_parts(parts, body))
}
