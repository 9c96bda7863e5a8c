use crate::cancel::CancelToken;
use reqwest::Method;
use serde_json::Value;
use std::time::Duration;

/// RequestOptions describes a single HTTP request, following the builder
/// pattern: each method consumes the options and returns an updated copy, so
/// a value handed to a task is never mutated in place.
///
/// The `cancel_token` slot is reserved for cancellation: when a token is
/// supplied here it is the one attached to the request execution, replacing
/// the task's internal signal.
#[derive(Debug, Clone, Default)]
pub struct RequestOptions {
    method: Method,
    url: String,
    headers: Vec<(String, String)>,
    query: Vec<(String, String)>,
    body: Option<Value>,
    timeout: Option<Duration>,
    cancel_token: Option<CancelToken>,
}

impl RequestOptions {
    pub fn new<S: Into<String>>(method: Method, url: S) -> Self {
        Self {
            method,
            url: url.into(),
            ..Self::default()
        }
    }

    pub fn get<S: Into<String>>(url: S) -> Self {
        Self::new(Method::GET, url)
    }

    pub fn post<S: Into<String>>(url: S) -> Self {
        Self::new(Method::POST, url)
    }

    pub fn put<S: Into<String>>(url: S) -> Self {
        Self::new(Method::PUT, url)
    }

    pub fn delete<S: Into<String>>(url: S) -> Self {
        Self::new(Method::DELETE, url)
    }

    /// Add a header to the request.
    pub fn header<N: Into<String>, V: Into<String>>(mut self, name: N, value: V) -> Self {
        self.headers.push((name.into(), value.into()));
        self
    }

    /// Add a query-string parameter to the request URL.
    pub fn query<N: Into<String>, V: Into<String>>(mut self, name: N, value: V) -> Self {
        self.query.push((name.into(), value.into()));
        self
    }

    /// Set a JSON request body.  The body is serialized once, when the
    /// request is dispatched.
    pub fn json(mut self, body: Value) -> Self {
        self.body = Some(body);
        self
    }

    /// Set the timeout for the request.  Without one, the transport's
    /// default applies.
    pub fn timeout(mut self, timeout: Duration) -> Self {
        self.timeout = Some(timeout);
        self
    }

    /// Attach an externally created cancellation token.  Triggering its
    /// [`CancelSource`](crate::CancelSource) aborts the request exactly as
    /// the task's own cancel handle does.
    pub fn cancel_token(mut self, token: CancelToken) -> Self {
        self.cancel_token = Some(token);
        self
    }

    pub fn method(&self) -> &Method {
        &self.method
    }

    pub fn url(&self) -> &str {
        &self.url
    }

    pub fn headers(&self) -> &[(String, String)] {
        &self.headers
    }

    pub fn query_params(&self) -> &[(String, String)] {
        &self.query
    }

    pub fn body(&self) -> Option<&Value> {
        self.body.as_ref()
    }

    pub fn timeout_value(&self) -> Option<Duration> {
        self.timeout
    }

    pub fn attached_cancel_token(&self) -> Option<&CancelToken> {
        self.cancel_token.as_ref()
    }

    /// Merge these options over a default cancellation token: a
    /// caller-supplied token wins, the default fills the gap.  Returns the
    /// merged options and the token that is effectively attached.
    pub(crate) fn merge_cancel_token(self, default: CancelToken) -> (Self, CancelToken) {
        let effective = match self.cancel_token {
            Some(ref token) => token.clone(),
            None => default,
        };
        let merged = Self {
            cancel_token: Some(effective.clone()),
            ..self
        };
        (merged, effective)
    }
}
