use crate::error::ExecuteError;
use crate::options::RequestOptions;
use async_trait::async_trait;
use reqwest::header::HeaderMap;
use reqwest::StatusCode;
use serde::de::DeserializeOwned;
use std::borrow::Cow;
use tracing::debug;

/// A fully-read HTTP response.  The executor consumes the wire response in
/// its entirety so that task outcomes are plain values with no I/O left in
/// them.
#[derive(Debug, Clone)]
pub struct Response {
    status: StatusCode,
    headers: HeaderMap,
    body: Vec<u8>,
}

impl Response {
    pub(crate) fn new(status: StatusCode, headers: HeaderMap, body: Vec<u8>) -> Self {
        Self {
            status,
            headers,
            body,
        }
    }

    pub fn status(&self) -> StatusCode {
        self.status
    }

    pub fn headers(&self) -> &HeaderMap {
        &self.headers
    }

    pub fn body(&self) -> &[u8] {
        &self.body
    }

    /// The body as text, with invalid UTF-8 replaced.
    pub fn text(&self) -> Cow<'_, str> {
        String::from_utf8_lossy(&self.body)
    }

    /// Deserialize the body as JSON.
    pub fn json<T: DeserializeOwned>(&self) -> Result<T, serde_json::Error> {
        serde_json::from_slice(&self.body)
    }
}

/// The request-executor seam: given options, perform one network call and
/// deliver exactly one terminal event.
///
/// Implementations must honor the token in
/// [`RequestOptions::attached_cancel_token`]: when it fires before the call
/// completes, report `ExecuteError::Aborted` and deliver no other event.
/// Tests inject fakes through this trait in place of [`HttpExecutor`].
#[async_trait]
pub trait Executor {
    async fn execute(&self, options: &RequestOptions) -> Result<Response, ExecuteError>;
}

/// The real executor, backed by a [`reqwest::Client`].
///
/// One network call per `execute`; no retries, and redirects are not
/// followed, so a redirection status surfaces as a `Status` failure like any
/// other non-2xx response.
#[derive(Debug, Clone)]
pub struct HttpExecutor {
    client: reqwest::Client,
}

impl HttpExecutor {
    pub fn new() -> Result<Self, ExecuteError> {
        let client = reqwest::Client::builder()
            .redirect(reqwest::redirect::Policy::none())
            .build()?;
        Ok(Self { client })
    }

    fn build_request(&self, options: &RequestOptions) -> Result<reqwest::Request, ExecuteError> {
        let url = reqwest::Url::parse(options.url())
            .map_err(|e| ExecuteError::InvalidOptions(format!("url {}: {}", options.url(), e)))?;

        let mut req = self.client.request(options.method().clone(), url);

        if !options.query_params().is_empty() {
            req = req.query(options.query_params());
        }

        for (name, value) in options.headers() {
            req = req.header(name.as_str(), value.as_str());
        }

        if let Some(timeout) = options.timeout_value() {
            req = req.timeout(timeout);
        }

        // pass content-length: 0 if there is no body.  This is implicit for
        // GET requests, but not for methods that typically have a body.
        let req = match options.body() {
            Some(body) => req.json(body),
            None => req.header("Content-Length", "0"),
        };

        req.build()
            .map_err(|e| ExecuteError::InvalidOptions(e.to_string()))
    }

    async fn dispatch(&self, req: reqwest::Request) -> Result<Response, ExecuteError> {
        let res = self.client.execute(req).await?;

        let status = res.status();
        let headers = res.headers().clone();
        let body = res.bytes().await?.to_vec();
        let response = Response::new(status, headers, body);

        if status.is_success() {
            Ok(response)
        } else {
            Err(ExecuteError::Status(response))
        }
    }
}

#[async_trait]
impl Executor for HttpExecutor {
    async fn execute(&self, options: &RequestOptions) -> Result<Response, ExecuteError> {
        let req = self.build_request(options)?;
        debug!(method = %options.method(), url = %options.url(), "dispatching request");

        match options.attached_cancel_token() {
            Some(token) => {
                // The biased select checks the token first, so a token that
                // fires before or during the call wins the race and the
                // request future is dropped, aborting the connection.  An
                // aborted call can therefore never also deliver a response.
                tokio::select! {
                    biased;
                    _ = token.cancelled() => {
                        debug!(url = %options.url(), "request aborted by cancellation token");
                        Err(ExecuteError::Aborted(token.reason()))
                    }
                    res = self.dispatch(req) => res,
                }
            }
            None => self.dispatch(req).await,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cancel::CancelSource;
    use httptest::{matchers::*, responders::*, Expectation, Server};
    use serde_json::{json, Value};
    use std::time::Duration;

    #[tokio::test]
    async fn success_reads_full_response() {
        let server = Server::run();
        server.expect(
            Expectation::matching(request::method_path("GET", "/foo/bar")).respond_with(
                status_code(200)
                    .append_header("Content-Type", "application/json")
                    .body(r#"{ "foo": "bar" }"#),
            ),
        );

        let executor = HttpExecutor::new().unwrap();
        let options = RequestOptions::get(server.url_str("/foo/bar"));
        let response = executor.execute(&options).await.unwrap();

        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(
            response.headers().get("Content-Type").unwrap(),
            "application/json"
        );
        assert_eq!(response.json::<Value>().unwrap(), json!({"foo": "bar"}));
    }

    #[tokio::test]
    async fn non_success_status_preserves_body() {
        let server = Server::run();
        server.expect(
            Expectation::matching(request::method_path("GET", "/foo/bar")).respond_with(
                status_code(400)
                    .append_header("Content-Type", "application/json")
                    .body(r#"{ "foo": "bar" }"#),
            ),
        );

        let executor = HttpExecutor::new().unwrap();
        let options = RequestOptions::get(server.url_str("/foo/bar"));
        let err = executor.execute(&options).await.unwrap_err();

        assert_eq!(err.status(), Some(StatusCode::BAD_REQUEST));
        let response = err.response().unwrap();
        assert_eq!(response.json::<Value>().unwrap(), json!({"foo": "bar"}));
    }

    #[tokio::test]
    async fn post_sends_json_body() {
        let body = json!({"hello": "world"});

        let server = Server::run();
        server.expect(
            Expectation::matching(all_of![
                request::method_path("POST", "/foo/bar"),
                request::body(json_decoded(eq(body.clone()))),
            ])
            .respond_with(status_code(200)),
        );

        let executor = HttpExecutor::new().unwrap();
        let options = RequestOptions::post(server.url_str("/foo/bar")).json(body);
        let response = executor.execute(&options).await.unwrap();
        assert_eq!(response.status(), StatusCode::OK);
    }

    #[tokio::test]
    async fn query_and_headers_are_applied() {
        let server = Server::run();
        server.expect(
            Expectation::matching(all_of![
                request::method_path("GET", "/search"),
                request::query(url_decoded(contains(("q", "rust")))),
                request::headers(contains(("x-trace", "abc123"))),
            ])
            .respond_with(status_code(200)),
        );

        let executor = HttpExecutor::new().unwrap();
        let options = RequestOptions::get(server.url_str("/search"))
            .query("q", "rust")
            .header("X-Trace", "abc123");
        executor.execute(&options).await.unwrap();
    }

    #[tokio::test]
    async fn transport_error_is_not_a_status_error() {
        // nothing listens on port 1
        let executor = HttpExecutor::new().unwrap();
        let options = RequestOptions::get("http://127.0.0.1:1/");
        let err = executor.execute(&options).await.unwrap_err();
        assert!(matches!(err, ExecuteError::Transport(_)));
        assert_eq!(err.status(), None);
    }

    #[tokio::test]
    async fn invalid_url_is_rejected_without_network() {
        let executor = HttpExecutor::new().unwrap();
        let options = RequestOptions::get("not a url");
        let err = executor.execute(&options).await.unwrap_err();
        assert!(matches!(err, ExecuteError::InvalidOptions(_)));
    }

    #[tokio::test]
    async fn abort_mid_flight_wins_the_race() {
        let server = Server::run();
        server.expect(
            Expectation::matching(request::method_path("GET", "/slow"))
                // long enough that only cancellation can end the call
                .respond_with(delay_and_then(Duration::from_secs(30), status_code(200))),
        );

        let source = CancelSource::new();
        let options = RequestOptions::get(server.url_str("/slow")).cancel_token(source.token());

        let executor = HttpExecutor::new().unwrap();
        let call = tokio::spawn(async move { executor.execute(&options).await });

        tokio::time::sleep(Duration::from_millis(100)).await;
        source.cancel_with_reason("stop");

        let err = call.await.unwrap().unwrap_err();
        match err {
            ExecuteError::Aborted(reason) => assert_eq!(reason.as_deref(), Some("stop")),
            other => panic!("expected Aborted, got {:?}", other),
        }
    }

    #[tokio::test]
    async fn token_already_cancelled_means_no_dispatch() {
        let server = Server::run();
        // no expectations: any request would fail verification

        let source = CancelSource::new();
        source.cancel();
        let options = RequestOptions::get(server.url_str("/never")).cancel_token(source.token());

        let executor = HttpExecutor::new().unwrap();
        let err = executor.execute(&options).await.unwrap_err();
        assert!(err.is_aborted());
    }
}
