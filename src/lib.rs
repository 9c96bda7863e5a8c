/*!
# reqtask

A lazy, cancellable wrapper around a single HTTP request, settling on exactly
one of three outcomes: success, failure, or cancellation.

A [`RequestTask`] is an inert description of one network call.  Building it
performs no I/O; the request is dispatched only when [`run`](RequestTask::run)
is awaited, and at most once.  Every task carries a cancellation handle,
available from construction, and accepts an externally created
[`CancelToken`] in its options; triggering either one before the task settles
yields a `Cancelled` outcome, and triggering after it settles is a silent
no-op.

# Usage

## A simple request

Build [`RequestOptions`] with the builder pattern, wrap them in a task, and
run it:

```
# use httptest::{matchers::*, responders::*, Expectation, Server};
# #[tokio::main]
# async fn main() {
# let server = Server::run();
# server.expect(
#     Expectation::matching(request::method_path("GET", "/status"))
#         .respond_with(status_code(200)
#             .append_header("Content-Type", "application/json")
#             .body("{\"running\": true}")),
# );
# let url = server.url_str("/status");
use reqtask::{Outcome, RequestOptions, RequestTask};
use serde_json::Value;

let task = RequestTask::new(RequestOptions::get(url)).unwrap();
match task.run().await {
    Outcome::Success(response) => {
        assert_eq!(response.json::<Value>().unwrap()["running"], true);
    }
    Outcome::Failure(err) => panic!("failed: {}", err),
    Outcome::Cancelled(_) => panic!("cancelled"),
}
# }
```

Non-success statuses arrive on the failure channel with the response
preserved:

```
# use httptest::{matchers::*, responders::*, Expectation, Server};
# #[tokio::main]
# async fn main() {
# let server = Server::run();
# server.expect(
#     Expectation::matching(request::method_path("GET", "/missing"))
#         .respond_with(status_code(404).body("{\"code\": \"ResourceNotFound\"}")),
# );
# let url = server.url_str("/missing");
use reqtask::{RequestOptions, RequestTask, StatusCode};

let task = RequestTask::new(RequestOptions::get(url)).unwrap();
let err = task.run().await.failure().unwrap();
assert_eq!(err.status(), Some(StatusCode::NOT_FOUND));
# }
```

## Cancellation

Every task hands out a [`CancelHandle`].  Cancelling before the run starts
means no network call is ever made:

```
# use httptest::Server;
# #[tokio::main]
# async fn main() {
# let server = Server::run();
# let url = server.url_str("/never");
use reqtask::{RequestOptions, RequestTask};

let task = RequestTask::new(RequestOptions::get(url)).unwrap();
let handle = task.cancel_handle();
handle.cancel_with_reason("shutting down");

let outcome = task.run().await;
assert_eq!(outcome.cancel_reason(), Some("shutting down"));
# }
```

A caller can also hold the trigger side themselves, by attaching a token from
a [`CancelSource`] to the options.  That token replaces the task's internal
signal, and the task's own handle triggers it too, so both paths behave
identically:

```
# use httptest::Server;
# #[tokio::main]
# async fn main() {
# let server = Server::run();
# let url = server.url_str("/never");
use reqtask::{CancelSource, RequestOptions, RequestTask};

let source = CancelSource::new();
let task = RequestTask::new(RequestOptions::get(url).cancel_token(source.token())).unwrap();

source.cancel();
assert!(task.run().await.is_cancelled());
# }
```

## Custom executors

The network call itself goes through the [`Executor`] trait; tests (and
anything else that wants to intercept the transport) can supply their own
implementation via [`RequestTask::with_executor`].
*/

mod cancel;
mod error;
mod executor;
mod options;
mod task;


pub use cancel::{CancelHandle, CancelSource, CancelToken};
pub use error::ExecuteError;
pub use executor::{Executor, HttpExecutor, Response};
pub use options::RequestOptions;
pub use task::{request, Outcome, RequestTask};

// re-export
pub use reqwest::{Method, StatusCode};
