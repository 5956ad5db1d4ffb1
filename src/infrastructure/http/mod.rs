//! HTTP front end
//!
//! `GET /{address}/{signature}/{params...}` evaluates a read-only call and
//! renders the raw result as HTML, or as JSON when the client asks for it.

mod render;

use std::borrow::Cow;
use std::future::Future;
use std::io;
use std::string::FromUtf8Error;

use axum::extract::State;
use axum::http::{header, HeaderMap, Method, StatusCode, Uri};
use axum::response::{Html, IntoResponse, Response};
use axum::routing::get;
use axum::{Json, Router};
use tokio::net::TcpListener;
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;

use crate::service::{CallError, CallService};

pub use render::{CallResponse, ErrorResponse};

/// Build the router over a call service
pub fn router(service: CallService) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods([Method::GET, Method::OPTIONS])
        .allow_headers(Any);

    Router::new()
        .route("/", get(index))
        .route("/{address}/{signature}", get(call))
        // A wildcard never matches an empty tail
        .route("/{address}/{signature}/", get(call))
        .route("/{address}/{signature}/{*params}", get(call))
        .layer(TraceLayer::new_for_http())
        .layer(cors)
        .with_state(service)
}

/// Serve on an already bound listener until `shutdown` resolves.
pub async fn serve(
    listener: TcpListener,
    service: CallService,
    shutdown: impl Future<Output = ()> + Send + 'static,
) -> io::Result<()> {
    if let Ok(addr) = listener.local_addr() {
        tracing::info!(%addr, endpoint = %service.endpoint_name(), "listening");
    }
    axum::serve(listener, router(service))
        .with_graceful_shutdown(shutdown)
        .await
}

async fn index() -> &'static str {
    "Welcome!\n"
}

/// Captures of a call route, percent-decoded
#[derive(Debug)]
struct CallPath {
    address: String,
    signature: String,
    params: Vec<String>,
}

impl CallPath {
    /// Split the still-encoded request path on `/`, then decode each piece,
    /// so `%2F` stays inside its parameter.
    ///
    /// Axum's path extractors hand out captures already decoded.
    fn decode(raw: &str) -> Result<Self, FromUtf8Error> {
        let raw = raw.strip_prefix('/').unwrap_or(raw);
        let mut segments = raw.splitn(3, '/');

        let address = percent_decode(segments.next().unwrap_or_default())?;
        let signature = percent_decode(segments.next().unwrap_or_default())?;
        let params = split_params(segments.next().unwrap_or_default())
            .into_iter()
            .map(percent_decode)
            .collect::<Result<_, _>>()?;

        Ok(Self {
            address,
            signature,
            params,
        })
    }
}

async fn call(
    State(service): State<CallService>,
    uri: Uri,
    headers: HeaderMap,
) -> Response {
    let json = wants_json(&headers);
    let path = match CallPath::decode(uri.path()) {
        Ok(path) => path,
        Err(err) => {
            tracing::warn!(error = %err, "undecodable path");
            let body = ErrorResponse {
                kind: "InvalidPath",
                description: format!("path is not valid percent-encoded UTF-8: {err}"),
            };
            return respond(StatusCode::BAD_REQUEST, body, json);
        }
    };

    tracing::debug!(
        address = %path.address,
        signature = %path.signature,
        params = ?path.params,
        "evaluating call"
    );
    evaluate(&service, &path, json).await
}

async fn evaluate(service: &CallService, path: &CallPath, json: bool) -> Response {
    let CallPath {
        address,
        signature,
        params,
    } = path;

    match service.evaluate(address, signature, params).await {
        Ok(outcome) => {
            tracing::info!(
                contract = %outcome.contract,
                signature = %outcome.signature,
                result = %outcome.result_hex(),
                "contract result"
            );
            if json {
                Json(CallResponse::from(&outcome)).into_response()
            } else {
                Html(render::outcome_page(&outcome)).into_response()
            }
        }
        Err(err) => {
            tracing::warn!(%address, %signature, error = %err, "call failed");
            respond(status_for(&err), ErrorResponse::from(&err), json)
        }
    }
}

fn respond(status: StatusCode, body: ErrorResponse, json: bool) -> Response {
    if json {
        (status, Json(body)).into_response()
    } else {
        (status, Html(render::error_page(&body))).into_response()
    }
}

fn status_for(error: &CallError) -> StatusCode {
    match error {
        CallError::InvalidAddress { .. } | CallError::Abi(_) => StatusCode::BAD_REQUEST,
        CallError::Transport(_) => StatusCode::BAD_GATEWAY,
    }
}

/// Path segments after the signature; one leading or trailing slash is dropped.
fn split_params(raw: &str) -> Vec<&str> {
    let raw = raw.strip_prefix('/').unwrap_or(raw);
    let raw = raw.strip_suffix('/').unwrap_or(raw);
    if raw.is_empty() {
        return Vec::new();
    }
    raw.split('/').collect()
}

fn percent_decode(raw: &str) -> Result<String, FromUtf8Error> {
    urlencoding::decode(raw).map(Cow::into_owned)
}

fn wants_json(headers: &HeaderMap) -> bool {
    headers
        .get(header::ACCEPT)
        .and_then(|value| value.to_str().ok())
        .is_some_and(|accept| accept.contains("application/json"))
}
