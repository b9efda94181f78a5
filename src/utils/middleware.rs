#![forbid(unsafe_code)]

use log::{debug, error};
use poem::error::NotFoundError;
use poem::http::{header, StatusCode};
use poem::{Endpoint, IntoResponse, Middleware, Request, Response, Result};
use poem_openapi::error::{ParseParamError, ParseRequestPayloadError};
use tera::Context;

use crate::utils::errors::Errors;
use crate::utils::render::render_page;

// ***************************************************************************
//                             Access Logging
// ***************************************************************************
/** Logs one DEBUG record per request:  <uri> (<method>, body: <bool>) -> <status> */
pub struct AccessLog;

impl<E: Endpoint> Middleware<E> for AccessLog {
    type Output = AccessLogEndpoint<E>;

    fn transform(&self, ep: E) -> Self::Output {
        AccessLogEndpoint { ep }
    }
}

pub struct AccessLogEndpoint<E> {
    ep: E,
}

impl<E: Endpoint> Endpoint for AccessLogEndpoint<E> {
    type Output = Response;

    async fn call(&self, req: Request) -> Result<Self::Output> {
        let uri = req.uri().clone();
        let method = req.method().clone();
        let has_body = request_has_body(&req);

        match self.ep.call(req).await {
            Ok(resp) => {
                let resp = resp.into_response();
                debug!("{} ({}, body: {}) -> {}", uri, method, has_body, resp.status());
                Ok(resp)
            }
            Err(err) => {
                debug!("{} ({}, body: {}) -> {}", uri, method, has_body, err.status());
                Err(err)
            }
        }
    }
}

// ***************************************************************************
//                              Status Pages
// ***************************************************************************
/** Converts every error escaping the routing layer into a classified
 * response: a JSON result body for clients that sent JSON, a rendered HTML
 * error page for everyone else.  Handlers produce their own classified
 * responses; what reaches this middleware is binding failures, unmatched
 * routes and unexpected faults.
 */
pub struct StatusPages;

impl<E: Endpoint> Middleware<E> for StatusPages {
    type Output = StatusPagesEndpoint<E>;

    fn transform(&self, ep: E) -> Self::Output {
        StatusPagesEndpoint { ep }
    }
}

pub struct StatusPagesEndpoint<E> {
    ep: E,
}

impl<E: Endpoint> Endpoint for StatusPagesEndpoint<E> {
    type Output = Response;

    async fn call(&self, req: Request) -> Result<Self::Output> {
        let path = req.uri().path().to_string();
        let wants_json = request_sent_json(&req);

        match self.ep.call(req).await {
            Ok(resp) => Ok(resp.into_response()),
            Err(err) => {
                let status = err.status();
                let classified = classify_error(&err, &path);
                error!("{}", classified);
                Ok(error_response(status, &classified, wants_json))
            }
        }
    }
}

// ---------------------------------------------------------------------------
// classify_error:
// ---------------------------------------------------------------------------
/** Map a routing-layer error onto the application error taxonomy. */
fn classify_error(err: &poem::Error, path: &str) -> Errors {
    if let Some(e) = err.downcast_ref::<ParseParamError>() {
        Errors::InvalidParameter(e.name.to_string(), e.reason.clone())
    } else if let Some(e) = err.downcast_ref::<ParseRequestPayloadError>() {
        Errors::InvalidBody(e.reason.clone())
    } else if err.downcast_ref::<NotFoundError>().is_some() || err.status() == StatusCode::NOT_FOUND {
        Errors::RouteNotFound(path.to_string())
    } else if err.status().is_client_error() {
        Errors::InvalidBody(err.to_string())
    } else {
        Errors::InternalFault(err.to_string())
    }
}

// ---------------------------------------------------------------------------
// error_response:
// ---------------------------------------------------------------------------
fn error_response(status: StatusCode, classified: &Errors, wants_json: bool) -> Response {
    if wants_json {
        // Server faults stay opaque for JSON clients.
        let msg = if status.is_server_error() {
            "Internal server error.".to_string()
        } else {
            classified.to_string()
        };
        let body = serde_json::json!({
            "result_code": status.as_u16().to_string(),
            "result_msg": msg,
        });
        Response::builder()
            .status(status)
            .content_type("application/json; charset=utf-8")
            .body(body.to_string())
    } else {
        let mut ctx = Context::new();
        ctx.insert("status", &status.as_u16());
        ctx.insert("message", &classified.to_string());
        let html = match render_page("error.html", &ctx) {
            Ok(h) => h,
            Err(_) => format!("Error: {}", status.as_u16()),
        };
        Response::builder()
            .status(status)
            .content_type("text/html; charset=utf-8")
            .body(html)
    }
}

// ---------------------------------------------------------------------------
// request_has_body:
// ---------------------------------------------------------------------------
fn request_has_body(req: &Request) -> bool {
    req.headers()
        .get(header::CONTENT_LENGTH)
        .and_then(|v| v.to_str().ok())
        .and_then(|v| v.parse::<u64>().ok())
        .map(|n| n > 0)
        .unwrap_or(false)
}

// ---------------------------------------------------------------------------
// request_sent_json:
// ---------------------------------------------------------------------------
fn request_sent_json(req: &Request) -> bool {
    req.content_type().map(|ct| ct.contains("json")).unwrap_or(false)
}
