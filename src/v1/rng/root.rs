#![forbid(unsafe_code)]

use poem::Request;
use poem_openapi::{ OpenApi, param::Query, payload::{Html, Json}, ApiResponse };
use anyhow::Result;
use tera::Context;
use log::error;

use crate::utils::config::{DEFAULT_COUNT, DEFAULT_FROM, DEFAULT_TO};
use crate::utils::errors::{Errors, HttpResult};
use crate::utils::randgen;
use crate::utils::render::render_page;
use crate::utils::rng_utils::{self, RequestDebug};

// ***************************************************************************
//                          Request/Response Definiions
// ***************************************************************************
pub struct RootApi;

// All fields are optional: presence of any random field is what triggers
// generation, so absence must stay distinguishable from an explicit zero.
struct ReqRoot
{
    name: Option<String>,
    count: Option<i32>,
    from: Option<i32>,
    to: Option<i32>,
}

// Implement the debug record trait for logging.
impl RequestDebug for ReqRoot {
    type Req = ReqRoot;
    fn get_request_info(&self) -> String {
        let mut s = String::with_capacity(255);
        s.push_str("  Request query:");
        s.push_str("\n    name: ");
        s.push_str(self.name.as_deref().unwrap_or("<absent>"));
        s.push_str("\n    count: ");
        s.push_str(&opt_to_string(self.count));
        s.push_str("\n    from: ");
        s.push_str(&opt_to_string(self.from));
        s.push_str("\n    to: ");
        s.push_str(&opt_to_string(self.to));
        s
    }
}

fn opt_to_string(v: Option<i32>) -> String {
    match v {
        Some(i) => i.to_string(),
        None => "<absent>".to_string(),
    }
}

// ------------------- HTTP Status Codes -------------------
#[derive(Debug, ApiResponse)]
enum RngResponse {
    #[oai(status = 200)]
    Http200(Html<String>),
    #[oai(status = 400)]
    Http400(Json<HttpResult>),
    #[oai(status = 500)]
    Http500(Json<HttpResult>),
}

fn make_http_200(page: String) -> RngResponse {
    RngResponse::Http200(Html(page))
}
fn make_http_400(msg: String) -> RngResponse {
    RngResponse::Http400(Json(HttpResult::new(400.to_string(), msg)))
}
fn make_http_500(msg: String) -> RngResponse {
    RngResponse::Http500(Json(HttpResult::new(500.to_string(), msg)))
}

// ***************************************************************************
//                             OpenAPI Endpoint
// ***************************************************************************
#[OpenApi]
impl RootApi {
    #[oai(path = "/", method = "get")]
    async fn get_root(&self,
                      http_req: &Request,
                      name: Query<Option<String>>,
                      count: Query<Option<i32>>,
                      from: Query<Option<i32>>,
                      to: Query<Option<i32>>,
    ) -> RngResponse {
        // Package the request parameters.
        let req = ReqRoot {name: name.0, count: count.0, from: from.0, to: to.0};

        // -------------------- Process Request ----------------------
        match process(http_req, &req).await {
            Ok(r) => r,
            Err(e) => {
                // Log the fault, keep the response body opaque.
                error!("ERROR: {}", e);
                make_http_500("Internal server error.".to_string())
            }
        }
    }
}

// ***************************************************************************
//                          Request/Response Methods
// ***************************************************************************
/// Process the request.
async fn process(http_req: &Request, req: &ReqRoot) -> Result<RngResponse, anyhow::Error> {
    // Conditional logging depending on log level.
    rng_utils::debug_request(http_req, req);

    // A random batch is embedded only when the caller supplied at least one
    // of the generation fields.  Absent fields take the /random defaults and
    // the generator is invoked directly, not through an HTTP round trip.
    let values: Vec<i32> = if req.count.is_some() || req.from.is_some() || req.to.is_some() {
        let count = req.count.unwrap_or(DEFAULT_COUNT);
        let from = req.from.unwrap_or(DEFAULT_FROM);
        let to = req.to.unwrap_or(DEFAULT_TO);
        match randgen::generate(count, from, to).await {
            Ok(v) => v,
            Err(Errors::InvalidRange(msg)) => return Ok(make_http_400(msg)),
            Err(e) => return Err(e.into()),
        }
    } else {
        Vec::new()
    };

    // Hand the renderer its data bag.  Entered form values are echoed back
    // into the inputs; empty strings render as empty attributes.
    let mut ctx = Context::new();
    ctx.insert("name", req.name.as_deref().unwrap_or(""));
    ctx.insert("count", &req.count.map(|v| v.to_string()).unwrap_or_default());
    ctx.insert("from", &req.from.map(|v| v.to_string()).unwrap_or_default());
    ctx.insert("to", &req.to.map(|v| v.to_string()).unwrap_or_default());
    ctx.insert("values", &values);

    let page = render_page("index.html", &ctx)?;
    Ok(make_http_200(page))
}

// ***************************************************************************
//                                  Tests
// ***************************************************************************
#[cfg(test)]
mod tests {
    use super::RootApi;
    use poem::http::{StatusCode, Uri};
    use poem::{Endpoint, Request, Route};
    use poem_openapi::OpenApiService;

    fn app() -> impl Endpoint {
        Route::new().nest("/", OpenApiService::new(RootApi, "test", "1.0"))
    }

    async fn get_page(uri: &'static str) -> (StatusCode, String) {
        let resp = app().get_response(Request::builder()
            .uri(Uri::from_static(uri))
            .finish()).await;
        let status = resp.status();
        let body = resp.into_body().into_string().await.unwrap();
        (status, body)
    }

    #[tokio::test]
    async fn plain_page_has_no_random_section() {
        let (status, body) = get_page("/").await;
        assert_eq!(status, StatusCode::OK);
        assert!(body.contains("Lets get random!"));
        assert!(!body.contains("Your random ints"));
    }

    #[tokio::test]
    async fn named_greeting() {
        let (status, body) = get_page("/?name=ani").await;
        assert_eq!(status, StatusCode::OK);
        assert!(body.contains("ani"));
        assert!(!body.contains("Your random ints"));
    }

    #[tokio::test]
    async fn random_params_embed_values() {
        let (status, body) = get_page("/?count=3&from=5&to=9").await;
        assert_eq!(status, StatusCode::OK);
        assert!(body.contains("Your random ints"));
        // The entered values are echoed back into the form.
        assert!(body.contains("value=\"3\""));
    }

    #[tokio::test]
    async fn partial_params_take_defaults() {
        // Only from/to given: count defaults to 1, one value is embedded.
        let (status, body) = get_page("/?from=2&to=2").await;
        assert_eq!(status, StatusCode::OK);
        assert!(body.contains("Your random ints"));
        assert!(body.contains("<p>2</p>"));
    }

    #[tokio::test]
    async fn invalid_range_is_bad_request() {
        let (status, _) = get_page("/?from=9&to=1").await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn malformed_param_is_bad_request() {
        let resp = app().get_response(Request::builder()
            .uri(Uri::from_static("/?to=asdf"))
            .finish()).await;
        assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
    }
}
