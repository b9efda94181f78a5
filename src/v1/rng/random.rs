#![forbid(unsafe_code)]

use poem::Request;
use poem_openapi::{ OpenApi, param::Query, payload::Json, ApiResponse };
use anyhow::Result;
use serde_json::{json, Value};
use log::error;

use crate::utils::config::{DEFAULT_COUNT, DEFAULT_FROM, DEFAULT_TO};
use crate::utils::errors::{Errors, HttpResult};
use crate::utils::randgen;
use crate::utils::rng_utils::{self, RequestDebug};

// ***************************************************************************
//                          Request/Response Definiions
// ***************************************************************************
pub struct RandomApi;

// Fields absent from the query string take these defaults, so the bound
// request is always fully populated.
struct ReqRandom
{
    count: i32,
    from: i32,
    to: i32,
}

// Implement the debug record trait for logging.
impl RequestDebug for ReqRandom {
    type Req = ReqRandom;
    fn get_request_info(&self) -> String {
        let mut s = String::with_capacity(255);
        s.push_str("  Request query:");
        s.push_str("\n    count: ");
        s.push_str(&self.count.to_string());
        s.push_str("\n    from: ");
        s.push_str(&self.from.to_string());
        s.push_str("\n    to: ");
        s.push_str(&self.to.to_string());
        s
    }
}

// ------------------- HTTP Status Codes -------------------
// A one-element batch unwraps to a bare number, so the 200 payload is a
// JSON value rather than a fixed array type.
#[derive(Debug, ApiResponse)]
enum RngResponse {
    #[oai(status = 200)]
    Http200(Json<Value>),
    #[oai(status = 400)]
    Http400(Json<HttpResult>),
    #[oai(status = 500)]
    Http500(Json<HttpResult>),
}

fn make_http_200(resp: Value) -> RngResponse {
    RngResponse::Http200(Json(resp))
}
fn make_http_400(msg: String) -> RngResponse {
    RngResponse::Http400(Json(HttpResult::new(400.to_string(), msg)))
}
fn make_http_500(msg: String) -> RngResponse {
    RngResponse::Http500(Json(HttpResult::new(500.to_string(), msg)))
}

// ---------------------------------------------------------------------------
// Default functions consulted by the binder for absent query fields.
// ---------------------------------------------------------------------------
fn default_count() -> i32 { DEFAULT_COUNT }
fn default_from()  -> i32 { DEFAULT_FROM }
fn default_to()    -> i32 { DEFAULT_TO }

// ***************************************************************************
//                             OpenAPI Endpoint
// ***************************************************************************
#[OpenApi]
impl RandomApi {
    #[oai(path = "/random", method = "get")]
    async fn get_random(&self,
                        http_req: &Request,
                        #[oai(default = "default_count")] count: Query<i32>,
                        #[oai(default = "default_from")] from: Query<i32>,
                        #[oai(default = "default_to")] to: Query<i32>,
    ) -> RngResponse {
        // Package the request parameters.
        let req = ReqRandom {count: *count, from: *from, to: *to};

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
async fn process(http_req: &Request, req: &ReqRandom) -> Result<RngResponse, anyhow::Error> {
    // Conditional logging depending on log level.
    rng_utils::debug_request(http_req, req);

    // Draw the batch.  Range validation happens before any draw starts.
    match randgen::generate(req.count, req.from, req.to).await {
        Ok(values) => {
            // The simple one-value form responds with a bare integer.
            if values.len() == 1 {
                Ok(make_http_200(json!(values[0])))
            } else {
                Ok(make_http_200(json!(values)))
            }
        },
        Err(Errors::InvalidRange(msg)) => Ok(make_http_400(msg)),
        Err(e) => Err(e.into()),
    }
}

// ***************************************************************************
//                                  Tests
// ***************************************************************************
#[cfg(test)]
mod tests {
    use super::RandomApi;
    use poem::http::{StatusCode, Uri};
    use poem::{Endpoint, Request, Route};
    use poem_openapi::OpenApiService;
    use serde_json::Value;

    fn app() -> impl Endpoint {
        Route::new().nest("/", OpenApiService::new(RandomApi, "test", "1.0"))
    }

    async fn get_json(uri: &'static str) -> (StatusCode, Value) {
        let resp = app().get_response(Request::builder()
            .uri(Uri::from_static(uri))
            .finish()).await;
        let status = resp.status();
        let body = resp.into_body().into_string().await.unwrap();
        (status, serde_json::from_str(&body).unwrap())
    }

    #[tokio::test]
    async fn default_form_returns_single_integer() {
        let (status, body) = get_json("/random").await;
        assert_eq!(status, StatusCode::OK);
        let value = body.as_i64().expect("expected a bare integer");
        assert!((0..=i32::MAX as i64).contains(&value));
    }

    #[tokio::test]
    async fn batch_form_returns_array_in_range() {
        let (status, body) = get_json("/random?count=10&from=10&to=100").await;
        assert_eq!(status, StatusCode::OK);
        let values = body.as_array().expect("expected an array");
        assert_eq!(values.len(), 10);
        for v in values {
            let v = v.as_i64().unwrap();
            assert!((10..=100).contains(&v));
        }
    }

    #[tokio::test]
    async fn bounded_single_draw_in_range() {
        let (status, body) = get_json("/random?from=10&to=100").await;
        assert_eq!(status, StatusCode::OK);
        let value = body.as_i64().unwrap();
        assert!((10..=100).contains(&value));
    }

    #[tokio::test]
    async fn non_integer_parameter_is_bad_request() {
        let resp = app().get_response(Request::builder()
            .uri(Uri::from_static("/random?from=notAnInt"))
            .finish()).await;
        assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn count_out_of_bounds_is_bad_request() {
        let (status, body) = get_json("/random?count=0").await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["result_code"], "400");

        let (status, _) = get_json("/random?count=1001").await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn inverted_range_is_bad_request() {
        let (status, body) = get_json("/random?from=100&to=10").await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["result_code"], "400");
    }
}
