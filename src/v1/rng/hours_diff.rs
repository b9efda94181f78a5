#![forbid(unsafe_code)]

use poem::Request;
use poem_openapi::{ OpenApi, param::Path, payload::{Json, PlainText}, Object, ApiResponse };
use anyhow::Result;
use log::error;

use crate::utils::errors::HttpResult;
use crate::utils::rng_utils::{self, RequestDebug};
use crate::utils::timestamps::{hours_between, Timestamp};

// ***************************************************************************
//                          Request/Response Definiions
// ***************************************************************************
pub struct HoursDiffApi;

#[derive(Object)]
#[oai(rename_all = "camelCase")]
struct ReqHoursDiff
{
    from: Timestamp,
    to: Timestamp,
}

#[derive(Object, Debug)]
#[oai(rename_all = "camelCase")]
pub struct RespHoursDiff
{
    from: Timestamp,
    to: Timestamp,
    hours_between: i64,
}

// Implement the debug record trait for logging.
impl RequestDebug for ReqHoursDiff {
    type Req = ReqHoursDiff;
    fn get_request_info(&self) -> String {
        let mut s = String::with_capacity(255);
        s.push_str("  Request body:");
        s.push_str("\n    from: ");
        s.push_str(&self.from.encode());
        s.push_str("\n    to: ");
        s.push_str(&self.to.encode());
        s
    }
}

// ------------------- HTTP Status Codes -------------------
#[derive(Debug, ApiResponse)]
enum RngResponse {
    #[oai(status = 200)]
    Http200(Json<RespHoursDiff>),
    #[oai(status = 500)]
    Http500(Json<HttpResult>),
}

fn make_http_200(resp: RespHoursDiff) -> RngResponse {
    RngResponse::Http200(Json(resp))
}
fn make_http_500(msg: String) -> RngResponse {
    RngResponse::Http500(Json(HttpResult::new(500.to_string(), msg)))
}

// ***************************************************************************
//                             OpenAPI Endpoint
// ***************************************************************************
#[OpenApi]
impl HoursDiffApi {
    #[oai(path = "/hoursDiff", method = "get")]
    async fn get_hours_diff(&self, http_req: &Request, body: Json<ReqHoursDiff>) -> RngResponse {
        match RespHoursDiff::process(http_req, &body.0) {
            Ok(r) => r,
            Err(e) => {
                // Log the fault, keep the response body opaque.
                error!("ERROR: {}", e);
                make_http_500("Internal server error.".to_string())
            }
        }
    }

    /** The path-segment form.  The end of the interval is the current time
     * and the response is the bare hour count as text.
     */
    #[oai(path = "/hoursDiff/:from", method = "get")]
    async fn get_hours_diff_from(&self, from: Path<Timestamp>) -> PlainText<String> {
        let hours = hours_between(&from.0, &Timestamp::now());
        PlainText(hours.to_string())
    }
}

// ***************************************************************************
//                          Request/Response Methods
// ***************************************************************************
impl RespHoursDiff {
    /// Create a new response.
    fn new(from: Timestamp, to: Timestamp, hours_between: i64) -> Self {
        Self {from, to, hours_between}
    }

    /// Process the request.
    fn process(http_req: &Request, req: &ReqHoursDiff) -> Result<RngResponse, anyhow::Error> {
        // Conditional logging depending on log level.
        rng_utils::debug_request(http_req, req);

        let hours = hours_between(&req.from, &req.to);
        Ok(make_http_200(Self::new(req.from, req.to, hours)))
    }
}
