#![forbid(unsafe_code)]

use poem_openapi::Object;
use thiserror::Error;

/// Error enumerates the errors returned by this application.
#[derive(Error, Debug)]
pub enum Errors {
    /// Input parameter logging.
    #[error("rng_server input parameters:\n{}", .0)]
    InputParms(String),

    /// Inaccessible logger configuration file.
    #[error("Unable to access the Log4rs configuration file: {}", .0)]
    Log4rsInitialization(String),

    #[error("Reading application configuration file: {}", .0)]
    ReadingConfigFile(String),

    #[error("Unable to parse TOML file: {}", .0)]
    TOMLParseError(String),

    // ------ Request errors.  Each maps to exactly one HTTP status code:
    // ------ 400 for the four binding/validation errors, 404 for unmatched
    // ------ routes and 500 for everything unexpected.
    #[error("Invalid value for parameter '{}': {}", .0, .1)]
    InvalidParameter(String, String),

    #[error("Invalid request body: {}", .0)]
    InvalidBody(String),

    #[error("Invalid range: {}", .0)]
    InvalidRange(String),

    #[error("Invalid timestamp '{}': {}", .0, .1)]
    InvalidTimestamp(String, String),

    #[error("No route matches '{}'.", .0)]
    RouteNotFound(String),

    #[error("Internal fault: {}", .0)]
    InternalFault(String),
}

// ***************************************************************************
//                            HTTP Result Body
// ***************************************************************************
/// The JSON body returned on non-200 responses.
#[derive(Object, Debug)]
pub struct HttpResult {
    pub result_code: String,
    pub result_msg: String,
}

impl HttpResult {
    pub fn new(result_code: String, result_msg: String) -> Self {
        Self { result_code, result_msg }
    }
}
