#![forbid(unsafe_code)]

use lazy_static::lazy_static;
use log::info;
use poem::listener::TcpListener;
use poem::middleware::SetHeader;
use poem::{EndpointExt, Route};
use poem_openapi::OpenApiService;

// RNG Utilities
use crate::utils::config::{init_log, init_runtime_context, RuntimeCtx};
use crate::utils::errors::Errors;
use crate::utils::middleware::{AccessLog, StatusPages};
use crate::v1::rng::hours_diff::HoursDiffApi;
use crate::v1::rng::random::RandomApi;
use crate::v1::rng::root::RootApi;

// Modules
mod utils;
mod v1;

// ***************************************************************************
//                                Constants
// ***************************************************************************
const SERVER_NAME : &str = "RngServer"; // for poem logging

// ***************************************************************************
//                             Static Variables
// ***************************************************************************
// Lazily initialize the parameters variable so that is has a 'static lifetime.
// We exit if we can't read our parameters.
lazy_static! {
    static ref RUNTIME_CTX: RuntimeCtx = init_runtime_context();
}

// ---------------------------------------------------------------------------
// main:
// ---------------------------------------------------------------------------
#[tokio::main]
async fn main() -> Result<(), std::io::Error> {
    // --------------- Initialize RNG -----------------
    // Announce ourselves.
    println!("Starting rng_server!");

    // Initialize the server.
    rng_init();

    // --------------- Main Loop Set Up ---------------
    // Assign base URL.
    let rng_url = format!("{}:{}",
        RUNTIME_CTX.parms.config.http_addr,
        RUNTIME_CTX.parms.config.http_port);

    // Create a tuple with each of the endpoint structs.
    let endpoints = (RootApi, RandomApi, HoursDiffApi);
    let api_service =
        OpenApiService::new(endpoints, "RNG Server", "0.1.0").server(rng_url);

    // Allow the generated openapi specs to be retrieved from the server.
    let spec = api_service.spec_endpoint();
    let spec_yaml = api_service.spec_endpoint_yaml();

    // Create the routes and run the server.  Conflicting route patterns
    // panic here, before the listener ever accepts a request.
    let addr = format!("{}{}", "0.0.0.0:", RUNTIME_CTX.parms.config.http_port);
    let ui = api_service.swagger_ui();
    let app = Route::new()
        .nest("/", api_service)
        .nest("/docs", ui)
        .at("/spec", spec)
        .at("/spec_yaml", spec_yaml)
        .with(StatusPages)
        .with(SetHeader::new().appending("Server", SERVER_NAME))
        .with(AccessLog);

    // ------------------ Main Loop -------------------
    poem::Server::new(TcpListener::bind(addr))
        .name(SERVER_NAME)
        .run(app)
        .await
}

// ***************************************************************************
//                             Private Functions
// ***************************************************************************
// ---------------------------------------------------------------------------
// rng_init:
// ---------------------------------------------------------------------------
/** Initialize all subsystems and data structures other than those needed
 * to configure the main loop processor.
 */
fn rng_init() {
    // Configure our log.
    init_log();

    // Force the reading of input parameters and initialization of runtime context.
    info!("{}", Errors::InputParms(format!("{:#?}", *RUNTIME_CTX)));

    // Log build info.
    print_version_info();

    // The directories were created when the runtime context initialized.
    if RUNTIME_CTX.rng_args.create_dirs_only {
        println!("Data directories created under {}. Exiting.", RUNTIME_CTX.rng_dirs.root_dir);
        std::process::exit(0);
    }
}

// ---------------------------------------------------------------------------
// print_version_info:
// ---------------------------------------------------------------------------
fn print_version_info() {
    info!("Running rng_server version {}.",
          option_env!("CARGO_PKG_VERSION").unwrap_or("unknown"));
}
