#![forbid(unsafe_code)]

use anyhow::{Result, anyhow};
use log::{info, error, LevelFilter};
use serde::Deserialize;
use std::{env, fs, path::Path};
use toml;
use lazy_static::lazy_static;
use structopt::StructOpt;

use log4rs::append::console::ConsoleAppender;
use log4rs::config::{Appender, Root};
use log4rs::encode::pattern::PatternEncoder;

// RNG Utilities
use crate::utils::{rng_utils, errors::Errors};

use super::rng_utils::get_absolute_path;

// ***************************************************************************
//                                Constants
// ***************************************************************************
// Directory and file locations. Unless otherwise noted, all files and directories
// are relative to the root directory.
const ENV_RNG_ROOT_DIR     : &str = "RNG_ROOT_DIR";
const DEFAULT_ROOT_DIR     : &str = "~/.rng_server";
const CONFIG_DIR           : &str = "/config";
const LOGS_DIR             : &str = "/logs";
const LOG4RS_CONFIG_FILE   : &str = "/log4rs.yml";      // relative to config dir
const RNG_CONFIG_FILE      : &str = "/rng_server.toml"; // relative to config dir

// Networking.
const DEFAULT_HTTP_ADDR    : &str = "http://localhost";
const DEFAULT_HTTP_PORT    : u16  = 8080;

// Default values the binder applies when a random-generation field is
// absent from the query string.
pub const DEFAULT_COUNT    : i32 = 1;
pub const DEFAULT_FROM     : i32 = 0;
pub const DEFAULT_TO       : i32 = i32::MAX;

// Batch size limits enforced before any generation work starts.
pub const MIN_COUNT        : i32 = 1;
pub const MAX_COUNT        : i32 = 1000;

// ***************************************************************************
//                             Static Variables
// ***************************************************************************
// Assign the command line arguments BEFORE RUNTIME_CTX is initialized in main.
lazy_static! {
    pub static ref RNG_ARGS: RngArgs = init_rng_args();
}

// Calculate the data directories BEFORE RUNTIME_CTX is initialized in main.
lazy_static! {
    pub static ref RNG_DIRS: RngDirs = init_rng_dirs();
}

// ***************************************************************************
//                             Directory Structs
// ***************************************************************************
// ---------------------------------------------------------------------------
// RngDirs:
// ---------------------------------------------------------------------------
#[derive(Debug, Deserialize)]
#[allow(dead_code)]
pub struct RngDirs {
    pub root_dir: String,
    pub config_dir: String,
    pub logs_dir: String,
}

// ***************************************************************************
//                               Config Structs
// ***************************************************************************
// ---------------------------------------------------------------------------
// CommandLineArgs:
// ---------------------------------------------------------------------------
#[derive(Debug, StructOpt)]
#[structopt(name = "rng_args", about = "Command line arguments for RNG Server.")]
pub struct RngArgs {
    /// Specify the server's root data directory.
    ///
    /// This directory contains all the files the server uses during execution.
    #[structopt(short, long)]
    pub root_dir: Option<String>,

    /// Create the data directories and then exit.
    ///
    /// The data directories will be rooted at a root directory calculated
    /// using the following priority order:
    ///
    ///   1. If set, the value of the RNG_ROOT_DIR environment variable,
    ///
    ///   2. Otherwise, if set, the value of the --root-dir command line argument,
    ///
    ///   3. Otherwise, ~/.rng_server
    ///
    #[structopt(short, long)]
    pub create_dirs_only: bool,
}

// ---------------------------------------------------------------------------
// Parms:
// ---------------------------------------------------------------------------
#[derive(Debug)]
#[allow(dead_code)]
pub struct Parms {
    pub config_file: String,
    pub config: Config,
}

// ---------------------------------------------------------------------------
// RuntimeCtx:
// ---------------------------------------------------------------------------
#[derive(Debug)]
#[allow(dead_code)]
pub struct RuntimeCtx {
    pub parms: Parms,
    pub rng_args: &'static RngArgs,
    pub rng_dirs: &'static RngDirs,
}

// ---------------------------------------------------------------------------
// Config:
// ---------------------------------------------------------------------------
#[derive(Debug, Deserialize)]
#[allow(dead_code)]
pub struct Config {
    pub title: String,
    pub http_addr: String,
    pub http_port: u16,
}

impl Config {
    #[allow(dead_code)]
    pub fn new() -> Self {
        Config::default()
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            title: "RNG Server".to_string(),
            http_addr: DEFAULT_HTTP_ADDR.to_string(),
            http_port: DEFAULT_HTTP_PORT,
        }
    }
}

// ***************************************************************************
//                            Directory Functions
// ***************************************************************************
// ---------------------------------------------------------------------------
// init_rng_args:
// ---------------------------------------------------------------------------
/** Get the command line arguments. */
fn init_rng_args() -> RngArgs {
    let args = RngArgs::from_args();
    println!("{:?}", args);
    args
}

// ---------------------------------------------------------------------------
// init_rng_dirs:
// ---------------------------------------------------------------------------
/** Calculate the external data directories. */
fn init_rng_dirs() -> RngDirs {
    // Check that each path is absolute and is a directory if it exists.
    // If it doesn't exist, create it.
    let root_dir = get_root_dir();
    check_rng_dir(&root_dir, "root directory");

    let config_dir = root_dir.clone() + CONFIG_DIR;
    check_rng_dir(&config_dir, "config directory");

    let logs_dir = root_dir.clone() + LOGS_DIR;
    check_rng_dir(&logs_dir, "logs directory");

    // Package up and return the directories.
    RngDirs {
        root_dir, config_dir, logs_dir,
    }
}

// ---------------------------------------------------------------------------
// check_rng_dir:
// ---------------------------------------------------------------------------
/** Check that the path is absolute and, if it exists, that it is a directory.
 * If it doesn't exist, create it along with any missing parents.
 *
 * Any failure results in a panic.
 */
fn check_rng_dir(dir: &String, msgname: &str) {
    // Get the path object.
    let path = Path::new(dir);
    if !path.is_absolute() {
        panic!("The RNG {} path must be absolute: {}", msgname, dir);
    }
    if path.exists() {
        // Make sure the path represents a directory.
        if !path.is_dir() {
            panic!("The RNG {} path must be a directory: {}", msgname, dir);
        }
    } else {
        // Create the directory and any missing parents.
        match fs::create_dir_all(path) {
            Ok(_) => (),
            Err(e) => {
                panic!("Make directory error for {:?}: {}", path, &e.to_string());
            }
        }
    }
}

// ---------------------------------------------------------------------------
// get_root_dir:
// ---------------------------------------------------------------------------
fn get_root_dir() -> String {
    // Order of precedence:
    //  1. Environment variable
    //  2. Command line --root-dir argument
    //  3. Default location
    //
    let root_dir = env::var(ENV_RNG_ROOT_DIR).unwrap_or_else(
        |_| {
            match RNG_ARGS.root_dir.clone() {
                Some(r) => r,
                None => DEFAULT_ROOT_DIR.to_string(),
            }
        });

    // Canonicalize the path.
    get_absolute_path(&root_dir)
}

// ***************************************************************************
//                               Log Functions
// ***************************************************************************
// ---------------------------------------------------------------------------
// init_log:
// ---------------------------------------------------------------------------
/** Initialize log4rs from the configuration file when one is present,
 * otherwise fall back to a console appender at DEBUG level so a fresh
 * installation logs without any setup.
 */
pub fn init_log() {
    let logconfig = init_log_config();
    if Path::new(&logconfig).is_file() {
        match log4rs::init_file(logconfig.clone(), Default::default()) {
            Ok(_) => (),
            Err(e) => {
                println!("{}", e);
                let s = format!("{}", Errors::Log4rsInitialization(logconfig.clone()));
                panic!("{}", s);
            },
        }
        info!("Log4rs initialized using: {}", logconfig);
    } else {
        match log4rs::init_config(default_log_config()) {
            Ok(_) => (),
            Err(e) => {
                println!("{}", e);
                let s = format!("{}", Errors::Log4rsInitialization(logconfig.clone()));
                panic!("{}", s);
            },
        }
        info!("Log4rs initialized with default console configuration ({} not found).", logconfig);
    }
}

// ---------------------------------------------------------------------------
// init_log_config:
// ---------------------------------------------------------------------------
fn init_log_config() -> String {
    RNG_DIRS.config_dir.clone() + LOG4RS_CONFIG_FILE
}

// ---------------------------------------------------------------------------
// default_log_config:
// ---------------------------------------------------------------------------
fn default_log_config() -> log4rs::Config {
    let stdout = ConsoleAppender::builder()
        .encoder(Box::new(PatternEncoder::new("{d(%Y-%m-%d %H:%M:%S)} {h({l})} {t} - {m}{n}")))
        .build();
    match log4rs::Config::builder()
        .appender(Appender::builder().build("stdout", Box::new(stdout)))
        .build(Root::builder().appender("stdout").build(LevelFilter::Debug)) {
            Ok(c) => c,
            Err(e) => {
                panic!("Default log configuration error: {}", &e.to_string());
            }
        }
}

/// ***************************************************************************
//                             Parms Functions
// ***************************************************************************
// ---------------------------------------------------------------------------
// get_parms:
// ---------------------------------------------------------------------------
/** Retrieve the application parameters from the configuration file in the
 * config data directory.  If the file cannot be read, default values are
 * used.
 */
fn get_parms() -> Result<Parms> {
    // Get the config file path from its data directory.
    let config_file = RNG_DIRS.config_dir.clone() + RNG_CONFIG_FILE;

    // Read the cofiguration file.
    let config_file_abs = rng_utils::get_absolute_path(&config_file);
    info!("{}", Errors::ReadingConfigFile(config_file_abs.clone()));
    let contents = match fs::read_to_string(&config_file_abs) {
        Ok(c) => c,
        Err(_) => {
            println!("Unable to read configuration at {}. Using default values.", config_file);
            return Ok(Parms { config_file: Default::default(), config: Config::new() });
        }
    };

    // Parse the toml configuration.
    let config : Config = match toml::from_str(&contents) {
        Ok(c)  => c,
        Err(e) => {
            let msg = format!("{}\n   {}", Errors::TOMLParseError(config_file_abs), e);
            error!("{}", msg);
            return Result::Err(anyhow!(msg));
        }
    };

    Ok(Parms { config_file: config_file_abs, config })
}

// ***************************************************************************
//                             Config Functions
// ***************************************************************************
// ---------------------------------------------------------------------------
// init_runtime_context:
// ---------------------------------------------------------------------------
pub fn init_runtime_context() -> RuntimeCtx {
    // If this fails the application aborts.
    let parms = get_parms().expect("FAILED to read configuration file.");
    RuntimeCtx {parms, rng_args: &RNG_ARGS, rng_dirs: &RNG_DIRS}
}

// ***************************************************************************
//                                  Tests
// ***************************************************************************
#[cfg(test)]
mod tests {
    use crate::utils::config::Config;

    #[test]
    fn print_config() {
        println!("{:?}", Config::new());
    }

    #[test]
    fn default_bounds() {
        // The binder defaults have to satisfy the generator's own precondition.
        assert!(super::MIN_COUNT <= super::DEFAULT_COUNT);
        assert!(super::DEFAULT_COUNT <= super::MAX_COUNT);
        assert!(super::DEFAULT_FROM <= super::DEFAULT_TO);
    }
}
