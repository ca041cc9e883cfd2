//! `atos`: run the guidance pipeline over one request document.
//!
//! Usage: `atos [--config PATH] [--pretty] [--log-json] [REQUEST_FILE]`
//! Reads the request from stdin when no file is given. The response (or a
//! JSON error report) goes to stdout; logs go to stderr.

use std::fs;
use std::io::{self, Read};
use std::path::{Path, PathBuf};
use std::process::ExitCode;

use clap::Parser;
use tracing_subscriber::{fmt, layer::SubscriberExt, EnvFilter, Registry};

use atos_lib::config::load_config_or_default;
use atos_lib::engine::default_engine;
use atos_lib::error::{AtosError, ErrorKind, ErrorReport};
use atos_lib::types::GuidanceRequest;

#[derive(Parser)]
#[command(name = "atos", version, about = "Deterministic guidance over property records")]
struct Cli {
    /// Engine config file (default: ~/.atos/config.json when present)
    #[arg(long, value_name = "PATH")]
    config: Option<PathBuf>,
    /// Pretty-print the response
    #[arg(long)]
    pretty: bool,
    /// Write logs as JSON lines
    #[arg(long)]
    log_json: bool,
    /// Request document; stdin when omitted
    #[arg(value_name = "REQUEST_FILE")]
    request: Option<PathBuf>,
}

enum Failure {
    Io(String),
    Engine(AtosError),
}

impl From<AtosError> for Failure {
    fn from(err: AtosError) -> Self {
        Failure::Engine(err)
    }
}

impl Failure {
    fn exit_code(&self) -> u8 {
        match self {
            Failure::Io(_) => 1,
            Failure::Engine(e) => match e.kind() {
                ErrorKind::Validation => 2,
                ErrorKind::Configuration => 3,
            },
        }
    }

    fn report(&self) -> serde_json::Value {
        match self {
            Failure::Io(message) => serde_json::json!({
                "code": "io",
                "kind": "io",
                "message": message,
            }),
            Failure::Engine(e) => {
                serde_json::to_value(ErrorReport::from(e)).unwrap_or(serde_json::Value::Null)
            }
        }
    }
}

/// Install the stderr subscriber and route `log` records into it.
fn init_logging(json: bool) {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new("atos=info,atos_lib=info"));
    let fmt_layer = fmt::layer().with_target(true).with_writer(io::stderr);
    let registry = Registry::default().with(filter);
    let installed = if json {
        tracing::subscriber::set_global_default(registry.with(fmt_layer.json()))
    } else {
        tracing::subscriber::set_global_default(registry.with(fmt_layer))
    };
    if let Err(e) = installed {
        eprintln!("Logging unavailable: {}", e);
        return;
    }
    if let Err(e) = tracing_log::LogTracer::init() {
        eprintln!("Failed to bridge log records: {}", e);
    }
}

fn read_request(path: Option<&Path>) -> Result<String, Failure> {
    match path {
        Some(p) => fs::read_to_string(p)
            .map_err(|e| Failure::Io(format!("Failed to read {}: {}", p.display(), e))),
        None => {
            let mut buf = String::new();
            io::stdin()
                .read_to_string(&mut buf)
                .map_err(|e| Failure::Io(format!("Failed to read stdin: {}", e)))?;
            Ok(buf)
        }
    }
}

fn parse_request(raw: &str) -> Result<GuidanceRequest, AtosError> {
    serde_json::from_str(raw).map_err(|e| AtosError::MalformedRequest(e.to_string()))
}

fn run(cli: &Cli) -> Result<String, Failure> {
    let config = load_config_or_default(cli.config.as_deref())?;
    let raw = read_request(cli.request.as_deref())?;
    let request = parse_request(&raw)?;

    let response = default_engine(config).run(&request)?;

    let rendered = if cli.pretty {
        serde_json::to_string_pretty(&response)
    } else {
        serde_json::to_string(&response)
    };
    rendered.map_err(|e| Failure::Io(format!("Failed to write response: {}", e)))
}

fn main() -> ExitCode {
    let cli = Cli::parse();
    init_logging(cli.log_json);

    match run(&cli) {
        Ok(output) => {
            println!("{}", output);
            ExitCode::SUCCESS
        }
        Err(failure) => {
            log::error!("atos failed with exit code {}", failure.exit_code());
            println!("{}", failure.report());
            ExitCode::from(failure.exit_code())
        }
    }
}
