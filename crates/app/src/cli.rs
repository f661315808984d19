//! Command-line arguments.

use std::path::PathBuf;

use clap::Parser;
use folio_domain::HttpMethod;

/// Send one request through the Folio API client and print the resulting
/// `{loading, error, data}` state as JSON.
#[derive(Debug, Parser)]
#[command(name = "folio", version)]
pub struct Cli {
    /// HTTP method (GET, POST, PUT, PATCH, DELETE, HEAD, OPTIONS).
    pub method: HttpMethod,

    /// Path relative to the API base address, or an absolute URL.
    pub path: String,

    /// JSON request body.
    #[arg(short, long)]
    pub data: Option<String>,

    /// Extra header as `Name: value`. May be repeated.
    #[arg(short = 'H', long = "header", value_parser = parse_header)]
    pub headers: Vec<(String, String)>,

    /// Store this bearer token before sending.
    #[arg(long, conflicts_with = "logout")]
    pub token: Option<String>,

    /// Forget the stored token before sending.
    #[arg(long)]
    pub logout: bool,

    /// Timeout for this request in milliseconds.
    #[arg(long)]
    pub timeout: Option<u64>,

    /// Settings file (defaults to `<config dir>/folio/folio.toml`).
    #[arg(long)]
    pub config: Option<PathBuf>,

    /// Base address, overriding settings.
    #[arg(long)]
    pub api_url: Option<String>,

    /// Credential file, overriding settings.
    #[arg(long)]
    pub credentials: Option<PathBuf>,
}

fn parse_header(raw: &str) -> Result<(String, String), String> {
    let (name, value) = raw
        .split_once(':')
        .ok_or_else(|| format!("expected 'Name: value', got '{raw}'"))?;
    let name = name.trim();
    if name.is_empty() {
        return Err(format!("header name is empty in '{raw}'"));
    }
    Ok((name.to_string(), value.trim().to_string()))
}
