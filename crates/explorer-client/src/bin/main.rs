//! OpenAPI Explorer CLI
//!
//! Loads the OpenAPI document published by a running API, lists its
//! endpoints and sends test requests against it.

use anyhow::{anyhow, bail, Context};
use clap::{Parser, Subcommand};
use std::path::PathBuf;
use tracing::debug;
use tracing_subscriber::EnvFilter;

use endpoint_parser::{sample_data, EndpointDescriptor};
use explorer_client::Explorer;
use explorer_core::SettingsManager;

/// OpenAPI Explorer - browse and test the endpoints of a live API
#[derive(Parser, Debug)]
#[command(name = "openapi-explorer")]
#[command(version)]
#[command(about = "Browse and test the endpoints described by an API's OpenAPI document")]
struct Args {
    /// Settings file (defaults to settings.json in the user config directory)
    #[arg(long, global = true, env = "OPENAPI_EXPLORER_CONFIG")]
    config: Option<PathBuf>,

    /// Document path relative to the base URL
    #[arg(long, global = true, env = "OPENAPI_EXPLORER_SPEC_PATH")]
    spec_path: Option<String>,

    /// Timeout for test requests, in seconds
    #[arg(long, global = true)]
    timeout: Option<u64>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// List the endpoints of one API, or of every API in the settings file
    List {
        base_url: Option<String>,

        /// Only show endpoints whose name or path contains this term
        #[arg(long)]
        search: Option<String>,

        /// Print descriptors as JSON
        #[arg(long)]
        json: bool,
    },

    /// Print an endpoint descriptor as JSON
    Show { base_url: String, endpoint_id: String },

    /// Print the initial request draft for an endpoint
    Draft { base_url: String, endpoint_id: String },

    /// Send a test request and print the response
    Send {
        base_url: String,
        endpoint_id: String,

        /// Path parameter as name=value
        #[arg(long = "path", value_parser = parse_key_val)]
        path_params: Vec<(String, String)>,

        /// Query parameter as name=value
        #[arg(long = "query", value_parser = parse_key_val)]
        query_params: Vec<(String, String)>,

        /// Header as name=value
        #[arg(long = "header", value_parser = parse_key_val)]
        headers: Vec<(String, String)>,

        /// Raw request body (replaces the generated sample)
        #[arg(long)]
        body: Option<String>,
    },

    /// Print a sample request body for an endpoint
    Sample { base_url: String, endpoint_id: String },
}

fn parse_key_val(s: &str) -> Result<(String, String), String> {
    let (key, value) = s
        .split_once('=')
        .ok_or_else(|| format!("expected name=value, got '{}'", s))?;
    Ok((key.to_string(), value.to_string()))
}

fn load_settings(args: &Args) -> anyhow::Result<SettingsManager> {
    let mut manager = match &args.config {
        Some(path) => SettingsManager::from_file(path.clone()),
        None => SettingsManager::from_default_location(),
    }
    .context("Failed to load settings")?;

    let settings = manager.get_mut();
    if let Some(spec_path) = &args.spec_path {
        settings.spec_path = spec_path.clone();
    }
    if let Some(timeout) = args.timeout {
        settings.request_timeout_secs = Some(timeout);
    }

    Ok(manager)
}

async fn load_endpoint(
    explorer: &Explorer,
    base_url: &str,
    endpoint_id: &str,
) -> anyhow::Result<EndpointDescriptor> {
    let (base_url, count) = explorer.add_base_url(base_url).await?;
    if count == 0 {
        bail!("No endpoints found at {}", base_url);
    }

    explorer
        .store()
        .find_by_id(&base_url, endpoint_id)
        .await
        .ok_or_else(|| anyhow!("Endpoint '{}' not found at {}", endpoint_id, base_url))
}

fn print_json<T: serde::Serialize>(value: &T) -> anyhow::Result<()> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let args = Args::parse();
    let manager = load_settings(&args)?;
    let settings_file = manager.settings_file().to_path_buf();
    let settings = manager.into_settings();

    // Logs go to stderr so JSON output stays clean
    tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(&settings.log_level)),
        )
        .init();

    debug!(
        "Using spec path {} (settings from {})",
        settings.spec_path,
        settings_file.display()
    );
    let explorer = Explorer::new(settings)?;

    match args.command {
        Command::List {
            base_url,
            search,
            json,
        } => {
            match base_url {
                Some(base_url) => {
                    explorer.add_base_url(&base_url).await?;
                }
                None => {
                    if explorer.settings().base_urls.is_empty() {
                        bail!("No base URL given and none configured");
                    }
                    for base_url in explorer.settings().base_urls.clone() {
                        explorer.store().add_base_url(&base_url).await?;
                    }
                    explorer.refresh_all().await;
                }
            }

            let endpoints = match search {
                Some(term) => explorer.store().search(&term).await,
                None => explorer.store().list_endpoints().await,
            };

            if json {
                print_json(&endpoints)?;
            } else {
                for endpoint in &endpoints {
                    let params = endpoint
                        .parameters
                        .as_ref()
                        .map_or(0, |set| set.iter().count());
                    println!(
                        "{:<8} {:<40} {:<3} {}",
                        endpoint.method.as_str(),
                        endpoint.path,
                        params,
                        endpoint.name
                    );
                }
            }
        }

        Command::Show {
            base_url,
            endpoint_id,
        } => {
            let endpoint = load_endpoint(&explorer, &base_url, &endpoint_id).await?;
            print_json(&endpoint)?;
        }

        Command::Draft {
            base_url,
            endpoint_id,
        } => {
            let endpoint = load_endpoint(&explorer, &base_url, &endpoint_id).await?;
            print_json(&explorer.new_draft(&endpoint))?;
        }

        Command::Send {
            base_url,
            endpoint_id,
            path_params,
            query_params,
            headers,
            body,
        } => {
            let endpoint = load_endpoint(&explorer, &base_url, &endpoint_id).await?;

            let mut draft = explorer.new_draft(&endpoint);
            for (name, value) in path_params {
                draft.set_path_param(name, value);
            }
            for (name, value) in query_params {
                draft.set_query_param(name, value);
            }
            for (name, value) in headers {
                draft.set_header(name, value);
            }
            if let Some(body) = body {
                draft.set_body(body);
            }

            let record = explorer.send(&endpoint, &draft).await;
            print_json(&record)?;

            if record.is_error() {
                std::process::exit(1);
            }
        }

        Command::Sample {
            base_url,
            endpoint_id,
        } => {
            let endpoint = load_endpoint(&explorer, &base_url, &endpoint_id).await?;
            let schema = endpoint
                .request_body
                .as_ref()
                .and_then(|body| body.schema.as_ref())
                .ok_or_else(|| anyhow!("Endpoint '{}' has no request body schema", endpoint_id))?;

            print_json(&sample_data(Some(schema)))?;
        }
    }

    Ok(())
}
