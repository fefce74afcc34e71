//! toolhub: inspect and exercise the tool registry from the command line.
//!
//! Usage:
//!   toolhub list                          List exposed functions and collections
//!   toolhub schema                        Print the LLM tool definitions
//!   toolhub call --file calls.json        Execute a batch of tool calls
//!   toolhub parse --api x --schema y      Run the OpenAPI parser alone

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use colored::Colorize;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Duration;
use tracing::info;

use toolhub::auth::AuthContext;
use toolhub::config::{self, HubConfig};
use toolhub::http::{HttpTransport, ReqwestTransport};
use toolhub::openapi::{Parser as SchemaParser, SchemaSource};
use toolhub::types::ToolCall;
use toolhub::{Hub, Registry, RegistryFilter};

// ---------------------------------------------------------------------------
// CLI definition
// ---------------------------------------------------------------------------

#[derive(Parser, Debug)]
#[command(name = "toolhub")]
#[command(version)]
#[command(about = "Uniform callable tools over OpenAPI services, an endpoint catalog, and builtins")]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Path to toolhub.toml (defaults to ~/.toolhub/toolhub.toml).
    #[arg(long, global = true)]
    config: Option<String>,

    /// Log level (debug, info, warn, error). Overrides the config file.
    #[arg(long, global = true)]
    log_level: Option<String>,

    /// Only expose functions in these collections (comma-separated).
    #[arg(long, global = true, value_delimiter = ',')]
    collections: Vec<String>,

    /// Only expose catalog functions on these hostnames (comma-separated).
    #[arg(long, global = true, value_delimiter = ',')]
    hostnames: Vec<String>,

    /// Only expose catalog functions matching these URLs (comma-separated).
    #[arg(long, global = true, value_delimiter = ',')]
    endpoint_urls: Vec<String>,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// List exposed functions and collections.
    List,

    /// Print the tool definitions as JSON.
    Schema,

    /// Execute a batch of tool calls read from a JSON file.
    Call {
        /// JSON array of `{id, function: {name, arguments}}` objects.
        #[arg(long)]
        file: PathBuf,
    },

    /// Parse one OpenAPI document and print the generated functions.
    Parse {
        /// API identifier used as the function-name prefix.
        #[arg(long)]
        api: String,

        /// Schema path or URL (JSON or YAML).
        #[arg(long)]
        schema: String,
    },
}

impl Cli {
    /// Command-line filters replace the configured ones when any is given.
    fn filter(&self, config: &HubConfig) -> RegistryFilter {
        let flags = RegistryFilter {
            collections: self.collections.clone(),
            hostnames: self.hostnames.clone(),
            endpoint_urls: self.endpoint_urls.clone(),
        };
        if flags.is_active() {
            flags
        } else {
            RegistryFilter::from(&config.filters)
        }
    }
}

// ---------------------------------------------------------------------------
// Entry point
// ---------------------------------------------------------------------------

fn main() -> Result<()> {
    let cli = Cli::parse();

    let config_path = cli
        .config
        .as_deref()
        .map(|p| PathBuf::from(shellexpand::tilde(p).into_owned()))
        .unwrap_or_else(config::default_config_path);
    let config = config::load_config(&config_path)?;

    // Initialize logging
    let log_level = cli.log_level.clone().unwrap_or_else(|| config.log_level.clone());
    let env_filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(&log_level));
    tracing_subscriber::fmt()
        .with_env_filter(env_filter)
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();

    let transport: Arc<dyn HttpTransport> = Arc::new(
        ReqwestTransport::new(Duration::from_secs(config.http.timeout_secs))
            .context("Failed to build HTTP client")?,
    );

    match &cli.command {
        Commands::List => cmd_list(&cli, &config, transport),
        Commands::Schema => cmd_schema(&cli, &config, transport),
        Commands::Call { file } => cmd_call(&cli, &config, transport, file),
        Commands::Parse { api, schema } => cmd_parse(&config, transport, api, schema),
    }
}

// ---------------------------------------------------------------------------
// Command implementations
// ---------------------------------------------------------------------------

fn build_hub(cli: &Cli, config: &HubConfig, transport: Arc<dyn HttpTransport>) -> Result<Hub> {
    let registry = Registry::standard_with_filter(config, transport, &cli.filter(config))
        .context("Failed to load providers")?;
    info!("Loaded {} functions", registry.len());
    Ok(Hub::new(registry).with_limits(config.hub.clone()))
}

fn cmd_list(cli: &Cli, config: &HubConfig, transport: Arc<dyn HttpTransport>) -> Result<()> {
    let hub = build_hub(cli, config, transport)?;
    let registry = hub.registry();

    println!();
    println!("{}", format!("=== Functions ({}) ===", registry.len()).bold());
    for function in registry.list() {
        let spec = function.spec();
        let params: Vec<String> = spec
            .parameters
            .iter()
            .map(|p| {
                let text = format!("{}: {}", p.name, p.value_type);
                if p.required {
                    text
                } else {
                    format!("{}?", text)
                }
            })
            .collect();
        println!("  {}({})", spec.name.green(), params.join(", "));
        if let Some(description) = &spec.description {
            println!("      {}", description.dimmed());
        }
    }

    println!();
    println!("{}", "=== Collections ===".bold());
    for collection in registry.collections() {
        let listed = collection
            .function_names
            .iter()
            .filter(|n| registry.get(n).is_ok())
            .count();
        println!(
            "  {} ({} of {} listed){}",
            collection.name.cyan(),
            listed,
            collection.function_names.len(),
            collection
                .description
                .as_deref()
                .map(|d| format!(" - {}", d))
                .unwrap_or_default()
        );
    }
    println!();
    Ok(())
}

fn cmd_schema(cli: &Cli, config: &HubConfig, transport: Arc<dyn HttpTransport>) -> Result<()> {
    let hub = build_hub(cli, config, transport)?;
    let tools = hub.tools_spec()?;
    println!("{}", serde_json::to_string_pretty(&tools)?);
    Ok(())
}

fn cmd_call(cli: &Cli, config: &HubConfig, transport: Arc<dyn HttpTransport>, file: &Path) -> Result<()> {
    let text = std::fs::read_to_string(file)
        .with_context(|| format!("Failed to read calls from {}", file.display()))?;
    let calls: Vec<ToolCall> =
        serde_json::from_str(&text).with_context(|| format!("Failed to parse calls in {}", file.display()))?;

    let auth = AuthContext::from_config(config).context("Failed to load credentials")?;
    let hub = build_hub(cli, config, transport)?;
    let outcomes = hub.call_tools(&auth, &calls)?;

    let failed = outcomes.iter().filter(|o| !o.is_output()).count();
    println!("{}", serde_json::to_string_pretty(&outcomes)?);
    if failed > 0 {
        eprintln!("{} {} of {} calls failed", "!!!".red().bold(), failed, outcomes.len());
    }
    Ok(())
}

fn cmd_parse(config: &HubConfig, transport: Arc<dyn HttpTransport>, api: &str, schema: &str) -> Result<()> {
    let source = SchemaSource::parse(schema);
    let parser = SchemaParser::from_source(api, &source, transport.as_ref())
        .with_context(|| format!("Failed to load schema {}", source))?
        .with_limits(config.describe.clone());

    let specs = parser.fn_specs();
    println!();
    println!(
        "{}",
        format!("=== {} functions from {} ===", specs.len(), source).bold()
    );
    for generated in &specs {
        let spec = &generated.spec;
        println!();
        println!(
            "  {} {} {}",
            spec.name.green(),
            generated.endpoint.method.to_uppercase().yellow(),
            generated.endpoint.endpoint
        );
        if let Some(description) = &spec.description {
            println!("    {}", description.dimmed());
        }
        for p in &spec.parameters {
            println!(
                "    {} {}: {}",
                if p.required { "*" } else { "-" },
                p.name,
                p.value_type
            );
        }
        println!("    {} {}", "returns".bold(), spec.returns.description);
    }
    println!();
    Ok(())
}
