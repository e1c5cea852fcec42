use anyhow::{Context, Result};
use clap::{Parser, Subcommand, ValueEnum};
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;
use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use ff_agents::{AgentReasoner, AuxiliaryField, AuxiliaryFields, Reasoner, TemplateRegistry, UrlFinder};
use ff_providers::OpenAIProvider;
use ff_search::SearchBackendFactory;

mod config;
mod server;

use config::Config;
use server::AppState;

/// Log level for tracing output
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum LogLevel {
    /// Most verbose: every HTTP exchange and agent step
    Trace,
    /// Verbose: LLM requests, tool execution, search queries
    Debug,
    /// Standard: lookups, provider selection, results
    Info,
    /// Quiet: only warnings and errors
    Warn,
    /// Minimal: only errors
    Error,
}

impl LogLevel {
    fn as_filter(&self) -> &'static str {
        match self {
            LogLevel::Trace => "trace",
            LogLevel::Debug => "debug",
            LogLevel::Info => "info",
            LogLevel::Warn => "warn",
            LogLevel::Error => "error",
        }
    }
}

#[derive(Parser)]
#[command(name = "foundation-finder")]
#[command(author, version, about = "Find the official website of a foundation", long_about = None)]
pub struct Cli {
    /// Config file (default: ~/.config/foundation-finder/config.toml)
    #[arg(short, long, global = true)]
    pub config: Option<PathBuf>,

    /// Log level for tracing output
    #[arg(long, value_enum, default_value = "info", global = true)]
    pub log_level: LogLevel,

    /// Shorthand for --log-level debug
    #[arg(short, long, global = true)]
    pub debug: bool,

    /// Write JSON-lines logs to this file instead of stderr
    #[arg(long, global = true)]
    pub log_file: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Run the HTTP service
    Serve {
        /// Address to bind (overrides server.bind)
        #[arg(short, long)]
        bind: Option<String>,
    },
    /// Look up one foundation and print the result
    Find {
        /// Foundation or organization name
        name: String,

        /// Prompt template id (1-4)
        #[arg(short, long)]
        template: Option<u32>,

        /// Search provider: duckduckgo, serpapi, tavily, or an alias
        #[arg(short, long)]
        provider: Option<String>,

        #[arg(long)]
        ein: Option<String>,

        #[arg(long)]
        contact: Option<String>,

        #[arg(long)]
        address: Option<String>,

        #[arg(long)]
        city: Option<String>,

        /// Known text about the foundation's website
        #[arg(long)]
        website_text: Option<String>,

        /// Print the full result as JSON
        #[arg(long)]
        json: bool,
    },
    /// List prompt templates
    Templates,
    /// List search providers and whether they are configured
    Providers,
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    // --debug overrides --log-level
    let log_level = if cli.debug {
        LogLevel::Debug
    } else {
        cli.log_level
    };
    let filter = EnvFilter::new(log_level.as_filter());

    if let Some(log_path) = &cli.log_file {
        let file = std::fs::File::create(log_path)
            .with_context(|| format!("Failed to create log file: {:?}", log_path))?;
        tracing_subscriber::registry()
            .with(filter)
            .with(fmt::layer().json().with_writer(std::sync::Mutex::new(file)))
            .init();
    } else {
        // stdout is reserved for command output
        tracing_subscriber::fmt()
            .with_env_filter(filter)
            .with_writer(std::io::stderr)
            .init();
    }

    let config = Config::load(cli.config.as_deref())?;
    let factory = SearchBackendFactory::new(config.search.settings());

    match cli.command {
        Commands::Serve { bind } => {
            let bind = bind.unwrap_or_else(|| config.server.bind.clone());
            if !config.llm.is_configured() {
                tracing::warn!("OPENAI_API_KEY is not configured; lookups will fail");
            }
            let state = AppState::new(build_reasoner(&config), factory)
                .with_default_template(config.prompt_variation)
                .with_llm_configured(config.llm.is_configured());
            server::serve(state, &bind).await
        }
        Commands::Find {
            name,
            template,
            provider,
            ein,
            contact,
            address,
            city,
            website_text,
            json,
        } => {
            let reasoner = build_reasoner(&config);
            let mut finder = match provider.as_deref() {
                Some(p) => {
                    let backend = factory.create(Some(p))?;
                    UrlFinder::with_backend(reasoner, factory, backend)
                }
                None => UrlFinder::new(reasoner, factory)?,
            };
            if let Some(id) = template.or(config.prompt_variation) {
                finder.switch_template(id)?;
            }
            finder.update_auxiliary_fields(AuxiliaryFields::filter(
                [
                    (AuxiliaryField::Ein, ein),
                    (AuxiliaryField::Contact, contact),
                    (AuxiliaryField::Address, address),
                    (AuxiliaryField::City, city),
                    (AuxiliaryField::WebsiteText, website_text),
                ]
                .into_iter()
                .filter_map(|(field, value)| value.map(|v| (field, v))),
            ));

            let summary = finder.describe_configuration();
            tracing::info!(
                template = summary.template_id,
                provider = %summary.search_provider,
                fields = ?summary.foundation_data_fields,
                "Lookup configuration"
            );

            let result = finder.find(&name).await?;
            if json {
                println!("{}", serde_json::to_string_pretty(&result)?);
            } else if let Some(url) = &result.url {
                println!("{url}");
            } else {
                eprintln!("{}", result.message);
                std::process::exit(1);
            }
            Ok(())
        }
        Commands::Templates => {
            for template in TemplateRegistry::list() {
                println!("{}: {}", template.id, template.description);
            }
            Ok(())
        }
        Commands::Providers => {
            for status in factory.statuses() {
                let state = if status.configured {
                    "configured"
                } else {
                    "missing API key"
                };
                println!("{:<12} {:<20} {}", status.key, status.name, state);
            }
            let default = factory
                .create_default()
                .map(|b| b.name().to_string())
                .unwrap_or_else(|e| format!("unavailable ({e})"));
            println!("\nDefault: {default}");
            Ok(())
        }
    }
}

fn build_reasoner(config: &Config) -> Arc<dyn Reasoner> {
    let llm = &config.llm;
    let mut provider = OpenAIProvider::new(llm.api_key.clone().unwrap_or_default())
        .with_default_model(llm.model.as_str())
        .with_timeout(Duration::from_secs(llm.timeout_secs));
    if let Some(base_url) = &llm.base_url {
        provider = provider.with_base_url(base_url.as_str());
    }

    Arc::new(
        AgentReasoner::new(Arc::new(provider))
            .with_model(llm.model.as_str())
            .with_temperature(llm.temperature)
            .with_max_iterations(llm.max_iterations)
            .with_timeout(Duration::from_secs(llm.timeout_secs)),
    )
}
