//! # ExportReady CLI
//!
//! ExportReady: export compliance answers for Indian SMEs
//!
//! ExportReady turns a product description and a destination country into
//! a full readiness report: HS code, certifications, risks, costs, and a
//! step-by-step compliance roadmap.
//!
//! You know your product. ExportReady knows the paperwork.
//!
//! ## Usage
//!
//! ```bash
//! # Assess a product
//! exportready assess "Organic Turmeric Powder" "United States"
//!
//! # Load regulation snippets into the knowledge index
//! exportready ingest --seed
//!
//! ```

use clap::{Parser, Subcommand};
use exportready::commands;
use exportready::commands::assess::{BusinessTypeArg, CompanySizeArg, PaymentModeArg};

/// Initialize logger based on verbose flag
fn init_logger(verbose: bool) {
    let mut log_builder = env_logger::Builder::from_default_env();
    if verbose {
        log_builder.filter_level(log::LevelFilter::Debug);
    } else {
        log_builder.filter_level(log::LevelFilter::Info);
    }
    log_builder.init();
}

/// Main CLI structure
#[derive(Parser)]
#[command(name = "exportready")]
#[command(about = "ExportReady: export compliance answers for Indian SMEs", long_about = None)]
#[command(version)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

/// Available CLI commands
#[derive(Subcommand)]
enum Commands {
    /// Generate an export readiness report for a product and destination
    Assess {
        /// Product name or short description
        #[arg(value_name = "PRODUCT")]
        product: String,
        /// Destination country, by name or ISO code (e.g., "Germany" or DE)
        #[arg(value_name = "DESTINATION")]
        destination: String,
        /// How the exporter operates
        #[arg(long, short = 'b', value_enum, default_value = "manufacturing")]
        business_type: BusinessTypeArg,
        /// Company size band (MSME classification)
        #[arg(long, short = 's', value_enum, default_value = "micro")]
        company_size: CompanySizeArg,
        /// Ingredients or bill-of-materials text
        #[arg(long, value_name = "TEXT")]
        ingredients: Option<String>,
        /// Text summary of product images (from an upstream extractor)
        #[arg(long, value_name = "TEXT")]
        image_summary: Option<String>,
        /// Expected monthly volume in units
        #[arg(long, value_name = "UNITS")]
        monthly_volume: Option<u32>,
        /// How the buyer pays
        #[arg(long, value_enum, value_name = "MODE")]
        payment: Option<PaymentModeArg>,
        /// Unit price band, lower bound
        #[arg(long, value_name = "AMOUNT")]
        price_min: Option<f64>,
        /// Unit price band, upper bound
        #[arg(long, value_name = "AMOUNT")]
        price_max: Option<f64>,
        /// Currency of the price band
        #[arg(long, value_name = "CODE", default_value = "USD")]
        price_currency: String,
        /// Output as JSON
        #[arg(long)]
        json: bool,
        /// Enable verbose output
        #[arg(long, short = 'v')]
        verbose: bool,
    },
    /// Manage CLI configuration
    Config {
        #[command(subcommand)]
        command: ConfigCommands,
    },
    /// Load regulation snippets into the knowledge index
    Ingest {
        /// TOML corpus file to ingest
        #[arg(value_name = "FILE")]
        path: Option<std::path::PathBuf>,
        /// Ingest the built-in seed corpus
        #[arg(long)]
        seed: bool,
        /// Enable verbose output
        #[arg(long, short = 'v')]
        verbose: bool,
    },
}

/// Config subcommands
#[derive(Subcommand)]
enum ConfigCommands {
    /// Show current configuration
    Show {
        /// Show full secrets instead of masked values
        #[arg(long)]
        show_secrets: bool,
    },
    /// Manage the generative backend used for report sections
    Backend {
        #[command(subcommand)]
        command: BackendCommands,
    },
}

/// Backend subcommands
#[derive(Subcommand)]
enum BackendCommands {
    /// Configure OpenAI as backend provider
    Openai {
        /// Model name (e.g., gpt-4o-mini, gpt-4o)
        #[arg(long, short = 'm', default_value = "gpt-4o-mini")]
        model: String,
        /// API key (optional, prefers OPENAI_API_KEY env var)
        #[arg(long, short = 'k')]
        api_key: Option<String>,
    },
    /// Configure Anthropic as backend provider
    Anthropic {
        /// Model name (e.g., claude-sonnet-4-5, claude-opus-4-1)
        #[arg(long, short = 'm', default_value = "claude-sonnet-4-5")]
        model: String,
        /// API key (optional, prefers ANTHROPIC_API_KEY env var)
        #[arg(long, short = 'k')]
        api_key: Option<String>,
    },
    /// Configure local Ollama as backend provider
    Ollama {
        /// Ollama API endpoint
        #[arg(long, short = 'e', default_value = "http://localhost:11434")]
        endpoint: String,
        /// Model name (e.g., llama3.1, mistral)
        #[arg(long, short = 'm', default_value = "llama3.1")]
        model: String,
    },
    /// Configure custom OpenAI-compatible endpoint
    Custom {
        /// API endpoint URL
        #[arg(long, short = 'e')]
        endpoint: String,
        /// Model name
        #[arg(long, short = 'm')]
        model: String,
        /// API key (optional)
        #[arg(long, short = 'k')]
        api_key: Option<String>,
    },
    /// Show current backend configuration
    Show {
        /// Show full secrets instead of masked values
        #[arg(long)]
        show_secrets: bool,
    },
    /// Remove backend configuration
    Remove,
}

#[tokio::main]
async fn main() {
    let cli = Cli::parse();
    let exit_code = run_command(cli.command).await;
    std::process::exit(exit_code);
}

async fn run_command(command: Commands) -> i32 {
    use exportready::exit_codes::*;

    match command {
        Commands::Assess {
            product,
            destination,
            business_type,
            company_size,
            ingredients,
            image_summary,
            monthly_volume,
            payment,
            price_min,
            price_max,
            price_currency,
            json,
            verbose,
        } => {
            let args = commands::assess::AssessArgs {
                product,
                destination,
                business_type,
                company_size,
                ingredients,
                image_summary,
                monthly_volume,
                payment,
                price_min,
                price_max,
                price_currency,
                json,
                verbose,
            };
            init_logger(verbose);
            match commands::assess::execute(args).await {
                Ok(exit_code) => exit_code,
                Err(e) => {
                    eprintln!("Assess error: {}", e);
                    EXIT_ERROR
                }
            }
        }
        Commands::Config { command } => run_config_command(command),
        Commands::Ingest {
            path,
            seed,
            verbose,
        } => {
            let args = commands::ingest::IngestArgs {
                path,
                seed,
                verbose,
            };
            init_logger(verbose);
            match commands::ingest::execute(args).await {
                Ok(exit_code) => exit_code,
                Err(e) => {
                    eprintln!("Ingest error: {}", e);
                    EXIT_ERROR
                }
            }
        }
    }
}

fn run_config_command(command: ConfigCommands) -> i32 {
    use exportready::exit_codes::*;

    match command {
        ConfigCommands::Show { show_secrets } => {
            let args = commands::config::ConfigShowArgs { show_secrets };
            match commands::config::execute_show(args) {
                Ok(exit_code) => exit_code,
                Err(e) => {
                    eprintln!("Config error: {}", e);
                    EXIT_CONFIG_ERROR
                }
            }
        }
        ConfigCommands::Backend { command } => run_backend_command(command),
    }
}

fn run_backend_command(command: BackendCommands) -> i32 {
    use commands::config::{BackendProvider, ConfigBackendArgs};
    use exportready::exit_codes::*;

    let args = match command {
        BackendCommands::Openai { model, api_key } => {
            ConfigBackendArgs::Set(BackendProvider::OpenAi { model, api_key })
        }
        BackendCommands::Anthropic { model, api_key } => {
            ConfigBackendArgs::Set(BackendProvider::Anthropic { model, api_key })
        }
        BackendCommands::Ollama { endpoint, model } => {
            ConfigBackendArgs::Set(BackendProvider::Ollama { endpoint, model })
        }
        BackendCommands::Custom {
            endpoint,
            model,
            api_key,
        } => ConfigBackendArgs::Set(BackendProvider::Custom {
            endpoint,
            model,
            api_key,
        }),
        BackendCommands::Show { show_secrets } => ConfigBackendArgs::Show { show_secrets },
        BackendCommands::Remove => ConfigBackendArgs::Remove,
    };

    match commands::config::execute_backend(args) {
        Ok(exit_code) => exit_code,
        Err(e) => {
            eprintln!("Config backend error: {}", e);
            EXIT_CONFIG_ERROR
        }
    }
}
