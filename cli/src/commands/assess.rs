//! # Assess Command
//!
//! Generates an export readiness report for a product and destination:
//! HS code prediction, certification requirements, risk analysis,
//! compliance roadmap, a first-week action plan, and eligible subsidies.
//!
//! ## Usage
//!
//! ```bash
//! # Assess a food product for the US market
//! exportready assess "Organic Turmeric Powder" "United States" \
//!     --business-type manufacturing --company-size micro \
//!     --ingredients "100% ground turmeric rhizome"
//!
//! # Machine-readable output
//! exportready assess "LED Desk Lamps" Germany --json
//! ```

use std::sync::Arc;

use anyhow::Result;
use clap::ValueEnum;
use colored::Colorize;

use exportready_core::types::{BusinessType, CompanySize, PaymentMode, PriceRange, QueryInput};
use exportready_engine::{BackendError, EngineError, HttpBackend, HttpBackendConfig, ReportEngine};
use exportready_rag::Retriever;
use exportready_rules::RuleEngine;

use crate::config::Config;
use crate::exit_codes::*;
use crate::output;
use crate::store;

/// Business type argument
#[derive(Debug, Clone, Copy, ValueEnum)]
pub enum BusinessTypeArg {
    Manufacturing,
    Trading,
    Saas,
    Services,
    Handicraft,
}

impl From<BusinessTypeArg> for BusinessType {
    fn from(arg: BusinessTypeArg) -> Self {
        match arg {
            BusinessTypeArg::Manufacturing => BusinessType::Manufacturing,
            BusinessTypeArg::Trading => BusinessType::Trading,
            BusinessTypeArg::Saas => BusinessType::SaaS,
            BusinessTypeArg::Services => BusinessType::Services,
            BusinessTypeArg::Handicraft => BusinessType::Handicraft,
        }
    }
}

/// Company size argument, aligned with MSME bands
#[derive(Debug, Clone, Copy, ValueEnum)]
pub enum CompanySizeArg {
    Micro,
    Small,
    Medium,
    Large,
}

impl From<CompanySizeArg> for CompanySize {
    fn from(arg: CompanySizeArg) -> Self {
        match arg {
            CompanySizeArg::Micro => CompanySize::Micro,
            CompanySizeArg::Small => CompanySize::Small,
            CompanySizeArg::Medium => CompanySize::Medium,
            CompanySizeArg::Large => CompanySize::Large,
        }
    }
}

/// Payment mode argument
#[derive(Debug, Clone, Copy, ValueEnum)]
pub enum PaymentModeArg {
    AdvancePayment,
    LetterOfCredit,
    OpenAccount,
    DocumentsAgainstPayment,
}

impl From<PaymentModeArg> for PaymentMode {
    fn from(arg: PaymentModeArg) -> Self {
        match arg {
            PaymentModeArg::AdvancePayment => PaymentMode::AdvancePayment,
            PaymentModeArg::LetterOfCredit => PaymentMode::LetterOfCredit,
            PaymentModeArg::OpenAccount => PaymentMode::OpenAccount,
            PaymentModeArg::DocumentsAgainstPayment => PaymentMode::DocumentsAgainstPayment,
        }
    }
}

/// Arguments for the assess command
#[derive(Debug)]
pub struct AssessArgs {
    /// Product name
    pub product: String,
    /// Destination country (name or ISO code)
    pub destination: String,
    /// How the exporter operates
    pub business_type: BusinessTypeArg,
    /// Company size band
    pub company_size: CompanySizeArg,
    /// Ingredients or bill-of-materials text
    pub ingredients: Option<String>,
    /// Text summary from an upstream image-feature extractor
    pub image_summary: Option<String>,
    /// Expected monthly volume in units
    pub monthly_volume: Option<u32>,
    /// How the buyer pays
    pub payment: Option<PaymentModeArg>,
    /// Unit price band, lower bound
    pub price_min: Option<f64>,
    /// Unit price band, upper bound
    pub price_max: Option<f64>,
    /// Currency of the price band
    pub price_currency: String,
    /// Output JSON instead of formatted text
    pub json: bool,
    /// Verbose output
    pub verbose: bool,
}

/// Execute the assess command
///
/// # Returns
///
/// * `Ok(EXIT_SUCCESS)` - Clean report printed
/// * `Ok(EXIT_DEGRADED)` - Report printed, but one or more stages degraded
/// * `Ok(EXIT_INVALID_INPUT)` - Query rejected by validation
/// * `Ok(EXIT_CONFIG_ERROR)` - Backend or embedding provider misconfigured
pub async fn execute(args: AssessArgs) -> Result<i32> {
    let config = Config::load()?;

    let price_range = match (args.price_min, args.price_max) {
        (Some(min), Some(max)) => Some(PriceRange {
            min,
            max,
            currency: args.price_currency.clone(),
        }),
        (None, None) => None,
        _ => {
            eprintln!(
                "{} --price-min and --price-max must be given together.",
                "Error:".red().bold()
            );
            return Ok(EXIT_INVALID_INPUT);
        }
    };

    let query = QueryInput {
        product_name: args.product.clone(),
        ingredients: args.ingredients.clone(),
        image_summary: args.image_summary.clone(),
        destination_country: args.destination.clone(),
        business_type: args.business_type.into(),
        company_size: args.company_size.into(),
        monthly_volume: args.monthly_volume,
        price_range,
        payment_mode: args.payment.map(Into::into),
    };
    log::debug!("assess query: {query:?}");

    // Knowledge index
    let provider = match store::embedding_provider(&config) {
        Ok(provider) => provider,
        Err(e) => {
            eprintln!("{} {:#}", "Error:".red().bold(), e);
            return Ok(EXIT_CONFIG_ERROR);
        }
    };
    let chunk_store = store::open_chunk_store(&config, provider.as_ref()).await?;
    let seeded = store::ensure_seeded(&chunk_store, provider.as_ref()).await?;
    if seeded > 0 {
        eprintln!(
            "{} Seeded the knowledge index with {} built-in chunks.",
            "→".cyan(),
            seeded
        );
    }
    let retriever = Retriever::new(chunk_store, Arc::clone(&provider));

    // Generative backend
    let backend_config = config.backend_or_default();
    if args.verbose {
        eprintln!(
            "{} Backend: {} ({} at {})",
            "→".cyan(),
            backend_config.provider,
            backend_config.model,
            backend_config.endpoint
        );
    }
    let backend = match HttpBackend::new(HttpBackendConfig {
        provider: backend_config.provider.clone(),
        endpoint: backend_config.endpoint.clone(),
        model: backend_config.model.clone(),
        api_key: backend_config.get_api_key(),
    }) {
        Ok(backend) => backend,
        Err(e) => {
            eprintln!("{} {}", "Error:".red().bold(), e);
            eprintln!(
                "  {} Configure a backend with `exportready config backend`.",
                "→".cyan()
            );
            return Ok(EXIT_CONFIG_ERROR);
        }
    };

    let engine = ReportEngine::new(
        RuleEngine::with_builtin_table(),
        Arc::new(retriever),
        Arc::new(backend),
    );

    eprintln!(
        "{} Assessing {} for export to {}...",
        "→".cyan(),
        args.product,
        args.destination
    );
    let report = match engine.generate(&query).await {
        Ok(report) => report,
        Err(e) => {
            eprintln!("{} {}", "Error:".red().bold(), e);
            return Ok(exit_code_for(&e));
        }
    };

    if args.json {
        println!("{}", output::render_json(&report)?);
    } else {
        output::print_report(&report);
    }

    if report.is_degraded() {
        if args.json {
            eprintln!(
                "{} Report degraded; see the degradations field.",
                "⚠".yellow().bold()
            );
        }
        return Ok(EXIT_DEGRADED);
    }
    Ok(EXIT_SUCCESS)
}

/// Map a pipeline failure to the exit code scripts key on.
fn exit_code_for(error: &EngineError) -> i32 {
    match error {
        EngineError::Input(_) => EXIT_INVALID_INPUT,
        EngineError::Retrieval(_) => EXIT_NETWORK_ERROR,
        EngineError::ModelInference(BackendError::MissingApiKey { .. }) => EXIT_CONFIG_ERROR,
        EngineError::ModelInference(BackendError::UnsupportedProvider(_)) => EXIT_CONFIG_ERROR,
        EngineError::ModelInference(_) => EXIT_NETWORK_ERROR,
        EngineError::Rules(_) => EXIT_CONFIG_ERROR,
        EngineError::InconsistentData(_) => EXIT_ERROR,
    }
}
