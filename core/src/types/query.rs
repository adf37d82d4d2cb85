use serde::{Deserialize, Serialize};

use crate::country::normalize_country;

/// How the exporter operates.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum BusinessType {
    Manufacturing,
    Trading,
    #[serde(rename = "saas")]
    SaaS,
    Services,
    Handicraft,
}

impl BusinessType {
    /// True for businesses that ship physical goods.
    pub fn ships_goods(&self) -> bool {
        !matches!(self, BusinessType::SaaS | BusinessType::Services)
    }

    /// The snake_case key used in rule tables, matching the serde form.
    pub fn as_str(&self) -> &'static str {
        match self {
            BusinessType::Manufacturing => "manufacturing",
            BusinessType::Trading => "trading",
            BusinessType::SaaS => "saas",
            BusinessType::Services => "services",
            BusinessType::Handicraft => "handicraft",
        }
    }
}

/// Company size band, aligned with MSME classification.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum CompanySize {
    Micro,
    Small,
    Medium,
    Large,
}

impl CompanySize {
    /// The snake_case key used in rule tables, matching the serde form.
    pub fn as_str(&self) -> &'static str {
        match self {
            CompanySize::Micro => "micro",
            CompanySize::Small => "small",
            CompanySize::Medium => "medium",
            CompanySize::Large => "large",
        }
    }
}

/// How the buyer pays.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum PaymentMode {
    AdvancePayment,
    LetterOfCredit,
    OpenAccount,
    DocumentsAgainstPayment,
}

/// Rough unit-price band supplied by the exporter.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct PriceRange {
    pub min: f64,
    pub max: f64,
    pub currency: String,
}

/// One export query as submitted. Immutable once validated; the pipeline
/// only reads from it.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct QueryInput {
    pub product_name: String,

    /// Ingredients or bill-of-materials text, when the exporter supplied it.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub ingredients: Option<String>,

    /// Text summary produced by an upstream image-feature extractor.
    /// Treated as additional product description, never raw image data.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub image_summary: Option<String>,

    /// Destination market, ISO 3166-1 alpha-2 after normalization.
    pub destination_country: String,

    pub business_type: BusinessType,
    pub company_size: CompanySize,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub monthly_volume: Option<u32>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub price_range: Option<PriceRange>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub payment_mode: Option<PaymentMode>,
}

/// Rejection reasons for a query that cannot enter the pipeline.
#[derive(Debug, Clone, thiserror::Error, PartialEq)]
pub enum QueryValidationError {
    #[error("product_name must not be empty")]
    EmptyProductName,

    #[error("unknown destination country: {0}")]
    UnknownCountry(String),

    #[error("price range minimum {min} exceeds maximum {max}")]
    InvertedPriceRange { min: f64, max: f64 },
}

impl QueryInput {
    /// Validate and normalize the query. Returns a new value with the
    /// destination collapsed to its ISO alpha-2 code; the original is left
    /// untouched.
    pub fn validated(&self) -> Result<QueryInput, QueryValidationError> {
        if self.product_name.trim().is_empty() {
            return Err(QueryValidationError::EmptyProductName);
        }

        let iso = normalize_country(&self.destination_country)
            .ok_or_else(|| QueryValidationError::UnknownCountry(self.destination_country.clone()))?;

        if let Some(range) = &self.price_range {
            if range.min > range.max {
                return Err(QueryValidationError::InvertedPriceRange {
                    min: range.min,
                    max: range.max,
                });
            }
        }

        let mut query = self.clone();
        query.destination_country = iso.to_string();
        Ok(query)
    }

    /// The text the embedding and classification stages work from:
    /// product name plus any ingredient and image-derived detail.
    pub fn description_text(&self) -> String {
        let mut text = self.product_name.trim().to_string();
        if let Some(ingredients) = &self.ingredients {
            if !ingredients.trim().is_empty() {
                text.push_str(". Ingredients: ");
                text.push_str(ingredients.trim());
            }
        }
        if let Some(summary) = &self.image_summary {
            if !summary.trim().is_empty() {
                text.push_str(". ");
                text.push_str(summary.trim());
            }
        }
        text
    }
}
