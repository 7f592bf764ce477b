//! Request types for the demo API and their validation rules.

use lazy_static::lazy_static;
use regex::Regex;
use request_validator::{FieldError, Validatable, ValidationBuilder};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

lazy_static! {
    static ref HTML_TAG: Regex = Regex::new(r"<[^>]*>").unwrap();

    static ref SCRIPT_PATTERN: Regex = Regex::new(
        r"(?i)(javascript:|on\w+\s*=|<script|<iframe|<object|<embed)"
    ).unwrap();

    static ref MULTI_WHITESPACE: Regex = Regex::new(r"\s+").unwrap();

    /// Control characters except newline and tab
    static ref CONTROL_CHARS: Regex = Regex::new(r"[\x00-\x08\x0B\x0C\x0E-\x1F\x7F]").unwrap();
}

// ─────────────────────────────────────────────────────────────────────────────
// Constants for validation rules
// ─────────────────────────────────────────────────────────────────────────────

const NETWORKS: &[&str] = &["mainnet", "testnet", "futurenet"];
const MAX_CATEGORY_LENGTH: usize = 100;
const MAX_REVIEW_LENGTH: usize = 2000;
const MAX_VERSION_LENGTH: usize = 50;
const MAX_PAGE_SIZE: u32 = 100;

/// `/api/contracts/:id`
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ContractPath {
    pub id: Uuid,
}

impl Validatable for ContractPath {}

/// Query string of `GET /api/contracts`. Query values arrive as strings.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ListContractsQuery {
    pub network: Option<String>,
    pub category: Option<String>,
    pub page: Option<String>,
    pub limit: Option<String>,
}

impl ListContractsQuery {
    pub fn page(&self) -> u32 {
        self.page.as_deref().and_then(|p| p.parse().ok()).unwrap_or(1)
    }

    pub fn limit(&self) -> u32 {
        self.limit
            .as_deref()
            .and_then(|l| l.parse().ok())
            .unwrap_or(20)
    }
}

fn required(value: &str, field_name: &str) -> Result<(), String> {
    if value.trim().is_empty() {
        return Err(format!("{} is required", field_name));
    }
    Ok(())
}

/// Length in characters, inclusive on both ends.
fn length_between(value: &str, min: usize, max: usize) -> Result<(), String> {
    let len = value.chars().count();
    if len < min {
        return Err(format!("must be at least {} characters", min));
    }
    if len > max {
        return Err(format!("must be at most {} characters", max));
    }
    Ok(())
}

fn no_script(value: &str) -> Result<(), String> {
    if SCRIPT_PATTERN.is_match(value) {
        return Err("potentially unsafe content detected".to_string());
    }
    Ok(())
}

fn one_of(value: &str, allowed: &[&str]) -> Result<(), String> {
    if allowed.contains(&value) {
        return Ok(());
    }
    Err(format!("must be one of: {}", allowed.join(", ")))
}

/// Trims in place and turns an empty result into `None`.
fn trim_optional(value: &mut Option<String>) {
    if let Some(s) = value {
        *s = s.trim().to_string();
        if s.is_empty() {
            *value = None;
        }
    }
}

/// Free text cleanup: control characters, tags, then whitespace.
fn clean_text(value: &str) -> String {
    let stripped = HTML_TAG.replace_all(value, "");
    let stripped = CONTROL_CHARS.replace_all(&stripped, "");
    MULTI_WHITESPACE.replace_all(stripped.trim(), " ").to_string()
}

fn positive_number(value: &str, max: Option<u32>) -> Result<(), String> {
    let n = value
        .parse::<u32>()
        .map_err(|_| "must be a positive integer".to_string())?;

    if n == 0 {
        return Err("must be greater than zero".to_string());
    }
    if let Some(max) = max {
        if n > max {
            return Err(format!("must be at most {}", max));
        }
    }
    Ok(())
}

impl Validatable for ListContractsQuery {
    fn sanitize(&mut self) {
        trim_optional(&mut self.network);
        if let Some(network) = self.network.as_mut() {
            *network = network.to_ascii_lowercase();
        }
        trim_optional(&mut self.category);
        trim_optional(&mut self.page);
        trim_optional(&mut self.limit);
    }

    fn validate(&self) -> Result<(), Vec<FieldError>> {
        let mut builder = ValidationBuilder::new();

        if let Some(network) = &self.network {
            builder.check("network", || one_of(network, NETWORKS));
        }
        if let Some(category) = &self.category {
            builder.check("category", || length_between(category, 1, MAX_CATEGORY_LENGTH));
        }
        if let Some(page) = &self.page {
            builder.check("page", || positive_number(page, None));
        }
        if let Some(limit) = &self.limit {
            builder.check("limit", || positive_number(limit, Some(MAX_PAGE_SIZE)));
        }

        builder.build()
    }
}

/// Body of `POST /api/contracts/:id/reviews`
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CreateReviewRequest {
    pub version: String,
    pub rating: f32,
    pub review_text: Option<String>,
}

impl Validatable for CreateReviewRequest {
    fn sanitize(&mut self) {
        self.version = self.version.trim().to_string();
        if let Some(text) = self.review_text.as_mut() {
            *text = clean_text(text);
        }
        if self.review_text.as_deref() == Some("") {
            self.review_text = None;
        }
    }

    fn validate(&self) -> Result<(), Vec<FieldError>> {
        let mut builder = ValidationBuilder::new();

        builder
            .check("version", || required(&self.version, "version"))
            .check("version", || length_between(&self.version, 0, MAX_VERSION_LENGTH))
            .check_condition(
                !(1.0..=5.0).contains(&self.rating),
                "rating",
                "must be between 1 and 5",
            );

        if let Some(text) = &self.review_text {
            builder
                .check("review_text", || length_between(text, 0, MAX_REVIEW_LENGTH))
                .check("review_text", || no_script(text));
        }

        builder.build()
    }
}

#[derive(Debug, Serialize)]
pub struct ReviewResponse {
    pub id: Uuid,
    pub contract_id: Uuid,
    pub version: String,
    pub rating: f32,
    pub review_text: Option<String>,
}
