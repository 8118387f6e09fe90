//! Bill extraction: PDF text in, raw electric billing rows out.
//!
//! Reading the PDF happens locally; turning its text into fields is the job
//! of a [`BillParser`], normally the chat-completions client in [`openai`].

use serde::Deserialize;
use utility_model::domain::{month::parse_date, BillingRecord, Fuel};

pub mod documents;
pub mod openai;
pub mod raw_csv;

pub use documents::{list_bills, load_text, PdfText, TextExtractor};
pub use openai::OpenAiBillParser;

#[derive(thiserror::Error, Debug)]
pub enum ExtractError {
    #[error("environment variable {0} is not set")]
    MissingKey(String),
    #[error("failed to build HTTP client: {0}")]
    Client(String),
    #[error("unreadable PDF: {0}")]
    Document(String),
    #[error("no text could be extracted")]
    EmptyText,
    #[error("parser request failed: {0}")]
    Request(String),
    #[error("parser returned {status}: {body}")]
    Status { status: u16, body: String },
    #[error("unreadable parser response: {0}")]
    Decode(String),
    #[error("bill has no {0}")]
    Incomplete(&'static str),
}

/// Fields a parser found on one bill. Anything it could not find is `None`.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
pub struct ExtractedBill {
    pub date: Option<String>,
    pub amount: Option<f64>,
    pub kwh_used: Option<f64>,
}

impl ExtractedBill {
    /// Requires a parseable date and a non-negative amount; usage stays
    /// optional.
    pub fn into_record(self) -> Result<BillingRecord, ExtractError> {
        let raw_date = self
            .date
            .filter(|d| !d.trim().is_empty())
            .ok_or(ExtractError::Incomplete("date"))?;
        let date = parse_date(&raw_date).map_err(ExtractError::Decode)?;

        let amount = self
            .amount
            .filter(|a| a.is_finite() && *a >= 0.0)
            .ok_or(ExtractError::Incomplete("amount"))?;

        Ok(BillingRecord {
            fuel: Fuel::Electricity,
            date,
            amount,
            quantity: self.kwh_used.filter(|q| q.is_finite() && *q >= 0.0),
        })
    }
}

/// Turns the text of one bill into structured fields.
#[async_trait::async_trait]
pub trait BillParser: Send + Sync {
    async fn parse_bill(&self, text: &str) -> Result<ExtractedBill, ExtractError>;
}
