use std::path::{Path, PathBuf};

use utility_model::domain::BillingRecord;

use crate::{
    config::AppConfig,
    error::StageError,
    extraction::{list_bills, raw_csv, BillParser, ExtractError, TextExtractor},
};

#[derive(Debug, Default)]
pub struct ExtractSummary {
    pub bills: usize,
    pub extracted: usize,
    pub appended: usize,
    pub failed: Vec<(PathBuf, String)>,
}

async fn extract_one<T, P>(
    documents: &T,
    parser: &P,
    path: &Path,
) -> Result<BillingRecord, ExtractError>
where
    T: TextExtractor + ?Sized,
    P: BillParser + ?Sized,
{
    let text = documents.extract(path).await?;
    if text.trim().is_empty() {
        return Err(ExtractError::EmptyText);
    }
    let fields = parser.parse_bill(&text).await?;
    fields.into_record()
}

/// Extract every PDF bill in the bills directory and append the results to
/// the raw electric table. A bill that fails is reported and skipped; the
/// stage fails only when every bill does.
pub async fn run<T, P>(
    cfg: &AppConfig,
    documents: &T,
    parser: &P,
) -> Result<ExtractSummary, StageError>
where
    T: TextExtractor + ?Sized,
    P: BillParser + ?Sized,
{
    let dir = &cfg.paths.bills_dir;
    if !dir.is_dir() {
        return Err(StageError::MissingInput {
            path: dir.clone(),
            producer: "PDF bills downloaded from the utility",
        });
    }
    let bills = list_bills(dir).map_err(|source| StageError::Io { path: dir.clone(), source })?;

    let mut summary = ExtractSummary { bills: bills.len(), ..ExtractSummary::default() };
    if bills.is_empty() {
        tracing::warn!(dir = %dir.display(), "no PDF bills to extract");
        return Ok(summary);
    }

    let mut records = Vec::new();
    for path in &bills {
        match extract_one(documents, parser, path).await {
            Ok(record) => {
                tracing::info!(
                    bill = %path.display(),
                    date = %record.date,
                    amount = record.amount,
                    kwh_used = ?record.quantity,
                    "extracted bill"
                );
                records.push(record);
            }
            Err(e) => {
                metrics::counter!("extraction_bills_failed_total").increment(1);
                tracing::warn!(bill = %path.display(), error = %e, "skipping bill");
                summary.failed.push((path.clone(), e.to_string()));
            }
        }
    }
    summary.extracted = records.len();

    if records.is_empty() {
        return Err(StageError::External(format!(
            "all {} bills in {} failed to extract",
            bills.len(),
            dir.display()
        )));
    }

    let raw = cfg.paths.electric_raw();
    summary.appended = raw_csv::append_electric(&raw, &records)?;
    tracing::info!(
        path = %raw.display(),
        bills = summary.bills,
        extracted = summary.extracted,
        appended = summary.appended,
        failed = summary.failed.len(),
        "bill extraction finished"
    );
    Ok(summary)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{
        extraction::{ExtractedBill, PdfText},
        stages::testutil::{config_in, write},
    };
    use std::fs;

    /// Fixture "bills" are plain text files.
    struct PlainText;

    #[async_trait::async_trait]
    impl TextExtractor for PlainText {
        async fn extract(&self, path: &Path) -> Result<String, ExtractError> {
            fs::read_to_string(path).map_err(|e| ExtractError::Document(e.to_string()))
        }
    }

    /// Reads `date;amount;kwh` from the text, or fails on `garbled`.
    struct FieldParser;

    #[async_trait::async_trait]
    impl BillParser for FieldParser {
        async fn parse_bill(&self, text: &str) -> Result<ExtractedBill, ExtractError> {
            if text.contains("garbled") {
                return Err(ExtractError::Decode("no JSON object".into()));
            }
            let mut parts = text.trim().split(';');
            Ok(ExtractedBill {
                date: parts.next().map(str::to_string),
                amount: parts.next().and_then(|s| s.parse().ok()),
                kwh_used: parts.next().and_then(|s| s.parse().ok()),
            })
        }
    }

    #[tokio::test]
    async fn failed_bills_are_skipped_and_rest_appended() {
        let dir = tempfile::tempdir().unwrap();
        let cfg = config_in(dir.path());
        write(&cfg.paths.bills_dir.join("a.pdf"), "2023-01-15;145.50;250.75");
        write(&cfg.paths.bills_dir.join("b.pdf"), "garbled");
        write(&cfg.paths.bills_dir.join("c.pdf"), "2023-02-14;;300");
        write(&cfg.paths.bills_dir.join("d.pdf"), "   ");
        write(&cfg.paths.bills_dir.join("e.pdf"), "2023-03-14;120.00;");

        let summary = run(&cfg, &PlainText, &FieldParser).await.unwrap();
        assert_eq!(summary.bills, 5);
        assert_eq!(summary.extracted, 2);
        assert_eq!(summary.appended, 2);
        let failed: Vec<_> = summary
            .failed
            .iter()
            .map(|(p, _)| p.file_name().unwrap().to_string_lossy().into_owned())
            .collect();
        assert_eq!(failed, vec!["b.pdf", "c.pdf", "d.pdf"]);

        assert_eq!(
            fs::read_to_string(cfg.paths.electric_raw()).unwrap(),
            "date,amount,kwh_used\n2023-01-15,145.50,250.75\n2023-03-14,120.00,\n"
        );

        let again = run(&cfg, &PlainText, &FieldParser).await.unwrap();
        assert_eq!(again.appended, 0);
    }

    #[tokio::test]
    async fn missing_bills_dir_fails_fast() {
        let dir = tempfile::tempdir().unwrap();
        let cfg = config_in(dir.path());
        let err = run(&cfg, &PlainText, &FieldParser).await.unwrap_err();
        assert!(matches!(err, StageError::MissingInput { .. }));
    }

    #[tokio::test]
    async fn empty_bills_dir_is_a_no_op() {
        let dir = tempfile::tempdir().unwrap();
        let cfg = config_in(dir.path());
        fs::create_dir_all(&cfg.paths.bills_dir).unwrap();

        let summary = run(&cfg, &PlainText, &FieldParser).await.unwrap();
        assert_eq!(summary.bills, 0);
        assert!(!cfg.paths.electric_raw().exists());
    }

    #[tokio::test]
    async fn every_bill_failing_is_an_external_error() {
        let dir = tempfile::tempdir().unwrap();
        let cfg = config_in(dir.path());
        write(&cfg.paths.bills_dir.join("2023-01.pdf"), "not a pdf");
        write(&cfg.paths.bills_dir.join("2023-02.pdf"), "also not a pdf");

        let err = run(&cfg, &PdfText, &FieldParser).await.unwrap_err();
        assert!(matches!(err, StageError::External(_)), "{err}");
        assert!(err.to_string().contains("all 2 bills"));
        assert!(!cfg.paths.electric_raw().exists());
    }
}
