use crate::pipeline::{Envelope, PipelineError, Transform};
use time::macros::date;
use utility_model::domain::BillingRecord;

/// Pure validation of a raw `BillingRecord`.
///
/// Rules:
/// - amount must be non-negative.
/// - quantity, when present, must be non-negative.
/// - date must be within a broad sanity window [2000-01-01, 2100-01-01].
pub fn validate_billing_record(
    env: Envelope<BillingRecord>,
) -> Result<Envelope<BillingRecord>, PipelineError> {
    let b = &env.payload;

    if b.amount < 0.0 {
        return Err(PipelineError::Transform(format!(
            "{}: amount must be non-negative, got {}",
            env.origin, b.amount
        )));
    }

    if let Some(q) = b.quantity {
        if q < 0.0 {
            return Err(PipelineError::Transform(format!(
                "{}: {} must be non-negative, got {q}",
                env.origin,
                b.fuel.quantity_column()
            )));
        }
    }

    let min_date = date!(2000 - 01 - 01);
    let max_date = date!(2100 - 01 - 01);

    if b.date < min_date || b.date > max_date {
        return Err(PipelineError::Transform(format!(
            "{}: date {} out of allowed range",
            env.origin, b.date
        )));
    }

    Ok(env)
}

#[derive(Clone, Default)]
pub struct BillingRecordValidation;

#[async_trait::async_trait]
impl Transform<BillingRecord, BillingRecord> for BillingRecordValidation {
    async fn apply(
        &self,
        input: Envelope<BillingRecord>,
    ) -> Result<Envelope<BillingRecord>, PipelineError> {
        match validate_billing_record(input) {
            Ok(env) => Ok(env),
            Err(e) => {
                metrics::counter!("validation_billing_record_rejected_total").increment(1);
                Err(e)
            }
        }
    }
}
