//! Pure computations over the processed tables. Nothing here touches the
//! filesystem.

pub mod efficiency;
pub mod savings;
pub mod summary;

pub use efficiency::{compute_efficiency, EfficiencyOutcome};
pub use savings::monthly_savings;
pub use summary::{recent_window, yearly_summary};
