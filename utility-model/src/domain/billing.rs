use std::{fmt, str::FromStr};

use time::Date;

/// A billed fuel.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Fuel {
    Electricity,
    Oil,
}

impl Fuel {
    pub const ALL: [Fuel; 2] = [Fuel::Electricity, Fuel::Oil];

    pub fn as_str(self) -> &'static str {
        match self {
            Fuel::Electricity => "electricity",
            Fuel::Oil => "oil",
        }
    }

    /// Column holding the billed quantity in the raw and rate tables.
    pub fn quantity_column(self) -> &'static str {
        match self {
            Fuel::Electricity => "kwh_used",
            Fuel::Oil => "gallons",
        }
    }
}

impl fmt::Display for Fuel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A cost series: one fuel, or both combined.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum CostComponent {
    Electricity,
    Oil,
    Total,
}

impl CostComponent {
    pub const ALL: [CostComponent; 3] =
        [CostComponent::Electricity, CostComponent::Oil, CostComponent::Total];

    pub fn as_str(self) -> &'static str {
        match self {
            CostComponent::Electricity => "electricity",
            CostComponent::Oil => "oil",
            CostComponent::Total => "total",
        }
    }
}

impl From<Fuel> for CostComponent {
    fn from(fuel: Fuel) -> Self {
        match fuel {
            Fuel::Electricity => CostComponent::Electricity,
            Fuel::Oil => CostComponent::Oil,
        }
    }
}

impl fmt::Display for CostComponent {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for CostComponent {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim() {
            "electricity" => Ok(CostComponent::Electricity),
            "oil" => Ok(CostComponent::Oil),
            "total" => Ok(CostComponent::Total),
            other => Err(format!("unknown fuel '{other}'")),
        }
    }
}

/// One raw billing entry as delivered by the provider (or extracted from a
/// PDF bill).
#[derive(Debug, Clone, PartialEq)]
pub struct BillingRecord {
    pub fuel: Fuel,
    pub date: Date,
    pub amount: f64,
    /// kWh for electricity, gallons for oil.
    pub quantity: Option<f64>,
}

/// All raw entries of one fuel within one calendar month.
#[derive(Debug, Clone, PartialEq)]
pub struct MonthlyUsage {
    pub fuel: Fuel,
    pub month: Date,
    pub amount: f64,
    /// Part of `amount` billed on entries that carried a quantity.
    pub metered_amount: f64,
    /// Sum of the quantities that were present; `None` when no entry had one.
    pub quantity: Option<f64>,
    pub entries: usize,
}

impl MonthlyUsage {
    /// Cost per unit over the metered entries only, undefined when no
    /// positive quantity was billed.
    pub fn unit_rate(&self) -> Option<f64> {
        match self.quantity {
            Some(q) if q > 0.0 => Some(self.metered_amount / q),
            _ => None,
        }
    }
}

/// A row of `utility_costs.csv`.
#[derive(Debug, Clone, PartialEq)]
pub struct MonthlyCostRecord {
    pub date: Date,
    pub electricity_cost: Option<f64>,
    pub oil_cost: Option<f64>,
}

impl MonthlyCostRecord {
    pub fn cost(&self, fuel: Fuel) -> Option<f64> {
        match fuel {
            Fuel::Electricity => self.electricity_cost,
            Fuel::Oil => self.oil_cost,
        }
    }

    /// Combined cost; an absent fuel counts as nothing billed. `None` only
    /// when neither fuel was billed.
    pub fn total(&self) -> Option<f64> {
        match (self.electricity_cost, self.oil_cost) {
            (None, None) => None,
            (e, o) => Some(e.unwrap_or(0.0) + o.unwrap_or(0.0)),
        }
    }

    pub fn component(&self, component: CostComponent) -> Option<f64> {
        match component {
            CostComponent::Electricity => self.electricity_cost,
            CostComponent::Oil => self.oil_cost,
            CostComponent::Total => self.total(),
        }
    }
}

/// A row of `electric_rates.csv` / `oil_rates.csv`.
#[derive(Debug, Clone, PartialEq)]
pub struct RateRecord {
    pub date: Date,
    pub unit_rate: f64,
    pub quantity: f64,
}

impl RateRecord {
    pub fn from_usage(usage: &MonthlyUsage) -> Option<Self> {
        let unit_rate = usage.unit_rate()?;
        Some(Self {
            date: usage.month,
            unit_rate,
            quantity: usage.quantity?,
        })
    }
}
