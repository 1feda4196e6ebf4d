//! Jurisdiction-dependent tax rates

use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

use core_kernel::Rate;

/// Where the contract is sold
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Jurisdiction {
    /// Two-letter state or province code
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub state: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub zip: Option<String>,
}

impl Jurisdiction {
    pub fn state(state: impl Into<String>) -> Self {
        Self {
            state: Some(state.into()),
            zip: None,
        }
    }

    pub fn with_zip(mut self, zip: impl Into<String>) -> Self {
        self.zip = Some(zip.into());
        self
    }
}

/// Tax percentages by zip, then state, then a default
///
/// All values are percentages (6.5 means 6.5%).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TaxSchedule {
    pub default_percent: Decimal,
    #[serde(default)]
    pub by_state: HashMap<String, Decimal>,
    #[serde(default)]
    pub by_zip: HashMap<String, Decimal>,
}

impl Default for TaxSchedule {
    fn default() -> Self {
        Self::flat(dec!(0))
    }
}

impl TaxSchedule {
    pub fn flat(percent: Decimal) -> Self {
        Self {
            default_percent: percent,
            by_state: HashMap::new(),
            by_zip: HashMap::new(),
        }
    }

    pub fn with_state(mut self, state: impl Into<String>, percent: Decimal) -> Self {
        self.by_state.insert(state.into().to_ascii_uppercase(), percent);
        self
    }

    pub fn with_zip(mut self, zip: impl Into<String>, percent: Decimal) -> Self {
        self.by_zip.insert(zip.into(), percent);
        self
    }

    /// Resolves the tax rate for a jurisdiction
    pub fn rate_for(&self, jurisdiction: Option<&Jurisdiction>) -> Rate {
        let percent = jurisdiction
            .and_then(|j| self.zip_percent(j).or_else(|| self.state_percent(j)))
            .unwrap_or(self.default_percent);
        Rate::from_percentage(percent)
    }

    /// Lists every percentage outside 0–100
    pub fn problems(&self) -> Vec<String> {
        let mut problems = Vec::new();
        if !is_percentage(self.default_percent) {
            problems.push(format!(
                "default tax percent {} must be between 0 and 100",
                self.default_percent
            ));
        }
        for (state, percent) in &self.by_state {
            if !is_percentage(*percent) {
                problems.push(format!(
                    "tax percent {} for state {} must be between 0 and 100",
                    percent, state
                ));
            }
        }
        for (zip, percent) in &self.by_zip {
            if !is_percentage(*percent) {
                problems.push(format!(
                    "tax percent {} for zip {} must be between 0 and 100",
                    percent, zip
                ));
            }
        }
        problems
    }

    fn zip_percent(&self, jurisdiction: &Jurisdiction) -> Option<Decimal> {
        let zip = jurisdiction.zip.as_deref()?.trim();
        self.by_zip.get(zip).copied()
    }

    fn state_percent(&self, jurisdiction: &Jurisdiction) -> Option<Decimal> {
        let state = jurisdiction.state.as_deref()?.trim();
        self.by_state
            .iter()
            .find(|(code, _)| code.eq_ignore_ascii_case(state))
            .map(|(_, percent)| *percent)
    }
}

pub(crate) fn is_percentage(value: Decimal) -> bool {
    value >= dec!(0) && value <= dec!(100)
}
