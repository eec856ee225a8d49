use crate::guarantee::GuaranteeError;
use serde::{Deserialize, Serialize};
use std::fmt;

/// What triggers a claim under the guarantee.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PayoutMode {
    /// Pays only on paths where the obligor defaulted within the tenor.
    #[default]
    DefaultTriggered,
    /// Pays on positive MTM regardless of default.
    FullMtm,
}

impl fmt::Display for PayoutMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PayoutMode::DefaultTriggered => write!(f, "default_triggered"),
            PayoutMode::FullMtm => write!(f, "full_mtm"),
        }
    }
}

/// Terms of the MTM guarantee.
///
/// Thresholds are fractions of portfolio notional. Construction enforces
/// `0 <= attachment <= detachment <= 1` and keeps `coverage_pct` and
/// `limit_pct` in `[0, 1]`; the terms cannot change afterwards.
///
/// # Examples
///
/// ```
/// use mtm_guarantee::guarantee::contract::{GuaranteeContract, PayoutMode};
///
/// let contract = GuaranteeContract::new(1.0, 0.25, 0.75, 0.3, PayoutMode::DefaultTriggered).unwrap();
/// assert_eq!(contract.tranche_width(), 0.5);
///
/// assert!(GuaranteeContract::new(1.0, 0.6, 0.5, 1.0, PayoutMode::FullMtm).is_err());
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct GuaranteeContract {
    coverage_pct: f64,
    attachment: f64,
    detachment: f64,
    limit_pct: f64,
    mode: PayoutMode,
}

impl GuaranteeContract {
    pub fn new(
        coverage_pct: f64,
        attachment: f64,
        detachment: f64,
        limit_pct: f64,
        mode: PayoutMode,
    ) -> Result<Self, GuaranteeError> {
        check_unit("coverage_pct", coverage_pct)?;
        check_unit("attachment", attachment)?;
        check_unit("detachment", detachment)?;
        check_unit("limit_pct", limit_pct)?;
        if attachment > detachment {
            return Err(GuaranteeError::InvertedTranche {
                attachment,
                detachment,
            });
        }
        Ok(Self {
            coverage_pct,
            attachment,
            detachment,
            limit_pct,
            mode,
        })
    }

    // --- Accessors ---

    pub fn coverage_pct(&self) -> f64 {
        self.coverage_pct
    }

    pub fn attachment(&self) -> f64 {
        self.attachment
    }

    pub fn detachment(&self) -> f64 {
        self.detachment
    }

    pub fn limit_pct(&self) -> f64 {
        self.limit_pct
    }

    pub fn mode(&self) -> PayoutMode {
        self.mode
    }

    /// `detachment - attachment`.
    pub fn tranche_width(&self) -> f64 {
        self.detachment - self.attachment
    }

    /// Largest payout on any path for `notional`.
    pub fn max_payout(&self, notional: f64) -> f64 {
        (self.tranche_width() * notional).min(self.limit_pct * notional)
    }
}

impl Default for GuaranteeContract {
    fn default() -> Self {
        Self {
            coverage_pct: 1.0,
            attachment: 0.0,
            detachment: 1.0,
            limit_pct: 1.0,
            mode: PayoutMode::DefaultTriggered,
        }
    }
}

impl<'de> Deserialize<'de> for GuaranteeContract {
    fn deserialize<D: serde::Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        #[derive(Deserialize)]
        struct Terms {
            coverage_pct: f64,
            attachment: f64,
            detachment: f64,
            limit_pct: f64,
            #[serde(default)]
            mode: PayoutMode,
        }
        let t = Terms::deserialize(deserializer)?;
        GuaranteeContract::new(t.coverage_pct, t.attachment, t.detachment, t.limit_pct, t.mode)
            .map_err(serde::de::Error::custom)
    }
}

fn check_unit(field: &'static str, value: f64) -> Result<(), GuaranteeError> {
    if (0.0..=1.0).contains(&value) {
        Ok(())
    } else {
        Err(GuaranteeError::OutOfRange { field, value })
    }
}
