//! Scenario configuration: every assumption of a run in one typed struct.

use crate::capital::requirement::CapitalMethod;
use crate::guarantee::contract::{GuaranteeContract, PayoutMode};
use crate::guarantee::GuaranteeError;
use crate::pricing::mtm_proxy::MtmModel;
use crate::simulation::paths::SimulationMode;
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Path count used by [`ScenarioConfig::fast`].
pub const FAST_PATHS: usize = 2_000;

/// Errors in a scenario configuration.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("{field} = {value} is out of range: {expected}")]
    OutOfRange {
        field: &'static str,
        value: f64,
        expected: &'static str,
    },
    #[error("invalid guarantee terms: {0}")]
    Contract(#[from] GuaranteeError),
}

/// All assumptions for one run.
///
/// Deserializes with defaults, so a JSON file may override any subset:
///
/// ```
/// use mtm_guarantee::config::ScenarioConfig;
///
/// let config: ScenarioConfig = serde_json::from_str(r#"{ "paths": 500 }"#).unwrap();
/// assert_eq!(config.paths, 500);
/// assert_eq!(config.tenor_years, 5);
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ScenarioConfig {
    pub portfolio_notional: f64,
    pub tenor_years: u32,
    pub paths: usize,
    pub simulation_mode: SimulationMode,
    /// Correlation blend: 0 independent, 1 fitted, above 1 amplified.
    pub corr_stress: f64,
    pub simulation_seed: u64,
    pub default_seed: u64,

    pub pd_annual: f64,
    /// Reported only; payouts are driven by coverage and tranche terms.
    pub lgd: f64,
    pub wrong_way_dependence: f64,

    pub mtm_model: MtmModel,
    /// Share of the CCS proxy in the CCS/NDF blend.
    pub ccs_weight: f64,

    pub coverage_pct: f64,
    pub attachment: f64,
    pub detachment: f64,
    pub limit_pct: f64,
    pub payout_mode: PayoutMode,

    pub capital_method: CapitalMethod,
    pub capital_confidence: f64,
    pub overlay_pct: f64,
    pub target_leverage: f64,

    pub client_fee_bps: f64,
    pub opex_bps: f64,
    pub reserve_bps: f64,
    pub mezz_pct: f64,
    pub mezz_coupon: f64,
    pub senior_limit_pct: f64,
    pub senior_fee_bps: f64,
    pub senior_capital_factor: f64,

    pub liq_floor_pct: f64,
    pub exceedance_points: usize,
}

impl Default for ScenarioConfig {
    fn default() -> Self {
        Self {
            portfolio_notional: 100_000_000.0,
            tenor_years: 5,
            paths: 10_000,
            simulation_mode: SimulationMode::Historical,
            corr_stress: 1.0,
            simulation_seed: 42,
            default_seed: 7,
            pd_annual: 0.04,
            lgd: 1.0,
            wrong_way_dependence: 0.0,
            mtm_model: MtmModel::Phase1,
            ccs_weight: 0.8,
            coverage_pct: 1.0,
            attachment: 0.0,
            detachment: 1.0,
            limit_pct: 1.0,
            payout_mode: PayoutMode::DefaultTriggered,
            capital_method: CapitalMethod::Es,
            capital_confidence: 0.995,
            overlay_pct: 0.2,
            target_leverage: 15.0,
            client_fee_bps: 50.0,
            opex_bps: 10.0,
            reserve_bps: 5.0,
            mezz_pct: 0.15,
            mezz_coupon: 0.08,
            senior_limit_pct: 0.6,
            senior_fee_bps: 80.0,
            senior_capital_factor: 0.2,
            liq_floor_pct: 0.02,
            exceedance_points: 100,
        }
    }
}

impl ScenarioConfig {
    /// Defaults with a reduced path count for quick runs.
    pub fn fast() -> Self {
        Self {
            paths: FAST_PATHS,
            ..Self::default()
        }
    }

    /// Check every field once.
    pub fn validate(&self) -> Result<(), ConfigError> {
        positive("portfolio_notional", self.portfolio_notional)?;
        positive("tenor_years", self.tenor_years as f64)?;
        positive("paths", self.paths as f64)?;
        non_negative("corr_stress", self.corr_stress)?;
        unit("pd_annual", self.pd_annual)?;
        unit("lgd", self.lgd)?;
        if !self.wrong_way_dependence.is_finite() {
            return Err(ConfigError::OutOfRange {
                field: "wrong_way_dependence",
                value: self.wrong_way_dependence,
                expected: "a finite number",
            });
        }
        unit("ccs_weight", self.ccs_weight)?;
        self.contract()?;
        unit("capital_confidence", self.capital_confidence)?;
        non_negative("overlay_pct", self.overlay_pct)?;
        positive("target_leverage", self.target_leverage)?;
        non_negative("client_fee_bps", self.client_fee_bps)?;
        non_negative("opex_bps", self.opex_bps)?;
        non_negative("reserve_bps", self.reserve_bps)?;
        unit("mezz_pct", self.mezz_pct)?;
        non_negative("mezz_coupon", self.mezz_coupon)?;
        unit("senior_limit_pct", self.senior_limit_pct)?;
        non_negative("senior_fee_bps", self.senior_fee_bps)?;
        non_negative("senior_capital_factor", self.senior_capital_factor)?;
        unit("liq_floor_pct", self.liq_floor_pct)?;
        if self.exceedance_points < 2 {
            return Err(ConfigError::OutOfRange {
                field: "exceedance_points",
                value: self.exceedance_points as f64,
                expected: "at least 2",
            });
        }
        Ok(())
    }

    /// Guarantee terms described by this scenario.
    pub fn contract(&self) -> Result<GuaranteeContract, GuaranteeError> {
        GuaranteeContract::new(
            self.coverage_pct,
            self.attachment,
            self.detachment,
            self.limit_pct,
            self.payout_mode,
        )
    }

    /// Equity share of notional implied by the target leverage.
    pub fn equity_pct(&self) -> f64 {
        1.0 / self.target_leverage
    }

    /// `(fee - opex - reserve)` as a fraction of notional.
    pub fn base_margin(&self) -> f64 {
        (self.client_fee_bps - self.opex_bps - self.reserve_bps) / 1e4
    }

    /// Ordered `(assumption, value)` rows for reporting.
    pub fn summary(&self) -> Vec<(String, String)> {
        let rows = [
            ("Portfolio notional", format!("{:.0}", self.portfolio_notional)),
            ("Tenor (years)", self.tenor_years.to_string()),
            ("Simulation paths", self.paths.to_string()),
            ("Simulation mode", format!("{:?}", self.simulation_mode)),
            ("Correlation stress", format!("{:.2}", self.corr_stress)),
            ("PD (annual)", pct(self.pd_annual)),
            ("LGD", pct(self.lgd)),
            ("Wrong-way dependence", format!("{:.2}", self.wrong_way_dependence)),
            ("MTM model", format!("{:?}", self.mtm_model)),
            ("CCS weight", pct(self.ccs_weight)),
            ("Coverage", pct(self.coverage_pct)),
            ("Attachment", pct(self.attachment)),
            ("Detachment", pct(self.detachment)),
            ("Limit", pct(self.limit_pct)),
            ("Payout mode", self.payout_mode.to_string()),
            ("Capital method", self.capital_method.to_string()),
            ("Capital confidence", pct(self.capital_confidence)),
            ("Capital overlay", pct(self.overlay_pct)),
            ("Target leverage", format!("{:.1}x", self.target_leverage)),
            ("Client fee (bps)", format!("{:.1}", self.client_fee_bps)),
            ("Opex (bps)", format!("{:.1}", self.opex_bps)),
            ("Reserve (bps)", format!("{:.1}", self.reserve_bps)),
            ("Mezzanine share", pct(self.mezz_pct)),
            ("Mezzanine coupon", pct(self.mezz_coupon)),
            ("Senior limit", pct(self.senior_limit_pct)),
            ("Senior fee (bps)", format!("{:.1}", self.senior_fee_bps)),
            ("Senior capital factor", pct(self.senior_capital_factor)),
            ("Liquidity floor", pct(self.liq_floor_pct)),
        ];
        rows.into_iter().map(|(k, v)| (k.to_string(), v)).collect()
    }
}

fn pct(x: f64) -> String {
    format!("{:.2}%", x * 100.0)
}

fn positive(field: &'static str, value: f64) -> Result<(), ConfigError> {
    if value.is_finite() && value > 0.0 {
        Ok(())
    } else {
        Err(ConfigError::OutOfRange {
            field,
            value,
            expected: "greater than 0",
        })
    }
}

fn non_negative(field: &'static str, value: f64) -> Result<(), ConfigError> {
    if value.is_finite() && value >= 0.0 {
        Ok(())
    } else {
        Err(ConfigError::OutOfRange {
            field,
            value,
            expected: "0 or more",
        })
    }
}

fn unit(field: &'static str, value: f64) -> Result<(), ConfigError> {
    if (0.0..=1.0).contains(&value) {
        Ok(())
    } else {
        Err(ConfigError::OutOfRange {
            field,
            value,
            expected: "within [0, 1]",
        })
    }
}
