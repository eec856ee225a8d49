//! End-to-end run: market data in, loss distribution and everything sized
//! from it out.

use crate::capital::liquidity::LiquidityAnalysis;
use crate::capital::loss_dist::{exceedance_curve, var_es, ExceedanceCurve, LossStatistics};
use crate::capital::requirement::CapitalResult;
use crate::capital::sensitivity::Sensitivities;
use crate::capital::stack::{layer_amounts, CapitalStack};
use crate::capital::waterfall::{waterfall, WaterfallInputs, WaterfallResult};
use crate::capital::StatsError;
use crate::config::{ConfigError, ScenarioConfig};
use crate::core::currency::CurrencyCode;
use crate::core::market::{MarketData, MarketDataError};
use crate::core::portfolio::PortfolioWeights;
use crate::guarantee::contract::GuaranteeContract;
use crate::guarantee::payout::payout_distribution;
use crate::guarantee::GuaranteeError;
use crate::pricing::engine::MtmProxyEngine;
use crate::pricing::PricingError;
use crate::simulation::default_time::{DefaultTimeGenerator, DefaultTimeVector};
use crate::simulation::dependence::{adjust_pd_for_fx, terminal_fx_shock};
use crate::simulation::paths::{PathSimulator, PathTensor};
use crate::simulation::SimulationError;
use serde::{Deserialize, Serialize};
use std::fmt;
use thiserror::Error;

/// Any failure of a model run.
#[derive(Debug, Error)]
pub enum ModelError {
    #[error("configuration: {0}")]
    Config(#[from] ConfigError),
    #[error("market data: {0}")]
    MarketData(#[from] MarketDataError),
    #[error("simulation: {0}")]
    Simulation(#[from] SimulationError),
    #[error("pricing: {0}")]
    Pricing(#[from] PricingError),
    #[error("guarantee: {0}")]
    Guarantee(#[from] GuaranteeError),
    #[error("statistics: {0}")]
    Stats(#[from] StatsError),
}

/// Mean MTM contribution of one currency over the loss tail.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TailContribution {
    pub currency: CurrencyCode,
    pub mean_mtm: f64,
}

/// Everything a run produces.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RunResult {
    pub currencies: Vec<CurrencyCode>,
    /// Portfolio weights aligned with `currencies`.
    pub weights: Vec<f64>,
    pub assumptions: Vec<(String, String)>,
    /// Guarantee payout per path.
    pub losses: Vec<f64>,
    pub default_fraction: f64,
    pub statistics: LossStatistics,
    pub capital: CapitalResult,
    pub exceedance: ExceedanceCurve,
    pub tail_contribution: Vec<TailContribution>,
    pub liquidity: LiquidityAnalysis,
    pub waterfall: WaterfallResult,
    pub capital_stack: CapitalStack,
    pub sensitivities: Sensitivities,
}

impl RunResult {
    pub fn paths(&self) -> usize {
        self.losses.len()
    }
}

impl fmt::Display for RunResult {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "=== MTM Guarantee Run ===")?;
        writeln!(f, "Paths:              {:>18}", self.paths())?;
        writeln!(f, "Default Fraction:   {:>17.2}%", self.default_fraction * 100.0)?;
        writeln!(f)?;
        writeln!(f, "{}", self.statistics)?;
        writeln!(f, "{}", self.capital)?;
        writeln!(f, "=== Tail Contribution ===")?;
        for (tc, w) in self.tail_contribution.iter().zip(&self.weights) {
            writeln!(f, "  {:<6} {:>6.1}%  {:>18.0}", tc.currency.as_str(), w * 100.0, tc.mean_mtm)?;
        }
        writeln!(f)?;
        writeln!(f, "{}", self.liquidity)?;
        writeln!(f, "{}", self.waterfall)?;
        writeln!(f, "=== Capital Stack ===")?;
        writeln!(f, "Equity:             {:>18.0}", self.capital_stack.equity)?;
        writeln!(f, "Mezzanine:          {:>18.0}", self.capital_stack.mezz)?;
        write!(f, "Senior:             {:>18.0}", self.capital_stack.senior)
    }
}

/// The simulation-to-capital pipeline for one validated scenario.
///
/// # Examples
///
/// ```no_run
/// use mtm_guarantee::prelude::*;
///
/// # fn market() -> MarketData { unimplemented!() }
/// let model = GuaranteeModel::new(ScenarioConfig::fast())?;
/// let ccys = vec![CurrencyCode::new("KES"), CurrencyCode::new("UGX")];
/// let result = model.run(&market(), &ccys, &PortfolioWeights::equal(&ccys))?;
/// println!("{}", result);
/// # Ok::<(), ModelError>(())
/// ```
#[derive(Debug, Clone)]
pub struct GuaranteeModel {
    config: ScenarioConfig,
    contract: GuaranteeContract,
}

impl GuaranteeModel {
    /// Validate `config` and build the model.
    pub fn new(config: ScenarioConfig) -> Result<Self, ModelError> {
        config.validate()?;
        let contract = config.contract().map_err(ConfigError::from)?;
        Ok(Self { config, contract })
    }

    pub fn config(&self) -> &ScenarioConfig {
        &self.config
    }

    pub fn contract(&self) -> &GuaranteeContract {
        &self.contract
    }

    /// Run the full pipeline over `currencies`.
    pub fn run(
        &self,
        market: &MarketData,
        currencies: &[CurrencyCode],
        weights: &PortfolioWeights,
    ) -> Result<RunResult, ModelError> {
        let cfg = &self.config;
        let notional = cfg.portfolio_notional;

        let missing = market.missing_currencies(currencies);
        if let Some(first) = missing.first() {
            log::warn!("no FX quotes for {:?}", missing);
            return Err(MarketDataError::UnknownCurrency(first.clone()).into());
        }
        market.rates.validate()?;

        let returns = market.return_series(currencies)?;
        let spot = market.spot(currencies)?;
        log::debug!("{} return rows over {} currencies", returns.len(), spot.len());

        let simulator = PathSimulator::new(
            cfg.tenor_years,
            cfg.paths,
            cfg.simulation_mode,
            cfg.corr_stress,
            cfg.simulation_seed,
        );
        let paths = simulator.simulate(&returns, &spot)?;

        let aligned = weights.aligned(currencies);
        for (ccy, w) in currencies.iter().zip(&aligned) {
            if *w == 0.0 {
                log::warn!("{} has no portfolio weight and contributes nothing", ccy);
            }
        }

        let default_times = self.default_times(&paths, spot.levels(), &aligned);
        let carries = market.carries(currencies);
        for ccy in market.rates.missing_columns(currencies) {
            if ccy == CurrencyCode::usd() {
                log::warn!("no USD rate history, every carry set to 0");
            } else {
                log::warn!("no rate history for {}, carry set to 0", ccy);
            }
        }

        let engine = MtmProxyEngine::new(cfg.mtm_model, cfg.ccs_weight, notional, cfg.tenor_years as f64);
        let mtm = engine.price(&paths, &spot, &default_times, &aligned, &carries)?;

        let losses = payout_distribution(mtm.weighted(), &default_times.flags(), notional, &self.contract)?;

        let statistics = var_es(&losses, cfg.capital_confidence)?;
        let capital = CapitalResult::from_statistics(&statistics, cfg.capital_method, cfg.overlay_pct, notional);
        let exceedance = exceedance_curve(&losses, cfg.exceedance_points)?;

        let tail_mask: Vec<bool> = losses.iter().map(|&l| l >= statistics.var).collect();
        let tail_contribution = mtm
            .mean_over(&tail_mask)
            .into_iter()
            .map(|(currency, mean_mtm)| TailContribution { currency, mean_mtm })
            .collect();

        let liquidity = LiquidityAnalysis::from_path_losses(&losses, simulator.months(), cfg.liq_floor_pct, notional)
            .ok_or(StatsError::EmptySample)?;

        let waterfall = waterfall(&WaterfallInputs {
            notional,
            client_fee_bps: cfg.client_fee_bps,
            opex_bps: cfg.opex_bps,
            reserve_bps: cfg.reserve_bps,
            expected_loss: statistics.expected_loss,
            mezz_notional: notional * cfg.mezz_pct,
            mezz_coupon_rate: cfg.mezz_coupon,
            senior_limit: notional * cfg.senior_limit_pct,
            senior_fee_bps: cfg.senior_fee_bps,
            equity_capital: notional * cfg.equity_pct(),
            senior_capital_factor: cfg.senior_capital_factor,
        });
        let capital_stack = layer_amounts(notional, cfg.equity_pct(), cfg.mezz_pct);
        let sensitivities = Sensitivities::standard(
            cfg.base_margin(),
            statistics.expected_loss / notional,
            cfg.target_leverage,
        );

        log::info!(
            "run complete: {} paths, EL {:.0}, VaR {:.0}, ES {:.0}, capital {:.0}, liquidity {:.0}",
            losses.len(),
            statistics.expected_loss,
            statistics.var,
            statistics.es,
            capital.required_capital,
            liquidity.recommended
        );

        Ok(RunResult {
            currencies: currencies.to_vec(),
            weights: aligned,
            assumptions: cfg.summary(),
            default_fraction: default_times.default_fraction(),
            losses,
            statistics,
            capital,
            exceedance,
            tail_contribution,
            liquidity,
            waterfall,
            capital_stack,
            sensitivities,
        })
    }

    /// Flat-PD default times, or per-path PDs tilted by the terminal FX
    /// shock when wrong-way dependence is set.
    fn default_times(&self, paths: &PathTensor, s0: &[f64], weights: &[f64]) -> DefaultTimeVector {
        let cfg = &self.config;
        let generator = DefaultTimeGenerator::new(cfg.tenor_years as f64, cfg.paths, cfg.default_seed);
        if cfg.wrong_way_dependence == 0.0 {
            return generator.generate(cfg.pd_annual);
        }
        let pds: Vec<f64> = terminal_fx_shock(paths, s0, weights)
            .into_iter()
            .map(|shock| adjust_pd_for_fx(cfg.pd_annual, shock, cfg.wrong_way_dependence))
            .collect();
        log::debug!("wrong-way PDs drawn with dependence {}", cfg.wrong_way_dependence);
        generator.generate_with_pds(&pds)
    }
}
