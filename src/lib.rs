//! # mtm-guarantee
//!
//! Monte Carlo risk and capital engine for a guarantee written against
//! mark-to-market losses on an emerging-market FX hedge book.
//!
//! Given historical FX quotes and rate differentials, the engine simulates
//! FX paths, values a proxy MTM per currency and path, draws obligor
//! default times, turns losses into tranche-limited guarantee payouts and
//! aggregates them into capital, investor-waterfall and liquidity figures.
//!
//! ## Architecture
//!
//! - **core**: Currencies, quote conventions, market data, portfolio weights
//! - **simulation**: FX path simulation, correlation stress, default times, wrong-way risk
//! - **pricing**: Phase-0 / phase-1 MTM proxies and the CCS/NDF blend
//! - **guarantee**: Contract terms and per-path payouts
//! - **capital**: Loss distribution, capital, waterfall, liquidity, sensitivities
//! - **config**: Scenario assumptions and their validation
//! - **pipeline**: The end-to-end [`pipeline::GuaranteeModel`]

pub mod capital;
pub mod config;
pub mod core;
pub mod guarantee;
pub mod pipeline;
pub mod pricing;
pub mod simulation;

/// Convenience re-exports for common usage.
pub mod prelude {
    pub use crate::capital::loss_dist::{var_es, LossStatistics};
    pub use crate::capital::requirement::CapitalMethod;
    pub use crate::config::ScenarioConfig;
    pub use crate::core::currency::{CurrencyCode, QuoteConventions};
    pub use crate::core::market::{FxQuote, MarketData, RateTable};
    pub use crate::core::portfolio::PortfolioWeights;
    pub use crate::guarantee::contract::{GuaranteeContract, PayoutMode};
    pub use crate::pipeline::{GuaranteeModel, ModelError, RunResult};
    pub use crate::pricing::mtm_proxy::MtmModel;
    pub use crate::simulation::paths::SimulationMode;
}
