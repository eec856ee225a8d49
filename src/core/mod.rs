//! Foundational types: currencies, market data and portfolio weights.

pub mod currency;
pub mod market;
pub mod portfolio;
