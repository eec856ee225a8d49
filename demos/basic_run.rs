//! End-to-end guarantee run on synthetic market data.
//!
//! Shows how tranche terms change the loss distribution and the capital
//! the guarantee needs.

use mtm_guarantee::prelude::*;
use mtm_guarantee::simulation::synthetic::{generate_market, SyntheticMarketConfig};

fn main() -> Result<(), ModelError> {
    println!("╔═══════════════════════════════════════════╗");
    println!("║  mtm-guarantee: Basic Guarantee Run       ║");
    println!("╚═══════════════════════════════════════════╝\n");

    let market = generate_market(&SyntheticMarketConfig::default());
    let currencies: Vec<CurrencyCode> = ["UGX", "KES", "TZS", "VND"]
        .into_iter()
        .map(CurrencyCode::new)
        .collect();
    let weights = PortfolioWeights::normalized(vec![
        (CurrencyCode::new("UGX"), 0.3),
        (CurrencyCode::new("KES"), 0.4),
        (CurrencyCode::new("TZS"), 0.2),
        (CurrencyCode::new("VND"), 0.1),
    ]);

    // --- Scenario 1: Full cover ---
    println!("━━━ Scenario 1: Full cover, default-triggered ━━━\n");

    let base = GuaranteeModel::new(ScenarioConfig {
        pd_annual: 0.06,
        ..ScenarioConfig::fast()
    })?;
    let result = base.run(&market, &currencies, &weights)?;
    println!("{}\n", result);

    // --- Scenario 2: Mezzanine tranche ---
    println!("━━━ Scenario 2: 2% xs 1% tranche, 3% limit ━━━\n");

    let tranche = GuaranteeModel::new(ScenarioConfig {
        pd_annual: 0.06,
        attachment: 0.01,
        detachment: 0.03,
        limit_pct: 0.03,
        ..ScenarioConfig::fast()
    })?;
    let tranched = tranche.run(&market, &currencies, &weights)?;
    println!("{}", tranched.statistics);
    println!("{}", tranched.capital);

    println!(
        "Required capital: full cover {:.0}, tranche {:.0}",
        result.capital.required_capital, tranched.capital.required_capital
    );
    Ok(())
}
