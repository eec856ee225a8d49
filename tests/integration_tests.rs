use approx::assert_relative_eq;
use chrono::NaiveDate;
use mtm_guarantee::capital::requirement::CapitalMethod;
use mtm_guarantee::config::ScenarioConfig;
use mtm_guarantee::core::currency::{CurrencyCode, QuoteConventions};
use mtm_guarantee::core::market::{FxQuote, MarketData, MarketDataError, RateTable};
use mtm_guarantee::core::portfolio::PortfolioWeights;
use mtm_guarantee::guarantee::contract::PayoutMode;
use mtm_guarantee::pipeline::{GuaranteeModel, ModelError, RunResult};
use mtm_guarantee::pricing::mtm_proxy::MtmModel;
use mtm_guarantee::simulation::default_time::DefaultTimeGenerator;
use mtm_guarantee::simulation::dependence::adjust_pd_for_fx;
use mtm_guarantee::simulation::paths::SimulationMode;
use mtm_guarantee::simulation::synthetic::{generate_market, SyntheticMarketConfig};

fn ccys(codes: &[&str]) -> Vec<CurrencyCode> {
    codes.iter().map(|c| CurrencyCode::new(*c)).collect()
}

fn small_config() -> ScenarioConfig {
    ScenarioConfig {
        paths: 400,
        tenor_years: 3,
        ..ScenarioConfig::default()
    }
}

/// Direct-quoted market where each currency moves by a fixed monthly
/// log-return, so every bootstrapped path is the same.
fn trending(moves: &[(&str, f64)]) -> MarketData {
    let d = |m| NaiveDate::from_ymd_opt(2024, m, 28).unwrap();
    let quotes = (1..=3)
        .flat_map(|m| {
            moves
                .iter()
                .map(move |(ccy, r)| FxQuote::new(d(m), *ccy, (r * m as f64).exp()))
        })
        .collect();
    MarketData {
        quotes,
        conventions: QuoteConventions::new(),
        rates: RateTable::new(Vec::new()),
    }
}

fn synthetic() -> MarketData {
    generate_market(&SyntheticMarketConfig {
        months: 96,
        seed: 11,
        ..Default::default()
    })
}

/// Full pipeline: synthetic market → paths → MTM → payouts → capital,
/// liquidity, waterfall.
#[test]
fn full_pipeline_east_africa_book() {
    let market = synthetic();
    let currencies = ccys(&["KES", "UGX", "TZS"]);
    let weights = PortfolioWeights::normalized(vec![
        (CurrencyCode::new("KES"), 2.0),
        (CurrencyCode::new("UGX"), 1.0),
        (CurrencyCode::new("TZS"), 1.0),
    ]);
    let config = ScenarioConfig {
        pd_annual: 0.2,
        ..small_config()
    };
    let notional = config.portfolio_notional;
    let model = GuaranteeModel::new(config).unwrap();

    let result = model.run(&market, &currencies, &weights).unwrap();

    assert_eq!(result.paths(), 400);
    assert_eq!(result.weights, vec![0.5, 0.25, 0.25]);
    assert!(result.losses.iter().all(|&l| (0.0..=notional).contains(&l)));
    assert!(result.default_fraction > 0.0 && result.default_fraction < 1.0);

    // capital
    let stats = &result.statistics;
    assert!(stats.expected_loss <= stats.var.max(stats.es));
    assert!(stats.es >= stats.var);
    assert_eq!(result.capital.method, CapitalMethod::Es);
    assert_relative_eq!(result.capital.required_capital, stats.es * 1.2, max_relative = 1e-12);

    // exceedance curve starts at 0 and ends at the worst loss
    assert_eq!(result.exceedance.len(), 100);
    assert_eq!(result.exceedance.levels[0], 0.0);
    assert_eq!(result.exceedance.probabilities[99], 0.0);

    // tail contribution is per currency
    assert_eq!(result.tail_contribution.len(), 3);
    assert_eq!(result.tail_contribution[0].currency, CurrencyCode::new("KES"));

    // liquidity
    let liq = &result.liquidity;
    assert!(liq.recommended >= 0.02 * notional);
    assert!(liq.recommended >= liq.one_month_99);
    assert_relative_eq!(liq.expected_monthly * 36.0, stats.expected_loss, max_relative = 1e-9);

    // waterfall
    let wf = &result.waterfall;
    assert_relative_eq!(
        wf.equity_residual,
        wf.net_available - wf.mezz_coupon - wf.senior_fee,
        epsilon = 1e-6
    );
    assert_relative_eq!(wf.premium, notional * 50.0 / 1e4);

    // capital stack
    assert_relative_eq!(result.capital_stack.equity, notional / 15.0, max_relative = 1e-12);
    assert_relative_eq!(result.capital_stack.mezz, notional * 0.15, max_relative = 1e-12);

    assert_eq!(result.sensitivities.leverage_curve.leverage.len(), 40);
    assert!(!result.assumptions.is_empty());

    let text = result.to_string();
    assert!(text.contains("=== Loss Distribution"));
    assert!(text.contains("=== Premium Waterfall ==="));
}

#[test]
fn run_is_deterministic() {
    let market = synthetic();
    let currencies = ccys(&["KES", "VND"]);
    let weights = PortfolioWeights::equal(&currencies);
    let model = GuaranteeModel::new(ScenarioConfig {
        pd_annual: 0.1,
        ..small_config()
    })
    .unwrap();

    let a = model.run(&market, &currencies, &weights).unwrap();
    let b = model.run(&market, &currencies, &weights).unwrap();
    assert_eq!(a.losses, b.losses);
    assert_eq!(a.statistics, b.statistics);
}

#[test]
fn full_mtm_never_pays_less_than_default_triggered() {
    let market = synthetic();
    let currencies = ccys(&["IDR", "LKR"]);
    let weights = PortfolioWeights::equal(&currencies);

    let triggered = GuaranteeModel::new(small_config())
        .unwrap()
        .run(&market, &currencies, &weights)
        .unwrap();
    let full = GuaranteeModel::new(ScenarioConfig {
        payout_mode: PayoutMode::FullMtm,
        ..small_config()
    })
    .unwrap()
    .run(&market, &currencies, &weights)
    .unwrap();

    for (t, f) in triggered.losses.iter().zip(&full.losses) {
        assert!(f >= t);
    }
}

#[test]
fn zero_pd_gives_zero_losses_and_unbounded_leverage() {
    let market = synthetic();
    let currencies = ccys(&["BWP"]);
    let model = GuaranteeModel::new(ScenarioConfig {
        pd_annual: 0.0,
        ..small_config()
    })
    .unwrap();

    let result = model
        .run(&market, &currencies, &PortfolioWeights::equal(&currencies))
        .unwrap();

    assert_eq!(result.default_fraction, 0.0);
    assert_eq!(result.statistics.expected_loss, 0.0);
    assert_eq!(result.capital.required_capital, 0.0);
    assert!(result.capital.max_leverage.is_infinite());

    let json = serde_json::to_value(&result).unwrap();
    assert!(json["capital"]["max_leverage"].is_null());

    let back: RunResult = serde_json::from_str(&serde_json::to_string(&result).unwrap()).unwrap();
    assert!(back.capital.max_leverage.is_infinite());
    assert_eq!(back.losses, result.losses);
    assert_eq!(back.statistics, result.statistics);
}

#[test]
fn parametric_mode_with_wrong_way_risk() {
    let market = synthetic();
    let currencies = ccys(&["UGX", "TZS", "KES", "BDT"]);
    let model = GuaranteeModel::new(ScenarioConfig {
        simulation_mode: SimulationMode::Parametric,
        corr_stress: 1.2,
        wrong_way_dependence: 2.0,
        mtm_model: MtmModel::Phase0,
        capital_method: CapitalMethod::Var,
        ..small_config()
    })
    .unwrap();

    let result = model
        .run(&market, &currencies, &PortfolioWeights::equal(&currencies))
        .unwrap();

    assert_eq!(result.paths(), 400);
    assert!((0.0..=1.0).contains(&result.default_fraction));
    assert_relative_eq!(
        result.capital.required_capital,
        result.statistics.var * 1.2,
        max_relative = 1e-12
    );
}

/// KES loses 1% a month, so every path ends 36 months later with a
/// terminal depreciation of 0.36 and one common adjusted PD.
#[test]
fn wrong_way_dependence_moves_default_fraction() {
    let market = trending(&[("KES", -0.01)]);
    let kes = ccys(&["KES"]);
    let base = ScenarioConfig {
        paths: 2000,
        tenor_years: 3,
        pd_annual: 0.04,
        ..ScenarioConfig::default()
    };
    let run = |dependence: f64| {
        GuaranteeModel::new(ScenarioConfig {
            wrong_way_dependence: dependence,
            ..base.clone()
        })
        .unwrap()
        .run(&market, &kes, &PortfolioWeights::equal(&kes))
        .unwrap()
        .default_fraction
    };

    let flat = run(0.0);
    let wrong_way = run(5.0);
    let right_way = run(-5.0);
    assert!(wrong_way > flat, "{wrong_way} vs {flat}");
    assert!(right_way < flat, "{right_way} vs {flat}");

    // every path carries the same tilted PD
    let generator = DefaultTimeGenerator::new(3.0, 2000, base.default_seed);
    let expected = generator.generate(adjust_pd_for_fx(0.04, 0.36, 5.0)).default_fraction();
    assert_relative_eq!(wrong_way, expected, epsilon = 2.0 / 2000.0);
}

/// With no defaults and full-MTM payouts every path loses the same amount,
/// so the tail is the whole sample and its mean is the horizon MTM.
#[test]
fn tail_contribution_on_deterministic_paths() {
    let market = trending(&[("KES", -0.01), ("UGX", 0.01)]);
    let currencies = ccys(&["KES", "UGX"]);
    let weights = PortfolioWeights::normalized(vec![
        (CurrencyCode::new("KES"), 3.0),
        (CurrencyCode::new("UGX"), 1.0),
    ]);
    let config = ScenarioConfig {
        paths: 500,
        tenor_years: 1,
        pd_annual: 0.0,
        payout_mode: PayoutMode::FullMtm,
        mtm_model: MtmModel::Phase0,
        ..ScenarioConfig::default()
    };
    let notional = config.portfolio_notional;

    let result = GuaranteeModel::new(config)
        .unwrap()
        .run(&market, &currencies, &weights)
        .unwrap();

    // horizon is month 11, twelve steps of 1% depreciation
    let kes = &result.tail_contribution[0];
    assert_eq!(kes.currency, CurrencyCode::new("KES"));
    assert_relative_eq!(kes.mean_mtm, notional * 0.75 * ((0.12f64).exp() - 1.0), max_relative = 1e-9);

    // an appreciating currency never contributes
    let ugx = &result.tail_contribution[1];
    assert_eq!(ugx.currency, CurrencyCode::new("UGX"));
    assert_eq!(ugx.mean_mtm, 0.0);
}

#[test]
fn unquoted_currency_is_rejected() {
    let market = synthetic();
    let currencies = ccys(&["KES", "ZMW"]);
    let model = GuaranteeModel::new(small_config()).unwrap();

    let err = model
        .run(&market, &currencies, &PortfolioWeights::equal(&currencies))
        .unwrap_err();
    assert!(matches!(
        err,
        ModelError::MarketData(MarketDataError::UnknownCurrency(ref c)) if c.as_str() == "ZMW"
    ));
}

#[test]
fn invalid_scenario_is_rejected_up_front() {
    let err = GuaranteeModel::new(ScenarioConfig {
        attachment: 0.7,
        detachment: 0.3,
        ..ScenarioConfig::default()
    })
    .unwrap_err();
    assert!(matches!(err, ModelError::Config(_)));

    assert!(GuaranteeModel::new(ScenarioConfig {
        tenor_years: 0,
        ..ScenarioConfig::default()
    })
    .is_err());
}

#[test]
fn inverted_quotes_and_rates_from_json() {
    let json = r#"{
        "quotes": [
            { "date": "2024-01-31", "currency": "KES", "fx": 150.0 },
            { "date": "2024-02-29", "currency": "KES", "fx": 155.0 },
            { "date": "2024-03-31", "currency": "KES", "fx": 148.0 },
            { "date": "2024-04-30", "currency": "KES", "fx": 160.0 }
        ],
        "conventions": { "KES": "inverted" },
        "rates": {
            "dates": ["2024-01-31", "2024-02-29", "2024-03-31", "2024-04-30"],
            "columns": {
                "KES": [12.0, 12.5, null, 13.0],
                "USD": [5.0, 5.0, 5.0, 5.0]
            }
        }
    }"#;
    let market: MarketData = serde_json::from_str(json).unwrap();
    let kes = ccys(&["KES"]);

    let spot = market.spot(&kes).unwrap();
    assert_relative_eq!(spot.levels()[0], 1.0 / 160.0);
    assert_relative_eq!(market.carries(&kes)[0], (7.0 + 7.5 + 8.0) / 3.0 / 100.0, epsilon = 1e-12);
    assert_eq!(market.return_series(&kes).unwrap().len(), 3);

    let result = GuaranteeModel::new(ScenarioConfig {
        paths: 200,
        tenor_years: 1,
        ..ScenarioConfig::default()
    })
    .unwrap()
    .run(&market, &kes, &PortfolioWeights::equal(&kes))
    .unwrap();
    assert_eq!(result.paths(), 200);
}

#[test]
fn ragged_rate_table_is_rejected() {
    let d = |m| NaiveDate::from_ymd_opt(2024, m, 1).unwrap();
    let market = MarketData {
        quotes: vec![
            FxQuote::new(d(1), "KES", 1.0),
            FxQuote::new(d(2), "KES", 1.1),
            FxQuote::new(d(3), "KES", 1.05),
        ],
        conventions: QuoteConventions::new(),
        rates: RateTable::new(vec![d(1), d(2), d(3)]).with_column("KES", vec![Some(10.0)]),
    };
    let kes = ccys(&["KES"]);
    let err = GuaranteeModel::new(small_config())
        .unwrap()
        .run(&market, &kes, &PortfolioWeights::equal(&kes))
        .unwrap_err();
    assert!(matches!(err, ModelError::MarketData(MarketDataError::RaggedRates { .. })));
}
