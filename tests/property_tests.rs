use chrono::NaiveDate;
use mtm_guarantee::capital::liquidity::LiquidityAnalysis;
use mtm_guarantee::capital::loss_dist::var_es;
use mtm_guarantee::capital::requirement::{required_capital, CapitalMethod};
use mtm_guarantee::capital::waterfall::{waterfall, WaterfallInputs};
use mtm_guarantee::core::currency::{CurrencyCode, QuoteConvention};
use mtm_guarantee::core::market::{ReturnSeries, SpotVector};
use mtm_guarantee::guarantee::contract::{GuaranteeContract, PayoutMode};
use mtm_guarantee::guarantee::payout::{apply_tranche, payout_distribution, raw_loss};
use mtm_guarantee::simulation::default_time::DefaultTimeGenerator;
use mtm_guarantee::simulation::paths::{PathSimulator, SimulationMode};
use nalgebra::DMatrix;
use proptest::prelude::*;

/// Generate valid guarantee terms (attachment ≤ detachment).
fn arb_contract() -> impl Strategy<Value = GuaranteeContract> {
    (
        0.0..=1.0f64,
        0.0..=1.0f64,
        0.0..=1.0f64,
        0.0..=1.0f64,
        prop::sample::select(vec![PayoutMode::DefaultTriggered, PayoutMode::FullMtm]),
    )
        .prop_map(|(coverage, a, b, limit, mode)| {
            GuaranteeContract::new(coverage, a.min(b), a.max(b), limit, mode).unwrap()
        })
}

/// Generate a non-empty loss sample.
fn arb_losses() -> impl Strategy<Value = Vec<f64>> {
    prop::collection::vec(0.0..1e7f64, 1..200)
}

/// A small two-currency return history.
fn arb_returns() -> impl Strategy<Value = ReturnSeries> {
    prop::collection::vec((-0.1..0.1f64, -0.1..0.1f64), 3..24).prop_map(|rows| {
        let start = NaiveDate::from_ymd_opt(2020, 1, 1).unwrap();
        let dates = (0..rows.len())
            .map(|i| start + chrono::Days::new(30 * i as u64))
            .collect();
        let data = DMatrix::from_fn(rows.len(), 2, |r, c| if c == 0 { rows[r].0 } else { rows[r].1 });
        ReturnSeries::new(dates, vec![CurrencyCode::new("KES"), CurrencyCode::new("UGX")], data).unwrap()
    })
}

proptest! {
    // ===================================================================
    // INVARIANT 1: Default-triggered losses need a default.
    //
    // With a default and a non-negative MTM the raw loss is coverage × MTM;
    // without a default nothing is claimed.
    // ===================================================================
    #[test]
    fn default_triggered_raw_loss(mtm in 0.0..1e8f64, coverage in 0.0..=1.0f64) {
        let c = GuaranteeContract::new(coverage, 0.0, 1.0, 1.0, PayoutMode::DefaultTriggered).unwrap();
        prop_assert!((raw_loss(mtm, 1.0, &c) - coverage * mtm).abs() <= 1e-9 * mtm.max(1.0));
        prop_assert_eq!(raw_loss(mtm, 0.0, &c), 0.0);
    }

    // ===================================================================
    // INVARIANT 2: Payout stays within [0, limit × N].
    //
    // Whatever the MTM and default flag, the guarantor never pays more
    // than the limit and never receives money.
    // ===================================================================
    #[test]
    fn payout_bounded_by_limit(
        contract in arb_contract(),
        mtm in prop::collection::vec(-1e8..1e8f64, 1..100),
        notional in 1.0..1e9f64,
    ) {
        let flags: Vec<f64> = (0..mtm.len()).map(|i| (i % 2) as f64).collect();
        let payouts = payout_distribution(&mtm, &flags, notional, &contract).unwrap();
        let cap = contract.limit_pct() * notional;
        for p in payouts {
            prop_assert!(p >= 0.0);
            prop_assert!(p <= cap);
        }
    }

    // ===================================================================
    // INVARIANT 3: Payout is monotone in raw loss.
    //
    // A larger raw loss can never produce a smaller payout.
    // ===================================================================
    #[test]
    fn payout_monotone_in_raw_loss(
        contract in arb_contract(),
        a in 0.0..2e8f64,
        b in 0.0..2e8f64,
    ) {
        let (lo, hi) = if a <= b { (a, b) } else { (b, a) };
        prop_assert!(apply_tranche(lo, 1e8, &contract) <= apply_tranche(hi, 1e8, &contract));
    }

    // ===================================================================
    // INVARIANT 4: A constant loss sample has EL = VaR = ES.
    // ===================================================================
    #[test]
    fn constant_sample_statistics(value in 0.0..1e6f64, n in 1usize..500, q in 0.0..=1.0f64) {
        let stats = var_es(&vec![value; n], q).unwrap();
        prop_assert!((stats.expected_loss - value).abs() <= 1e-9 * value.max(1.0));
        prop_assert_eq!(stats.var, value);
        prop_assert!((stats.es - value).abs() <= 1e-9 * value.max(1.0));
    }

    // ===================================================================
    // INVARIANT 5: ES never sits below VaR, and both cover the mean.
    // ===================================================================
    #[test]
    fn es_dominates_var(losses in arb_losses(), q in 0.5..=1.0f64) {
        let stats = var_es(&losses, q).unwrap();
        prop_assert!(stats.es >= stats.var * (1.0 - 1e-12));
        prop_assert!(stats.es >= stats.expected_loss * (1.0 - 1e-9));
    }

    // ===================================================================
    // INVARIANT 6: Capital is the chosen measure grossed up by the overlay.
    // ===================================================================
    #[test]
    fn capital_formula(var in 0.0..1e8f64, es in 0.0..1e8f64, overlay in 0.0..1.0f64) {
        prop_assert_eq!(required_capital(var, es, CapitalMethod::Var, overlay), var * (1.0 + overlay));
        prop_assert_eq!(required_capital(var, es, CapitalMethod::Es, overlay), es * (1.0 + overlay));
    }

    // ===================================================================
    // INVARIANT 7: The waterfall pays equity exactly what is left.
    //
    // equity_residual == net_available − mezz_coupon − senior_fee for any
    // inputs.
    // ===================================================================
    #[test]
    fn waterfall_residual_identity(
        notional in 1.0..1e9f64,
        fee in 0.0..500.0f64,
        opex in 0.0..100.0f64,
        reserve in 0.0..100.0f64,
        el in 0.0..1e7f64,
        mezz in 0.0..1e8f64,
        coupon in 0.0..0.2f64,
    ) {
        let wf = waterfall(&WaterfallInputs {
            notional,
            client_fee_bps: fee,
            opex_bps: opex,
            reserve_bps: reserve,
            expected_loss: el,
            mezz_notional: mezz,
            mezz_coupon_rate: coupon,
            senior_limit: notional * 0.6,
            senior_fee_bps: 80.0,
            equity_capital: notional / 15.0,
            senior_capital_factor: 0.2,
        });
        prop_assert_eq!(wf.equity_residual, wf.net_available - wf.mezz_coupon - wf.senior_fee);
    }

    // ===================================================================
    // INVARIANT 8: Inverting a quote twice gives it back.
    // ===================================================================
    #[test]
    fn quote_inversion_round_trip(fx in 1e-4..1e5f64) {
        let once = QuoteConvention::Inverted.normalize(fx);
        let twice = QuoteConvention::Inverted.normalize(once);
        prop_assert!((twice - fx).abs() <= 1e-12 * fx);
    }

    // ===================================================================
    // INVARIANT 9: Path simulation is a pure function of its inputs.
    //
    // Same returns, spot and seed produce bit-identical tensors, and
    // every simulated level stays positive.
    // ===================================================================
    #[test]
    fn path_simulation_deterministic(returns in arb_returns(), seed in any::<u64>()) {
        let spot = SpotVector::new(
            vec![CurrencyCode::new("KES"), CurrencyCode::new("UGX")],
            vec![0.0077, 0.00026],
        )
        .unwrap();
        let sim = PathSimulator::new(1, 50, SimulationMode::Historical, 1.0, seed);
        let a = sim.simulate(&returns, &spot).unwrap();
        let b = sim.simulate(&returns, &spot).unwrap();
        prop_assert_eq!(a.as_slice(), b.as_slice());
        prop_assert!(a.as_slice().iter().all(|s| *s > 0.0));
    }

    // ===================================================================
    // INVARIANT 10: Higher PD never removes a default.
    //
    // With a shared uniform stream, every path that defaults under a
    // lower PD also defaults under a higher one.
    // ===================================================================
    #[test]
    fn default_set_grows_with_pd(lo in 0.0..1.0f64, hi in 0.0..1.0f64, seed in any::<u64>()) {
        let (lo, hi) = if lo <= hi { (lo, hi) } else { (hi, lo) };
        let gen = DefaultTimeGenerator::new(5.0, 200, seed);
        let a = gen.generate(lo);
        let b = gen.generate(hi);
        for (x, y) in a.times().iter().zip(b.times()) {
            if x.is_some() {
                prop_assert!(y.is_some());
            }
        }
        prop_assert!(a.default_fraction() <= b.default_fraction());
    }

    // ===================================================================
    // INVARIANT 11: The liquidity buffer covers the floor and the 1m 99%.
    // ===================================================================
    #[test]
    fn liquidity_buffer_floors(losses in arb_losses(), months in 1usize..60, floor in 0.0..0.1f64) {
        let notional = 1e8;
        let liq = LiquidityAnalysis::from_path_losses(&losses, months, floor, notional).unwrap();
        prop_assert!(liq.recommended >= floor * notional);
        prop_assert!(liq.recommended >= liq.one_month_99);
        prop_assert!(liq.recommended >= liq.three_month_95);
    }
}

#[test]
fn default_fraction_extremes() {
    let gen = DefaultTimeGenerator::new(5.0, 2_000, 7);
    assert_eq!(gen.generate(0.0).default_fraction(), 0.0);
    assert_eq!(gen.generate(1.0).default_fraction(), 1.0);
    assert!(gen.generate(1e-6).default_fraction() < 0.01);
    assert!(gen.generate(0.999).default_fraction() > 0.99);
}
