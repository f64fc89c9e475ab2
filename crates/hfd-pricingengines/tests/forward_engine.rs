//! Round-trip tests for the forward density engine: evolving the joint
//! density and integrating the payoff must reproduce the semi-analytic
//! Heston price.

use std::sync::Arc;

use hfd_core::Real;
use hfd_instruments::{
    Exercise, OptionType, PlainVanillaPayoff, PricingEngine, VanillaOptionArguments,
};
use hfd_pricingengines::{heston_price, FdHestonForwardEngine};
use hfd_processes::HestonProcess;
use hfd_termstructures::{FlatForward, YieldTermStructure};

fn heston(sigma: Real) -> HestonProcess {
    let rts: Arc<dyn YieldTermStructure> = Arc::new(FlatForward::new(0.01));
    let qts: Arc<dyn YieldTermStructure> = Arc::new(FlatForward::new(0.02));
    HestonProcess::new(rts, qts, 100.0, 0.05, 1.0, 0.05, sigma, -0.75).unwrap()
}

fn assert_round_trip(engine: &FdHestonForwardEngine, process: &HestonProcess) {
    for strike in [90.0, 100.0, 110.0] {
        for option_type in [OptionType::Call, OptionType::Put] {
            let expected = heston_price(process, option_type, strike, 1.0);
            let args = VanillaOptionArguments::new(
                Arc::new(PlainVanillaPayoff::new(option_type, strike)),
                Exercise::european(1.0),
            );
            let fd = engine.calculate(&args).unwrap().npv;
            let abs_err = (fd - expected).abs();
            let rel_err = abs_err / expected.abs().max(1e-12);
            assert!(
                rel_err <= 0.02 || abs_err <= 0.02,
                "forward price missed the oracle at strike {strike}: \
                 fd {fd}, expected {expected}"
            );
        }
    }
}

#[test]
fn feller_satisfying_density_reprices_vanillas() {
    // Feller ratio 2kappa*theta/sigma^2 = 20, plain transform
    let process = heston(0.0707);
    let engine = FdHestonForwardEngine::new(process.clone(), 100, 400, 100);
    assert_round_trip(&engine, &process);
}

#[test]
fn feller_violating_density_reprices_vanillas_under_the_power_transform() {
    // Feller ratio 0.625
    let process = heston(0.4);
    let engine = FdHestonForwardEngine::new(process.clone(), 100, 400, 100);
    assert_round_trip(&engine, &process);
}

#[test]
fn every_adi_scheme_closes_the_round_trip() {
    use hfd_methods::FdmSchemeDesc;
    let process = heston(0.0707);
    let expected = heston_price(&process, OptionType::Call, 100.0, 1.0);
    let args = VanillaOptionArguments::new(
        Arc::new(PlainVanillaPayoff::new(OptionType::Call, 100.0)),
        Exercise::european(1.0),
    );
    let schemes = [
        FdmSchemeDesc::douglas(),
        FdmSchemeDesc::craig_sneyd(),
        FdmSchemeDesc::modified_craig_sneyd(),
        FdmSchemeDesc::hundsdorfer(),
    ];
    for scheme in schemes {
        let engine = FdHestonForwardEngine::new(process.clone(), 100, 400, 100)
            .with_scheme(scheme);
        let fd = engine.calculate(&args).unwrap().npv;
        let abs_err = (fd - expected).abs();
        let rel_err = abs_err / expected.abs();
        assert!(
            rel_err <= 0.02 || abs_err <= 0.02,
            "scheme {:?} missed the oracle: fd {fd}, expected {expected}",
            scheme.scheme_type
        );
    }
}

#[test]
fn digital_payoff_prices_agree_between_backward_and_forward_modes() {
    // the backward pricing PDE and the forward density are independent
    // discretisations of the same generator; a discontinuous payoff is a
    // demanding cross-check
    use hfd_instruments::CashOrNothingPayoff;
    use hfd_pricingengines::FdHestonVanillaEngine;

    let process = heston(0.0707);
    let payoff = Arc::new(CashOrNothingPayoff::new(OptionType::Call, 100.0, 10.0));
    let args = VanillaOptionArguments::new(payoff, Exercise::european(1.0));

    let backward = FdHestonVanillaEngine::new(process.clone(), 100, 400, 100)
        .with_damping_steps(2)
        .calculate(&args)
        .unwrap()
        .npv;
    let forward = FdHestonForwardEngine::new(process, 100, 400, 100)
        .calculate(&args)
        .unwrap()
        .npv;
    assert!(
        (backward - forward).abs() < 0.05,
        "backward {backward} vs forward {forward}"
    );
}

#[test]
fn zero_correlation_seeding_agrees_with_gaussian_seeding() {
    use hfd_methods::GreensFctAlgorithm;
    let process = heston(0.0707);
    let args = VanillaOptionArguments::new(
        Arc::new(PlainVanillaPayoff::new(OptionType::Call, 100.0)),
        Exercise::european(1.0),
    );
    let gaussian = FdHestonForwardEngine::new(process.clone(), 100, 400, 100)
        .calculate(&args)
        .unwrap()
        .npv;
    let zero_corr = FdHestonForwardEngine::new(process, 100, 400, 100)
        .with_greens_algorithm(GreensFctAlgorithm::ZeroCorrelation)
        .calculate(&args)
        .unwrap()
        .npv;
    assert!((gaussian - zero_corr).abs() < 0.05);
}
