//! Semi-analytic Heston price via characteristic-function integration.
//!
//! European vanillas under the Heston model admit the representation
//! `C = S e^{-qT} P1 - K e^{-rT} P2` where the in-the-money probabilities
//! `P1`, `P2` are Fourier integrals of the characteristic function. The
//! numerically stable branch of the complex logarithm follows Albrecher et
//! al., "The little Heston trap".

use std::f64::consts::PI;

use hfd_core::{Real, Time};
use hfd_instruments::OptionType;
use hfd_math::integrals::{Integrator, SimpsonIntegral};
use hfd_processes::HestonProcess;

/// Heston characteristic function for the probability `P_j`, `j ∈ {1, 2}`,
/// as a `(Re, Im)` pair. The spot and drift terms are folded into the
/// log-moneyness of the caller's integrand.
#[allow(clippy::too_many_arguments)]
fn heston_char_func(
    phi: Real,
    t: Time,
    v0: Real,
    kappa: Real,
    theta: Real,
    sigma: Real,
    rho: Real,
    j: usize,
) -> (Real, Real) {
    let (u, b) = if j == 1 {
        (0.5, kappa - rho * sigma)
    } else {
        (-0.5, kappa)
    };

    let sigma2 = sigma * sigma;

    // d^2 = (b - i rho sigma phi)^2 - sigma^2 (2 u i phi - phi^2)
    //     = b^2 + sigma^2 phi^2 (1 - rho^2) - 2 sigma phi (b rho + u sigma) i
    let d2_re = b * b + sigma2 * phi * phi * (1.0 - rho * rho);
    let d2_im = -2.0 * sigma * phi * (b * rho + u * sigma);
    let (d_r, d_i) = complex_sqrt(d2_re, d2_im);
    // stable branch: Re(d) >= 0 so that exp(-dT) decays
    let (d_r, d_i) = if d_r < 0.0 { (-d_r, -d_i) } else { (d_r, d_i) };

    // c = b - i rho sigma phi
    let c_r = b;
    let c_i = -rho * sigma * phi;

    // g_m = (c - d)/(c + d), the non-exploding ratio
    let (gm_r, gm_i) = complex_div(c_r - d_r, c_i - d_i, c_r + d_r, c_i + d_i);

    // exp(-dT)
    let emdt_mag = (-d_r * t).exp();
    let emdt_r = emdt_mag * (-d_i * t).cos();
    let emdt_i = emdt_mag * (-d_i * t).sin();

    // 1 - g_m exp(-dT)
    let gme_r = gm_r * emdt_r - gm_i * emdt_i;
    let gme_i = gm_r * emdt_i + gm_i * emdt_r;
    let one_m_gme_r = 1.0 - gme_r;
    let one_m_gme_i = -gme_i;

    // D = (c - d)/sigma^2 * (1 - exp(-dT))/(1 - g_m exp(-dT))
    let (frac_r, frac_i) = complex_div(1.0 - emdt_r, -emdt_i, one_m_gme_r, one_m_gme_i);
    let cmd_r = c_r - d_r;
    let cmd_i = c_i - d_i;
    let big_d_r = (cmd_r * frac_r - cmd_i * frac_i) / sigma2;
    let big_d_i = (cmd_r * frac_i + cmd_i * frac_r) / sigma2;

    // C = kappa theta / sigma^2 * [(c - d)T - 2 ln((1 - g_m exp(-dT))/(1 - g_m))]
    let (log_arg_r, log_arg_i) =
        complex_div(one_m_gme_r, one_m_gme_i, 1.0 - gm_r, -gm_i);
    let (log_r, log_i) = complex_log(log_arg_r, log_arg_i);
    let big_c_r = kappa * theta / sigma2 * (cmd_r * t - 2.0 * log_r);
    let big_c_i = kappa * theta / sigma2 * (cmd_i * t - 2.0 * log_i);

    // exp(C + D v0)
    let exp_arg_r = big_c_r + big_d_r * v0;
    let exp_arg_i = big_c_i + big_d_i * v0;
    let exp_mag = exp_arg_r.exp();
    (exp_mag * exp_arg_i.cos(), exp_mag * exp_arg_i.sin())
}

/// `P_j = 1/2 + 1/pi * Int_0^inf Re[exp(i phi x) f_j(phi) / (i phi)] dphi`
/// with `x` the forward log-moneyness.
#[allow(clippy::too_many_arguments)]
fn compute_pj(
    j: usize,
    spot: Real,
    strike: Real,
    t: Time,
    r: Real,
    q: Real,
    v0: Real,
    kappa: Real,
    theta: Real,
    sigma: Real,
    rho: Real,
) -> Real {
    let x = spot.ln() + (r - q) * t - strike.ln();

    let integrand = |phi: Real| -> Real {
        if phi < 1e-12 {
            return 0.0;
        }
        let (cf_r, cf_i) = heston_char_func(phi, t, v0, kappa, theta, sigma, rho, j);
        // Re[cf exp(i phi x)/(i phi)] = Im[cf exp(i phi x)]/phi
        (cf_r * (phi * x).sin() + cf_i * (phi * x).cos()) / phi
    };

    // the CF decays exponentially in phi, so a finite upper bound suffices
    let integrator = SimpsonIntegral::new(1e-10, 200_000);
    let integral = integrator.integrate(integrand, 1e-8, 500.0);
    0.5 + integral / PI
}

/// Price a European vanilla under the Heston model; the rates are the zero
/// rates of the process curves at `maturity`.
pub fn heston_price(
    process: &HestonProcess,
    option_type: OptionType,
    strike: Real,
    maturity: Time,
) -> Real {
    let spot = process.s0();
    let r = process.risk_free_rate().zero_rate(maturity);
    let q = process.dividend_yield().zero_rate(maturity);
    let v0 = process.v0();
    let kappa = process.kappa();
    let theta = process.theta();
    let sigma = process.sigma();
    let rho = process.rho();

    let p1 = compute_pj(1, spot, strike, maturity, r, q, v0, kappa, theta, sigma, rho);
    let p2 = compute_pj(2, spot, strike, maturity, r, q, v0, kappa, theta, sigma, rho);

    let df_q = (-q * maturity).exp();
    let df_r = (-r * maturity).exp();
    let call = spot * df_q * p1 - strike * df_r * p2;

    match option_type {
        OptionType::Call => call,
        OptionType::Put => call - spot * df_q + strike * df_r,
    }
}

// complex helpers on (Re, Im) pairs

fn complex_sqrt(re: Real, im: Real) -> (Real, Real) {
    let r = (re * re + im * im).sqrt().sqrt();
    let half_arg = im.atan2(re) / 2.0;
    (r * half_arg.cos(), r * half_arg.sin())
}

fn complex_div(a_r: Real, a_i: Real, b_r: Real, b_i: Real) -> (Real, Real) {
    let denom = b_r * b_r + b_i * b_i;
    ((a_r * b_r + a_i * b_i) / denom, (a_i * b_r - a_r * b_i) / denom)
}

fn complex_log(re: Real, im: Real) -> (Real, Real) {
    ((re * re + im * im).sqrt().ln(), im.atan2(re))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::analytic_european_engine::black_scholes_merton;
    use approx::assert_abs_diff_eq;
    use hfd_termstructures::{FlatForward, YieldTermStructure};
    use std::sync::Arc;

    fn process(
        s0: Real,
        r: Real,
        q: Real,
        v0: Real,
        kappa: Real,
        theta: Real,
        sigma: Real,
        rho: Real,
    ) -> HestonProcess {
        let rts: Arc<dyn YieldTermStructure> = Arc::new(FlatForward::new(r));
        let qts: Arc<dyn YieldTermStructure> = Arc::new(FlatForward::new(q));
        HestonProcess::new(rts, qts, s0, v0, kappa, theta, sigma, rho).unwrap()
    }

    #[test]
    fn vanishing_vol_of_vol_recovers_black_scholes() {
        // with sigma -> 0 and v0 = theta the variance stays at theta
        let p = process(100.0, 0.05, 0.02, 0.04, 1.5, 0.04, 1e-4, 0.0);
        let heston = heston_price(&p, OptionType::Call, 110.0, 1.0);
        let (bs, _, _) =
            black_scholes_merton(OptionType::Call, 110.0, 100.0, 0.05, 0.02, 0.2, 1.0);
        assert_abs_diff_eq!(heston, bs, epsilon = 1e-4);
    }

    #[test]
    fn put_call_parity_holds() {
        let p = process(100.0, 0.04, 0.01, 0.09, 2.0, 0.06, 0.8, -0.7);
        let call = heston_price(&p, OptionType::Call, 95.0, 2.0);
        let put = heston_price(&p, OptionType::Put, 95.0, 2.0);
        let fwd_value = 100.0 * (-0.01f64 * 2.0).exp() - 95.0 * (-0.04f64 * 2.0).exp();
        assert_abs_diff_eq!(call - put, fwd_value, epsilon = 1e-8);
    }

    #[test]
    fn deep_in_and_out_of_the_money_limits() {
        let p = process(100.0, 0.03, 0.0, 0.04, 2.0, 0.04, 0.5, -0.5);
        let deep_itm = heston_price(&p, OptionType::Call, 1.0, 1.0);
        assert_abs_diff_eq!(deep_itm, 100.0 - (-0.03f64).exp(), epsilon = 1e-4);
        let deep_otm = heston_price(&p, OptionType::Call, 10_000.0, 1.0);
        assert!(deep_otm >= 0.0 && deep_otm < 1e-4);
    }
}
