//! Black-Scholes-Merton closed form for European vanillas.
//!
//! Serves as the degenerate-volatility oracle for the finite-difference
//! engines: with a vanishing vol-of-vol the Heston price collapses to the
//! Black-Scholes price at the deterministic variance.

use hfd_core::{Real, Time};
use hfd_math::distributions::{normal_cdf, normal_pdf};
use hfd_instruments::OptionType;

/// Price, spot delta and spot gamma of a European vanilla under flat
/// continuously compounded rates.
///
/// Handles the degenerate cases explicitly: at or past expiry the intrinsic
/// value is returned, and a vanishing standard deviation reduces the price
/// to the discounted forward intrinsic.
pub fn black_scholes_merton(
    option_type: OptionType,
    strike: Real,
    spot: Real,
    r: Real,
    q: Real,
    sigma: Real,
    maturity: Time,
) -> (Real, Real, Real) {
    let phi = option_type.sign();

    if maturity <= 0.0 {
        let intrinsic = (phi * (spot - strike)).max(0.0);
        let delta = if phi * (spot - strike) > 0.0 { phi } else { 0.0 };
        return (intrinsic, delta, 0.0);
    }

    let df_r = (-r * maturity).exp();
    let df_q = (-q * maturity).exp();
    let stddev = sigma * maturity.sqrt();

    if stddev < 1e-12 {
        let forward = spot * df_q / df_r;
        let intrinsic = df_r * (phi * (forward - strike)).max(0.0);
        let delta = if phi * (forward - strike) > 0.0 { phi * df_q } else { 0.0 };
        return (intrinsic, delta, 0.0);
    }

    let forward = spot * df_q / df_r;
    let d1 = (forward / strike).ln() / stddev + 0.5 * stddev;
    let d2 = d1 - stddev;

    let price = phi * (spot * df_q * normal_cdf(phi * d1) - strike * df_r * normal_cdf(phi * d2));
    let delta = phi * df_q * normal_cdf(phi * d1);
    let gamma = df_q * normal_pdf(d1) / (spot * stddev);

    (price, delta, gamma)
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_abs_diff_eq;

    #[test]
    fn matches_a_published_reference_value() {
        // Haug, "Option Pricing Formulas": S=60, K=65, r=8%, sigma=30%, T=0.25
        let (price, _, _) =
            black_scholes_merton(OptionType::Call, 65.0, 60.0, 0.08, 0.0, 0.3, 0.25);
        assert_abs_diff_eq!(price, 2.1334, epsilon = 1e-4);
    }

    #[test]
    fn put_call_parity_holds() {
        let (call, dc, gc) =
            black_scholes_merton(OptionType::Call, 100.0, 105.0, 0.05, 0.02, 0.25, 1.5);
        let (put, dp, gp) =
            black_scholes_merton(OptionType::Put, 100.0, 105.0, 0.05, 0.02, 0.25, 1.5);
        let fwd_value = 105.0 * (-0.02f64 * 1.5).exp() - 100.0 * (-0.05f64 * 1.5).exp();
        assert_abs_diff_eq!(call - put, fwd_value, epsilon = 1e-12);
        assert_abs_diff_eq!(dc - dp, (-0.02f64 * 1.5).exp(), epsilon = 1e-12);
        assert_abs_diff_eq!(gc, gp, epsilon = 1e-12);
    }

    #[test]
    fn degenerate_volatility_returns_the_discounted_forward_intrinsic() {
        let (price, delta, gamma) =
            black_scholes_merton(OptionType::Call, 90.0, 100.0, 0.05, 0.0, 0.0, 1.0);
        let expected = 100.0 - 90.0 * (-0.05f64).exp();
        assert_abs_diff_eq!(price, expected, epsilon = 1e-12);
        assert_abs_diff_eq!(delta, 1.0, epsilon = 1e-12);
        assert_abs_diff_eq!(gamma, 0.0, epsilon = 1e-12);
    }

    #[test]
    fn expired_option_is_worth_its_intrinsic_value() {
        let (price, delta, _) =
            black_scholes_merton(OptionType::Put, 100.0, 90.0, 0.05, 0.0, 0.2, 0.0);
        assert_abs_diff_eq!(price, 10.0, epsilon = 1e-12);
        assert_abs_diff_eq!(delta, -1.0, epsilon = 1e-12);
    }
}
