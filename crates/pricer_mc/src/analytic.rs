//! Closed-form Black-Scholes reference prices.
//!
//! Used by the convergence tests as the ground truth the Monte Carlo
//! estimate must approach, and available to callers that want the
//! analytic value next to the simulated one.
//!
//! **Call**: C = S·N(d1) - K·e^(-rT)·N(d2)
//! **Put**:  P = K·e^(-rT)·N(-d2) - S·N(-d1)
//!
//! where d1 = (ln(S/K) + (r + σ²/2)T) / (σ√T) and d2 = d1 - σ√T.

/// 1 / sqrt(2 * pi)
const FRAC_1_SQRT_2PI: f64 = 0.398_942_280_401_432_7;

/// Complementary error function, Abramowitz & Stegun 7.1.26.
///
/// Maximum absolute error 1.5e-7 over the real line.
fn erfc_approx(x: f64) -> f64 {
    let abs_x = x.abs();

    let a1 = 0.254829592;
    let a2 = -0.284496736;
    let a3 = 1.421413741;
    let a4 = -1.453152027;
    let a5 = 1.061405429;
    let p = 0.3275911;

    let t = 1.0 / (1.0 + p * abs_x);
    let poly = a1 + t * (a2 + t * (a3 + t * (a4 + t * a5)));
    let erfc_abs = t * poly * (-abs_x * abs_x).exp();

    if x < 0.0 {
        2.0 - erfc_abs
    } else {
        erfc_abs
    }
}

/// Standard normal cumulative distribution function.
///
/// Φ(x) = 0.5 * erfc(-x / sqrt(2)), accurate to about 1e-7.
#[inline]
pub fn norm_cdf(x: f64) -> f64 {
    0.5 * erfc_approx(-x / std::f64::consts::SQRT_2)
}

/// Standard normal probability density function.
#[inline]
pub fn norm_pdf(x: f64) -> f64 {
    FRAC_1_SQRT_2PI * (-0.5 * x * x).exp()
}

/// Black-Scholes European call price.
///
/// Assumes `spot > 0`, `strike > 0`, `volatility > 0`, `maturity > 0`
/// (the request validation gate upstream); the degenerate
/// zero-volatility case is handled by the pricer directly, not here.
pub fn black_scholes_call(
    spot: f64,
    strike: f64,
    rate: f64,
    volatility: f64,
    maturity: f64,
) -> f64 {
    let (d1, d2) = d1_d2(spot, strike, rate, volatility, maturity);
    let discount = (-rate * maturity).exp();
    spot * norm_cdf(d1) - strike * discount * norm_cdf(d2)
}

/// Black-Scholes European put price.
pub fn black_scholes_put(
    spot: f64,
    strike: f64,
    rate: f64,
    volatility: f64,
    maturity: f64,
) -> f64 {
    let (d1, d2) = d1_d2(spot, strike, rate, volatility, maturity);
    let discount = (-rate * maturity).exp();
    strike * discount * norm_cdf(-d2) - spot * norm_cdf(-d1)
}

fn d1_d2(spot: f64, strike: f64, rate: f64, volatility: f64, maturity: f64) -> (f64, f64) {
    let vol_sqrt_t = volatility * maturity.sqrt();
    let d1 = ((spot / strike).ln() + (rate + 0.5 * volatility * volatility) * maturity) / vol_sqrt_t;
    (d1, d1 - vol_sqrt_t)
}
