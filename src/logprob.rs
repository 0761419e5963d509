//! Small numeric helpers in log space.
use crate::State;
use std::f64::consts::PI;

/// Return the larger of the two candidates, together with the state it came from.
/// Ties go to the lowest index, `State::First`.
#[inline]
pub fn max_arg(from_first: f64, from_second: f64) -> (f64, State) {
    if from_second > from_first {
        (from_second, State::Second)
    } else {
        (from_first, State::First)
    }
}

const LANCZOS: [f64; 8] = [
    676.5203681218851,
    -1259.1392167224028,
    771.32342877765313,
    -176.61502916214059,
    12.507343278686905,
    -0.13857109526572012,
    9.9843695780195716e-6,
    1.5056327351493116e-7,
];

/// ln(Gamma(x)) by the Lanczos approximation (g = 7).
pub fn ln_gamma(x: f64) -> f64 {
    if x < 0.5 {
        // Reflection formula.
        (PI / (PI * x).sin()).ln() - ln_gamma(1.0 - x)
    } else {
        let x = x - 1.0;
        let mut ag = 0.99999999999980993_f64;
        for (i, &c) in LANCZOS.iter().enumerate() {
            ag += c / (x + i as f64 + 1.0);
        }
        let t = x + 7.5;
        0.5 * (2.0 * PI).ln() + (x + 0.5) * t.ln() - t + ag.ln()
    }
}

/// ln(k!). Finite for every `k`, unlike the factorial itself.
pub fn ln_factorial(k: u64) -> f64 {
    match k {
        0 | 1 => 0f64,
        _ => ln_gamma(k as f64 + 1.0),
    }
}
