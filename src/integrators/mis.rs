// Copyright @yucwang 2026

use crate::math::constants::Float;

/// Power heuristic (exponent 2) weight of strategy `a` against strategy `b`.
/// Both densities must be expressed in the same measure. Degenerate inputs
/// give 0 rather than NaN.
pub fn mis_weight(pdf_a: Float, pdf_b: Float) -> Float {
    let a = pdf_a as f64 * pdf_a as f64;
    let b = pdf_b as f64 * pdf_b as f64;
    let denominator = a + b;
    if pdf_a > 0.0 && denominator > 0.0 && denominator.is_finite() {
        (a / denominator) as Float
    } else {
        0.0
    }
}
