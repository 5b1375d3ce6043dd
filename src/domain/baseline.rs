//! Baseline price reconstruction.
//!
//! Providers report the current price together with the percentage move
//! over the reporting window (24h). Inverting that move recovers the
//! price at the start of the window without a second historical query:
//!
//!   current = baseline * (1 + change / 100)
//!   baseline = current / (1 + change / 100)

/// Derives the window-start price from the current price and percent change.
///
/// Returns `current_price` unchanged when the change is absent, non-finite,
/// exactly zero, or at/below −100% (the start price would be undefined or
/// non-positive).
pub fn derive_baseline(current_price: f64, percent_change: Option<f64>) -> f64 {
    match percent_change {
        Some(change) if change.is_finite() && change != 0.0 && change > -100.0 => {
            current_price / (1.0 + change / 100.0)
        }
        _ => current_price,
    }
}

/// Baseline used for published records.
///
/// Same as [`derive_baseline`], but a non-positive or non-finite result is
/// replaced by the current price.
pub fn baseline_or_live(current_price: f64, percent_change: Option<f64>) -> f64 {
    let baseline = derive_baseline(current_price, percent_change);
    if baseline.is_finite() && baseline > 0.0 {
        baseline
    } else {
        current_price
    }
}
