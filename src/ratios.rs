use crate::types::{RatioInput, RatioItem};
use tracing::debug;

/// Headroom over the largest amount so the widest bar stays below full width.
pub const RATIO_HEADROOM: f64 = 1.33;

/// Annotate each item with its bar width as a percentage of
/// `max(amount) * RATIO_HEADROOM`.
///
/// When no amount is positive every ratio is `0.0`.
pub fn add_ratios(items: &[RatioInput]) -> Vec<RatioItem> {
    let max = items
        .iter()
        .map(|i| i.amount)
        .fold(f64::NEG_INFINITY, f64::max);
    let denominator = max * RATIO_HEADROOM;
    let has_positive = max > 0.0;
    if !has_positive && !items.is_empty() {
        debug!("No positive amount among {} items, ratios set to 0", items.len());
    }

    items
        .iter()
        .map(|i| RatioItem {
            title: i.title.clone(),
            amount: i.amount,
            ratio: if has_positive {
                i.amount / denominator * 100.0
            } else {
                0.0
            },
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn input(title: &str, amount: f64) -> RatioInput {
        RatioInput {
            title: title.to_string(),
            amount,
        }
    }

    #[test]
    fn largest_item_gets_headroom_ratio() {
        let out = add_ratios(&[input("Health", 400.0), input("Police", 100.0)]);
        assert!((out[0].ratio - 100.0 / 1.33).abs() < 1e-9);
        assert!((out[0].ratio - 75.19).abs() < 0.01);
        assert!((out[1].ratio - 25.0 / 1.33).abs() < 1e-9);
        assert_eq!(out[1].title, "Police");
    }

    #[test]
    fn all_zero_amounts_use_zero_sentinel() {
        let out = add_ratios(&[input("a", 0.0), input("b", 0.0)]);
        assert!(out.iter().all(|i| i.ratio == 0.0));
        assert!(add_ratios(&[]).is_empty());
    }
}
