//! Realized loss vs. holding for a two-asset constant-product position

use crate::shared::errors::MarketError;

/// Estimate the realized loss of a liquidity position versus holding the two
/// assets outright, as the price ratio moves from `initial_ratio` to
/// `current_ratio`.
///
/// Closed form: loss = 2·sqrt(r)/(1+r) − 1 with r = current/initial,
/// returned as a percentage magnitude. Rejects non-positive ratios.
pub fn estimate_realized_loss(initial_ratio: f64, current_ratio: f64) -> Result<f64, MarketError> {
    if initial_ratio <= 0.0 {
        return Err(MarketError::InvalidRatio(initial_ratio));
    }
    if current_ratio <= 0.0 {
        return Err(MarketError::InvalidRatio(current_ratio));
    }

    let r = current_ratio / initial_ratio;
    let loss = 2.0 * r.sqrt() / (1.0 + r) - 1.0;
    Ok(loss.abs() * 100.0)
}

#[cfg(test)]
mod tests {
    use super::*;

    const EPS: f64 = 1e-9;

    #[test]
    fn test_unchanged_ratio_has_zero_loss() {
        assert!(estimate_realized_loss(1.0, 1.0).unwrap().abs() < EPS);
        assert!(estimate_realized_loss(2.5, 2.5).unwrap().abs() < EPS);
    }

    #[test]
    fn test_symmetric_under_ratio_inversion() {
        let up = estimate_realized_loss(1.0, 2.0).unwrap();
        let down = estimate_realized_loss(1.0, 0.5).unwrap();
        assert!((up - down).abs() < EPS);

        let up = estimate_realized_loss(1.0, 4.0).unwrap();
        let down = estimate_realized_loss(1.0, 0.25).unwrap();
        assert!((up - down).abs() < EPS);
    }

    #[test]
    fn test_known_value_for_price_doubling() {
        // r = 2: 2*sqrt(2)/3 - 1 = -0.05719..., i.e. ~5.72% loss
        let loss = estimate_realized_loss(1.0, 2.0).unwrap();
        assert!((loss - 5.719095841793653).abs() < 1e-9);
    }

    #[test]
    fn test_rejects_non_positive_ratios() {
        assert!(estimate_realized_loss(0.0, 1.0).is_err());
        assert!(estimate_realized_loss(1.0, 0.0).is_err());
        assert!(estimate_realized_loss(1.0, -0.5).is_err());
        assert!(estimate_realized_loss(-1.0, 1.0).is_err());
    }

    #[test]
    fn test_loss_grows_with_divergence() {
        let small = estimate_realized_loss(1.0, 1.1).unwrap();
        let large = estimate_realized_loss(1.0, 3.0).unwrap();
        assert!(large > small);
    }
}
