//! The immutable per-request prediction aggregate.

use serde::Serialize;

use crate::distribution::Distribution;

/// One attribute's full distribution plus its deterministic top label.
#[derive(Debug, Clone, Serialize)]
pub struct AttributeOutcome {
    pub distribution: Distribution,
    pub top_label: String,
}

/// Everything one inference request produces.
///
/// Constructed fresh per request and never mutated; the caller owns it and
/// it holds no reference back to the service that produced it.
#[derive(Debug, Clone, Serialize)]
pub struct PredictionResult {
    pub gender: AttributeOutcome,
    pub mood: AttributeOutcome,
    pub country: AttributeOutcome,
    pub product_fit: AttributeOutcome,
    pub age_bin: AttributeOutcome,
    /// Probability-weighted expectation of age-bin midpoints, truncated
    /// toward zero for display (an explicit policy, not rounding).
    pub average_age: u32,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn outcome(pairs: &[(&str, f32)]) -> AttributeOutcome {
        let distribution =
            Distribution::from_pairs(pairs.iter().map(|(l, p)| (l.to_string(), *p)));
        let top_label = distribution.top().unwrap().to_string();
        AttributeOutcome {
            distribution,
            top_label,
        }
    }

    #[test]
    fn serializes_to_dashboard_shape() {
        let result = PredictionResult {
            gender: outcome(&[("male", 0.2), ("female", 0.8)]),
            mood: outcome(&[("fresh", 1.0)]),
            country: outcome(&[("France", 0.6), ("Japan", 0.4)]),
            product_fit: outcome(&[("Home Freshening (Febreze)", 1.0)]),
            age_bin: outcome(&[("adult", 1.0)]),
            average_age: 30,
        };

        let v = serde_json::to_value(&result).unwrap();
        assert_eq!(v["gender"]["top_label"], "female");
        assert_eq!(v["gender"]["distribution"]["female"], 0.8);
        assert_eq!(v["age_bin"]["top_label"], "adult");
        assert_eq!(v["average_age"], 30);
    }
}
