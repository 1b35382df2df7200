//! Age bins, representative midpoints, and the expected-age computation.

use crate::distribution::Distribution;

/// One of six contiguous life-stage buckets covering ages 13–80.
///
/// Each bin carries a fixed representative midpoint used to turn an
/// age-bin probability distribution into a continuous age estimate.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum AgeBin {
    Teen,
    EarlyAdult,
    Adult,
    MidAdult,
    Mature,
    Senior,
}

impl AgeBin {
    /// All bins in ascending age order.
    pub const ALL: [AgeBin; 6] = [
        AgeBin::Teen,
        AgeBin::EarlyAdult,
        AgeBin::Adult,
        AgeBin::MidAdult,
        AgeBin::Mature,
        AgeBin::Senior,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Teen => "teen",
            Self::EarlyAdult => "early_adult",
            Self::Adult => "adult",
            Self::MidAdult => "mid_adult",
            Self::Mature => "mature",
            Self::Senior => "senior",
        }
    }

    /// Parse a bin identifier as it appears in classifier label sets.
    pub fn from_label(label: &str) -> Option<Self> {
        Self::ALL.iter().copied().find(|b| b.as_str() == label)
    }

    /// Representative midpoint age used for expectation computation.
    pub fn midpoint(&self) -> f64 {
        match self {
            Self::Teen => 16.0,
            Self::EarlyAdult => 22.0,
            Self::Adult => 30.0,
            Self::MidAdult => 43.0,
            Self::Mature => 58.0,
            Self::Senior => 72.0,
        }
    }

    /// Inclusive age range covered by this bin.
    pub fn range(&self) -> (u32, u32) {
        match self {
            Self::Teen => (13, 18),
            Self::EarlyAdult => (19, 25),
            Self::Adult => (26, 35),
            Self::MidAdult => (36, 50),
            Self::Mature => (51, 65),
            Self::Senior => (66, 80),
        }
    }
}

/// Probability-weighted expectation of age-bin midpoints.
///
/// Returns `None` if any label in the distribution is not a known bin
/// identifier. The result is a convex combination of midpoints, so it
/// always lies within [16, 72] for a well-formed distribution.
pub fn expected_age(distribution: &Distribution) -> Option<f64> {
    let mut sum = 0.0f64;
    for (label, prob) in distribution.iter() {
        let bin = AgeBin::from_label(label)?;
        sum += bin.midpoint() * prob as f64;
    }
    Some(sum)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn age_dist(pairs: &[(&str, f32)]) -> Distribution {
        Distribution::from_pairs(pairs.iter().map(|(l, p)| (l.to_string(), *p)))
    }

    #[test]
    fn bins_are_contiguous_over_13_to_80() {
        let mut expected_start = 13;
        for bin in AgeBin::ALL {
            let (lo, hi) = bin.range();
            assert_eq!(lo, expected_start, "{bin:?} does not start where the previous ended");
            assert!(hi >= lo);
            assert!(bin.midpoint() >= lo as f64 && bin.midpoint() <= hi as f64);
            expected_start = hi + 1;
        }
        assert_eq!(expected_start, 81, "bins must cover through age 80");
    }

    #[test]
    fn labels_round_trip() {
        for bin in AgeBin::ALL {
            assert_eq!(AgeBin::from_label(bin.as_str()), Some(bin));
        }
        assert_eq!(AgeBin::from_label("toddler"), None);
    }

    #[test]
    fn pure_adult_expectation_is_30() {
        let d = age_dist(&[
            ("teen", 0.0),
            ("early_adult", 0.0),
            ("adult", 1.0),
            ("mid_adult", 0.0),
            ("mature", 0.0),
            ("senior", 0.0),
        ]);
        assert_eq!(expected_age(&d), Some(30.0));
    }

    #[test]
    fn teen_senior_split_is_44() {
        let d = age_dist(&[("teen", 0.5), ("senior", 0.5)]);
        assert_eq!(expected_age(&d), Some(44.0));
    }

    #[test]
    fn expectation_stays_within_supported_range() {
        let uniform = 1.0 / 6.0;
        let d = age_dist(&AgeBin::ALL.map(|b| (b.as_str(), uniform)));
        let age = expected_age(&d).unwrap();
        assert!(age >= 13.0 && age <= 80.0, "expected age {age} out of range");
    }

    #[test]
    fn unknown_label_yields_none() {
        let d = age_dist(&[("adult", 0.5), ("toddler", 0.5)]);
        assert_eq!(expected_age(&d), None);
    }

    #[test]
    fn truncation_toward_zero_not_rounding() {
        // 0.3 × 30 + 0.7 × 58 = 49.6 — the displayed age must be 49, not 50.
        let d = age_dist(&[("adult", 0.3), ("mature", 0.7)]);
        let age = expected_age(&d).unwrap();
        assert!((age - 49.6).abs() < 1e-9);
        assert_eq!(age as u32, 49);
    }
}
