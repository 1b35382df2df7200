//! Label→probability distributions in canonical label order.

use serde::ser::{Serialize, SerializeMap, Serializer};

/// A probability distribution over a classifier's fixed label set.
///
/// Entries are kept in the classifier's canonical label order, which makes
/// the argmax tie-break deterministic: a strictly-greater scan means the
/// first label in canonical order wins when probabilities are equal.
/// Values sum to 1.0 within floating-point tolerance.
#[derive(Debug, Clone, PartialEq)]
pub struct Distribution {
    entries: Vec<(String, f32)>,
}

impl Distribution {
    /// Build from `(label, probability)` pairs already in canonical order.
    pub fn from_pairs(pairs: impl IntoIterator<Item = (String, f32)>) -> Self {
        Self {
            entries: pairs.into_iter().collect(),
        }
    }

    /// The label with maximum probability, or `None` for an empty distribution.
    ///
    /// Ties resolve to the label that appears first in canonical order.
    pub fn top(&self) -> Option<&str> {
        let mut best: Option<(&str, f32)> = None;
        for (label, prob) in &self.entries {
            match best {
                Some((_, best_prob)) if *prob <= best_prob => {}
                _ => best = Some((label, *prob)),
            }
        }
        best.map(|(label, _)| label)
    }

    /// Probability of a specific label, if present.
    pub fn get(&self, label: &str) -> Option<f32> {
        self.entries
            .iter()
            .find(|(l, _)| l == label)
            .map(|(_, p)| *p)
    }

    /// Sum of all probabilities (≈ 1.0 for a well-formed distribution).
    pub fn sum(&self) -> f32 {
        self.entries.iter().map(|(_, p)| p).sum()
    }

    /// Labels in canonical order.
    pub fn labels(&self) -> impl Iterator<Item = &str> {
        self.entries.iter().map(|(l, _)| l.as_str())
    }

    /// `(label, probability)` pairs in canonical order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, f32)> {
        self.entries.iter().map(|(l, p)| (l.as_str(), *p))
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl Serialize for Distribution {
    /// Serializes as a JSON map, preserving canonical label order.
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(self.entries.len()))?;
        for (label, prob) in &self.entries {
            map.serialize_entry(label, prob)?;
        }
        map.end()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn dist(pairs: &[(&str, f32)]) -> Distribution {
        Distribution::from_pairs(pairs.iter().map(|(l, p)| (l.to_string(), *p)))
    }

    #[test]
    fn top_picks_max_probability() {
        let d = dist(&[("male", 0.2), ("female", 0.7), ("unisex", 0.1)]);
        assert_eq!(d.top(), Some("female"));
    }

    #[test]
    fn tie_resolves_to_first_in_canonical_order() {
        let d = dist(&[("calming", 0.4), ("fresh", 0.4), ("warm", 0.2)]);
        assert_eq!(d.top(), Some("calming"));

        // Order matters, not lexicographic sorting.
        let d = dist(&[("warm", 0.4), ("calming", 0.4), ("fresh", 0.2)]);
        assert_eq!(d.top(), Some("warm"));
    }

    #[test]
    fn empty_distribution_has_no_top() {
        let d = dist(&[]);
        assert_eq!(d.top(), None);
    }

    #[test]
    fn get_and_sum() {
        let d = dist(&[("male", 0.25), ("female", 0.75)]);
        assert_eq!(d.get("male"), Some(0.25));
        assert_eq!(d.get("other"), None);
        assert!((d.sum() - 1.0).abs() < 1e-6);
    }

    #[test]
    fn serializes_as_json_map() {
        let d = dist(&[("male", 0.25), ("female", 0.75)]);
        let v = serde_json::to_value(&d).unwrap();
        assert_eq!(v["male"], 0.25);
        assert_eq!(v["female"], 0.75);
        assert_eq!(v.as_object().unwrap().len(), 2);
    }
}
