//! The closed set of persona attributes and their artifact naming convention.

use std::fmt;

/// One of the five persona attributes the service predicts.
///
/// Each attribute has its own classifier artifact with its own label set;
/// label sets differ in size and content and are never assumed uniform.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Attribute {
    Gender,
    Mood,
    Country,
    ProductFit,
    AgeBin,
}

impl Attribute {
    /// All attributes, in canonical order.
    pub const ALL: [Attribute; 5] = [
        Attribute::Gender,
        Attribute::Mood,
        Attribute::Country,
        Attribute::ProductFit,
        Attribute::AgeBin,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Gender => "gender",
            Self::Mood => "mood",
            Self::Country => "country",
            Self::ProductFit => "product_fit",
            Self::AgeBin => "age_bin",
        }
    }

    /// File name of this attribute's classifier artifact, e.g. `gender_clf.json`.
    pub fn artifact_file(&self) -> String {
        format!("{}_clf.json", self.as_str())
    }
}

impl fmt::Display for Attribute {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
