pub mod age;
pub mod attribute;
pub mod distribution;
pub mod error;
pub mod prediction;

pub use age::{AgeBin, expected_age};
pub use attribute::Attribute;
pub use distribution::Distribution;
pub use error::{ArtifactLoadError, InferenceError};
pub use prediction::{AttributeOutcome, PredictionResult};
