//! Terminal card rendering for prediction results.
//!
//! Presentation-layer concern: owns the human-readable age-bin labels and
//! ranges, keyed by the core's bin identifiers.

use persona_core::{AttributeOutcome, PredictionResult};

const BAR_WIDTH: usize = 24;

/// Human-readable label and age range per bin identifier.
const AGE_BIN_DISPLAY: &[(&str, &str, &str)] = &[
    ("teen", "Teen", "13-18"),
    ("early_adult", "Young Adult", "19-25"),
    ("adult", "Adult", "26-35"),
    ("mid_adult", "Mid Adult", "36-50"),
    ("mature", "Mature Adult", "51-65"),
    ("senior", "Senior", "66-80"),
];

/// Print a full prediction as a grouped card.
pub fn print_prediction_card(text: &str, result: &PredictionResult) {
    println!("=== Persona Prediction ===");
    println!("{text}");
    println!();

    print_attribute("Gender", &result.gender);
    print_attribute("Mood", &result.mood);
    print_attribute("Country", &result.country);
    print_attribute("Product Fit", &result.product_fit);
    print_attribute("Age Bracket", &result.age_bin);

    let (label, range) = age_bin_display(&result.age_bin.top_label);
    println!("Age");
    println!(
        "  {:<26} {}  ({label}, {range})",
        "estimated", result.average_age
    );
}

fn print_attribute(header: &str, outcome: &AttributeOutcome) {
    println!("{header}");

    // Highest probability first; ties keep canonical order (stable sort).
    let mut entries: Vec<(&str, f32)> = outcome.distribution.iter().collect();
    entries.sort_by(|a, b| b.1.partial_cmp(&a.1).unwrap_or(std::cmp::Ordering::Equal));

    for (label, prob) in entries {
        let filled = (prob * BAR_WIDTH as f32).round() as usize;
        println!(
            "  {:<26} {:>5.1}%  {}",
            label,
            prob * 100.0,
            "#".repeat(filled.min(BAR_WIDTH))
        );
    }
    println!("  → {}", outcome.top_label);
    println!();
}

fn age_bin_display(bin: &str) -> (&'static str, &'static str) {
    AGE_BIN_DISPLAY
        .iter()
        .find(|(id, _, _)| *id == bin)
        .map(|(_, label, range)| (*label, *range))
        .unwrap_or(("Unknown", "-"))
}
