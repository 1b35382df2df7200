mod display;

use std::path::PathBuf;

use anyhow::Context;
use clap::{Parser, Subcommand};

use persona_ai::{LinearClassifier, PersonaPredictor, ProbabilisticClassifier};
use persona_core::Attribute;

#[derive(Parser)]
#[command(name = "persona", version, about = "Consumer persona inference for fragrance descriptions")]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Predict persona attributes for a free-text fragrance description.
    Predict {
        /// The fragrance description to classify.
        text: String,

        /// Directory containing model.onnx and tokenizer.json.
        #[arg(long, env = "PERSONA_MODEL_DIR", default_value = "models/all-mpnet-base-v2")]
        model_dir: PathBuf,

        /// Directory containing the <attribute>_clf.json artifacts.
        #[arg(long, env = "PERSONA_ARTIFACT_DIR", default_value = "models")]
        artifact_dir: PathBuf,

        /// Emit the full result as JSON instead of a card.
        #[arg(long)]
        json: bool,
    },

    /// Print each classifier's canonical label set.
    Labels {
        /// Directory containing the <attribute>_clf.json artifacts.
        #[arg(long, env = "PERSONA_ARTIFACT_DIR", default_value = "models")]
        artifact_dir: PathBuf,
    },
}

fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt::init();
    tracing::debug!("persona v{}", env!("CARGO_PKG_VERSION"));

    let cli = Cli::parse();
    match cli.command {
        Command::Predict {
            text,
            model_dir,
            artifact_dir,
            json,
        } => {
            let predictor = PersonaPredictor::load(&model_dir, &artifact_dir)
                .context("loading persona predictor")?;
            let result = predictor.predict(&text).context("running prediction")?;

            if json {
                println!("{}", serde_json::to_string_pretty(&result)?);
            } else {
                display::print_prediction_card(&text, &result);
            }
        }
        Command::Labels { artifact_dir } => {
            for attr in Attribute::ALL {
                let path = artifact_dir.join(attr.artifact_file());
                let clf = LinearClassifier::load(&path)
                    .with_context(|| format!("loading {} artifact", attr))?;
                println!("{:<12} {}", attr.as_str(), clf.labels().join(", "));
            }
        }
    }

    Ok(())
}
