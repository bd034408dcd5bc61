// src/instructions.rs
//
// User-facing guidance printed around the download. Each block is built as a
// String so it can be checked without capturing stdout.

use std::fmt::Write;

use crate::config::{DATA_DIR, UCI_FILE_NAME};
use crate::dataset::TARGET_COLUMN;
use crate::fetch::{DirStatus, FetchOutcome};

const RULE_WIDTH: usize = 60;

static KAGGLE_DATASET_URL: &str = "https://www.kaggle.com/datasets/litvinenko630/insurance-claims";
pub const KAGGLE_FILE_NAME: &str = "insurance_claims.csv";
pub const NOTEBOOK_NAME: &str = "insurance_loss_ratio_prediction.ipynb";

fn rule() -> String {
    "=".repeat(RULE_WIDTH)
}

/// Section title framed by rules, preceded by a blank line.
fn section(title: &str) -> String {
    format!("\n{}\n{}\n{}\n", rule(), title, rule())
}

pub fn banner() -> String {
    format!("{}\nINSURANCE DATASET DOWNLOADER\n{}\n", rule(), rule())
}

pub fn dir_status(status: DirStatus) -> String {
    match status {
        DirStatus::Created => format!("✓ Created '{}' directory\n", DATA_DIR),
        DirStatus::AlreadyExists => format!("✓ '{}' directory already exists\n", DATA_DIR),
    }
}

pub fn fetch_header() -> String {
    let mut out = String::from("\nAttempting automatic downloads...\n");
    out.push_str(&section("Downloading UCI Automobile Insurance Dataset..."));
    out
}

pub fn fetch_report(outcome: &FetchOutcome) -> String {
    let mut out = String::new();
    match outcome {
        FetchOutcome::Saved(summary) => {
            let _ = writeln!(out, "✓ Downloaded {} records", summary.rows);
            let _ = writeln!(out, "✓ Saved to: {}", summary.path.display());
            let _ = writeln!(out, "  Features: {}", summary.columns);
            let _ = writeln!(out, "  Target: '{}' (similar to loss ratio)", TARGET_COLUMN);
        }
        FetchOutcome::Failed(failure) => {
            let _ = writeln!(out, "✗ Error downloading: {}", failure);
        }
    }
    out
}

/// Manual steps for the Kaggle dataset, which needs an account to download.
pub fn kaggle_instructions() -> String {
    let mut out = section("Kaggle Insurance Claims Dataset");
    out.push_str("\nThis dataset requires a Kaggle account.\n");
    out.push_str("\nSteps to download:\n");
    let _ = writeln!(out, "1. Go to: {}", KAGGLE_DATASET_URL);
    out.push_str("2. Click 'Download' button\n");
    let _ = writeln!(
        out,
        "3. Extract and save as: {}/{}",
        DATA_DIR, KAGGLE_FILE_NAME
    );
    out.push_str("\nDataset info:\n");
    out.push_str("  - 1,000 insurance policies\n");
    out.push_str("  - 40 features (driver, vehicle, policy, claims)\n");
    out.push_str("  - Perfect for loss ratio prediction\n");
    out
}

pub fn next_steps() -> String {
    let mut out = section("Next Steps");
    out.push_str("\n1. If you downloaded UCI Automobile data:\n");
    let _ = writeln!(out, "   - Open {}", NOTEBOOK_NAME);
    out.push_str("   - Find 'Step 1: Setup and Data Loading'\n");
    out.push_str("   - Uncomment and use:\n");
    let _ = writeln!(
        out,
        "     df = pd.read_csv('{}/{}')",
        DATA_DIR,
        UCI_FILE_NAME
    );
    out.push_str("\n2. If you downloaded Kaggle data:\n");
    let _ = writeln!(out, "   - Place CSV in {}/ folder", DATA_DIR);
    out.push_str("   - Modify notebook to load it\n");
    out.push_str("\n3. Run all cells in order\n");
    out.push_str("\n4. Model training takes ~5-10 minutes\n");
    out
}

pub fn summary(success: bool) -> String {
    let line = if success {
        "✓ Setup complete! You can now run the notebook."
    } else {
        "⚠ Some downloads failed. Check instructions above."
    };
    format!("\n{}\n{}\n{}\n", rule(), line, rule())
}
