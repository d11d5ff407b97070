//! CLI for comparing two faces.
//!
//! Usage:
//!   face-congruence a.json b.json                     # Human-readable output
//!   face-congruence a.json b.json --json              # JSON output
//!   face-congruence a.json b.json -o result.json      # Save to file
//!   face-congruence a.json b.json --calibration c.json

use clap::Parser;
use face_congruence::{
    Calibration, ComparisonResult, FaceComparator, FaceInput, ScoredRegion, ToleranceMode,
};
use std::path::{Path, PathBuf};
use tracing::{debug, info};

#[derive(Parser, Debug)]
#[command(name = "face-congruence")]
#[command(author, version, about = "Morphological face comparison", long_about = None)]
struct Args {
    /// First face (landmark JSON)
    #[arg(required = true)]
    face_a: PathBuf,

    /// Second face (landmark JSON)
    #[arg(required = true)]
    face_b: PathBuf,

    /// Calibration file (.json, or the binary format otherwise)
    #[arg(long)]
    calibration: Option<PathBuf>,

    /// Output as JSON
    #[arg(short, long)]
    json: bool,

    /// Output file (default: stdout)
    #[arg(short, long)]
    output: Option<PathBuf>,

    /// Ignore tolerances and score raw differences
    #[arg(long)]
    no_tolerance: bool,

    /// Show debug logging
    #[arg(short, long)]
    verbose: bool,
}

fn main() {
    let args = Args::parse();

    let default_filter = if args.verbose {
        "face_congruence=debug"
    } else {
        "face_congruence=info"
    };
    tracing_subscriber::fmt()
        .with_env_filter(
            std::env::var("FACE_CONGRUENCE_LOG").unwrap_or_else(|_| default_filter.into()),
        )
        .with_writer(std::io::stderr)
        .init();

    if let Err(e) = run(&args) {
        eprintln!("Error: {}", e);
        std::process::exit(1);
    }
}

fn run(args: &Args) -> Result<(), Box<dyn std::error::Error>> {
    let calibration = match &args.calibration {
        Some(path) => {
            debug!(path = %path.display(), "loading calibration");
            Calibration::load(path)?
        }
        None => Calibration::default(),
    };

    let mode = if args.no_tolerance {
        ToleranceMode::Disabled
    } else {
        ToleranceMode::Stepped
    };
    let comparator = FaceComparator::with_mode(calibration, mode);

    let a = read_face(&args.face_a)?;
    let b = read_face(&args.face_b)?;
    let result = comparator.compare(&a, &b)?;

    let output_str = if args.json {
        serde_json::to_string_pretty(&result)?
    } else {
        format_human_readable(&result)
    };

    if let Some(ref path) = args.output {
        std::fs::write(path, &output_str)?;
        info!(path = %path.display(), "output written");
    } else {
        println!("{}", output_str);
    }

    Ok(())
}

fn read_face(path: &Path) -> Result<FaceInput, Box<dyn std::error::Error>> {
    debug!(path = %path.display(), "reading face");
    let text = std::fs::read_to_string(path)?;
    Ok(serde_json::from_str(&text)?)
}

fn format_human_readable(result: &ComparisonResult) -> String {
    let mut s = String::new();

    s.push_str(&format!(
        "Congruence: {:.1}%\n",
        result.congruence_score * 100.0
    ));
    if result.age_penalty > 0.0 {
        s.push_str(&format!(
            "  (raw {:.1}%, age penalty {:.1}%)\n",
            result.raw_congruence * 100.0,
            result.age_penalty * 100.0
        ));
    }
    s.push_str(&format!("Scoring: {:?}\n", result.mode));

    s.push_str("\nPose:\n");
    for (label, pose) in [("A", &result.pose_a), ("B", &result.pose_b)] {
        s.push_str(&format!(
            "  {}: yaw {:.1}, pitch {:.1}, roll {:.1} (confidence {:.1})\n",
            label, pose.yaw, pose.pitch, pose.roll, pose.confidence
        ));
    }
    if let Some(w) = &result.pose_warning {
        s.push_str(&format!(
            "  Warning: non-frontal pose, disparity {:.1} degrees\n",
            w.disparity
        ));
    }

    s.push_str("\nRegions:\n");
    for r in &result.region_scores {
        let name = match r.region {
            ScoredRegion::Feature(region) => region.to_string(),
            ScoredRegion::Mask(region) => format!("{:?}", region).to_lowercase(),
        };
        s.push_str(&format!("  {:<12} {:.1}%\n", name, r.score * 100.0));
    }

    s.push_str("\nAxes:\n");
    for feature in &result.comparisons {
        for c in &feature.axes {
            let marker = if c.agreement { "=" } else { "≠" };
            s.push_str(&format!(
                "  {:<24} {:>10} {} {:<10} {:.0}%\n",
                c.axis.to_string(),
                c.value_a,
                marker,
                c.value_b,
                c.similarity * 100.0
            ));
        }
    }

    let summary = &result.agreement_summary;
    if !summary.similar.is_empty() {
        let names: Vec<String> = summary.similar.iter().map(|r| r.to_string()).collect();
        s.push_str(&format!("\nSimilar: {}\n", names.join(", ")));
    }
    if !summary.different.is_empty() {
        let names: Vec<String> = summary.different.iter().map(|r| r.to_string()).collect();
        s.push_str(&format!("Different: {}\n", names.join(", ")));
    }

    s
}
