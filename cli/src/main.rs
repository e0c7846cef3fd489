//! facematch — face verification checker CLI.
//!
//! Compares two face images and prints exactly one JSON object to stdout:
//! either the full outcome record or `{"error": ...}`. Logging goes to
//! stderr and is silenced below `warn` unless `RUST_LOG` is set, so stdout
//! stays machine-parseable.
//!
//! Usage:
//!   facematch <image1> <image2>                 # lenient profile
//!   facematch <image1> <image2> --strict        # strict profile
//!   facematch <image1> <image2> --threshold 0.6 --metric euclidean_l2
//!
//! Exit codes follow the two-tier error model: preflight failures (bad
//! arguments, missing/empty/undecodable files, bad config) exit non-zero;
//! failures caught during model invocation still exit 0 and signal only
//! through the JSON body. Callers must inspect the body, not just the code.

use std::path::PathBuf;

use clap::error::ErrorKind;
use clap::Parser;
use tracing::debug;
use tracing_subscriber::EnvFilter;

use facematch_contracts::{FacematchError, FacematchResult, MatchReport, VerifyOptions, VerifyOutcome};
use facematch_engine::{preflight, DistanceMetric, FaceVerifier};
use facematch_model::{FacenetBackend, ModelConfig, ModelKind};

mod config;

use config::{RunConfig, VerifySection};

// ── CLI definition ────────────────────────────────────────────────────────────

/// Compare two face images and report whether they show the same person.
#[derive(Parser)]
#[command(
    name = "facematch",
    version,
    about = "Face verification checker",
    long_about = "Compares the faces in two images and prints a one-line JSON verdict.\n\
                  The default (lenient) profile tolerates undetected faces and relaxes\n\
                  the decision threshold to 0.85; --strict requires a detected face and\n\
                  reports the model's own threshold."
)]
struct Cli {
    /// First image, e.g. the ID document photo.
    image1: PathBuf,

    /// Second image, e.g. the selfie.
    image2: PathBuf,

    /// Strict profile: a face must be detected in both images and the
    /// model's default threshold is reported unchanged.
    #[arg(long)]
    strict: bool,

    /// Override the decision threshold (wins over profile and config file).
    #[arg(long)]
    threshold: Option<f32>,

    /// Distance metric: cosine, euclidean, or euclidean_l2.
    #[arg(long)]
    metric: Option<DistanceMetric>,

    /// TOML run configuration file.
    #[arg(long)]
    config: Option<PathBuf>,

    /// Safetensors weights file (wins over config file and FACEMATCH_WEIGHTS).
    #[arg(long)]
    weights: Option<PathBuf>,

    /// Embedding model variant: Facenet or Facenet512.
    #[arg(long)]
    model: Option<ModelKind>,

    /// Use the deterministic stub backend (no weights required).
    #[arg(long)]
    stub: bool,
}

// ── Entry point ───────────────────────────────────────────────────────────────

fn main() {
    // Structured logging on stderr; stdout carries only the JSON report.
    // The quiet default filter is what suppresses backend log noise.
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")),
        )
        .with_target(false)
        .with_writer(std::io::stderr)
        .compact()
        .init();

    let cli = match Cli::try_parse() {
        Ok(cli) => cli,
        Err(e) => match e.kind() {
            ErrorKind::DisplayHelp | ErrorKind::DisplayVersion => e.exit(),
            ErrorKind::MissingRequiredArgument => fail(&FacematchError::MissingArguments),
            _ => fail(&FacematchError::ConfigError {
                reason: e.to_string().trim().to_string(),
            }),
        },
    };

    match run(cli) {
        Ok(outcome) => {
            println!("{}", MatchReport::from(outcome).to_json_line());
        }
        Err(e) => fail(&e),
    }
}

/// Print the error record and exit with the tier's code.
fn fail(error: &FacematchError) -> ! {
    println!("{}", MatchReport::from_error(error.to_string()).to_json_line());
    std::process::exit(exit_code(error));
}

/// Preflight failures exit 1; invocation failures are reported through the
/// JSON body alone and exit 0 (the inherited contract — see DESIGN.md).
fn exit_code(error: &FacematchError) -> i32 {
    if error.is_preflight() {
        1
    } else {
        0
    }
}

// ── Pipeline wiring ───────────────────────────────────────────────────────────

fn run(cli: Cli) -> FacematchResult<VerifyOutcome> {
    let file = match &cli.config {
        Some(path) => RunConfig::from_file(path)?,
        None => RunConfig::default(),
    };

    let options = resolve_options(cli.strict, cli.threshold, &file.verify);
    let metric = cli
        .metric
        .or(file.verify.metric)
        .unwrap_or(DistanceMetric::Cosine);
    debug!(
        strict_detection = options.strict_detection,
        threshold_override = ?options.threshold_override,
        %metric,
        "resolved verification options"
    );

    preflight::check_inputs(&cli.image1, &cli.image2, options.deep_preflight)?;

    let model_config = resolve_model_config(
        file.model,
        cli.weights.clone(),
        cli.model,
        cli.stub,
    );
    let backend = FacenetBackend::load(model_config)?;
    let verifier = FaceVerifier::new(Box::new(backend.clone()), Box::new(backend), metric);
    verifier.verify_pair(&cli.image1, &cli.image2, &options)
}

/// Profile first, then config-file knobs, then explicit flags.
fn resolve_options(strict: bool, threshold: Option<f32>, file: &VerifySection) -> VerifyOptions {
    let mut options = if strict {
        VerifyOptions::strict()
    } else {
        VerifyOptions::lenient()
    };
    if let Some(strict_detection) = file.strict_detection {
        options.strict_detection = strict_detection;
    }
    if file.threshold_override.is_some() {
        options.threshold_override = file.threshold_override;
    }
    if threshold.is_some() {
        options.threshold_override = threshold;
    }
    options
}

/// Config-file model settings, then the env var for a missing weights path,
/// then explicit flags.
fn resolve_model_config(
    mut config: ModelConfig,
    weights: Option<PathBuf>,
    model: Option<ModelKind>,
    stub: bool,
) -> ModelConfig {
    if config.weights_path.as_os_str().is_empty() {
        config.weights_path = ModelConfig::from_env().weights_path;
    }
    if let Some(weights) = weights {
        config.weights_path = weights;
    }
    if let Some(model) = model {
        config.model = model;
    }
    if stub {
        config.testing_stub = true;
    }
    config
}

#[cfg(test)]
mod tests {
    use super::*;
    use facematch_contracts::LENIENT_THRESHOLD;

    #[test]
    fn default_invocation_resolves_to_the_lenient_profile() {
        let options = resolve_options(false, None, &VerifySection::default());
        assert_eq!(options, VerifyOptions::lenient());
        assert_eq!(options.threshold_override, Some(LENIENT_THRESHOLD));
    }

    #[test]
    fn strict_flag_resolves_to_the_strict_profile() {
        let options = resolve_options(true, None, &VerifySection::default());
        assert_eq!(options, VerifyOptions::strict());
    }

    #[test]
    fn explicit_threshold_beats_profile_and_config() {
        let file = VerifySection {
            threshold_override: Some(0.5),
            ..Default::default()
        };
        let options = resolve_options(false, Some(0.7), &file);
        assert_eq!(options.threshold_override, Some(0.7));

        // Without the flag, the config file wins over the profile.
        let options = resolve_options(false, None, &file);
        assert_eq!(options.threshold_override, Some(0.5));
    }

    #[test]
    fn config_file_can_flip_detection_strictness() {
        let file = VerifySection {
            strict_detection: Some(true),
            ..Default::default()
        };
        let options = resolve_options(false, None, &file);
        assert!(options.strict_detection);
        // The preflight depth still follows the profile picked on the CLI.
        assert!(options.deep_preflight);
    }

    #[test]
    fn model_flags_override_config_values() {
        let config = resolve_model_config(
            ModelConfig::new("/from/config.safetensors"),
            Some(PathBuf::from("/from/flag.safetensors")),
            Some(ModelKind::Facenet512),
            true,
        );
        assert_eq!(
            config.weights_path.to_str().unwrap(),
            "/from/flag.safetensors"
        );
        assert_eq!(config.model, ModelKind::Facenet512);
        assert!(config.testing_stub);
    }

    #[test]
    fn exit_codes_follow_the_two_tiers() {
        assert_eq!(exit_code(&FacematchError::MissingArguments), 1);
        assert_eq!(exit_code(&FacematchError::FilesNotFound), 1);
        assert_eq!(
            exit_code(&FacematchError::EmptyFile { size1: 0, size2: 9 }),
            1
        );
        // Caught invocation errors report through the JSON body only.
        assert_eq!(
            exit_code(&FacematchError::ModelLoad {
                reason: "weights missing".into()
            }),
            0
        );
        assert_eq!(
            exit_code(&FacematchError::NoFaceDetected { path: "a.png".into() }),
            0
        );
    }
}
