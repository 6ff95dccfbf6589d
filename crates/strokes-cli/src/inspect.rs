#![forbid(unsafe_code)]

//! One-shot inspection commands: match, thresholds, validate, demo-registry.

use std::io::Write;
use std::path::PathBuf;

use clap::Args;
use serde_json::json;
use strokes_core::matcher::{self, MatcherConfig};
use strokes_core::{GestureRegistry, Pattern, Sensitivity, Vector};

use crate::cli::RecognizerArgs;
use crate::error::{CliError, Result};

#[derive(Debug, Clone, Args)]
pub struct MatchArgs {
    /// Direction vectors as `x,y;x,y;...` (screen coordinates, +y down).
    pub pattern: String,

    #[command(flatten)]
    pub recognizer: RecognizerArgs,

    /// Only consider gestures for this many fingers.
    #[arg(long)]
    pub fingers: Option<u8>,

    #[arg(long)]
    pub json: bool,
}

#[derive(Debug, Clone, Args)]
pub struct ThresholdsArgs {
    /// Sensitivity in [-3, 3].
    #[arg(long, allow_negative_numbers = true, default_value_t = 0.0)]
    pub sensitivity: f64,
}

#[derive(Debug, Clone, Args)]
pub struct ValidateArgs {
    /// Gesture registry to check.
    #[arg(long)]
    pub gestures: PathBuf,
}

/// Parse `x,y;x,y` into a pattern, rejecting zero-length vectors.
pub fn parse_pattern(s: &str) -> Result<Pattern> {
    s.split(';')
        .map(str::trim)
        .filter(|part| !part.is_empty())
        .map(|part| {
            let (x, y) = part
                .split_once(',')
                .ok_or_else(|| CliError::invalid(format!("expected `x,y`, got {part:?}")))?;
            let parse = |v: &str| {
                v.trim()
                    .parse::<f64>()
                    .map_err(|_| CliError::invalid(format!("not a number: {v:?}")))
            };
            let v = Vector::new(parse(x)?, parse(y)?);
            if v.normalize().is_none() {
                return Err(CliError::invalid(format!("zero-length vector: {part:?}")));
            }
            Ok(v)
        })
        .collect::<Result<Vec<_>>>()
        .map(Pattern::new)
}

pub fn run_match(args: MatchArgs, out: &mut dyn Write) -> Result<()> {
    let candidate = parse_pattern(&args.pattern)?;
    if candidate.is_empty() {
        return Err(CliError::invalid("pattern has no vectors"));
    }
    let registry = args.recognizer.registry()?;
    let config = args.recognizer.config()?.matcher_config();

    // Nearest regardless of threshold, for diagnostics.
    let nearest_config = MatcherConfig {
        acceptance_threshold: f64::INFINITY,
        ..config
    };
    let nearest = matcher::closest_gesture(&candidate, registry.iter(), args.fingers, &nearest_config);
    let accepted = nearest.filter(|m| m.distance < config.acceptance_threshold);

    if args.json {
        let body = json!({
            "matched": accepted.map(|m| m.gesture.id.as_str()),
            "action": accepted.map(|m| m.gesture.action.to_string()),
            "nearest": nearest.map(|m| m.gesture.id.as_str()),
            "distance": nearest.map(|m| m.distance),
            "threshold": config.acceptance_threshold,
        });
        writeln!(out, "{body}")?;
        return Ok(());
    }

    match (accepted, nearest) {
        (Some(m), _) => writeln!(
            out,
            "{}  action={}  distance={:.4}",
            m.gesture.id, m.gesture.action, m.distance
        )?,
        (None, Some(n)) => writeln!(
            out,
            "no match (nearest: {}, distance={:.4}, threshold={})",
            n.gesture.id, n.distance, config.acceptance_threshold
        )?,
        (None, None) => writeln!(out, "no match (no eligible gestures)")?,
    }
    Ok(())
}

pub fn run_thresholds(args: ThresholdsArgs, out: &mut dyn Write) -> Result<()> {
    if !(Sensitivity::MIN..=Sensitivity::MAX).contains(&args.sensitivity) {
        return Err(CliError::invalid(format!(
            "sensitivity must be within [{}, {}], got {}",
            Sensitivity::MIN,
            Sensitivity::MAX,
            args.sensitivity
        )));
    }
    let s = Sensitivity::new(args.sensitivity);
    writeln!(out, "sensitivity          = {s}")?;
    writeln!(out, "difference_threshold = {:.3}", s.difference_threshold())?;
    writeln!(out, "distance_threshold   = {:.1}", s.distance_threshold())?;
    Ok(())
}

pub fn run_validate(args: ValidateArgs, out: &mut dyn Write) -> Result<()> {
    let registry = GestureRegistry::from_json_file(&args.gestures)?;
    let problems = registry.validate();
    let enabled = registry.enabled().count();
    writeln!(
        out,
        "{} gesture(s), {enabled} enabled, {} problem(s)",
        registry.len(),
        problems.len()
    )?;
    for problem in &problems {
        writeln!(out, "  - {problem}")?;
    }
    if problems.is_empty() {
        Ok(())
    } else {
        Err(CliError::RegistryProblems {
            count: problems.len(),
        })
    }
}

pub fn run_demo_registry(out: &mut dyn Write) -> Result<()> {
    writeln!(out, "{}", GestureRegistry::demo().to_json_string()?)?;
    Ok(())
}
