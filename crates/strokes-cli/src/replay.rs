#![forbid(unsafe_code)]

//! Replay a recorded pointer trace through a capture session.
//!
//! A trace is either a JSON array or JSON lines of records:
//!
//! ```json
//! {"t_ms": 0,  "event": {"type": "touch_move", "touches": [{"x": 10, "y": 10}]}}
//! {"t_ms": 16, "event": {"type": "touch_end"}}
//! ```
//!
//! `t_ms` is optional; missing timestamps advance one 16ms frame from the
//! previous record. Blank lines and lines starting with `#` are skipped.

use std::io::Write;
use std::path::{Path, PathBuf};
use std::time::{Duration, Instant};

use clap::Args;
use serde::{Deserialize, Serialize};
use strokes_core::exclusion::ExclusionList;
use strokes_core::{CaptureSession, PointerEvent, SessionEvent};

use crate::cli::RecognizerArgs;
use crate::error::{CliError, Result};

const FRAME_MS: u64 = 16;

#[derive(Debug, Clone, Args)]
pub struct ReplayArgs {
    /// Recorded trace (JSON lines or JSON array).
    pub trace: PathBuf,

    #[command(flatten)]
    pub recognizer: RecognizerArgs,

    /// Exclusion list (JSON array of {id, domain, path?}).
    #[arg(long, requires = "domain")]
    pub exclusions: Option<PathBuf>,

    /// Page domain the trace was recorded on.
    #[arg(long)]
    pub domain: Option<String>,

    /// Page path the trace was recorded on.
    #[arg(long = "path")]
    pub page_path: Option<String>,

    /// Emit one JSON object per line.
    #[arg(long)]
    pub json: bool,
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct TraceRecord {
    #[serde(default)]
    pub t_ms: Option<u64>,
    pub event: PointerEvent,
}

#[derive(Debug, Serialize)]
#[serde(tag = "event", rename_all = "snake_case")]
enum ReplayLine<'a> {
    Change {
        t_ms: u64,
        gesture: Option<&'a str>,
    },
    Release {
        t_ms: u64,
        gesture: Option<&'a str>,
        action: Option<String>,
        segments: usize,
        duration_ms: u64,
    },
    Cancelled {
        t_ms: u64,
    },
    Summary {
        records: usize,
        releases: usize,
        matched: usize,
        cancelled: usize,
    },
    Excluded {
        domain: &'a str,
        path: Option<&'a str>,
        entry: &'a str,
    },
}

impl ReplayLine<'_> {
    fn to_text(&self) -> String {
        match self {
            Self::Change { t_ms, gesture } => {
                format!("{t_ms:>7}ms  change   {}", gesture.unwrap_or("-"))
            }
            Self::Release {
                t_ms,
                gesture,
                action,
                segments,
                duration_ms,
            } => format!(
                "{t_ms:>7}ms  release  {} [{}] segments={segments} duration={duration_ms}ms",
                gesture.unwrap_or("-"),
                action.as_deref().unwrap_or("no action"),
            ),
            Self::Cancelled { t_ms } => format!("{t_ms:>7}ms  cancelled"),
            Self::Summary {
                records,
                releases,
                matched,
                cancelled,
            } => format!(
                "replayed {records} record(s): {releases} release(s), {matched} matched, {cancelled} cancelled"
            ),
            Self::Excluded {
                domain,
                path,
                entry,
            } => format!(
                "recognition disabled for {domain}{} (exclusion {entry})",
                path.unwrap_or("")
            ),
        }
    }
}

fn emit(out: &mut dyn Write, json: bool, line: &ReplayLine<'_>) -> Result<()> {
    if json {
        writeln!(out, "{}", serde_json::to_string(line)?)?;
    } else {
        writeln!(out, "{}", line.to_text())?;
    }
    Ok(())
}

/// Timestamp of a record: its own `t_ms`, else one frame after the previous.
fn record_time(previous: Option<u64>, t_ms: Option<u64>) -> u64 {
    match (t_ms, previous) {
        (Some(t), _) => t,
        (None, None) => 0,
        (None, Some(p)) => p.saturating_add(FRAME_MS),
    }
}

/// Parse a trace document.
pub fn parse_trace(content: &str) -> Result<Vec<TraceRecord>> {
    if content.trim_start().starts_with('[') {
        return Ok(serde_json::from_str(content)?);
    }
    content
        .lines()
        .enumerate()
        .filter(|(_, l)| {
            let l = l.trim();
            !l.is_empty() && !l.starts_with('#')
        })
        .map(|(i, l)| {
            serde_json::from_str(l).map_err(|source| CliError::Trace { line: i + 1, source })
        })
        .collect()
}

pub fn load_trace(path: &Path) -> Result<Vec<TraceRecord>> {
    parse_trace(&std::fs::read_to_string(path)?)
}

pub fn run_replay(args: ReplayArgs, out: &mut dyn Write) -> Result<()> {
    if let (Some(list_path), Some(domain)) = (&args.exclusions, &args.domain) {
        let list: ExclusionList = serde_json::from_str(&std::fs::read_to_string(list_path)?)?;
        if let Some(entry) = list.find(domain, args.page_path.as_deref()) {
            tracing::info!(%domain, entry = %entry.id, "page excluded, skipping replay");
            return emit(
                out,
                args.json,
                &ReplayLine::Excluded {
                    domain: domain.as_str(),
                    path: args.page_path.as_deref(),
                    entry: &entry.id,
                },
            );
        }
    }

    let registry = args.recognizer.registry()?;
    let config = args.recognizer.config()?;
    let trace = load_trace(&args.trace)?;
    tracing::info!(
        records = trace.len(),
        gestures = registry.len(),
        sensitivity = config.sensitivity.value(),
        "replaying trace"
    );

    let mut session = CaptureSession::new(registry, config);
    let t0 = Instant::now();
    let mut previous = None;
    let (mut releases, mut matched, mut cancelled) = (0usize, 0usize, 0usize);

    for (i, record) in trace.iter().enumerate() {
        let t_ms = record_time(previous, record.t_ms);
        previous = Some(t_ms);
        let now = t0
            .checked_add(Duration::from_millis(t_ms))
            .ok_or_else(|| {
                CliError::invalid(format!("record {}: t_ms {t_ms} is out of range", i + 1))
            })?;
        let Some(event) = session.handle(&record.event, now) else {
            continue;
        };
        let line = match &event {
            SessionEvent::Change(g) => ReplayLine::Change {
                t_ms,
                gesture: g.as_ref().map(|g| g.id.as_str()),
            },
            SessionEvent::Release {
                gesture,
                segments,
                duration,
            } => {
                releases += 1;
                matched += usize::from(gesture.is_some());
                ReplayLine::Release {
                    t_ms,
                    gesture: gesture.as_ref().map(|g| g.id.as_str()),
                    action: gesture.as_ref().map(|g| g.action.to_string()),
                    segments: *segments,
                    duration_ms: u64::try_from(duration.as_millis()).unwrap_or(u64::MAX),
                }
            }
            SessionEvent::Cancelled => {
                cancelled += 1;
                ReplayLine::Cancelled { t_ms }
            }
        };
        emit(out, args.json, &line)?;
    }

    emit(
        out,
        args.json,
        &ReplayLine::Summary {
            records: trace.len(),
            releases,
            matched,
            cancelled,
        },
    )
}
