//! Command-line interface for the `formcheck` binary.
//!
//! # Usage
//!
//! ```bash
//! # Stream newline-delimited JSON frames from a pose estimator
//! pose-estimator | formcheck watch --exercise plank
//!
//! # Classify a single snapshot
//! formcheck classify snapshot.json
//!
//! # Print coaching instructions
//! formcheck instructions push-up
//! ```

use clap::{Parser, Subcommand};
use formcheck_core::{Landmark, PoseSnapshot};
use formcheck_form::FormSession;
use serde::Deserialize;
use std::io::{BufRead, Write};
use std::path::PathBuf;

use crate::error::ApiResult;
use crate::service::FormService;

/// FormCheck Command Line Interface
#[derive(Parser, Debug)]
#[command(name = "formcheck")]
#[command(author, version, about = "Exercise form analysis from pose landmarks")]
#[command(propagate_version = true)]
pub struct Cli {
    /// Configuration file (TOML, YAML or JSON)
    #[arg(short, long, global = true)]
    pub config: Option<String>,

    /// Command to execute
    #[command(subcommand)]
    pub command: Commands,
}

/// Top-level commands
#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Validate a live feed of frames read from stdin
    Watch {
        /// Exercise to start with (defaults to the configured one)
        #[arg(short, long)]
        exercise: Option<String>,
    },

    /// Classify the exercise shown in a snapshot file
    Classify {
        /// JSON array of 33 landmarks
        path: PathBuf,
    },

    /// Print steps, tips and common mistakes for an exercise
    Instructions {
        exercise: String,
    },
}

/// One line of `watch` input
#[derive(Debug, Clone, Deserialize)]
#[serde(untagged)]
pub enum WatchInput {
    Command(WatchCommand),
    Frame(WatchFrame),
}

/// `{"command": "exercise", "name": "plank"}` or `{"command": "rep"}`
#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct WatchCommand {
    pub command: String,
    #[serde(default)]
    pub name: Option<String>,
}

/// `{"landmarks": [...]}`, or `{"landmarks": null}` when nobody was detected.
/// The key is required so a misspelled frame is not read as "no pose".
#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct WatchFrame {
    #[serde(deserialize_with = "Option::deserialize")]
    pub landmarks: Option<Vec<Landmark>>,
}

/// Counters reported when a feed ends
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct WatchSummary {
    pub frames: usize,
    pub skipped: usize,
}

/// Drive `session` from newline-delimited JSON on `input`, writing one JSON
/// update per processed frame to `output`. Unreadable lines and frames whose
/// geometry cannot be measured are skipped with a warning.
pub fn watch<R: BufRead, W: Write>(
    service: &FormService,
    session: &mut FormSession,
    input: R,
    mut output: W,
) -> ApiResult<WatchSummary> {
    let mut summary = WatchSummary::default();

    for (line_no, line) in input.lines().enumerate() {
        let line = line?;
        if line.trim().is_empty() {
            continue;
        }

        let parsed: WatchInput = match serde_json::from_str(&line) {
            Ok(parsed) => parsed,
            Err(e) => {
                tracing::warn!("Skipping line {}: {}", line_no + 1, e);
                summary.skipped += 1;
                continue;
            }
        };

        match parsed {
            WatchInput::Command(WatchCommand { command, name }) => {
                match (command.as_str(), name) {
                    ("exercise", Some(name)) => session.set_exercise(&name),
                    ("rep", _) => {
                        let reps = session.complete_rep();
                        tracing::debug!("Rep {} of {}", reps, session.current_exercise());
                    }
                    (other, _) => {
                        tracing::warn!("Ignoring command {:?} on line {}", other, line_no + 1)
                    }
                }
            }
            WatchInput::Frame(WatchFrame { landmarks }) => {
                let snapshot = match landmarks.as_deref().map(PoseSnapshot::from_landmarks) {
                    Some(Ok(snapshot)) => Some(snapshot),
                    Some(Err(e)) => {
                        tracing::warn!("Skipping frame on line {}: {}", line_no + 1, e);
                        summary.skipped += 1;
                        continue;
                    }
                    None => None,
                };

                match service.process_frame(session, snapshot.as_ref()) {
                    Ok(update) => {
                        let json =
                            serde_json::to_string(&update).map_err(formcheck_core::Error::from)?;
                        writeln!(output, "{}", json)?;
                        summary.frames += 1;
                    }
                    Err(e) => {
                        tracing::warn!("Skipping frame on line {}: {}", line_no + 1, e);
                        summary.skipped += 1;
                    }
                }
            }
        }
    }

    output.flush()?;
    Ok(summary)
}

#[cfg(test)]
mod tests {
    use super::*;
    use formcheck_core::JointId;

    fn plank_line() -> String {
        let snapshot = PoseSnapshot::default()
            .with_joint(JointId::LeftShoulder, Landmark::at(0.3, 0.5))
            .with_joint(JointId::LeftElbow, Landmark::at(0.3, 0.65))
            .with_joint(JointId::LeftWrist, Landmark::at(0.42, 0.65))
            .with_joint(JointId::LeftHip, Landmark::at(0.5, 0.5))
            .with_joint(JointId::LeftKnee, Landmark::at(0.65, 0.5))
            .with_joint(JointId::LeftAnkle, Landmark::at(0.8, 0.5));
        let landmarks: Vec<Landmark> = snapshot.into();
        serde_json::json!({ "landmarks": landmarks }).to_string()
    }

    fn run(input: &str) -> (WatchSummary, Vec<serde_json::Value>, FormSession) {
        let service = FormService::default();
        let mut session = service.new_session();
        let mut output = Vec::new();
        let summary = watch(&service, &mut session, input.as_bytes(), &mut output).unwrap();
        let updates = String::from_utf8(output)
            .unwrap()
            .lines()
            .map(|l| serde_json::from_str(l).unwrap())
            .collect();
        (summary, updates, session)
    }

    #[test]
    fn test_cli_parses_watch() {
        let cli = Cli::parse_from(["formcheck", "watch", "--exercise", "plank"]);
        assert!(matches!(
            cli.command,
            Commands::Watch { exercise: Some(ref e) } if e == "plank"
        ));
    }

    #[test]
    fn test_watch_commands_and_frames() {
        let input = format!(
            "{}\n{}\n{}\n{}\n",
            r#"{"command": "exercise", "name": "plank"}"#,
            r#"{"command": "rep"}"#,
            plank_line(),
            r#"{"landmarks": null}"#,
        );
        let (summary, updates, session) = run(&input);

        assert_eq!(summary, WatchSummary { frames: 2, skipped: 0 });
        assert_eq!(session.current_exercise(), "plank");
        assert_eq!(updates[0]["exercise"], "plank");
        assert_eq!(updates[0]["rep_count"], 1);
        assert_eq!(updates[0]["feedback"]["is_correct"], true);
        assert_eq!(updates[1]["feedback"]["is_correct"], false);
        assert!(updates[1]["angles"].is_null());
    }

    #[test]
    fn test_watch_skips_bad_lines() {
        let input = format!(
            "not json\n{}\n\n{}\n",
            r#"{"landmarks": [{"x": 0.1, "y": 0.2}]}"#,
            plank_line(),
        );
        let (summary, updates, _) = run(&input);
        assert_eq!(summary, WatchSummary { frames: 1, skipped: 2 });
        assert_eq!(updates.len(), 1);
    }

    #[test]
    fn test_watch_skips_malformed_objects() {
        let input = format!(
            "{}\n{}\n{}\n{}\n{}\n",
            r#"{"landmark": []}"#,
            r#"{"command": 5}"#,
            r#"{}"#,
            r#"{"command": "rep", "extra": true}"#,
            r#"{"landmarks": null}"#,
        );
        let (summary, updates, session) = run(&input);
        assert_eq!(summary, WatchSummary { frames: 1, skipped: 4 });
        assert_eq!(updates.len(), 1);
        assert_eq!(session.rep_count(), 0);
    }

    #[test]
    fn test_watch_skips_degenerate_frames() {
        let zeros: Vec<Landmark> = PoseSnapshot::default().into();
        let input = serde_json::json!({ "landmarks": zeros }).to_string();
        let (summary, updates, _) = run(&input);
        assert_eq!(summary, WatchSummary { frames: 0, skipped: 1 });
        assert!(updates.is_empty());
    }
}
