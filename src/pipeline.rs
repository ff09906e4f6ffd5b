//! Pipeline functions for decoding whole matches.
//!
//! Wraps [`assembler::process`] with scout-section loading and per-match
//! summaries. Batches are sharded by match across rayon workers; lines
//! within a match are always decoded sequentially.

use anyhow::{Context, Result};
use rayon::prelude::*;
use serde::Serialize;
use std::collections::BTreeMap;
use std::fmt;
use std::fs::File;
use std::io::Read;
use std::path::Path;

use crate::assembler::{self, DecodeConfig, Event, LineCategory};
use crate::error::DecodeError;
use crate::raw_line::{read_scout_lines, RawLine};
use crate::roster::Rosters;
use crate::state::InitialState;

/// Everything needed to decode one match.
#[derive(Debug, Clone)]
pub struct MatchInput {
    pub initial: InitialState,
    pub rosters: Rosters,
    pub lines: Vec<RawLine>,
}

impl MatchInput {
    pub fn new(initial: InitialState, rosters: Rosters, lines: Vec<RawLine>) -> Self {
        Self {
            initial,
            rosters,
            lines,
        }
    }

    /// Read the scout lines from any reader.
    pub fn from_reader<R: Read>(initial: InitialState, rosters: Rosters, reader: R) -> Result<Self> {
        let lines = read_scout_lines(reader)
            .with_context(|| format!("Failed to read scout lines for match {}", initial.match_id))?;
        Ok(Self::new(initial, rosters, lines))
    }

    /// Read the scout lines from a file holding the scout section.
    pub fn from_path(initial: InitialState, rosters: Rosters, path: &Path) -> Result<Self> {
        let file = File::open(path)
            .with_context(|| format!("Failed to open scout file: {}", path.display()))?;
        Self::from_reader(initial, rosters, file)
    }

    pub fn match_id(&self) -> &str {
        &self.initial.match_id
    }
}

/// Final score of one set, taken from its last point marker.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct SetScore {
    pub set_number: u8,
    pub home: u8,
    pub visiting: u8,
}

/// Counts over one decoded match.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct DecodeSummary {
    pub match_id: String,
    pub lines: usize,
    pub plays: usize,
    pub admin: usize,
    pub errors: usize,
    pub unverified: usize,
    pub off_lineup: usize,
    pub coordinate_errors: usize,
    pub sequence_errors: usize,
    pub set_scores: Vec<SetScore>,
    /// Play count per skill name.
    pub skills: BTreeMap<String, usize>,
}

impl DecodeSummary {
    pub fn from_events(match_id: &str, events: &[Event]) -> Self {
        let mut summary = DecodeSummary {
            match_id: match_id.to_string(),
            lines: events.len(),
            ..Default::default()
        };

        for event in events {
            match event.category {
                LineCategory::Play => summary.plays += 1,
                LineCategory::Error => summary.errors += 1,
                _ => summary.admin += 1,
            }
            if event.unverified {
                summary.unverified += 1;
            }
            if event.off_lineup {
                summary.off_lineup += 1;
            }
            summary.coordinate_errors += event.coordinate_errors.len();
            summary.sequence_errors += event.sequence_errors.len();

            if let Some(skill) = event.skill {
                *summary.skills.entry(skill.to_string()).or_default() += 1;
            }

            if event.category == LineCategory::Point {
                let score = SetScore {
                    set_number: event.state.set_number,
                    home: event.state.home_score,
                    visiting: event.state.visiting_score,
                };
                match summary.set_scores.last_mut() {
                    Some(last) if last.set_number == score.set_number => *last = score,
                    _ => summary.set_scores.push(score),
                }
            }
        }
        summary
    }

    /// Sets won by (home, visiting), counting only decided sets.
    pub fn sets_won(&self) -> (usize, usize) {
        let home = self.set_scores.iter().filter(|s| s.home > s.visiting).count();
        let visiting = self.set_scores.iter().filter(|s| s.visiting > s.home).count();
        (home, visiting)
    }
}

impl fmt::Display for DecodeSummary {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(
            f,
            "Match {}: {} lines ({} plays, {} admin, {} errors)",
            self.match_id, self.lines, self.plays, self.admin, self.errors
        )?;
        writeln!(
            f,
            "  Issues: {} unverified, {} off lineup, {} coordinate, {} sequence",
            self.unverified, self.off_lineup, self.coordinate_errors, self.sequence_errors
        )?;
        for set in &self.set_scores {
            writeln!(f, "  Set {}: {}-{}", set.set_number, set.home, set.visiting)?;
        }
        for (skill, count) in &self.skills {
            writeln!(f, "  {:<10} {}", skill, count)?;
        }
        Ok(())
    }
}

/// Events and summary for one match.
#[derive(Debug, Clone, Serialize)]
pub struct MatchDecode {
    pub match_id: String,
    pub events: Vec<Event>,
    pub summary: DecodeSummary,
}

/// Decode one match.
pub fn decode_match(input: &MatchInput, config: &DecodeConfig) -> Result<MatchDecode, DecodeError> {
    let events = assembler::process(&input.lines, &input.initial, &input.rosters, config)?;
    let summary = DecodeSummary::from_events(input.match_id(), &events);
    log::info!(
        "Decoded match {}: {} events, {} errors, {} sequence issues",
        summary.match_id,
        summary.lines,
        summary.errors,
        summary.sequence_errors
    );
    Ok(MatchDecode {
        match_id: input.match_id().to_string(),
        events,
        summary,
    })
}

/// Decode many matches in parallel, one worker per match.
///
/// Results come back in input order. A failed match does not affect the
/// others.
pub fn decode_matches(
    inputs: &[MatchInput],
    config: &DecodeConfig,
) -> Vec<Result<MatchDecode, DecodeError>> {
    let run = || -> Vec<Result<MatchDecode, DecodeError>> {
        inputs
            .par_iter()
            .map(|input| decode_match(input, config))
            .collect()
    };

    let results = match config.threads {
        Some(n) => match rayon::ThreadPoolBuilder::new().num_threads(n).build() {
            Ok(pool) => pool.install(run),
            Err(e) => {
                log::warn!("Could not build {}-thread pool ({}), using global pool", n, e);
                run()
            }
        },
        None => run(),
    };

    let failed = results.iter().filter(|r| r.is_err()).count();
    log::info!(
        "Decoded {} matches ({} failed)",
        results.len() - failed,
        failed
    );
    results
}
