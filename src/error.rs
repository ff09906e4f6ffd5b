//! Error taxonomy for scout decoding.
//!
//! Everything here except [`DecodeError`] is non-fatal: per-line and
//! per-field errors are carried on the emitted event instead of aborting
//! the match.

use serde::Serialize;
use thiserror::Error;

use crate::state::Team;

/// A scouting code that could not be split into its fixed-position tokens.
#[derive(Debug, Clone, PartialEq, Eq, Error, Serialize)]
pub enum TokenizeError {
    #[error("empty scouting code")]
    Empty,
    #[error("play code '{code}' is {len} characters, need at least {min}")]
    MalformedLength { code: String, len: usize, min: usize },
    #[error("malformed administrative code '{0}'")]
    MalformedAdmin(String),
}

/// A raw coordinate block that is not a 4-character grid index or sentinel.
#[derive(Debug, Clone, PartialEq, Eq, Error, Serialize)]
pub enum TransformError {
    #[error("coordinate '{raw}' is {len} characters, expected 4")]
    MalformedLength { raw: String, len: usize },
    #[error("coordinate '{0}' is not a grid index")]
    InvalidDigits(String),
}

/// The line sequence broke an expected invariant. Reported on the event,
/// never corrected by the decoder.
#[derive(Debug, Clone, PartialEq, Eq, Error, Serialize)]
pub enum SequenceError {
    #[error("point marker score {marker_home}:{marker_visiting} is below tracked {home}:{visiting}")]
    ScoreDecreased {
        home: u8,
        visiting: u8,
        marker_home: u8,
        marker_visiting: u8,
    },
    #[error("point marker score {marker_home}:{marker_visiting} disagrees with tracked {home}:{visiting}")]
    ScoreMismatch {
        home: u8,
        visiting: u8,
        marker_home: u8,
        marker_visiting: u8,
    },
    #[error("rally already won by {decided:?}, line claims {claimed:?}")]
    ConflictingOutcome { decided: Team, claimed: Team },
    #[error("{actual:?} served while {expected:?} held serve")]
    UnexpectedServer { expected: Team, actual: Team },
    #[error("substitution: player {player} is not on court for {team:?}")]
    PlayerNotOnCourt { team: Team, player: u8 },
}

/// Hard failures of a whole match decode.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum DecodeError {
    #[error("match {0} has no scout lines")]
    EmptyMatch(String),
}
