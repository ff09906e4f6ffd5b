//! DataVolley scout decoder
//!
//! Turns the scout section of a DataVolley `.dvw` file into rally-by-rally
//! event records, threading score, rotation, serve and lineups across lines.
//!
//! This library provides:
//! - `raw_line`: `;`-delimited scout lines and their field layout
//! - `tokenizer`: fixed-position scouting code grammar
//! - `lookup`: static skill/evaluation vocabularies
//! - `coordinates`: court grid to court-unit transform
//! - `roster`: team, player, attack combination and setter call tables
//! - `state`: per-match state tracker
//! - `assembler`: the single-pass event assembler
//! - `pipeline`: match and batch decoding with summaries

pub mod assembler;
pub mod coordinates;
pub mod error;
pub mod lookup;
pub mod pipeline;
pub mod raw_line;
pub mod roster;
pub mod state;
pub mod tokenizer;

pub use assembler::{process, DecodeConfig, Event, EventAssembler, LineCategory};
pub use coordinates::{transform, Coordinate};
pub use error::{DecodeError, SequenceError, TokenizeError, TransformError};
pub use lookup::{evaluation_name, skill_name};
pub use pipeline::{decode_match, decode_matches, DecodeSummary, MatchDecode, MatchInput};
pub use raw_line::{read_scout_lines, RawLine};
pub use roster::{Player, Rosters};
pub use state::{InitialState, Lineup, MatchState, MatchStateView, Team};
pub use tokenizer::{tokenize, ParsedCode, ScoutingCode};
