//! Raw scout lines.
//!
//! A scout line is the `;`-delimited record DataVolley writes for every
//! action or administrative marker. The decoder only needs a handful of the
//! fields, addressed by the indices in [`field`].

use anyhow::{Context, Result};
use csv::ReaderBuilder;
use std::io::Read;

/// Field indices of a scout line.
pub mod field {
    use std::ops::Range;

    pub const CODE: usize = 0;
    pub const POINT_PHASE: usize = 1;
    pub const ATTACK_PHASE: usize = 2;
    pub const START_COORDINATE: usize = 4;
    pub const MID_COORDINATE: usize = 5;
    pub const END_COORDINATE: usize = 6;
    pub const CLOCK_TIME: usize = 7;
    pub const SET_NUMBER: usize = 8;
    pub const HOME_SETTER_POSITION: usize = 9;
    pub const VISITING_SETTER_POSITION: usize = 10;
    pub const VIDEO_FILE: usize = 11;
    pub const VIDEO_TIME: usize = 12;
    pub const HOME_LINEUP: Range<usize> = 14..20;
    pub const VISITING_LINEUP: Range<usize> = 20..26;
}

/// One line of the scout section, already split into fields.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct RawLine {
    fields: Vec<String>,
}

impl RawLine {
    pub fn new(fields: Vec<String>) -> Self {
        Self { fields }
    }

    /// Split a single `;`-delimited line.
    pub fn parse(line: &str) -> Self {
        Self {
            fields: line
                .trim_end_matches(['\r', '\n'])
                .split(';')
                .map(|s| s.to_string())
                .collect(),
        }
    }

    /// Trimmed field contents, `None` when missing or empty.
    pub fn field(&self, idx: usize) -> Option<&str> {
        self.fields
            .get(idx)
            .map(|s| s.trim())
            .filter(|s| !s.is_empty())
    }

    /// The scouting code (field 0), empty string if absent.
    pub fn code(&self) -> &str {
        self.field(field::CODE).unwrap_or("")
    }

    pub fn fields(&self) -> &[String] {
        &self.fields
    }

    pub fn len(&self) -> usize {
        self.fields.len()
    }

    pub fn is_empty(&self) -> bool {
        self.fields.iter().all(|f| f.trim().is_empty())
    }

    /// Numeric field, `None` when absent or not a number.
    pub fn number<T: std::str::FromStr>(&self, idx: usize) -> Option<T> {
        self.field(idx).and_then(|s| s.parse().ok())
    }

    /// Six jersey numbers from a lineup range, `None` unless all six parse.
    pub fn lineup(&self, range: std::ops::Range<usize>) -> Option<[u8; 6]> {
        let mut players = [0u8; 6];
        if range.len() != 6 {
            return None;
        }
        for (slot, idx) in players.iter_mut().zip(range) {
            *slot = self.number(idx)?;
        }
        Some(players)
    }
}

impl From<&str> for RawLine {
    fn from(line: &str) -> Self {
        RawLine::parse(line)
    }
}

/// Read a scout section into raw lines.
///
/// Blank lines and `[3...]` section headers are skipped; every other line
/// becomes one [`RawLine`], in file order.
pub fn read_scout_lines<R: Read>(reader: R) -> Result<Vec<RawLine>> {
    let mut reader = ReaderBuilder::new()
        .delimiter(b';')
        .has_headers(false)
        .flexible(true)
        .quoting(false)
        .from_reader(reader);

    let mut lines = Vec::new();
    for (row_num, result) in reader.records().enumerate() {
        let record = result.with_context(|| format!("Failed to read scout line {}", row_num + 1))?;
        let fields: Vec<String> = record.iter().map(|s| s.to_string()).collect();
        let line = RawLine::new(fields);
        if line.is_empty() || line.code().starts_with('[') {
            continue;
        }
        lines.push(line);
    }
    Ok(lines)
}

#[cfg(test)]
mod tests {
    use super::*;

    const SAMPLE: &str = "*19SM#~~~71C~~~+1;s;;;7141;;3213;15.16.33;1;1;1;1;6;;19;8;10;17;15;14;5;12;4;7;3;11;";

    #[test]
    fn test_parse_fields() {
        let line = RawLine::parse(SAMPLE);
        assert_eq!(line.code(), "*19SM#~~~71C~~~+1");
        assert_eq!(line.field(field::POINT_PHASE), Some("s"));
        assert_eq!(line.field(field::ATTACK_PHASE), None);
        assert_eq!(line.field(field::START_COORDINATE), Some("7141"));
        assert_eq!(line.field(field::MID_COORDINATE), None);
        assert_eq!(line.number::<u8>(field::SET_NUMBER), Some(1));
        assert_eq!(line.number::<u32>(field::VIDEO_TIME), Some(6));
    }

    #[test]
    fn test_lineups() {
        let line = RawLine::parse(SAMPLE);
        assert_eq!(line.lineup(field::HOME_LINEUP), Some([19, 8, 10, 17, 15, 14]));
        assert_eq!(line.lineup(field::VISITING_LINEUP), Some([5, 12, 4, 7, 3, 11]));

        let short = RawLine::parse("*T;;;;;;;15.20.00;1");
        assert_eq!(short.lineup(field::HOME_LINEUP), None);
    }

    #[test]
    fn test_read_scout_lines_skips_headers_and_blanks() {
        let text = format!("[3SCOUT]\n{}\n\n*T;;;;;;;15.20.00;1\n", SAMPLE);
        let lines = read_scout_lines(text.as_bytes()).unwrap();
        assert_eq!(lines.len(), 2);
        assert_eq!(lines[1].code(), "*T");
    }
}
