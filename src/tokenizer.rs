//! Scouting code tokenizer.
//!
//! Play codes are fixed-position: each sub-token sits at a known offset, so
//! extraction is driven by the [`offsets`] table rather than delimiters.
//! Administrative codes (point markers, substitutions, rotations, timeouts,
//! set ends) are short and have their own grammar, matched by regex.

use lazy_static::lazy_static;
use regex::Regex;
use serde::Serialize;

use crate::error::TokenizeError;
use crate::raw_line::{field, RawLine};
use crate::state::Team;

/// Character offsets of the play code sub-tokens.
pub mod offsets {
    use std::ops::Range;

    pub const TEAM: usize = 0;
    pub const PLAYER: Range<usize> = 1..3;
    pub const SKILL: usize = 3;
    pub const SKILL_TYPE: usize = 4;
    pub const EVALUATION: usize = 5;
    pub const COMBINATION: Range<usize> = 6..8;
    pub const TARGET: usize = 8;
    pub const START_ZONE: usize = 9;
    pub const END_ZONE: usize = 10;
    pub const END_SUBZONE: usize = 11;
    pub const SKILL_SUBTYPE: usize = 12;
    pub const NUM_PLAYERS: usize = 13;
    pub const SPECIAL: usize = 14;
    pub const CUSTOM: usize = 15;
}

/// Shortest play code: team, player, skill, type and evaluation.
pub const MIN_PLAY_LEN: usize = offsets::EVALUATION + 1;

/// Filler characters meaning "no value at this position".
const PLACEHOLDERS: &[char] = &['~', ' '];

lazy_static! {
    static ref PLAY_PREFIX: Regex = Regex::new(r"^.(\d\d|\$\$)").unwrap();
    static ref POINT: Regex = Regex::new(r"^p(\d{1,2}):(\d{1,2})$").unwrap();
    static ref SUBSTITUTION: Regex = Regex::new(r"^c(\d{1,2}):(\d{1,2})$").unwrap();
    static ref ROTATION: Regex = Regex::new(r"^z(\d)$").unwrap();
    static ref SETTER: Regex = Regex::new(r"^P(\d{1,2})$").unwrap();
    static ref TIMEOUT: Regex = Regex::new(r"^T$").unwrap();
    static ref SET_END: Regex = Regex::new(r"^\*\*(\d)set$").unwrap();
}

/// Leading team sigil.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum TeamMarker {
    Home,
    Visiting,
    Unknown,
}

impl TeamMarker {
    pub fn from_sigil(c: char) -> Self {
        match c {
            '*' => TeamMarker::Home,
            'a' => TeamMarker::Visiting,
            _ => TeamMarker::Unknown,
        }
    }

    pub fn team(&self) -> Option<Team> {
        match self {
            TeamMarker::Home => Some(Team::Home),
            TeamMarker::Visiting => Some(Team::Visiting),
            TeamMarker::Unknown => None,
        }
    }
}

/// Decoded structure of a play code.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ScoutingCode {
    pub team_marker: TeamMarker,
    /// `None` for team-level codes (`$$`).
    pub player_number: Option<u8>,
    pub skill_code: char,
    pub skill_type: Option<char>,
    pub evaluation_code: char,
    /// Attack combination for attacks, setter call for sets.
    pub combination_code: Option<String>,
    pub target_attack: Option<char>,
    pub start_zone: Option<u8>,
    pub end_zone: Option<u8>,
    pub end_subzone: Option<char>,
    pub skill_subtype: Option<char>,
    pub num_players: Option<char>,
    pub special_code: Option<char>,
    pub custom_code: Option<String>,
    pub start_coordinate_raw: Option<String>,
    pub mid_coordinate_raw: Option<String>,
    pub end_coordinate_raw: Option<String>,
}

/// What a code line turned out to be.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub enum ParsedCode {
    Play(ScoutingCode),
    Point {
        team: Team,
        home_score: u8,
        visiting_score: u8,
    },
    Substitution {
        team: Team,
        player_out: u8,
        player_in: u8,
    },
    Rotation {
        team: Team,
        setter_position: u8,
    },
    SetterOnCourt {
        team: Team,
        player: u8,
    },
    Timeout {
        team: Team,
    },
    SetEnd {
        set_number: u8,
    },
    /// Administrative code with no decoder meaning; passed through.
    Other(String),
}

/// Split one scouting code into its tokens.
pub fn tokenize(raw_code: &str) -> Result<ParsedCode, TokenizeError> {
    let code = raw_code.trim();
    if code.is_empty() {
        return Err(TokenizeError::Empty);
    }

    if let Some(caps) = SET_END.captures(code) {
        return Ok(ParsedCode::SetEnd {
            set_number: parse_small(&caps[1], code)?,
        });
    }

    if PLAY_PREFIX.is_match(code) {
        return tokenize_play(code).map(ParsedCode::Play);
    }

    let mut chars = code.chars();
    let marker = chars.next().map(TeamMarker::from_sigil);
    let team = match marker.and_then(|m| m.team()) {
        Some(team) => team,
        None => return Ok(ParsedCode::Other(code.to_string())),
    };
    tokenize_admin(team, chars.as_str(), code)
}

/// Tokenize a whole scout line, attaching its coordinate blocks to plays.
pub fn tokenize_line(line: &RawLine) -> Result<ParsedCode, TokenizeError> {
    let mut parsed = tokenize(line.code())?;
    if let ParsedCode::Play(code) = &mut parsed {
        code.start_coordinate_raw = line.field(field::START_COORDINATE).map(String::from);
        code.mid_coordinate_raw = line.field(field::MID_COORDINATE).map(String::from);
        code.end_coordinate_raw = line.field(field::END_COORDINATE).map(String::from);
    }
    Ok(parsed)
}

fn tokenize_play(code: &str) -> Result<ScoutingCode, TokenizeError> {
    let chars: Vec<char> = code.chars().collect();
    if chars.len() < MIN_PLAY_LEN {
        return Err(TokenizeError::MalformedLength {
            code: code.to_string(),
            len: chars.len(),
            min: MIN_PLAY_LEN,
        });
    }

    let at = |idx: usize| chars.get(idx).copied().filter(|c| !PLACEHOLDERS.contains(c));
    let span = |range: std::ops::Range<usize>| {
        let s: String = chars
            .get(range)
            .unwrap_or(&[])
            .iter()
            .filter(|c| !PLACEHOLDERS.contains(*c))
            .collect();
        if s.is_empty() {
            None
        } else {
            Some(s)
        }
    };
    let zone = |idx: usize| {
        at(idx)
            .and_then(|c| c.to_digit(10))
            .filter(|d| (1..=9).contains(d))
            .map(|d| d as u8)
    };

    let player: String = chars[offsets::PLAYER].iter().collect();
    let custom: String = chars.iter().skip(offsets::CUSTOM).collect();
    let custom = custom.trim_end();

    Ok(ScoutingCode {
        team_marker: TeamMarker::from_sigil(chars[offsets::TEAM]),
        player_number: player.parse().ok(),
        skill_code: chars[offsets::SKILL],
        skill_type: at(offsets::SKILL_TYPE),
        evaluation_code: chars[offsets::EVALUATION],
        combination_code: span(offsets::COMBINATION),
        target_attack: at(offsets::TARGET),
        start_zone: zone(offsets::START_ZONE),
        end_zone: zone(offsets::END_ZONE),
        end_subzone: at(offsets::END_SUBZONE),
        skill_subtype: at(offsets::SKILL_SUBTYPE),
        num_players: at(offsets::NUM_PLAYERS),
        special_code: at(offsets::SPECIAL),
        custom_code: if custom.is_empty() {
            None
        } else {
            Some(custom.to_string())
        },
        start_coordinate_raw: None,
        mid_coordinate_raw: None,
        end_coordinate_raw: None,
    })
}

fn tokenize_admin(team: Team, rest: &str, code: &str) -> Result<ParsedCode, TokenizeError> {
    if let Some(caps) = POINT.captures(rest) {
        return Ok(ParsedCode::Point {
            team,
            home_score: parse_small(&caps[1], code)?,
            visiting_score: parse_small(&caps[2], code)?,
        });
    }
    if let Some(caps) = SUBSTITUTION.captures(rest) {
        return Ok(ParsedCode::Substitution {
            team,
            player_out: parse_small(&caps[1], code)?,
            player_in: parse_small(&caps[2], code)?,
        });
    }
    if let Some(caps) = ROTATION.captures(rest) {
        let setter_position = parse_small(&caps[1], code)?;
        if !(1..=6).contains(&setter_position) {
            return Err(TokenizeError::MalformedAdmin(code.to_string()));
        }
        return Ok(ParsedCode::Rotation {
            team,
            setter_position,
        });
    }
    if let Some(caps) = SETTER.captures(rest) {
        return Ok(ParsedCode::SetterOnCourt {
            team,
            player: parse_small(&caps[1], code)?,
        });
    }
    if TIMEOUT.is_match(rest) {
        return Ok(ParsedCode::Timeout { team });
    }
    Ok(ParsedCode::Other(code.to_string()))
}

fn parse_small(digits: &str, code: &str) -> Result<u8, TokenizeError> {
    digits
        .parse()
        .map_err(|_| TokenizeError::MalformedAdmin(code.to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn play(code: &str) -> ScoutingCode {
        match tokenize(code).unwrap() {
            ParsedCode::Play(c) => c,
            other => panic!("expected play, got {:?}", other),
        }
    }

    #[test]
    fn test_serve_code() {
        let c = play("*19SM#~~~71C~~~+1");
        assert_eq!(c.team_marker, TeamMarker::Home);
        assert_eq!(c.player_number, Some(19));
        assert_eq!(c.skill_code, 'S');
        assert_eq!(c.skill_type, Some('M'));
        assert_eq!(c.evaluation_code, '#');
        assert_eq!(c.combination_code, None);
        assert_eq!(c.target_attack, None);
        assert_eq!(c.start_zone, Some(7));
        assert_eq!(c.end_zone, Some(1));
        assert_eq!(c.end_subzone, Some('C'));
        assert_eq!(c.skill_subtype, None);
        assert_eq!(c.custom_code.as_deref(), Some("+1"));
    }

    #[test]
    fn test_reception_code() {
        let c = play("a01RM=~~~51CM~~-1B");
        assert_eq!(c.team_marker, TeamMarker::Visiting);
        assert_eq!(c.player_number, Some(1));
        assert_eq!(c.skill_code, 'R');
        assert_eq!(c.evaluation_code, '=');
        assert_eq!(c.start_zone, Some(5));
        assert_eq!(c.end_zone, Some(1));
        assert_eq!(c.skill_subtype, Some('M'));
        assert_eq!(c.custom_code.as_deref(), Some("-1B"));
    }

    #[test]
    fn test_attack_with_combination() {
        let c = play("*08AH#V5F44BH2S");
        assert_eq!(c.combination_code.as_deref(), Some("V5"));
        assert_eq!(c.target_attack, Some('F'));
        assert_eq!(c.start_zone, Some(4));
        assert_eq!(c.end_zone, Some(4));
        assert_eq!(c.end_subzone, Some('B'));
        assert_eq!(c.skill_subtype, Some('H'));
        assert_eq!(c.num_players, Some('2'));
        assert_eq!(c.special_code, Some('S'));
        assert_eq!(c.custom_code, None);
    }

    #[test]
    fn test_minimal_and_short_play_codes() {
        let c = play("a05D~+");
        assert_eq!(c.evaluation_code, '+');
        assert_eq!(c.skill_type, None);

        assert!(matches!(
            tokenize("*19S"),
            Err(TokenizeError::MalformedLength { len: 4, min: 6, .. })
        ));
    }

    #[test]
    fn test_team_level_code() {
        let c = play("*$$&H#");
        assert_eq!(c.player_number, None);
        assert_eq!(c.skill_code, '&');
    }

    #[test]
    fn test_unknown_sigil_play() {
        let c = play("x07AH+");
        assert_eq!(c.team_marker, TeamMarker::Unknown);
        assert_eq!(c.player_number, Some(7));
    }

    #[test]
    fn test_admin_codes() {
        assert_eq!(
            tokenize("*p25:23").unwrap(),
            ParsedCode::Point {
                team: Team::Home,
                home_score: 25,
                visiting_score: 23
            }
        );
        assert_eq!(
            tokenize("ac05:12").unwrap(),
            ParsedCode::Substitution {
                team: Team::Visiting,
                player_out: 5,
                player_in: 12
            }
        );
        assert_eq!(
            tokenize("*z3").unwrap(),
            ParsedCode::Rotation {
                team: Team::Home,
                setter_position: 3
            }
        );
        assert_eq!(
            tokenize("aP11").unwrap(),
            ParsedCode::SetterOnCourt {
                team: Team::Visiting,
                player: 11
            }
        );
        assert_eq!(
            tokenize("*T").unwrap(),
            ParsedCode::Timeout { team: Team::Home }
        );
        assert_eq!(
            tokenize("**2set").unwrap(),
            ParsedCode::SetEnd { set_number: 2 }
        );
    }

    #[test]
    fn test_admin_edge_cases() {
        assert_eq!(tokenize(""), Err(TokenizeError::Empty));
        assert_eq!(tokenize("   "), Err(TokenizeError::Empty));
        assert!(matches!(
            tokenize("*z7"),
            Err(TokenizeError::MalformedAdmin(_))
        ));
        assert_eq!(tokenize("*q"), Ok(ParsedCode::Other("*q".to_string())));
        assert_eq!(tokenize("xT"), Ok(ParsedCode::Other("xT".to_string())));
    }

    #[test]
    fn test_tokenize_line_attaches_coordinates() {
        let line = RawLine::parse("*19SM#~~~71C~~~+1;s;;;7141;;-1-1;15.16.33;1");
        match tokenize_line(&line).unwrap() {
            ParsedCode::Play(c) => {
                assert_eq!(c.start_coordinate_raw.as_deref(), Some("7141"));
                assert_eq!(c.mid_coordinate_raw, None);
                assert_eq!(c.end_coordinate_raw.as_deref(), Some("-1-1"));
            }
            other => panic!("expected play, got {:?}", other),
        }
    }
}
