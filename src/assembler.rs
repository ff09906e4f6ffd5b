//! Event assembly.
//!
//! Walks the scout lines of one match in order, decoding each code and
//! merging it with the running [`MatchState`]. Exactly one [`Event`] is
//! emitted per input line, including lines that fail to decode.

use chrono::NaiveTime;
use serde::Serialize;

use crate::coordinates::{self, Coordinate};
use crate::error::{DecodeError, SequenceError, TokenizeError, TransformError};
use crate::lookup::{self, PointOutcome};
use crate::raw_line::{field, RawLine};
use crate::roster::Rosters;
use crate::state::{ApplyOutcome, InitialState, MatchState, MatchStateView, StateChange, Team};
use crate::tokenizer::{self, ParsedCode, ScoutingCode};

/// Clock time layout on scout lines.
const CLOCK_FORMAT: &str = "%H.%M.%S";

/// Configuration for decoding a match
#[derive(Debug, Clone)]
pub struct DecodeConfig {
    /// Adopt the lineups carried on scout lines when none is known yet
    pub resync_lineups: bool,
    /// Flag play lines whose player is not one of the six on court
    pub check_lineup_membership: bool,
    /// Worker threads for batch decoding (`None` = rayon global pool)
    pub threads: Option<usize>,
}

impl Default for DecodeConfig {
    fn default() -> Self {
        Self {
            resync_lineups: true,
            check_lineup_membership: true,
            threads: None,
        }
    }
}

impl DecodeConfig {
    /// Trust only the seed: never read lineups from the lines, never flag
    /// off-court players.
    pub fn seed_only() -> Self {
        Self {
            resync_lineups: false,
            check_lineup_membership: false,
            threads: None,
        }
    }

    pub fn with_threads(mut self, threads: usize) -> Self {
        self.threads = Some(threads.max(1));
        self
    }

    pub fn without_lineup_check(mut self) -> Self {
        self.check_lineup_membership = false;
        self
    }
}

/// What kind of line produced an event.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub enum LineCategory {
    Play,
    Point,
    Substitution,
    Rotation,
    SetterOnCourt,
    Timeout,
    SetEnd,
    Other,
    /// The code could not be tokenized.
    Error,
}

impl LineCategory {
    fn of(parsed: &ParsedCode) -> Self {
        match parsed {
            ParsedCode::Play(_) => LineCategory::Play,
            ParsedCode::Point { .. } => LineCategory::Point,
            ParsedCode::Substitution { .. } => LineCategory::Substitution,
            ParsedCode::Rotation { .. } => LineCategory::Rotation,
            ParsedCode::SetterOnCourt { .. } => LineCategory::SetterOnCourt,
            ParsedCode::Timeout { .. } => LineCategory::Timeout,
            ParsedCode::SetEnd { .. } => LineCategory::SetEnd,
            ParsedCode::Other(_) => LineCategory::Other,
        }
    }

    pub fn is_admin(&self) -> bool {
        !matches!(self, LineCategory::Play | LineCategory::Error)
    }
}

/// One decoded scout line together with the match state at that line.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Event {
    pub match_id: String,
    /// 1-based position in the input sequence.
    pub line_number: usize,
    pub raw_code: String,
    pub category: LineCategory,

    pub team: Option<Team>,
    pub team_name: Option<String>,
    pub player_number: Option<u8>,
    pub player_name: Option<String>,
    pub player_id: Option<String>,

    pub skill_code: Option<char>,
    pub skill: Option<&'static str>,
    pub skill_type_code: Option<char>,
    pub skill_type: Option<&'static str>,
    pub evaluation_code: Option<char>,
    pub evaluation: Option<&'static str>,
    pub evaluation_description: Option<&'static str>,
    pub combination_code: Option<String>,
    pub attack_description: Option<String>,
    pub set_call_description: Option<String>,
    pub target_attack: Option<char>,
    pub set_target: Option<&'static str>,
    pub start_zone: Option<u8>,
    pub end_zone: Option<u8>,
    pub end_subzone: Option<char>,
    pub skill_subtype_code: Option<char>,
    pub skill_subtype: Option<&'static str>,
    pub num_players_code: Option<char>,
    pub num_players: Option<&'static str>,
    pub special_code: Option<char>,
    pub special: Option<&'static str>,
    pub custom_code: Option<String>,

    pub start_coordinate: Coordinate,
    pub mid_coordinate: Coordinate,
    pub end_coordinate: Coordinate,

    pub point_phase: Option<String>,
    pub attack_phase: Option<String>,
    pub clock_time: Option<NaiveTime>,
    /// Set number as written on the line.
    pub file_set_number: Option<u8>,
    pub video_file: Option<u16>,
    /// Seconds into the video.
    pub video_time: Option<u32>,

    /// State before a play line's point is applied, after an
    /// administrative line's change.
    pub state: MatchStateView,
    pub point_won_by: Option<Team>,

    pub unverified: bool,
    pub off_lineup: bool,
    pub error: Option<TokenizeError>,
    pub coordinate_errors: Vec<TransformError>,
    pub sequence_errors: Vec<SequenceError>,
}

impl Event {
    fn blank(
        match_id: &str,
        line_number: usize,
        line: &RawLine,
        category: LineCategory,
        state: MatchStateView,
    ) -> Self {
        Event {
            match_id: match_id.to_string(),
            line_number,
            raw_code: line.code().to_string(),
            category,
            team: None,
            team_name: None,
            player_number: None,
            player_name: None,
            player_id: None,
            skill_code: None,
            skill: None,
            skill_type_code: None,
            skill_type: None,
            evaluation_code: None,
            evaluation: None,
            evaluation_description: None,
            combination_code: None,
            attack_description: None,
            set_call_description: None,
            target_attack: None,
            set_target: None,
            start_zone: None,
            end_zone: None,
            end_subzone: None,
            skill_subtype_code: None,
            skill_subtype: None,
            num_players_code: None,
            num_players: None,
            special_code: None,
            special: None,
            custom_code: None,
            start_coordinate: Coordinate::NONE,
            mid_coordinate: Coordinate::NONE,
            end_coordinate: Coordinate::NONE,
            point_phase: line.field(field::POINT_PHASE).map(String::from),
            attack_phase: line.field(field::ATTACK_PHASE).map(String::from),
            clock_time: line
                .field(field::CLOCK_TIME)
                .and_then(|s| NaiveTime::parse_from_str(s, CLOCK_FORMAT).ok()),
            file_set_number: line.number(field::SET_NUMBER),
            video_file: line.number(field::VIDEO_FILE),
            video_time: line.number(field::VIDEO_TIME),
            state,
            point_won_by: None,
            unverified: false,
            off_lineup: false,
            error: None,
            coordinate_errors: Vec::new(),
            sequence_errors: Vec::new(),
        }
    }

    /// Any per-line problem at all.
    pub fn has_issues(&self) -> bool {
        self.error.is_some()
            || self.unverified
            || !self.coordinate_errors.is_empty()
            || !self.sequence_errors.is_empty()
    }
}

/// Single left-to-right pass over one match.
pub struct EventAssembler<'a> {
    match_id: String,
    rosters: &'a Rosters,
    config: &'a DecodeConfig,
    state: MatchState,
    line_number: usize,
}

impl<'a> EventAssembler<'a> {
    pub fn new(initial: &InitialState, rosters: &'a Rosters, config: &'a DecodeConfig) -> Self {
        Self {
            match_id: initial.match_id.clone(),
            rosters,
            config,
            state: MatchState::new(initial),
            line_number: 0,
        }
    }

    pub fn state(&self) -> &MatchState {
        &self.state
    }

    /// Decode the next line. Never fails: problems are flagged on the event.
    pub fn process_line(&mut self, line: &RawLine) -> Event {
        self.line_number += 1;
        let mut outcome = self.resync_lineups(line);

        let event = match tokenizer::tokenize_line(line) {
            Ok(ParsedCode::Play(code)) => self.play_event(line, &code, &mut outcome),
            Ok(parsed) => self.admin_event(line, &parsed, &mut outcome),
            Err(err) => {
                log::warn!(
                    "Match {} line {}: {}",
                    self.match_id,
                    self.line_number,
                    err
                );
                let mut event = self.event(line, LineCategory::Error, self.state.snapshot());
                event.error = Some(err);
                event
            }
        };
        self.finish(event, outcome)
    }

    fn event(&self, line: &RawLine, category: LineCategory, state: MatchStateView) -> Event {
        Event::blank(&self.match_id, self.line_number, line, category, state)
    }

    fn resync_lineups(&mut self, line: &RawLine) -> ApplyOutcome {
        if !self.config.resync_lineups || !self.state.awaiting_lineup() {
            return ApplyOutcome::default();
        }
        match (
            line.lineup(field::HOME_LINEUP),
            line.lineup(field::VISITING_LINEUP),
        ) {
            (Some(home), Some(visiting)) => {
                log::debug!(
                    "Match {} line {}: lineups {:?} / {:?}",
                    self.match_id,
                    self.line_number,
                    home,
                    visiting
                );
                let change = StateChange::Lineups {
                    home,
                    visiting,
                    home_setter_position: line.number(field::HOME_SETTER_POSITION),
                    visiting_setter_position: line.number(field::VISITING_SETTER_POSITION),
                };
                self.state.apply(&change, self.rosters)
            }
            _ => ApplyOutcome::default(),
        }
    }

    fn play_event(
        &mut self,
        line: &RawLine,
        code: &ScoutingCode,
        outcome: &mut ApplyOutcome,
    ) -> Event {
        let team = code.team_marker.team();
        if let Some(team) = team {
            if code.skill_code == 'S' {
                outcome.merge(self.state.apply(&StateChange::Serve { team }, self.rosters));
            }
            outcome.merge(self.state.apply(&StateChange::Touch { team }, self.rosters));
        }

        let snapshot = self.state.snapshot();
        let mut event = self.event(line, LineCategory::Play, snapshot);
        self.fill_play_fields(&mut event, code);

        if let (Some(team), Some(number)) = (team, code.player_number) {
            event.off_lineup = self.config.check_lineup_membership && {
                let lineup = event.state.lineup(team);
                lineup.is_complete() && !lineup.contains(number)
            };
        }

        if let Some(team) = team {
            if let Some(result) = lookup::point_outcome(code.skill_code, code.evaluation_code) {
                let winner = match result {
                    PointOutcome::Won => team,
                    PointOutcome::Lost => team.opponent(),
                };
                outcome.merge(self.state.apply(&StateChange::PointEnd { winner }, self.rosters));
            }
        }
        event
    }

    fn fill_play_fields(&self, event: &mut Event, code: &ScoutingCode) {
        let skill = code.skill_code;
        let team = code.team_marker.team();

        event.team = team;
        event.team_name = team.and_then(|t| self.rosters.team_name(t)).map(String::from);
        event.player_number = code.player_number;
        if let (Some(team), Some(number)) = (team, code.player_number) {
            match self.rosters.player(team, number) {
                Some(player) => {
                    event.player_name = player.full_name();
                    event.player_id = Some(player.player_id.clone());
                }
                None if self.rosters.has_roster(team) => log::debug!(
                    "Match {} line {}: {:?} player {} not on roster",
                    self.match_id,
                    self.line_number,
                    team,
                    number
                ),
                None => {}
            }
        }

        event.skill_code = Some(skill);
        event.skill = Some(lookup::skill_name(skill));
        event.skill_type_code = code.skill_type;
        event.skill_type = code.skill_type.map(|c| lookup::skill_type_name(skill, c));
        event.evaluation_code = Some(code.evaluation_code);
        event.evaluation = Some(lookup::evaluation_name(code.evaluation_code));
        event.evaluation_description = Some(lookup::evaluation_description(skill, code.evaluation_code));

        event.combination_code = code.combination_code.clone();
        if let Some(combo) = code.combination_code.as_deref() {
            match skill {
                'A' => {
                    event.attack_description = self
                        .rosters
                        .attack_combination(combo)
                        .map(|c| c.description.clone())
                }
                'E' => {
                    event.set_call_description = self
                        .rosters
                        .setter_call(combo)
                        .map(|c| c.description.clone())
                }
                _ => {}
            }
        }
        event.target_attack = code.target_attack;
        event.set_target = code.target_attack.map(lookup::set_target_name);
        event.start_zone = code.start_zone;
        event.end_zone = code.end_zone;
        event.end_subzone = code.end_subzone;
        event.skill_subtype_code = code.skill_subtype;
        event.skill_subtype = code.skill_subtype.map(|c| lookup::skill_subtype_name(skill, c));
        event.num_players_code = code.num_players;
        event.num_players = code.num_players.map(|c| lookup::num_players_name(skill, c));
        event.special_code = code.special_code;
        event.special = code.special_code.map(|c| lookup::special_code_name(skill, c));
        event.custom_code = code.custom_code.clone();

        let mut errors = Vec::new();
        event.start_coordinate = self.coordinate(code.start_coordinate_raw.as_deref(), &mut errors);
        event.mid_coordinate = self.coordinate(code.mid_coordinate_raw.as_deref(), &mut errors);
        event.end_coordinate = self.coordinate(code.end_coordinate_raw.as_deref(), &mut errors);
        event.coordinate_errors = errors;
    }

    fn coordinate(&self, raw: Option<&str>, errors: &mut Vec<TransformError>) -> Coordinate {
        let Some(raw) = raw else {
            return Coordinate::NONE;
        };
        coordinates::transform(raw).unwrap_or_else(|err| {
            log::warn!(
                "Match {} line {}: {}",
                self.match_id,
                self.line_number,
                err
            );
            errors.push(err);
            Coordinate::NONE
        })
    }

    fn admin_event(
        &mut self,
        line: &RawLine,
        parsed: &ParsedCode,
        outcome: &mut ApplyOutcome,
    ) -> Event {
        let (team, player, change) = match *parsed {
            ParsedCode::Point {
                team,
                home_score,
                visiting_score,
            } => (
                Some(team),
                None,
                Some(StateChange::PointMarker {
                    winner: team,
                    home_score,
                    visiting_score,
                }),
            ),
            ParsedCode::Substitution {
                team,
                player_out,
                player_in,
            } => (
                Some(team),
                Some(player_in),
                Some(StateChange::Substitution {
                    team,
                    player_out,
                    player_in,
                }),
            ),
            ParsedCode::Rotation {
                team,
                setter_position,
            } => (
                Some(team),
                None,
                Some(StateChange::Rotation {
                    team,
                    setter_position,
                }),
            ),
            ParsedCode::SetterOnCourt { team, player } => (
                Some(team),
                Some(player),
                Some(StateChange::SetterOnCourt { team, player }),
            ),
            ParsedCode::Timeout { team } => (Some(team), None, Some(StateChange::Timeout { team })),
            ParsedCode::SetEnd { set_number } => (
                None,
                None,
                Some(StateChange::SetEnd {
                    completed_set: set_number,
                }),
            ),
            ParsedCode::Play(_) | ParsedCode::Other(_) => (None, None, None),
        };

        if let Some(change) = change {
            outcome.merge(self.state.apply(&change, self.rosters));
        }

        let mut event = self.event(line, LineCategory::of(parsed), self.state.snapshot());
        event.team = team;
        event.team_name = team.and_then(|t| self.rosters.team_name(t)).map(String::from);
        event.player_number = player;
        if let (Some(team), Some(number)) = (team, player) {
            if let Some(p) = self.rosters.player(team, number) {
                event.player_name = p.full_name();
                event.player_id = Some(p.player_id.clone());
            }
        }
        event
    }

    fn finish(&self, mut event: Event, outcome: ApplyOutcome) -> Event {
        for err in &outcome.sequence_errors {
            log::warn!(
                "Match {} line {}: {}",
                self.match_id,
                self.line_number,
                err
            );
        }
        event.unverified = outcome.unverified;
        event.point_won_by = outcome.point_won_by;
        event.sequence_errors = outcome.sequence_errors;
        log::trace!("{:?}", event);
        event
    }
}

/// Decode every scout line of one match, in order.
///
/// Returns one event per line. Fails only when there are no lines at all.
pub fn process(
    lines: &[RawLine],
    initial: &InitialState,
    rosters: &Rosters,
    config: &DecodeConfig,
) -> Result<Vec<Event>, DecodeError> {
    if lines.is_empty() {
        return Err(DecodeError::EmptyMatch(initial.match_id.clone()));
    }
    let mut assembler = EventAssembler::new(initial, rosters, config);
    Ok(lines.iter().map(|line| assembler.process_line(line)).collect())
}
