//! Match state tracking.
//!
//! One [`MatchState`] lives for the duration of a single match decode. Scout
//! lines rarely repeat what earlier lines implied, so score, rotation,
//! serve and lineups are carried here and advanced one line at a time.

use serde::{Deserialize, Serialize};

use crate::error::SequenceError;
use crate::roster::Rosters;

/// One side of the net.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Team {
    Home,
    Visiting,
}

impl Team {
    pub fn opponent(self) -> Team {
        match self {
            Team::Home => Team::Visiting,
            Team::Visiting => Team::Home,
        }
    }

    fn idx(self) -> usize {
        match self {
            Team::Home => 0,
            Team::Visiting => 1,
        }
    }
}

/// Jersey numbers in rotational positions 1..=6.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
pub struct Lineup([Option<u8>; 6]);

impl Lineup {
    pub fn new(players: [u8; 6]) -> Self {
        Lineup(players.map(Some))
    }

    pub fn is_complete(&self) -> bool {
        self.0.iter().all(|p| p.is_some())
    }

    /// Player in a 1-based court position.
    pub fn player_at(&self, position: usize) -> Option<u8> {
        position
            .checked_sub(1)
            .and_then(|i| self.0.get(i).copied().flatten())
    }

    /// 1-based court position of a player.
    pub fn position_of(&self, player: u8) -> Option<usize> {
        self.0.iter().position(|p| *p == Some(player)).map(|i| i + 1)
    }

    pub fn contains(&self, player: u8) -> bool {
        self.position_of(player).is_some()
    }

    pub fn players(&self) -> [Option<u8>; 6] {
        self.0
    }

    /// Single clockwise step: position n takes the player from n+1, and the
    /// player leaving position 1 moves to position 6.
    pub fn rotate(&mut self) {
        self.0.rotate_left(1);
    }

    /// Swap `player_out` for `player_in` in place. Returns false, leaving
    /// the lineup untouched, when `player_out` is not on court.
    pub fn substitute(&mut self, player_out: u8, player_in: u8) -> bool {
        match self.0.iter_mut().find(|p| **p == Some(player_out)) {
            Some(slot) => {
                *slot = Some(player_in);
                true
            }
            None => false,
        }
    }
}

/// Rotation counter after one side-out (6 wraps to 1).
pub fn next_rotation(rotation: u8) -> u8 {
    rotation % 6 + 1
}

/// DataVolley setter position after one side-out: 1 -> 6 -> 5 ... -> 2 -> 1.
pub fn next_setter_position(position: u8) -> u8 {
    if position <= 1 {
        6
    } else {
        position - 1
    }
}

/// Seed for one match, supplied by the header-parsing collaborator.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct InitialState {
    pub match_id: String,
    pub set_number: u8,
    pub home_score: u8,
    pub visiting_score: u8,
    pub home_rotation: u8,
    pub visiting_rotation: u8,
    pub home_setter_position: Option<u8>,
    pub visiting_setter_position: Option<u8>,
    pub home_lineup: Option<[u8; 6]>,
    pub visiting_lineup: Option<[u8; 6]>,
    pub serving_team: Option<Team>,
}

impl Default for InitialState {
    fn default() -> Self {
        Self {
            match_id: String::new(),
            set_number: 1,
            home_score: 0,
            visiting_score: 0,
            home_rotation: 1,
            visiting_rotation: 1,
            home_setter_position: None,
            visiting_setter_position: None,
            home_lineup: None,
            visiting_lineup: None,
            serving_team: None,
        }
    }
}

impl InitialState {
    pub fn new(match_id: &str) -> Self {
        Self {
            match_id: match_id.to_string(),
            ..Default::default()
        }
    }

    pub fn with_lineups(mut self, home: [u8; 6], visiting: [u8; 6]) -> Self {
        self.home_lineup = Some(home);
        self.visiting_lineup = Some(visiting);
        self
    }

    pub fn with_rotations(mut self, home: u8, visiting: u8) -> Self {
        self.home_rotation = home;
        self.visiting_rotation = visiting;
        self
    }

    pub fn with_setter_positions(mut self, home: u8, visiting: u8) -> Self {
        self.home_setter_position = Some(home);
        self.visiting_setter_position = Some(visiting);
        self
    }

    pub fn with_serving_team(mut self, team: Team) -> Self {
        self.serving_team = Some(team);
        self
    }

    pub fn with_score(mut self, home: u8, visiting: u8) -> Self {
        self.home_score = home;
        self.visiting_score = visiting;
        self
    }
}

/// A state-changing occurrence, derived from one scout line.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StateChange {
    /// A serve opens a new rally.
    Serve { team: Team },
    /// Any play by `team`; a change of team starts a new possession.
    Touch { team: Team },
    /// A play line decided the rally.
    PointEnd { winner: Team },
    /// Explicit point marker with the score after the point.
    PointMarker {
        winner: Team,
        home_score: u8,
        visiting_score: u8,
    },
    Substitution {
        team: Team,
        player_out: u8,
        player_in: u8,
    },
    Rotation { team: Team, setter_position: u8 },
    SetterOnCourt { team: Team, player: u8 },
    Timeout { team: Team },
    SetEnd { completed_set: u8 },
    /// Lineups and setter positions read from the line itself.
    Lineups {
        home: [u8; 6],
        visiting: [u8; 6],
        home_setter_position: Option<u8>,
        visiting_setter_position: Option<u8>,
    },
}

/// What applying a change revealed about the line.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ApplyOutcome {
    /// The change references a player the roster or lineup cannot account for.
    pub unverified: bool,
    /// Set when this change scored or confirmed a point.
    pub point_won_by: Option<Team>,
    pub sequence_errors: Vec<SequenceError>,
}

impl ApplyOutcome {
    pub fn merge(&mut self, other: ApplyOutcome) {
        self.unverified |= other.unverified;
        if other.point_won_by.is_some() {
            self.point_won_by = other.point_won_by;
        }
        self.sequence_errors.extend(other.sequence_errors);
    }
}

/// Read-only copy of the match state at one line.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MatchStateView {
    pub set_number: u8,
    pub home_score: u8,
    pub visiting_score: u8,
    pub home_rotation: u8,
    pub visiting_rotation: u8,
    pub home_setter_position: Option<u8>,
    pub visiting_setter_position: Option<u8>,
    pub home_setter: Option<u8>,
    pub visiting_setter: Option<u8>,
    pub home_lineup: Lineup,
    pub visiting_lineup: Lineup,
    pub serving_team: Option<Team>,
    pub receiving_team: Option<Team>,
    pub rally_number: u32,
    pub possession_number: u32,
    pub home_timeouts: u8,
    pub visiting_timeouts: u8,
    /// A lineup change in this set could not be verified.
    pub unverified: bool,
}

impl MatchStateView {
    pub fn score(&self, team: Team) -> u8 {
        match team {
            Team::Home => self.home_score,
            Team::Visiting => self.visiting_score,
        }
    }

    pub fn rotation(&self, team: Team) -> u8 {
        match team {
            Team::Home => self.home_rotation,
            Team::Visiting => self.visiting_rotation,
        }
    }

    pub fn lineup(&self, team: Team) -> &Lineup {
        match team {
            Team::Home => &self.home_lineup,
            Team::Visiting => &self.visiting_lineup,
        }
    }
}

#[derive(Debug, Clone, Default)]
struct TeamState {
    score: u8,
    rotation: u8,
    setter_position: Option<u8>,
    setter: Option<u8>,
    lineup: Lineup,
    timeouts: u8,
    unverified: bool,
}

/// Mutable state of one match.
#[derive(Debug, Clone)]
pub struct MatchState {
    set_number: u8,
    teams: [TeamState; 2],
    serving_team: Option<Team>,
    rally_number: u32,
    possession_number: u32,
    possession_team: Option<Team>,
    /// A play has been seen under the current `rally_number`.
    rally_started: bool,
    /// The current rally is decided; trailing lines are not new touches.
    rally_over: bool,
    /// Winner already scored by a play line in the current rally.
    pending_point: Option<Team>,
    awaiting_lineup: bool,
}

impl MatchState {
    pub fn new(seed: &InitialState) -> Self {
        let team = |score: u8, rotation: u8, setter_position: Option<u8>, lineup: Option<[u8; 6]>| {
            TeamState {
                score,
                rotation: valid_rotation(rotation),
                setter_position: setter_position.filter(|p| (1..=6).contains(p)),
                lineup: lineup.map(Lineup::new).unwrap_or_default(),
                ..Default::default()
            }
        };
        Self {
            set_number: seed.set_number.max(1),
            teams: [
                team(
                    seed.home_score,
                    seed.home_rotation,
                    seed.home_setter_position,
                    seed.home_lineup,
                ),
                team(
                    seed.visiting_score,
                    seed.visiting_rotation,
                    seed.visiting_setter_position,
                    seed.visiting_lineup,
                ),
            ],
            serving_team: seed.serving_team,
            rally_number: 1,
            possession_number: 0,
            possession_team: None,
            rally_started: false,
            rally_over: false,
            pending_point: None,
            awaiting_lineup: seed.home_lineup.is_none() || seed.visiting_lineup.is_none(),
        }
    }

    pub fn set_number(&self) -> u8 {
        self.set_number
    }

    pub fn score(&self, team: Team) -> u8 {
        self.team(team).score
    }

    pub fn rotation(&self, team: Team) -> u8 {
        self.team(team).rotation
    }

    pub fn setter_position(&self, team: Team) -> Option<u8> {
        self.team(team).setter_position
    }

    pub fn lineup(&self, team: Team) -> &Lineup {
        &self.team(team).lineup
    }

    pub fn serving_team(&self) -> Option<Team> {
        self.serving_team
    }

    pub fn rally_number(&self) -> u32 {
        self.rally_number
    }

    pub fn possession_number(&self) -> u32 {
        self.possession_number
    }

    /// No lineup is known yet for the current set.
    pub fn awaiting_lineup(&self) -> bool {
        self.awaiting_lineup
    }

    pub fn snapshot(&self) -> MatchStateView {
        let [home, visiting] = &self.teams;
        MatchStateView {
            set_number: self.set_number,
            home_score: home.score,
            visiting_score: visiting.score,
            home_rotation: home.rotation,
            visiting_rotation: visiting.rotation,
            home_setter_position: home.setter_position,
            visiting_setter_position: visiting.setter_position,
            home_setter: home.setter,
            visiting_setter: visiting.setter,
            home_lineup: home.lineup,
            visiting_lineup: visiting.lineup,
            serving_team: self.serving_team,
            receiving_team: self.serving_team.map(Team::opponent),
            rally_number: self.rally_number,
            possession_number: self.possession_number,
            home_timeouts: home.timeouts,
            visiting_timeouts: visiting.timeouts,
            unverified: home.unverified || visiting.unverified,
        }
    }

    /// Apply one state change. Never fails: problems are reported in the
    /// returned outcome and the state is still updated as far as possible.
    pub fn apply(&mut self, change: &StateChange, rosters: &Rosters) -> ApplyOutcome {
        let mut outcome = ApplyOutcome::default();
        match *change {
            StateChange::Serve { team } => {
                self.pending_point = None;
                match self.serving_team {
                    Some(expected) if expected != team => {
                        log::debug!(
                            "Set {} rally {}: {:?} served, expected {:?}",
                            self.set_number,
                            self.rally_number,
                            team,
                            expected
                        );
                        outcome.sequence_errors.push(SequenceError::UnexpectedServer {
                            expected,
                            actual: team,
                        });
                    }
                    _ => {}
                }
                self.serving_team = Some(team);
                if self.rally_started {
                    self.next_rally();
                }
                self.rally_started = true;
                self.rally_over = false;
            }
            StateChange::Touch { team } => {
                if self.rally_over {
                    if self.pending_point.is_some() {
                        // Line of the rally just decided, e.g. a mirrored error
                        return outcome;
                    }
                    // Rally closed by a marker and reopened without a serve line
                    self.next_rally();
                    self.rally_over = false;
                }
                self.rally_started = true;
                if self.possession_team != Some(team) {
                    self.possession_number += 1;
                    self.possession_team = Some(team);
                }
            }
            StateChange::PointEnd { winner } => match self.pending_point {
                Some(decided) if decided != winner => {
                    outcome
                        .sequence_errors
                        .push(SequenceError::ConflictingOutcome {
                            decided,
                            claimed: winner,
                        });
                }
                Some(_) => outcome.point_won_by = Some(winner),
                None => {
                    self.score_point(winner);
                    self.pending_point = Some(winner);
                    outcome.point_won_by = Some(winner);
                }
            },
            StateChange::PointMarker {
                winner,
                home_score,
                visiting_score,
            } => {
                match self.pending_point {
                    Some(decided) if decided != winner => {
                        outcome
                            .sequence_errors
                            .push(SequenceError::ConflictingOutcome {
                                decided,
                                claimed: winner,
                            });
                    }
                    Some(_) => {}
                    None => self.score_point(winner),
                }
                outcome.point_won_by = Some(winner);
                if let Some(err) = self.reconcile_score(home_score, visiting_score) {
                    outcome.sequence_errors.push(err);
                }
                self.pending_point = None;
                self.rally_over = true;
            }
            StateChange::Substitution {
                team,
                player_out,
                player_in,
            } => {
                if !rosters.contains(team, player_in) {
                    if rosters.has_roster(team) {
                        log::warn!(
                            "Set {}: substitute {} not on {:?} roster",
                            self.set_number,
                            player_in,
                            team
                        );
                    } else {
                        log::debug!(
                            "Set {}: no {:?} roster to check substitute {}",
                            self.set_number,
                            team,
                            player_in
                        );
                    }
                    outcome.unverified = true;
                }
                let state = self.team_mut(team);
                if !state.lineup.substitute(player_out, player_in) {
                    outcome.unverified = true;
                    outcome.sequence_errors.push(SequenceError::PlayerNotOnCourt {
                        team,
                        player: player_out,
                    });
                }
                state.unverified |= outcome.unverified;
                log::debug!("{:?} substitution {} -> {}", team, player_out, player_in);
            }
            StateChange::Rotation {
                team,
                setter_position,
            } => {
                let state = self.team_mut(team);
                if let Some(tracked) = state.setter_position {
                    if tracked != setter_position {
                        log::debug!(
                            "{:?} setter position {} replaces tracked {}",
                            team,
                            setter_position,
                            tracked
                        );
                    }
                }
                state.setter_position = Some(setter_position);
            }
            StateChange::SetterOnCourt { team, player } => {
                if !rosters.contains(team, player) {
                    outcome.unverified = true;
                }
                let state = self.team_mut(team);
                state.setter = Some(player);
                state.unverified |= outcome.unverified;
            }
            StateChange::Timeout { team } => {
                let state = self.team_mut(team);
                state.timeouts = state.timeouts.saturating_add(1);
            }
            StateChange::SetEnd { completed_set } => {
                if completed_set != self.set_number {
                    log::debug!(
                        "Set end marker for set {} while tracking set {}",
                        completed_set,
                        self.set_number
                    );
                }
                self.end_set(completed_set);
            }
            StateChange::Lineups {
                home,
                visiting,
                home_setter_position,
                visiting_setter_position,
            } => {
                for (team, players, setter_position) in [
                    (Team::Home, home, home_setter_position),
                    (Team::Visiting, visiting, visiting_setter_position),
                ] {
                    let state = self.team_mut(team);
                    state.lineup = Lineup::new(players);
                    state.unverified = false;
                    if let Some(p) = setter_position.filter(|p| (1..=6).contains(p)) {
                        state.setter_position = Some(p);
                    }
                }
                self.awaiting_lineup = false;
            }
        }
        outcome
    }

    fn team(&self, team: Team) -> &TeamState {
        &self.teams[team.idx()]
    }

    fn team_mut(&mut self, team: Team) -> &mut TeamState {
        &mut self.teams[team.idx()]
    }

    /// Score a point and mark the rally decided. The receiving team winning
    /// the rally is a side-out: it rotates and takes the serve. Rally and
    /// possession counters move on at the next serve.
    fn score_point(&mut self, winner: Team) {
        let state = self.team_mut(winner);
        state.score = state.score.saturating_add(1);

        match self.serving_team {
            Some(server) if server != winner => self.side_out(winner),
            Some(_) => {}
            None => log::debug!(
                "Set {} rally {}: serving team unknown, no rotation applied",
                self.set_number,
                self.rally_number
            ),
        }

        self.serving_team = Some(winner);
        self.rally_over = true;
    }

    fn next_rally(&mut self) {
        self.rally_number += 1;
        self.possession_number = 0;
        self.possession_team = None;
    }

    fn side_out(&mut self, team: Team) {
        let state = self.team_mut(team);
        state.lineup.rotate();
        state.rotation = next_rotation(state.rotation);
        state.setter_position = state.setter_position.map(next_setter_position);
        log::debug!("{:?} side-out, rotation {}", team, state.rotation);
    }

    /// Adopt a point marker's score, reporting any disagreement.
    fn reconcile_score(&mut self, home_score: u8, visiting_score: u8) -> Option<SequenceError> {
        let home = self.teams[0].score;
        let visiting = self.teams[1].score;
        if (home, visiting) == (home_score, visiting_score) {
            return None;
        }
        self.teams[0].score = home_score;
        self.teams[1].score = visiting_score;
        Some(if home_score < home || visiting_score < visiting {
            SequenceError::ScoreDecreased {
                home,
                visiting,
                marker_home: home_score,
                marker_visiting: visiting_score,
            }
        } else {
            SequenceError::ScoreMismatch {
                home,
                visiting,
                marker_home: home_score,
                marker_visiting: visiting_score,
            }
        })
    }

    fn end_set(&mut self, completed_set: u8) {
        log::debug!(
            "Set {} ends {}:{}",
            completed_set,
            self.teams[0].score,
            self.teams[1].score
        );
        self.set_number = completed_set.max(self.set_number).saturating_add(1);
        for state in self.teams.iter_mut() {
            state.score = 0;
            state.timeouts = 0;
            state.unverified = false;
        }
        self.serving_team = None;
        self.rally_number = 1;
        self.possession_number = 0;
        self.possession_team = None;
        self.rally_started = false;
        self.rally_over = false;
        self.pending_point = None;
        self.awaiting_lineup = true;
    }
}

fn valid_rotation(rotation: u8) -> u8 {
    if (1..=6).contains(&rotation) {
        rotation
    } else {
        log::warn!("Rotation {} out of range, using 1", rotation);
        1
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::roster::Player;

    const HOME: [u8; 6] = [19, 8, 10, 17, 15, 14];
    const VISITING: [u8; 6] = [5, 12, 4, 7, 3, 11];

    fn seeded() -> MatchState {
        MatchState::new(
            &InitialState::new("106859")
                .with_lineups(HOME, VISITING)
                .with_setter_positions(1, 1)
                .with_serving_team(Team::Home),
        )
    }

    fn rosters() -> Rosters {
        let mut rosters = Rosters::new();
        for n in HOME.iter().chain([2u8, 9].iter()) {
            rosters.add_player(Player::new(Team::Home, *n, &format!("H{}", n)));
        }
        for n in VISITING.iter().chain([1u8, 6].iter()) {
            rosters.add_player(Player::new(Team::Visiting, *n, &format!("V{}", n)));
        }
        rosters
    }

    #[test]
    fn test_lineup_rotation_is_single_clockwise_step() {
        let mut lineup = Lineup::new(HOME);
        lineup.rotate();
        assert_eq!(lineup, Lineup::new([8, 10, 17, 15, 14, 19]));
        for _ in 0..5 {
            lineup.rotate();
        }
        assert_eq!(lineup, Lineup::new(HOME));
        assert_eq!(lineup.player_at(1), Some(19));
        assert_eq!(lineup.player_at(0), None);
        assert_eq!(lineup.position_of(14), Some(6));
    }

    #[test]
    fn test_rotation_counters() {
        assert_eq!(next_rotation(1), 2);
        assert_eq!(next_rotation(6), 1);
        assert_eq!(next_setter_position(1), 6);
        assert_eq!(next_setter_position(6), 5);
        assert_eq!(next_setter_position(2), 1);
    }

    #[test]
    fn test_point_by_server_keeps_rotation() {
        let mut state = seeded();
        let rosters = rosters();
        let outcome = state.apply(&StateChange::PointEnd { winner: Team::Home }, &rosters);
        assert_eq!(outcome.point_won_by, Some(Team::Home));
        assert_eq!(state.score(Team::Home), 1);
        assert_eq!(state.rotation(Team::Home), 1);
        assert_eq!(state.lineup(Team::Home), &Lineup::new(HOME));
        assert_eq!(state.serving_team(), Some(Team::Home));
        assert_eq!(state.rally_number(), 1);

        state.apply(&StateChange::Serve { team: Team::Home }, &rosters);
        assert_eq!(state.rally_number(), 2);
    }

    #[test]
    fn test_side_out_rotates_winner() {
        let mut state = seeded();
        let rosters = rosters();
        state.apply(&StateChange::Touch { team: Team::Home }, &rosters);
        state.apply(&StateChange::Touch { team: Team::Visiting }, &rosters);
        assert_eq!(state.possession_number(), 2);

        let before = *state.lineup(Team::Visiting);
        state.apply(&StateChange::PointEnd { winner: Team::Visiting }, &rosters);

        let mut expected = before;
        expected.rotate();
        assert_eq!(state.lineup(Team::Visiting), &expected);
        assert_eq!(state.rotation(Team::Visiting), 2);
        assert_eq!(state.setter_position(Team::Visiting), Some(6));
        assert_eq!(state.lineup(Team::Home), &Lineup::new(HOME));
        assert_eq!(state.serving_team(), Some(Team::Visiting));
        assert_eq!(state.snapshot().receiving_team, Some(Team::Home));
        assert_eq!(state.possession_number(), 2);
        assert_eq!(state.rally_number(), 1);

        state.apply(&StateChange::Serve { team: Team::Visiting }, &rosters);
        assert_eq!(state.possession_number(), 0);
        assert_eq!(state.rally_number(), 2);
    }

    #[test]
    fn test_trailing_lines_stay_in_decided_rally() {
        let mut state = seeded();
        let rosters = rosters();
        state.apply(&StateChange::Serve { team: Team::Home }, &rosters);
        state.apply(&StateChange::Touch { team: Team::Home }, &rosters);
        state.apply(&StateChange::PointEnd { winner: Team::Home }, &rosters);

        // Reception error mirroring the ace
        state.apply(&StateChange::Touch { team: Team::Visiting }, &rosters);
        assert_eq!(state.rally_number(), 1);
        assert_eq!(state.possession_number(), 1);

        state.apply(
            &StateChange::PointMarker {
                winner: Team::Home,
                home_score: 1,
                visiting_score: 0,
            },
            &rosters,
        );
        assert_eq!(state.rally_number(), 1);

        state.apply(&StateChange::Serve { team: Team::Home }, &rosters);
        state.apply(&StateChange::Touch { team: Team::Home }, &rosters);
        assert_eq!(state.rally_number(), 2);
        assert_eq!(state.possession_number(), 1);
        state.apply(&StateChange::Touch { team: Team::Visiting }, &rosters);
        assert_eq!(state.possession_number(), 2);
    }

    #[test]
    fn test_play_after_marker_without_serve_opens_rally() {
        let mut state = seeded();
        let rosters = rosters();
        state.apply(&StateChange::Touch { team: Team::Home }, &rosters);
        state.apply(
            &StateChange::PointMarker {
                winner: Team::Home,
                home_score: 1,
                visiting_score: 0,
            },
            &rosters,
        );
        state.apply(&StateChange::Touch { team: Team::Visiting }, &rosters);
        assert_eq!(state.rally_number(), 2);
        assert_eq!(state.possession_number(), 1);
    }

    #[test]
    fn test_six_side_outs_wrap_rotation() {
        let mut state = seeded();
        let rosters = rosters();
        for _ in 0..6 {
            state.apply(&StateChange::Serve { team: Team::Home }, &rosters);
            state.apply(&StateChange::PointEnd { winner: Team::Visiting }, &rosters);
            state.apply(&StateChange::Serve { team: Team::Visiting }, &rosters);
            state.apply(&StateChange::PointEnd { winner: Team::Home }, &rosters);
        }
        assert_eq!(state.rotation(Team::Home), 1);
        assert_eq!(state.rotation(Team::Visiting), 1);
        assert_eq!(state.lineup(Team::Visiting), &Lineup::new(VISITING));
        assert_eq!(state.score(Team::Home), 6);
        assert_eq!(state.score(Team::Visiting), 6);
    }

    #[test]
    fn test_duplicate_point_end_not_rescored() {
        let mut state = seeded();
        let rosters = rosters();
        state.apply(&StateChange::PointEnd { winner: Team::Home }, &rosters);
        let dup = state.apply(&StateChange::PointEnd { winner: Team::Home }, &rosters);
        assert!(dup.sequence_errors.is_empty());
        assert_eq!(state.score(Team::Home), 1);

        let conflict = state.apply(&StateChange::PointEnd { winner: Team::Visiting }, &rosters);
        assert!(matches!(
            conflict.sequence_errors[..],
            [SequenceError::ConflictingOutcome { .. }]
        ));
        assert_eq!(state.score(Team::Visiting), 0);
    }

    #[test]
    fn test_point_marker_confirms_or_scores() {
        let mut state = seeded();
        let rosters = rosters();
        state.apply(&StateChange::PointEnd { winner: Team::Home }, &rosters);
        let confirmed = state.apply(
            &StateChange::PointMarker {
                winner: Team::Home,
                home_score: 1,
                visiting_score: 0,
            },
            &rosters,
        );
        assert!(confirmed.sequence_errors.is_empty());
        assert_eq!(state.score(Team::Home), 1);

        // No play line decided this rally: the marker scores it
        let scored = state.apply(
            &StateChange::PointMarker {
                winner: Team::Visiting,
                home_score: 1,
                visiting_score: 1,
            },
            &rosters,
        );
        assert!(scored.sequence_errors.is_empty());
        assert_eq!(state.score(Team::Visiting), 1);
        assert_eq!(state.rotation(Team::Visiting), 2);
    }

    #[test]
    fn test_point_marker_score_disagreement() {
        let mut state = seeded();
        let rosters = rosters();
        let jump = state.apply(
            &StateChange::PointMarker {
                winner: Team::Home,
                home_score: 3,
                visiting_score: 0,
            },
            &rosters,
        );
        assert!(matches!(
            jump.sequence_errors[..],
            [SequenceError::ScoreMismatch { .. }]
        ));
        assert_eq!(state.score(Team::Home), 3);

        let drop = state.apply(
            &StateChange::PointMarker {
                winner: Team::Home,
                home_score: 2,
                visiting_score: 0,
            },
            &rosters,
        );
        assert!(matches!(
            drop.sequence_errors[..],
            [SequenceError::ScoreDecreased { .. }]
        ));
        assert_eq!(state.score(Team::Home), 2);
    }

    #[test]
    fn test_substitution_known_and_unknown_players() {
        let mut state = seeded();
        let rosters = rosters();
        let ok = state.apply(
            &StateChange::Substitution {
                team: Team::Home,
                player_out: 10,
                player_in: 2,
            },
            &rosters,
        );
        assert!(!ok.unverified);
        assert_eq!(state.lineup(Team::Home).player_at(3), Some(2));
        assert_eq!(state.score(Team::Home), 0);
        assert_eq!(state.rotation(Team::Home), 1);

        let unknown = state.apply(
            &StateChange::Substitution {
                team: Team::Home,
                player_out: 17,
                player_in: 99,
            },
            &rosters,
        );
        assert!(unknown.unverified);
        assert!(unknown.sequence_errors.is_empty());
        assert_eq!(state.lineup(Team::Home).player_at(4), Some(99));
        assert!(state.snapshot().unverified);

        let off_court = state.apply(
            &StateChange::Substitution {
                team: Team::Visiting,
                player_out: 42,
                player_in: 1,
            },
            &rosters,
        );
        assert!(off_court.unverified);
        assert_eq!(state.lineup(Team::Visiting), &Lineup::new(VISITING));
    }

    #[test]
    fn test_substitution_without_roster_is_unverified() {
        let mut state = seeded();
        let empty = Rosters::new();
        assert!(!empty.has_roster(Team::Home));
        let outcome = state.apply(
            &StateChange::Substitution {
                team: Team::Home,
                player_out: 19,
                player_in: 2,
            },
            &empty,
        );
        assert!(outcome.unverified);
        assert!(outcome.sequence_errors.is_empty());
        assert_eq!(state.lineup(Team::Home).player_at(1), Some(2));
    }

    #[test]
    fn test_serve_by_unexpected_team() {
        let mut state = seeded();
        let outcome = state.apply(&StateChange::Serve { team: Team::Visiting }, &rosters());
        assert!(matches!(
            outcome.sequence_errors[..],
            [SequenceError::UnexpectedServer {
                expected: Team::Home,
                actual: Team::Visiting
            }]
        ));
        assert_eq!(state.serving_team(), Some(Team::Visiting));
    }

    #[test]
    fn test_set_end_resets_and_awaits_lineup() {
        let mut state = seeded();
        let rosters = rosters();
        assert!(!state.awaiting_lineup());
        state.apply(&StateChange::PointEnd { winner: Team::Home }, &rosters);
        state.apply(&StateChange::Timeout { team: Team::Visiting }, &rosters);
        state.apply(&StateChange::SetEnd { completed_set: 1 }, &rosters);

        let view = state.snapshot();
        assert_eq!(view.set_number, 2);
        assert_eq!((view.home_score, view.visiting_score), (0, 0));
        assert_eq!(view.visiting_timeouts, 0);
        assert_eq!(view.serving_team, None);
        assert_eq!(view.rally_number, 1);
        assert!(state.awaiting_lineup());

        state.apply(
            &StateChange::Lineups {
                home: VISITING,
                visiting: HOME,
                home_setter_position: Some(4),
                visiting_setter_position: None,
            },
            &rosters,
        );
        assert!(!state.awaiting_lineup());
        assert_eq!(state.setter_position(Team::Home), Some(4));
        assert_eq!(state.lineup(Team::Home), &Lineup::new(VISITING));
    }

    #[test]
    fn test_unknown_serving_team_does_not_rotate() {
        let mut state = MatchState::new(&InitialState::new("m").with_lineups(HOME, VISITING));
        state.apply(&StateChange::PointEnd { winner: Team::Visiting }, &rosters());
        assert_eq!(state.rotation(Team::Visiting), 1);
        assert_eq!(state.serving_team(), Some(Team::Visiting));
    }
}
