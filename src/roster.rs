//! Roster and reference tables supplied by the header-parsing collaborator.

use serde::{Deserialize, Serialize};
use std::collections::HashMap;

use crate::state::Team;

/// One rostered player.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Player {
    pub team: Team,
    pub number: u8,
    pub player_id: String,
    pub first_name: Option<String>,
    pub last_name: Option<String>,
    pub role: Option<String>,
}

impl Player {
    pub fn new(team: Team, number: u8, player_id: &str) -> Self {
        Self {
            team,
            number,
            player_id: player_id.to_string(),
            first_name: None,
            last_name: None,
            role: None,
        }
    }

    pub fn with_name(mut self, first_name: &str, last_name: &str) -> Self {
        self.first_name = Some(first_name.to_string()).filter(|s| !s.is_empty());
        self.last_name = Some(last_name.to_string()).filter(|s| !s.is_empty());
        self
    }

    pub fn with_role(mut self, role: &str) -> Self {
        self.role = Some(role.to_string());
        self
    }

    /// "First Last", or whichever part is known.
    pub fn full_name(&self) -> Option<String> {
        let parts: Vec<&str> = [self.first_name.as_deref(), self.last_name.as_deref()]
            .into_iter()
            .flatten()
            .collect();
        if parts.is_empty() {
            None
        } else {
            Some(parts.join(" "))
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TeamInfo {
    pub team_id: String,
    pub name: String,
}

/// An attack combination declared in the match header (e.g. `V5`).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AttackCombination {
    pub code: String,
    pub zone: Option<u8>,
    /// R, L or C side of the court.
    pub side: Option<char>,
    /// Tempo letter (H, Q, M, ...).
    pub tempo: Option<char>,
    pub description: String,
    /// Set direction (F, B, P, C, S).
    pub target: Option<char>,
    pub back_row: bool,
}

/// A setter call declared in the match header (e.g. `K1`).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SetterCall {
    pub code: String,
    pub description: String,
}

/// Lookup tables for one match.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Rosters {
    home: Option<TeamInfo>,
    visiting: Option<TeamInfo>,
    players: HashMap<Team, HashMap<u8, Player>>,
    attack_combinations: HashMap<String, AttackCombination>,
    setter_calls: HashMap<String, SetterCall>,
}

impl Rosters {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_team(mut self, team: Team, team_id: &str, name: &str) -> Self {
        let info = TeamInfo {
            team_id: team_id.to_string(),
            name: name.to_string(),
        };
        match team {
            Team::Home => self.home = Some(info),
            Team::Visiting => self.visiting = Some(info),
        }
        self
    }

    pub fn with_player(mut self, player: Player) -> Self {
        self.add_player(player);
        self
    }

    /// Later entries for the same (team, number) replace earlier ones.
    pub fn add_player(&mut self, player: Player) {
        self.players
            .entry(player.team)
            .or_default()
            .insert(player.number, player);
    }

    pub fn add_attack_combination(&mut self, combination: AttackCombination) {
        self.attack_combinations
            .insert(combination.code.clone(), combination);
    }

    pub fn add_setter_call(&mut self, call: SetterCall) {
        self.setter_calls.insert(call.code.clone(), call);
    }

    pub fn team(&self, team: Team) -> Option<&TeamInfo> {
        match team {
            Team::Home => self.home.as_ref(),
            Team::Visiting => self.visiting.as_ref(),
        }
    }

    pub fn team_name(&self, team: Team) -> Option<&str> {
        self.team(team).map(|t| t.name.as_str())
    }

    pub fn player(&self, team: Team, number: u8) -> Option<&Player> {
        self.players.get(&team).and_then(|p| p.get(&number))
    }

    /// False for every number when no roster was supplied for `team`, so
    /// substitutions are then unverified. Use [`Rosters::has_roster`] to
    /// tell the two cases apart.
    pub fn contains(&self, team: Team, number: u8) -> bool {
        self.player(team, number).is_some()
    }

    /// A team's players ordered by jersey number.
    pub fn players_for(&self, team: Team) -> Vec<&Player> {
        let mut players: Vec<&Player> = self
            .players
            .get(&team)
            .map(|p| p.values().collect())
            .unwrap_or_default();
        players.sort_by_key(|p| p.number);
        players
    }

    /// Whether any roster was supplied for `team`. Without one, nothing can
    /// be verified against it.
    pub fn has_roster(&self, team: Team) -> bool {
        self.players.get(&team).is_some_and(|p| !p.is_empty())
    }

    pub fn attack_combination(&self, code: &str) -> Option<&AttackCombination> {
        self.attack_combinations.get(code)
    }

    pub fn setter_call(&self, code: &str) -> Option<&SetterCall> {
        self.setter_calls.get(code)
    }
}
