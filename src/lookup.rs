//! Skill and evaluation vocabularies.
//!
//! All DataVolley vocabularies live in the constant tables below. Lookups
//! never fail: characters outside a table resolve to [`UNKNOWN`], since
//! operator typos are common in real scout files.

use lazy_static::lazy_static;
use serde::Serialize;
use std::collections::HashMap;

/// Name returned for any code outside the tables.
pub const UNKNOWN: &str = "Unknown";

/// Skill letters.
pub const SKILLS: &[(char, &str)] = &[
    ('S', "Serve"),
    ('R', "Reception"),
    ('A', "Attack"),
    ('B', "Block"),
    ('D', "Dig"),
    ('E', "Set"),
    ('F', "Freeball"),
];

/// Generic evaluation grades, best to worst.
pub const EVALUATIONS: &[(char, &str)] = &[
    ('#', "Perfect"),
    ('+', "Positive"),
    ('!', "OK"),
    ('-', "Negative"),
    ('/', "Poor"),
    ('=', "Error"),
];

/// Skill-specific meaning of each evaluation grade.
pub const EVALUATION_DESCRIPTIONS: &[(char, char, &str)] = &[
    ('S', '#', "Ace"),
    ('S', '+', "Positive, opponent some attack"),
    ('S', '!', "OK, no first tempo possible"),
    ('S', '-', "Negative, opponent free attack"),
    ('S', '/', "Positive, no attack"),
    ('S', '=', "Error"),
    ('R', '#', "Perfect pass"),
    ('R', '+', "Positive, attack"),
    ('R', '!', "OK, no first tempo possible"),
    ('R', '-', "Negative, limited attack"),
    ('R', '/', "Poor, no attack"),
    ('R', '=', "Error"),
    ('A', '#', "Winning attack"),
    ('A', '+', "Positive, good attack"),
    ('A', '!', "Blocked for reattack"),
    ('A', '-', "Poor, easily dug"),
    ('A', '/', "Blocked"),
    ('A', '=', "Error"),
    ('B', '#', "Winning block"),
    ('B', '+', "Positive, block touch"),
    ('B', '!', "Poor, opposition to replay"),
    ('B', '-', "Negative, blocked but attacker continues"),
    ('B', '/', "Invasion"),
    ('B', '=', "Error"),
    ('D', '#', "Perfect dig"),
    ('D', '+', "Good dig"),
    ('D', '!', "OK, no first tempo possible"),
    ('D', '-', "No structured attack possible"),
    ('D', '/', "Ball directly back over net"),
    ('D', '=', "Error"),
    ('E', '#', "Perfect"),
    ('E', '+', "Positive"),
    ('E', '!', "OK"),
    ('E', '-', "Poor"),
    ('E', '/', "Poor"),
    ('E', '=', "Error"),
    ('F', '#', "Perfect"),
    ('F', '+', "Good"),
    ('F', '!', "OK, no first tempo possible"),
    ('F', '-', "Poor"),
    ('F', '/', "Poor"),
    ('F', '=', "Error"),
];

/// Position 4: serve style for serves and receptions, set tempo otherwise.
pub const SKILL_TYPES: &[(char, char, &str)] = &[
    ('S', 'H', "Float serve"),
    ('S', 'M', "Jump-float serve"),
    ('S', 'Q', "Jump serve"),
    ('S', 'T', "Topspin serve"),
    ('S', 'N', "Hybrid serve"),
    ('S', 'O', "Other serve"),
    ('R', 'H', "Float serve reception"),
    ('R', 'M', "Jump-float serve reception"),
    ('R', 'Q', "Jump serve reception"),
    ('R', 'T', "Topspin serve reception"),
    ('R', 'N', "Hybrid serve reception"),
    ('R', 'O', "Other serve reception"),
    ('A', 'H', "High ball attack"),
    ('A', 'M', "Half ball attack"),
    ('A', 'Q', "Quick ball attack"),
    ('A', 'T', "Head ball attack"),
    ('A', 'U', "Super ball attack"),
    ('A', 'F', "Fast ball attack"),
    ('A', 'N', "Slide ball attack"),
    ('A', 'O', "Other attack"),
    ('B', 'H', "High ball block"),
    ('B', 'M', "Half ball block"),
    ('B', 'Q', "Quick ball block"),
    ('B', 'T', "Head ball block"),
    ('B', 'U', "Super ball block"),
    ('B', 'F', "Fast ball block"),
    ('B', 'N', "Slide ball block"),
    ('B', 'O', "Other block"),
    ('D', 'H', "High ball dig"),
    ('D', 'M', "Half ball dig"),
    ('D', 'Q', "Quick ball dig"),
    ('D', 'T', "Head ball dig"),
    ('D', 'U', "Super ball dig"),
    ('D', 'F', "Fast ball dig"),
    ('D', 'N', "Slide ball dig"),
    ('D', 'O', "Other dig"),
    ('E', 'H', "High ball set"),
    ('E', 'M', "Half ball set"),
    ('E', 'Q', "Quick ball set"),
    ('E', 'T', "Head ball set"),
    ('E', 'U', "Super ball set"),
    ('E', 'F', "Fast ball set"),
    ('E', 'N', "Slide ball set"),
    ('E', 'O', "Other set"),
    ('F', 'H', "High ball freeball"),
    ('F', 'M', "Half ball freeball"),
    ('F', 'Q', "Quick ball freeball"),
    ('F', 'O', "Other freeball"),
];

/// Position 12: skill subtype.
pub const SKILL_SUBTYPES: &[(char, char, &str)] = &[
    ('A', 'H', "Hard spike"),
    ('A', 'P', "Soft spike/topspin"),
    ('A', 'T', "Tip"),
    ('B', 'A', "Block assist"),
    ('B', 'T', "Block attempt"),
    ('B', 'P', "Block on soft spike"),
    ('R', 'L', "On left"),
    ('R', 'R', "On right"),
    ('R', 'W', "Low"),
    ('R', 'O', "Overhand"),
    ('R', 'M', "Midline"),
    ('D', 'S', "On spike"),
    ('D', 'C', "Spike cover"),
    ('D', 'B', "After block"),
    ('D', 'E', "Emergency"),
    ('D', 'T', "Tip"),
    ('D', 'P', "Soft spike"),
    ('E', '1', "Hand set"),
    ('E', '2', "Bump set"),
    ('E', '3', "Other set"),
    ('E', '4', "Underhand set"),
    ('E', '5', "Jump set"),
];

/// Position 13: blockers facing an attack, or receivers sharing a serve.
pub const NUM_PLAYERS: &[(char, char, &str)] = &[
    ('A', '0', "No block"),
    ('A', '1', "1 player block"),
    ('A', '2', "2 player block"),
    ('A', '3', "3 player block"),
    ('A', '4', "Hole block"),
    ('B', '0', "No block"),
    ('B', '1', "1 player block"),
    ('B', '2', "2 player block"),
    ('B', '3', "3 player block"),
    ('B', '4', "Hole block"),
    ('R', '1', "Two players receiving, the player on left receives"),
    ('R', '2', "Two players receiving, the player on right receives"),
    ('R', '3', "Three players receiving, the player on left receives"),
    ('R', '4', "Three players receiving, the player in center receives"),
    ('R', '5', "Three players receiving, the player on right receives"),
    ('R', '6', "Four players receiving, the player on left receives"),
    ('R', '7', "Four players receiving, the player on center-left receives"),
    ('R', '8', "Four players receiving, the player on center-right receives"),
    ('R', '9', "Four players receiving, the player on right receives"),
];

/// Position 14: special codes.
pub const SPECIAL_CODES: &[(char, char, &str)] = &[
    ('S', 'O', "Ball out - long"),
    ('S', 'L', "Ball out - left"),
    ('S', 'R', "Ball out - right"),
    ('S', 'N', "Ball in net"),
    ('S', 'Z', "Referee call"),
    ('A', 'S', "Attack out - side"),
    ('A', 'O', "Attack out - long"),
    ('A', 'N', "Attack in net"),
    ('A', 'I', "Net contact"),
    ('A', 'A', "Antenna"),
    ('A', 'Z', "Referee call"),
    ('A', 'F', "Block on floor"),
    ('A', 'C', "Block control"),
    ('A', 'X', "Direct on floor"),
    ('B', 'S', "Ball out - side"),
    ('B', 'O', "Ball out - long"),
    ('B', 'F', "Ball on floor"),
    ('B', 'X', "Between hands"),
    ('B', 'N', "Hands - net"),
    ('B', 'I', "Net contact"),
    ('B', 'A', "Antenna"),
    ('B', 'P', "No jump"),
    ('B', 'T', "Position error"),
    ('B', 'Z', "Referee call"),
    ('R', 'U', "Unplayable"),
    ('R', 'X', "Body error"),
    ('R', 'P', "Position error"),
    ('R', 'E', "Lack of effort"),
    ('R', 'Z', "Referee call"),
    ('D', 'U', "Unplayable"),
    ('D', 'X', "Body error"),
    ('D', 'P', "Position error"),
    ('D', 'Z', "Referee call"),
    ('D', 'F', "Ball on floor"),
    ('D', 'O', "Ball out"),
    ('D', 'E', "Lack of effort"),
    ('E', 'U', "Wrong set"),
    ('E', 'I', "Hand set error"),
    ('E', 'Z', "Referee call"),
];

/// Position 8: where the set was delivered.
pub const SET_TARGETS: &[(char, &str)] = &[
    ('F', "Front"),
    ('B', "Back"),
    ('C', "Center"),
    ('P', "Pipe"),
    ('S', "Setter"),
];

/// Whether a graded action ends the rally for the acting team.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum PointOutcome {
    Won,
    Lost,
}

/// Point-ending (skill, evaluation) pairs. `=` is an error for every skill.
pub const POINT_OUTCOMES: &[(char, char, PointOutcome)] = &[
    ('S', '#', PointOutcome::Won),
    ('A', '#', PointOutcome::Won),
    ('B', '#', PointOutcome::Won),
    ('A', '/', PointOutcome::Lost),
    ('B', '/', PointOutcome::Lost),
    ('S', '=', PointOutcome::Lost),
    ('R', '=', PointOutcome::Lost),
    ('A', '=', PointOutcome::Lost),
    ('B', '=', PointOutcome::Lost),
    ('D', '=', PointOutcome::Lost),
    ('E', '=', PointOutcome::Lost),
    ('F', '=', PointOutcome::Lost),
];

type PairTable = HashMap<(char, char), &'static str>;

lazy_static! {
    static ref SKILL_NAMES: HashMap<char, &'static str> = SKILLS.iter().copied().collect();
    static ref EVALUATION_NAMES: HashMap<char, &'static str> =
        EVALUATIONS.iter().copied().collect();
    static ref TARGET_NAMES: HashMap<char, &'static str> = SET_TARGETS.iter().copied().collect();
    static ref EVALUATION_BY_SKILL: PairTable = pair_table(EVALUATION_DESCRIPTIONS);
    static ref SKILL_TYPE_BY_SKILL: PairTable = pair_table(SKILL_TYPES);
    static ref SUBTYPE_BY_SKILL: PairTable = pair_table(SKILL_SUBTYPES);
    static ref NUM_PLAYERS_BY_SKILL: PairTable = pair_table(NUM_PLAYERS);
    static ref SPECIAL_BY_SKILL: PairTable = pair_table(SPECIAL_CODES);
    static ref OUTCOMES: HashMap<(char, char), PointOutcome> = POINT_OUTCOMES
        .iter()
        .map(|&(skill, eval, outcome)| ((skill, eval), outcome))
        .collect();
}

fn pair_table(entries: &'static [(char, char, &'static str)]) -> PairTable {
    entries
        .iter()
        .map(|&(skill, code, name)| ((skill, code), name))
        .collect()
}

/// Canonical skill name, e.g. `S` -> "Serve".
pub fn skill_name(code: char) -> &'static str {
    SKILL_NAMES.get(&code).copied().unwrap_or(UNKNOWN)
}

/// Canonical evaluation grade, e.g. `#` -> "Perfect".
pub fn evaluation_name(code: char) -> &'static str {
    EVALUATION_NAMES.get(&code).copied().unwrap_or(UNKNOWN)
}

/// What an evaluation means for a particular skill, e.g. (`A`, `/`) -> "Blocked".
pub fn evaluation_description(skill: char, evaluation: char) -> &'static str {
    lookup_pair(&EVALUATION_BY_SKILL, skill, evaluation)
}

pub fn skill_type_name(skill: char, code: char) -> &'static str {
    lookup_pair(&SKILL_TYPE_BY_SKILL, skill, code)
}

pub fn skill_subtype_name(skill: char, code: char) -> &'static str {
    lookup_pair(&SUBTYPE_BY_SKILL, skill, code)
}

pub fn num_players_name(skill: char, code: char) -> &'static str {
    lookup_pair(&NUM_PLAYERS_BY_SKILL, skill, code)
}

pub fn special_code_name(skill: char, code: char) -> &'static str {
    lookup_pair(&SPECIAL_BY_SKILL, skill, code)
}

pub fn set_target_name(code: char) -> &'static str {
    TARGET_NAMES.get(&code).copied().unwrap_or(UNKNOWN)
}

/// Rally outcome for the acting team, `None` when the action keeps the
/// ball in play.
pub fn point_outcome(skill: char, evaluation: char) -> Option<PointOutcome> {
    OUTCOMES.get(&(skill, evaluation)).copied()
}

fn lookup_pair(table: &PairTable, skill: char, code: char) -> &'static str {
    table.get(&(skill, code)).copied().unwrap_or(UNKNOWN)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_known_codes_resolve() {
        for &(code, name) in SKILLS {
            assert_eq!(skill_name(code), name);
            assert_ne!(skill_name(code), UNKNOWN);
        }
        for &(code, name) in EVALUATIONS {
            assert_eq!(evaluation_name(code), name);
            assert_ne!(evaluation_name(code), UNKNOWN);
        }
    }

    #[test]
    fn test_unknown_codes_never_fail() {
        for c in ['X', 's', '1', '~', ' ', '\u{e9}', '&'] {
            assert_eq!(skill_name(c), UNKNOWN);
        }
        for c in ['X', '?', '0', '~', '*'] {
            assert_eq!(evaluation_name(c), UNKNOWN);
        }
        assert_eq!(evaluation_description('X', '#'), UNKNOWN);
        assert_eq!(skill_subtype_name('S', 'M'), UNKNOWN);
        assert_eq!(set_target_name('Z'), UNKNOWN);
    }

    #[test]
    fn test_every_skill_has_every_evaluation_description() {
        for &(skill, _) in SKILLS {
            for &(eval, _) in EVALUATIONS {
                assert_ne!(
                    evaluation_description(skill, eval),
                    UNKNOWN,
                    "missing description for {}{}",
                    skill,
                    eval
                );
            }
        }
    }

    #[test]
    fn test_skill_specific_vocabulary() {
        assert_eq!(evaluation_description('S', '#'), "Ace");
        assert_eq!(evaluation_description('A', '/'), "Blocked");
        assert_eq!(skill_type_name('S', 'Q'), "Jump serve");
        assert_eq!(skill_type_name('A', 'Q'), "Quick ball attack");
        assert_eq!(skill_subtype_name('R', 'M'), "Midline");
        assert_eq!(skill_subtype_name('A', 'T'), "Tip");
        assert_eq!(num_players_name('A', '2'), "2 player block");
        assert_eq!(special_code_name('A', 'A'), "Antenna");
        assert_eq!(set_target_name('P'), "Pipe");
    }

    #[test]
    fn test_point_outcomes() {
        assert_eq!(point_outcome('S', '#'), Some(PointOutcome::Won));
        assert_eq!(point_outcome('A', '/'), Some(PointOutcome::Lost));
        // Block invasion
        assert_eq!(point_outcome('B', '/'), Some(PointOutcome::Lost));
        assert_eq!(point_outcome('R', '='), Some(PointOutcome::Lost));
        assert_eq!(point_outcome('R', '#'), None);
        assert_eq!(point_outcome('D', '/'), None);
        assert_eq!(point_outcome('X', '='), None);
        for &(skill, _) in SKILLS {
            assert_eq!(point_outcome(skill, '='), Some(PointOutcome::Lost));
        }
    }
}
