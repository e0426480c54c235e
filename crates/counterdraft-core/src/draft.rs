// Draft state: two five-slot rosters, two five-slot ban lists, and the
// per-room suggestion cap. Plus the report recomputed from it after every
// change.

use std::fmt;

use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::debug;

use crate::dataset::CounterDataset;
use crate::estimate::{cross_advantage, estimate_win, CrossAdvantage, WinEstimate, WinModel};
use crate::resolver::HeroResolver;
use crate::roles::RoleMap;
use crate::suggest::{suggest, Suggestion};

/// Slots per roster and per ban list.
pub const ROSTER_SIZE: usize = 5;
/// Upper bound for the number of suggested counters.
pub const MAX_PICKS_LIMIT: usize = 5;

pub const DEFAULT_ROOM: &str = "public";

#[derive(Debug, Error, PartialEq, Eq)]
pub enum DraftError {
    #[error("slot {slot} is out of range (roster has {size} slots)")]
    SlotOutOfRange { slot: usize, size: usize },
}

/// Which side of the draft. Team A is the user's side; team B the enemy.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Team {
    A,
    B,
}

impl Team {
    /// Parse "a"/"b" (also "ally"/"enemy"), case-insensitively.
    pub fn from_str_team(s: &str) -> Option<Self> {
        match s.trim().to_lowercase().as_str() {
            "a" | "ally" | "us" => Some(Team::A),
            "b" | "enemy" | "them" => Some(Team::B),
            _ => None,
        }
    }
}

impl fmt::Display for Team {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Team::A => f.write_str("Team A"),
            Team::B => f.write_str("Team B"),
        }
    }
}

/// Complete draft state for one room. This is also the payload shared with
/// other participants of the room.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DraftState {
    pub room: String,
    pub max_picks: usize,
    pub team_a: Vec<String>,
    pub team_b: Vec<String>,
    pub bans_a: Vec<String>,
    pub bans_b: Vec<String>,
}

impl Default for DraftState {
    fn default() -> Self {
        DraftState::new(DEFAULT_ROOM)
    }
}

impl DraftState {
    pub fn new(room: &str) -> Self {
        DraftState {
            room: room.to_string(),
            max_picks: MAX_PICKS_LIMIT,
            team_a: vec![String::new(); ROSTER_SIZE],
            team_b: vec![String::new(); ROSTER_SIZE],
            bans_a: vec![String::new(); ROSTER_SIZE],
            bans_b: vec![String::new(); ROSTER_SIZE],
        }
    }

    pub fn picks(&self, team: Team) -> &[String] {
        match team {
            Team::A => &self.team_a,
            Team::B => &self.team_b,
        }
    }

    pub fn bans(&self, team: Team) -> &[String] {
        match team {
            Team::A => &self.bans_a,
            Team::B => &self.bans_b,
        }
    }

    fn picks_mut(&mut self, team: Team) -> &mut Vec<String> {
        match team {
            Team::A => &mut self.team_a,
            Team::B => &mut self.team_b,
        }
    }

    fn bans_mut(&mut self, team: Team) -> &mut Vec<String> {
        match team {
            Team::A => &mut self.bans_a,
            Team::B => &mut self.bans_b,
        }
    }

    /// Store raw text in a pick slot without any correction.
    pub fn set_pick(&mut self, team: Team, slot: usize, value: &str) -> Result<(), DraftError> {
        *slot_mut(self.picks_mut(team), slot)? = value.to_string();
        Ok(())
    }

    /// Store raw text in a ban slot without any correction.
    pub fn set_ban(&mut self, team: Team, slot: usize, value: &str) -> Result<(), DraftError> {
        *slot_mut(self.bans_mut(team), slot)? = value.to_string();
        Ok(())
    }

    /// Commit a pick slot: snap its text to the closest known hero.
    /// Returns whether the slot changed.
    pub fn commit_pick(
        &mut self,
        team: Team,
        slot: usize,
        resolver: &HeroResolver,
    ) -> Result<bool, DraftError> {
        Ok(commit(slot_mut(self.picks_mut(team), slot)?, resolver))
    }

    /// Commit a ban slot. Returns whether the slot changed.
    pub fn commit_ban(
        &mut self,
        team: Team,
        slot: usize,
        resolver: &HeroResolver,
    ) -> Result<bool, DraftError> {
        Ok(commit(slot_mut(self.bans_mut(team), slot)?, resolver))
    }

    /// Set the suggestion cap, clamped to `1..=5`.
    pub fn set_max_picks(&mut self, k: usize) {
        self.max_picks = k.clamp(1, MAX_PICKS_LIMIT);
    }

    /// Clear every slot and restore the default cap. The room is kept.
    pub fn reset(&mut self) {
        let room = std::mem::take(&mut self.room);
        *self = DraftState::new(&room);
    }

    /// Number of non-blank pick slots for `team`.
    pub fn filled(&self, team: Team) -> usize {
        self.picks(team).iter().filter(|s| !s.trim().is_empty()).count()
    }

    /// Whether both rosters are complete.
    pub fn all_picked(&self) -> bool {
        self.filled(Team::A) == ROSTER_SIZE && self.filled(Team::B) == ROSTER_SIZE
    }
}

fn slot_mut(slots: &mut [String], slot: usize) -> Result<&mut String, DraftError> {
    let size = slots.len();
    slots
        .get_mut(slot)
        .ok_or(DraftError::SlotOutOfRange { slot, size })
}

fn commit(value: &mut String, resolver: &HeroResolver) -> bool {
    let resolved = resolver.resolve(value);
    if resolved == *value {
        return false;
    }
    debug!("committed '{}' as '{}'", value, resolved);
    *value = resolved;
    true
}

// ---------------------------------------------------------------------------
// Report
// ---------------------------------------------------------------------------

/// Everything derived from a draft state for display.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DraftReport {
    /// Counters for team A against team B's picks.
    pub suggestion: Suggestion,
    /// Whether the suggestion was restricted to one hero per lane.
    pub lane_constrained: bool,
    pub estimate: Option<WinEstimate>,
    pub advantage: CrossAdvantage,
}

impl DraftReport {
    /// Recompute the report. The suggestion is lane-constrained whenever a
    /// non-empty role map is available.
    pub fn compute(
        state: &DraftState,
        dataset: &CounterDataset,
        roles: Option<&RoleMap>,
        model: &WinModel,
    ) -> Self {
        let roles = roles.filter(|r| !r.is_empty());
        let suggestion = suggest(dataset, &state.team_b, state.max_picks, roles);
        let estimate = estimate_win(dataset, &state.team_a, &state.team_b, model);
        let advantage = cross_advantage(dataset, &state.team_a, &state.team_b);
        DraftReport {
            suggestion,
            lane_constrained: roles.is_some(),
            estimate,
            advantage,
        }
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
