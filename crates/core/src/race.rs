//! Top-level race flow.
//!
//! Game flow is an explicit phase value the host polls each tick;
//! transitions are plain functions rather than chained callbacks. The
//! coordinator also owns the race id, which fences completion claims:
//! a claim naming a previous race is silently dropped, so two karts
//! finishing in the same relay window cannot reset a race twice.

use serde::{Deserialize, Serialize};

/// Milliseconds the lobby waits before a race starts.
pub const LOBBY_COUNTDOWN_MS: f64 = 30_000.0;
/// Milliseconds the grid holds still after the race phase begins.
pub const RACE_COUNTDOWN_MS: f64 = 3_000.0;
/// Milliseconds the results stay up before returning to the lobby.
pub const RESULTS_LINGER_MS: f64 = 10_000.0;

/// The phase the whole session is in.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum GamePhase {
    Lobby,
    Racing,
    RaceComplete,
}

/// Drives `Lobby → Racing → RaceComplete → Lobby …` off a polled clock.
#[derive(Debug, Clone)]
pub struct RaceCoordinator {
    phase: GamePhase,
    phase_started_ms: f64,
    race_id: u32,
    winner: Option<String>,
}

impl RaceCoordinator {
    pub fn new(now_ms: f64) -> Self {
        Self {
            phase: GamePhase::Lobby,
            phase_started_ms: now_ms,
            race_id: 0,
            winner: None,
        }
    }

    pub fn phase(&self) -> GamePhase {
        self.phase
    }

    /// Id of the current (or upcoming) race.
    pub fn race_id(&self) -> u32 {
        self.race_id
    }

    pub fn winner(&self) -> Option<&str> {
        self.winner.as_deref()
    }

    /// Starts the next race immediately and returns its id.
    pub fn begin_race(&mut self, now_ms: f64) -> u32 {
        self.race_id += 1;
        self.phase = GamePhase::Racing;
        self.phase_started_ms = now_ms;
        self.winner = None;
        log::info!("race {} started", self.race_id);
        self.race_id
    }

    /// Remaining hold time at the start of the race phase, zero once the
    /// grid is released.
    pub fn race_countdown_remaining_ms(&self, now_ms: f64) -> f64 {
        if self.phase != GamePhase::Racing {
            return 0.0;
        }
        (RACE_COUNTDOWN_MS - (now_ms - self.phase_started_ms)).max(0.0)
    }

    /// Handles a completion claim. Honored only while racing and only if
    /// the claim names the current race; anything else is dropped, which
    /// makes completion idempotent across simultaneous finishers.
    pub fn try_complete(&mut self, race_id: u32, winner: &str, now_ms: f64) -> bool {
        if self.phase != GamePhase::Racing || race_id != self.race_id {
            log::debug!(
                "dropping completion claim for race {race_id} (current {}, phase {:?})",
                self.race_id,
                self.phase
            );
            return false;
        }
        self.phase = GamePhase::RaceComplete;
        self.phase_started_ms = now_ms;
        self.winner = Some(winner.to_string());
        log::info!("race {} won by '{winner}'", self.race_id);
        true
    }

    /// Polled once per tick: runs the countdown transitions and returns
    /// the phase to act on.
    pub fn advance(&mut self, now_ms: f64) -> GamePhase {
        let elapsed = now_ms - self.phase_started_ms;
        match self.phase {
            GamePhase::Lobby if elapsed >= LOBBY_COUNTDOWN_MS => {
                self.begin_race(now_ms);
            }
            GamePhase::RaceComplete if elapsed >= RESULTS_LINGER_MS => {
                self.phase = GamePhase::Lobby;
                self.phase_started_ms = now_ms;
            }
            _ => {}
        }
        self.phase
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn lobby_counts_down_into_racing() {
        let mut race = RaceCoordinator::new(0.0);
        assert_eq!(race.advance(1_000.0), GamePhase::Lobby);
        assert_eq!(race.advance(LOBBY_COUNTDOWN_MS), GamePhase::Racing);
        assert_eq!(race.race_id(), 1);
    }

    #[test]
    fn race_countdown_holds_then_releases() {
        let mut race = RaceCoordinator::new(0.0);
        race.begin_race(0.0);
        assert!(race.race_countdown_remaining_ms(1_000.0) > 0.0);
        assert_eq!(race.race_countdown_remaining_ms(RACE_COUNTDOWN_MS), 0.0);
    }

    #[test]
    fn completion_is_fenced_by_race_id() {
        let mut race = RaceCoordinator::new(0.0);
        let id = race.begin_race(0.0);

        // A claim from a previous race is dropped.
        assert!(!race.try_complete(id - 1, "Mallory", 5_000.0));
        assert_eq!(race.phase(), GamePhase::Racing);

        assert!(race.try_complete(id, "Ada", 6_000.0));
        assert_eq!(race.phase(), GamePhase::RaceComplete);
        assert_eq!(race.winner(), Some("Ada"));

        // The duplicate from a simultaneous finisher is dropped too.
        assert!(!race.try_complete(id, "Bob", 6_001.0));
        assert_eq!(race.winner(), Some("Ada"));
    }

    #[test]
    fn results_linger_then_return_to_lobby() {
        let mut race = RaceCoordinator::new(0.0);
        let id = race.begin_race(0.0);
        race.try_complete(id, "Ada", 10_000.0);

        assert_eq!(race.advance(10_000.0 + RESULTS_LINGER_MS - 1.0), GamePhase::RaceComplete);
        assert_eq!(race.advance(10_000.0 + RESULTS_LINGER_MS), GamePhase::Lobby);

        // The next race gets a fresh id.
        assert_eq!(race.begin_race(50_000.0), id + 1);
        assert_eq!(race.winner(), None);
    }
}
