/// Session control — which screen is live, and what happens to the
/// durable record when a run ends.
///
/// The screen flow is an explicit state machine: `transition` either
/// yields the next screen or rejects the move.  Notably `Paused`
/// cannot reach `GameOver` directly; only the termination check inside
/// an actually-playing session ends a run.

use thiserror::Error;

use crate::storage::GameData;

/// Scores kept on the all-time list.
pub const MAX_HIGH_SCORES: usize = 10;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Screen {
    Menu,
    Playing,
    Paused,
    GameOver,
    Settings,
    HighScores,
}

/// Things that can request a screen change.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ScreenEvent {
    /// "Start new game" — valid from every screen; the caller must
    /// rebuild the whole session state before entering Playing.
    StartGame,
    /// Explicit pause toggle.
    TogglePause,
    /// The termination check fired.
    PlayerDied,
    OpenSettings,
    OpenHighScores,
    /// Leave the current overlay/screen for its parent.
    Back,
}

#[derive(Debug, Error, PartialEq, Eq)]
#[error("cannot apply {event:?} while on {from:?}")]
pub struct TransitionError {
    pub from: Screen,
    pub event: ScreenEvent,
}

impl Screen {
    /// Apply one event.  Invalid combinations are rejected rather
    /// than silently ignored so callers cannot drift into impossible
    /// flows (e.g. Paused → GameOver).
    pub fn transition(self, event: ScreenEvent) -> Result<Screen, TransitionError> {
        use Screen::*;
        match (self, event) {
            (_, ScreenEvent::StartGame) => Ok(Playing),
            (Playing, ScreenEvent::TogglePause) => Ok(Paused),
            (Paused, ScreenEvent::TogglePause) => Ok(Playing),
            (Playing, ScreenEvent::PlayerDied) => Ok(GameOver),
            (Menu, ScreenEvent::OpenSettings) => Ok(Settings),
            (Menu, ScreenEvent::OpenHighScores) => Ok(HighScores),
            (Playing | Paused | GameOver | Settings | HighScores, ScreenEvent::Back) => Ok(Menu),
            (from, event) => Err(TransitionError { from, event }),
        }
    }
}

/// Whether `score` would make the all-time list in its current state.
pub fn is_high_score(data: &GameData, score: u32) -> bool {
    if score == 0 {
        return false;
    }
    data.high_scores.len() < MAX_HIGH_SCORES
        || data.high_scores.last().is_some_and(|&lowest| score > lowest)
}

/// Game-over bookkeeping: merge the final score into the capped,
/// descending high-score list and roll the lifetime aggregates.  The
/// caller persists the record afterwards.
pub fn record_game_over(data: &mut GameData, score: u32) {
    data.high_scores.push(score);
    data.high_scores.sort_unstable_by(|a, b| b.cmp(a));
    data.high_scores.truncate(MAX_HIGH_SCORES);
    data.total_games_played += 1;
    data.total_score += u64::from(score);
}
