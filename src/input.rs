/// Input sampling — held keys in, movement/fire intents out.
///
/// Instead of acting on each key event individually, a `HeldKeys` map
/// records the frame number of the last press/repeat event for every
/// key.  Each frame the session asks which keys are still "fresh" and
/// derives level-triggered intents from them — movement and firing
/// depend on "is this key currently down", never on discrete presses.
///
/// Works on two classes of terminal:
/// * **Keyboard-enhancement capable** (kitty protocol): proper
///   `Press` / `Repeat` / `Release` events — keys are removed on
///   release.
/// * **Classic terminals**: only `Press` events (OS key-repeat shows
///   as repeated `Press`).  Keys expire after `HOLD_WINDOW` frames of
///   silence, which is shorter than the OS repeat interval, so a held
///   key stays live while it keeps generating repeats.

use std::collections::HashMap;

use crossterm::event::{KeyCode, KeyEventKind};
use serde::{Deserialize, Serialize};

/// A key is considered held if its last press/repeat event arrived
/// within this many frames.
const HOLD_WINDOW: u64 = 4;

/// Which physical keys drive the logical intents.  Persisted as part
/// of the settings record.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ControlScheme {
    #[default]
    Wasd,
    Arrows,
}

impl ControlScheme {
    pub fn toggled(self) -> ControlScheme {
        match self {
            ControlScheme::Wasd => ControlScheme::Arrows,
            ControlScheme::Arrows => ControlScheme::Wasd,
        }
    }
}

/// Continuous intents sampled from held keys for one frame.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct Intents {
    pub left: bool,
    pub right: bool,
    pub up: bool,
    pub down: bool,
    pub fire: bool,
}

/// Maps each live key to the frame it was last seen (press or repeat).
#[derive(Debug, Default)]
pub struct HeldKeys {
    key_frame: HashMap<KeyCode, u64>,
}

impl HeldKeys {
    pub fn new() -> HeldKeys {
        HeldKeys::default()
    }

    /// Feed one key event.  Press and repeat refresh the key's
    /// timestamp; release drops it immediately.
    pub fn record(&mut self, code: KeyCode, kind: KeyEventKind, frame: u64) {
        match kind {
            KeyEventKind::Press | KeyEventKind::Repeat => {
                self.key_frame.insert(code, frame);
            }
            KeyEventKind::Release => {
                self.key_frame.remove(&code);
            }
        }
    }

    /// Forget everything — called when leaving the playing screen so
    /// a key held across a screen switch cannot ghost-move the ship.
    pub fn clear(&mut self) {
        self.key_frame.clear();
    }

    fn is_held(&self, code: KeyCode, frame: u64) -> bool {
        self.key_frame
            .get(&code)
            .is_some_and(|&last| frame.saturating_sub(last) <= HOLD_WINDOW)
    }

    /// Letter keys match case-insensitively.
    fn is_char_held(&self, c: char, frame: u64) -> bool {
        self.is_held(KeyCode::Char(c.to_ascii_lowercase()), frame)
            || self.is_held(KeyCode::Char(c.to_ascii_uppercase()), frame)
    }
}

/// Translate the currently-held keys into intents under the active
/// control scheme.  Fire is Space in both schemes.
pub fn sample(held: &HeldKeys, scheme: ControlScheme, frame: u64) -> Intents {
    let (left, right, up, down) = match scheme {
        ControlScheme::Wasd => (
            held.is_char_held('a', frame),
            held.is_char_held('d', frame),
            held.is_char_held('w', frame),
            held.is_char_held('s', frame),
        ),
        ControlScheme::Arrows => (
            held.is_held(KeyCode::Left, frame),
            held.is_held(KeyCode::Right, frame),
            held.is_held(KeyCode::Up, frame),
            held.is_held(KeyCode::Down, frame),
        ),
    };
    Intents {
        left,
        right,
        up,
        down,
        fire: held.is_held(KeyCode::Char(' '), frame),
    }
}
