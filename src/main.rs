use std::fs;
use std::io::{stdout, BufWriter, Write};
use std::sync::mpsc;
use std::thread;
use std::time::{Duration, Instant};

use crossterm::{
    cursor,
    event::{
        self, Event, KeyCode, KeyEvent, KeyEventKind, KeyModifiers,
        KeyboardEnhancementFlags, PopKeyboardEnhancementFlags, PushKeyboardEnhancementFlags,
    },
    terminal, ExecutableCommand,
};
use log::{debug, warn};
use rand::thread_rng;

use starfall::compute::{init_state, tick};
use starfall::display;
use starfall::entities::GameStatus;
use starfall::input::{self, HeldKeys};
use starfall::logging;
use starfall::session::{self, Screen, ScreenEvent};
use starfall::storage::{FileStorage, GameData};

const FRAME: Duration = Duration::from_millis(33); // ≈30 FPS

/// Export/import exchange file, created in the working directory.
const EXPORT_FILE: &str = "starfall-data.json";

// ── Entry point ───────────────────────────────────────────────────────────────

fn main() -> std::io::Result<()> {
    logging::init();

    let raw_out = stdout();
    let mut out = BufWriter::new(raw_out);

    terminal::enable_raw_mode()?;
    out.execute(terminal::EnterAlternateScreen)?;
    out.execute(cursor::Hide)?;

    // Request key-release (and key-repeat) events from the terminal.
    // Kitty-protocol terminals support this; others fall back to the
    // hold-window expiry in `input`.
    let keyboard_enhanced = out
        .execute(PushKeyboardEnhancementFlags(
            KeyboardEnhancementFlags::REPORT_EVENT_TYPES,
        ))
        .is_ok();

    // Dedicate a thread exclusively to blocking event reads, sending
    // them through a channel so the frame loop never blocks on I/O.
    let (tx, rx) = mpsc::channel::<Event>();
    thread::spawn(move || loop {
        match event::read() {
            Ok(ev) => {
                if tx.send(ev).is_err() {
                    break; // receiver dropped → program exiting
                }
            }
            Err(_) => break,
        }
    });

    let result = run(&mut out, &rx);

    // Always restore the terminal
    if keyboard_enhanced {
        let _ = out.execute(PopKeyboardEnhancementFlags);
    }
    let _ = out.execute(cursor::Show);
    let _ = out.execute(terminal::LeaveAlternateScreen);
    let _ = terminal::disable_raw_mode();

    result
}

// ── Session controller ────────────────────────────────────────────────────────

fn run<W: Write>(out: &mut W, rx: &mpsc::Receiver<Event>) -> std::io::Result<()> {
    let mut storage = FileStorage::in_home();
    let mut data = GameData::load(&storage);
    let mut screen = Screen::Menu;

    loop {
        match screen {
            Screen::Menu => {
                let event = match menu_screen(out, rx, &data)? {
                    Some(ev) => ev,
                    None => break,
                };
                if let Ok(next) = screen.transition(event) {
                    screen = next;
                }
            }
            Screen::Playing => match play(out, rx, &mut data, &mut storage)? {
                PlayOutcome::ToMenu => screen = Screen::Menu,
                PlayOutcome::Quit => break,
            },
            Screen::Settings => {
                if settings_screen(out, rx, &mut data, &mut storage)? {
                    break;
                }
                screen = Screen::Menu;
            }
            Screen::HighScores => {
                if high_scores_screen(out, rx, &data)? {
                    break;
                }
                screen = Screen::Menu;
            }
            // Paused and GameOver never escape the play loop.
            Screen::Paused | Screen::GameOver => screen = Screen::Menu,
        }
    }
    Ok(())
}

fn ctrl_c(code: KeyCode, modifiers: KeyModifiers) -> bool {
    code == KeyCode::Char('c') && modifiers.contains(KeyModifiers::CONTROL)
}

// ── Menu ──────────────────────────────────────────────────────────────────────

/// Returns the chosen screen event, or `None` to quit the program.
fn menu_screen<W: Write>(
    out: &mut W,
    rx: &mpsc::Receiver<Event>,
    data: &GameData,
) -> std::io::Result<Option<ScreenEvent>> {
    display::render_menu(out, data)?;
    loop {
        let ev = match rx.recv() {
            Ok(ev) => ev,
            Err(_) => return Ok(None), // input thread gone
        };
        if let Event::Key(KeyEvent { code, kind: KeyEventKind::Press, modifiers, .. }) = ev {
            if ctrl_c(code, modifiers) {
                return Ok(None);
            }
            match code {
                KeyCode::Enter => return Ok(Some(ScreenEvent::StartGame)),
                KeyCode::Char('s') | KeyCode::Char('S') => {
                    return Ok(Some(ScreenEvent::OpenSettings));
                }
                KeyCode::Char('h') | KeyCode::Char('H') => {
                    return Ok(Some(ScreenEvent::OpenHighScores));
                }
                KeyCode::Char('q') | KeyCode::Char('Q') => return Ok(None),
                _ => {}
            }
        }
    }
}

// ── Game loop ─────────────────────────────────────────────────────────────────

enum PlayOutcome {
    ToMenu,
    Quit,
}

/// Runs one session: Playing ⇄ Paused, Playing → GameOver, restart.
/// Ticks only while actually playing — pausing stops the simulation,
/// resuming cannot double-step because there is exactly one loop.
fn play<W: Write>(
    out: &mut W,
    rx: &mpsc::Receiver<Event>,
    data: &mut GameData,
    storage: &mut FileStorage,
) -> std::io::Result<PlayOutcome> {
    let mut rng = thread_rng();
    let mut state = init_state(data.settings.difficulty);
    let mut screen = Screen::Playing;
    let mut held = HeldKeys::new();
    let mut new_high = false;

    loop {
        let frame_start = Instant::now();

        // ── Drain all pending input events (non-blocking) ─────────────────────
        while let Ok(Event::Key(KeyEvent { code, kind, modifiers, .. })) = rx.try_recv() {
            if kind == KeyEventKind::Press {
                if ctrl_c(code, modifiers) {
                    return Ok(PlayOutcome::Quit);
                }
                match code {
                    KeyCode::Char('q') | KeyCode::Char('Q') => {
                        // Back is valid from Playing, Paused and GameOver.
                        return Ok(PlayOutcome::ToMenu);
                    }
                    KeyCode::Char('p') | KeyCode::Char('P') => {
                        if let Ok(next) = screen.transition(ScreenEvent::TogglePause) {
                            screen = next;
                            held.clear();
                        }
                    }
                    KeyCode::Char('r') | KeyCode::Char('R') => {
                        if screen == Screen::GameOver {
                            if let Ok(next) = screen.transition(ScreenEvent::StartGame) {
                                screen = next;
                                state = init_state(data.settings.difficulty);
                                new_high = false;
                                held.clear();
                            }
                        }
                    }
                    _ => {}
                }
            }
            held.record(code, kind, state.frame);
        }

        // ── Simulate ──────────────────────────────────────────────────────────
        if screen == Screen::Playing {
            let intents = input::sample(&held, data.settings.controls, state.frame);
            let prev_kills = state.stats.kills;
            let prev_health = state.player.health;
            state = tick(&state, &intents, &mut rng);

            if data.settings.sound_enabled
                && (state.stats.kills > prev_kills || state.player.health < prev_health)
            {
                display::bell(out)?;
            }

            if state.status == GameStatus::GameOver {
                if let Ok(next) = screen.transition(ScreenEvent::PlayerDied) {
                    screen = next;
                    new_high = session::is_high_score(data, state.stats.score);
                    session::record_game_over(data, state.stats.score);
                    if let Err(e) = data.save(storage) {
                        warn!("failed to save game data: {e}");
                    }
                    debug!(
                        "session over: score {}, accuracy {:.0}%",
                        state.stats.score,
                        state.stats.accuracy()
                    );
                }
            }
        }

        display::render_game(out, &state, screen, new_high)?;

        let elapsed = frame_start.elapsed();
        if elapsed < FRAME {
            thread::sleep(FRAME - elapsed);
        }
    }
}

// ── Settings ──────────────────────────────────────────────────────────────────

/// Returns `true` to quit the program, `false` to go back to the menu.
fn settings_screen<W: Write>(
    out: &mut W,
    rx: &mpsc::Receiver<Event>,
    data: &mut GameData,
    storage: &mut FileStorage,
) -> std::io::Result<bool> {
    let mut status = String::new();
    loop {
        display::render_settings(out, data, &status)?;
        let ev = match rx.recv() {
            Ok(ev) => ev,
            Err(_) => return Ok(true),
        };
        let Event::Key(KeyEvent { code, kind: KeyEventKind::Press, modifiers, .. }) = ev else {
            continue;
        };
        if ctrl_c(code, modifiers) {
            return Ok(true);
        }
        match code {
            KeyCode::Char('s') | KeyCode::Char('S') => {
                data.settings.sound_enabled = !data.settings.sound_enabled;
                status = persist(data, storage);
            }
            KeyCode::Char('d') | KeyCode::Char('D') => {
                data.settings.difficulty = data.settings.difficulty.cycled();
                status = persist(data, storage);
            }
            KeyCode::Char('c') | KeyCode::Char('C') => {
                data.settings.controls = data.settings.controls.toggled();
                status = persist(data, storage);
            }
            KeyCode::Char('e') | KeyCode::Char('E') => {
                status = export_data(data);
            }
            KeyCode::Char('i') | KeyCode::Char('I') => {
                status = import_data(data, storage);
            }
            KeyCode::Char('w') | KeyCode::Char('W') => {
                *data = GameData::default();
                status = match data.save(storage) {
                    Ok(()) => "All saved data wiped".to_string(),
                    Err(e) => format!("Wipe failed: {e}"),
                };
            }
            KeyCode::Char('b') | KeyCode::Char('B') | KeyCode::Esc => return Ok(false),
            _ => {}
        }
    }
}

fn persist(data: &GameData, storage: &mut FileStorage) -> String {
    match data.save(storage) {
        Ok(()) => String::new(),
        Err(e) => {
            warn!("failed to save settings: {e}");
            format!("Save failed: {e}")
        }
    }
}

fn export_data(data: &GameData) -> String {
    let json = match data.export_json() {
        Ok(json) => json,
        Err(e) => return format!("Export failed: {e}"),
    };
    match fs::write(EXPORT_FILE, json) {
        Ok(()) => format!("Exported to {EXPORT_FILE}"),
        Err(e) => format!("Export failed: {e}"),
    }
}

/// Import replaces the in-memory record only when the file parses;
/// any error leaves current data untouched.
fn import_data(data: &mut GameData, storage: &mut FileStorage) -> String {
    let raw = match fs::read_to_string(EXPORT_FILE) {
        Ok(raw) => raw,
        Err(e) => return format!("Cannot read {EXPORT_FILE}: {e}"),
    };
    match GameData::import_json(&raw) {
        Ok(imported) => {
            *data = imported;
            if let Err(e) = data.save(storage) {
                warn!("failed to save imported data: {e}");
            }
            format!("Imported from {EXPORT_FILE}")
        }
        Err(e) => {
            warn!("import rejected: {e}");
            format!("Import failed: {e}")
        }
    }
}

// ── High scores ───────────────────────────────────────────────────────────────

/// Returns `true` to quit the program, `false` to go back to the menu.
fn high_scores_screen<W: Write>(
    out: &mut W,
    rx: &mpsc::Receiver<Event>,
    data: &GameData,
) -> std::io::Result<bool> {
    display::render_high_scores(out, data)?;
    loop {
        let ev = match rx.recv() {
            Ok(ev) => ev,
            Err(_) => return Ok(true),
        };
        if let Event::Key(KeyEvent { code, kind: KeyEventKind::Press, modifiers, .. }) = ev {
            if ctrl_c(code, modifiers) {
                return Ok(true);
            }
            match code {
                KeyCode::Char('b') | KeyCode::Char('B') | KeyCode::Esc | KeyCode::Char('q')
                | KeyCode::Char('Q') => return Ok(false),
                _ => {}
            }
        }
    }
}
