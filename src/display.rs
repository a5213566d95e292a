/// Rendering layer — all terminal I/O lives here.
///
/// Each function receives a mutable writer and an immutable view of
/// the state it draws.  No game logic is performed; this module only
/// translates state into terminal commands.  Arena coordinates are
/// floats; everything is projected into the bordered cell grid just
/// before drawing.

use std::io::Write;

use crossterm::{
    cursor,
    style::{self, Color, Print},
    terminal, QueueableCommand,
};

use crate::entities::{
    Bullet, BulletOwner, Enemy, EnemyKind, GameState, Particle, ParticleColor, PowerUp,
    PowerUpKind, ARENA_HEIGHT, ARENA_WIDTH,
};
use crate::session::Screen;
use crate::storage::GameData;

// ── Colour palette ────────────────────────────────────────────────────────────

const C_BORDER: Color = Color::DarkBlue;
const C_HUD_SCORE: Color = Color::Yellow;
const C_HUD_LEVEL: Color = Color::White;
const C_HUD_HEALTH: Color = Color::Red;
const C_HUD_SHIELD: Color = Color::Cyan;
const C_PLAYER: Color = Color::White;
const C_ENEMY_BASIC: Color = Color::Green;
const C_ENEMY_FAST: Color = Color::Yellow;
const C_ENEMY_HEAVY: Color = Color::Red;
const C_BULLET_PLAYER: Color = Color::Cyan;
const C_BULLET_ENEMY: Color = Color::Magenta;
const C_HINT: Color = Color::DarkGrey;

fn particle_color(color: ParticleColor) -> Color {
    match color {
        ParticleColor::Gold => Color::Yellow,
        ParticleColor::Ember => Color::Red,
        ParticleColor::Cyan => Color::Cyan,
        ParticleColor::Green => Color::Green,
        ParticleColor::Violet => Color::Magenta,
    }
}

// ── Projection ────────────────────────────────────────────────────────────────

/// Screen layout: row 0 HUD, row 1 top border, rows 2..h-3 play area,
/// row h-2 bottom border, row h-1 key hints.
struct Grid {
    w: u16,
    h: u16,
}

impl Grid {
    fn new(w: u16, h: u16) -> Grid {
        Grid { w, h }
    }

    /// Project arena coordinates into play-area cells.  Returns None
    /// for positions outside the visible field (e.g. an enemy still
    /// above the top edge).
    fn project(&self, x: f32, y: f32) -> Option<(u16, u16)> {
        if !(0.0..ARENA_WIDTH).contains(&x) || !(0.0..ARENA_HEIGHT).contains(&y) {
            return None;
        }
        let cols = f32::from(self.w.saturating_sub(2));
        let rows = f32::from(self.h.saturating_sub(4));
        let cx = 1 + (x / ARENA_WIDTH * cols) as u16;
        let cy = 2 + (y / ARENA_HEIGHT * rows) as u16;
        Some((
            cx.min(self.w.saturating_sub(2)),
            cy.min(self.h.saturating_sub(3)),
        ))
    }
}

// ── Game screen ───────────────────────────────────────────────────────────────

/// Render one complete frame of the playing/paused/game-over screen.
pub fn render_game<W: Write>(
    out: &mut W,
    state: &GameState,
    screen: Screen,
    new_high: bool,
) -> std::io::Result<()> {
    out.queue(terminal::Clear(terminal::ClearType::All))?;

    let (w, h) = terminal::size()?;
    let grid = Grid::new(w, h);

    draw_border(out, &grid)?;
    draw_hud(out, state, &grid)?;

    for pt in &state.particles {
        draw_particle(out, pt, &grid)?;
    }
    for pu in &state.power_ups {
        draw_power_up(out, pu, &grid)?;
    }
    for enemy in &state.enemies {
        draw_enemy(out, enemy, &grid)?;
    }
    for bullet in &state.bullets {
        draw_bullet(out, bullet, &grid)?;
    }
    draw_player(out, state, &grid)?;
    draw_hint(out, &grid, "P : Pause   Q : Menu   Hold keys to move & fire")?;

    match screen {
        Screen::Paused => draw_center_box(
            out,
            &grid,
            &[
                ("╔══════════════╗", Color::Yellow),
                ("║    PAUSED    ║", Color::Yellow),
                ("╚══════════════╝", Color::Yellow),
                ("P - Resume   Q - Menu", Color::White),
            ],
        )?,
        Screen::GameOver => {
            let score_line = format!("Final Score: {}", state.stats.score);
            let accuracy_line = format!("Accuracy: {:.0}%", state.stats.accuracy());
            let mut lines: Vec<(&str, Color)> = vec![
                ("╔══════════════════╗", Color::Red),
                ("║    GAME  OVER    ║", Color::Red),
                ("╚══════════════════╝", Color::Red),
                (&score_line, Color::Yellow),
                (&accuracy_line, Color::White),
            ];
            if new_high {
                lines.push(("★ NEW HIGH SCORE ★", Color::Cyan));
            }
            lines.push(("R - Play Again   Q - Menu", Color::White));
            draw_center_box(out, &grid, &lines)?;
        }
        _ => {}
    }

    out.queue(style::ResetColor)?;
    out.queue(cursor::MoveTo(0, h.saturating_sub(1)))?;
    out.flush()?;
    Ok(())
}

fn draw_border<W: Write>(out: &mut W, grid: &Grid) -> std::io::Result<()> {
    let w = grid.w as usize;
    out.queue(style::SetForegroundColor(C_BORDER))?;

    out.queue(cursor::MoveTo(0, 1))?;
    out.queue(Print(format!("┌{}┐", "─".repeat(w.saturating_sub(2)))))?;

    out.queue(cursor::MoveTo(0, grid.h.saturating_sub(2)))?;
    out.queue(Print(format!("└{}┘", "─".repeat(w.saturating_sub(2)))))?;

    for row in 2..grid.h.saturating_sub(2) {
        out.queue(cursor::MoveTo(0, row))?;
        out.queue(Print("│"))?;
        out.queue(cursor::MoveTo(grid.w.saturating_sub(1), row))?;
        out.queue(Print("│"))?;
    }
    Ok(())
}

fn draw_hud<W: Write>(out: &mut W, state: &GameState, grid: &Grid) -> std::io::Result<()> {
    out.queue(cursor::MoveTo(1, 0))?;
    out.queue(style::SetForegroundColor(C_HUD_SCORE))?;
    out.queue(Print(format!("Score: {:>7}", state.stats.score)))?;

    out.queue(style::SetForegroundColor(C_HUD_LEVEL))?;
    out.queue(cursor::MoveTo(17, 0))?;
    out.queue(Print(format!(
        "Lv {:>2}   Acc {:>3.0}%",
        state.stats.level,
        state.stats.accuracy()
    )))?;

    // Health and shield as 10-segment bars, right-aligned.
    let health_bar = meter(state.player.health, state.player.max_health);
    let shield_bar = meter(state.player.shield, state.player.max_shield);
    // "HP " + 10 cells + " " + "SH " + 10 cells
    let rx = grid.w.saturating_sub(27 + 1);
    out.queue(cursor::MoveTo(rx, 0))?;
    out.queue(style::SetForegroundColor(C_HUD_HEALTH))?;
    out.queue(Print(format!("HP {health_bar} ")))?;
    out.queue(style::SetForegroundColor(C_HUD_SHIELD))?;
    out.queue(Print(format!("SH {shield_bar}")))?;
    Ok(())
}

/// 10-cell meter, e.g. `▮▮▮▮▮▯▯▯▯▯`.
fn meter(value: i32, max: i32) -> String {
    let filled = if max <= 0 {
        0
    } else {
        ((value.max(0) * 10 + max - 1) / max).min(10) as usize
    };
    format!("{}{}", "▮".repeat(filled), "▯".repeat(10 - filled))
}

fn draw_player<W: Write>(out: &mut W, state: &GameState, grid: &Grid) -> std::io::Result<()> {
    let p = &state.player;
    if let Some((cx, cy)) = grid.project(p.x + p.w / 2.0, p.y) {
        out.queue(style::SetForegroundColor(C_PLAYER))?;
        out.queue(cursor::MoveTo(cx, cy))?;
        out.queue(Print("▲"))?;
        if cy + 1 < grid.h.saturating_sub(2) {
            out.queue(cursor::MoveTo(cx.saturating_sub(1).max(1), cy + 1))?;
            out.queue(Print("/|\\"))?;
        }
    }
    Ok(())
}

fn draw_enemy<W: Write>(out: &mut W, enemy: &Enemy, grid: &Grid) -> std::io::Result<()> {
    let (sprite, color) = match enemy.kind {
        EnemyKind::Basic => ("<▼>", C_ENEMY_BASIC),
        EnemyKind::Fast => ("<◆>", C_ENEMY_FAST),
        EnemyKind::Heavy => ("[▼]", C_ENEMY_HEAVY),
    };
    if let Some((cx, cy)) = grid.project(enemy.x + enemy.w / 2.0, enemy.y + enemy.h / 2.0) {
        out.queue(style::SetForegroundColor(color))?;
        out.queue(cursor::MoveTo(cx.saturating_sub(1).max(1), cy))?;
        out.queue(Print(sprite))?;
    }
    Ok(())
}

fn draw_bullet<W: Write>(out: &mut W, bullet: &Bullet, grid: &Grid) -> std::io::Result<()> {
    if let Some((cx, cy)) = grid.project(bullet.x, bullet.y) {
        match bullet.owner {
            BulletOwner::Player => {
                out.queue(style::SetForegroundColor(C_BULLET_PLAYER))?;
                out.queue(cursor::MoveTo(cx, cy))?;
                out.queue(Print("║"))?;
            }
            BulletOwner::Enemy => {
                out.queue(style::SetForegroundColor(C_BULLET_ENEMY))?;
                out.queue(cursor::MoveTo(cx, cy))?;
                out.queue(Print("↓"))?;
            }
        }
    }
    Ok(())
}

fn draw_power_up<W: Write>(out: &mut W, pu: &PowerUp, grid: &Grid) -> std::io::Result<()> {
    let (glyph, color) = match pu.kind {
        PowerUpKind::Health => ("✚", Color::Green),
        PowerUpKind::Shield => ("◈", Color::Cyan),
        PowerUpKind::RapidFire => ("!", Color::Yellow),
        PowerUpKind::MultiShot => ("★", Color::White),
        PowerUpKind::ScoreMultiplier => ("×", Color::Magenta),
    };
    if let Some((cx, cy)) = grid.project(pu.x + pu.w / 2.0, pu.y + pu.h / 2.0) {
        out.queue(style::SetForegroundColor(color))?;
        out.queue(cursor::MoveTo(cx, cy))?;
        out.queue(Print(glyph))?;
    }
    Ok(())
}

fn draw_particle<W: Write>(out: &mut W, pt: &Particle, grid: &Grid) -> std::io::Result<()> {
    if let Some((cx, cy)) = grid.project(pt.x, pt.y) {
        out.queue(style::SetForegroundColor(particle_color(pt.color)))?;
        out.queue(cursor::MoveTo(cx, cy))?;
        // Fades to a fainter glyph over the back half of its life.
        let glyph = if pt.life * 2 > pt.max_life { "•" } else { "·" };
        out.queue(Print(glyph))?;
    }
    Ok(())
}

fn draw_hint<W: Write>(out: &mut W, grid: &Grid, hint: &str) -> std::io::Result<()> {
    out.queue(cursor::MoveTo(1, grid.h.saturating_sub(1)))?;
    out.queue(style::SetForegroundColor(C_HINT))?;
    out.queue(Print(hint))?;
    Ok(())
}

fn draw_center_box<W: Write>(
    out: &mut W,
    grid: &Grid,
    lines: &[(&str, Color)],
) -> std::io::Result<()> {
    let cx = grid.w / 2;
    let start_row = (grid.h / 2).saturating_sub(lines.len() as u16 / 2);
    for (i, (msg, color)) in lines.iter().enumerate() {
        let row = start_row + i as u16;
        let col = cx.saturating_sub(msg.chars().count() as u16 / 2);
        out.queue(cursor::MoveTo(col, row))?;
        out.queue(style::SetForegroundColor(*color))?;
        out.queue(Print(*msg))?;
    }
    Ok(())
}

// ── Menu / settings / high-score screens ──────────────────────────────────────

pub fn render_menu<W: Write>(out: &mut W, data: &GameData) -> std::io::Result<()> {
    out.queue(terminal::Clear(terminal::ClearType::All))?;
    let (width, height) = terminal::size()?;
    let cx = width / 2;
    let cy = height / 2;

    let title = "★  S T A R F A L L  ★";
    out.queue(cursor::MoveTo(
        cx.saturating_sub(title.chars().count() as u16 / 2),
        cy.saturating_sub(7),
    ))?;
    out.queue(style::SetForegroundColor(Color::Cyan))?;
    out.queue(Print(title))?;

    if let Some(&best) = data.high_scores.first() {
        let hs = format!("Best Score: {best}");
        out.queue(cursor::MoveTo(
            cx.saturating_sub(hs.chars().count() as u16 / 2),
            cy.saturating_sub(5),
        ))?;
        out.queue(style::SetForegroundColor(Color::Yellow))?;
        out.queue(Print(&hs))?;
    }

    let options: &[(&str, &str)] = &[
        ("ENTER", "Start game"),
        ("S", "Settings"),
        ("H", "High scores"),
        ("Q", "Quit"),
    ];
    for (i, (key, label)) in options.iter().enumerate() {
        out.queue(cursor::MoveTo(cx.saturating_sub(10), cy.saturating_sub(2) + i as u16))?;
        out.queue(style::SetForegroundColor(Color::DarkGrey))?;
        out.queue(Print(format!("[{key:>5}] ")))?;
        out.queue(style::SetForegroundColor(Color::White))?;
        out.queue(Print(*label))?;
    }

    out.queue(cursor::MoveTo(cx.saturating_sub(16), cy + 4))?;
    out.queue(style::SetForegroundColor(C_HINT))?;
    out.queue(Print("Power-ups (catch falling items):"))?;
    let legend: &[(&str, Color, &str)] = &[
        ("✚", Color::Green, " Health      — +25 HP"),
        ("◈", Color::Cyan, " Shield      — full shield"),
        ("!", Color::Yellow, " Rapid fire  — 3x fire rate"),
        ("★", Color::White, " Multi-shot  — 3-way spread"),
        ("×", Color::Magenta, " Multiplier  — double points"),
    ];
    for (i, (sym, color, desc)) in legend.iter().enumerate() {
        out.queue(cursor::MoveTo(cx.saturating_sub(16), cy + 5 + i as u16))?;
        out.queue(style::SetForegroundColor(*color))?;
        out.queue(Print(*sym))?;
        out.queue(style::SetForegroundColor(C_HINT))?;
        out.queue(Print(*desc))?;
    }

    out.queue(style::ResetColor)?;
    out.flush()?;
    Ok(())
}

pub fn render_settings<W: Write>(
    out: &mut W,
    data: &GameData,
    status: &str,
) -> std::io::Result<()> {
    out.queue(terminal::Clear(terminal::ClearType::All))?;
    let (width, height) = terminal::size()?;
    let cx = width / 2;
    let cy = height / 2;

    out.queue(cursor::MoveTo(cx.saturating_sub(4), cy.saturating_sub(7)))?;
    out.queue(style::SetForegroundColor(Color::Cyan))?;
    out.queue(Print("SETTINGS"))?;

    let s = &data.settings;
    let rows: Vec<(char, String)> = vec![
        ('S', format!("Sound:      {}", if s.sound_enabled { "On" } else { "Off" })),
        ('D', format!("Difficulty: {:?}", s.difficulty)),
        ('C', format!("Controls:   {:?}", s.controls)),
        ('E', "Export data to file".to_string()),
        ('I', "Import data from file".to_string()),
        ('W', "Wipe all saved data".to_string()),
        ('B', "Back".to_string()),
    ];
    for (i, (key, label)) in rows.iter().enumerate() {
        out.queue(cursor::MoveTo(cx.saturating_sub(14), cy.saturating_sub(4) + i as u16))?;
        out.queue(style::SetForegroundColor(Color::DarkGrey))?;
        out.queue(Print(format!("[{key}] ")))?;
        out.queue(style::SetForegroundColor(Color::White))?;
        out.queue(Print(label.as_str()))?;
    }

    if !status.is_empty() {
        out.queue(cursor::MoveTo(
            cx.saturating_sub(status.chars().count() as u16 / 2),
            cy + 5,
        ))?;
        out.queue(style::SetForegroundColor(Color::Yellow))?;
        out.queue(Print(status))?;
    }

    out.queue(style::ResetColor)?;
    out.flush()?;
    Ok(())
}

pub fn render_high_scores<W: Write>(out: &mut W, data: &GameData) -> std::io::Result<()> {
    out.queue(terminal::Clear(terminal::ClearType::All))?;
    let (width, height) = terminal::size()?;
    let cx = width / 2;
    let cy = height / 2;

    out.queue(cursor::MoveTo(cx.saturating_sub(5), cy.saturating_sub(8)))?;
    out.queue(style::SetForegroundColor(Color::Cyan))?;
    out.queue(Print("HIGH SCORES"))?;

    if data.high_scores.is_empty() {
        out.queue(cursor::MoveTo(cx.saturating_sub(8), cy.saturating_sub(5)))?;
        out.queue(style::SetForegroundColor(C_HINT))?;
        out.queue(Print("No games played yet"))?;
    }
    for (i, score) in data.high_scores.iter().enumerate() {
        out.queue(cursor::MoveTo(cx.saturating_sub(8), cy.saturating_sub(5) + i as u16))?;
        out.queue(style::SetForegroundColor(if i == 0 {
            Color::Yellow
        } else {
            Color::White
        }))?;
        out.queue(Print(format!("{:>2}.  {score:>8}", i + 1)))?;
    }

    let footer = format!(
        "Games played: {}   Total score: {}",
        data.total_games_played, data.total_score
    );
    out.queue(cursor::MoveTo(
        cx.saturating_sub(footer.chars().count() as u16 / 2),
        cy + 6,
    ))?;
    out.queue(style::SetForegroundColor(C_HINT))?;
    out.queue(Print(&footer))?;

    out.queue(cursor::MoveTo(cx.saturating_sub(5), cy + 8))?;
    out.queue(style::SetForegroundColor(C_HINT))?;
    out.queue(Print("B - Back"))?;

    out.queue(style::ResetColor)?;
    out.flush()?;
    Ok(())
}

/// Terminal bell — the whole "sound engine".
pub fn bell<W: Write>(out: &mut W) -> std::io::Result<()> {
    out.write_all(b"\x07")
}
