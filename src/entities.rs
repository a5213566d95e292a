/// All game entity types — pure data, no logic.
///
/// Every moving object shares the same base shape: a unique id, a
/// float position (top-left anchored), a per-frame velocity and a
/// bounding box used for collision.  The simulation in `compute`
/// rebuilds these records each frame; nothing here updates itself.

use serde::{Deserialize, Serialize};

use crate::geometry::Rect;

// ── Arena ─────────────────────────────────────────────────────────────────────

/// Logical play-field width in arena units.
pub const ARENA_WIDTH: f32 = 800.0;
/// Logical play-field height in arena units.
pub const ARENA_HEIGHT: f32 = 600.0;
/// Bullets survive this far outside the arena before pruning.
pub const ARENA_MARGIN: f32 = 12.0;

// ── Difficulty ────────────────────────────────────────────────────────────────

/// Persisted difficulty setting.  Scales enemy spawn cadence and fire
/// probability in `compute`.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Difficulty {
    Easy,
    #[default]
    Normal,
    Hard,
}

impl Difficulty {
    /// Next setting in the Easy → Normal → Hard → Easy cycle.
    pub fn cycled(self) -> Difficulty {
        match self {
            Difficulty::Easy => Difficulty::Normal,
            Difficulty::Normal => Difficulty::Hard,
            Difficulty::Hard => Difficulty::Easy,
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum GameStatus {
    Playing,
    GameOver,
}

// ── Enemies ───────────────────────────────────────────────────────────────────

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum EnemyKind {
    /// Mid-sized, mid-speed baseline attacker.
    Basic,
    /// Small and quick, dies to a single player bullet.
    Fast,
    /// Large, slow, soaks several hits, worth the most points.
    Heavy,
}

impl EnemyKind {
    pub fn size(self) -> (f32, f32) {
        match self {
            EnemyKind::Basic => (40.0, 40.0),
            EnemyKind::Fast => (30.0, 30.0),
            EnemyKind::Heavy => (60.0, 50.0),
        }
    }

    /// Downward drift per frame.
    pub fn speed(self) -> f32 {
        match self {
            EnemyKind::Basic => 2.0,
            EnemyKind::Fast => 4.0,
            EnemyKind::Heavy => 1.0,
        }
    }

    pub fn max_health(self) -> i32 {
        match self {
            EnemyKind::Basic => 40,
            EnemyKind::Fast => 20,
            EnemyKind::Heavy => 100,
        }
    }

    /// Score awarded when destroyed.
    pub fn points(self) -> u32 {
        match self {
            EnemyKind::Basic => 25,
            EnemyKind::Fast => 40,
            EnemyKind::Heavy => 75,
        }
    }

    /// Min frames between shots from one enemy.
    pub fn fire_interval(self) -> u64 {
        match self {
            EnemyKind::Basic => 90,
            EnemyKind::Fast => 70,
            EnemyKind::Heavy => 120,
        }
    }
}

#[derive(Clone, Debug)]
pub struct Enemy {
    pub id: u64,
    pub x: f32,
    pub y: f32,
    pub vx: f32,
    pub vy: f32,
    pub w: f32,
    pub h: f32,
    pub kind: EnemyKind,
    pub health: i32,
    pub max_health: i32,
    /// Frame this enemy last fired — gates its fire-interval cooldown.
    pub last_shot_frame: u64,
}

impl Enemy {
    pub fn rect(&self) -> Rect {
        Rect { x: self.x, y: self.y, w: self.w, h: self.h }
    }
}

// ── Projectiles ───────────────────────────────────────────────────────────────

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum BulletOwner {
    Player,
    Enemy,
}

#[derive(Clone, Debug)]
pub struct Bullet {
    pub id: u64,
    pub x: f32,
    pub y: f32,
    pub vx: f32,
    pub vy: f32,
    pub w: f32,
    pub h: f32,
    pub damage: i32,
    pub owner: BulletOwner,
}

impl Bullet {
    pub fn rect(&self) -> Rect {
        Rect { x: self.x, y: self.y, w: self.w, h: self.h }
    }
}

// ── Power-ups ─────────────────────────────────────────────────────────────────

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum PowerUpKind {
    /// Instantly heals a fixed amount, capped at max health.
    Health,
    /// Instantly restores the shield to full.
    Shield,
    /// Fire-rate cooldown cut to a third for the buff duration.
    RapidFire,
    /// Three-way spread shot for the buff duration.
    MultiShot,
    /// Doubles points from kills for the buff duration.
    ScoreMultiplier,
}

impl PowerUpKind {
    /// Buff duration in frames; `None` for instant-effect kinds.
    pub fn duration(self) -> Option<u64> {
        match self {
            PowerUpKind::Health | PowerUpKind::Shield => None,
            PowerUpKind::RapidFire
            | PowerUpKind::MultiShot
            | PowerUpKind::ScoreMultiplier => Some(450),
        }
    }
}

#[derive(Clone, Debug)]
pub struct PowerUp {
    pub id: u64,
    pub x: f32,
    pub y: f32,
    pub vx: f32,
    pub vy: f32,
    pub w: f32,
    pub h: f32,
    pub kind: PowerUpKind,
}

impl PowerUp {
    pub fn rect(&self) -> Rect {
        Rect { x: self.x, y: self.y, w: self.w, h: self.h }
    }
}

// ── Particles ─────────────────────────────────────────────────────────────────

/// Display tint for a particle burst.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ParticleColor {
    Gold,
    Ember,
    Cyan,
    Green,
    Violet,
}

/// Decorative debris.  Carries the common base shape but never
/// participates in collision.
#[derive(Clone, Debug)]
pub struct Particle {
    pub id: u64,
    pub x: f32,
    pub y: f32,
    pub vx: f32,
    pub vy: f32,
    pub w: f32,
    pub h: f32,
    pub life: u32,
    pub max_life: u32,
    pub color: ParticleColor,
}

// ── Player ────────────────────────────────────────────────────────────────────

#[derive(Clone, Debug)]
pub struct Player {
    pub id: u64,
    pub x: f32,
    pub y: f32,
    pub vx: f32,
    pub vy: f32,
    pub w: f32,
    pub h: f32,
    pub health: i32,
    pub max_health: i32,
    pub shield: i32,
    pub max_shield: i32,
    /// Min frames between shots (before the rapid-fire cut).
    pub fire_cooldown: u64,
    pub last_shot_frame: u64,
    /// Buff deadlines as frame numbers.  A new session rebuilds the
    /// whole player record, so an old deadline can never leak forward.
    pub rapid_fire_until: Option<u64>,
    pub multi_shot_until: Option<u64>,
    pub score_mult_until: Option<u64>,
}

impl Player {
    pub fn rect(&self) -> Rect {
        Rect { x: self.x, y: self.y, w: self.w, h: self.h }
    }

    pub fn rapid_fire_active(&self, frame: u64) -> bool {
        self.rapid_fire_until.is_some_and(|until| frame < until)
    }

    pub fn multi_shot_active(&self, frame: u64) -> bool {
        self.multi_shot_until.is_some_and(|until| frame < until)
    }

    pub fn score_mult_active(&self, frame: u64) -> bool {
        self.score_mult_until.is_some_and(|until| frame < until)
    }

    /// Shield-then-health absorption.  The shield soaks what it can,
    /// the remainder comes off health; both stay in `[0, max]`.
    pub fn take_damage(&mut self, amount: i32) {
        let amount = amount.max(0);
        let absorbed = self.shield.min(amount);
        self.shield -= absorbed;
        self.health = (self.health - (amount - absorbed)).max(0);
    }

    pub fn heal(&mut self, amount: i32) {
        self.health = (self.health + amount.max(0)).min(self.max_health);
    }
}

// ── Session bookkeeping ───────────────────────────────────────────────────────

/// Cumulative counters for one session.  Reset wholesale on new game.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct GameStats {
    pub score: u32,
    pub level: u32,
    pub kills: u32,
    pub shots_fired: u32,
    pub shots_hit: u32,
}

impl GameStats {
    /// Hit percentage in `[0, 100]`; 0 before the first shot.
    pub fn accuracy(&self) -> f32 {
        if self.shots_fired == 0 {
            return 0.0;
        }
        (100.0 * self.shots_hit as f32 / self.shots_fired as f32).min(100.0)
    }
}

// ── Master game state ─────────────────────────────────────────────────────────

/// The entire simulation state for one session.  Cloneable so pure
/// update functions can return a new copy without mutating the
/// original.
#[derive(Clone, Debug)]
pub struct GameState {
    pub frame: u64,
    /// Next entity id to hand out.
    pub next_id: u64,
    pub player: Player,
    pub enemies: Vec<Enemy>,
    pub bullets: Vec<Bullet>,
    pub power_ups: Vec<PowerUp>,
    pub particles: Vec<Particle>,
    pub stats: GameStats,
    pub status: GameStatus,
    pub difficulty: Difficulty,
    /// Frames accumulated toward the next enemy spawn.
    pub enemy_spawn_timer: u32,
    /// Frames accumulated toward the next power-up spawn.
    pub power_up_spawn_timer: u32,
}

impl GameState {
    pub fn alloc_id(&mut self) -> u64 {
        let id = self.next_id;
        self.next_id += 1;
        id
    }
}
