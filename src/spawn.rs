/// Entity factories — pure construction, randomness via the injected
/// RNG, ids supplied by the caller (`GameState::alloc_id`).

use rand::Rng;

use crate::entities::{
    Bullet, BulletOwner, Enemy, EnemyKind, Particle, ParticleColor, PowerUp, PowerUpKind,
    ARENA_WIDTH,
};

/// Player bullets hit harder than enemy bullets.
pub const PLAYER_BULLET_DAMAGE: i32 = 20;
pub const ENEMY_BULLET_DAMAGE: i32 = 10;

pub const BULLET_W: f32 = 4.0;
pub const BULLET_H: f32 = 10.0;
const PLAYER_BULLET_SPEED: f32 = 7.0;
const ENEMY_BULLET_SPEED: f32 = 5.0;

pub const POWER_UP_SIZE: f32 = 24.0;
const POWER_UP_FALL_SPEED: f32 = 2.0;

const PARTICLE_SIZE: f32 = 2.0;
const PARTICLE_LIFE: u32 = 24;
const PARTICLE_JITTER: f32 = 6.0;
const PARTICLE_MAX_SPEED: f32 = 3.0;

/// New enemy of a uniformly random kind, placed just above the arena
/// at a random column that keeps the whole box inside the side walls.
pub fn enemy(id: u64, rng: &mut impl Rng) -> Enemy {
    let kind = match rng.gen_range(0..3) {
        0 => EnemyKind::Basic,
        1 => EnemyKind::Fast,
        _ => EnemyKind::Heavy,
    };
    let (w, h) = kind.size();
    Enemy {
        id,
        x: rng.gen_range(0.0..=(ARENA_WIDTH - w)),
        y: -h,
        vx: 0.0,
        vy: kind.speed(),
        w,
        h,
        kind,
        health: kind.max_health(),
        max_health: kind.max_health(),
        last_shot_frame: 0,
    }
}

/// New bullet at `(x, y)`.  Vertical velocity and damage follow the
/// owner; `vx` carries the multi-shot spread for player bullets.
pub fn bullet(id: u64, owner: BulletOwner, x: f32, y: f32, vx: f32) -> Bullet {
    let (vy, damage) = match owner {
        BulletOwner::Player => (-PLAYER_BULLET_SPEED, PLAYER_BULLET_DAMAGE),
        BulletOwner::Enemy => (ENEMY_BULLET_SPEED, ENEMY_BULLET_DAMAGE),
    };
    Bullet {
        id,
        x,
        y,
        vx,
        vy,
        w: BULLET_W,
        h: BULLET_H,
        damage,
        owner,
    }
}

/// New power-up of a uniformly random kind, falling from `(x, y)`.
pub fn power_up(id: u64, x: f32, y: f32, rng: &mut impl Rng) -> PowerUp {
    let kind = match rng.gen_range(0..5) {
        0 => PowerUpKind::Health,
        1 => PowerUpKind::Shield,
        2 => PowerUpKind::RapidFire,
        3 => PowerUpKind::MultiShot,
        _ => PowerUpKind::ScoreMultiplier,
    };
    PowerUp {
        id,
        x,
        y,
        vx: 0.0,
        vy: POWER_UP_FALL_SPEED,
        w: POWER_UP_SIZE,
        h: POWER_UP_SIZE,
        kind,
    }
}

/// Burst of `count` particles around `(x, y)`: positions jittered a
/// few units off the origin, velocities random in both axes, fixed
/// lifetime.  Ids are consecutive starting at `base_id`.
pub fn particle_burst(
    base_id: u64,
    x: f32,
    y: f32,
    count: u32,
    color: ParticleColor,
    rng: &mut impl Rng,
) -> Vec<Particle> {
    (0..count)
        .map(|i| Particle {
            id: base_id + u64::from(i),
            x: x + rng.gen_range(-PARTICLE_JITTER..=PARTICLE_JITTER),
            y: y + rng.gen_range(-PARTICLE_JITTER..=PARTICLE_JITTER),
            vx: rng.gen_range(-PARTICLE_MAX_SPEED..=PARTICLE_MAX_SPEED),
            vy: rng.gen_range(-PARTICLE_MAX_SPEED..=PARTICLE_MAX_SPEED),
            w: PARTICLE_SIZE,
            h: PARTICLE_SIZE,
            life: PARTICLE_LIFE,
            max_life: PARTICLE_LIFE,
            color,
        })
        .collect()
}
