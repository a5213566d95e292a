/// Pure game-logic functions.
///
/// `tick` advances the simulation by exactly one frame.  It takes an
/// immutable reference to the current `GameState` plus the sampled
/// input intents and returns a brand-new state; all randomness comes
/// through the injected RNG so callers control determinism (seeded
/// RNGs in tests, `thread_rng` in the binary).
///
/// Stage order inside a frame is load-bearing: player, enemies,
/// advancement, pruning, collisions, spawn timers, level, termination.
/// Collision passes iterate over snapshots of the frame's collections
/// and assign the rebuilt vectors afterwards, so nothing is skipped or
/// double-processed mid-iteration.

use rand::Rng;

use crate::entities::{
    BulletOwner, Difficulty, GameState, GameStats, GameStatus, ParticleColor, Player,
    PowerUpKind, ARENA_HEIGHT, ARENA_MARGIN, ARENA_WIDTH,
};
use crate::input::Intents;
use crate::spawn;

// ── Tuning tables ────────────────────────────────────────────────────────────

const PLAYER_W: f32 = 40.0;
const PLAYER_H: f32 = 30.0;
/// Arena units the ship moves per frame on each held axis.
const PLAYER_SPEED: f32 = 5.0;
/// Min frames between player shots without rapid-fire.
const PLAYER_FIRE_COOLDOWN: u64 = 18;
/// Horizontal velocity of the two outer multi-shot bullets.
const MULTI_SHOT_SPREAD: f32 = 1.5;

/// Flat damage for enemy ships ramming the player.
const CONTACT_DAMAGE: i32 = 25;
/// Health restored by a Health power-up.
const HEAL_AMOUNT: i32 = 25;
/// Chance that a destroyed enemy drops a power-up.
const POWER_UP_DROP_CHANCE: f64 = 0.3;

const KILLS_PER_LEVEL: u32 = 10;

/// Enemy spawn accumulator threshold at level 1, before scaling.
const ENEMY_SPAWN_BASE: u32 = 90;
/// Threshold shrink per level above 1.
const ENEMY_SPAWN_PER_LEVEL: u32 = 6;
/// Level shrink never takes the threshold below this.
const ENEMY_SPAWN_MIN: u32 = 30;
/// Fixed power-up spawn cadence.
const POWER_UP_SPAWN_INTERVAL: u32 = 450;

/// Particle burst sizes per event.
const HIT_BURST: u32 = 6;
const KILL_BURST: u32 = 16;
const PLAYER_HIT_BURST: u32 = 8;
const CONTACT_BURST: u32 = 12;
const PICKUP_BURST: u32 = 10;

fn spawn_interval_scale(difficulty: Difficulty) -> f32 {
    match difficulty {
        Difficulty::Easy => 1.4,
        Difficulty::Normal => 1.0,
        Difficulty::Hard => 0.6,
    }
}

/// Per-frame chance that a cooled-down enemy fires.
fn enemy_fire_probability(difficulty: Difficulty) -> f64 {
    match difficulty {
        Difficulty::Easy => 0.006,
        Difficulty::Normal => 0.012,
        Difficulty::Hard => 0.025,
    }
}

fn enemy_spawn_interval(level: u32, difficulty: Difficulty) -> u32 {
    let shrunk = ENEMY_SPAWN_BASE
        .saturating_sub(ENEMY_SPAWN_PER_LEVEL * level.saturating_sub(1))
        .max(ENEMY_SPAWN_MIN);
    ((shrunk as f32 * spawn_interval_scale(difficulty)) as u32).max(1)
}

// ── Constructors ─────────────────────────────────────────────────────────────

/// Build the initial state for a fresh session.  Everything from the
/// previous session is discarded wholesale — including any buff
/// deadlines, which is what makes a stale expiry impossible.
pub fn init_state(difficulty: Difficulty) -> GameState {
    GameState {
        frame: 0,
        next_id: 1,
        player: Player {
            id: 0,
            x: (ARENA_WIDTH - PLAYER_W) / 2.0,
            y: ARENA_HEIGHT - PLAYER_H - 20.0,
            vx: 0.0,
            vy: 0.0,
            w: PLAYER_W,
            h: PLAYER_H,
            health: 100,
            max_health: 100,
            shield: 0,
            max_shield: 50,
            fire_cooldown: PLAYER_FIRE_COOLDOWN,
            last_shot_frame: 0,
            rapid_fire_until: None,
            multi_shot_until: None,
            score_mult_until: None,
        },
        enemies: Vec::new(),
        bullets: Vec::new(),
        power_ups: Vec::new(),
        particles: Vec::new(),
        stats: GameStats { level: 1, ..GameStats::default() },
        status: GameStatus::Playing,
        difficulty,
        enemy_spawn_timer: 0,
        power_up_spawn_timer: 0,
    }
}

// ── Per-frame tick ───────────────────────────────────────────────────────────

/// Advance the simulation by one frame.  Callers only invoke this
/// while the session is actually playing; a finished state is
/// returned unchanged.
pub fn tick(state: &GameState, intents: &Intents, rng: &mut impl Rng) -> GameState {
    if state.status != GameStatus::Playing {
        return state.clone();
    }

    let mut next = state.clone();
    next.frame += 1;

    update_player(&mut next, intents);
    update_enemies(&mut next, rng);
    advance_projectiles(&mut next);
    prune(&mut next);
    resolve_collisions(&mut next, rng);
    run_spawn_timers(&mut next, rng);

    next.stats.level = next.stats.kills / KILLS_PER_LEVEL + 1;
    if next.player.health <= 0 {
        next.status = GameStatus::GameOver;
    }
    next
}

/// Stage 1: buff expiry, held-key movement (clamped to the arena) and
/// cooldown-gated firing.
fn update_player(next: &mut GameState, intents: &Intents) {
    let frame = next.frame;

    let p = &mut next.player;
    if p.rapid_fire_until.is_some_and(|until| frame >= until) {
        p.rapid_fire_until = None;
    }
    if p.multi_shot_until.is_some_and(|until| frame >= until) {
        p.multi_shot_until = None;
    }
    if p.score_mult_until.is_some_and(|until| frame >= until) {
        p.score_mult_until = None;
    }

    let mut dx = 0.0;
    let mut dy = 0.0;
    if intents.left {
        dx -= PLAYER_SPEED;
    }
    if intents.right {
        dx += PLAYER_SPEED;
    }
    if intents.up {
        dy -= PLAYER_SPEED;
    }
    if intents.down {
        dy += PLAYER_SPEED;
    }
    p.x = (p.x + dx).clamp(0.0, ARENA_WIDTH - p.w);
    p.y = (p.y + dy).clamp(0.0, ARENA_HEIGHT - p.h);

    let cooldown = if p.rapid_fire_active(frame) {
        p.fire_cooldown / 3
    } else {
        p.fire_cooldown
    };
    let firing = intents.fire && frame.saturating_sub(p.last_shot_frame) >= cooldown;
    let multi = p.multi_shot_active(frame);
    let muzzle_x = p.x + p.w / 2.0 - spawn::BULLET_W / 2.0;
    let muzzle_y = p.y - spawn::BULLET_H;
    if firing {
        p.last_shot_frame = frame;
    }

    if firing {
        let spreads: &[f32] = if multi {
            &[0.0, -MULTI_SHOT_SPREAD, MULTI_SHOT_SPREAD]
        } else {
            &[0.0]
        };
        for &vx in spreads {
            let id = next.alloc_id();
            next.bullets
                .push(spawn::bullet(id, BulletOwner::Player, muzzle_x, muzzle_y, vx));
            next.stats.shots_fired += 1;
        }
    }
}

/// Stage 2: enemies drift down at their per-kind speed and fire with
/// a small per-frame probability, throttled by their own cooldown.
fn update_enemies(next: &mut GameState, rng: &mut impl Rng) {
    let frame = next.frame;
    let fire_p = enemy_fire_probability(next.difficulty);

    let mut muzzles = Vec::new();
    for e in &mut next.enemies {
        e.y += e.vy;
        let cooled = frame.saturating_sub(e.last_shot_frame) >= e.kind.fire_interval();
        if cooled && rng.gen_bool(fire_p) {
            e.last_shot_frame = frame;
            muzzles.push((e.x + e.w / 2.0 - spawn::BULLET_W / 2.0, e.y + e.h));
        }
    }
    for (x, y) in muzzles {
        let id = next.alloc_id();
        next.bullets.push(spawn::bullet(id, BulletOwner::Enemy, x, y, 0.0));
    }
}

/// Stage 3: velocity integration for everything that is not an enemy,
/// plus particle aging.
fn advance_projectiles(next: &mut GameState) {
    for b in &mut next.bullets {
        b.x += b.vx;
        b.y += b.vy;
    }
    for pu in &mut next.power_ups {
        pu.x += pu.vx;
        pu.y += pu.vy;
    }
    for pt in &mut next.particles {
        pt.x += pt.vx;
        pt.y += pt.vy;
        pt.life = pt.life.saturating_sub(1);
    }
}

/// Stage 4: every collection drops its expired members before the
/// collision pass sees them.
fn prune(next: &mut GameState) {
    next.bullets.retain(|b| {
        b.x >= -ARENA_MARGIN
            && b.x <= ARENA_WIDTH + ARENA_MARGIN
            && b.y >= -ARENA_MARGIN
            && b.y <= ARENA_HEIGHT + ARENA_MARGIN
    });
    next.enemies.retain(|e| e.y < ARENA_HEIGHT);
    next.power_ups.retain(|pu| pu.y < ARENA_HEIGHT);
    next.particles.retain(|pt| pt.life > 0);
}

/// Stage 5: the collision event table.  Snapshots of the bullet,
/// enemy and power-up collections are taken up front; the rebuilt
/// vectors are assigned back only after the whole pass.
fn resolve_collisions(next: &mut GameState, rng: &mut impl Rng) {
    let frame = next.frame;
    let bullets = std::mem::take(&mut next.bullets);
    let enemies = std::mem::take(&mut next.enemies);
    let power_ups = std::mem::take(&mut next.power_ups);
    let player_rect = next.player.rect();

    // Player bullets vs enemies.  Damage accumulates per enemy so two
    // bullets landing in the same frame both count; each bullet is
    // consumed by the first enemy it overlaps.
    let mut damage = vec![0_i32; enemies.len()];
    let mut kept_bullets = Vec::with_capacity(bullets.len());
    for b in bullets {
        if b.owner == BulletOwner::Player {
            if let Some(i) = enemies.iter().position(|e| e.rect().overlaps(&b.rect())) {
                damage[i] += b.damage;
                next.stats.shots_hit += 1;
                push_burst(next, b.x, b.y, HIT_BURST, ParticleColor::Gold, rng);
                continue;
            }
        }
        kept_bullets.push(b);
    }

    // Resolve enemy deaths: score, kill counter, explosion, drop.
    let mult: u32 = if next.player.score_mult_active(frame) { 2 } else { 1 };
    let mut kept_enemies = Vec::with_capacity(enemies.len());
    for (i, mut e) in enemies.into_iter().enumerate() {
        e.health -= damage[i];
        if e.health > 0 {
            kept_enemies.push(e);
            continue;
        }
        next.stats.score += e.kind.points() * mult;
        next.stats.kills += 1;
        let (cx, cy) = (e.x + e.w / 2.0, e.y + e.h / 2.0);
        push_burst(next, cx, cy, KILL_BURST, ParticleColor::Ember, rng);
        if rng.gen_bool(POWER_UP_DROP_CHANCE) {
            let id = next.alloc_id();
            next.power_ups.push(spawn::power_up(id, e.x, e.y, rng));
        }
    }

    // Enemy bullets vs the player: shield absorbs first.
    let mut final_bullets = Vec::with_capacity(kept_bullets.len());
    for b in kept_bullets {
        if b.owner == BulletOwner::Enemy && b.rect().overlaps(&player_rect) {
            next.player.take_damage(b.damage);
            push_burst(next, b.x, b.y, PLAYER_HIT_BURST, ParticleColor::Cyan, rng);
        } else {
            final_bullets.push(b);
        }
    }
    next.bullets = final_bullets;

    // Body contact: flat damage through the same absorption rule, and
    // the rammed enemy is gone.
    let mut surviving = Vec::with_capacity(kept_enemies.len());
    for e in kept_enemies {
        if e.rect().overlaps(&player_rect) {
            next.player.take_damage(CONTACT_DAMAGE);
            let (cx, cy) = (e.x + e.w / 2.0, e.y + e.h / 2.0);
            push_burst(next, cx, cy, CONTACT_BURST, ParticleColor::Ember, rng);
        } else {
            surviving.push(e);
        }
    }
    next.enemies = surviving;

    // Pickups.  The pass runs over the pre-drop snapshot, so a
    // power-up dropped this frame waits until the next one.
    let mut kept_power_ups = Vec::with_capacity(power_ups.len());
    for pu in power_ups {
        if pu.rect().overlaps(&player_rect) {
            apply_power_up(&mut next.player, pu.kind, frame);
            let (cx, cy) = (pu.x + pu.w / 2.0, pu.y + pu.h / 2.0);
            push_burst(next, cx, cy, PICKUP_BURST, ParticleColor::Green, rng);
        } else {
            kept_power_ups.push(pu);
        }
    }
    next.power_ups.extend(kept_power_ups);
}

fn apply_power_up(player: &mut Player, kind: PowerUpKind, frame: u64) {
    match kind {
        PowerUpKind::Health => player.heal(HEAL_AMOUNT),
        PowerUpKind::Shield => player.shield = player.max_shield,
        PowerUpKind::RapidFire => {
            player.rapid_fire_until = kind.duration().map(|d| frame + d);
        }
        PowerUpKind::MultiShot => {
            player.multi_shot_until = kind.duration().map(|d| frame + d);
        }
        PowerUpKind::ScoreMultiplier => {
            player.score_mult_until = kind.duration().map(|d| frame + d);
        }
    }
}

/// Stage 6: spawn accumulators.  The enemy threshold shrinks with
/// level and difficulty; power-ups arrive on a fixed long cadence.
fn run_spawn_timers(next: &mut GameState, rng: &mut impl Rng) {
    next.enemy_spawn_timer += 1;
    if next.enemy_spawn_timer >= enemy_spawn_interval(next.stats.level, next.difficulty) {
        next.enemy_spawn_timer = 0;
        let id = next.alloc_id();
        let mut e = spawn::enemy(id, rng);
        // A fresh enemy waits out one full fire interval before its
        // first shot.
        e.last_shot_frame = next.frame;
        next.enemies.push(e);
    }

    next.power_up_spawn_timer += 1;
    if next.power_up_spawn_timer >= POWER_UP_SPAWN_INTERVAL {
        next.power_up_spawn_timer = 0;
        let id = next.alloc_id();
        let x = rng.gen_range(0.0..=(ARENA_WIDTH - spawn::POWER_UP_SIZE));
        next.power_ups
            .push(spawn::power_up(id, x, -spawn::POWER_UP_SIZE, rng));
    }
}

fn push_burst(
    next: &mut GameState,
    x: f32,
    y: f32,
    count: u32,
    color: ParticleColor,
    rng: &mut impl Rng,
) {
    let base = next.next_id;
    next.next_id += u64::from(count);
    next.particles
        .extend(spawn::particle_burst(base, x, y, count, color, rng));
}
