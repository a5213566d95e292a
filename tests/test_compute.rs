use starfall::compute::{init_state, tick};
use starfall::entities::*;
use starfall::input::Intents;
use starfall::spawn;

use rand::rngs::StdRng;
use rand::SeedableRng;

/// Fresh session, fast-forwarded past the initial fire cooldown so
/// firing tests don't have to wait.
fn make_state() -> GameState {
    let mut s = init_state(Difficulty::Normal);
    s.frame = 100;
    s
}

fn seeded_rng() -> StdRng {
    StdRng::seed_from_u64(42)
}

fn no_input() -> Intents {
    Intents::default()
}

fn fire_input() -> Intents {
    Intents { fire: true, ..Intents::default() }
}

/// Basic enemy with its fire cooldown freshly stamped, so ticking at
/// frame 101 never rolls the fire dice — keeps tests deterministic.
fn basic_enemy(id: u64, x: f32, y: f32) -> Enemy {
    Enemy {
        id,
        x,
        y,
        vx: 0.0,
        vy: EnemyKind::Basic.speed(),
        w: 40.0,
        h: 40.0,
        kind: EnemyKind::Basic,
        health: EnemyKind::Basic.max_health(),
        max_health: EnemyKind::Basic.max_health(),
        last_shot_frame: 100,
    }
}

fn player_bullet(id: u64, x: f32, y: f32) -> Bullet {
    spawn::bullet(id, BulletOwner::Player, x, y, 0.0)
}

fn enemy_bullet(id: u64, x: f32, y: f32) -> Bullet {
    spawn::bullet(id, BulletOwner::Enemy, x, y, 0.0)
}

// ── init_state ────────────────────────────────────────────────────────────────

#[test]
fn init_state_player_position_and_stats() {
    let s = init_state(Difficulty::Normal);
    assert_eq!(s.player.x, 380.0); // centered
    assert_eq!(s.player.y, 550.0); // near the bottom edge
    assert_eq!(s.player.health, 100);
    assert_eq!(s.player.max_health, 100);
    assert_eq!(s.player.shield, 0);
    assert_eq!(s.player.max_shield, 50);
}

#[test]
fn init_state_empty_collections() {
    let s = init_state(Difficulty::Normal);
    assert!(s.enemies.is_empty());
    assert!(s.bullets.is_empty());
    assert!(s.power_ups.is_empty());
    assert!(s.particles.is_empty());
    assert_eq!(s.stats.score, 0);
    assert_eq!(s.stats.level, 1);
    assert_eq!(s.frame, 0);
    assert_eq!(s.status, GameStatus::Playing);
}

#[test]
fn init_state_preserves_difficulty() {
    let s = init_state(Difficulty::Hard);
    assert_eq!(s.difficulty, Difficulty::Hard);
}

// ── tick basics ───────────────────────────────────────────────────────────────

#[test]
fn tick_increments_frame() {
    let s = make_state();
    let s2 = tick(&s, &no_input(), &mut seeded_rng());
    assert_eq!(s2.frame, 101);
}

#[test]
fn tick_does_not_mutate_original() {
    let s = make_state();
    let _ = tick(&s, &fire_input(), &mut seeded_rng());
    assert_eq!(s.frame, 100);
    assert!(s.bullets.is_empty());
}

#[test]
fn tick_is_a_noop_after_game_over() {
    let mut s = make_state();
    s.status = GameStatus::GameOver;
    let s2 = tick(&s, &no_input(), &mut seeded_rng());
    assert_eq!(s2.frame, 100); // frozen
    assert_eq!(s2.status, GameStatus::GameOver);
}

// ── Player movement ───────────────────────────────────────────────────────────

#[test]
fn player_moves_on_held_directions() {
    let s = make_state();
    let left = Intents { left: true, ..Intents::default() };
    let s2 = tick(&s, &left, &mut seeded_rng());
    assert_eq!(s2.player.x, 375.0);

    let up = Intents { up: true, ..Intents::default() };
    let s3 = tick(&s, &up, &mut seeded_rng());
    assert_eq!(s3.player.y, 545.0);
}

#[test]
fn player_clamps_at_left_edge() {
    let mut s = make_state();
    s.player.x = 3.0;
    let left = Intents { left: true, ..Intents::default() };
    let s2 = tick(&s, &left, &mut seeded_rng());
    assert_eq!(s2.player.x, 0.0);
}

#[test]
fn player_clamps_at_right_edge() {
    let mut s = make_state();
    s.player.x = 758.0; // max is ARENA_WIDTH - w = 760
    let right = Intents { right: true, ..Intents::default() };
    let s2 = tick(&s, &right, &mut seeded_rng());
    assert_eq!(s2.player.x, 760.0);
}

#[test]
fn player_clamps_at_bottom_edge() {
    let mut s = make_state();
    s.player.y = 569.0; // max is ARENA_HEIGHT - h = 570
    let down = Intents { down: true, ..Intents::default() };
    let s2 = tick(&s, &down, &mut seeded_rng());
    assert_eq!(s2.player.y, 570.0);
}

// ── Firing ────────────────────────────────────────────────────────────────────

#[test]
fn holding_fire_spawns_a_bullet() {
    let s = make_state();
    let s2 = tick(&s, &fire_input(), &mut seeded_rng());
    assert_eq!(s2.bullets.len(), 1);
    let b = &s2.bullets[0];
    assert_eq!(b.owner, BulletOwner::Player);
    assert_eq!(b.damage, 20);
    assert_eq!(b.x, 398.0); // muzzle centered on the ship
    assert_eq!(b.y, 533.0); // spawned above the ship, then advanced once
    assert_eq!(s2.stats.shots_fired, 1);
    assert_eq!(s2.player.last_shot_frame, 101);
}

#[test]
fn fire_cooldown_blocks_the_next_shot() {
    let s = make_state();
    let s2 = tick(&s, &fire_input(), &mut seeded_rng());
    let s3 = tick(&s2, &fire_input(), &mut seeded_rng());
    assert_eq!(s3.bullets.len(), 1); // old bullet only, still in flight
    assert_eq!(s3.stats.shots_fired, 1);
}

#[test]
fn rapid_fire_cuts_the_cooldown() {
    // 6 frames since the last shot: blocked normally, allowed with
    // the rapid-fire buff (18 / 3 = 6).
    let mut s = make_state();
    s.player.last_shot_frame = 95;
    let s2 = tick(&s, &fire_input(), &mut seeded_rng());
    assert!(s2.bullets.is_empty());

    s.player.rapid_fire_until = Some(10_000);
    let s3 = tick(&s, &fire_input(), &mut seeded_rng());
    assert_eq!(s3.bullets.len(), 1);
}

#[test]
fn multi_shot_spawns_three_bullets() {
    let mut s = make_state();
    s.player.multi_shot_until = Some(10_000);
    let s2 = tick(&s, &fire_input(), &mut seeded_rng());
    assert_eq!(s2.bullets.len(), 3);
    let mut spreads: Vec<f32> = s2.bullets.iter().map(|b| b.vx).collect();
    spreads.sort_by(|a, b| a.partial_cmp(b).unwrap());
    assert_eq!(spreads, vec![-1.5, 0.0, 1.5]);
    assert_eq!(s2.stats.shots_fired, 3);
}

// ── Advancement & pruning ─────────────────────────────────────────────────────

#[test]
fn bullets_advance_by_velocity() {
    let mut s = make_state();
    s.bullets.push(player_bullet(1, 100.0, 300.0));
    s.bullets.push(enemy_bullet(2, 200.0, 300.0));
    let s2 = tick(&s, &no_input(), &mut seeded_rng());
    assert_eq!(s2.bullets[0].y, 293.0); // player bullet up
    assert_eq!(s2.bullets[1].y, 305.0); // enemy bullet down
}

#[test]
fn bullets_prune_beyond_the_margin() {
    let mut s = make_state();
    s.bullets.push(player_bullet(1, 100.0, 3.0)); // → -4, inside margin
    s.bullets.push(player_bullet(2, 120.0, -8.0)); // → -15, gone
    let s2 = tick(&s, &no_input(), &mut seeded_rng());
    assert_eq!(s2.bullets.len(), 1);
    assert_eq!(s2.bullets[0].id, 1);
}

#[test]
fn enemies_advance_and_prune_past_bottom() {
    let mut s = make_state();
    s.enemies.push(basic_enemy(1, 100.0, 100.0));
    s.enemies.push(basic_enemy(2, 300.0, 599.0)); // → 601, below the arena
    let s2 = tick(&s, &no_input(), &mut seeded_rng());
    assert_eq!(s2.enemies.len(), 1);
    assert_eq!(s2.enemies[0].y, 102.0);
}

#[test]
fn power_ups_fall_and_prune_past_bottom() {
    let mut s = make_state();
    let mut rng = seeded_rng();
    s.power_ups.push(spawn::power_up(1, 100.0, 100.0, &mut rng));
    s.power_ups.push(spawn::power_up(2, 300.0, 599.0, &mut rng));
    let s2 = tick(&s, &no_input(), &mut seeded_rng());
    assert_eq!(s2.power_ups.len(), 1);
    assert_eq!(s2.power_ups[0].y, 102.0);
}

#[test]
fn particles_age_out() {
    let mut s = make_state();
    let burst = spawn::particle_burst(10, 400.0, 300.0, 2, ParticleColor::Gold, &mut seeded_rng());
    s.particles.extend(burst);
    s.particles[0].life = 1; // dies this frame
    let s2 = tick(&s, &no_input(), &mut seeded_rng());
    assert_eq!(s2.particles.len(), 1);
    assert!(s2.particles.iter().all(|p| p.life > 0));
}

#[test]
fn pruning_is_complete_after_one_tick() {
    let mut s = make_state();
    s.bullets.push(player_bullet(1, 850.0, 300.0)); // off to the right
    s.bullets.push(enemy_bullet(2, 400.0, 608.0)); // heading out the bottom
    s.enemies.push(basic_enemy(3, 100.0, 599.5));
    let s2 = tick(&s, &no_input(), &mut seeded_rng());
    for b in &s2.bullets {
        assert!(b.x >= -ARENA_MARGIN && b.x <= ARENA_WIDTH + ARENA_MARGIN);
        assert!(b.y >= -ARENA_MARGIN && b.y <= ARENA_HEIGHT + ARENA_MARGIN);
    }
    assert!(s2.enemies.iter().all(|e| e.y <= ARENA_HEIGHT));
    assert!(s2.power_ups.iter().all(|p| p.y <= ARENA_HEIGHT));
    assert!(s2.particles.iter().all(|p| p.life > 0));
}

// ── Collision: player bullets × enemies ───────────────────────────────────────

#[test]
fn bullet_damages_enemy_without_killing() {
    let mut s = make_state();
    s.enemies.push(basic_enemy(1, 100.0, 100.0));
    s.bullets.push(player_bullet(2, 110.0, 115.0)); // → y 108, inside
    let s2 = tick(&s, &no_input(), &mut seeded_rng());
    assert_eq!(s2.enemies.len(), 1);
    assert_eq!(s2.enemies[0].health, 20);
    assert!(s2.bullets.is_empty()); // consumed
    assert_eq!(s2.stats.shots_hit, 1);
    assert_eq!(s2.stats.score, 0);
    assert!(!s2.particles.is_empty()); // impact spark
}

#[test]
fn two_bullets_in_one_frame_kill_a_basic_enemy() {
    // basic: 40 hp, 25 points; two 20-damage hits land together
    let mut s = make_state();
    s.enemies.push(basic_enemy(1, 100.0, 100.0));
    s.bullets.push(player_bullet(2, 110.0, 115.0));
    s.bullets.push(player_bullet(3, 120.0, 115.0));
    let s2 = tick(&s, &no_input(), &mut seeded_rng());
    assert!(s2.enemies.is_empty());
    assert!(s2.bullets.is_empty());
    assert_eq!(s2.stats.score, 25);
    assert_eq!(s2.stats.kills, 1);
    assert_eq!(s2.stats.shots_hit, 2);
}

#[test]
fn overkill_scores_only_once() {
    let mut s = make_state();
    s.enemies.push(basic_enemy(1, 100.0, 100.0));
    for (id, x) in [(2, 105.0), (3, 115.0), (4, 125.0)] {
        s.bullets.push(player_bullet(id, x, 115.0));
    }
    let s2 = tick(&s, &no_input(), &mut seeded_rng());
    assert!(s2.enemies.is_empty());
    assert_eq!(s2.stats.score, 25); // not 50 or 75
    assert_eq!(s2.stats.kills, 1);
    assert_eq!(s2.stats.shots_hit, 3);
}

#[test]
fn bullet_is_consumed_by_the_first_enemy_it_overlaps() {
    let mut s = make_state();
    s.enemies.push(basic_enemy(1, 100.0, 100.0));
    s.enemies.push(basic_enemy(2, 110.0, 100.0)); // overlapping neighbour
    s.bullets.push(player_bullet(3, 112.0, 115.0)); // inside both boxes
    let s2 = tick(&s, &no_input(), &mut seeded_rng());
    assert_eq!(s2.enemies[0].health, 20);
    assert_eq!(s2.enemies[1].health, 40);
    assert_eq!(s2.stats.shots_hit, 1);
}

#[test]
fn no_self_damage() {
    let mut s = make_state();
    // Enemy bullet drifting through an enemy: no effect
    s.enemies.push(basic_enemy(1, 100.0, 100.0));
    s.bullets.push(enemy_bullet(2, 110.0, 110.0));
    // Player bullet passing over the player: no effect
    s.bullets.push(player_bullet(3, 390.0, 560.0));
    let s2 = tick(&s, &no_input(), &mut seeded_rng());
    assert_eq!(s2.enemies[0].health, 40);
    assert_eq!(s2.player.health, 100);
    assert_eq!(s2.bullets.len(), 2); // both still flying
}

// ── Collision: enemy bullets × player ─────────────────────────────────────────

#[test]
fn enemy_bullet_damages_the_player() {
    let mut s = make_state();
    s.bullets.push(enemy_bullet(1, 390.0, 552.0)); // → y 557, on the ship
    let s2 = tick(&s, &no_input(), &mut seeded_rng());
    assert_eq!(s2.player.health, 90);
    assert!(s2.bullets.is_empty());
    assert!(!s2.particles.is_empty());
}

#[test]
fn damage_without_shield_comes_off_health() {
    // health 100/100, shield 0; 20 damage → health 80
    let mut s = make_state();
    let mut b = enemy_bullet(1, 390.0, 552.0);
    b.damage = 20;
    s.bullets.push(b);
    let s2 = tick(&s, &no_input(), &mut seeded_rng());
    assert_eq!(s2.player.health, 80);
    assert_eq!(s2.player.shield, 0);
}

#[test]
fn shield_absorbs_bullet_damage_first() {
    // shield 50/50; 30 damage → shield 20, health untouched
    let mut s = make_state();
    s.player.shield = 50;
    let mut b = enemy_bullet(1, 390.0, 552.0);
    b.damage = 30;
    s.bullets.push(b);
    let s2 = tick(&s, &no_input(), &mut seeded_rng());
    assert_eq!(s2.player.shield, 20);
    assert_eq!(s2.player.health, 100);
}

// ── Collision: enemy × player contact ─────────────────────────────────────────

#[test]
fn body_contact_costs_flat_damage_and_the_enemy() {
    let mut s = make_state();
    s.enemies.push(basic_enemy(1, 390.0, 540.0)); // → y 542, overlapping ship
    let s2 = tick(&s, &no_input(), &mut seeded_rng());
    assert_eq!(s2.player.health, 75); // 25 contact damage
    assert!(s2.enemies.is_empty());
    assert_eq!(s2.stats.kills, 0); // ramming is not a kill
}

#[test]
fn contact_damage_goes_through_the_shield_rule() {
    let mut s = make_state();
    s.player.shield = 10;
    s.enemies.push(basic_enemy(1, 390.0, 540.0));
    let s2 = tick(&s, &no_input(), &mut seeded_rng());
    assert_eq!(s2.player.shield, 0);
    assert_eq!(s2.player.health, 85); // 25 - 10 absorbed
}

// ── Collision: power-up pickup ────────────────────────────────────────────────

fn falling_power_up(id: u64, kind: PowerUpKind) -> PowerUp {
    PowerUp { id, x: 390.0, y: 553.0, vx: 0.0, vy: 2.0, w: 24.0, h: 24.0, kind }
}

#[test]
fn health_pickup_heals_capped() {
    let mut s = make_state();
    s.player.health = 50;
    s.power_ups.push(falling_power_up(1, PowerUpKind::Health));
    let s2 = tick(&s, &no_input(), &mut seeded_rng());
    assert_eq!(s2.player.health, 75);
    assert!(s2.power_ups.is_empty());

    let mut s = make_state();
    s.player.health = 90;
    s.power_ups.push(falling_power_up(1, PowerUpKind::Health));
    let s2 = tick(&s, &no_input(), &mut seeded_rng());
    assert_eq!(s2.player.health, 100); // capped at max
}

#[test]
fn shield_pickup_restores_full_shield() {
    let mut s = make_state();
    s.player.shield = 5;
    s.power_ups.push(falling_power_up(1, PowerUpKind::Shield));
    let s2 = tick(&s, &no_input(), &mut seeded_rng());
    assert_eq!(s2.player.shield, 50);
}

#[test]
fn timed_pickup_sets_a_deadline() {
    let mut s = make_state();
    s.power_ups.push(falling_power_up(1, PowerUpKind::RapidFire));
    let s2 = tick(&s, &no_input(), &mut seeded_rng());
    assert_eq!(s2.player.rapid_fire_until, Some(101 + 450));
}

#[test]
fn score_multiplier_doubles_points() {
    let mut s = make_state();
    s.player.score_mult_until = Some(10_000);
    s.enemies.push(basic_enemy(1, 100.0, 100.0));
    s.bullets.push(player_bullet(2, 110.0, 115.0));
    s.bullets.push(player_bullet(3, 120.0, 115.0));
    let s2 = tick(&s, &no_input(), &mut seeded_rng());
    assert_eq!(s2.stats.score, 50); // 25 × 2
}

// ── Buff expiry ───────────────────────────────────────────────────────────────

#[test]
fn buffs_expire_during_the_player_update() {
    let mut s = make_state();
    s.player.rapid_fire_until = Some(101); // expires exactly this frame
    s.player.multi_shot_until = Some(102); // still alive this frame
    let s2 = tick(&s, &no_input(), &mut seeded_rng());
    assert_eq!(s2.player.rapid_fire_until, None);
    assert_eq!(s2.player.multi_shot_until, Some(102));
}

#[test]
fn new_session_starts_without_buffs() {
    // The old session's pending expiry must not touch a new session:
    // a fresh state simply has no deadlines at all.
    let mut old = make_state();
    old.player.rapid_fire_until = Some(10_000);
    assert!(old.player.rapid_fire_active(200));
    let fresh = init_state(Difficulty::Normal);
    assert_eq!(fresh.player.rapid_fire_until, None);
    let ticked = tick(&fresh, &no_input(), &mut seeded_rng());
    assert_eq!(ticked.player.rapid_fire_until, None);
}

// ── Spawning & progression ────────────────────────────────────────────────────

#[test]
fn enemy_spawns_when_the_accumulator_fills() {
    let mut s = make_state();
    s.enemy_spawn_timer = 89; // Normal level 1 threshold is 90
    let s2 = tick(&s, &no_input(), &mut seeded_rng());
    assert_eq!(s2.enemies.len(), 1);
    assert_eq!(s2.enemy_spawn_timer, 0);
    let e = &s2.enemies[0];
    assert_eq!(e.y, -e.h); // just above the arena
    assert!(e.x >= 0.0 && e.x <= ARENA_WIDTH - e.w);
}

#[test]
fn no_enemy_spawn_before_the_threshold() {
    let mut s = make_state();
    s.enemy_spawn_timer = 50;
    let s2 = tick(&s, &no_input(), &mut seeded_rng());
    assert!(s2.enemies.is_empty());
    assert_eq!(s2.enemy_spawn_timer, 51);
}

#[test]
fn spawn_threshold_shrinks_with_level() {
    // At level 10 the threshold is 90 - 6·9 = 36
    let mut s = make_state();
    s.stats.level = 10;
    s.stats.kills = 90;
    s.enemy_spawn_timer = 35;
    let s2 = tick(&s, &no_input(), &mut seeded_rng());
    assert_eq!(s2.enemies.len(), 1);
}

#[test]
fn hard_difficulty_spawns_sooner() {
    let mut s = make_state();
    s.difficulty = Difficulty::Hard; // 90 × 0.6 = 54
    s.enemy_spawn_timer = 53;
    let s2 = tick(&s, &no_input(), &mut seeded_rng());
    assert_eq!(s2.enemies.len(), 1);
}

#[test]
fn power_up_spawns_on_its_fixed_interval() {
    let mut s = make_state();
    s.power_up_spawn_timer = 449;
    let s2 = tick(&s, &no_input(), &mut seeded_rng());
    assert_eq!(s2.power_ups.len(), 1);
    assert!(s2.power_ups[0].y < 0.0); // falls in from above
    assert_eq!(s2.power_up_spawn_timer, 0);
}

#[test]
fn level_advances_every_ten_kills() {
    let mut s = make_state();
    s.stats.kills = 9;
    let s2 = tick(&s, &no_input(), &mut seeded_rng());
    assert_eq!(s2.stats.level, 1);

    s.stats.kills = 10;
    let s3 = tick(&s, &no_input(), &mut seeded_rng());
    assert_eq!(s3.stats.level, 2);
}

// ── Termination ───────────────────────────────────────────────────────────────

#[test]
fn session_ends_when_health_reaches_zero() {
    let mut s = make_state();
    s.player.health = 10;
    s.bullets.push(enemy_bullet(1, 390.0, 552.0)); // 10 damage
    let s2 = tick(&s, &no_input(), &mut seeded_rng());
    assert_eq!(s2.player.health, 0);
    assert_eq!(s2.status, GameStatus::GameOver);

    // and the world is frozen afterwards
    let s3 = tick(&s2, &fire_input(), &mut seeded_rng());
    assert_eq!(s3.frame, s2.frame);
}

#[test]
fn surviving_damage_keeps_the_session_alive() {
    let mut s = make_state();
    s.player.health = 11;
    s.bullets.push(enemy_bullet(1, 390.0, 552.0));
    let s2 = tick(&s, &no_input(), &mut seeded_rng());
    assert_eq!(s2.player.health, 1);
    assert_eq!(s2.status, GameStatus::Playing);
}
