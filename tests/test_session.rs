use starfall::session::{is_high_score, record_game_over, Screen, ScreenEvent, MAX_HIGH_SCORES};
use starfall::storage::GameData;

// ── Screen transitions ────────────────────────────────────────────────────────

#[test]
fn start_game_is_valid_from_every_screen() {
    for screen in [
        Screen::Menu,
        Screen::Playing,
        Screen::Paused,
        Screen::GameOver,
        Screen::Settings,
        Screen::HighScores,
    ] {
        assert_eq!(screen.transition(ScreenEvent::StartGame), Ok(Screen::Playing));
    }
}

#[test]
fn pause_toggles_both_ways() {
    assert_eq!(Screen::Playing.transition(ScreenEvent::TogglePause), Ok(Screen::Paused));
    assert_eq!(Screen::Paused.transition(ScreenEvent::TogglePause), Ok(Screen::Playing));
}

#[test]
fn pause_is_rejected_off_the_game_screen() {
    assert!(Screen::Menu.transition(ScreenEvent::TogglePause).is_err());
    assert!(Screen::GameOver.transition(ScreenEvent::TogglePause).is_err());
    assert!(Screen::Settings.transition(ScreenEvent::TogglePause).is_err());
}

#[test]
fn death_only_ends_an_active_session() {
    assert_eq!(Screen::Playing.transition(ScreenEvent::PlayerDied), Ok(Screen::GameOver));
    // Paused → GameOver directly is not permitted
    assert!(Screen::Paused.transition(ScreenEvent::PlayerDied).is_err());
    assert!(Screen::Menu.transition(ScreenEvent::PlayerDied).is_err());
}

#[test]
fn overlays_open_from_the_menu_only() {
    assert_eq!(Screen::Menu.transition(ScreenEvent::OpenSettings), Ok(Screen::Settings));
    assert_eq!(Screen::Menu.transition(ScreenEvent::OpenHighScores), Ok(Screen::HighScores));
    assert!(Screen::Playing.transition(ScreenEvent::OpenSettings).is_err());
    assert!(Screen::Paused.transition(ScreenEvent::OpenHighScores).is_err());
}

#[test]
fn back_returns_to_the_menu() {
    for screen in [
        Screen::Playing,
        Screen::Paused,
        Screen::GameOver,
        Screen::Settings,
        Screen::HighScores,
    ] {
        assert_eq!(screen.transition(ScreenEvent::Back), Ok(Screen::Menu));
    }
    assert!(Screen::Menu.transition(ScreenEvent::Back).is_err());
}

// ── Game-over bookkeeping ─────────────────────────────────────────────────────

fn full_list() -> GameData {
    let mut data = GameData::default();
    // 1000, 900, … 100 — ten entries, already descending
    data.high_scores = (1..=10).rev().map(|i| i * 100).collect();
    data
}

#[test]
fn first_score_lands_on_the_list() {
    let mut data = GameData::default();
    record_game_over(&mut data, 120);
    assert_eq!(data.high_scores, vec![120]);
    assert_eq!(data.total_games_played, 1);
    assert_eq!(data.total_score, 120);
}

#[test]
fn list_stays_sorted_and_capped() {
    let mut data = full_list();
    record_game_over(&mut data, 550);
    assert_eq!(data.high_scores.len(), MAX_HIGH_SCORES);
    assert!(data.high_scores.contains(&550));
    assert!(!data.high_scores.contains(&100)); // lowest fell off
    assert!(data.high_scores.windows(2).all(|w| w[0] >= w[1]));
}

#[test]
fn non_qualifying_score_is_dropped_from_a_full_list() {
    let mut data = full_list();
    record_game_over(&mut data, 50);
    assert_eq!(data.high_scores.len(), MAX_HIGH_SCORES);
    assert!(!data.high_scores.contains(&50));
    // aggregates still move
    assert_eq!(data.total_games_played, 1);
    assert_eq!(data.total_score, 50);
}

#[test]
fn totals_accumulate_across_sessions() {
    let mut data = GameData::default();
    record_game_over(&mut data, 100);
    record_game_over(&mut data, 250);
    assert_eq!(data.total_games_played, 2);
    assert_eq!(data.total_score, 350);
}

#[test]
fn equal_scores_coexist_on_the_list() {
    let mut data = GameData::default();
    record_game_over(&mut data, 200);
    record_game_over(&mut data, 200);
    assert_eq!(data.high_scores, vec![200, 200]);
}

// ── High-score qualification ──────────────────────────────────────────────────

#[test]
fn any_positive_score_qualifies_while_the_list_is_short() {
    let data = GameData::default();
    assert!(is_high_score(&data, 1));
    assert!(!is_high_score(&data, 0));
}

#[test]
fn full_list_requires_beating_the_lowest_entry() {
    let data = full_list();
    assert!(is_high_score(&data, 101));
    assert!(!is_high_score(&data, 100)); // ties don't displace
    assert!(!is_high_score(&data, 42));
}
