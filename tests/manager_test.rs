use bloop::platform::{HeadlessPlatform, MemoryStore};
use bloop::{Button, Config, GameId, GameManager, KeyValueStore, Platform, SystemState};
use rand::{Rng, SeedableRng, rngs::SmallRng};

const FRAME: u64 = 16;

fn console(store: MemoryStore) -> GameManager<HeadlessPlatform> {
    console_with(store, Config::new())
}

fn console_with(store: MemoryStore, config: Config) -> GameManager<HeadlessPlatform> {
    let platform = HeadlessPlatform::new(7).with_store(store);
    GameManager::new(platform, config).expect("config is valid")
}

fn now(m: &GameManager<HeadlessPlatform>) -> u64 {
    m.platform().now_ms()
}

/// Ticks once per frame for `ms` and returns the last state seen.
fn run_for(m: &mut GameManager<HeadlessPlatform>, ms: u64) -> SystemState {
    let mut state = m.state();
    let end = now(m) + ms;
    while now(m) < end {
        state = m.tick();
        m.platform_mut().advance(FRAME);
    }
    state
}

/// Through the boot animation and idle long enough in the menu for the
/// first press to clear the debounce window.
fn booted(store: MemoryStore) -> GameManager<HeadlessPlatform> {
    let mut m = console(store);
    run_for(&mut m, 2_000);
    assert_eq!(m.tick(), SystemState::Menu);
    m.platform_mut().advance(FRAME);
    run_for(&mut m, 300);
    m
}

/// One short press, returning the state of the frame that saw it.
fn tap(m: &mut GameManager<HeadlessPlatform>, button: Button) -> SystemState {
    m.platform_mut().press(button);
    let state = m.tick();
    m.platform_mut().advance(FRAME);
    m.platform_mut().release(button);
    run_for(m, 300);
    state
}

/// Holds both buttons until the exit gesture fires. Returns how long
/// they were held.
fn hold_to_exit(m: &mut GameManager<HeadlessPlatform>) -> u64 {
    m.platform_mut().set_buttons(true, true);
    let started = now(m);
    for _ in 0..200 {
        if m.tick() == SystemState::Menu {
            return now(m) - started;
        }
        m.platform_mut().advance(FRAME);
    }
    panic!("exit gesture never fired");
}

#[test]
fn test_boot_runs_for_its_duration_then_shows_menu() {
    let mut m = console(MemoryStore::new());
    assert_eq!(m.state(), SystemState::Boot);
    assert_eq!(run_for(&mut m, 2_000), SystemState::Boot);
    assert_eq!(m.tick(), SystemState::Menu);
    assert_eq!(m.menu().selected(), 0);
    assert!(m.platform().frames_presented() > 100);
}

#[test]
fn test_button_held_through_boot_is_not_a_menu_press() {
    let mut m = console(MemoryStore::new());
    m.platform_mut().set_buttons(true, false);
    run_for(&mut m, 3_000);
    assert_eq!(m.state(), SystemState::Menu);
    assert!(m.session().is_none());
}

#[test]
fn test_menu_cycles_and_wraps() {
    let mut m = booted(MemoryStore::new());
    assert_eq!(tap(&mut m, Button::B), SystemState::Menu);
    assert_eq!(m.menu().selected(), 1);
    tap(&mut m, Button::B);
    assert_eq!(m.menu().selected(), 2);
    tap(&mut m, Button::B);
    assert_eq!(m.menu().selected(), 0);
    assert_eq!(m.state(), SystemState::Menu);
}

#[test]
fn test_press_right_after_the_menu_appears_counts() {
    let mut m = console(MemoryStore::new());
    run_for(&mut m, 2_000);
    assert_eq!(m.tick(), SystemState::Menu);
    m.platform_mut().advance(FRAME);
    m.tick();
    m.platform_mut().advance(FRAME);

    m.platform_mut().press(Button::B);
    run_for(&mut m, 1_000);
    assert_eq!(m.menu().selected(), 1);
}

#[test]
fn test_longer_debounce_drops_a_quick_second_tap() {
    let config = Config::new().with_debounce_ms(500);
    let mut m = console_with(MemoryStore::new(), config);
    run_for(&mut m, 2_500);
    assert_eq!(m.state(), SystemState::Menu);

    tap(&mut m, Button::B);
    tap(&mut m, Button::B);
    assert_eq!(m.menu().selected(), 1);
    tap(&mut m, Button::B);
    assert_eq!(m.menu().selected(), 2);
}

#[test]
fn test_presented_frame_matches_the_framebuffer() {
    let mut m = booted(MemoryStore::new());
    tap(&mut m, Button::B);
    assert!(m.platform().last_frame().colors().eq(m.frame().colors()));
}

#[test]
fn test_holding_next_moves_once() {
    let mut m = booted(MemoryStore::new());
    m.platform_mut().press(Button::B);
    run_for(&mut m, 1_000);
    assert_eq!(m.menu().selected(), 1);
}

#[test]
fn test_exit_during_snake_returns_to_menu_without_scoring() {
    let mut m = booted(MemoryStore::new());
    assert_eq!(tap(&mut m, Button::A), SystemState::InGame);
    // past the get-ready grace period
    assert_eq!(run_for(&mut m, 1_100), SystemState::InGame);
    let session = m.session().expect("snake session");
    assert_eq!(session.game_id(), GameId::Snake);
    assert!(session.is_initialized());

    let held = hold_to_exit(&mut m);
    assert!(held >= 1_500, "fired after {held} ms");
    assert!(held < 1_500 + 2 * FRAME);
    assert_eq!(m.state(), SystemState::Menu);
    assert!(m.session().is_none());
    assert_eq!(m.high_score(GameId::Snake), 0);
    assert_eq!(m.platform().store().writes().count(), 0);

    // the hold that caused the exit must not be read as menu input
    m.platform_mut().advance(FRAME);
    assert_eq!(run_for(&mut m, 800), SystemState::Menu);
    m.platform_mut().set_buttons(false, false);
    assert_eq!(run_for(&mut m, 300), SystemState::Menu);
    assert_eq!(m.menu().selected(), 0);
}

#[test]
fn test_exit_keeps_the_menu_position() {
    let mut m = booted(MemoryStore::new());
    tap(&mut m, Button::B);
    assert_eq!(tap(&mut m, Button::A), SystemState::InGame);
    assert_eq!(m.session().map(|s| s.game_id()), Some(GameId::Pong));
    run_for(&mut m, 1_100);

    hold_to_exit(&mut m);
    m.platform_mut().set_buttons(false, false);
    m.platform_mut().advance(FRAME);
    run_for(&mut m, 600);
    assert_eq!(m.menu().selected(), 1);
    assert_eq!(m.high_score(GameId::Pong), 0);
}

#[test]
fn test_short_double_hold_does_not_exit() {
    let mut m = booted(MemoryStore::new());
    tap(&mut m, Button::A);
    run_for(&mut m, 1_100);

    m.platform_mut().set_buttons(true, true);
    assert_eq!(run_for(&mut m, 1_000), SystemState::InGame);
    m.platform_mut().set_buttons(false, false);
    assert_eq!(run_for(&mut m, 100), SystemState::InGame);
    m.platform_mut().set_buttons(true, true);
    assert_eq!(run_for(&mut m, 1_000), SystemState::InGame);
}

#[test]
fn test_sleep_powers_down_and_returns_to_top_of_menu() {
    let mut m = booted(MemoryStore::new());
    tap(&mut m, Button::B);
    tap(&mut m, Button::B);
    assert_eq!(m.menu().selected(), 2);

    let before = now(&m);
    m.platform_mut().press(Button::A);
    m.platform_mut().release_all_at(before + 200);
    assert_eq!(m.tick(), SystemState::Menu);

    assert_eq!(m.platform().power_downs(), 1);
    assert!(now(&m) >= before + 500);
    assert!(now(&m) < before + 3_000);
    assert_eq!(m.menu().selected(), 0);
    assert!(m.session().is_none());
}

#[test]
fn test_corrupt_scores_load_as_zero_and_are_repaired() {
    let mut store = MemoryStore::new();
    store.preload("hs_snake", -5);
    store.preload("hs_pong", 200_000);
    let mut m = console(store);
    assert_eq!(m.high_score(GameId::Snake), 0);
    assert_eq!(m.high_score(GameId::Pong), 0);
    assert_eq!(m.platform_mut().storage().get("hs_snake"), Some(0));
    assert_eq!(m.platform_mut().storage().get("hs_pong"), Some(0));
}

#[test]
fn test_stored_scores_survive() {
    let mut store = MemoryStore::new();
    store.preload("hs_snake", 12);
    store.preload("hs_pong", 3);
    let m = console(store);
    assert_eq!(m.high_score(GameId::Snake), 12);
    assert_eq!(m.high_score(GameId::Pong), 3);
    assert_eq!(m.platform().store().writes().count(), 0);
}

#[test]
fn test_boot_is_never_reentered() {
    let mut m = console(MemoryStore::new());
    let mut rng = SmallRng::seed_from_u64(0xb100_9);
    let mut left_boot = false;
    for _ in 0..6_000 {
        let (a, b) = (rng.gen_bool(0.3), rng.gen_bool(0.3));
        m.platform_mut().set_buttons(a, b);
        let state = m.tick();
        if left_boot {
            assert_ne!(state, SystemState::Boot);
        }
        left_boot |= state != SystemState::Boot;
        m.platform_mut().advance(FRAME);
    }
    assert!(left_boot);
}

#[test]
fn test_slow_config_is_accepted() {
    let platform = HeadlessPlatform::new(1);
    let config = Config::new().with_speed_percent(250).with_boot_ms(500);
    let mut m = GameManager::new(platform, config).expect("valid config");
    run_for(&mut m, 500);
    assert_eq!(m.tick(), SystemState::Menu);
}
