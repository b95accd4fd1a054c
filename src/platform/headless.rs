//! Deterministic in-memory board: manual clock, scripted buttons,
//! seeded RNG and a RAM key/value store that records every write.

use heapless::{FnvIndexMap, String, Vec};
use rand::{Rng, SeedableRng, rngs::SmallRng};

use super::{Button, KeyValueStore, Platform};
use crate::display::Framebuffer;

const KEY_LEN: usize = 16;

type Key = String<KEY_LEN>;

fn key(name: &str) -> Option<Key> {
    let mut key = Key::new();
    key.push_str(name).ok()?;
    Some(key)
}

#[derive(Default)]
pub struct MemoryStore {
    values: FnvIndexMap<Key, i32, 8>,
    writes: Vec<(Key, i32), 32>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Seed a value without it showing up in the write log.
    pub fn preload(&mut self, name: &str, value: i32) {
        if let Some(k) = key(name) {
            let _ = self.values.insert(k, value);
        }
    }

    /// Every `set` in call order.
    pub fn writes(&self) -> impl Iterator<Item = (&str, i32)> + '_ {
        self.writes.iter().map(|(k, v)| (k.as_str(), *v))
    }

    pub fn write_count(&self, name: &str) -> usize {
        self.writes.iter().filter(|(k, _)| k.as_str() == name).count()
    }
}

impl KeyValueStore for MemoryStore {
    fn get(&mut self, name: &str) -> Option<i32> {
        self.values.get(&key(name)?).copied()
    }

    fn set(&mut self, name: &str, value: i32) {
        let Some(k) = key(name) else {
            warn!("storage key too long, dropped");
            return;
        };
        if self.values.insert(k.clone(), value).is_err() {
            warn!("storage full, dropped a write");
            return;
        }
        if self.writes.is_full() {
            self.writes.remove(0);
        }
        let _ = self.writes.push((k, value));
    }
}

pub struct HeadlessPlatform {
    now: u64,
    a: bool,
    b: bool,
    release_at: Option<u64>,
    rng: SmallRng,
    store: MemoryStore,
    last_frame: Framebuffer,
    frames: u32,
    power_downs: u32,
}

impl HeadlessPlatform {
    pub fn new(seed: u64) -> Self {
        HeadlessPlatform {
            now: 0,
            a: false,
            b: false,
            release_at: None,
            rng: SmallRng::seed_from_u64(seed),
            store: MemoryStore::new(),
            last_frame: Framebuffer::new(),
            frames: 0,
            power_downs: 0,
        }
    }

    pub fn with_store(mut self, store: MemoryStore) -> Self {
        self.store = store;
        self
    }

    pub fn advance(&mut self, ms: u64) {
        self.now += ms;
    }

    pub fn set_buttons(&mut self, a: bool, b: bool) {
        self.a = a;
        self.b = b;
        self.release_at = None;
    }

    pub fn press(&mut self, button: Button) {
        match button {
            Button::A => self.a = true,
            Button::B => self.b = true,
        }
    }

    pub fn release(&mut self, button: Button) {
        match button {
            Button::A => self.a = false,
            Button::B => self.b = false,
        }
    }

    /// Let go of both buttons once the clock reaches `at_ms`.
    pub fn release_all_at(&mut self, at_ms: u64) {
        self.release_at = Some(at_ms);
    }

    pub fn store(&self) -> &MemoryStore {
        &self.store
    }

    pub fn last_frame(&self) -> &Framebuffer {
        &self.last_frame
    }

    pub fn frames_presented(&self) -> u32 {
        self.frames
    }

    pub fn power_downs(&self) -> u32 {
        self.power_downs
    }

    fn apply_release(&mut self) {
        if let Some(at) = self.release_at {
            if self.now >= at {
                self.a = false;
                self.b = false;
                self.release_at = None;
            }
        }
    }
}

impl Platform for HeadlessPlatform {
    type Storage = MemoryStore;

    fn button_pressed(&mut self, button: Button) -> bool {
        self.apply_release();
        match button {
            Button::A => self.a,
            Button::B => self.b,
        }
    }

    fn now_ms(&self) -> u64 {
        self.now
    }

    fn delay_ms(&mut self, ms: u32) {
        self.now += ms as u64;
    }

    fn random_int(&mut self, min_inclusive: i32, max_exclusive: i32) -> i32 {
        if max_exclusive <= min_inclusive {
            return min_inclusive;
        }
        self.rng.gen_range(min_inclusive..max_exclusive)
    }

    fn present(&mut self, frame: &Framebuffer) {
        self.last_frame = frame.clone();
        self.frames += 1;
    }

    fn storage(&mut self) -> &mut MemoryStore {
        &mut self.store
    }

    fn power_down(&mut self) {
        self.power_downs += 1;
    }
}
