//! What the console needs from the board it runs on.

pub mod headless;

use crate::display::Framebuffer;

pub use headless::{HeadlessPlatform, MemoryStore};

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Button {
    A,
    B,
}

/// Persistent integer storage that survives power loss.
pub trait KeyValueStore {
    fn get(&mut self, key: &str) -> Option<i32>;
    fn set(&mut self, key: &str, value: i32);
}

/// Board services. Every call is synchronous and expected to succeed;
/// `delay_ms` is only used for short, bounded pauses.
pub trait Platform {
    type Storage: KeyValueStore;

    fn button_pressed(&mut self, button: Button) -> bool;
    fn now_ms(&self) -> u64;
    fn delay_ms(&mut self, ms: u32);
    /// Uniform integer in `min_inclusive..max_exclusive`, or `min_inclusive`
    /// when the range is empty.
    fn random_int(&mut self, min_inclusive: i32, max_exclusive: i32) -> i32;
    /// Push a finished frame to the panel.
    fn present(&mut self, frame: &Framebuffer);
    fn storage(&mut self) -> &mut Self::Storage;
    /// Enter the low-power state and return once a button wakes the board.
    fn power_down(&mut self);
}
