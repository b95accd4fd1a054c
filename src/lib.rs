#![cfg_attr(not(test), no_std)]

// Must come first so the logging macros are visible to every module.
#[macro_use]
mod fmt;

pub mod config;
pub mod display;
pub mod games;
pub mod input;
pub mod manager;
pub mod menu;
pub mod platform;
pub mod scores;

pub use config::{Config, ConfigError};
pub use display::Framebuffer;
pub use manager::{ActiveGameSession, GameManager, SystemState};
pub use platform::{Button, KeyValueStore, Platform};
pub use scores::GameId;
