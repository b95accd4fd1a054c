use thiserror::Error;

/// Timing and scoring knobs shared by the manager and both mini-games.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct Config {
    pub debounce_ms: u64,
    pub exit_hold_ms: u64,
    pub exit_cooldown_ms: u64,
    pub boot_ms: u64,
    pub game_over_ms: u64,
    pub get_ready_ms: u64,
    pub release_timeout_ms: u64,
    pub sleep_notice_ms: u32,
    pub frame_ms: u64,
    /// Gameplay tick scaling, 100 = native speed, 200 = half speed.
    pub speed_percent: u32,
    /// Largest stored score still considered sane.
    pub score_ceiling: i32,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum ConfigError {
    #[error("exit hold threshold must be non-zero")]
    ZeroExitHold,
    #[error("speed percentage must be non-zero")]
    ZeroSpeed,
    #[error("score ceiling must be positive")]
    NonPositiveCeiling,
    #[error("frame period must be non-zero")]
    ZeroFramePeriod,
}

impl Config {
    pub const fn new() -> Self {
        Config {
            debounce_ms: 200,
            exit_hold_ms: 1500,
            exit_cooldown_ms: 500,
            boot_ms: 2000,
            game_over_ms: 1500,
            get_ready_ms: 1000,
            release_timeout_ms: 3000,
            sleep_notice_ms: 500,
            frame_ms: 16,
            speed_percent: 100,
            score_ceiling: 99_999,
        }
    }

    pub const fn with_speed_percent(mut self, speed_percent: u32) -> Self {
        self.speed_percent = speed_percent;
        self
    }

    pub const fn with_boot_ms(mut self, boot_ms: u64) -> Self {
        self.boot_ms = boot_ms;
        self
    }

    pub const fn with_game_over_ms(mut self, game_over_ms: u64) -> Self {
        self.game_over_ms = game_over_ms;
        self
    }

    pub const fn with_debounce_ms(mut self, debounce_ms: u64) -> Self {
        self.debounce_ms = debounce_ms;
        self
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.exit_hold_ms == 0 {
            return Err(ConfigError::ZeroExitHold);
        }
        if self.speed_percent == 0 {
            return Err(ConfigError::ZeroSpeed);
        }
        if self.score_ceiling <= 0 {
            return Err(ConfigError::NonPositiveCeiling);
        }
        if self.frame_ms == 0 {
            return Err(ConfigError::ZeroFramePeriod);
        }
        Ok(())
    }

    /// Stretches a gameplay period by `speed_percent`.
    pub fn scaled_ms(&self, base_ms: u64) -> u64 {
        base_ms * self.speed_percent as u64 / 100
    }
}

impl Default for Config {
    fn default() -> Self {
        Self::new()
    }
}
