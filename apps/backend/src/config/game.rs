//! Game rules that are policy rather than protocol.

use std::env;
use std::time::Duration;

use crate::error::AppError;

pub const DEFAULT_HAND_SIZE: usize = 7;
pub const DEFAULT_ROUND_SECONDS: u64 = 60;
pub const DEFAULT_VOTING_SECONDS: u64 = 60;
pub const DEFAULT_WIN_THRESHOLD: u32 = 5;
pub const DEFAULT_COOLDOWN_SECONDS: u64 = 5;
pub const DEFAULT_TIMER_RETRY_MILLIS: u64 = 2_000;

/// Tunable parameters of a game.
///
/// Durations are wall-clock; tests build millisecond-scale rules with
/// [`GameRules::with_durations`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct GameRules {
    /// Cards every active player holds after replenishment
    pub hand_size: usize,
    /// How long players have to submit picks
    pub round_duration: Duration,
    /// How long the judge has to vote once submissions close
    pub voting_duration: Duration,
    /// Round wins needed to end the game
    pub win_threshold: u32,
    /// Pause between a round ending and the next one starting
    pub cooldown: Duration,
    /// Delay before a timer whose command hit a transient failure runs again
    pub timer_retry: Duration,
}

impl Default for GameRules {
    fn default() -> Self {
        Self {
            hand_size: DEFAULT_HAND_SIZE,
            round_duration: Duration::from_secs(DEFAULT_ROUND_SECONDS),
            voting_duration: Duration::from_secs(DEFAULT_VOTING_SECONDS),
            win_threshold: DEFAULT_WIN_THRESHOLD,
            cooldown: Duration::from_secs(DEFAULT_COOLDOWN_SECONDS),
            timer_retry: Duration::from_millis(DEFAULT_TIMER_RETRY_MILLIS),
        }
    }
}

impl GameRules {
    /// Read `CAH_HAND_SIZE`, `CAH_ROUND_SECONDS`, `CAH_VOTING_SECONDS`,
    /// `CAH_WIN_THRESHOLD`, `CAH_COOLDOWN_SECONDS` and `CAH_TIMER_RETRY_MS`,
    /// falling back to defaults.
    pub fn from_env() -> Result<Self, AppError> {
        Self::from_lookup(|name| env::var(name).ok())
    }

    fn from_lookup<F>(lookup: F) -> Result<Self, AppError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let rules = Self {
            hand_size: parse_or(&lookup, "CAH_HAND_SIZE", DEFAULT_HAND_SIZE)?,
            round_duration: Duration::from_secs(parse_or(
                &lookup,
                "CAH_ROUND_SECONDS",
                DEFAULT_ROUND_SECONDS,
            )?),
            voting_duration: Duration::from_secs(parse_or(
                &lookup,
                "CAH_VOTING_SECONDS",
                DEFAULT_VOTING_SECONDS,
            )?),
            win_threshold: parse_or(&lookup, "CAH_WIN_THRESHOLD", DEFAULT_WIN_THRESHOLD)?,
            cooldown: Duration::from_secs(parse_or(
                &lookup,
                "CAH_COOLDOWN_SECONDS",
                DEFAULT_COOLDOWN_SECONDS,
            )?),
            timer_retry: Duration::from_millis(parse_or(
                &lookup,
                "CAH_TIMER_RETRY_MS",
                DEFAULT_TIMER_RETRY_MILLIS,
            )?),
        };
        rules.validate()?;
        Ok(rules)
    }

    pub fn with_durations(mut self, round: Duration, voting: Duration, cooldown: Duration) -> Self {
        self.round_duration = round;
        self.voting_duration = voting;
        self.cooldown = cooldown;
        self
    }

    pub fn with_timer_retry(mut self, timer_retry: Duration) -> Self {
        self.timer_retry = timer_retry;
        self
    }

    pub fn with_win_threshold(mut self, win_threshold: u32) -> Self {
        self.win_threshold = win_threshold;
        self
    }

    pub fn with_hand_size(mut self, hand_size: usize) -> Self {
        self.hand_size = hand_size;
        self
    }

    pub fn validate(&self) -> Result<(), AppError> {
        // a hand must cover the largest prompt pick
        if self.hand_size < 3 {
            return Err(AppError::config(format!(
                "CAH_HAND_SIZE must be at least 3, got {}",
                self.hand_size
            )));
        }
        if self.win_threshold == 0 {
            return Err(AppError::config("CAH_WIN_THRESHOLD must be at least 1"));
        }
        if self.timer_retry.is_zero() {
            return Err(AppError::config("CAH_TIMER_RETRY_MS must be positive"));
        }
        if self.round_duration.is_zero() || self.voting_duration.is_zero() {
            return Err(AppError::config(
                "CAH_ROUND_SECONDS and CAH_VOTING_SECONDS must be positive",
            ));
        }
        Ok(())
    }
}

fn parse_or<F, T>(lookup: &F, name: &str, default: T) -> Result<T, AppError>
where
    F: Fn(&str) -> Option<String>,
    T: std::str::FromStr,
{
    match lookup(name) {
        None => Ok(default),
        Some(raw) => raw
            .trim()
            .parse::<T>()
            .map_err(|_| AppError::config(format!("{name} has an invalid value: '{raw}'"))),
    }
}
