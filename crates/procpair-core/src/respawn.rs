//! Respawn pacing.
//!
//! The first respawn after a quiet period happens immediately. Each respawn
//! opens a backoff window taken from an exponential schedule; a partner that
//! dies again inside the window waits for it to close before the next attempt.
//! A partner that stays up for `stable_after` resets the schedule, and running
//! out of scheduled delays means the counterpart is broken rather than unlucky.

use crate::config::RespawnConfig;
use backon::{BackoffBuilder, ExponentialBackoff, ExponentialBuilder};
use std::time::{Duration, Instant};

/// What the supervisor should do about a partner found dead
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RespawnDecision {
    Spawn,
    Wait(Duration),
    GiveUp { attempts: u32 },
}

pub struct RespawnPolicy {
    builder: ExponentialBuilder,
    backoff: ExponentialBackoff,
    stable_after: Duration,
    attempts: u32,
    last_spawn: Option<Instant>,
    hold_until: Option<Instant>,
}

impl RespawnPolicy {
    pub fn new(config: &RespawnConfig) -> Self {
        let builder = Self::create_backoff(config);
        Self {
            builder,
            backoff: builder.build(),
            stable_after: config.stable_after(),
            attempts: 0,
            last_spawn: None,
            hold_until: None,
        }
    }

    fn create_backoff(config: &RespawnConfig) -> ExponentialBuilder {
        let mut builder = ExponentialBuilder::default()
            .with_min_delay(config.min_delay())
            .with_max_delay(config.max_delay())
            .with_max_times(config.max_attempts as usize);

        if config.jitter {
            builder = builder.with_jitter();
        }

        builder
    }

    /// Note a spawn that was not driven by a death, such as the initial launch
    pub fn record_spawn(&mut self, now: Instant) {
        self.last_spawn = Some(now);
    }

    /// Decide how to react to a dead partner observed at `now`
    pub fn on_partner_down(&mut self, now: Instant) -> RespawnDecision {
        if let Some(hold_until) = self.hold_until {
            if now < hold_until {
                return RespawnDecision::Wait(hold_until - now);
            }
        }

        if self
            .last_spawn
            .is_some_and(|spawned| now.duration_since(spawned) >= self.stable_after)
        {
            self.reset();
        }

        match self.backoff.next() {
            Some(delay) => {
                self.attempts += 1;
                self.last_spawn = Some(now);
                self.hold_until = Some(now + delay);
                RespawnDecision::Spawn
            }
            None => RespawnDecision::GiveUp {
                attempts: self.attempts,
            },
        }
    }

    /// Respawns since the last reset
    pub fn attempts(&self) -> u32 {
        self.attempts
    }

    pub fn reset(&mut self) {
        self.backoff = self.builder.build();
        self.attempts = 0;
        self.hold_until = None;
    }
}
