//! Fleet status polling with an adaptive cadence.
//!
//! The poller runs on the base tick. At rest (no save starting or stopping)
//! every successful fetch is followed by a random 5-9 tick pause; as soon as
//! any save is mid-transition the pause is dropped and every tick fetches.

use tracing::debug;

pub const MIN_IDLE_SKIP: u32 = 5;
pub const MAX_IDLE_SKIP: u32 = 9;

fn random_idle_skip() -> u32 {
    let mut byte = [0u8; 1];
    match getrandom::getrandom(&mut byte) {
        Ok(()) => MIN_IDLE_SKIP + u32::from(byte[0]) % (MAX_IDLE_SKIP - MIN_IDLE_SKIP + 1),
        Err(_) => (MIN_IDLE_SKIP + MAX_IDLE_SKIP) / 2,
    }
}

pub struct PollCadence {
    skip: u32,
    jitter: Box<dyn FnMut() -> u32>,
}

impl Default for PollCadence {
    fn default() -> Self {
        Self::with_jitter(random_idle_skip)
    }
}

impl std::fmt::Debug for PollCadence {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PollCadence")
            .field("skip", &self.skip)
            .finish_non_exhaustive()
    }
}

impl PollCadence {
    /// `jitter` picks the idle pause; results are clamped to 5..=9.
    pub fn with_jitter(jitter: impl FnMut() -> u32 + 'static) -> Self {
        Self {
            skip: 0,
            jitter: Box::new(jitter),
        }
    }

    /// Called once per base tick; true when this tick should fetch.
    pub fn on_tick(&mut self, transitional: bool) -> bool {
        if transitional {
            self.skip = 0;
        }
        if self.skip > 0 {
            self.skip -= 1;
            return false;
        }
        true
    }

    /// Arms the idle pause after a real fetch.
    pub fn on_fetched(&mut self, transitional: bool) {
        self.skip = if transitional {
            0
        } else {
            (self.jitter)().clamp(MIN_IDLE_SKIP, MAX_IDLE_SKIP)
        };
    }

    pub fn reset(&mut self) {
        self.skip = 0;
    }

    pub fn pending_skip(&self) -> u32 {
        self.skip
    }
}

#[derive(Debug, Default)]
pub struct StatusPoller {
    cadence: PollCadence,
    active: bool,
    in_flight: bool,
}

impl StatusPoller {
    pub fn with_cadence(cadence: PollCadence) -> Self {
        Self {
            cadence,
            active: false,
            in_flight: false,
        }
    }

    /// Activates polling; the next tick fetches immediately.
    pub fn start(&mut self) {
        self.active = true;
        self.cadence.reset();
    }

    pub fn stop(&mut self) {
        self.active = false;
    }

    pub fn is_active(&self) -> bool {
        self.active
    }

    pub fn in_flight(&self) -> bool {
        self.in_flight
    }

    pub fn cadence(&self) -> &PollCadence {
        &self.cadence
    }

    /// Advances one base tick. Returns true when a status request should be
    /// issued now; the caller must report back through [`Self::complete`].
    pub fn tick(&mut self, transitional: bool) -> bool {
        if !self.active || self.in_flight {
            return false;
        }
        if !self.cadence.on_tick(transitional) {
            debug!(skip = self.cadence.pending_skip(), "status poll skipped");
            return false;
        }
        self.in_flight = true;
        true
    }

    /// Records the outcome of the request issued by [`Self::tick`]. A failed
    /// fetch leaves the cadence untouched so the next tick retries.
    pub fn complete(&mut self, succeeded: bool, transitional: bool) {
        self.in_flight = false;
        if succeeded {
            self.cadence.on_fetched(transitional);
        }
    }
}
