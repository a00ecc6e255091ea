//! Simulated time, advanced by a fixed step once per animation frame

use crate::{
    frame::{FrameRequestId, FrameScheduler, WeakFrameScheduler},
    units::{Time, Timestamp},
    FrameComponent,
};
use std::{
    cell::{Cell, RefCell},
    rc::Rc,
};
use thiserror::Error;
use tracing::{debug, info, warn};

#[derive(Debug, Error)]
pub enum ClockError {
    #[error("The simulated time step must be a positive, finite duration (got {0:?})")]
    NonPositiveStep(Time),

    #[error("The simulated time step {0:?} is not a whole number of nanoseconds that fits the clock")]
    StepOutOfRange(Time),

    #[error("Simulated time overflowed at tick {ticks} (step {step:?})")]
    Overflow { step: Time, ticks: u64 },
}

/// Monotonic simulated clock. Time only moves by whole steps from the start
/// instant, real frame timing never enters into it.
///
/// The step is held as integer nanoseconds so `now` is exactly
/// `start + ticks * step` for every tick count.
#[derive(Copy, Clone, PartialEq, Debug)]
pub struct SimulatedClock {
    start: Timestamp,
    step: Time,
    step_nanos: i64,
    ticks: u64,
    now: Timestamp,
}

impl SimulatedClock {
    pub const DEFAULT_STEP_MILLIS: f64 = 3000.0;

    pub fn new(start: Timestamp, step: Time) -> Result<Self, ClockError> {
        if !step.is_positive() {
            return Err(ClockError::NonPositiveStep(step));
        }
        let step_nanos = match step.checked_nanos() {
            Some(ns) if ns > 0 => ns,
            _ => return Err(ClockError::StepOutOfRange(step)),
        };
        Ok(SimulatedClock {
            start,
            step,
            step_nanos,
            ticks: 0,
            now: start,
        })
    }

    pub fn start(&self) -> Timestamp {
        self.start
    }

    pub fn step(&self) -> Time {
        self.step
    }

    pub fn ticks(&self) -> u64 {
        self.ticks
    }

    pub fn now(&self) -> Timestamp {
        self.now
    }

    /// Advance by one step. On overflow the clock is left where it was.
    pub fn tick(&mut self) -> Result<Timestamp, ClockError> {
        let ticks = self.ticks + 1;
        let now = i64::try_from(ticks)
            .ok()
            .and_then(|n| self.step_nanos.checked_mul(n))
            .and_then(|offset| self.start.checked_add_nanos(offset))
            .ok_or(ClockError::Overflow {
                step: self.step,
                ticks,
            })?;
        self.ticks = ticks;
        self.now = now;
        Ok(now)
    }
}

struct DriverState {
    clock: RefCell<SimulatedClock>,
    pending: Cell<Option<FrameRequestId>>,
    running: Cell<bool>,
}

/// Ticks a [`SimulatedClock`] from the frame scheduler, one tick per frame,
/// between [`FrameComponent::start`] and [`FrameComponent::stop`]
pub struct TimeDriver {
    state: Rc<DriverState>,
    scheduler: FrameScheduler,
}

impl std::fmt::Debug for TimeDriver {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TimeDriver")
            .field("clock", &*self.state.clock.borrow())
            .field("running", &self.state.running.get())
            .finish()
    }
}

impl TimeDriver {
    pub fn new(clock: SimulatedClock, scheduler: &FrameScheduler) -> Self {
        TimeDriver {
            state: Rc::new(DriverState {
                clock: RefCell::new(clock),
                pending: Cell::new(None),
                running: Cell::new(false),
            }),
            scheduler: scheduler.clone(),
        }
    }

    pub fn now(&self) -> Timestamp {
        self.state.clock.borrow().now()
    }

    pub fn clock(&self) -> SimulatedClock {
        *self.state.clock.borrow()
    }

    fn arm(state: &Rc<DriverState>, scheduler: &FrameScheduler) {
        let weak_state = Rc::downgrade(state);
        let weak_sched: WeakFrameScheduler = scheduler.downgrade();
        let id = scheduler.request_frame(move |_frame| {
            let Some(state) = weak_state.upgrade() else {
                return;
            };
            state.pending.set(None);
            if !state.running.get() {
                return;
            }
            let ticked = state.clock.borrow_mut().tick();
            if let Err(e) = ticked {
                warn!(err = %e, "Stopping simulated clock");
                state.running.set(false);
                return;
            }
            if let Some(sched) = weak_sched.upgrade() {
                TimeDriver::arm(&state, &sched);
            }
        });
        state.pending.set(Some(id));
    }
}

impl FrameComponent for TimeDriver {
    fn start(&mut self) {
        if self.state.running.replace(true) {
            return;
        }
        let clock = self.clock();
        info!(start = %clock.now(), step = ?clock.step(), "Starting simulated clock");
        Self::arm(&self.state, &self.scheduler);
    }

    fn stop(&mut self) {
        if !self.state.running.replace(false) {
            return;
        }
        if let Some(id) = self.state.pending.take() {
            self.scheduler.cancel_frame(id);
        }
        debug!(ticks = self.clock().ticks(), "Stopped simulated clock");
    }

    fn is_running(&self) -> bool {
        self.state.running.get()
    }
}

impl Drop for TimeDriver {
    fn drop(&mut self) {
        self.stop();
    }
}
