//! Refresh timing for mounted clocks
//!
//! A [`RefreshScheduler`] owns at most one repeating timer. The timer is
//! obtained from a [`TimerService`], which is the seam between the widget
//! and whatever event loop the host runs: [`CalloopTimers`] plugs into a
//! calloop loop, [`ManualTimers`] is driven by hand.

use std::cell::{Cell, RefCell};
use std::collections::BTreeMap;
use std::rc::Rc;
use std::time::Duration;

use calloop::timer::{TimeoutAction, Timer};
use calloop::{LoopHandle, RegistrationToken};
use tracing::{debug, trace, warn};

use crate::error::{Result, WidgetError};

/// Default redraw period
pub const DEFAULT_REFRESH_INTERVAL: Duration = Duration::from_millis(1000);

/// Callback run on every timer firing
pub type TickCallback = Box<dyn FnMut()>;

/// Opaque handle to a repeating timer
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct TimerHandle(u64);

/// Source of repeating timers
pub trait TimerService {
    /// Start a timer that runs `tick` every `period` until cancelled
    fn start_interval(&self, period: Duration, tick: TickCallback) -> Result<TimerHandle>;

    /// Stop a timer. Unknown handles are ignored.
    fn cancel(&self, handle: TimerHandle);

    /// Number of timers currently registered
    fn active_timers(&self) -> usize;
}

/// Timers backed by a calloop event loop
pub struct CalloopTimers<D: 'static> {
    handle: LoopHandle<'static, D>,
    tokens: RefCell<BTreeMap<TimerHandle, RegistrationToken>>,
    next_id: Cell<u64>,
}

impl<D: 'static> CalloopTimers<D> {
    pub fn new(handle: LoopHandle<'static, D>) -> Self {
        Self {
            handle,
            tokens: RefCell::new(BTreeMap::new()),
            next_id: Cell::new(0),
        }
    }
}

impl<D: 'static> TimerService for CalloopTimers<D> {
    fn start_interval(&self, period: Duration, mut tick: TickCallback) -> Result<TimerHandle> {
        let token = self
            .handle
            .insert_source(Timer::from_duration(period), move |_deadline, _, _data| {
                tick();
                TimeoutAction::ToDuration(period)
            })
            .map_err(|e| WidgetError::Scheduler(e.error.to_string()))?;

        let id = TimerHandle(self.next_id.get());
        self.next_id.set(id.0 + 1);
        self.tokens.borrow_mut().insert(id, token);
        debug!(timer = id.0, period_ms = period.as_millis() as u64, "Timer started");
        Ok(id)
    }

    fn cancel(&self, handle: TimerHandle) {
        match self.tokens.borrow_mut().remove(&handle) {
            Some(token) => {
                self.handle.remove(token);
                debug!(timer = handle.0, "Timer cancelled");
            }
            None => warn!(timer = handle.0, "Cancel for unknown timer"),
        }
    }

    fn active_timers(&self) -> usize {
        self.tokens.borrow().len()
    }
}

/// Timers fired explicitly with [`ManualTimers::fire_all`]
///
/// For hosts that run their own frame loop, and for tests.
#[derive(Default)]
pub struct ManualTimers {
    timers: RefCell<BTreeMap<TimerHandle, (Duration, Rc<RefCell<TickCallback>>)>>,
    next_id: Cell<u64>,
}

impl ManualTimers {
    pub fn new() -> Self {
        Self::default()
    }

    /// Fire every registered timer once, in start order
    ///
    /// Returns how many callbacks ran.
    pub fn fire_all(&self) -> usize {
        // Callbacks may start or cancel timers; don't hold the map borrowed
        let callbacks: Vec<_> = self
            .timers
            .borrow()
            .values()
            .map(|(_, cb)| Rc::clone(cb))
            .collect();
        for callback in &callbacks {
            let mut tick = callback.borrow_mut();
            (*tick)();
        }
        callbacks.len()
    }

    /// Period a timer was started with
    pub fn period(&self, handle: TimerHandle) -> Option<Duration> {
        self.timers.borrow().get(&handle).map(|(period, _)| *period)
    }
}

impl TimerService for ManualTimers {
    fn start_interval(&self, period: Duration, tick: TickCallback) -> Result<TimerHandle> {
        let id = TimerHandle(self.next_id.get());
        self.next_id.set(id.0 + 1);
        self.timers
            .borrow_mut()
            .insert(id, (period, Rc::new(RefCell::new(tick))));
        Ok(id)
    }

    fn cancel(&self, handle: TimerHandle) {
        if self.timers.borrow_mut().remove(&handle).is_none() {
            warn!(timer = handle.0, "Cancel for unknown timer");
        }
    }

    fn active_timers(&self) -> usize {
        self.timers.borrow().len()
    }
}

/// Owns the single refresh timer of one mounted clock
pub struct RefreshScheduler {
    timers: Rc<dyn TimerService>,
    period: Duration,
    handle: Option<TimerHandle>,
    /// Cleared on stop so that a firing already in flight does nothing
    live: Rc<Cell<bool>>,
    ticks: Rc<Cell<u64>>,
}

impl RefreshScheduler {
    pub fn new(timers: Rc<dyn TimerService>, period: Duration) -> Self {
        Self {
            timers,
            period,
            handle: None,
            live: Rc::new(Cell::new(false)),
            ticks: Rc::new(Cell::new(0)),
        }
    }

    /// Start ticking. A second call while running is ignored.
    pub fn start<F>(&mut self, mut on_tick: F) -> Result<()>
    where
        F: FnMut() + 'static,
    {
        if self.handle.is_some() {
            debug!("Refresh timer already running");
            return Ok(());
        }

        // Fresh guard per start: a stale firing from an earlier run sees
        // its own, already cleared, flag
        let live = Rc::new(Cell::new(true));
        let ticks = Rc::clone(&self.ticks);
        let guard = Rc::clone(&live);
        let handle = self.timers.start_interval(
            self.period,
            Box::new(move || {
                if !guard.get() {
                    trace!("Tick after teardown ignored");
                    return;
                }
                ticks.set(ticks.get() + 1);
                on_tick();
            }),
        )?;

        self.live = live;
        self.handle = Some(handle);
        Ok(())
    }

    /// Stop ticking. Safe to call when not running.
    pub fn stop(&mut self) {
        self.live.set(false);
        if let Some(handle) = self.handle.take() {
            self.timers.cancel(handle);
        }
    }

    pub fn is_running(&self) -> bool {
        self.handle.is_some()
    }

    pub fn period(&self) -> Duration {
        self.period
    }

    /// Ticks delivered since creation
    pub fn tick_count(&self) -> u64 {
        self.ticks.get()
    }
}

impl Drop for RefreshScheduler {
    fn drop(&mut self) {
        self.stop();
    }
}
