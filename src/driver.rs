use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

use tracing::debug;

use crate::{
    error::RayfanResult,
    fan::{FanFrame, FanParams},
    raster,
    sink::PresentSink,
    surface::{Surface, Viewport},
};

/// Cooperative cancellation handle shared with the host.
///
/// The driver checks it before every refresh; once set, no further paint or
/// present happens. Cloning hands the same flag to another owner, which may
/// flip it from any thread.
#[derive(Clone, Debug, Default)]
pub struct CancelToken(Arc<AtomicBool>);

impl CancelToken {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn cancel(&self) {
        self.0.store(true, Ordering::Relaxed);
    }

    pub fn is_cancelled(&self) -> bool {
        self.0.load(Ordering::Relaxed)
    }
}

/// What the host feeds the driver, in arrival order.
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum HostEvent {
    /// Display refresh callback. `now_s` is a monotonic timestamp in
    /// seconds from any origin; elapsed time keys off the first one seen.
    Refresh { now_s: f64 },
    /// Container resize observation, `None` while the container is
    /// unattached. Each observation applies immediately, so when several
    /// arrive between refreshes the last one wins.
    Resize {
        viewport: Option<Viewport>,
        scale: f64,
    },
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum DriverState {
    Stopped,
    Running,
}

/// Aggregated driver counters.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct DriverStats {
    /// Refresh events observed while running.
    pub refreshes: u64,
    /// Refreshes that produced a repaint (surface was non-blank).
    pub frames_painted: u64,
    /// Resize observations applied.
    pub resizes: u64,
}

/// Drives the backdrop: owns the surface, the clock origin, and the state
/// machine. Everything runs on the caller's thread; the cancel token is the
/// only handle shared across threads.
#[derive(Debug)]
pub struct FanDriver {
    params: FanParams,
    surface: Surface,
    token: CancelToken,
    state: DriverState,
    start_s: Option<f64>,
    stats: DriverStats,
}

impl FanDriver {
    /// Validates `params` and builds a stopped driver.
    pub fn new(params: FanParams) -> RayfanResult<Self> {
        params.validate()?;
        Ok(Self {
            params,
            surface: Surface::new(),
            token: CancelToken::new(),
            state: DriverState::Stopped,
            start_s: None,
            stats: DriverStats::default(),
        })
    }

    /// Cloneable cancellation handle for the host.
    pub fn cancel_token(&self) -> CancelToken {
        self.token.clone()
    }

    pub fn state(&self) -> DriverState {
        self.state
    }

    pub fn stats(&self) -> DriverStats {
        self.stats
    }

    pub fn surface(&self) -> &Surface {
        &self.surface
    }

    pub fn params(&self) -> &FanParams {
        &self.params
    }

    /// Attempts to start. A sink that fails `begin` leaves the driver
    /// stopped with the failure logged and swallowed; everything painted
    /// later flows through `pump`.
    #[tracing::instrument(skip(self, sink))]
    pub fn mount(&mut self, sink: &mut dyn PresentSink) {
        if self.state == DriverState::Running {
            return;
        }
        match sink.begin() {
            Ok(()) => {
                self.start_s = None;
                self.state = DriverState::Running;
                debug!("driver running");
            }
            Err(err) => {
                debug!(%err, "presentation target unavailable, staying stopped");
            }
        }
    }

    /// Processes one host event. Inert while stopped.
    pub fn pump(&mut self, event: HostEvent, sink: &mut dyn PresentSink) -> RayfanResult<()> {
        if self.state != DriverState::Running {
            return Ok(());
        }
        match event {
            HostEvent::Resize { viewport, scale } => {
                self.surface.fit(viewport, scale)?;
                self.stats.resizes += 1;
                Ok(())
            }
            HostEvent::Refresh { now_s } => self.refresh(now_s, sink),
        }
    }

    fn refresh(&mut self, now_s: f64, sink: &mut dyn PresentSink) -> RayfanResult<()> {
        if self.token.is_cancelled() {
            debug!("cancelled before refresh, stopping");
            return self.stop(sink);
        }
        self.stats.refreshes += 1;

        let start = *self.start_s.get_or_insert(now_s);
        let t = (now_s - start).max(0.0);

        if self.surface.is_blank() {
            return Ok(());
        }

        let frame = FanFrame::eval(&self.params, t, self.surface.viewport());
        let (width, height) = self.surface.device_size();
        let scale = self.surface.scale();
        raster::paint_fan(self.surface.data_mut(), width, height, scale, &frame)?;
        self.stats.frames_painted += 1;
        sink.present(self.surface.frame())
    }

    /// Running → Stopped. Idempotent; releases the sink on the first call.
    #[tracing::instrument(skip(self, sink))]
    pub fn stop(&mut self, sink: &mut dyn PresentSink) -> RayfanResult<()> {
        if self.state == DriverState::Stopped {
            return Ok(());
        }
        self.state = DriverState::Stopped;
        debug!(stats = ?self.stats, "driver stopped");
        sink.end()
    }

    /// Convenience loop: mount, pump each event in order, stop. Stops early
    /// once a cancellation is observed.
    pub fn run<I>(&mut self, events: I, sink: &mut dyn PresentSink) -> RayfanResult<DriverStats>
    where
        I: IntoIterator<Item = HostEvent>,
    {
        self.mount(sink);
        for event in events {
            if self.state != DriverState::Running {
                break;
            }
            self.pump(event, sink)?;
        }
        self.stop(sink)?;
        Ok(self.stats)
    }
}
