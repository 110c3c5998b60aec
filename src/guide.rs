//! # Rayfan guide
//!
//! A short end-to-end walkthrough of how a backdrop frame comes to exist.
//! For copy/paste commands see the repository `README.md`; this is the
//! mental model.
//!
//! ## Core pieces
//!
//! - [`FanParams`](crate::FanParams): the whole look. Palette (one stripe
//!   per color), total spread, fill/gap ratio, the two oscillators (whole-fan
//!   sway, per-stripe wobble), origin placement, ray length, and the alpha
//!   falloff ramp. Defaults reproduce the stock backdrop; serde fills in
//!   whatever a JSON config leaves out.
//! - [`FanFrame::eval`](crate::FanFrame::eval): pure geometry. Given params,
//!   elapsed seconds, and a logical viewport it returns the shared origin,
//!   the ray length, and N stripes in palette order. No pixels, no clock, no
//!   state. Same inputs, same output.
//! - [`paint_fan`](crate::paint_fan): CPU rasterizer. Clears the buffer,
//!   then paints each stripe as a wedge from the origin: angular containment
//!   picks the pixels, a half-pixel coverage ramp softens the edges, and the
//!   falloff ramp fades alpha along the stripe's axis. Stripes composite
//!   src-over in order, so wobble-induced overlaps resolve like painter's
//!   order.
//! - [`Surface`](crate::Surface): the sizing manager. Feed it logical size
//!   observations plus a device scale factor and it keeps a premultiplied
//!   RGBA8 buffer at `floor(logical * scale)`. Repeat observations are
//!   no-ops; an unattached (`None`) observation keeps whatever was there.
//! - [`FanDriver`](crate::FanDriver): the state machine. Stopped or
//!   Running, nothing else. It owns the surface and the clock origin (the
//!   first refresh timestamp it sees), consumes
//!   [`HostEvent`](crate::HostEvent)s, and hands finished frames to a
//!   [`PresentSink`](crate::PresentSink).
//!
//! ## Lifecycle
//!
//! 1. `FanDriver::new(params)` validates everything up front.
//! 2. `mount(sink)` asks the sink to `begin()`. If that fails the driver
//!    simply stays stopped: the backdrop is decoration, a host without a
//!    presentation target renders nothing and nobody gets an error dialog.
//! 3. Each `HostEvent::Resize` refits the surface immediately. Several
//!    resizes between refreshes are fine; the last one wins.
//! 4. Each `HostEvent::Refresh` first checks the
//!    [`CancelToken`](crate::CancelToken). Set means stop, before any paint.
//!    Otherwise: elapsed time from the clock origin, `FanFrame::eval`,
//!    `paint_fan`, `sink.present`.
//! 5. `stop(sink)` (or a cancel observed mid-run) ends the sink. Stopping
//!    twice is fine.
//!
//! Everything above runs on one thread. The only cross-thread handle is the
//! token, which any owner may flip; the driver notices at the next refresh
//! boundary. There is no global animation state anywhere, so two drivers
//! with different palettes coexist happily in one process.
//!
//! ## Time
//!
//! Hosts pass monotonic timestamps in seconds. The driver subtracts the
//! first one it saw, clamps negative deltas to zero, and lets
//! `FanParams::speed` scale the result inside `eval`. Rendering offline?
//! Skip the driver and call `eval` + `paint_fan` with whatever `t` you
//! like; that is exactly what the `rayfan frame` subcommand does.
