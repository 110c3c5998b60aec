//! Rayfan paints an animated fan of translucent color stripes, the soft
//! radial gradient that sits behind a hero section.
//!
//! Geometry is a pure function of elapsed time, the rasterizer writes
//! premultiplied RGBA8, and a small driver state machine ties the clock, the
//! surface, and host refresh callbacks together:
//!
//! - Describe the fan with a [`FanParams`] (palette, spread, oscillators)
//! - Evaluate one frame of geometry: [`FanFrame::eval`]
//! - Paint it: [`paint_fan`] into a [`Surface`]
//! - Or hand both jobs to a [`FanDriver`] feeding a [`PresentSink`]
#![forbid(unsafe_code)]

pub mod color;
pub mod driver;
pub mod error;
pub mod fan;
pub mod guide;
pub mod raster;
pub mod sink;
pub mod surface;

pub use kurbo::{Point, Rect, Vec2};

pub use color::Rgb8;
pub use driver::{CancelToken, DriverState, DriverStats, FanDriver, HostEvent};
pub use error::{RayfanError, RayfanResult};
pub use fan::{
    Falloff, FalloffStop, FanFrame, FanParams, Sine, Stripe, default_palette, hero_params,
};
pub use raster::paint_fan;
pub use sink::{MemorySink, OwnedFrame, PngDirSink, PresentSink};
pub use surface::{FrameRef, Surface, Viewport};
