//! Renders a few frames of the hero-section backdrop (five deep blues and
//! pinks swaying at 0.3x speed) into `target/hero_backdrop/`.
//!
//! Run with: `cargo run --example hero_backdrop`

use rayfan::{FanDriver, HostEvent, PngDirSink, Viewport, hero_params};

fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt::init();

    let mut driver = FanDriver::new(hero_params())?;
    let mut sink = PngDirSink::new("target/hero_backdrop");

    let events = std::iter::once(HostEvent::Resize {
        viewport: Some(Viewport::new(640.0, 360.0)),
        scale: 2.0,
    })
    .chain((0..8).map(|i| HostEvent::Refresh {
        now_s: f64::from(i) * 0.25,
    }));
    let stats = driver.run(events, &mut sink)?;

    let (width, height) = driver.surface().device_size();
    eprintln!(
        "wrote {} frames to target/hero_backdrop ({width}x{height} device px)",
        stats.frames_painted
    );
    Ok(())
}
