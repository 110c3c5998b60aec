use std::f64::consts::PI;

use kurbo::{Point, Vec2};

use crate::{
    color::Rgb8,
    error::{RayfanError, RayfanResult},
    surface::Viewport,
};

/// Sinusoidal oscillator: `amp * sin(rate * t + phase)`.
#[derive(Clone, Copy, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct Sine {
    pub amp: f64,
    pub rate: f64,
    #[serde(default)]
    pub phase: f64,
}

impl Sine {
    pub const fn new(amp: f64, rate: f64) -> Self {
        Self {
            amp,
            rate,
            phase: 0.0,
        }
    }

    pub fn eval(self, t: f64) -> f64 {
        self.eval_with_phase(t, 0.0)
    }

    /// Evaluates with an extra phase offset added to `phase`.
    pub fn eval_with_phase(self, t: f64, extra: f64) -> f64 {
        self.amp * (self.rate * t + self.phase + extra).sin()
    }

    fn validate(self, what: &str) -> RayfanResult<()> {
        if !(self.amp.is_finite() && self.rate.is_finite() && self.phase.is_finite()) {
            return Err(RayfanError::validation(format!(
                "{what} oscillator fields must be finite"
            )));
        }
        Ok(())
    }
}

#[derive(Clone, Copy, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct FalloffStop {
    /// Position along the falloff axis, 0 at the origin, 1 at the axis end.
    pub at: f64,
    pub alpha: f64,
}

/// Alpha ramp along a stripe's falloff axis.
#[derive(Clone, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct Falloff {
    /// Fraction of the ray length covered by the ramp.
    pub span: f64,
    pub stops: Vec<FalloffStop>,
}

impl Default for Falloff {
    fn default() -> Self {
        Self {
            span: 0.6,
            stops: vec![
                FalloffStop {
                    at: 0.0,
                    alpha: 0.98,
                },
                FalloffStop {
                    at: 0.3,
                    alpha: 0.85,
                },
                FalloffStop {
                    at: 0.65,
                    alpha: 0.5,
                },
                FalloffStop { at: 1.0, alpha: 0.0 },
            ],
        }
    }
}

impl Falloff {
    /// Piecewise-linear alpha at `u`, the normalized projection along the
    /// axis. Clamps to the outermost stops, gradient-style: past the last
    /// stop the default ramp stays fully transparent.
    pub fn alpha_at(&self, u: f64) -> f64 {
        let Some(first) = self.stops.first() else {
            return 0.0;
        };
        if u <= first.at {
            return first.alpha;
        }
        for pair in self.stops.windows(2) {
            let (a, b) = (pair[0], pair[1]);
            if u <= b.at {
                let w = b.at - a.at;
                if w <= f64::EPSILON {
                    return b.alpha;
                }
                return a.alpha + (b.alpha - a.alpha) * ((u - a.at) / w);
            }
        }
        self.stops.last().map(|s| s.alpha).unwrap_or(0.0)
    }

    fn validate(&self) -> RayfanResult<()> {
        if self.stops.is_empty() {
            return Err(RayfanError::validation("falloff needs at least one stop"));
        }
        if !self.span.is_finite() || self.span <= 0.0 {
            return Err(RayfanError::validation(
                "falloff span must be finite and positive",
            ));
        }
        let mut prev: Option<f64> = None;
        for stop in &self.stops {
            if !stop.at.is_finite() || !(0.0..=1.0).contains(&stop.at) {
                return Err(RayfanError::validation(format!(
                    "falloff stop position {} must be in [0, 1]",
                    stop.at
                )));
            }
            if !stop.alpha.is_finite() || !(0.0..=1.0).contains(&stop.alpha) {
                return Err(RayfanError::validation(format!(
                    "falloff stop alpha {} must be in [0, 1]",
                    stop.alpha
                )));
            }
            if prev.is_some_and(|p| stop.at < p) {
                return Err(RayfanError::validation(
                    "falloff stops must be in ascending order",
                ));
            }
            prev = Some(stop.at);
        }
        Ok(())
    }
}

/// Tuning for the radial fan. The defaults reproduce the stock backdrop;
/// serde fills missing fields from them so a config can override just a
/// palette or a speed.
#[derive(Clone, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
#[serde(default)]
pub struct FanParams {
    /// One stripe per entry, painted in order. May be empty.
    pub palette: Vec<Rgb8>,
    /// Time multiplier applied to elapsed seconds.
    pub speed: f64,
    /// Total angular spread of the fan, radians.
    pub spread: f64,
    /// Rest orientation of the fan's leading edge, radians.
    pub base_angle: f64,
    /// Whole-fan sway added to `base_angle`.
    pub sway: Sine,
    /// Per-stripe wobble; stripe `i` samples it at extra phase
    /// `i * wobble_step`, so neighbours drift against each other.
    pub wobble: Sine,
    pub wobble_step: f64,
    /// Painted fraction of each stripe slot; the rest is the gap.
    pub fill_ratio: f64,
    /// Origin as fractions of the viewport size. Slightly past (1, 1), so
    /// the apex sits just off the bottom-right corner.
    pub origin_factor: Vec2,
    /// Ray length as a multiple of the viewport diagonal.
    pub ray_factor: f64,
    pub falloff: Falloff,
}

impl Default for FanParams {
    fn default() -> Self {
        Self {
            palette: default_palette(),
            speed: 1.0,
            spread: 0.42 * PI,
            base_angle: 1.08 * PI,
            sway: Sine::new(0.06, 0.4),
            wobble: Sine::new(0.018, 1.2),
            wobble_step: 0.6,
            fill_ratio: 0.82,
            origin_factor: Vec2::new(1.02, 1.05),
            ray_factor: 1.3,
            falloff: Falloff::default(),
        }
    }
}

impl FanParams {
    /// Parses a JSON params document and validates it.
    pub fn from_json_str(s: &str) -> RayfanResult<Self> {
        let params: Self = serde_json::from_str(s).map_err(|e| RayfanError::serde(e.to_string()))?;
        params.validate()?;
        Ok(params)
    }

    pub fn validate(&self) -> RayfanResult<()> {
        if !self.speed.is_finite() || self.speed <= 0.0 {
            return Err(RayfanError::validation(format!(
                "speed must be finite and positive, got {}",
                self.speed
            )));
        }
        if !self.spread.is_finite() || self.spread <= 0.0 || self.spread > 2.0 * PI {
            return Err(RayfanError::validation("spread must be in (0, 2*pi]"));
        }
        if !self.base_angle.is_finite() {
            return Err(RayfanError::validation("base_angle must be finite"));
        }
        if !self.wobble_step.is_finite() {
            return Err(RayfanError::validation("wobble_step must be finite"));
        }
        if !self.fill_ratio.is_finite() || self.fill_ratio <= 0.0 || self.fill_ratio > 1.0 {
            return Err(RayfanError::validation("fill_ratio must be in (0, 1]"));
        }
        if !self.origin_factor.x.is_finite() || !self.origin_factor.y.is_finite() {
            return Err(RayfanError::validation("origin_factor must be finite"));
        }
        if !self.ray_factor.is_finite() || self.ray_factor < 1.0 {
            return Err(RayfanError::validation("ray_factor must be finite and >= 1"));
        }
        self.sway.validate("sway")?;
        self.wobble.validate("wobble")?;
        self.falloff.validate()
    }
}

/// Stock violet-to-amber palette, thirteen stripes.
pub fn default_palette() -> Vec<Rgb8> {
    [
        "#6d28d9", "#7c3aed", "#8b5cf6", "#a855f7", "#c026d3", "#d946ef", "#ec4899", "#f43f5e",
        "#ef4444", "#f97316", "#f59e0b", "#eab308", "#fbbf24",
    ]
    .iter()
    .map(|hex| Rgb8::from_hex_lossy(hex))
    .collect()
}

/// Deep blue/violet/pink variant used by the hero section, swaying slowly.
pub fn hero_params() -> FanParams {
    FanParams {
        palette: ["#1e40af", "#7c3aed", "#ec4899", "#0f172a", "#1e3a8a"]
            .iter()
            .map(|hex| Rgb8::from_hex_lossy(hex))
            .collect(),
        speed: 0.3,
        ..FanParams::default()
    }
}

/// One painted wedge. Angles are radians in the canvas convention (x right,
/// y down, angles increasing clockwise on screen).
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Stripe {
    pub color: Rgb8,
    pub start: f64,
    pub end: f64,
    /// Falloff axis: mid-angle direction scaled to `falloff.span * ray_len`.
    pub axis: Vec2,
}

impl Stripe {
    pub fn sweep(&self) -> f64 {
        self.end - self.start
    }

    pub fn mid_angle(&self) -> f64 {
        (self.start + self.end) * 0.5
    }
}

/// Geometry of one animation frame, ready for the rasterizer.
#[derive(Clone, Debug, PartialEq)]
pub struct FanFrame {
    pub origin: Point,
    pub ray_len: f64,
    pub falloff: Falloff,
    pub stripes: Vec<Stripe>,
}

impl FanFrame {
    /// Evaluates the fan at `t_seconds` of unscaled elapsed time.
    ///
    /// Pure: identical inputs give identical output. The fan as a whole
    /// sways around `base_angle`; each stripe adds its own wobble on a
    /// phase-shifted copy of the wobble oscillator. Stripes come out in
    /// palette order, which is also painter's order where wobble makes
    /// neighbours overlap.
    pub fn eval(params: &FanParams, t_seconds: f64, viewport: Viewport) -> Self {
        let t = t_seconds * params.speed;
        let fan_start = params.base_angle + params.sway.eval(t);
        let origin = Point::new(
            viewport.width * params.origin_factor.x,
            viewport.height * params.origin_factor.y,
        );
        let ray_len = viewport.diagonal() * params.ray_factor;

        let n = params.palette.len();
        let mut stripes = Vec::with_capacity(n);
        if n == 0 {
            return Self {
                origin,
                ray_len,
                falloff: params.falloff.clone(),
                stripes,
            };
        }

        let slot = params.spread / n as f64;
        for (i, &color) in params.palette.iter().enumerate() {
            let wobble = params
                .wobble
                .eval_with_phase(t, i as f64 * params.wobble_step);
            let start = fan_start + i as f64 * slot + wobble;
            let end = start + params.fill_ratio * slot;
            let mid = (start + end) * 0.5;
            let axis = Vec2::new(mid.cos(), mid.sin()) * (ray_len * params.falloff.span);
            stripes.push(Stripe {
                color,
                start,
                end,
                axis,
            });
        }

        Self {
            origin,
            ray_len,
            falloff: params.falloff.clone(),
            stripes,
        }
    }
}
