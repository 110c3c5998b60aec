use std::f64::consts::TAU;

use kurbo::{Arc, BezPath, Point, Rect, Shape, Vec2};

use crate::{
    error::{RayfanError, RayfanResult},
    fan::{FanFrame, Stripe},
    surface::buffer_len,
};

/// Paints one frame of the fan into a premultiplied RGBA8 buffer.
///
/// The buffer is cleared to transparent first, then stripes composite
/// src-over in order. `scale` maps the frame's logical coordinates to device
/// pixels; a zero-sized buffer is fine and paints nothing.
#[tracing::instrument(skip(data, frame), fields(stripes = frame.stripes.len()))]
pub fn paint_fan(
    data: &mut [u8],
    width: u32,
    height: u32,
    scale: f64,
    frame: &FanFrame,
) -> RayfanResult<()> {
    let expected = buffer_len(width, height)?;
    if data.len() != expected {
        return Err(RayfanError::paint(format!(
            "buffer length {} does not match {width}x{height}",
            data.len()
        )));
    }
    if !scale.is_finite() || scale <= 0.0 {
        return Err(RayfanError::paint(format!(
            "scale must be finite and positive, got {scale}"
        )));
    }

    data.fill(0);
    if width == 0 || height == 0 {
        return Ok(());
    }

    for stripe in &frame.stripes {
        paint_stripe(data, width, height, scale, frame, stripe);
    }
    Ok(())
}

fn paint_stripe(
    data: &mut [u8],
    width: u32,
    height: u32,
    scale: f64,
    frame: &FanFrame,
    stripe: &Stripe,
) {
    let sweep = stripe.sweep();
    if sweep <= 0.0 || frame.ray_len <= 0.0 {
        return;
    }
    let origin = frame.origin;

    // Device-space bounds of the wedge, padded one pixel for the soft edge.
    let bounds = wedge_bounds(origin, frame.ray_len, stripe.start, stripe.end);
    let scaled = Rect::new(
        bounds.x0 * scale,
        bounds.y0 * scale,
        bounds.x1 * scale,
        bounds.y1 * scale,
    )
    .inflate(1.0, 1.0);
    let x0 = scaled.x0.floor().max(0.0) as u32;
    let y0 = scaled.y0.floor().max(0.0) as u32;
    let x1 = scaled.x1.ceil().min(f64::from(width)).max(0.0) as u32;
    let y1 = scaled.y1.ceil().min(f64::from(height)).max(0.0) as u32;

    let axis_len2 = stripe.axis.hypot2();
    let inv_scale = 1.0 / scale;

    for py in y0..y1 {
        let ly = (f64::from(py) + 0.5) * inv_scale;
        let row = (py as usize) * (width as usize) * 4;
        for px in x0..x1 {
            let lx = (f64::from(px) + 0.5) * inv_scale;
            let d = Vec2::new(lx - origin.x, ly - origin.y);
            let r = d.hypot();

            // Signed angular distance (radians) to the nearest wedge edge,
            // wrapped so a stripe may straddle the 0/2pi seam.
            let rel = (d.y.atan2(d.x) - stripe.start).rem_euclid(TAU);
            let ang_signed = if rel <= sweep {
                rel.min(sweep - rel)
            } else {
                -(rel - sweep).min(TAU - rel)
            };

            // Half-pixel coverage ramps on the angular and radial edges,
            // converted to device pixels. min() takes the tighter edge.
            let ang_cov = (0.5 + ang_signed * r * scale).clamp(0.0, 1.0);
            let rad_cov = (0.5 + (frame.ray_len - r) * scale).clamp(0.0, 1.0);
            let coverage = ang_cov.min(rad_cov);
            if coverage <= 0.0 {
                continue;
            }

            let u = if axis_len2 > 0.0 {
                d.dot(stripe.axis) / axis_len2
            } else {
                1.0
            };
            let alpha = frame.falloff.alpha_at(u) * coverage;
            let src = stripe.color.premul(alpha);
            if src[3] == 0 {
                continue;
            }

            let idx = row + (px as usize) * 4;
            over_px(&mut data[idx..idx + 4], src);
        }
    }
}

/// Bounding box of the wedge: both straight edges plus the connecting arc.
fn wedge_bounds(origin: Point, ray_len: f64, start: f64, end: f64) -> Rect {
    let arc = Arc::new(origin, Vec2::new(ray_len, ray_len), start, end - start, 0.0);
    let mut path = BezPath::new();
    path.move_to(origin);
    path.line_to(origin + ray_len * Vec2::new(start.cos(), start.sin()));
    path.extend(arc.append_iter(0.1));
    path.close_path();
    path.bounding_box()
}

/// Premultiplied src-over: `out = src + dst * (255 - src.a) / 255`.
fn over_px(dst: &mut [u8], src: [u8; 4]) {
    let inv = 255 - src[3];
    for c in 0..4 {
        dst[c] = src[c].saturating_add(mul_div255(dst[c], inv));
    }
}

fn mul_div255(x: u8, y: u8) -> u8 {
    (((u32::from(x) * u32::from(y)) + 127) / 255) as u8
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::color::Rgb8;
    use crate::fan::Falloff;

    fn one_stripe_frame(start: f64, end: f64, color: Rgb8) -> FanFrame {
        let mid = (start + end) * 0.5;
        let ray_len = 40.0;
        FanFrame {
            origin: Point::new(32.0, 32.0),
            ray_len,
            falloff: Falloff::default(),
            stripes: vec![Stripe {
                color,
                start,
                end,
                axis: Vec2::new(mid.cos(), mid.sin()) * (ray_len * 0.6),
            }],
        }
    }

    fn px(data: &[u8], width: u32, x: u32, y: u32) -> [u8; 4] {
        let idx = ((y as usize) * (width as usize) + x as usize) * 4;
        [data[idx], data[idx + 1], data[idx + 2], data[idx + 3]]
    }

    #[test]
    fn mul_div255_identities() {
        for x in [0u8, 1, 127, 200, 255] {
            assert_eq!(mul_div255(x, 255), x);
            assert_eq!(mul_div255(x, 0), 0);
        }
        assert_eq!(mul_div255(128, 128), 64);
    }

    #[test]
    fn over_px_blends_premultiplied() {
        let mut dst = [100, 0, 0, 255];
        over_px(&mut dst, [0, 0, 0, 0]);
        assert_eq!(dst, [100, 0, 0, 255]);

        let mut dst = [100, 0, 0, 255];
        over_px(&mut dst, [0, 200, 0, 255]);
        assert_eq!(dst, [0, 200, 0, 255]);

        let mut dst = [0, 0, 100, 100];
        over_px(&mut dst, [128, 0, 0, 128]);
        // inv = 127, mul_div255(100, 127) = 50.
        assert_eq!(dst, [128, 0, 50, 178]);
    }

    #[test]
    fn rejects_mismatched_buffer() {
        let frame = one_stripe_frame(-0.2, 0.2, Rgb8::new(255, 0, 0));
        let mut data = vec![0u8; 10];
        assert!(paint_fan(&mut data, 64, 64, 1.0, &frame).is_err());
        let mut data = vec![0u8; 64 * 64 * 4];
        assert!(paint_fan(&mut data, 64, 64, 0.0, &frame).is_err());
    }

    #[test]
    fn clears_previous_contents() {
        let frame = FanFrame {
            origin: Point::new(0.0, 0.0),
            ray_len: 10.0,
            falloff: Falloff::default(),
            stripes: Vec::new(),
        };
        let mut data = vec![0xAA; 16 * 16 * 4];
        paint_fan(&mut data, 16, 16, 1.0, &frame).unwrap();
        assert!(data.iter().all(|&b| b == 0));
    }

    #[test]
    fn zero_sized_buffer_is_ok() {
        let frame = one_stripe_frame(-0.2, 0.2, Rgb8::new(255, 0, 0));
        let mut data = Vec::new();
        paint_fan(&mut data, 0, 64, 1.0, &frame).unwrap();
        paint_fan(&mut data, 64, 0, 1.0, &frame).unwrap();
    }

    #[test]
    fn paints_inside_the_wedge_only() {
        let frame = FanFrame {
            origin: Point::new(32.0, 32.0),
            ray_len: 20.0,
            falloff: Falloff::default(),
            stripes: vec![Stripe {
                color: Rgb8::new(255, 0, 0),
                start: -0.2,
                end: 0.2,
                axis: Vec2::new(12.0, 0.0),
            }],
        };
        let mut data = vec![0u8; 64 * 64 * 4];
        paint_fan(&mut data, 64, 64, 1.0, &frame).unwrap();

        // On the +x midline, well inside the wedge and the falloff span.
        let inside = px(&data, 64, 40, 32);
        assert!(inside[0] > 0 && inside[3] > 0);
        // Opposite direction from the origin: untouched.
        assert_eq!(px(&data, 64, 20, 32), [0, 0, 0, 0]);
        // Same direction but past the ray end (origin.x + 20).
        assert_eq!(px(&data, 64, 56, 32), [0, 0, 0, 0]);
    }

    #[test]
    fn alpha_fades_with_distance_from_origin() {
        let frame = one_stripe_frame(-0.3, 0.3, Rgb8::new(0, 255, 0));
        let mut data = vec![0u8; 64 * 64 * 4];
        paint_fan(&mut data, 64, 64, 1.0, &frame).unwrap();

        let near = px(&data, 64, 38, 32);
        let far = px(&data, 64, 52, 32);
        assert!(near[3] > far[3]);
        assert!(far[3] > 0);
    }

    #[test]
    fn wedge_may_straddle_the_angle_seam() {
        // start just below 2pi, end wraps past it; the +x axis lies inside.
        let frame = one_stripe_frame(TAU - 0.2, TAU + 0.2, Rgb8::new(0, 0, 255));
        let mut data = vec![0u8; 64 * 64 * 4];
        paint_fan(&mut data, 64, 64, 1.0, &frame).unwrap();
        let inside = px(&data, 64, 44, 32);
        assert!(inside[2] > 0 && inside[3] > 0);
    }

    #[test]
    fn later_stripes_composite_over_earlier_ones() {
        let red = Stripe {
            color: Rgb8::new(255, 0, 0),
            start: -0.3,
            end: 0.1,
            axis: Vec2::new(24.0, 0.0),
        };
        let blue = Stripe {
            color: Rgb8::new(0, 0, 255),
            start: -0.1,
            end: 0.3,
            axis: Vec2::new(24.0, 0.0),
        };
        let frame = FanFrame {
            origin: Point::new(32.0, 32.0),
            ray_len: 40.0,
            falloff: Falloff::default(),
            stripes: vec![red, blue],
        };
        let mut data = vec![0u8; 64 * 64 * 4];
        paint_fan(&mut data, 64, 64, 1.0, &frame).unwrap();

        // The +x midline sits in the overlap; blue painted last dominates.
        let overlap = px(&data, 64, 42, 32);
        assert!(overlap[2] > overlap[0]);
        assert!(overlap[0] > 0);
    }

    #[test]
    fn scale_maps_logical_to_device() {
        let frame = one_stripe_frame(-0.2, 0.2, Rgb8::new(255, 255, 255));
        let mut lo = vec![0u8; 64 * 64 * 4];
        paint_fan(&mut lo, 64, 64, 1.0, &frame).unwrap();
        let mut hi = vec![0u8; 128 * 128 * 4];
        paint_fan(&mut hi, 128, 128, 2.0, &frame).unwrap();

        // The same logical sample point lands on a painted pixel in both.
        assert!(px(&lo, 64, 44, 32)[3] > 0);
        assert!(px(&hi, 128, 88, 64)[3] > 0);
    }
}
