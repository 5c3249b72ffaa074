/// 8-bit RGB color as stored in layer configs.
pub type Rgb = [u8; 3];

/// 8-bit RGBA color as consumed by the renderer.
pub type Rgba = [u8; 4];

/// Color used for rows whose channel value cannot be encoded.
pub const NULL_COLOR: Rgba = [0, 0, 0, 0];

pub const fn opaque(c: Rgb) -> Rgba {
    [c[0], c[1], c[2], 255]
}

/// Linear interpolation between two colors, `t` clamped to `[0, 1]`.
pub fn lerp_rgb(a: Rgb, b: Rgb, t: f64) -> Rgb {
    let t = if t.is_finite() { t.clamp(0.0, 1.0) } else { 0.0 };
    let mix = |x: u8, y: u8| -> u8 {
        let v = x as f64 + (y as f64 - x as f64) * t;
        v.round().clamp(0.0, 255.0) as u8
    };
    [mix(a[0], b[0]), mix(a[1], b[1]), mix(a[2], b[2])]
}

/// Piecewise-linear interpolation across evenly spaced palette stops.
pub fn interpolate_palette(stops: &[Rgb], t: f64) -> Option<Rgb> {
    match stops {
        [] => None,
        [only] => Some(*only),
        _ => {
            let t = if t.is_finite() { t.clamp(0.0, 1.0) } else { 0.0 };
            let segments = (stops.len() - 1) as f64;
            let scaled = t * segments;
            let i = (scaled.floor() as usize).min(stops.len() - 2);
            Some(lerp_rgb(stops[i], stops[i + 1], scaled - i as f64))
        }
    }
}
