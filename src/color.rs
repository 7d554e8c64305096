use smart_leds::RGB8;

/// Re-export the RGB8 type from smart-leds as Rgb
pub type Rgb = RGB8;

/// Pixel in the capture device's native channel order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Bgr {
    pub b: u8,
    pub g: u8,
    pub r: u8,
}

impl Bgr {
    /// Reverse the channel order into RGB
    pub const fn to_rgb(self) -> Rgb {
        Rgb {
            r: self.r,
            g: self.g,
            b: self.b,
        }
    }

    /// Reverse the channel order back to native
    pub const fn from_rgb(color: Rgb) -> Self {
        Self {
            b: color.b,
            g: color.g,
            r: color.r,
        }
    }
}

/// HSV pixel in byte encoding: hue spans 0-179 in half-degree units,
/// saturation and value span 0-255.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Hsv {
    pub hue: u8,
    pub sat: u8,
    pub val: u8,
}

/// Convert an RGB color to its HSV representation
///
/// Gray colors (zero saturation) report a hue of zero.
///
/// # Arguments
/// * `rgb` - RGB color to convert
#[allow(
    clippy::cast_lossless,
    clippy::cast_possible_truncation,
    clippy::cast_sign_loss
)]
pub fn rgb2hsv(rgb: Rgb) -> Hsv {
    let max = rgb.r.max(rgb.g).max(rgb.b);
    let min = rgb.r.min(rgb.g).min(rgb.b);
    let delta = max - min;

    let val = max;
    let sat = if max == 0 {
        0
    } else {
        ((u16::from(delta) * 255) / u16::from(max)) as u8
    };

    // Sector offsets are 0, 60 and 120 half-degrees for the red, green
    // and blue maxima. Only the red sector can go negative.
    let hue = if delta == 0 {
        0
    } else if max == rgb.r {
        let h = (30 * (i16::from(rgb.g) - i16::from(rgb.b))) / i16::from(delta);
        if h < 0 { (h + 180) as u8 } else { h as u8 }
    } else if max == rgb.g {
        (60 + (30 * (i16::from(rgb.b) - i16::from(rgb.r))) / i16::from(delta)) as u8
    } else {
        (120 + (30 * (i16::from(rgb.r) - i16::from(rgb.g))) / i16::from(delta)) as u8
    };

    Hsv { hue, sat, val }
}

/// Convert an HSV color back to RGB
///
/// # Arguments
/// * `hsv` - HSV color to convert, hue in half-degree units
#[allow(clippy::cast_possible_truncation)]
pub fn hsv2rgb(hsv: Hsv) -> Rgb {
    if hsv.sat == 0 {
        return Rgb {
            r: hsv.val,
            g: hsv.val,
            b: hsv.val,
        };
    }

    let v = u32::from(hsv.val);
    let s = u32::from(hsv.sat);

    // 60 degree sectors are 30 hue units wide
    let sector = hsv.hue / 30;
    let f = (u32::from(hsv.hue % 30) * 255) / 30;

    let p = ((v * (255 - s)) / 255) as u8;
    let q = ((v * (255 - (s * f) / 255)) / 255) as u8;
    let t = ((v * (255 - (s * (255 - f)) / 255)) / 255) as u8;
    let v = hsv.val;

    match sector {
        0 => Rgb { r: v, g: t, b: p },
        1 => Rgb { r: q, g: v, b: p },
        2 => Rgb { r: p, g: v, b: t },
        3 => Rgb { r: p, g: q, b: v },
        4 => Rgb { r: t, g: p, b: v },
        _ => Rgb { r: v, g: p, b: q },
    }
}
