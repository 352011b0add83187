use serde::{Deserialize, Serialize};

/// CSS color value carried through keyframe properties.
///
/// Inputs arrive as the `rgb()`/`rgba()`/hex strings a vector authoring tool
/// emits; outputs serialize back to the same notation, so the IR consumer
/// never sees anything but CSS color strings.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Color {
    pub r: u8,
    pub g: u8,
    pub b: u8,
    pub a: f64,
}

impl Color {
    pub const TRANSPARENT: Self = Self {
        r: 0,
        g: 0,
        b: 0,
        a: 0.0,
    };

    pub fn rgb(r: u8, g: u8, b: u8) -> Self {
        Self { r, g, b, a: 1.0 }
    }

    pub fn rgba(r: u8, g: u8, b: u8, a: f64) -> Self {
        Self { r, g, b, a }
    }

    /// Multiply the alpha channel, leaving the base color untouched.
    pub fn with_alpha(self, opacity: f64) -> Self {
        Self {
            a: self.a * opacity,
            ..self
        }
    }

    pub fn parse(s: &str) -> Result<Self, String> {
        let s = s.trim();
        if let Some(hex) = s.strip_prefix('#') {
            return parse_hex(hex);
        }
        if let Some(body) = s.strip_prefix("rgba(").and_then(|r| r.strip_suffix(')')) {
            return parse_components(body, true);
        }
        if let Some(body) = s.strip_prefix("rgb(").and_then(|r| r.strip_suffix(')')) {
            return parse_components(body, false);
        }
        Err(format!("unsupported color \"{s}\""))
    }

    pub fn to_css(self) -> String {
        if self.a == 1.0 {
            format!("rgb({},{},{})", self.r, self.g, self.b)
        } else {
            format!("rgba({},{},{},{})", self.r, self.g, self.b, self.a)
        }
    }
}

fn parse_hex(hex: &str) -> Result<Color, String> {
    fn byte(pair: &str) -> Result<u8, String> {
        u8::from_str_radix(pair, 16).map_err(|_| format!("invalid hex byte \"{pair}\""))
    }

    match hex.len() {
        3 => {
            let mut out = [0u8; 3];
            for (i, c) in hex.chars().enumerate() {
                let v = c
                    .to_digit(16)
                    .ok_or_else(|| format!("invalid hex digit '{c}'"))? as u8;
                out[i] = v * 17;
            }
            Ok(Color::rgb(out[0], out[1], out[2]))
        }
        6 => Ok(Color::rgb(
            byte(&hex[0..2])?,
            byte(&hex[2..4])?,
            byte(&hex[4..6])?,
        )),
        8 => Ok(Color::rgba(
            byte(&hex[0..2])?,
            byte(&hex[2..4])?,
            byte(&hex[4..6])?,
            f64::from(byte(&hex[6..8])?) / 255.0,
        )),
        _ => Err("hex color must be #rgb, #rrggbb or #rrggbbaa".to_owned()),
    }
}

fn parse_components(body: &str, has_alpha: bool) -> Result<Color, String> {
    let parts: Vec<&str> = body.split(',').map(str::trim).collect();
    let expected = if has_alpha { 4 } else { 3 };
    if parts.len() != expected {
        return Err(format!("expected {expected} color components"));
    }

    let channel = |s: &str| -> Result<u8, String> {
        let v: f64 = s.parse().map_err(|_| format!("invalid component \"{s}\""))?;
        Ok(v.round().clamp(0.0, 255.0) as u8)
    };

    let a = if has_alpha {
        parts[3]
            .parse()
            .map_err(|_| format!("invalid alpha \"{}\"", parts[3]))?
    } else {
        1.0
    };

    Ok(Color::rgba(
        channel(parts[0])?,
        channel(parts[1])?,
        channel(parts[2])?,
        a,
    ))
}

impl Serialize for Color {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: serde::Serializer,
    {
        serializer.serialize_str(&self.to_css())
    }
}

impl<'de> Deserialize<'de> for Color {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: serde::Deserializer<'de>,
    {
        let s = String::deserialize(deserializer)?;
        Self::parse(&s).map_err(serde::de::Error::custom)
    }
}
