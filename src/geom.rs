use crate::ease::Ease;

/// 2D point or displacement. Serialized as an `{x, y}` object; the output
/// contract depends on that exact shape.
#[derive(Clone, Copy, Debug, Default, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct Vec2 {
    pub x: f64,
    pub y: f64,
}

impl Vec2 {
    pub const ZERO: Self = Self { x: 0.0, y: 0.0 };

    pub fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }

    pub fn add(self, other: Self) -> Self {
        Self::new(self.x + other.x, self.y + other.y)
    }

    pub fn sub(self, other: Self) -> Self {
        Self::new(self.x - other.x, self.y - other.y)
    }

    pub fn scale(self, scalar: f64) -> Self {
        Self::new(self.x * scalar, self.y * scalar)
    }

    pub fn length(self) -> f64 {
        self.x.hypot(self.y)
    }

    pub fn lerp(self, other: Self, t: f64) -> Self {
        self.add(other.sub(self).scale(t))
    }
}

/// One cubic path segment: an on-curve point plus curve-control handles
/// expressed relative to that point.
#[derive(Clone, Copy, Debug, Default, PartialEq, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PathSegment {
    pub point: Vec2,
    pub handle_in: Vec2,
    pub handle_out: Vec2,
}

pub type Path = Vec<PathSegment>;

/// Axis-aligned box, used for effect-group transform origins.
#[derive(Clone, Copy, Debug, Default, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct Bounds {
    pub x: f64,
    pub y: f64,
    pub width: f64,
    pub height: f64,
}

impl Bounds {
    pub fn center(self) -> Vec2 {
        Vec2::new(self.x + self.width / 2.0, self.y + self.height / 2.0)
    }

    pub fn shift(self, offset: Vec2) -> Self {
        Self {
            x: self.x + offset.x,
            y: self.y + offset.y,
            ..self
        }
    }
}

/// Translate every on-curve point; handles are relative and stay put.
pub fn translate_path(path: &[PathSegment], offset: Vec2) -> Path {
    path.iter()
        .map(|seg| PathSegment {
            point: seg.point.add(offset),
            handle_in: seg.handle_in,
            handle_out: seg.handle_out,
        })
        .collect()
}

/// Scale points about `origin`; handles scale by the same factor.
pub fn scale_path(path: &[PathSegment], scale: f64, origin: Vec2) -> Path {
    path.iter()
        .map(|seg| PathSegment {
            point: origin.add(seg.point.sub(origin).scale(scale)),
            handle_in: seg.handle_in.scale(scale),
            handle_out: seg.handle_out.scale(scale),
        })
        .collect()
}

/// Radial collapse used by the explode effect: every point scales toward the
/// bounds center, with points closer to the center pulled harder (the
/// "gravity" term). Handles are carried through absolute space so curve shape
/// follows the displaced points.
pub fn warp_path(path: &[PathSegment], bounds: Bounds, warp: f64, gravity: f64) -> Path {
    let origin = bounds.center();
    let max_distance = Vec2::new(bounds.width / 2.0, bounds.height / 2.0).length();

    let scale_about = |v: Vec2, scale: f64| origin.add(v.sub(origin).scale(scale));

    path.iter()
        .map(|seg| {
            let distance = seg.point.sub(origin).length();
            let falloff = if max_distance == 0.0 {
                0.0
            } else {
                distance / max_distance
            };
            let gravity_ratio = gravity * Ease::OutQuad.apply(1.0 - falloff);
            let scale = (1.0 - warp * (1.0 + gravity * gravity_ratio)).max(0.0);
            let point = scale_about(seg.point, scale);
            PathSegment {
                point,
                handle_in: scale_about(seg.handle_in.add(seg.point), scale).sub(point),
                handle_out: scale_about(seg.handle_out.add(seg.point), scale).sub(point),
            }
        })
        .collect()
}

/// Component-wise blend of two paths with equal segment counts. Extra
/// segments in `b` are ignored; missing ones hold `a`'s value (shape
/// topology never changes across a lifetime, so counts match in practice).
pub fn lerp_path(a: &[PathSegment], b: &[PathSegment], t: f64) -> Path {
    a.iter()
        .enumerate()
        .map(|(index, seg_a)| match b.get(index) {
            Some(seg_b) => PathSegment {
                point: seg_a.point.lerp(seg_b.point, t),
                handle_in: seg_a.handle_in.lerp(seg_b.handle_in, t),
                handle_out: seg_a.handle_out.lerp(seg_b.handle_out, t),
            },
            None => *seg_a,
        })
        .collect()
}

/// Round all coordinates to at most `decimals` decimal places for output.
pub fn round_path(path: &[PathSegment], decimals: u32) -> Path {
    let factor = 10f64.powi(decimals as i32);
    let round = |v: Vec2| Vec2::new((v.x * factor).round() / factor, (v.y * factor).round() / factor);
    path.iter()
        .map(|seg| PathSegment {
            point: round(seg.point),
            handle_in: round(seg.handle_in),
            handle_out: round(seg.handle_out),
        })
        .collect()
}
