use crate::{
    color::Color,
    ease::Ease,
    error::{KeytimeError, KeytimeResult},
    geom::lerp_path,
    model::{KeyframeProps, Scene, Shape, ShapeKeyframe},
    walker::SceneSource,
};

/// Last keyframe at or before `offset` in list order, falling back to the
/// first keyframe when the query precedes the whole list.
pub fn keyframe_at_or_before(keyframes: &[ShapeKeyframe], offset: i64) -> Option<&ShapeKeyframe> {
    keyframes
        .iter()
        .rev()
        .find(|keyframe| keyframe.offset <= offset)
        .or_else(|| keyframes.first())
}

/// First keyframe strictly after `offset` in list order.
pub fn keyframe_after(keyframes: &[ShapeKeyframe], offset: i64) -> Option<&ShapeKeyframe> {
    keyframes.iter().find(|keyframe| keyframe.offset > offset)
}

/// The interpolation-or-extrapolation lookup every effect samples through.
///
/// Exact hits return the stored keyframe unchanged. Past the last keyframe
/// the latest value is cloned forward. Between two keyframes the path is
/// blended at an `InOutExpo`-eased ratio; colors and stroke width carry
/// forward from the earlier keyframe.
pub fn value_at_offset(keyframes: &[ShapeKeyframe], offset: i64) -> ShapeKeyframe {
    let Some(active) = keyframe_at_or_before(keyframes, offset) else {
        return ShapeKeyframe {
            offset,
            properties: KeyframeProps::default(),
        };
    };
    if active.offset == offset {
        return active.clone();
    }
    match keyframe_after(keyframes, offset) {
        None => ShapeKeyframe {
            offset,
            properties: active.properties.clone(),
        },
        Some(next) => interpolate(active, next, offset),
    }
}

fn interpolate(a: &ShapeKeyframe, b: &ShapeKeyframe, offset: i64) -> ShapeKeyframe {
    if a.offset == offset {
        return a.clone();
    }
    if b.offset == offset {
        return b.clone();
    }
    let ratio = (offset - a.offset) as f64 / (b.offset - a.offset) as f64;
    let eased = Ease::InOutExpo.apply(ratio);
    let path = match (&a.properties.path, &b.properties.path) {
        (Some(path_a), Some(path_b)) => Some(lerp_path(path_a, path_b, eased)),
        (path_a, _) => path_a.clone(),
    };
    ShapeKeyframe {
        offset,
        properties: KeyframeProps {
            path,
            ..a.properties.clone()
        },
    }
}

/// Ascending-offset insertion. An exact-offset collision drops the existing
/// keyframe in favor of the inserted one (last write wins); this is a
/// deliberate, tested invariant of the compiler.
pub fn insert_keyframe(keyframes: Vec<ShapeKeyframe>, keyframe: ShapeKeyframe) -> Vec<ShapeKeyframe> {
    let offset = keyframe.offset;
    let mut out = Vec::with_capacity(keyframes.len() + 1);
    let mut after = Vec::new();
    for existing in keyframes {
        if existing.offset < offset {
            out.push(existing);
        } else if existing.offset > offset {
            after.push(existing);
        }
    }
    out.push(keyframe);
    out.extend(after);
    out
}

/// Keyframe carrying the shape's full base state at offset 0.
pub fn initial_keyframe(shape: &Shape) -> ShapeKeyframe {
    ShapeKeyframe {
        offset: 0,
        properties: KeyframeProps {
            fill_color: shape.fill_color,
            stroke_color: shape.stroke_color,
            stroke_width: shape.stroke_width,
            path: Some(shape.path.clone()),
        },
    }
}

/// Merge a scene's keyframe definitions into its shapes: normalize negative
/// offsets against the scene duration, sort, synthesize the offset-0 initial
/// keyframe where absent and append the forced-transparent terminal keyframe
/// at scene end. Effect groups have not been applied yet.
pub fn build_scene(source: &SceneSource) -> KeytimeResult<Scene> {
    let duration = source.duration;

    let mut shapes: Vec<Shape> = source.shapes.clone();
    for keyframe in &source.keyframes {
        if !shapes.iter().any(|shape| shape.id == keyframe.target) {
            return Err(KeytimeError::unknown_target(&keyframe.target));
        }
    }

    for shape in &mut shapes {
        let mut declared: Vec<ShapeKeyframe> = source
            .keyframes
            .iter()
            .filter(|keyframe| keyframe.target == shape.id)
            .map(|keyframe| ShapeKeyframe {
                offset: normalize_offset(keyframe.offset, duration),
                properties: keyframe.properties.clone(),
            })
            .collect();
        declared.sort_by_key(|keyframe| keyframe.offset);

        let has_initial = declared.first().is_some_and(|keyframe| keyframe.offset == 0);
        let mut keyframes = if has_initial {
            declared
        } else {
            let mut out = vec![initial_keyframe(shape)];
            out.extend(declared);
            out
        };

        let end = value_at_offset(&keyframes, duration);
        let terminal = ShapeKeyframe {
            offset: duration,
            properties: KeyframeProps {
                fill_color: Some(Color::TRANSPARENT),
                stroke_color: Some(Color::TRANSPARENT),
                ..end.properties
            },
        };
        keyframes = insert_keyframe(keyframes, terminal);

        shape.keyframes = keyframes;
        // Base visibility comes exclusively from keyframes from here on.
        shape.fill_color = Some(Color::TRANSPARENT);
        shape.stroke_color = Some(Color::TRANSPARENT);
    }

    Ok(Scene {
        id: source.id.clone(),
        duration,
        shapes,
    })
}

/// `offset < 0` counts back from the scene end.
pub fn normalize_offset(offset: i64, duration: i64) -> i64 {
    if offset < 0 { duration + offset } else { offset }
}
