//! Scene-to-document compositing: scenes play back to back, so each scene's
//! keyframe offsets shift by the summed durations of everything before it.

use crate::{
    geom::round_path,
    model::{Scene, Shape},
};

/// Coordinate precision of emitted paths. Sub-hundredth detail is below
/// playback resolution and only bloats the serialized output.
pub const MAX_DECIMAL_PLACES: u32 = 2;

/// Flatten resolved scenes into one document-space shape list.
pub fn composite_scenes(scenes: Vec<Scene>) -> Vec<Shape> {
    let mut start = 0;
    let mut shapes = Vec::new();
    for scene in scenes {
        for mut shape in scene.shapes {
            for keyframe in &mut shape.keyframes {
                keyframe.offset += start;
            }
            shapes.push(shape);
        }
        start += scene.duration;
    }
    shapes
}

/// Round every base and keyframe path in place.
pub fn round_shapes(shapes: &mut [Shape]) {
    for shape in shapes {
        shape.path = round_path(&shape.path, MAX_DECIMAL_PLACES);
        for keyframe in &mut shape.keyframes {
            if let Some(path) = &keyframe.properties.path {
                keyframe.properties.path = Some(round_path(path, MAX_DECIMAL_PLACES));
            }
        }
    }
}
