use std::collections::BTreeMap;

use crate::{
    color::Color,
    geom::{Path, Vec2},
};

/// Final animation IR: one global shape timeline and one global text
/// timeline, both time-shifted into document space. This is the sole
/// contract surface consumed by serialization and playback; the serialized
/// field names must not change.
#[derive(Clone, Debug, serde::Serialize)]
pub struct Animation {
    pub shapes: Vec<Shape>,
    pub text: Vec<TextFrame>,
}

#[derive(Clone, Debug, serde::Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Shape {
    /// Hierarchical id, colon-joined: `<scene>:<group>:…:<leaf>`. Unique
    /// only within its source scene.
    pub id: String,
    pub fill_color: Option<Color>,
    pub stroke_color: Option<Color>,
    pub stroke_width: Option<f64>,
    /// Open-path flag.
    pub broken: bool,
    /// Base geometry; every keyframe path has the same segment count.
    pub path: Path,
    /// Strictly ascending by offset once finalized.
    pub keyframes: Vec<ShapeKeyframe>,
}

#[derive(Clone, Debug, serde::Serialize)]
pub struct ShapeKeyframe {
    pub offset: i64,
    pub properties: KeyframeProps,
}

/// Partial property snapshot. An omitted property carries forward the
/// nearest preceding keyframe's value at render time.
#[derive(Clone, Debug, Default, serde::Serialize)]
#[serde(rename_all = "camelCase")]
pub struct KeyframeProps {
    pub fill_color: Option<Color>,
    pub stroke_color: Option<Color>,
    pub stroke_width: Option<f64>,
    pub path: Option<Path>,
}

/// One resolved scene, before compositing into the global timeline.
#[derive(Clone, Debug)]
pub struct Scene {
    pub id: String,
    pub duration: i64,
    pub shapes: Vec<Shape>,
}

#[derive(Clone, Debug, serde::Serialize)]
pub struct TextFrame {
    pub time: i64,
    pub text: String,
    pub style: BTreeMap<String, String>,
    pub position: Vec2,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn shape_serializes_contract_field_names() {
        let shape = Shape {
            id: "intro:logo".into(),
            fill_color: Some(Color::TRANSPARENT),
            stroke_color: None,
            stroke_width: None,
            broken: false,
            path: vec![],
            keyframes: vec![ShapeKeyframe {
                offset: 0,
                properties: KeyframeProps::default(),
            }],
        };
        let json = serde_json::to_value(&shape).unwrap();
        assert_eq!(json["fillColor"], "rgba(0,0,0,0)");
        assert!(json["strokeColor"].is_null());
        assert!(json["strokeWidth"].is_null());
        assert_eq!(json["keyframes"][0]["offset"], 0);
        assert!(json["keyframes"][0]["properties"]["path"].is_null());
    }

    #[test]
    fn text_frame_serializes_contract_field_names() {
        let frame = TextFrame {
            time: 3,
            text: "hi".into(),
            style: BTreeMap::from([("color".to_owned(), "rgb(0,0,0)".to_owned())]),
            position: Vec2::new(-266.0, 64.0),
        };
        let json = serde_json::to_value(&frame).unwrap();
        assert_eq!(json["time"], 3);
        assert_eq!(json["style"]["color"], "rgb(0,0,0)");
        assert_eq!(json["position"]["x"], -266.0);
    }
}
