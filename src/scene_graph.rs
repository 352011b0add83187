use crate::{
    color::Color,
    geom::{Bounds, Path},
};

/// Typed scene graph handed over by the markup-parsing collaborator.
///
/// The compiler never sees raw vector markup; it consumes this tree and
/// classifies nodes purely by name (see [`crate::names`]).
#[derive(Clone, Debug, serde::Deserialize)]
pub struct Document {
    pub children: Vec<Node>,
}

#[derive(Clone, Debug, serde::Deserialize)]
pub enum Node {
    Group(GroupNode),
    Shape(ShapeNode),
}

impl Node {
    pub fn name(&self) -> &str {
        match self {
            Self::Group(group) => &group.name,
            Self::Shape(shape) => &shape.name,
        }
    }
}

#[derive(Clone, Debug, serde::Deserialize)]
pub struct GroupNode {
    pub name: String,
    pub bounds: Bounds,
    pub children: Vec<Node>,
}

#[derive(Clone, Debug, serde::Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ShapeNode {
    pub name: String,
    #[serde(default)]
    pub fill_color: Option<Color>,
    #[serde(default)]
    pub stroke_color: Option<Color>,
    #[serde(default)]
    pub stroke_width: Option<f64>,
    pub closed: bool,
    #[serde(default)]
    pub bounds: Bounds,
    pub segments: Path,
}
