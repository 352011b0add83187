#![forbid(unsafe_code)]

pub mod color;
pub mod compile;
pub mod compositor;
pub mod ease;
pub mod effects;
pub mod error;
pub mod geom;
pub mod model;
pub mod names;
pub mod rng;
pub mod scene_graph;
pub mod text_fx;
pub mod timeline;
pub mod walker;

pub use color::Color;
pub use compile::Compiler;
pub use error::{KeytimeError, KeytimeResult};
pub use geom::{Bounds, Path, PathSegment, Vec2};
pub use model::{Animation, KeyframeProps, Shape, ShapeKeyframe, TextFrame};
pub use scene_graph::{Document, GroupNode, Node, ShapeNode};
pub use text_fx::{TextEffectDecl, TextEffectOptions, TextFrameDecl};
