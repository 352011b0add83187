use crate::{
    geom::{translate_path, Bounds, Vec2},
    model::{KeyframeProps, Shape},
    names,
    scene_graph::{Document, GroupNode, Node, ShapeNode},
};

/// Everything the walker extracts from one scene subtree, still untimed:
/// base shapes, raw keyframe definitions and effect-group definitions.
#[derive(Clone, Debug)]
pub struct SceneSource {
    pub id: String,
    pub duration: i64,
    pub shapes: Vec<Shape>,
    /// Sorted ascending by declared (pre-normalization) offset.
    pub keyframes: Vec<KeyframeSource>,
    /// Reverse discovery order: the deepest/last-discovered group comes
    /// first, which is the order the effect engine applies groups in.
    pub effect_groups: Vec<EffectGroupSource>,
}

#[derive(Clone, Debug)]
pub struct KeyframeSource {
    pub target: String,
    pub offset: i64,
    pub properties: KeyframeProps,
}

#[derive(Clone, Debug)]
pub struct EffectGroupSource {
    pub targets: Vec<String>,
    pub effects: Vec<EffectSource>,
}

#[derive(Clone, Debug)]
pub struct EffectSource {
    pub name: String,
    pub offset: i64,
    pub duration: Option<i64>,
    /// Group bounding box in stage space; transform origin for geometric
    /// effects.
    pub bounds: Bounds,
}

/// Walk the document and partition every stage's scenes into shape, keyframe
/// and effect-group sources.
///
/// Stage nodes establish the viewport offset applied to all descendant
/// coordinates; everything below runs on an explicit work stack so arbitrary
/// nesting depth never grows the call stack.
pub fn walk_document(document: &Document) -> Vec<SceneSource> {
    let mut scenes = Vec::new();
    for node in &document.children {
        let Node::Group(stage) = node else { continue };
        let Some(origin) = names::parse_stage(&stage.name) else {
            continue;
        };
        let viewport_offset = Vec2::new(-origin.x, -origin.y);
        for child in &stage.children {
            if let Node::Group(scene) = child {
                scenes.push(walk_scene(scene, viewport_offset));
            }
        }
    }
    scenes
}

fn walk_scene(scene: &GroupNode, viewport_offset: Vec2) -> SceneSource {
    let (id, duration) = names::parse_scene(&scene.name);
    let prefix = format!("{id}:");

    let mut shapes = Vec::new();
    let mut keyframes = Vec::new();
    let mut effect_groups = Vec::new();

    // Depth-first pre-order, same order a recursive descent would visit.
    let mut stack: Vec<(&Node, String)> = Vec::new();
    for child in scene.children.iter().rev() {
        stack.push((child, prefix.clone()));
    }

    while let Some((node, prefix)) = stack.pop() {
        match node {
            Node::Group(group) => {
                let base = match names::parse_effect_group(&group.name) {
                    Some((base, tags)) => {
                        effect_groups.push(parse_effect_group(
                            group,
                            &tags,
                            &prefix,
                            viewport_offset,
                        ));
                        base.to_owned()
                    }
                    None => group.name.clone(),
                };
                let child_prefix = format!("{prefix}{base}:");
                for child in group.children.iter().rev() {
                    stack.push((child, child_prefix.clone()));
                }
            }
            Node::Shape(shape) => match names::parse_keyframe(&shape.name) {
                Some((target, offset)) => {
                    let base = parse_shape(shape, &prefix, viewport_offset);
                    keyframes.push(KeyframeSource {
                        target: format!("{prefix}{target}"),
                        offset,
                        properties: KeyframeProps {
                            fill_color: base.fill_color,
                            stroke_color: base.stroke_color,
                            stroke_width: base.stroke_width,
                            path: Some(base.path),
                        },
                    });
                }
                None => shapes.push(parse_shape(shape, &prefix, viewport_offset)),
            },
        }
    }

    keyframes.sort_by_key(|keyframe| keyframe.offset);
    effect_groups.reverse();

    tracing::debug!(
        scene = id,
        duration,
        shapes = shapes.len(),
        keyframes = keyframes.len(),
        effect_groups = effect_groups.len(),
        "walked scene"
    );

    SceneSource {
        id: id.to_owned(),
        duration,
        shapes,
        keyframes,
        effect_groups,
    }
}

fn parse_shape(shape: &ShapeNode, prefix: &str, viewport_offset: Vec2) -> Shape {
    // Stroke properties only survive together: a stroke width without a
    // color (or the reverse) renders as no stroke at all.
    let has_stroke = shape.stroke_width.unwrap_or(0.0) != 0.0 && shape.stroke_color.is_some();
    Shape {
        id: format!("{prefix}{}", shape.name),
        fill_color: shape.fill_color,
        stroke_color: if has_stroke { shape.stroke_color } else { None },
        stroke_width: if has_stroke { shape.stroke_width } else { None },
        broken: !shape.closed,
        path: translate_path(&shape.segments, viewport_offset),
        keyframes: Vec::new(),
    }
}

fn parse_effect_group(
    group: &GroupNode,
    tags: &[names::EffectTag],
    prefix: &str,
    viewport_offset: Vec2,
) -> EffectGroupSource {
    let bounds = group.bounds.shift(viewport_offset);
    EffectGroupSource {
        targets: collect_target_ids(group, prefix),
        effects: tags
            .iter()
            .map(|tag| EffectSource {
                name: tag.name.clone(),
                offset: tag.offset,
                duration: tag.duration,
                bounds,
            })
            .collect(),
    }
}

/// Flatten the ids of every non-keyframe leaf under `group`, fully prefixed.
fn collect_target_ids(group: &GroupNode, parent_prefix: &str) -> Vec<String> {
    let mut targets = Vec::new();
    let base = names::parse_effect_group(&group.name)
        .map(|(base, _)| base.to_owned())
        .unwrap_or_else(|| group.name.clone());

    let mut stack: Vec<(&Node, String)> = vec![];
    let group_prefix = format!("{parent_prefix}{base}:");
    for child in group.children.iter().rev() {
        stack.push((child, group_prefix.clone()));
    }

    while let Some((node, prefix)) = stack.pop() {
        match node {
            Node::Group(inner) => {
                let base = names::parse_effect_group(&inner.name)
                    .map(|(base, _)| base.to_owned())
                    .unwrap_or_else(|| inner.name.clone());
                let child_prefix = format!("{prefix}{base}:");
                for child in inner.children.iter().rev() {
                    stack.push((child, child_prefix.clone()));
                }
            }
            Node::Shape(shape) => {
                if names::parse_keyframe(&shape.name).is_none() {
                    targets.push(format!("{prefix}{}", shape.name));
                }
            }
        }
    }

    targets
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{color::Color, geom::PathSegment};

    fn leaf(name: &str) -> Node {
        Node::Shape(ShapeNode {
            name: name.to_owned(),
            fill_color: Some(Color::rgb(255, 0, 0)),
            stroke_color: Some(Color::rgb(0, 0, 255)),
            stroke_width: Some(2.0),
            closed: true,
            bounds: Bounds::default(),
            segments: vec![PathSegment {
                point: Vec2::new(10.0, 10.0),
                handle_in: Vec2::ZERO,
                handle_out: Vec2::ZERO,
            }],
        })
    }

    fn group(name: &str, children: Vec<Node>) -> Node {
        Node::Group(GroupNode {
            name: name.to_owned(),
            bounds: Bounds {
                x: 0.0,
                y: 0.0,
                width: 20.0,
                height: 20.0,
            },
            children,
        })
    }

    fn stage(children: Vec<Node>) -> Document {
        Document {
            children: vec![group("stage:2,3", children)],
        }
    }

    #[test]
    fn stage_origin_translates_descendant_points() {
        let doc = stage(vec![group("intro-10", vec![leaf("dot")])]);
        let scenes = walk_document(&doc);
        assert_eq!(scenes.len(), 1);
        assert_eq!(scenes[0].id, "intro");
        assert_eq!(scenes[0].duration, 10);
        let shape = &scenes[0].shapes[0];
        assert_eq!(shape.id, "intro:dot");
        assert_eq!(shape.path[0].point, Vec2::new(8.0, 7.0));
    }

    #[test]
    fn keyframe_leaves_become_keyframe_sources() {
        let doc = stage(vec![group(
            "intro-10",
            vec![leaf("dot"), leaf("dot:4"), leaf("dot:-1")],
        )]);
        let scenes = walk_document(&doc);
        let scene = &scenes[0];
        assert_eq!(scene.shapes.len(), 1);
        assert_eq!(scene.keyframes.len(), 2);
        // Sorted by raw offset: -1 before 4.
        assert_eq!(scene.keyframes[0].offset, -1);
        assert_eq!(scene.keyframes[0].target, "intro:dot");
        assert!(scene.keyframes[1].properties.path.is_some());
    }

    #[test]
    fn nested_groups_join_ids_with_colons() {
        let doc = stage(vec![group(
            "intro-10",
            vec![group("hero", vec![leaf("dot")])],
        )]);
        let scenes = walk_document(&doc);
        assert_eq!(scenes[0].shapes[0].id, "intro:hero:dot");
    }

    #[test]
    fn effect_groups_are_discovered_then_reversed() {
        let inner = group("pulse_grp[pulse:5]", vec![leaf("dot")]);
        let outer = group("fade_grp[fadein:10]", vec![inner]);
        let doc = stage(vec![group("intro-10", vec![outer])]);
        let scenes = walk_document(&doc);
        let groups = &scenes[0].effect_groups;
        assert_eq!(groups.len(), 2);
        // Discovery order was outer, inner; reversed puts inner first.
        assert_eq!(groups[0].effects[0].name, "pulse");
        assert_eq!(groups[1].effects[0].name, "fadein");
        assert_eq!(groups[0].targets, vec!["intro:fade_grp:pulse_grp:dot"]);
        assert_eq!(groups[1].targets, vec!["intro:fade_grp:pulse_grp:dot"]);
        assert_eq!(
            scenes[0].shapes[0].id,
            "intro:fade_grp:pulse_grp:dot"
        );
    }

    #[test]
    fn effect_group_bounds_follow_the_viewport_offset() {
        let doc = stage(vec![group(
            "intro-10",
            vec![group("g[jitter:3]", vec![leaf("dot")])],
        )]);
        let scenes = walk_document(&doc);
        let effect = &scenes[0].effect_groups[0].effects[0];
        assert_eq!(effect.bounds.x, -2.0);
        assert_eq!(effect.bounds.y, -3.0);
        assert_eq!(effect.bounds.width, 20.0);
    }

    #[test]
    fn unnamed_scene_suffix_defaults_to_one_frame() {
        let doc = stage(vec![group("splash", vec![leaf("dot")])]);
        let scenes = walk_document(&doc);
        assert_eq!(scenes[0].id, "splash");
        assert_eq!(scenes[0].duration, 1);
    }
}
