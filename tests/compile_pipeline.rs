use keytime::{
    Bounds, Color, Compiler, Document, GroupNode, KeytimeError, Node, PathSegment, ShapeNode,
    TextEffectDecl, TextEffectOptions, TextFrameDecl, Vec2,
};

fn init_tracing() {
    let _ = tracing_subscriber::fmt().with_test_writer().try_init();
}

fn leaf(name: &str, x: f64, y: f64) -> Node {
    Node::Shape(ShapeNode {
        name: name.to_owned(),
        fill_color: Some(Color::rgb(255, 0, 0)),
        stroke_color: None,
        stroke_width: None,
        closed: true,
        bounds: Bounds::default(),
        segments: vec![PathSegment {
            point: Vec2::new(x, y),
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

fn document(scenes: Vec<Node>) -> Document {
    Document {
        children: vec![group("stage:0,0", scenes)],
    }
}

#[test]
fn every_shape_gets_initial_and_terminal_keyframes() {
    init_tracing();
    let doc = document(vec![group("intro-10", vec![leaf("dot", 5.0, 5.0)])]);
    let animation = Compiler::default().compile(&doc, &[]).unwrap();

    assert_eq!(animation.shapes.len(), 1);
    let shape = &animation.shapes[0];
    assert_eq!(shape.id, "intro:dot");
    // Base colors are forced transparent; visibility lives in keyframes.
    assert_eq!(shape.fill_color, Some(Color::TRANSPARENT));
    let first = shape.keyframes.first().unwrap();
    let last = shape.keyframes.last().unwrap();
    assert_eq!(first.offset, 0);
    assert_eq!(first.properties.fill_color, Some(Color::rgb(255, 0, 0)));
    assert_eq!(last.offset, 10);
    assert_eq!(last.properties.fill_color, Some(Color::TRANSPARENT));
    assert_eq!(last.properties.stroke_color, Some(Color::TRANSPARENT));
}

#[test]
fn scenes_play_back_to_back_on_the_global_clock() {
    let doc = document(vec![
        group("one-5", vec![leaf("a", 0.0, 0.0)]),
        group("two-8", vec![leaf("b", 0.0, 0.0), leaf("b:2", 1.0, 1.0)]),
    ]);
    let animation = Compiler::default().compile(&doc, &[]).unwrap();

    assert_eq!(animation.shapes.len(), 2);
    let first = &animation.shapes[0];
    assert_eq!(first.keyframes.last().unwrap().offset, 5);
    let second = &animation.shapes[1];
    let offsets: Vec<i64> = second.keyframes.iter().map(|k| k.offset).collect();
    // Scene two starts at 5, so its local keyframes 0, 2 and 8 shift to
    // 5, 7 and 13.
    assert_eq!(offsets, vec![5, 7, 13]);
}

#[test]
fn negative_keyframe_offsets_count_back_from_the_scene_end() {
    let doc = document(vec![group(
        "intro-10",
        vec![leaf("dot", 0.0, 0.0), leaf("dot:-1", 3.0, 3.0)],
    )]);
    let animation = Compiler::default().compile(&doc, &[]).unwrap();

    let offsets: Vec<i64> = animation.shapes[0].keyframes.iter().map(|k| k.offset).collect();
    assert_eq!(offsets, vec![0, 9, 10]);
}

#[test]
fn fadein_group_ramps_fill_alpha_per_frame() {
    let doc = document(vec![group(
        "intro-10",
        vec![group("g[fadein:4]", vec![leaf("dot", 5.0, 5.0)])],
    )]);
    let animation = Compiler::default().compile(&doc, &[]).unwrap();

    let shape = &animation.shapes[0];
    assert_eq!(shape.id, "intro:g:dot");
    let alphas: Vec<f64> = shape
        .keyframes
        .iter()
        .map(|k| k.properties.fill_color.unwrap().a)
        .collect();
    assert_eq!(alphas, vec![0.0, 0.25, 0.5, 0.75, 0.0]);
    let offsets: Vec<i64> = shape.keyframes.iter().map(|k| k.offset).collect();
    assert_eq!(offsets, vec![0, 1, 2, 3, 10]);
}

#[test]
fn unknown_keyframe_target_fails_the_compile() {
    let doc = document(vec![group(
        "intro-10",
        vec![leaf("dot", 0.0, 0.0), leaf("ghost:3", 0.0, 0.0)],
    )]);
    let err = Compiler::default().compile(&doc, &[]).unwrap_err();
    assert!(matches!(err, KeytimeError::UnknownTarget(ref id) if id == "intro:ghost"));
}

#[test]
fn unknown_effect_name_fails_the_compile() {
    let doc = document(vec![group(
        "intro-10",
        vec![group("g[wobble:4]", vec![leaf("dot", 0.0, 0.0)])],
    )]);
    let err = Compiler::default().compile(&doc, &[]).unwrap_err();
    assert!(matches!(err, KeytimeError::UnknownEffect(ref name) if name == "wobble"));
}

#[test]
fn output_paths_carry_at_most_two_decimal_places() {
    let doc = document(vec![group(
        "intro-10",
        vec![group("g[jitter:8]", vec![leaf("dot", 1.23456, -7.98765)])],
    )]);
    let animation = Compiler::default().compile(&doc, &[]).unwrap();

    let assert_rounded = |v: f64| {
        let scaled = v * 100.0;
        assert!(
            (scaled - scaled.round()).abs() < 1e-9,
            "coordinate {v} has more than two decimal places"
        );
    };
    for shape in &animation.shapes {
        for segment in &shape.path {
            assert_rounded(segment.point.x);
            assert_rounded(segment.point.y);
        }
        for keyframe in &shape.keyframes {
            if let Some(path) = &keyframe.properties.path {
                for segment in path {
                    assert_rounded(segment.point.x);
                    assert_rounded(segment.handle_in.x);
                    assert_rounded(segment.handle_out.y);
                }
            }
        }
    }
}

#[test]
fn same_seed_compiles_are_identical() {
    let doc = document(vec![group(
        "intro-10",
        vec![group("g[jitter:8]", vec![leaf("dot", 4.0, 4.0)])],
    )]);
    let text = vec![TextFrameDecl {
        time: 0,
        duration: 6,
        text: "shake".to_owned(),
        style: Default::default(),
        position: Some(Vec2::new(10.0, 10.0)),
        effects: vec![TextEffectDecl {
            name: "jitter".to_owned(),
            offset: 0,
            duration: None,
            options: TextEffectOptions {
                amount: 5.0,
                ..TextEffectOptions::default()
            },
        }],
    }];

    let a = Compiler::new(99).compile(&doc, &text).unwrap();
    let b = Compiler::new(99).compile(&doc, &text).unwrap();
    assert_eq!(
        serde_json::to_string(&a).unwrap(),
        serde_json::to_string(&b).unwrap()
    );

    let c = Compiler::new(100).compile(&doc, &text).unwrap();
    assert_ne!(
        serde_json::to_string(&a).unwrap(),
        serde_json::to_string(&c).unwrap()
    );
}

#[test]
fn text_track_compiles_alongside_shapes() {
    let doc = document(vec![group("intro-5", vec![leaf("dot", 0.0, 0.0)])]);
    let text = vec![TextFrameDecl {
        time: 2,
        duration: 3,
        text: "hi".to_owned(),
        style: Default::default(),
        position: None,
        effects: vec![TextEffectDecl {
            name: "typewriter".to_owned(),
            offset: 0,
            duration: None,
            options: TextEffectOptions::default(),
        }],
    }];
    let animation = Compiler::default().compile(&doc, &text).unwrap();

    let texts: Vec<&str> = animation.text.iter().map(|f| f.text.as_str()).collect();
    assert_eq!(texts, vec!["", "h", "hi"]);
    let times: Vec<i64> = animation.text.iter().map(|f| f.time).collect();
    assert_eq!(times, vec![2, 3, 4]);
}

#[test]
fn serialized_animation_uses_the_wire_contract_names() {
    let doc = document(vec![group("intro-3", vec![leaf("dot", 1.0, 2.0)])]);
    let animation = Compiler::default().compile(&doc, &[]).unwrap();
    let json = serde_json::to_value(&animation).unwrap();

    let shape = &json["shapes"][0];
    assert_eq!(shape["id"], "intro:dot");
    assert_eq!(shape["fillColor"], "rgba(0,0,0,0)");
    assert!(shape["strokeColor"].is_null());
    assert!(shape["strokeWidth"].is_null());
    assert_eq!(shape["broken"], false);
    assert!(shape["path"][0]["handleIn"]["x"].is_number());
    let keyframe = &shape["keyframes"][0];
    assert_eq!(keyframe["offset"], 0);
    assert_eq!(keyframe["properties"]["fillColor"], "rgb(255,0,0)");
    assert!(json["text"].is_array());
}

#[test]
fn nested_effect_groups_apply_innermost_first() {
    // The inner group hides the shape entirely before its window; if the
    // outer fadein ran first instead, frame 0 would carry the ramp alpha.
    let inner = group("in[animatein:2:6]", vec![leaf("dot", 5.0, 5.0)]);
    let doc = document(vec![group(
        "intro-10",
        vec![group("out[fadein:10]", vec![inner])],
    )]);
    let animation = Compiler::default().compile(&doc, &[]).unwrap();

    let shape = &animation.shapes[0];
    assert_eq!(shape.id, "intro:out:in:dot");
    // animatein with offset 2 leaves a hidden guard frame at 1; fadein then
    // resamples every frame of the whole scene from that state.
    let first = shape.keyframes.first().unwrap();
    assert_eq!(first.offset, 0);
    assert_eq!(first.properties.fill_color.unwrap().a, 0.0);
}
