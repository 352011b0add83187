use keytime::{Color, Compiler, Document};

fn compile_fixture() -> keytime::Animation {
    let document: Document = serde_json::from_str(include_str!("data/worksheet.json")).unwrap();
    Compiler::default().compile(&document, &[]).unwrap()
}

#[test]
fn fixture_produces_all_scene_shapes_in_order() {
    let animation = compile_fixture();
    let ids: Vec<&str> = animation.shapes.iter().map(|s| s.id.as_str()).collect();
    assert_eq!(ids, vec!["title:badge:disc", "title:rule", "outro:dot"]);
}

#[test]
fn stage_origin_and_rounding_shape_the_output_coordinates() {
    let animation = compile_fixture();
    let disc = &animation.shapes[0];
    // Stage origin (-1.5, 2) shifts the authored (40.25, 30.125) and the
    // compiler rounds to two decimal places.
    assert_eq!(disc.path[0].point.x, 41.75);
    assert_eq!(disc.path[0].point.y, 28.13);
}

#[test]
fn open_paths_and_stroke_pairs_survive_parsing() {
    let animation = compile_fixture();
    let rule = &animation.shapes[1];
    assert!(rule.broken);
    // Base colors are forced transparent after timeline construction; the
    // authored stroke survives in the initial keyframe.
    assert_eq!(rule.fill_color, Some(Color::TRANSPARENT));
    let initial = &rule.keyframes[0].properties;
    assert!(initial.fill_color.is_none());
    assert_eq!(initial.stroke_width, Some(2.0));
    assert!(initial.stroke_color.is_some());
}

#[test]
fn declared_keyframes_merge_between_the_scene_boundaries() {
    let animation = compile_fixture();
    let rule = &animation.shapes[1];
    let offsets: Vec<i64> = rule.keyframes.iter().map(|k| k.offset).collect();
    assert_eq!(offsets, vec![0, 6, 12]);
}

#[test]
fn entry_and_exit_fades_replace_the_disc_timeline() {
    let animation = compile_fixture();
    let disc = &animation.shapes[0];
    let offsets: Vec<i64> = disc.keyframes.iter().map(|k| k.offset).collect();
    // fadein fills frames 0..4; fadeout (declared -4, normalized to 8)
    // fills 8..12 and ends on the scene's last frame, dropping the
    // terminal keyframe with it.
    assert_eq!(offsets, vec![0, 1, 2, 3, 8, 9, 10, 11]);
    let alphas: Vec<f64> = disc
        .keyframes
        .iter()
        .take(4)
        .map(|k| k.properties.fill_color.unwrap().a)
        .collect();
    assert_eq!(alphas, vec![0.0, 0.25, 0.5, 0.75]);
}

#[test]
fn suffixless_scene_runs_for_one_frame_after_its_predecessor() {
    let animation = compile_fixture();
    let dot = &animation.shapes[2];
    let offsets: Vec<i64> = dot.keyframes.iter().map(|k| k.offset).collect();
    // "outro" has no duration suffix: one frame, starting when the
    // 12-frame title scene ends.
    assert_eq!(offsets, vec![12, 13]);
}
