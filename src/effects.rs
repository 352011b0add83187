//! Keyframe-level shape effects. Each effect rewrites a shape's finalized
//! keyframe list inside its window `[offset, offset + duration)`; frames
//! outside the window pass through untouched (entry effects drop earlier
//! frames, exit effects drop later ones).

use crate::{
    color::Color,
    ease::Ease,
    error::{KeytimeError, KeytimeResult},
    geom::{translate_path, scale_path, warp_path, Bounds, Vec2},
    model::{KeyframeProps, Scene, Shape, ShapeKeyframe},
    rng::JitterRng,
    timeline::{initial_keyframe, insert_keyframe, normalize_offset, value_at_offset},
    walker::EffectGroupSource,
};

/// Closed set of shape effect names. Anything else is a compile error.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ShapeEffectKind {
    AnimateIn,
    AnimateOut,
    FadeIn,
    FadeOut,
    Pulse,
    Pop,
    Jitter,
    Explode,
}

impl ShapeEffectKind {
    pub fn parse(name: &str) -> KeytimeResult<Self> {
        match name {
            "animatein" => Ok(Self::AnimateIn),
            "animateout" => Ok(Self::AnimateOut),
            "fadein" => Ok(Self::FadeIn),
            "fadeout" => Ok(Self::FadeOut),
            "pulse" => Ok(Self::Pulse),
            "pop" => Ok(Self::Pop),
            "jitter" => Ok(Self::Jitter),
            "explode" => Ok(Self::Explode),
            other => Err(KeytimeError::unknown_effect(other)),
        }
    }
}

/// One effect with its window resolved against the scene duration.
#[derive(Clone, Copy, Debug)]
struct ResolvedEffect {
    kind: ShapeEffectKind,
    offset: i64,
    duration: i64,
    bounds: Bounds,
}

impl ResolvedEffect {
    fn last_frame(self) -> i64 {
        self.offset + self.duration - 1
    }

    fn origin(self) -> Vec2 {
        self.bounds.center()
    }

    /// Normalized progress through the window at `offset`.
    fn progress(self, offset: i64) -> f64 {
        (offset - self.offset) as f64 / self.duration as f64
    }
}

/// Apply every effect group to its target shapes' keyframe lists. Groups
/// arrive innermost-first; within a group, effects run in declared order.
/// Shapes are processed in scene order, each folding the full chain of
/// groups that target it, so random draws always happen in shape order.
#[tracing::instrument(skip_all, fields(scene = %scene.id, groups = groups.len()))]
pub fn apply_scene_effects(
    scene: &mut Scene,
    groups: &[EffectGroupSource],
    rng: &mut JitterRng,
) -> KeytimeResult<()> {
    let duration = scene.duration;
    let resolved: Vec<(Vec<ResolvedEffect>, &[String])> = groups
        .iter()
        .map(|group| {
            let effects = group
                .effects
                .iter()
                .map(|effect| {
                    let offset = normalize_offset(effect.offset, duration);
                    Ok(ResolvedEffect {
                        kind: ShapeEffectKind::parse(&effect.name)?,
                        offset,
                        duration: (duration - offset).min(effect.duration.unwrap_or(duration - offset)),
                        bounds: effect.bounds,
                    })
                })
                .collect::<KeytimeResult<Vec<_>>>()?;
            Ok((effects, group.targets.as_slice()))
        })
        .collect::<KeytimeResult<_>>()?;

    for (_, targets) in &resolved {
        for target in *targets {
            if !scene.shapes.iter().any(|shape| &shape.id == target) {
                return Err(KeytimeError::unknown_target(target));
            }
        }
    }

    for shape in &mut scene.shapes {
        for (effects, targets) in &resolved {
            if targets.iter().any(|target| target == &shape.id) {
                apply_chain(shape, effects, duration, rng);
            }
        }
    }
    Ok(())
}

fn apply_chain(shape: &mut Shape, effects: &[ResolvedEffect], scene_duration: i64, rng: &mut JitterRng) {
    let mut keyframes = std::mem::take(&mut shape.keyframes);
    if keyframes.is_empty() {
        keyframes = vec![initial_keyframe(shape)];
    }
    for effect in effects {
        keyframes = match effect.kind {
            ShapeEffectKind::AnimateIn => animate_in(keyframes, *effect),
            ShapeEffectKind::AnimateOut => animate_out(keyframes, *effect, scene_duration),
            ShapeEffectKind::FadeIn => fade_in(keyframes, *effect),
            ShapeEffectKind::FadeOut => fade_out(keyframes, *effect, scene_duration),
            ShapeEffectKind::Pulse => pulse(keyframes, *effect),
            ShapeEffectKind::Pop => pop(keyframes, *effect),
            ShapeEffectKind::Jitter => jitter(keyframes, *effect, rng),
            ShapeEffectKind::Explode => explode(keyframes, *effect),
        };
    }
    shape.keyframes = keyframes;
}

fn keyframes_before(keyframes: &[ShapeKeyframe], offset: i64) -> Vec<ShapeKeyframe> {
    keyframes.iter().filter(|k| k.offset < offset).cloned().collect()
}

fn keyframes_after(keyframes: &[ShapeKeyframe], offset: i64) -> Vec<ShapeKeyframe> {
    keyframes.iter().filter(|k| k.offset > offset).cloned().collect()
}

fn keyframes_until(keyframes: &[ShapeKeyframe], offset: i64) -> Vec<ShapeKeyframe> {
    keyframes.iter().filter(|k| k.offset <= offset).cloned().collect()
}

fn keyframes_from(keyframes: &[ShapeKeyframe], offset: i64) -> Vec<ShapeKeyframe> {
    keyframes.iter().filter(|k| k.offset >= offset).cloned().collect()
}

fn with_opacity(props: &KeyframeProps, opacity: f64) -> KeyframeProps {
    KeyframeProps {
        fill_color: props.fill_color.map(|c| c.with_alpha(opacity)),
        stroke_color: props.stroke_color.map(|c| c.with_alpha(opacity)),
        ..props.clone()
    }
}

fn hidden(props: &KeyframeProps) -> KeyframeProps {
    KeyframeProps {
        fill_color: Some(Color::TRANSPARENT),
        stroke_color: Some(Color::TRANSPARENT),
        ..props.clone()
    }
}

/// Scale-and-fade entrance with an overshoot bounce near the end of the
/// window. The three shaped keyframes are inserted into the existing list so
/// interpolation produces the in-between frames.
fn animate_in(keyframes: Vec<ShapeKeyframe>, effect: ResolvedEffect) -> Vec<ShapeKeyframe> {
    const INITIAL_SCALE: f64 = 0.1;
    const INITIAL_OPACITY: f64 = 0.1;
    const BOUNCE_SCALE: f64 = 1.1;
    const BOUNCE_OPACITY: f64 = 0.5;
    const BOUNCE_DURATION: f64 = 0.25;

    let origin = effect.origin();
    let last = effect.last_frame();
    let bounce_offset = last - (BOUNCE_DURATION * effect.duration as f64).ceil() as i64;

    let start = value_at_offset(&keyframes, effect.offset);
    let start = ShapeKeyframe {
        offset: start.offset,
        properties: KeyframeProps {
            path: start.properties.path.as_ref().map(|p| scale_path(p, INITIAL_SCALE, origin)),
            ..with_opacity(&start.properties, INITIAL_OPACITY)
        },
    };
    let bounce = value_at_offset(&keyframes, bounce_offset);
    let bounce = ShapeKeyframe {
        offset: bounce.offset,
        properties: KeyframeProps {
            path: bounce.properties.path.as_ref().map(|p| scale_path(p, BOUNCE_SCALE, origin)),
            ..with_opacity(&bounce.properties, BOUNCE_OPACITY)
        },
    };
    let end = value_at_offset(&keyframes, last);

    let start_hidden = ShapeKeyframe {
        offset: effect.offset - 1,
        properties: hidden(&start.properties),
    };
    let tweened = insert_keyframe(insert_keyframe(insert_keyframe(keyframes, start), bounce), end);
    if effect.offset == 0 {
        return tweened;
    }
    // Everything before the window is replaced by a single hidden guard
    // frame so the shape pops into existence exactly at the window start.
    let mut out = vec![start_hidden];
    out.extend(keyframes_from(&tweened, effect.offset));
    out
}

/// Scale-and-fade exit: shrink toward the group center while dimming, then
/// hide one frame past the window unless the window already ends the scene.
fn animate_out(keyframes: Vec<ShapeKeyframe>, effect: ResolvedEffect, scene_duration: i64) -> Vec<ShapeKeyframe> {
    const END_SCALE: f64 = 0.3;
    const END_OPACITY: f64 = 0.1;

    let origin = effect.origin();
    let last = effect.last_frame();

    let start = value_at_offset(&keyframes, effect.offset);
    let end = value_at_offset(&keyframes, last);
    let end = ShapeKeyframe {
        offset: end.offset,
        properties: KeyframeProps {
            path: end.properties.path.as_ref().map(|p| scale_path(p, END_SCALE, origin)),
            ..with_opacity(&end.properties, END_OPACITY)
        },
    };
    let end_hidden = ShapeKeyframe {
        offset: last + 1,
        properties: hidden(&end.properties),
    };

    let tweened = insert_keyframe(insert_keyframe(keyframes, start), end);
    if last == scene_duration - 1 {
        return tweened;
    }
    let mut out = keyframes_until(&tweened, last);
    out.push(end_hidden);
    out
}

/// Per-frame linear alpha ramp from 0 up to (but not reaching) 1; the first
/// untouched keyframe after the window restores full opacity.
fn fade_in(keyframes: Vec<ShapeKeyframe>, effect: ResolvedEffect) -> Vec<ShapeKeyframe> {
    let last = effect.last_frame();
    let mut frames: Vec<ShapeKeyframe> = (effect.offset..effect.offset + effect.duration)
        .map(|offset| {
            let sample = value_at_offset(&keyframes, offset);
            ShapeKeyframe {
                offset,
                properties: with_opacity(&sample.properties, effect.progress(offset)),
            }
        })
        .collect();
    frames.extend(keyframes_after(&keyframes, last));
    if effect.offset == 0 {
        return frames;
    }
    let guard = value_at_offset(&keyframes, effect.offset - 1);
    let mut out = vec![ShapeKeyframe {
        offset: guard.offset,
        properties: hidden(&guard.properties),
    }];
    out.extend(frames);
    out
}

/// Mirror of `fade_in`: alpha ramps from 1 down toward 0, with a hidden
/// guard frame just past the window unless it ends the scene.
fn fade_out(keyframes: Vec<ShapeKeyframe>, effect: ResolvedEffect, scene_duration: i64) -> Vec<ShapeKeyframe> {
    let last = effect.last_frame();
    let mut out = keyframes_before(&keyframes, effect.offset);
    out.extend((effect.offset..effect.offset + effect.duration).map(|offset| {
        let sample = value_at_offset(&keyframes, offset);
        ShapeKeyframe {
            offset,
            properties: with_opacity(&sample.properties, 1.0 - effect.progress(offset)),
        }
    }));
    if last == scene_duration - 1 {
        return out;
    }
    let guard = value_at_offset(&keyframes, effect.offset + effect.duration);
    out.push(ShapeKeyframe {
        offset: guard.offset,
        properties: hidden(&guard.properties),
    });
    out
}

/// Symmetric grow-then-shrink about the group center.
fn pulse(keyframes: Vec<ShapeKeyframe>, effect: ResolvedEffect) -> Vec<ShapeKeyframe> {
    const PULSE_SCALE: f64 = 1.3;

    let origin = effect.origin();
    let last = effect.last_frame();
    let mut out = keyframes_before(&keyframes, effect.offset);
    out.extend((effect.offset..effect.offset + effect.duration).map(|offset| {
        let t = effect.progress(offset);
        let ramp = if t <= 0.5 { t / 0.5 } else { 1.0 - (t - 0.5) / 0.5 };
        let scale = 1.0 + Ease::InOutQuad.apply(ramp) * (PULSE_SCALE - 1.0);
        let sample = value_at_offset(&keyframes, offset);
        ShapeKeyframe {
            offset,
            properties: KeyframeProps {
                path: sample.properties.path.as_ref().map(|p| scale_path(p, scale, origin)),
                ..sample.properties
            },
        }
    }));
    out.extend(keyframes_after(&keyframes, last));
    out
}

/// Grow while fading out, collapsing to nothing on the final frame.
fn pop(keyframes: Vec<ShapeKeyframe>, effect: ResolvedEffect) -> Vec<ShapeKeyframe> {
    const POP_SCALE: f64 = 1.3;

    let origin = effect.origin();
    let last = effect.last_frame();
    let mut out = keyframes_before(&keyframes, effect.offset);
    out.extend((effect.offset..effect.offset + effect.duration).map(|offset| {
        let t = effect.progress(offset);
        let scale = if t == 1.0 {
            0.0
        } else {
            1.0 + Ease::InOutQuad.apply(t) * (POP_SCALE - 1.0)
        };
        let opacity = if t == 1.0 { 0.0 } else { Ease::InOutQuad.apply(1.0 - t) };
        let sample = value_at_offset(&keyframes, offset);
        ShapeKeyframe {
            offset,
            properties: KeyframeProps {
                path: sample.properties.path.as_ref().map(|p| scale_path(p, scale, origin)),
                ..with_opacity(&sample.properties, opacity)
            },
        }
    }));
    out.extend(keyframes_after(&keyframes, last));
    out
}

/// Random per-frame displacement whose amplitude ramps up over the window.
/// Draws x then y from the shared generator, one pair per frame.
fn jitter(keyframes: Vec<ShapeKeyframe>, effect: ResolvedEffect, rng: &mut JitterRng) -> Vec<ShapeKeyframe> {
    const JITTER_AMOUNT: f64 = 7.0;

    let last = effect.last_frame();
    let mut out = keyframes_before(&keyframes, effect.offset);
    out.extend((effect.offset..effect.offset + effect.duration).map(|offset| {
        let intensity = effect.progress(offset) * JITTER_AMOUNT;
        let displacement = Vec2::new(rng.displacement(intensity), rng.displacement(intensity));
        let sample = value_at_offset(&keyframes, offset);
        ShapeKeyframe {
            offset,
            properties: KeyframeProps {
                path: sample.properties.path.as_ref().map(|p| translate_path(p, displacement)),
                ..sample.properties
            },
        }
    }));
    out.extend(keyframes_after(&keyframes, last));
    out
}

/// Reverse radial collapse: the shape reassembles from the group center. The
/// base frame is sampled once at the window start and warped per frame, so
/// any keyframed motion inside the window is frozen for its duration.
fn explode(keyframes: Vec<ShapeKeyframe>, effect: ResolvedEffect) -> Vec<ShapeKeyframe> {
    const GRAVITY: f64 = 2.0;

    let last = effect.last_frame();
    let base = value_at_offset(&keyframes, effect.offset);
    let mut out = keyframes_before(&keyframes, effect.offset);
    out.extend((effect.offset..effect.offset + effect.duration).map(|offset| {
        let warp = Ease::InOutExpo.apply(1.0 - effect.progress(offset));
        ShapeKeyframe {
            offset,
            properties: KeyframeProps {
                path: base
                    .properties
                    .path
                    .as_ref()
                    .map(|p| warp_path(p, effect.bounds, warp, GRAVITY)),
                ..base.properties.clone()
            },
        }
    }));
    out.extend(keyframes_after(&keyframes, last));
    out
}
