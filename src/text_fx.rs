//! Text timeline builder. Each declared text frame expands into a run of
//! concrete frames inside its own local window, effects rewrite slices of
//! that run, and the runs are shifted to their declared start times and
//! merged into one global timeline.

use std::collections::BTreeMap;

use anyhow::anyhow;

use crate::{
    color::Color,
    error::{KeytimeError, KeytimeResult},
    geom::Vec2,
    model::TextFrame,
    rng::JitterRng,
    timeline::normalize_offset,
};

/// Authored text frame. `time` is the absolute start on the global timeline;
/// `duration` only matters for the last frame of a sorted run, every earlier
/// frame ends where its successor starts.
#[derive(Clone, Debug, serde::Deserialize)]
pub struct TextFrameDecl {
    pub time: i64,
    pub duration: i64,
    #[serde(default)]
    pub text: String,
    #[serde(default)]
    pub style: BTreeMap<String, String>,
    #[serde(default)]
    pub position: Option<Vec2>,
    #[serde(default)]
    pub effects: Vec<TextEffectDecl>,
}

#[derive(Clone, Debug, serde::Deserialize)]
pub struct TextEffectDecl {
    pub name: String,
    #[serde(default)]
    pub offset: i64,
    #[serde(default)]
    pub duration: Option<i64>,
    #[serde(default)]
    pub options: TextEffectOptions,
}

/// Union of the per-effect option bags; each effect reads the fields it
/// knows and ignores the rest.
#[derive(Clone, Debug, Default, serde::Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct TextEffectOptions {
    /// Entry/exit displacement vector for `animatein`/`animateout`.
    pub offset: Option<Vec2>,
    /// Jitter amplitude in output units.
    pub amount: f64,
    /// Ramp the jitter amplitude over the window instead of holding it.
    pub increasing: bool,
    /// Cursor glyph override.
    pub cursor: Option<String>,
    /// Frames between cursor blink toggles.
    pub blink_duration: Option<i64>,
    /// Prefix for `prepend`.
    pub text: Option<String>,
}

/// Closed set of text effect names.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum TextEffectKind {
    FadeIn,
    FadeOut,
    AnimateIn,
    AnimateOut,
    Typewriter,
    Cursor,
    Prepend,
    Jitter,
}

impl TextEffectKind {
    pub fn parse(name: &str) -> KeytimeResult<Self> {
        match name {
            "fadein" => Ok(Self::FadeIn),
            "fadeout" => Ok(Self::FadeOut),
            "animatein" => Ok(Self::AnimateIn),
            "animateout" => Ok(Self::AnimateOut),
            "typewriter" => Ok(Self::Typewriter),
            "cursor" => Ok(Self::Cursor),
            "prepend" => Ok(Self::Prepend),
            "jitter" => Ok(Self::Jitter),
            other => Err(KeytimeError::unknown_effect(other)),
        }
    }
}

/// Working frame while a declaration's effects are being folded. Times are
/// local to the declaration's window until the final shift.
#[derive(Clone, Debug)]
struct WorkFrame {
    time: i64,
    text: String,
    style: BTreeMap<String, String>,
    position: Option<Vec2>,
}

impl WorkFrame {
    fn into_output(self) -> TextFrame {
        TextFrame {
            time: self.time,
            text: self.text,
            style: self.style,
            position: self.position.unwrap_or(Vec2::ZERO),
        }
    }
}

/// Expand every declaration and merge the runs into one globally ordered
/// timeline. Exact time collisions across runs resolve to the later frame.
#[tracing::instrument(skip_all, fields(frames = decls.len()))]
pub fn render_text(decls: &[TextFrameDecl], rng: &mut JitterRng) -> KeytimeResult<Vec<TextFrame>> {
    let mut sorted: Vec<&TextFrameDecl> = decls.iter().collect();
    sorted.sort_by_key(|decl| decl.time);

    let mut merged: Vec<TextFrame> = Vec::new();
    for (index, decl) in sorted.iter().enumerate() {
        let window = match sorted.get(index + 1) {
            Some(next) => next.time - decl.time,
            None => decl.duration,
        };
        let frames = expand_decl(decl, window, rng)?;
        for frame in frames {
            let mut output = frame.into_output();
            output.time += decl.time;
            merged = insert_frame(merged, output);
        }
    }
    Ok(merged)
}

fn insert_frame(frames: Vec<TextFrame>, frame: TextFrame) -> Vec<TextFrame> {
    let time = frame.time;
    let mut out = Vec::with_capacity(frames.len() + 1);
    let mut after = Vec::new();
    for existing in frames {
        if existing.time < time {
            out.push(existing);
        } else if existing.time > time {
            after.push(existing);
        }
    }
    out.push(frame);
    out.extend(after);
    out
}

fn expand_decl(decl: &TextFrameDecl, window: i64, rng: &mut JitterRng) -> KeytimeResult<Vec<WorkFrame>> {
    let mut frames = vec![WorkFrame {
        time: 0,
        text: decl.text.clone(),
        style: decl.style.clone(),
        position: decl.position,
    }];
    for effect in &decl.effects {
        let kind = TextEffectKind::parse(&effect.name)?;
        let offset = normalize_offset(effect.offset, window).max(0);
        let duration = (window - offset).min(effect.duration.unwrap_or(window - offset));
        let slice = frames_slice(&frames, offset, duration);
        let processed = apply_effect(kind, slice, offset, duration, &effect.options, rng)?;

        let mut next = if offset == 0 {
            Vec::new()
        } else {
            frames_slice(&frames, 0, offset)
        };
        next.extend(processed);
        if offset + duration != window {
            next.extend(frames_slice(&frames, offset + duration, window - (offset + duration)));
        }
        frames = next;
    }
    Ok(frames)
}

/// Frames covering `[offset, offset + duration)`. When no frame starts
/// exactly at `offset`, the state active just before it is cloned in as the
/// slice's start frame so the slice always describes its full range.
fn frames_slice(frames: &[WorkFrame], offset: i64, duration: i64) -> Vec<WorkFrame> {
    let in_range: Vec<WorkFrame> = frames
        .iter()
        .filter(|f| f.time >= offset && f.time < offset + duration)
        .cloned()
        .collect();
    if in_range.first().is_some_and(|f| f.time == offset) {
        return in_range;
    }
    let Some(previous) = frame_at(frames, offset) else {
        return in_range;
    };
    let mut out = vec![WorkFrame {
        time: offset,
        ..previous.clone()
    }];
    out.extend(in_range);
    out
}

/// Last frame at or before `offset` in list order, falling back to the
/// first frame.
fn frame_at(frames: &[WorkFrame], offset: i64) -> Option<&WorkFrame> {
    frames
        .iter()
        .rev()
        .find(|f| f.time <= offset)
        .or_else(|| frames.first())
}

fn insert_work_frame(frames: Vec<WorkFrame>, frame: WorkFrame, time: i64) -> Vec<WorkFrame> {
    let mut out = Vec::with_capacity(frames.len() + 1);
    let mut after = Vec::new();
    for existing in frames {
        if existing.time < time {
            out.push(existing);
        } else if existing.time > time {
            after.push(existing);
        }
    }
    out.push(WorkFrame { time, ..frame });
    out.extend(after);
    out
}

/// Successor-start duration of every frame in a slice, measured against the
/// effect window end.
fn frames_with_durations(frames: &[WorkFrame], total_duration: i64) -> Vec<(WorkFrame, i64)> {
    frames
        .iter()
        .enumerate()
        .map(|(index, frame)| {
            let end = frames.get(index + 1).map_or(total_duration, |next| next.time);
            (frame.clone(), end - frame.time)
        })
        .collect()
}

fn apply_effect(
    kind: TextEffectKind,
    frames: Vec<WorkFrame>,
    offset: i64,
    duration: i64,
    options: &TextEffectOptions,
    rng: &mut JitterRng,
) -> KeytimeResult<Vec<WorkFrame>> {
    match kind {
        TextEffectKind::FadeIn => fade(frames, offset, duration, false),
        TextEffectKind::FadeOut => fade(frames, offset, duration, true),
        TextEffectKind::AnimateIn => Ok(animate(frames, offset, duration, options, false)),
        TextEffectKind::AnimateOut => Ok(animate(frames, offset, duration, options, true)),
        TextEffectKind::Typewriter => Ok(typewriter(frames, duration)),
        TextEffectKind::Cursor => Ok(cursor(frames, duration, options)),
        TextEffectKind::Prepend => Ok(prepend(frames, options)),
        TextEffectKind::Jitter => Ok(jitter(frames, offset, duration, options, rng)),
    }
}

const DEFAULT_TEXT_COLOR: &str = "rgb(0,0,0)";

/// Per-frame alpha ramp on the `color` style entry.
fn fade(frames: Vec<WorkFrame>, offset: i64, duration: i64, out: bool) -> KeytimeResult<Vec<WorkFrame>> {
    let mut result = Vec::new();
    for time in offset..offset + duration {
        let Some(active) = frame_at(&frames, time) else {
            continue;
        };
        let t = (time - offset) as f64 / duration as f64;
        let opacity = if out { 1.0 - t } else { t };
        let css = active
            .style
            .get("color")
            .map_or(DEFAULT_TEXT_COLOR, String::as_str);
        let color = Color::parse(css)
            .map_err(|message| KeytimeError::Other(anyhow!("invalid text color {css:?}: {message}")))?;
        let mut style = active.style.clone();
        style.insert("color".to_owned(), color.with_alpha(opacity).to_css());
        result.push(WorkFrame {
            time,
            style,
            ..active.clone()
        });
    }
    Ok(result)
}

/// Slide in from (or out toward) a declared displacement vector.
fn animate(
    frames: Vec<WorkFrame>,
    offset: i64,
    duration: i64,
    options: &TextEffectOptions,
    out: bool,
) -> Vec<WorkFrame> {
    let displacement = options.offset.unwrap_or(Vec2::ZERO);
    (offset..offset + duration)
        .filter_map(|time| {
            let active = frame_at(&frames, time)?;
            let progress = (time - offset) as f64 / duration as f64;
            let amount = if out { progress } else { 1.0 - progress };
            let base = active.position.unwrap_or(Vec2::ZERO);
            Some(WorkFrame {
                time,
                position: Some(base.add(displacement.scale(amount))),
                ..active.clone()
            })
        })
        .collect()
}

/// Reveal each frame's text one character per step, N+1 steps spread across
/// that frame's run.
fn typewriter(frames: Vec<WorkFrame>, duration: i64) -> Vec<WorkFrame> {
    let items = frames_with_durations(&frames, duration);
    let mut out = Vec::new();
    for (frame, frame_duration) in items {
        let chars: Vec<char> = frame.text.chars().collect();
        let steps = chars.len() + 1;
        let mut spliced = frames.clone();
        for index in 0..steps {
            let progress = if steps == 1 {
                0.0
            } else {
                index as f64 / (steps - 1) as f64
            };
            let time = frame.time + (progress * (frame_duration - 1) as f64).round() as i64;
            let Some(source) = frame_at(&spliced, time) else {
                continue;
            };
            let revealed = WorkFrame {
                text: chars[..index].iter().collect(),
                ..source.clone()
            };
            spliced = insert_work_frame(spliced, revealed, time);
        }
        out.extend(spliced);
    }
    out
}

const DEFAULT_CURSOR: &str = "&boxv;";
const DEFAULT_CURSOR_BLINK_DURATION: i64 = 15;

/// Append a blinking cursor glyph: visible on the frame itself, then
/// toggling every blink interval for as long as the frame runs.
fn cursor(frames: Vec<WorkFrame>, duration: i64, options: &TextEffectOptions) -> Vec<WorkFrame> {
    let blink = options.blink_duration.unwrap_or(DEFAULT_CURSOR_BLINK_DURATION);
    let glyph = options.cursor.as_deref().unwrap_or(DEFAULT_CURSOR);
    let mut out = Vec::new();
    for (frame, frame_duration) in frames_with_durations(&frames, duration) {
        out.push(WorkFrame {
            text: format!("{}{glyph}", frame.text),
            ..frame.clone()
        });
        let blinks = if blink > 0 { (frame_duration - 1).div_euclid(blink) } else { 0 };
        for index in 0..blinks.max(0) {
            let toggled = WorkFrame {
                time: frame.time + (index + 1) * blink,
                ..frame.clone()
            };
            if index % 2 == 0 {
                out.push(toggled);
            } else {
                out.push(WorkFrame {
                    text: format!("{}{glyph}", toggled.text),
                    ..toggled
                });
            }
        }
    }
    out
}

fn prepend(frames: Vec<WorkFrame>, options: &TextEffectOptions) -> Vec<WorkFrame> {
    let prefix = options.text.as_deref().unwrap_or("");
    frames
        .into_iter()
        .map(|frame| WorkFrame {
            text: format!("{prefix}{}", frame.text),
            ..frame
        })
        .collect()
}

const DEFAULT_TEXT_POSITION: Vec2 = Vec2 { x: -266.0, y: 64.0 };

/// Random positional shake, either constant or ramping up over the window.
/// Draws x then y from the shared generator, one pair per frame.
fn jitter(
    frames: Vec<WorkFrame>,
    offset: i64,
    duration: i64,
    options: &TextEffectOptions,
    rng: &mut JitterRng,
) -> Vec<WorkFrame> {
    let mut out = Vec::new();
    for time in offset..offset + duration {
        let t = (time - offset) as f64 / duration as f64;
        let multiplier = if options.increasing { t } else { 1.0 };
        let dx = multiplier * rng.displacement(options.amount);
        let dy = multiplier * rng.displacement(options.amount);
        let Some(active) = frame_at(&frames, time) else {
            continue;
        };
        let base = active.position.unwrap_or(DEFAULT_TEXT_POSITION);
        out.push(WorkFrame {
            time,
            position: Some(Vec2::new(base.x + dx, base.y + dy)),
            ..active.clone()
        });
    }
    out
}
