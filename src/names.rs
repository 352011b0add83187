//! Node-name grammars that drive timeline compilation.
//!
//! A node's name is the only thing that decides whether it is a stage, a
//! scene, a keyframe definition or an effect group. Every parser here fails
//! silently (returns `None`) on a non-matching name; unmatched nodes are
//! plain shapes.

use crate::geom::Vec2;

/// `stage:<originX>,<originY>`. The origin translates all descendant points
/// by its negation.
pub fn parse_stage(name: &str) -> Option<Vec2> {
    let body = name.strip_prefix("stage:")?;
    let (x, y) = body.split_once(',')?;
    if !is_stage_number(x) || !is_stage_number(y) {
        return None;
    }
    Some(Vec2::new(x.parse().ok()?, y.parse().ok()?))
}

/// `<sceneId>-<durationFrames>`; without a digits suffix the whole name is
/// the id and the duration defaults to 1.
pub fn parse_scene(name: &str) -> (&str, i64) {
    if let Some(split) = name.rfind('-') {
        let (id, suffix) = (&name[..split], &name[split + 1..]);
        if !suffix.is_empty() && suffix.bytes().all(|b| b.is_ascii_digit()) {
            if let Ok(duration) = suffix.parse::<i64>() {
                return (id, duration);
            }
        }
    }
    (name, 1)
}

/// `<targetId>:<signedInteger>`. A negative offset counts back from the
/// scene end.
pub fn parse_keyframe(name: &str) -> Option<(&str, i64)> {
    let (target, offset) = name.split_once(':')?;
    if target.is_empty() || !is_signed_int(offset) {
        return None;
    }
    Some((target, offset.parse().ok()?))
}

/// One `[name]` / `[name:duration]` / `[name:offset:duration]` tag parsed
/// off an effect-group name.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct EffectTag {
    pub name: String,
    pub offset: i64,
    pub duration: Option<i64>,
}

/// `<baseName>[tag][tag]...`. The earliest `[` from which the rest of the
/// name is a complete tag sequence wins; the group id is the base name only.
pub fn parse_effect_group(name: &str) -> Option<(&str, Vec<EffectTag>)> {
    for (index, byte) in name.bytes().enumerate() {
        if byte != b'[' {
            continue;
        }
        if let Some(tags) = parse_tag_sequence(&name[index..]) {
            return Some((&name[..index], tags));
        }
    }
    None
}

fn parse_tag_sequence(mut rest: &str) -> Option<Vec<EffectTag>> {
    let mut tags = Vec::new();
    while !rest.is_empty() {
        let body = rest.strip_prefix('[')?;
        let close = body.find(']')?;
        tags.push(parse_tag_body(&body[..close])?);
        rest = &body[close + 1..];
    }
    if tags.is_empty() { None } else { Some(tags) }
}

fn parse_tag_body(body: &str) -> Option<EffectTag> {
    let mut parts = body.split(':');
    let name = parts.next()?;
    if name.is_empty() || !name.bytes().all(|b| b.is_ascii_alphanumeric() || b == b'_') {
        return None;
    }

    let second = parts.next();
    let third = parts.next();
    if parts.next().is_some() {
        return None;
    }

    let (offset, duration) = match (second, third) {
        (None, _) => (0, None),
        (Some(duration), None) => {
            if !is_unsigned_int(duration) {
                return None;
            }
            (0, Some(duration.parse().ok()?))
        }
        (Some(offset), Some(duration)) => {
            if !is_signed_int(offset) || !is_unsigned_int(duration) {
                return None;
            }
            (offset.parse().ok()?, Some(duration.parse().ok()?))
        }
    };

    Some(EffectTag {
        name: name.to_owned(),
        offset,
        duration,
    })
}

// Stage origins use the narrow `-?\d\.?\d*` shape: a sign, one digit, an
// optional dot, trailing digits. "1.5" and "-12" match; "12.5" and ".5" do
// not.
fn is_stage_number(s: &str) -> bool {
    let s = s.strip_prefix('-').unwrap_or(s);
    let bytes = s.as_bytes();
    if !bytes.first().is_some_and(|b| b.is_ascii_digit()) {
        return false;
    }
    let mut rest = &bytes[1..];
    if rest.first() == Some(&b'.') {
        rest = &rest[1..];
    }
    rest.iter().all(|b| b.is_ascii_digit())
}

fn is_signed_int(s: &str) -> bool {
    is_unsigned_int(s.strip_prefix('-').unwrap_or(s))
}

fn is_unsigned_int(s: &str) -> bool {
    !s.is_empty() && s.bytes().all(|b| b.is_ascii_digit())
}
