use crate::{
    document::node::{NodeId, NodeKind},
    document::tree::Document,
    foundation::error::{EditError, EditResult},
    timeline::duration::track_target,
};

/// Producer ids with this prefix are plain clips; anything else an entry points at is a
/// nested timeline.
pub const SIMPLE_PRODUCER_PREFIX: &str = "producer";

/// Attributes through which transitions and filters address tracks by position.
pub const TRACK_REF_ATTRS: [&str; 3] = ["track", "a_track", "b_track"];

/// Item at flat position `index` of a track's content.
///
/// Entries pointing at a `producer*` id fill one slot each. Entries pointing at a nested
/// tractor (or playlist) are expanded in place, one slot per track (or entry) of the nested
/// timeline. Blanks are gaps, not items, and take no slot. `track` may be a `<track>` or the
/// playlist or tractor it references; a tractor contributes one slot per track.
#[tracing::instrument(skip(doc))]
pub fn logical_item_at(doc: &Document, track: NodeId, index: usize) -> EditResult<Option<NodeId>> {
    let content = match doc.kind(track) {
        NodeKind::Track => track_target(doc, track)?,
        _ => track,
    };
    if doc.kind(content) == &NodeKind::Tractor {
        return Ok(nested_slots(doc, content)?.get(index).copied());
    }

    let mut seen = 0usize;
    for &child in doc.children(content) {
        let slots = child_slots(doc, child)?;
        if index < seen + slots.len() {
            return Ok(Some(slots[index - seen]));
        }
        seen += slots.len();
    }
    Ok(None)
}

fn child_slots(doc: &Document, child: NodeId) -> EditResult<Vec<NodeId>> {
    match doc.kind(child) {
        NodeKind::Blank | NodeKind::Property => return Ok(Vec::new()),
        NodeKind::Tractor => return nested_slots(doc, child),
        _ => {}
    }
    let Some(reference) = doc.attr(child, "producer") else {
        return Ok(Vec::new());
    };
    if reference.starts_with(SIMPLE_PRODUCER_PREFIX) {
        return Ok(vec![child]);
    }
    let nested = doc.resolve(reference)?;
    nested_slots(doc, nested)
}

fn nested_slots(doc: &Document, nested: NodeId) -> EditResult<Vec<NodeId>> {
    match doc.kind(nested) {
        NodeKind::Tractor => Ok(doc
            .children_of_kind(nested, &NodeKind::Multitrack)
            .flat_map(|mt| doc.children(mt).iter().copied())
            .collect()),
        NodeKind::Playlist => Ok(doc
            .children(nested)
            .iter()
            .copied()
            .filter(|c| !matches!(doc.kind(*c), NodeKind::Blank | NodeKind::Property))
            .collect()),
        NodeKind::Producer => Ok(vec![nested]),
        other => Err(EditError::validation(format!(
            "cannot expand <{}> as a nested timeline",
            other.tag()
        ))),
    }
}

/// Index of `track` among the tracks of its multitrack.
///
/// This is the value transitions and filters store in `track`, `a_track` and `b_track`.
pub fn positional_index(doc: &Document, track: NodeId) -> usize {
    let Some(parent) = doc.parent(track) else {
        return 0;
    };
    doc.children(parent)
        .iter()
        .take_while(|c| **c != track)
        .filter(|c| doc.kind(**c) == &NodeKind::Track)
        .count()
}

/// `true` when a transition or filter of the owning tractor addresses `track` by index.
pub fn is_referenced(doc: &Document, track: NodeId) -> bool {
    let Some(tractor) = owning_tractor(doc, track) else {
        return false;
    };
    let index = positional_index(doc, track).to_string();
    doc.children(tractor)
        .iter()
        .filter(|c| doc.kind(**c).addresses_tracks())
        .any(|c| {
            TRACK_REF_ATTRS
                .iter()
                .any(|name| doc.param(*c, name).map(str::trim) == Some(index.as_str()))
        })
}

/// Tractor that owns the multitrack containing `track`.
pub(crate) fn owning_tractor(doc: &Document, track: NodeId) -> Option<NodeId> {
    let mt = doc.parent(track)?;
    if doc.kind(mt) != &NodeKind::Multitrack {
        return None;
    }
    let tractor = doc.parent(mt)?;
    (doc.kind(tractor) == &NodeKind::Tractor).then_some(tractor)
}

/// Add `delta` to every track index `>= from` held by the tractor's transitions and filters.
///
/// Must run after any insertion or removal of a track so that positional references keep
/// pointing at the same tracks. Values that are not plain indices are left alone.
pub fn shift_track_references(
    doc: &mut Document,
    tractor: NodeId,
    from: usize,
    delta: isize,
) -> EditResult<()> {
    let mut edits: Vec<(NodeId, &'static str, String, bool)> = Vec::new();
    for &child in doc.children(tractor) {
        if !doc.kind(child).addresses_tracks() {
            continue;
        }
        for name in TRACK_REF_ATTRS {
            if let Some(value) = doc.attr(child, name) {
                if let Some(next) = shifted(value, from, delta) {
                    edits.push((child, name, next, true));
                }
            } else if let Some(prop) = doc
                .children_of_kind(child, &NodeKind::Property)
                .find(|p| doc.attr(*p, "name") == Some(name))
                && let Some(next) = shifted(doc.node(prop).text().unwrap_or(""), from, delta)
            {
                edits.push((prop, name, next, false));
            }
        }
    }

    for (node, name, value, is_attr) in edits {
        tracing::debug!(?node, attr = name, %value, "reindex track reference");
        if is_attr {
            doc.set_attr(node, name, value)?;
        } else {
            doc.set_text(node, value);
        }
    }
    Ok(())
}

fn shifted(value: &str, from: usize, delta: isize) -> Option<String> {
    let index: usize = value.trim().parse().ok()?;
    if index < from {
        return None;
    }
    index.checked_add_signed(delta).map(|i| i.to_string())
}

#[cfg(test)]
#[path = "../../tests/unit/timeline/traversal.rs"]
mod tests;
