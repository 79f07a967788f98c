use crate::{
    document::node::{NodeId, NodeKind},
    document::tree::Document,
    foundation::error::{EditError, EditResult},
    foundation::timecode::Timecode,
};

#[derive(Clone, Copy, Debug, PartialEq, Eq, serde::Serialize)]
/// Time span of a node: trim points (when the node kind has them) and elapsed duration.
pub struct NodeDuration {
    /// Effective in point. `None` for kinds that only have a total length.
    #[serde(rename = "in", skip_serializing_if = "Option::is_none")]
    pub in_point: Option<Timecode>,
    /// Effective out point. `None` for kinds that only have a total length.
    #[serde(rename = "out", skip_serializing_if = "Option::is_none")]
    pub out_point: Option<Timecode>,
    /// Duration covered by the node.
    pub elapsed: Timecode,
}

impl NodeDuration {
    fn elapsed_only(elapsed: Timecode) -> Self {
        Self {
            in_point: None,
            out_point: None,
            elapsed,
        }
    }

    fn trimmed(in_point: Timecode, out_point: Timecode) -> EditResult<Self> {
        let elapsed = out_point.checked_sub(in_point).ok_or(EditError::InvalidRange {
            in_point,
            out_point,
        })?;
        Ok(Self {
            in_point: Some(in_point),
            out_point: Some(out_point),
            elapsed,
        })
    }
}

/// Compute the span of `node`.
///
/// - `multitrack`: end of the last track (head of its playlist plus its tail, see below).
/// - `track`: the first entry of the referenced playlist, or the referenced tractor.
/// - `entry`: `in` (default zero) to `out` (default: the producer's `length`).
/// - `tractor`, `playlist`, `blank` and `producer` are accepted as well.
///
/// Nesting depth is unbounded; the document must be acyclic.
#[tracing::instrument(skip(doc))]
pub fn compute_duration(doc: &Document, node: NodeId) -> EditResult<NodeDuration> {
    match doc.kind(node) {
        NodeKind::Multitrack => multitrack_duration(doc, node),
        NodeKind::Tractor => {
            let mt = doc
                .children_of_kind(node, &NodeKind::Multitrack)
                .next()
                .ok_or_else(|| {
                    EditError::validation(format!("{} has no multitrack", label(doc, node)))
                })?;
            multitrack_duration(doc, mt)
        }
        NodeKind::Track => {
            let target = track_target(doc, node)?;
            compute_duration(doc, target)
        }
        NodeKind::Playlist => match doc.children_of_kind(node, &NodeKind::Entry).next() {
            Some(entry) => entry_duration(doc, entry),
            None => Ok(NodeDuration::elapsed_only(Timecode::ZERO)),
        },
        NodeKind::Entry => entry_duration(doc, node),
        NodeKind::Blank => {
            let length = doc.attr(node, "length").ok_or_else(|| {
                EditError::validation(format!("{} has no length", label(doc, node)))
            })?;
            Ok(NodeDuration::elapsed_only(Timecode::parse(length)?))
        }
        NodeKind::Producer => {
            let in_point = timecode_attr(doc, node, "in")?.unwrap_or(Timecode::ZERO);
            let out_point = match timecode_attr(doc, node, "out")? {
                Some(out) => out,
                None => producer_length(doc, node)?,
            };
            NodeDuration::trimmed(in_point, out_point)
        }
        other => Err(EditError::validation(format!(
            "<{}> has no duration",
            other.tag()
        ))),
    }
}

/// Node a track points at (a playlist or a nested tractor).
pub(crate) fn track_target(doc: &Document, track: NodeId) -> EditResult<NodeId> {
    let reference = doc.attr(track, "producer").ok_or_else(|| {
        EditError::validation(format!("{} has no producer attribute", label(doc, track)))
    })?;
    let target = doc.resolve(reference)?;
    match doc.kind(target) {
        NodeKind::Playlist | NodeKind::Tractor => Ok(target),
        other => Err(EditError::validation(format!(
            "track reference '{reference}' points at <{}>, expected playlist or tractor",
            other.tag()
        ))),
    }
}

/// Timeline items of a playlist (entries, blanks and inline tractors), skipping properties
/// and other metadata children.
pub(crate) fn playlist_items(
    doc: &Document,
    playlist: NodeId,
) -> impl Iterator<Item = NodeId> + '_ {
    doc.children(playlist)
        .iter()
        .copied()
        .filter(|c| matches!(doc.kind(*c), NodeKind::Entry | NodeKind::Blank | NodeKind::Tractor))
}

fn multitrack_duration(doc: &Document, mt: NodeId) -> EditResult<NodeDuration> {
    let Some(last_track) = doc.children_of_kind(mt, &NodeKind::Track).last() else {
        return Ok(NodeDuration::elapsed_only(Timecode::ZERO));
    };
    let target = track_target(doc, last_track)?;
    if doc.kind(target) == &NodeKind::Tractor {
        return Ok(NodeDuration::elapsed_only(compute_duration(doc, target)?.elapsed));
    }

    let mut items = playlist_items(doc, target);
    let Some(first) = items.next() else {
        return Ok(NodeDuration::elapsed_only(Timecode::ZERO));
    };
    let last = items.last().unwrap_or(first);
    if first == last {
        return Ok(NodeDuration::elapsed_only(compute_duration(doc, first)?.elapsed));
    }

    // A declared head length (usually the alignment blank) is taken as-is.
    let head = match timecode_attr(doc, first, "length")? {
        Some(length) => length,
        None => compute_duration(doc, first)?.elapsed,
    };
    let tail = compute_duration(doc, last)?.elapsed;
    Ok(NodeDuration::elapsed_only(head + tail))
}

fn entry_duration(doc: &Document, entry: NodeId) -> EditResult<NodeDuration> {
    let in_point = timecode_attr(doc, entry, "in")?.unwrap_or(Timecode::ZERO);
    let out_point = match timecode_attr(doc, entry, "out")? {
        Some(out) => out,
        None => {
            let reference = doc.attr(entry, "producer").ok_or_else(|| {
                EditError::validation(format!("{} has no producer attribute", label(doc, entry)))
            })?;
            let producer = doc.resolve(reference)?;
            match doc.kind(producer) {
                NodeKind::Producer => producer_length(doc, producer)?,
                NodeKind::Playlist | NodeKind::Tractor => compute_duration(doc, producer)?.elapsed,
                other => {
                    return Err(EditError::validation(format!(
                        "entry reference '{reference}' points at <{}>",
                        other.tag()
                    )));
                }
            }
        }
    };
    NodeDuration::trimmed(in_point, out_point)
}

fn producer_length(doc: &Document, producer: NodeId) -> EditResult<Timecode> {
    let length = doc
        .property(producer, "length")
        .or_else(|| doc.attr(producer, "length"))
        .ok_or_else(|| {
            EditError::validation(format!("{} has no length property", label(doc, producer)))
        })?;
    Timecode::parse(length)
}

fn timecode_attr(doc: &Document, node: NodeId, name: &str) -> EditResult<Option<Timecode>> {
    doc.attr(node, name).map(Timecode::parse).transpose()
}

fn label(doc: &Document, node: NodeId) -> String {
    let tag = doc.kind(node).tag();
    match doc.node(node).id() {
        Some(id) => format!("<{tag} id=\"{id}\">"),
        None => format!("<{tag}>"),
    }
}

#[cfg(test)]
#[path = "../../tests/unit/timeline/duration.rs"]
mod tests;
