use crate::{
    document::node::{NodeId, NodeKind},
    document::tree::Document,
    foundation::error::{EditError, EditResult},
    foundation::timecode::Timecode,
    timeline::duration::{compute_duration, playlist_items},
    timeline::traversal::{is_referenced, owning_tractor, positional_index, shift_track_references},
};

/// Id of the track new tractors are placed in front of.
pub const SENTINEL_TRACK_ID: &str = "videotrack0";
/// Prefix of generated tractor ids (`tractor<N>`).
pub const TRACTOR_ID_PREFIX: &str = "tractor";
/// Prefix of generated playlist ids (`playlist<N>`).
pub const PLAYLIST_ID_PREFIX: &str = "playlist";

#[derive(Clone, Debug, PartialEq, Eq)]
/// Options for [`attach_playlist_to_multitrack`].
pub struct AttachOpts {
    /// How long the new track overlaps the end of the current timeline.
    pub overlap: Timecode,
    /// `mlt_service` of the generated transition.
    pub service: String,
}

impl Default for AttachOpts {
    fn default() -> Self {
        Self {
            overlap: Timecode::ZERO,
            service: "luma".to_string(),
        }
    }
}

/// Wrap a copy of `entry` into a new `playlist<N>` placed right after the last producer.
///
/// `N` is the number of `playlist<digits>` ids already in the document. The copy drops every
/// `id` attribute so it never collides with the original. Returns the playlist.
#[tracing::instrument(skip(doc))]
pub fn wrap_as_playlist(doc: &mut Document, entry: NodeId) -> EditResult<NodeId> {
    if entry == doc.root() {
        return Err(EditError::validation("cannot wrap the project root"));
    }
    let id = next_id(doc, &NodeKind::Playlist, PLAYLIST_ID_PREFIX)?;

    let root = doc.root();
    let anchor = doc.children_of_kind(root, &NodeKind::Producer).last();

    let playlist = doc.create_with_attrs(NodeKind::Playlist, &[("id", id.as_str())]);
    let copy = doc.deep_clone(entry);
    for node in doc.descendants(copy) {
        doc.remove_attr(node, "id");
    }
    doc.append_child(playlist, copy)?;
    match anchor {
        Some(producer) => doc.insert_after(producer, playlist)?,
        None => doc.prepend_child(root, playlist)?,
    }

    tracing::debug!(%id, "wrapped entry into playlist");
    Ok(playlist)
}

/// Append `playlist` as a new last track of `multitrack`, cross-faded into the previous one.
///
/// The playlist is padded with a leading blank so that it starts `opts.overlap` before the
/// current end of the multitrack (a stale leading blank is replaced), and a transition with
/// `opts.service` spanning the overlap is added to the owning tractor between the two last
/// tracks. Returns the transition.
///
/// Every check runs before the first edit, so on error the document is unchanged.
#[tracing::instrument(skip(doc))]
pub fn attach_playlist_to_multitrack(
    doc: &mut Document,
    multitrack: NodeId,
    playlist: NodeId,
    opts: &AttachOpts,
) -> EditResult<NodeId> {
    if doc.kind(multitrack) != &NodeKind::Multitrack {
        return Err(EditError::validation(format!(
            "expected <multitrack>, got <{}>",
            doc.kind(multitrack).tag()
        )));
    }
    let tractor = doc
        .parent(multitrack)
        .filter(|t| doc.kind(*t) == &NodeKind::Tractor)
        .ok_or_else(|| EditError::validation("multitrack is not inside a tractor"))?;
    if doc.kind(playlist) != &NodeKind::Playlist {
        return Err(EditError::validation(format!(
            "expected <playlist>, got <{}>",
            doc.kind(playlist).tag()
        )));
    }
    let playlist_id = doc
        .node(playlist)
        .id()
        .filter(|id| doc.find(id) == Some(playlist))
        .map(str::to_string)
        .ok_or_else(|| EditError::validation("playlist must be attached and have an id"))?;
    if doc.children_of_kind(multitrack, &NodeKind::Track).next().is_none() {
        return Err(EditError::validation(
            "multitrack has no track to transition from",
        ));
    }
    if opts.service.trim().is_empty() {
        return Err(EditError::validation("transition service must be non-empty"));
    }

    let current = compute_duration(doc, multitrack)?.elapsed;
    let gap = current
        .checked_sub(opts.overlap)
        .ok_or(EditError::InvalidRange {
            in_point: opts.overlap,
            out_point: current,
        })?;
    tracing::debug!(%current, %gap, "computed alignment gap");

    let leading = playlist_items(doc, playlist).next();
    if let Some(first) = leading
        && doc.kind(first) == &NodeKind::Blank
    {
        tracing::debug!(playlist = %playlist_id, "replacing stale leading blank");
        doc.detach(first)?;
    }
    let gap_text = gap.to_string();
    let blank = doc.create_with_attrs(NodeKind::Blank, &[("length", gap_text.as_str())]);
    let leading = playlist_items(doc, playlist).next();
    match leading {
        Some(first) => doc.insert_before(first, blank)?,
        None => doc.append_child(playlist, blank)?,
    }

    let track = doc.create_with_attrs(NodeKind::Track, &[("producer", playlist_id.as_str())]);
    doc.append_child(multitrack, track)?;
    let b_track = positional_index(doc, track);
    let a_track = b_track - 1;

    let (out_text, a_text, b_text) = (
        (gap + opts.overlap).to_string(),
        a_track.to_string(),
        b_track.to_string(),
    );
    let transition = doc.create_with_attrs(
        NodeKind::Transition,
        &[
            ("mlt_service", opts.service.as_str()),
            ("in", gap_text.as_str()),
            ("out", out_text.as_str()),
            ("a_track", a_text.as_str()),
            ("b_track", b_text.as_str()),
        ],
    );
    doc.append_child(tractor, transition)?;

    tracing::debug!(a_track, b_track, service = %opts.service, "attached playlist as new track");
    Ok(transition)
}

/// Create an empty `tractor<N>` (with its multitrack) right before the `videotrack0` sentinel.
///
/// `N` is the number of `tractor<digits>` ids already in the document.
#[tracing::instrument(skip(doc))]
pub fn create_tractor(doc: &mut Document) -> EditResult<NodeId> {
    let sentinel = doc
        .find(SENTINEL_TRACK_ID)
        .ok_or_else(|| EditError::MissingSentinel(SENTINEL_TRACK_ID.to_string()))?;
    if doc.parent(sentinel).is_none() {
        return Err(EditError::validation("sentinel must not be the project root"));
    }
    let id = next_id(doc, &NodeKind::Tractor, TRACTOR_ID_PREFIX)?;

    let tractor = doc.create_with_attrs(NodeKind::Tractor, &[("id", id.as_str())]);
    let multitrack = doc.create(NodeKind::Multitrack);
    doc.append_child(tractor, multitrack)?;
    doc.insert_before(sentinel, tractor)?;

    tracing::debug!(%id, "created tractor");
    Ok(tractor)
}

/// Insert `track` so that it gets positional index `index` in `multitrack`.
///
/// Transition and filter references of the owning tractor at or above `index` move up by one.
#[tracing::instrument(skip(doc))]
pub fn insert_track_at(
    doc: &mut Document,
    multitrack: NodeId,
    track: NodeId,
    index: usize,
) -> EditResult<()> {
    if doc.kind(multitrack) != &NodeKind::Multitrack || doc.kind(track) != &NodeKind::Track {
        return Err(EditError::validation(
            "insert_track_at expects a <multitrack> and a <track>",
        ));
    }
    let tracks: Vec<NodeId> = doc
        .children_of_kind(multitrack, &NodeKind::Track)
        .collect();
    let at = match tracks.get(index) {
        Some(existing) => doc
            .child_position(*existing)
            .ok_or_else(|| EditError::validation("track missing from its multitrack"))?,
        None if index == tracks.len() => match tracks.last() {
            Some(last) => {
                doc.child_position(*last)
                    .ok_or_else(|| EditError::validation("track missing from its multitrack"))?
                    + 1
            }
            None => doc.children(multitrack).len(),
        },
        None => {
            return Err(EditError::validation(format!(
                "track index {index} out of bounds ({} tracks)",
                tracks.len()
            )));
        }
    };

    doc.insert_child(multitrack, at, track)?;
    if let Some(tractor) = owning_tractor(doc, track) {
        shift_track_references(doc, tractor, index, 1)?;
    }
    Ok(())
}

/// Remove an unreferenced `track` from its multitrack.
///
/// References to later tracks move down by one. A track still addressed by a transition or
/// filter is not removed.
#[tracing::instrument(skip(doc))]
pub fn remove_track(doc: &mut Document, track: NodeId) -> EditResult<()> {
    if doc.kind(track) != &NodeKind::Track {
        return Err(EditError::validation(format!(
            "expected <track>, got <{}>",
            doc.kind(track).tag()
        )));
    }
    let index = positional_index(doc, track);
    if is_referenced(doc, track) {
        return Err(EditError::validation(format!(
            "track {index} is still referenced by a transition or filter"
        )));
    }
    let tractor = owning_tractor(doc, track);

    doc.detach(track)?;
    if let Some(tractor) = tractor {
        shift_track_references(doc, tractor, index + 1, -1)?;
    }
    Ok(())
}

fn next_id(doc: &Document, kind: &NodeKind, prefix: &str) -> EditResult<String> {
    let id = format!("{prefix}{}", doc.count_ids_with_prefix(kind, prefix));
    if doc.find(&id).is_some() {
        return Err(EditError::DuplicateId(id));
    }
    Ok(id)
}

#[cfg(test)]
#[path = "../../tests/unit/timeline/mutate.rs"]
mod tests;
