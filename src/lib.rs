//! mltedit is a structural editor for MLT edit-decision documents.
//!
//! A project is an XML tree of tractors, multitracks, tracks, playlists, entries, producers,
//! transitions, filters and blanks. This crate loads that tree into an arena ([`Document`]),
//! answers timing and indexing queries over it, and applies the structural edits a timeline
//! UI needs while keeping ids, track order and track references consistent.
//!
//! # Pieces
//!
//! 1. **Document model**: [`Document`] with id-indexed lookup and XML load/save.
//! 2. **Durations**: [`compute_duration`] walks nested tractors and playlists and returns
//!    `{in, out, elapsed}` as [`Timecode`]s.
//! 3. **Indexing**: [`logical_item_at`], [`positional_index`], [`is_referenced`]. A track's
//!    index is its position among its siblings; transitions and filters refer to it by value.
//! 4. **Edits**: [`wrap_as_playlist`], [`attach_playlist_to_multitrack`], [`create_tractor`],
//!    [`insert_track_at`], [`remove_track`].
//! 5. **Persistence**: [`ProjectStore`] writes `<root>/<project>/project.mlt`.
//!
//! A [`Document`] assumes exclusive, single-threaded access. Services that share one across
//! sessions must serialize access to it themselves.
#![forbid(unsafe_code)]
#![deny(missing_docs)]

mod document;
mod foundation;
mod persist;
mod timeline;

pub use document::node::{Node, NodeId, NodeKind};
pub use document::tree::Document;
pub use foundation::error::{EditError, EditResult};
pub use foundation::timecode::Timecode;
pub use persist::store::{PROJECT_FILE_NAME, ProjectStore, ProjectStoreOpts, ensure_parent_dir};
pub use timeline::duration::{NodeDuration, compute_duration};
pub use timeline::mutate::{
    AttachOpts, PLAYLIST_ID_PREFIX, SENTINEL_TRACK_ID, TRACTOR_ID_PREFIX,
    attach_playlist_to_multitrack, create_tractor, insert_track_at, remove_track,
    wrap_as_playlist,
};
pub use timeline::traversal::{
    SIMPLE_PRODUCER_PREFIX, TRACK_REF_ATTRS, is_referenced, logical_item_at, positional_index,
    shift_track_references,
};
