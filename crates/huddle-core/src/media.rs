//! Attached media element handles.
//!
//! When a track is attached, the SDK hands back an element that renders it.
//! The client never inspects the media itself; it only needs enough identity
//! to avoid attaching the same stream twice and to remove the element later.

use std::fmt;

use crate::participant::{TrackKind, TrackSource};

/// Identity of a rendered element.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ElementId(pub u64);

impl fmt::Display for ElementId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "el-{}", self.0)
    }
}

/// Identity of the underlying media stream an element renders.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct StreamId(pub String);

/// An element rendering one track.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MediaElement {
    /// Element identity.
    pub id: ElementId,
    /// Stream the element renders.
    pub stream: StreamId,
    /// Audio or video element.
    pub kind: TrackKind,
    /// Source of the rendered track.
    pub source: TrackSource,
    /// Horizontally flipped (local camera preview).
    pub mirrored: bool,
}

impl MediaElement {
    /// Element for `source` rendering `stream`.
    pub fn new(id: u64, stream: impl Into<String>, source: TrackSource) -> Self {
        Self {
            id: ElementId(id),
            stream: StreamId(stream.into()),
            kind: source.kind(),
            source,
            mirrored: false,
        }
    }

    /// Same element, flipped for local preview.
    #[must_use]
    pub fn mirrored(mut self) -> Self {
        self.mirrored = true;
        self
    }

    /// Whether `other` already renders the same media.
    ///
    /// Two elements are the same media if they are the same element, or if
    /// they are the same kind of element bound to the same stream.
    pub fn renders_same_media(&self, other: &Self) -> bool {
        self.id == other.id || (self.kind == other.kind && self.stream == other.stream)
    }
}
