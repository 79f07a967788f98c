/// Index of a node inside a [`crate::Document`] arena.
///
/// Ids stay valid for the lifetime of the document; detached nodes keep their slot.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct NodeId(pub(crate) usize);

impl NodeId {
    /// Raw arena slot.
    pub fn index(self) -> usize {
        self.0
    }
}

/// Element kind of a document node.
///
/// The kind is fixed at creation from the element name. Elements outside the edit-decision
/// schema are kept as [`NodeKind::Other`] so they survive a load/save round trip.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub enum NodeKind {
    /// `<mlt>` project root.
    Mlt,
    /// `<tractor>` composable timeline.
    Tractor,
    /// `<multitrack>` ordered track list.
    Multitrack,
    /// `<track>` reference to a playlist or tractor.
    Track,
    /// `<playlist>` ordered entries and blanks.
    Playlist,
    /// `<entry>` trimmed producer reference.
    Entry,
    /// `<producer>` media resource.
    Producer,
    /// `<property name="..">value</property>`.
    Property,
    /// `<transition>` between two track indices.
    Transition,
    /// `<filter>` on one track index.
    Filter,
    /// `<blank>` timed gap.
    Blank,
    /// Any other element, by tag name.
    Other(String),
}

impl NodeKind {
    /// Map an element name to its kind.
    pub fn from_tag(tag: &str) -> Self {
        match tag {
            "mlt" => Self::Mlt,
            "tractor" => Self::Tractor,
            "multitrack" => Self::Multitrack,
            "track" => Self::Track,
            "playlist" => Self::Playlist,
            "entry" => Self::Entry,
            "producer" => Self::Producer,
            "property" => Self::Property,
            "transition" => Self::Transition,
            "filter" => Self::Filter,
            "blank" => Self::Blank,
            other => Self::Other(other.to_string()),
        }
    }

    /// Element name used when serializing.
    pub fn tag(&self) -> &str {
        match self {
            Self::Mlt => "mlt",
            Self::Tractor => "tractor",
            Self::Multitrack => "multitrack",
            Self::Track => "track",
            Self::Playlist => "playlist",
            Self::Entry => "entry",
            Self::Producer => "producer",
            Self::Property => "property",
            Self::Transition => "transition",
            Self::Filter => "filter",
            Self::Blank => "blank",
            Self::Other(tag) => tag,
        }
    }

    /// `true` for transitions and filters, the nodes that address tracks by index.
    pub fn addresses_tracks(&self) -> bool {
        matches!(self, Self::Transition | Self::Filter)
    }
}

/// One element of the document tree.
#[derive(Clone, Debug)]
pub struct Node {
    pub(crate) kind: NodeKind,
    pub(crate) attrs: Vec<(String, String)>, // document order
    pub(crate) text: Option<String>,
    pub(crate) parent: Option<NodeId>,
    pub(crate) children: Vec<NodeId>,
}

impl Node {
    pub(crate) fn new(kind: NodeKind) -> Self {
        Self {
            kind,
            attrs: Vec::new(),
            text: None,
            parent: None,
            children: Vec::new(),
        }
    }

    /// Element kind.
    pub fn kind(&self) -> &NodeKind {
        &self.kind
    }

    /// Attribute value by name.
    pub fn attr(&self, name: &str) -> Option<&str> {
        self.attrs
            .iter()
            .find(|(k, _)| k == name)
            .map(|(_, v)| v.as_str())
    }

    /// Attributes in document order.
    pub fn attrs(&self) -> impl Iterator<Item = (&str, &str)> {
        self.attrs.iter().map(|(k, v)| (k.as_str(), v.as_str()))
    }

    /// The `id` attribute, if any.
    pub fn id(&self) -> Option<&str> {
        self.attr("id")
    }

    /// Character data (used by `<property>`).
    pub fn text(&self) -> Option<&str> {
        self.text.as_deref()
    }

    /// Parent node, `None` for the root and detached nodes.
    pub fn parent(&self) -> Option<NodeId> {
        self.parent
    }

    /// Ordered children.
    pub fn children(&self) -> &[NodeId] {
        &self.children
    }
}
