use std::{ops::Index, slice, sync::Arc};

static ROOT: [String; 1] = [String::new()];

/// The normalized components of a path, to the right of any root volume.
///
/// The stack does not validate its content. Callers are expected to hand it lists that
/// were already normalized; a list handed over is owned by the stack from then on.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Default)]
pub(crate) enum SegmentStack {
    /// No component text at all.
    #[default]
    Empty,
    /// A single empty element: the bare root of a pinned path.
    Root,
    /// Any other non-empty list.
    Nodes(Arc<[String]>),
}

impl SegmentStack {
    pub fn from_vec(nodes: Vec<String>) -> SegmentStack {
        match nodes.as_slice() {
            [] => SegmentStack::Empty,
            [only] if only.is_empty() => SegmentStack::Root,
            _ => SegmentStack::Nodes(nodes.into()),
        }
    }

    pub fn single(node: &str) -> SegmentStack {
        SegmentStack::from_vec(vec![node.to_owned()])
    }

    /// A copy of `other` with its last element dropped.
    pub fn trimmed(other: &SegmentStack) -> SegmentStack {
        match other.as_slice() {
            [] | [_] => SegmentStack::Empty,
            [init @ .., _] => SegmentStack::from_vec(init.to_vec()),
        }
    }

    #[inline]
    pub fn as_slice(&self) -> &[String] {
        match self {
            SegmentStack::Empty => &[],
            SegmentStack::Root => &ROOT,
            SegmentStack::Nodes(nodes) => nodes,
        }
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.as_slice().len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        matches!(self, SegmentStack::Empty)
    }

    #[inline]
    pub fn is_root(&self) -> bool {
        matches!(self, SegmentStack::Root)
    }

    pub fn iter(&self) -> slice::Iter<'_, String> {
        self.as_slice().iter()
    }

    /// True if the last element is the trailing directory marker.
    pub fn has_trailing_marker(&self) -> bool {
        self.as_slice().last().is_some_and(String::is_empty)
    }

    /// Number of nodes, not counting a trailing directory marker.
    pub fn trimmed_len(&self) -> usize {
        if self.has_trailing_marker() {
            self.len() - 1
        } else {
            self.len()
        }
    }
}

impl Index<usize> for SegmentStack {
    type Output = str;

    #[inline]
    fn index(&self, index: usize) -> &str {
        &self.as_slice()[index]
    }
}
