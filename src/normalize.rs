//! The parts of parsing and of the path algebra that do not depend on the grammar.
//!
//! Both [`PosixPath`](crate::PosixPath) and [`WindowsPath`](crate::WindowsPath) keep
//! their components in a [`Body`]: a segment stack and the number of unresolved `..`
//! at its front. The functions here take and return bodies; the grammar-specific types
//! decide the root volume, the pinned flag and what an emptied pinned stack looks like.

use std::cmp;

use crate::{stack::SegmentStack, InvariantViolation};

pub(crate) const CUR_DIR: &str = ".";
pub(crate) const PARENT_DIR: &str = "..";

/// What a pinned stack collapses to when every node has been removed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum RootForm {
    /// The bare root marker, e.g. `/` or `C:\`.
    Marker,
    /// No nodes at all. UNC authorities are complete without a trailing separator.
    Empty,
}

impl RootForm {
    fn stack(self) -> SegmentStack {
        match self {
            RootForm::Marker => SegmentStack::Root,
            RootForm::Empty => SegmentStack::Empty,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Hash, Default)]
pub(crate) struct Body {
    pub stack: SegmentStack,
    pub parents: usize,
}

impl Body {
    pub const EMPTY: Body = Body {
        stack: SegmentStack::Empty,
        parents: 0,
    };

    pub const ROOT: Body = Body {
        stack: SegmentStack::Root,
        parents: 0,
    };

    /// Builds a body, folding a lone trailing marker of an unpinned path into the empty
    /// path. `./` and `foo/../` both mean "here", which is spelt as nothing.
    pub fn new(nodes: Vec<String>, parents: usize, pinned: bool) -> Body {
        Body::from_stack(SegmentStack::from_vec(nodes), parents, pinned)
    }

    pub fn from_stack(stack: SegmentStack, parents: usize, pinned: bool) -> Body {
        if !pinned && stack.is_root() {
            return Body::EMPTY;
        }
        Body { stack, parents }
    }

    pub fn root(form: RootForm) -> Body {
        Body {
            stack: form.stack(),
            parents: 0,
        }
    }
}

/// Splits `rest` on any separator. Runs of separators produce no empty nodes; a trailing
/// separator produces one empty node at the end.
pub(crate) fn split(rest: &str, is_sep: fn(char) -> bool) -> Vec<String> {
    let mut nodes = Vec::new();
    let mut start = 0;
    for (i, c) in rest.char_indices() {
        if is_sep(c) {
            if i > start {
                nodes.push(rest[start..i].to_owned());
            }
            start = i + c.len_utf8();
        }
    }
    if start < rest.len() {
        nodes.push(rest[start..].to_owned());
    } else {
        nodes.push(String::new());
    }
    nodes
}

/// Removes `.` nodes and resolves `..` against the node before it.
///
/// Returns `None` if a `..` would go above the root of a pinned path.
pub(crate) fn normalize(mut nodes: Vec<String>, pinned: bool, form: RootForm) -> Option<Body> {
    let mut i = 0;
    let mut watermark = 0;
    while i < nodes.len() {
        match nodes[i].as_str() {
            CUR_DIR => {
                if pinned && nodes.len() == 1 {
                    return Some(Body::ROOT);
                }
                nodes.remove(i);
            }
            PARENT_DIR if i == watermark => {
                if pinned {
                    return None;
                }
                watermark += 1;
                i += 1;
            }
            PARENT_DIR => {
                nodes.drain(i - 1..=i);
                i -= 1;
                if pinned && nodes.is_empty() {
                    return Some(Body::root(form));
                }
            }
            _ => i += 1,
        }
    }
    Some(Body::new(nodes, watermark, pinned))
}

/// Appends the unpinned `right` to `left`, cancelling trailing nodes of `left` against
/// leading `..` of `right`. `pinned` is the pinned flag of `left`, which the result
/// keeps.
///
/// Returns `None` if `right` climbs above the root of a pinned `left`.
pub(crate) fn join(left: &Body, right: &Body, pinned: bool, form: RootForm) -> Option<Body> {
    let lhs = left.stack.as_slice();
    let rhs = right.stack.as_slice();

    let mut left_count = lhs.len();
    if left.stack.has_trailing_marker() && !rhs.is_empty() {
        left_count -= 1;
    }

    if pinned {
        if right.parents > left_count {
            return None;
        }
        if left_count == right.parents && right.parents == rhs.len() {
            return Some(Body::root(form));
        }
    }

    let skip = cmp::min(left_count - left.parents, right.parents);
    let mut nodes = Vec::with_capacity(left_count - skip + rhs.len() - skip);
    nodes.extend_from_slice(&lhs[..left_count - skip]);
    nodes.extend_from_slice(&rhs[skip..]);
    let parents = left.parents + right.parents - skip;
    Some(Body::new(nodes, parents, pinned))
}

/// Moves one level up. Returns `None` when `body` is already at its root, i.e. it is its
/// own parent.
pub(crate) fn parent(body: &Body, pinned: bool, form: RootForm) -> Option<Body> {
    if pinned {
        match form {
            RootForm::Marker if body.stack.is_root() || body.stack.is_empty() => return None,
            RootForm::Empty if body.stack.is_empty() => return None,
            _ => {}
        }
    }

    let nodes = body.stack.as_slice();
    let count = body.stack.trimmed_len();

    if pinned {
        return Some(match count {
            0 => Body::EMPTY,
            1 => Body::root(form),
            _ => Body::new(nodes[..count - 1].to_vec(), 0, true),
        });
    }

    if count > body.parents {
        Some(Body::new(nodes[..count - 1].to_vec(), body.parents, false))
    } else {
        let mut up = Vec::with_capacity(count + 1);
        up.extend_from_slice(&nodes[..count]);
        up.push(PARENT_DIR.to_owned());
        Some(Body::new(up, body.parents + 1, false))
    }
}

/// The unpinned body that leads from `base` to `path`. Nodes are compared with `eq`.
pub(crate) fn relative(path: &Body, base: &Body, eq: impl Fn(&str, &str) -> bool) -> Body {
    let left_len = path.stack.trimmed_len();
    let right_len = base.stack.trimmed_len();

    // Nodes inside a leading run of `..` never match textually.
    let mut pos = cmp::min(path.parents, base.parents);
    while pos < left_len && pos < right_len && eq(&path.stack[pos], &base.stack[pos]) {
        pos += 1;
    }

    let up = right_len - pos;
    let mut nodes = Vec::with_capacity(up + left_len - pos);
    nodes.resize(up, PARENT_DIR.to_owned());
    nodes.extend_from_slice(&path.stack.as_slice()[pos..left_len]);
    let parents = leading_parents(&nodes);
    Body::new(nodes, parents, false)
}

/// Counts the contiguous `..` nodes at the front of `nodes`.
pub(crate) fn leading_parents(nodes: &[String]) -> usize {
    nodes.iter().take_while(|n| n.as_str() == PARENT_DIR).count()
}

/// Checks that the cached leading-parent count and the stack agree.
pub(crate) fn check(body: &Body, pinned: bool) -> Result<(), InvariantViolation> {
    let nodes = body.stack.as_slice();

    if pinned && body.parents != 0 {
        return Err(InvariantViolation::PinnedWithParents {
            parents: body.parents,
        });
    }
    if body.parents > nodes.len() {
        return Err(InvariantViolation::ParentsExceedLength {
            parents: body.parents,
            len: nodes.len(),
        });
    }
    if !pinned {
        let counted = leading_parents(nodes);
        if counted != body.parents {
            return Err(InvariantViolation::ParentsMismatch {
                cached: body.parents,
                counted,
            });
        }
        if body.stack.is_root() {
            return Err(InvariantViolation::UnpinnedRootMarker);
        }
    }
    if let Some(at) = nodes
        .iter()
        .take(nodes.len().saturating_sub(1))
        .position(String::is_empty)
    {
        return Err(InvariantViolation::InteriorEmptyNode { at });
    }
    Ok(())
}
