use std::{borrow::Cow, fmt, str::FromStr};

#[cfg(feature = "url")]
use ::url::Url;

#[cfg(feature = "url")]
use crate::url::{posix_to_file_url, PathToUrlError};
use crate::{
    normalize::{self, Body, RootForm},
    stack::SegmentStack,
    InvariantViolation, PathAlgebra, PathError,
};

pub(crate) fn is_posix_sep(c: char) -> bool {
    c == '/'
}

/// A normalized POSIX path.
///
/// | Text         | Pinned | Segments          |
/// |--------------|--------|-------------------|
/// | `""`         | no     | none              |
/// | `/`          | yes    | `""`              |
/// | `foo`        | no     | `foo`             |
/// | `foo/`       | no     | `foo`, `""`       |
/// | `/foo/bar`   | yes    | `foo`, `bar`      |
/// | `../foo`     | no     | `..`, `foo`       |
#[derive(Debug, Clone, PartialEq, Eq, Hash, Default)]
pub struct PosixPath {
    pinned: bool,
    body: Body,
}

impl PosixPath {
    /// Parses and normalizes `path`.
    ///
    /// Fails if normalizing climbs above the root, as in `/..`.
    pub fn new(path: &str) -> Result<PosixPath, PathError> {
        let path = path.trim();

        let mut chars = path.chars();
        match (chars.next(), chars.next()) {
            (None, _) => return Ok(PosixPath::default()),
            (Some(c), None) if is_posix_sep(c) => {
                return Ok(PosixPath::from_parts(true, Body::ROOT));
            }
            (Some('.'), None) => return Ok(PosixPath::default()),
            (Some(_), None) => {
                let body = Body::from_stack(SegmentStack::single(path), 0, false);
                return Ok(PosixPath::from_parts(false, body));
            }
            _ => {}
        }

        let (pinned, rest) = match path.strip_prefix(is_posix_sep) {
            Some(rest) => (true, rest),
            None => (false, path),
        };

        let nodes = normalize::split(rest, is_posix_sep);
        match normalize::normalize(nodes, pinned, RootForm::Marker) {
            Some(body) => Ok(PosixPath::from_parts(pinned, body)),
            None => {
                log::trace!("rejecting {path:?}: climbs above the root");
                Err(PathError::EscapesPinnedRoot {
                    path: Cow::Owned(path.to_owned()),
                })
            }
        }
    }

    fn from_parts(pinned: bool, body: Body) -> PosixPath {
        PosixPath { pinned, body }
    }

    /// The normalized segments; the last one is empty if the path ends with `/`.
    pub fn segments(&self) -> impl Iterator<Item = &str> + '_ {
        self.body.stack.iter().map(String::as_str)
    }

    /// Number of unresolved `..` at the front of an unpinned path.
    pub fn leading_parents(&self) -> usize {
        self.body.parents
    }

    #[cfg(feature = "url")]
    pub fn to_file_url(&self) -> Result<Url, PathToUrlError> {
        posix_to_file_url(self)
    }
}

impl PathAlgebra for PosixPath {
    fn parse(path: &str) -> Result<Self, PathError> {
        PosixPath::new(path)
    }

    fn root_volume(&self) -> &str {
        ""
    }

    fn is_pinned(&self) -> bool {
        self.pinned
    }

    fn is_empty(&self) -> bool {
        self.body.stack.is_empty()
    }

    fn append(&self, path: &Self) -> Result<Self, PathError> {
        if path.is_empty() {
            return Ok(self.clone());
        }
        if self.is_empty() || path.pinned {
            return Ok(path.clone());
        }

        match normalize::join(&self.body, &path.body, self.pinned, RootForm::Marker) {
            Some(body) => Ok(PosixPath::from_parts(self.pinned, body)),
            None => Err(PathError::EscapesPinnedRoot {
                path: Cow::Owned(format!("{self} + {path}")),
            }),
        }
    }

    fn relative_to(&self, base: &Self) -> Self {
        self.try_relative_to(base).unwrap_or_else(|| {
            log::debug!("no relative path from {base} to {self}");
            self.clone()
        })
    }

    fn try_relative_to(&self, base: &Self) -> Option<Self> {
        if self.pinned != base.pinned {
            return None;
        }
        let body = normalize::relative(&self.body, &base.body, |a, b| a == b);
        Some(PosixPath::from_parts(false, body))
    }

    fn parent(&self) -> Self {
        match normalize::parent(&self.body, self.pinned, RootForm::Marker) {
            Some(body) => PosixPath::from_parts(self.pinned, body),
            None => self.clone(),
        }
    }

    fn trim(&self) -> Self {
        if self.is_trimmed() {
            return self.clone();
        }
        let stack = SegmentStack::trimmed(&self.body.stack);
        let body = Body::from_stack(stack, self.body.parents, self.pinned);
        PosixPath::from_parts(self.pinned, body)
    }

    fn is_trimmed(&self) -> bool {
        let stack = &self.body.stack;
        stack.is_empty() || (self.pinned && stack.len() == 1) || !stack.has_trailing_marker()
    }

    fn check_invariants(&self) -> Result<(), InvariantViolation> {
        normalize::check(&self.body, self.pinned)
    }
}

impl fmt::Display for PosixPath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.body.stack.is_empty() {
            return Ok(());
        }
        if self.pinned {
            f.write_str("/")?;
        }
        for (i, node) in self.segments().enumerate() {
            if i > 0 {
                f.write_str("/")?;
            }
            f.write_str(node)?;
        }
        Ok(())
    }
}

impl FromStr for PosixPath {
    type Err = PathError;

    fn from_str(s: &str) -> Result<PosixPath, PathError> {
        PosixPath::new(s)
    }
}

impl TryFrom<&str> for PosixPath {
    type Error = PathError;

    fn try_from(s: &str) -> Result<PosixPath, PathError> {
        PosixPath::new(s)
    }
}
