//! Platform-aware path algebra.
//!
//! A path is parsed once into a normalized stack of segments. Appending, taking the
//! parent, computing a relative path and trimming a trailing separator all work on that
//! representation and never touch the file system.
//!
//! Two grammars are provided: [`PosixPath`] and [`WindowsPath`] (DOS drives and UNC
//! authorities). [`to_path`] picks the grammar of the running platform.
//!
//! ```
//! use path_algebra::{PathAlgebra, WindowsPath};
//!
//! let base = WindowsPath::new(r"C:\A\B").unwrap();
//! let path = WindowsPath::new(r"C:\A\B\C").unwrap();
//! let rel = path.relative_to(&base);
//! assert_eq!(rel.to_string(), "C");
//! assert_eq!(base.append(&rel).unwrap().to_string(), r"C:\A\B\C");
//! ```

mod normalize;
mod posix;
#[cfg(test)]
mod proptests;
mod stack;
#[cfg(feature = "url")]
mod url;
pub mod windows;

use std::{borrow::Cow, fmt, str::FromStr};

#[cfg(feature = "url")]
use ::url::Url;

pub use posix::PosixPath;
#[cfg(feature = "url")]
pub use url::PathToUrlError;
pub use windows::{CaseSensitivity, WindowsPath};

#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
pub enum PathError {
    #[error("InvalidDriveLetterError {{ path = {path} }}")]
    InvalidDriveLetter { path: Cow<'static, str> },
    #[error("InvalidUncAuthorityError {{ path = {path} }}")]
    InvalidUncAuthority { path: Cow<'static, str> },
    #[error("InvalidSegmentError {{ path = {path}, segment = {segment} }}")]
    InvalidSegment {
        path: Cow<'static, str>,
        segment: Cow<'static, str>,
    },
    /// A `..` would climb above the root of a pinned path, while parsing or appending.
    #[error("EscapesPinnedRootError {{ path = {path} }}")]
    EscapesPinnedRoot { path: Cow<'static, str> },
    #[error("MismatchedRootVolumeError {{ left = {left}, right = {right} }}")]
    MismatchedRootVolume {
        left: Cow<'static, str>,
        right: Cow<'static, str>,
    },
    #[error("UnsupportedPlatformError")]
    UnsupportedPlatform,
}

/// A broken internal invariant, as reported by [`PathAlgebra::check_invariants`].
#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
pub enum InvariantViolation {
    #[error("pinned path caches {parents} leading parents")]
    PinnedWithParents { parents: usize },
    #[error("cached {cached} leading parents, counted {counted}")]
    ParentsMismatch { cached: usize, counted: usize },
    #[error("{parents} leading parents in a stack of {len}")]
    ParentsExceedLength { parents: usize, len: usize },
    #[error("unpinned path holds only a trailing separator")]
    UnpinnedRootMarker,
    #[error("empty segment at {at} is not the last one")]
    InteriorEmptyNode { at: usize },
    #[error("UNC path is not pinned")]
    UncNotPinned,
    #[error("UNC server without a share holds segments")]
    UncShareMissing,
}

/// Operations shared by every path grammar.
///
/// All operations return new values; `self` is never modified. Where an operation has
/// nothing to do it returns a clone of `self`, which is cheap as segment stacks are
/// shared.
pub trait PathAlgebra: Sized + Clone + fmt::Display {
    /// Parses `path` with the grammar of `Self`.
    fn parse(path: &str) -> Result<Self, PathError>;

    /// The drive (`C:`) or UNC authority (`\\server\share`), or `""`.
    fn root_volume(&self) -> &str;

    /// True if the path starts at a root and can't go above it.
    fn is_pinned(&self) -> bool;

    /// True if there is neither a root volume nor any segment.
    fn is_empty(&self) -> bool;

    fn append(&self, path: &Self) -> Result<Self, PathError>;

    fn append_str(&self, path: &str) -> Result<Self, PathError> {
        self.append(&Self::parse(path)?)
    }

    /// The path that, appended to `base`, leads to `self`.
    ///
    /// If there is no such path (one side pinned and the other not, or different root
    /// volumes) `self` is returned. Use [`try_relative_to`](Self::try_relative_to) to
    /// tell the cases apart.
    fn relative_to(&self, base: &Self) -> Self;

    fn relative_to_str(&self, base: &str) -> Result<Self, PathError> {
        Ok(self.relative_to(&Self::parse(base)?))
    }

    fn try_relative_to(&self, base: &Self) -> Option<Self>;

    /// One level up. A pinned root is its own parent; an unpinned path with nothing left
    /// to remove gains another `..`.
    fn parent(&self) -> Self;

    /// Removes a trailing separator.
    fn trim(&self) -> Self;

    fn is_trimmed(&self) -> bool;

    fn check_invariants(&self) -> Result<(), InvariantViolation>;
}

/// The path grammars known to this crate.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Platform {
    Posix,
    Windows,
}

impl Platform {
    /// The grammar of the platform this crate was compiled for.
    pub fn current() -> Option<Platform> {
        if cfg!(windows) {
            Some(Platform::Windows)
        } else if cfg!(unix) {
            Some(Platform::Posix)
        } else {
            None
        }
    }

    pub fn parse(self, path: &str) -> Result<Path, PathError> {
        match self {
            Platform::Posix => PosixPath::new(path).map(Path::Posix),
            Platform::Windows => WindowsPath::new(path).map(Path::Windows),
        }
    }
}

/// Parses `path` with the grammar of the running platform.
pub fn to_path(path: &str) -> Result<Path, PathError> {
    Platform::current()
        .ok_or(PathError::UnsupportedPlatform)?
        .parse(path)
}

/// A path of either grammar.
///
/// Operations between a POSIX and a Windows path have no meaning; they return the
/// receiver unchanged.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum Path {
    Posix(PosixPath),
    Windows(WindowsPath),
}

impl Path {
    pub fn new(path: &str) -> Result<Path, PathError> {
        to_path(path)
    }

    pub fn platform(&self) -> Platform {
        match self {
            Path::Posix(_) => Platform::Posix,
            Path::Windows(_) => Platform::Windows,
        }
    }

    pub fn as_posix(&self) -> Option<&PosixPath> {
        match self {
            Path::Posix(p) => Some(p),
            Path::Windows(_) => None,
        }
    }

    pub fn as_windows(&self) -> Option<&WindowsPath> {
        match self {
            Path::Windows(p) => Some(p),
            Path::Posix(_) => None,
        }
    }

    pub fn segments(&self) -> Box<dyn Iterator<Item = &str> + '_> {
        match self {
            Path::Posix(p) => Box::new(p.segments()),
            Path::Windows(p) => Box::new(p.segments()),
        }
    }

    #[cfg(feature = "url")]
    pub fn to_file_url(&self) -> Result<Url, PathToUrlError> {
        match self {
            Path::Posix(p) => p.to_file_url(),
            Path::Windows(p) => p.to_file_url(),
        }
    }

    fn mismatch(&self, op: &str, other: &Path) -> Path {
        log::debug!(
            "{op} between {:?} and {:?} paths, keeping {self}",
            self.platform(),
            other.platform()
        );
        self.clone()
    }
}

impl PathAlgebra for Path {
    fn parse(path: &str) -> Result<Self, PathError> {
        to_path(path)
    }

    fn root_volume(&self) -> &str {
        match self {
            Path::Posix(p) => p.root_volume(),
            Path::Windows(p) => p.root_volume(),
        }
    }

    fn is_pinned(&self) -> bool {
        match self {
            Path::Posix(p) => p.is_pinned(),
            Path::Windows(p) => p.is_pinned(),
        }
    }

    fn is_empty(&self) -> bool {
        match self {
            Path::Posix(p) => p.is_empty(),
            Path::Windows(p) => p.is_empty(),
        }
    }

    fn append(&self, path: &Self) -> Result<Self, PathError> {
        match (self, path) {
            (Path::Posix(a), Path::Posix(b)) => a.append(b).map(Path::Posix),
            (Path::Windows(a), Path::Windows(b)) => a.append(b).map(Path::Windows),
            _ => Ok(self.mismatch("append", path)),
        }
    }

    fn append_str(&self, path: &str) -> Result<Self, PathError> {
        match self {
            Path::Posix(p) => p.append_str(path).map(Path::Posix),
            Path::Windows(p) => p.append_str(path).map(Path::Windows),
        }
    }

    fn relative_to(&self, base: &Self) -> Self {
        match (self, base) {
            (Path::Posix(a), Path::Posix(b)) => Path::Posix(a.relative_to(b)),
            (Path::Windows(a), Path::Windows(b)) => Path::Windows(a.relative_to(b)),
            _ => self.mismatch("relative", base),
        }
    }

    fn relative_to_str(&self, base: &str) -> Result<Self, PathError> {
        match self {
            Path::Posix(p) => p.relative_to_str(base).map(Path::Posix),
            Path::Windows(p) => p.relative_to_str(base).map(Path::Windows),
        }
    }

    fn try_relative_to(&self, base: &Self) -> Option<Self> {
        match (self, base) {
            (Path::Posix(a), Path::Posix(b)) => a.try_relative_to(b).map(Path::Posix),
            (Path::Windows(a), Path::Windows(b)) => a.try_relative_to(b).map(Path::Windows),
            _ => None,
        }
    }

    fn parent(&self) -> Self {
        match self {
            Path::Posix(p) => Path::Posix(p.parent()),
            Path::Windows(p) => Path::Windows(p.parent()),
        }
    }

    fn trim(&self) -> Self {
        match self {
            Path::Posix(p) => Path::Posix(p.trim()),
            Path::Windows(p) => Path::Windows(p.trim()),
        }
    }

    fn is_trimmed(&self) -> bool {
        match self {
            Path::Posix(p) => p.is_trimmed(),
            Path::Windows(p) => p.is_trimmed(),
        }
    }

    fn check_invariants(&self) -> Result<(), InvariantViolation> {
        match self {
            Path::Posix(p) => p.check_invariants(),
            Path::Windows(p) => p.check_invariants(),
        }
    }
}

impl From<PosixPath> for Path {
    fn from(path: PosixPath) -> Path {
        Path::Posix(path)
    }
}

impl From<WindowsPath> for Path {
    fn from(path: WindowsPath) -> Path {
        Path::Windows(path)
    }
}

impl FromStr for Path {
    type Err = PathError;

    fn from_str(s: &str) -> Result<Path, PathError> {
        to_path(s)
    }
}

impl fmt::Display for Path {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Path::Posix(p) => fmt::Display::fmt(p, f),
            Path::Windows(p) => fmt::Display::fmt(p, f),
        }
    }
}
