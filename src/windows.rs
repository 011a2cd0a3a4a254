use std::{borrow::Cow, fmt, str::FromStr, sync::Arc};

use nom::{
    bytes::complete::{take_till, take_till1},
    character::complete::{anychar, char, satisfy},
    combinator::{opt, peek},
    error::context,
    sequence::{pair, preceded, terminated},
    IResult, Parser,
};

#[cfg(feature = "url")]
use ::url::Url;

#[cfg(feature = "url")]
use crate::url::{windows_to_file_url, PathToUrlError};
use crate::{
    normalize::{self, Body, RootForm},
    stack::SegmentStack,
    InvariantViolation, PathAlgebra, PathError,
};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Prefix<'a> {
    /// `C:`
    Disk { drive: char },
    /// `\\server`, `\\server\` or `\\server\share`.
    UNC {
        server: &'a str,
        share: Option<&'a str>,
    },
}

pub fn is_windows_sep(c: char) -> bool {
    c == '\\' || c == '/'
}

fn separator(input: &str) -> IResult<&str, char> {
    satisfy(is_windows_sep).parse(input)
}

pub fn parse_drive(path: &str) -> IResult<&str, char> {
    context(
        "drive",
        terminated(satisfy(|c: char| c.is_ascii_alphabetic()), char(':')),
    )
    .parse(path)
    .map(|(path, drive)| (path, drive.to_ascii_uppercase()))
}

fn looks_like_drive(path: &str) -> bool {
    peek(preceded(anychar::<&str, nom::error::Error<&str>>, char(':')))
        .parse(path)
        .is_ok()
}

fn looks_like_unc(path: &str) -> bool {
    peek((separator, separator)).parse(path).is_ok()
}

pub fn parse_unc(path: &str) -> IResult<&str, Prefix<'_>> {
    context(
        "unc",
        preceded(
            (separator, separator),
            pair(
                take_till1(is_windows_sep),
                opt(preceded(separator, take_till(is_windows_sep))),
            ),
        ),
    )
    .parse(path)
    .map(|(path, (server, share))| (path, Prefix::UNC { server, share }))
}

/// Splits the drive or UNC authority off the front of `path`.
///
/// Text that looks like either (a second character of `:`, or two leading separators)
/// but doesn't parse is an error rather than a relative path.
pub fn parse_windows_path_prefix(path: &str) -> Result<(&str, Option<Prefix<'_>>), PathError> {
    if looks_like_drive(path) {
        return match parse_drive(path) {
            Ok((rest, drive)) => Ok((rest, Some(Prefix::Disk { drive }))),
            Err(_) => Err(PathError::InvalidDriveLetter {
                path: Cow::Owned(path.to_owned()),
            }),
        };
    }
    if looks_like_unc(path) {
        return match parse_unc(path) {
            // `\\server\\share`: an empty share followed by more path
            Ok((rest, Prefix::UNC { share: Some(""), .. })) if !rest.is_empty() => {
                Err(PathError::InvalidUncAuthority {
                    path: Cow::Owned(path.to_owned()),
                })
            }
            Ok((rest, prefix)) => Ok((rest, Some(prefix))),
            Err(_) => Err(PathError::InvalidUncAuthority {
                path: Cow::Owned(path.to_owned()),
            }),
        };
    }
    Ok((path, None))
}

/// Case-insensitive comparison of segments and root volumes.
pub fn eq_ignore_case(a: &str, b: &str) -> bool {
    if a.is_ascii() && b.is_ascii() {
        return a.eq_ignore_ascii_case(b);
    }
    a.chars()
        .flat_map(char::to_uppercase)
        .eq(b.chars().flat_map(char::to_uppercase))
}

/// How [`WindowsPath::relative_to_with`] compares segments. Root volumes are always
/// compared without regard to case.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum CaseSensitivity {
    Sensitive,
    #[default]
    Insensitive,
}

impl CaseSensitivity {
    fn eq(self, a: &str, b: &str) -> bool {
        match self {
            CaseSensitivity::Sensitive => a == b,
            CaseSensitivity::Insensitive => eq_ignore_case(a, b),
        }
    }
}

const DRIVES: [&str; 26] = [
    "A:", "B:", "C:", "D:", "E:", "F:", "G:", "H:", "I:", "J:", "K:", "L:", "M:", "N:", "O:",
    "P:", "Q:", "R:", "S:", "T:", "U:", "V:", "W:", "X:", "Y:", "Z:",
];

#[derive(Debug, Clone, PartialEq, Eq, Hash, Default)]
enum Volume {
    #[default]
    None,
    Drive(&'static str),
    Unc(Arc<str>),
}

impl Volume {
    fn from_prefix(prefix: Option<Prefix<'_>>) -> Volume {
        match prefix {
            None => Volume::None,
            Some(Prefix::Disk { drive }) => Volume::Drive(DRIVES[(drive as u8 - b'A') as usize]),
            Some(Prefix::UNC { server, share }) => {
                let root = match share {
                    Some(share) => format!(r"\\{server}\{share}"),
                    None => format!(r"\\{server}"),
                };
                Volume::Unc(root.into())
            }
        }
    }

    fn as_str(&self) -> &str {
        match self {
            Volume::None => "",
            Volume::Drive(drive) => drive,
            Volume::Unc(root) => root,
        }
    }

    fn is_none(&self) -> bool {
        matches!(self, Volume::None)
    }

    /// The server of a UNC authority that has no share yet: `\\server` or `\\server\`.
    fn shareless_server(&self) -> Option<&str> {
        let Volume::Unc(root) = self else {
            return None;
        };
        let authority = root.strip_prefix(r"\\")?;
        match authority.split_once('\\') {
            None => Some(authority),
            Some((server, "")) => Some(server),
            Some(_) => None,
        }
    }

    fn root_form(&self) -> RootForm {
        match self {
            Volume::Unc(_) => RootForm::Empty,
            _ => RootForm::Marker,
        }
    }
}

/// A normalized Windows path.
///
/// The segments are everything to the right of the root volume and of the separator
/// that pins it. A trailing separator is kept as a final empty segment.
///
/// | Text            | Root volume | Pinned | DOS | UNC | Segments   |
/// |-----------------|-------------|--------|-----|-----|------------|
/// | `""`            | `""`        | no     | no  | no  | none       |
/// | `\`             | `""`        | yes    | no  | no  | `""`       |
/// | `C:`            | `C:`        | no     | yes | no  | none       |
/// | `C:\`           | `C:`        | yes    | yes | no  | `""`       |
/// | `C:foo`         | `C:`        | no     | yes | no  | `foo`      |
/// | `C:\foo\`       | `C:`        | yes    | yes | no  | `foo`, `""`|
/// | `\\srv`         | `\\srv`     | yes    | no  | yes | none       |
/// | `\\srv\s`       | `\\srv\s`   | yes    | no  | yes | none       |
/// | `\\srv\s\`      | `\\srv\s`   | yes    | no  | yes | `""`       |
/// | `\\srv\s\foo`   | `\\srv\s`   | yes    | no  | yes | `foo`      |
///
/// A drive letter on its own refers to the current directory of that drive, so `C:` is
/// not pinned. A UNC authority always is.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Default)]
pub struct WindowsPath {
    volume: Volume,
    pinned: bool,
    body: Body,
}

impl WindowsPath {
    /// Parses and normalizes `path`. Both `\` and `/` are separators.
    ///
    /// Fails on a drive that is not a letter (`ü:\`), a malformed UNC authority
    /// (`\\server\\share`), a `:` inside a segment, or a `..` climbing above the root
    /// (`C:\..`).
    pub fn new(path: &str) -> Result<WindowsPath, PathError> {
        let path = path.trim();

        let mut chars = path.chars();
        match (chars.next(), chars.next()) {
            (None, _) => return Ok(WindowsPath::default()),
            (Some(c), None) if is_windows_sep(c) => {
                return Ok(WindowsPath::from_parts(Volume::None, true, Body::ROOT));
            }
            (Some('.'), None) => return Ok(WindowsPath::default()),
            (Some(':'), None) => {
                return Err(PathError::InvalidSegment {
                    path: Cow::Owned(path.to_owned()),
                    segment: Cow::Owned(path.to_owned()),
                });
            }
            (Some(_), None) => {
                let body = Body::from_stack(SegmentStack::single(path), 0, false);
                return Ok(WindowsPath::from_parts(Volume::None, false, body));
            }
            _ => {}
        }

        let (rest, prefix) = parse_windows_path_prefix(path).inspect_err(|err| {
            log::trace!("rejecting {path:?}: {err}");
        })?;
        let volume = Volume::from_prefix(prefix);
        let mut pinned = matches!(volume, Volume::Unc(_));

        if rest.is_empty() {
            return Ok(WindowsPath::from_parts(volume, pinned, Body::EMPTY));
        }

        let rest = match rest.strip_prefix(is_windows_sep) {
            Some("") => return Ok(WindowsPath::from_parts(volume, true, Body::ROOT)),
            Some(rest) => {
                pinned = true;
                rest
            }
            None => rest,
        };

        let nodes = normalize::split(rest, is_windows_sep);
        if let Some(segment) = nodes.iter().find(|node| node.contains(':')) {
            return Err(PathError::InvalidSegment {
                path: Cow::Owned(path.to_owned()),
                segment: Cow::Owned(segment.clone()),
            });
        }

        match normalize::normalize(nodes, pinned, volume.root_form()) {
            Some(body) => Ok(WindowsPath::from_parts(volume, pinned, body)),
            None => Err(PathError::EscapesPinnedRoot {
                path: Cow::Owned(path.to_owned()),
            }),
        }
    }

    fn from_parts(volume: Volume, pinned: bool, body: Body) -> WindowsPath {
        WindowsPath {
            volume,
            pinned,
            body,
        }
    }

    /// A path built by appending. Below a UNC server without a share the first segment
    /// becomes the share, as it does when the printed text is parsed again.
    fn settled(volume: Volume, pinned: bool, body: Body) -> WindowsPath {
        if let Some(server) = volume.shareless_server() {
            if let [share, rest @ ..] = body.stack.as_slice() {
                let volume = Volume::Unc(format!(r"\\{server}\{share}").into());
                let body = Body::new(rest.to_vec(), 0, true);
                return WindowsPath::from_parts(volume, pinned, body);
            }
        }
        WindowsPath::from_parts(volume, pinned, body)
    }

    /// True if the root volume is a drive letter.
    pub fn is_dos(&self) -> bool {
        matches!(self.volume, Volume::Drive(_))
    }

    /// True if the root volume is a UNC authority.
    pub fn is_unc(&self) -> bool {
        matches!(self.volume, Volume::Unc(_))
    }

    pub fn segments(&self) -> impl Iterator<Item = &str> + '_ {
        self.body.stack.iter().map(String::as_str)
    }

    pub fn leading_parents(&self) -> usize {
        self.body.parents
    }

    /// As [`PathAlgebra::relative_to`], comparing segments as `case` says.
    pub fn relative_to_with(&self, base: &WindowsPath, case: CaseSensitivity) -> WindowsPath {
        self.try_relative_to_with(base, case).unwrap_or_else(|| {
            log::debug!("no relative path from {base} to {self}");
            self.clone()
        })
    }

    pub fn try_relative_to_with(
        &self,
        base: &WindowsPath,
        case: CaseSensitivity,
    ) -> Option<WindowsPath> {
        if !eq_ignore_case(self.volume.as_str(), base.volume.as_str()) {
            return None;
        }
        if self.pinned != base.pinned {
            return None;
        }
        let body = normalize::relative(&self.body, &base.body, |a, b| case.eq(a, b));
        Some(WindowsPath::from_parts(Volume::None, false, body))
    }

    #[cfg(feature = "url")]
    pub fn to_file_url(&self) -> Result<Url, PathToUrlError> {
        windows_to_file_url(self)
    }
}

impl PathAlgebra for WindowsPath {
    fn parse(path: &str) -> Result<Self, PathError> {
        WindowsPath::new(path)
    }

    fn root_volume(&self) -> &str {
        self.volume.as_str()
    }

    fn is_pinned(&self) -> bool {
        self.pinned
    }

    fn is_empty(&self) -> bool {
        self.volume.is_none() && self.body.stack.is_empty()
    }

    /// Appends `path` to `self`.
    ///
    /// - An empty `path` gives `self`, and an empty `self` gives `path`.
    /// - A pinned `path` with its own root volume replaces `self`. A pinned `path`
    ///   without one (`\foo`) is rooted on the volume of `self`, if any.
    /// - Otherwise the segments are joined, cancelling `..` at the front of `path`. Both
    ///   may carry a root volume only if it's the same one.
    fn append(&self, path: &Self) -> Result<Self, PathError> {
        if path.is_empty() {
            return Ok(self.clone());
        }
        if self.is_empty() {
            return Ok(path.clone());
        }
        if path.pinned && (!path.volume.is_none() || self.volume.is_none()) {
            return Ok(path.clone());
        }

        if !self.volume.is_none()
            && !path.pinned
            && !path.volume.is_none()
            && !eq_ignore_case(self.volume.as_str(), path.volume.as_str())
        {
            return Err(PathError::MismatchedRootVolume {
                left: Cow::Owned(self.to_string()),
                right: Cow::Owned(path.to_string()),
            });
        }

        let volume = if self.volume.is_none() {
            path.volume.clone()
        } else {
            self.volume.clone()
        };
        let pinned = self.pinned || path.pinned;

        if path.pinned {
            return Ok(WindowsPath::settled(volume, pinned, path.body.clone()));
        }

        let form = volume.root_form();
        match normalize::join(&self.body, &path.body, self.pinned, form) {
            Some(body) => Ok(WindowsPath::settled(volume, pinned, body)),
            None => Err(PathError::EscapesPinnedRoot {
                path: Cow::Owned(format!("{self} + {path}")),
            }),
        }
    }

    fn relative_to(&self, base: &Self) -> Self {
        self.relative_to_with(base, CaseSensitivity::Insensitive)
    }

    fn try_relative_to(&self, base: &Self) -> Option<Self> {
        self.try_relative_to_with(base, CaseSensitivity::Insensitive)
    }

    fn parent(&self) -> Self {
        match normalize::parent(&self.body, self.pinned, self.volume.root_form()) {
            Some(body) => WindowsPath::from_parts(self.volume.clone(), self.pinned, body),
            None => self.clone(),
        }
    }

    fn trim(&self) -> Self {
        if self.is_trimmed() {
            return self.clone();
        }
        let stack = SegmentStack::trimmed(&self.body.stack);
        let body = Body::from_stack(stack, self.body.parents, self.pinned);
        WindowsPath::from_parts(self.volume.clone(), self.pinned, body)
    }

    fn is_trimmed(&self) -> bool {
        let stack = &self.body.stack;
        stack.is_empty()
            || (self.pinned && !self.is_unc() && stack.len() == 1)
            || !stack.has_trailing_marker()
    }

    fn check_invariants(&self) -> Result<(), InvariantViolation> {
        if self.is_unc() && !self.pinned {
            return Err(InvariantViolation::UncNotPinned);
        }
        if self.volume.shareless_server().is_some() && !self.body.stack.is_empty() {
            return Err(InvariantViolation::UncShareMissing);
        }
        normalize::check(&self.body, self.pinned)
    }
}

impl fmt::Display for WindowsPath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.volume.as_str())?;
        if self.body.stack.is_empty() {
            return Ok(());
        }
        if self.pinned {
            f.write_str(r"\")?;
        }
        for (i, node) in self.segments().enumerate() {
            if i > 0 {
                f.write_str(r"\")?;
            }
            f.write_str(node)?;
        }
        Ok(())
    }
}

impl FromStr for WindowsPath {
    type Err = PathError;

    fn from_str(s: &str) -> Result<WindowsPath, PathError> {
        WindowsPath::new(s)
    }
}

impl TryFrom<&str> for WindowsPath {
    type Error = PathError;

    fn try_from(s: &str) -> Result<WindowsPath, PathError> {
        WindowsPath::new(s)
    }
}
