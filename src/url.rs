use std::borrow::Cow;

use ::url::{Host, Url};
use percent_encoding::{percent_encode, AsciiSet, CONTROLS};

use crate::{PathAlgebra, PosixPath, WindowsPath};

const URL_FRAGMENT: &AsciiSet = &CONTROLS.add(b' ').add(b'"').add(b'<').add(b'>').add(b'`');
const URL_PATH: &AsciiSet = &URL_FRAGMENT.add(b'#').add(b'?').add(b'{').add(b'}');
// `\` is a separator in special URLs, so a POSIX segment holding one must be escaped.
const URL_PATH_SEGMENT: &AsciiSet = &URL_PATH.add(b'/').add(b'%').add(b'\\');

#[derive(thiserror::Error, Debug)]
pub enum PathToUrlError {
    #[error(transparent)]
    UrlParseError(#[from] ::url::ParseError),
    #[error("PathNotAbsoluteError {{ path = {path} }}")]
    PathNotAbsoluteError { path: Cow<'static, str> },
    #[error("NotSupportedPrefixError {{ path = {path}, prefix = {prefix} }}")]
    NotSupportedPrefixError {
        path: Cow<'static, str>,
        prefix: Cow<'static, str>,
    },
}

fn push_segments<'a>(serialization: &mut String, segments: impl Iterator<Item = &'a str>) {
    for segment in segments {
        serialization.push('/');
        serialization.extend(percent_encode(segment.as_bytes(), URL_PATH_SEGMENT));
    }
}

fn not_absolute(path: &impl PathAlgebra) -> PathToUrlError {
    PathToUrlError::PathNotAbsoluteError {
        path: Cow::Owned(path.to_string()),
    }
}

/// `/a/b` becomes `file:///a/b`.
pub(crate) fn posix_to_file_url(path: &PosixPath) -> Result<Url, PathToUrlError> {
    if !path.is_pinned() {
        return Err(not_absolute(path));
    }
    let mut serialization = "file://".to_owned();
    push_segments(&mut serialization, path.segments());
    Ok(Url::parse(&serialization)?)
}

/// `C:\a` becomes `file:///C:/a` and `\\server\share\a` becomes `file://server/share/a`.
///
/// Device namespaces (`\\?\`, `\\.\`) have no file URL.
pub(crate) fn windows_to_file_url(path: &WindowsPath) -> Result<Url, PathToUrlError> {
    if !path.is_pinned() {
        return Err(not_absolute(path));
    }
    let mut serialization = "file://".to_owned();

    if path.is_dos() {
        serialization.push('/');
        serialization.push_str(path.root_volume());
    } else if path.is_unc() {
        let authority = path.root_volume().trim_start_matches('\\');
        let (server, share) = authority.split_once('\\').unwrap_or((authority, ""));
        if server == "?" || server == "." {
            return Err(PathToUrlError::NotSupportedPrefixError {
                path: Cow::Owned(path.to_string()),
                prefix: Cow::Owned(path.root_volume().to_owned()),
            });
        }
        let host = Host::parse(server)?;
        serialization.push_str(&host.to_string());
        if !share.is_empty() {
            serialization.push('/');
            serialization.extend(percent_encode(share.as_bytes(), URL_PATH_SEGMENT));
        }
    }

    push_segments(&mut serialization, path.segments());
    Ok(Url::parse(&serialization)?)
}
