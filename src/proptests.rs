//! Property-based tests for the path algebra.

use proptest::prelude::*;

use crate::{CaseSensitivity, PathAlgebra, PosixPath, WindowsPath};

// Strategy for a single segment, `.`, `..` and `:` included
fn segment_strategy() -> impl Strategy<Value = String> {
    prop_oneof![
        8 => "[a-z]{1,3}",
        2 => Just(".".to_string()),
        2 => Just("..".to_string()),
        1 => Just(":".to_string()),
    ]
}

// Strategy for a segment that normalizing leaves alone
fn plain_segment_strategy() -> impl Strategy<Value = String> {
    "[a-z]{1,3}"
}

fn join_text(
    root: &str,
    pinned: bool,
    segments: &[String],
    trailing: bool,
    sep: &str,
) -> String {
    let mut text = root.to_string();
    if pinned {
        text.push_str(sep);
    }
    text.push_str(&segments.join(sep));
    if trailing && !segments.is_empty() {
        text.push_str(sep);
    }
    text
}

fn posix_text(segment: impl Strategy<Value = String>) -> impl Strategy<Value = String> {
    (
        any::<bool>(),
        prop::collection::vec(segment, 0..6),
        any::<bool>(),
    )
        .prop_map(|(pinned, segments, trailing)| join_text("", pinned, &segments, trailing, "/"))
}

fn posix_strategy() -> impl Strategy<Value = PosixPath> {
    posix_text(segment_strategy()).prop_filter_map("climbs above the root", |text| {
        PosixPath::new(&text).ok()
    })
}

fn plain_posix_strategy() -> impl Strategy<Value = PosixPath> {
    posix_text(plain_segment_strategy())
        .prop_filter_map("unparsable", |text| PosixPath::new(&text).ok())
}

fn windows_root_strategy() -> impl Strategy<Value = &'static str> {
    prop::sample::select(vec![
        "",
        "",
        "C:",
        "d:",
        r"\\srv",
        r"\\srv\",
        r"\\srv\sh",
        r"\\srv\other",
    ])
}

fn windows_text(segment: impl Strategy<Value = String>) -> impl Strategy<Value = String> {
    (
        windows_root_strategy(),
        any::<bool>(),
        prop::collection::vec(segment, 0..6),
        any::<bool>(),
        prop::sample::select(vec![r"\", "/"]),
    )
        .prop_map(|(root, pinned, segments, trailing, sep)| {
            join_text(root, pinned, &segments, trailing, sep)
        })
}

fn windows_strategy() -> impl Strategy<Value = WindowsPath> {
    windows_text(segment_strategy()).prop_filter_map("rejected by the grammar", |text| {
        WindowsPath::new(&text).ok()
    })
}

fn plain_windows_strategy() -> impl Strategy<Value = WindowsPath> {
    windows_text(plain_segment_strategy())
        .prop_filter_map("unparsable", |text| WindowsPath::new(&text).ok())
}

proptest! {
    #![proptest_config(ProptestConfig {
        cases: 2000,
        max_global_rejects: 10000,
        .. ProptestConfig::default()
    })]

    // Display output parses back to the same value
    #[test]
    fn posix_display_round_trips(path in posix_strategy()) {
        prop_assert_eq!(PosixPath::new(&path.to_string()), Ok(path.clone()));
    }

    #[test]
    fn windows_display_round_trips(path in windows_strategy()) {
        prop_assert_eq!(WindowsPath::new(&path.to_string()), Ok(path.clone()));
    }

    // Parsed values are normalized: only a leading run of `..` survives
    #[test]
    fn posix_parse_normalizes(path in posix_strategy()) {
        prop_assert_eq!(path.check_invariants(), Ok(()));
        prop_assert!(path.segments().all(|s| s != "."));
        prop_assert_eq!(
            path.segments().filter(|s| *s == "..").count(),
            path.leading_parents()
        );
    }

    #[test]
    fn windows_parse_normalizes(path in windows_strategy()) {
        prop_assert_eq!(path.check_invariants(), Ok(()));
        prop_assert!(path.segments().all(|s| s != "."));
        prop_assert_eq!(
            path.segments().filter(|s| *s == "..").count(),
            path.leading_parents()
        );
    }

    #[test]
    fn posix_append_empty_is_identity(path in posix_strategy()) {
        let empty = PosixPath::default();
        prop_assert_eq!(path.append(&empty), Ok(path.clone()));
        prop_assert_eq!(empty.append(&path), Ok(path.clone()));
    }

    #[test]
    fn windows_append_empty_is_identity(path in windows_strategy()) {
        let empty = WindowsPath::default();
        prop_assert_eq!(path.append(&empty), Ok(path.clone()));
        prop_assert_eq!(empty.append(&path), Ok(path.clone()));
    }

    // Whatever append returns is normalized too
    #[test]
    fn posix_append_keeps_invariants(left in posix_strategy(), right in posix_strategy()) {
        if let Ok(joined) = left.append(&right) {
            prop_assert_eq!(joined.check_invariants(), Ok(()));
        } else {
            prop_assert!(left.is_pinned());
        }
    }

    #[test]
    fn windows_append_keeps_invariants(left in windows_strategy(), right in windows_strategy()) {
        if let Ok(joined) = left.append(&right) {
            prop_assert_eq!(joined.check_invariants(), Ok(()));
            prop_assert_eq!(WindowsPath::new(&joined.to_string()), Ok(joined.clone()));
        }
    }

    #[test]
    fn posix_relative_then_append_is_inverse(
        path in plain_posix_strategy(),
        base in plain_posix_strategy()
    ) {
        if let Some(rel) = path.try_relative_to(&base) {
            prop_assert!(!rel.is_pinned());
            prop_assert_eq!(rel.check_invariants(), Ok(()));
            let joined = base.append(&rel).expect("relative path stays under the root");
            prop_assert_eq!(joined.trim(), path.trim());
        } else {
            prop_assert_ne!(path.is_pinned(), base.is_pinned());
        }
    }

    #[test]
    fn windows_relative_then_append_is_inverse(
        path in plain_windows_strategy(),
        base in plain_windows_strategy()
    ) {
        if let Some(rel) = path.try_relative_to_with(&base, CaseSensitivity::Sensitive) {
            prop_assert!(!rel.is_pinned());
            prop_assert_eq!(rel.root_volume(), "");
            prop_assert_eq!(rel.check_invariants(), Ok(()));
            let joined = base.append(&rel).expect("relative path stays under the root");
            prop_assert_eq!(joined.trim(), path.trim());
        }
    }

    #[test]
    fn posix_trim_is_idempotent(path in posix_strategy()) {
        let trimmed = path.trim();
        prop_assert!(trimmed.is_trimmed());
        prop_assert_eq!(trimmed.trim(), trimmed.clone());
        prop_assert_eq!(trimmed.check_invariants(), Ok(()));
        if path.is_trimmed() {
            prop_assert_eq!(trimmed, path);
        }
    }

    #[test]
    fn windows_trim_is_idempotent(path in windows_strategy()) {
        let trimmed = path.trim();
        prop_assert!(trimmed.is_trimmed());
        prop_assert_eq!(trimmed.trim(), trimmed.clone());
        prop_assert_eq!(trimmed.check_invariants(), Ok(()));
        prop_assert_eq!(trimmed.root_volume(), path.root_volume());
    }

    // Walking up a pinned path stops at its root
    #[test]
    fn posix_parent_reaches_root(path in posix_strategy()) {
        let mut current = path.clone();
        for _ in 0..=path.segments().count() {
            prop_assert_eq!(current.check_invariants(), Ok(()));
            current = current.parent();
        }
        if path.is_pinned() {
            prop_assert_eq!(current.to_string(), "/");
            prop_assert_eq!(current.parent(), current);
        } else {
            prop_assert!(current.leading_parents() > path.leading_parents());
        }
    }

    #[test]
    fn windows_parent_reaches_root(path in windows_strategy()) {
        let mut current = path.clone();
        for _ in 0..=path.segments().count() {
            prop_assert_eq!(current.check_invariants(), Ok(()));
            current = current.parent();
        }
        prop_assert_eq!(current.root_volume(), path.root_volume());
        if path.is_pinned() {
            prop_assert_eq!(current.parent(), current);
        }
    }
}
