//! Function name extraction and filtering.
//!
//! Parsing and filtering are separate steps so that routes pinned to a
//! single function can skip filtering without touching the path.

use crate::routing::glob::match_glob;

/// Returns the path segment immediately after `path_prefix`.
///
/// Query strings and fragments are cut off first, so a `/` inside them
/// never produces a segment. Given a prefix of `/lambda/` and a path of
/// `/lambda/my-func/param?a=/foo`, this returns `my-func`.
pub fn parse_function_name<'a>(path: &'a str, path_prefix: &str) -> &'a str {
    let mut rest = path.strip_prefix(path_prefix).unwrap_or(path);
    if let Some(pos) = rest.find('?') {
        rest = &rest[..pos];
    }
    if let Some(pos) = rest.find('#') {
        rest = &rest[..pos];
    }
    rest.split('/').next().unwrap_or_default()
}

/// Applies the include and exclude rules to a parsed function name.
///
/// Empty names and names containing `.` are always rejected. This is a
/// sanity check against the platform naming rules, not full validation.
/// An empty `include` list allows every name that is not excluded.
pub fn accepts_function<S: AsRef<str>>(name: &str, include: &[S], exclude: &[S]) -> bool {
    if name.is_empty() || name.contains('.') {
        return false;
    }

    if !include.is_empty() && !include.iter().any(|rule| match_glob(name, rule.as_ref())) {
        return false;
    }

    !exclude.iter().any(|rule| match_glob(name, rule.as_ref()))
}
