//! `changeinfo.xml` helpers.

/// Attribute preceding each patch version in the changelog.
const APP_VER_MARKER: &str = "app_ver=\"";

/// Length of a version string such as `01.05`.
const VERSION_LEN: usize = 5;

/// Returns the highest patch version mentioned in `changelog`.
///
/// Each `app_ver="` marker contributes the (up to) 5 bytes following it.
/// Candidates are compared as plain strings, so `9.99` sorts above `10.00`.
#[must_use]
pub fn extract_patch_version(changelog: &str) -> Option<String> {
    changelog
        .match_indices(APP_VER_MARKER)
        .map(|(pos, _)| {
            let rest = &changelog.as_bytes()[pos + APP_VER_MARKER.len()..];
            let candidate = &rest[..rest.len().min(VERSION_LEN)];
            String::from_utf8_lossy(candidate).into_owned()
        })
        .filter(|candidate| !candidate.is_empty())
        .max()
}

/// Returns `true` if the changelog mentions a backport (case-insensitive).
#[must_use]
pub fn mentions_backport(changelog: &str) -> bool {
    changelog.to_ascii_lowercase().contains("backport")
}
