//! Release groups, releases and tag detection.
//!
//! Release groups and releases are detected in file names and changelogs.
//! Users can add their own release tags.

use crate::text::{contains_ignore_case, contains_word};
use std::fmt;

/// A known tag and the alternative spelling that often appears in file names.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct KnownTag {
    pub name: &'static str,
    pub alt_name: Option<&'static str>,
}

const fn tag(name: &'static str) -> KnownTag {
    KnownTag {
        name,
        alt_name: None,
    }
}

const fn tag_alt(name: &'static str, alt_name: &'static str) -> KnownTag {
    KnownTag {
        name,
        alt_name: Some(alt_name),
    }
}

pub const RELEASE_GROUPS: &[KnownTag] = &[
    tag("AUGETY"),
    tag("BigBlueBox"),
    tag_alt("BlaZe", "blz"),
    tag("CAF"),
    tag("DarKmooN"),
    tag("DUPLEX"),
    tag("GCMR"),
    tag("HOODLUM"),
    tag("HR"),
    tag("iNTERNAL"),
    tag("JRP"),
    tag("KOTF"),
    tag("LeveLUp"),
    tag_alt("LiGHTFORCE", "lfc"),
    tag("MarvTM"),
    tag_alt("MOEMOE", "moe-"),
    tag("PiKMiN"),
    tag("Playable"),
    tag("PRELUDE"),
    tag("PROTOCOL"),
    tag("RESPAWN"),
    tag("SharpHD"),
    tag("TCD"),
    tag("UNLiMiTED"),
    tag("WaLMaRT"),
    tag("WaYsTeD"),
];

pub const RELEASES: &[KnownTag] = &[
    tag("Arczi"),
    tag_alt("CyB1K", "rayku22"),
    tag_alt("Fugazi", "mrboot"),
    tag_alt("High Speed", "highspeed33"),
    tag_alt("OPOISSO893", "opoisso"),
    tag_alt("SeanP2500", "seanp"),
    tag("TKJ13"),
    tag("TRIFECTA"),
    tag("VikaCaptive"),
    tag("Whitehawkx"),
    tag("xmrallx"),
];

/// Tag typed at the prompt that toggles `%backport%`.
pub const BACKPORT_TAG: &str = "Backport";

/// Returns the first known release group mentioned in `text`.
///
/// Names match as whole words; alternative names match anywhere in the
/// lower-cased text.
#[must_use]
pub fn detect_release_group(text: &str) -> Option<&'static str> {
    let lower = text.to_ascii_lowercase();

    RELEASE_GROUPS
        .iter()
        .find(|g| {
            contains_word(&lower, g.name) || g.alt_name.is_some_and(|alt| lower.contains(alt))
        })
        .map(|g| g.name)
}

/// Returns every release mentioned in `text`, sorted case-insensitively.
///
/// User tags come first and shadow built-in releases of the same name.
#[must_use]
pub fn detect_releases(text: &str, user_tags: &[String]) -> Vec<String> {
    let mut found: Vec<String> = user_tags
        .iter()
        .filter(|t| contains_word(text, t))
        .cloned()
        .collect();

    for release in RELEASES {
        let shadowed = user_tags
            .iter()
            .any(|t| t.eq_ignore_ascii_case(release.name));
        let matched = contains_word(text, release.name)
            || release.alt_name.is_some_and(|alt| contains_word(text, alt))
            || (release.name == "Fugazi" && contains_ignore_case(text, "fxd"));

        if !shadowed && matched {
            found.push(release.name.to_owned());
        }
    }

    sort_ignore_case(&mut found);
    found
}

/// Joins releases for `%release%`, or `None` if there are none.
#[must_use]
pub fn join_releases(releases: &[String], separator: &str) -> Option<String> {
    if releases.is_empty() {
        None
    } else {
        Some(releases.join(separator))
    }
}

fn sort_ignore_case(tags: &mut [String]) {
    tags.sort_by_cached_key(|t| t.to_ascii_lowercase());
}

/// Where a tag found in a changelog comes from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TagSource {
    User,
    BuiltIn,
}

impl fmt::Display for TagSource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::User => f.write_str("user tag"),
            Self::BuiltIn => f.write_str("built-in tag"),
        }
    }
}

/// Which variable a changelog tag feeds.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TagKind {
    ReleaseGroup,
    Release,
}

/// A release tag found in a changelog.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Tag {
    pub name: String,
    pub source: TagSource,
    pub kind: TagKind,
}

/// Scans a changelog for release tags.
///
/// User tags, release groups and releases must all appear as whole words,
/// by name or alternative name, ignoring case. User tags count as releases.
/// Each name is reported once.
#[must_use]
pub fn extract_release_tags(changelog: &str, user_tags: &[String]) -> Vec<Tag> {
    let mut tags: Vec<Tag> = Vec::new();
    let mut push = |name: &str, source, kind| {
        if !tags.iter().any(|t| t.name == name) {
            tags.push(Tag {
                name: name.to_owned(),
                source,
                kind,
            });
        }
    };

    for user in user_tags.iter().filter(|t| contains_word(changelog, t)) {
        push(user, TagSource::User, TagKind::Release);
    }

    let built_in = RELEASE_GROUPS
        .iter()
        .map(|t| (t, TagKind::ReleaseGroup))
        .chain(RELEASES.iter().map(|t| (t, TagKind::Release)));
    for (known, kind) in built_in {
        let matched = contains_word(changelog, known.name)
            || known.alt_name.is_some_and(|alt| contains_word(changelog, alt));
        if matched {
            push(known.name, TagSource::BuiltIn, kind);
        }
    }

    tags
}

/// What a tag typed at the prompt means.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TagInput {
    ReleaseGroup(String),
    Release(String),
    ToggleBackport,
}

/// Interprets a tag typed at the prompt.
///
/// Known release groups win, then known releases, then the backport toggle.
/// Anything else becomes a release as typed, with commas replaced by
/// `separator`.
#[must_use]
pub fn classify_tag(input: &str, user_tags: &[String], separator: &str) -> Option<TagInput> {
    if input.is_empty() {
        return None;
    }
    if let Some(group) = detect_release_group(input) {
        return Some(TagInput::ReleaseGroup(group.to_owned()));
    }
    if let Some(releases) = join_releases(&detect_releases(input, user_tags), separator) {
        return Some(TagInput::Release(releases));
    }
    if input == BACKPORT_TAG {
        return Some(TagInput::ToggleBackport);
    }
    Some(TagInput::Release(input.replace(',', separator)))
}

/// Autocompletion for text typed at a prompt.
pub trait Suggest {
    /// Returns the completed form of the last item of `input`, if any.
    fn suggest(&self, input: &str) -> Option<String>;
}

/// Never suggests anything.
pub struct NoSuggest;

impl Suggest for NoSuggest {
    fn suggest(&self, _input: &str) -> Option<String> {
        None
    }
}

/// Completes release groups, user tags, releases and [`BACKPORT_TAG`].
///
/// Only the text after the last comma is completed.
pub struct TagSuggest<'a> {
    user_tags: &'a [String],
}

impl<'a> TagSuggest<'a> {
    #[must_use]
    pub const fn new(user_tags: &'a [String]) -> Self {
        Self { user_tags }
    }
}

impl Suggest for TagSuggest<'_> {
    fn suggest(&self, input: &str) -> Option<String> {
        let start = input.rfind(',').map_or(0, |pos| pos + 1);
        let typed = input[start..].trim_start_matches(' ');
        let head = &input[..input.len() - typed.len()];

        let starts = |name: &str| {
            !typed.is_empty()
                && name.len() >= typed.len()
                && name.as_bytes()[..typed.len()].eq_ignore_ascii_case(typed.as_bytes())
        };

        RELEASE_GROUPS
            .iter()
            .map(|g| g.name)
            .chain(self.user_tags.iter().map(String::as_str))
            .chain(RELEASES.iter().map(|r| r.name))
            .chain([BACKPORT_TAG])
            .find(|name| starts(name))
            .map(|name| format!("{head}{name}"))
    }
}
