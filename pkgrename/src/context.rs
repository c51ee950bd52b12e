//! Pattern variables derived from a loaded PKG.
//!
//! [`PkgFacts`] holds what the PKG and its current file name say, computed
//! once per file. [`FileState`] holds what the user changed at the prompt.
//! Together they produce the [`PatternContext`] for each rendering.

use crate::config::{CategoryLabels, RenderConfig};
use crate::pattern::{PatternContext, Variable};
use crate::releases::{
    RELEASE_GROUPS, TagKind, detect_release_group, detect_releases, extract_release_tags,
    join_releases,
};
use crate::text::{contains_word, mixed_case};
use pkgrename_pkg::PkgData;
use pkgrename_pkg::changelog::{extract_patch_version, mentions_backport};
use pkgrename_pkg::header::region;

/// Longest title kept from `param.sfo`, in bytes.
pub const MAX_TITLE_LEN: usize = 127;

/// Value of `%backport%` when set.
pub const BACKPORT: &str = "Backport";

const GIB: f64 = 1024.0 * 1024.0 * 1024.0;

/// `param.sfo` category, as `%type%` sees it.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Category {
    Game,
    Patch,
    Dlc,
    App,
    Other,
}

impl Category {
    /// Maps a `CATEGORY` value such as `gd`, `gp` or `ac`.
    #[must_use]
    pub fn from_sfo(category: &str) -> Self {
        if category == "gd" {
            Self::Game
        } else if category.contains("gp") {
            Self::Patch
        } else if category == "ac" {
            Self::Dlc
        } else if category.starts_with("gd") {
            Self::App
        } else {
            Self::Other
        }
    }

    /// Returns the per-category variable, e.g. `%patch%`.
    #[must_use]
    pub const fn variable(self) -> Variable {
        match self {
            Self::Game => Variable::Game,
            Self::Patch => Variable::Patch,
            Self::Dlc => Variable::Dlc,
            Self::App => Variable::App,
            Self::Other => Variable::Other,
        }
    }

    fn label(self, labels: &CategoryLabels) -> &str {
        match self {
            Self::Game => &labels.game,
            Self::Patch => &labels.patch,
            Self::Dlc => &labels.dlc,
            Self::App => &labels.app,
            Self::Other => &labels.other,
        }
    }
}

/// Turns `0505` into `5.05`, or `05.05` with leading zeros kept.
///
/// Anything but four ASCII digits yields `None`.
fn dotted_version(digits: &str, leading_zeros: bool) -> Option<String> {
    let digits = digits.get(..4)?;
    if !digits.bytes().all(|b| b.is_ascii_digit()) {
        return None;
    }
    match digits.strip_prefix('0') {
        Some(rest) if !leading_zeros => Some(format!("{}.{}", &rest[..1], &rest[1..])),
        _ => Some(format!("{}.{}", &digits[..2], &digits[2..])),
    }
}

fn strip_leading_zero(version: &str, leading_zeros: bool) -> String {
    match version.strip_prefix('0') {
        Some(rest) if !leading_zeros => rest.to_owned(),
        _ => version.to_owned(),
    }
}

/// Cuts `text` to at most `max` bytes without splitting a character.
fn truncate(text: &str, max: usize) -> &str {
    if text.len() <= max {
        return text;
    }
    let mut end = max;
    while !text.is_char_boundary(end) {
        end -= 1;
    }
    &text[..end]
}

/// Everything one PKG and its file name contribute to the pattern.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PkgFacts {
    pub category: Option<String>,
    pub kind: Option<Category>,
    pub app_ver: Option<String>,
    pub content_id: Option<String>,
    pub region: Option<&'static str>,
    pub sdk: Option<String>,
    /// Raw `sdk_ver` digits, e.g. `0505`.
    pub sdk_raw: Option<String>,
    pub firmware: Option<String>,
    pub title: String,
    pub title_id: Option<String>,
    pub version: Option<String>,
    pub file_id_suffix: Option<String>,
    /// Patch version found in the changelog.
    pub patch_version: Option<String>,
    /// The changelog patch version also counts as `%merged_ver%`.
    pub merges_patch: bool,
    pub msum: Option<String>,
    pub size: String,
    pub fake: Option<bool>,
    pub release_group: Option<&'static str>,
    pub release: Option<String>,
    pub backport: bool,
}

impl PkgFacts {
    /// Derives the facts for a PKG currently named `file_name`.
    pub fn derive(file_name: &str, pkg: &PkgData, config: &RenderConfig) -> Self {
        let sfo = pkg.param_sfo();
        let lz = config.leading_zeros;
        let owned = |key: &str| sfo.get_str(key).map(str::to_owned);

        let category = owned("CATEGORY");
        let kind = category.as_deref().map(Category::from_sfo);

        let app_ver_raw = sfo.get_str("APP_VER");
        let version_raw = sfo.get_str("VERSION");
        let content_id = owned("CONTENT_ID");

        let sdk_raw = sfo
            .get_str("PUBTOOLINFO")
            .and_then(|info| info.split_once("sdk_ver="))
            .and_then(|(_, rest)| rest.get(..4))
            .map(str::to_owned);
        let firmware = sfo
            .get_u32("SYSTEM_VER")
            .and_then(|v| dotted_version(&format!("{v:08x}"), lz));

        let title = config
            .title_key()
            .and_then(|key| sfo.get_str(&key))
            .filter(|t| !t.is_empty())
            .or_else(|| sfo.get_str("TITLE"))
            .map(|t| truncate(t, MAX_TITLE_LEN).to_owned())
            .unwrap_or_default();

        let file_id_suffix = app_ver_raw.zip(version_raw).map(|(app, ver)| {
            format!("-A{}-V{}", app.replace('.', ""), ver.replace('.', ""))
        });

        let changelog = pkg.changelog();
        let raw_patch = changelog.and_then(extract_patch_version);
        let merges_patch = raw_patch.as_deref().is_some_and(|v| v != "01.00")
            && category.as_deref().is_some_and(|c| c.as_bytes().get(1) == Some(&b'd'));

        let lower_name = file_name.to_ascii_lowercase();
        let backport = (category.as_deref().is_some_and(|c| c.starts_with("gp"))
            && sdk_raw.as_deref() == Some("0505"))
            || lower_name.contains("backport")
            || contains_word(file_name, "bp")
            || changelog.is_some_and(mentions_backport);

        let from_name = detect_releases(file_name, &config.tags);
        let log_tags = changelog
            .map(|log| extract_release_tags(log, &config.tags))
            .unwrap_or_default();
        let log_group = log_tags
            .iter()
            .find(|tag| tag.kind == TagKind::ReleaseGroup)
            .and_then(|tag| RELEASE_GROUPS.iter().find(|g| g.name == tag.name))
            .map(|g| g.name);
        let from_log: Vec<String> = log_tags
            .into_iter()
            .filter(|tag| tag.kind == TagKind::Release)
            .map(|tag| tag.name)
            .collect();
        let releases = if (config.override_tags && !from_log.is_empty()) || from_name.is_empty() {
            from_log
        } else {
            from_name
        };

        Self {
            kind,
            app_ver: app_ver_raw.map(|v| strip_leading_zero(v, lz)),
            region: content_id.as_deref().and_then(region),
            content_id,
            sdk: sdk_raw.as_deref().and_then(|s| dotted_version(s, lz)),
            sdk_raw,
            firmware,
            title,
            title_id: owned("TITLE_ID"),
            version: version_raw.map(|v| strip_leading_zero(v, lz)),
            file_id_suffix,
            patch_version: raw_patch.map(|v| strip_leading_zero(&v, lz)),
            merges_patch,
            msum: pkg.compat_checksum().map(str::to_owned),
            size: format!("{:.2} GiB", pkg.file_size() as f64 / GIB),
            fake: pkg.is_fake(),
            release_group: detect_release_group(file_name).or(log_group),
            release: join_releases(&releases, &config.tag_separator),
            backport,
            category,
        }
    }

    /// Builds the pattern variables for the current prompt state.
    #[must_use]
    pub fn context(&self, state: &FileState, config: &RenderConfig) -> PatternContext {
        let mut ctx = PatternContext::new();

        if let Some(kind) = self.kind {
            let label = kind.label(&config.categories);
            ctx.set(Variable::Type, label);
            ctx.set(kind.variable(), label);
        }

        let patch = self
            .patch_version
            .as_deref()
            .filter(|_| state.patch_detection);
        ctx.set_opt(Variable::TrueVer, patch.or(self.app_ver.as_deref()));
        ctx.set_opt(Variable::MergedVer, patch.filter(|_| self.merges_patch));

        match self.fake {
            Some(true) => {
                ctx.set(Variable::Fake, "Fake");
                ctx.set(Variable::FakeStatus, "Fake");
            }
            Some(false) => {
                ctx.set(Variable::Retail, "Retail");
                ctx.set(Variable::FakeStatus, "Retail");
            }
            None => {}
        }

        ctx.set_opt(Variable::AppVer, self.app_ver.as_deref());
        ctx.set_opt(Variable::Backport, state.backport.then_some(BACKPORT));
        ctx.set_opt(Variable::Category, self.category.as_deref());
        ctx.set_opt(Variable::ContentId, self.content_id.as_deref());
        ctx.set_opt(Variable::FileIdSuffix, self.file_id_suffix.as_deref());
        ctx.set_opt(Variable::Firmware, self.firmware.as_deref());
        ctx.set_opt(Variable::Msum, self.msum.as_deref());
        ctx.set_opt(Variable::Region, self.region);
        ctx.set_opt(
            Variable::ReleaseGroup,
            state.release_group.as_deref().or(self.release_group),
        );
        ctx.set_opt(
            Variable::Release,
            state.release.as_deref().or(self.release.as_deref()),
        );
        ctx.set_opt(Variable::Sdk, self.sdk.as_deref());
        ctx.set(Variable::Size, self.size.as_str());
        ctx.set(Variable::Title, state.title.as_str());
        ctx.set_opt(Variable::TitleId, self.title_id.as_deref());
        ctx.set_opt(Variable::Version, self.version.as_deref());

        ctx
    }
}

/// What the user changed for the current file.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FileState {
    pub title: String,
    /// Overrides `%release_group%`; an empty string hides it.
    pub release_group: Option<String>,
    /// Overrides `%release%`; an empty string hides it.
    pub release: Option<String>,
    pub backport: bool,
    pub patch_detection: bool,
}

/// Tag overrides dropped by [`FileState::reset()`].
#[derive(Debug, Default, PartialEq, Eq)]
pub struct ResetTags {
    pub release_group: Option<String>,
    pub release: Option<String>,
}

impl FileState {
    #[must_use]
    pub fn new(facts: &PkgFacts, config: &RenderConfig) -> Self {
        let title = if config.mixed_case {
            mixed_case(&facts.title)
        } else {
            facts.title.clone()
        };

        Self {
            title,
            release_group: None,
            release: None,
            backport: facts.backport,
            patch_detection: true,
        }
    }

    /// Restores the original title and drops tag overrides.
    pub fn reset(&mut self, facts: &PkgFacts) -> ResetTags {
        facts.title.clone_into(&mut self.title);
        ResetTags {
            release_group: self.release_group.take().filter(|t| !t.is_empty()),
            release: self.release.take().filter(|t| !t.is_empty()),
        }
    }

    /// Hides both release variables.
    pub fn remove_tags(&mut self) {
        self.release_group = Some(String::new());
        self.release = Some(String::new());
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pkgrename_test_utils::{CONTENT_ID, Param, PkgBuilder, example_game, keys_block};
    use std::io::Cursor;

    fn load(builder: &PkgBuilder) -> PkgData {
        PkgData::load_from(&mut Cursor::new(builder.build())).unwrap()
    }

    fn patch(params: &[Param<'_>]) -> PkgBuilder {
        let mut all = vec![
            Param::Str("APP_VER", "01.03"),
            Param::Str("CATEGORY", "gp"),
            Param::Str("CONTENT_ID", "EP4497-CUSA05571_00-00000000000GOTY1"),
            Param::Str("TITLE", "Example Game"),
            Param::Str("TITLE_ID", "CUSA05571"),
            Param::Str("VERSION", "01.00"),
        ];
        all.extend_from_slice(params);
        PkgBuilder::new().sfo(&all)
    }

    #[test]
    fn categories() {
        assert_eq!(Category::from_sfo("gd"), Category::Game);
        assert_eq!(Category::from_sfo("gp"), Category::Patch);
        assert_eq!(Category::from_sfo("gdgp"), Category::Patch);
        assert_eq!(Category::from_sfo("ac"), Category::Dlc);
        assert_eq!(Category::from_sfo("gde"), Category::App);
        assert_eq!(Category::from_sfo("sd"), Category::Other);
    }

    #[test]
    fn versions_lose_one_leading_zero() {
        assert_eq!(dotted_version("0505", false).as_deref(), Some("5.05"));
        assert_eq!(dotted_version("0505", true).as_deref(), Some("05.05"));
        assert_eq!(dotted_version("1000", false).as_deref(), Some("10.00"));
        assert_eq!(dotted_version("05", false), None);
        assert_eq!(dotted_version("0\u{e9}1", false), None);
        assert_eq!(dotted_version("05a5", true), None);
        assert_eq!(strip_leading_zero("01.00", false), "1.00");
        assert_eq!(strip_leading_zero("01.00", true), "01.00");
        assert_eq!(strip_leading_zero("10.00", false), "10.00");
    }

    #[test]
    fn example_game_facts() {
        let config = RenderConfig::default();
        let facts = PkgFacts::derive("x.pkg", &load(&example_game()), &config);
        let ctx = facts.context(&FileState::new(&facts, &config), &config);

        assert_eq!(ctx.get(Variable::Title), Some("Example Game"));
        assert_eq!(ctx.get(Variable::TitleId), Some("CUSA00000"));
        assert_eq!(ctx.get(Variable::Type), Some("Game"));
        assert_eq!(ctx.get(Variable::Game), Some("Game"));
        assert_eq!(ctx.get(Variable::Patch), None);
        assert_eq!(ctx.get(Variable::AppVer), Some("1.00"));
        assert_eq!(ctx.get(Variable::TrueVer), Some("1.00"));
        assert_eq!(ctx.get(Variable::MergedVer), None);
        assert_eq!(ctx.get(Variable::Region), Some("US"));
        assert_eq!(ctx.get(Variable::Sdk), Some("7.50"));
        assert_eq!(ctx.get(Variable::Firmware), Some("7.50"));
        assert_eq!(ctx.get(Variable::FileIdSuffix), Some("-A0100-V0100"));
        assert_eq!(ctx.get(Variable::Size), Some("0.00 GiB"));
        assert_eq!(ctx.get(Variable::FakeStatus), None);
        assert_eq!(ctx.get(Variable::Backport), None);
    }

    #[test]
    fn fake_and_retail() {
        let config = RenderConfig::default();
        let fake = example_game().entry(
            0x10,
            keys_block(pkgrename_pkg::fake::fake_key_digest(CONTENT_ID)),
        );
        let retail = example_game().entry(0x10, keys_block([1; 32]));

        let ctx = |b: &PkgBuilder| {
            let facts = PkgFacts::derive("x.pkg", &load(b), &config);
            facts.context(&FileState::new(&facts, &config), &config)
        };

        let fake = ctx(&fake);
        assert_eq!(fake.get(Variable::Fake), Some("Fake"));
        assert_eq!(fake.get(Variable::Retail), None);
        assert_eq!(fake.get(Variable::FakeStatus), Some("Fake"));

        let retail = ctx(&retail);
        assert_eq!(retail.get(Variable::Fake), None);
        assert_eq!(retail.get(Variable::Retail), Some("Retail"));
        assert_eq!(retail.get(Variable::FakeStatus), Some("Retail"));
    }

    #[test]
    fn changelog_patch_merges_into_apps_only() {
        let config = RenderConfig::default();
        let log = r#"<changes app_ver="01.02"/><changes app_ver="01.10"/>"#;
        let game = example_game().changelog(log);

        let facts = PkgFacts::derive("x.pkg", &load(&game), &config);
        let mut state = FileState::new(&facts, &config);
        let ctx = facts.context(&state, &config);
        assert_eq!(ctx.get(Variable::TrueVer), Some("1.10"));
        assert_eq!(ctx.get(Variable::MergedVer), Some("1.10"));

        state.patch_detection = false;
        let ctx = facts.context(&state, &config);
        assert_eq!(ctx.get(Variable::TrueVer), Some("1.00"));
        assert_eq!(ctx.get(Variable::MergedVer), None);

        let facts = PkgFacts::derive("x.pkg", &load(&patch(&[]).changelog(log)), &config);
        let ctx = facts.context(&FileState::new(&facts, &config), &config);
        assert_eq!(ctx.get(Variable::TrueVer), Some("1.10"));
        assert_eq!(ctx.get(Variable::MergedVer), None);
    }

    #[test]
    fn initial_release_is_not_merged() {
        let config = RenderConfig::default();
        let game = example_game().changelog(r#"<changes app_ver="01.00"/>"#);
        let facts = PkgFacts::derive("x.pkg", &load(&game), &config);

        assert!(!facts.merges_patch);
        assert_eq!(facts.patch_version.as_deref(), Some("1.00"));
    }

    #[test]
    fn backport_detection() {
        let config = RenderConfig::default();
        let sdk505 = patch(&[Param::Str("PUBTOOLINFO", "sdk_ver=05050000")]);

        let derive = |b: &PkgBuilder, name: &str| PkgFacts::derive(name, &load(b), &config).backport;

        assert!(derive(&sdk505, "x.pkg"));
        assert!(derive(&patch(&[]), "Game (BP).pkg"));
        assert!(derive(&patch(&[]), "game-BACKPORT.pkg"));
        assert!(derive(&patch(&[]).changelog("Backported to 5.05"), "x.pkg"));
        assert!(!derive(&patch(&[]), "bpm.pkg"));
        assert!(!derive(&example_game(), "x.pkg"));
    }

    #[test]
    fn file_id_and_msum() {
        let config = RenderConfig::default();
        let facts = PkgFacts::derive("x.pkg", &load(&patch(&[])), &config);
        let ctx = facts.context(&FileState::new(&facts, &config), &config);

        assert_eq!(
            crate::pattern::render("%file_id%", &ctx),
            "EP4497-CUSA05571_00-00000000000GOTY1-A0103-V0100"
        );
        assert_eq!(ctx.get(Variable::Region), Some("EU"));
        assert_eq!(ctx.get(Variable::Msum), None);
    }

    #[test]
    fn language_titles_fall_back_to_title() {
        let game = PkgBuilder::new().sfo(&[
            Param::Str("CATEGORY", "gd"),
            Param::Str("TITLE", "Example Game"),
            Param::Str("TITLE_05", "Gioco di esempio"),
        ]);
        let data = load(&game);

        let italian = RenderConfig {
            language: Some(5),
            ..RenderConfig::default()
        };
        let german = RenderConfig {
            language: Some(4),
            ..RenderConfig::default()
        };

        assert_eq!(PkgFacts::derive("x", &data, &italian).title, "Gioco di esempio");
        assert_eq!(PkgFacts::derive("x", &data, &german).title, "Example Game");
    }

    #[test]
    fn long_titles_are_cut_at_a_character_boundary() {
        let long = "\u{00E9}".repeat(100);
        let game = PkgBuilder::new().sfo(&[Param::Str("TITLE", &long)]);
        let facts = PkgFacts::derive("x", &load(&game), &RenderConfig::default());

        assert_eq!(facts.title.len(), 126);
        assert!(facts.kind.is_none());
    }

    #[test]
    fn releases_from_name_and_changelog() {
        let log = example_game().changelog("Fixed by Arczi");
        let tags = RenderConfig {
            override_tags: true,
            ..RenderConfig::default()
        };
        let default = RenderConfig::default();

        let release = |b: &PkgBuilder, name: &str, config: &RenderConfig| {
            PkgFacts::derive(name, &load(b), config).release
        };

        assert_eq!(release(&log, "x.pkg", &default).as_deref(), Some("Arczi"));
        assert_eq!(release(&log, "game [TKJ13].pkg", &default).as_deref(), Some("TKJ13"));
        assert_eq!(release(&log, "game [TKJ13].pkg", &tags).as_deref(), Some("Arczi"));
        assert_eq!(release(&example_game(), "x.pkg", &default), None);

        let facts = PkgFacts::derive("Game-PRELUDE.pkg", &load(&example_game()), &default);
        assert_eq!(facts.release_group, Some("PRELUDE"));
    }

    #[test]
    fn malformed_sdk_versions_are_skipped() {
        for info in ["c_date=20200101,sdk_ver=0\u{e9}10", "sdk_ver=\u{e9}\u{e9}", "sdk_ver=05"] {
            let game = patch(&[Param::Str("PUBTOOLINFO", info), Param::Int("SYSTEM_VER", 0x0AB00000)]);
            let facts = PkgFacts::derive("x.pkg", &load(&game), &RenderConfig::default());

            assert_eq!(facts.sdk, None);
            assert_eq!(facts.firmware, None);
            assert!(!facts.backport);
        }
    }

    #[test]
    fn changelog_release_groups() {
        let log = example_game().changelog("Packed by DUPLEX. Fixed seanplayer crash.");
        let config = RenderConfig::default();

        let facts = PkgFacts::derive("x.pkg", &load(&log), &config);
        assert_eq!(facts.release_group, Some("DUPLEX"));
        assert_eq!(facts.release, None);

        let named = PkgFacts::derive("Game-PRELUDE.pkg", &load(&log), &config);
        assert_eq!(named.release_group, Some("PRELUDE"));
    }

    #[test]
    fn state_overrides_and_reset() {
        let config = RenderConfig {
            mixed_case: true,
            categories: "Game,Update,DLC,-,-".parse().unwrap(),
            ..RenderConfig::default()
        };
        let facts = PkgFacts::derive("game-PRELUDE.pkg", &load(&example_game()), &config);
        let mut state = FileState::new(&facts, &config);

        state.title = "Edited".into();
        state.release = Some("John Doe".into());
        state.backport = true;
        let ctx = facts.context(&state, &config);
        assert_eq!(ctx.get(Variable::Title), Some("Edited"));
        assert_eq!(ctx.get(Variable::Release), Some("John Doe"));
        assert_eq!(ctx.get(Variable::ReleaseGroup), Some("PRELUDE"));
        assert_eq!(ctx.get(Variable::Backport), Some("Backport"));

        state.remove_tags();
        let ctx = facts.context(&state, &config);
        assert_eq!(ctx.get(Variable::ReleaseGroup), Some(""));
        assert_eq!(ctx.get(Variable::Release), Some(""));

        assert_eq!(state.reset(&facts), ResetTags::default());
        assert_eq!(state.title, "Example Game");
        assert!(state.backport);
    }
}
