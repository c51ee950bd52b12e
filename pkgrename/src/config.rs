//! Settings fixed for a whole run.
//!
//! [`RenderConfig`] controls how names are built and [`SessionOptions`] how
//! the run treats each file. Both are built once from the command line and
//! only ever passed by reference afterwards.

use snafu::{ResultExt, Snafu};
use std::path::{Path, PathBuf};
use std::str::FromStr;

/// Pattern used when none is given.
pub const DEFAULT_PATTERN: &str = "%title% [%dlc%] [{v%app_ver%}{ + v%merged_ver%}] [%title_id%] [%release_group%] [%release%] [%backport%]";

/// Longest accepted pattern, in bytes.
pub const MAX_PATTERN_LEN: usize = 511;

/// Label value that hides a category.
const HIDDEN_LABEL: &str = "-";

/// Numeric language suffixes of `TITLE_NN` keys.
///
/// Columns: number, name, code.
pub const LANGUAGES: [(u8, &str, &str); 30] = [
    (0, "Japanese", "jp"),
    (1, "English (United States)", "en"),
    (2, "French (France)", "fr"),
    (3, "Spanish (Spain)", "es"),
    (4, "German", "de"),
    (5, "Italian", "it"),
    (6, "Dutch", "nl"),
    (7, "Portuguese (Portugal)", "pt"),
    (8, "Russian", "ru"),
    (9, "Korean", "ko"),
    (10, "Chinese (traditional)", "zh_t"),
    (11, "Chinese (simplified)", "zh_s"),
    (12, "Finnish", "fi"),
    (13, "Swedish", "sv"),
    (14, "Danish", "da"),
    (15, "Norwegian", "no"),
    (16, "Polish", "pl"),
    (17, "Portuguese (Brazil)", "pt-br"),
    (18, "English (United Kingdom)", "en-gb"),
    (19, "Turkish", "tr"),
    (20, "Spanish (Latin America)", "es-la"),
    (21, "Arabic", "ar"),
    (22, "French (Canada)", "fr-ca"),
    (23, "Czech", "cs"),
    (24, "Hungarian", "hu"),
    (25, "Greek", "el"),
    (26, "Romanian", "ro"),
    (27, "Thai", "th"),
    (28, "Vietnamese", "vi"),
    (29, "Indonesian", "in"),
];

#[derive(Debug, Snafu)]
#[non_exhaustive]
pub enum ConfigError {
    #[snafu(display("pattern too long ({len}/{MAX_PATTERN_LEN} characters)"))]
    PatternTooLong { len: usize },

    #[snafu(display("--set-type needs exactly 5 comma-separated values, got {count}"))]
    CategoryCount { count: usize },

    #[snafu(display("placeholder '{placeholder}' is not allowed in file names"))]
    IllegalPlaceholder { placeholder: char },

    #[snafu(display("unknown language code: {code}"))]
    UnknownLanguage { code: String },

    #[snafu(display("cannot read tag file '{}'", path.display()))]
    ReadTagFile {
        path: PathBuf,
        source: std::io::Error,
    },
}

/// Returns the `TITLE_NN` number for a language code such as `en-gb`.
pub fn language_number(code: &str) -> Result<u8, ConfigError> {
    LANGUAGES
        .iter()
        .find(|(_, _, c)| *c == code)
        .map(|(n, _, _)| *n)
        .ok_or_else(|| UnknownLanguageSnafu { code }.build())
}

/// Labels that `%type%` and its per-category variables expand to.
///
/// A label may itself contain pattern variables, e.g. `Patch %app_ver%`.
/// An empty label hides the category.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CategoryLabels {
    pub game: String,
    pub patch: String,
    pub dlc: String,
    pub app: String,
    pub other: String,
}

impl Default for CategoryLabels {
    fn default() -> Self {
        Self {
            game: "Game".into(),
            patch: "Update".into(),
            dlc: "DLC".into(),
            app: "App".into(),
            other: "Other".into(),
        }
    }
}

impl FromStr for CategoryLabels {
    type Err = ConfigError;

    /// Parses `Game,Update,DLC,App,Other`; `-` hides a category.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let values: Vec<&str> = s.split(',').collect();
        let &[game, patch, dlc, app, other] = values.as_slice() else {
            return CategoryCountSnafu {
                count: values.len(),
            }
            .fail();
        };

        let label = |v: &str| {
            if v == HIDDEN_LABEL {
                String::new()
            } else {
                v.to_owned()
            }
        };

        Ok(Self {
            game: label(game),
            patch: label(patch),
            dlc: label(dlc),
            app: label(app),
            other: label(other),
        })
    }
}

/// What to do with names longer than the exFAT limit.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum LengthPolicy {
    /// Report the length and keep the name.
    #[default]
    Warn,
    /// Refuse to use the name.
    Reject,
}

/// Everything that shapes a generated file name.
#[derive(Debug, Clone)]
pub struct RenderConfig {
    pub pattern: String,
    /// Replacement for characters exFAT does not allow.
    pub placeholder: char,
    /// Replace illegal characters with spaces instead of `placeholder`.
    pub no_placeholder: bool,
    pub leading_zeros: bool,
    pub underscores: bool,
    pub mixed_case: bool,
    pub categories: CategoryLabels,
    /// User release tags, checked before the built-in ones.
    pub tags: Vec<String>,
    pub tag_separator: String,
    /// Prefer release tags found in the changelog over file name tags.
    pub override_tags: bool,
    /// Language number used to pick `TITLE_NN` over `TITLE`.
    pub language: Option<u8>,
    pub length_policy: LengthPolicy,
}

impl Default for RenderConfig {
    fn default() -> Self {
        Self {
            pattern: DEFAULT_PATTERN.to_owned(),
            placeholder: '_',
            no_placeholder: false,
            leading_zeros: false,
            underscores: false,
            mixed_case: false,
            categories: CategoryLabels::default(),
            tags: Vec::new(),
            tag_separator: ",".to_owned(),
            override_tags: false,
            language: None,
            length_policy: LengthPolicy::Warn,
        }
    }
}

impl RenderConfig {
    /// Checks values that cannot be expressed in the types.
    pub fn validate(&self) -> Result<(), ConfigError> {
        let len = self.pattern.len();
        snafu::ensure!(len <= MAX_PATTERN_LEN, PatternTooLongSnafu { len });

        let placeholder = self.placeholder;
        snafu::ensure!(
            !placeholder.is_control() && !crate::sanitize::ILLEGAL_CHARS.contains(&placeholder),
            IllegalPlaceholderSnafu { placeholder }
        );
        Ok(())
    }

    /// Returns the character that replaces exFAT-illegal characters.
    #[must_use]
    pub const fn illegal_replacement(&self) -> char {
        if self.no_placeholder {
            ' '
        } else {
            self.placeholder
        }
    }

    /// Returns the `param.sfo` key holding the title in the chosen language.
    #[must_use]
    pub fn title_key(&self) -> Option<String> {
        self.language.map(|n| format!("TITLE_{n:02}"))
    }
}

/// How the run treats each file.
#[derive(Debug, Clone, Copy, Default)]
pub struct SessionOptions {
    /// Hide files whose name is already correct.
    pub compact: bool,
    /// Prompt even when the name already matches.
    pub force: bool,
    pub no_to_all: bool,
    pub yes_to_all: bool,
    /// Print one suggestion per line and never rename.
    pub query: bool,
    pub recursive: bool,
    pub verbose: bool,
}

/// Splits a comma-separated tag list, dropping empty items.
#[must_use]
pub fn parse_tag_list(list: &str) -> Vec<String> {
    list.split(',')
        .filter(|tag| !tag.is_empty())
        .map(str::to_owned)
        .collect()
}

/// Reads one tag per line, skipping blank lines.
pub fn read_tag_file(path: &Path) -> Result<Vec<String>, ConfigError> {
    let text = std::fs::read_to_string(path).context(ReadTagFileSnafu { path })?;

    Ok(text
        .lines()
        .map(|line| line.trim_end_matches(['\r', '\n']))
        .filter(|line| !line.is_empty())
        .map(str::to_owned)
        .collect())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn category_labels_parse_hidden_values() {
        let labels: CategoryLabels = "Game,Patch %app_ver%,DLC,-,-".parse().unwrap();

        assert_eq!(labels.patch, "Patch %app_ver%");
        assert_eq!(labels.app, "");
        assert_eq!(labels.other, "");
        assert!(matches!(
            "Game,Update".parse::<CategoryLabels>(),
            Err(ConfigError::CategoryCount { count: 2 })
        ));
    }

    #[test]
    fn languages() {
        assert_eq!(language_number("en-gb").unwrap(), 18);
        assert_eq!(language_number("jp").unwrap(), 0);
        assert!(language_number("xx").is_err());

        let config = RenderConfig {
            language: Some(5),
            ..RenderConfig::default()
        };
        assert_eq!(config.title_key().as_deref(), Some("TITLE_05"));
    }

    #[test]
    fn long_patterns_are_rejected() {
        let config = RenderConfig {
            pattern: "x".repeat(MAX_PATTERN_LEN + 1),
            ..RenderConfig::default()
        };

        assert!(matches!(
            config.validate(),
            Err(ConfigError::PatternTooLong { len: 512 })
        ));
        assert!(RenderConfig::default().validate().is_ok());

        let config = RenderConfig {
            placeholder: '?',
            ..RenderConfig::default()
        };
        assert!(matches!(
            config.validate(),
            Err(ConfigError::IllegalPlaceholder { placeholder: '?' })
        ));
    }

    #[test]
    fn tags_from_list_and_file() {
        assert_eq!(parse_tag_list("Foo,,Bar Baz"), vec!["Foo", "Bar Baz"]);

        let mut file = tempfile::NamedTempFile::new().unwrap();
        write!(file, "John Doe\r\n\nJane\n").unwrap();

        assert_eq!(read_tag_file(file.path()).unwrap(), vec!["John Doe", "Jane"]);
        assert!(read_tag_file(Path::new("/nonexistent/tags.txt")).is_err());
    }
}
