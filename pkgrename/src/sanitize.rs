//! Makes rendered names safe for exFAT and pleasant to read.

/// Characters exFAT does not allow in file names.
pub const ILLEGAL_CHARS: &[char] = &['"', '*', '/', ':', '<', '>', '?', '\\', '|'];

/// Special characters that are usually a mistake for a plain one.
const MISUSED: &[(&str, &str)] = &[
    ("\u{FF06}", "&"),
    ("\u{2019}", "'"),
    ("\u{00A0}", " "),
    ("\u{2162}", "III"),
];

/// Special characters that only get in the way in file names.
const ANNOYING: &[(&str, &str)] = &[
    ("\u{2122}_", "_"),
    ("\u{2122}", " "),
    ("\u{00AE}_", "_"),
    ("\u{00AE}", " "),
    ("\u{2013}", "-"),
];

#[derive(Debug, Clone, Copy)]
pub struct SanitizeOptions {
    /// Replacement for [`ILLEGAL_CHARS`].
    pub replacement: char,
    /// Turn whitespace into underscores.
    pub underscores: bool,
}

impl Default for SanitizeOptions {
    fn default() -> Self {
        Self {
            replacement: '_',
            underscores: false,
        }
    }
}

/// A sanitized name without extension.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Sanitized {
    pub name: String,
    /// Special characters before known ones were replaced.
    pub special_total: usize,
    /// Special characters left in `name`.
    pub special_current: usize,
}

/// Counts characters that are not printable ASCII.
#[must_use]
pub fn count_special_chars(text: &str) -> usize {
    text.chars().filter(|c| !(' '..='~').contains(c)).count()
}

/// Sanitizes a rendered name.
///
/// Illegal characters are replaced one by one. Misused and annoying special
/// characters are replaced by plain ones, repeated spaces collapse, and
/// surrounding whitespace is trimmed.
#[must_use]
pub fn sanitize(name: &str, options: SanitizeOptions) -> Sanitized {
    let mut name = name.replace(ILLEGAL_CHARS, &options.replacement.to_string());
    let special_total = count_special_chars(&name);

    for (from, to) in MISUSED.iter().chain(ANNOYING) {
        name = name.replace(from, to);
    }
    let special_current = count_special_chars(&name);

    while name.contains("  ") {
        name = name.replace("  ", " ");
    }
    let mut name = name.trim_matches(|c: char| c.is_ascii_whitespace()).to_owned();

    if options.underscores {
        name = name.replace(|c: char| c.is_ascii_whitespace(), "_");
    }

    Sanitized {
        name,
        special_total,
        special_current,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn illegal_characters_are_replaced_individually() {
        let spaces = SanitizeOptions {
            replacement: ' ',
            ..SanitizeOptions::default()
        };

        assert_eq!(sanitize("Foo:Bar/Baz", SanitizeOptions::default()).name, "Foo_Bar_Baz");
        assert_eq!(sanitize("Foo:Bar/Baz", spaces).name, "Foo Bar Baz");
        assert_eq!(sanitize("a<>b", SanitizeOptions::default()).name, "a__b");
        assert_eq!(sanitize("a: b", spaces).name, "a b");
    }

    #[test]
    fn special_characters_are_fixed_and_counted() {
        let out = sanitize("Game\u{2122} \u{2013} Rock\u{2019}n\u{00AE}_Roll \u{3042}", SanitizeOptions::default());

        assert_eq!(out.name, "Game - Rock'n_Roll \u{3042}");
        assert_eq!(out.special_total, 5);
        assert_eq!(out.special_current, 1);
    }

    #[test]
    fn roman_three_expands() {
        assert_eq!(
            sanitize("Final Fantasy \u{2162}", SanitizeOptions::default()).name,
            "Final Fantasy III"
        );
    }

    #[test]
    fn whitespace_is_collapsed_trimmed_and_optionally_underscored() {
        let underscores = SanitizeOptions {
            underscores: true,
            ..SanitizeOptions::default()
        };

        assert_eq!(sanitize("  a    b \t", SanitizeOptions::default()).name, "a b");
        assert_eq!(sanitize(" Example Game [v1.00] ", underscores).name, "Example_Game_[v1.00]");
        assert_eq!(sanitize("a\u{00A0} b", SanitizeOptions::default()).name, "a b");
    }
}
