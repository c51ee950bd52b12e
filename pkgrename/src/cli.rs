use clap::Parser;
use pkgrename::config::{
    CategoryLabels, ConfigError, DEFAULT_PATTERN, LengthPolicy, RenderConfig, SessionOptions,
    language_number, parse_tag_list, read_tag_file,
};
use pkgrename::OutputStyle;
use std::path::PathBuf;

/// Renames PS4 PKGs to match a file name pattern.
///
/// Pattern variables are written as %name%, e.g. %title% or %title_id%.
/// Text in curly braces is removed if a variable inside it is empty.
#[derive(Debug, Parser)]
#[command(name = "pkgrename", version, about, long_about = None)]
pub struct Cli {
    /// PKG files and directories to rename [default: .]
    #[arg(value_name = "FILE|DIRECTORY")]
    pub inputs: Vec<PathBuf>,

    /// File name pattern (max. 511 characters)
    #[arg(short, long, default_value = DEFAULT_PATTERN)]
    pub pattern: String,

    /// Replace characters exFAT does not allow with X
    #[arg(long, value_name = "X", default_value_t = '_')]
    pub placeholder: char,

    /// Replace characters exFAT does not allow with spaces
    #[arg(long)]
    pub no_placeholder: bool,

    /// Keep leading zeros in version numbers
    #[arg(short = '0', long)]
    pub leading_zeros: bool,

    /// Traverse subdirectories recursively
    #[arg(short, long)]
    pub recursive: bool,

    /// Use underscores instead of spaces in file names
    #[arg(short, long)]
    pub underscores: bool,

    /// Convert titles to mixed case
    #[arg(short, long)]
    pub mixed_case: bool,

    /// Labels for %type%: Game,Update,DLC,App,Other ("-" hides one)
    #[arg(long, value_name = "CATEGORIES")]
    pub set_type: Option<String>,

    /// Additional %release% tags, comma-separated
    #[arg(long, value_name = "TAGS")]
    pub tags: Option<String>,

    /// Additional %release% tags from a file, one per line
    #[arg(long, value_name = "FILE")]
    pub tagfile: Option<PathBuf>,

    /// Separator between multiple release tags
    #[arg(long, value_name = "SEP", default_value = ",")]
    pub tag_separator: String,

    /// Prefer release tags found in changelogs over those in file names
    #[arg(long)]
    pub override_tags: bool,

    /// Use the title in language CODE if the PKG has one
    #[arg(short, long, value_name = "CODE")]
    pub language: Option<String>,

    /// Print the available language codes and exit
    #[arg(long)]
    pub print_languages: bool,

    /// Print the known release tags and exit
    #[arg(long)]
    pub print_tags: bool,

    /// Hide files that are already renamed
    #[arg(short, long)]
    pub compact: bool,

    /// Prompt even if a file is already renamed
    #[arg(short, long)]
    pub force: bool,

    /// Do not prompt; only show the new file names
    #[arg(short, long, conflicts_with = "yes_to_all")]
    pub no_to_all: bool,

    /// Do not prompt; rename all files automatically
    #[arg(short, long)]
    pub yes_to_all: bool,

    /// Print file name suggestions, one per line, without renaming
    #[arg(short, long)]
    pub query: bool,

    /// Display additional information
    #[arg(short, long)]
    pub verbose: bool,

    /// Refuse file names longer than 255 characters
    #[arg(long)]
    pub strict_length: bool,

    /// Disable colored output
    #[arg(long)]
    pub disable_colors: bool,
}

impl Cli {
    /// Builds the naming settings, reading the tag file if one is given.
    pub fn render_config(&self) -> Result<RenderConfig, ConfigError> {
        let mut tags = self.tags.as_deref().map(parse_tag_list).unwrap_or_default();
        if let Some(path) = &self.tagfile {
            tags.extend(read_tag_file(path)?);
        }

        let config = RenderConfig {
            pattern: self.pattern.clone(),
            placeholder: self.placeholder,
            no_placeholder: self.no_placeholder,
            leading_zeros: self.leading_zeros,
            underscores: self.underscores,
            mixed_case: self.mixed_case,
            categories: match &self.set_type {
                Some(labels) => labels.parse()?,
                None => CategoryLabels::default(),
            },
            tags,
            tag_separator: self.tag_separator.clone(),
            override_tags: self.override_tags,
            language: self.language.as_deref().map(language_number).transpose()?,
            length_policy: if self.strict_length {
                LengthPolicy::Reject
            } else {
                LengthPolicy::Warn
            },
        };

        config.validate()?;
        Ok(config)
    }

    pub fn session_options(&self) -> SessionOptions {
        SessionOptions {
            compact: self.compact,
            force: self.force,
            no_to_all: self.no_to_all,
            yes_to_all: self.yes_to_all,
            query: self.query,
            recursive: self.recursive,
            verbose: self.verbose,
        }
    }

    pub fn output_style(&self) -> OutputStyle {
        if self.disable_colors {
            OutputStyle::new().no_color()
        } else {
            OutputStyle::new()
        }
    }

    /// Inputs to scan; the current directory if none were given.
    pub fn inputs(&self) -> Vec<PathBuf> {
        if self.inputs.is_empty() {
            vec![PathBuf::from(".")]
        } else {
            self.inputs.clone()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn command_is_well_formed() {
        Cli::command().debug_assert();
    }

    #[test]
    fn flags_map_onto_settings() {
        let cli = Cli::try_parse_from([
            "pkgrename",
            "-p",
            "%title% [%title_id%]",
            "-0umr",
            "--set-type",
            "Game,Patch,DLC,-,-",
            "--tags",
            "John Doe,Jane",
            "--tag-separator",
            " & ",
            "-l",
            "en-gb",
            "--strict-length",
            "-y",
            "games",
        ])
        .unwrap();

        let config = cli.render_config().unwrap();
        assert_eq!(config.pattern, "%title% [%title_id%]");
        assert!(config.leading_zeros && config.underscores && config.mixed_case);
        assert_eq!(config.categories.patch, "Patch");
        assert_eq!(config.categories.app, "");
        assert_eq!(config.tags, vec!["John Doe", "Jane"]);
        assert_eq!(config.tag_separator, " & ");
        assert_eq!(config.language, Some(18));
        assert_eq!(config.length_policy, LengthPolicy::Reject);

        let options = cli.session_options();
        assert!(options.recursive && options.yes_to_all && !options.query);
        assert_eq!(cli.inputs(), vec![PathBuf::from("games")]);
    }

    #[test]
    fn defaults() {
        let cli = Cli::try_parse_from(["pkgrename"]).unwrap();
        let config = cli.render_config().unwrap();

        assert_eq!(config.pattern, DEFAULT_PATTERN);
        assert_eq!(config.illegal_replacement(), '_');
        assert_eq!(cli.inputs(), vec![PathBuf::from(".")]);
    }

    #[test]
    fn invalid_settings_are_rejected() {
        let bad = |args: &[&str]| {
            let cli = Cli::try_parse_from(std::iter::once("pkgrename").chain(args.iter().copied()))
                .unwrap();
            cli.render_config().is_err()
        };

        assert!(bad(&["--set-type", "a,b"]));
        assert!(bad(&["-l", "xx"]));
        assert!(bad(&["--placeholder", ":"]));
        assert!(Cli::try_parse_from(["pkgrename", "-n", "-y"]).is_err());
    }
}
