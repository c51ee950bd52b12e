//! The interactive rename session.
//!
//! For every scanned file the session shows the suggested name and asks
//! what to do with it. Commands are read one line at a time; the first
//! character of the line selects the command.

use crate::config::{RenderConfig, SessionOptions};
use crate::context::{FileState, MAX_TITLE_LEN, PkgFacts};
use crate::filename::{FileName, MAX_FILE_NAME_LEN, build_file_name};
use crate::output::OutputStyle;
use crate::releases::{
    NoSuggest, Suggest, TagInput, TagSuggest, classify_tag, extract_release_tags,
};
use crate::rename::rename_pkg;
use crate::scan::ScanList;
use crate::text::mixed_case;
use pkgrename_pkg::{PkgData, ScanError};
use snafu::{ResultExt, Snafu};
use std::io::{BufRead, Write};
use std::path::{Path, PathBuf};
use tracing::debug;

pub const PROMPT: &str = "[Y/N] [A]ll [E]dit [T]ag [M]ix [R]eset [C]hars [S]FO [L]og [H]elp [Q]uit: ";

pub const PROMPT_HELP: &str = "\
  - [Y]es      Rename the file as seen.
  - [N]o       Skip the file and drop all changes.
  - [A]ll      Same as yes, but also for all future files.
  - [E]dit     Prompt to manually edit the title.
  - [T]ag      Prompt to enter a release group or a release.
               End the tag with a tab to complete it.
  - [M]ix      Convert the letter case to mixed-case style.
  - [R]eset    Undo all changes.
  - [C]hars    Reveal special characters in the title.
  - [S]FO      Show file's param.sfo information.
  - [L]og      Print existing changelog data.
  - [H]elp     Print help.
  - [Q]uit     Exit the program.
  - [B]        Toggle the \"Backport\" tag.
  - [P]        Toggle changelog patch detection for the current PKG.
  - Shift-[T]  Remove all release tags.
  - < or Backspace  Go back to the previous PKG.
  - > or Space      Return to the current PKG.
";

#[derive(Debug, Snafu)]
pub enum AppError {
    #[snafu(display("terminal I/O failed"))]
    Io { source: std::io::Error },

    #[snafu(display("out of memory while loading \"{}\"", path.display()))]
    OutOfMemory { path: PathBuf },
}

type Result<T, E = AppError> = std::result::Result<T, E>;

/// A prompt command.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Command {
    Yes,
    No,
    All,
    Edit,
    Tag,
    Mix,
    Reset,
    Chars,
    Sfo,
    Log,
    Help,
    Quit,
    Backport,
    PatchDetection,
    RemoveTags,
    Back,
    Forward,
}

impl Command {
    /// Parses one input line.
    #[must_use]
    pub fn parse(line: &str) -> Option<Self> {
        let line = line.trim_end_matches(['\r', '\n']);
        let command = match line.chars().next()? {
            'y' | 'Y' => Self::Yes,
            'n' | 'N' => Self::No,
            'a' | 'A' => Self::All,
            'e' | 'E' => Self::Edit,
            't' => Self::Tag,
            'T' => Self::RemoveTags,
            'm' | 'M' => Self::Mix,
            'r' | 'R' => Self::Reset,
            'c' | 'C' => Self::Chars,
            's' | 'S' => Self::Sfo,
            'l' | 'L' => Self::Log,
            'h' | 'H' | '?' => Self::Help,
            'q' | 'Q' => Self::Quit,
            'b' | 'B' => Self::Backport,
            'p' | 'P' => Self::PatchDetection,
            '<' | '\x08' | '\x7f' => Self::Back,
            '>' | ' ' => Self::Forward,
            _ => return None,
        };
        Some(command)
    }
}

/// Where to go after a file.
#[derive(Debug, PartialEq, Eq)]
enum Step {
    /// Done with the file; carries its new path if it was renamed.
    Next(Option<PathBuf>),
    Back,
    Forward,
    Quit,
}

/// Removes control characters from typed text.
fn strip_controls(text: &str) -> String {
    text.chars().filter(|c| !c.is_control()).collect()
}

fn plural(count: usize) -> &'static str {
    if count == 1 { "" } else { "s" }
}

/// A rename session over one scan.
pub struct App<'a, R, W, E> {
    config: &'a RenderConfig,
    options: SessionOptions,
    style: OutputStyle,
    input: R,
    out: W,
    err: E,
    first_file: bool,
}

impl<'a, R: BufRead, W: Write, E: Write> App<'a, R, W, E> {
    pub fn new(
        config: &'a RenderConfig,
        options: SessionOptions,
        style: OutputStyle,
        input: R,
        out: W,
        err: E,
    ) -> Self {
        Self {
            config,
            options,
            style,
            input,
            out,
            err,
            first_file: true,
        }
    }

    /// Works through every result of `list`.
    pub fn run(&mut self, list: &mut ScanList) -> Result<()> {
        if self.options.query {
            return self.query(list);
        }

        let mut index = 0;
        let mut newest = 0;

        while let Some(entry) = list.get_mut(index) {
            newest = newest.max(index);
            let revisit = entry.seen;
            entry.seen = true;

            let pkg = match &entry.result {
                Ok(pkg) => pkg,
                Err(e) => {
                    self.report_scan_error(&entry.path, e)?;
                    snafu::ensure!(!e.is_fatal(), OutOfMemorySnafu { path: &entry.path });
                    index += 1;
                    continue;
                }
            };

            match self.process(&entry.path, pkg, revisit)? {
                Step::Next(renamed) => {
                    if let Some(path) = renamed {
                        entry.path = path;
                    }
                    index = if index < newest { newest } else { index + 1 };
                }
                Step::Back => match list.prev_index(index) {
                    Some(prev) => index = prev,
                    None => writeln!(self.out, "There is no previous PKG.\n").context(IoSnafu)?,
                },
                Step::Forward => index = newest,
                Step::Quit => break,
            }
        }

        self.out.flush().context(IoSnafu)
    }

    /// Prints one suggestion per file, or the current name if there is none.
    fn query(&mut self, list: &mut ScanList) -> Result<()> {
        let mut index = 0;

        while let Some(entry) = list.get(index) {
            let file_name = entry.file_name();
            let line = match &entry.result {
                Ok(pkg) => {
                    let facts = PkgFacts::derive(&file_name, pkg, self.config);
                    let ctx = facts.context(&FileState::new(&facts, self.config), self.config);
                    match build_file_name(self.config, &ctx) {
                        Ok(name) => name.name,
                        Err(e) => {
                            debug!(error = %e, file = %file_name, "no suggestion");
                            file_name
                        }
                    }
                }
                Err(e) => {
                    debug!(error = %e, file = %file_name, "no suggestion");
                    file_name
                }
            };
            writeln!(self.out, "{line}").context(IoSnafu)?;
            index += 1;
        }

        self.out.flush().context(IoSnafu)
    }

    fn report_scan_error(&mut self, path: &Path, e: &ScanError) -> Result<()> {
        let text = format!("Error while loading file \"{}\": {e}", path.display());
        writeln!(self.err, "{}", self.style.error(&text)).context(IoSnafu)
    }

    /// Reads one line. `None` at end of input.
    fn read_line(&mut self) -> Result<Option<String>> {
        self.out.flush().context(IoSnafu)?;
        let mut line = String::new();
        let read = self.input.read_line(&mut line).context(IoSnafu)?;
        if read == 0 {
            return Ok(None);
        }
        Ok(Some(line.trim_end_matches(['\r', '\n']).to_owned()))
    }

    fn read_command(&mut self) -> Result<Command> {
        loop {
            write!(self.out, "{}", self.style.prompt(PROMPT)).context(IoSnafu)?;
            let Some(line) = self.read_line()? else {
                writeln!(self.out).context(IoSnafu)?;
                return Ok(Command::Quit);
            };
            if let Some(command) = Command::parse(&line) {
                return Ok(command);
            }
        }
    }

    fn print_header(&mut self, file_name: &str) -> Result<()> {
        if !self.first_file {
            writeln!(self.out).context(IoSnafu)?;
        }
        self.first_file = false;
        writeln!(self.out, "   \"{file_name}\"").context(IoSnafu)
    }

    fn print_name(&mut self, name: &FileName) -> Result<()> {
        write!(self.out, "=> \"{}\"", name.name).context(IoSnafu)?;
        if self.options.verbose {
            let counts = format!(" ({}/{})", name.special_current, name.special_total);
            write!(self.out, "{}", self.style.warning(&counts)).context(IoSnafu)?;
        } else if name.special_current > 0 {
            let counts = format!(" ({})", name.special_current);
            write!(self.out, "{}", self.style.warning(&counts)).context(IoSnafu)?;
        }
        writeln!(self.out).context(IoSnafu)?;

        if name.is_too_long() {
            let text = format!(
                "New file name too long ({}/{MAX_FILE_NAME_LEN} characters).",
                name.name.len()
            );
            writeln!(self.err, "{}", self.style.error(&text)).context(IoSnafu)?;
        }
        Ok(())
    }

    fn rename(&mut self, path: &Path, name: &str) -> Result<Step> {
        match rename_pkg(path, name) {
            Ok(new_path) => Ok(Step::Next(Some(new_path))),
            Err(e) => {
                writeln!(self.err, "{}", self.style.error(&e.to_string())).context(IoSnafu)?;
                Ok(Step::Next(None))
            }
        }
    }

    /// Shows one file and handles its prompt until a decision is made.
    fn process(&mut self, path: &Path, pkg: &PkgData, revisit: bool) -> Result<Step> {
        let file_name = path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_default();
        let facts = PkgFacts::derive(&file_name, pkg, self.config);
        let mut state = FileState::new(&facts, self.config);
        let mut prompted = revisit;
        let mut header_shown = false;

        if !self.options.compact {
            self.print_header(&file_name)?;
            header_shown = true;
        }

        loop {
            let ctx = facts.context(&state, self.config);
            let name = match build_file_name(self.config, &ctx) {
                Ok(name) => name,
                Err(e) => {
                    if !header_shown {
                        self.print_header(&file_name)?;
                    }
                    writeln!(self.err, "{}", self.style.error(&e.to_string())).context(IoSnafu)?;
                    return Ok(Step::Next(None));
                }
            };
            let unchanged = name.name == file_name;

            if !header_shown {
                if unchanged && !prompted {
                    return Ok(Step::Next(None));
                }
                self.print_header(&file_name)?;
                header_shown = true;
            }
            self.print_name(&name)?;

            if self.options.no_to_all {
                return Ok(Step::Next(None));
            }
            if unchanged && !prompted && !self.options.force {
                writeln!(self.out, "Nothing to do.").context(IoSnafu)?;
                return Ok(Step::Next(None));
            }
            prompted = true;

            if self.options.yes_to_all {
                return self.rename(path, &name.name);
            }

            let command = self.read_command()?;
            debug!(?command, file = %file_name, "prompt");

            match command {
                Command::Yes => return self.rename(path, &name.name),
                Command::No => return Ok(Step::Next(None)),
                Command::All => {
                    self.options.yes_to_all = true;
                    return self.rename(path, &name.name);
                }
                Command::Quit => return Ok(Step::Quit),
                Command::Back => return Ok(Step::Back),
                Command::Forward => return Ok(Step::Forward),
                Command::Edit => self.edit_title(&mut state)?,
                Command::Tag => self.enter_tag(&mut state)?,
                Command::Mix => {
                    state.title = mixed_case(&state.title);
                    writeln!(self.out, "\nConverted letter case to mixed-case style.\n")
                        .context(IoSnafu)?;
                }
                Command::Reset => {
                    let dropped = state.reset(&facts);
                    writeln!(self.out, "\nTitle has been reset to \"{}\".", state.title)
                        .context(IoSnafu)?;
                    if let Some(group) = dropped.release_group {
                        writeln!(self.out, "Tagged release group \"{group}\" has been reset.")
                            .context(IoSnafu)?;
                    }
                    if let Some(release) = dropped.release {
                        writeln!(self.out, "Tagged release \"{release}\" has been reset.")
                            .context(IoSnafu)?;
                    }
                    writeln!(self.out).context(IoSnafu)?;
                }
                Command::Chars => self.reveal_chars(&state.title)?,
                Command::Sfo => {
                    write!(self.out, "\n{}\n", pkg.param_sfo()).context(IoSnafu)?;
                }
                Command::Log => match pkg.changelog() {
                    Some(log) => {
                        writeln!(self.out, "\n{log}\n").context(IoSnafu)?;
                        self.print_changelog_tags(log)?;
                    }
                    None => writeln!(self.out, "\nThis file does not contain changelog data.\n")
                        .context(IoSnafu)?,
                },
                Command::Help => write!(self.out, "\n{PROMPT_HELP}\n").context(IoSnafu)?,
                Command::Backport => {
                    state.backport = !state.backport;
                    let what = if state.backport { "enabled" } else { "disabled" };
                    writeln!(self.out, "\nBackport tag {what}.\n").context(IoSnafu)?;
                }
                Command::PatchDetection => {
                    state.patch_detection = !state.patch_detection;
                    let what = if state.patch_detection { "enabled" } else { "disabled" };
                    writeln!(
                        self.out,
                        "\nChangelog patch detection {what} for the current file.\n"
                    )
                    .context(IoSnafu)?;
                }
                Command::RemoveTags => {
                    state.remove_tags();
                    writeln!(self.out, "\nRelease tags removed.\n").context(IoSnafu)?;
                }
            }
        }
    }

    /// Reads one line; a trailing tab asks `suggest` to complete it.
    fn read_completed(&mut self, suggest: &dyn Suggest) -> Result<String> {
        let line = self.read_line()?.unwrap_or_default();
        let Some(typed) = line.strip_suffix('\t') else {
            return Ok(line);
        };

        match suggest.suggest(typed) {
            Some(completed) => {
                writeln!(self.out, "Completed to \"{completed}\".").context(IoSnafu)?;
                Ok(completed)
            }
            None => Ok(typed.to_owned()),
        }
    }

    fn edit_title(&mut self, state: &mut FileState) -> Result<()> {
        write!(self.out, "\nEnter new title: ").context(IoSnafu)?;
        let typed = strip_controls(&self.read_completed(&NoSuggest)?);

        if typed.is_empty() {
            writeln!(self.out, "Using title \"{}\".", state.title).context(IoSnafu)?;
        } else {
            let mut end = typed.len().min(MAX_TITLE_LEN);
            while !typed.is_char_boundary(end) {
                end -= 1;
            }
            state.title = typed[..end].to_owned();
        }
        writeln!(self.out).context(IoSnafu)
    }

    fn enter_tag(&mut self, state: &mut FileState) -> Result<()> {
        write!(self.out, "\nEnter new tag: ").context(IoSnafu)?;
        let config = self.config;
        let tag = strip_controls(&self.read_completed(&TagSuggest::new(&config.tags))?);

        match classify_tag(&tag, &self.config.tags, &self.config.tag_separator) {
            Some(TagInput::ReleaseGroup(group)) => {
                writeln!(self.out, "Using \"{group}\" as release group.").context(IoSnafu)?;
                state.release_group = Some(group);
            }
            Some(TagInput::Release(release)) => {
                writeln!(self.out, "Using \"{release}\" as release.").context(IoSnafu)?;
                state.release = Some(release);
            }
            Some(TagInput::ToggleBackport) => {
                state.backport = !state.backport;
                let what = if state.backport { "enabled" } else { "disabled" };
                writeln!(self.out, "Backport tag {what}.").context(IoSnafu)?;
            }
            None => {}
        }
        writeln!(self.out).context(IoSnafu)
    }

    fn print_changelog_tags(&mut self, changelog: &str) -> Result<()> {
        let tags = extract_release_tags(changelog, &self.config.tags);
        if tags.is_empty() {
            return Ok(());
        }

        writeln!(self.out, "Release tags found:").context(IoSnafu)?;
        for tag in tags {
            let line = format!("{} ({})", tag.name, tag.source);
            writeln!(self.out, "{}", self.style.warning(&line)).context(IoSnafu)?;
        }
        writeln!(self.out).context(IoSnafu)
    }

    fn reveal_chars(&mut self, title: &str) -> Result<()> {
        let mut revealed = String::with_capacity(title.len());
        let mut count = 0;

        for c in title.chars() {
            if (' '..='~').contains(&c) {
                revealed.push(c);
            } else {
                count += 1;
                revealed.push_str(&self.style.warning(&format!("#{}", u32::from(c))));
            }
        }

        writeln!(
            self.out,
            "\nOriginal: \"{title}\"\nRevealed: \"{revealed}\"\n{count} special character{} found.\n",
            plural(count)
        )
        .context(IoSnafu)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pkgrename_test_utils::{example_game, temp_dir};
    use std::fs;
    use std::io::Cursor;

    const NAME: &str = "Example Game [v1.00] [CUSA00000].pkg";

    struct Session {
        out: String,
        err: String,
    }

    fn run(config: &RenderConfig, options: SessionOptions, list: &mut ScanList, input: &str) -> Session {
        let mut out = Vec::new();
        let mut err = Vec::new();
        let mut app = App::new(
            config,
            options,
            OutputStyle::new().no_color(),
            Cursor::new(input.as_bytes().to_vec()),
            &mut out,
            &mut err,
        );
        app.run(list).unwrap();
        Session {
            out: String::from_utf8(out).unwrap(),
            err: String::from_utf8(err).unwrap(),
        }
    }

    #[test]
    fn commands() {
        assert_eq!(Command::parse("y"), Some(Command::Yes));
        assert_eq!(Command::parse("Yes\r\n"), Some(Command::Yes));
        assert_eq!(Command::parse("t"), Some(Command::Tag));
        assert_eq!(Command::parse("T"), Some(Command::RemoveTags));
        assert_eq!(Command::parse(" "), Some(Command::Forward));
        assert_eq!(Command::parse("\x08"), Some(Command::Back));
        assert_eq!(Command::parse("x"), None);
        assert_eq!(Command::parse(""), None);
    }

    #[test]
    fn yes_renames_the_file() {
        let dir = temp_dir().unwrap();
        let path = example_game().write_to(dir.path(), "game.pkg").unwrap();
        let mut list = ScanList::spawn(vec![path], false);

        let session = run(&RenderConfig::default(), SessionOptions::default(), &mut list, "x\ny\n");

        assert!(session.out.contains("   \"game.pkg\""));
        assert!(session.out.contains(&format!("=> \"{NAME}\"")));
        assert!(dir.path().join(NAME).exists());
        assert_eq!(list.get(0).unwrap().path, dir.path().join(NAME));
    }

    #[test]
    fn edit_tag_and_reset() {
        let dir = temp_dir().unwrap();
        let path = example_game().write_to(dir.path(), "game.pkg").unwrap();
        let mut list = ScanList::spawn(vec![path], false);

        let input = "e\nNew\x07 Title\nt\nPRELUDE\nt\nJohn Doe\nr\nn\n";
        let session = run(&RenderConfig::default(), SessionOptions::default(), &mut list, input);

        assert!(session.out.contains("=> \"New Title [v1.00] [CUSA00000].pkg\""));
        assert!(session.out.contains("Using \"PRELUDE\" as release group."));
        assert!(session.out.contains("=> \"New Title [v1.00] [CUSA00000] [PRELUDE] [John Doe].pkg\""));
        assert!(session.out.contains("Tagged release group \"PRELUDE\" has been reset."));
        assert!(session.out.contains("Tagged release \"John Doe\" has been reset."));
        assert!(dir.path().join("game.pkg").exists());
    }

    #[test]
    fn empty_edit_keeps_the_title_and_tab_completes_tags() {
        let dir = temp_dir().unwrap();
        let path = example_game().write_to(dir.path(), "game.pkg").unwrap();
        let mut list = ScanList::spawn(vec![path], false);

        let session = run(
            &RenderConfig::default(),
            SessionOptions::default(),
            &mut list,
            "e\n\nt\nlight\t\nq\n",
        );

        assert!(session.out.contains("Using title \"Example Game\"."));
        assert!(session.out.contains("Completed to \"LiGHTFORCE\"."));
        assert!(session.out.contains("[LiGHTFORCE].pkg"));
    }

    #[test]
    fn titles_are_not_completed() {
        let dir = temp_dir().unwrap();
        let path = example_game().write_to(dir.path(), "game.pkg").unwrap();
        let mut list = ScanList::spawn(vec![path], false);

        let session = run(
            &RenderConfig::default(),
            SessionOptions::default(),
            &mut list,
            "e\npre\t\nq\n",
        );

        assert!(!session.out.contains("Completed to"));
        assert!(session.out.contains("=> \"pre [v1.00] [CUSA00000].pkg\""));
    }

    #[test]
    fn information_commands() {
        let dir = temp_dir().unwrap();
        let path = example_game().write_to(dir.path(), "game.pkg").unwrap();
        let mut list = ScanList::spawn(vec![path], false);

        let session = run(
            &RenderConfig::default(),
            SessionOptions::default(),
            &mut list,
            "c\ns\nl\nh\nb\nq\n",
        );

        assert!(session.out.contains("0 special characters found."));
        assert!(session.out.contains("TITLE=\"Example Game\""));
        assert!(session.out.contains("This file does not contain changelog data."));
        assert!(session.out.contains("Shift-[T]"));
        assert!(session.out.contains("Backport tag enabled."));
        assert!(session.out.contains("[CUSA00000] [Backport].pkg"));
    }

    #[test]
    fn log_lists_changelog_tags() {
        let dir = temp_dir().unwrap();
        let path = example_game()
            .changelog("<changes app_ver=\"01.00\">Packed by DUPLEX, thanks mrboot and Jane</changes>")
            .write_to(dir.path(), "game.pkg")
            .unwrap();
        let mut list = ScanList::spawn(vec![path], false);
        let config = RenderConfig {
            tags: vec!["Jane".into()],
            ..RenderConfig::default()
        };

        let session = run(&config, SessionOptions::default(), &mut list, "l\nq\n");

        assert!(session.out.contains("Release tags found:\nJane (user tag)\nDUPLEX (built-in tag)\nFugazi (built-in tag)\n"));
    }

    #[test]
    fn matching_names_need_no_prompt() {
        let dir = temp_dir().unwrap();
        let path = example_game().write_to(dir.path(), NAME).unwrap();

        let mut list = ScanList::spawn(vec![path.clone()], false);
        let session = run(&RenderConfig::default(), SessionOptions::default(), &mut list, "");
        assert!(session.out.contains("Nothing to do."));

        let compact = SessionOptions {
            compact: true,
            ..SessionOptions::default()
        };
        let mut list = ScanList::spawn(vec![path], false);
        let session = run(&RenderConfig::default(), compact, &mut list, "");
        assert_eq!(session.out, "");
    }

    #[test]
    fn all_renames_the_remaining_files() {
        let dir = temp_dir().unwrap();
        let other = dir.path().join("other");
        fs::create_dir(&other).unwrap();
        let first = example_game().write_to(dir.path(), "a.pkg").unwrap();
        let second = example_game().write_to(&other, "b.pkg").unwrap();

        let mut list = ScanList::spawn(vec![first, second], false);
        run(&RenderConfig::default(), SessionOptions::default(), &mut list, "a\n");

        assert!(dir.path().join(NAME).exists());
        assert!(other.join(NAME).exists());
    }

    #[test]
    fn errors_are_reported_and_skipped() {
        let dir = temp_dir().unwrap();
        let good = example_game().write_to(dir.path(), "good.pkg").unwrap();
        let mut list = ScanList::spawn(vec![dir.path().join("missing.pkg"), good], false);

        let session = run(&RenderConfig::default(), SessionOptions::default(), &mut list, "n\n");

        assert!(session.err.contains("missing.pkg"));
        assert!(session.err.contains("Could not open file."));
        assert!(session.out.contains("   \"good.pkg\""));
    }

    #[test]
    fn back_and_forward() {
        let dir = temp_dir().unwrap();
        let a = example_game().write_to(dir.path(), "a.pkg").unwrap();
        let b = example_game().write_to(dir.path(), "b.pkg").unwrap();
        let mut list = ScanList::spawn(vec![a, b], false);

        // Skip a, go back to it from b, skip it again, then decide on b.
        let session = run(&RenderConfig::default(), SessionOptions::default(), &mut list, "n\n<\nn\nn\n");

        assert_eq!(session.out.matches("   \"a.pkg\"").count(), 2);
        assert_eq!(session.out.matches("   \"b.pkg\"").count(), 2);
        assert!(list.get(0).unwrap().seen);
    }

    #[test]
    fn query_prints_one_line_per_file() {
        let dir = temp_dir().unwrap();
        let good = example_game().write_to(dir.path(), "good.pkg").unwrap();
        fs::write(dir.path().join("bad.pkg"), b"nope").unwrap();
        let mut list = ScanList::spawn(vec![dir.path().to_path_buf()], false);

        let query = SessionOptions {
            query: true,
            ..SessionOptions::default()
        };
        let session = run(&RenderConfig::default(), query, &mut list, "");

        assert_eq!(session.out, format!("bad.pkg\n{NAME}\n"));
        assert!(good.exists());
    }
}
