mod cli;

use clap::Parser;
use cli::Cli;
use pkgrename::config::LANGUAGES;
use pkgrename::releases::{KnownTag, RELEASE_GROUPS, RELEASES};
use pkgrename::{App, ScanList};
use snafu::{ResultExt, Snafu};
use std::io::{self, Write};
use tracing_subscriber::EnvFilter;

/// Top-level application errors for pkgrename.
#[derive(Debug, Snafu)]
enum Error {
    #[snafu(display("invalid options"))]
    Config { source: pkgrename::ConfigError },

    #[snafu(display("rename session aborted"))]
    Session { source: pkgrename::AppError },

    #[snafu(display("failed to write to stdout"))]
    Print { source: io::Error },
}

type Result<T, E = Error> = std::result::Result<T, E>;

#[snafu::report]
fn main() -> Result<()> {
    let cli = Cli::parse();
    init_logging(cli.verbose);

    if cli.print_languages {
        return print_languages(&mut io::stdout().lock()).context(PrintSnafu);
    }

    let config = cli.render_config().context(ConfigSnafu)?;

    if cli.print_tags {
        return print_tags(&mut io::stdout().lock(), &config.tags).context(PrintSnafu);
    }

    let options = cli.session_options();
    tracing::debug!(pattern = %config.pattern, ?options, "starting");

    let mut list = ScanList::spawn(cli.inputs(), options.recursive);
    let mut app = App::new(
        &config,
        options,
        cli.output_style(),
        io::stdin().lock(),
        io::stdout().lock(),
        io::stderr(),
    );
    app.run(&mut list).context(SessionSnafu)
}

/// Logs go to stderr so that query output stays clean.
fn init_logging(verbose: bool) {
    let default = if verbose { "debug" } else { "warn" };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(io::stderr)
        .with_target(false)
        .init();
}

fn print_languages(out: &mut impl Write) -> io::Result<()> {
    writeln!(out, "{:<6}{:<28}Number", "Code", "Language")?;
    for (number, name, code) in LANGUAGES {
        writeln!(out, "{code:<6}{name:<28}{number:02}")?;
    }
    Ok(())
}

fn print_tags(out: &mut impl Write, user_tags: &[String]) -> io::Result<()> {
    print_tag_list(out, "Release groups", RELEASE_GROUPS)?;
    print_tag_list(out, "Releases", RELEASES)?;

    if !user_tags.is_empty() {
        writeln!(out, "User tags:")?;
        for tag in user_tags {
            writeln!(out, "  {tag}")?;
        }
    }
    Ok(())
}

fn print_tag_list(out: &mut impl Write, title: &str, tags: &[KnownTag]) -> io::Result<()> {
    writeln!(out, "{title}:")?;
    for tag in tags {
        match tag.alt_name {
            Some(alt) => writeln!(out, "  {} ({alt})", tag.name)?,
            None => writeln!(out, "  {}", tag.name)?,
        }
    }
    writeln!(out)
}
