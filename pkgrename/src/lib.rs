//! Library for renaming PlayStation 4 PKG files.
//!
//! This crate turns the metadata of a PKG (see [`pkgrename_pkg`]) into a file
//! name built from a user pattern such as
//! `"%title% [%dlc%] [{v%app_ver%}{ + v%merged_ver%}] [%title_id%]"`.
//!
//! # Overview
//!
//! - [`pattern`] expands `%variables%` and `{...}` groups.
//! - [`sanitize`] and [`filename`] make the result safe for exFAT.
//! - [`context`] derives the variables from a loaded PKG.
//! - [`scan`] finds and loads PKG files on a background thread.
//! - [`app`] is the interactive session that ties everything together.
//!
//! # Example
//!
//! ```no_run
//! use pkgrename::{PkgFacts, FileState, RenderConfig, build_file_name};
//! use pkgrename_pkg::PkgData;
//!
//! # fn main() -> Result<(), Box<dyn std::error::Error>> {
//! let config = RenderConfig {
//!     pattern: "%title% [%title_id%]".into(),
//!     ..RenderConfig::default()
//! };
//! let pkg = PkgData::load("game.pkg")?;
//! let facts = PkgFacts::derive("game.pkg", &pkg, &config);
//! let ctx = facts.context(&FileState::new(&facts, &config), &config);
//!
//! println!("{}", build_file_name(&config, &ctx)?.name);
//! # Ok(())
//! # }
//! ```

pub mod app;
pub mod config;
pub mod context;
pub mod filename;
pub mod output;
pub mod pattern;
pub mod releases;
pub mod rename;
pub mod sanitize;
pub mod scan;
pub mod text;

pub use self::app::{App, AppError};
pub use self::config::{ConfigError, LengthPolicy, RenderConfig, SessionOptions};
pub use self::context::{FileState, PkgFacts};
pub use self::filename::{FileName, NameError, build_file_name};
pub use self::output::OutputStyle;
pub use self::pattern::{PatternContext, Variable, render};
pub use self::scan::{ScanList, ScanResult};
