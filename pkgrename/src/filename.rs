//! Complete file names: render, sanitize, add the extension, check the length.

use crate::config::{LengthPolicy, RenderConfig};
use crate::pattern::{PatternContext, render};
use crate::sanitize::{SanitizeOptions, sanitize};
use snafu::Snafu;

/// Longest file name exFAT allows, in bytes.
pub const MAX_FILE_NAME_LEN: usize = 255;

pub const EXTENSION: &str = ".pkg";

#[derive(Debug, Snafu)]
pub enum NameError {
    #[snafu(display("New file name too long ({len}/{max} characters)."))]
    TooLong { len: usize, max: usize },
}

/// A generated file name, extension included.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FileName {
    pub name: String,
    pub special_total: usize,
    pub special_current: usize,
}

impl FileName {
    #[must_use]
    pub fn is_too_long(&self) -> bool {
        self.name.len() > MAX_FILE_NAME_LEN
    }
}

/// Builds the file name for one rendering.
///
/// With [`LengthPolicy::Warn`] a name over [`MAX_FILE_NAME_LEN`] is returned
/// as is and [`FileName::is_too_long()`] reports it.
pub fn build_file_name(config: &RenderConfig, ctx: &PatternContext) -> Result<FileName, NameError> {
    let rendered = render(&config.pattern, ctx);
    let sanitized = sanitize(
        &rendered,
        SanitizeOptions {
            replacement: config.illegal_replacement(),
            underscores: config.underscores,
        },
    );

    let file_name = FileName {
        name: format!("{}{EXTENSION}", sanitized.name),
        special_total: sanitized.special_total,
        special_current: sanitized.special_current,
    };

    if file_name.is_too_long() && config.length_policy == LengthPolicy::Reject {
        return TooLongSnafu {
            len: file_name.name.len(),
            max: MAX_FILE_NAME_LEN,
        }
        .fail();
    }

    Ok(file_name)
}
