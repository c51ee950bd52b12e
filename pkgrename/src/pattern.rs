//! File name patterns.
//!
//! A pattern is literal text with `%name%` variables and `{...}` groups. A
//! variable that ends up empty removes its innermost enclosing group, so
//! `[{FW %firmware%}]` disappears entirely when the firmware is unknown.
//!
//! Rendering happens in two phases over a token tree:
//!
//! 1. Composite variables (`%type%` and friends, `%file_id%`) expand to text
//!    that may contain further variables. Their values are spliced in and the
//!    result is parsed again, a bounded number of times.
//! 2. Every variable is replaced by its value. Values are never parsed again.
//!
//! Finally empty `[]`/`()` pairs and leftover braces are removed.

use std::collections::BTreeMap;
use std::fmt;

/// Upper bound on composite expansion rounds.
const MAX_EXPANSIONS: usize = 8;

macro_rules! variables {
    ($($variant:ident => $name:literal,)*) => {
        /// A pattern variable.
        #[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
        pub enum Variable {
            $($variant,)*
        }

        impl Variable {
            pub const ALL: &[Variable] = &[$(Variable::$variant,)*];

            /// Returns the name used between the `%` signs.
            #[must_use]
            pub const fn name(self) -> &'static str {
                match self {
                    $(Variable::$variant => $name,)*
                }
            }

            /// Looks up a variable by name.
            #[must_use]
            pub fn from_name(name: &str) -> Option<Self> {
                match name {
                    $($name => Some(Variable::$variant),)*
                    _ => None,
                }
            }
        }
    };
}

variables! {
    App => "app",
    AppVer => "app_ver",
    Backport => "backport",
    Category => "category",
    ContentId => "content_id",
    Dlc => "dlc",
    Fake => "fake",
    FakeStatus => "fake_status",
    FileId => "file_id",
    FileIdSuffix => "file_id_suffix",
    Firmware => "firmware",
    Game => "game",
    MergedVer => "merged_ver",
    Msum => "msum",
    Other => "other",
    Patch => "patch",
    Region => "region",
    Release => "release",
    ReleaseGroup => "release_group",
    Retail => "retail",
    Sdk => "sdk",
    Size => "size",
    Title => "title",
    TitleId => "title_id",
    TrueVer => "true_ver",
    Type => "type",
    Version => "version",
}

impl Variable {
    /// Returns `true` for variables whose value is itself a pattern.
    #[must_use]
    pub const fn is_composite(self) -> bool {
        matches!(
            self,
            Self::Type | Self::App | Self::Dlc | Self::Game | Self::Other | Self::Patch | Self::FileId
        )
    }
}

impl fmt::Display for Variable {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "%{}%", self.name())
    }
}

/// Variable values for one rendering.
///
/// A variable that is not set is absent, which behaves like an empty value.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PatternContext {
    values: BTreeMap<Variable, String>,
}

impl PatternContext {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns the value of `var`, or `None` if it is absent.
    #[must_use]
    pub fn get(&self, var: Variable) -> Option<&str> {
        self.values.get(&var).map(String::as_str)
    }

    /// Sets `var`.
    pub fn set(&mut self, var: Variable, value: impl Into<String>) {
        self.values.insert(var, value.into());
    }

    /// Sets `var` if `value` is present; removes it otherwise.
    pub fn set_opt(&mut self, var: Variable, value: Option<impl Into<String>>) {
        match value {
            Some(value) => self.set(var, value),
            None => {
                self.values.remove(&var);
            }
        }
    }

    /// Builder form of [`set()`](Self::set).
    #[must_use]
    pub fn with(mut self, var: Variable, value: impl Into<String>) -> Self {
        self.set(var, value);
        self
    }

    /// Returns the value unless it is absent or empty.
    fn non_empty(&self, var: Variable) -> Option<&str> {
        self.get(var).filter(|v| !v.is_empty())
    }
}

#[derive(Debug, PartialEq, Eq)]
enum Node<'a> {
    Literal(&'a str),
    Var(Variable),
    Group(Vec<Node<'a>>),
}

/// Splits a pattern into literals, variables and balanced groups.
///
/// Braces without a partner stay literal text. A `%` that does not start a
/// known variable is literal too.
fn parse(pattern: &str) -> Vec<Node<'_>> {
    let mut stack: Vec<Vec<Node<'_>>> = vec![Vec::new()];
    let mut literal_start = 0;
    let mut pos = 0;
    let bytes = pattern.as_bytes();

    macro_rules! flush {
        ($end:expr) => {
            if literal_start < $end {
                if let Some(top) = stack.last_mut() {
                    top.push(Node::Literal(&pattern[literal_start..$end]));
                }
            }
        };
    }

    while pos < bytes.len() {
        match bytes[pos] {
            b'%' => {
                let var = pattern[pos + 1..].find('%').and_then(|len| {
                    Variable::from_name(&pattern[pos + 1..pos + 1 + len]).map(|v| (v, len))
                });
                if let Some((var, len)) = var {
                    flush!(pos);
                    if let Some(top) = stack.last_mut() {
                        top.push(Node::Var(var));
                    }
                    pos += len + 2;
                    literal_start = pos;
                    continue;
                }
            }
            b'{' => {
                flush!(pos);
                stack.push(Vec::new());
                literal_start = pos + 1;
            }
            b'}' if stack.len() > 1 => {
                flush!(pos);
                let children = stack.pop().unwrap_or_default();
                if let Some(parent) = stack.last_mut() {
                    parent.push(Node::Group(children));
                }
                literal_start = pos + 1;
            }
            _ => {}
        }
        pos += 1;
    }
    flush!(bytes.len());

    // Unclosed groups: the opening brace was plain text after all.
    while stack.len() > 1 {
        let children = stack.pop().unwrap_or_default();
        if let Some(parent) = stack.last_mut() {
            parent.push(Node::Literal("{"));
            parent.extend(children);
        }
    }

    stack.pop().unwrap_or_default()
}

/// How a variable is emitted in one phase.
enum Emit<'v> {
    /// Keep the `%name%` token for a later phase.
    Token,
    Value(&'v str),
    Empty,
}

/// Writes `nodes` to `out`. Returns `true` if a variable at this level was
/// empty, which tells the caller to drop the enclosing group.
fn emit<'v>(nodes: &[Node<'_>], resolve: &impl Fn(Variable) -> Emit<'v>, out: &mut String) -> bool {
    let mut elide = false;

    for node in nodes {
        match node {
            Node::Literal(text) => out.push_str(text),
            Node::Var(var) => match resolve(*var) {
                Emit::Token => {
                    out.push('%');
                    out.push_str(var.name());
                    out.push('%');
                }
                Emit::Value(value) => out.push_str(value),
                Emit::Empty => elide = true,
            },
            Node::Group(children) => {
                let mut inner = String::new();
                if !emit(children, resolve, &mut inner) {
                    out.push('{');
                    out.push_str(&inner);
                    out.push('}');
                }
            }
        }
    }

    elide
}

fn contains_composite(nodes: &[Node<'_>]) -> bool {
    nodes.iter().any(|node| match node {
        Node::Var(var) => var.is_composite(),
        Node::Group(children) => contains_composite(children),
        Node::Literal(_) => false,
    })
}

/// Value of a variable as the pattern sees it.
fn value_of(var: Variable, ctx: &PatternContext) -> Option<&str> {
    match var {
        Variable::FileId if ctx.get(Variable::FileId).is_none() => {
            Some("%content_id%%file_id_suffix%")
        }
        _ => ctx.non_empty(var),
    }
}

/// Expands a pattern without sanitizing the result.
///
/// # Example
///
/// ```
/// use pkgrename::pattern::{PatternContext, Variable, render};
///
/// let ctx = PatternContext::new().with(Variable::Title, "Example Game");
/// assert_eq!(render("%title% [{FW %firmware%}]", &ctx), "Example Game ");
/// ```
#[must_use]
pub fn render(pattern: &str, ctx: &PatternContext) -> String {
    let mut current = pattern.to_owned();

    for _ in 0..MAX_EXPANSIONS {
        let nodes = parse(&current);
        if !contains_composite(&nodes) {
            break;
        }

        let mut expanded = String::with_capacity(current.len());
        emit(
            &nodes,
            &|var| {
                if !var.is_composite() {
                    return Emit::Token;
                }
                match value_of(var, ctx) {
                    Some(value) => Emit::Value(value),
                    None => Emit::Empty,
                }
            },
            &mut expanded,
        );
        current = expanded;
    }

    let mut out = String::with_capacity(current.len());
    emit(
        &parse(&current),
        &|var| match value_of(var, ctx) {
            Some(value) if !(var == Variable::FileId && ctx.get(var).is_none()) => {
                Emit::Value(value)
            }
            _ => Emit::Empty,
        },
        &mut out,
    );

    cleanup(&out)
}

/// Removes empty `[]` and `()` pairs and every brace, until nothing changes.
#[must_use]
pub fn cleanup(text: &str) -> String {
    let mut current = text.to_owned();

    loop {
        let next = current
            .replace("[]", "")
            .replace("()", "")
            .replace(['{', '}'], "");
        if next == current {
            return current;
        }
        current = next;
    }
}
