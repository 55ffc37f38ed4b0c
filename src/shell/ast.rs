use std::ffi::{OsStr, OsString};
use std::fmt;

/// One parsed input line.
///
/// Redirect targets and the trailing `&` are consumed by the parser and never
/// appear in `argv`. Words are kept as raw bytes, exactly as typed.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct Command {
    pub argv: Vec<OsString>,
    pub input: Option<OsString>,
    pub output: Option<OsString>,
    pub background: bool,
}

impl Command {
    /// Blank lines and comments parse to an empty command.
    pub fn is_empty(&self) -> bool {
        self.argv.is_empty()
    }

    pub fn program(&self) -> Option<&OsStr> {
        self.argv.first().map(OsString::as_os_str)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RedirectKind {
    Input,  // <
    Output, // >
}

impl RedirectKind {
    pub fn from_token(token: &[u8]) -> Option<Self> {
        match token {
            b"<" => Some(RedirectKind::Input),
            b">" => Some(RedirectKind::Output),
            _ => None,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            RedirectKind::Input => "input",
            RedirectKind::Output => "output",
        }
    }
}

/// Non-fatal problems found while parsing. The command still runs.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ParseIssue {
    MissingRedirectTarget(RedirectKind),
}

impl fmt::Display for ParseIssue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ParseIssue::MissingRedirectTarget(kind) => {
                write!(f, "missing argument for {} redirect", kind.as_str())
            }
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct Parsed {
    pub command: Command,
    pub issues: Vec<ParseIssue>,
}
