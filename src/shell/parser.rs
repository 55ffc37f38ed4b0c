use crate::shell::ast::{ParseIssue, Parsed, RedirectKind};
use std::ffi::OsString;
use std::os::unix::ffi::OsStringExt;

pub const SELF_REFERENCE: &[u8] = b"$$";
pub const BACKGROUND_MARKER: &[u8] = b"&";

/// Replaces every `$$` with `pid`, scanning left to right.
///
/// Scanning resumes after the consumed marker, so `$$$$` expands twice and
/// `$$$` leaves a single trailing `$`. Other bytes pass through untouched.
pub fn expand_self_reference(line: &[u8], pid: u32) -> Vec<u8> {
    let pid_str = pid.to_string();
    let mut out = Vec::with_capacity(line.len() + pid_str.len());
    let mut rest = line;
    while !rest.is_empty() {
        if rest.starts_with(SELF_REFERENCE) {
            out.extend_from_slice(pid_str.as_bytes());
            rest = &rest[SELF_REFERENCE.len()..];
        } else {
            out.push(rest[0]);
            rest = &rest[1..];
        }
    }
    out
}

pub fn is_comment_or_blank(line: &[u8]) -> bool {
    let trimmed = line.trim_ascii_start();
    trimmed.is_empty() || trimmed[0] == b'#'
}

/// Splits an already expanded line into a [`Command`].
///
/// Only a final standalone `&` requests background execution; whether the
/// request is honored is decided later against the current mode.
///
/// [`Command`]: crate::shell::ast::Command
pub fn parse_command_line(line: &[u8]) -> Parsed {
    if is_comment_or_blank(line) {
        return Parsed::default();
    }

    let mut tokens: Vec<&[u8]> = line
        .split(u8::is_ascii_whitespace)
        .filter(|t| !t.is_empty())
        .collect();
    let mut parsed = Parsed::default();

    if tokens.last() == Some(&BACKGROUND_MARKER) {
        tokens.pop();
        parsed.command.background = true;
    }

    let mut iter = tokens.into_iter();
    while let Some(token) = iter.next() {
        match RedirectKind::from_token(token) {
            Some(kind) => {
                let target = iter.next().map(word);
                if target.is_none() {
                    parsed.issues.push(ParseIssue::MissingRedirectTarget(kind));
                }
                // Last occurrence wins.
                match kind {
                    RedirectKind::Input => parsed.command.input = target,
                    RedirectKind::Output => parsed.command.output = target,
                }
            }
            None => parsed.command.argv.push(word(token)),
        }
    }

    parsed
}

fn word(token: &[u8]) -> OsString {
    OsString::from_vec(token.to_vec())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::shell::ast::Command;
    use pretty_assertions::assert_eq;
    use std::ffi::OsStr;
    use std::os::unix::ffi::OsStrExt;

    fn parse(line: impl AsRef<[u8]>) -> Command {
        parse_command_line(line.as_ref()).command
    }

    fn argv(words: &[&str]) -> Vec<OsString> {
        words.iter().map(OsString::from).collect()
    }

    fn expand(line: &str, pid: u32) -> String {
        String::from_utf8(expand_self_reference(line.as_bytes(), pid)).unwrap()
    }

    #[test]
    fn test_expand_pid() {
        assert_eq!(expand("echo $$", 1234), "echo 1234");
        assert_eq!(parse(expand("echo $$", 1234)).argv, argv(&["echo", "1234"]));
    }

    #[test]
    fn test_expand_is_non_overlapping() {
        assert_eq!(expand("$$$$", 7), "77");
        assert_eq!(expand("$$$", 7), "7$");
        assert_eq!(expand("a$b$$c", 42), "a$b42c");
    }

    #[test]
    fn test_expand_without_marker() {
        assert_eq!(expand("ls -la $HOME", 9), "ls -la $HOME");
        assert_eq!(expand("", 9), "");
    }

    #[test]
    fn test_expand_inside_redirect_target() {
        let cmd = parse(expand("ls > out.$$ &", 55));
        assert_eq!(cmd.output.as_deref(), Some(OsStr::new("out.55")));
        assert!(cmd.background);
    }

    #[test]
    fn test_blank_and_comment() {
        assert!(parse("").is_empty());
        assert!(parse("   ").is_empty());
        assert!(parse("# comment").is_empty());
        assert!(parse("   # indented comment").is_empty());
        assert!(!parse("echo # not a comment").is_empty());
    }

    #[test]
    fn test_simple_command() {
        let cmd = parse("  ls   -la\t/tmp ");
        assert_eq!(cmd.argv, argv(&["ls", "-la", "/tmp"]));
        assert_eq!(cmd.program(), Some(OsStr::new("ls")));
        assert!(cmd.input.is_none());
        assert!(cmd.output.is_none());
        assert!(!cmd.background);
    }

    #[test]
    fn test_redirects_do_not_leak_into_argv() {
        let cmd = parse("sort < in.txt > out.txt");
        assert_eq!(cmd.argv, argv(&["sort"]));
        assert_eq!(cmd.input.as_deref(), Some(OsStr::new("in.txt")));
        assert_eq!(cmd.output.as_deref(), Some(OsStr::new("out.txt")));

        let cmd = parse("> out.txt ls");
        assert_eq!(cmd.argv, argv(&["ls"]));
        assert_eq!(cmd.output.as_deref(), Some(OsStr::new("out.txt")));
    }

    #[test]
    fn test_last_redirect_wins() {
        let cmd = parse("cat < a < b > c > d");
        assert_eq!(cmd.input.as_deref(), Some(OsStr::new("b")));
        assert_eq!(cmd.output.as_deref(), Some(OsStr::new("d")));
        assert_eq!(cmd.argv, argv(&["cat"]));
    }

    #[test]
    fn test_missing_redirect_target() {
        let parsed = parse_command_line(b"ls >");
        assert_eq!(parsed.command.argv, argv(&["ls"]));
        assert!(parsed.command.output.is_none());
        assert_eq!(parsed.issues, vec![ParseIssue::MissingRedirectTarget(RedirectKind::Output)]);
        assert_eq!(parsed.issues[0].to_string(), "missing argument for output redirect");

        let parsed = parse_command_line(b"wc <");
        assert_eq!(parsed.issues[0].to_string(), "missing argument for input redirect");
    }

    #[test]
    fn test_background_marker_only_when_final() {
        let cmd = parse("sleep 5 &");
        assert_eq!(cmd.argv, argv(&["sleep", "5"]));
        assert!(cmd.background);

        let cmd = parse("echo & done");
        assert_eq!(cmd.argv, argv(&["echo", "&", "done"]));
        assert!(!cmd.background);

        let cmd = parse("echo a&");
        assert_eq!(cmd.argv, argv(&["echo", "a&"]));
        assert!(!cmd.background);
    }

    #[test]
    fn test_lone_marker_is_empty() {
        let cmd = parse("&");
        assert!(cmd.is_empty());
    }

    #[test]
    fn test_non_utf8_bytes_pass_through() {
        let line = b"cat \xff\xfe$$ > out.\xe9";
        let cmd = parse(expand_self_reference(line, 12));
        assert_eq!(cmd.argv, vec![OsString::from("cat"), OsString::from_vec(b"\xff\xfe12".to_vec())]);
        assert_eq!(cmd.output.as_deref().map(OsStr::as_bytes), Some(&b"out.\xe9"[..]));
    }
}
