//! Access token recovery from companion player scripts.
//!
//! The player script embeds a three-segment, dot-delimited credential in a
//! string literal. We don't care what the segments encode; the token is
//! appended verbatim to backend URLs.

use std::fmt;
use std::sync::LazyLock;

use regex::Regex;

static TOKEN_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r#"['"]([A-Za-z0-9_-]+\.[A-Za-z0-9_-]+\.[A-Za-z0-9_-]+)['"]"#)
        .expect("token pattern is valid")
});

/// Opaque per-video credential.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AccessToken(String);

impl AccessToken {
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for AccessToken {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Find the first quoted three-segment token in `script`.
///
/// `None` is a normal outcome: the script is served without a token when
/// upstream denies access.
#[must_use]
pub fn extract_token(script: &str) -> Option<AccessToken> {
    let cleaned = strip_script_noise(script);
    TOKEN_RE
        .captures(&cleaned)
        .and_then(|caps| caps.get(1))
        .map(|m| AccessToken(m.as_str().to_string()))
}

/// Drop comments and collapse whitespace outside string literals.
///
/// String literals (`'…'`, `"…"`, `` `…` ``, with backslash escapes) and
/// regex literals (`/…/flags`) are copied byte for byte. An unterminated
/// literal runs to the end of input (end of line for regexes) and is copied
/// as-is.
#[must_use]
pub fn strip_script_noise(script: &str) -> String {
    let mut out = String::with_capacity(script.len());
    let mut chars = script.chars().peekable();
    let mut gap = false;

    while let Some(c) = chars.next() {
        match c {
            '"' | '\'' | '`' => {
                if gap && !out.is_empty() {
                    out.push(' ');
                }
                gap = false;
                out.push(c);
                while let Some(d) = chars.next() {
                    out.push(d);
                    if d == '\\' {
                        if let Some(escaped) = chars.next() {
                            out.push(escaped);
                        }
                    } else if d == c {
                        break;
                    }
                }
            }
            '/' if chars.peek() == Some(&'/') => {
                for d in chars.by_ref() {
                    if d == '\n' {
                        break;
                    }
                }
                gap = true;
            }
            '/' if chars.peek() == Some(&'*') => {
                chars.next();
                let mut prev = '\0';
                for d in chars.by_ref() {
                    if prev == '*' && d == '/' {
                        break;
                    }
                    prev = d;
                }
                gap = true;
            }
            '/' if regex_allowed(&out) => {
                if gap && !out.is_empty() {
                    out.push(' ');
                }
                gap = false;
                out.push(c);
                copy_regex_body(&mut chars, &mut out);
            }
            c if c.is_whitespace() => gap = true,
            c => {
                if gap && !out.is_empty() {
                    out.push(' ');
                }
                gap = false;
                out.push(c);
            }
        }
    }

    out
}

/// Keywords after which `/` starts a regex rather than a division.
const REGEX_KEYWORDS: &[&str] = &[
    "return", "typeof", "instanceof", "case", "do", "else", "in", "of", "new", "delete", "void",
    "throw", "yield", "await",
];

fn is_ident(c: char) -> bool {
    c.is_alphanumeric() || c == '_' || c == '$'
}

/// Whether a `/` following `out` is in expression position.
fn regex_allowed(out: &str) -> bool {
    match out.chars().next_back() {
        None => true,
        Some(c) if "(,=:[!&|?{};+-*%<>~^".contains(c) => true,
        Some(c) if is_ident(c) => {
            let word = out.rsplit(|c: char| !is_ident(c)).next().unwrap_or("");
            REGEX_KEYWORDS.contains(&word)
        }
        Some(_) => false,
    }
}

/// Copy a regex literal after its opening `/`, through the closing `/`.
///
/// A `/` inside a character class doesn't close the literal.
fn copy_regex_body(chars: &mut std::iter::Peekable<std::str::Chars<'_>>, out: &mut String) {
    let mut in_class = false;
    while let Some(&d) = chars.peek() {
        if d == '\n' {
            return;
        }
        chars.next();
        out.push(d);
        match d {
            '\\' => {
                if let Some(escaped) = chars.next_if(|&e| e != '\n') {
                    out.push(escaped);
                }
            }
            '[' => in_class = true,
            ']' => in_class = false,
            '/' if !in_class => return,
            _ => {}
        }
    }
}
