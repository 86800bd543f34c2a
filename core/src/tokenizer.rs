//! Lexical splitting of a raw argument vector.
//!
//! [`tokenize`] turns raw strings into [`Token`]s lazily, one argument at a
//! time and in the order supplied. Option prefixes are only recognized before
//! the first `--`; everything after it is positional.
//!
//! | Input                 | Token                                        |
//! |-----------------------|----------------------------------------------|
//! | `--name`, `--name=v`  | [`Token::LongOption`]                        |
//! | `-abc`, `-x=v`, `-n8` | [`Token::ShortCluster`]                      |
//! | `--`                  | [`Token::Separator`]                         |
//! | `-`, `-5`, `-1.5`     | [`Token::Positional`] (stdin marker, numbers)|
//! | anything else         | [`Token::Positional`]                        |

use std::iter::Fuse;

/// A lexical token.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Token {
    /// `--name` or `--name=value`.
    LongOption { name: String, value: Option<String> },
    /// `-abc` or `-x=value`. Only the last flag of the cluster may carry a
    /// value.
    ShortCluster { flags: String, value: Option<String> },
    Positional(String),
    /// The literal `--`.
    Separator,
}

impl Token {
    pub fn is_positional(&self) -> bool {
        matches!(self, Token::Positional(_))
    }

    pub fn is_option(&self) -> bool {
        matches!(self, Token::LongOption { .. } | Token::ShortCluster { .. })
    }
}

/// Lazy, finite, non-restartable token stream over raw arguments.
#[derive(Debug)]
pub struct Tokenizer<I> {
    args: Fuse<I>,
    escaped: bool,
}

/// Tokenizes `args` (which must not include the program name).
///
/// # Examples
///
/// ```
/// use command_model_core::{Token, tokenize};
///
/// let tokens: Vec<Token> = tokenize(["-s", "--out=a.txt", "--", "-x"]).collect();
/// assert_eq!(
///     tokens,
///     vec![
///         Token::ShortCluster { flags: "s".into(), value: None },
///         Token::LongOption { name: "out".into(), value: Some("a.txt".into()) },
///         Token::Separator,
///         Token::Positional("-x".into()),
///     ]
/// );
/// ```
pub fn tokenize<I>(args: I) -> Tokenizer<I::IntoIter>
where
    I: IntoIterator,
    I::Item: AsRef<str>,
{
    Tokenizer {
        args: args.into_iter().fuse(),
        escaped: false,
    }
}

impl<I> Iterator for Tokenizer<I>
where
    I: Iterator,
    I::Item: AsRef<str>,
{
    type Item = Token;

    fn next(&mut self) -> Option<Token> {
        let arg = self.args.next()?;
        let arg = arg.as_ref();

        if self.escaped {
            return Some(Token::Positional(arg.to_string()));
        }
        if arg == "--" {
            self.escaped = true;
            return Some(Token::Separator);
        }
        Some(classify(arg))
    }
}

fn classify(arg: &str) -> Token {
    if let Some(rest) = arg.strip_prefix("--") {
        let (name, value) = split_inline(rest);
        return Token::LongOption { name, value };
    }

    let Some(rest) = arg.strip_prefix('-') else {
        return Token::Positional(arg.to_string());
    };
    if rest.is_empty() || is_number(rest) {
        return Token::Positional(arg.to_string());
    }
    if rest.contains('=') {
        let (flags, value) = split_inline(rest);
        return Token::ShortCluster { flags, value };
    }

    // `-n8`: a letter run followed by digits carries the digits as a value.
    if let Some(split) = rest.find(|ch: char| ch.is_ascii_digit()) {
        let (flags, digits) = rest.split_at(split);
        if !flags.is_empty()
            && flags.chars().all(|ch| ch.is_ascii_alphabetic())
            && digits.chars().all(|ch| ch.is_ascii_digit())
        {
            return Token::ShortCluster {
                flags: flags.to_string(),
                value: Some(digits.to_string()),
            };
        }
    }

    Token::ShortCluster {
        flags: rest.to_string(),
        value: None,
    }
}

fn split_inline(text: &str) -> (String, Option<String>) {
    match text.split_once('=') {
        Some((name, value)) => (name.to_string(), Some(value.to_string())),
        None => (text.to_string(), None),
    }
}

/// Returns `true` for the body of a negative number (`5`, `1.5`, `.5`).
fn is_number(text: &str) -> bool {
    text.starts_with(|ch: char| ch.is_ascii_digit() || ch == '.') && text.parse::<f64>().is_ok()
}
