//! numpydoc-style documentation.
//!
//! ```text
//! Short summary.
//!
//! .. deprecated:: 1.2
//!     Skipped.
//!
//! Extended summary, one or more paragraphs.
//!
//! Parameters
//! ----------
//! name : type
//!     Help for name.
//! first, second : int
//!     Shared help.
//!
//! Notes
//! -----
//! Becomes the epilog.
//! ```
//!
//! Sections other than `Parameters`, `Other Parameters` and `Notes` are
//! recognized and dropped.

use std::collections::BTreeMap;
use std::sync::LazyLock;

use regex::Regex;
use tracing::trace;

use crate::doc::CommandDoc;
use crate::text::{blocks, clean, collapse};
use crate::DocDialect;

static DEPRECATION: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^\.\. deprecated::").expect("static regex must compile"));
static PARAMETER: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^(\*{0,2}\w+(?:\s*,\s*\*{0,2}\w+)*)\s*(?::.*)?$").expect("static regex must compile")
});

/// The numpydoc dialect.
#[derive(Debug, Clone, Copy, Default)]
pub struct NumpyDialect;

/// A headed section: its title and the lines below the underline.
struct Section {
    heading: String,
    body: Vec<String>,
}

impl DocDialect for NumpyDialect {
    fn name(&self) -> &'static str {
        "numpy"
    }

    fn parse(&self, text: &str) -> CommandDoc {
        let cleaned = clean(text);
        let mut doc = CommandDoc::default();
        let mut remaining = blocks(&cleaned).into_iter();

        let Some(brief) = remaining.next() else {
            return doc;
        };
        if heading(brief).is_some() {
            // No summary at all; treat everything as sections.
            return parse_sections(doc, std::iter::once(brief).chain(remaining));
        }
        doc.brief = Some(collapse(brief));

        let mut paragraphs = Vec::new();
        let mut rest = remaining.peekable();
        while let Some(block) = rest.next_if(|block| heading(block).is_none()) {
            if DEPRECATION.is_match(block) {
                trace!("skipping deprecation directive");
                continue;
            }
            paragraphs.push(collapse(block));
        }
        if !paragraphs.is_empty() {
            doc.description = Some(paragraphs.join("\n\n"));
        }

        parse_sections(doc, rest)
    }
}

/// Returns the heading of a block whose second line is a `---` underline.
fn heading(block: &str) -> Option<&str> {
    let mut lines = block.lines();
    let title = lines.next()?.trim();
    let underline = lines.next()?.trim();
    (!title.is_empty() && underline.starts_with("---")).then_some(title)
}

fn parse_sections<'a, I>(mut doc: CommandDoc, headed: I) -> CommandDoc
where
    I: Iterator<Item = &'a str>,
{
    let mut sections: Vec<Section> = Vec::new();
    for block in headed {
        match heading(block) {
            Some(title) => sections.push(Section {
                heading: title.to_string(),
                body: block.lines().skip(2).map(str::to_string).collect(),
            }),
            // A blank line inside a section continues it.
            None => {
                if let Some(section) = sections.last_mut() {
                    section.body.push(String::new());
                    section.body.extend(block.lines().map(str::to_string));
                }
            }
        }
    }

    for section in sections {
        match section.heading.as_str() {
            "Parameters" | "Other Parameters" => {
                for (name, help) in parameters(&section.body) {
                    doc.parameters.entry(name).or_insert(help);
                }
            }
            "Notes" => {
                let body = section.body.join("\n");
                let notes: Vec<String> = blocks(&body).into_iter().map(collapse).collect();
                if !notes.is_empty() {
                    doc.epilog = Some(notes.join("\n\n"));
                }
            }
            other => trace!(section = other, "ignoring section"),
        }
    }
    doc
}

/// Parses `name : type` entries followed by indented help lines.
fn parameters(body: &[String]) -> BTreeMap<String, String> {
    let mut parsed = BTreeMap::new();
    let mut names: Vec<String> = Vec::new();
    let mut help: Vec<&str> = Vec::new();

    for line in body {
        if line.trim().is_empty() {
            continue;
        }
        if line.starts_with(char::is_whitespace) {
            if !names.is_empty() {
                help.push(line.trim());
            }
            continue;
        }
        flush(&mut parsed, &mut names, &mut help);
        if let Some(captures) = PARAMETER.captures(line.trim()) {
            names = captures[1]
                .split(',')
                .map(|name| name.trim().trim_start_matches('*').to_string())
                .filter(|name| !name.is_empty())
                .collect();
        }
    }
    flush(&mut parsed, &mut names, &mut help);
    parsed
}

fn flush(parsed: &mut BTreeMap<String, String>, names: &mut Vec<String>, help: &mut Vec<&str>) {
    let text = collapse(&help.join(" "));
    for name in names.drain(..) {
        parsed.insert(name, text.clone());
    }
    help.clear();
}
