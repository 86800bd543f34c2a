use crate::doc::CommandDoc;
use crate::text::{blocks, clean, collapse};
use crate::DocDialect;

/// Unstructured prose: the first paragraph is the brief, every following
/// paragraph belongs to the description.
#[derive(Debug, Clone, Copy, Default)]
pub struct PlainDialect;

impl DocDialect for PlainDialect {
    fn name(&self) -> &'static str {
        "plain"
    }

    fn parse(&self, text: &str) -> CommandDoc {
        let cleaned = clean(text);
        let mut paragraphs = blocks(&cleaned).into_iter().map(collapse);
        let brief = paragraphs.next();
        let description: Vec<String> = paragraphs.collect();
        CommandDoc {
            brief,
            description: (!description.is_empty()).then(|| description.join("\n\n")),
            ..CommandDoc::default()
        }
    }
}
