//! JavaScript checker backed by the oxc parser.
//!
//! Sources are parsed as classic scripts, not modules. Hook sources are
//! often a bare anonymous function (`function(){ ... }`), which is not a
//! valid statement; those are accepted when they parse as a parenthesized
//! function expression.

use oxc_allocator::Allocator;
use oxc_parser::Parser;
use oxc_span::SourceType;

use super::{SyntaxChecker, SyntaxDiagnostic};

#[derive(Debug, Default, Clone, Copy)]
pub struct JavaScriptChecker;

impl SyntaxChecker for JavaScriptChecker {
    fn language(&self) -> &'static str {
        "JavaScript"
    }

    fn check(&self, source: &str) -> Result<(), SyntaxDiagnostic> {
        let diagnostic = match parse_script(source) {
            None => return Ok(()),
            Some(diagnostic) => diagnostic,
        };
        if is_anonymous_function(source) && parse_script(&format!("({source}\n)")).is_none() {
            return Ok(());
        }
        Err(diagnostic)
    }
}

/// First parse error in `source`, if any.
fn parse_script(source: &str) -> Option<SyntaxDiagnostic> {
    let allocator = Allocator::default();
    let source_type = SourceType::default().with_script(true);
    let ret = Parser::new(&allocator, source, source_type).parse();
    let error = ret.errors.first()?;

    let offset = error
        .labels
        .as_ref()
        .and_then(|labels| labels.first())
        .map(|label| label.offset())
        .unwrap_or(0);
    let (line, column) = position(source, offset);
    Some(SyntaxDiagnostic {
        line,
        column,
        message: error.message.to_string(),
    })
}

fn is_anonymous_function(source: &str) -> bool {
    source
        .trim_start()
        .strip_prefix("function")
        .is_some_and(|rest| rest.trim_start().starts_with('('))
}

/// 1-based line and column of byte `offset`.
fn position(source: &str, offset: usize) -> (usize, usize) {
    let mut end = offset.min(source.len());
    while !source.is_char_boundary(end) {
        end -= 1;
    }
    let before = &source[..end];
    let line = before.matches('\n').count() + 1;
    let column = before.rsplit('\n').next().map_or(0, |tail| tail.chars().count()) + 1;
    (line, column)
}
