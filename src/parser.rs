//! This module provides the reader for automaton definitions, utilizing the `pest` crate.
//! It turns definition text into an unvalidated [`Definition`] and exposes [`parse`], which
//! runs the reader and the builder in one go.
//!
//! The format is line oriented:
//!
//! ```text
//! # comments run to the end of the line
//! name: Parity of ones
//! states: q0, q1
//! alphabet: 0, 1
//! initial: q0
//! accepting: q1
//! transitions:
//!   q0, 0 -> q0
//!   q0, 1 -> q1
//!   q1, 0 -> q1
//!   q1, 1 -> q0
//! ```
//!
//! Values may be separated by commas, whitespace, or both. `accepting:` and
//! `transitions:` may be omitted, in which case they are empty.

use crate::{
    builder::build,
    types::{Automaton, AutomatonError, SyntaxError},
};
use pest::{error::LineColLocation, iterators::Pair, Parser as PestParser};
use pest_derive::Parser as PestParser;
use std::collections::HashMap;
use std::fmt;
use tracing::debug;

/// Derives a `PestParser` for the definition line grammar defined in `grammar.pest`.
#[derive(PestParser)]
#[grammar = "grammar.pest"]
pub struct DefinitionParser;

/// The sections a definition can declare.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SectionKind {
    Name,
    States,
    Alphabet,
    Initial,
    Accepting,
    Transitions,
}

impl SectionKind {
    fn from_key(key: &str) -> Option<Self> {
        match key.to_ascii_lowercase().as_str() {
            "name" => Some(Self::Name),
            "states" => Some(Self::States),
            "alphabet" => Some(Self::Alphabet),
            "initial" => Some(Self::Initial),
            "accepting" => Some(Self::Accepting),
            "transitions" => Some(Self::Transitions),
            _ => None,
        }
    }
}

impl fmt::Display for SectionKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            SectionKind::Name => "name",
            SectionKind::States => "states",
            SectionKind::Alphabet => "alphabet",
            SectionKind::Initial => "initial",
            SectionKind::Accepting => "accepting",
            SectionKind::Transitions => "transitions",
        };
        f.write_str(s)
    }
}

/// A list section (`states:`, `alphabet:`, ...) as written.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Section {
    /// Line of the section header.
    pub line: usize,
    pub items: Vec<String>,
}

/// A `from, symbol -> to` line as written.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TransitionLine {
    pub line: usize,
    pub from: String,
    pub symbol: String,
    pub to: String,
}

/// The unvalidated structure of a definition. Identifiers are not resolved yet.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Definition {
    pub name: Option<String>,
    pub states: Section,
    pub alphabet: Section,
    pub initial: Option<Section>,
    pub accepting: Option<Section>,
    pub transitions: Vec<TransitionLine>,
}

/// Parses definition text into a validated [`Automaton`].
///
/// This is the main entry point. All syntax errors are collected first; if there are
/// any, they are returned together as [`AutomatonError::Syntax`] and the builder is not
/// run. Otherwise the builder resolves the definition and stops at the first semantic
/// error.
pub fn parse(input: &str) -> Result<Automaton, AutomatonError> {
    let definition = read(input).map_err(AutomatonError::Syntax)?;
    build(&definition)
}

/// Reads definition text into its unvalidated structure.
///
/// Every malformed line is reported. The returned error list is never empty.
pub fn read(input: &str) -> Result<Definition, Vec<SyntaxError>> {
    let mut reader = Reader::default();

    for (index, text) in input.lines().enumerate() {
        reader.read_line(index + 1, text);
    }

    reader.finish(input.lines().count())
}

/// Where subsequent transition lines belong.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
enum Context {
    #[default]
    Start,
    Section(SectionKind),
    /// Inside a section that was already reported as broken; its body is skipped.
    Ignored,
}

#[derive(Default)]
struct Reader {
    definition: Definition,
    seen: HashMap<SectionKind, usize>,
    context: Context,
    errors: Vec<SyntaxError>,
}

impl Reader {
    fn read_line(&mut self, line: usize, text: &str) {
        let pair = match DefinitionParser::parse(Rule::line, text) {
            Ok(mut pairs) => match pairs.next() {
                Some(pair) => pair,
                None => return,
            },
            Err(e) => {
                self.errors.push(syntax_error(line, e));
                if looks_like_header(text) {
                    self.context = Context::Ignored;
                }
                return;
            }
        };

        for p in pair.into_inner() {
            match p.as_rule() {
                Rule::name_header => {
                    let text = parse_inner_string(p);
                    if self.open(SectionKind::Name, line) {
                        let name = text.trim();
                        self.definition.name = (!name.is_empty()).then(|| name.to_string());
                    }
                }
                Rule::header => self.read_header(line, p),
                Rule::transition => self.read_transition(line, p),
                _ => {} // EOI
            }
        }
    }

    fn read_header(&mut self, line: usize, pair: Pair<Rule>) {
        let mut pairs = pair.into_inner();
        let key = pairs.next().map(|p| p.as_str()).unwrap_or_default();
        let values: Vec<String> = pairs
            .next()
            .map(|p| p.into_inner().map(|v| v.as_str().to_string()).collect())
            .unwrap_or_default();

        let Some(kind) = SectionKind::from_key(key) else {
            self.errors.push(SyntaxError::new(line, format!("unknown section '{key}'")));
            self.context = Context::Ignored;
            return;
        };

        if !self.open(kind, line) {
            return;
        }

        let section = Section {
            line,
            items: values,
        };

        match kind {
            SectionKind::States | SectionKind::Alphabet if section.items.is_empty() => {
                self.errors.push(SyntaxError::new(
                    line,
                    format!("section '{kind}' declares no values"),
                ));
            }
            SectionKind::States => self.definition.states = section,
            SectionKind::Alphabet => self.definition.alphabet = section,
            SectionKind::Initial => self.definition.initial = Some(section),
            SectionKind::Accepting => self.definition.accepting = Some(section),
            SectionKind::Transitions if !section.items.is_empty() => {
                self.errors.push(SyntaxError::new(
                    line,
                    "section 'transitions' takes no inline values, list transitions on the following lines",
                ));
            }
            SectionKind::Transitions | SectionKind::Name => {}
        }
    }

    fn read_transition(&mut self, line: usize, pair: Pair<Rule>) {
        match self.context {
            Context::Section(SectionKind::Transitions) => {}
            Context::Ignored => return,
            _ => {
                self.errors.push(SyntaxError::new(
                    line,
                    "transition outside of 'transitions' section",
                ));
                return;
            }
        }

        let mut operands = pair.into_inner().map(|p| {
            p.into_inner()
                .map(|v| v.as_str().to_string())
                .collect::<Vec<_>>()
        });
        let lhs = operands.next().unwrap_or_default();
        let rhs = operands.next().unwrap_or_default();

        match (lhs.as_slice(), rhs.as_slice()) {
            ([from, symbol], [to]) => self.definition.transitions.push(TransitionLine {
                line,
                from: from.clone(),
                symbol: symbol.clone(),
                to: to.clone(),
            }),
            _ => self.errors.push(SyntaxError::new(
                line,
                format!(
                    "expected '<state>, <symbol> -> <state>', found {} token(s) before '->' and {} after",
                    lhs.len(),
                    rhs.len()
                ),
            )),
        }
    }

    /// Enters a section, reporting it when it was declared before.
    ///
    /// Returns `false` when the section is a duplicate and its content must be ignored.
    fn open(&mut self, kind: SectionKind, line: usize) -> bool {
        if let Some(first) = self.seen.get(&kind) {
            self.errors.push(SyntaxError::new(
                line,
                format!("duplicate section '{kind}' (first declared on line {first})"),
            ));
            self.context = Context::Ignored;
            return false;
        }

        self.seen.insert(kind, line);
        self.context = Context::Section(kind);
        true
    }

    fn finish(mut self, lines: usize) -> Result<Definition, Vec<SyntaxError>> {
        // Missing sections are reported against the end of the input.
        let end = lines.max(1);
        if !self.seen.contains_key(&SectionKind::States) {
            self.errors.push(SyntaxError::new(end, "missing 'states' section"));
        }
        if !self.seen.contains_key(&SectionKind::Alphabet) {
            self.errors.push(SyntaxError::new(end, "missing 'alphabet' section"));
        }

        if !self.errors.is_empty() {
            debug!(errors = self.errors.len(), "definition rejected by reader");
            return Err(self.errors);
        }

        Ok(self.definition)
    }
}

/// Converts a `pest` error on a single line into a [`SyntaxError`] for that line.
fn syntax_error(line: usize, error: pest::error::Error<Rule>) -> SyntaxError {
    let column = match error.line_col {
        LineColLocation::Pos((_, col)) | LineColLocation::Span((_, col), _) => col,
    };
    let error = error.renamed_rules(|rule| match rule {
        Rule::value => "identifier".to_string(),
        Rule::key => "section name".to_string(),
        Rule::header | Rule::name_header => "section header".to_string(),
        Rule::transition => "transition".to_string(),
        Rule::EOI => "end of line".to_string(),
        other => format!("{other:?}"),
    });

    SyntaxError::new(line, format!("column {column}: {}", error.variant.message()))
}

/// Checks whether a line that failed to parse was meant as a section header.
///
/// A broken header still opens a section, so the lines below it are skipped
/// instead of being reported against the previous section.
fn looks_like_header(text: &str) -> bool {
    let text = text.split('#').next().unwrap_or_default();
    match (text.find(':'), text.find("->")) {
        (Some(colon), Some(arrow)) => colon < arrow,
        (Some(_), None) => true,
        (None, _) => false,
    }
}

/// Extracts the inner string content from a `Pair`.
fn parse_inner_string(pair: Pair<Rule>) -> String {
    pair.into_inner()
        .next()
        .map(|p| p.as_str().to_string())
        .unwrap_or_default()
}
