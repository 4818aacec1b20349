//! This module defines the core data structures and types used throughout the automaton
//! simulator, including the validated automaton, transitions, run results, and error types.

use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fmt;
use thiserror::Error;

use crate::analyzer::{analyze, Analysis};

/// The maximum allowed size for an automaton definition in bytes.
pub const MAX_DEFINITION_SIZE: usize = 65536; // 64KB
/// The file extension of automaton definition files.
pub const DEFINITION_EXTENSION: &str = "dfa";

/// A state label. States carry no payload and compare by their label.
pub type State = String;
/// An input symbol of the automaton's alphabet.
pub type Symbol = String;

/// A validated deterministic finite automaton.
///
/// An `Automaton` can only be obtained through the builder (see [`crate::builder::build`]),
/// which guarantees that every referenced state and symbol is declared and that each
/// `(state, symbol)` pair has at most one target. It is immutable once built and can be
/// shared freely between threads.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Automaton {
    name: Option<String>,
    states: Vec<State>,
    alphabet: Vec<Symbol>,
    initial: State,
    accepting: Vec<State>,
    transitions: Vec<Transition>,
    delta: HashMap<State, HashMap<Symbol, State>>,
    analysis: Analysis,
}

impl Automaton {
    /// Assembles an automaton from already resolved parts and runs the advisory analysis.
    ///
    /// Callers are responsible for the construction invariants; only the builder calls this.
    pub(crate) fn new(
        name: Option<String>,
        states: Vec<State>,
        alphabet: Vec<Symbol>,
        initial: State,
        accepting: Vec<State>,
        transitions: Vec<Transition>,
    ) -> Self {
        let mut delta: HashMap<State, HashMap<Symbol, State>> = HashMap::new();
        for t in &transitions {
            delta
                .entry(t.from.clone())
                .or_default()
                .insert(t.symbol.clone(), t.to.clone());
        }

        let mut automaton = Self {
            name,
            states,
            alphabet,
            initial,
            accepting,
            transitions,
            delta,
            analysis: Analysis::default(),
        };
        automaton.analysis = analyze(&automaton);

        automaton
    }

    /// Returns the optional display name declared with `name:`.
    pub fn name(&self) -> Option<&str> {
        self.name.as_deref()
    }

    /// Returns the declared states in declaration order.
    pub fn states(&self) -> &[State] {
        &self.states
    }

    /// Returns the declared alphabet in declaration order.
    pub fn alphabet(&self) -> &[Symbol] {
        &self.alphabet
    }

    pub fn initial(&self) -> &str {
        &self.initial
    }

    /// Returns the accepting states in declaration order. May be empty.
    pub fn accepting(&self) -> &[State] {
        &self.accepting
    }

    /// Returns the transitions in declaration order.
    pub fn transitions(&self) -> &[Transition] {
        &self.transitions
    }

    pub fn has_symbol(&self, symbol: &str) -> bool {
        self.alphabet.iter().any(|s| s == symbol)
    }

    pub fn is_accepting(&self, state: &str) -> bool {
        self.accepting.iter().any(|s| s == state)
    }

    /// Looks up the target of the transition leaving `state` on `symbol`.
    ///
    /// Returns `None` when the automaton is incomplete for that pair.
    pub fn next(&self, state: &str, symbol: &str) -> Option<&str> {
        self.delta
            .get(state)
            .and_then(|row| row.get(symbol))
            .map(String::as_str)
    }

    /// Checks whether the alphabet is exactly `{0, 1}`.
    pub fn is_binary(&self) -> bool {
        self.alphabet.len() == 2 && self.has_symbol("0") && self.has_symbol("1")
    }

    /// Checks whether a transition exists for every `(state, symbol)` pair.
    pub fn is_complete(&self) -> bool {
        self.analysis.incomplete_transitions.is_empty()
    }

    /// States that cannot be reached from the initial state, in declaration order.
    pub fn unreachable_states(&self) -> &[State] {
        &self.analysis.unreachable_states
    }

    /// `(state, symbol)` pairs without a transition, in declaration order.
    pub fn incomplete_transitions(&self) -> &[MissingTransition] {
        &self.analysis.incomplete_transitions
    }
}

/// A single transition `from, symbol -> to`.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Transition {
    pub from: State,
    pub symbol: Symbol,
    pub to: State,
}

impl fmt::Display for Transition {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}, {} -> {}", self.from, self.symbol, self.to)
    }
}

/// A `(state, symbol)` pair for which no transition is defined.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct MissingTransition {
    pub state: State,
    pub symbol: Symbol,
}

/// The classification of a finished run.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Verdict {
    /// The input was fully consumed and the final state is accepting.
    Accepted,
    /// The input was fully consumed and the final state is not accepting.
    Rejected,
    /// The automaton had no transition for some symbol. This is not an error: it
    /// means the automaton cannot answer for the given input.
    Stuck,
}

impl fmt::Display for Verdict {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Verdict::Accepted => "accepted",
            Verdict::Rejected => "rejected",
            Verdict::Stuck => "stuck",
        };
        f.write_str(s)
    }
}

/// One simulation of an automaton against one input sequence.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Run {
    /// The full input sequence.
    pub input: Vec<Symbol>,
    /// The initial state followed by the state reached after each consumed symbol.
    pub visited: Vec<State>,
    pub verdict: Verdict,
    /// The input left over when the run got stuck, starting with the symbol that had no
    /// transition. Empty for accepted and rejected runs.
    pub unconsumed: Vec<Symbol>,
}

impl Run {
    /// Returns the state the run ended in.
    pub fn final_state(&self) -> Option<&str> {
        self.visited.last().map(String::as_str)
    }

    /// Returns the prefix of the input that was actually consumed.
    pub fn consumed(&self) -> &[Symbol] {
        &self.input[..self.input.len().saturating_sub(self.unconsumed.len())]
    }
}

/// The kind of item a declaration introduces.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DeclarationKind {
    State,
    Symbol,
    AcceptingState,
}

impl fmt::Display for DeclarationKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            DeclarationKind::State => "state",
            DeclarationKind::Symbol => "symbol",
            DeclarationKind::AcceptingState => "accepting state",
        };
        f.write_str(s)
    }
}

/// The numeric base of an input literal.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum LiteralBase {
    Binary,
    Decimal,
    Hexadecimal,
}

impl fmt::Display for LiteralBase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            LiteralBase::Binary => "binary",
            LiteralBase::Decimal => "decimal",
            LiteralBase::Hexadecimal => "hexadecimal",
        };
        f.write_str(s)
    }
}

/// A malformed line in an automaton definition.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("line {line}: {reason}")]
pub struct SyntaxError {
    /// 1-based line number in the definition text.
    pub line: usize,
    pub reason: String,
}

impl SyntaxError {
    pub fn new(line: usize, reason: impl Into<String>) -> Self {
        Self {
            line,
            reason: reason.into(),
        }
    }
}

/// Represents the errors that can occur while reading, building, or feeding an automaton.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum AutomatonError {
    /// Every structural defect found by the reader, ordered by line. Never empty.
    #[error("{}", format_syntax_errors(.0))]
    Syntax(Vec<SyntaxError>),
    /// A state, symbol, or accepting state was declared twice.
    #[error("line {line}: duplicate {kind} '{name}'")]
    DuplicateDeclaration {
        kind: DeclarationKind,
        name: String,
        line: usize,
    },
    /// A state was referenced but never declared in `states:`.
    #[error("line {line}: undeclared state '{state}'")]
    UndeclaredState { state: State, line: usize },
    /// A transition uses a symbol that is not part of the alphabet.
    #[error("line {line}: undeclared symbol '{symbol}'")]
    UndeclaredSymbol { symbol: Symbol, line: usize },
    /// `initial:` is missing or does not name exactly one state.
    #[error("expected exactly one initial state, found {found}")]
    MissingInitialState { found: usize, line: Option<usize> },
    /// Two transitions leave the same state on the same symbol.
    #[error(
        "line {line}: nondeterministic transition from '{state}' on '{symbol}': \
         '{first}' (line {first_line}) and '{second}'"
    )]
    Nondeterminism {
        state: State,
        symbol: Symbol,
        first: State,
        first_line: usize,
        second: State,
        line: usize,
    },
    /// A literal contains a character outside of its base.
    #[error("invalid {base} literal '{literal}': {reason}")]
    InvalidLiteral {
        literal: String,
        base: LiteralBase,
        reason: String,
    },
    /// An input token is not part of the automaton's alphabet.
    #[error("unknown symbol '{token}'")]
    UnknownSymbol { token: String },
    /// No built-in automaton is registered under the requested key.
    #[error("unknown built-in automaton '{0}'")]
    UnknownAutomaton(String),
    /// Indicates an error related to file system operations, such as reading definition files.
    #[error("File error: {0}")]
    File(String),
}

fn format_syntax_errors(errors: &[SyntaxError]) -> String {
    errors
        .iter()
        .map(ToString::to_string)
        .collect::<Vec<_>>()
        .join("\n")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_verdict_serialization() {
        let json = serde_json::to_string(&Verdict::Stuck).unwrap();
        assert_eq!(json, "\"Stuck\"");

        let verdict: Verdict = serde_json::from_str("\"Accepted\"").unwrap();
        assert_eq!(verdict, Verdict::Accepted);
    }

    #[test]
    fn test_transition_display() {
        let transition = Transition {
            from: "q0".to_string(),
            symbol: "1".to_string(),
            to: "q1".to_string(),
        };

        assert_eq!(transition.to_string(), "q0, 1 -> q1");
    }

    #[test]
    fn test_run_consumed_prefix() {
        let run = Run {
            input: vec!["0".into(), "1".into(), "1".into()],
            visited: vec!["q0".into(), "q0".into()],
            verdict: Verdict::Stuck,
            unconsumed: vec!["1".into(), "1".into()],
        };

        assert_eq!(run.consumed(), &["0".to_string()]);
        assert_eq!(run.final_state(), Some("q0"));
    }

    #[test]
    fn test_run_consumed_with_inconsistent_suffix() {
        let run: Run = serde_json::from_str(
            r#"{"input":["0"],"visited":["q0"],"verdict":"Stuck","unconsumed":["0","1"]}"#,
        )
        .unwrap();

        assert!(run.consumed().is_empty());
    }

    #[test]
    fn test_syntax_error_display() {
        let error = AutomatonError::Syntax(vec![
            SyntaxError::new(2, "unknown section 'foo'"),
            SyntaxError::new(5, "duplicate section 'states'"),
        ]);

        assert_eq!(
            error.to_string(),
            "line 2: unknown section 'foo'\nline 5: duplicate section 'states'"
        );
    }

    #[test]
    fn test_nondeterminism_display_names_both_targets() {
        let error = AutomatonError::Nondeterminism {
            state: "q0".into(),
            symbol: "1".into(),
            first: "q1".into(),
            first_line: 7,
            second: "q0".into(),
            line: 9,
        };

        let msg = error.to_string();
        assert!(msg.contains("'q1'"));
        assert!(msg.contains("'q0'"));
        assert!(msg.starts_with("line 9:"));
    }
}
