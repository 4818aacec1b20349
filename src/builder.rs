//! This module resolves a [`Definition`] produced by the reader into a validated
//! [`Automaton`].
//!
//! Resolution runs in a fixed order: states, alphabet, initial state, accepting states,
//! transitions. Later steps depend on the sets declared by earlier ones, so the builder
//! stops at the first error it finds. An automaton is either fully valid or not returned
//! at all.

use crate::parser::{Definition, Section, TransitionLine};
use crate::types::{Automaton, AutomatonError, DeclarationKind, State, Symbol, Transition};
use std::collections::{HashMap, HashSet};
use tracing::debug;

/// Builds a validated automaton from its unvalidated structure.
///
/// # Returns
///
/// * `Ok(Automaton)` if every identifier resolves and the transitions are deterministic.
/// * `Err(AutomatonError::DuplicateDeclaration)` if a state, symbol, or accepting state
///   is declared twice.
/// * `Err(AutomatonError::MissingInitialState)` if `initial:` does not name exactly one state.
/// * `Err(AutomatonError::UndeclaredState)` / `Err(AutomatonError::UndeclaredSymbol)` if
///   an identifier is used without being declared.
/// * `Err(AutomatonError::Nondeterminism)` if a `(state, symbol)` pair has two targets.
pub fn build(definition: &Definition) -> Result<Automaton, AutomatonError> {
    let states = declare(&definition.states, DeclarationKind::State)?;
    let alphabet = declare(&definition.alphabet, DeclarationKind::Symbol)?;

    let initial = resolve_initial(definition, &states)?;
    let accepting = resolve_accepting(definition.accepting.as_ref(), &states)?;
    let transitions = resolve_transitions(&definition.transitions, &states, &alphabet)?;

    debug!(
        states = states.len(),
        symbols = alphabet.len(),
        transitions = transitions.len(),
        "automaton resolved"
    );

    Ok(Automaton::new(
        definition.name.clone(),
        states,
        alphabet,
        initial,
        accepting,
        transitions,
    ))
}

/// Collects the items of a declaration section, rejecting duplicates.
fn declare(section: &Section, kind: DeclarationKind) -> Result<Vec<String>, AutomatonError> {
    let mut seen = HashSet::new();

    for item in &section.items {
        if !seen.insert(item.as_str()) {
            return Err(AutomatonError::DuplicateDeclaration {
                kind,
                name: item.clone(),
                line: section.line,
            });
        }
    }

    Ok(section.items.clone())
}

/// Resolves `initial:` to exactly one declared state.
fn resolve_initial(definition: &Definition, states: &[State]) -> Result<State, AutomatonError> {
    let Some(section) = &definition.initial else {
        return Err(AutomatonError::MissingInitialState {
            found: 0,
            line: None,
        });
    };

    let [initial] = section.items.as_slice() else {
        return Err(AutomatonError::MissingInitialState {
            found: section.items.len(),
            line: Some(section.line),
        });
    };

    check_state(initial, states, section.line)?;

    Ok(initial.clone())
}

/// Resolves `accepting:`. An absent or empty section yields an empty set.
fn resolve_accepting(
    section: Option<&Section>,
    states: &[State],
) -> Result<Vec<State>, AutomatonError> {
    let Some(section) = section else {
        return Ok(Vec::new());
    };

    let accepting = declare(section, DeclarationKind::AcceptingState)?;
    for state in &accepting {
        check_state(state, states, section.line)?;
    }

    Ok(accepting)
}

/// Resolves every transition line, enforcing determinism.
fn resolve_transitions(
    lines: &[TransitionLine],
    states: &[State],
    alphabet: &[Symbol],
) -> Result<Vec<Transition>, AutomatonError> {
    // (from, symbol) -> (to, line)
    let mut targets: HashMap<(&str, &str), (&str, usize)> = HashMap::new();
    let mut transitions = Vec::with_capacity(lines.len());

    for t in lines {
        check_state(&t.from, states, t.line)?;
        check_symbol(&t.symbol, alphabet, t.line)?;
        check_state(&t.to, states, t.line)?;

        if let Some(&(first, first_line)) = targets.get(&(t.from.as_str(), t.symbol.as_str())) {
            return Err(AutomatonError::Nondeterminism {
                state: t.from.clone(),
                symbol: t.symbol.clone(),
                first: first.to_string(),
                first_line,
                second: t.to.clone(),
                line: t.line,
            });
        }

        targets.insert((t.from.as_str(), t.symbol.as_str()), (t.to.as_str(), t.line));
        transitions.push(Transition {
            from: t.from.clone(),
            symbol: t.symbol.clone(),
            to: t.to.clone(),
        });
    }

    Ok(transitions)
}

fn check_state(state: &str, states: &[State], line: usize) -> Result<(), AutomatonError> {
    if states.iter().any(|s| s == state) {
        return Ok(());
    }

    Err(AutomatonError::UndeclaredState {
        state: state.to_string(),
        line,
    })
}

fn check_symbol(symbol: &str, alphabet: &[Symbol], line: usize) -> Result<(), AutomatonError> {
    if alphabet.iter().any(|s| s == symbol) {
        return Ok(());
    }

    Err(AutomatonError::UndeclaredSymbol {
        symbol: symbol.to_string(),
        line,
    })
}
