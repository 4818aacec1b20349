//! This module provides the advisory checks run on every freshly built automaton:
//! reachability of states from the initial state and completeness of the transition
//! function. Neither check is fatal; their findings are carried into the report.

use crate::types::{Automaton, MissingTransition, State};
use std::collections::HashSet;
use tracing::{debug, warn};

/// The advisory findings of [`analyze`].
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Analysis {
    /// States that cannot be reached from the initial state, in declaration order.
    pub unreachable_states: Vec<State>,
    /// `(state, symbol)` pairs without a transition, in declaration order.
    pub incomplete_transitions: Vec<MissingTransition>,
}

/// Analyzes a built automaton for unreachable states and missing transitions.
///
/// Findings are logged as warnings and returned; they never invalidate the automaton.
pub fn analyze(automaton: &Automaton) -> Analysis {
    let analysis = Analysis {
        unreachable_states: check_unreachable_states(automaton),
        incomplete_transitions: check_completeness(automaton),
    };

    if !analysis.unreachable_states.is_empty() {
        warn!(states = ?analysis.unreachable_states, "unreachable states detected");
    }
    if !analysis.incomplete_transitions.is_empty() {
        warn!(
            missing = analysis.incomplete_transitions.len(),
            "automaton is incomplete"
        );
    }
    debug!(
        states = automaton.states().len(),
        symbols = automaton.alphabet().len(),
        transitions = automaton.transitions().len(),
        "analysis finished"
    );

    analysis
}

/// Finds the states that no sequence of transitions leads to, starting from the
/// initial state.
fn check_unreachable_states(automaton: &Automaton) -> Vec<State> {
    let mut visited: HashSet<&str> = HashSet::new();
    let mut queue = vec![automaton.initial()];

    while let Some(state) = queue.pop() {
        if !visited.insert(state) {
            continue;
        }

        for symbol in automaton.alphabet() {
            if let Some(next) = automaton.next(state, symbol) {
                if !visited.contains(next) {
                    queue.push(next);
                }
            }
        }
    }

    automaton
        .states()
        .iter()
        .filter(|state| !visited.contains(state.as_str()))
        .cloned()
        .collect()
}

/// Lists every `(state, symbol)` pair lacking a transition.
fn check_completeness(automaton: &Automaton) -> Vec<MissingTransition> {
    automaton
        .states()
        .iter()
        .flat_map(|state| {
            automaton
                .alphabet()
                .iter()
                .filter(move |symbol| automaton.next(state, symbol).is_none())
                .map(move |symbol| MissingTransition {
                    state: state.clone(),
                    symbol: symbol.clone(),
                })
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::parser::parse;

    #[test]
    fn test_complete_and_connected() {
        let automaton = parse(
            r#"
states: q0, q1
alphabet: 0, 1
initial: q0
accepting: q1
transitions:
  q0, 0 -> q0
  q0, 1 -> q1
  q1, 0 -> q1
  q1, 1 -> q0
"#,
        )
        .unwrap();

        let analysis = analyze(&automaton);
        assert!(analysis.unreachable_states.is_empty());
        assert!(analysis.incomplete_transitions.is_empty());
        assert!(automaton.is_complete());
    }

    #[test]
    fn test_unreachable_states() {
        let automaton = parse(
            r#"
states: start, middle, end, island
alphabet: a
initial: start
transitions:
  start, a -> middle
  middle, a -> end
  end, a -> end
  island, a -> start
"#,
        )
        .unwrap();

        // `island` leads into the reachable part but nothing leads to it.
        assert_eq!(automaton.unreachable_states(), &["island".to_string()]);
    }

    #[test]
    fn test_incomplete_transitions_in_declaration_order() {
        let automaton = parse(
            r#"
states: q0, q1
alphabet: 0, 1
initial: q0
transitions:
  q0, 0 -> q1
"#,
        )
        .unwrap();

        let missing: Vec<(&str, &str)> = automaton
            .incomplete_transitions()
            .iter()
            .map(|m| (m.state.as_str(), m.symbol.as_str()))
            .collect();

        assert_eq!(missing, vec![("q0", "1"), ("q1", "0"), ("q1", "1")]);
        assert!(!automaton.is_complete());
    }

    #[test]
    fn test_state_only_reachable_through_itself_is_unreachable() {
        let automaton = parse(
            r#"
states: q0, loop
alphabet: x
initial: q0
transitions:
  q0, x -> q0
  loop, x -> loop
"#,
        )
        .unwrap();

        assert_eq!(automaton.unreachable_states(), &["loop".to_string()]);
    }
}
