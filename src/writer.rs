//! This module renders an automaton back into definition text.
//!
//! The output is canonical: sections in a fixed order, values comma separated, and
//! transitions in declaration order. Parsing the output yields an equal automaton.

use crate::types::Automaton;

/// Writes the automaton in the definition format understood by [`crate::parser::parse`].
pub fn write(automaton: &Automaton) -> String {
    let mut out = String::new();

    if let Some(name) = automaton.name() {
        out.push_str(&format!("name: {name}\n"));
    }
    out.push_str(&format!("states: {}\n", automaton.states().join(", ")));
    out.push_str(&format!("alphabet: {}\n", automaton.alphabet().join(", ")));
    out.push_str(&format!("initial: {}\n", automaton.initial()));
    out.push_str(&format!("accepting: {}\n", automaton.accepting().join(", ")));
    out.push_str("transitions:\n");

    for transition in automaton.transitions() {
        out.push_str(&format!("  {transition}\n"));
    }

    out
}
