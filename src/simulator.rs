//! This module defines the `Simulator` struct, which executes a validated automaton over a
//! sequence of input symbols, and the pure [`simulate`] function built on top of it.

use crate::converter::{convert, Literal};
use crate::types::{Automaton, AutomatonError, Run, Symbol, Verdict};
use rayon::prelude::*;
use tracing::{debug, trace};

/// Represents the outcome of a single simulation step.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Step {
    /// A symbol was consumed and the run continues.
    Continue,
    /// The run is over. Further calls to [`Simulator::step`] return the same verdict.
    Halt(Verdict),
}

/// Steps an automaton through an input sequence one symbol at a time.
///
/// The simulator borrows the automaton, so any number of simulators can run over the
/// same automaton at once.
pub struct Simulator<'a> {
    automaton: &'a Automaton,
    input: Vec<Symbol>,
    position: usize,
    trace: Vec<&'a str>,
}

impl<'a> Simulator<'a> {
    /// Creates a simulator positioned before the first symbol, in the initial state.
    ///
    /// Symbols outside the alphabet are not rejected here; they have no transition and
    /// make the run stuck. Use [`convert`] to validate external input first.
    pub fn new<I, S>(automaton: &'a Automaton, input: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<Symbol>,
    {
        Self {
            automaton,
            input: input.into_iter().map(Into::into).collect(),
            position: 0,
            trace: vec![automaton.initial()],
        }
    }

    /// Consumes the next input symbol.
    ///
    /// # Returns
    ///
    /// * `Step::Continue` if a transition was taken.
    /// * `Step::Halt(Verdict::Accepted | Verdict::Rejected)` once the input is exhausted.
    /// * `Step::Halt(Verdict::Stuck)` if no transition exists for the next symbol.
    pub fn step(&mut self) -> Step {
        let state = self.state();

        let Some(symbol) = self.input.get(self.position) else {
            return Step::Halt(if self.automaton.is_accepting(state) {
                Verdict::Accepted
            } else {
                Verdict::Rejected
            });
        };

        let Some(next) = self.automaton.next(state, symbol) else {
            trace!(state, symbol = symbol.as_str(), "no transition");
            return Step::Halt(Verdict::Stuck);
        };

        trace!(state, symbol = symbol.as_str(), next, "transition");
        self.trace.push(next);
        self.position += 1;

        Step::Continue
    }

    /// Runs until the input is exhausted or the automaton gets stuck.
    pub fn run(&mut self) -> Run {
        let verdict = loop {
            if let Step::Halt(verdict) = self.step() {
                break verdict;
            }
        };

        Run {
            input: self.input.clone(),
            visited: self.trace.iter().map(|s| s.to_string()).collect(),
            verdict,
            unconsumed: self.remaining().to_vec(),
        }
    }

    /// Returns the current state.
    pub fn state(&self) -> &'a str {
        // The trace is never empty, it starts with the initial state.
        self.trace
            .last()
            .copied()
            .unwrap_or(self.automaton.initial())
    }

    /// Returns the number of symbols consumed so far.
    pub fn position(&self) -> usize {
        self.position
    }

    /// Returns the states visited so far, starting with the initial state.
    pub fn trace(&self) -> &[&'a str] {
        &self.trace
    }

    /// Returns the input symbols not consumed yet.
    pub fn remaining(&self) -> &[Symbol] {
        &self.input[self.position..]
    }

    /// Resets the simulator to the initial state, keeping its input.
    pub fn reset(&mut self) {
        self.position = 0;
        self.trace.clear();
        self.trace.push(self.automaton.initial());
    }
}

/// Simulates the automaton over the given symbols.
///
/// This is a pure function of its arguments: the same automaton and input always
/// produce the same run.
pub fn simulate<I, S>(automaton: &Automaton, input: I) -> Run
where
    I: IntoIterator<Item = S>,
    S: Into<Symbol>,
{
    Simulator::new(automaton, input).run()
}

/// Converts a literal and simulates the automaton over the resulting symbols.
pub fn execute(automaton: &Automaton, literal: &Literal) -> Result<Run, AutomatonError> {
    let symbols = convert(automaton, literal)?;
    let run = simulate(automaton, symbols);

    debug!(
        literal = %literal,
        verdict = %run.verdict,
        steps = run.visited.len() - 1,
        "run finished"
    );

    Ok(run)
}

/// Executes many literals in parallel, one result per literal, in input order.
pub fn simulate_all(
    automaton: &Automaton,
    literals: &[Literal],
) -> Vec<Result<Run, AutomatonError>> {
    literals
        .par_iter()
        .map(|literal| execute(automaton, literal))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::parser::parse;
    use crate::types::State;

    const PARITY: &str = r#"
states: q0, q1
alphabet: 0, 1
initial: q0
accepting: q1
transitions:
  q0, 0 -> q0
  q0, 1 -> q1
  q1, 0 -> q1
  q1, 1 -> q0
"#;

    fn parity() -> Automaton {
        parse(PARITY).unwrap()
    }

    fn states(items: &[&str]) -> Vec<State> {
        items.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn test_parity_rejects_even_number_of_ones() {
        let run = execute(&parity(), &Literal::binary("101")).unwrap();

        assert_eq!(run.visited, states(&["q0", "q1", "q1", "q0"]));
        assert_eq!(run.verdict, Verdict::Rejected);
        assert!(run.unconsumed.is_empty());
    }

    #[test]
    fn test_parity_accepts_odd_number_of_ones() {
        let run = execute(&parity(), &Literal::binary("111")).unwrap();

        assert_eq!(run.visited, states(&["q0", "q1", "q0", "q1"]));
        assert_eq!(run.verdict, Verdict::Accepted);
    }

    #[test]
    fn test_empty_input_uses_initial_state() {
        let rejecting = parity();
        let run = simulate(&rejecting, Vec::<Symbol>::new());
        assert_eq!(run.visited, states(&["q0"]));
        assert_eq!(run.verdict, Verdict::Rejected);

        let accepting = parse("states: q0\nalphabet: 0\ninitial: q0\naccepting: q0\n").unwrap();
        let run = simulate(&accepting, Vec::<Symbol>::new());
        assert_eq!(run.visited, states(&["q0"]));
        assert_eq!(run.verdict, Verdict::Accepted);
    }

    #[test]
    fn test_incomplete_automaton_gets_stuck() {
        let automaton = parse(
            "states: q0, q1\nalphabet: 0, 1\ninitial: q0\naccepting: q0\ntransitions:\n  q0, 0 -> q0\n",
        )
        .unwrap();

        let run = simulate(&automaton, ["1"]);
        assert_eq!(run.verdict, Verdict::Stuck);
        assert_eq!(run.visited, states(&["q0"]));
        assert_eq!(run.unconsumed, vec!["1".to_string()]);

        let run = simulate(&automaton, ["0", "0", "1", "0"]);
        assert_eq!(run.verdict, Verdict::Stuck);
        assert_eq!(run.visited, states(&["q0", "q0", "q0"]));
        assert_eq!(run.unconsumed, vec!["1".to_string(), "0".to_string()]);
        assert_eq!(run.consumed().len(), 2);
    }

    #[test]
    fn test_simulation_is_repeatable() {
        let automaton = parity();
        let input = ["1", "0", "0", "1", "1"];

        let first = simulate(&automaton, input);
        let second = simulate(&automaton, input);

        assert_eq!(first, second);
    }

    #[test]
    fn test_stepwise_matches_simulate() {
        let automaton = parity();
        let mut simulator = Simulator::new(&automaton, ["1", "1", "0"]);

        assert_eq!(simulator.state(), "q0");
        assert_eq!(simulator.step(), Step::Continue);
        assert_eq!(simulator.state(), "q1");
        assert_eq!(simulator.position(), 1);
        assert_eq!(simulator.step(), Step::Continue);
        assert_eq!(simulator.step(), Step::Continue);
        assert_eq!(simulator.step(), Step::Halt(Verdict::Rejected));
        // Halting is sticky.
        assert_eq!(simulator.step(), Step::Halt(Verdict::Rejected));

        assert_eq!(simulator.trace(), &["q0", "q1", "q0", "q0"]);
        assert_eq!(simulator.run(), simulate(&automaton, ["1", "1", "0"]));
    }

    #[test]
    fn test_reset() {
        let automaton = parity();
        let mut simulator = Simulator::new(&automaton, ["1"]);

        simulator.run();
        assert_eq!(simulator.state(), "q1");

        simulator.reset();
        assert_eq!(simulator.state(), "q0");
        assert_eq!(simulator.position(), 0);
        assert_eq!(simulator.remaining(), &["1".to_string()]);
    }

    #[test]
    fn test_symbol_outside_alphabet_gets_stuck() {
        let run = simulate(&parity(), ["1", "x"]);

        assert_eq!(run.verdict, Verdict::Stuck);
        assert_eq!(run.unconsumed, vec!["x".to_string()]);
    }

    #[test]
    fn test_simulate_all_preserves_order() {
        let automaton = parity();
        let literals = vec![
            Literal::binary("111"),
            Literal::decimal("5"),
            Literal::binary("12"),
            Literal::hexadecimal("1"),
        ];

        let results = simulate_all(&automaton, &literals);

        assert_eq!(results.len(), 4);
        assert_eq!(results[0].as_ref().unwrap().verdict, Verdict::Accepted);
        assert_eq!(results[1].as_ref().unwrap().verdict, Verdict::Rejected);
        assert!(matches!(
            results[2],
            Err(AutomatonError::InvalidLiteral { .. })
        ));
        assert_eq!(results[3].as_ref().unwrap().verdict, Verdict::Accepted);
    }

    #[test]
    fn test_automaton_is_shareable_across_threads() {
        fn assert_send_sync<T: Send + Sync>() {}
        assert_send_sync::<Automaton>();

        let automaton = parity();
        let runs: Vec<Run> = std::thread::scope(|scope| {
            let handles: Vec<_> = ["1", "11", "111"]
                .iter()
                .map(|bits| {
                    let automaton = &automaton;
                    scope.spawn(move || execute(automaton, &Literal::binary(*bits)).unwrap())
                })
                .collect();
            handles.into_iter().map(|h| h.join().unwrap()).collect()
        });

        let verdicts: Vec<Verdict> = runs.iter().map(|r| r.verdict).collect();
        assert_eq!(
            verdicts,
            vec![Verdict::Accepted, Verdict::Rejected, Verdict::Accepted]
        );
    }
}
