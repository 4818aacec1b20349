//! This module assembles simulation results into a [`Report`], the structure handed to
//! external renderers. A report is a plain, serializable record: rendering it requires no
//! knowledge of automaton semantics.

use crate::types::{Automaton, MissingTransition, Run, State, Symbol, Transition, Verdict};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Everything a renderer needs to know about the automaton itself.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AutomatonSummary {
    #[serde(skip_serializing_if = "Option::is_none", default)]
    pub name: Option<String>,
    pub states: Vec<State>,
    pub alphabet: Vec<Symbol>,
    pub initial: State,
    pub accepting: Vec<State>,
    pub transitions: Vec<Transition>,
    pub unreachable_states: Vec<State>,
    pub incomplete_transitions: Vec<MissingTransition>,
}

impl From<&Automaton> for AutomatonSummary {
    fn from(automaton: &Automaton) -> Self {
        Self {
            name: automaton.name().map(String::from),
            states: automaton.states().to_vec(),
            alphabet: automaton.alphabet().to_vec(),
            initial: automaton.initial().to_string(),
            accepting: automaton.accepting().to_vec(),
            transitions: automaton.transitions().to_vec(),
            unreachable_states: automaton.unreachable_states().to_vec(),
            incomplete_transitions: automaton.incomplete_transitions().to_vec(),
        }
    }
}

/// One run as it appears in a report.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RunRecord {
    /// The literal as supplied by the caller.
    pub input_literal: String,
    pub input_symbols: Vec<Symbol>,
    pub visited_states: Vec<State>,
    pub verdict: Verdict,
    /// Present only for stuck runs.
    #[serde(skip_serializing_if = "Option::is_none", default)]
    pub unconsumed_suffix: Option<Vec<Symbol>>,
}

impl RunRecord {
    pub fn new(input_literal: impl Into<String>, run: Run) -> Self {
        let unconsumed_suffix = (run.verdict == Verdict::Stuck).then_some(run.unconsumed);

        Self {
            input_literal: input_literal.into(),
            input_symbols: run.input,
            visited_states: run.visited,
            verdict: run.verdict,
            unconsumed_suffix,
        }
    }
}

/// Verdict counts over all runs of a report.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReportTotals {
    pub runs: usize,
    pub accepted: usize,
    pub rejected: usize,
    pub stuck: usize,
}

/// The complete output of one invocation: the automaton plus its runs, in order.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Report {
    pub automaton: AutomatonSummary,
    pub runs: Vec<RunRecord>,
    pub totals: ReportTotals,
}

impl Report {
    /// Aggregates `(literal, run)` pairs into a report, preserving their order.
    pub fn assemble<I, L>(automaton: &Automaton, runs: I) -> Self
    where
        I: IntoIterator<Item = (L, Run)>,
        L: Into<String>,
    {
        let runs: Vec<RunRecord> = runs
            .into_iter()
            .map(|(literal, run)| RunRecord::new(literal, run))
            .collect();

        let totals = runs.iter().fold(
            ReportTotals {
                runs: runs.len(),
                ..Default::default()
            },
            |mut totals, record| {
                match record.verdict {
                    Verdict::Accepted => totals.accepted += 1,
                    Verdict::Rejected => totals.rejected += 1,
                    Verdict::Stuck => totals.stuck += 1,
                }
                totals
            },
        );

        Self {
            automaton: AutomatonSummary::from(automaton),
            runs,
            totals,
        }
    }

    /// Serializes the report as pretty-printed JSON.
    pub fn to_json(&self) -> serde_json::Result<String> {
        serde_json::to_string_pretty(self)
    }
}

impl fmt::Display for Report {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let a = &self.automaton;

        if let Some(name) = &a.name {
            writeln!(f, "{name}")?;
        }
        writeln!(f, "states:    {}", a.states.join(", "))?;
        writeln!(f, "alphabet:  {}", a.alphabet.join(", "))?;
        writeln!(f, "initial:   {}", a.initial)?;
        writeln!(f, "accepting: {}", a.accepting.join(", "))?;

        if !a.unreachable_states.is_empty() {
            writeln!(f, "warning: unreachable states: {}", a.unreachable_states.join(", "))?;
        }
        if !a.incomplete_transitions.is_empty() {
            let missing = a
                .incomplete_transitions
                .iter()
                .map(|m| format!("({}, {})", m.state, m.symbol))
                .collect::<Vec<_>>()
                .join(", ");
            writeln!(f, "warning: missing transitions: {missing}")?;
        }

        for record in &self.runs {
            writeln!(f)?;
            writeln!(f, "input:   {}", record.input_literal)?;
            writeln!(f, "symbols: {}", record.input_symbols.join(" "))?;
            writeln!(f, "trace:   {}", record.visited_states.join(" -> "))?;
            match &record.unconsumed_suffix {
                Some(rest) => writeln!(
                    f,
                    "verdict: {} (unconsumed: {})",
                    record.verdict,
                    rest.join(" ")
                )?,
                None => writeln!(f, "verdict: {}", record.verdict)?,
            }
        }

        let t = &self.totals;
        writeln!(f)?;
        write!(
            f,
            "{} run(s): {} accepted, {} rejected, {} stuck",
            t.runs, t.accepted, t.rejected, t.stuck
        )
    }
}
