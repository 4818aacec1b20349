//! This crate provides the core logic for a deterministic finite automaton simulator.
//! It includes modules for reading automaton definitions, validating them, converting
//! input literals into symbols, simulating runs, and assembling reports of the results.

pub mod analyzer;
pub mod builder;
pub mod catalog;
pub mod converter;
pub mod loader;
pub mod parser;
pub mod report;
pub mod simulator;
pub mod types;
pub mod writer;

/// Re-exports the `Rule` enum from the parser module, used by the `pest` grammar.
pub use crate::parser::Rule;
/// Re-exports the `Analysis` struct produced by the advisory checks.
pub use analyzer::Analysis;
/// Re-exports the `build` function from the builder module.
pub use builder::build;
/// Re-exports the `Catalog` of embedded automata.
pub use catalog::{Catalog, CatalogInfo};
/// Re-exports the literal conversion API from the converter module.
pub use converter::{convert, Literal};
/// Re-exports the `DefinitionLoader` struct from the loader module.
pub use loader::DefinitionLoader;
/// Re-exports the reader entry points from the parser module.
pub use parser::{parse, read, Definition};
/// Re-exports the report types from the report module.
pub use report::{AutomatonSummary, Report, ReportTotals, RunRecord};
/// Re-exports the simulation API from the simulator module.
pub use simulator::{execute, simulate, simulate_all, Simulator, Step};
/// Re-exports the core types of the automaton model.
pub use types::{
    Automaton, AutomatonError, DeclarationKind, LiteralBase, MissingTransition, Run, State, Symbol,
    SyntaxError, Transition, Verdict, MAX_DEFINITION_SIZE,
};
/// Re-exports the `write` function from the writer module.
pub use writer::write;
