use afd::{
    convert, simulate_all, write, Automaton, AutomatonError, Catalog, DefinitionLoader, Literal,
    Report, Run, Simulator, Step,
};
use clap::{Parser, ValueEnum};
use std::path::PathBuf;
use std::process::ExitCode;
use tracing::Level;

#[derive(Clone, Copy, Debug, PartialEq, Eq, ValueEnum)]
enum Base {
    /// `0b`/`0d`/`0x` prefixes, otherwise binary for {0, 1} alphabets and tokens for others
    Auto,
    Bin,
    Dec,
    Hex,
    /// Whitespace or comma separated alphabet symbols
    Tokens,
}

#[derive(Parser)]
#[clap(author, version, about, long_about = None, arg_required_else_help = true)]
struct Cli {
    /// The automaton definition file to load
    #[clap(short, long, conflicts_with = "builtin")]
    automaton: Option<PathBuf>,

    /// Use a built-in automaton (see --list)
    #[clap(short, long)]
    builtin: Option<String>,

    /// An input to run the automaton on, may be repeated
    #[clap(short, long)]
    input: Vec<String>,

    /// How inputs are interpreted
    #[clap(long, value_enum, default_value_t = Base::Auto)]
    base: Base,

    /// Print each step of the execution
    #[clap(short = 'd', long, conflicts_with = "json")]
    debug: bool,

    /// Print the report as JSON
    #[clap(long)]
    json: bool,

    /// Print the automaton in canonical definition form
    #[clap(long)]
    canonical: bool,

    /// List the built-in automata
    #[clap(short, long)]
    list: bool,

    /// Increase log verbosity (-v, -vv, -vvv)
    #[clap(short, long, action = clap::ArgAction::Count)]
    verbose: u8,
}

fn main() -> ExitCode {
    let cli = Cli::parse();

    let level = match cli.verbose {
        0 => Level::WARN,
        1 => Level::INFO,
        2 => Level::DEBUG,
        _ => Level::TRACE,
    };
    tracing_subscriber::fmt()
        .with_max_level(level)
        .with_writer(std::io::stderr)
        .init();

    match run(&cli) {
        Ok(code) => code,
        Err(e) => {
            eprintln!("error: {e}");
            ExitCode::FAILURE
        }
    }
}

fn run(cli: &Cli) -> Result<ExitCode, AutomatonError> {
    if cli.list {
        for key in Catalog::names() {
            let info = Catalog::info(key)?;
            println!(
                "{:<20} {} ({} states, {} symbols{})",
                info.key,
                info.name,
                info.state_count,
                info.symbol_count,
                if info.complete { "" } else { ", incomplete" }
            );
        }
        return Ok(ExitCode::SUCCESS);
    }

    let automaton = match (&cli.automaton, &cli.builtin) {
        (Some(path), _) => DefinitionLoader::load(path)?,
        (None, Some(key)) => Catalog::get(key)?,
        (None, None) => {
            return Err(AutomatonError::File(
                "either --automaton or --builtin is required".to_string(),
            ))
        }
    };

    if cli.canonical {
        print!("{}", write(&automaton));
        if cli.input.is_empty() {
            return Ok(ExitCode::SUCCESS);
        }
    }

    let literals: Vec<Literal> = cli
        .input
        .iter()
        .map(|text| literal(text, cli.base, &automaton))
        .collect();

    if cli.debug {
        for literal in &literals {
            print_steps(&automaton, literal);
        }
    }

    let (runs, errors) = evaluate(&automaton, &cli.input, &literals);
    for (input, e) in &errors {
        eprintln!("error: input '{input}': {e}");
    }

    let report = Report::assemble(&automaton, runs);
    if cli.json {
        let json = report
            .to_json()
            .map_err(|e| AutomatonError::File(format!("Failed to serialize report: {e}")))?;
        println!("{json}");
    } else {
        println!("{report}");
    }

    Ok(if !errors.is_empty() {
        ExitCode::FAILURE
    } else {
        ExitCode::SUCCESS
    })
}

/// Runs every literal, pairing each result with the input text it came from.
fn evaluate(
    automaton: &Automaton,
    inputs: &[String],
    literals: &[Literal],
) -> (Vec<(String, Run)>, Vec<(String, AutomatonError)>) {
    let mut runs = Vec::new();
    let mut errors = Vec::new();

    for (input, result) in inputs.iter().zip(simulate_all(automaton, literals)) {
        match result {
            Ok(run) => runs.push((input.clone(), run)),
            Err(e) => errors.push((input.clone(), e)),
        }
    }

    (runs, errors)
}

fn literal(text: &str, base: Base, automaton: &Automaton) -> Literal {
    match base {
        Base::Auto => Literal::detect(text, automaton),
        Base::Bin => Literal::binary(text.trim()),
        Base::Dec => Literal::decimal(text.trim()),
        Base::Hex => Literal::hexadecimal(text.trim()),
        Base::Tokens => Literal::tokens(text),
    }
}

fn print_steps(automaton: &Automaton, literal: &Literal) {
    let symbols = match convert(automaton, literal) {
        Ok(symbols) => symbols,
        // Reported with the other results.
        Err(_) => return,
    };

    let mut simulator = Simulator::new(automaton, symbols);

    println!("Input: {literal}");
    print_state(&simulator);

    loop {
        match simulator.step() {
            Step::Continue => print_state(&simulator),
            Step::Halt(verdict) => {
                println!("Halted: {verdict}\n");
                break;
            }
        }
    }
}

fn print_state(simulator: &Simulator<'_>) {
    println!(
        "Step: {}, State: {}, Remaining: [{}]",
        simulator.position(),
        simulator.state(),
        simulator.remaining().join(" ")
    );
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_report_keeps_raw_input() {
        let automaton = Catalog::get("parity").unwrap();
        let inputs = vec!["101".to_string(), "0x3".to_string(), "2".to_string()];
        let literals: Vec<Literal> = inputs
            .iter()
            .map(|text| literal(text, Base::Auto, &automaton))
            .collect();

        let (runs, errors) = evaluate(&automaton, &inputs, &literals);
        let report = Report::assemble(&automaton, runs);

        assert_eq!(report.runs[0].input_literal, "101");
        assert_eq!(report.runs[1].input_literal, "0x3");
        assert_eq!(errors.len(), 1);
        assert_eq!(errors[0].0, "2");
    }

    #[test]
    fn test_debug_conflicts_with_json() {
        let result =
            Cli::try_parse_from(["afd-cli", "-b", "parity", "-i", "1", "--debug", "--json"]);
        assert!(result.is_err());

        let cli = Cli::try_parse_from(["afd-cli", "-b", "parity", "-i", "1", "--debug"]).unwrap();
        assert!(cli.debug);
    }
}
