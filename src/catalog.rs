use crate::parser::parse;
use crate::types::{Automaton, AutomatonError};
use tracing::error;

// Embedded definitions, keyed by file stem.
const DEFINITIONS: [(&str, &str); 5] = [
    ("parity", include_str!("../automata/parity.dfa")),
    (
        "divisible-by-three",
        include_str!("../automata/divisible-by-three.dfa"),
    ),
    ("ends-with-01", include_str!("../automata/ends-with-01.dfa")),
    ("traffic-light", include_str!("../automata/traffic-light.dfa")),
    ("only-zeros", include_str!("../automata/only-zeros.dfa")),
];

lazy_static::lazy_static! {
    static ref AUTOMATA: Vec<(&'static str, Automaton)> = DEFINITIONS
        .iter()
        .filter_map(|(key, text)| match parse(text) {
            Ok(automaton) => Some((*key, automaton)),
            Err(e) => {
                error!(key, error = %e, "failed to parse embedded definition");
                None
            }
        })
        .collect();
}

/// Access to the automata shipped with the crate.
pub struct Catalog;

impl Catalog {
    /// List the keys of all embedded automata
    pub fn names() -> Vec<&'static str> {
        AUTOMATA.iter().map(|(key, _)| *key).collect()
    }

    /// Get an automaton by its key
    pub fn get(key: &str) -> Result<Automaton, AutomatonError> {
        AUTOMATA
            .iter()
            .find(|(k, _)| *k == key)
            .map(|(_, automaton)| automaton.clone())
            .ok_or_else(|| AutomatonError::UnknownAutomaton(key.to_string()))
    }

    /// Get the original definition text of an automaton
    pub fn text(key: &str) -> Result<&'static str, AutomatonError> {
        DEFINITIONS
            .iter()
            .find(|(k, _)| *k == key)
            .map(|(_, text)| *text)
            .ok_or_else(|| AutomatonError::UnknownAutomaton(key.to_string()))
    }

    /// Get information about an automaton by its key
    pub fn info(key: &str) -> Result<CatalogInfo, AutomatonError> {
        let automaton = Self::get(key)?;

        Ok(CatalogInfo {
            key: key.to_string(),
            name: automaton.name().unwrap_or(key).to_string(),
            state_count: automaton.states().len(),
            symbol_count: automaton.alphabet().len(),
            transition_count: automaton.transitions().len(),
            complete: automaton.is_complete(),
        })
    }

    /// Search for automata by key or name
    pub fn search(query: &str) -> Vec<&'static str> {
        let query = query.to_lowercase();

        AUTOMATA
            .iter()
            .filter(|(key, automaton)| {
                key.contains(&query)
                    || automaton
                        .name()
                        .is_some_and(|name| name.to_lowercase().contains(&query))
            })
            .map(|(key, _)| *key)
            .collect()
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CatalogInfo {
    pub key: String,
    pub name: String,
    pub state_count: usize,
    pub symbol_count: usize,
    pub transition_count: usize,
    pub complete: bool,
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::converter::Literal;
    use crate::simulator::execute;
    use crate::types::Verdict;

    #[test]
    fn test_all_definitions_are_valid() {
        for (key, text) in DEFINITIONS {
            assert!(parse(text).is_ok(), "Definition '{}' is invalid", key);
        }
        assert_eq!(Catalog::names().len(), DEFINITIONS.len());
    }

    #[test]
    fn test_get_by_key() {
        let automaton = Catalog::get("parity").unwrap();
        assert_eq!(automaton.name(), Some("Parity of ones"));

        assert!(matches!(
            Catalog::get("nonexistent"),
            Err(AutomatonError::UnknownAutomaton(key)) if key == "nonexistent"
        ));
        assert!(matches!(
            Catalog::text("nonexistent"),
            Err(AutomatonError::UnknownAutomaton(_))
        ));
    }

    #[test]
    fn test_divisible_by_three() {
        let automaton = Catalog::get("divisible-by-three").unwrap();

        for n in 0..40u32 {
            let run = execute(&automaton, &Literal::decimal(n.to_string())).unwrap();
            let expected = if n % 3 == 0 {
                Verdict::Accepted
            } else {
                Verdict::Rejected
            };
            assert_eq!(run.verdict, expected, "n = {}", n);
        }
    }

    #[test]
    fn test_traffic_light_tokens() {
        let automaton = Catalog::get("traffic-light").unwrap();

        let run = execute(&automaton, &Literal::tokens("go slow stop")).unwrap();
        assert_eq!(run.verdict, Verdict::Accepted);

        let run = execute(&automaton, &Literal::tokens("go stop")).unwrap();
        assert_eq!(run.verdict, Verdict::Stuck);
        assert_eq!(run.visited, vec!["red".to_string(), "green".to_string()]);
    }

    #[test]
    fn test_info() {
        let info = Catalog::info("only-zeros").unwrap();

        assert_eq!(info.name, "Only zeros");
        assert_eq!(info.state_count, 2);
        assert_eq!(info.transition_count, 2);
        assert!(!info.complete);

        assert!(Catalog::info("nonexistent").is_err());
    }

    #[test]
    fn test_search() {
        let results = Catalog::search("ZERO");
        assert_eq!(results, vec!["only-zeros"]);

        let results = Catalog::search("three");
        assert_eq!(results, vec!["divisible-by-three"]);

        assert!(Catalog::search("nonexistent").is_empty());
    }

    #[test]
    fn test_text() {
        assert!(Catalog::text("parity").unwrap().contains("name: Parity of ones"));
    }
}
