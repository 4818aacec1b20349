//! This module converts externally supplied input literals into sequences of alphabet
//! symbols.
//!
//! Numeric literals (binary, decimal, hexadecimal) are turned into their binary digits,
//! most significant first, and each digit becomes one symbol. Token lists are split on
//! whitespace and commas and matched verbatim against the alphabet.

use crate::types::{Automaton, AutomatonError, LiteralBase, Symbol};
use serde::{Deserialize, Serialize};
use std::fmt;

/// One input for a simulation request.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Literal {
    /// A number written in the given base, without prefix.
    Number { base: LiteralBase, digits: String },
    /// A whitespace- or comma-delimited list of alphabet symbols.
    Tokens(String),
}

impl Literal {
    pub fn binary(digits: impl Into<String>) -> Self {
        Self::Number {
            base: LiteralBase::Binary,
            digits: digits.into(),
        }
    }

    pub fn decimal(digits: impl Into<String>) -> Self {
        Self::Number {
            base: LiteralBase::Decimal,
            digits: digits.into(),
        }
    }

    pub fn hexadecimal(digits: impl Into<String>) -> Self {
        Self::Number {
            base: LiteralBase::Hexadecimal,
            digits: digits.into(),
        }
    }

    pub fn tokens(text: impl Into<String>) -> Self {
        Self::Tokens(text.into())
    }

    /// Interprets raw user input for the given automaton.
    ///
    /// `0b`, `0d` and `0x` prefixes select binary, decimal and hexadecimal. Untagged text
    /// is binary when the alphabet is exactly `{0, 1}` and a token list otherwise.
    pub fn detect(text: &str, automaton: &Automaton) -> Self {
        let trimmed = text.trim();
        let prefixed = [
            ("0b", LiteralBase::Binary),
            ("0d", LiteralBase::Decimal),
            ("0x", LiteralBase::Hexadecimal),
        ]
        .into_iter()
        .find_map(|(prefix, base)| {
            strip_prefix_ignore_case(trimmed, prefix).map(|digits| Self::Number {
                base,
                digits: digits.to_string(),
            })
        });

        match prefixed {
            Some(literal) => literal,
            None if automaton.is_binary() => Self::binary(trimmed),
            None => Self::tokens(trimmed),
        }
    }
}

impl fmt::Display for Literal {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Literal::Number { base, digits } => {
                let prefix = match base {
                    LiteralBase::Binary => "0b",
                    LiteralBase::Decimal => "0d",
                    LiteralBase::Hexadecimal => "0x",
                };
                write!(f, "{prefix}{digits}")
            }
            Literal::Tokens(text) => f.write_str(text),
        }
    }
}

/// Converts a literal into the automaton's input symbols.
///
/// # Returns
///
/// * `Ok(Vec<Symbol>)` with one symbol per binary digit or token.
/// * `Err(AutomatonError::InvalidLiteral)` if a digit is outside the literal's base.
/// * `Err(AutomatonError::UnknownSymbol)` if a digit or token is not in the alphabet.
pub fn convert(automaton: &Automaton, literal: &Literal) -> Result<Vec<Symbol>, AutomatonError> {
    let tokens: Vec<String> = match literal {
        Literal::Number { base, digits } => to_binary(*base, digits)?
            .chars()
            .map(String::from)
            .collect(),
        Literal::Tokens(text) => text
            .split(|c: char| c.is_whitespace() || c == ',')
            .filter(|token| !token.is_empty())
            .map(String::from)
            .collect(),
    };

    for token in &tokens {
        if !automaton.has_symbol(token) {
            return Err(AutomatonError::UnknownSymbol {
                token: token.clone(),
            });
        }
    }

    Ok(tokens)
}

/// Renders a numeric literal as binary digits, most significant first.
///
/// Binary literals keep the digits exactly as written, including leading zeros and the
/// empty string. Decimal and hexadecimal literals produce their minimal representation
/// (`"0"` for zero).
pub fn to_binary(base: LiteralBase, digits: &str) -> Result<String, AutomatonError> {
    let invalid = |reason: String| AutomatonError::InvalidLiteral {
        literal: digits.to_string(),
        base,
        reason,
    };

    if let Some(c) = digits.chars().find(|c| !c.is_digit(radix(base))) {
        return Err(invalid(format!("'{c}' is not a {base} digit")));
    }

    match base {
        LiteralBase::Binary => Ok(digits.to_string()),
        LiteralBase::Decimal if digits.is_empty() => Err(invalid("no digits".to_string())),
        LiteralBase::Hexadecimal if digits.is_empty() => Err(invalid("no digits".to_string())),
        LiteralBase::Decimal => Ok(decimal_to_binary(digits)),
        LiteralBase::Hexadecimal => Ok(hexadecimal_to_binary(digits)),
    }
}

fn radix(base: LiteralBase) -> u32 {
    match base {
        LiteralBase::Binary => 2,
        LiteralBase::Decimal => 10,
        LiteralBase::Hexadecimal => 16,
    }
}

/// Converts a validated, non-empty decimal string of any length by repeated halving.
fn decimal_to_binary(digits: &str) -> String {
    let mut number: Vec<u8> = digits.bytes().map(|b| b - b'0').collect();
    let mut bits = Vec::new();

    while number.iter().any(|&d| d != 0) {
        let mut remainder = 0;
        for d in number.iter_mut() {
            let current = remainder * 10 + *d;
            *d = current / 2;
            remainder = current % 2;
        }
        bits.push(if remainder == 1 { '1' } else { '0' });
    }

    if bits.is_empty() {
        return "0".to_string();
    }

    bits.iter().rev().collect()
}

/// Converts a validated, non-empty hexadecimal string, dropping leading zero bits.
fn hexadecimal_to_binary(digits: &str) -> String {
    let bits: String = digits
        .chars()
        .filter_map(|c| c.to_digit(16))
        .map(|nibble| format!("{nibble:04b}"))
        .collect();

    match bits.trim_start_matches('0') {
        "" => "0".to_string(),
        minimal => minimal.to_string(),
    }
}

fn strip_prefix_ignore_case<'a>(text: &'a str, prefix: &str) -> Option<&'a str> {
    let head = text.get(..prefix.len())?;
    head.eq_ignore_ascii_case(prefix)
        .then(|| &text[prefix.len()..])
}
