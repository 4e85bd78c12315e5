//! Text parsers for instances and emitted solutions.
//!
//! Instance grammar: `L W H`, then `M`, then `M` lines of `L W H D` where `D`
//! is a positive delivery rank or `-1`. Only token order matters; line breaks
//! are treated like any other whitespace.

use crate::instance::Instance;
use std::fs;
use std::path::Path;
use thiserror::Error;
use truckpack_core::{Item, VehicleSpec, MAX_ITEMS};
use truckpack_engine::BoxRecord;

/// Errors that can occur when parsing instance or solution text.
#[derive(Debug, Error)]
pub enum ParseError {
    #[error("Failed to read file: {0}")]
    IoError(#[from] std::io::Error),

    #[error("Unexpected end of input: expected {0}")]
    MissingToken(String),

    #[error("Line {line}: '{token}' is not an integer")]
    InvalidInteger { line: usize, token: String },

    #[error("Line {line}: {what} must be positive, got {value}")]
    NonPositiveDimension {
        line: usize,
        what: String,
        value: i64,
    },

    #[error("Line {line}: delivery rank must be -1 or positive, got {value}")]
    InvalidRank { line: usize, value: i64 },

    #[error("Item count must be between 1 and {max}, got {count}")]
    ItemCount { count: i64, max: usize },

    #[error("Line {line}: unexpected trailing data '{token}'")]
    TrailingData { line: usize, token: String },

    #[error("Invalid solution format: {0}")]
    InvalidFormat(String),
}

/// A solution read back from the output grammar.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ParsedSolution {
    /// One box per item, in input order.
    Sat(Vec<BoxRecord>),
    /// The instance was reported infeasible.
    Unsat,
}

/// Whitespace-separated integer tokens, remembering their line numbers.
struct Tokens<'a> {
    inner: Box<dyn Iterator<Item = (usize, &'a str)> + 'a>,
}

impl<'a> Tokens<'a> {
    fn new(text: &'a str) -> Self {
        let inner = text
            .lines()
            .enumerate()
            .flat_map(|(index, line)| line.split_whitespace().map(move |token| (index + 1, token)));
        Self {
            inner: Box::new(inner),
        }
    }

    fn next_int(&mut self, expected: &str) -> Result<(usize, i64), ParseError> {
        let (line, token) = self
            .inner
            .next()
            .ok_or_else(|| ParseError::MissingToken(expected.to_string()))?;
        token
            .parse::<i64>()
            .map(|value| (line, value))
            .map_err(|_| ParseError::InvalidInteger {
                line,
                token: token.to_string(),
            })
    }

    fn next_dimension(&mut self, what: &str) -> Result<u32, ParseError> {
        let (line, value) = self.next_int(what)?;
        if value <= 0 {
            return Err(ParseError::NonPositiveDimension {
                line,
                what: what.to_string(),
                value,
            });
        }
        u32::try_from(value).map_err(|_| ParseError::InvalidInteger {
            line,
            token: value.to_string(),
        })
    }

    fn finish(mut self) -> Result<(), ParseError> {
        match self.inner.next() {
            Some((line, token)) => Err(ParseError::TrailingData {
                line,
                token: token.to_string(),
            }),
            None => Ok(()),
        }
    }
}

/// Parses an instance from a file, naming it after the file stem.
pub fn parse_file(path: impl AsRef<Path>) -> Result<Instance, ParseError> {
    let path = path.as_ref();
    let content = fs::read_to_string(path)?;
    let instance = parse_instance(&content)?;
    Ok(match path.file_stem().and_then(|s| s.to_str()) {
        Some(stem) => instance.with_name(stem),
        None => instance,
    })
}

/// Parses an instance from text.
pub fn parse_instance(text: &str) -> Result<Instance, ParseError> {
    let mut tokens = Tokens::new(text);

    let length = tokens.next_dimension("vehicle length")?;
    let width = tokens.next_dimension("vehicle width")?;
    let height = tokens.next_dimension("vehicle height")?;

    let (_, count) = tokens.next_int("item count")?;
    if !(1..=MAX_ITEMS as i64).contains(&count) {
        return Err(ParseError::ItemCount {
            count,
            max: MAX_ITEMS,
        });
    }

    let mut items = Vec::with_capacity(count as usize);
    for id in 0..count as usize {
        let l = tokens.next_dimension(&format!("length of item {}", id))?;
        let w = tokens.next_dimension(&format!("width of item {}", id))?;
        let h = tokens.next_dimension(&format!("height of item {}", id))?;

        let (line, rank) = tokens.next_int(&format!("delivery rank of item {}", id))?;
        let item = Item::new(id, l, w, h);
        items.push(match rank {
            -1 => item,
            r if (1..=u32::MAX as i64).contains(&r) => item.with_delivery(r as u32),
            value => return Err(ParseError::InvalidRank { line, value }),
        });
    }

    tokens.finish()?;
    Ok(Instance::new(VehicleSpec::new(length, width, height), items))
}

/// Parses emitted solution text for an instance with `item_count` items.
pub fn parse_solution(text: &str, item_count: usize) -> Result<ParsedSolution, ParseError> {
    let mut lines = text
        .lines()
        .enumerate()
        .map(|(index, line)| (index + 1, line.trim()))
        .filter(|(_, line)| !line.is_empty());

    let status = lines
        .next()
        .ok_or_else(|| ParseError::MissingToken("SAT or UNSAT".into()))?;

    let parsed = match status.1 {
        "UNSAT" => ParsedSolution::Unsat,
        "SAT" => {
            let mut records = Vec::with_capacity(item_count);
            for item in 0..item_count {
                let (line, text) = lines
                    .next()
                    .ok_or_else(|| ParseError::MissingToken(format!("box of item {}", item)))?;
                records.push(parse_record(item, line, text)?);
            }
            ParsedSolution::Sat(records)
        }
        other => {
            return Err(ParseError::InvalidFormat(format!(
                "expected SAT or UNSAT on line {}, got '{}'",
                status.0, other
            )))
        }
    };

    if let Some((line, text)) = lines.next() {
        return Err(ParseError::TrailingData {
            line,
            token: text.to_string(),
        });
    }
    Ok(parsed)
}

fn parse_record(item: usize, line: usize, text: &str) -> Result<BoxRecord, ParseError> {
    let fields = text
        .split_whitespace()
        .map(|token| {
            token.parse::<u32>().map_err(|_| ParseError::InvalidInteger {
                line,
                token: token.to_string(),
            })
        })
        .collect::<Result<Vec<u32>, _>>()?;

    if fields.len() != 7 {
        return Err(ParseError::InvalidFormat(format!(
            "line {} has {} fields, expected 7",
            line,
            fields.len()
        )));
    }

    Ok(BoxRecord {
        item,
        vehicle: fields[0] as usize,
        near: [fields[1], fields[2], fields[3]].into(),
        far: [fields[4], fields[5], fields[6]].into(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use truckpack_core::Vec3;

    #[test]
    fn test_parse_instance() {
        let text = "40 40 20\n3\n40 20 10 -1\n10 40 10 2\n30 40 10 1\n";
        let instance = parse_instance(text).unwrap();

        assert_eq!(instance.vehicle, VehicleSpec::new(40, 40, 20));
        assert_eq!(instance.items.len(), 3);
        assert_eq!(instance.items[0].delivery(), None);
        assert_eq!(instance.items[1].delivery(), Some(2));
        assert_eq!(*instance.items[2].dimensions(), Vec3::new(30, 40, 10));
        assert!(instance.items.iter().enumerate().all(|(i, item)| item.id() == i));
    }

    #[test]
    fn test_line_breaks_are_not_significant() {
        let text = "40 40 20 2 10 10 10 -1\n\n10 10\n10 1";
        let instance = parse_instance(text).unwrap();
        assert_eq!(instance.items.len(), 2);
        assert_eq!(instance.items[1].delivery(), Some(1));
    }

    #[test]
    fn test_error_reports_line() {
        let err = parse_instance("10 10 10\n1\n5 x 5 -1\n").unwrap_err();
        match err {
            ParseError::InvalidInteger { line, token } => {
                assert_eq!(line, 3);
                assert_eq!(token, "x");
            }
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn test_parse_solution_unsat() {
        assert_eq!(parse_solution("UNSAT\n", 4).unwrap(), ParsedSolution::Unsat);
    }

    #[test]
    fn test_parse_solution_sat() {
        let parsed = parse_solution("SAT\n0 0 0 0 10 10 10\n1 0 0 0 5 5 5\n", 2).unwrap();
        let ParsedSolution::Sat(records) = parsed else {
            panic!("expected SAT");
        };
        assert_eq!(records[1].item, 1);
        assert_eq!(records[1].vehicle, 1);
        assert_eq!(records[0].far, Vec3::new(10, 10, 10));
    }

    #[test]
    fn test_parse_solution_field_count() {
        assert!(matches!(
            parse_solution("SAT\n0 0 0 0 10 10\n", 1),
            Err(ParseError::InvalidFormat(_))
        ));
    }
}
