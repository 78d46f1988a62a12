//! Command-file reader: shock and exogenous records from `CMDF`.
//!
//! The embedded command file is a `1C` array holding one logical command
//! line per entry. Only the assignments the assembler consumes are
//! extracted:
//!
//! ```text
//! shock     <name>[(<elem>, <elem>, ...)] = <value>... [;]
//! exogenous <name>[(<elem>, <elem>, ...)] [;]
//! ```
//!
//! Keywords are case-insensitive, elements may be double-quoted,
//! `!`-comments and blank lines are ignored, and every other directive is
//! skipped - command files carry much more than this contract.

use har_core::{HarFile, Result};
use tracing::trace;

/// Header of the embedded command file.
const COMMAND_HEADER: &str = "CMDF";

/// An imposed change in an exogenous variable.
#[derive(Clone, Debug, PartialEq)]
pub struct ShockDefinition {
    pub name: String,
    pub indexes: Vec<String>,
    pub values: Vec<f32>,
}

/// A variable position moved onto the exogenous list.
#[derive(Clone, Debug, PartialEq)]
pub struct ExogenousDefinition {
    pub name: String,
    pub indexes: Vec<String>,
    pub values: Vec<f32>,
}

/// Parsed shock / exogenous records of one command file.
#[derive(Clone, Debug, Default)]
pub struct CommandFile {
    pub shocks: Vec<ShockDefinition>,
    pub exogenous: Vec<ExogenousDefinition>,
}

impl CommandFile {
    /// Parse the `CMDF` array of a solution file. A file without one
    /// yields the empty command set.
    pub fn from_file(file: &HarFile) -> Result<Self> {
        match file.get(COMMAND_HEADER) {
            Some(array) => {
                let lines: Vec<String> = array
                    .as_strings()
                    .map(|d| d.logical_values().collect())
                    .unwrap_or_default();
                Ok(Self::parse(lines))
            }
            None => Ok(Self::default()),
        }
    }

    /// Parse command lines.
    pub fn parse(lines: impl IntoIterator<Item = impl AsRef<str>>) -> Self {
        let mut commands = Self::default();
        for line in lines {
            commands.parse_line(line.as_ref());
        }
        commands
    }

    fn parse_line(&mut self, line: &str) {
        let line = line.split('!').next().unwrap_or("").trim();
        if line.is_empty() {
            return;
        }
        let Some((keyword, rest)) = split_keyword(line) else {
            return;
        };
        match keyword.to_ascii_lowercase().as_str() {
            "shock" | "ashock" => {
                let Some((target, values_text)) = rest.split_once('=') else {
                    trace!(line, "shock line without assignment skipped");
                    return;
                };
                let Some((name, indexes)) = parse_target(target) else {
                    return;
                };
                let values: Vec<f32> = values_text
                    .trim()
                    .trim_end_matches(';')
                    .split_whitespace()
                    .filter_map(|token| token.parse().ok())
                    .collect();
                if values.is_empty() {
                    trace!(line, "shock line without numeric values skipped");
                    return;
                }
                self.shocks.push(ShockDefinition {
                    name,
                    indexes,
                    values,
                });
            }
            "exogenous" => {
                let Some((name, indexes)) = parse_target(rest) else {
                    return;
                };
                self.exogenous.push(ExogenousDefinition {
                    name,
                    indexes,
                    values: Vec::new(),
                });
            }
            _ => {}
        }
    }

    /// Shocks targeting `name`, case-insensitive.
    pub fn shocks_for<'a>(&'a self, name: &'a str) -> impl Iterator<Item = &'a ShockDefinition> {
        self.shocks
            .iter()
            .filter(move |s| s.name.eq_ignore_ascii_case(name))
    }

    /// Exogenous records targeting `name`, case-insensitive.
    pub fn exogenous_for<'a>(
        &'a self,
        name: &'a str,
    ) -> impl Iterator<Item = &'a ExogenousDefinition> {
        self.exogenous
            .iter()
            .filter(move |e| e.name.eq_ignore_ascii_case(name))
    }
}

/// Split the leading keyword from the rest of the line.
fn split_keyword(line: &str) -> Option<(&str, &str)> {
    let trimmed = line.trim_start();
    let end = trimmed
        .find(|c: char| c.is_whitespace())
        .unwrap_or(trimmed.len());
    let (keyword, rest) = trimmed.split_at(end);
    if keyword.is_empty() {
        None
    } else {
        Some((keyword, rest))
    }
}

/// Parse `name` or `name("a", "b")` into a name and its index tuple.
fn parse_target(text: &str) -> Option<(String, Vec<String>)> {
    let text = text.trim().trim_end_matches(';').trim();
    if text.is_empty() {
        return None;
    }
    match text.find('(') {
        None => Some((text.to_string(), Vec::new())),
        Some(open) => {
            let close = text.rfind(')')?;
            if close < open {
                return None;
            }
            let name = text[..open].trim();
            if name.is_empty() {
                return None;
            }
            let indexes = text[open + 1..close]
                .split(',')
                .map(|part| part.trim().trim_matches('"').to_string())
                .filter(|part| !part.is_empty())
                .collect();
            Some((name.to_string(), indexes))
        }
    }
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_shock_with_indexes_and_value() {
        let commands = CommandFile::parse(["shock p3cs(\"c1\",\"r1\") = 5.0;"]);
        assert_eq!(commands.shocks.len(), 1);
        let shock = &commands.shocks[0];
        assert_eq!(shock.name, "p3cs");
        assert_eq!(shock.indexes, vec!["c1", "r1"]);
        assert_eq!(shock.values, vec![5.0]);
    }

    #[test]
    fn test_shock_value_list() {
        let commands = CommandFile::parse(["Shock tfeff = 1.0 2.0 3.0"]);
        assert_eq!(commands.shocks[0].values, vec![1.0, 2.0, 3.0]);
        assert!(commands.shocks[0].indexes.is_empty());
    }

    #[test]
    fn test_exogenous_target() {
        let commands = CommandFile::parse(["exogenous p3cs(\"c1\", \"r2\") ;"]);
        assert_eq!(commands.exogenous.len(), 1);
        assert_eq!(commands.exogenous[0].name, "p3cs");
        assert_eq!(commands.exogenous[0].indexes, vec!["c1", "r2"]);
    }

    #[test]
    fn test_unquoted_indexes() {
        let commands = CommandFile::parse(["shock x(c1,r1) = 2.5"]);
        assert_eq!(commands.shocks[0].indexes, vec!["c1", "r1"]);
    }

    #[test]
    fn test_comments_blanks_and_foreign_lines_skipped() {
        let commands = CommandFile::parse([
            "! a comment line",
            "",
            "verbal description = baseline run;",
            "solution file = model;",
            "shock p1 = 1.0 ! trailing comment",
        ]);
        assert_eq!(commands.shocks.len(), 1);
        assert!(commands.exogenous.is_empty());
        assert_eq!(commands.shocks[0].values, vec![1.0]);
    }

    #[test]
    fn test_lookup_is_case_insensitive() {
        let commands = CommandFile::parse(["SHOCK P3CS = 4.0", "EXOGENOUS other ;"]);
        assert_eq!(commands.shocks_for("p3cs").count(), 1);
        assert_eq!(commands.exogenous_for("OTHER").count(), 1);
        assert_eq!(commands.shocks_for("nope").count(), 0);
    }

    #[test]
    fn test_shock_without_assignment_skipped() {
        let commands = CommandFile::parse(["shock p3cs"]);
        assert!(commands.shocks.is_empty());
    }
}
