//! Map command - map a raw JSON document through a rule file.

use std::fs;
use std::io::{self, Read};
use std::path::PathBuf;

use colored::Colorize;
use dtomap::{FieldAudit, FieldOutcome, RuleSet};
use serde_json::Value;

pub fn run(
    rules_path: PathBuf,
    input: Option<PathBuf>,
    output: Option<PathBuf>,
    audit: bool,
    compact: bool,
    verbose: bool,
) -> Result<(), Box<dyn std::error::Error>> {
    // Validate rule file exists
    if !rules_path.exists() {
        return Err(format!("Rule file not found: {}", rules_path.display()).into());
    }

    let rules = RuleSet::load(&rules_path)?;

    if verbose {
        eprintln!(
            "{} {} rules from {}",
            "Loaded".cyan().bold(),
            rules.len(),
            rules_path.display()
        );
    }

    let raw = read_input(input.as_ref())?;
    let (mapped, audits) = dtomap::map_document(&raw, &rules);

    if audit {
        print_audit(&audits);
    }

    if verbose {
        let fallbacks = audits.iter().filter(|a| a.outcome.is_fallback()).count();
        let records = mapped.as_array().map(Vec::len).unwrap_or(1);
        eprintln!(
            "Mapped {} records, {} fields used their fallback",
            records.to_string().white().bold(),
            fallbacks.to_string().yellow()
        );
    }

    let text = render(&mapped, compact)?;
    match output {
        Some(path) => {
            fs::write(&path, text + "\n")?;
            if verbose {
                eprintln!("{} {}", "Saved to".green().bold(), path.display());
            }
        }
        None => println!("{}", text),
    }

    Ok(())
}

/// Read raw JSON from a file, or from stdin when no file is given.
fn read_input(input: Option<&PathBuf>) -> Result<Value, Box<dyn std::error::Error>> {
    let text = match input {
        Some(path) => fs::read_to_string(path)
            .map_err(|e| format!("Failed to read '{}': {}", path.display(), e))?,
        None => {
            let mut buf = String::new();
            io::stdin().read_to_string(&mut buf)?;
            buf
        }
    };

    Ok(serde_json::from_str(&text)?)
}

fn render(value: &Value, compact: bool) -> serde_json::Result<String> {
    if compact {
        serde_json::to_string(value)
    } else {
        serde_json::to_string_pretty(value)
    }
}

fn print_audit(audits: &[FieldAudit]) {
    eprintln!("{}", "Audit:".yellow().bold());
    for audit in audits {
        let outcome = match audit.outcome {
            FieldOutcome::Resolved => "resolved".green(),
            FieldOutcome::Missing => "missing, fallback".yellow(),
            FieldOutcome::Null => "null, fallback".yellow(),
            FieldOutcome::Invalid => "invalid, fallback".red(),
        };
        eprintln!(
            "  {:20} <- {:30} {:8} {}",
            audit.target, audit.source, audit.kind, outcome
        );
    }
}
