//! Check command - validate a rule file and list its rules.

use std::path::PathBuf;

use colored::Colorize;
use dtomap::RuleSet;

pub fn run(
    rules_path: PathBuf,
    json_output: bool,
    verbose: bool,
) -> Result<(), Box<dyn std::error::Error>> {
    if !rules_path.exists() {
        return Err(format!("Rule file not found: {}", rules_path.display()).into());
    }

    let rules = RuleSet::load(&rules_path)?;

    if json_output {
        // Normalized form: every source and fallback spelled out
        println!("{}", serde_json::to_string_pretty(&rules.to_rule_file())?);
        return Ok(());
    }

    println!(
        "{} {} ({} rules)",
        "Rule file OK:".green().bold(),
        rules_path.display().to_string().white(),
        rules.len()
    );
    println!();

    for rule in &rules {
        if verbose {
            println!(
                "  {:20} <- {:30} {:8} fallback {}",
                rule.target.white().bold(),
                rule.source.to_string(),
                rule.kind.to_string(),
                rule.fallback.to_json()
            );
        } else {
            println!(
                "  {:20} <- {:30} {}",
                rule.target.white().bold(),
                rule.source.to_string(),
                rule.kind
            );
        }
    }

    Ok(())
}
