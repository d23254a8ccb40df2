//! Repair command implementation.

use super::{read_input, write_output};
use crate::cli::RepairArgs;
use crate::error::Result;
use crate::output::Formatter;
use quill_generator::{repair, validate, RepairStage, ValidationContext, ValidationMode};

/// Repair `raw` and return the stage that succeeded with the resulting JSON.
///
/// Strict mode validates the repaired value as an article and fails on a
/// missing field; otherwise the article is completed with defaults when the
/// value is one, and printed as repaired when it is not.
pub fn repair_text(raw: &str, strict: bool, keyword: &str) -> Result<(RepairStage, String)> {
    let outcome = repair(raw);
    let ctx = ValidationContext::new(keyword);

    let json = if strict {
        validate(&outcome.value, ValidationMode::Strict, &ctx)?.to_json()?
    } else {
        match validate(&outcome.value, ValidationMode::Lenient, &ctx) {
            Ok(doc) => doc.to_json()?,
            Err(_) => serde_json::to_string_pretty(&outcome.value)?,
        }
    };
    Ok((outcome.stage, json))
}

/// Execute the repair command.
pub fn execute_repair(args: RepairArgs, formatter: &Formatter) -> Result<()> {
    let raw = read_input(args.file.as_deref())?;
    let (stage, json) = repair_text(&raw, args.strict, &args.keyword)?;

    let message = format!("Repaired at stage: {}", stage);
    if stage.is_fallback() {
        eprintln!("{}", formatter.warning(&message));
    } else {
        eprintln!("{}", formatter.info(&message));
    }
    write_output(None, &json)
}
