use crate::cli::args::CliArgs;
use crate::model::SortMode;
use crate::output::OutputFormat;
use crate::session::parse_filter_spec;

pub fn validate(args: &CliArgs) -> Result<(), String> {
    if let Some(raw) = args.sort.as_deref() {
        if SortMode::parse(raw).is_none() {
            return Err(format!("invalid --sort '{raw}', expected relevant or newest"));
        }
    }
    for raw in args.filter.iter() {
        parse_filter_spec(raw).map_err(|e| format!("invalid --filter '{raw}': {e}"))?;
    }
    if let Some(raw) = args.output_format.as_deref() {
        if OutputFormat::parse(raw).is_none() {
            return Err(format!(
                "invalid --output-format '{raw}', expected text, json, xml or html"
            ));
        }
    }
    if let Some(timeout) = args.timeout {
        if timeout == 0 {
            return Err("invalid timeout, expected positive integer".to_string());
        }
    }
    if args.interactive && args.output.is_some() {
        return Err("--interactive cannot be combined with --output".to_string());
    }
    Ok(())
}
