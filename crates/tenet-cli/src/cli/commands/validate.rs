use tenet_core::diagnostic::has_errors;
use tenet_core::loader;
use tenet_core::validate::validate_set;

use super::helpers;
use crate::cli::args::{GlobalArgs, OutputFormat, ValidateArgs};
use crate::exit_codes;

/// Load and validate only; print every parse, schema, and semantic
/// diagnostic in one pass.
pub async fn run(args: ValidateArgs, global: &GlobalArgs) -> anyhow::Result<i32> {
    let config = helpers::load_config(global)?;
    let set = loader::load_dir_parallel(&config.data_dir, helpers::LOAD_PARALLELISM).await?;
    let validated = validate_set(set)?;

    match args.format {
        OutputFormat::Json => {
            println!("{}", serde_json::to_string_pretty(&validated.diagnostics)?);
        }
        OutputFormat::Text => {
            for d in &validated.diagnostics {
                println!("{}", d.format_terminal());
            }
            if validated.diagnostics.is_empty() {
                println!(
                    "ok: {} components, {} standards, {} certifications",
                    validated.components.len(),
                    validated.standards.len(),
                    validated.certifications.len()
                );
            }
        }
    }

    if has_errors(&validated.diagnostics) {
        Ok(exit_codes::CHECK_FAILED)
    } else {
        Ok(exit_codes::SUCCESS)
    }
}
