use tenet_core::diagnostic::{has_errors, Diagnostic};
use tenet_core::integrity;

use super::helpers;
use crate::cli::args::{GlobalArgs, OutputFormat, RefcheckArgs};
use crate::exit_codes;

/// Full pipeline plus referential integrity check. Every build and
/// integrity diagnostic is printed in deterministic order.
pub async fn run(args: RefcheckArgs, global: &GlobalArgs) -> anyhow::Result<i32> {
    let config = helpers::load_config(global)?;
    let build = helpers::load_database(&config).await?;

    let mut options = config.checks.clone();
    if args.unsatisfied {
        options.unsatisfied_controls = true;
    }

    let mut diagnostics = build.diagnostics.clone();
    diagnostics.extend(integrity::check(&build.snapshot, &options));
    Diagnostic::sort(&mut diagnostics);

    match args.format {
        OutputFormat::Json => {
            println!("{}", serde_json::to_string_pretty(&diagnostics)?);
        }
        OutputFormat::Text => {
            for d in &diagnostics {
                println!("{}", d.format_terminal());
            }
            if diagnostics.is_empty() {
                println!("ok: all references resolve");
            }
        }
    }

    if has_errors(&diagnostics) {
        Ok(exit_codes::CHECK_FAILED)
    } else {
        Ok(exit_codes::SUCCESS)
    }
}
