use std::collections::BTreeMap;

use tenet_core::errors::ReportError;
use tenet_core::report::Registry;

use super::helpers;
use crate::cli::args::{GlobalArgs, ReportArgs};
use crate::exit_codes;

fn print_listing(registry: &Registry) {
    println!("available reports:");
    for (id, title) in registry.listing() {
        println!("  {:<20} {}", id, title);
    }
}

fn print_params(registry: &Registry, id: &str) {
    if let Some(report) = registry.get(id) {
        eprintln!("parameters for {}:", id);
        for spec in report.params {
            let req = if spec.required { "required" } else { "optional" };
            eprintln!("  {:<14} {:<9} {}", spec.name, req, spec.help);
        }
    }
}

/// Run a named report and print its result as pretty JSON. With no id,
/// print the registry listing instead; that is not an error.
pub async fn run(args: ReportArgs, global: &GlobalArgs) -> anyhow::Result<i32> {
    let registry = Registry::new();

    let Some(id) = args.id else {
        print_listing(&registry);
        return Ok(exit_codes::SUCCESS);
    };

    let mut params = BTreeMap::new();
    for token in &args.params {
        match token.split_once('=') {
            Some((name, value)) => {
                params.insert(name.to_string(), value.to_string());
            }
            None => {
                eprintln!("{}: should be NAME=VALUE", token);
                return Ok(exit_codes::CONFIG_ERROR);
            }
        }
    }

    let config = helpers::load_config(global)?;
    let build = helpers::load_database(&config).await?;
    helpers::eprint_diagnostics(&build.diagnostics);

    match registry.run(&id, &build.snapshot, &params) {
        Ok(value) => {
            println!("{}", serde_json::to_string_pretty(&value)?);
            Ok(exit_codes::SUCCESS)
        }
        Err(e @ ReportError::UnknownReport { .. }) => {
            eprintln!("error: {}", e);
            print_listing(&registry);
            Ok(exit_codes::CONFIG_ERROR)
        }
        Err(e) => {
            eprintln!("error: {}", e);
            print_params(&registry, &id);
            Ok(exit_codes::CONFIG_ERROR)
        }
    }
}
