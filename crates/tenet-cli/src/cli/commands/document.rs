use tenet_core::document;

use super::helpers;
use crate::cli::args::{DocumentArgs, GlobalArgs};
use crate::exit_codes;
use crate::render::ContextRenderer;

/// Generate a document and write it to `--output` or stdout. The output
/// file is only written after rendering succeeds; a failed request leaves
/// no partial output behind.
pub async fn run(args: DocumentArgs, global: &GlobalArgs) -> anyhow::Result<i32> {
    let config = helpers::load_config(global)?;
    let build = helpers::load_database(&config).await?;
    helpers::eprint_diagnostics(&build.diagnostics);

    match document::generate(&build.snapshot, &config, &args.id, &ContextRenderer) {
        Ok(doc) => {
            match &args.output {
                Some(path) => std::fs::write(path, &doc.text)?,
                None => print!("{}", doc.text),
            }
            Ok(exit_codes::SUCCESS)
        }
        Err(e) => {
            eprintln!("error: {}", e);
            Ok(exit_codes::CONFIG_ERROR)
        }
    }
}
