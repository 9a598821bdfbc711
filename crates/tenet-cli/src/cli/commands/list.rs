use super::helpers;
use crate::cli::args::GlobalArgs;
use crate::exit_codes;

/// List every loaded artifact in canonical order. Integrity problems do not
/// affect the exit code here; parse and schema diagnostics go to stderr.
pub async fn run(global: &GlobalArgs) -> anyhow::Result<i32> {
    let config = helpers::load_config(global)?;
    let build = helpers::load_database(&config).await?;
    helpers::eprint_diagnostics(&build.diagnostics);

    for standard in build.snapshot.standards() {
        println!(
            "standard       {:<24} {} ({})",
            standard.key,
            standard.name,
            standard.source_path.display()
        );
    }
    for certification in build.snapshot.certifications() {
        println!(
            "certification  {:<24} {} ({})",
            certification.key,
            certification.name,
            certification.source_path.display()
        );
    }
    for component in build.snapshot.components() {
        println!(
            "component      {:<24} {} ({})",
            component.key,
            component.name,
            component.source_path.display()
        );
    }
    Ok(exit_codes::SUCCESS)
}
