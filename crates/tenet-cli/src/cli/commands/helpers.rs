use tracing::debug;

use tenet_core::config::Config;
use tenet_core::diagnostic::Diagnostic;
use tenet_core::graph::{self, Build};
use tenet_core::loader;
use tenet_core::validate;

use crate::cli::args::GlobalArgs;

/// Bounded I/O concurrency for artifact loading.
pub const LOAD_PARALLELISM: usize = 16;

/// Config per precedence: flags over config file over defaults.
pub fn load_config(global: &GlobalArgs) -> anyhow::Result<Config> {
    let mut config = Config::load_or_default(global.config.as_deref())?;
    if let Some(dir) = &global.data_dir {
        config.data_dir = dir.clone();
    }
    Ok(config)
}

/// Load, validate, and build the snapshot for one invocation.
pub async fn load_database(config: &Config) -> anyhow::Result<Build> {
    let set = loader::load_dir_parallel(&config.data_dir, LOAD_PARALLELISM).await?;
    let validated = validate::validate_set(set)?;
    let build = graph::build(validated);
    debug!(
        components = build.snapshot.component_count(),
        standards = build.snapshot.standard_count(),
        certifications = build.snapshot.certification_count(),
        "database loaded"
    );
    Ok(build)
}

/// Print diagnostics to stderr, keeping stdout for command output.
pub fn eprint_diagnostics(diagnostics: &[Diagnostic]) {
    for d in diagnostics {
        eprintln!("{}", d.format_terminal());
    }
}
