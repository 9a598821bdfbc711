mod document;
mod helpers;
mod list;
mod refcheck;
mod report;
mod validate;

use super::args::{Cli, Command};

pub async fn dispatch(cli: Cli) -> anyhow::Result<i32> {
    match cli.cmd {
        Command::List => list::run(&cli.global).await,
        Command::Validate(args) => validate::run(args, &cli.global).await,
        Command::Refcheck(args) => refcheck::run(args, &cli.global).await,
        Command::Report(args) => report::run(args, &cli.global).await,
        Command::Document(args) => document::run(args, &cli.global).await,
    }
}
