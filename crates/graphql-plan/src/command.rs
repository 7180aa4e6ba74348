use crate::Cli;
use crate::CommandResult;

/// A subcommand. Global flags stay available through `cli`.
pub(crate) trait RunnableCommand: std::fmt::Debug {
    async fn run(self, cli: &Cli) -> CommandResult;
}
