mod plan;

use crate::Cli;
use crate::CommandResult;
use plan::PlanCmd;

#[derive(Debug, clap::Parser)]
#[command(name = "graphql-plan")]
pub(crate) enum CommandEnum {
    /// Compile an operation against a schema and print its plan.
    Plan(Box<PlanCmd>),
}
impl CommandEnum {
    pub(crate) async fn run(self, cli: &Cli) -> CommandResult {
        match self {
            Self::Plan(cmd) => cmd.run(cli).await
        }
    }
}
