//! Command execution.
//!
//! Every subcommand loads the configuration, builds a reconciler over the
//! GitHub API and the local clone, and turns the run report into an exit
//! code.

mod helpers;
mod next_version;
mod push;
mod run;

use crate::cli::{Args, Command, RuntimeConfig};
use crate::error::Result;

use next_version::execute_next_version;
use push::execute_push;
use run::execute_run;

/// Execute the command given on the command line
pub async fn execute_command(args: Args) -> Result<i32> {
    let config = RuntimeConfig::from(&args);

    if let Err(validation_error) = args.validate() {
        config.error_println(&format!("Invalid arguments: {}", validation_error));
        return Ok(1);
    }

    let result = match &args.command {
        Command::Run {
            event_name,
            event_path,
        } => execute_run(&args, event_name, event_path, &config).await,
        Command::Push {
            branch,
            sha,
            paths,
        } => execute_push(&args, branch, sha, paths, &config).await,
        Command::NextVersion { project, bump } => {
            execute_next_version(&args, project, *bump, &config).await
        }
    };

    match result {
        Ok(exit_code) => Ok(exit_code),
        Err(e) => {
            config.error_println(&format!(
                "Command '{}' failed: {}",
                args.command.name(),
                e
            ));
            helpers::print_suggestions(&config, &e);
            Ok(1)
        }
    }
}
