//! Run command implementation

use authgate_config::load_settings;
use authgate_core::AuthgateError;
use authgate_runtime::Runtime;
use clap::Args;

/// Run command arguments
#[derive(Args, Debug)]
pub struct RunCommand {
    /// Override server port
    #[arg(short, long)]
    pub port: Option<u16>,
}

impl RunCommand {
    /// Execute the run command
    pub async fn execute(&self) -> Result<(), AuthgateError> {
        let settings = load_settings()?;

        let runtime = Runtime::with_port_override(settings, self.port);
        runtime.run().await
    }
}

#[cfg(test)]
mod tests {
    use crate::{Cli, Commands};
    use clap::Parser;

    #[test]
    fn test_run_command_port() {
        let cli = Cli::try_parse_from(["authgate", "run", "--port", "9000"]).unwrap();
        match cli.command {
            Commands::Run(cmd) => assert_eq!(cmd.port, Some(9000)),
            other => panic!("unexpected command: {:?}", other),
        }
    }

    #[test]
    fn test_run_command_rejects_bad_port() {
        assert!(Cli::try_parse_from(["authgate", "run", "--port", "70000"]).is_err());
    }
}
