//! External process launch collaborator

use crate::error::Result;
use tokio::process::Command;
use tracing::debug;

/// Launches one command line as a detached process, no wait
pub trait CommandLauncher: Send + Sync {
    fn spawn(&self, command_line: &str) -> Result<()>;
}

/// Default launcher: hands the command line to the shell.
///
/// The child handle is dropped immediately; the runtime reaps the process
/// when it exits, so a slow or hung automation command can never block the
/// session loop.
pub struct ShellLauncher;

impl CommandLauncher for ShellLauncher {
    fn spawn(&self, command_line: &str) -> Result<()> {
        debug!(command = %command_line, "spawning event command");
        Command::new("sh")
            .arg("-c")
            .arg(command_line)
            .stdin(std::process::Stdio::null())
            .spawn()?;
        Ok(())
    }
}
