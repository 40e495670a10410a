use log::info;
use std::path::Path;
use tokio::process::Command;

use crate::config::ScriptsConfig;

/// Which of the two fixed helper scripts to run
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Script {
    NoArgs,
    WithArgs,
}

impl Script {
    fn path(self, config: &ScriptsConfig) -> &Path {
        match self {
            Script::NoArgs => &config.no_args,
            Script::WithArgs => &config.with_args,
        }
    }
}

/// Run a helper script and return its stdout
///
/// `arg` is passed as a single process argument, never through a shell.
/// There is no timeout and no limit on the captured output.
pub async fn run(config: &ScriptsConfig, script: Script, arg: Option<&str>) -> std::io::Result<String> {
    let path = script.path(config);
    let mut command = Command::new(&config.interpreter);
    command.arg(path);
    if let Some(arg) = arg {
        command.arg(arg);
    }

    let output = command.output().await?;
    info!("Ran {} ({})", path.display(), output.status);
    Ok(String::from_utf8_lossy(&output.stdout).to_string())
}
