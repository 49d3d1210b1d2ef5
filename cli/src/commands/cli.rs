use std::path::PathBuf;

use clap::{Args as ClapArgs, Parser, Subcommand};
use dltrigger_core::api::AppConfig;

#[derive(Parser, Debug, Clone)]
#[command(version, about = "HTTP trigger server for the download script")]
pub struct Args {
    #[command(subcommand)]
    pub command: Option<Commands>,

    /// TOML config file. Defaults to ./config.toml when present.
    #[arg(long, global = true)]
    pub config: Option<PathBuf>,

    #[command(flatten)]
    pub overrides: Overrides,
}

/// Flags that win over the config file and `DLTRIGGER_*` env vars.
#[derive(ClapArgs, Debug, Clone, Default)]
pub struct Overrides {
    #[arg(long, global = true)]
    pub host: Option<String>,

    #[arg(long, global = true)]
    pub port: Option<u16>,

    /// Path of the download script.
    #[arg(long, global = true)]
    pub script: Option<String>,

    /// Program used to run the script ("" runs it directly).
    #[arg(long, global = true)]
    pub interpreter: Option<String>,

    #[arg(long, global = true)]
    pub timeout_secs: Option<u64>,
}

impl Overrides {
    pub fn apply(&self, cfg: &mut AppConfig) {
        if let Some(host) = &self.host {
            cfg.server.host = host.clone();
        }
        if let Some(port) = self.port {
            cfg.server.port = port;
        }
        if let Some(script) = &self.script {
            cfg.script.path = script.clone();
        }
        if let Some(interpreter) = &self.interpreter {
            cfg.script.interpreter = interpreter.trim().to_string();
        }
        if let Some(secs) = self.timeout_secs {
            cfg.script.timeout_secs = secs;
        }
    }
}

#[derive(Subcommand, Debug, Clone)]
pub enum Commands {
    /// Serve the trigger endpoints (default).
    Serve,
    /// Run the script once and print the outcome as JSON.
    Run(RunArgs),
}

#[derive(ClapArgs, Debug, Clone)]
pub struct RunArgs {
    /// Pass --force to the script.
    #[arg(long, default_value_t = false)]
    pub force: bool,
}
