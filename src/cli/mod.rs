// CLI module for invoice-lens
// Author: kelexine (https://github.com/kelexine)

use crate::config::AppConfig;
use clap::Parser;
use std::path::PathBuf;

/// invoice-lens - ask questions about invoice images, answered by Google Gemini
#[derive(Parser, Debug)]
#[command(name = "invoice-lens", version, about, long_about = None)]
pub struct Args {
    /// Path to a TOML config file (default: ~/.invoice-lens/config.toml)
    #[arg(long, env = "INVOICE_LENS_CONFIG")]
    pub config: Option<PathBuf>,

    /// Address to bind (overrides server.host)
    #[arg(long)]
    pub host: Option<String>,

    /// Port to listen on (overrides server.port)
    #[arg(long)]
    pub port: Option<u16>,

    /// Send one minimal request to Gemini, report the result and exit
    #[arg(long)]
    pub check: bool,
}

impl Args {
    /// Apply CLI overrides, which take precedence over every other source.
    pub fn apply(&self, config: &mut AppConfig) {
        if let Some(host) = &self.host {
            config.server.host = host.clone();
        }
        if let Some(port) = self.port {
            config.server.port = port;
        }
    }
}
