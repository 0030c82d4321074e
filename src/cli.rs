use clap::{Parser, Subcommand};

#[derive(Parser)]
#[command(name = "shikkhaloy-admin")]
#[command(about = "Terminal administration console for the Shikkhaloy school-management backend")]
#[command(version)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Option<Commands>,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Launch the interactive administration console (default)
    Tui,

    /// Probe backend connectivity and print the configured sessions
    Check,

    /// List every administrable resource and its backend path
    Resources,
}
