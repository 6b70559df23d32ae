use clap::{Parser, Subcommand};

/// Ladle - recipe sharing backend
#[derive(Parser)]
#[command(name = "ladle")]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Option<Commands>,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Run the HTTP API server
    #[command(alias = "s")]
    Serve {
        /// Override the configured port
        #[arg(long)]
        port: Option<u16>,
    },

    /// Create a default config file
    Init,

    /// Create a staff user that may edit any recipe
    CreateAdmin {
        #[arg(long)]
        email: String,

        #[arg(long)]
        username: String,

        #[arg(long)]
        password: String,
    },
}
