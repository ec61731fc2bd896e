// Command-line interface

pub mod commands;

use clap::{Parser, Subcommand};

#[derive(Parser, Debug)]
#[command(name = "frigo")]
#[command(about = "Frigo - find recipes you can cook with what is in your fridge", long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Bootstrap the ingredient index from the recipe store and serve fridge search
    Serve {
        /// Port to listen on
        #[arg(short, long, env = "PORT")]
        port: Option<u16>,

        /// Host to bind to
        #[arg(long, env = "HOST")]
        host: Option<String>,
    },

    /// Query a running server with the ingredients you have
    Search {
        /// Ingredients, separately or comma-separated ("tomate, oeuf")
        #[arg(required = true)]
        ingredients: Vec<String>,

        /// Only recipes whose every ingredient is available
        #[arg(long)]
        strict: bool,

        /// Server base URL (defaults to the configured host and port)
        #[arg(long, env = "FRIGO_URL")]
        server: Option<String>,
    },
}
