use clap::{Parser, Subcommand};
use std::path::PathBuf;

#[derive(Debug, Clone, Copy, PartialEq, Eq, clap::ValueEnum)]
pub enum OutputFormat {
    Text,
    Plain,
    Json,
}

#[derive(Parser)]
#[command(
    name = "ytsub",
    about = "YouTube subtitle transcript service",
    version = env!("GIT_DESCRIBE"),
)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand)]
pub enum Command {
    /// Run the HTTP server with the transcript endpoint and browser page
    Serve {
        /// Address to listen on (default from config, else 127.0.0.1:3000)
        #[arg(short, long)]
        bind: Option<String>,
    },

    /// Fetch the transcript for a YouTube URL and print it
    Fetch {
        /// YouTube video URL
        url: String,

        /// Use a running server instead of fetching in-process
        #[arg(short, long)]
        server: Option<String>,

        /// Output format: text (default), plain, json
        #[arg(short, long, value_enum, default_value_t = OutputFormat::Text)]
        format: OutputFormat,

        /// Copy all lines to the clipboard
        #[arg(short, long)]
        copy: bool,

        /// Write output to file instead of stdout
        #[arg(short, long)]
        output: Option<PathBuf>,

        /// Show the extracted video ID and line count
        #[arg(short, long)]
        verbose: bool,
    },
}
