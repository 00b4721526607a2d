use clap::{Args, Parser, Subcommand};

#[derive(Parser)]
#[command(name = "dk", about = concat!("[>] deck v", env!("CARGO_PKG_VERSION"), " - boards you can drag"), version)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Option<Commands>,

    /// Output as JSON
    #[arg(long, global = true)]
    pub json: bool,

    /// Run against a different working directory
    #[arg(short = 'C', long = "dir", global = true)]
    pub dir: Option<String>,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Write a starter store document
    Seed(SeedArgs),
    /// Validate the store document
    Check,
    /// Print a summary of every board
    Boards,
}

#[derive(Args)]
pub struct SeedArgs {
    /// Overwrite an existing store document
    #[arg(long)]
    pub force: bool,
}
