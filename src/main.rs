use clap::Parser;
use deck::cli::commands::Cli;
use deck::cli::handlers;

fn main() {
    let cli = Cli::parse();

    let result = if cli.command.is_none() {
        handlers::resolve_dir(cli.dir.as_deref()).and_then(|dir| deck::tui::run(&dir))
    } else {
        handlers::dispatch(cli)
    };

    if let Err(e) = result {
        eprintln!("error: {}", e);
        std::process::exit(1);
    }
}
