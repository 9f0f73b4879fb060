// reelstitch-cli/src/main.rs
//
// Entry point of the `reelstitch` binary: parses arguments, sets up color
// and logging, dispatches to the command and maps the outcome onto the
// process exit code.

use clap::Parser;
use log::error;
use reelstitch_cli::{Cli, Commands, logging, run_all, run_compile, run_schedule, terminal};
use std::process;

fn main() {
    let cli = Cli::parse();

    terminal::init_color(cli.no_color);
    if let Err(e) = logging::init(cli.verbose) {
        eprintln!("Error: {e}");
        process::exit(1);
    }

    let result = match cli.command {
        Commands::Compile(args) => run_compile(args, cli.log_dir).map(|_| ()),
        Commands::Schedule(args) => run_schedule(args, cli.log_dir).map(|_| ()),
        Commands::Run(args) => run_all(args, cli.log_dir),
    };

    if let Err(e) = result {
        error!("{e}");
        logging::detach_log_file();
        process::exit(1);
    }
    logging::detach_log_file();
}
