mod cli;
mod distribution_cmd;
mod lines_cmd;
mod prognosis_cmd;
mod records_cmd;
mod shared;
mod summary_cmd;

use clap::Parser;
use cli::{Cli, Commands};

fn main() {
    let cli = Cli::parse();
    shared::init_logging(cli.verbose);

    let result = match cli.command {
        Commands::Summary {
            ref input,
            ref program,
        } => summary_cmd::run(input, program),
        Commands::Records { ref input } => records_cmd::run(input),
        Commands::Prognosis {
            ref input,
            ref program,
        } => prognosis_cmd::run(input, program),
        Commands::Distribution { ref input } => distribution_cmd::run(input),
        Commands::Lines { ref input } => lines_cmd::run(input),
    };

    if let Err(code) = result {
        std::process::exit(code);
    }
}
