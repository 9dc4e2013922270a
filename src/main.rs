use clap::Parser;
use rsqm::cli::{run, Cli};

fn main() -> std::process::ExitCode {
    run(Cli::parse())
}
