use std::process::ExitCode;

use clap::Parser;
use lumen_app::{App, Cli};

fn main() -> ExitCode {
    App::run(Cli::parse())
}
