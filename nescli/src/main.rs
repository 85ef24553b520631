//
// NES tools
//
// @author Natesh Narain <nnaraindev@gmail.com>
// @date Mar 01 2020
//
use nescli::{Options, Command};
use clap::Parser;

use std::process::ExitCode;

fn main() -> ExitCode {
    nesle::init_logging();

    let opts = Options::parse();

    let result = match opts.cmd {
        Command::Info(opts)       => nescli::info::dispatch(opts),
        Command::Play(opts)       => nescli::play::dispatch(opts),
        Command::Screenshot(opts) => nescli::screenshot::dispatch(opts),
    };

    match result {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            tracing::error!(error = %e, "command failed");
            eprintln!("error: {}", e);
            ExitCode::FAILURE
        },
    }
}
