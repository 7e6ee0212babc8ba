//! The `commute` binary.

use clap::Parser as _;
use clap_verbosity_flag::{InfoLevel, Verbosity};
use commute_cli::CliArgs;

fn main() {
    match CliArgs::parse() {
        CliArgs::Deps(mut args) => {
            init_tracing(&args.verbose);
            exit_on_error(args.run(), &args.verbose);
        }
        CliArgs::Check(mut args) => {
            init_tracing(&args.verbose);
            exit_on_error(args.run().map(|_| ()), &args.verbose);
        }
        CliArgs::External(args) => {
            let name = args
                .first()
                .map(|arg| arg.to_string_lossy().into_owned())
                .unwrap_or_default();
            eprintln!("error: no such subcommand: '{name}'");
            std::process::exit(1);
        }
        _ => {
            eprintln!("Unknown command");
            std::process::exit(1);
        }
    };
}

/// Send log events to stderr, filtered by the requested verbosity.
fn init_tracing(verbose: &Verbosity<InfoLevel>) {
    tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .with_max_level(verbose.tracing_level_filter())
        .without_time()
        .with_target(false)
        .init();
}

fn exit_on_error(result: anyhow::Result<()>, verbose: &Verbosity<InfoLevel>) {
    if let Err(e) = result {
        if verbose.tracing_level().is_some() {
            eprintln!("{e}");
        }
        std::process::exit(1);
    }
}
