use clap::Parser;
use log::error;
use std::process::ExitCode;
use std::time::Instant;
use vke::cli::{help_text, init_logging, Cli, Invocation};
use vke::{run, TerminalPrompt};

/// Version info from build.rs
const VERSION: &str = env!("VKE_VERSION");
const PROFILE: &str = env!("VKE_PROFILE");
const GIT_HASH: &str = env!("VKE_GIT_HASH");

/// Help and usage failures exit with this status
const USAGE_EXIT: u8 = 1;

fn main() -> ExitCode {
    let start = Instant::now();

    let cli = match Cli::try_parse() {
        Ok(cli) => cli,
        Err(e) => {
            let _ = e.print();
            println!("{}", help_text());
            return ExitCode::from(USAGE_EXIT);
        }
    };
    init_logging(cli.quiet, start);

    let (config, source, mut layers) = match cli.into_invocation(start) {
        Ok(Invocation::Help) => {
            println!("{}", help_text());
            return ExitCode::from(USAGE_EXIT);
        }
        Ok(Invocation::Version) => {
            println!("vke {} {} ({})", PROFILE, VERSION, GIT_HASH);
            return ExitCode::SUCCESS;
        }
        Ok(Invocation::Run {
            config,
            source,
            layers,
        }) => (config, source, layers),
        Err(e) => {
            error!("{}", e);
            println!("{}", help_text());
            return ExitCode::from(USAGE_EXIT);
        }
    };

    match run(&config, &source, &mut layers, &mut TerminalPrompt) {
        Ok(report) => ExitCode::from(report.exit_code()),
        Err(e) => {
            error!("{}", e);
            println!("{}", help_text());
            ExitCode::from(USAGE_EXIT)
        }
    }
}
