use log::LevelFilter;
use std::io::Write;
use std::time::Instant;

/// Install the stderr logger used by the binary
///
/// Every line carries the time elapsed since `start`. Quiet mode keeps
/// warnings and errors only; `RUST_LOG` overrides either level.
pub fn init_logging(quiet: bool, start: Instant) {
    let level = if quiet {
        LevelFilter::Warn
    } else {
        LevelFilter::Info
    };

    let _ = env_logger::Builder::new()
        .filter_level(level)
        .parse_default_env()
        .format(move |buf, record| {
            let elapsed = start.elapsed();
            writeln!(
                buf,
                "[{:>4}.{:03}s {:<5}] {}",
                elapsed.as_secs(),
                elapsed.subsec_millis(),
                record.level(),
                record.args()
            )
        })
        .target(env_logger::Target::Stderr)
        .try_init();
}
