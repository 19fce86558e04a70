//! tracing subscriber setup

use tracing_subscriber::EnvFilter;
use tracing_subscriber::filter::LevelFilter;

/// Level for a `-v` count: warn by default, info with `-v`, debug with `-vv` or more
pub fn level_for(verbosity: u8) -> LevelFilter {
    match verbosity {
        0 => LevelFilter::WARN,
        1 => LevelFilter::INFO,
        _ => LevelFilter::DEBUG,
    }
}

/// Install the global subscriber, writing to stderr. `RUST_LOG` overrides the level.
pub fn init_tracing(verbosity: u8) {
    let filter = EnvFilter::builder()
        .with_default_directive(level_for(verbosity).into())
        .from_env_lossy();

    // try_init: a second subscriber (tests) is not an error
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .compact()
        .try_init();
}
