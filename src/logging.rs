use tracing_subscriber::{fmt, prelude::*, EnvFilter};

/// Filter directive for the crate at a given `-v` count.
pub fn default_directive(verbose: u8, quiet: bool) -> &'static str {
    if quiet {
        return "calparse=error";
    }
    match verbose {
        0 => "calparse=warn",
        1 => "calparse=info",
        2 => "calparse=debug",
        _ => "calparse=trace",
    }
}

/// Installs the global subscriber. `RUST_LOG` takes precedence over the verbosity flags.
pub fn init_logging(verbose: u8, quiet: bool) {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(default_directive(verbose, quiet)));

    let stderr_layer = fmt::layer().with_writer(std::io::stderr).with_target(false);

    // A second init (tests, embedding) keeps the first subscriber.
    let _ = tracing_subscriber::registry()
        .with(filter)
        .with(stderr_layer)
        .try_init();
}
