use std::fs::OpenOptions;
use std::io;
use std::path::Path;

use env_logger::{Builder, Env, Target};
use log::LevelFilter;

/// Filter for the number of `-v` flags given.
pub fn level_for(verbosity: u8) -> LevelFilter {
    match verbosity {
        0 => LevelFilter::Warn,
        1 => LevelFilter::Info,
        _ => LevelFilter::Debug,
    }
}

/// Installs the global logger. `RUST_LOG` overrides `verbosity`.
///
/// Records go to stderr unless `log_file` is given, in which case they are
/// appended to it; the terminal frontend draws over anything written to
/// stderr while a game is running.
pub fn init(verbosity: u8, log_file: Option<&Path>) -> io::Result<()> {
    let env = Env::default().default_filter_or(level_for(verbosity).to_string());
    let mut builder = Builder::from_env(env);
    builder.format_timestamp_millis();
    if let Some(path) = log_file {
        let file = OpenOptions::new().create(true).append(true).open(path)?;
        builder.target(Target::Pipe(Box::new(file)));
    }
    // Fails only when a logger is already installed, which is fine.
    let _ = builder.try_init();
    Ok(())
}
