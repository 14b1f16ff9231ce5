use env_logger::{Builder, Env, Target};
use std::fs::{self, OpenOptions};
use std::path::Path;

/// Environment variable holding the log filter, e.g. `ELIFBA_LOG=debug`.
pub const LOG_ENV: &str = "ELIFBA_LOG";

/// Routes `log` output to `path`. The terminal belongs to the TUI, so when
/// the file cannot be opened logging stays off.
pub fn init(path: &Path) -> std::io::Result<()> {
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent)?;
    }
    let file = OpenOptions::new().create(true).append(true).open(path)?;

    Builder::from_env(Env::default().filter_or(LOG_ENV, "info"))
        .target(Target::Pipe(Box::new(file)))
        .format_timestamp_millis()
        .try_init()
        .map_err(std::io::Error::other)
}
