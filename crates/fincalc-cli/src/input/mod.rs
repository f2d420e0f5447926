pub mod file;
pub mod stdin;

use serde::de::DeserializeOwned;
use tracing::debug;

/// Load a typed request from `--input`, falling back to piped stdin.
///
/// Returns `None` when neither is present so the caller can build the
/// request from individual flags.
pub fn load<T: DeserializeOwned>(path: Option<&str>) -> Result<Option<T>, Box<dyn std::error::Error>> {
    if let Some(path) = path {
        debug!(path, "reading input file");
        return Ok(Some(file::read_input(path)?));
    }
    if let Some(parsed) = stdin::read_stdin()? {
        debug!("read input from stdin");
        return Ok(Some(parsed));
    }
    debug!("building input from flags");
    Ok(None)
}

/// Unwrap a required flag, naming it in the error.
pub fn required<T>(value: Option<T>, flag: &str) -> Result<T, Box<dyn std::error::Error>> {
    value.ok_or_else(|| format!("--{flag} is required (or provide --input)").into())
}
