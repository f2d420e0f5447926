use serde::de::DeserializeOwned;
use std::io::{self, Read};

/// Request piped on stdin, or `None` when stdin is a terminal or empty.
///
/// JSON is tried first; YAML is accepted as a fallback so the same files
/// work with `--input` and with a pipe.
pub fn read_stdin<T: DeserializeOwned>() -> Result<Option<T>, Box<dyn std::error::Error>> {
    if atty::is(atty::Stream::Stdin) {
        return Ok(None);
    }

    let mut buffer = String::new();
    io::stdin().read_to_string(&mut buffer)?;

    let trimmed = buffer.trim();
    if trimmed.is_empty() {
        return Ok(None);
    }

    match serde_json::from_str(trimmed) {
        Ok(parsed) => Ok(Some(parsed)),
        Err(json_err) => serde_yaml::from_str(trimmed)
            .map(Some)
            .map_err(|_| format!("Failed to parse stdin: {json_err}").into()),
    }
}
