pub mod file;
pub mod stdin;

use serde::de::DeserializeOwned;

/// Resolve a command's JSON payload: `--input` file first, then piped stdin.
pub fn read_payload<T: DeserializeOwned>(
    path: Option<&str>,
) -> Result<Option<T>, Box<dyn std::error::Error>> {
    if let Some(path) = path {
        return Ok(Some(file::read_json(path)?));
    }
    match stdin::read_stdin()? {
        Some(data) => Ok(Some(serde_json::from_value(data)?)),
        None => Ok(None),
    }
}
