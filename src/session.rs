use std::path::Path;

use crate::error::Result;
use crate::models::Transaction;

/// Load the in-progress batch. A missing session file is an empty batch.
pub fn load_batch(path: &Path) -> Result<Vec<Transaction>> {
    if !path.exists() {
        return Ok(Vec::new());
    }
    let content = std::fs::read_to_string(path)?;
    Ok(serde_json::from_str(&content)?)
}

/// Save the batch as a JSON array. Saving an empty batch removes the file.
pub fn save_batch(path: &Path, batch: &[Transaction]) -> Result<()> {
    if batch.is_empty() {
        return delete_session(path);
    }
    let json = serde_json::to_string_pretty(batch)?;
    std::fs::write(path, format!("{json}\n"))?;
    Ok(())
}

pub fn delete_session(path: &Path) -> Result<()> {
    match std::fs::remove_file(path) {
        Err(e) if e.kind() != std::io::ErrorKind::NotFound => Err(e.into()),
        _ => Ok(()),
    }
}
