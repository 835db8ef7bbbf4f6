// metabridge-core/src/infrastructure/fs.rs

use serde::Serialize;
use std::io::Write;
use std::path::Path;

use crate::infrastructure::error::InfrastructureError;

/// Writes `content` to `path` through a temp file in the same directory,
/// then renames it into place. Readers see the old file or the new one,
/// never a partial write.
pub fn atomic_write<P: AsRef<Path>, C: AsRef<[u8]>>(
    path: P,
    content: C,
) -> Result<(), InfrastructureError> {
    let path = path.as_ref();
    let parent = match path.parent() {
        Some(p) if !p.as_os_str().is_empty() => p,
        _ => Path::new("."),
    };

    let mut temp_file = tempfile::NamedTempFile::new_in(parent)?;
    temp_file.write_all(content.as_ref())?;
    temp_file
        .persist(path)
        .map_err(|e| InfrastructureError::Io(e.error))?;

    Ok(())
}

/// Pretty-printed JSON, written atomically.
pub fn write_json<P: AsRef<Path>, T: Serialize + ?Sized>(
    path: P,
    value: &T,
) -> Result<(), InfrastructureError> {
    let mut content = serde_json::to_vec_pretty(value)?;
    content.push(b'\n');
    atomic_write(path, content)
}

pub fn ensure_dir<P: AsRef<Path>>(dir: P) -> Result<(), InfrastructureError> {
    std::fs::create_dir_all(dir.as_ref())?;
    Ok(())
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use anyhow::Result;
    use serde_json::json;
    use std::fs;
    use tempfile::tempdir;

    #[test]
    fn test_atomic_write_replaces_previous_content() -> Result<()> {
        let dir = tempdir()?;
        let file_path = dir.path().join("summary.json");

        atomic_write(&file_path, "first")?;
        atomic_write(&file_path, "second")?;

        assert_eq!(fs::read_to_string(&file_path)?, "second");
        // No temp files left next to the target
        assert_eq!(fs::read_dir(dir.path())?.count(), 1);
        Ok(())
    }

    #[test]
    fn test_write_json_in_nested_dir() -> Result<()> {
        let dir = tempdir()?;
        let nested = dir.path().join("out").join("run");
        ensure_dir(&nested)?;

        write_json(nested.join("matches.json"), &json!([{"confidence": 1.0}]))?;

        let parsed: serde_json::Value =
            serde_json::from_str(&fs::read_to_string(nested.join("matches.json"))?)?;
        assert_eq!(parsed, json!([{"confidence": 1.0}]));
        Ok(())
    }
}
