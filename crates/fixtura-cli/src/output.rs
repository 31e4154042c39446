use std::fs::{OpenOptions, create_dir_all};
use std::io::{self, Write};
use std::path::{Path, PathBuf};

use serde::Serialize;

use crate::CliError;

/// Writes `value` as pretty JSON to `path`, or to stdout when no path is set.
pub fn emit_json<T: Serialize>(path: Option<&Path>, value: &T) -> Result<(), CliError> {
    let data = serde_json::to_vec_pretty(value)?;
    match path {
        Some(path) => write_bytes_atomic(path, &data),
        None => {
            let mut stdout = io::stdout().lock();
            stdout.write_all(&data)?;
            stdout.write_all(b"\n")?;
            Ok(())
        }
    }
}

/// Writes through a sibling temp file so readers never see a partial file.
pub fn write_bytes_atomic(path: &Path, data: &[u8]) -> Result<(), CliError> {
    if let Some(parent) = path.parent() {
        if !parent.as_os_str().is_empty() {
            create_dir_all(parent)?;
        }
    }

    let tmp_path = temp_path(path)?;
    let mut file = OpenOptions::new()
        .create(true)
        .truncate(true)
        .write(true)
        .open(&tmp_path)?;
    file.write_all(data)?;
    file.sync_all()?;
    std::fs::rename(&tmp_path, path)?;
    Ok(())
}

fn temp_path(path: &Path) -> Result<PathBuf, CliError> {
    let file_name = path.file_name().ok_or_else(|| {
        CliError::InvalidConfig(format!("'{}' is not a file path", path.display()))
    })?;
    let tmp_name = format!("{}.tmp", file_name.to_string_lossy());
    Ok(path.with_file_name(tmp_name))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn atomic_write_replaces_content() {
        let dir = std::env::temp_dir().join(format!("fixtura-cli-{}", std::process::id()));
        let path = dir.join("nested").join("out.json");
        write_bytes_atomic(&path, b"[1]").expect("first write");
        write_bytes_atomic(&path, b"[2]").expect("second write");
        assert_eq!(std::fs::read(&path).expect("read"), b"[2]");
        assert!(!path.with_file_name("out.json.tmp").exists());
        std::fs::remove_dir_all(&dir).expect("cleanup");
    }

    #[test]
    fn rejects_paths_without_file_name() {
        assert!(matches!(
            temp_path(Path::new("/")),
            Err(CliError::InvalidConfig(_))
        ));
    }
}
