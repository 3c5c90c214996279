use std::fs::{self, File};
use std::io::{self, Write};
use std::path::Path;

/// Atomically write bytes to a file, creating parent directories as needed.
///
/// Exported project trees contain nested paths (`src/adapters/<ecosystem>/...`),
/// so missing ancestors are created first. The content is written to a temp
/// file in the same directory and renamed into place: the file ends up with
/// either the old contents or the new contents, never a partial write.
///
/// # Errors
/// Returns an error if directory creation, the write, or the rename fails.
pub fn write_atomic(path: &Path, bytes: &[u8]) -> io::Result<()> {
    let parent = path.parent().unwrap_or_else(|| Path::new("."));
    if !parent.as_os_str().is_empty() {
        fs::create_dir_all(parent)?;
    }

    // Temp file in the same directory so the rename stays on one filesystem
    let mut temp_path = parent.to_path_buf();
    temp_path.push(format!(
        ".{}.tmp.{}",
        path.file_name().and_then(|n| n.to_str()).unwrap_or("file"),
        std::process::id()
    ));

    {
        let mut file = File::create(&temp_path)?;
        file.write_all(bytes)?;
        file.sync_all()?;
    }

    match fs::rename(&temp_path, path) {
        Ok(()) => Ok(()),
        Err(e) => {
            // On Windows, rename can fail if the target exists. Copy + remove as fallback.
            if cfg!(windows) {
                fs::copy(&temp_path, path)?;
                let _ = fs::remove_file(&temp_path);
                Ok(())
            } else {
                let _ = fs::remove_file(&temp_path);
                Err(e)
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[test]
    fn test_write_atomic_creates_parents() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("src/adapters/evm/adapter.ts");

        write_atomic(&path, b"export class EvmAdapter {}").unwrap();

        assert_eq!(
            fs::read_to_string(&path).unwrap(),
            "export class EvmAdapter {}"
        );
    }

    #[test]
    fn test_write_atomic_replaces_existing() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("package.json");

        write_atomic(&path, b"{\"name\":\"old\"}").unwrap();
        write_atomic(&path, b"{\"name\":\"new\"}").unwrap();

        assert_eq!(fs::read_to_string(&path).unwrap(), "{\"name\":\"new\"}");
    }

    #[test]
    fn test_write_atomic_leaves_no_temp_files() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("app.config.json");

        write_atomic(&path, b"{}").unwrap();

        let entries: Vec<_> = fs::read_dir(dir.path())
            .unwrap()
            .map(|e| e.unwrap().file_name())
            .collect();
        assert_eq!(entries, vec![std::ffi::OsString::from("app.config.json")]);
    }
}
