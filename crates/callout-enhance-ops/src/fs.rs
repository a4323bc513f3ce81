use std::fs;
use std::io::Write;
use std::path::Path;

use tempfile::Builder;

use crate::error::{OperationError, OperationResult};

/// Atomically replace `path` with `contents`. Readers never observe a partial
/// file: the data goes to a temporary file in the same directory which is
/// then renamed over the target, keeping the original permissions. With
/// `backup`, the previous contents are copied to `<path>.bak` first.
pub fn write_atomic(path: &Path, contents: &str, backup: bool) -> OperationResult<()> {
    let parent = match path.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => parent.to_path_buf(),
        _ => Path::new(".").to_path_buf(),
    };

    if backup && path.exists() {
        let backup_path = path.with_extension(backup_extension(path));
        fs::copy(path, &backup_path).map_err(|err| OperationError::io(&backup_path, err))?;
    }

    let mut tmp = Builder::new()
        .prefix(".callout-enhance")
        .tempfile_in(&parent)
        .map_err(|err| OperationError::io(&parent, err))?;

    let tmp_path = tmp.path().to_path_buf();
    let file = tmp.as_file_mut();
    file.write_all(contents.as_bytes())
        .and_then(|_| file.sync_all())
        .map_err(|err| OperationError::io(&tmp_path, err))?;

    #[cfg(unix)]
    {
        use std::os::unix::fs::PermissionsExt;
        if let Ok(metadata) = fs::metadata(path) {
            let perm = metadata.permissions().mode();
            let _ = fs::set_permissions(tmp.path(), fs::Permissions::from_mode(perm));
        }
    }

    tmp.persist(path)
        .map(|_| ())
        .map_err(|err| OperationError::io(path, err.error))
}

fn backup_extension(path: &Path) -> String {
    match path.extension() {
        Some(ext) => format!("{}.bak", ext.to_string_lossy()),
        None => "bak".to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[test]
    fn writes_atomically_with_backup() {
        let dir = tempdir().unwrap();
        let file_path = dir.path().join("index.html");
        fs::write(&file_path, "<p>old</p>").unwrap();

        write_atomic(&file_path, "<p>new</p>", true).unwrap();

        assert_eq!(fs::read_to_string(&file_path).unwrap(), "<p>new</p>");
        assert_eq!(
            fs::read_to_string(dir.path().join("index.html.bak")).unwrap(),
            "<p>old</p>"
        );
    }

    #[test]
    fn leaves_no_temporary_files_behind() {
        let dir = tempdir().unwrap();
        let file_path = dir.path().join("page.html");
        fs::write(&file_path, "x").unwrap();

        write_atomic(&file_path, "y", false).unwrap();

        let names: Vec<_> = fs::read_dir(dir.path())
            .unwrap()
            .map(|entry| entry.unwrap().file_name())
            .collect();
        assert_eq!(names, vec![std::ffi::OsString::from("page.html")]);
    }
}
