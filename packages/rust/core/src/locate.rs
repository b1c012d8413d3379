//! Finding the help container inside a platform installation.

use std::path::{Path, PathBuf};

use tracing::{debug, instrument};

use helpbook_shared::{HelpBookError, Result};

/// Depth-first search for a file named exactly `file_name` under `install_dir`.
///
/// Directory entries are visited in sorted order, so the first match is
/// stable across runs. Unreadable subdirectories are skipped.
#[instrument(skip_all, fields(dir = %install_dir.display(), file_name))]
pub fn find_container(install_dir: &Path, file_name: &str) -> Result<PathBuf> {
    if !install_dir.is_dir() {
        return Err(HelpBookError::load(format!(
            "installation directory not found: {}",
            install_dir.display()
        )));
    }

    let mut pending = vec![install_dir.to_path_buf()];
    while let Some(dir) = pending.pop() {
        let entries = match sorted_entries(&dir) {
            Ok(entries) => entries,
            Err(e) if dir != install_dir => {
                debug!(dir = %dir.display(), error = %e, "skipping unreadable directory");
                continue;
            }
            Err(e) => return Err(e),
        };

        let mut subdirs = Vec::new();
        for path in entries {
            if path.is_dir() {
                subdirs.push(path);
            } else if path.file_name().is_some_and(|name| name == file_name) {
                debug!(path = %path.display(), "container found");
                return Ok(path);
            }
        }
        // Reversed so the smallest name is searched first.
        pending.extend(subdirs.into_iter().rev());
    }

    Err(HelpBookError::load(format!(
        "{file_name} not found under {}",
        install_dir.display()
    )))
}

fn sorted_entries(dir: &Path) -> Result<Vec<PathBuf>> {
    let mut paths = std::fs::read_dir(dir)
        .map_err(|e| HelpBookError::io(dir, e))?
        .map(|entry| entry.map(|e| e.path()))
        .collect::<std::io::Result<Vec<_>>>()
        .map_err(|e| HelpBookError::io(dir, e))?;
    paths.sort();
    Ok(paths)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn touch(path: &Path) {
        std::fs::create_dir_all(path.parent().unwrap()).unwrap();
        std::fs::write(path, b"").unwrap();
    }

    #[test]
    fn finds_nested_container() {
        let dir = tempfile::tempdir().unwrap();
        let target = dir.path().join("8.3.24.1467/bin/shcntx_ru.hbk");
        touch(&dir.path().join("8.3.24.1467/bin/shcntx_en.hbk"));
        touch(&target);

        assert_eq!(find_container(dir.path(), "shcntx_ru.hbk").unwrap(), target);
    }

    #[test]
    fn first_match_in_sorted_order_wins() {
        let dir = tempfile::tempdir().unwrap();
        touch(&dir.path().join("b/shcntx_ru.hbk"));
        touch(&dir.path().join("a/deep/shcntx_ru.hbk"));

        let found = find_container(dir.path(), "shcntx_ru.hbk").unwrap();
        assert_eq!(found, dir.path().join("a/deep/shcntx_ru.hbk"));
    }

    #[test]
    fn name_must_match_exactly() {
        let dir = tempfile::tempdir().unwrap();
        touch(&dir.path().join("bin/shcntx_ru.hbk.bak"));
        let err = find_container(dir.path(), "shcntx_ru.hbk").unwrap_err();
        assert!(matches!(err, HelpBookError::Load { .. }));
    }

    #[test]
    fn missing_install_dir_is_a_load_error() {
        let dir = tempfile::tempdir().unwrap();
        let err = find_container(&dir.path().join("nope"), "x.hbk").unwrap_err();
        assert!(matches!(err, HelpBookError::Load { .. }));
    }
}
