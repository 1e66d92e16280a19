//! Directory walk with a deny-set of directory names and an accept-set of
//! file extensions.

use std::path::{Path, PathBuf};

use walkdir::WalkDir;

const DENY_DIRS: &[&str] = &["node_modules", "dist", "build", ".git", ".next", "__pycache__", "coverage", ".turbo", "target"];

const ACCEPT_EXTENSIONS: &[&str] = &["ts", "tsx", "js", "jsx", "py", "java", "go", "cs"];

pub fn scan_repo_files(repo_path: &Path) -> Vec<PathBuf> {
    WalkDir::new(repo_path)
        .into_iter()
        .filter_entry(|e| {
            if e.file_type().is_dir() {
                e.file_name().to_str().map(|n| !DENY_DIRS.contains(&n)).unwrap_or(true)
            } else {
                true
            }
        })
        .filter_map(Result::ok)
        .filter(|e| e.file_type().is_file())
        .filter(|e| {
            e.path()
                .extension()
                .and_then(|x| x.to_str())
                .map(|ext| ACCEPT_EXTENSIONS.contains(&ext))
                .unwrap_or(false)
        })
        .map(|e| e.path().to_path_buf())
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;

    #[test]
    fn prunes_deny_dirs_and_filters_by_extension() {
        let dir = std::env::temp_dir().join(format!("indexer-scan-test-{}", std::process::id()));
        let _ = fs::remove_dir_all(&dir);
        fs::create_dir_all(dir.join("src")).unwrap();
        fs::create_dir_all(dir.join("node_modules/pkg")).unwrap();
        fs::write(dir.join("src/main.ts"), "export const x = 1;").unwrap();
        fs::write(dir.join("src/readme.md"), "hello").unwrap();
        fs::write(dir.join("node_modules/pkg/index.js"), "module.exports = {}").unwrap();

        let found = scan_repo_files(&dir);
        assert!(found.iter().any(|p| p.ends_with("src/main.ts")));
        assert!(!found.iter().any(|p| p.to_string_lossy().contains("node_modules")));
        assert!(!found.iter().any(|p| p.ends_with("readme.md")));

        fs::remove_dir_all(&dir).unwrap();
    }
}
