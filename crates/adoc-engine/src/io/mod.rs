use relative_path::RelativePath;
use std::fs;
use std::path::{Path, PathBuf};

#[derive(Debug, thiserror::Error)]
pub enum IoError {
    #[error("no such file: {0}")]
    NotFound(PathBuf),
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// Read an AsciiDoc source file
pub fn read_file(path: &Path) -> Result<String, IoError> {
    if !path.exists() {
        return Err(IoError::NotFound(path.to_path_buf()));
    }
    fs::read_to_string(path).map_err(IoError::Io)
}

/// Write rendered output, creating parent directories as needed
pub fn write_file(path: &Path, content: &str) -> Result<(), IoError> {
    if let Some(parent) = path.parent()
        && !parent.as_os_str().is_empty()
    {
        fs::create_dir_all(parent)?;
    }
    fs::write(path, content).map_err(IoError::Io)
}

/// Supplies the text of included files.
///
/// The parser never touches the filesystem itself; returning `None` leaves
/// the include directive in the output as plain text.
pub trait IncludeResolver {
    fn resolve(&self, path: &Path) -> Option<String>;
}

/// Reads includes from disk.
#[derive(Debug, Clone, Copy, Default)]
pub struct FsIncludeResolver;

impl IncludeResolver for FsIncludeResolver {
    fn resolve(&self, path: &Path) -> Option<String> {
        match read_file(path) {
            Ok(text) => Some(text),
            Err(e) => {
                log::warn!("cannot include {}: {e}", path.display());
                None
            }
        }
    }
}

/// Resolves an include target against the directory of the including
/// document. Absolute targets are kept as they are.
pub fn resolve_include_path(base_dir: &Path, target: &str) -> PathBuf {
    let path = Path::new(target);
    if path.is_absolute() {
        return path.to_path_buf();
    }
    RelativePath::new(target).to_path(base_dir)
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use tempfile::TempDir;

    #[test]
    fn test_reads_source_document() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("doc.adoc");
        fs::write(&path, "= Title\n\nBody").unwrap();

        assert_eq!(read_file(&path).unwrap(), "= Title\n\nBody");
    }

    #[test]
    fn test_missing_source_is_not_found() {
        let dir = TempDir::new().unwrap();
        let result = read_file(&dir.path().join("missing.adoc"));
        assert!(matches!(result, Err(IoError::NotFound(_))));
    }

    #[test]
    fn test_output_directories_are_created() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("out/site/index.html");

        write_file(&path, "<p>hi</p>").unwrap();

        assert_eq!(read_file(&path).unwrap(), "<p>hi</p>");
        assert!(dir.path().join("out/site").is_dir());
    }

    #[test]
    fn test_include_paths_are_relative_to_base() {
        let base = Path::new("/docs/guide");
        assert_eq!(
            resolve_include_path(base, "parts/intro.adoc"),
            PathBuf::from("/docs/guide/parts/intro.adoc")
        );
        assert_eq!(
            resolve_include_path(base, "/abs/other.adoc"),
            PathBuf::from("/abs/other.adoc")
        );
    }

    #[test]
    fn test_fs_resolver_reads_and_misses() {
        let dir = TempDir::new().unwrap();
        fs::write(dir.path().join("part.adoc"), "included").unwrap();

        let resolver = FsIncludeResolver;
        assert_eq!(
            resolver.resolve(&dir.path().join("part.adoc")),
            Some("included".to_string())
        );
        assert_eq!(resolver.resolve(&dir.path().join("nope.adoc")), None);
    }
}
