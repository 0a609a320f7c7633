use std::fs;
use std::path::{Path, PathBuf};

use crate::html::{self, ParseError};
use crate::model::Node;

/// Extension of document files on disk.
pub const DOCUMENT_EXTENSION: &str = "html";

#[derive(Debug, thiserror::Error)]
pub enum IoError {
    #[error("File not found: {0}")]
    NotFound(PathBuf),
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("Invalid document in {path}: {source}")]
    Parse { path: PathBuf, source: ParseError },
    #[error("Invalid documents directory: {0}")]
    InvalidDir(String),
}

/// Read and parse a document file
pub fn read_document(path: &Path) -> Result<Node, IoError> {
    if !path.exists() {
        return Err(IoError::NotFound(path.to_path_buf()));
    }
    let markup = fs::read_to_string(path)?;
    html::parse(&markup).map_err(|source| IoError::Parse {
        path: path.to_path_buf(),
        source,
    })
}

/// Write a document in canonical markup, creating parent directories
pub fn write_document(path: &Path, doc: &Node) -> Result<(), IoError> {
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent)?;
    }
    fs::write(path, html::serialize(doc))?;
    log::debug!("wrote document to {}", path.display());
    Ok(())
}

/// Every document file under `root`, sorted
pub fn scan_documents(root: &Path) -> Result<Vec<PathBuf>, IoError> {
    validate_dir(root)?;
    let mut files = Vec::new();
    scan_directory_recursive(root, &mut files)?;
    files.sort();
    Ok(files)
}

fn scan_directory_recursive(dir: &Path, files: &mut Vec<PathBuf>) -> Result<(), IoError> {
    for entry in fs::read_dir(dir)? {
        let path = entry?.path();
        if path.is_dir() {
            scan_directory_recursive(&path, files)?;
        } else if let Some(ext) = path.extension()
            && ext == DOCUMENT_EXTENSION
        {
            files.push(path);
        }
    }
    Ok(())
}

pub fn validate_dir(path: &Path) -> Result<(), IoError> {
    if !path.is_dir() {
        return Err(IoError::InvalidDir(format!(
            "{} is not a directory",
            path.display()
        )));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use tempfile::TempDir;

    fn sample() -> Node {
        Node::doc(vec![Node::block(
            Node::paragraph(vec![Node::text_node("Saved & loaded")]),
            vec![],
        )])
    }

    #[test]
    fn write_then_read_document() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("nested/folder/notes.html");

        write_document(&path, &sample()).unwrap();
        assert!(dir.path().join("nested/folder").is_dir());
        assert_eq!(
            fs::read_to_string(&path).unwrap(),
            "<block><p>Saved &amp; loaded</p></block>"
        );
        assert_eq!(read_document(&path).unwrap(), sample());
    }

    #[test]
    fn missing_and_invalid_files() {
        let dir = TempDir::new().unwrap();
        let missing = dir.path().join("missing.html");
        assert!(matches!(read_document(&missing), Err(IoError::NotFound(_))));

        let broken = dir.path().join("broken.html");
        fs::write(&broken, "<table></table>").unwrap();
        let err = read_document(&broken).unwrap_err();
        assert!(matches!(err, IoError::Parse { .. }));
        assert!(err.to_string().contains("unknown tag <table>"));
    }

    #[test]
    fn scan_finds_documents_recursively() {
        let dir = TempDir::new().unwrap();
        write_document(&dir.path().join("b.html"), &sample()).unwrap();
        write_document(&dir.path().join("sub/a.html"), &sample()).unwrap();
        fs::write(dir.path().join("config.toml"), "").unwrap();

        let files = scan_documents(dir.path()).unwrap();
        let names: Vec<_> = files
            .iter()
            .map(|f| f.strip_prefix(dir.path()).unwrap().to_string_lossy().into_owned())
            .collect();
        assert_eq!(names, vec!["b.html".to_string(), "sub/a.html".to_string()]);
    }

    #[test]
    fn scanning_a_missing_directory_fails() {
        let result = scan_documents(Path::new("/this/path/does/not/exist"));
        assert!(matches!(result, Err(IoError::InvalidDir(_))));
    }
}
