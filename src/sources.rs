use log::{debug, error};
use std::fs;
use std::io;
use std::path::Path;

/// Reads one URL per line, trimmed, skipping blank lines. A missing or unreadable
/// file is logged and yields nothing.
pub fn read_urls<P: AsRef<Path>>(path: P) -> Vec<String> {
    let path = path.as_ref();
    match load_urls(path) {
        Ok(urls) => {
            debug!("Loaded {} URLs from {}", urls.len(), path.display());
            urls
        }
        Err(e) if e.kind() == io::ErrorKind::NotFound => {
            error!("Input file not found: {}", path.display());
            Vec::new()
        }
        Err(e) => {
            error!("Failed to read input file {}: {}", path.display(), e);
            Vec::new()
        }
    }
}

pub fn load_urls<P: AsRef<Path>>(path: P) -> io::Result<Vec<String>> {
    fs::read_to_string(path).map(|content| parse_urls(&content))
}

pub fn parse_urls(content: &str) -> Vec<String> {
    content
        .lines()
        .map(str::trim)
        .filter(|line| !line.is_empty())
        .map(str::to_string)
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_trims_and_drops_blank_lines_in_order() {
        let content = "  https://b.com  \n\n\thttps://a.com\r\n   \nc.org/\n";
        assert_eq!(
            parse_urls(content),
            vec!["https://b.com", "https://a.com", "c.org/"]
        );
    }

    #[test]
    fn test_reads_from_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("urls.txt");
        fs::write(&path, "one.com\n\n two.com \n").unwrap();

        assert_eq!(read_urls(&path), vec!["one.com", "two.com"]);
    }

    #[test]
    fn test_missing_file_yields_empty() {
        let dir = tempfile::tempdir().unwrap();
        assert!(read_urls(dir.path().join("missing.txt")).is_empty());
    }

    #[test]
    fn test_unreadable_file_keeps_error_kind() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("urls.txt");
        fs::write(&path, b"one.com\n\xff\xfe\n").unwrap();

        let err = load_urls(&path).unwrap_err();
        assert_eq!(err.kind(), io::ErrorKind::InvalidData);
        assert!(read_urls(&path).is_empty());

        let missing = load_urls(dir.path().join("missing.txt")).unwrap_err();
        assert_eq!(missing.kind(), io::ErrorKind::NotFound);
    }

    #[test]
    fn test_whitespace_only_file_yields_empty() {
        assert!(parse_urls("\n   \n\t\n").is_empty());
    }
}
