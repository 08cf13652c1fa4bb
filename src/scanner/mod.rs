//! Petition page scanning
//!
//! PDF-to-image conversion happens outside this tool; the engine accepts a
//! folder of pre-rendered page images. Pages are sorted by file name and
//! the sorted position defines the 1-based page number.

use crate::error::{BallotError, Result};
use std::path::{Path, PathBuf};
use walkdir::WalkDir;

#[derive(Debug, Clone)]
pub struct PageImage {
    pub path: PathBuf,
    pub file_name: String,
    pub page_number: u32,
}

const IMAGE_EXTENSIONS: &[&str] = &["jpg", "jpeg", "png", "JPG", "JPEG", "PNG"];

pub fn scan_pages(folder: &Path) -> Result<Vec<PageImage>> {
    if !folder.exists() {
        return Err(BallotError::FileNotFound(folder.display().to_string()));
    }

    let mut pages = Vec::new();

    for entry in WalkDir::new(folder)
        .max_depth(1)  // top level only
        .into_iter()
        .filter_map(|e| e.ok())
    {
        let path = entry.path();

        if !path.is_file() {
            continue;
        }

        if let Some(ext) = path.extension() {
            let ext_str = ext.to_string_lossy();
            if IMAGE_EXTENSIONS.iter().any(|&e| e == ext_str) {
                let file_name = path
                    .file_name()
                    .map(|n| n.to_string_lossy().to_string())
                    .unwrap_or_default();

                pages.push(PageImage {
                    path: path.to_path_buf(),
                    file_name,
                    page_number: 0,
                });
            }
        }
    }

    // name order defines page order
    pages.sort_by(|a, b| a.file_name.cmp(&b.file_name));
    for (idx, page) in pages.iter_mut().enumerate() {
        page.page_number = idx as u32 + 1;
    }

    Ok(pages)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs::{self, File};
    use std::io::Write;

    #[test]
    fn test_scan_pages_not_found() {
        let result = scan_pages(Path::new("/nonexistent/folder"));
        assert!(result.is_err());
    }

    #[test]
    fn test_scan_pages_empty() {
        let temp_dir = std::env::temp_dir().join("ballot-verify-test-empty");
        fs::create_dir_all(&temp_dir).unwrap();

        let result = scan_pages(&temp_dir).unwrap();
        assert!(result.is_empty());

        fs::remove_dir_all(&temp_dir).ok();
    }

    #[test]
    fn test_scan_pages_filters_and_numbers() {
        let temp_dir = std::env::temp_dir().join("ballot-verify-test-pages");
        fs::create_dir_all(&temp_dir).unwrap();

        File::create(temp_dir.join("page-02.jpg")).unwrap().write_all(b"dummy").unwrap();
        File::create(temp_dir.join("page-01.jpg")).unwrap().write_all(b"dummy").unwrap();
        File::create(temp_dir.join("page-03.png")).unwrap().write_all(b"dummy").unwrap();
        File::create(temp_dir.join("notes.txt")).unwrap().write_all(b"text").unwrap();

        let result = scan_pages(&temp_dir).unwrap();
        assert_eq!(result.len(), 3);
        assert_eq!(result[0].file_name, "page-01.jpg");
        assert_eq!(result[0].page_number, 1);
        assert_eq!(result[1].file_name, "page-02.jpg");
        assert_eq!(result[2].page_number, 3);

        fs::remove_dir_all(&temp_dir).ok();
    }
}
