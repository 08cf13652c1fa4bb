//! OCR provider collaborator
//!
//! The engine does not read page images itself; an external vision CLI is
//! handed each page and returns the signature rows as a JSON array of
//! `{Name, Address, Date, Ward}` objects. The provider sits behind a
//! trait seam so tests run against a mock.

use super::cache::{compute_file_hash, CacheFile};
use super::{attach_metadata, OcrEntry, RawEntry};
use crate::error::{BallotError, Result};
use crate::scanner::PageImage;
use std::time::Duration;

const EXTRACTION_PROMPT: &str = "Read the handwritten petition rows in the image and output a JSON \
array where each element is an object with keys 'Name', 'Address', 'Date', and 'Ward'. Write all \
values in full. Remove the city name and any zip codes from the 'Address' values. Output only the \
JSON array, no other text.";

#[allow(async_fn_in_trait)]
pub trait OcrProvider {
    /// Extract the signature rows from one page image.
    async fn extract_page(&self, page: &PageImage, verbose: bool) -> Result<Vec<RawEntry>>;
}

/// Subprocess-backed provider: hands the page to an external vision CLI
/// (`<command> -p "<prompt> <image path>" --output-format text`). Calls
/// that exceed the configured timeout are killed and reported as a
/// provider error for that page.
pub struct CliOcrProvider {
    command: String,
    timeout: Duration,
}

impl CliOcrProvider {
    pub fn new(command: impl Into<String>, timeout_seconds: u64) -> Self {
        Self {
            command: command.into(),
            timeout: Duration::from_secs(timeout_seconds),
        }
    }

    async fn run_cli(&self, prompt: &str) -> Result<String> {
        use tokio::process::Command;

        #[cfg(windows)]
        let mut command = {
            let mut c = Command::new("cmd");
            c.args(["/c", &self.command, "-p", prompt, "--output-format", "text"]);
            c
        };

        #[cfg(not(windows))]
        let mut command = {
            let mut c = Command::new(&self.command);
            c.args(["-p", prompt, "--output-format", "text"]);
            c
        };
        command.kill_on_drop(true);

        let output = tokio::time::timeout(self.timeout, command.output())
            .await
            .map_err(|_| {
                BallotError::Provider(format!(
                    "{} timed out after {}s",
                    self.command,
                    self.timeout.as_secs()
                ))
            })?
            .map_err(|e| {
                BallotError::Provider(format!("failed to launch {}: {}", self.command, e))
            })?;

        if !output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr);
            return Err(BallotError::Provider(format!(
                "{} failed (code {:?}): {}",
                self.command,
                output.status.code(),
                stderr.trim()
            )));
        }

        Ok(String::from_utf8_lossy(&output.stdout).to_string())
    }
}

impl OcrProvider for CliOcrProvider {
    async fn extract_page(&self, page: &PageImage, verbose: bool) -> Result<Vec<RawEntry>> {
        let image_path = page.path.display().to_string().replace('\\', "/");
        let prompt = format!("Read the image file {} . {}", image_path, EXTRACTION_PROMPT)
            .replace('\n', " ")
            .replace('"', "\\\"");

        if verbose {
            println!("  [page {}] prompt: {} chars", page.page_number, prompt.len());
        }

        let response = self.run_cli(&prompt).await?;

        if verbose {
            println!("  [page {}] response: {} chars", page.page_number, response.len());
        }

        parse_entries_response(&response)
    }
}

/// Parse a provider response into entries, tolerating a ```json fence or
/// surrounding prose around the array.
pub fn parse_entries_response(response: &str) -> Result<Vec<RawEntry>> {
    let json = extract_json_array(response)
        .ok_or_else(|| BallotError::Provider("no JSON array in provider response".into()))?;
    serde_json::from_str(json)
        .map_err(|e| BallotError::Provider(format!("provider response parse error: {}", e)))
}

fn extract_json_array(response: &str) -> Option<&str> {
    let body = if let Some(start) = response.find("```json") {
        let after = &response[start + 7..];
        match after.find("```") {
            Some(end) => &after[..end],
            None => after,
        }
    } else {
        response
    };

    let start = body.find('[')?;
    let end = body.rfind(']')?;
    if end < start {
        return None;
    }
    Some(&body[start..=end])
}

/// Run the provider over every page, attaching page/row metadata.
///
/// A failed page is reported and skipped; remaining pages keep
/// processing. Returns the collected entries and the count of failed
/// pages. When a cache is supplied, pages whose image content hash is
/// already cached skip the provider call.
pub async fn extract_all<P: OcrProvider>(
    provider: &P,
    pages: &[PageImage],
    source_name: &str,
    mut cache: Option<&mut CacheFile>,
    verbose: bool,
    progress: Option<&dyn Fn(usize, usize)>,
) -> (Vec<OcrEntry>, usize) {
    let mut entries = Vec::new();
    let mut failed_pages = 0;

    for (idx, page) in pages.iter().enumerate() {
        let hash = cache
            .as_ref()
            .and_then(|_| compute_file_hash(&page.path).ok());

        let cached = match (&cache, &hash) {
            (Some(c), Some(h)) => c.get(h).cloned(),
            _ => None,
        };

        let raw = if let Some(raw) = cached {
            if verbose {
                println!("  [page {}] cache hit", page.page_number);
            }
            raw
        } else {
            match provider.extract_page(page, verbose).await {
                Ok(raw) => {
                    if let (Some(c), Some(h)) = (cache.as_deref_mut(), hash) {
                        c.insert(h, page.file_name.clone(), raw.clone());
                    }
                    raw
                }
                Err(e) => {
                    eprintln!("page {} failed: {}", page.page_number, e);
                    failed_pages += 1;
                    if let Some(report) = progress {
                        report(idx + 1, pages.len());
                    }
                    continue;
                }
            }
        };

        entries.extend(attach_metadata(raw, idx, source_name));

        if let Some(report) = progress {
            report(idx + 1, pages.len());
        }
    }

    (entries, failed_pages)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;
    use std::path::PathBuf;

    /// Test double: canned rows per file name, optional failing pages.
    pub struct MockProvider {
        pub responses: HashMap<String, Vec<RawEntry>>,
        pub failing: Vec<String>,
    }

    impl OcrProvider for MockProvider {
        async fn extract_page(&self, page: &PageImage, _verbose: bool) -> Result<Vec<RawEntry>> {
            if self.failing.contains(&page.file_name) {
                return Err(BallotError::Provider(format!("mock failure for {}", page.file_name)));
            }
            Ok(self
                .responses
                .get(&page.file_name)
                .cloned()
                .unwrap_or_default())
        }
    }

    fn page(name: &str, number: u32) -> PageImage {
        PageImage {
            path: PathBuf::from(name),
            file_name: name.to_string(),
            page_number: number,
        }
    }

    fn raw(name: &str) -> RawEntry {
        RawEntry {
            name: name.into(),
            address: "123 Main St NE".into(),
            date: "01/15/2024".into(),
            ward: "2".into(),
        }
    }

    #[test]
    fn test_parse_entries_with_fence() {
        let response = r#"Here are the rows:
```json
[{"Name": "Jane Doe", "Address": "123 Main St NE", "Date": "01/15/2024", "Ward": 2}]
```
"#;
        let entries = parse_entries_response(response).unwrap();
        assert_eq!(entries.len(), 1);
        assert_eq!(entries[0].name, "Jane Doe");
        assert_eq!(entries[0].ward, "2");
    }

    #[test]
    fn test_parse_entries_raw_array() {
        let response = r#"[{"Name": "John Smith", "Address": "45 Oak Ave", "Date": "", "Ward": "3"}]"#;
        let entries = parse_entries_response(response).unwrap();
        assert_eq!(entries.len(), 1);
        assert_eq!(entries[0].name, "John Smith");
    }

    #[test]
    fn test_parse_entries_no_array_is_provider_error() {
        let err = parse_entries_response("sorry, the image is unreadable").unwrap_err();
        assert!(matches!(err, BallotError::Provider(_)));
    }

    #[cfg(unix)]
    fn provider_script(dir: &std::path::Path, body: &str) -> PathBuf {
        use std::os::unix::fs::PermissionsExt;

        let path = dir.join("provider.sh");
        std::fs::write(&path, format!("#!/bin/sh\n{}\n", body)).unwrap();
        let mut perms = std::fs::metadata(&path).unwrap().permissions();
        perms.set_mode(0o755);
        std::fs::set_permissions(&path, perms).unwrap();
        path
    }

    #[cfg(unix)]
    #[tokio::test]
    async fn test_cli_provider_parses_command_output() {
        let dir = tempfile::tempdir().unwrap();
        let script = provider_script(
            dir.path(),
            r#"echo '[{"Name": "Jane Doe", "Address": "123 Main St NE", "Date": "", "Ward": "2"}]'"#,
        );

        let provider = CliOcrProvider::new(script.display().to_string(), 10);
        let entries = provider
            .extract_page(&page("page-01.jpg", 1), false)
            .await
            .unwrap();

        assert_eq!(entries.len(), 1);
        assert_eq!(entries[0].name, "Jane Doe");
    }

    #[cfg(unix)]
    #[tokio::test]
    async fn test_cli_provider_times_out() {
        let dir = tempfile::tempdir().unwrap();
        let script = provider_script(dir.path(), "sleep 10");

        let provider = CliOcrProvider::new(script.display().to_string(), 1);
        let err = provider
            .extract_page(&page("page-01.jpg", 1), false)
            .await
            .unwrap_err();

        assert!(matches!(err, BallotError::Provider(_)));
        assert!(err.to_string().contains("timed out"));
    }

    #[cfg(unix)]
    #[tokio::test]
    async fn test_cli_provider_reports_nonzero_exit() {
        let dir = tempfile::tempdir().unwrap();
        let script = provider_script(dir.path(), "echo 'no api key' >&2; exit 3");

        let provider = CliOcrProvider::new(script.display().to_string(), 10);
        let err = provider
            .extract_page(&page("page-01.jpg", 1), false)
            .await
            .unwrap_err();

        assert!(matches!(err, BallotError::Provider(_)));
        assert!(err.to_string().contains("no api key"));
    }

    #[tokio::test]
    async fn test_extract_all_attaches_metadata() {
        let provider = MockProvider {
            responses: HashMap::from([
                ("page-01.jpg".to_string(), vec![raw("Jane Doe"), raw("John Smith")]),
                ("page-02.jpg".to_string(), vec![raw("Mary Major")]),
            ]),
            failing: Vec::new(),
        };
        let pages = vec![page("page-01.jpg", 1), page("page-02.jpg", 2)];

        let (entries, failed) =
            extract_all(&provider, &pages, "petition.pdf", None, false, None).await;

        assert_eq!(failed, 0);
        assert_eq!(entries.len(), 3);
        assert_eq!(entries[0].page_number, 1);
        assert_eq!(entries[0].row_number, 1);
        assert_eq!(entries[1].row_number, 2);
        assert_eq!(entries[2].page_number, 2);
        assert_eq!(entries[2].filename, "petition.pdf");
    }

    #[tokio::test]
    async fn test_extract_all_continues_past_failed_page() {
        let provider = MockProvider {
            responses: HashMap::from([
                ("page-01.jpg".to_string(), vec![raw("Jane Doe")]),
                ("page-03.jpg".to_string(), vec![raw("Mary Major")]),
            ]),
            failing: vec!["page-02.jpg".to_string()],
        };
        let pages = vec![
            page("page-01.jpg", 1),
            page("page-02.jpg", 2),
            page("page-03.jpg", 3),
        ];

        let (entries, failed) =
            extract_all(&provider, &pages, "petition.pdf", None, false, None).await;

        assert_eq!(failed, 1);
        assert_eq!(entries.len(), 2);
        // metadata still reflects the true page index
        assert_eq!(entries[1].page_number, 3);
    }
}
