// Report persistence.
// Resolves the destination for downloaded reports and writes them atomically.

use std::fs;
use std::io::Write;
use std::path::{Path, PathBuf};

use directories::UserDirs;

use crate::api::ReportFormat;
use crate::error::Result;

/// Directory downloaded reports are saved to. Falls back to the home
/// directory, then the current directory.
pub fn download_dir() -> PathBuf {
    match UserDirs::new() {
        Some(dirs) => dirs
            .download_dir()
            .map(Path::to_path_buf)
            .unwrap_or_else(|| dirs.home_dir().to_path_buf()),
        None => PathBuf::from("."),
    }
}

/// File name for a saved report.
pub fn report_file_name(analysis_id: &str, format: ReportFormat) -> String {
    format!(
        "report_{}.{}",
        sanitize_name(analysis_id),
        format.extension()
    )
}

/// Save report bytes into the download directory.
pub fn save_report(analysis_id: &str, format: ReportFormat, bytes: &[u8]) -> Result<PathBuf> {
    save_report_in(&download_dir(), analysis_id, format, bytes)
}

/// Save report bytes into `dir`, atomically via a temp file.
pub fn save_report_in(
    dir: &Path,
    analysis_id: &str,
    format: ReportFormat,
    bytes: &[u8],
) -> Result<PathBuf> {
    fs::create_dir_all(dir)?;
    let path = dir.join(report_file_name(analysis_id, format));

    let temp_path = path.with_extension("tmp");
    let mut file = fs::File::create(&temp_path)?;
    file.write_all(bytes)?;
    file.sync_all()?;
    fs::rename(&temp_path, &path)?;

    Ok(path)
}

/// Sanitize an analysis id for use in a file name.
/// Replaces problematic characters with underscores.
fn sanitize_name(name: &str) -> String {
    name.chars()
        .map(|c| match c {
            '/' | '\\' | ':' | '*' | '?' | '"' | '<' | '>' | '|' => '_',
            _ => c,
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_report_file_name() {
        assert_eq!(report_file_name("A1", ReportFormat::Pdf), "report_A1.pdf");
        assert_eq!(
            report_file_name("a/b:c", ReportFormat::Json),
            "report_a_b_c.json"
        );
    }

    #[test]
    fn test_save_report_writes_bytes() {
        let temp_dir = TempDir::new().unwrap();

        let path = save_report_in(temp_dir.path(), "A1", ReportFormat::Json, b"{}").unwrap();

        assert!(path.ends_with("report_A1.json"));
        assert_eq!(fs::read(&path).unwrap(), b"{}");
        assert!(!path.with_extension("tmp").exists());
    }

    #[test]
    fn test_save_report_overwrites_previous() {
        let temp_dir = TempDir::new().unwrap();

        save_report_in(temp_dir.path(), "A1", ReportFormat::Pdf, b"first").unwrap();
        let path = save_report_in(temp_dir.path(), "A1", ReportFormat::Pdf, b"second").unwrap();

        assert_eq!(fs::read(&path).unwrap(), b"second");
    }
}
