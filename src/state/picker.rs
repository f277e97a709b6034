// Diagram picker state.
// Scans a directory for supported diagram files and tracks list selection.

use std::fs;
use std::path::{Path, PathBuf};

use ratatui::widgets::ListState;

use crate::error::Result;

/// Environment variable overriding the diagram scan directory.
pub const DIAGRAM_DIR_ENV: &str = "STRIDER_DIAGRAM_DIR";

/// Check a path against the accepted diagram format (.png, any case).
pub fn is_supported_diagram(path: &Path) -> bool {
    path.extension()
        .and_then(|ext| ext.to_str())
        .is_some_and(|ext| ext.eq_ignore_ascii_case("png"))
}

/// Phase-1 file chooser over a single directory of diagrams.
#[derive(Debug)]
pub struct DiagramPicker {
    /// Directory scanned for diagrams.
    pub dir: PathBuf,
    /// Diagram files found by the last scan, sorted by name.
    pub files: Vec<PathBuf>,
    /// List selection state.
    pub list_state: ListState,
}

impl DiagramPicker {
    pub fn new(dir: PathBuf) -> Self {
        Self {
            dir,
            files: Vec::new(),
            list_state: ListState::default(),
        }
    }

    /// Create a picker for STRIDER_DIAGRAM_DIR, falling back to the
    /// current directory.
    pub fn from_env() -> Self {
        let dir = std::env::var(DIAGRAM_DIR_ENV)
            .map(PathBuf::from)
            .unwrap_or_else(|_| PathBuf::from("."));
        Self::new(dir)
    }

    /// Rescan the directory, keeping the selection in bounds.
    pub fn scan(&mut self) -> Result<()> {
        let mut files: Vec<PathBuf> = fs::read_dir(&self.dir)?
            .filter_map(|entry| entry.ok())
            .map(|entry| entry.path())
            .filter(|path| path.is_file() && is_supported_diagram(path))
            .collect();
        files.sort();
        self.files = files;

        if self.files.is_empty() {
            self.list_state.select(None);
        } else {
            let selected = self
                .list_state
                .selected()
                .unwrap_or(0)
                .min(self.files.len() - 1);
            self.list_state.select(Some(selected));
        }
        Ok(())
    }

    /// Path of the currently highlighted diagram.
    pub fn selected_path(&self) -> Option<&PathBuf> {
        self.files.get(self.list_state.selected()?)
    }

    /// Select the previous file in the list.
    pub fn select_prev(&mut self) {
        if self.files.is_empty() {
            return;
        }
        let i = match self.list_state.selected() {
            Some(i) => i.saturating_sub(1),
            None => 0,
        };
        self.list_state.select(Some(i));
    }

    /// Select the next file in the list.
    pub fn select_next(&mut self) {
        if self.files.is_empty() {
            return;
        }
        let i = match self.list_state.selected() {
            Some(i) => (i + 1).min(self.files.len() - 1),
            None => 0,
        };
        self.list_state.select(Some(i));
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn touch(dir: &Path, name: &str) {
        fs::write(dir.join(name), b"x").unwrap();
    }

    #[test]
    fn test_scan_filters_and_sorts() {
        let temp_dir = TempDir::new().unwrap();
        touch(temp_dir.path(), "zeta.png");
        touch(temp_dir.path(), "alpha.PNG");
        touch(temp_dir.path(), "notes.txt");
        touch(temp_dir.path(), "schema.json");

        let mut picker = DiagramPicker::new(temp_dir.path().to_path_buf());
        picker.scan().unwrap();

        let names: Vec<String> = picker
            .files
            .iter()
            .map(|p| p.file_name().unwrap().to_string_lossy().into_owned())
            .collect();
        assert_eq!(names, vec!["alpha.PNG", "zeta.png"]);
        assert_eq!(picker.list_state.selected(), Some(0));
    }

    #[test]
    fn test_selection_survives_rescan() {
        let temp_dir = TempDir::new().unwrap();
        touch(temp_dir.path(), "a.png");
        touch(temp_dir.path(), "b.png");

        let mut picker = DiagramPicker::new(temp_dir.path().to_path_buf());
        picker.scan().unwrap();
        picker.select_next();
        assert_eq!(picker.list_state.selected(), Some(1));

        fs::remove_file(temp_dir.path().join("b.png")).unwrap();
        picker.scan().unwrap();
        assert_eq!(picker.list_state.selected(), Some(0));
    }

    #[test]
    fn test_supported_diagram_check() {
        assert!(is_supported_diagram(Path::new("arch.png")));
        assert!(is_supported_diagram(Path::new("arch.PNG")));
        assert!(!is_supported_diagram(Path::new("arch.svg")));
        assert!(!is_supported_diagram(Path::new("png")));
    }
}
