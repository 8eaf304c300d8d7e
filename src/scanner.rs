use anyhow::{Context, Result};
use log::warn;
use std::path::PathBuf;
use walkdir::WalkDir;

/// File scanner for collecting documented source files.
///
/// The `FileScanner` lists the files of one directory whose extension is in a configured set
/// (`rb` by default). By default only the top directory is read; with [`FileScanner::recursive`]
/// it walks the whole tree, skipping `target` and hidden directories (those starting with `.`).
///
/// # Example
///
/// ```no_run
/// use openapi_from_annotations::scanner::FileScanner;
/// use std::path::PathBuf;
///
/// let scanner = FileScanner::new(PathBuf::from("./app/controllers")).recursive(true);
/// let result = scanner.scan().unwrap();
/// println!("Found {} source files", result.files.len());
/// ```
pub struct FileScanner {
    root_path: PathBuf,
    extensions: Vec<String>,
    recursive: bool,
}

/// Result of directory scanning operation.
///
/// Contains the list of discovered files and any warnings encountered during scanning.
pub struct ScanResult {
    /// Matching files, sorted by path
    pub files: Vec<PathBuf>,
    /// Warning messages for any issues encountered (e.g., inaccessible directories)
    pub warnings: Vec<String>,
}

impl FileScanner {
    /// Creates a new `FileScanner` for the specified root directory.
    pub fn new(root_path: PathBuf) -> Self {
        Self {
            root_path,
            extensions: vec!["rb".to_string()],
            recursive: false,
        }
    }

    /// Replaces the accepted file extensions (without the leading dot).
    pub fn with_extensions(mut self, extensions: Vec<String>) -> Self {
        self.extensions = extensions
            .into_iter()
            .map(|e| e.trim_start_matches('.').to_string())
            .collect();
        self
    }

    /// Descend into subdirectories.
    pub fn recursive(mut self, recursive: bool) -> Self {
        self.recursive = recursive;
        self
    }

    /// Scans the directory and collects the matching files.
    ///
    /// Files are returned sorted so the generated document does not depend on directory
    /// iteration order. Entries that cannot be accessed are logged and added to the warnings,
    /// but scanning continues.
    ///
    /// # Errors
    ///
    /// Returns an error if the root directory does not exist or is not a directory.
    pub fn scan(&self) -> Result<ScanResult> {
        let metadata = std::fs::metadata(&self.root_path)
            .with_context(|| format!("Cannot access directory: {}", self.root_path.display()))?;
        if !metadata.is_dir() {
            anyhow::bail!("Not a directory: {}", self.root_path.display());
        }

        let mut files = Vec::new();
        let mut warnings = Vec::new();

        let max_depth = if self.recursive { usize::MAX } else { 1 };
        for entry in WalkDir::new(&self.root_path)
            .max_depth(max_depth)
            .sort_by_file_name()
            .into_iter()
            .filter_entry(|e| {
                // Don't filter the root directory itself
                if e.path() == self.root_path {
                    return true;
                }

                if !e.file_type().is_dir() {
                    return true;
                }

                // Skip target directory and hidden directories
                let file_name = e.file_name().to_string_lossy();
                !file_name.starts_with('.') && file_name != "target"
            })
        {
            match entry {
                Ok(entry) => {
                    let path = entry.path();
                    let matches = path
                        .extension()
                        .and_then(|s| s.to_str())
                        .map_or(false, |ext| self.extensions.iter().any(|e| e == ext));

                    if entry.file_type().is_file() && matches {
                        files.push(path.to_path_buf());
                    }
                }
                Err(e) => {
                    // Record warning for inaccessible directories/files
                    let warning = format!("Failed to access path: {}", e);
                    warn!("{}", warning);
                    warnings.push(warning);
                }
            }
        }

        files.sort();

        Ok(ScanResult { files, warnings })
    }
}
