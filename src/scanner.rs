use crate::error::{LoadError, Result};
use log::warn;
use std::path::PathBuf;
use walkdir::WalkDir;

/// Directories produced by the .NET build that never contain hand-written sources.
const BUILD_OUTPUT_DIRS: [&str; 2] = ["bin", "obj"];

/// File scanner for traversing C# project directories.
///
/// The `FileScanner` recursively walks through a project directory to find all C# source files.
/// It automatically skips build output directories (`bin`, `obj`) and hidden directories
/// (those starting with `.`). Entries are visited in file-name order so that repeated scans of
/// an unchanged tree always yield the same file order.
///
/// # Example
///
/// ```no_run
/// use webapi_to_openapi::scanner::FileScanner;
/// use std::path::PathBuf;
///
/// let scanner = FileScanner::new(PathBuf::from("./Shop.Api"));
/// let result = scanner.scan().unwrap();
/// println!("Found {} C# files", result.source_files.len());
/// ```
pub struct FileScanner {
    root_path: PathBuf,
}

/// Result of directory scanning operation.
///
/// Contains the list of discovered C# files and any warnings encountered during scanning.
pub struct ScanResult {
    /// List of paths to all discovered `.cs` files, in deterministic order
    pub source_files: Vec<PathBuf>,
    /// Warning messages for any issues encountered (e.g., inaccessible directories)
    pub warnings: Vec<String>,
}

impl FileScanner {
    /// Creates a new `FileScanner` for the specified root directory.
    pub fn new(root_path: PathBuf) -> Self {
        Self { root_path }
    }

    /// Scans the directory tree and collects all `.cs` files.
    ///
    /// Inaccessible entries below the root are logged and recorded as warnings, but scanning
    /// continues.
    ///
    /// # Errors
    ///
    /// Returns [`LoadError::Io`] if the root directory itself cannot be read.
    pub fn scan(&self) -> Result<ScanResult> {
        let mut source_files = Vec::new();
        let mut warnings = Vec::new();

        for entry in WalkDir::new(&self.root_path)
            .sort_by_file_name()
            .into_iter()
            .filter_entry(|e| {
                // Don't filter the root directory itself
                if e.depth() == 0 {
                    return true;
                }

                let file_name = e.file_name().to_string_lossy();
                let is_hidden = file_name.starts_with('.');
                let is_build_output =
                    e.file_type().is_dir() && BUILD_OUTPUT_DIRS.contains(&file_name.as_ref());

                !is_hidden && !is_build_output
            })
        {
            match entry {
                Ok(entry) => {
                    let path = entry.path();

                    if entry.file_type().is_file()
                        && path.extension().and_then(|s| s.to_str()) == Some("cs")
                    {
                        source_files.push(path.to_path_buf());
                    }
                }
                Err(e) if e.depth() == 0 => {
                    let message = e.to_string();
                    let source = e
                        .into_io_error()
                        .unwrap_or_else(|| std::io::Error::new(std::io::ErrorKind::Other, message));
                    return Err(LoadError::Io {
                        path: self.root_path.clone(),
                        source,
                    });
                }
                Err(e) => {
                    let warning = format!("Failed to access path: {}", e);
                    warn!("{}", warning);
                    warnings.push(warning);
                }
            }
        }

        Ok(ScanResult {
            source_files,
            warnings,
        })
    }
}
