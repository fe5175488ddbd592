use std::path::PathBuf;

/// Result type alias for module loading and discovery
pub type Result<T> = std::result::Result<T, LoadError>;

/// Errors raised while loading a module into a type catalog.
///
/// Every variant is fatal for a discovery run: the orchestrator propagates it
/// unchanged and no partial result is produced.
#[derive(Debug)]
pub enum LoadError {
    NotFound(PathBuf),
    Io { path: PathBuf, source: std::io::Error },
    UnsupportedFormat { path: PathBuf, reason: String },
    Parse { path: PathBuf, message: String },
    CyclicInheritance { path: PathBuf, type_name: String },
}

impl LoadError {
    /// Path of the module that failed to load
    pub fn path(&self) -> &PathBuf {
        match self {
            LoadError::NotFound(path) => path,
            LoadError::Io { path, .. } => path,
            LoadError::UnsupportedFormat { path, .. } => path,
            LoadError::Parse { path, .. } => path,
            LoadError::CyclicInheritance { path, .. } => path,
        }
    }

    pub(crate) fn parse(path: impl Into<PathBuf>, message: impl Into<String>) -> Self {
        LoadError::Parse {
            path: path.into(),
            message: message.into(),
        }
    }

    pub(crate) fn unsupported(path: impl Into<PathBuf>, reason: impl Into<String>) -> Self {
        LoadError::UnsupportedFormat {
            path: path.into(),
            reason: reason.into(),
        }
    }
}

impl std::fmt::Display for LoadError {
    fn fmt(&self, f: &mut std::fmt::Formatter) -> std::fmt::Result {
        match self {
            LoadError::NotFound(path) => write!(f, "Module not found: {}", path.display()),
            LoadError::Io { path, source } => {
                write!(f, "Failed to read module {}: {}", path.display(), source)
            }
            LoadError::UnsupportedFormat { path, reason } => {
                write!(f, "Unsupported module format {}: {}", path.display(), reason)
            }
            LoadError::Parse { path, message } => {
                write!(f, "Failed to parse module {}: {}", path.display(), message)
            }
            LoadError::CyclicInheritance { path, type_name } => write!(
                f,
                "Cyclic inheritance involving {} in module {}",
                type_name,
                path.display()
            ),
        }
    }
}

impl std::error::Error for LoadError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            LoadError::Io { source, .. } => Some(source),
            _ => None,
        }
    }
}
