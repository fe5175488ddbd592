//! Type catalog loading for discovery runs.
//!
//! A module is any loadable unit that declares named types: a C# source file, a C# project
//! directory, or a type catalog manifest. Each supported format has its own [`ModuleLoader`]
//! that turns the module into raw [`TypeDeclaration`]s; this module then merges partial
//! declarations, resolves base chains and keeps only the publicly discoverable types.
//!
//! # Example
//!
//! ```no_run
//! use webapi_to_openapi::catalog::LoadContext;
//! use std::path::Path;
//!
//! let mut context = LoadContext::new();
//! let module = context.load(Path::new("./Shop.Api")).unwrap();
//! for ty in &module.exported_types {
//!     println!("{} : {:?}", ty.full_name, ty.base_chain);
//! }
//! ```

pub mod csharp;
pub mod manifest;

use crate::error::{LoadError, Result};
use log::{debug, info};
use std::collections::{HashMap, HashSet};
use std::path::{Path, PathBuf};

/// Names that stand for the root object type; walking a base chain stops here.
const ROOT_OBJECT_NAMES: [&str; 3] = ["object", "Object", "System.Object"];

/// One discoverable type within a loaded module.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TypeDescriptor {
    /// Simple metadata name, e.g. `OrdersController` or ``Repository`1``
    pub name: String,
    /// Name unique within the module, e.g. `Shop.Api.OrdersController`
    pub full_name: String,
    /// Ancestor type names, direct base first; the root object is not included
    pub base_chain: Vec<String>,
    /// Whether the type is abstract (static classes count as abstract)
    pub is_abstract: bool,
}

impl TypeDescriptor {
    /// Create a descriptor for a concrete type without ancestors
    pub fn new(name: impl Into<String>, full_name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            full_name: full_name.into(),
            base_chain: Vec::new(),
            is_abstract: false,
        }
    }

    /// Set the base chain
    pub fn with_base_chain<I, S>(mut self, chain: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.base_chain = chain.into_iter().map(Into::into).collect();
        self
    }

    /// Mark the type as abstract
    pub fn abstract_type(mut self) -> Self {
        self.is_abstract = true;
        self
    }
}

/// A loaded module and the types it exports, in declaration order.
#[derive(Debug, Clone)]
pub struct ModuleHandle {
    /// Source location of the module
    pub path: PathBuf,
    /// Publicly discoverable types, in the order the module declares them
    pub exported_types: Vec<TypeDescriptor>,
}

/// Visibility of a declared type.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Visibility {
    Public,
    Internal,
    Private,
}

/// A type declaration as written in a module, before base chain resolution.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TypeDeclaration {
    /// Simple metadata name
    pub name: String,
    /// Name unique within the module
    pub full_name: String,
    /// Direct base type as referenced by the declaration
    pub base: Option<String>,
    /// Complete ancestor list supplied by the module, used verbatim when present
    pub explicit_chain: Option<Vec<String>>,
    pub is_abstract: bool,
    pub visibility: Visibility,
    /// Whether the type was emitted by a compiler rather than declared by hand
    pub is_generated: bool,
}

impl TypeDeclaration {
    /// Create a public, concrete declaration without a base type
    pub fn new(name: impl Into<String>, full_name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            full_name: full_name.into(),
            base: None,
            explicit_chain: None,
            is_abstract: false,
            visibility: Visibility::Public,
            is_generated: false,
        }
    }

    fn is_exported(&self) -> bool {
        self.visibility == Visibility::Public && !self.is_generated
    }
}

/// Loader for one module format.
///
/// Implementations know how to read a specific kind of module and report the types it
/// declares. Base chain resolution and visibility filtering are shared and happen in
/// [`LoadContext::load`].
pub trait ModuleLoader {
    /// Short format name used in log messages
    fn format_name(&self) -> &'static str;

    /// Whether this loader handles the module at `path`
    fn supports(&self, path: &Path) -> bool;

    /// Reads every type declaration of the module, in declaration order
    fn load_declarations(&self, path: &Path) -> Result<Vec<TypeDeclaration>>;
}

/// Caller-owned loading context for one discovery run.
///
/// Holds the registered module loaders and records which modules were loaded during the run.
/// Nothing is cached between loads: loading the same path twice reads it twice and yields the
/// same descriptors as long as the module is unchanged.
pub struct LoadContext {
    loaders: Vec<Box<dyn ModuleLoader>>,
    loaded: Vec<PathBuf>,
}

impl Default for LoadContext {
    fn default() -> Self {
        Self::new()
    }
}

impl LoadContext {
    /// Create a context with the C# source and type catalog manifest loaders
    pub fn new() -> Self {
        Self::with_loaders(vec![
            Box::new(csharp::CSharpSourceLoader),
            Box::new(manifest::ManifestLoader),
        ])
    }

    /// Create a context with a custom set of loaders, tried in order
    pub fn with_loaders(loaders: Vec<Box<dyn ModuleLoader>>) -> Self {
        Self {
            loaders,
            loaded: Vec::new(),
        }
    }

    /// Modules successfully loaded through this context, in load order
    pub fn loaded_paths(&self) -> &[PathBuf] {
        &self.loaded
    }

    /// Loads one module and resolves its exported types.
    ///
    /// # Errors
    ///
    /// - [`LoadError::NotFound`] if the path does not exist
    /// - [`LoadError::UnsupportedFormat`] for compiled assemblies and unknown file types
    /// - [`LoadError::Io`] / [`LoadError::Parse`] when the module cannot be read
    /// - [`LoadError::CyclicInheritance`] when a base chain loops
    pub fn load(&mut self, path: &Path) -> Result<ModuleHandle> {
        if !path.exists() {
            return Err(LoadError::NotFound(path.to_path_buf()));
        }

        if is_compiled_assembly(path) {
            return Err(LoadError::unsupported(
                path,
                "compiled assemblies cannot be inspected; pass the project sources or a type catalog manifest",
            ));
        }

        let loader = self
            .loaders
            .iter()
            .find(|loader| loader.supports(path))
            .ok_or_else(|| {
                LoadError::unsupported(path, "expected a .cs file, a project directory, or a .json/.yaml type catalog")
            })?;

        debug!("Loading {} module: {}", loader.format_name(), path.display());
        let declarations = loader.load_declarations(path)?;
        let exported_types = resolve_declarations(path, declarations)?;

        info!(
            "Loaded {} exported types from {}",
            exported_types.len(),
            path.display()
        );
        self.loaded.push(path.to_path_buf());

        Ok(ModuleHandle {
            path: path.to_path_buf(),
            exported_types,
        })
    }
}

fn is_compiled_assembly(path: &Path) -> bool {
    path.is_file()
        && matches!(
            path.extension().and_then(|s| s.to_str()).map(str::to_ascii_lowercase).as_deref(),
            Some("dll") | Some("exe")
        )
}

/// Merges partial declarations, resolves base chains and drops non-exported types.
pub fn resolve_declarations(
    path: &Path,
    declarations: Vec<TypeDeclaration>,
) -> Result<Vec<TypeDescriptor>> {
    let merged = merge_partials(declarations);

    let mut by_full_name: HashMap<&str, usize> = HashMap::new();
    let mut by_simple_name: HashMap<String, usize> = HashMap::new();
    for (index, decl) in merged.iter().enumerate() {
        by_full_name.insert(decl.full_name.as_str(), index);
        by_simple_name
            .entry(simple_name(&decl.full_name).to_string())
            .or_insert(index);
    }

    // Qualified references only resolve by full name; bare names fall back to simple names.
    let lookup = |reference: &str| -> Option<usize> {
        let by_full = by_full_name.get(reference).copied();
        if by_full.is_some() || reference.contains('.') {
            return by_full;
        }
        by_simple_name.get(reference).copied()
    };

    let mut descriptors = Vec::new();
    for decl in &merged {
        if !decl.is_exported() {
            debug!("Skipping non-exported type {}", decl.full_name);
            continue;
        }

        let base_chain = match &decl.explicit_chain {
            Some(chain) => check_explicit_chain(path, decl, chain)?,
            None => walk_base_chain(path, decl, &merged, &lookup)?,
        };

        descriptors.push(TypeDescriptor {
            name: decl.name.clone(),
            full_name: decl.full_name.clone(),
            base_chain,
            is_abstract: decl.is_abstract,
        });
    }

    Ok(descriptors)
}

/// Folds declarations sharing a full name into the first one.
fn merge_partials(declarations: Vec<TypeDeclaration>) -> Vec<TypeDeclaration> {
    let mut merged: Vec<TypeDeclaration> = Vec::new();
    let mut positions: HashMap<String, usize> = HashMap::new();

    for decl in declarations {
        match positions.get(&decl.full_name) {
            Some(&index) => {
                let first = &mut merged[index];
                first.is_abstract |= decl.is_abstract;
                if decl.visibility == Visibility::Public {
                    first.visibility = Visibility::Public;
                }
                if first.base.is_none() {
                    first.base = decl.base;
                }
                if first.explicit_chain.is_none() {
                    first.explicit_chain = decl.explicit_chain;
                }
            }
            None => {
                positions.insert(decl.full_name.clone(), merged.len());
                merged.push(decl);
            }
        }
    }

    merged
}

fn walk_base_chain<F>(
    path: &Path,
    decl: &TypeDeclaration,
    declarations: &[TypeDeclaration],
    lookup: &F,
) -> Result<Vec<String>>
where
    F: Fn(&str) -> Option<usize>,
{
    let mut chain = Vec::new();
    let mut visited: HashSet<&str> = HashSet::new();
    visited.insert(decl.full_name.as_str());

    let mut next = decl.base.as_deref();
    while let Some(reference) = next {
        if is_root_object(reference) {
            break;
        }

        match lookup(reference) {
            Some(index) => {
                let ancestor = &declarations[index];
                if !visited.insert(ancestor.full_name.as_str()) {
                    return Err(LoadError::CyclicInheritance {
                        path: path.to_path_buf(),
                        type_name: decl.full_name.clone(),
                    });
                }
                chain.push(ancestor.full_name.clone());
                next = ancestor.base.as_deref();
            }
            None => {
                // Declared outside this module; the name is all we know.
                chain.push(reference.to_string());
                next = None;
            }
        }
    }

    Ok(chain)
}

fn check_explicit_chain(
    path: &Path,
    decl: &TypeDeclaration,
    chain: &[String],
) -> Result<Vec<String>> {
    let mut seen: HashSet<&str> = HashSet::new();
    seen.insert(decl.full_name.as_str());

    let mut resolved = Vec::new();
    for entry in chain {
        if is_root_object(entry) {
            break;
        }
        if !seen.insert(entry.as_str()) {
            return Err(LoadError::CyclicInheritance {
                path: path.to_path_buf(),
                type_name: decl.full_name.clone(),
            });
        }
        resolved.push(entry.clone());
    }

    Ok(resolved)
}

fn is_root_object(name: &str) -> bool {
    ROOT_OBJECT_NAMES.contains(&name)
}

/// Last segment of a dotted or nested (`+`) type name.
pub fn simple_name(name: &str) -> &str {
    name.rsplit(|c| c == '.' || c == '+').next().unwrap_or(name)
}
