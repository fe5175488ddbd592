//! Type catalog manifests.
//!
//! A manifest lists the types of a module in JSON or YAML, typically dumped by a metadata
//! tool that can read compiled assemblies:
//!
//! ```yaml
//! types:
//!   - name: OrdersController
//!     namespace: Shop.Api.Controllers
//!     base: System.Web.Http.ApiController
//!   - name: BaseController
//!     namespace: Shop.Api.Controllers
//!     abstract: true
//!     baseChain: [System.Web.Http.ApiController, System.Object]
//! ```

use super::{ModuleLoader, TypeDeclaration, Visibility};
use crate::error::{LoadError, Result};
use log::debug;
use serde::Deserialize;
use std::fs;
use std::path::Path;

/// Loader for `.json`, `.yaml` and `.yml` type catalog manifests.
pub struct ManifestLoader;

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
struct CatalogManifest {
    #[serde(default)]
    types: Vec<ManifestType>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
struct ManifestType {
    name: String,
    #[serde(default)]
    namespace: Option<String>,
    #[serde(default)]
    full_name: Option<String>,
    #[serde(default)]
    base: Option<String>,
    #[serde(default)]
    base_chain: Option<Vec<String>>,
    #[serde(default, rename = "abstract")]
    is_abstract: bool,
    #[serde(default)]
    visibility: ManifestVisibility,
}

#[derive(Debug, Default, Clone, Copy, Deserialize)]
#[serde(rename_all = "lowercase")]
enum ManifestVisibility {
    #[default]
    Public,
    Internal,
    Protected,
    Private,
}

impl From<ManifestVisibility> for Visibility {
    fn from(value: ManifestVisibility) -> Self {
        match value {
            ManifestVisibility::Public => Visibility::Public,
            ManifestVisibility::Internal => Visibility::Internal,
            ManifestVisibility::Protected | ManifestVisibility::Private => Visibility::Private,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum ManifestFormat {
    Json,
    Yaml,
}

fn manifest_format(path: &Path) -> Option<ManifestFormat> {
    match path.extension().and_then(|s| s.to_str()) {
        Some("json") => Some(ManifestFormat::Json),
        Some("yaml") | Some("yml") => Some(ManifestFormat::Yaml),
        _ => None,
    }
}

impl ModuleLoader for ManifestLoader {
    fn format_name(&self) -> &'static str {
        "type catalog"
    }

    fn supports(&self, path: &Path) -> bool {
        path.is_file() && manifest_format(path).is_some()
    }

    fn load_declarations(&self, path: &Path) -> Result<Vec<TypeDeclaration>> {
        let format = manifest_format(path)
            .ok_or_else(|| LoadError::unsupported(path, "not a .json or .yaml manifest"))?;

        let content = fs::read_to_string(path).map_err(|source| LoadError::Io {
            path: path.to_path_buf(),
            source,
        })?;

        let manifest: CatalogManifest = match format {
            ManifestFormat::Json => {
                serde_json::from_str(&content).map_err(|e| LoadError::parse(path, e.to_string()))?
            }
            ManifestFormat::Yaml => {
                serde_yaml::from_str(&content).map_err(|e| LoadError::parse(path, e.to_string()))?
            }
        };

        debug!(
            "Manifest {} lists {} types",
            path.display(),
            manifest.types.len()
        );

        manifest
            .types
            .into_iter()
            .map(|ty| into_declaration(path, ty))
            .collect()
    }
}

fn into_declaration(path: &Path, ty: ManifestType) -> Result<TypeDeclaration> {
    if ty.name.trim().is_empty() {
        return Err(LoadError::parse(path, "type entry with an empty name"));
    }

    let full_name = match (ty.full_name, ty.namespace) {
        (Some(full_name), _) => full_name,
        (None, Some(namespace)) if !namespace.is_empty() => format!("{}.{}", namespace, ty.name),
        (None, _) => ty.name.clone(),
    };

    Ok(TypeDeclaration {
        is_generated: ty.name.contains('<'),
        name: ty.name,
        full_name,
        base: ty.base,
        explicit_chain: ty.base_chain,
        is_abstract: ty.is_abstract,
        visibility: ty.visibility.into(),
    })
}
