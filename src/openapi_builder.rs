use crate::catalog::TypeDescriptor;
use crate::classifier::CONTROLLER_NAME_MARKER;
use crate::discovery::DiscoveryResult;
use anyhow::{bail, Context, Result};
use indexmap::IndexMap;
use log::{debug, warn};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::fs;
use std::path::Path;

/// Web API default URL template
pub const DEFAULT_URL_TEMPLATE: &str = "api/{controller}/{id}";

/// OpenAPI version emitted when the document template does not name one
pub const OPENAPI_VERSION: &str = "3.0.0";

/// Settings handed through to document generation.
#[derive(Debug, Clone)]
pub struct GeneratorSettings {
    /// Route template applied to every endpoint group, e.g. `api/{controller}/{id}`
    pub default_url_template: String,
    /// Declare path parameters for every template placeholder
    pub add_missing_path_parameters: bool,
    /// Document title, ignored when the template provides `info`
    pub title: String,
    /// Document description, ignored when the template provides `info`
    pub description: String,
    /// Document version
    pub version: String,
    /// Inline JSON or a path to a JSON/YAML document used as the starting point
    pub document_template: Option<String>,
}

impl Default for GeneratorSettings {
    fn default() -> Self {
        Self {
            default_url_template: DEFAULT_URL_TEMPLATE.to_string(),
            add_missing_path_parameters: false,
            title: String::new(),
            description: String::new(),
            version: "1.0.0".to_string(),
            document_template: None,
        }
    }
}

/// OpenAPI document builder
pub struct OpenApiBuilder {
    settings: GeneratorSettings,
    /// One tag per endpoint group, in discovery order
    tags: Vec<Tag>,
    /// Paths collection (URL path -> PathItem)
    paths: IndexMap<String, PathItem>,
}

/// OpenAPI Info object
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Info {
    /// API title
    pub title: String,
    /// API version
    pub version: String,
    /// API description
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

/// OpenAPI Tag object
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Tag {
    pub name: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

/// OpenAPI PathItem object
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct PathItem {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub summary: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    /// Parameters shared by every operation on this path
    #[serde(skip_serializing_if = "Option::is_none")]
    pub parameters: Option<Vec<Parameter>>,
    /// Operations and extensions, carried through from a document template
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

/// OpenAPI Parameter object
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Parameter {
    /// Parameter name
    pub name: String,
    /// Parameter location
    #[serde(rename = "in")]
    pub location: String,
    /// Whether the parameter is required
    pub required: bool,
    /// Parameter schema
    pub schema: Schema,
}

/// Minimal schema for path parameters
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Schema {
    #[serde(rename = "type")]
    pub schema_type: String,
}

/// Complete OpenAPI document
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OpenApiDocument {
    /// OpenAPI version
    pub openapi: String,
    /// API info
    pub info: Info,
    /// Endpoint group tags
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub tags: Vec<Tag>,
    /// API paths, in the order their endpoint groups were added
    pub paths: IndexMap<String, PathItem>,
    /// Remaining top-level fields of the document template
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl OpenApiBuilder {
    pub fn new(settings: GeneratorSettings) -> Self {
        debug!("Initializing OpenApiBuilder with template {}", settings.default_url_template);
        Self {
            settings,
            tags: Vec::new(),
            paths: IndexMap::new(),
        }
    }

    /// Add every endpoint group of a discovery run, in order
    pub fn add_discovery_result(&mut self, result: &DiscoveryResult) {
        for group in result {
            self.add_endpoint_group(group);
        }
    }

    /// Add one endpoint group: a tag and the path item its route template expands to
    pub fn add_endpoint_group(&mut self, group: &TypeDescriptor) {
        let route_name = controller_route_name(&group.name);
        let route = expand_url_template(&self.settings.default_url_template, route_name);
        debug!("Adding endpoint group {} at {}", group.full_name, route.path);

        self.tags.push(Tag {
            name: route_name.to_string(),
            description: Some(group.full_name.clone()),
            extra: Map::new(),
        });

        if self.paths.contains_key(&route.path) {
            warn!(
                "Path {} already documented, skipping it for {}",
                route.path, group.full_name
            );
            return;
        }

        let parameters = if self.settings.add_missing_path_parameters && !route.parameters.is_empty() {
            Some(
                route
                    .parameters
                    .iter()
                    .map(|name| Parameter {
                        name: name.clone(),
                        location: "path".to_string(),
                        required: true,
                        schema: Schema {
                            schema_type: "string".to_string(),
                        },
                    })
                    .collect(),
            )
        } else {
            None
        };

        self.paths.insert(
            route.path,
            PathItem {
                summary: Some(group.name.clone()),
                description: Some(group.full_name.clone()),
                parameters,
                extra: Map::new(),
            },
        );
    }

    /// Build the final OpenAPI document, starting from the document template if one is set
    pub fn build(self) -> Result<OpenApiDocument> {
        debug!("Building final OpenAPI document");

        let mut template = match self.settings.document_template.as_deref() {
            Some(template) if !template.trim().is_empty() => load_document_template(template)?,
            _ => Map::new(),
        };

        let openapi = match template.remove("openapi") {
            Some(Value::String(version)) => version,
            Some(other) => bail!("Document template has a non-string openapi field: {}", other),
            None => OPENAPI_VERSION.to_string(),
        };

        let info = match template.remove("info") {
            Some(value) => {
                let mut info: Info = serde_json::from_value(value)
                    .context("Document template has an invalid info object")?;
                info.version = self.settings.version.clone();
                info
            }
            None => Info {
                title: self.settings.title.clone(),
                version: self.settings.version.clone(),
                description: Some(self.settings.description.clone()).filter(|d| !d.is_empty()),
                extra: Map::new(),
            },
        };

        let mut tags: Vec<Tag> = match template.remove("tags") {
            Some(value) => serde_json::from_value(value)
                .context("Document template has an invalid tags list")?,
            None => Vec::new(),
        };
        for tag in self.tags {
            if !tags.iter().any(|existing| existing.name == tag.name) {
                tags.push(tag);
            }
        }

        let mut paths: IndexMap<String, PathItem> = match template.remove("paths") {
            Some(value) => serde_json::from_value(value)
                .context("Document template has an invalid paths object")?,
            None => IndexMap::new(),
        };
        for (path, item) in self.paths {
            if paths.contains_key(&path) {
                warn!("Path {} is defined by the document template, keeping the template", path);
                continue;
            }
            paths.insert(path, item);
        }

        Ok(OpenApiDocument {
            openapi,
            info,
            tags,
            paths,
            extra: template,
        })
    }
}

/// Route name of a controller: `OrdersController` → `Orders`, ``CrudController`2`` → `Crud`.
pub fn controller_route_name(type_name: &str) -> &str {
    let name = type_name.split('`').next().unwrap_or(type_name);
    match name.strip_suffix(CONTROLLER_NAME_MARKER) {
        Some(stripped) if !stripped.is_empty() => stripped,
        _ => name,
    }
}

/// A URL template expanded for one controller.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExpandedRoute {
    /// OpenAPI path, e.g. `/api/Orders/{id}`
    pub path: String,
    /// Placeholders left in the path, in order
    pub parameters: Vec<String>,
}

/// Substitutes `{controller}` and reduces every other placeholder to its bare name, dropping
/// optional markers, defaults, constraints and catch-all stars (`{*rest}`, `{id:int?}` → `{id}`).
pub fn expand_url_template(template: &str, controller: &str) -> ExpandedRoute {
    let mut path = String::from("/");
    let mut parameters = Vec::new();
    let mut rest = template.trim_start_matches('/');

    while let Some(open) = rest.find('{') {
        path.push_str(&rest[..open]);
        let after = &rest[open + 1..];
        let Some(close) = after.find('}') else {
            // Unclosed placeholder: keep the text as written
            path.push_str(&rest[open..]);
            rest = "";
            break;
        };

        let token = &after[..close];
        let name = token
            .trim_start_matches('*')
            .split(|c| c == ':' || c == '=' || c == '?')
            .next()
            .unwrap_or_default()
            .trim();

        if name.eq_ignore_ascii_case("controller") {
            path.push_str(controller);
        } else {
            path.push('{');
            path.push_str(name);
            path.push('}');
            if !parameters.iter().any(|p| p == name) {
                parameters.push(name.to_string());
            }
        }

        rest = &after[close + 1..];
    }
    path.push_str(rest);

    ExpandedRoute { path, parameters }
}

/// Loads a document template given inline as JSON or as a path to a JSON/YAML file.
fn load_document_template(template: &str) -> Result<Map<String, Value>> {
    let value: Value = if template.trim_start().starts_with('{') {
        serde_json::from_str(template).context("Failed to parse inline document template")?
    } else {
        let path = Path::new(template);
        let content = fs::read_to_string(path)
            .with_context(|| format!("Failed to read document template: {}", path.display()))?;
        match path.extension().and_then(|s| s.to_str()) {
            Some("yaml") | Some("yml") => serde_yaml::from_str(&content)
                .with_context(|| format!("Failed to parse document template: {}", path.display()))?,
            _ => serde_json::from_str(&content)
                .with_context(|| format!("Failed to parse document template: {}", path.display()))?,
        }
    };

    match value {
        Value::Object(map) => Ok(map),
        _ => bail!("Document template must be a JSON object"),
    }
}
