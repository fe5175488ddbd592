use crate::catalog::{LoadContext, TypeDescriptor};
use crate::classifier::ControllerClassifier;
use crate::error::Result;
use crate::filter::FilterSpec;
use log::{debug, info};
use std::collections::HashSet;
use std::path::{Path, PathBuf};

/// Endpoint groups selected by a discovery run, in module order then declaration order.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DiscoveryResult {
    groups: Vec<TypeDescriptor>,
}

impl DiscoveryResult {
    pub fn groups(&self) -> &[TypeDescriptor] {
        &self.groups
    }

    pub fn len(&self) -> usize {
        self.groups.len()
    }

    pub fn is_empty(&self) -> bool {
        self.groups.is_empty()
    }

    pub fn iter(&self) -> std::slice::Iter<'_, TypeDescriptor> {
        self.groups.iter()
    }

    /// Simple names of the selected endpoint groups
    pub fn names(&self) -> Vec<&str> {
        self.groups.iter().map(|g| g.name.as_str()).collect()
    }
}

impl<'a> IntoIterator for &'a DiscoveryResult {
    type Item = &'a TypeDescriptor;
    type IntoIter = std::slice::Iter<'a, TypeDescriptor>;

    fn into_iter(self) -> Self::IntoIter {
        self.groups.iter()
    }
}

/// Reduces a list of modules to the endpoint groups to document.
///
/// # Example
///
/// ```no_run
/// use webapi_to_openapi::discovery::EndpointDiscovery;
/// use webapi_to_openapi::filter::FilterSpec;
/// use std::path::PathBuf;
///
/// let discovery = EndpointDiscovery::default();
/// let filter = FilterSpec::new(["*Controller"]);
/// let result = discovery
///     .discover(&[PathBuf::from("./Shop.Api")], Some(&filter))
///     .unwrap();
/// println!("{:?}", result.names());
/// ```
#[derive(Debug, Clone, Default)]
pub struct EndpointDiscovery {
    classifier: ControllerClassifier,
}

impl EndpointDiscovery {
    pub fn new(classifier: ControllerClassifier) -> Self {
        Self { classifier }
    }

    pub fn classifier(&self) -> &ControllerClassifier {
        &self.classifier
    }

    /// Runs discovery with a fresh [`LoadContext`] that is released when the run completes.
    pub fn discover<P: AsRef<Path>>(
        &self,
        module_paths: &[P],
        filter: Option<&FilterSpec>,
    ) -> Result<DiscoveryResult> {
        let mut context = LoadContext::new();
        self.discover_with(&mut context, module_paths, filter)
    }

    /// Runs discovery through a caller-owned loading context.
    ///
    /// Every module is loaded before anything is selected; the first load failure aborts the
    /// run and no partial result is returned.
    pub fn discover_with<P: AsRef<Path>>(
        &self,
        context: &mut LoadContext,
        module_paths: &[P],
        filter: Option<&FilterSpec>,
    ) -> Result<DiscoveryResult> {
        info!("Discovering endpoint groups in {} modules", module_paths.len());

        let modules = module_paths
            .iter()
            .map(|path| context.load(path.as_ref()))
            .collect::<Result<Vec<_>>>()?;

        let filter = filter.filter(|f| !f.is_empty());
        let mut seen: HashSet<String> = HashSet::new();
        let mut groups = Vec::new();

        for descriptor in modules.into_iter().flat_map(|module| module.exported_types) {
            if !self.classifier.is_endpoint_group(&descriptor) {
                continue;
            }
            if let Some(filter) = filter {
                if !filter.matches(&descriptor) {
                    debug!("Filtered out {}", descriptor.full_name);
                    continue;
                }
            }
            if !seen.insert(descriptor.full_name.clone()) {
                debug!("Skipping duplicate {}", descriptor.full_name);
                continue;
            }

            info!("Selected endpoint group {}", descriptor.full_name);
            groups.push(descriptor);
        }

        info!("Discovered {} endpoint groups", groups.len());
        Ok(DiscoveryResult { groups })
    }
}

/// Convenience wrapper: discovery with the default classifier.
pub fn discover(module_paths: &[PathBuf], filter: Option<&FilterSpec>) -> Result<DiscoveryResult> {
    EndpointDiscovery::default().discover(module_paths, filter)
}
