use crate::catalog::{simple_name, TypeDescriptor};

/// Substring every endpoint group name must contain.
pub const CONTROLLER_NAME_MARKER: &str = "Controller";

/// Base type name recognized when no markers are configured.
pub const DEFAULT_BASE_MARKER: &str = "ApiController";

/// Decides which types represent API endpoint groups (controllers).
///
/// A type qualifies when its name contains `"Controller"`, it is not abstract, and one of
/// its ancestors is named like a configured base marker. Ancestors are compared by name, not
/// by type identity, so a chain entry matches either as a whole (`System.Web.Http.ApiController`)
/// or by its simple name (`ApiController`). An unrelated ancestor that happens to share a
/// marker name is therefore misclassified; that is an accepted limitation of name matching.
#[derive(Debug, Clone)]
pub struct ControllerClassifier {
    markers: Vec<String>,
}

impl Default for ControllerClassifier {
    fn default() -> Self {
        Self {
            markers: vec![DEFAULT_BASE_MARKER.to_string()],
        }
    }
}

impl ControllerClassifier {
    /// Create a classifier recognizing the given base marker names.
    ///
    /// Falls back to [`DEFAULT_BASE_MARKER`] when `markers` is empty.
    pub fn new<I, S>(markers: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let markers: Vec<String> = markers.into_iter().map(Into::into).collect();
        if markers.is_empty() {
            Self::default()
        } else {
            Self { markers }
        }
    }

    /// Configured base marker names
    pub fn markers(&self) -> &[String] {
        &self.markers
    }

    /// Whether `descriptor` is an endpoint group
    pub fn is_endpoint_group(&self, descriptor: &TypeDescriptor) -> bool {
        descriptor.name.contains(CONTROLLER_NAME_MARKER)
            && !descriptor.is_abstract
            && descriptor
                .base_chain
                .iter()
                .any(|ancestor| self.is_marker(ancestor))
    }

    fn is_marker(&self, ancestor: &str) -> bool {
        self.markers
            .iter()
            .any(|marker| ancestor == marker || simple_name(ancestor) == marker)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn controller(name: &str, chain: &[&str]) -> TypeDescriptor {
        TypeDescriptor::new(name, format!("Shop.{}", name)).with_base_chain(chain.iter().copied())
    }

    #[test]
    fn test_concrete_controller_is_endpoint_group() {
        let classifier = ControllerClassifier::default();

        assert!(classifier.is_endpoint_group(&controller("OrdersController", &["ApiController"])));
    }

    #[test]
    fn test_marker_found_deeper_in_chain() {
        let classifier = ControllerClassifier::default();
        let descriptor = controller(
            "OrdersController",
            &["Shop.BaseController", "System.Web.Http.ApiController"],
        );

        assert!(classifier.is_endpoint_group(&descriptor));
    }

    #[test]
    fn test_abstract_type_is_excluded() {
        let classifier = ControllerClassifier::default();
        let descriptor = controller("BaseController", &["ApiController"]).abstract_type();

        assert!(!classifier.is_endpoint_group(&descriptor));
    }

    #[test]
    fn test_name_without_controller_is_excluded() {
        let classifier = ControllerClassifier::default();

        assert!(!classifier.is_endpoint_group(&controller("OrdersApi", &["ApiController"])));
        assert!(!classifier.is_endpoint_group(&controller("Orderscontroller", &["ApiController"])));
    }

    #[test]
    fn test_empty_chain_is_excluded() {
        let classifier = ControllerClassifier::default();

        assert!(!classifier.is_endpoint_group(&controller("HomeController", &[])));
    }

    #[test]
    fn test_unrelated_base_is_excluded() {
        let classifier = ControllerClassifier::default();

        assert!(!classifier.is_endpoint_group(&controller("HomeController", &["Controller"])));
        assert!(!classifier.is_endpoint_group(&controller("HomeController", &["MyApiControllerBase"])));
    }

    #[test]
    fn test_nested_marker_matches_by_simple_name() {
        let classifier = ControllerClassifier::default();

        assert!(classifier.is_endpoint_group(&controller("InnerController", &["Shop.Web+ApiController"])));
    }

    #[test]
    fn test_custom_markers() {
        let classifier = ControllerClassifier::new(["ControllerBase", "Microsoft.AspNetCore.Mvc.Controller"]);

        assert!(classifier.is_endpoint_group(&controller(
            "UsersController",
            &["Microsoft.AspNetCore.Mvc.ControllerBase"]
        )));
        assert!(classifier.is_endpoint_group(&controller(
            "HomeController",
            &["Microsoft.AspNetCore.Mvc.Controller"]
        )));
        assert!(!classifier.is_endpoint_group(&controller("OrdersController", &["ApiController"])));
    }

    #[test]
    fn test_empty_marker_list_uses_default() {
        let classifier = ControllerClassifier::new(Vec::<String>::new());

        assert_eq!(classifier.markers(), &[DEFAULT_BASE_MARKER.to_string()]);
    }
}
