use crate::catalog::TypeDescriptor;
use glob::Pattern;
use log::{debug, warn};

/// Caller-supplied name filter for endpoint groups.
///
/// Each pattern is either a literal type name or a wildcard pattern where `*` stands for any
/// run of characters (including none). Wildcard patterns are matched case-sensitively against
/// the whole type name. An empty filter lets every type through.
///
/// # Example
///
/// ```
/// use webapi_to_openapi::catalog::TypeDescriptor;
/// use webapi_to_openapi::filter::FilterSpec;
///
/// let filter = FilterSpec::new(["User*"]);
/// assert!(filter.matches(&TypeDescriptor::new("UsersController", "Shop.UsersController")));
/// assert!(!filter.matches(&TypeDescriptor::new("AdminController", "Shop.AdminController")));
/// ```
#[derive(Debug, Clone, Default)]
pub struct FilterSpec {
    patterns: Vec<NamePattern>,
}

#[derive(Debug, Clone)]
enum NamePattern {
    Literal(String),
    Wildcard { source: String, pattern: Pattern },
}

impl NamePattern {
    fn compile(source: &str) -> Self {
        if !source.contains('*') {
            return NamePattern::Literal(source.to_string());
        }

        match Pattern::new(&wildcard_glob(source)) {
            Ok(pattern) => NamePattern::Wildcard {
                source: source.to_string(),
                pattern,
            },
            Err(e) => {
                // Type names never contain `*`, so the literal fallback matches nothing.
                warn!("Ignoring controller pattern '{}': {}", source, e);
                NamePattern::Literal(source.to_string())
            }
        }
    }

    fn source(&self) -> &str {
        match self {
            NamePattern::Literal(source) => source,
            NamePattern::Wildcard { source, .. } => source,
        }
    }

    fn matches(&self, name: &str) -> bool {
        match self {
            NamePattern::Literal(literal) => literal == name,
            NamePattern::Wildcard { pattern, .. } => pattern.matches(name),
        }
    }
}

/// Glob text for a name pattern: runs of `*` collapse to one star and everything between
/// stars is escaped, so `Order**[V]` becomes `Order*[[]V[]]`.
fn wildcard_glob(source: &str) -> String {
    let mut collapsed = String::with_capacity(source.len());
    for c in source.chars() {
        if c == '*' && collapsed.ends_with('*') {
            continue;
        }
        collapsed.push(c);
    }

    collapsed
        .split('*')
        .map(Pattern::escape)
        .collect::<Vec<_>>()
        .join("*")
}

impl FilterSpec {
    /// Create a filter from the given patterns; duplicates are dropped, order is kept
    pub fn new<I, S>(patterns: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let mut compiled: Vec<NamePattern> = Vec::new();
        for pattern in patterns {
            let pattern = pattern.as_ref();
            if compiled.iter().any(|existing| existing.source() == pattern) {
                continue;
            }
            compiled.push(NamePattern::compile(pattern));
        }

        debug!("Compiled {} controller name patterns", compiled.len());
        Self { patterns: compiled }
    }

    /// Whether the filter has no patterns and therefore accepts everything
    pub fn is_empty(&self) -> bool {
        self.patterns.is_empty()
    }

    /// Patterns as supplied by the caller
    pub fn patterns(&self) -> Vec<&str> {
        self.patterns.iter().map(NamePattern::source).collect()
    }

    /// Whether the descriptor's simple name satisfies any pattern
    pub fn matches(&self, descriptor: &TypeDescriptor) -> bool {
        self.is_empty()
            || self
                .patterns
                .iter()
                .any(|pattern| pattern.matches(&descriptor.name))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn named(name: &str) -> TypeDescriptor {
        TypeDescriptor::new(name, format!("Shop.{}", name))
    }

    #[test]
    fn test_empty_filter_matches_everything() {
        let filter = FilterSpec::default();

        assert!(filter.is_empty());
        assert!(filter.matches(&named("OrdersController")));
        assert!(filter.matches(&named("Helper")));
    }

    #[test]
    fn test_literal_requires_exact_name() {
        let filter = FilterSpec::new(["OrdersController"]);

        assert!(filter.matches(&named("OrdersController")));
        assert!(!filter.matches(&named("OrdersControllerV2")));
        assert!(!filter.matches(&named("ordersController")));
    }

    #[test]
    fn test_prefix_wildcard() {
        let filter = FilterSpec::new(["User*"]);

        assert!(filter.matches(&named("UserController")));
        assert!(filter.matches(&named("UsersController")));
        assert!(filter.matches(&named("User")));
        assert!(!filter.matches(&named("AdminController")));
        assert!(!filter.matches(&named("SuperUserController")));
    }

    #[test]
    fn test_suffix_wildcard() {
        let filter = FilterSpec::new(["*Controller"]);

        assert!(filter.matches(&named("OrdersController")));
        assert!(filter.matches(&named("Controller")));
        assert!(!filter.matches(&named("ControllerFactory")));
    }

    #[test]
    fn test_wildcard_is_anchored_and_case_sensitive() {
        let filter = FilterSpec::new(["Order*Controller"]);

        assert!(filter.matches(&named("OrderController")));
        assert!(filter.matches(&named("OrderHistoryController")));
        assert!(!filter.matches(&named("OrderHistoryControllerTests")));
        assert!(!filter.matches(&named("orderHistoryController")));
    }

    #[test]
    fn test_other_glob_characters_are_literal() {
        let filter = FilterSpec::new(["Repo[1]*", "A?*"]);

        assert!(filter.matches(&named("Repo[1]Controller")));
        assert!(!filter.matches(&named("Repo1Controller")));
        assert!(filter.matches(&named("A?Controller")));
        assert!(!filter.matches(&named("AbController")));
    }

    #[test]
    fn test_generic_arity_suffix_is_literal_text() {
        let filter = FilterSpec::new(["Crud*`1"]);

        assert!(filter.matches(&named("CrudController`1")));
        assert!(!filter.matches(&named("CrudController`2")));
    }

    #[test]
    fn test_any_pattern_may_match() {
        let filter = FilterSpec::new(["HomeController", "Order*", "*Admin*"]);

        assert!(filter.matches(&named("HomeController")));
        assert!(filter.matches(&named("OrdersController")));
        assert!(filter.matches(&named("SiteAdminController")));
        assert!(!filter.matches(&named("UsersController")));
    }

    #[test]
    fn test_duplicate_patterns_are_dropped() {
        let filter = FilterSpec::new(["A*", "B", "A*"]);

        assert_eq!(filter.patterns(), vec!["A*", "B"]);
    }

    #[test]
    fn test_star_runs_act_as_single_star() {
        let controller = named("OrdersController");

        for pattern in ["Orders**", "**Controller", "Orders***", "*Orders**Controller", "***"] {
            let filter = FilterSpec::new([pattern]);
            assert!(filter.matches(&controller), "{} should match OrdersController", pattern);
        }
        assert!(!FilterSpec::new(["Users**"]).matches(&controller));
        assert_eq!(FilterSpec::new(["Orders**"]).patterns(), vec!["Orders**"]);
    }

    #[test]
    fn test_stars_around_glob_characters() {
        let filter = FilterSpec::new(["**[Api]?**"]);

        assert!(filter.matches(&named("Legacy[Api]?Controller")));
        assert!(filter.matches(&named("[Api]?")));
        assert!(!filter.matches(&named("LegacyAController")));
        assert!(!filter.matches(&named("Legacy[Api]Controller")));
    }

    #[test]
    fn test_wildcard_glob_escapes_literal_pieces() {
        assert_eq!(wildcard_glob("Order**[V]"), "Order*[[]V[]]");
        assert_eq!(wildcard_glob("***"), "*");
        assert_eq!(wildcard_glob("*A?*"), "*A[?]*");
    }

    #[test]
    fn test_every_star_pattern_compiles_to_a_wildcard() {
        let patterns = [
            "*",
            "**",
            "*/**/*",
            "[*]",
            "*[!x]*",
            "a]*[b",
            "**?**?**",
            "*{a,b}*",
            "\\*",
        ];

        for source in patterns {
            assert!(
                matches!(NamePattern::compile(source), NamePattern::Wildcard { .. }),
                "{} should compile to a wildcard",
                source
            );
        }
    }
}
