//! Path component parsing shared by the registry, scorer and request binding.

/// Registered-path marker meaning "any value at this position".
pub const WILDCARD: &str = "?";

/// Split a URL path into its non-empty `/`-delimited components.
///
/// `"/"` and `""` both yield no components. Callers strip any query string
/// first: `?` is a literal component here.
#[must_use]
pub fn parse_path_components(path: &str) -> Vec<String> {
    path.split('/')
        .filter(|segment| !segment.is_empty())
        .map(str::to_string)
        .collect()
}

/// Number of components in `path`.
#[must_use]
pub fn path_length(path: &str) -> usize {
    path.split('/')
        .filter(|segment| !segment.is_empty())
        .count()
}

/// Whether a registered component matches any value: `?` or `{name}`.
#[inline]
#[must_use]
pub fn is_dynamic_component(component: &str) -> bool {
    component == WILDCARD
        || (component.len() > 2 && component.starts_with('{') && component.ends_with('}'))
}

/// Number of dynamic components in a registered path.
#[must_use]
pub fn dynamic_component_count(components: &[String]) -> usize {
    components
        .iter()
        .filter(|c| is_dynamic_component(c))
        .count()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_root_has_no_components() {
        assert!(parse_path_components("/").is_empty());
        assert!(parse_path_components("").is_empty());
        assert_eq!(path_length("/"), 0);
    }

    #[test]
    fn test_components_ignore_duplicate_slashes() {
        assert_eq!(
            parse_path_components("/Users//42/"),
            vec!["Users".to_string(), "42".to_string()]
        );
        assert_eq!(path_length("/Users//42/"), 2);
    }

    #[test]
    fn test_wildcard_marker_is_a_component() {
        assert_eq!(
            parse_path_components("/Users/?"),
            vec!["Users".to_string(), "?".to_string()]
        );
        assert_eq!(path_length("/Users/?"), 2);
        assert_eq!(path_length("/?/?/deleted"), 3);
    }

    #[test]
    fn test_dynamic_components() {
        assert!(is_dynamic_component("?"));
        assert!(is_dynamic_component("{id}"));
        assert!(!is_dynamic_component("{}"));
        assert!(!is_dynamic_component("Users"));
        let comps = parse_path_components("/?/{id}/link/?");
        assert_eq!(dynamic_component_count(&comps), 3);
    }
}
