use crate::route::{is_dynamic_component, parse_path_components, RouteRecord};
use tracing::debug;

/// Scores registered routes against a client path.
///
/// For a path of `L` components, position `i` weighs `L - i`. A literal
/// match earns twice the weight, a wildcard once, and any other mismatch
/// disqualifies the route with a score of 0. Between two routes that
/// differ at a single position, the literal one always wins.
#[derive(Debug, Clone, Copy, Default)]
pub struct PathScorer;

impl PathScorer {
    pub const fn new() -> Self {
        Self
    }

    /// Score of `registered` for `client`; 0 means no match.
    #[must_use]
    pub fn score_route<C, R>(&self, client: &[C], registered: &[R]) -> u32
    where
        C: AsRef<str>,
        R: AsRef<str>,
    {
        if client.len() != registered.len() {
            return 0;
        }
        let len = client.len();
        let mut total: u32 = 0;
        for (i, (c, r)) in client.iter().zip(registered).enumerate() {
            let weight = (len - i) as u32;
            let (c, r) = (c.as_ref(), r.as_ref());
            if c == r {
                total += weight * 2;
            } else if is_dynamic_component(r) {
                total += weight;
            } else {
                return 0;
            }
        }
        total
    }

    /// Highest scoring route for `path`. Ties keep the earlier route; a
    /// field of zero scores yields `None`.
    pub fn find_best_match<'a>(
        &self,
        method: &str,
        path: &str,
        routes: &'a [RouteRecord],
    ) -> Option<&'a RouteRecord> {
        let client = parse_path_components(path);
        let mut best: Option<&RouteRecord> = None;
        let mut best_score = 0;
        for route in routes {
            let score = self.score_route(&client, &route.path_components);
            debug!(method, path, route_path = %route.path, score, "Scored route");
            if score > best_score {
                best_score = score;
                best = Some(route);
            }
        }
        if let Some(route) = best {
            debug!(method, path, route_path = %route.path, score = best_score, "Best route selected");
        }
        best
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::route::RouteDeclaration;
    use http::Method;

    fn record(path: &str, api_method: &str) -> RouteRecord {
        let decl = RouteDeclaration::new("GET", path, "UsersAPIController", api_method, &[]);
        RouteRecord::from_declaration(&decl, &Method::GET, "UsersAPIController".to_string())
    }

    fn score(client: &str, registered: &str) -> u32 {
        PathScorer::new().score_route(
            &parse_path_components(client),
            &parse_path_components(registered),
        )
    }

    #[test]
    fn test_position_weights() {
        // weights 2,1: exact+exact = 4+2
        assert_eq!(score("/Users/123", "/Users/123"), 6);
        // exact+wildcard = 4+1
        assert_eq!(score("/Users/123", "/Users/?"), 5);
        // wildcard+wildcard = 2+1
        assert_eq!(score("/Users/123", "/?/?"), 3);
        assert_eq!(score("/Users/123", "/{model}/{id}"), 3);
    }

    #[test]
    fn test_literal_outranks_wildcard_at_each_position() {
        let client = ["a", "b", "c"];
        for i in 0..client.len() {
            let mut wildcard = client;
            wildcard[i] = "?";
            let literal_score = PathScorer::new().score_route(&client[..], &client[..]);
            let wildcard_score = PathScorer::new().score_route(&client[..], &wildcard[..]);
            assert_eq!(literal_score - wildcard_score, (client.len() - i) as u32);
        }
        // equal totals are possible across different shapes: 6+2+1 vs 3+4+2
        assert_eq!(score("/a/b/c", "/a/?/?"), score("/a/b/c", "/?/b/c"));
    }

    #[test]
    fn test_ties_keep_the_first_route() {
        let routes = vec![
            record("/a/?/?", "first"),
            record("/?/b/c", "second"),
            record("/?/?/?", "weaker"),
        ];
        let best = PathScorer::new().find_best_match("GET", "/a/b/c", &routes).unwrap();
        assert_eq!(best.api_method, "first");

        let reversed: Vec<RouteRecord> = routes.into_iter().rev().collect();
        let best = PathScorer::new().find_best_match("GET", "/a/b/c", &reversed).unwrap();
        assert_eq!(best.api_method, "second");
    }

    #[test]
    fn test_registered_wildcard_keeps_its_component() {
        let route = record("/Users/?", "show");
        assert_eq!(route.path_components, vec!["Users".to_string(), "?".to_string()]);
        assert_eq!(route.path_length, 2);
        let best = PathScorer::new().find_best_match("GET", "/Users/42", std::slice::from_ref(&route));
        assert_eq!(best.map(|r| r.api_method.as_str()), Some("show"));
    }

    #[test]
    fn test_single_mismatch_disqualifies() {
        assert_eq!(score("/Users/123/x", "/Users/123/y"), 0);
        assert_eq!(score("/Users/123", "/Books/?"), 0);
    }

    #[test]
    fn test_length_mismatch_scores_zero() {
        assert_eq!(score("/Users", "/Users/?"), 0);
        assert_eq!(score("/Users/1/2", "/?/?"), 0);
        assert_eq!(score("/", "/?"), 0);
    }

    #[test]
    fn test_empty_paths_score_zero() {
        assert_eq!(score("/", "/"), 0);
    }
}
