//! Path-prefixing scopes over a router.
//!
//! A [`Namespace`] holds no routes of its own: every declaration is forwarded
//! to its parent with the prefix concatenated in front of the path. Nesting
//! composes left to right, so `/api` then `/v1` yields `/api/v1`. Prefixes are
//! joined verbatim; callers own slash hygiene.

use crate::routing::route::{RouteError, Verb};
use crate::routing::table::{Only, Routes};

/// A prefixed view of a [`RouteTable`](crate::routing::RouteTable) or of another namespace.
pub struct Namespace<'a> {
    parent: &'a mut (dyn Routes + 'a),
    prefix: String,
}

impl<'a> Namespace<'a> {
    pub fn new(parent: &'a mut (dyn Routes + 'a), prefix: impl Into<String>) -> Self {
        Self {
            parent,
            prefix: prefix.into(),
        }
    }

    /// The prefix this scope adds, not including enclosing scopes.
    pub fn prefix(&self) -> &str {
        &self.prefix
    }

    fn prefixed(&self, path: &str) -> String {
        format!("{}{}", self.prefix, path)
    }
}

impl Routes for Namespace<'_> {
    fn route(&mut self, verb: Verb, path: &str, resource: &str) -> Result<(), RouteError> {
        let path = self.prefixed(path);
        self.parent.route(verb, &path, resource)
    }

    fn resources(&mut self, resource: &str, only: Only, base_path: &str) -> Result<(), RouteError> {
        let base_path = self.prefixed(base_path);
        self.parent.resources(resource, only, &base_path)
    }
}

#[cfg(test)]
mod tests {
    use crate::routing::{RouteTable, Routes};

    #[test]
    fn test_nested_namespaces_compose() {
        let mut table = RouteTable::new();
        table.namespace("/api").namespace("/v1").get("/ping", "health#check").unwrap();

        assert_eq!(table.routes()[0].path(), "/api/v1/ping");
        assert_eq!(table.routes()[0].endpoint().to_string(), "health.check");
    }

    #[test]
    fn test_namespace_all_uses_prefix_as_base_path() {
        let mut table = RouteTable::new();
        let mut api = table.namespace("/api/v1");
        api.all_only("user", "index show").unwrap();

        let mut paths: Vec<_> = table.routes().iter().map(|r| r.path().to_string()).collect();
        paths.sort();
        assert_eq!(paths, vec!["/api/v1/user", "/api/v1/user/<id>"]);
    }

    #[test]
    fn test_namespace_reused_for_several_declarations() {
        let mut table = RouteTable::new();
        {
            let mut api = table.namespace("/api/v1");
            api.get("/health", "health#index").unwrap();

            let mut posts = api.namespace("/posts");
            posts.get("", "posts#index").unwrap();
            posts.post("", "posts#create").unwrap();
            posts.put("/<id>", "posts#update").unwrap();
        }

        let paths: Vec<_> = table.routes().iter().map(|r| r.path()).collect();
        assert_eq!(
            paths,
            vec!["/api/v1/health", "/api/v1/posts", "/api/v1/posts", "/api/v1/posts/<id>"]
        );
        assert_eq!(table.routes()[3].methods().names(), vec!["PUT", "PATCH"]);
    }

    #[test]
    fn test_prefix_is_not_normalized() {
        let mut table = RouteTable::new();
        table.namespace("/api/").get("/ping", "health#check").unwrap();
        assert_eq!(table.routes()[0].path(), "/api//ping");
    }
}
