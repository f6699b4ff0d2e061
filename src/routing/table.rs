//! Route table and declaration surface.
//!
//! # Responsibilities
//! - Accumulate declared routes in insertion order
//! - Expand `all(resource)` into the canonical RESTful routes
//! - Group routes by controller for the resolver
//!
//! # Design Decisions
//! - The table is an explicit value owned by the application bootstrap
//! - `reset()` clears it between independent declaration passes
//! - Expansion validates the whole `only` list before appending anything

use crate::routing::namespace::Namespace;
use crate::routing::route::{ResourceAction, Route, RouteError, Verb};

/// Selection of canonical actions for `all`.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum Only {
    /// Every canonical action.
    #[default]
    All,
    /// The named actions.
    Actions(Vec<String>),
}

impl Only {
    /// Resolve the selection to canonical actions, dropping duplicates.
    ///
    /// An empty selection means every action.
    pub fn resolve(&self) -> Result<Vec<ResourceAction>, RouteError> {
        let names = match self {
            Only::All => return Ok(ResourceAction::ALL.to_vec()),
            Only::Actions(names) if names.is_empty() => return Ok(ResourceAction::ALL.to_vec()),
            Only::Actions(names) => names,
        };

        let mut actions = Vec::with_capacity(names.len());
        for name in names {
            let action: ResourceAction = name.parse()?;
            if !actions.contains(&action) {
                actions.push(action);
            }
        }
        Ok(actions)
    }
}

impl From<&str> for Only {
    fn from(names: &str) -> Self {
        Only::Actions(names.split_whitespace().map(str::to_string).collect())
    }
}

impl From<String> for Only {
    fn from(names: String) -> Self {
        Only::from(names.as_str())
    }
}

impl From<Vec<String>> for Only {
    fn from(names: Vec<String>) -> Self {
        Only::Actions(names)
    }
}

impl From<Vec<&str>> for Only {
    fn from(names: Vec<&str>) -> Self {
        Only::Actions(names.into_iter().map(str::to_string).collect())
    }
}

impl From<&[&str]> for Only {
    fn from(names: &[&str]) -> Self {
        Only::Actions(names.iter().map(|n| n.to_string()).collect())
    }
}

impl<const N: usize> From<[&str; N]> for Only {
    fn from(names: [&str; N]) -> Self {
        Only::from(&names[..])
    }
}

impl<T: Into<Only>> From<Option<T>> for Only {
    fn from(only: Option<T>) -> Self {
        only.map(Into::into).unwrap_or_default()
    }
}

/// Route declaration operations shared by the table and namespaces.
pub trait Routes {
    /// Declare one route for `verb` at `path`.
    fn route(&mut self, verb: Verb, path: &str, resource: &str) -> Result<(), RouteError>;

    /// Declare the canonical routes of `resource` under `base_path`.
    fn resources(&mut self, resource: &str, only: Only, base_path: &str) -> Result<(), RouteError>;

    fn get(&mut self, path: &str, resource: &str) -> Result<(), RouteError> {
        self.route(Verb::Get, path, resource)
    }

    fn post(&mut self, path: &str, resource: &str) -> Result<(), RouteError> {
        self.route(Verb::Post, path, resource)
    }

    /// Declares PUT and PATCH.
    fn put(&mut self, path: &str, resource: &str) -> Result<(), RouteError> {
        self.route(Verb::Put, path, resource)
    }

    fn delete(&mut self, path: &str, resource: &str) -> Result<(), RouteError> {
        self.route(Verb::Delete, path, resource)
    }

    /// All seven canonical routes of `resource`.
    fn all(&mut self, resource: &str) -> Result<(), RouteError> {
        self.resources(resource, Only::All, "")
    }

    /// The canonical routes of `resource` named by `only`.
    fn all_only<O>(&mut self, resource: &str, only: O) -> Result<(), RouteError>
    where
        O: Into<Only>,
        Self: Sized,
    {
        self.resources(resource, only.into(), "")
    }

    /// Open a path-prefixed scope over this router.
    fn namespace(&mut self, prefix: &str) -> Namespace<'_>
    where
        Self: Sized,
    {
        Namespace::new(self, prefix)
    }
}

/// Routes for one controller, in declaration order.
#[derive(Debug, Clone, PartialEq)]
pub struct ControllerRoutes {
    pub controller: String,
    pub routes: Vec<Route>,
}

/// Routes grouped by controller, controllers in first-declaration order.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ControllerGroups(Vec<ControllerRoutes>);

impl ControllerGroups {
    pub fn get(&self, controller: &str) -> Option<&[Route]> {
        self.0
            .iter()
            .find(|group| group.controller == controller)
            .map(|group| group.routes.as_slice())
    }

    pub fn controllers(&self) -> impl Iterator<Item = &str> {
        self.0.iter().map(|group| group.controller.as_str())
    }

    pub fn iter(&self) -> impl Iterator<Item = &ControllerRoutes> {
        self.0.iter()
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl IntoIterator for ControllerGroups {
    type Item = ControllerRoutes;
    type IntoIter = std::vec::IntoIter<ControllerRoutes>;

    fn into_iter(self) -> Self::IntoIter {
        self.0.into_iter()
    }
}

/// Registry of declared routes.
#[derive(Debug, Clone, Default)]
pub struct RouteTable {
    routes: Vec<Route>,
}

impl RouteTable {
    pub fn new() -> Self {
        Self::default()
    }

    /// Drop every declared route.
    pub fn reset(&mut self) {
        self.routes.clear();
    }

    /// Append an already-built route.
    pub fn insert(&mut self, route: Route) {
        tracing::debug!(
            endpoint = %route.endpoint(),
            methods = %route.methods(),
            path = %route.path(),
            "Route declared"
        );
        self.routes.push(route);
    }

    pub fn routes(&self) -> &[Route] {
        &self.routes
    }

    pub fn len(&self) -> usize {
        self.routes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.routes.is_empty()
    }

    /// Group routes by controller name.
    pub fn grouped(&self) -> ControllerGroups {
        let mut groups: Vec<ControllerRoutes> = Vec::new();
        for route in &self.routes {
            match groups.iter_mut().find(|g| g.controller == route.controller()) {
                Some(group) => group.routes.push(route.clone()),
                None => groups.push(ControllerRoutes {
                    controller: route.controller().to_string(),
                    routes: vec![route.clone()],
                }),
            }
        }
        ControllerGroups(groups)
    }
}

impl Extend<Route> for RouteTable {
    fn extend<I: IntoIterator<Item = Route>>(&mut self, routes: I) {
        for route in routes {
            self.insert(route);
        }
    }
}

impl Routes for RouteTable {
    fn route(&mut self, verb: Verb, path: &str, resource: &str) -> Result<(), RouteError> {
        let route = Route::declare(verb, path, resource)?;
        self.insert(route);
        Ok(())
    }

    fn resources(&mut self, resource: &str, only: Only, base_path: &str) -> Result<(), RouteError> {
        let actions = only.resolve()?;

        // Validate the resource once so a bad name fails before any append.
        crate::routing::route::validate_name(resource)?;

        for action in actions {
            let path = format!("{}/{}{}", base_path, resource, action.suffix());
            self.route(action.verb(), &path, &format!("{}#{}", resource, action.name()))?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::Method;

    fn pairs(table: &RouteTable) -> Vec<(String, String, String)> {
        table
            .routes()
            .iter()
            .map(|r| (r.methods().to_string(), r.path().to_string(), r.action().to_string()))
            .collect()
    }

    #[test]
    fn test_all_emits_canonical_routes() {
        let mut table = RouteTable::new();
        table.all("messages").unwrap();

        let mut got = pairs(&table);
        got.sort();
        let mut expected = vec![
            ("GET".to_string(), "/messages".to_string(), "index".to_string()),
            ("GET".into(), "/messages/new".into(), "new".into()),
            ("POST".into(), "/messages".into(), "create".into()),
            ("GET".into(), "/messages/<id>".into(), "show".into()),
            ("GET".into(), "/messages/<id>/edit".into(), "edit".into()),
            ("PUT,PATCH".into(), "/messages/<id>".into(), "update".into()),
            ("DELETE".into(), "/messages/<id>".into(), "delete".into()),
        ];
        expected.sort();
        assert_eq!(got, expected);
        assert_eq!(table.grouped().get("messages").unwrap().len(), 7);
    }

    #[test]
    fn test_all_only_string_and_list() {
        let mut table = RouteTable::new();
        table.all_only("messages", "index show new create").unwrap();
        assert_eq!(table.len(), 4);

        table.reset();
        table.all_only("messages", ["show", "index", "show"]).unwrap();
        let mut actions: Vec<_> = table.routes().iter().map(|r| r.action()).collect();
        actions.sort();
        assert_eq!(actions, vec!["index", "show"]);
    }

    #[test]
    fn test_all_only_unknown_action_fails_fast() {
        let mut table = RouteTable::new();
        let err = table.all_only("messages", "index archive").unwrap_err();
        assert_eq!(err, RouteError::UnknownAction("archive".into()));
        assert!(table.is_empty());
    }

    #[test]
    fn test_empty_only_means_all() {
        let mut table = RouteTable::new();
        table.all_only("messages", "").unwrap();
        assert_eq!(table.len(), 7);

        table.reset();
        table.all_only("messages", None::<&str>).unwrap();
        assert_eq!(table.len(), 7);
    }

    #[test]
    fn test_verbs() {
        let mut table = RouteTable::new();
        table.get("/", "home#index").unwrap();
        table.post("/messages", "messages#create").unwrap();
        table.put("/messages/<id>", "messages#update").unwrap();
        table.delete("/messages/<id>", "messages#delete").unwrap();

        let routes = table.routes();
        assert_eq!(routes[0].methods().names(), vec!["GET"]);
        assert_eq!(routes[1].methods().names(), vec!["POST"]);
        assert!(routes[2].methods().contains(&Method::PATCH));
        assert_eq!(routes[3].methods().names(), vec!["DELETE"]);
    }

    #[test]
    fn test_malformed_resource_rejected() {
        let mut table = RouteTable::new();
        assert_eq!(
            table.get("/", "home"),
            Err(RouteError::MalformedResource("home".into()))
        );
        assert!(table.is_empty());
    }

    #[test]
    fn test_grouped_preserves_order() {
        let mut table = RouteTable::new();
        table.get("/", "home#index").unwrap();
        table.get("/messages", "messages#index").unwrap();
        table.get("/hello", "home#hello").unwrap();

        let groups = table.grouped();
        assert_eq!(groups.controllers().collect::<Vec<_>>(), vec!["home", "messages"]);
        let home: Vec<_> = groups.get("home").unwrap().iter().map(|r| r.action()).collect();
        assert_eq!(home, vec!["index", "hello"]);
    }

    #[test]
    fn test_reset_clears_table() {
        let mut table = RouteTable::new();
        table.all("users").unwrap();
        table.reset();
        assert!(table.is_empty());
        assert!(table.grouped().is_empty());
    }
}
