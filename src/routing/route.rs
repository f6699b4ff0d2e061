//! Route model.
//!
//! # Responsibilities
//! - Represent one declared route (methods, path template, controller, action)
//! - Parse `"controller#action"` resource tokens
//! - Define the canonical RESTful actions and their verb/path mapping
//!
//! # Design Decisions
//! - Routes are immutable once built
//! - PUT always carries PATCH as well (forms cannot tell them apart)
//! - Names are validated at declaration time, never at request time

use std::fmt;
use std::str::FromStr;

use axum::http::Method;
use thiserror::Error;

use crate::hooks::{HookKind, HookSpec};

/// Errors raised while declaring routes.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum RouteError {
    /// Resource token is not of the form `controller#action`.
    #[error("malformed resource `{0}`: expected `controller#action`")]
    MalformedResource(String),

    /// Controller or action name is not an identifier.
    #[error("invalid name `{0}`: must start with a letter and contain only letters, digits and underscores")]
    InvalidName(String),

    /// Action outside the seven canonical resource actions.
    #[error("unknown resource action `{0}` (expected one of index, new, create, show, edit, update, delete)")]
    UnknownAction(String),

    /// HTTP method that cannot be declared.
    #[error("unsupported HTTP method `{0}`")]
    UnsupportedMethod(String),

    /// A route must accept at least one method.
    #[error("route `{0}` declares no HTTP methods")]
    NoMethods(String),
}

/// Declaration verbs exposed by the router.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Verb {
    Get,
    Post,
    Put,
    Delete,
}

impl Verb {
    /// Method set a route declared with this verb accepts.
    pub fn methods(self) -> MethodSet {
        match self {
            Verb::Get => MethodSet::from_methods([Method::GET]),
            Verb::Post => MethodSet::from_methods([Method::POST]),
            Verb::Put => MethodSet::from_methods([Method::PUT, Method::PATCH]),
            Verb::Delete => MethodSet::from_methods([Method::DELETE]),
        }
    }
}

impl FromStr for Verb {
    type Err = RouteError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_uppercase().as_str() {
            "GET" => Ok(Verb::Get),
            "POST" => Ok(Verb::Post),
            // PATCH is only reachable through the PUT declaration.
            "PUT" | "PATCH" => Ok(Verb::Put),
            "DELETE" => Ok(Verb::Delete),
            _ => Err(RouteError::UnsupportedMethod(s.to_string())),
        }
    }
}

/// Ordered, duplicate-free set of HTTP methods.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct MethodSet(Vec<Method>);

impl MethodSet {
    pub fn from_methods(methods: impl IntoIterator<Item = Method>) -> Self {
        let mut set = Self::default();
        for method in methods {
            set.insert(method);
        }
        set
    }

    /// Insert a method, keeping first-insertion order.
    pub fn insert(&mut self, method: Method) {
        if !self.0.contains(&method) {
            self.0.push(method);
        }
    }

    /// Merge every method of `other` into this set.
    pub fn extend(&mut self, other: &MethodSet) {
        for method in other.iter() {
            self.insert(method.clone());
        }
    }

    pub fn contains(&self, method: &Method) -> bool {
        self.0.contains(method)
    }

    pub fn iter(&self) -> impl Iterator<Item = &Method> {
        self.0.iter()
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Method names, e.g. `["PUT", "PATCH"]`.
    pub fn names(&self) -> Vec<&str> {
        self.0.iter().map(Method::as_str).collect()
    }
}

impl fmt::Display for MethodSet {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.names().join(","))
    }
}

/// Fully qualified endpoint name, rendered as `controller.action`.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Endpoint {
    controller: String,
    action: String,
}

impl Endpoint {
    pub fn new(controller: impl Into<String>, action: impl Into<String>) -> Self {
        Self {
            controller: controller.into(),
            action: action.into(),
        }
    }

    pub fn controller(&self) -> &str {
        &self.controller
    }

    pub fn action(&self) -> &str {
        &self.action
    }

    /// True when this endpoint is `controller.action` for the given pair.
    pub fn is(&self, controller: &str, action: &str) -> bool {
        self.controller == controller && self.action == action
    }
}

impl fmt::Display for Endpoint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}.{}", self.controller, self.action)
    }
}

/// One declared route.
#[derive(Debug, Clone, PartialEq)]
pub struct Route {
    methods: MethodSet,
    path: String,
    controller: String,
    action: String,
    hooks: Vec<(HookKind, HookSpec)>,
}

impl Route {
    /// Build a route, validating names and the method set.
    pub fn new(
        methods: MethodSet,
        path: impl Into<String>,
        controller: &str,
        action: &str,
    ) -> Result<Self, RouteError> {
        validate_name(controller)?;
        validate_name(action)?;
        if methods.is_empty() {
            return Err(RouteError::NoMethods(format!("{}#{}", controller, action)));
        }

        Ok(Self {
            methods,
            path: path.into(),
            controller: controller.to_string(),
            action: action.to_string(),
            hooks: Vec::new(),
        })
    }

    /// Build a route from a verb and a `controller#action` token.
    pub fn declare(verb: Verb, path: impl Into<String>, resource: &str) -> Result<Self, RouteError> {
        let (controller, action) = parse_resource(resource)?;
        Self::new(verb.methods(), path, controller, action)
    }

    /// Attach route-level hook declarations.
    pub fn with_hooks(mut self, hooks: Vec<(HookKind, HookSpec)>) -> Self {
        self.hooks = hooks;
        self
    }

    pub fn methods(&self) -> &MethodSet {
        &self.methods
    }

    pub fn path(&self) -> &str {
        &self.path
    }

    pub fn controller(&self) -> &str {
        &self.controller
    }

    pub fn action(&self) -> &str {
        &self.action
    }

    pub fn hooks(&self) -> &[(HookKind, HookSpec)] {
        &self.hooks
    }

    pub fn endpoint(&self) -> Endpoint {
        Endpoint::new(&self.controller, &self.action)
    }
}

/// Split `controller#action` into its two halves.
pub fn parse_resource(resource: &str) -> Result<(&str, &str), RouteError> {
    let mut parts = resource.split('#');
    match (parts.next(), parts.next(), parts.next()) {
        (Some(controller), Some(action), None) if !controller.is_empty() && !action.is_empty() => {
            Ok((controller, action))
        }
        _ => Err(RouteError::MalformedResource(resource.to_string())),
    }
}

/// Controller and action names must be plain identifiers.
pub fn validate_name(name: &str) -> Result<(), RouteError> {
    let mut chars = name.chars();
    let valid = match chars.next() {
        Some(first) => {
            first.is_ascii_alphabetic() && chars.all(|c| c.is_ascii_alphanumeric() || c == '_')
        }
        None => false,
    };

    if valid {
        Ok(())
    } else {
        Err(RouteError::InvalidName(name.to_string()))
    }
}

/// The seven canonical RESTful actions.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ResourceAction {
    Index,
    New,
    Create,
    Show,
    Edit,
    Update,
    Delete,
}

impl ResourceAction {
    pub const ALL: [ResourceAction; 7] = [
        ResourceAction::Index,
        ResourceAction::New,
        ResourceAction::Create,
        ResourceAction::Show,
        ResourceAction::Edit,
        ResourceAction::Update,
        ResourceAction::Delete,
    ];

    pub fn name(self) -> &'static str {
        match self {
            ResourceAction::Index => "index",
            ResourceAction::New => "new",
            ResourceAction::Create => "create",
            ResourceAction::Show => "show",
            ResourceAction::Edit => "edit",
            ResourceAction::Update => "update",
            ResourceAction::Delete => "delete",
        }
    }

    pub fn verb(self) -> Verb {
        match self {
            ResourceAction::Index | ResourceAction::New | ResourceAction::Show | ResourceAction::Edit => {
                Verb::Get
            }
            ResourceAction::Create => Verb::Post,
            ResourceAction::Update => Verb::Put,
            ResourceAction::Delete => Verb::Delete,
        }
    }

    /// Path suffix appended to `/<resource>`.
    pub fn suffix(self) -> &'static str {
        match self {
            ResourceAction::Index | ResourceAction::Create => "",
            ResourceAction::New => "/new",
            ResourceAction::Edit => "/<id>/edit",
            ResourceAction::Show | ResourceAction::Update | ResourceAction::Delete => "/<id>",
        }
    }
}

impl FromStr for ResourceAction {
    type Err = RouteError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        ResourceAction::ALL
            .into_iter()
            .find(|action| action.name() == s)
            .ok_or_else(|| RouteError::UnknownAction(s.to_string()))
    }
}
