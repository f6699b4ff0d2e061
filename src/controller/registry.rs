//! Explicit controller registry.
//!
//! # Responsibilities
//! - Map controller names to factories
//! - Instantiate and bind a controller when the resolver asks for it
//!
//! # Design Decisions
//! - Populated by the application at boot, before resolution
//! - Registering a name twice is an error, not an overwrite

use std::collections::HashMap;
use std::sync::Arc;

use crate::controller::{ActionHandler, Actions, Callback, Callbacks, Controller};
use crate::hooks::HookTable;
use crate::resolver::RegistrationError;
use crate::routing::route::validate_name;

type Factory = Box<dyn Fn(&str) -> BoundController + Send + Sync>;

/// A controller instance with its handlers erased to trait objects.
pub struct BoundController {
    name: String,
    actions: HashMap<String, ActionHandler>,
    callbacks: HashMap<String, Callback>,
    hooks: HookTable,
}

impl BoundController {
    /// Instantiate `C` and close its actions and callbacks over the instance.
    pub fn bind<C: Controller>(name: &str, instance: C) -> Self {
        let instance = Arc::new(instance);

        let mut actions = Actions::new();
        C::actions(&mut actions);
        let mut callbacks = Callbacks::new();
        C::callbacks(&mut callbacks);
        let mut hooks = HookTable::new();
        C::hooks(&mut hooks);

        Self {
            name: name.to_string(),
            actions: actions.bind(&instance),
            callbacks: callbacks.bind(&instance),
            hooks,
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn action(&self, name: &str) -> Option<ActionHandler> {
        self.actions.get(name).cloned()
    }

    pub fn has_action(&self, name: &str) -> bool {
        self.actions.contains_key(name)
    }

    pub fn callbacks(&self) -> &HashMap<String, Callback> {
        &self.callbacks
    }

    pub fn hooks(&self) -> &HookTable {
        &self.hooks
    }
}

/// Controller name → factory.
#[derive(Default)]
pub struct ControllerRegistry {
    factories: HashMap<String, Factory>,
    order: Vec<String>,
}

impl std::fmt::Debug for ControllerRegistry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ControllerRegistry")
            .field("controllers", &self.order)
            .finish_non_exhaustive()
    }
}

impl ControllerRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a factory for controller `name`.
    pub fn register<C, F>(&mut self, name: &str, factory: F) -> Result<&mut Self, RegistrationError>
    where
        C: Controller,
        F: Fn() -> C + Send + Sync + 'static,
    {
        validate_name(name)?;
        if self.factories.contains_key(name) {
            return Err(RegistrationError::DuplicateController(name.to_string()));
        }

        tracing::debug!(controller = %name, "Controller registered");
        self.factories.insert(
            name.to_string(),
            Box::new(move |name: &str| BoundController::bind(name, factory())),
        );
        self.order.push(name.to_string());
        Ok(self)
    }

    /// Register a controller built with `Default::default`.
    pub fn register_default<C>(&mut self, name: &str) -> Result<&mut Self, RegistrationError>
    where
        C: Controller + Default,
    {
        self.register(name, C::default)
    }

    pub fn contains(&self, name: &str) -> bool {
        self.factories.contains_key(name)
    }

    /// Registered names, in registration order.
    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.order.iter().map(String::as_str)
    }

    /// Instantiate and bind controller `name`.
    pub fn build(&self, name: &str) -> Option<BoundController> {
        self.factories.get(name).map(|factory| factory(name))
    }
}
