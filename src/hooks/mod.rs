//! Controller lifecycle hooks.
//!
//! # Data Flow
//! ```text
//! Controller::hooks() / manifest "hooks"
//!     → HookTable (raw HookSpec per hook name)
//!     → HookBinding (Global | Scoped), malformed specs rejected
//!     → chain.rs (bind callback names to controller callbacks)
//!     → HookSet per controller + AppHooks shared by every endpoint
//! ```
//!
//! # Design Decisions
//! - One tagged variant covers both conventions: a list of callback names
//!   that always fire, or one callback scoped to a set of actions
//! - Malformed declarations are configuration errors, never no-ops
//! - Hook state flows through the per-request `Context`, not the controller

pub mod chain;

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use thiserror::Error;

pub use chain::{AppHooks, HookSet};

/// Errors raised while resolving hook declarations.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum HookError {
    /// Name is not one of the recognised lifecycle hooks.
    #[error("unknown hook `{0}`")]
    UnknownHook(String),

    /// Value is neither a list of callbacks nor a `{callback, actions}` object.
    #[error("malformed `{hook}` declaration: {found}")]
    Malformed { hook: HookKind, found: String },

    /// Action-scoped form used on a hook that does not support it.
    #[error("`{0}` does not accept the {{callback, actions}} form")]
    ScopedNotSupported(HookKind),

    /// Binding names a callback the controller never registered.
    #[error("controller `{controller}` has no callback `{callback}`")]
    UnknownCallback { controller: String, callback: String },

    /// Callback exists but has the wrong shape for the hook.
    #[error("callback `{callback}` of controller `{controller}` cannot be used as `{hook}`")]
    CallbackMismatch {
        controller: String,
        callback: String,
        hook: HookKind,
    },
}

/// Recognised lifecycle hooks.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum HookKind {
    BeforeRequest,
    AfterRequest,
    TeardownRequest,
    BeforeAppRequest,
    AfterAppRequest,
    TeardownAppRequest,
    BeforeAppFirstRequest,
}

/// Shape of callback a hook calls.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Phase {
    Before,
    After,
    Teardown,
}

impl HookKind {
    pub const ALL: [HookKind; 7] = [
        HookKind::BeforeRequest,
        HookKind::AfterRequest,
        HookKind::TeardownRequest,
        HookKind::AfterAppRequest,
        HookKind::BeforeAppRequest,
        HookKind::TeardownAppRequest,
        HookKind::BeforeAppFirstRequest,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            HookKind::BeforeRequest => "before_request",
            HookKind::AfterRequest => "after_request",
            HookKind::TeardownRequest => "teardown_request",
            HookKind::BeforeAppRequest => "before_app_request",
            HookKind::AfterAppRequest => "after_app_request",
            HookKind::TeardownAppRequest => "teardown_app_request",
            HookKind::BeforeAppFirstRequest => "before_app_first_request",
        }
    }

    pub fn phase(self) -> Phase {
        match self {
            HookKind::BeforeRequest | HookKind::BeforeAppRequest | HookKind::BeforeAppFirstRequest => {
                Phase::Before
            }
            HookKind::AfterRequest | HookKind::AfterAppRequest => Phase::After,
            HookKind::TeardownRequest | HookKind::TeardownAppRequest => Phase::Teardown,
        }
    }

    /// Fires for requests to any controller, not only the declaring one.
    pub fn is_app_wide(self) -> bool {
        matches!(
            self,
            HookKind::BeforeAppRequest
                | HookKind::AfterAppRequest
                | HookKind::TeardownAppRequest
                | HookKind::BeforeAppFirstRequest
        )
    }

    /// Only the controller-level request hooks accept action scoping.
    pub fn supports_scoping(self) -> bool {
        matches!(self, HookKind::BeforeRequest | HookKind::AfterRequest)
    }
}

impl fmt::Display for HookKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for HookKind {
    type Err = HookError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        HookKind::ALL
            .into_iter()
            .find(|kind| kind.as_str() == s)
            .ok_or_else(|| HookError::UnknownHook(s.to_string()))
    }
}

/// Actions of a scoped hook, either space separated or listed.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum ActionList {
    Spaced(String),
    Listed(Vec<String>),
}

impl ActionList {
    pub fn names(&self) -> Vec<String> {
        match self {
            ActionList::Spaced(s) => s.split_whitespace().map(str::to_string).collect(),
            ActionList::Listed(names) => names.clone(),
        }
    }
}

/// A hook declaration as written by the application.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum HookSpec {
    /// Callback names fired on every request.
    Methods(Vec<String>),
    /// One callback fired only for the listed actions.
    Callback { callback: String, actions: ActionList },
    /// Anything else; rejected at resolution.
    Invalid(serde_json::Value),
}

impl HookSpec {
    pub fn methods<I, S>(names: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        HookSpec::Methods(names.into_iter().map(Into::into).collect())
    }

    /// `{callback, actions}` with space separated actions.
    pub fn callback(callback: impl Into<String>, actions: impl Into<String>) -> Self {
        HookSpec::Callback {
            callback: callback.into(),
            actions: ActionList::Spaced(actions.into()),
        }
    }
}

impl From<serde_json::Value> for HookSpec {
    fn from(value: serde_json::Value) -> Self {
        serde_json::from_value(value.clone()).unwrap_or(HookSpec::Invalid(value))
    }
}

impl From<Vec<&str>> for HookSpec {
    fn from(names: Vec<&str>) -> Self {
        HookSpec::methods(names)
    }
}

impl From<Vec<String>> for HookSpec {
    fn from(names: Vec<String>) -> Self {
        HookSpec::Methods(names)
    }
}

impl<const N: usize> From<[&str; N]> for HookSpec {
    fn from(names: [&str; N]) -> Self {
        HookSpec::methods(names)
    }
}

/// A validated hook declaration.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum HookBinding {
    /// Fire every named callback, in order, on every request.
    Global(Vec<String>),
    /// Fire `callback` only when the endpoint is one of `actions`.
    Scoped { callback: String, actions: Vec<String> },
}

impl HookBinding {
    pub fn from_spec(kind: HookKind, spec: &HookSpec) -> Result<Self, HookError> {
        match spec {
            HookSpec::Methods(names) => Ok(HookBinding::Global(names.clone())),
            HookSpec::Callback { callback, actions } => {
                if !kind.supports_scoping() {
                    return Err(HookError::ScopedNotSupported(kind));
                }
                Ok(HookBinding::Scoped {
                    callback: callback.clone(),
                    actions: actions.names(),
                })
            }
            HookSpec::Invalid(value) => Err(HookError::Malformed {
                hook: kind,
                found: value.to_string(),
            }),
        }
    }
}

/// Hook declarations of one controller, keyed by hook name.
///
/// Declaring the same hook twice replaces the earlier value.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct HookTable {
    entries: Vec<(String, HookSpec)>,
}

impl HookTable {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn declare(&mut self, hook: &str, spec: impl Into<HookSpec>) -> &mut Self {
        let spec = spec.into();
        match self.entries.iter_mut().find(|(name, _)| name == hook) {
            Some(entry) => entry.1 = spec,
            None => self.entries.push((hook.to_string(), spec)),
        }
        self
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Binding for `kind`: `Ok(None)` when undeclared, `Err` when malformed.
    pub fn binding(&self, kind: HookKind) -> Result<Option<HookBinding>, HookError> {
        self.entries
            .iter()
            .find(|(name, _)| name == kind.as_str())
            .map(|(_, spec)| HookBinding::from_spec(kind, spec))
            .transpose()
    }

    /// Every declaration, validated, in declaration order.
    pub fn bindings(&self) -> Result<Vec<(HookKind, HookBinding)>, HookError> {
        self.entries
            .iter()
            .map(|(name, spec)| {
                let kind: HookKind = name.parse()?;
                Ok((kind, HookBinding::from_spec(kind, spec)?))
            })
            .collect()
    }
}
