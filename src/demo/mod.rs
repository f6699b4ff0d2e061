//! Demo application served by the `mvc-router` binary.
//!
//! ```text
//! GET  /                    home#index
//! *    /messages[...]       messages#{index,new,create,show,edit,update,delete}
//! GET  /api/health          health#check
//! ```

pub mod health;
pub mod home;
pub mod messages;

use crate::controller::ControllerRegistry;
use crate::resolver::RegistrationError;
use crate::routing::{RouteError, RouteTable, Routes};

pub use health::HealthController;
pub use home::HomeController;
pub use messages::{Message, MessagesController};

/// Declare the demo routes.
pub fn routes() -> Result<RouteTable, RouteError> {
    let mut table = RouteTable::new();
    table.get("/", "home#index")?;
    table.all("messages")?;
    table.namespace("/api").get("/health", "health#check")?;
    Ok(table)
}

/// Register the demo controllers.
pub fn registry() -> Result<ControllerRegistry, RegistrationError> {
    let mut registry = ControllerRegistry::new();
    registry
        .register_default::<HomeController>("home")?
        .register_default::<MessagesController>("messages")?
        .register_default::<HealthController>("health")?;
    Ok(registry)
}

/// Escape text for inclusion in HTML.
pub(crate) fn escape(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    for c in text.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#39;"),
            c => out.push(c),
        }
    }
    out
}
