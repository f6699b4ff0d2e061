//! View helpers for HTML forms.
//!
//! HTML forms only submit GET and POST. [`hidden_method`] renders the field
//! the method-override layer looks for, and [`form_script`] renders a script
//! that submits `method="put"` / `method="delete"` forms with `fetch`.

pub mod html;

pub use html::{form_script, hidden_method, HelperError, SafeHtml};
