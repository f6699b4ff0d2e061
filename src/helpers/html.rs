//! HTML fragments.

use std::fmt;

use axum::response::{Html, IntoResponse, Response};
use thiserror::Error;

use crate::http::method_override::DEFAULT_FIELD;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum HelperError {
    /// Only PUT and DELETE need a hidden field.
    #[error("no hidden-method input for `{0}` (expected put or delete)")]
    UnsupportedMethod(String),
}

/// Markup that is emitted verbatim, without escaping.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SafeHtml(String);

impl SafeHtml {
    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn into_string(self) -> String {
        self.0
    }
}

impl fmt::Display for SafeHtml {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl IntoResponse for SafeHtml {
    fn into_response(self) -> Response {
        Html(self.0).into_response()
    }
}

/// `<input type='hidden' name='_method' value=PUT>` for `put` / `delete`, any case.
pub fn hidden_method(method: &str) -> Result<SafeHtml, HelperError> {
    let method = method.to_ascii_lowercase();
    match method.as_str() {
        "put" | "delete" => Ok(SafeHtml(format!(
            "<input type='hidden' name='{}' value={}>",
            DEFAULT_FIELD,
            method.to_ascii_uppercase()
        ))),
        _ => Err(HelperError::UnsupportedMethod(method)),
    }
}

const FORM_SCRIPT: &str = r#"<script>
  const form = document.querySelector('form');

  form.addEventListener('submit', async (event) => {
    event.preventDefault();

    const formData = new FormData(form);
    const formAction = form.getAttribute('action');
    const formMethod = form.getAttribute('method').toLowerCase();

    if (formMethod == 'put' || formMethod == 'delete') {
      const response = await fetch(formAction, { method: formMethod, body: formData });

      if (response.redirected) window.location.href = response.url;
    }
  });
</script>"#;

/// Script that sends PUT/DELETE forms with `fetch` and follows redirects.
pub fn form_script() -> SafeHtml {
    SafeHtml(FORM_SCRIPT.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_hidden_method_exact_markup() {
        assert_eq!(
            hidden_method("put").unwrap().as_str(),
            "<input type='hidden' name='_method' value=PUT>"
        );
        assert_eq!(
            hidden_method("DELETE").unwrap().to_string(),
            "<input type='hidden' name='_method' value=DELETE>"
        );
        assert_eq!(hidden_method("Put"), hidden_method("put"));
    }

    #[test]
    fn test_other_methods_rejected() {
        assert_eq!(hidden_method("patch"), Err(HelperError::UnsupportedMethod("patch".into())));
        assert!(hidden_method("get").is_err());
        assert!(hidden_method("").is_err());
    }

    #[test]
    fn test_form_script() {
        let script = form_script().into_string();
        assert!(script.starts_with("<script>"));
        assert!(script.contains("fetch(formAction"));
        assert!(script.trim_end().ends_with("</script>"));
    }
}
