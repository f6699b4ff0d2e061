//! Conventional names derived from a controller name.
//!
//! Resolution goes through the registry, but error messages and route
//! listings still speak in the `<name>_controller` / `PascalCaseController`
//! convention applications are written against.

/// Strip a trailing `_controller` suffix, if present.
pub fn base_name(controller: &str) -> &str {
    controller.strip_suffix("_controller").unwrap_or(controller)
}

/// Module-style name: `home` → `home_controller`.
pub fn module_name(controller: &str) -> String {
    format!("{}_controller", base_name(controller))
}

/// Type-style name: `api_v1_user` → `ApiV1UserController`.
pub fn class_name(controller: &str) -> String {
    let pascal: String = base_name(controller)
        .split('_')
        .filter(|word| !word.is_empty())
        .map(|word| {
            let mut chars = word.chars();
            match chars.next() {
                Some(first) => first.to_ascii_uppercase().to_string() + &chars.as_str().to_ascii_lowercase(),
                None => String::new(),
            }
        })
        .collect();
    format!("{}Controller", pascal)
}
