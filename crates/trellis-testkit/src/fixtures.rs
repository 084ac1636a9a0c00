//! Common fixtures.

use trellis_core::{Binding, Template};

/// Template fixture
pub fn template(name: &str) -> Template {
    Template::new(name)
}

/// Binding in namespace `namespace` referencing `template_name`, scoped to the
/// project of the same name
pub fn binding(namespace: &str, name: &str, template_name: &str) -> Binding {
    Binding::new(namespace, name, template_name, format!("local:{namespace}"))
}
