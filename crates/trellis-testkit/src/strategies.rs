//! Property test strategies for Trellis types
//!
//! Names are drawn from small pools so generated collections contain
//! collisions: several bindings per template, and the same binding key
//! re-pointed at different templates.

use proptest::prelude::*;

// Re-export proptest for convenience
pub use proptest;

use trellis_core::Binding;

/// Strategy for template names from a pool of five
pub fn arb_template_name() -> impl Strategy<Value = String> {
    (0u8..5).prop_map(|n| format!("template-{n}"))
}

/// Strategy for bindings over four namespaces and eight names
pub fn arb_binding() -> impl Strategy<Value = Binding> {
    (0u8..4, 0u8..8, arb_template_name()).prop_map(|(ns, name, template)| {
        let namespace = format!("p-{ns}");
        Binding::new(namespace.clone(), format!("b{name}"), template, format!("local:{namespace}"))
    })
}

/// Strategy for a sequence of binding updates, later entries superseding
/// earlier ones with the same key
pub fn arb_binding_updates() -> impl Strategy<Value = Vec<Binding>> {
    prop::collection::vec(arb_binding(), 0..48)
}
