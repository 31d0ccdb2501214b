// Copyright @yucwang 2021

use std::sync::atomic::{AtomicU64, Ordering};

static NODE_COUNTER: AtomicU64 = AtomicU64::new(0);

/// Default id for a node the scene file did not name: `<type>#<n>`.
pub fn generate_node_id(type_name: &str) -> String {
    let n = NODE_COUNTER.fetch_add(1, Ordering::Relaxed);
    format!("{}#{}", type_name, n)
}

/// A named piece of the scene graph: shapes, materials, emitters,
/// integrators and renderers.
pub trait ComputationNode {
    fn id(&self) -> &str;

    /// One-line summary for log output.
    fn to_string(&self) -> String;
}
