//! Resolver seam between host applications and the scope model
//!
//! Instance-level grants need a canonical `(namespace, resource_type,
//! instance_id)` triple for each concrete resource. That mapping belongs to
//! the host application (an ORM, a registry, a directory service), so it
//! enters scopeseal through the [`Resource`] trait rather than any concrete
//! lookup.

/// A resource that knows its own canonical selector triple.
///
/// Implement this for domain types that can be named in instance-level
/// grants. Implementations must be stable: the same instance must always
/// resolve to the same triple, or tokens issued for it stop matching.
pub trait Resource {
    /// Namespace the resource lives in (broadest field).
    fn namespace(&self) -> &str;

    /// Resource type within the namespace.
    fn resource_type(&self) -> &str;

    /// Identifier of this specific instance, rendered as text.
    fn instance_id(&self) -> String;
}

/// A plain owned selector triple, for callers without a domain type.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResourceRef {
    namespace: String,
    resource_type: String,
    instance_id: String,
}

impl ResourceRef {
    /// Create a reference from its three canonical fields.
    pub fn new(
        namespace: impl Into<String>,
        resource_type: impl Into<String>,
        instance_id: impl Into<String>,
    ) -> Self {
        Self {
            namespace: namespace.into(),
            resource_type: resource_type.into(),
            instance_id: instance_id.into(),
        }
    }
}

impl Resource for ResourceRef {
    fn namespace(&self) -> &str {
        &self.namespace
    }

    fn resource_type(&self) -> &str {
        &self.resource_type
    }

    fn instance_id(&self) -> String {
        self.instance_id.clone()
    }
}
