//! Scope value types and builders
//!
//! A [`Scope`] is an ordered sequence of [`Grant`]s, each pairing a
//! hierarchical [`Selector`] with a set of permission identifiers. Scopes are
//! immutable: all growth happens through combination, which concatenates two
//! grant sequences into a new scope.

use crate::resolver::Resource;
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;
use std::ops::Add;

/// Hierarchical address of a resource.
///
/// Up to three fields of decreasing breadth: namespace, resource type,
/// instance id. An absent field is a wildcard, so a selector with fewer
/// specified fields denotes broader access. The constructors only produce
/// prefix-specified shapes (a field is never specified after a wildcard).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Selector {
    namespace: Option<String>,
    resource_type: Option<String>,
    instance_id: Option<String>,
}

impl Selector {
    /// Selector with all fields absent: matches every resource.
    pub fn all() -> Self {
        Self {
            namespace: None,
            resource_type: None,
            instance_id: None,
        }
    }

    /// Selector for everything within one namespace.
    pub fn namespace(namespace: impl Into<String>) -> Self {
        Self {
            namespace: Some(namespace.into()),
            resource_type: None,
            instance_id: None,
        }
    }

    /// Selector for every instance of one resource type.
    pub fn resource_type(namespace: impl Into<String>, resource_type: impl Into<String>) -> Self {
        Self {
            namespace: Some(namespace.into()),
            resource_type: Some(resource_type.into()),
            instance_id: None,
        }
    }

    /// Selector for a single resource instance.
    pub fn instance(
        namespace: impl Into<String>,
        resource_type: impl Into<String>,
        instance_id: impl Into<String>,
    ) -> Self {
        Self {
            namespace: Some(namespace.into()),
            resource_type: Some(resource_type.into()),
            instance_id: Some(instance_id.into()),
        }
    }

    /// The three fields in breadth order, `None` for wildcards.
    pub fn fields(&self) -> [Option<&str>; 3] {
        [
            self.namespace.as_deref(),
            self.resource_type.as_deref(),
            self.instance_id.as_deref(),
        ]
    }

    /// True iff this selector grants access to everything `child` addresses.
    ///
    /// Every specified field of the parent must be specified and equal in the
    /// child; wildcard fields of the parent constrain nothing.
    pub fn covers(&self, child: &Selector) -> bool {
        self.fields()
            .iter()
            .zip(child.fields().iter())
            .all(|(parent, child)| match (parent, child) {
                (Some(p), Some(c)) => p == c,
                (Some(_), None) => false,
                (None, _) => true,
            })
    }
}

/// An immutable pairing of a selector with a permission set.
///
/// Permission identifiers are opaque strings; duplicates collapse under set
/// semantics and iteration order is deterministic. An empty permission set is
/// legal and means "access to the selector, no permissions".
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Grant {
    selector: Selector,
    permissions: BTreeSet<String>,
}

impl Grant {
    /// Create a grant for the given permissions on the given selector.
    pub fn new<I, S>(selector: Selector, permissions: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            selector,
            permissions: permissions.into_iter().map(Into::into).collect(),
        }
    }

    /// The selector this grant addresses.
    pub fn selector(&self) -> &Selector {
        &self.selector
    }

    /// The permission identifiers this grant carries.
    pub fn permissions(&self) -> &BTreeSet<String> {
        &self.permissions
    }
}

/// An ordered sequence of grants: the unit of request and of authorization.
///
/// Order is irrelevant to authorization semantics but preserved through
/// combination. The empty scope is the identity for `+`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Scope {
    grants: Vec<Grant>,
}

impl Scope {
    /// The empty scope: requests nothing, grants nothing.
    pub fn empty() -> Self {
        Self::default()
    }

    /// Build a scope from an explicit grant sequence.
    pub fn from_grants(grants: Vec<Grant>) -> Self {
        Self { grants }
    }

    /// Access for the given permissions globally, across all namespaces.
    pub fn for_all(permissions: &[&str]) -> Self {
        Self::single(Selector::all(), permissions)
    }

    /// Access for the given permissions to everything in one namespace.
    pub fn for_namespace(namespace: impl Into<String>, permissions: &[&str]) -> Self {
        Self::single(Selector::namespace(namespace), permissions)
    }

    /// Access for the given permissions to every instance of a resource type.
    pub fn for_resource_type(
        namespace: impl Into<String>,
        resource_type: impl Into<String>,
        permissions: &[&str],
    ) -> Self {
        Self::single(Selector::resource_type(namespace, resource_type), permissions)
    }

    /// Access for the given permissions to a single resource instance.
    ///
    /// The selector triple comes from the [`Resource`] implementation, the
    /// host application's resolver for its own domain types.
    pub fn for_instance(resource: &dyn Resource, permissions: &[&str]) -> Self {
        Self::single(
            Selector::instance(
                resource.namespace(),
                resource.resource_type(),
                resource.instance_id(),
            ),
            permissions,
        )
    }

    fn single(selector: Selector, permissions: &[&str]) -> Self {
        Self {
            grants: vec![Grant::new(selector, permissions.iter().copied())],
        }
    }

    /// The grant sequence.
    pub fn grants(&self) -> &[Grant] {
        &self.grants
    }

    /// True iff this scope contains no grants.
    pub fn is_empty(&self) -> bool {
        self.grants.is_empty()
    }

    /// Concatenate two scopes into a new one.
    ///
    /// No deduplication is performed; combination is associative and
    /// [`Scope::empty`] is its identity.
    pub fn combine(&self, other: &Scope) -> Scope {
        let mut grants = self.grants.clone();
        grants.extend(other.grants.iter().cloned());
        Scope { grants }
    }
}

impl Add for Scope {
    type Output = Scope;

    fn add(mut self, mut rhs: Scope) -> Scope {
        self.grants.append(&mut rhs.grants);
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::resolver::ResourceRef;

    #[test]
    fn builders_produce_expected_selectors() {
        let all = Scope::for_all(&["read"]);
        assert_eq!(all.grants()[0].selector().fields(), [None, None, None]);

        let ns = Scope::for_namespace("myapp", &["read"]);
        assert_eq!(
            ns.grants()[0].selector().fields(),
            [Some("myapp"), None, None]
        );

        let ty = Scope::for_resource_type("myapp", "testmodel", &["read"]);
        assert_eq!(
            ty.grants()[0].selector().fields(),
            [Some("myapp"), Some("testmodel"), None]
        );

        let obj = ResourceRef::new("myapp", "testmodel", "17");
        let inst = Scope::for_instance(&obj, &["read"]);
        assert_eq!(
            inst.grants()[0].selector().fields(),
            [Some("myapp"), Some("testmodel"), Some("17")]
        );
    }

    #[test]
    fn permissions_deduplicate() {
        let scope = Scope::for_all(&["read", "read", "write"]);
        assert_eq!(scope.grants()[0].permissions().len(), 2);
    }

    #[test]
    fn empty_permission_list_is_legal() {
        let scope = Scope::for_namespace("myapp", &[]);
        assert!(scope.grants()[0].permissions().is_empty());
        assert!(!scope.is_empty());
    }

    #[test]
    fn combine_concatenates_in_order() {
        let a = Scope::for_all(&["read"]);
        let b = Scope::for_namespace("myapp", &["write"]);
        let combined = a.clone() + b.clone();

        assert_eq!(combined.grants().len(), 2);
        assert_eq!(combined.grants()[0], a.grants()[0]);
        assert_eq!(combined.grants()[1], b.grants()[0]);
        assert_eq!(combined, a.combine(&b));
    }

    #[test]
    fn combine_does_not_deduplicate() {
        let a = Scope::for_all(&["read"]);
        let twice = a.clone() + a;
        assert_eq!(twice.grants().len(), 2);
    }

    #[test]
    fn empty_scope_is_combine_identity() {
        let scope = Scope::for_resource_type("myapp", "testmodel", &["read"]);
        assert_eq!(scope.clone() + Scope::empty(), scope);
        assert_eq!(Scope::empty() + scope.clone(), scope);
    }

    #[test]
    fn covers_requires_specified_fields_to_match() {
        let ns = Selector::namespace("myapp");
        let ty = Selector::resource_type("myapp", "testmodel");
        let inst = Selector::instance("myapp", "testmodel", "1");

        assert!(Selector::all().covers(&inst));
        assert!(ns.covers(&ty));
        assert!(ns.covers(&inst));
        assert!(ty.covers(&inst));
        assert!(inst.covers(&inst));

        // Specificity only flows one way.
        assert!(!inst.covers(&ty));
        assert!(!ty.covers(&ns));
        assert!(!ns.covers(&Selector::all()));
        assert!(!ns.covers(&Selector::namespace("otherapp")));
    }
}
