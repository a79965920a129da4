//! Hierarchical subset-check engine
//!
//! Decides whether every grant a caller requests is covered by the grants a
//! token actually carries. Selector coverage follows the fixed-length
//! wildcard rule ([`Selector::covers`]); permission coverage accumulates
//! across every covering grant, so permissions satisfied by different grants
//! of the granted scope all count toward one requested grant.

use crate::scope::{Grant, Scope};
use std::collections::BTreeSet;

/// Returns true iff every grant in `requested` is covered by `granted`.
///
/// For each requested grant, the union of the permission sets of all granted
/// grants whose selector covers the requested selector must contain the
/// requested permissions. A requested grant with an empty permission set is
/// vacuously authorized, and an empty requested scope is always authorized.
///
/// Pure and deterministic: the result is independent of grant order on
/// either side, and no I/O is performed.
pub fn is_authorized(requested: &Scope, granted: &Scope) -> bool {
    requested
        .grants()
        .iter()
        .all(|grant| grant_is_covered(grant, granted))
}

fn grant_is_covered(requested: &Grant, granted: &Scope) -> bool {
    let mut required: BTreeSet<&str> = requested
        .permissions()
        .iter()
        .map(String::as_str)
        .collect();
    if required.is_empty() {
        return true;
    }

    for parent in granted.grants() {
        if !parent.selector().covers(requested.selector()) {
            continue;
        }
        for permission in parent.permissions() {
            required.remove(permission.as_str());
        }
        if required.is_empty() {
            return true;
        }
    }

    required.is_empty()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::resolver::ResourceRef;
    use crate::scope::Scope;

    fn obj1() -> ResourceRef {
        ResourceRef::new("myapp", "testmodel", "1")
    }

    fn obj2() -> ResourceRef {
        ResourceRef::new("myapp", "testmodel2", "1")
    }

    #[test]
    fn permission_grants() {
        // Asking for no permissions.
        assert!(is_authorized(&Scope::for_all(&[]), &Scope::for_all(&[])));
        assert!(is_authorized(&Scope::for_all(&[]), &Scope::for_all(&["read"])));

        // Asking for read.
        assert!(!is_authorized(&Scope::for_all(&["read"]), &Scope::for_all(&[])));
        assert!(is_authorized(
            &Scope::for_all(&["read"]),
            &Scope::for_all(&["read"])
        ));
        assert!(is_authorized(
            &Scope::for_all(&["read"]),
            &Scope::for_all(&["read", "write"])
        ));

        // Asking for read and write.
        assert!(!is_authorized(
            &Scope::for_all(&["read", "write"]),
            &Scope::for_all(&[])
        ));
        assert!(!is_authorized(
            &Scope::for_all(&["read", "write"]),
            &Scope::for_all(&["read"])
        ));
        assert!(is_authorized(
            &Scope::for_all(&["read", "write"]),
            &Scope::for_all(&["read", "write"])
        ));
    }

    #[test]
    fn empty_requested_scope_is_always_authorized() {
        assert!(is_authorized(&Scope::empty(), &Scope::empty()));
        assert!(is_authorized(&Scope::empty(), &Scope::for_all(&["read"])));
        assert!(is_authorized(
            &Scope::empty(),
            &Scope::for_instance(&obj1(), &["read"])
        ));
    }

    #[test]
    fn zero_permission_requests_need_no_parent() {
        // Access to a selector with no permissions is vacuously granted,
        // even by an empty parent scope.
        assert!(is_authorized(&Scope::for_all(&[]), &Scope::empty()));
        assert!(is_authorized(
            &Scope::for_all(&[]),
            &Scope::for_instance(&obj1(), &["read"])
        ));
        assert!(is_authorized(
            &Scope::for_namespace("myapp", &[]),
            &Scope::empty()
        ));
    }

    #[test]
    fn empty_granted_scope_denies_permission_requests() {
        assert!(!is_authorized(&Scope::for_all(&["read"]), &Scope::empty()));
        assert!(!is_authorized(
            &Scope::for_instance(&obj1(), &["read"]),
            &Scope::empty()
        ));
        assert!(!is_authorized(
            &Scope::for_namespace("myapp", &["read"]),
            &Scope::empty()
        ));
    }

    #[test]
    fn instance_requests_follow_the_hierarchy() {
        let requested = Scope::for_instance(&obj1(), &["read"]);

        assert!(is_authorized(&requested, &Scope::for_all(&["read"])));
        assert!(is_authorized(
            &requested,
            &Scope::for_namespace("myapp", &["read"])
        ));
        assert!(is_authorized(
            &requested,
            &Scope::for_resource_type("myapp", "testmodel", &["read"])
        ));
        assert!(is_authorized(
            &requested,
            &Scope::for_instance(&obj1(), &["read"])
        ));

        // Different instance, type or namespace does not cover.
        assert!(!is_authorized(
            &requested,
            &Scope::for_instance(&ResourceRef::new("myapp", "testmodel", "2"), &["read"])
        ));
        assert!(!is_authorized(
            &requested,
            &Scope::for_resource_type("myapp", "testmodel2", &["read"])
        ));
        assert!(!is_authorized(
            &requested,
            &Scope::for_namespace("otherapp", &["read"])
        ));
    }

    #[test]
    fn resource_type_requests_follow_the_hierarchy() {
        let requested = Scope::for_resource_type("myapp", "testmodel", &["read"]);

        assert!(is_authorized(&requested, &Scope::for_all(&["read"])));
        assert!(is_authorized(
            &requested,
            &Scope::for_namespace("myapp", &["read"])
        ));
        assert!(is_authorized(
            &requested,
            &Scope::for_resource_type("myapp", "testmodel", &["read"])
        ));

        // An instance-level parent never covers a type-level request.
        assert!(!is_authorized(
            &requested,
            &Scope::for_instance(&obj1(), &["read"])
        ));
    }

    #[test]
    fn namespace_requests_follow_the_hierarchy() {
        let requested = Scope::for_namespace("myapp", &["read"]);

        assert!(is_authorized(&requested, &Scope::for_all(&["read"])));
        assert!(is_authorized(
            &requested,
            &Scope::for_namespace("myapp", &["read"])
        ));

        assert!(!is_authorized(
            &requested,
            &Scope::for_resource_type("myapp", "testmodel", &["read"])
        ));
        assert!(!is_authorized(
            &requested,
            &Scope::for_instance(&obj1(), &["read"])
        ));
    }

    #[test]
    fn global_requests_need_a_global_parent() {
        let requested = Scope::for_all(&["read"]);

        assert!(is_authorized(&requested, &Scope::for_all(&["read"])));
        assert!(!is_authorized(
            &requested,
            &Scope::for_namespace("myapp", &["read"])
        ));
        assert!(!is_authorized(
            &requested,
            &Scope::for_resource_type("myapp", "testmodel", &["read"])
        ));
        assert!(!is_authorized(
            &requested,
            &Scope::for_instance(&obj1(), &["read"])
        ));
    }

    #[test]
    fn permissions_accumulate_across_covering_grants() {
        // Neither parent grant alone carries both permissions for obj1, but
        // their union does.
        let requested = Scope::for_instance(&obj1(), &["read", "write"]);
        let granted = Scope::for_resource_type("myapp", "testmodel", &["write"])
            + Scope::for_all(&["read"]);

        assert!(is_authorized(&requested, &granted));
        assert!(!is_authorized(
            &requested,
            &Scope::for_resource_type("myapp", "testmodel", &["write"])
        ));
    }

    #[test]
    fn combined_requests_check_every_grant() {
        let requested =
            Scope::for_instance(&obj1(), &["read"]) + Scope::for_instance(&obj2(), &["read"]);
        assert!(is_authorized(&requested, &Scope::for_all(&["read"])));

        // One new permission on one grant breaks the whole request.
        let escalated = Scope::for_instance(&obj1(), &["read", "write"])
            + Scope::for_instance(&obj2(), &["read"]);
        assert!(!is_authorized(&escalated, &Scope::for_all(&["read"])));
    }

    #[test]
    fn kitchen_sink() {
        let requested = Scope::for_instance(&obj1(), &["read", "write"])
            + Scope::for_instance(&obj2(), &["read", "write"]);

        // Two type-level grants cover both instances.
        let granted = Scope::for_resource_type("myapp", "testmodel", &["read", "write"])
            + Scope::for_resource_type("myapp", "testmodel2", &["read", "write"]);
        assert!(is_authorized(&requested, &granted));

        // Access was never granted to the second type.
        let granted = Scope::for_resource_type("myapp", "testmodel", &["read", "write"]);
        assert!(!is_authorized(&requested, &granted));

        // A namespace-wide grant gives it back.
        let granted = Scope::for_resource_type("myapp", "testmodel", &["read", "write"])
            + Scope::for_namespace("myapp", &["read", "write"]);
        assert!(is_authorized(&requested, &granted));
    }
}
