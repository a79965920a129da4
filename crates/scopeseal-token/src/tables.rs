//! Compaction lookup tables
//!
//! Compaction maps selector and permission fields to small integer ids using
//! tables owned by the host application (originally an ORM's content-type and
//! permission registries). The traits here are the narrow seam; the in-memory
//! implementations suit tests and applications whose tables fit in memory.
//!
//! Tables are read-only once built, which is what makes the plugin chain safe
//! for unrestricted concurrent use.

use std::collections::BTreeMap;

/// Maps `(namespace, resource_type)` pairs to integer ids and back.
pub trait TypeTable: Send + Sync {
    /// The id for a known pair, or `None` when the table has no entry.
    fn type_to_id(&self, namespace: &str, resource_type: &str) -> Option<u64>;

    /// The pair for a known id, or `None` when the table has no entry.
    fn id_to_type(&self, id: u64) -> Option<(String, String)>;
}

/// Maps permission identifiers to integer ids and back.
pub trait PermissionTable: Send + Sync {
    /// The id for a known permission, or `None` when the table has no entry.
    fn permission_to_id(&self, permission: &str) -> Option<u64>;

    /// The permission for a known id, or `None` when the table has no entry.
    fn id_to_permission(&self, id: u64) -> Option<String>;
}

/// `BTreeMap`-backed [`TypeTable`], immutable after construction.
#[derive(Debug, Clone, Default)]
pub struct MemoryTypeTable {
    by_name: BTreeMap<(String, String), u64>,
    by_id: BTreeMap<u64, (String, String)>,
}

impl MemoryTypeTable {
    /// Empty table.
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a `(namespace, resource_type)` pair under an id. Reusing an
    /// id or a pair replaces the previous entry.
    pub fn insert(
        &mut self,
        id: u64,
        namespace: impl Into<String>,
        resource_type: impl Into<String>,
    ) {
        let pair = (namespace.into(), resource_type.into());
        self.by_name.insert(pair.clone(), id);
        self.by_id.insert(id, pair);
    }
}

impl TypeTable for MemoryTypeTable {
    fn type_to_id(&self, namespace: &str, resource_type: &str) -> Option<u64> {
        self.by_name
            .get(&(namespace.to_string(), resource_type.to_string()))
            .copied()
    }

    fn id_to_type(&self, id: u64) -> Option<(String, String)> {
        self.by_id.get(&id).cloned()
    }
}

/// `BTreeMap`-backed [`PermissionTable`], immutable after construction.
#[derive(Debug, Clone, Default)]
pub struct MemoryPermissionTable {
    by_name: BTreeMap<String, u64>,
    by_id: BTreeMap<u64, String>,
}

impl MemoryPermissionTable {
    /// Empty table.
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a permission under an id. Reusing an id or a permission
    /// replaces the previous entry.
    pub fn insert(&mut self, id: u64, permission: impl Into<String>) {
        let permission = permission.into();
        self.by_name.insert(permission.clone(), id);
        self.by_id.insert(id, permission);
    }
}

impl PermissionTable for MemoryPermissionTable {
    fn permission_to_id(&self, permission: &str) -> Option<u64> {
        self.by_name.get(permission).copied()
    }

    fn id_to_permission(&self, id: u64) -> Option<String> {
        self.by_id.get(&id).cloned()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn type_table_round_trips() {
        let mut table = MemoryTypeTable::new();
        table.insert(7, "myapp", "testmodel");

        assert_eq!(table.type_to_id("myapp", "testmodel"), Some(7));
        assert_eq!(
            table.id_to_type(7),
            Some(("myapp".to_string(), "testmodel".to_string()))
        );
        assert_eq!(table.type_to_id("myapp", "other"), None);
        assert_eq!(table.id_to_type(8), None);
    }

    #[test]
    fn permission_table_round_trips() {
        let mut table = MemoryPermissionTable::new();
        table.insert(3, "auth.change_permission");

        assert_eq!(table.permission_to_id("auth.change_permission"), Some(3));
        assert_eq!(
            table.id_to_permission(3),
            Some("auth.change_permission".to_string())
        );
        assert_eq!(table.permission_to_id("read"), None);
    }
}
