//! Wire model and compaction plugin chain
//!
//! A scope crosses the wire as a JSON sequence of `[selector, permissions]`
//! pairs, each field either a string (uncompacted) or an integer id assigned
//! by an external lookup table. Compaction behaviors compose as an ordered
//! chain of [`CompactionPlugin`]s: encode runs the chain front to back,
//! decode runs it back to front, and every plugin contributes a fragment to
//! the composite protocol version that ends up in the signing salt.
//!
//! Encode is infallible: a field the active tables do not know stays in its
//! uncompacted textual form. Decode is not: an integer id a plugin owns but
//! cannot resolve is a fatal [`TokenError::UnresolvableId`], never a guessed
//! selector.

use crate::error::TokenError;
use crate::tables::{PermissionTable, TypeTable};
use scopeseal_core::{Grant, Scope, Selector};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tracing::debug;

/// Version fragment contributed by the bare (plugin-free) scope encoding.
pub const SCOPE_PROTOCOL_VERSION: &str = "1.0.0";

/// One selector or permission field on the wire.
///
/// Serializes untagged, so JSON carries a bare number for compacted ids and
/// a bare string otherwise — mixed forms within one selector are legal.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum WireField {
    /// A compacted integer id owned by some plugin's lookup table.
    Id(u64),
    /// An uncompacted textual field.
    Text(String),
}

/// One grant on the wire: selector fields, then permission fields.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct WireGrant(pub Vec<WireField>, pub Vec<WireField>);

/// A whole scope on the wire.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct WireScope(pub Vec<WireGrant>);

/// A composable scope-compaction behavior.
///
/// Default methods pass fields through untouched, so a plugin only overrides
/// the capability it actually provides.
pub trait CompactionPlugin: Send + Sync {
    /// Fragment mixed into the composite protocol version, and therefore
    /// into the signing salt. Changing a plugin's wire behavior must change
    /// its fragment.
    fn protocol_fragment(&self) -> &str;

    /// Shrink a selector's field list where possible.
    fn encode_selector(&self, fields: Vec<WireField>) -> Vec<WireField> {
        fields
    }

    /// Reverse [`CompactionPlugin::encode_selector`].
    fn decode_selector(&self, fields: Vec<WireField>) -> Result<Vec<WireField>, TokenError> {
        Ok(fields)
    }

    /// Shrink a single permission field where possible.
    fn encode_permission(&self, permission: WireField) -> WireField {
        permission
    }

    /// Reverse [`CompactionPlugin::encode_permission`].
    fn decode_permission(&self, permission: WireField) -> Result<WireField, TokenError> {
        Ok(permission)
    }
}

/// Replaces a selector's leading `(namespace, resource_type)` text pair with
/// a single integer id from a [`TypeTable`].
///
/// The instance id field is never compacted, so encoded selectors routinely
/// mix an id with trailing text.
pub struct TypeCompaction {
    table: Arc<dyn TypeTable>,
}

impl TypeCompaction {
    /// Compact types through the given table.
    pub fn new(table: Arc<dyn TypeTable>) -> Self {
        Self { table }
    }
}

impl CompactionPlugin for TypeCompaction {
    fn protocol_fragment(&self) -> &str {
        "types.1"
    }

    fn encode_selector(&self, fields: Vec<WireField>) -> Vec<WireField> {
        if let [WireField::Text(ns), WireField::Text(ty), rest @ ..] = fields.as_slice() {
            match self.table.type_to_id(ns, ty) {
                Some(id) => {
                    let mut out = Vec::with_capacity(rest.len() + 1);
                    out.push(WireField::Id(id));
                    out.extend(rest.iter().cloned());
                    return out;
                }
                None => {
                    debug!(
                        namespace = %ns,
                        resource_type = %ty,
                        "type not in compaction table, leaving selector uncompacted"
                    );
                }
            }
        }
        fields
    }

    fn decode_selector(&self, fields: Vec<WireField>) -> Result<Vec<WireField>, TokenError> {
        if let [WireField::Id(id), rest @ ..] = fields.as_slice() {
            let (ns, ty) = self
                .table
                .id_to_type(*id)
                .ok_or(TokenError::UnresolvableId { id: *id })?;
            let mut out = Vec::with_capacity(rest.len() + 2);
            out.push(WireField::Text(ns));
            out.push(WireField::Text(ty));
            out.extend(rest.iter().cloned());
            return Ok(out);
        }
        Ok(fields)
    }
}

/// Replaces known permission identifiers with integer ids from a
/// [`PermissionTable`]. Unknown permissions stay textual.
pub struct PermissionCompaction {
    table: Arc<dyn PermissionTable>,
}

impl PermissionCompaction {
    /// Compact permissions through the given table.
    pub fn new(table: Arc<dyn PermissionTable>) -> Self {
        Self { table }
    }
}

impl CompactionPlugin for PermissionCompaction {
    fn protocol_fragment(&self) -> &str {
        "perms.1"
    }

    fn encode_permission(&self, permission: WireField) -> WireField {
        if let WireField::Text(name) = &permission {
            if let Some(id) = self.table.permission_to_id(name) {
                return WireField::Id(id);
            }
            debug!(permission = %name, "permission not in compaction table, leaving uncompacted");
        }
        permission
    }

    fn decode_permission(&self, permission: WireField) -> Result<WireField, TokenError> {
        match permission {
            WireField::Id(id) => self
                .table
                .id_to_permission(id)
                .map(WireField::Text)
                .ok_or(TokenError::UnresolvableId { id }),
            text => Ok(text),
        }
    }
}

/// An ordered chain of compaction plugins.
///
/// Encoding applies plugins in declaration order, decoding in reverse, so
/// each plugin always sees the representation it produced.
#[derive(Default)]
pub struct CompactionChain {
    plugins: Vec<Box<dyn CompactionPlugin>>,
}

impl CompactionChain {
    /// Chain with no plugins: the plain textual encoding.
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a plugin to the end of the chain.
    pub fn push(&mut self, plugin: Box<dyn CompactionPlugin>) {
        self.plugins.push(plugin);
    }

    /// Composite protocol version: the bare encoding's version plus each
    /// plugin's fragment, in chain order.
    ///
    /// Two codecs validate each other's tokens only when this string (and
    /// therefore the signing salt) matches exactly.
    pub fn protocol_version(&self) -> String {
        let mut parts = vec![SCOPE_PROTOCOL_VERSION.to_string()];
        parts.extend(
            self.plugins
                .iter()
                .map(|plugin| plugin.protocol_fragment().to_string()),
        );
        parts.join("+")
    }

    /// Encode a scope into its wire form through the whole chain.
    pub fn encode_scope(&self, scope: &Scope) -> WireScope {
        WireScope(
            scope
                .grants()
                .iter()
                .map(|grant| self.encode_grant(grant))
                .collect(),
        )
    }

    /// Decode a wire scope back into a value scope through the whole chain,
    /// in reverse order.
    pub fn decode_scope(&self, wire: &WireScope) -> Result<Scope, TokenError> {
        let grants = wire
            .0
            .iter()
            .map(|grant| self.decode_grant(grant))
            .collect::<Result<Vec<_>, _>>()?;
        Ok(Scope::from_grants(grants))
    }

    fn encode_grant(&self, grant: &Grant) -> WireGrant {
        // Bare encoding: the specified selector prefix and sorted permission
        // names, all textual.
        let mut selector: Vec<WireField> = grant
            .selector()
            .fields()
            .iter()
            .flatten()
            .map(|field| WireField::Text(field.to_string()))
            .collect();
        let mut permissions: Vec<WireField> = grant
            .permissions()
            .iter()
            .map(|permission| WireField::Text(permission.clone()))
            .collect();

        for plugin in &self.plugins {
            selector = plugin.encode_selector(selector);
            permissions = permissions
                .into_iter()
                .map(|permission| plugin.encode_permission(permission))
                .collect();
        }
        WireGrant(selector, permissions)
    }

    fn decode_grant(&self, grant: &WireGrant) -> Result<Grant, TokenError> {
        let mut selector = grant.0.clone();
        let mut permissions = grant.1.clone();

        for plugin in self.plugins.iter().rev() {
            selector = plugin.decode_selector(selector)?;
            permissions = permissions
                .into_iter()
                .map(|permission| plugin.decode_permission(permission))
                .collect::<Result<Vec<_>, _>>()?;
        }

        let fields: Vec<String> = selector.into_iter().map(WireField::into_text).collect();
        let names = permissions.into_iter().map(WireField::into_text);
        Ok(Grant::new(selector_from_fields(&fields)?, names))
    }
}

impl WireField {
    /// Textual form of a fully decoded field. Ids that survive the chain
    /// (a token issued without the plugin that owns them) fall back to their
    /// decimal rendering; the composite salt keeps honestly issued tokens
    /// from ever reaching this case.
    fn into_text(self) -> String {
        match self {
            WireField::Text(text) => text,
            WireField::Id(id) => id.to_string(),
        }
    }
}

fn selector_from_fields(fields: &[String]) -> Result<Selector, TokenError> {
    match fields {
        [] => Ok(Selector::all()),
        [ns] => Ok(Selector::namespace(ns.clone())),
        [ns, ty] => Ok(Selector::resource_type(ns.clone(), ty.clone())),
        [ns, ty, id] => Ok(Selector::instance(ns.clone(), ty.clone(), id.clone())),
        _ => Err(TokenError::Malformed),
    }
}
