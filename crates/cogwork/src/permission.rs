//! Permission policies for command gating.

use cogwork_core::Principal;

/// Capability check applied to the invoking principal before a command runs.
///
/// The variant set is deliberately closed: a command either accepts every
/// principal or requires a fixed list of named platform permissions. There
/// are no deny-list semantics: a principal passes [`RequireAll`] exactly
/// when it holds every named permission.
///
/// [`RequireAll`]: PermissionPolicy::RequireAll
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PermissionPolicy {
    /// Every principal passes.
    AcceptAll,
    /// Passes only principals holding *all* of the named permissions.
    RequireAll(Vec<String>),
}

impl PermissionPolicy {
    /// Builds the named-permission-set variant from any iterator of names.
    pub fn require<I, S>(names: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self::RequireAll(names.into_iter().map(Into::into).collect())
    }

    /// Checks this policy against a principal.
    pub fn allows(&self, principal: &dyn Principal) -> bool {
        match self {
            Self::AcceptAll => true,
            Self::RequireAll(names) => names.iter().all(|name| principal.has_capability(name)),
        }
    }
}
