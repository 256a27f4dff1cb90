/// Licensed features that gate the ACL and schedule code paths.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FeatureSet {
    /// Per-template user and group grants.
    pub template_rbac: bool,
    /// Template max TTL enforcement.
    pub advanced_scheduling: bool,
}

impl FeatureSet {
    /// Every feature enabled.
    #[must_use]
    pub fn all() -> Self {
        Self {
            template_rbac: true,
            advanced_scheduling: true,
        }
    }
}

impl Default for FeatureSet {
    fn default() -> Self {
        Self::all()
    }
}
