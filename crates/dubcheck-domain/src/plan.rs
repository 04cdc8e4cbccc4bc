//! Plan tiers and the catalog that holds them

/// Name of the tier every unknown or missing plan name resolves to
pub const DEFAULT_PLAN: &str = "free";

/// A named bundle of entitlements
///
/// Tiers are immutable once the catalog is built. Family tiers only carry
/// `max_family_members` as metadata; membership is not enforced.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PlanTier {
    /// Plan name (e.g. "free", "family_pro")
    pub name: String,

    /// Credits granted at every weekly reset
    pub weekly_credits: u32,

    /// Whether requests get priority processing
    pub priority_processing: bool,

    /// Whether video analysis is included
    pub video_analysis: bool,

    /// Number of accounts the plan may cover
    pub max_family_members: u32,
}

impl PlanTier {
    /// Create a tier
    pub fn new(
        name: impl Into<String>,
        weekly_credits: u32,
        priority_processing: bool,
        video_analysis: bool,
        max_family_members: u32,
    ) -> Self {
        Self {
            name: name.into(),
            weekly_credits,
            priority_processing,
            video_analysis,
            max_family_members,
        }
    }
}

/// Read-only table of plan tiers
///
/// Built once at startup and passed to the components that need it. Lookups
/// never fail: an unknown name yields the free tier.
#[derive(Debug, Clone)]
pub struct PlanCatalog {
    tiers: Vec<PlanTier>,
}

impl PlanCatalog {
    /// The five tiers DubCheck ships with
    ///
    /// # Examples
    ///
    /// ```
    /// use dubcheck_domain::PlanCatalog;
    ///
    /// let catalog = PlanCatalog::standard();
    /// assert_eq!(catalog.lookup("premium").weekly_credits, 500);
    /// assert_eq!(catalog.lookup("nonsense").name, "free");
    /// ```
    pub fn standard() -> Self {
        Self {
            tiers: vec![
                PlanTier::new(DEFAULT_PLAN, 30, false, false, 1),
                PlanTier::new("pro", 100, true, false, 1),
                PlanTier::new("premium", 500, true, true, 1),
                PlanTier::new("family_pro", 100, true, false, 3),
                PlanTier::new("family_premium", 500, true, true, 5),
            ],
        }
    }

    /// Build a catalog from custom tiers
    ///
    /// A free tier is appended if the list does not contain one, so that
    /// [`lookup`](Self::lookup) always has somewhere to fall back to.
    pub fn from_tiers(mut tiers: Vec<PlanTier>) -> Self {
        if !tiers.iter().any(|t| t.name == DEFAULT_PLAN) {
            tiers.push(PlanTier::new(DEFAULT_PLAN, 30, false, false, 1));
        }
        Self { tiers }
    }

    /// Look up a tier by name, falling back to the free tier
    pub fn lookup(&self, name: &str) -> &PlanTier {
        self.get(name).unwrap_or_else(|| self.free())
    }

    /// Look up a tier by exact name
    pub fn get(&self, name: &str) -> Option<&PlanTier> {
        self.tiers.iter().find(|t| t.name == name)
    }

    /// The fallback tier
    pub fn free(&self) -> &PlanTier {
        // from_tiers and standard both guarantee the free tier exists
        self.tiers
            .iter()
            .find(|t| t.name == DEFAULT_PLAN)
            .unwrap_or(&self.tiers[0])
    }

    /// All tiers in catalog order
    pub fn tiers(&self) -> &[PlanTier] {
        &self.tiers
    }
}

impl Default for PlanCatalog {
    fn default() -> Self {
        Self::standard()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_standard_tiers() {
        let catalog = PlanCatalog::standard();
        let expected = [
            ("free", 30, false, false, 1),
            ("pro", 100, true, false, 1),
            ("premium", 500, true, true, 1),
            ("family_pro", 100, true, false, 3),
            ("family_premium", 500, true, true, 5),
        ];

        assert_eq!(catalog.tiers().len(), expected.len());
        for (name, credits, priority, video, members) in expected {
            let tier = catalog.lookup(name);
            assert_eq!(tier.name, name);
            assert_eq!(tier.weekly_credits, credits);
            assert_eq!(tier.priority_processing, priority);
            assert_eq!(tier.video_analysis, video);
            assert_eq!(tier.max_family_members, members);
        }
    }

    #[test]
    fn test_unknown_plan_falls_back_to_free() {
        let catalog = PlanCatalog::standard();
        assert_eq!(catalog.lookup("enterprise").name, "free");
        assert_eq!(catalog.lookup("").name, "free");
        assert!(catalog.get("enterprise").is_none());
    }

    #[test]
    fn test_custom_catalog_gains_free_tier() {
        let catalog = PlanCatalog::from_tiers(vec![PlanTier::new("gold", 1000, true, true, 1)]);
        assert_eq!(catalog.tiers().len(), 2);
        assert_eq!(catalog.lookup("missing").weekly_credits, 30);
        assert_eq!(catalog.lookup("gold").weekly_credits, 1000);
    }
}
