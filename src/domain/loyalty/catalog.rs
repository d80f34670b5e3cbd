//! Reward catalog

use std::collections::HashSet;

use serde::Deserialize;

use crate::domain::loyalty::{
    errors::CatalogError,
    models::{NextReward, Reward, RewardDefinition},
};

const BUILTIN: &str = include_str!("rewards.yaml");

/// Static list of redeemable rewards, cheapest first.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct RewardCatalog {
    rewards: Vec<RewardDefinition>,
}

impl RewardCatalog {
    /// Parse a catalog from YAML.
    ///
    /// # Errors
    ///
    /// Returns a [`CatalogError`] for malformed YAML or duplicate ids.
    pub fn from_yaml(source: &str) -> Result<Self, CatalogError> {
        let mut catalog: Self = serde_norway::from_str(source)?;

        let mut seen = HashSet::new();

        if let Some(duplicate) = catalog
            .rewards
            .iter()
            .find(|reward| !seen.insert(reward.id))
        {
            return Err(CatalogError::DuplicateId(duplicate.id));
        }

        catalog
            .rewards
            .sort_by_key(|reward| (reward.points_required, reward.id));

        Ok(catalog)
    }

    /// The catalog shipped with the client.
    ///
    /// # Errors
    ///
    /// Returns a [`CatalogError`] if the embedded catalog is malformed.
    pub fn builtin() -> Result<Self, CatalogError> {
        Self::from_yaml(BUILTIN)
    }

    /// Every reward, in catalog order.
    pub fn definitions(&self) -> &[RewardDefinition] {
        &self.rewards
    }

    /// Look a reward up by id, or by name ignoring case.
    pub fn find(&self, key: &str) -> Option<&RewardDefinition> {
        let key = key.trim();

        if let Ok(id) = key.parse::<u32>() {
            return self.rewards.iter().find(|reward| reward.id == id);
        }

        self.rewards
            .iter()
            .find(|reward| reward.name.eq_ignore_ascii_case(key))
    }

    /// Every reward with availability for `balance`.
    pub fn evaluate(&self, balance: u64) -> Vec<Reward> {
        self.rewards
            .iter()
            .map(|definition| Reward::evaluate(definition, balance))
            .collect()
    }

    /// The cheapest reward `balance` cannot afford yet.
    pub fn next_reward(&self, balance: u64) -> Option<NextReward> {
        self.rewards
            .iter()
            .find(|definition| definition.points_required > balance)
            .map(|definition| NextReward {
                reward: Reward::evaluate(definition, balance),
                points_needed: definition.points_required - balance,
            })
    }
}

#[cfg(test)]
mod tests {
    use testresult::TestResult;

    use super::*;

    #[test]
    fn builtin_catalog_is_sorted_by_cost() -> TestResult {
        let catalog = RewardCatalog::builtin()?;

        let names: Vec<_> = catalog
            .definitions()
            .iter()
            .map(|reward| (reward.name.as_str(), reward.points_required))
            .collect();

        assert_eq!(
            names,
            vec![
                ("10% Discount", 30),
                ("Free Coffee", 50),
                ("Free Pastry", 75),
                ("Breakfast Special", 100),
            ]
        );

        Ok(())
    }

    #[test]
    fn availability_tracks_balance() -> TestResult {
        let catalog = RewardCatalog::builtin()?;

        let available: Vec<_> = catalog
            .evaluate(60)
            .into_iter()
            .filter(|reward| reward.is_available)
            .map(|reward| reward.name)
            .collect();

        assert_eq!(available, vec!["10% Discount", "Free Coffee"]);

        Ok(())
    }

    #[test]
    fn next_reward_is_cheapest_unaffordable() -> TestResult {
        let catalog = RewardCatalog::builtin()?;

        let next = catalog.next_reward(60).ok_or("expected a next reward")?;

        assert_eq!(next.reward.name, "Free Pastry");
        assert_eq!(next.points_needed, 15);
        assert_eq!(catalog.next_reward(100), None);

        Ok(())
    }

    #[test]
    fn find_by_id_or_name() -> TestResult {
        let catalog = RewardCatalog::builtin()?;

        assert_eq!(catalog.find("1").map(|reward| reward.points_required), Some(50));
        assert_eq!(
            catalog.find("free pastry").map(|reward| reward.id),
            Some(2)
        );
        assert_eq!(catalog.find("espresso machine"), None);

        Ok(())
    }

    #[test]
    fn duplicate_ids_are_rejected() {
        let yaml = "rewards:\n  - {id: 1, name: A, description: a, points_required: 1}\n  - {id: 1, name: B, description: b, points_required: 2}\n";

        assert!(
            matches!(RewardCatalog::from_yaml(yaml), Err(CatalogError::DuplicateId(1))),
            "expected DuplicateId"
        );
    }
}
