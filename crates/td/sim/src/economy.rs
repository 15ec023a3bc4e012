//! Shared resource ledger: gold, wood, metal and the base health pool.

use td_types::ResourceCost;

#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord)]
pub enum Resource {
    Gold,
    Wood,
    Metal,
    Health,
}

/// Amounts are unsigned; a spend either succeeds in full or leaves the
/// ledger untouched.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct Resources {
    gold: u32,
    wood: u32,
    metal: u32,
    health: u32,
}

impl Resources {
    pub fn new(gold: u32, wood: u32, metal: u32, health: u32) -> Self {
        Self {
            gold,
            wood,
            metal,
            health,
        }
    }

    pub fn get(&self, resource: Resource) -> u32 {
        match resource {
            Resource::Gold => self.gold,
            Resource::Wood => self.wood,
            Resource::Metal => self.metal,
            Resource::Health => self.health,
        }
    }

    pub fn add(&mut self, resource: Resource, amount: u32) {
        let slot = self.slot_mut(resource);
        *slot = slot.saturating_add(amount);
    }

    /// All-or-nothing single-resource spend.
    pub fn spend(&mut self, resource: Resource, amount: u32) -> bool {
        let slot = self.slot_mut(resource);
        if *slot < amount {
            return false;
        }
        *slot -= amount;
        true
    }

    /// Removes up to `amount`, flooring at zero. Used for base damage,
    /// which must land even when it exceeds the remaining pool.
    pub fn deduct(&mut self, resource: Resource, amount: u32) {
        let slot = self.slot_mut(resource);
        *slot = slot.saturating_sub(amount);
    }

    pub fn can_afford(&self, cost: &ResourceCost) -> bool {
        self.gold >= cost.gold && self.wood >= cost.wood && self.metal >= cost.metal
    }

    /// Atomic multi-resource spend: checks everything first, then debits.
    pub fn spend_multiple(&mut self, cost: &ResourceCost) -> bool {
        if !self.can_afford(cost) {
            return false;
        }
        self.gold -= cost.gold;
        self.wood -= cost.wood;
        self.metal -= cost.metal;
        true
    }

    fn slot_mut(&mut self, resource: Resource) -> &mut u32 {
        match resource {
            Resource::Gold => &mut self.gold,
            Resource::Wood => &mut self.wood,
            Resource::Metal => &mut self.metal,
            Resource::Health => &mut self.health,
        }
    }
}

impl Resource {
    /// Parses the resource names used by factory presets.
    pub fn from_name(name: &str) -> Option<Self> {
        match name {
            "gold" => Some(Self::Gold),
            "wood" => Some(Self::Wood),
            "metal" => Some(Self::Metal),
            "health" => Some(Self::Health),
            _ => None,
        }
    }
}

/// A built production facility. Factories pay out when a wave is
/// completed, never mid-wave.
#[derive(Clone, Debug)]
pub struct Factory {
    pub preset: String,
    pub resource: Resource,
    pub payout_per_wave: u32,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn spend_multiple_is_atomic() {
        let mut resources = Resources::new(100, 5, 0, 50);
        let cost = ResourceCost {
            gold: 50,
            wood: 10,
            metal: 0,
        };
        assert!(!resources.spend_multiple(&cost));
        assert_eq!(resources.get(Resource::Gold), 100);
        assert_eq!(resources.get(Resource::Wood), 5);

        let affordable = ResourceCost {
            gold: 50,
            wood: 5,
            metal: 0,
        };
        assert!(resources.spend_multiple(&affordable));
        assert_eq!(resources.get(Resource::Gold), 50);
        assert_eq!(resources.get(Resource::Wood), 0);
    }

    #[test]
    fn deduct_floors_at_zero() {
        let mut resources = Resources::new(0, 0, 0, 7);
        resources.deduct(Resource::Health, 10);
        assert_eq!(resources.get(Resource::Health), 0);
    }

    #[test]
    fn spend_rejects_insufficient() {
        let mut resources = Resources::new(10, 0, 0, 100);
        assert!(!resources.spend(Resource::Gold, 11));
        assert_eq!(resources.get(Resource::Gold), 10);
        assert!(resources.spend(Resource::Gold, 10));
        assert_eq!(resources.get(Resource::Gold), 0);
    }
}
