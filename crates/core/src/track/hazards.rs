//! Hazard storage and per-group lookup.
//!
//! Hazards live in one arena keyed by stable integer id, with a parallel
//! per-type table of ids for group queries. Visibility is the only mutable
//! state: a hazard is hidden when consumed and revealed again on race
//! reset. Storage is `Vec`-based so iteration order is identical on every
//! client.

use bincode::{Decode, Encode};
use glam::Vec3;
use serde::{Deserialize, Serialize};

/// The four hazard groups placed on a track.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Encode, Decode)]
pub enum HazardType {
    Bomb,
    Boost,
    Bumper,
    Poison,
}

impl HazardType {
    pub const ALL: [HazardType; 4] = [Self::Bomb, Self::Boost, Self::Bumper, Self::Poison];

    /// Maps one random draw in `[0, 1)` to a type via fixed cumulative bands.
    pub fn from_roll(roll: f32) -> Self {
        if roll < 0.2 {
            Self::Bomb
        } else if roll < 0.6 {
            Self::Boost
        } else if roll < 0.8 {
            Self::Bumper
        } else {
            Self::Poison
        }
    }

    fn index(self) -> usize {
        match self {
            Self::Bomb => 0,
            Self::Boost => 1,
            Self::Bumper => 2,
            Self::Poison => 3,
        }
    }
}

/// Stable identifier of a hazard within its track's arena.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Encode, Decode)]
pub struct HazardId(pub u32);

/// One placed hazard. Position is fixed at generation time.
#[derive(Debug, Clone, Serialize, Deserialize, Encode, Decode)]
pub struct Hazard {
    pub id: HazardId,
    pub hazard_type: HazardType,
    #[bincode(with_serde)]
    pub position: Vec3,
}

/// All hazards of a track plus their visibility flags.
#[derive(Debug, Clone, Default, Serialize, Deserialize, Encode, Decode)]
pub struct HazardArena {
    hazards: Vec<Hazard>,
    by_type: [Vec<HazardId>; 4],
    visible: Vec<bool>,
}

impl HazardArena {
    pub fn insert(&mut self, hazard_type: HazardType, position: Vec3) -> HazardId {
        let id = HazardId(self.hazards.len() as u32);
        self.hazards.push(Hazard {
            id,
            hazard_type,
            position,
        });
        self.by_type[hazard_type.index()].push(id);
        self.visible.push(true);
        id
    }

    pub fn len(&self) -> usize {
        self.hazards.len()
    }

    pub fn is_empty(&self) -> bool {
        self.hazards.is_empty()
    }

    pub fn get(&self, id: HazardId) -> &Hazard {
        &self.hazards[id.0 as usize]
    }

    /// Ids of one group. An absent group is simply an empty slice.
    pub fn ids_of(&self, hazard_type: HazardType) -> &[HazardId] {
        &self.by_type[hazard_type.index()]
    }

    pub fn is_visible(&self, id: HazardId) -> bool {
        self.visible[id.0 as usize]
    }

    /// Hides a consumed hazard until the next reset.
    pub fn hide(&mut self, id: HazardId) {
        self.visible[id.0 as usize] = false;
    }

    pub fn reveal_all(&mut self) {
        self.visible.fill(true);
    }

    pub fn iter(&self) -> impl Iterator<Item = &Hazard> {
        self.hazards.iter()
    }

    /// Visible hazards of one group, in placement order.
    pub fn visible_of(&self, hazard_type: HazardType) -> impl Iterator<Item = &Hazard> + '_ {
        self.ids_of(hazard_type)
            .iter()
            .filter(|id| self.is_visible(**id))
            .map(|id| self.get(*id))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn roll_bands() {
        assert_eq!(HazardType::from_roll(0.0), HazardType::Bomb);
        assert_eq!(HazardType::from_roll(0.19), HazardType::Bomb);
        assert_eq!(HazardType::from_roll(0.2), HazardType::Boost);
        assert_eq!(HazardType::from_roll(0.59), HazardType::Boost);
        assert_eq!(HazardType::from_roll(0.6), HazardType::Bumper);
        assert_eq!(HazardType::from_roll(0.79), HazardType::Bumper);
        assert_eq!(HazardType::from_roll(0.8), HazardType::Poison);
        assert_eq!(HazardType::from_roll(0.999), HazardType::Poison);
    }

    #[test]
    fn arena_groups_and_visibility() {
        let mut arena = HazardArena::default();
        let a = arena.insert(HazardType::Bomb, Vec3::ZERO);
        let b = arena.insert(HazardType::Boost, Vec3::X);
        let c = arena.insert(HazardType::Bomb, Vec3::Z);

        assert_eq!(arena.len(), 3);
        assert_eq!(arena.ids_of(HazardType::Bomb), &[a, c]);
        assert_eq!(arena.ids_of(HazardType::Boost), &[b]);
        assert!(arena.ids_of(HazardType::Poison).is_empty());

        arena.hide(a);
        assert!(!arena.is_visible(a));
        assert_eq!(arena.visible_of(HazardType::Bomb).count(), 1);

        arena.reveal_all();
        assert!(arena.is_visible(a));
        assert_eq!(arena.visible_of(HazardType::Bomb).count(), 2);
    }
}
