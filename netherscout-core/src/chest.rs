//! Chest validity rules per bastion variant.
//!
//! Only some chests of a generated bastion are worth counting: the ones a
//! runner actually reaches on the standard route for that layout. Which ones
//! those are depends on the variant and, for housing units, on where the
//! rotated template puts its pair of double chests.

use serde::{Deserialize, Serialize};

use crate::loot::ItemStack;
use crate::pos::{BlockPos, Direction, Rotation};

/// Layout family of a generated bastion.
#[derive(Debug, Clone, Copy, Hash, Eq, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BastionType {
    #[serde(alias = "TREASURE")]
    Treasure,
    #[serde(alias = "BRIDGE")]
    Bridge,
    #[serde(alias = "STABLES")]
    Stables,
    #[serde(alias = "HOUSING")]
    Housing,
}

impl BastionType {
    pub const ALL: [BastionType; 4] = [
        BastionType::Treasure,
        BastionType::Bridge,
        BastionType::Stables,
        BastionType::Housing,
    ];
}

/// A chest as reported by the structure generator.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LootChest {
    pub pos: BlockPos,
    #[serde(default)]
    pub items: Vec<ItemStack>,
}

/// A fully materialized bastion: its layout family, anchor and chests.
#[derive(Debug, Clone, PartialEq)]
pub struct Bastion {
    pub variant: BastionType,
    pub origin: BlockPos,
    pub rotation: Rotation,
    pub chests: Vec<LootChest>,
}

impl Bastion {
    /// One immutable classifier input per chest.
    pub fn chest_records(&self) -> impl Iterator<Item = ChestRecord<'_>> {
        self.chests.iter().map(|chest| ChestRecord {
            position: chest.pos,
            structure_origin: self.origin,
            structure_rotation: self.rotation,
            items: &chest.items,
        })
    }
}

/// The chest under test together with the structure context it sits in.
#[derive(Debug, Clone, Copy)]
pub struct ChestRecord<'a> {
    pub position: BlockPos,
    pub structure_origin: BlockPos,
    pub structure_rotation: Rotation,
    pub items: &'a [ItemStack],
}

/// Which stables altitudes count.
#[derive(Debug, Clone, Copy, Eq, PartialEq, Default)]
pub enum StablesRule {
    /// Ground floor, mid ramp and top chests: y in {35, 58, 72}.
    #[default]
    Standard,
    /// Ground floor and top chests only: y in {35, 72}.
    Strict,
}

impl StablesRule {
    pub fn altitudes(self) -> &'static [i32] {
        match self {
            StablesRule::Standard => &[35, 58, 72],
            StablesRule::Strict => &[35, 72],
        }
    }
}

const TREASURE_CHEST_Y: i32 = 82;
const HOUSING_TOP_CHEST_Y: i32 = 73;
const HOUSING_DOUBLE_CHEST_Y: i32 = 36;

#[derive(Debug, Clone, Copy, Default)]
pub struct ChestClassifier {
    pub stables: StablesRule,
}

impl ChestClassifier {
    pub fn new(stables: StablesRule) -> Self {
        Self { stables }
    }

    pub fn is_valid(&self, variant: BastionType, chest: &ChestRecord<'_>) -> bool {
        let y = chest.position.y;
        match variant {
            BastionType::Treasure => y == TREASURE_CHEST_Y,
            BastionType::Bridge => true,
            BastionType::Stables => self.stables.altitudes().contains(&y),
            BastionType::Housing => {
                y == HOUSING_TOP_CHEST_Y
                    || (y == HOUSING_DOUBLE_CHEST_Y && is_housing_double_chest(chest))
            }
        }
    }
}

/// Classifies with the standard stables rule.
pub fn is_valid(variant: BastionType, chest: &ChestRecord<'_>) -> bool {
    ChestClassifier::default().is_valid(variant, chest)
}

/// The two halves of the lower double chest in a housing unit.
///
/// They sit 20 blocks towards the template's south and 6 to its clockwise
/// side, whatever rotation the template was placed with.
pub fn housing_double_chest_slots(origin: BlockPos, rotation: Rotation) -> [BlockPos; 2] {
    let towards = rotation.rotate(Direction::South);
    let first = origin
        .relative(towards, 20)
        .relative(towards.clockwise(), 6);
    [first, first.relative(towards, 1)]
}

fn is_housing_double_chest(chest: &ChestRecord<'_>) -> bool {
    housing_double_chest_slots(chest.structure_origin, chest.structure_rotation)
        .iter()
        .any(|slot| slot.same_column(&chest.position))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn record(position: BlockPos, rotation: Rotation) -> ChestRecord<'static> {
        ChestRecord {
            position,
            structure_origin: BlockPos::new(0, 0, 0),
            structure_rotation: rotation,
            items: &[],
        }
    }

    fn at_y(y: i32) -> ChestRecord<'static> {
        record(BlockPos::new(5, y, 5), Rotation::None)
    }

    #[test]
    fn test_treasure_only_counts_y82() {
        assert!(is_valid(BastionType::Treasure, &at_y(82)));
        for y in [0, 35, 36, 58, 72, 73, 81, 83] {
            assert!(!is_valid(BastionType::Treasure, &at_y(y)), "y={}", y);
        }
    }

    #[test]
    fn test_bridge_counts_everything() {
        for y in [-64, 0, 36, 82, 127] {
            assert!(is_valid(BastionType::Bridge, &at_y(y)));
        }
    }

    #[test]
    fn test_stables_altitudes() {
        let valid: Vec<i32> = (0..128).filter(|&y| is_valid(BastionType::Stables, &at_y(y))).collect();
        assert_eq!(valid, vec![35, 58, 72]);

        let strict = ChestClassifier::new(StablesRule::Strict);
        let valid: Vec<i32> = (0..128).filter(|&y| strict.is_valid(BastionType::Stables, &at_y(y))).collect();
        assert_eq!(valid, vec![35, 72]);
    }

    #[test]
    fn test_housing_top_chest_anywhere() {
        assert!(is_valid(BastionType::Housing, &at_y(73)));
        assert!(is_valid(BastionType::Housing, &record(BlockPos::new(-300, 73, 41), Rotation::Clockwise90)));
    }

    #[test]
    fn test_housing_double_chest_unrotated() {
        // South of origin by 20, then 6 to the west
        let slots = housing_double_chest_slots(BlockPos::new(0, 0, 0), Rotation::None);
        assert_eq!(slots[0], BlockPos::new(-6, 0, 20));
        assert_eq!(slots[1], BlockPos::new(-6, 0, 21));

        assert!(is_valid(BastionType::Housing, &record(BlockPos::new(-6, 36, 20), Rotation::None)));
        assert!(is_valid(BastionType::Housing, &record(BlockPos::new(-6, 36, 21), Rotation::None)));

        for (x, z) in [(-5, 20), (-7, 20), (-6, 19), (-6, 22), (-5, 21)] {
            assert!(
                !is_valid(BastionType::Housing, &record(BlockPos::new(x, 36, z), Rotation::None)),
                "({}, {}) should be off-slot",
                x,
                z
            );
        }
    }

    #[test]
    fn test_housing_double_chest_needs_y36() {
        assert!(!is_valid(BastionType::Housing, &record(BlockPos::new(-6, 37, 20), Rotation::None)));
        assert!(!is_valid(BastionType::Housing, &record(BlockPos::new(-6, 35, 21), Rotation::None)));
    }

    #[test]
    fn test_housing_double_chest_rotated() {
        let origin = BlockPos::new(32, 0, -48);
        // Clockwise 90: towards = west, its clockwise side = north
        let slots = housing_double_chest_slots(origin, Rotation::Clockwise90);
        assert_eq!(slots, [BlockPos::new(12, 0, -54), BlockPos::new(11, 0, -54)]);

        let chest = ChestRecord {
            position: BlockPos::new(11, 36, -54),
            structure_origin: origin,
            structure_rotation: Rotation::Clockwise90,
            items: &[],
        };
        assert!(is_valid(BastionType::Housing, &chest));

        // Same column under a different rotation is off-slot
        let chest = ChestRecord { structure_rotation: Rotation::Clockwise180, ..chest };
        assert!(!is_valid(BastionType::Housing, &chest));
    }

    #[test]
    fn test_chest_records_carry_structure_context() {
        let bastion = Bastion {
            variant: BastionType::Housing,
            origin: BlockPos::new(16, 0, 16),
            rotation: Rotation::Clockwise180,
            chests: vec![
                LootChest { pos: BlockPos::new(1, 2, 3), items: vec![] },
                LootChest { pos: BlockPos::new(4, 5, 6), items: vec![ItemStack::new("obsidian", 3)] },
            ],
        };
        let records: Vec<_> = bastion.chest_records().collect();
        assert_eq!(records.len(), 2);
        assert!(records.iter().all(|r| r.structure_origin == bastion.origin));
        assert!(records.iter().all(|r| r.structure_rotation == Rotation::Clockwise180));
        assert_eq!(records[1].position, BlockPos::new(4, 5, 6));
        assert_eq!(records[1].items.len(), 1);
    }
}
