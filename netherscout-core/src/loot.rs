//! Obsidian scoring: sum the obsidian of the counted chests, add what piglin
//! bartering is expected to yield for the variant, saturate into an `i8`.

use serde::{Deserialize, Serialize};

use crate::chest::{Bastion, BastionType, ChestClassifier};

pub const OBSIDIAN: &str = "obsidian";

/// Highest score the wire format can carry.
pub const MAX_SCORE: i8 = i8::MAX;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ItemStack {
    pub item: String,
    pub count: u32,
}

impl ItemStack {
    pub fn new(item: &str, count: u32) -> Self {
        Self { item: item.to_string(), count }
    }

    /// Item name without the `minecraft:` namespace.
    pub fn name(&self) -> &str {
        self.item.strip_prefix("minecraft:").unwrap_or(&self.item)
    }

    pub fn is(&self, name: &str) -> bool {
        self.name() == name
    }
}

/// Plain sum of item counts. Never clamps; see [`saturate`].
pub fn aggregate<I: IntoIterator<Item = u32>>(counts: I) -> u64 {
    counts.into_iter().map(u64::from).sum()
}

/// Clamps into `0..=127`.
pub fn saturate(total: u64) -> i8 {
    if total > MAX_SCORE as u64 { MAX_SCORE } else { total as i8 }
}

/// Obsidian a runner can expect to barter for in this variant.
pub fn expected_trade_yield(variant: BastionType) -> u32 {
    match variant {
        BastionType::Bridge => 7,
        _ => 4,
    }
}

/// Obsidian lying in the chests that count for this bastion, before any
/// trade bonus or saturation.
pub fn chest_obsidian(bastion: &Bastion, classifier: &ChestClassifier) -> u64 {
    let counted: Vec<_> = bastion
        .chest_records()
        .filter(|chest| classifier.is_valid(bastion.variant, chest))
        .collect();

    aggregate(
        counted
            .iter()
            .flat_map(|chest| chest.items.iter())
            .filter(|stack| stack.is(OBSIDIAN))
            .map(|stack| stack.count),
    )
}

/// The byte answered for an obsidian query.
pub fn obsidian_score(bastion: &Bastion, classifier: &ChestClassifier) -> i8 {
    let chests = chest_obsidian(bastion, classifier);
    let total = chests + u64::from(expected_trade_yield(bastion.variant));
    log::trace!(
        "{:?} bastion: {} obsidian in counted chests, {} total",
        bastion.variant,
        chests,
        total
    );
    saturate(total)
}
