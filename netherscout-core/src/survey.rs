//! Seed survey statistics: how often each bastion variant reaches a target
//! obsidian count once the expected trades are added.

use std::collections::HashMap;

use crate::chest::{Bastion, BastionType, ChestClassifier};
use crate::loot::{chest_obsidian, expected_trade_yield, saturate};

pub const DEFAULT_THRESHOLD: u32 = 20;

#[derive(Debug, Default)]
pub struct Survey {
    chest_obsidian: HashMap<BastionType, Vec<i8>>,
    missing: usize,
}

impl Survey {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn record(&mut self, bastion: &Bastion, classifier: &ChestClassifier) {
        let raw = saturate(chest_obsidian(bastion, classifier));
        self.chest_obsidian.entry(bastion.variant).or_default().push(raw);
    }

    /// A seed where no bastion generated at the surveyed chunk.
    pub fn record_missing(&mut self) {
        self.missing += 1;
    }

    pub fn checked(&self) -> usize {
        self.missing + self.chest_obsidian.values().map(Vec::len).sum::<usize>()
    }

    /// Bastions of this variant whose chests plus trades reach `threshold`.
    pub fn good_count(&self, variant: BastionType, threshold: u32) -> usize {
        let bonus = expected_trade_yield(variant);
        self.chest_obsidian
            .get(&variant)
            .map(|raw| raw.iter().filter(|&&r| r as u32 + bonus >= threshold).count())
            .unwrap_or(0)
    }

    pub fn good_total(&self, threshold: u32) -> usize {
        BastionType::ALL.iter().map(|&v| self.good_count(v, threshold)).sum()
    }

    pub fn report(&self, threshold: u32) -> String {
        let good_total = self.good_total(threshold);
        let mut out = String::new();
        for variant in BastionType::ALL {
            let good = self.good_count(variant, threshold);
            out.push_str(&format!(
                "{:?}\n{} ({:.2}% of good bastions)\n",
                variant,
                good,
                percent_of(good, good_total)
            ));
        }
        out.push_str(&format!(
            "ALL\n{} ({:.2}% of all checked bastions)\n",
            good_total,
            percent_of(good_total, self.checked())
        ));
        if self.missing > 0 {
            out.push_str(&format!("No bastion generated: {}\n", self.missing));
        }
        out
    }
}

fn percent_of(x: usize, total: usize) -> f64 {
    if total == 0 { 0.0 } else { 100.0 * x as f64 / total as f64 }
}
