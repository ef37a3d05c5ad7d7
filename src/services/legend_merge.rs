//! Collapsing redundant legends on a keycap.
//!
//! A keycap usually shows the unshifted and shifted outputs in separate
//! placements. When both are the same letter in different cases (or simply
//! identical), a merge slot can replace them with a single centered legend.

use crate::models::{MergeDeclaration, MergeRule};

/// Applies merge rules to resolved legends.
pub struct LegendMerger;

impl LegendMerger {
    /// Returns the merged text if `a` and `b` are equivalent under `rule`.
    ///
    /// `Uppercase` accepts `b` being the uppercase form of `a`, `Lowercase` the
    /// lowercase form. The merged text is always `a`, the presumed base form.
    /// Case folding is Unicode-aware.
    ///
    /// # Examples
    ///
    /// ```
    /// use keylegend::models::MergeRule;
    /// use keylegend::services::legend_merge::LegendMerger;
    ///
    /// assert_eq!(LegendMerger::merge(MergeRule::Uppercase, "a", "A"), Some("a".to_string()));
    /// assert_eq!(LegendMerger::merge(MergeRule::Same, "a", "b"), None);
    /// ```
    pub fn merge(rule: MergeRule, a: &str, b: &str) -> Option<String> {
        let equivalent = match rule {
            MergeRule::Same => a == b,
            MergeRule::Uppercase => a == b || a.to_uppercase() == b || a == b.to_lowercase(),
            MergeRule::Lowercase => a == b || a.to_lowercase() == b || a == b.to_uppercase(),
        };

        equivalent.then(|| a.to_string())
    }

    /// Applies a merge declaration to a keycap's placement slots.
    ///
    /// On success both source slots are cleared and `place` receives the merged
    /// text. Returns whether the merge happened. Out-of-range placements are left
    /// alone.
    pub fn apply(declaration: &MergeDeclaration, place: usize, slots: &mut [String]) -> bool {
        let [a, b] = declaration.places;
        let (Some(text_a), Some(text_b)) = (slots.get(a), slots.get(b)) else {
            return false;
        };
        if place >= slots.len() {
            return false;
        }

        match Self::merge(declaration.rule, text_a, text_b) {
            Some(merged) => {
                slots[a].clear();
                slots[b].clear();
                slots[place] = merged;
                true
            }
            None => false,
        }
    }
}
