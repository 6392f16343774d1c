//! Checks JSON Schema cannot express.

use std::collections::BTreeMap;

use guard_contracts::PolicySet;

/// Policy ids declared more than once, each reported once, ordered by where
/// the first repeat appears.
///
/// The engine accepts duplicates; verdicts then name an id that is ambiguous
/// in audit trails.
pub fn duplicate_policy_ids(set: &PolicySet) -> Vec<String> {
    let mut counts: BTreeMap<&str, usize> = BTreeMap::new();
    let mut order: Vec<&str> = Vec::new();

    for policy in &set.policies {
        let count = counts.entry(policy.id.as_str()).or_insert(0);
        *count += 1;
        if *count == 2 {
            order.push(policy.id.as_str());
        }
    }

    order.into_iter().map(str::to_string).collect()
}
