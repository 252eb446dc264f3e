// src/clustering/semantic.rs
//! Splits one proximity cluster into name-equivalent subgroups.

use crate::matching::name::{names_equivalent, normalize_name};

/// Greedy seed scan over a cluster's names, in input order.
///
/// Each unassigned point opens a subgroup and pulls in every later
/// unassigned point whose name is equivalent to the *seed's* name. Members
/// are never compared with each other, so membership is not transitive:
/// B can join seed A while C, equivalent to B but not to A, seeds its own
/// subgroup.
///
/// Returns positions into `names`; together they cover every position once.
pub fn split_by_seed_name<S: AsRef<str>>(names: &[S], similarity_threshold: f64) -> Vec<Vec<usize>> {
    let normalized: Vec<String> = names.iter().map(|n| normalize_name(n.as_ref())).collect();
    let mut assigned = vec![false; normalized.len()];
    let mut subgroups = Vec::new();

    for seed in 0..normalized.len() {
        if assigned[seed] {
            continue;
        }
        assigned[seed] = true;
        let mut subgroup = vec![seed];

        for candidate in (seed + 1)..normalized.len() {
            if assigned[candidate] {
                continue;
            }
            if names_equivalent(&normalized[seed], &normalized[candidate], similarity_threshold) {
                assigned[candidate] = true;
                subgroup.push(candidate);
            }
        }
        subgroups.push(subgroup);
    }

    subgroups
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_similar_names_share_a_subgroup() {
        let names = ["Central Station", "Central Stn", "Stn North"];
        assert_eq!(split_by_seed_name(&names, 0.8), vec![vec![0, 1], vec![2]]);
    }

    #[test]
    fn test_membership_is_not_transitive() {
        // "Garibaldi FS" contains both others; "FS" and "Garibaldi" share nothing.
        let names = ["Garibaldi", "Garibaldi FS", "FS"];
        assert_eq!(split_by_seed_name(&names, 0.9), vec![vec![0, 1], vec![2]]);
    }

    #[test]
    fn test_later_seed_can_absorb_skipped_points() {
        let names = ["Cadorna", "Cairoli", "Cadorna FN", "Cairoli Castello"];
        assert_eq!(
            split_by_seed_name(&names, 0.8),
            vec![vec![0, 2], vec![1, 3]]
        );
    }

    #[test]
    fn test_case_is_ignored() {
        let names = ["DUOMO", "duomo"];
        assert_eq!(split_by_seed_name(&names, 1.0), vec![vec![0, 1]]);
    }

    #[test]
    fn test_subgroups_partition_the_cluster() {
        let names = ["a", "b", "ab", "c", "bc", "d"];
        let groups = split_by_seed_name(&names, 0.9);
        let mut seen: Vec<usize> = groups.iter().flatten().copied().collect();
        seen.sort_unstable();
        assert_eq!(seen, (0..names.len()).collect::<Vec<_>>());
        assert!(groups.iter().all(|g| !g.is_empty()));
    }

    #[test]
    fn test_zero_threshold_merges_everything_into_first_seed() {
        let names = ["A", "A", "B"];
        assert_eq!(split_by_seed_name(&names, 0.0), vec![vec![0, 1, 2]]);
    }
}
