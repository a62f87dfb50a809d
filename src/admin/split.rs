//! Default version selection from a traffic split.

use std::cmp::Ordering;

/// Picks the version that receives the default traffic.
///
/// A version holding the whole allocation (`1.0`) wins outright. Otherwise the
/// largest allocation wins and equal allocations go to the lexicographically
/// smallest version id. Returns `None` when no version can be chosen.
pub fn select_default_version<'a, I>(allocations: I) -> Option<String>
where
    I: IntoIterator<Item = (&'a String, &'a f64)>,
{
    let mut best = String::new();
    let mut best_allocation = -1.0_f64;

    for (version, &allocation) in allocations {
        if allocation == 1.0 {
            return Some(version.clone());
        }
        match allocation.partial_cmp(&best_allocation) {
            Some(Ordering::Greater) => {
                best.clone_from(version);
                best_allocation = allocation;
            }
            Some(Ordering::Equal) if version < &best => best.clone_from(version),
            _ => {}
        }
    }

    (!best.is_empty()).then_some(best)
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;
    use std::collections::{BTreeMap, HashMap};

    fn split(entries: &[(&str, f64)]) -> HashMap<String, f64> {
        entries
            .iter()
            .map(|(version, allocation)| ((*version).to_owned(), *allocation))
            .collect()
    }

    #[rstest]
    #[case(&[("v1", 1.0), ("v2", 0.0)], Some("v1"))]
    #[case(&[("v1", 0.4), ("v2", 0.6)], Some("v2"))]
    #[case(&[("version-b", 0.5), ("version-a", 0.5)], Some("version-a"))]
    #[case(&[("c", 0.25), ("b", 0.25), ("a", 0.25), ("d", 0.25)], Some("a"))]
    #[case(&[("only", 0.0)], Some("only"))]
    #[case(&[], None)]
    fn selects_default_version(#[case] entries: &[(&str, f64)], #[case] expected: Option<&str>) {
        let allocations = split(entries);
        assert_eq!(
            select_default_version(&allocations).as_deref(),
            expected
        );
    }

    #[test]
    fn full_allocation_short_circuits_regardless_of_order() {
        let ordered: BTreeMap<String, f64> = [
            (String::from("a"), 0.0),
            (String::from("b"), 1.0),
            (String::from("c"), 0.0),
        ]
        .into_iter()
        .collect();
        assert_eq!(select_default_version(&ordered).as_deref(), Some("b"));
    }

    #[test]
    fn first_full_allocation_encountered_wins_on_malformed_input() {
        let ordered: BTreeMap<String, f64> = [
            (String::from("x"), 1.0),
            (String::from("y"), 1.0),
        ]
        .into_iter()
        .collect();
        assert_eq!(select_default_version(&ordered).as_deref(), Some("x"));
    }

    #[test]
    fn tie_break_is_independent_of_iteration_order() {
        let forward = [
            (String::from("version-a"), 0.5),
            (String::from("version-b"), 0.5),
        ];
        let backward = [
            (String::from("version-b"), 0.5),
            (String::from("version-a"), 0.5),
        ];
        for entries in [forward, backward] {
            let picked = select_default_version(entries.iter().map(|(v, a)| (v, a)));
            assert_eq!(picked.as_deref(), Some("version-a"));
        }
    }
}
