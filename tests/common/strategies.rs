use dashboard_core::constants::modules;
use dashboard_core::orchestration::Selection;
use proptest::prelude::*;
use proptest::sample::subsequence;

/// Endpoints available to generated dashboards
pub const ENDPOINTS: &[&str] = &["status", "trend", "categorywise", "summary"];

/// Every (module, endpoint) pair generated dashboards draw from
pub fn endpoint_universe() -> Vec<(&'static str, &'static str)> {
    modules::ALL[..4]
        .iter()
        .flat_map(|module| ENDPOINTS.iter().map(move |endpoint| (*module, *endpoint)))
        .collect()
}

/// A selection set over distinct endpoints in random order, with ids `w0..wN`
pub fn selection_set_strategy() -> impl Strategy<Value = Vec<Selection>> {
    let universe = endpoint_universe();
    let len = universe.len();
    subsequence(universe, 0..=len)
        .prop_shuffle()
        .prop_map(|pairs| {
            pairs
                .into_iter()
                .enumerate()
                .map(|(i, (module, endpoint))| {
                    Selection::new(format!("w{i}"), module, endpoint, format!("{module} {endpoint}"))
                })
                .collect()
        })
}

/// Which of the universe's endpoints fail, as a bit per endpoint
pub fn failure_mask_strategy() -> impl Strategy<Value = u16> {
    any::<u16>()
}

pub fn fails(mask: u16, index: usize) -> bool {
    mask & (1 << index) != 0
}

/// Which selections of a generated set a dashboard starts with, as a bit per position
pub fn subset_mask_strategy() -> impl Strategy<Value = u16> {
    any::<u16>()
}

pub fn in_subset(mask: u16, index: usize) -> bool {
    mask & (1 << index) != 0
}
