//! Benchmark utilities for the component framework.
//!
//! Generates type hierarchies, candidate name sets and component configurations of a given
//! size, seeded so every run measures the same inputs.
//!
//! # Running Benchmarks
//!
//! ```bash
//! # Run all benchmarks
//! cargo bench -p strata_bench
//!
//! # Run specific benchmark group
//! cargo bench -p strata_bench -- similar
//! ```
//!
//! Results are written to `target/criterion/` with HTML reports for visualization.

use rand::{Rng, SeedableRng, rngs::StdRng, seq::SliceRandom};
use strata_framework::{Dictionary, Registries, TypeHierarchy, TypeName, Value, config::TYPE_KEY};

pub mod components;

pub const SEED: u64 = 0x5eed;

pub fn rng() -> StdRng {
    StdRng::seed_from_u64(SEED)
}

/// A random identifier of `len` ASCII letters.
pub fn random_name(rng: &mut impl Rng, len: usize) -> String {
    (0..len)
        .map(|_| {
            let letter = rng.gen_range(0..52u8);
            if letter < 26 {
                (b'a' + letter) as char
            } else {
                (b'A' + letter - 26) as char
            }
        })
        .collect()
}

/// `count` random names of 6 to 16 letters.
pub fn random_names(rng: &mut impl Rng, count: usize) -> Vec<String> {
    (0..count)
        .map(|_| {
            let len = rng.gen_range(6..=16);
            random_name(&mut *rng, len)
        })
        .collect()
}

/// Type names live for the whole program, so generated ones are leaked.
pub fn type_names(count: usize) -> Vec<TypeName> {
    (0..count)
        .map(|i| TypeName::new(Box::leak(format!("Type{i}").into_boxed_str())))
        .collect()
}

/// A single inheritance chain `Type{depth-1} -> ... -> Type0 -> Component`.
///
/// Returns the hierarchy with the deepest type.
pub fn chain(depth: usize) -> (TypeHierarchy, TypeName) {
    let hierarchy = TypeHierarchy::new();
    let names = type_names(depth);
    let mut parent = TypeName::COMPONENT;
    for name in &names {
        hierarchy
            .register_parent(*name, parent)
            .expect("fresh chain edge");
        parent = *name;
    }
    (hierarchy, parent)
}

/// A random forest of `count` types where each type picks an earlier type (or the root) as its
/// parent.
pub fn forest(rng: &mut impl Rng, count: usize) -> (TypeHierarchy, Vec<TypeName>) {
    let hierarchy = TypeHierarchy::new();
    let names = type_names(count);
    for (i, name) in names.iter().enumerate() {
        let parent = names[..i].choose(rng).copied().unwrap_or(TypeName::COMPONENT);
        hierarchy
            .register_parent(*name, parent)
            .expect("fresh forest edge");
    }
    (hierarchy, names)
}

/// Registries holding the benchmark component types.
pub fn registries() -> Registries {
    let registries = Registries::new();
    registries
        .register::<components::Node>()
        .expect("register Node");
    registries
        .register::<components::Hub>()
        .expect("register Hub");
    registries
}

/// A chain of `len` nodes, each pointing at the next. Constructing the first entry recurses down
/// the whole chain.
pub fn chain_config(len: usize) -> Dictionary {
    let mut components = Dictionary::new();
    for i in 0..len {
        let mut section = Dictionary::new().with(TYPE_KEY, "Node").with("weight", i as f64);
        if i + 1 < len {
            section.insert("Next", format!("node{}", i + 1));
        }
        components.insert(format!("node{i}"), section);
    }
    Dictionary::new().with("components", components)
}

/// A hub listing `len` independent nodes in shuffled order.
pub fn hub_config(rng: &mut impl Rng, len: usize) -> Dictionary {
    let mut names: Vec<String> = (0..len).map(|i| format!("node{i}")).collect();
    let mut components = Dictionary::new().with(
        "hub",
        Dictionary::new()
            .with(TYPE_KEY, "Hub")
            .with("Nodes", names.iter().map(|name| Value::from(name.as_str())).collect::<Vec<_>>()),
    );
    names.shuffle(rng);
    for name in names {
        components.insert(name, Dictionary::new().with(TYPE_KEY, "Node"));
    }
    Dictionary::new().with("components", components)
}

#[cfg(test)]
mod tests {
    use super::*;
    use strata_framework::Session;

    #[test]
    fn chain_has_the_requested_depth() {
        let (hierarchy, deepest) = chain(12);
        assert_eq!(hierarchy.ancestors(deepest.as_str()).len(), 12);
        assert!(hierarchy.is_ancestor(deepest.as_str(), "Component"));
    }

    #[test]
    fn registries_hold_the_bench_types() {
        let registries = registries();
        assert!(registries.is_concrete("Node"));
        assert!(registries.is_concrete("Hub"));
    }

    #[test]
    fn forest_edges_all_reach_the_root() {
        let (hierarchy, names) = forest(&mut rng(), 64);
        assert_eq!(hierarchy.len(), 64);
        assert!(
            names
                .iter()
                .all(|name| hierarchy.is_ancestor(name.as_str(), "Component"))
        );
    }

    #[test]
    fn generated_configurations_run() {
        let registries = registries();
        let root = chain_config(32);
        let mut session = Session::new(&registries, &root);
        session.run(&mut ()).unwrap();
        assert_eq!(session.live().len(), 32);

        let root = hub_config(&mut rng(), 32);
        let mut session = Session::new(&registries, &root);
        session.run(&mut ()).unwrap();
        assert_eq!(session.live().len(), 33);
    }
}
