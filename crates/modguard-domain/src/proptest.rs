//! Property-based tests for the domain crate.
//!
//! Generated call graphs (cycles included) between methods of one mod type, some of which call a
//! prohibited API directly.

use crate::engine::{VerificationResult, verify};
use crate::model::{MemberRef, MethodDef, TypeName, TypeRef};
use crate::policy::{RestrictionDef, RestrictionMode};
use crate::resolve::AssemblySet;
use crate::test_support::{
    assembly, call, engine_assemblies, method_def, method_ref, method_ref_sig, policy,
    prohibit_member, ty, type_def, unity,
};
use proptest::prelude::*;
use std::collections::BTreeSet;

#[derive(Clone, Debug)]
struct CallGraph {
    edges: Vec<Vec<usize>>,
    hits: Vec<bool>,
}

fn arb_call_graph() -> impl Strategy<Value = CallGraph> {
    (1usize..8).prop_flat_map(|n| {
        (
            prop::collection::vec(prop::collection::vec(0..n, 0..4), n),
            prop::collection::vec(any::<bool>(), n),
        )
            .prop_map(|(edges, hits)| CallGraph { edges, hits })
    })
}

fn owner() -> TypeRef {
    ty("PropMod", "PropMod", "Graph")
}

fn build(graph: &CallGraph) -> AssemblySet {
    let owner = owner();
    let methods: Vec<MethodDef> = graph
        .edges
        .iter()
        .enumerate()
        .map(|(i, callees)| {
            let mut body: Vec<_> = callees
                .iter()
                .map(|c| call(&method_ref(&owner, &format!("M{c}"))))
                .collect();
            if graph.hits[i] {
                body.push(call(&method_ref_sig(
                    &unity("Object"),
                    "Instantiate",
                    "(UnityEngine.Object)",
                )));
            }
            method_def(&format!("M{i}"), body)
        })
        .collect();

    let mut set = engine_assemblies();
    set.insert(assembly("PropMod", vec![type_def(&owner, None, methods)]));
    set
}

fn reaches_hit(graph: &CallGraph, start: usize) -> bool {
    let mut seen = BTreeSet::new();
    let mut stack = vec![start];
    while let Some(node) = stack.pop() {
        if !seen.insert(node) {
            continue;
        }
        if graph.hits[node] {
            return true;
        }
        stack.extend(graph.edges[node].iter().copied());
    }
    false
}

fn instantiate_rule() -> RestrictionDef {
    prohibit_member("UnityEngine.Object", "Instantiate", "no instantiate")
}

proptest! {
    #[test]
    fn walk_terminates_and_matches_reachability(graph in arb_call_graph()) {
        let set = build(&graph);
        let def = instantiate_rule();
        let p = policy(vec![def.clone()]);

        for i in 0..graph.edges.len() {
            let member = MemberRef::Method(method_ref(&owner(), &format!("M{i}")));
            let result = verify(&def, &member, &p, &set);
            let expected = if reaches_hit(&graph, i) {
                VerificationResult::Violation("no instantiate".to_string())
            } else {
                VerificationResult::Pass
            };
            prop_assert_eq!(result, expected);
        }
    }

    #[test]
    fn inapplicable_restriction_always_passes(graph in arb_call_graph(), required in any::<bool>()) {
        let set = build(&graph);
        let mut def = instantiate_rule().applicable_to(TypeName::new("Nowhere", "Base"));
        if required {
            def.mode = RestrictionMode::Required;
        }
        let p = policy(vec![def.clone()]);

        for i in 0..graph.edges.len() {
            let member = MemberRef::Method(method_ref(&owner(), &format!("M{i}")));
            prop_assert_eq!(verify(&def, &member, &p, &set), VerificationResult::Pass);
        }
    }

    #[test]
    fn required_is_the_negation_of_prohibited(graph in arb_call_graph()) {
        let set = build(&graph);
        let prohibited = instantiate_rule();
        let mut required = prohibited.clone();
        required.mode = RestrictionMode::Required;
        let p = policy(vec![]);

        for i in 0..graph.edges.len() {
            let member = MemberRef::Method(method_ref(&owner(), &format!("M{i}")));
            let a = verify(&prohibited, &member, &p, &set) == VerificationResult::Pass;
            let b = verify(&required, &member, &p, &set) == VerificationResult::Pass;
            prop_assert_ne!(a, b);
        }
    }
}
