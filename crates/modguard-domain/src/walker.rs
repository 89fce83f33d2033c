//! Call-graph walker.
//!
//! Starting from one method, follows method references through instruction streams looking for a
//! pattern. Each top-level walk owns its visited set, so independent walks can run concurrently.

use crate::model::{Instruction, MemberRef, MethodRef, TypeRef};
use crate::policy::PolicySet;
use crate::resolve::MetadataResolver;
use std::collections::HashSet;
use tracing::{debug, trace, warn};

/// Outcome of a walk.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Presence {
    Present,
    Absent,
    /// A walk limit stopped traversal before the pattern was found.
    Truncated,
}

impl Presence {
    pub fn is_present(self) -> bool {
        self == Presence::Present
    }
}

struct Walk<'a> {
    predicate: &'a dyn Fn(&MemberRef) -> bool,
    local_predicate: &'a dyn Fn(&TypeRef) -> bool,
    policy: &'a PolicySet,
    resolver: &'a dyn MetadataResolver,
    /// Assembly that owns the root method. Its own members never get boundary treatment, so a
    /// mod cannot hide code by naming its namespaces after the framework.
    candidate: &'a str,
    visited: HashSet<String>,
    truncated: bool,
}

/// A method being scanned: the rest of its instruction stream and its distance from the root.
struct Frame<'a> {
    instructions: std::slice::Iter<'a, Instruction>,
    depth: usize,
}

enum Enter<'a> {
    Found,
    Scan(Frame<'a>),
    Skip,
}

enum Step<'a> {
    Found,
    Descend(&'a MethodRef),
    Skip,
}

/// Is the pattern present in `method` or anything it (transitively) calls?
pub fn present_in_call_graph(
    method: &MethodRef,
    predicate: &dyn Fn(&MemberRef) -> bool,
    local_predicate: &dyn Fn(&TypeRef) -> bool,
    policy: &PolicySet,
    resolver: &dyn MetadataResolver,
) -> Presence {
    let mut walk = Walk {
        predicate,
        local_predicate,
        policy,
        resolver,
        candidate: &method.declaring_type.assembly,
        visited: HashSet::new(),
        truncated: false,
    };

    if walk.run(method) {
        Presence::Present
    } else if walk.truncated {
        Presence::Truncated
    } else {
        Presence::Absent
    }
}

impl<'a> Walk<'a> {
    /// Depth-first over an explicit stack; call chains in untrusted code can be arbitrarily deep.
    fn run(&mut self, root: &MethodRef) -> bool {
        let mut stack = match self.enter(root, 0) {
            Enter::Found => return true,
            Enter::Skip => return false,
            Enter::Scan(frame) => vec![frame],
        };

        while let Some(frame) = stack.last_mut() {
            let depth = frame.depth;
            let Some(operand) = frame.instructions.find_map(|i| i.operand.as_ref()) else {
                stack.pop();
                continue;
            };
            match self.step(operand) {
                Step::Found => return true,
                Step::Skip => {}
                Step::Descend(callee) => match self.enter(callee, depth + 1) {
                    Enter::Found => return true,
                    Enter::Scan(frame) => stack.push(frame),
                    Enter::Skip => {}
                },
            }
        }

        false
    }

    fn enter(&mut self, method: &MethodRef, depth: usize) -> Enter<'a> {
        let resolver = self.resolver;
        let resolved = match resolver.resolve_method(method) {
            Ok(def) => def,
            Err(err) => {
                warn!(method = %method, error = %err, "cannot resolve method; skipping");
                return Enter::Skip;
            }
        };

        let Some(body) = resolved.body.as_ref() else {
            return Enter::Skip;
        };

        let identity = method.full_name();
        if self.visited.contains(&identity) {
            trace!(method = %identity, "already visited");
            return Enter::Skip;
        }

        let limits = self.policy.limits;
        if depth >= limits.max_depth || self.visited.len() >= limits.max_methods {
            debug!(
                method = %identity,
                depth,
                visited = self.visited.len(),
                "walk limit reached"
            );
            self.truncated = true;
            return Enter::Skip;
        }
        self.visited.insert(identity);

        if body
            .locals
            .iter()
            .any(|local| (self.local_predicate)(&local.var_type))
        {
            return Enter::Found;
        }

        Enter::Scan(Frame {
            instructions: body.instructions.iter(),
            depth,
        })
    }

    fn step(&self, operand: &'a MemberRef) -> Step<'a> {
        let assembly = operand.assembly();
        let owned = assembly == self.candidate;

        if !owned && self.policy.is_interface_assembly(assembly) {
            return Step::Skip;
        }

        if (self.predicate)(operand) {
            return Step::Found;
        }

        if !owned && self.policy.is_trusted(assembly) {
            trace!(assembly, member = %operand.qualified_name(), "trusted; not walking");
            return Step::Skip;
        }

        let Some(declaring) = operand.declaring_type() else {
            return Step::Skip;
        };

        if !owned && self.policy.is_exempt_namespace(&declaring.namespace) {
            return Step::Skip;
        }

        match operand {
            MemberRef::Method(callee) => Step::Descend(callee),
            _ => Step::Skip,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::policy::{AssemblyMatcher, WalkLimits};
    use crate::resolve::AssemblySet;
    use crate::test_support::{assembly, call, local, method_def, method_ref, ty, type_def};

    fn calls_named(name: &'static str) -> impl Fn(&MemberRef) -> bool {
        move |m: &MemberRef| m.name() == name
    }

    fn never(_: &TypeRef) -> bool {
        false
    }

    fn chain_set(len: usize) -> (AssemblySet, MethodRef) {
        // Mod.Chain::Step0 -> Step1 -> ... -> StepN-1 -> Lib.Target::Hit
        let owner = ty("Mod", "", "Chain");
        let target = ty("Lib", "Lib", "Target");
        let mut methods = Vec::new();
        for i in 0..len {
            let next = if i + 1 < len {
                call(&method_ref(&owner, &format!("Step{}", i + 1)))
            } else {
                call(&method_ref(&target, "Hit"))
            };
            methods.push(method_def(&format!("Step{i}"), vec![next]));
        }
        let set: AssemblySet = [
            assembly("Mod", vec![type_def(&owner, None, methods)]),
            assembly(
                "Lib",
                vec![type_def(&target, None, vec![method_def("Hit", vec![])])],
            ),
        ]
        .into_iter()
        .collect();
        (set, method_ref(&owner, "Step0"))
    }

    #[test]
    fn finds_pattern_through_transitive_calls() {
        let (set, root) = chain_set(5);
        let presence = present_in_call_graph(
            &root,
            &calls_named("Hit"),
            &never,
            &PolicySet::default(),
            &set,
        );
        assert_eq!(presence, Presence::Present);
    }

    #[test]
    fn depth_limit_reports_truncation() {
        let (set, root) = chain_set(10);
        let policy = PolicySet {
            limits: WalkLimits {
                max_depth: 3,
                max_methods: 100,
            },
            ..PolicySet::default()
        };
        let presence = present_in_call_graph(&root, &calls_named("Hit"), &never, &policy, &set);
        assert_eq!(presence, Presence::Truncated);
    }

    #[test]
    fn method_ceiling_reports_truncation() {
        let (set, root) = chain_set(10);
        let policy = PolicySet {
            limits: WalkLimits {
                max_depth: 100,
                max_methods: 4,
            },
            ..PolicySet::default()
        };
        let presence = present_in_call_graph(&root, &calls_named("Hit"), &never, &policy, &set);
        assert_eq!(presence, Presence::Truncated);
    }

    #[test]
    fn very_deep_chain_is_walked_without_recursion() {
        // One type per step keeps resolution cheap; the chain is far deeper than a thread stack
        // would allow for a recursive walk.
        const STEPS: usize = 50_000;
        let target = ty("Lib", "Lib", "Target");
        let step_type = |i: usize| ty("Mod", "Deep", &format!("Step{i}"));
        let types = (0..STEPS)
            .map(|i| {
                let next = if i + 1 < STEPS {
                    call(&method_ref(&step_type(i + 1), "Run"))
                } else {
                    call(&method_ref(&target, "Hit"))
                };
                type_def(&step_type(i), None, vec![method_def("Run", vec![next])])
            })
            .collect();
        let set: AssemblySet = [assembly("Mod", types)].into_iter().collect();
        let policy = PolicySet {
            limits: WalkLimits {
                max_depth: usize::MAX,
                max_methods: usize::MAX,
            },
            ..PolicySet::default()
        };

        let root = method_ref(&step_type(0), "Run");
        assert_eq!(
            present_in_call_graph(&root, &calls_named("Hit"), &never, &policy, &set),
            Presence::Present
        );
        assert_eq!(
            present_in_call_graph(&root, &calls_named("Missing"), &never, &policy, &set),
            Presence::Absent
        );
    }

    #[test]
    fn hit_before_limit_is_still_present() {
        let (set, root) = chain_set(10);
        let policy = PolicySet {
            limits: WalkLimits {
                max_depth: 3,
                max_methods: 100,
            },
            ..PolicySet::default()
        };
        let presence = present_in_call_graph(&root, &calls_named("Step2"), &never, &policy, &set);
        assert_eq!(presence, Presence::Present);
    }

    #[test]
    fn trusted_assembly_is_not_walked_but_direct_hits_count() {
        // Mod.A::Run -> Vendor.Lib::Helper -> Danger.Api::Boom
        let mod_type = ty("Mod", "", "A");
        let vendor = ty("Vendor", "Vendor", "Lib");
        let danger = ty("Danger", "Danger", "Api");
        let set: AssemblySet = [
            assembly(
                "Mod",
                vec![type_def(
                    &mod_type,
                    None,
                    vec![method_def("Run", vec![call(&method_ref(&vendor, "Helper"))])],
                )],
            ),
            assembly(
                "Vendor",
                vec![type_def(
                    &vendor,
                    None,
                    vec![method_def("Helper", vec![call(&method_ref(&danger, "Boom"))])],
                )],
            ),
        ]
        .into_iter()
        .collect();

        let root = method_ref(&mod_type, "Run");
        let untrusted = PolicySet::default();
        assert!(
            present_in_call_graph(&root, &calls_named("Boom"), &never, &untrusted, &set)
                .is_present()
        );

        let trusted = PolicySet {
            trusted_assemblies: AssemblyMatcher::new(["Vendor"]).expect("glob"),
            ..PolicySet::default()
        };
        assert_eq!(
            present_in_call_graph(&root, &calls_named("Boom"), &never, &trusted, &set),
            Presence::Absent
        );
        assert!(
            present_in_call_graph(&root, &calls_named("Helper"), &never, &trusted, &set)
                .is_present()
        );
    }

    #[test]
    fn candidate_cannot_spoof_exempt_namespace() {
        // The mod hides its own helper in a `System.*` namespace.
        let entry = ty("Mod", "Mod", "Entry");
        let hidden = ty("Mod", "System.Hidden", "Helper");
        let danger = ty("Danger", "Danger", "Api");
        let set: AssemblySet = [assembly(
            "Mod",
            vec![
                type_def(
                    &entry,
                    None,
                    vec![method_def("Run", vec![call(&method_ref(&hidden, "Go"))])],
                ),
                type_def(
                    &hidden,
                    None,
                    vec![method_def("Go", vec![call(&method_ref(&danger, "Boom"))])],
                ),
            ],
        )]
        .into_iter()
        .collect();

        let presence = present_in_call_graph(
            &method_ref(&entry, "Run"),
            &calls_named("Boom"),
            &never,
            &PolicySet::default(),
            &set,
        );
        assert_eq!(presence, Presence::Present);
    }

    #[test]
    fn interface_assembly_references_are_ignored() {
        let entry = ty("Mod", "Mod", "Entry");
        let iface = ty("ModTool.Interface", "ModTool.Interface", "ModBehaviour");
        let set: AssemblySet = [assembly(
            "Mod",
            vec![type_def(
                &entry,
                None,
                vec![method_def("Run", vec![call(&method_ref(&iface, "Instantiate"))])],
            )],
        )]
        .into_iter()
        .collect();

        let presence = present_in_call_graph(
            &method_ref(&entry, "Run"),
            &calls_named("Instantiate"),
            &never,
            &PolicySet::default(),
            &set,
        );
        assert_eq!(presence, Presence::Absent);
    }

    #[test]
    fn local_declarations_are_checked() {
        let entry = ty("Mod", "Mod", "Entry");
        let mut run = method_def("Run", vec![]);
        if let Some(body) = run.body.as_mut() {
            body.locals.push(local(0, ty("mscorlib", "System.IO", "FileStream")));
        }
        let set: AssemblySet = [assembly("Mod", vec![type_def(&entry, None, vec![run])])]
            .into_iter()
            .collect();

        let presence = present_in_call_graph(
            &method_ref(&entry, "Run"),
            &|_: &MemberRef| false,
            &|t: &TypeRef| t.namespace == "System.IO",
            &PolicySet::default(),
            &set,
        );
        assert_eq!(presence, Presence::Present);
    }

    #[test]
    fn unresolvable_root_is_absent() {
        let set = AssemblySet::new();
        let presence = present_in_call_graph(
            &method_ref(&ty("Mod", "", "Missing"), "Run"),
            &|_: &MemberRef| true,
            &never,
            &PolicySet::default(),
            &set,
        );
        assert_eq!(presence, Presence::Absent);
    }
}
