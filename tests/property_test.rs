//! Property-based tests for plan compilation
//!
//! Uses proptest to generate random descriptors and verify invariants

use cloneplan::*;
use proptest::prelude::*;

fn any_type_ref() -> impl Strategy<Value = TypeRef> {
    let leaf = prop_oneof![
        Just(TypeRef::string()),
        Just(TypeRef::value("int")),
        Just(TypeRef::cloneable("Simple")),
        Just(TypeRef::named("Opaque")),
    ];
    leaf.prop_recursive(3, 8, 2, |inner| {
        prop_oneof![
            inner.clone().prop_map(TypeRef::nullable),
            inner.clone().prop_map(TypeRef::array_of),
            inner.prop_map(|element| {
                let name = element.name.clone();
                TypeRef {
                    name: format!("List<{}>", name),
                    interfaces: vec![InterfaceRef::Sequence { element }],
                    constructors: vec![Constructor {
                        params: vec![CtorParam::Sequence { element: name }],
                    }],
                    ..TypeRef::default()
                }
            }),
        ]
    })
}

fn any_member(index: usize) -> impl Strategy<Value = MemberDescriptor> {
    (any_type_ref(), any::<bool>(), any::<bool>(), any::<bool>()).prop_map(
        move |(typ, ignore, include, read_only)| {
            let mut member = MemberDescriptor::new(format!("Member{}", index), typ);
            member.options.ignore = ignore;
            // A read-only member carrying the include marker is rejected outright.
            member.options.include = include && !read_only;
            member.read_only = read_only;
            member
        },
    )
}

fn any_descriptor() -> impl Strategy<Value = TypeDescriptor> {
    (1usize..8, any::<bool>())
        .prop_flat_map(|(count, explicit)| {
            let members: Vec<_> = (0..count).map(any_member).collect();
            (members, Just(explicit))
        })
        .prop_map(|(members, explicit)| {
            let mut desc = TypeDescriptor::new("Generated", "Random");
            desc.options.explicit_declaration = explicit;
            desc.members = members;
            desc
        })
}

proptest! {
    #[test]
    fn test_compile_is_deterministic(desc in any_descriptor()) {
        let first = compile(&desc).unwrap();
        let second = compile(&desc).unwrap();
        prop_assert_eq!(first, second);
    }

    #[test]
    fn test_member_fidelity(desc in any_descriptor()) {
        let plan = compile(&desc).unwrap();
        let expected: Vec<&str> = desc
            .members
            .iter()
            .filter(|m| !m.read_only && !m.options.ignore)
            .filter(|m| !desc.options.explicit_declaration || m.options.include)
            .map(|m| m.name.as_str())
            .collect();
        prop_assert_eq!(plan.member_names(), expected);
    }

    #[test]
    fn test_ignored_members_never_cloned(desc in any_descriptor()) {
        let plan = compile(&desc).unwrap();
        for member in desc.members.iter().filter(|m| m.options.ignore) {
            prop_assert!(!plan.member_names().contains(&member.name.as_str()));
        }
    }

    #[test]
    fn test_safe_plan_mirrors_fast_plan(desc in any_descriptor()) {
        let plan = compile(&desc).unwrap();
        prop_assert_eq!(plan.fast.len(), plan.safe.len());
        for (fast, safe) in plan.fast.iter().zip(&plan.safe) {
            prop_assert_eq!(&fast.name, &safe.name);
            prop_assert!(safe.accessor.targets(CloneOp::Safe));
            prop_assert_eq!(fast.accessor.call_sites(), safe.accessor.call_sites());
            prop_assert_eq!(&safe.accessor.with_op(CloneOp::Fast), &fast.accessor);
        }
    }

    #[test]
    fn test_rendering_is_reproducible(desc in any_descriptor()) {
        let plan = compile(&desc).unwrap();
        for target in [Target::CSharp, Target::TypeScript] {
            prop_assert_eq!(render(&plan, target).unwrap(), render(&plan, target).unwrap());
        }
    }
}
