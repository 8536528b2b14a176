//! Property tests over randomly generated expression trees.

use proptest::prelude::*;
use symcas::prelude::*;

thread_local! {
    static POOL: Vec<Ex> = vec![Ex::symbol("p"), Ex::symbol("q"), Ex::symbol("r")];
}

fn pool() -> Vec<Ex> {
    POOL.with(Clone::clone)
}

fn arb_ex() -> impl Strategy<Value = Ex> {
    let leaf = prop_oneof![
        (-9i64..=9).prop_map(Ex::from),
        ((-9i64..=9), (1i64..=9)).prop_map(|(n, d)| Ex::num(Number::from((n, d)))),
        (0usize..3).prop_map(|i| pool()[i].clone()),
    ];
    leaf.prop_recursive(3, 20, 3, |inner| {
        prop_oneof![
            prop::collection::vec(inner.clone(), 2..4).prop_map(Ex::add_vec),
            prop::collection::vec(inner.clone(), 2..4).prop_map(Ex::mul_vec),
            (inner.clone(), 1u32..4).prop_map(|(b, n)| b.pow(i64::from(n))),
            inner.prop_map(|a| Ex::func("sin", vec![a]).unwrap()),
        ]
    })
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(64))]

    #[test]
    fn archive_round_trip_preserves_structure(e in arb_ex()) {
        let mut ar = Archive::new();
        ar.archive_ex(&e, "e").unwrap();
        let mut bytes = Vec::new();
        ar.write_to(&mut bytes).unwrap();
        let back = Archive::read_from(&mut bytes.as_slice()).unwrap();
        let e2 = back.unarchive_ex(&pool(), "e").unwrap();
        prop_assert_eq!(e2, e);
    }

    #[test]
    fn normal_is_idempotent(e in arb_ex()) {
        // Generated trees are division-free, so normal cannot fail.
        let once = normal(&e).unwrap();
        prop_assert_eq!(normal(&once).unwrap(), once);
    }

    #[test]
    fn expand_preserves_evaluation_at_a_point(e in arb_ex()) {
        // Structural expansion must not change the value: compare both
        // forms after substituting small integers for the symbols.
        let vals = [Ex::from(2), Ex::from(-1), Ex::from(3)];
        let expanded = e.expand().unwrap();
        let a = e.subs_list(&pool(), &vals).unwrap();
        let b = expanded.subs_list(&pool(), &vals).unwrap();
        // Both reduce to sin-applications over exact numbers; expand
        // once more to flatten any remaining structure.
        prop_assert_eq!(a.expand().unwrap(), b.expand().unwrap());
    }
}
