//! Archive round-trip checks through the facade.

use symcas::prelude::*;

fn round_trip(e: &Ex, syms: &[Ex]) -> Ex {
    let mut ar = Archive::new();
    ar.archive_ex(e, "e").unwrap();
    let mut bytes = Vec::new();
    ar.write_to(&mut bytes).unwrap();
    let back = Archive::read_from(&mut bytes.as_slice()).unwrap();
    back.unarchive_ex(syms, "e").unwrap()
}

#[test]
fn trig_identity_round_trips_byte_for_byte() {
    let x = Ex::symbol("x");
    let e = Ex::func("sin", vec![x.clone()]).unwrap().pow(2)
        + Ex::func("cos", vec![x.clone()]).unwrap().pow(2);

    let mut ar = Archive::new();
    ar.archive_ex(&e, "trig").unwrap();
    let mut first = Vec::new();
    ar.write_to(&mut first).unwrap();

    let reread = Archive::read_from(&mut first.as_slice()).unwrap();
    let back = reread.unarchive_ex(&[x.clone()], "trig").unwrap();
    assert_eq!(back, e);

    let mut ar2 = Archive::new();
    ar2.archive_ex(&back, "trig").unwrap();
    let mut second = Vec::new();
    ar2.write_to(&mut second).unwrap();
    assert_eq!(first, second, "second write pass must be byte-identical");
}

#[test]
fn assorted_expressions_round_trip() {
    let x = Ex::symbol("x");
    let y = Ex::symbol("y");
    let syms = [x.clone(), y.clone()];
    let cases = vec![
        Ex::from(0),
        Ex::num(Number::from((-7, 3))),
        Ex::num(Number::float(2.5)),
        Ex::num(Number::imaginary_unit()),
        Ex::pi() + Ex::from(1),
        (&x + &y).pow(2) * Ex::from(3),
        x.pow(-1) + y.pow(-1),
        Ex::list(vec![x.clone(), y.clone(), Ex::from(9)]),
        Ex::tuple(vec![x.clone(), Ex::from(2)]),
        Ex::matrix(2, 2, vec![x.clone(), y.clone(), Ex::zero(), Ex::one()]).unwrap(),
        x.equals(&y + Ex::from(1)),
        Ex::func("sin", vec![x.pow(2)]).unwrap(),
        Ex::func("exp", vec![x.clone()])
            .unwrap()
            .series(&x, &Ex::from(0), 5)
            .unwrap(),
    ];
    for e in cases {
        let back = round_trip(&e, &syms);
        assert_eq!(back, e, "round-trip of {e}");
    }
}

#[test]
fn multiple_named_expressions_share_nodes() {
    let x = Ex::symbol("x");
    let p = x.pow(2) + Ex::from(1);
    let q = &p * Ex::from(5);
    let mut ar = Archive::new();
    ar.archive_ex(&p, "p").unwrap();
    ar.archive_ex(&q, "q").unwrap();
    assert_eq!(ar.len(), 2);

    let mut bytes = Vec::new();
    ar.write_to(&mut bytes).unwrap();
    let back = Archive::read_from(&mut bytes.as_slice()).unwrap();
    let p2 = back.unarchive_ex(&[x.clone()], "p").unwrap();
    let (qname, q2) = back.unarchive_index(&[x.clone()], 1).unwrap();
    assert_eq!(p2, p);
    assert_eq!(qname, "q");
    assert_eq!(q2, q);
    assert!(matches!(
        back.unarchive_ex(&[], "missing"),
        Err(symcas::ArchiveError::NotFound(_))
    ));
}
