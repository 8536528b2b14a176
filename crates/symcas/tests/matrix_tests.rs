//! Symbolic matrix algebra end-to-end checks.

use symcas::prelude::*;
use symcas::normal;

/// 3x3 matrix of distinct symbols a_ij.
fn symbolic_3x3() -> (Matrix, Vec<Ex>) {
    let syms: Vec<Ex> = (0..3)
        .flat_map(|i| (0..3).map(move |j| (i, j)))
        .map(|(i, j)| Ex::symbol(&format!("a{i}{j}")))
        .collect();
    let m = Matrix::new(3, 3, syms.clone()).unwrap();
    (m, syms)
}

/// The Leibniz formula for a 3x3 determinant, written out by hand.
fn leibniz_3x3(a: &[Ex]) -> Ex {
    let e = |i: usize, j: usize| a[i * 3 + j].clone();
    e(0, 0) * e(1, 1) * e(2, 2) + e(0, 1) * e(1, 2) * e(2, 0) + e(0, 2) * e(1, 0) * e(2, 1)
        - e(0, 2) * e(1, 1) * e(2, 0)
        - e(0, 0) * e(1, 2) * e(2, 1)
        - e(0, 1) * e(1, 0) * e(2, 2)
}

#[test]
fn symbolic_determinant_is_algorithm_independent() {
    let (m, syms) = symbolic_3x3();
    let expected = leibniz_3x3(&syms).expand().unwrap();
    for algo in [
        DetAlgo::Auto,
        DetAlgo::Elimination,
        DetAlgo::Laplace,
        DetAlgo::PermutationSum,
    ] {
        let det = determinant(&m, algo).unwrap();
        let det = normal(&det).unwrap().expand().unwrap();
        assert_eq!(det, expected, "algorithm {algo:?}");
    }
}

#[test]
fn sparse_matrices_take_the_cofactor_path() {
    // Mostly zeros: Auto must still agree with the dense algorithms.
    let x = Ex::symbol("x");
    let elems = vec![
        x.clone(),
        Ex::from(0),
        Ex::from(0),
        Ex::from(0),
        Ex::from(0),
        Ex::from(2),
        Ex::from(0),
        Ex::from(3),
        Ex::from(0),
    ];
    let m = Matrix::new(3, 3, elems).unwrap();
    let expected = Ex::from(-6) * &x;
    assert_eq!(determinant(&m, DetAlgo::Auto).unwrap(), expected);
    assert_eq!(determinant(&m, DetAlgo::Elimination).unwrap(), expected);
}

#[test]
fn solve_symbolic_system() {
    let x = Ex::symbol("x");
    // [[x, 1], [1, x]] * v = [1, 0]  =>  v = (x/(x^2-1), -1/(x^2-1))
    let a = Matrix::new(2, 2, vec![x.clone(), Ex::one(), Ex::one(), x.clone()]).unwrap();
    let b = Matrix::new(2, 1, vec![Ex::one(), Ex::zero()]).unwrap();
    let v = solve(&a, &b).unwrap();
    let den = (x.pow(2) - Ex::from(1)).pow(-1);
    assert_eq!(*v.get(0, 0).unwrap(), normal(&(&x * &den)).unwrap());
    assert_eq!(*v.get(1, 0).unwrap(), normal(&(-&den)).unwrap());
}

#[test]
fn inverse_of_symbolic_matrix_multiplies_to_identity() {
    let x = Ex::symbol("x");
    let a = Matrix::new(2, 2, vec![Ex::one(), x.clone(), Ex::zero(), Ex::one()]).unwrap();
    let inv = symcas::inverse(&a).unwrap();
    let prod = a.mul(&inv).unwrap();
    let id = Matrix::identity(2).unwrap();
    for i in 0..4 {
        assert_eq!(
            normal(&prod.elems()[i]).unwrap(),
            id.elems()[i],
            "entry {i}"
        );
    }
}

#[test]
fn matrices_participate_in_noncommutative_products() {
    let a = Ex::matrix(2, 2, (1..=4).map(Ex::from).collect()).unwrap();
    let b = Ex::matrix(2, 2, (5..=8).map(Ex::from).collect()).unwrap();
    let ab = a.nc_mul(&b);
    let ba = b.nc_mul(&a);
    assert_ne!(ab, ba);
    // scalars still commute out of the ordered product
    let x = Ex::symbol("x");
    let e = Ex::nc_mul_vec(vec![a.clone(), x.clone(), b.clone()]);
    assert_eq!(e, &x * a.nc_mul(&b));
}
