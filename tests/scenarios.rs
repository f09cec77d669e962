//! End-to-end scenarios against the public API.

use std::sync::Once;

use stql_monitor::ast::*;
use stql_monitor::datastream::{BoundingBox, Frame, Object};
use stql_monitor::eval::evaluate;
use stql_monitor::{requirements, Bound, Error, Monitor};

fn init_logging() {
    static INIT: Once = Once::new();
    INIT.call_once(|| {
        let _ = simplelog::SimpleLogger::init(
            simplelog::LevelFilter::Debug,
            simplelog::Config::default(),
        );
    });
}

fn object(class: i64, bbox: BoundingBox) -> Object {
    Object { class, probability: 0.9, bbox }
}

fn frame(t: f64, n: u64) -> Frame {
    Frame::new(t, n, 100.0, 100.0)
}

fn square(lo: f64, hi: f64) -> BoundingBox {
    BoundingBox::new(lo, hi, lo, hi)
}

fn sees_class(class: i64) -> Expr {
    Expr::exists(vec!["x"], class_of("x").eq(class)).unwrap()
}

#[test]
fn same_class_existence() {
    init_logging();
    let f = frame(0.0, 0)
        .with_object("a", object(1, square(10.0, 40.0)))
        .with_object("b", object(1, square(50.0, 80.0)));
    let phi = Expr::exists(
        vec!["x", "y"],
        ObjectVar::new("x").is_not("y") & class_of("x").eq(class_of("y")),
    )
    .unwrap();
    assert!(evaluate(&phi, &[f], 0));
}

#[test]
fn empty_frame_existential_is_false_universal_is_true() {
    init_logging();
    let f = frame(0.0, 0);
    let exists = Expr::exists(vec!["x"], class_of("x").eq(3)).unwrap();
    let forall = Expr::forall(vec!["x"], class_of("x").eq(3)).unwrap();
    assert!(!evaluate(&exists, &[f.clone()], 0));
    assert!(evaluate(&forall, &[f], 0));
}

#[test]
fn bounded_past_time_with_monitor_warm_up() {
    init_logging();
    // {t} . Sometimes ((x_t - C_TIME <= 2) & EXISTS {x} . Class(x) == 1)
    let phi = Pin::time("t")
        .dot(Expr::sometimes((TimeVar::new("t") - C_TIME).le(2.0) & sees_class(1)));

    // Direct evaluation with the full three-frame window: the sighting at
    // t = 0 is one second old at t = 1.
    let frames = vec![
        frame(0.0, 0).with_object("car", object(1, square(10.0, 40.0))),
        frame(1.0, 1),
        frame(2.0, 2),
    ];
    assert!(evaluate(&phi, &frames, 1));

    // A monitor that has only seen one frame is still warming up.
    let mut monitor = Monitor::new(phi, 1.0).unwrap();
    assert!(!monitor.evaluate(frames[0].clone()).unwrap());
}

#[test]
fn spatial_disjointness_via_intersection_area() {
    init_logging();
    let disjoint_pair = sp_area(SpatialExpr::bbox("x") & SpatialExpr::bbox("y")).lt(0.5);
    let phi = Expr::exists(
        vec!["x", "y"],
        ObjectVar::new("x").is_not("y") & disjoint_pair,
    )
    .unwrap();

    let apart = frame(0.0, 0)
        .with_object("a", object(1, square(10.0, 40.0)))
        .with_object("b", object(1, square(50.0, 80.0)));
    assert!(evaluate(&phi, &[apart], 0));

    let overlapping = frame(0.0, 0)
        .with_object("a", object(1, square(10.0, 40.0)))
        .with_object("b", object(1, square(30.0, 60.0)));
    assert!(!evaluate(&phi, &[overlapping], 0));
}

#[test]
fn distance_threshold_strict_vs_inclusive() {
    init_logging();
    // Centers at (5, 5) and (35, 5): exactly 30 apart.
    let f = frame(0.0, 0)
        .with_object("a", object(1, BoundingBox::new(0.0, 10.0, 0.0, 10.0)))
        .with_object("b", object(1, BoundingBox::new(30.0, 40.0, 0.0, 10.0)));

    let centers = || {
        dist(
            RefPoint::new("x", RefPointKind::Center),
            RefPoint::new("y", RefPointKind::Center),
        )
    };
    let strict = Expr::exists(
        vec!["x", "y"],
        ObjectVar::new("x").is_not("y") & centers().lt(30.0),
    )
    .unwrap();
    let inclusive = Expr::exists(
        vec!["x", "y"],
        ObjectVar::new("x").is_not("y") & centers().le(30.0),
    )
    .unwrap();
    assert!(!evaluate(&strict, &[f.clone()], 0));
    assert!(evaluate(&inclusive, &[f], 0));
}

#[test]
fn unmonitorable_formula_is_rejected() {
    init_logging();
    let phi = Expr::always(sees_class(1));
    match Monitor::new(phi, 1.0) {
        Err(Error::Unmonitorable { horizon, .. }) => assert_eq!(horizon, Bound::Unbounded),
        other => panic!("expected an unmonitorable error, got {:?}", other),
    }
}

#[test]
fn quantifier_duality_over_a_frame() {
    init_logging();
    let f = frame(0.0, 0)
        .with_object("a", object(1, square(10.0, 40.0)))
        .with_object("b", object(2, square(50.0, 80.0)));
    let body = || class_of("x").eq(1);
    let forall = Expr::forall(vec!["x"], body()).unwrap();
    let dual = Expr::negate(Expr::exists(vec!["x"], Expr::negate(body())).unwrap());
    assert_eq!(evaluate(&forall, &[f.clone()], 0), evaluate(&dual, &[f], 0));
}

#[test]
fn conjunction_horizon_dominates_children() {
    init_logging();
    let a = Expr::next(sees_class(1), 2).unwrap();
    let b = Expr::next(sees_class(2), 3).unwrap();
    let both = a.clone() & b.clone();
    let h = requirements(&both, 1.0).horizon;
    assert!(h >= requirements(&a, 1.0).horizon);
    assert!(h >= requirements(&b, 1.0).horizon);
}

#[test]
fn formatting_is_stable_across_rebuilds() {
    init_logging();
    let build = || {
        Pin::time("t")
            .dot(Expr::sometimes((TimeVar::new("t") - C_TIME).le(2.0) & sees_class(1)))
    };
    let (first, second) = (build(), build());
    assert_eq!(first, second);
    assert_eq!(first.to_string(), second.to_string());
    // Evaluation agrees between the two structurally equal handles.
    let f = frame(0.0, 0).with_object("car", object(1, square(10.0, 40.0)));
    assert_eq!(evaluate(&first, &[f.clone()], 0), evaluate(&second, &[f], 0));
}
