//! Factories and the formula-building DSL.
//!
//! Every variant has exactly one factory that enforces the construction
//! rules; the operator overloads and term builders below are sugar over
//! those factories. Rules that can actually be violated surface as
//! [`Error`](crate::Error) values; sugar that fixes the operator statically
//! (`.lt(..)`, `&`, `|`) cannot fail.

use std::ops::{BitAnd, BitOr, Not, Sub};

use crate::ast::*;
use crate::Error;

/// Placeholder for the timestamp of the frame under evaluation.
#[derive(Debug, Clone, Copy)]
pub struct CTime;
/// Placeholder for the number of the frame under evaluation.
#[derive(Debug, Clone, Copy)]
pub struct CFrame;

pub const C_TIME: CTime = CTime;
pub const C_FRAME: CFrame = CFrame;

/// `t - C_TIME`, waiting for a comparison to become a [`TimeBound`] atom.
#[derive(Debug, Clone)]
pub struct TimeDiff {
    var: TimeVar,
}

/// `f - C_FRAME`, waiting for a comparison to become a [`FrameBound`] atom.
#[derive(Debug, Clone)]
pub struct FrameDiff {
    var: FrameVar,
}

impl Sub<CTime> for TimeVar {
    type Output = TimeDiff;
    fn sub(self, _: CTime) -> TimeDiff {
        TimeDiff { var: self }
    }
}

impl Sub<CFrame> for FrameVar {
    type Output = FrameDiff;
    fn sub(self, _: CFrame) -> FrameDiff {
        FrameDiff { var: self }
    }
}

macro_rules! diff_comparisons {
    ($diff:ident, $value:ty, $factory:ident) => {
        impl $diff {
            pub fn lt(self, value: $value) -> Expr {
                Expr::$factory(self.var, CompareOp::LessThan, value)
                    .expect("ordering comparison cannot fail")
            }
            pub fn le(self, value: $value) -> Expr {
                Expr::$factory(self.var, CompareOp::LessEqual, value)
                    .expect("ordering comparison cannot fail")
            }
            pub fn gt(self, value: $value) -> Expr {
                Expr::$factory(self.var, CompareOp::GreaterThan, value)
                    .expect("ordering comparison cannot fail")
            }
            pub fn ge(self, value: $value) -> Expr {
                Expr::$factory(self.var, CompareOp::GreaterEqual, value)
                    .expect("ordering comparison cannot fail")
            }
        }
    };
}
diff_comparisons!(TimeDiff, f64, time_bound);
diff_comparisons!(FrameDiff, i64, frame_bound);

/// A frame pin: freezes the current timestamp and/or frame number under a
/// name. `Pin::time("t").dot(body)` builds the corresponding freeze
/// expression.
#[derive(Debug, Clone)]
pub struct Pin {
    time_var: Option<TimeVar>,
    frame_var: Option<FrameVar>,
}

impl Pin {
    pub fn time(var: impl Into<TimeVar>) -> Pin {
        Pin { time_var: Some(var.into()), frame_var: None }
    }

    pub fn frame(var: impl Into<FrameVar>) -> Pin {
        Pin { time_var: None, frame_var: Some(var.into()) }
    }

    pub fn both(time: impl Into<TimeVar>, frame: impl Into<FrameVar>) -> Pin {
        Pin { time_var: Some(time.into()), frame_var: Some(frame.into()) }
    }

    /// `{t, f} . body`
    pub fn dot(self, body: Expr) -> Expr {
        Expr::freeze(self.time_var, self.frame_var, body)
            .expect("a Pin always carries at least one variable")
    }
}

// Term builders.

pub fn class_of(var: impl Into<ObjectVar>) -> ClassTerm {
    ClassTerm { var: var.into() }
}

pub fn prob(var: impl Into<ObjectVar>) -> ProbTerm {
    ProbTerm { var: var.into(), scale: 1.0 }
}

pub fn area_of(var: impl Into<ObjectVar>) -> AreaTerm {
    AreaTerm { var: var.into(), scale: 1.0 }
}

pub fn dist(lhs: RefPoint, rhs: RefPoint) -> DistTerm {
    DistTerm { lhs, rhs, scale: 1.0 }
}

pub fn lat(point: RefPoint) -> LatTerm {
    LatTerm { point, scale: 1.0 }
}

pub fn lon(point: RefPoint) -> LonTerm {
    LonTerm { point, scale: 1.0 }
}

pub fn sp_area(arg: SpatialExpr) -> SpAreaTerm {
    SpAreaTerm { arg, scale: 1.0 }
}

macro_rules! impl_rhs_conversions {
    ($arg:ident: $($variant:ident($from:ty)),*) => {$(
        impl From<$from> for $arg {
            fn from(value: $from) -> $arg {
                $arg::$variant(value)
            }
        }
    )*};
}
impl_rhs_conversions!(ClassArg: Literal(i64), Class(ClassTerm));
impl_rhs_conversions!(ProbArg: Value(f64), Prob(ProbTerm));
impl_rhs_conversions!(AreaArg: Value(f64), Area(AreaTerm));
impl_rhs_conversions!(CoordArg: Value(f64), Lat(LatTerm), Lon(LonTerm));
impl_rhs_conversions!(SpAreaArg: Value(f64), Area(SpAreaTerm));

macro_rules! ordered_term_comparisons {
    ($term:ident, $arg:ident, $factory:ident) => {
        impl $term {
            pub fn lt(self, rhs: impl Into<$arg>) -> Expr {
                Expr::$factory(self, CompareOp::LessThan, rhs.into())
                    .expect("ordering comparison cannot fail")
            }
            pub fn le(self, rhs: impl Into<$arg>) -> Expr {
                Expr::$factory(self, CompareOp::LessEqual, rhs.into())
                    .expect("ordering comparison cannot fail")
            }
            pub fn gt(self, rhs: impl Into<$arg>) -> Expr {
                Expr::$factory(self, CompareOp::GreaterThan, rhs.into())
                    .expect("ordering comparison cannot fail")
            }
            pub fn ge(self, rhs: impl Into<$arg>) -> Expr {
                Expr::$factory(self, CompareOp::GreaterEqual, rhs.into())
                    .expect("ordering comparison cannot fail")
            }
        }
    };
}
ordered_term_comparisons!(ProbTerm, ProbArg, compare_prob);
ordered_term_comparisons!(AreaTerm, AreaArg, compare_area);
ordered_term_comparisons!(LatTerm, CoordArg, compare_lat);
ordered_term_comparisons!(LonTerm, CoordArg, compare_lon);
ordered_term_comparisons!(SpAreaTerm, SpAreaArg, compare_sp_area);

impl DistTerm {
    pub fn lt(self, rhs: f64) -> Expr {
        Expr::compare_dist(self, CompareOp::LessThan, rhs)
            .expect("ordering comparison cannot fail")
    }
    pub fn le(self, rhs: f64) -> Expr {
        Expr::compare_dist(self, CompareOp::LessEqual, rhs)
            .expect("ordering comparison cannot fail")
    }
    pub fn gt(self, rhs: f64) -> Expr {
        Expr::compare_dist(self, CompareOp::GreaterThan, rhs)
            .expect("ordering comparison cannot fail")
    }
    pub fn ge(self, rhs: f64) -> Expr {
        Expr::compare_dist(self, CompareOp::GreaterEqual, rhs)
            .expect("ordering comparison cannot fail")
    }
}

impl ClassTerm {
    pub fn eq(self, rhs: impl Into<ClassArg>) -> Expr {
        Expr::compare_class(self, CompareOp::Equal, rhs.into())
            .expect("equality comparison on classes cannot fail")
    }
    pub fn ne(self, rhs: impl Into<ClassArg>) -> Expr {
        Expr::compare_class(self, CompareOp::NotEqual, rhs.into())
            .expect("equality comparison on classes cannot fail")
    }
}

impl ObjectVar {
    /// `x == y` over object identities.
    pub fn is(&self, rhs: impl Into<ObjectVar>) -> Expr {
        Expr::compare_id(self.clone(), CompareOp::Equal, rhs.into())
            .expect("equality comparison on ids cannot fail")
    }

    /// `x != y` over object identities.
    pub fn is_not(&self, rhs: impl Into<ObjectVar>) -> Expr {
        Expr::compare_id(self.clone(), CompareOp::NotEqual, rhs.into())
            .expect("equality comparison on ids cannot fail")
    }
}

// Temporal expression factories.

impl Expr {
    pub fn constant(value: bool) -> Expr {
        Expr::from_kind(ExprKind::Const(value))
    }

    /// `var - C_TIME ~ value`. Equality is rejected; a negative `value`
    /// negates both sides, so the stored bound is non-negative.
    pub fn time_bound(
        var: impl Into<TimeVar>,
        op: CompareOp,
        value: f64,
    ) -> Result<Expr, Error> {
        if op.is_equality() {
            return Err(Error::ContinuousEquality { what: "time bounds", op });
        }
        let (op, value) = if value < 0.0 { (op.flipped(), -value) } else { (op, value) };
        Ok(Expr::from_kind(ExprKind::TimeBound(TimeBound { var: var.into(), op, value })))
    }

    /// `var - C_FRAME ~ value` with a non-negative frame count.
    pub fn frame_bound(
        var: impl Into<FrameVar>,
        op: CompareOp,
        value: i64,
    ) -> Result<Expr, Error> {
        if op.is_equality() {
            return Err(Error::ContinuousEquality { what: "frame bounds", op });
        }
        if value < 0 {
            return Err(Error::NegativeFrameBound(value));
        }
        Ok(Expr::from_kind(ExprKind::FrameBound(FrameBound { var: var.into(), op, value })))
    }

    pub fn compare_id(
        lhs: impl Into<ObjectVar>,
        op: CompareOp,
        rhs: impl Into<ObjectVar>,
    ) -> Result<Expr, Error> {
        if !op.is_equality() {
            return Err(Error::UnorderedComparison { what: "object identities", op });
        }
        Ok(Expr::from_kind(ExprKind::CompareId { lhs: lhs.into(), op, rhs: rhs.into() }))
    }

    pub fn compare_class(lhs: ClassTerm, op: CompareOp, rhs: ClassArg) -> Result<Expr, Error> {
        if !op.is_equality() {
            return Err(Error::UnorderedComparison { what: "object classes", op });
        }
        Ok(Expr::from_kind(ExprKind::CompareClass { lhs, op, rhs }))
    }

    pub fn compare_prob(lhs: ProbTerm, op: CompareOp, rhs: ProbArg) -> Result<Expr, Error> {
        if op.is_equality() {
            return Err(Error::ContinuousEquality { what: "probabilities", op });
        }
        Ok(Expr::from_kind(ExprKind::CompareProb { lhs, op, rhs }))
    }

    pub fn compare_area(lhs: AreaTerm, op: CompareOp, rhs: AreaArg) -> Result<Expr, Error> {
        if op.is_equality() {
            return Err(Error::ContinuousEquality { what: "areas", op });
        }
        Ok(Expr::from_kind(ExprKind::CompareArea { lhs, op, rhs }))
    }

    pub fn compare_dist(lhs: DistTerm, op: CompareOp, rhs: f64) -> Result<Expr, Error> {
        if op.is_equality() {
            return Err(Error::ContinuousEquality { what: "distances", op });
        }
        Ok(Expr::from_kind(ExprKind::CompareDist { lhs, op, rhs }))
    }

    pub fn compare_lat(lhs: LatTerm, op: CompareOp, rhs: CoordArg) -> Result<Expr, Error> {
        if op.is_equality() {
            return Err(Error::ContinuousEquality { what: "coordinates", op });
        }
        Ok(Expr::from_kind(ExprKind::CompareLat { lhs, op, rhs }))
    }

    pub fn compare_lon(lhs: LonTerm, op: CompareOp, rhs: CoordArg) -> Result<Expr, Error> {
        if op.is_equality() {
            return Err(Error::ContinuousEquality { what: "coordinates", op });
        }
        Ok(Expr::from_kind(ExprKind::CompareLon { lhs, op, rhs }))
    }

    pub fn compare_sp_area(
        lhs: SpAreaTerm,
        op: CompareOp,
        rhs: SpAreaArg,
    ) -> Result<Expr, Error> {
        if op.is_equality() {
            return Err(Error::ContinuousEquality { what: "region areas", op });
        }
        Ok(Expr::from_kind(ExprKind::CompareSpArea { lhs, op, rhs }))
    }

    /// The spatial expression denotes a non-empty region.
    pub fn spatial_exists(arg: SpatialExpr) -> Expr {
        Expr::from_kind(ExprKind::SpatialExists(arg))
    }

    /// The spatial expression covers the whole frame.
    pub fn spatial_forall(arg: SpatialExpr) -> Expr {
        Expr::from_kind(ExprKind::SpatialForall(arg))
    }

    /// `EXISTS {vars} . body`, instantiated over the ids of the frame under
    /// evaluation.
    pub fn exists<V: Into<ObjectVar>>(
        vars: impl IntoIterator<Item = V>,
        body: Expr,
    ) -> Result<Expr, Error> {
        let vars: Vec<ObjectVar> = vars.into_iter().map(Into::into).collect();
        if vars.is_empty() {
            return Err(Error::EmptyQuantifier);
        }
        Ok(Expr::from_kind(ExprKind::Exists { vars, body }))
    }

    /// `FORALL {vars} . body`.
    pub fn forall<V: Into<ObjectVar>>(
        vars: impl IntoIterator<Item = V>,
        body: Expr,
    ) -> Result<Expr, Error> {
        let vars: Vec<ObjectVar> = vars.into_iter().map(Into::into).collect();
        if vars.is_empty() {
            return Err(Error::EmptyQuantifier);
        }
        Ok(Expr::from_kind(ExprKind::Forall { vars, body }))
    }

    /// Captures the current timestamp and/or frame number under the given
    /// names for the scope of `body`. At least one variable must be given.
    pub fn freeze(
        time_var: Option<TimeVar>,
        frame_var: Option<FrameVar>,
        body: Expr,
    ) -> Result<Expr, Error> {
        if time_var.is_none() && frame_var.is_none() {
            return Err(Error::EmptyPin);
        }
        Ok(Expr::from_kind(ExprKind::Freeze { time_var, frame_var, body }))
    }

    /// Logical negation. `~~phi` collapses to `phi`, constants fold.
    pub fn negate(arg: Expr) -> Expr {
        match arg.kind() {
            ExprKind::Const(value) => return Expr::constant(!value),
            ExprKind::Not(inner) => return inner.clone(),
            _ => {}
        }
        Expr::from_kind(ExprKind::Not(arg))
    }

    /// N-ary conjunction. Flattens nested conjunctions, drops `true`,
    /// short-circuits on `false`, and deduplicates structurally equal
    /// operands, preserving first-occurrence order.
    pub fn and(args: Vec<Expr>) -> Result<Expr, Error> {
        if args.len() < 2 {
            return Err(Error::TooFewOperands { op: "And", found: args.len() });
        }
        let mut flat: Vec<Expr> = Vec::with_capacity(args.len());
        for arg in args {
            match arg.kind() {
                ExprKind::Const(false) => return Ok(Expr::constant(false)),
                ExprKind::Const(true) => continue,
                ExprKind::And(inner) => {
                    for e in inner {
                        if !flat.contains(e) {
                            flat.push(e.clone());
                        }
                    }
                    continue;
                }
                _ => {}
            }
            if !flat.contains(&arg) {
                flat.push(arg);
            }
        }
        Ok(match flat.len() {
            0 => Expr::constant(true),
            1 => flat.pop().expect("len checked"),
            _ => Expr::from_kind(ExprKind::And(flat)),
        })
    }

    /// N-ary disjunction, dual normalization to [`Expr::and`].
    pub fn or(args: Vec<Expr>) -> Result<Expr, Error> {
        if args.len() < 2 {
            return Err(Error::TooFewOperands { op: "Or", found: args.len() });
        }
        let mut flat: Vec<Expr> = Vec::with_capacity(args.len());
        for arg in args {
            match arg.kind() {
                ExprKind::Const(true) => return Ok(Expr::constant(true)),
                ExprKind::Const(false) => continue,
                ExprKind::Or(inner) => {
                    for e in inner {
                        if !flat.contains(e) {
                            flat.push(e.clone());
                        }
                    }
                    continue;
                }
                _ => {}
            }
            if !flat.contains(&arg) {
                flat.push(arg);
            }
        }
        Ok(match flat.len() {
            0 => Expr::constant(false),
            1 => flat.pop().expect("len checked"),
            _ => Expr::from_kind(ExprKind::Or(flat)),
        })
    }

    /// `arg` held `steps` frames ago.
    pub fn previous(arg: Expr, steps: usize) -> Result<Expr, Error> {
        if steps == 0 {
            return Err(Error::ZeroStep { op: "Previous" });
        }
        Ok(Expr::from_kind(ExprKind::Previous { arg, steps }))
    }

    /// `arg` holds `steps` frames ahead.
    pub fn next(arg: Expr, steps: usize) -> Result<Expr, Error> {
        if steps == 0 {
            return Err(Error::ZeroStep { op: "Next" });
        }
        Ok(Expr::from_kind(ExprKind::Next { arg, steps }))
    }

    /// `arg` held at every past frame (always in the past).
    pub fn holds(arg: Expr) -> Expr {
        Expr::from_kind(ExprKind::Holds(arg))
    }

    /// `arg` held at some past frame (once).
    pub fn sometimes(arg: Expr) -> Expr {
        Expr::from_kind(ExprKind::Sometimes(arg))
    }

    pub fn always(arg: Expr) -> Expr {
        Expr::from_kind(ExprKind::Always(arg))
    }

    pub fn eventually(arg: Expr) -> Expr {
        Expr::from_kind(ExprKind::Eventually(arg))
    }

    pub fn since(lhs: Expr, rhs: Expr) -> Expr {
        Expr::from_kind(ExprKind::Since(lhs, rhs))
    }

    pub fn back_to(lhs: Expr, rhs: Expr) -> Expr {
        Expr::from_kind(ExprKind::BackTo(lhs, rhs))
    }

    pub fn until(lhs: Expr, rhs: Expr) -> Expr {
        Expr::from_kind(ExprKind::Until(lhs, rhs))
    }

    pub fn release(lhs: Expr, rhs: Expr) -> Expr {
        Expr::from_kind(ExprKind::Release(lhs, rhs))
    }
}

impl BitAnd for Expr {
    type Output = Expr;
    fn bitand(self, rhs: Expr) -> Expr {
        Expr::and(vec![self, rhs]).expect("a binary conjunction has two operands")
    }
}

impl BitOr for Expr {
    type Output = Expr;
    fn bitor(self, rhs: Expr) -> Expr {
        Expr::or(vec![self, rhs]).expect("a binary disjunction has two operands")
    }
}

impl Not for Expr {
    type Output = Expr;
    fn not(self) -> Expr {
        Expr::negate(self)
    }
}

// Spatial expression factories.

impl SpatialExpr {
    pub fn empty_set() -> SpatialExpr {
        SpatialExpr::from_kind(SpatialKind::EmptySet)
    }

    pub fn universe_set() -> SpatialExpr {
        SpatialExpr::from_kind(SpatialKind::UniverseSet)
    }

    /// The bounding box of a bound object in the frame under evaluation.
    pub fn bbox(var: impl Into<ObjectVar>) -> SpatialExpr {
        SpatialExpr::from_kind(SpatialKind::BBox(var.into()))
    }

    /// Spatial complement. Double complements collapse, `EmptySet` and
    /// `UniverseSet` swap.
    pub fn complement(arg: SpatialExpr) -> SpatialExpr {
        match arg.kind() {
            SpatialKind::EmptySet => return SpatialExpr::universe_set(),
            SpatialKind::UniverseSet => return SpatialExpr::empty_set(),
            SpatialKind::Complement(inner) => return inner.clone(),
            _ => {}
        }
        SpatialExpr::from_kind(SpatialKind::Complement(arg))
    }

    /// N-ary intersection with identity `UniverseSet` and annihilator
    /// `EmptySet`; flattens and deduplicates like [`Expr::and`].
    pub fn intersect(args: Vec<SpatialExpr>) -> Result<SpatialExpr, Error> {
        if args.len() < 2 {
            return Err(Error::TooFewOperands { op: "Intersect", found: args.len() });
        }
        let mut flat: Vec<SpatialExpr> = Vec::with_capacity(args.len());
        for arg in args {
            match arg.kind() {
                SpatialKind::EmptySet => return Ok(SpatialExpr::empty_set()),
                SpatialKind::UniverseSet => continue,
                SpatialKind::Intersect(inner) => {
                    for e in inner {
                        if !flat.contains(e) {
                            flat.push(e.clone());
                        }
                    }
                    continue;
                }
                _ => {}
            }
            if !flat.contains(&arg) {
                flat.push(arg);
            }
        }
        Ok(match flat.len() {
            0 => SpatialExpr::universe_set(),
            1 => flat.pop().expect("len checked"),
            _ => SpatialExpr::from_kind(SpatialKind::Intersect(flat)),
        })
    }

    /// N-ary union with identity `EmptySet` and annihilator `UniverseSet`.
    pub fn union(args: Vec<SpatialExpr>) -> Result<SpatialExpr, Error> {
        if args.len() < 2 {
            return Err(Error::TooFewOperands { op: "Union", found: args.len() });
        }
        let mut flat: Vec<SpatialExpr> = Vec::with_capacity(args.len());
        for arg in args {
            match arg.kind() {
                SpatialKind::UniverseSet => return Ok(SpatialExpr::universe_set()),
                SpatialKind::EmptySet => continue,
                SpatialKind::Union(inner) => {
                    for e in inner {
                        if !flat.contains(e) {
                            flat.push(e.clone());
                        }
                    }
                    continue;
                }
                _ => {}
            }
            if !flat.contains(&arg) {
                flat.push(arg);
            }
        }
        Ok(match flat.len() {
            0 => SpatialExpr::empty_set(),
            1 => flat.pop().expect("len checked"),
            _ => SpatialExpr::from_kind(SpatialKind::Union(flat)),
        })
    }

    pub fn interior(arg: SpatialExpr) -> SpatialExpr {
        SpatialExpr::from_kind(SpatialKind::Interior(arg))
    }

    pub fn closure(arg: SpatialExpr) -> SpatialExpr {
        SpatialExpr::from_kind(SpatialKind::Closure(arg))
    }

    /// The region one frame earlier.
    pub fn previous(arg: SpatialExpr) -> SpatialExpr {
        SpatialExpr::from_kind(SpatialKind::Previous(arg))
    }

    /// Intersection of the region over the past window, optionally
    /// restricted to frame distances within `interval`.
    pub fn always(interval: Option<FrameInterval>, arg: SpatialExpr) -> SpatialExpr {
        SpatialExpr::from_kind(SpatialKind::Always { interval, arg })
    }

    /// Union of the region over the past window.
    pub fn sometimes(interval: Option<FrameInterval>, arg: SpatialExpr) -> SpatialExpr {
        SpatialExpr::from_kind(SpatialKind::Sometimes { interval, arg })
    }

    pub fn since(
        interval: Option<FrameInterval>,
        lhs: SpatialExpr,
        rhs: SpatialExpr,
    ) -> SpatialExpr {
        SpatialExpr::from_kind(SpatialKind::Since { interval, lhs, rhs })
    }

    pub fn back_to(
        interval: Option<FrameInterval>,
        lhs: SpatialExpr,
        rhs: SpatialExpr,
    ) -> SpatialExpr {
        SpatialExpr::from_kind(SpatialKind::BackTo { interval, lhs, rhs })
    }
}

impl BitAnd for SpatialExpr {
    type Output = SpatialExpr;
    fn bitand(self, rhs: SpatialExpr) -> SpatialExpr {
        SpatialExpr::intersect(vec![self, rhs]).expect("a binary intersection has two operands")
    }
}

impl BitOr for SpatialExpr {
    type Output = SpatialExpr;
    fn bitor(self, rhs: SpatialExpr) -> SpatialExpr {
        SpatialExpr::union(vec![self, rhs]).expect("a binary union has two operands")
    }
}

impl Not for SpatialExpr {
    type Output = SpatialExpr;
    fn not(self) -> SpatialExpr {
        SpatialExpr::complement(self)
    }
}


#[cfg(test)]
mod prop_tests {
    use super::*;
    use proptest::prelude::*;

    fn arb_leaf() -> impl Strategy<Value = Expr> {
        prop_oneof![
            any::<bool>().prop_map(Expr::constant),
            "[a-z]{1,4}".prop_map(|name| class_of(name.as_str()).eq(1)),
            "[a-z]{1,4}".prop_map(|name| prob(name.as_str()).ge(0.5)),
        ]
    }

    fn arb_expr() -> impl Strategy<Value = Expr> {
        arb_leaf().prop_recursive(4, 32, 4, |inner| {
            prop_oneof![
                inner.clone().prop_map(Expr::negate),
                prop::collection::vec(inner.clone(), 2..4)
                    .prop_map(|args| Expr::and(args).expect("at least two args")),
                prop::collection::vec(inner.clone(), 2..4)
                    .prop_map(|args| Expr::or(args).expect("at least two args")),
                inner.clone().prop_map(Expr::sometimes),
                (inner.clone(), inner).prop_map(|(a, b)| Expr::since(a, b)),
            ]
        })
    }

    proptest! {
        #[test]
        fn double_negation_is_identity(e in arb_expr()) {
            prop_assert_eq!(Expr::negate(Expr::negate(e.clone())), e);
        }

        #[test]
        fn conjunction_is_idempotent(e in arb_expr()) {
            prop_assert_eq!(Expr::and(vec![e.clone(), e.clone()]).unwrap(), e.clone());
            prop_assert_eq!(Expr::or(vec![e.clone(), e.clone()]).unwrap(), e);
        }

        #[test]
        fn true_is_identity_of_and(e in arb_expr()) {
            prop_assert_eq!(Expr::and(vec![Expr::constant(true), e.clone()]).unwrap(), e);
        }

        #[test]
        fn flattening_is_association_free(a in arb_expr(), b in arb_expr(), c in arb_expr()) {
            let left = Expr::and(vec![
                Expr::and(vec![a.clone(), b.clone()]).unwrap(),
                c.clone(),
            ]).unwrap();
            let right = Expr::and(vec![
                a.clone(),
                Expr::and(vec![b.clone(), c.clone()]).unwrap(),
            ]).unwrap();
            let flat = Expr::and(vec![a, b, c]).unwrap();
            prop_assert_eq!(left.clone(), flat.clone());
            prop_assert_eq!(right, flat);
        }
    }
}
