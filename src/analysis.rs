//! Buffer-requirements analysis.
//!
//! [`requirements`] walks a formula once and reports how many past frames
//! (history) and future frames (horizon) an online monitor must buffer to
//! evaluate it at a frame, or [`Bound::Unbounded`] when no finite buffer
//! suffices. A formula is online-monitorable iff its *horizon* is finite:
//! an unbounded history can be served by retaining the stream prefix seen
//! so far, while an unbounded horizon would postpone every verdict forever.
//!
//! Metric-bound atoms (`x - C_TIME ~ c`, `f - C_FRAME ~ c`) are the only
//! source of finite windows: with `<`/`<=` they reach `ceil(c * fps)` frames
//! (one more for `<=`, which includes the endpoint frame); with `>`/`>=`
//! they are satisfied only arbitrarily far away and contribute no finite
//! window. A finite bound appearing in a conjunction *tightens* an otherwise
//! unbounded body — this is what makes the common `{t} . Sometimes (bound &
//! phi)` specifications monitorable.

use std::fmt;

use crate::ast::{
    CompareOp, Expr, ExprKind, FrameBound, SpAreaArg, SpatialExpr, SpatialKind, TimeBound,
};

/// A number of frames, or no finite number at all.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Bound {
    Unbounded,
    Bounded(usize),
}

impl PartialOrd for Bound {
    fn partial_cmp(&self, other: &Self) -> Option<std::cmp::Ordering> {
        use std::cmp::Ordering;
        use Bound::*;
        match (self, other) {
            (Unbounded, Unbounded) => None,
            (Bounded(_), Unbounded) => Some(Ordering::Less),
            (Unbounded, Bounded(_)) => Some(Ordering::Greater),
            (Bounded(a), Bounded(b)) => Some(a.cmp(b)),
        }
    }
}

impl fmt::Display for Bound {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Bound::Unbounded => f.write_str("unbounded"),
            Bound::Bounded(frames) => write!(f, "{}", frames),
        }
    }
}

impl Bound {
    pub fn is_finite(self) -> bool {
        matches!(self, Bound::Bounded(_))
    }

    pub fn as_finite(self) -> Option<usize> {
        match self {
            Bound::Bounded(frames) => Some(frames),
            Bound::Unbounded => None,
        }
    }

    /// Plain sum; `Unbounded` absorbs.
    fn add(self, other: Bound) -> Bound {
        match (self, other) {
            (Bound::Bounded(a), Bound::Bounded(b)) => Bound::Bounded(a + b),
            _ => Bound::Unbounded,
        }
    }

    /// Interval union: the larger reach wins, `Unbounded` absorbs.
    fn union(self, other: Bound) -> Bound {
        match (self, other) {
            (Bound::Bounded(a), Bound::Bounded(b)) => Bound::Bounded(a.max(b)),
            _ => Bound::Unbounded,
        }
    }

    /// Interval intersection, conservatively the max of finite endpoints; a
    /// finite bound tightens an unbounded one.
    fn tighten(self, other: Bound) -> Bound {
        match (self, other) {
            (Bound::Bounded(a), Bound::Bounded(b)) => Bound::Bounded(a.max(b)),
            (Bound::Bounded(a), Bound::Unbounded) => Bound::Bounded(a),
            (Bound::Unbounded, Bound::Bounded(b)) => Bound::Bounded(b),
            (Bound::Unbounded, Bound::Unbounded) => Bound::Unbounded,
        }
    }

    /// Additive combination where a finite side bounds an unbounded one.
    fn add_windows(self, other: Bound) -> Bound {
        match (self, other) {
            (Bound::Bounded(a), Bound::Bounded(b)) => Bound::Bounded(a + b),
            (Bound::Bounded(a), Bound::Unbounded) => Bound::Bounded(a),
            (Bound::Unbounded, Bound::Bounded(b)) => Bound::Bounded(b),
            (Bound::Unbounded, Bound::Unbounded) => Bound::Unbounded,
        }
    }
}

/// How many past and future frames a formula needs at each evaluation point.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Requirements {
    pub history: Bound,
    pub horizon: Bound,
}

impl Requirements {
    const ZERO: Requirements = Requirements { history: Bound::Bounded(0), horizon: Bound::Bounded(0) };

    /// Online-monitorable: the verdict at each frame needs only finitely
    /// many future frames. The history side never disqualifies a formula —
    /// at worst the monitor keeps every frame seen so far.
    pub fn is_monitorable(&self) -> bool {
        self.horizon.is_finite()
    }

    fn map(self, f: impl Fn(Bound) -> Bound) -> Requirements {
        Requirements { history: f(self.history), horizon: f(self.horizon) }
    }

    fn zip(self, other: Requirements, f: impl Fn(Bound, Bound) -> Bound) -> Requirements {
        Requirements {
            history: f(self.history, other.history),
            horizon: f(self.horizon, other.horizon),
        }
    }
}

/// The window a time bound can reach, in frames.
fn time_bound_window(bound: &TimeBound, fps: f64) -> Bound {
    match bound.op {
        CompareOp::LessThan => Bound::Bounded((bound.value * fps).ceil() as usize),
        CompareOp::LessEqual => Bound::Bounded((bound.value * fps).ceil() as usize + 1),
        _ => Bound::Unbounded,
    }
}

fn frame_bound_window(bound: &FrameBound) -> Bound {
    match bound.op {
        CompareOp::LessThan => Bound::Bounded(bound.value as usize),
        CompareOp::LessEqual => Bound::Bounded(bound.value as usize + 1),
        _ => Bound::Unbounded,
    }
}

fn is_bound_leaf(expr: &Expr) -> bool {
    matches!(expr.kind(), ExprKind::TimeBound(_) | ExprKind::FrameBound(_))
}

/// Does the subtree contain a metric bound that actually cuts the window
/// (`<` or `<=`)? Unbounded temporal operators stay unbounded without one.
fn has_window_bound(expr: &Expr) -> bool {
    match expr.kind() {
        ExprKind::TimeBound(tb) => {
            matches!(tb.op, CompareOp::LessThan | CompareOp::LessEqual)
        }
        ExprKind::FrameBound(fb) => {
            matches!(fb.op, CompareOp::LessThan | CompareOp::LessEqual)
        }
        ExprKind::Const(_)
        | ExprKind::CompareId { .. }
        | ExprKind::CompareClass { .. }
        | ExprKind::CompareProb { .. }
        | ExprKind::CompareArea { .. }
        | ExprKind::CompareDist { .. }
        | ExprKind::CompareLat { .. }
        | ExprKind::CompareLon { .. }
        | ExprKind::CompareSpArea { .. }
        | ExprKind::SpatialExists(_)
        | ExprKind::SpatialForall(_) => false,
        ExprKind::Exists { body, .. }
        | ExprKind::Forall { body, .. }
        | ExprKind::Freeze { body, .. } => has_window_bound(body),
        ExprKind::Not(arg)
        | ExprKind::Previous { arg, .. }
        | ExprKind::Next { arg, .. }
        | ExprKind::Holds(arg)
        | ExprKind::Sometimes(arg)
        | ExprKind::Always(arg)
        | ExprKind::Eventually(arg) => has_window_bound(arg),
        ExprKind::And(args) | ExprKind::Or(args) => args.iter().any(has_window_bound),
        ExprKind::Since(lhs, rhs)
        | ExprKind::BackTo(lhs, rhs)
        | ExprKind::Until(lhs, rhs)
        | ExprKind::Release(lhs, rhs) => has_window_bound(lhs) || has_window_bound(rhs),
    }
}

/// `Unbounded` unless the child is finite by virtue of a window bound.
fn unless_guarded(child: Bound, arg: &Expr) -> Bound {
    if child.is_finite() && has_window_bound(arg) {
        child
    } else {
        Bound::Unbounded
    }
}

fn analyze(expr: &Expr, fps: f64) -> Requirements {
    match expr.kind() {
        ExprKind::Const(_)
        | ExprKind::CompareId { .. }
        | ExprKind::CompareClass { .. }
        | ExprKind::CompareProb { .. }
        | ExprKind::CompareArea { .. }
        | ExprKind::CompareDist { .. }
        | ExprKind::CompareLat { .. }
        | ExprKind::CompareLon { .. } => Requirements::ZERO,

        // A bound's window is direction-agnostic: the frozen variable can
        // refer to frames on either side of the freeze point.
        ExprKind::TimeBound(tb) => {
            let window = time_bound_window(tb, fps);
            Requirements { history: window, horizon: window }
        }
        ExprKind::FrameBound(fb) => {
            let window = frame_bound_window(fb);
            Requirements { history: window, horizon: window }
        }

        ExprKind::CompareSpArea { lhs, rhs, .. } => {
            let lhs_req = analyze_spatial(&lhs.arg);
            let rhs_req = match rhs {
                SpAreaArg::Value(_) => Requirements::ZERO,
                SpAreaArg::Area(term) => analyze_spatial(&term.arg),
            };
            lhs_req.zip(rhs_req, Bound::union)
        }

        ExprKind::SpatialExists(arg) | ExprKind::SpatialForall(arg) => analyze_spatial(arg),

        ExprKind::Exists { body, .. }
        | ExprKind::Forall { body, .. }
        | ExprKind::Freeze { body, .. } => analyze(body, fps),

        ExprKind::Not(arg) => analyze(arg, fps),

        ExprKind::And(args) => {
            let body = args
                .iter()
                .filter(|arg| !is_bound_leaf(arg))
                .fold(Requirements::ZERO, |acc, arg| {
                    acc.zip(analyze(arg, fps), Bound::add)
                });
            let bounds = args
                .iter()
                .filter(|arg| is_bound_leaf(arg))
                .fold(
                    Requirements { history: Bound::Unbounded, horizon: Bound::Unbounded },
                    |acc, arg| acc.zip(analyze(arg, fps), Bound::tighten),
                );
            body.zip(bounds, Bound::tighten)
        }

        ExprKind::Or(args) => {
            let body = args
                .iter()
                .filter(|arg| !is_bound_leaf(arg))
                .fold(Requirements::ZERO, |acc, arg| {
                    acc.zip(analyze(arg, fps), Bound::add)
                });
            let bounds = args
                .iter()
                .filter(|arg| is_bound_leaf(arg))
                .fold(
                    Requirements { history: Bound::Unbounded, horizon: Bound::Unbounded },
                    |acc, arg| acc.zip(analyze(arg, fps), Bound::union),
                );
            body.zip(bounds, Bound::add_windows)
        }

        ExprKind::Previous { arg, steps } => {
            let req = analyze(arg, fps);
            Requirements { history: req.history.add(Bound::Bounded(*steps)), horizon: req.horizon }
        }
        ExprKind::Next { arg, steps } => {
            let req = analyze(arg, fps);
            Requirements { history: req.history, horizon: req.horizon.add(Bound::Bounded(*steps)) }
        }

        ExprKind::Holds(arg) | ExprKind::Sometimes(arg) => {
            let req = analyze(arg, fps);
            Requirements { history: unless_guarded(req.history, arg), horizon: req.horizon }
        }
        ExprKind::Always(arg) | ExprKind::Eventually(arg) => {
            let req = analyze(arg, fps);
            Requirements { history: req.history, horizon: unless_guarded(req.horizon, arg) }
        }

        ExprKind::Since(lhs, rhs)
        | ExprKind::BackTo(lhs, rhs)
        | ExprKind::Until(lhs, rhs)
        | ExprKind::Release(lhs, rhs) => {
            analyze(lhs, fps).zip(analyze(rhs, fps), Bound::union)
        }
    }
}

fn analyze_spatial(expr: &SpatialExpr) -> Requirements {
    match expr.kind() {
        SpatialKind::EmptySet | SpatialKind::UniverseSet | SpatialKind::BBox(_) => {
            Requirements::ZERO
        }
        SpatialKind::Complement(arg)
        | SpatialKind::Interior(arg)
        | SpatialKind::Closure(arg) => analyze_spatial(arg),
        SpatialKind::Intersect(args) | SpatialKind::Union(args) => args
            .iter()
            .fold(Requirements::ZERO, |acc, arg| acc.zip(analyze_spatial(arg), Bound::union)),
        SpatialKind::Previous(arg) => {
            let req = analyze_spatial(arg);
            Requirements { history: req.history.add(Bound::Bounded(1)), horizon: req.horizon }
        }
        SpatialKind::Always { interval, arg } | SpatialKind::Sometimes { interval, arg } => {
            let req = analyze_spatial(arg);
            let history = match interval {
                Some(i) => req.history.add(Bound::Bounded(i.reach())),
                None => Bound::Unbounded,
            };
            Requirements { history, horizon: req.horizon }
        }
        SpatialKind::Since { interval, lhs, rhs }
        | SpatialKind::BackTo { interval, lhs, rhs } => {
            let req = analyze_spatial(lhs).zip(analyze_spatial(rhs), Bound::union);
            let history = match interval {
                Some(i) => req.history.add(Bound::Bounded(i.reach())),
                None => req.history,
            };
            Requirements { history, horizon: req.horizon }
        }
    }
}

/// Computes the frame-buffer requirements of `formula` for a stream running
/// at `fps` frames per second.
pub fn requirements(formula: &Expr, fps: f64) -> Requirements {
    assert!(fps > 0.0, "frames per second must be positive");
    let req = analyze(formula, fps);
    log::debug!("requirements of {}: history {}, horizon {}", formula, req.history, req.horizon);
    req
}

/// True iff the formula contains no future-time operator anywhere. The
/// spatial lifts are all past-time.
pub fn is_past_time(formula: &Expr) -> bool {
    match formula.kind() {
        ExprKind::Next { .. }
        | ExprKind::Always(_)
        | ExprKind::Eventually(_)
        | ExprKind::Until(_, _)
        | ExprKind::Release(_, _) => false,
        ExprKind::Const(_)
        | ExprKind::TimeBound(_)
        | ExprKind::FrameBound(_)
        | ExprKind::CompareId { .. }
        | ExprKind::CompareClass { .. }
        | ExprKind::CompareProb { .. }
        | ExprKind::CompareArea { .. }
        | ExprKind::CompareDist { .. }
        | ExprKind::CompareLat { .. }
        | ExprKind::CompareLon { .. }
        | ExprKind::CompareSpArea { .. }
        | ExprKind::SpatialExists(_)
        | ExprKind::SpatialForall(_) => true,
        ExprKind::Exists { body, .. }
        | ExprKind::Forall { body, .. }
        | ExprKind::Freeze { body, .. } => is_past_time(body),
        ExprKind::Not(arg)
        | ExprKind::Previous { arg, .. }
        | ExprKind::Holds(arg)
        | ExprKind::Sometimes(arg) => is_past_time(arg),
        ExprKind::And(args) | ExprKind::Or(args) => args.iter().all(is_past_time),
        ExprKind::Since(lhs, rhs) | ExprKind::BackTo(lhs, rhs) => {
            is_past_time(lhs) && is_past_time(rhs)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ast::*;

    fn p() -> Expr {
        Expr::exists(vec!["x"], class_of("x").eq(1)).unwrap()
    }

    fn time_guard(seconds: f64) -> Expr {
        (TimeVar::new("t") - C_TIME).le(seconds)
    }

    #[test]
    fn leaves_need_nothing() {
        let req = requirements(&p(), 10.0);
        assert_eq!(req, Requirements { history: Bound::Bounded(0), horizon: Bound::Bounded(0) });
        assert!(req.is_monitorable());
    }

    #[test]
    fn time_bound_window_in_frames() {
        // 2 seconds at 1 fps: 2 frames, plus the endpoint frame for `<=`.
        let req = requirements(&time_guard(2.0), 1.0);
        assert_eq!(req.history, Bound::Bounded(3));

        let strict = (TimeVar::new("t") - C_TIME).lt(2.0);
        assert_eq!(requirements(&strict, 1.0).history, Bound::Bounded(2));

        // At 10 fps the same bound reaches 20 frames.
        assert_eq!(requirements(&strict, 10.0).history, Bound::Bounded(20));
    }

    #[test]
    fn frame_bound_window() {
        let lt = (FrameVar::new("n") - C_FRAME).lt(5);
        assert_eq!(requirements(&lt, 1.0).history, Bound::Bounded(5));
        let le = (FrameVar::new("n") - C_FRAME).le(5);
        assert_eq!(requirements(&le, 1.0).history, Bound::Bounded(6));
    }

    #[test]
    fn lower_bounds_are_unbounded() {
        let ge = (TimeVar::new("t") - C_TIME).ge(2.0);
        assert_eq!(requirements(&ge, 1.0).history, Bound::Unbounded);
    }

    #[test]
    fn bounded_past_specification() {
        // {t} . Sometimes ((x_t - C_TIME <= 2) & EXISTS {x} . Class(x) == 1)
        let phi = Pin::time("t").dot(Expr::sometimes(time_guard(2.0) & p()));
        let req = requirements(&phi, 1.0);
        assert_eq!(req.history, Bound::Bounded(3));
        assert!(req.is_monitorable());
        assert!(is_past_time(&phi));
    }

    #[test]
    fn bound_tightens_unbounded_body() {
        // The bound sits beside the unbounded operator in the conjunction.
        let phi = Pin::time("t").dot(Expr::sometimes(p()) & time_guard(2.0));
        let req = requirements(&phi, 1.0);
        assert_eq!(req.history, Bound::Bounded(3));
    }

    #[test]
    fn unguarded_sometimes_is_unbounded() {
        let phi = Expr::sometimes(p());
        let req = requirements(&phi, 1.0);
        assert_eq!(req.history, Bound::Unbounded);
        assert_eq!(req.horizon, Bound::Bounded(0));
        // An unbounded past does not break online monitorability; only the
        // horizon gates it.
        assert!(req.is_monitorable());
    }

    #[test]
    fn lower_bound_does_not_guard() {
        let phi = Expr::sometimes((TimeVar::new("t") - C_TIME).ge(2.0) & p());
        assert_eq!(requirements(&phi, 1.0).history, Bound::Unbounded);
    }

    #[test]
    fn unbounded_always_is_not_monitorable() {
        let phi = Expr::always(p());
        let req = requirements(&phi, 1.0);
        assert_eq!(req.horizon, Bound::Unbounded);
        assert!(!req.is_monitorable());
        assert!(!is_past_time(&phi));
    }

    #[test]
    fn guard_under_disjunction_bounds_always() {
        // G (phi | ~(x_t - C_TIME <= 2)): the negated bound caps the window.
        let phi = Expr::always(p() | !time_guard(2.0));
        let req = requirements(&phi, 1.0);
        assert_eq!(req.horizon, Bound::Bounded(3));
    }

    #[test]
    fn previous_and_next_add_steps() {
        let phi = Expr::previous(Expr::previous(p(), 2).unwrap(), 1).unwrap();
        let req = requirements(&phi, 1.0);
        assert_eq!(req.history, Bound::Bounded(3));
        assert_eq!(req.horizon, Bound::Bounded(0));

        let psi = Expr::next(p(), 4).unwrap();
        assert_eq!(requirements(&psi, 1.0).horizon, Bound::Bounded(4));
    }

    #[test]
    fn since_takes_the_max_of_children() {
        let phi = Expr::since(Expr::previous(p(), 2).unwrap(), Expr::previous(p(), 5).unwrap());
        assert_eq!(requirements(&phi, 1.0).history, Bound::Bounded(5));
    }

    #[test]
    fn horizon_of_conjunction_dominates_children() {
        let a = Expr::next(p(), 2).unwrap();
        let b = Expr::next(p(), 3).unwrap();
        let both = a.clone() & b.clone();
        let h = requirements(&both, 1.0).horizon;
        assert!(h >= requirements(&a, 1.0).horizon);
        assert!(h >= requirements(&b, 1.0).horizon);
    }

    #[test]
    fn spatial_interval_reach() {
        let region = SpatialExpr::sometimes(
            Some(FrameInterval::closed(0, 3).unwrap()),
            SpatialExpr::bbox("x"),
        );
        let phi = Expr::exists(vec!["x"], sp_area(region).gt(10.0)).unwrap();
        // Closed interval includes the endpoint frame.
        assert_eq!(requirements(&phi, 1.0).history, Bound::Bounded(4));
    }

    #[test]
    fn spatial_without_interval_is_unbounded() {
        let region = SpatialExpr::always(None, SpatialExpr::bbox("x"));
        let phi = Expr::exists(vec!["x"], sp_area(region).gt(10.0)).unwrap();
        assert_eq!(requirements(&phi, 1.0).history, Bound::Unbounded);
    }

    #[test]
    fn spatial_previous_adds_one() {
        let region = SpatialExpr::previous(SpatialExpr::bbox("x"));
        let phi = Expr::exists(vec!["x"], sp_area(region).gt(10.0)).unwrap();
        assert_eq!(requirements(&phi, 1.0).history, Bound::Bounded(1));
    }

    #[test]
    fn until_and_release_follow_their_children() {
        let phi = Expr::until(Expr::next(p(), 2).unwrap(), Expr::next(p(), 4).unwrap());
        assert_eq!(requirements(&phi, 1.0).horizon, Bound::Bounded(4));
        assert!(!is_past_time(&phi));

        let psi = Expr::release(p(), Expr::previous(p(), 3).unwrap());
        assert_eq!(requirements(&psi, 1.0).history, Bound::Bounded(3));
    }

    #[test]
    fn disjunction_sums_regular_children() {
        let a = Expr::previous(p(), 2).unwrap();
        let b = Expr::previous(p(), 3).unwrap();
        let req = requirements(&(a | b), 1.0);
        assert_eq!(req.history, Bound::Bounded(5));
    }

    #[test]
    fn spatial_quantifiers_delegate() {
        let region = SpatialExpr::sometimes(
            Some(FrameInterval::ropen(0, 2).unwrap()),
            SpatialExpr::bbox("x"),
        );
        let phi = Expr::exists(vec!["x"], Expr::spatial_exists(region)).unwrap();
        assert_eq!(requirements(&phi, 1.0).history, Bound::Bounded(2));
        assert!(is_past_time(&phi));
    }

    #[test]
    fn bound_ordering_mirrors_storage_cost() {
        assert!(Bound::Bounded(3) < Bound::Unbounded);
        assert!(Bound::Unbounded > Bound::Bounded(1_000));
        assert_eq!(Bound::Unbounded.partial_cmp(&Bound::Unbounded), None);
    }
}
