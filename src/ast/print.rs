//! Canonical textual representation of formulas, for debugging and logging.
//!
//! The notation follows the conventional STQL rendering: variables are
//! prefixed by their sort (`x_` time, `f_` frame, `id_` object), metric
//! bounds read `(x_t - C_TIME <= 2)`, and temporal operators use their
//! textual names (`Prev`, `Holds`, `Sometimes`, `Alw`, `Ev`, infix `Since`).

use std::fmt;

use crate::ast::*;

impl fmt::Display for CompareOp {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let symbol = match self {
            CompareOp::LessThan => "<",
            CompareOp::LessEqual => "<=",
            CompareOp::GreaterThan => ">",
            CompareOp::GreaterEqual => ">=",
            CompareOp::Equal => "==",
            CompareOp::NotEqual => "!=",
        };
        f.write_str(symbol)
    }
}

impl fmt::Display for TimeVar {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "x_{}", self.name)
    }
}

impl fmt::Display for FrameVar {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "f_{}", self.name)
    }
}

impl fmt::Display for ObjectVar {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "id_{}", self.name)
    }
}

impl fmt::Display for RefPoint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let kind = match self.kind {
            RefPointKind::Center => "CT",
            RefPointKind::LeftMargin => "LM",
            RefPointKind::RightMargin => "RM",
            RefPointKind::TopMargin => "TM",
            RefPointKind::BottomMargin => "BM",
        };
        write!(f, "{}({})", kind, self.var)
    }
}

/// Writes `scale * ` unless the scale is 1.
fn write_scale(f: &mut fmt::Formatter<'_>, scale: f64) -> fmt::Result {
    if scale != 1.0 {
        write!(f, "{} * ", scale)?;
    }
    Ok(())
}

impl fmt::Display for ClassTerm {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Class({})", self.var)
    }
}

impl fmt::Display for ProbTerm {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write_scale(f, self.scale)?;
        write!(f, "Prob({})", self.var)
    }
}

impl fmt::Display for AreaTerm {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write_scale(f, self.scale)?;
        write!(f, "Area({})", self.var)
    }
}

impl fmt::Display for DistTerm {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write_scale(f, self.scale)?;
        write!(f, "ED({}, {})", self.lhs, self.rhs)
    }
}

impl fmt::Display for LatTerm {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write_scale(f, self.scale)?;
        write!(f, "Lat({})", self.point)
    }
}

impl fmt::Display for LonTerm {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write_scale(f, self.scale)?;
        write!(f, "Lon({})", self.point)
    }
}

impl fmt::Display for SpAreaTerm {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write_scale(f, self.scale)?;
        write!(f, "Area({})", self.arg)
    }
}

impl fmt::Display for ClassArg {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ClassArg::Literal(value) => write!(f, "{}", value),
            ClassArg::Class(term) => write!(f, "{}", term),
        }
    }
}

impl fmt::Display for ProbArg {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ProbArg::Value(value) => write!(f, "{}", value),
            ProbArg::Prob(term) => write!(f, "{}", term),
        }
    }
}

impl fmt::Display for AreaArg {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AreaArg::Value(value) => write!(f, "{}", value),
            AreaArg::Area(term) => write!(f, "{}", term),
        }
    }
}

impl fmt::Display for CoordArg {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CoordArg::Value(value) => write!(f, "{}", value),
            CoordArg::Lat(term) => write!(f, "{}", term),
            CoordArg::Lon(term) => write!(f, "{}", term),
        }
    }
}

impl fmt::Display for SpAreaArg {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SpAreaArg::Value(value) => write!(f, "{}", value),
            SpAreaArg::Area(term) => write!(f, "{}", term),
        }
    }
}

impl fmt::Display for FrameInterval {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.kind {
            IntervalKind::Open => write!(f, "({}, {})", self.lo, self.hi),
            IntervalKind::LeftOpen => write!(f, "({}, {}]", self.lo, self.hi),
            IntervalKind::RightOpen => write!(f, "[{}, {})", self.lo, self.hi),
            IntervalKind::Closed => write!(f, "[{}, {}]", self.lo, self.hi),
        }
    }
}

fn write_joined<T: fmt::Display>(
    f: &mut fmt::Formatter<'_>,
    items: &[T],
    separator: &str,
) -> fmt::Result {
    for (i, item) in items.iter().enumerate() {
        if i > 0 {
            f.write_str(separator)?;
        }
        write!(f, "{}", item)?;
    }
    Ok(())
}

impl fmt::Display for Expr {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.kind() {
            ExprKind::Const(value) => write!(f, "{}", value),
            ExprKind::TimeBound(tb) => {
                write!(f, "({} - C_TIME {} {})", tb.var, tb.op, tb.value)
            }
            ExprKind::FrameBound(fb) => {
                write!(f, "({} - C_FRAME {} {})", fb.var, fb.op, fb.value)
            }
            ExprKind::CompareId { lhs, op, rhs } => write!(f, "({} {} {})", lhs, op, rhs),
            ExprKind::CompareClass { lhs, op, rhs } => write!(f, "({} {} {})", lhs, op, rhs),
            ExprKind::CompareProb { lhs, op, rhs } => write!(f, "({} {} {})", lhs, op, rhs),
            ExprKind::CompareArea { lhs, op, rhs } => write!(f, "({} {} {})", lhs, op, rhs),
            ExprKind::CompareDist { lhs, op, rhs } => write!(f, "({} {} {})", lhs, op, rhs),
            ExprKind::CompareLat { lhs, op, rhs } => write!(f, "({} {} {})", lhs, op, rhs),
            ExprKind::CompareLon { lhs, op, rhs } => write!(f, "({} {} {})", lhs, op, rhs),
            ExprKind::CompareSpArea { lhs, op, rhs } => write!(f, "({} {} {})", lhs, op, rhs),
            ExprKind::SpatialExists(arg) => write!(f, "SPEXISTS ({})", arg),
            ExprKind::SpatialForall(arg) => write!(f, "SPFORALL ({})", arg),
            ExprKind::Exists { vars, body } => {
                f.write_str("EXISTS {")?;
                write_joined(f, vars, ", ")?;
                write!(f, "}} . {}", body)
            }
            ExprKind::Forall { vars, body } => {
                f.write_str("FORALL {")?;
                write_joined(f, vars, ", ")?;
                write!(f, "}} . {}", body)
            }
            ExprKind::Freeze { time_var, frame_var, body } => {
                f.write_str("{")?;
                match (time_var, frame_var) {
                    (Some(t), Some(n)) => write!(f, "{}, {}", t, n)?,
                    (Some(t), None) => write!(f, "{}", t)?,
                    (None, Some(n)) => write!(f, "{}", n)?,
                    (None, None) => unreachable!("rejected at construction"),
                }
                write!(f, "}} . {}", body)
            }
            ExprKind::Not(arg) => write!(f, "~{}", arg),
            ExprKind::And(args) => {
                f.write_str("(")?;
                write_joined(f, args, " & ")?;
                f.write_str(")")
            }
            ExprKind::Or(args) => {
                f.write_str("(")?;
                write_joined(f, args, " | ")?;
                f.write_str(")")
            }
            ExprKind::Previous { arg, steps } if *steps == 1 => write!(f, "Prev {}", arg),
            ExprKind::Previous { arg, steps } => write!(f, "Prev[{}] {}", steps, arg),
            ExprKind::Next { arg, steps } if *steps == 1 => write!(f, "Next {}", arg),
            ExprKind::Next { arg, steps } => write!(f, "Next[{}] {}", steps, arg),
            ExprKind::Holds(arg) => write!(f, "Holds {}", arg),
            ExprKind::Sometimes(arg) => write!(f, "Sometimes {}", arg),
            ExprKind::Always(arg) => write!(f, "Alw {}", arg),
            ExprKind::Eventually(arg) => write!(f, "Ev {}", arg),
            ExprKind::Since(lhs, rhs) => write!(f, "({} Since {})", lhs, rhs),
            ExprKind::BackTo(lhs, rhs) => write!(f, "({} BackTo {})", lhs, rhs),
            ExprKind::Until(lhs, rhs) => write!(f, "({} Until {})", lhs, rhs),
            ExprKind::Release(lhs, rhs) => write!(f, "({} Release {})", lhs, rhs),
        }
    }
}

impl fmt::Display for SpatialExpr {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.kind() {
            SpatialKind::EmptySet => f.write_str("EMPTYSET"),
            SpatialKind::UniverseSet => f.write_str("UNIVERSESET"),
            SpatialKind::BBox(var) => write!(f, "BBox({})", var),
            SpatialKind::Complement(arg) => write!(f, "~{}", arg),
            SpatialKind::Intersect(args) => {
                f.write_str("(")?;
                write_joined(f, args, " & ")?;
                f.write_str(")")
            }
            SpatialKind::Union(args) => {
                f.write_str("(")?;
                write_joined(f, args, " | ")?;
                f.write_str(")")
            }
            SpatialKind::Interior(arg) => write!(f, "Interior ({})", arg),
            SpatialKind::Closure(arg) => write!(f, "Closure ({})", arg),
            SpatialKind::Previous(arg) => write!(f, "SpPrev {}", arg),
            SpatialKind::Always { interval: Some(i), arg } => write!(f, "SpAlw_{} {}", i, arg),
            SpatialKind::Always { interval: None, arg } => write!(f, "SpAlw {}", arg),
            SpatialKind::Sometimes { interval: Some(i), arg } => {
                write!(f, "SpSometimes_{} {}", i, arg)
            }
            SpatialKind::Sometimes { interval: None, arg } => write!(f, "SpSometimes {}", arg),
            SpatialKind::Since { interval: Some(i), lhs, rhs } => {
                write!(f, "({} SpSince_{} {})", lhs, i, rhs)
            }
            SpatialKind::Since { interval: None, lhs, rhs } => {
                write!(f, "({} SpSince {})", lhs, rhs)
            }
            SpatialKind::BackTo { interval: Some(i), lhs, rhs } => {
                write!(f, "({} SpBackTo_{} {})", lhs, i, rhs)
            }
            SpatialKind::BackTo { interval: None, lhs, rhs } => {
                write!(f, "({} SpBackTo {})", lhs, rhs)
            }
        }
    }
}
