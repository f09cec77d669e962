//! Boolean evaluation of formulas against a window of frames.
//!
//! [`evaluate`] checks a formula at position `current` of a contiguous frame
//! window: everything before `current` is the history slice, everything
//! after it the horizon slice. The window is expected to be sized by the
//! [requirements analysis](crate::analysis); temporal operators simply walk
//! the indices available to them, and a slice that is too short makes the
//! affected subformula false rather than raising an error.
//!
//! Data-missing conditions (an object id absent from the frame under
//! evaluation, an unfrozen time/frame variable) also evaluate to false.
//! Referencing an object variable that no quantifier has bound is a
//! programming error and panics.

use std::collections::HashMap;

use crate::ast::*;
use crate::datastream::{self, Frame, Object};
use crate::iter::product;
use crate::spatial::{self, Region};

/// Evaluates `formula` at `frames[current]`, with `frames[..current]` as
/// past context and `frames[current + 1..]` as future context.
///
/// # Panics
///
/// Panics if `current` is out of range or if the formula references an
/// object variable that is not bound by an enclosing quantifier.
pub fn evaluate(formula: &Expr, frames: &[Frame], current: usize) -> bool {
    assert!(current < frames.len(), "current frame index out of range");
    let mut ctx = Context::default();
    eval(formula, frames, current, &mut ctx)
}

/// Variable bindings in scope at a point of the recursion. Scoped by the
/// formula structure: `Freeze` and the quantifiers save and restore their
/// entries around the recursive call, so bindings never leak to siblings.
#[derive(Debug, Default)]
struct Context {
    frozen_times: HashMap<String, f64>,
    frozen_frames: HashMap<String, i64>,
    bound_objects: HashMap<String, String>,
}

impl Context {
    fn object<'a>(&self, frame: &'a Frame, var: &ObjectVar) -> Option<&'a Object> {
        let id = self
            .bound_objects
            .get(&var.name)
            .unwrap_or_else(|| panic!("object variable `{}` is not bound by a quantifier", var.name));
        frame.objects.get(id)
    }

    fn object_id(&self, var: &ObjectVar) -> &str {
        self.bound_objects
            .get(&var.name)
            .unwrap_or_else(|| panic!("object variable `{}` is not bound by a quantifier", var.name))
    }
}

fn eval(expr: &Expr, frames: &[Frame], ix: usize, ctx: &mut Context) -> bool {
    let frame = &frames[ix];
    match expr.kind() {
        ExprKind::Const(value) => *value,

        ExprKind::TimeBound(tb) => match ctx.frozen_times.get(&tb.var.name) {
            Some(frozen) => tb.op.holds(frozen - frame.timestamp, tb.value),
            None => false,
        },
        ExprKind::FrameBound(fb) => match ctx.frozen_frames.get(&fb.var.name) {
            Some(frozen) => fb.op.holds(frozen - frame.frame_num as i64, fb.value),
            None => false,
        },

        ExprKind::CompareId { lhs, op, rhs } => {
            op.holds(ctx.object_id(lhs), ctx.object_id(rhs))
        }

        ExprKind::CompareClass { lhs, op, rhs } => {
            let lhs_class = match ctx.object(frame, &lhs.var) {
                Some(object) => object.class,
                None => return false,
            };
            let rhs_class = match rhs {
                ClassArg::Literal(value) => *value,
                ClassArg::Class(term) => match ctx.object(frame, &term.var) {
                    Some(object) => object.class,
                    None => return false,
                },
            };
            op.holds(lhs_class, rhs_class)
        }

        ExprKind::CompareProb { lhs, op, rhs } => {
            let lhs_value = match ctx.object(frame, &lhs.var) {
                Some(object) => object.probability * lhs.scale,
                None => return false,
            };
            let rhs_value = match rhs {
                ProbArg::Value(value) => *value,
                ProbArg::Prob(term) => match ctx.object(frame, &term.var) {
                    Some(object) => object.probability * term.scale,
                    None => return false,
                },
            };
            op.holds(lhs_value, rhs_value)
        }

        ExprKind::CompareArea { lhs, op, rhs } => {
            let lhs_value = match ctx.object(frame, &lhs.var) {
                Some(object) => object.bbox.area() * lhs.scale,
                None => return false,
            };
            let rhs_value = match rhs {
                AreaArg::Value(value) => *value,
                AreaArg::Area(term) => match ctx.object(frame, &term.var) {
                    Some(object) => object.bbox.area() * term.scale,
                    None => return false,
                },
            };
            op.holds(lhs_value, rhs_value)
        }

        ExprKind::CompareDist { lhs, op, rhs } => {
            let (a, b) = match (ctx.object(frame, &lhs.lhs.var), ctx.object(frame, &lhs.rhs.var)) {
                (Some(a), Some(b)) => (a, b),
                _ => return false,
            };
            let distance =
                datastream::euclidean_distance(&a.bbox, lhs.lhs.kind, &b.bbox, lhs.rhs.kind)
                    * lhs.scale;
            op.holds(distance, *rhs)
        }

        ExprKind::CompareLat { lhs, op, rhs } => {
            let lhs_value = match ctx.object(frame, &lhs.point.var) {
                Some(object) => datastream::lat(&object.bbox, lhs.point.kind) * lhs.scale,
                None => return false,
            };
            match coord_value(rhs, frame, ctx) {
                Some(rhs_value) => op.holds(lhs_value, rhs_value),
                None => false,
            }
        }

        ExprKind::CompareLon { lhs, op, rhs } => {
            let lhs_value = match ctx.object(frame, &lhs.point.var) {
                Some(object) => datastream::lon(&object.bbox, lhs.point.kind) * lhs.scale,
                None => return false,
            };
            match coord_value(rhs, frame, ctx) {
                Some(rhs_value) => op.holds(lhs_value, rhs_value),
                None => false,
            }
        }

        ExprKind::CompareSpArea { lhs, op, rhs } => {
            let lhs_value = spatial::area(&eval_spatial(&lhs.arg, frames, ix, ctx)) * lhs.scale;
            let rhs_value = match rhs {
                SpAreaArg::Value(value) => *value,
                SpAreaArg::Area(term) => {
                    spatial::area(&eval_spatial(&term.arg, frames, ix, ctx)) * term.scale
                }
            };
            op.holds(lhs_value, rhs_value)
        }

        ExprKind::SpatialExists(arg) => {
            !matches!(spatial::simplify(&eval_spatial(arg, frames, ix, ctx)), Region::Empty)
        }
        ExprKind::SpatialForall(arg) => {
            let region = eval_spatial(arg, frames, ix, ctx);
            let universe = spatial::frame_universe(frame);
            spatial::area(&spatial::complement(&region, &universe)) == 0.0
        }

        ExprKind::Exists { vars, body } => quantify(vars, body, frames, ix, ctx, true),
        ExprKind::Forall { vars, body } => quantify(vars, body, frames, ix, ctx, false),

        ExprKind::Freeze { time_var, frame_var, body } => {
            let saved_time = time_var
                .as_ref()
                .map(|var| (var, ctx.frozen_times.insert(var.name.clone(), frame.timestamp)));
            let saved_frame = frame_var.as_ref().map(|var| {
                (var, ctx.frozen_frames.insert(var.name.clone(), frame.frame_num as i64))
            });

            let result = eval(body, frames, ix, ctx);

            if let Some((var, old)) = saved_time {
                match old {
                    Some(old) => ctx.frozen_times.insert(var.name.clone(), old),
                    None => ctx.frozen_times.remove(&var.name),
                };
            }
            if let Some((var, old)) = saved_frame {
                match old {
                    Some(old) => ctx.frozen_frames.insert(var.name.clone(), old),
                    None => ctx.frozen_frames.remove(&var.name),
                };
            }
            result
        }

        ExprKind::Not(arg) => !eval(arg, frames, ix, ctx),
        ExprKind::And(args) => args.iter().all(|arg| eval(arg, frames, ix, ctx)),
        ExprKind::Or(args) => args.iter().any(|arg| eval(arg, frames, ix, ctx)),

        ExprKind::Previous { arg, steps } => {
            ix >= *steps && eval(arg, frames, ix - steps, ctx)
        }
        ExprKind::Next { arg, steps } => {
            ix + steps < frames.len() && eval(arg, frames, ix + steps, ctx)
        }

        ExprKind::Holds(arg) => (0..=ix).all(|j| eval(arg, frames, j, ctx)),
        ExprKind::Sometimes(arg) => (0..=ix).any(|j| eval(arg, frames, j, ctx)),
        ExprKind::Always(arg) => (ix..frames.len()).all(|j| eval(arg, frames, j, ctx)),
        ExprKind::Eventually(arg) => (ix..frames.len()).any(|j| eval(arg, frames, j, ctx)),

        // b held at some past point, and a has held at every frame strictly
        // between that point and the current one.
        ExprKind::Since(a, b) => (0..=ix).any(|i| {
            eval(b, frames, i, ctx) && (i + 1..ix).all(|j| eval(a, frames, j, ctx))
        }),
        // Dual of Since: b holds all the way back, unless a released it.
        ExprKind::BackTo(a, b) => (0..=ix).all(|i| {
            eval(b, frames, i, ctx) || (i + 1..ix).any(|j| eval(a, frames, j, ctx))
        }),
        ExprKind::Until(a, b) => (ix..frames.len()).any(|i| {
            eval(b, frames, i, ctx) && (ix + 1..i).all(|j| eval(a, frames, j, ctx))
        }),
        ExprKind::Release(a, b) => (ix..frames.len()).all(|i| {
            eval(b, frames, i, ctx) || (ix + 1..i).any(|j| eval(a, frames, j, ctx))
        }),
    }
}

fn coord_value(arg: &CoordArg, frame: &Frame, ctx: &Context) -> Option<f64> {
    match arg {
        CoordArg::Value(value) => Some(*value),
        CoordArg::Lat(term) => ctx
            .object(frame, &term.point.var)
            .map(|object| datastream::lat(&object.bbox, term.point.kind) * term.scale),
        CoordArg::Lon(term) => ctx
            .object(frame, &term.point.var)
            .map(|object| datastream::lon(&object.bbox, term.point.kind) * term.scale),
    }
}

/// Instantiates `vars` over every tuple of object ids from the frame under
/// evaluation. `Exists` succeeds on the first satisfying assignment,
/// `Forall` fails on the first falsifying one; over an empty frame `Exists`
/// is false and `Forall` is true.
fn quantify(
    vars: &[ObjectVar],
    body: &Expr,
    frames: &[Frame],
    ix: usize,
    ctx: &mut Context,
    existential: bool,
) -> bool {
    let ids: Vec<&String> = frames[ix].objects.keys().collect();
    log::trace!(
        "instantiating {} variable(s) over {} object(s) at frame {}",
        vars.len(),
        ids.len(),
        frames[ix].frame_num
    );

    let saved: Vec<(String, Option<String>)> = vars
        .iter()
        .map(|var| (var.name.clone(), ctx.bound_objects.get(&var.name).cloned()))
        .collect();

    let mut result = !existential;
    for tuple in product(&ids, vars.len()) {
        for (var, id) in vars.iter().zip(&tuple) {
            ctx.bound_objects.insert(var.name.clone(), (**id).clone());
        }
        if eval(body, frames, ix, ctx) == existential {
            result = existential;
            break;
        }
    }

    for (name, old) in saved.into_iter().rev() {
        match old {
            Some(old) => ctx.bound_objects.insert(name, old),
            None => ctx.bound_objects.remove(&name),
        };
    }
    result
}

fn eval_spatial(expr: &SpatialExpr, frames: &[Frame], ix: usize, ctx: &mut Context) -> Region {
    let frame = &frames[ix];
    match expr.kind() {
        SpatialKind::EmptySet => Region::Empty,
        SpatialKind::UniverseSet => Region::Universe,
        SpatialKind::BBox(var) => match ctx.object(frame, var) {
            Some(object) => spatial::bbox_of_object(object),
            None => Region::Empty,
        },
        SpatialKind::Complement(arg) => {
            let universe = spatial::frame_universe(frame);
            spatial::complement(&eval_spatial(arg, frames, ix, ctx), &universe)
        }
        SpatialKind::Intersect(args) => args.iter().fold(Region::Universe, |acc, arg| {
            spatial::intersect(&acc, &eval_spatial(arg, frames, ix, ctx))
        }),
        SpatialKind::Union(args) => args.iter().fold(Region::Empty, |acc, arg| {
            spatial::union_of(&acc, &eval_spatial(arg, frames, ix, ctx))
        }),
        SpatialKind::Interior(arg) => spatial::interior(&eval_spatial(arg, frames, ix, ctx)),
        SpatialKind::Closure(arg) => spatial::closure(&eval_spatial(arg, frames, ix, ctx)),

        SpatialKind::Previous(arg) => {
            if ix >= 1 {
                eval_spatial(arg, frames, ix - 1, ctx)
            } else {
                Region::Empty
            }
        }

        SpatialKind::Always { interval, arg } => {
            past_indices(ix, interval).fold(Region::Universe, |acc, j| {
                spatial::intersect(&acc, &eval_spatial(arg, frames, j, ctx))
            })
        }
        SpatialKind::Sometimes { interval, arg } => {
            past_indices(ix, interval).fold(Region::Empty, |acc, j| {
                spatial::union_of(&acc, &eval_spatial(arg, frames, j, ctx))
            })
        }

        // Spatial since mirrors the boolean one with union for "there is a
        // past point" and intersection for "the region held in between".
        SpatialKind::Since { interval, lhs, rhs } => {
            let mut acc = Region::Empty;
            for i in past_indices(ix, interval) {
                let mut held = eval_spatial(rhs, frames, i, ctx);
                for j in i + 1..ix {
                    held = spatial::intersect(&held, &eval_spatial(lhs, frames, j, ctx));
                }
                acc = spatial::union_of(&acc, &held);
            }
            acc
        }
        SpatialKind::BackTo { interval, lhs, rhs } => {
            let mut acc = Region::Universe;
            for i in past_indices(ix, interval) {
                let mut released = eval_spatial(rhs, frames, i, ctx);
                for j in i + 1..ix {
                    released = spatial::union_of(&released, &eval_spatial(lhs, frames, j, ctx));
                }
                acc = spatial::intersect(&acc, &released);
            }
            acc
        }
    }
}

/// Past frame indices whose distance from `ix` falls inside the interval,
/// oldest first. No interval means the whole past window including `ix`.
fn past_indices(ix: usize, interval: &Option<FrameInterval>) -> impl Iterator<Item = usize> + '_ {
    let interval = *interval;
    (0..=ix).filter(move |j| match &interval {
        Some(interval) => interval.contains((ix - j) as u64),
        None => true,
    })
}
