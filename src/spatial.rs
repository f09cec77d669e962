//! Set-theoretic and topological operations on 2-D regions.
//!
//! This module is the computational layer behind spatial STQL expressions.
//! A [`Region`] is one of:
//!
//! - `Empty` — the empty set,
//! - `Universe` — the entire plane (a frame's rectangle once a finite
//!   universe is needed, e.g. for complements),
//! - `BBox` — one rectangle, each of whose four sides may be open (edge
//!   excluded) or closed (edge included),
//! - `Union` — a collection of rectangles, not necessarily disjoint.
//!
//! Openness discipline: intersection is open at a coinciding endpoint if
//! *either* input is open there; union is open only if *both* are (closed
//! wins, so area is preserved under formal union). [`interior`] opens every
//! boundary, [`closure`] closes every boundary.
//!
//! All operations are total over well-formed inputs; a box with
//! `min > max` on an axis is a precondition violation.

use std::collections::BTreeSet;

use itertools::Itertools;
use ordered_float::NotNan;

use crate::datastream;

/// A rectangle with per-side openness flags. Closed on every side unless
/// stated otherwise.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BBox {
    pub xmin: f64,
    pub xmax: f64,
    pub ymin: f64,
    pub ymax: f64,
    /// Left/right/top/bottom boundary excluded?
    pub lopen: bool,
    pub ropen: bool,
    pub topen: bool,
    pub bopen: bool,
}

impl BBox {
    /// A closed box.
    pub fn new(xmin: f64, xmax: f64, ymin: f64, ymax: f64) -> BBox {
        BBox::with_bounds(xmin, xmax, ymin, ymax, false, false, false, false)
    }

    #[allow(clippy::too_many_arguments)]
    pub fn with_bounds(
        xmin: f64,
        xmax: f64,
        ymin: f64,
        ymax: f64,
        lopen: bool,
        ropen: bool,
        topen: bool,
        bopen: bool,
    ) -> BBox {
        assert!(xmin <= xmax && ymin <= ymax, "spatial box must have min <= max on both axes");
        BBox { xmin, xmax, ymin, ymax, lopen, ropen, topen, bopen }
    }

    pub fn is_closed(&self) -> bool {
        !(self.lopen || self.ropen || self.topen || self.bopen)
    }

    pub fn is_open(&self) -> bool {
        self.lopen || self.ropen || self.topen || self.bopen
    }

    /// Openness does not affect area.
    pub fn area(&self) -> f64 {
        (self.xmax - self.xmin) * (self.ymax - self.ymin)
    }

    fn is_degenerate(&self) -> bool {
        self.xmin == self.xmax || self.ymin == self.ymax
    }

    fn opened(&self) -> BBox {
        BBox { lopen: true, ropen: true, topen: true, bopen: true, ..*self }
    }

    fn closed(&self) -> BBox {
        BBox { lopen: false, ropen: false, topen: false, bopen: false, ..*self }
    }
}

impl From<&datastream::BoundingBox> for BBox {
    /// Stream bounding boxes are closed.
    fn from(bbox: &datastream::BoundingBox) -> BBox {
        BBox::new(bbox.xmin, bbox.xmax, bbox.ymin, bbox.ymax)
    }
}

/// A 2-D point set.
#[derive(Debug, Clone, PartialEq)]
pub enum Region {
    Empty,
    Universe,
    BBox(BBox),
    Union(Vec<BBox>),
}

/// The region covered by an object's bounding box.
pub fn bbox_of_object(object: &datastream::Object) -> Region {
    Region::BBox(BBox::from(&object.bbox))
}

/// A frame's universe rectangle, `(0, width) x (0, height)`, closed.
pub fn frame_universe(frame: &datastream::Frame) -> BBox {
    let u = frame.universe_bbox();
    BBox::from(&u)
}

pub fn is_closed(region: &Region) -> bool {
    match region {
        Region::Empty | Region::Universe => true,
        Region::BBox(bbox) => bbox.is_closed(),
        Region::Union(boxes) => boxes.iter().all(BBox::is_closed),
    }
}

pub fn is_open(region: &Region) -> bool {
    match region {
        Region::Empty | Region::Universe => true,
        Region::BBox(bbox) => bbox.is_open(),
        Region::Union(boxes) => boxes.iter().any(BBox::is_open),
    }
}

/// Opens every boundary of every box; identity on `Empty` and `Universe`.
pub fn interior(region: &Region) -> Region {
    match region {
        Region::Empty => Region::Empty,
        Region::Universe => Region::Universe,
        Region::BBox(bbox) => Region::BBox(bbox.opened()),
        Region::Union(boxes) => Region::Union(boxes.iter().map(BBox::opened).collect()),
    }
}

/// Closes every boundary of every box; identity on `Empty` and `Universe`.
pub fn closure(region: &Region) -> Region {
    match region {
        Region::Empty => Region::Empty,
        Region::Universe => Region::Universe,
        Region::BBox(bbox) => Region::BBox(bbox.closed()),
        Region::Union(boxes) => Region::Union(boxes.iter().map(BBox::closed).collect()),
    }
}

/// Total area of the region: `0` for `Empty`, infinite for `Universe`.
/// Overlapping union members are simplified to disjoint rectangles first.
pub fn area(region: &Region) -> f64 {
    match simplify(region) {
        Region::Empty => 0.0,
        Region::Universe => f64::INFINITY,
        Region::BBox(bbox) => bbox.area(),
        Region::Union(boxes) => boxes.iter().map(BBox::area).sum(),
    }
}

/// Axis-wise intersection of two boxes. The result is open at a coinciding
/// endpoint if either input is open there; a zero-width or zero-height
/// result is empty.
fn bbox_intersection(a: &BBox, b: &BBox) -> Option<BBox> {
    // Per axis, pick the inner endpoint and its openness; on ties the open
    // side prevails.
    fn lower(av: f64, ao: bool, bv: f64, bo: bool) -> (f64, bool) {
        if av > bv {
            (av, ao)
        } else if bv > av {
            (bv, bo)
        } else {
            (av, ao || bo)
        }
    }
    fn upper(av: f64, ao: bool, bv: f64, bo: bool) -> (f64, bool) {
        if av < bv {
            (av, ao)
        } else if bv < av {
            (bv, bo)
        } else {
            (av, ao || bo)
        }
    }

    let (xmin, lopen) = lower(a.xmin, a.lopen, b.xmin, b.lopen);
    let (xmax, ropen) = upper(a.xmax, a.ropen, b.xmax, b.ropen);
    let (ymin, topen) = lower(a.ymin, a.topen, b.ymin, b.topen);
    let (ymax, bopen) = upper(a.ymax, a.bopen, b.ymax, b.bopen);

    if xmin >= xmax || ymin >= ymax {
        return None;
    }
    Some(BBox { xmin, xmax, ymin, ymax, lopen, ropen, topen, bopen })
}

fn collect_region(boxes: Vec<BBox>) -> Region {
    match boxes.len() {
        0 => Region::Empty,
        1 => Region::BBox(boxes[0]),
        _ => Region::Union(boxes),
    }
}

/// Intersection of two regions. Distributes pairwise over unions.
pub fn intersect(lhs: &Region, rhs: &Region) -> Region {
    use Region::*;
    match (lhs, rhs) {
        (Empty, _) | (_, Empty) => Empty,
        (Universe, other) | (other, Universe) => other.clone(),
        (BBox(a), BBox(b)) => match bbox_intersection(a, b) {
            Some(bbox) => BBox(bbox),
            None => Empty,
        },
        (Union(boxes), BBox(b)) | (BBox(b), Union(boxes)) => {
            collect_region(boxes.iter().filter_map(|a| bbox_intersection(a, b)).collect())
        }
        (Union(lhs), Union(rhs)) => collect_region(
            lhs.iter()
                .flat_map(|a| rhs.iter().filter_map(move |b| bbox_intersection(a, b)))
                .collect(),
        ),
    }
}

/// Intersection of many regions; the intersection of none is `Universe`.
pub fn intersect_all<'a, I: IntoIterator<Item = &'a Region>>(regions: I) -> Region {
    regions.into_iter().fold(Region::Universe, |acc, r| intersect(&acc, r))
}

/// Does `outer` contain `inner`, coordinate-wise?
fn contains(outer: &BBox, inner: &BBox) -> bool {
    outer.xmin <= inner.xmin
        && inner.xmax <= outer.xmax
        && outer.ymin <= inner.ymin
        && inner.ymax <= outer.ymax
}

/// Collapse `inner` into `outer`. At coinciding sides the union is open only
/// if both inputs are open (closed wins).
fn merge_contained(outer: &BBox, inner: &BBox) -> BBox {
    BBox {
        lopen: if outer.xmin == inner.xmin { outer.lopen && inner.lopen } else { outer.lopen },
        ropen: if outer.xmax == inner.xmax { outer.ropen && inner.ropen } else { outer.ropen },
        topen: if outer.ymin == inner.ymin { outer.topen && inner.topen } else { outer.topen },
        bopen: if outer.ymax == inner.ymax { outer.bopen && inner.bopen } else { outer.bopen },
        ..*outer
    }
}

/// Union of two regions. One box swallowing the other collapses; otherwise
/// the members are kept side by side (possibly overlapping) and left for
/// [`simplify`] to normalize.
pub fn union_of(lhs: &Region, rhs: &Region) -> Region {
    use Region::*;
    match (lhs, rhs) {
        (Universe, _) | (_, Universe) => Universe,
        (Empty, other) | (other, Empty) => other.clone(),
        (BBox(a), BBox(b)) => {
            if contains(a, b) {
                BBox(merge_contained(a, b))
            } else if contains(b, a) {
                BBox(merge_contained(b, a))
            } else {
                Union(vec![*a, *b])
            }
        }
        (Union(boxes), BBox(b)) | (BBox(b), Union(boxes)) => {
            let mut members = boxes.clone();
            members.push(*b);
            Union(members)
        }
        (Union(lhs), Union(rhs)) => {
            let mut members = lhs.clone();
            members.extend_from_slice(rhs);
            Union(members)
        }
    }
}

/// Union of many regions; the union of none is `Empty`.
pub fn union_all<'a, I: IntoIterator<Item = &'a Region>>(regions: I) -> Region {
    regions.into_iter().fold(Region::Empty, |acc, r| union_of(&acc, r))
}

/// Carves `universe \ bbox` into up to four fragments (left, right, top,
/// bottom). A side of `bbox` that was open becomes a closed edge of the
/// neighboring fragment and vice versa.
fn bbox_complement(bbox: &BBox, universe: &BBox) -> Region {
    if bbox.xmin <= universe.xmin
        && bbox.xmax >= universe.xmax
        && bbox.ymin <= universe.ymin
        && bbox.ymax >= universe.ymax
    {
        return Region::Empty;
    }
    // Clip to the universe; a box fully outside complements to the universe.
    let bbox = match bbox_intersection(bbox, universe) {
        Some(clipped) => clipped,
        None => return Region::Universe,
    };

    let mut fragments = Vec::with_capacity(4);
    if bbox.xmin > universe.xmin || (bbox.xmin == universe.xmin && bbox.lopen) {
        fragments.push(BBox {
            xmin: universe.xmin,
            xmax: bbox.xmin,
            ymin: bbox.ymin,
            ymax: bbox.ymax,
            lopen: false,
            ropen: !bbox.lopen,
            topen: bbox.topen,
            bopen: bbox.bopen,
        });
    }
    if bbox.xmax < universe.xmax || (bbox.xmax == universe.xmax && bbox.ropen) {
        fragments.push(BBox {
            xmin: bbox.xmax,
            xmax: universe.xmax,
            ymin: bbox.ymin,
            ymax: bbox.ymax,
            lopen: !bbox.ropen,
            ropen: false,
            topen: bbox.topen,
            bopen: bbox.bopen,
        });
    }
    if bbox.ymin > universe.ymin || (bbox.ymin == universe.ymin && bbox.topen) {
        fragments.push(BBox {
            xmin: universe.xmin,
            xmax: universe.xmax,
            ymin: universe.ymin,
            ymax: bbox.ymin,
            lopen: false,
            ropen: false,
            topen: false,
            bopen: !bbox.topen,
        });
    }
    if bbox.ymax < universe.ymax || (bbox.ymax == universe.ymax && bbox.bopen) {
        fragments.push(BBox {
            xmin: universe.xmin,
            xmax: universe.xmax,
            ymin: bbox.ymax,
            ymax: universe.ymax,
            lopen: false,
            ropen: false,
            topen: !bbox.bopen,
            bopen: false,
        });
    }
    collect_region(fragments)
}

/// Complement of a region within a finite universe rectangle.
///
/// The complement of a union is the intersection of the member complements.
pub fn complement(region: &Region, universe: &BBox) -> Region {
    match region {
        Region::Empty => Region::Universe,
        Region::Universe => Region::Empty,
        Region::BBox(bbox) => bbox_complement(bbox, universe),
        Region::Union(boxes) => boxes
            .iter()
            .fold(Region::Universe, |acc, b| intersect(&acc, &bbox_complement(b, universe))),
    }
}

/// Merged, sorted y-intervals covered by `boxes` within the x-slab
/// `(x1, x2)`. Touching intervals fuse.
fn slab_y_intervals(boxes: &[BBox], x1: f64, x2: f64) -> Vec<(f64, f64)> {
    let mut spans: Vec<(f64, f64)> = boxes
        .iter()
        .filter(|b| b.xmin < x2 && b.xmax > x1)
        .map(|b| (b.ymin, b.ymax))
        .collect();
    spans.sort_by(|a, b| a.0.total_cmp(&b.0).then(a.1.total_cmp(&b.1)));

    let mut merged: Vec<(f64, f64)> = Vec::with_capacity(spans.len());
    for (lo, hi) in spans {
        match merged.last_mut() {
            Some((_, last_hi)) if lo <= *last_hi => {
                if hi > *last_hi {
                    *last_hi = hi;
                }
            }
            _ => merged.push((lo, hi)),
        }
    }
    merged
}

/// Re-expresses a union as pairwise-disjoint rectangles.
///
/// Plane sweep: collect all distinct x-coordinates, and for every
/// consecutive x-slab emit one rectangle per merged y-interval covered by
/// the original members overlapping that slab. The output is canonical under
/// the lexicographic `(xmin, xmax, ymin, ymax)` order. Boundary openness is
/// not tracked across the sweep; the output rectangles are closed, which
/// leaves the covered area unchanged.
pub fn simplify(region: &Region) -> Region {
    let boxes = match region {
        Region::Union(boxes) => boxes,
        _ => return region.clone(),
    };
    let boxes: Vec<BBox> = boxes.iter().filter(|b| !b.is_degenerate()).copied().collect();

    let xs: BTreeSet<NotNan<f64>> = boxes
        .iter()
        .flat_map(|b| {
            vec![
                NotNan::new(b.xmin).expect("finite coordinate"),
                NotNan::new(b.xmax).expect("finite coordinate"),
            ]
        })
        .collect();

    let mut result = Vec::new();
    for (x1, x2) in xs.iter().tuple_windows() {
        let (x1, x2) = (x1.into_inner(), x2.into_inner());
        for (ylo, yhi) in slab_y_intervals(&boxes, x1, x2) {
            result.push(BBox::new(x1, x2, ylo, yhi));
        }
    }
    result.sort_by(|a, b| {
        a.xmin
            .total_cmp(&b.xmin)
            .then(a.xmax.total_cmp(&b.xmax))
            .then(a.ymin.total_cmp(&b.ymin))
            .then(a.ymax.total_cmp(&b.ymax))
    });
    collect_region(result)
}


#[cfg(test)]
mod prop_tests {
    use super::*;
    use proptest::prelude::*;

    fn arb_bbox() -> impl Strategy<Value = BBox> {
        (0.0..90.0f64, 1.0..10.0f64, 0.0..90.0f64, 1.0..10.0f64).prop_map(|(x, w, y, h)| {
            BBox::new(x, x + w, y, y + h)
        })
    }

    proptest! {
        #[test]
        fn intersection_area_never_exceeds_inputs(a in arb_bbox(), b in arb_bbox()) {
            let i = intersect(&Region::BBox(a), &Region::BBox(b));
            prop_assert!(area(&i) <= a.area() + 1e-9);
            prop_assert!(area(&i) <= b.area() + 1e-9);
        }

        #[test]
        fn union_area_is_inclusion_exclusion(a in arb_bbox(), b in arb_bbox()) {
            let u = union_of(&Region::BBox(a), &Region::BBox(b));
            let i = intersect(&Region::BBox(a), &Region::BBox(b));
            let expected = a.area() + b.area() - area(&i);
            prop_assert!((area(&u) - expected).abs() < 1e-6);
        }

        #[test]
        fn complement_partitions_universe(a in arb_bbox()) {
            let universe = BBox::new(0.0, 100.0, 0.0, 100.0);
            let region = Region::BBox(a);
            let comp = complement(&region, &universe);
            let clipped = intersect(&region, &Region::BBox(universe));
            prop_assert!((area(&comp) + area(&clipped) - universe.area()).abs() < 1e-6);
        }

        #[test]
        fn interior_closure_preserve_area(a in arb_bbox()) {
            let region = Region::BBox(a);
            prop_assert_eq!(area(&interior(&region)), area(&region));
            prop_assert_eq!(area(&closure(&interior(&region))), area(&region));
        }
    }
}
