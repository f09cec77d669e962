//! The perception data stream model.
//!
//! A perception stream is a discrete signal of [`Frame`]s sampled at a fixed
//! rate. Each frame carries a timestamp, a frame number, the image
//! dimensions, and a map from object id to the detected [`Object`] — its
//! class, the detector's confidence, and an axis-aligned [`BoundingBox`].
//!
//! The origin of the image plane is the *top-left* corner: x grows to the
//! right, y grows downward.

use std::collections::BTreeMap;

/// An axis-aligned bounding box in pixel coordinates.
///
/// Follows the Pascal VOC convention `(xmin, ymin)` top-left and
/// `(xmax, ymax)` bottom-right.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BoundingBox {
    pub xmin: f64,
    pub xmax: f64,
    pub ymin: f64,
    pub ymax: f64,
}

/// Canonical points on a bounding box: its centroid or one of the four edge
/// midpoints.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum RefPointKind {
    Center,
    LeftMargin,
    RightMargin,
    TopMargin,
    BottomMargin,
}

impl BoundingBox {
    /// Creates a box. The coordinates must be finite with `xmin <= xmax` and
    /// `ymin <= ymax`.
    pub fn new(xmin: f64, xmax: f64, ymin: f64, ymax: f64) -> BoundingBox {
        assert!(
            xmin.is_finite() && xmax.is_finite() && ymin.is_finite() && ymax.is_finite(),
            "bounding box coordinates must be finite"
        );
        assert!(xmin <= xmax && ymin <= ymax, "bounding box must have min <= max on both axes");
        BoundingBox { xmin, xmax, ymin, ymax }
    }

    pub fn width(&self) -> f64 {
        self.xmax - self.xmin
    }

    pub fn height(&self) -> f64 {
        self.ymax - self.ymin
    }

    pub fn area(&self) -> f64 {
        self.width() * self.height()
    }

    /// The centroid `(cx, cy)`.
    pub fn center(&self) -> (f64, f64) {
        ((self.xmin + self.xmax) / 2.0, (self.ymin + self.ymax) / 2.0)
    }

    /// The reference point of the given kind, as `(x, y)`.
    pub fn reference_point(&self, kind: RefPointKind) -> (f64, f64) {
        let (cx, cy) = self.center();
        match kind {
            RefPointKind::Center => (cx, cy),
            RefPointKind::LeftMargin => (self.xmin, cy),
            RefPointKind::RightMargin => (self.xmax, cy),
            RefPointKind::TopMargin => (cx, self.ymin),
            RefPointKind::BottomMargin => (cx, self.ymax),
        }
    }
}

/// Euclidean distance between reference points of two boxes.
pub fn euclidean_distance(
    a: &BoundingBox,
    ra: RefPointKind,
    b: &BoundingBox,
    rb: RefPointKind,
) -> f64 {
    let (x1, y1) = a.reference_point(ra);
    let (x2, y2) = b.reference_point(rb);
    ((x1 - x2).powi(2) + (y1 - y2).powi(2)).sqrt()
}

/// Vertical coordinate (y, growing downward) of a reference point.
pub fn lat(bbox: &BoundingBox, kind: RefPointKind) -> f64 {
    bbox.reference_point(kind).1
}

/// Horizontal coordinate (x) of a reference point.
pub fn lon(bbox: &BoundingBox, kind: RefPointKind) -> f64 {
    bbox.reference_point(kind).0
}

/// A detection within a frame.
#[derive(Debug, Clone, PartialEq)]
pub struct Object {
    /// Class label assigned by the detector.
    pub class: i64,
    /// Confidence associated with the class, in `[0, 1]`.
    pub probability: f64,
    pub bbox: BoundingBox,
}

/// One sample of a perception stream.
///
/// Frames are plain data and are never mutated after construction. Object
/// ids are unique within a frame; the map is ordered so that quantifier
/// instantiation over ids is deterministic.
#[derive(Debug, Clone, PartialEq)]
pub struct Frame {
    /// Seconds elapsed since the start of the stream.
    pub timestamp: f64,
    /// Monotonically non-decreasing frame number.
    pub frame_num: u64,
    /// Image width in pixels.
    pub width: f64,
    /// Image height in pixels.
    pub height: f64,
    /// Detected objects keyed by their ids.
    pub objects: BTreeMap<String, Object>,
}

impl Frame {
    pub fn new(timestamp: f64, frame_num: u64, width: f64, height: f64) -> Frame {
        Frame { timestamp, frame_num, width, height, objects: BTreeMap::new() }
    }

    /// Adds a detection. Builder-style, used mostly by tests and loaders.
    pub fn with_object(mut self, id: impl Into<String>, object: Object) -> Frame {
        self.objects.insert(id.into(), object);
        self
    }

    /// The frame's full rectangle, `(0, width) x (0, height)`.
    pub fn universe_bbox(&self) -> BoundingBox {
        BoundingBox::new(0.0, self.width, 0.0, self.height)
    }
}

/// A finite recording of a stream.
pub type Trace = Vec<Frame>;

#[cfg(test)]
mod tests {
    use super::*;

    fn bbox() -> BoundingBox {
        BoundingBox::new(100.0, 200.0, 50.0, 150.0)
    }

    #[test]
    fn bbox_geometry() {
        let b = bbox();
        assert_eq!(b.area(), 10_000.0);
        assert_eq!(b.width(), 100.0);
        assert_eq!(b.height(), 100.0);
        assert_eq!(b.center(), (150.0, 100.0));
    }

    #[test]
    fn reference_points() {
        let b = bbox();
        let cases = [
            (RefPointKind::Center, (150.0, 100.0)),
            (RefPointKind::LeftMargin, (100.0, 100.0)),
            (RefPointKind::RightMargin, (200.0, 100.0)),
            (RefPointKind::TopMargin, (150.0, 50.0)),
            (RefPointKind::BottomMargin, (150.0, 150.0)),
        ];
        for (kind, expected) in &cases {
            assert_eq!(b.reference_point(*kind), *expected, "{:?}", kind);
        }
    }

    #[test]
    fn distances() {
        let a = BoundingBox::new(0.0, 10.0, 0.0, 10.0);
        let b = BoundingBox::new(30.0, 40.0, 0.0, 10.0);
        let d = euclidean_distance(&a, RefPointKind::Center, &b, RefPointKind::Center);
        assert_eq!(d, 30.0);

        let c = BoundingBox::new(10.0, 20.0, 0.0, 10.0);
        let touching =
            euclidean_distance(&a, RefPointKind::RightMargin, &c, RefPointKind::LeftMargin);
        assert_eq!(touching, 0.0);
    }

    #[test]
    fn diagonal_distance() {
        // A 3-4-5 triangle between the two centers.
        let a = BoundingBox::new(0.0, 2.0, 0.0, 2.0);
        let b = BoundingBox::new(3.0, 5.0, 4.0, 6.0);
        let d = euclidean_distance(&a, RefPointKind::Center, &b, RefPointKind::Center);
        assert_eq!(d, 5.0);
    }

    #[test]
    fn axis_projections() {
        let b = bbox();
        assert_eq!(lon(&b, RefPointKind::LeftMargin), 100.0);
        assert_eq!(lat(&b, RefPointKind::TopMargin), 50.0);
    }

    #[test]
    fn frame_universe() {
        let frame = Frame::new(1.5, 45, 1920.0, 1080.0);
        let u = frame.universe_bbox();
        assert_eq!((u.xmin, u.xmax, u.ymin, u.ymax), (0.0, 1920.0, 0.0, 1080.0));
        assert_eq!(u.area(), 1920.0 * 1080.0);
    }

    #[test]
    fn frame_objects_are_ordered() {
        let frame = Frame::new(0.0, 0, 100.0, 100.0)
            .with_object("b", Object { class: 2, probability: 0.8, bbox: bbox() })
            .with_object("a", Object { class: 1, probability: 0.9, bbox: bbox() });
        let ids: Vec<&str> = frame.objects.keys().map(|s| s.as_str()).collect();
        assert_eq!(ids, ["a", "b"]);
    }

    #[test]
    #[should_panic(expected = "min <= max")]
    fn rejects_inverted_bbox() {
        let _ = BoundingBox::new(10.0, 0.0, 0.0, 10.0);
    }
}
