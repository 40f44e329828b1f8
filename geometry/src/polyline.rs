/// A point on the canvas
pub type Point = (f64, f64);

/// An ordered sequence of canvas points produced from an SVG path
///
/// `closed` records a trailing `Z`/`z`; a closed polyline has an implicit
/// segment from its last point back to its first
#[derive(Clone, Debug, PartialEq)]
pub struct Polyline {
    /// The path vertices in drawing order
    pub points: Vec<Point>,
    /// Whether the path was closed with `Z`
    pub closed: bool,
}

impl Polyline {
    /// The drawn segments, including the closing segment of a closed shape
    pub fn segments(&self) -> Vec<(Point, Point)> {
        let mut segments: Vec<(Point, Point)> = self.points.windows(2).map(|w| (w[0], w[1])).collect();
        if self.closed && self.points.len() > 2 {
            segments.push((self.points[self.points.len() - 1], self.points[0]));
        }
        segments
    }
}

/// Whether any point of the polyline falls outside `[0, x_max] x [0, y_max]`
pub fn out_of_bounds(polyline: &Polyline, x_max: u32, y_max: u32) -> bool {
    polyline
        .points
        .iter()
        .any(|&(x, y)| x < 0.0 || y < 0.0 || x > f64::from(x_max) || y > f64::from(y_max))
}

/// The ink needed to draw the polyline
///
/// A filled closed shape costs its enclosed area; everything else costs the
/// total length of its drawn segments. Both round to the nearest whole unit
pub fn ink_required(polyline: &Polyline, transparent: bool, closed: bool) -> u32 {
    if !transparent && closed {
        shoelace_area(&polyline.points).round() as u32
    } else {
        polyline
            .segments()
            .iter()
            .map(|&((x1, y1), (x2, y2))| ((x2 - x1).powi(2) + (y2 - y1).powi(2)).sqrt())
            .sum::<f64>()
            .round() as u32
    }
}

fn shoelace_area(points: &[Point]) -> f64 {
    let mut doubled = 0.0;
    for i in 0..points.len() {
        let (x1, y1) = points[i];
        let (x2, y2) = points[(i + 1) % points.len()];
        doubled += x1 * y2 - x2 * y1;
    }
    doubled.abs() / 2.0
}

/// Whether two polylines overlap
///
/// True when any pair of drawn segments intersects or touches, or when one
/// polyline lies entirely inside the other's closed outline
pub fn overlaps(a: &Polyline, b: &Polyline) -> bool {
    for &(p1, p2) in &a.segments() {
        for &(p3, p4) in &b.segments() {
            if segments_intersect(p1, p2, p3, p4) {
                return true;
            }
        }
    }

    let a_inside_b = |&p: &Point| b.closed && point_in_polygon(p, &b.points);
    let b_inside_a = |&p: &Point| a.closed && point_in_polygon(p, &a.points);
    a.points.first().map_or(false, a_inside_b) || b.points.first().map_or(false, b_inside_a)
}

const EPSILON: f64 = 1e-9;

fn cross(o: Point, a: Point, b: Point) -> f64 {
    (a.0 - o.0) * (b.1 - o.1) - (a.1 - o.1) * (b.0 - o.0)
}

fn on_segment(p: Point, q: Point, r: Point) -> bool {
    q.0 <= p.0.max(r.0) + EPSILON
        && q.0 + EPSILON >= p.0.min(r.0)
        && q.1 <= p.1.max(r.1) + EPSILON
        && q.1 + EPSILON >= p.1.min(r.1)
}

fn segments_intersect(p1: Point, p2: Point, p3: Point, p4: Point) -> bool {
    let d1 = cross(p3, p4, p1);
    let d2 = cross(p3, p4, p2);
    let d3 = cross(p1, p2, p3);
    let d4 = cross(p1, p2, p4);

    if ((d1 > EPSILON && d2 < -EPSILON) || (d1 < -EPSILON && d2 > EPSILON))
        && ((d3 > EPSILON && d4 < -EPSILON) || (d3 < -EPSILON && d4 > EPSILON))
    {
        return true;
    }

    (d1.abs() <= EPSILON && on_segment(p3, p1, p4))
        || (d2.abs() <= EPSILON && on_segment(p3, p2, p4))
        || (d3.abs() <= EPSILON && on_segment(p1, p3, p2))
        || (d4.abs() <= EPSILON && on_segment(p1, p4, p2))
}

fn point_in_polygon(point: Point, polygon: &[Point]) -> bool {
    if polygon.len() < 3 {
        return false;
    }

    let (x, y) = point;
    let mut inside = false;
    let mut j = polygon.len() - 1;
    for i in 0..polygon.len() {
        let (xi, yi) = polygon[i];
        let (xj, yj) = polygon[j];
        if (yi > y) != (yj > y) && x < (xj - xi) * (y - yi) / (yj - yi) + xi {
            inside = !inside;
        }
        j = i;
    }
    inside
}
