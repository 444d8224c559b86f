use image::imageops::replace;
use image::GrayImage;
use imageproc::contours::{find_contours, BorderType};
use imageproc::geometry::convex_hull;
use imageproc::point::Point;
use rand::{rngs::StdRng, seq::SliceRandom, SeedableRng};
use serde::Serialize;

/// Fixed so the point shuffle, and therefore every result, is reproducible.
const SHUFFLE_SEED: u64 = 0x6c69_6768_7473;
const EPS: f64 = 1e-7;

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Circle {
    pub center: (f64, f64),
    pub radius: f64,
}

impl Circle {
    fn point(p: (f64, f64)) -> Self {
        Self {
            center: p,
            radius: 0.0,
        }
    }

    fn diameter(a: (f64, f64), b: (f64, f64)) -> Self {
        let center = ((a.0 + b.0) / 2.0, (a.1 + b.1) / 2.0);
        Self {
            center,
            radius: dist(center, a).max(dist(center, b)),
        }
    }

    /// Circumcircle; for collinear points the widest diameter circle.
    fn through(a: (f64, f64), b: (f64, f64), c: (f64, f64)) -> Self {
        let bx = b.0 - a.0;
        let by = b.1 - a.1;
        let cx = c.0 - a.0;
        let cy = c.1 - a.1;
        let d = 2.0 * (bx * cy - by * cx);
        if d.abs() < EPS {
            return [Self::diameter(a, b), Self::diameter(a, c), Self::diameter(b, c)]
                .into_iter()
                .fold(Self::point(a), |best, cand| {
                    if cand.radius > best.radius {
                        cand
                    } else {
                        best
                    }
                });
        }
        let b2 = bx * bx + by * by;
        let c2 = cx * cx + cy * cy;
        let ux = (cy * b2 - by * c2) / d;
        let uy = (bx * c2 - cx * b2) / d;
        let center = (a.0 + ux, a.1 + uy);
        Self {
            center,
            radius: dist(center, a).max(dist(center, b)).max(dist(center, c)),
        }
    }

    pub fn contains(&self, p: (f64, f64)) -> bool {
        dist(self.center, p) <= self.radius + EPS * self.radius.max(1.0)
    }
}

fn dist(a: (f64, f64), b: (f64, f64)) -> f64 {
    (a.0 - b.0).hypot(a.1 - b.1)
}

/// Smallest circle containing every point (randomised incremental Welzl).
pub fn min_enclosing_circle(points: &[Point<i32>]) -> Option<Circle> {
    if points.is_empty() {
        return None;
    }
    let hull = if points.len() > 3 {
        convex_hull(points)
    } else {
        points.to_vec()
    };
    let mut pts: Vec<(f64, f64)> = hull.iter().map(|p| (p.x as f64, p.y as f64)).collect();
    pts.shuffle(&mut StdRng::seed_from_u64(SHUFFLE_SEED));

    let mut circle = Circle::point(pts[0]);
    for i in 1..pts.len() {
        if circle.contains(pts[i]) {
            continue;
        }
        circle = Circle::point(pts[i]);
        for j in 0..i {
            if circle.contains(pts[j]) {
                continue;
            }
            circle = Circle::diameter(pts[i], pts[j]);
            for k in 0..j {
                if !circle.contains(pts[k]) {
                    circle = Circle::through(pts[i], pts[j], pts[k]);
                }
            }
        }
    }
    Some(circle)
}

/// A bright region that passed the radius gate.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct BrightRegion {
    /// 1-based position in the left-to-right ordering of all external contours
    pub index: usize,
    pub center: (f32, f32),
    pub radius: f32,
}

/// Outermost outer borders of the foreground, sorted by leftmost x (stable).
///
/// Everything outside the image counts as background, so regions touching
/// the border are returned like any other.
pub fn external_contours(mask: &GrayImage) -> Vec<Vec<Point<i32>>> {
    let mut padded = GrayImage::new(mask.width() + 2, mask.height() + 2);
    replace(&mut padded, mask, 1, 1);

    let mut contours: Vec<Vec<Point<i32>>> = find_contours::<i32>(&padded)
        .into_iter()
        .filter(|c| matches!(c.border_type, BorderType::Outer) && c.parent.is_none())
        .map(|c| {
            c.points
                .into_iter()
                .map(|p| Point::new(p.x - 1, p.y - 1))
                .collect::<Vec<_>>()
        })
        .filter(|points| !points.is_empty())
        .collect();
    contours.sort_by_key(|points| points.iter().map(|p| p.x).min().unwrap_or(0));
    contours
}

/// Regions whose enclosing-circle radius is at least `radius_min`.
pub fn filter_regions(mask: &GrayImage, radius_min: f32) -> Vec<BrightRegion> {
    let contours = external_contours(mask);
    let regions: Vec<BrightRegion> = contours
        .iter()
        .enumerate()
        .filter_map(|(i, points)| {
            let circle = min_enclosing_circle(points)?;
            log::debug!(
                "contour #{}: {} points, radius {:.1}",
                i + 1,
                points.len(),
                circle.radius
            );
            (circle.radius >= radius_min as f64).then(|| BrightRegion {
                index: i + 1,
                center: (circle.center.0 as f32, circle.center.1 as f32),
                radius: circle.radius as f32,
            })
        })
        .collect();
    log::debug!(
        "shape: {} of {} contour(s) reach radius {}",
        regions.len(),
        contours.len(),
        radius_min
    );
    regions
}
