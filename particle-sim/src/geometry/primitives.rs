// Copyright 2025 John Brosnihan
//
// Licensed under the Apache License, Version 2.0 (the "License");
// you may not use this file except in compliance with the License.
// You may obtain a copy of the License at
//
//     http://www.apache.org/licenses/LICENSE-2.0
//
// Unless required by applicable law or agreed to in writing, software
// distributed under the License is distributed on an "AS IS" BASIS,
// WITHOUT WARRANTIES OR CONDITIONS OF ANY KIND, either express or implied.
// See the License for the specific language governing permissions and
// limitations under the License.
//! Bounding boxes and sphere-vs-triangle tests

use glam::Vec3;

/// Axis-aligned bounding box
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Aabb {
    /// Minimum corner
    pub min: Vec3,
    /// Maximum corner
    pub max: Vec3,
}

impl Aabb {
    /// Create a box from its corners
    pub fn new(min: Vec3, max: Vec3) -> Self {
        Aabb { min, max }
    }

    /// Smallest box containing all `points`, or `None` when empty
    pub fn from_points<I>(points: I) -> Option<Self>
    where
        I: IntoIterator<Item = Vec3>,
    {
        let mut iter = points.into_iter();
        let first = iter.next()?;
        Some(iter.fold(Aabb::new(first, first), |acc, p| {
            Aabb::new(acc.min.min(p), acc.max.max(p))
        }))
    }

    /// Box grown by `margin` on every side
    pub fn inflated(&self, margin: f32) -> Self {
        Aabb::new(self.min - Vec3::splat(margin), self.max + Vec3::splat(margin))
    }

    /// Center point
    pub fn center(&self) -> Vec3 {
        (self.min + self.max) * 0.5
    }

    /// Edge lengths
    pub fn extent(&self) -> Vec3 {
        self.max - self.min
    }

    /// Overlap test, touching boxes count as overlapping
    pub fn intersects(&self, other: &Aabb) -> bool {
        self.min.cmple(other.max).all() && other.min.cmple(self.max).all()
    }

    /// Sphere overlap test using the closest point on the box
    pub fn intersects_sphere(&self, center: Vec3, radius: f32) -> bool {
        let closest = center.clamp(self.min, self.max);
        closest.distance_squared(center) <= radius * radius
    }

    /// One of the eight octants, `index` bits select the upper half per axis
    /// (bit 0: x, bit 1: y, bit 2: z)
    pub fn octant(&self, index: usize) -> Aabb {
        let mid = self.center();
        let pick = |bit: usize, lo: f32, m: f32, hi: f32| {
            if index & bit != 0 {
                (m, hi)
            } else {
                (lo, m)
            }
        };
        let (x0, x1) = pick(1, self.min.x, mid.x, self.max.x);
        let (y0, y1) = pick(2, self.min.y, mid.y, self.max.y);
        let (z0, z1) = pick(4, self.min.z, mid.z, self.max.z);
        Aabb::new(Vec3::new(x0, y0, z0), Vec3::new(x1, y1, z1))
    }
}

/// Triangle given by its three corners
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Triangle {
    /// First corner
    pub a: Vec3,
    /// Second corner
    pub b: Vec3,
    /// Third corner
    pub c: Vec3,
}

impl Triangle {
    /// Create a triangle
    pub fn new(a: Vec3, b: Vec3, c: Vec3) -> Self {
        Triangle { a, b, c }
    }

    /// Tight bounding box
    pub fn bounds(&self) -> Aabb {
        Aabb::new(self.a.min(self.b).min(self.c), self.a.max(self.b).max(self.c))
    }

    /// Point on the triangle closest to `p`
    ///
    /// Voronoi-region walk (Ericson, Real-Time Collision Detection, 5.1.5).
    /// Degenerate triangles fall through to an edge or vertex region.
    pub fn closest_point(&self, p: Vec3) -> Vec3 {
        let (a, b, c) = (self.a, self.b, self.c);
        let ab = b - a;
        let ac = c - a;

        let ap = p - a;
        let d1 = ab.dot(ap);
        let d2 = ac.dot(ap);
        if d1 <= 0.0 && d2 <= 0.0 {
            return a;
        }

        let bp = p - b;
        let d3 = ab.dot(bp);
        let d4 = ac.dot(bp);
        if d3 >= 0.0 && d4 <= d3 {
            return b;
        }

        let vc = d1 * d4 - d3 * d2;
        if vc <= 0.0 && d1 >= 0.0 && d3 <= 0.0 {
            let v = d1 / (d1 - d3);
            return a + ab * v;
        }

        let cp = p - c;
        let d5 = ab.dot(cp);
        let d6 = ac.dot(cp);
        if d6 >= 0.0 && d5 <= d6 {
            return c;
        }

        let vb = d5 * d2 - d1 * d6;
        if vb <= 0.0 && d2 >= 0.0 && d6 <= 0.0 {
            let w = d2 / (d2 - d6);
            return a + ac * w;
        }

        let va = d3 * d6 - d5 * d4;
        if va <= 0.0 && (d4 - d3) >= 0.0 && (d5 - d6) >= 0.0 {
            let w = (d4 - d3) / ((d4 - d3) + (d5 - d6));
            return b + (c - b) * w;
        }

        let denom = va + vb + vc;
        if denom == 0.0 {
            // Collinear corners not caught above; nearest corner is close enough
            return [a, b, c]
                .into_iter()
                .fold(a, |best, q| if q.distance_squared(p) < best.distance_squared(p) { q } else { best });
        }
        let v = vb / denom;
        let w = vc / denom;
        a + ab * v + ac * w
    }

    /// Sphere overlap test
    pub fn intersects_sphere(&self, center: Vec3, radius: f32) -> bool {
        self.closest_point(center).distance_squared(center) <= radius * radius
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn unit_triangle() -> Triangle {
        Triangle::new(Vec3::ZERO, Vec3::X, Vec3::Y)
    }

    #[test]
    fn test_aabb_from_points() {
        assert!(Aabb::from_points(std::iter::empty()).is_none());
        let aabb = Aabb::from_points([Vec3::new(1.0, -2.0, 0.0), Vec3::new(-1.0, 3.0, 2.0)]).unwrap();
        assert_eq!(aabb.min, Vec3::new(-1.0, -2.0, 0.0));
        assert_eq!(aabb.max, Vec3::new(1.0, 3.0, 2.0));
    }

    #[test]
    fn test_aabb_sphere() {
        let aabb = Aabb::new(Vec3::ZERO, Vec3::ONE);
        assert!(aabb.intersects_sphere(Vec3::splat(0.5), 0.1));
        assert!(aabb.intersects_sphere(Vec3::new(1.5, 0.5, 0.5), 0.5));
        assert!(!aabb.intersects_sphere(Vec3::new(1.5, 0.5, 0.5), 0.4));
        assert!(!aabb.intersects_sphere(Vec3::splat(2.0), 1.0));
    }

    #[test]
    fn test_octants_cover_box() {
        let aabb = Aabb::new(Vec3::splat(-1.0), Vec3::splat(1.0));
        let low = aabb.octant(0);
        assert_eq!(low.min, Vec3::splat(-1.0));
        assert_eq!(low.max, Vec3::ZERO);
        let high = aabb.octant(7);
        assert_eq!(high.min, Vec3::ZERO);
        assert_eq!(high.max, Vec3::splat(1.0));
        let x_only = aabb.octant(1);
        assert_eq!(x_only.min, Vec3::new(0.0, -1.0, -1.0));
    }

    #[test]
    fn test_closest_point_regions() {
        let tri = unit_triangle();
        // Face region
        assert_eq!(tri.closest_point(Vec3::new(0.25, 0.25, 1.0)), Vec3::new(0.25, 0.25, 0.0));
        // Vertex regions
        assert_eq!(tri.closest_point(Vec3::new(-1.0, -1.0, 0.0)), Vec3::ZERO);
        assert_eq!(tri.closest_point(Vec3::new(2.0, -0.5, 0.0)), Vec3::X);
        assert_eq!(tri.closest_point(Vec3::new(-0.5, 2.0, 0.0)), Vec3::Y);
        // Edge region along x axis
        assert_eq!(tri.closest_point(Vec3::new(0.5, -1.0, 0.0)), Vec3::new(0.5, 0.0, 0.0));
        // Hypotenuse
        let q = tri.closest_point(Vec3::new(1.0, 1.0, 0.0));
        assert!((q - Vec3::new(0.5, 0.5, 0.0)).length() < 1e-6);
    }

    #[test]
    fn test_triangle_sphere() {
        let tri = unit_triangle();
        assert!(tri.intersects_sphere(Vec3::new(0.2, 0.2, 0.05), 0.1));
        assert!(!tri.intersects_sphere(Vec3::new(0.2, 0.2, 0.5), 0.1));
    }

    #[test]
    fn test_degenerate_triangle() {
        let tri = Triangle::new(Vec3::ZERO, Vec3::X, Vec3::new(2.0, 0.0, 0.0));
        let q = tri.closest_point(Vec3::new(0.5, 1.0, 0.0));
        assert!((q - Vec3::new(0.5, 0.0, 0.0)).length() < 1e-6);
    }
}
