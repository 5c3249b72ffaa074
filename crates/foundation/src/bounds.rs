/// Axis-aligned bounding box in lng/lat (or any planar) space.
///
/// `min = [min_lng, min_lat]`, `max = [max_lng, max_lat]`.
#[derive(Copy, Clone, Debug, PartialEq)]
pub struct Aabb2 {
    pub min: [f64; 2],
    pub max: [f64; 2],
}

impl Aabb2 {
    pub fn new(min: [f64; 2], max: [f64; 2]) -> Self {
        Aabb2 { min, max }
    }

    pub fn from_point(p: [f64; 2]) -> Self {
        Aabb2 { min: p, max: p }
    }

    /// Bounds of every finite point; non-finite points are skipped.
    /// Returns `None` when no point is finite.
    pub fn from_points<I>(points: I) -> Option<Self>
    where
        I: IntoIterator<Item = [f64; 2]>,
    {
        let mut out: Option<Aabb2> = None;
        for p in points {
            if !p[0].is_finite() || !p[1].is_finite() {
                continue;
            }
            match out.as_mut() {
                Some(b) => b.extend(p),
                None => out = Some(Aabb2::from_point(p)),
            }
        }
        out
    }

    pub fn extend(&mut self, p: [f64; 2]) {
        self.min[0] = self.min[0].min(p[0]);
        self.min[1] = self.min[1].min(p[1]);
        self.max[0] = self.max[0].max(p[0]);
        self.max[1] = self.max[1].max(p[1]);
    }

    /// `[min_lng, min_lat, max_lng, max_lat]`
    pub fn to_array(self) -> [f64; 4] {
        [self.min[0], self.min[1], self.max[0], self.max[1]]
    }
}
