/// Angular partition of a circular neighborhood into equal sectors.
///
/// Sector `k` spans `[k * delta, (k + 1) * delta]` degrees with
/// `delta = 360 / sectors`. Both span ends are inclusive, so an offset whose
/// angle falls exactly on a bucket boundary belongs to *two* adjacent
/// sectors. Sector counts that divide 360 evenly tile the full circle; other
/// counts still bucket deterministically but leave the last span short of a
/// full turn.
#[derive(Debug, Clone)]
pub(crate) struct SectorGeometry {
    spans: Vec<(f32, f32)>,
}

impl SectorGeometry {
    pub(crate) fn new(sectors: u32) -> Self {
        let delta = 360.0 / sectors as f32;
        let spans = (0..sectors)
            .map(|k| {
                let lower = k as f32 * delta;
                (lower, lower + delta)
            })
            .collect();
        Self { spans }
    }

    pub(crate) fn sector_count(&self) -> usize {
        self.spans.len()
    }

    /// Angle of an offset from the window center, in degrees within [0, 360).
    ///
    /// A lattice offset can only coincide with a rational bucket boundary at
    /// a multiple of 45 degrees (any other lattice direction has an
    /// irrational degree measure), so the eight axis and diagonal directions
    /// are produced exactly rather than through `atan2` rounding. This is
    /// what makes the inclusive boundary membership observable at all.
    pub(crate) fn offset_angle(dx: i64, dy: i64) -> f32 {
        if dy == 0 {
            return if dx >= 0 { 0.0 } else { 180.0 };
        }
        if dx == 0 {
            return if dy > 0 { 90.0 } else { 270.0 };
        }
        if dx.abs() == dy.abs() {
            return match (dx > 0, dy > 0) {
                (true, true) => 45.0,
                (false, true) => 135.0,
                (false, false) => 225.0,
                (true, false) => 315.0,
            };
        }
        let mut angle = (dy as f32).atan2(dx as f32).to_degrees();
        if angle < 0.0 {
            angle += 360.0;
        }
        angle
    }

    /// Indices of every sector whose span contains the offset's angle.
    ///
    /// One index for interior angles, two for angles on a shared boundary.
    /// The 0/360 seam is asymmetric: an angle of exactly 0 belongs to the
    /// first sector only, since normalization never yields 360.
    pub(crate) fn sector_indices(&self, dx: i64, dy: i64) -> impl Iterator<Item = usize> + '_ {
        let angle = Self::offset_angle(dx, dy);
        self.spans
            .iter()
            .enumerate()
            .filter(move |(_, &(lower, upper))| angle >= lower && angle <= upper)
            .map(|(k, _)| k)
    }
}
