use image::Pixel;
use itertools::iproduct;

use crate::kuwahara::sector::SectorGeometry;
use crate::Image;

/// Half-extent of the 3x3 quadrant windows the adaptive mode starts from.
pub(crate) const ADAPTIVE_BASE_RANGE: i64 = 1;

/// Mean color and brightness variance of one candidate region.
///
/// The variance is the population variance (divide by the point count, not
/// count - 1) of the per-pixel brightness `(r + g + b) / 3` around the
/// region's own mean brightness. Stats are recomputed per output pixel per
/// invocation; nothing is cached across pixels.
#[derive(Debug, Clone, Copy, PartialEq)]
pub(crate) struct RegionStat {
    pub(crate) mean: [f32; 3],
    pub(crate) variance: f32,
}

/// Reads a pixel with both coordinates clamped into the valid extent.
///
/// Out-of-range coordinates are replaced by the nearest valid coordinate
/// rather than wrapping or failing, so boundary regions simply replicate the
/// edge pixels.
pub(crate) fn clamped_pixel<P>(image: &Image<P>, x: i64, y: i64) -> &P
where
    P: Pixel,
{
    let (width, height) = image.dimensions();
    let x = x.clamp(0, i64::from(width) - 1) as u32;
    let y = y.clamp(0, i64::from(height) - 1) as u32;
    image.get_pixel(x, y)
}

fn color_channels<P>(pixel: &P) -> [f32; 3]
where
    P: Pixel,
    P::Subpixel: Into<f32>,
{
    let channels = pixel.channels();
    [
        channels[0].into(),
        channels[1].into(),
        channels[2].into(),
    ]
}

/// Stats over the `(2 * half_extent + 1)^2` window centered at `(cx, cy)`.
///
/// Two full passes, as the classic formulation: the first accumulates the
/// channel and brightness means, the second the squared brightness
/// deviations. All reads go through the clamped accessor.
pub(crate) fn window_stat<P>(image: &Image<P>, cx: i64, cy: i64, half_extent: i64) -> RegionStat
where
    P: Pixel,
    P::Subpixel: Into<f32>,
{
    let side = 2 * half_extent + 1;
    let count = (side * side) as f32;

    let mut mean = [0.0f32; 3];
    let mut mean_brightness = 0.0f32;
    for (dy, dx) in iproduct!(-half_extent..=half_extent, -half_extent..=half_extent) {
        let [r, g, b] = color_channels(clamped_pixel(image, cx + dx, cy + dy));
        mean[0] += r;
        mean[1] += g;
        mean[2] += b;
        mean_brightness += (r + g + b) / 3.0;
    }
    for channel in &mut mean {
        *channel /= count;
    }
    mean_brightness /= count;

    let mut variance = 0.0f32;
    for (dy, dx) in iproduct!(-half_extent..=half_extent, -half_extent..=half_extent) {
        let [r, g, b] = color_channels(clamped_pixel(image, cx + dx, cy + dy));
        let brightness = (r + g + b) / 3.0;
        variance += (brightness - mean_brightness).powi(2);
    }
    variance /= count;

    RegionStat { mean, variance }
}

/// Per-sector stats over the disc of `radius` centered at `(cx, cy)`.
///
/// Integer offsets within the bounding square are kept when their Euclidean
/// distance from the center does not exceed `radius`, then bucketed by
/// [`SectorGeometry::sector_indices`]; a boundary offset contributes to both
/// adjacent sectors. Each sector's mean and population variance are computed
/// over its own point set. An empty sector gets `+inf` variance so the
/// minimum-variance scan can never select it.
pub(crate) fn sector_stats<P>(
    image: &Image<P>,
    cx: i64,
    cy: i64,
    radius: i64,
    geometry: &SectorGeometry,
) -> Vec<RegionStat>
where
    P: Pixel,
    P::Subpixel: Into<f32>,
{
    let sector_count = geometry.sector_count();
    let mut sums = vec![[0.0f32; 3]; sector_count];
    let mut brightness_samples = vec![Vec::new(); sector_count];

    for (dy, dx) in iproduct!(-radius..=radius, -radius..=radius) {
        if dx * dx + dy * dy > radius * radius {
            continue;
        }
        let [r, g, b] = color_channels(clamped_pixel(image, cx + dx, cy + dy));
        let brightness = (r + g + b) / 3.0;
        for k in geometry.sector_indices(dx, dy) {
            sums[k][0] += r;
            sums[k][1] += g;
            sums[k][2] += b;
            brightness_samples[k].push(brightness);
        }
    }

    sums.iter()
        .zip(&brightness_samples)
        .map(|(sum, samples)| {
            if samples.is_empty() {
                return RegionStat {
                    mean: [0.0; 3],
                    variance: f32::INFINITY,
                };
            }
            let count = samples.len() as f32;
            let mean = [sum[0] / count, sum[1] / count, sum[2] / count];
            let mean_brightness = samples.iter().sum::<f32>() / count;
            let variance = samples
                .iter()
                .map(|brightness| (brightness - mean_brightness).powi(2))
                .sum::<f32>()
                / count;
            RegionStat { mean, variance }
        })
        .collect()
}

/// The four quadrant anchor coordinates at the given diagonal offset.
///
/// Enumeration order is fixed (top-left, top-right, bottom-left,
/// bottom-right) and doubles as the tie-break order of the candidate scan.
pub(crate) fn quadrant_anchors(cx: i64, cy: i64, range: i64) -> [(i64, i64); 4] {
    [
        (cx - range, cy - range),
        (cx + range, cy - range),
        (cx - range, cy + range),
        (cx + range, cy + range),
    ]
}

/// Adaptive candidate stats for the pixel at `(cx, cy)`.
///
/// Starts from four 3x3 quadrant windows anchored diagonally one pixel off
/// the center, then runs `steps - 1` further rounds that grow the
/// half-extent by one while keeping the anchors fixed. Each quadrant slot
/// retains the lowest-variance candidate seen across all rounds, so a later,
/// larger window can still replace an earlier winner.
pub(crate) fn adaptive_quadrant_stats<P>(
    image: &Image<P>,
    cx: i64,
    cy: i64,
    steps: u32,
) -> [RegionStat; 4]
where
    P: Pixel,
    P::Subpixel: Into<f32>,
{
    let anchors = quadrant_anchors(cx, cy, ADAPTIVE_BASE_RANGE);
    let mut best = anchors.map(|(ax, ay)| window_stat(image, ax, ay, ADAPTIVE_BASE_RANGE));

    for step in 1..i64::from(steps) {
        let half_extent = ADAPTIVE_BASE_RANGE + step;
        for (slot, &(ax, ay)) in best.iter_mut().zip(anchors.iter()) {
            let candidate = window_stat(image, ax, ay, half_extent);
            if candidate.variance < slot.variance {
                *slot = candidate;
            }
        }
    }

    best
}
