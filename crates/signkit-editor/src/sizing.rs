//! Signature sizing and aspect-locked resizing.

use crate::config::Footprint;
use crate::geometry::Size;

/// Fits an intrinsic image size into the signature footprint.
///
/// Scales down uniformly if either side exceeds the maximum, then up if
/// either side falls below the minimum. Ratios too extreme to satisfy both
/// are clamped per dimension as a last step.
pub fn fit_to_footprint(intrinsic: Size, footprint: &Footprint) -> Size {
    let mut width = intrinsic.width.max(f64::MIN_POSITIVE);
    let mut height = intrinsic.height.max(f64::MIN_POSITIVE);

    if width > footprint.max_width || height > footprint.max_height {
        let factor = (footprint.max_width / width).min(footprint.max_height / height);
        width *= factor;
        height *= factor;
    }

    if width < footprint.min_width || height < footprint.min_height {
        let factor = (footprint.min_width / width).max(footprint.min_height / height);
        width *= factor;
        height *= factor;
    }

    Size::new(
        width.clamp(footprint.min_width, footprint.max_width),
        height.clamp(footprint.min_height, footprint.max_height),
    )
}

/// Width range in which `width / ratio` also lands inside the footprint.
///
/// `None` when no width satisfies both axes.
pub fn feasible_width(ratio: f64, footprint: &Footprint) -> Option<(f64, f64)> {
    let low = footprint.min_width.max(footprint.min_height * ratio);
    let high = footprint.max_width.min(footprint.max_height * ratio);
    (low <= high).then_some((low, high))
}

/// Resizes a signature while keeping `ratio`.
///
/// The dimension that moved further from `current` drives the resize and
/// the other one follows.
pub fn resize_locked(current: Size, requested: Size, ratio: f64, footprint: &Footprint) -> Size {
    let ratio = if ratio.is_finite() && ratio > 0.0 {
        ratio
    } else {
        current.aspect_ratio()
    };

    let width_delta = (requested.width - current.width).abs();
    let height_delta = (requested.height - current.height).abs();

    let width = if width_delta >= height_delta {
        requested.width
    } else {
        requested.height * ratio
    };

    match feasible_width(ratio, footprint) {
        Some((low, high)) => {
            let width = width.clamp(low, high);
            Size::new(width, width / ratio)
        }
        None => {
            let width = width.clamp(footprint.min_width, footprint.max_width);
            Size::new(
                width,
                (width / ratio).clamp(footprint.min_height, footprint.max_height),
            )
        }
    }
}
