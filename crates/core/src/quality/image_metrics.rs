//! Pixel statistics over a face crop: grayscale extraction, sharpness
//! (variance of the Laplacian response) and exposure (mean intensity).

use ndarray::Array2;

use crate::shared::bounding_box::BoundingBox;
use crate::shared::frame::Frame;

/// Grayscale crop of `bbox`, clipped to the frame. `None` when the clipped
/// region is empty.
pub fn gray_crop(frame: &Frame, bbox: &BoundingBox) -> Option<Array2<f64>> {
    let rect = bbox.clip_to(frame.width(), frame.height())?;
    Some(Array2::from_shape_fn((rect.h, rect.w), |(row, col)| {
        frame.luma(rect.x + col, rect.y + row)
    }))
}

/// Variance of the 4-neighbour Laplacian over the whole crop.
///
/// Borders reflect without repeating the edge pixel (`dcb|abcd|cba`).
/// Low values mean few edges, i.e. a blurry crop.
pub fn laplacian_variance(gray: &Array2<f64>) -> f64 {
    let (h, w) = gray.dim();
    if h == 0 || w == 0 {
        return 0.0;
    }

    let at = |r: isize, c: isize| gray[[reflect_101(r, h), reflect_101(c, w)]];

    let mut sum = 0.0;
    let mut sum_sq = 0.0;
    for r in 0..h as isize {
        for c in 0..w as isize {
            let response =
                at(r - 1, c) + at(r + 1, c) + at(r, c - 1) + at(r, c + 1) - 4.0 * at(r, c);
            sum += response;
            sum_sq += response * response;
        }
    }

    let n = (h * w) as f64;
    let mean = sum / n;
    (sum_sq / n - mean * mean).max(0.0)
}

pub fn mean_intensity(gray: &Array2<f64>) -> f64 {
    gray.mean().unwrap_or(0.0)
}

fn reflect_101(i: isize, len: usize) -> usize {
    let n = len as isize;
    if n == 1 {
        return 0;
    }
    let mut i = i;
    if i < 0 {
        i = -i;
    }
    if i >= n {
        i = 2 * n - 2 - i;
    }
    i as usize
}
