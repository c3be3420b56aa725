use std::path::Path;

use crate::error::{Error, Result};

/// Decodes an image file, resizes to `width × height`, converts to grayscale,
/// and normalizes pixels to [0, 1].
///
/// MNIST digits are light strokes on a dark background; pass `invert` for
/// dark-on-light scans so the input matches what the model was trained on.
///
/// Returns a flat `Vec<f32>` of length `width * height`.
pub fn image_to_grayscale_input(path: &Path, width: u32, height: u32, invert: bool) -> Result<Vec<f32>> {
    if !path.is_file() {
        return Err(Error::NotFound { path: path.to_path_buf() });
    }
    let img = image::open(path).map_err(|source| Error::Image { path: path.to_path_buf(), source })?;
    let resized = img.resize_exact(width, height, image::imageops::FilterType::Lanczos3);
    let gray = resized.to_luma8();
    Ok(gray
        .pixels()
        .map(|p| {
            let v = p.0[0] as f32 / 255.0;
            if invert { 1.0 - v } else { v }
        })
        .collect())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn resizes_and_inverts() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("digit.png");
        let img = image::GrayImage::from_fn(56, 56, |x, _| image::Luma([if x < 28 { 255 } else { 0 }]));
        img.save(&path).unwrap();

        let plain = image_to_grayscale_input(&path, 28, 28, false).unwrap();
        assert_eq!(plain.len(), 784);
        assert!(plain[0] > 0.9);
        assert!(plain[27] < 0.1);

        let inverted = image_to_grayscale_input(&path, 28, 28, true).unwrap();
        assert!(inverted[0] < 0.1);
    }

    #[test]
    fn missing_image_is_not_found() {
        let dir = tempfile::tempdir().unwrap();
        let r = image_to_grayscale_input(&dir.path().join("none.png"), 28, 28, false);
        assert!(matches!(r, Err(Error::Image { .. }) | Err(Error::NotFound { .. })));
    }
}
