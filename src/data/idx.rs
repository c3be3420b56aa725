//! Reader for the IDX binary files MNIST is distributed in.
//!
//! # IDX3 image file layout
//! ```text
//! bytes  0-1:   0x00 0x00   (reserved, must be zero)
//! byte   2:     0x08        (dtype = uint8)
//! byte   3:     0x03        (number of dimensions = 3)
//! bytes  4-7:   N           (number of images, big-endian u32)
//! bytes  8-11:  rows        (image height in pixels, big-endian u32)
//! bytes 12-15:  cols        (image width in pixels, big-endian u32)
//! bytes 16..:   N * rows * cols bytes, row-major, uint8
//! ```
//!
//! # IDX1 label file layout
//! ```text
//! bytes  0-1:   0x00 0x00   (reserved, must be zero)
//! byte   2:     0x08        (dtype = uint8)
//! byte   3:     0x01        (number of dimensions = 1)
//! bytes  4-7:   N           (number of labels, big-endian u32)
//! bytes  8..:   N bytes, each a class index
//! ```

use std::io::Read;
use std::path::{Path, PathBuf};

use crate::data::dataset::Dataset;
use crate::data::split::Split;
use crate::error::{Error, Result};
use crate::io;
use crate::math::matrix::Matrix;

pub const TRAIN_IMAGES: &str = "train-images-idx3-ubyte";
pub const TRAIN_LABELS: &str = "train-labels-idx1-ubyte";
pub const TEST_IMAGES: &str = "t10k-images-idx3-ubyte";
pub const TEST_LABELS: &str = "t10k-labels-idx1-ubyte";

/// Rows taken from the end of the official training set to form the
/// validation split (60000 → 50000 train + 10000 validate).
pub const DEFAULT_VALIDATION_SIZE: usize = 10_000;

fn read_be_u32(bytes: &[u8], at: usize) -> usize {
    u32::from_be_bytes([bytes[at], bytes[at + 1], bytes[at + 2], bytes[at + 3]]) as usize
}

fn check_header(bytes: &[u8], what: &str, dims: u8, header_len: usize) -> Result<()> {
    if bytes.len() < header_len {
        return Err(Error::Idx(format!(
            "{} file too short: expected at least {} header bytes, got {}",
            what, header_len, bytes.len()
        )));
    }
    if bytes[0] != 0x00 || bytes[1] != 0x00 {
        return Err(Error::Idx(format!(
            "{} file: bytes 0-1 must be 0x00 0x00, got 0x{:02X} 0x{:02X}",
            what, bytes[0], bytes[1]
        )));
    }
    if bytes[2] != 0x08 {
        return Err(Error::Idx(format!(
            "{} file: dtype byte must be 0x08 (uint8), got 0x{:02X}",
            what, bytes[2]
        )));
    }
    if bytes[3] != dims {
        return Err(Error::Idx(format!(
            "{} file: expected {} dimensions, got {}",
            what, dims, bytes[3]
        )));
    }
    Ok(())
}

/// Parses an image/label IDX pair into a [`Split`] with pixels scaled to [0, 1].
pub fn parse_idx_pair(image_bytes: &[u8], label_bytes: &[u8]) -> Result<Split> {
    check_header(image_bytes, "IDX image", 0x03, 16)?;
    check_header(label_bytes, "IDX label", 0x01, 8)?;

    let n_items = read_be_u32(image_bytes, 4);
    let rows = read_be_u32(image_bytes, 8);
    let cols = read_be_u32(image_bytes, 12);

    let n_pixels = rows
        .checked_mul(cols)
        .ok_or_else(|| Error::Idx(format!("rows * cols overflows (rows={}, cols={})", rows, cols)))?;
    let data_len = n_items
        .checked_mul(n_pixels)
        .ok_or_else(|| Error::Idx(format!("{} items of {} pixels overflows", n_items, n_pixels)))?;

    if image_bytes.len() < 16 + data_len {
        return Err(Error::Idx(format!(
            "IDX image file declares {} items of {}x{} pixels but holds only {} bytes",
            n_items, rows, cols, image_bytes.len()
        )));
    }

    let label_count = read_be_u32(label_bytes, 4);
    if label_count != n_items {
        return Err(Error::Idx(format!(
            "image file declares {} items but label file declares {}",
            n_items, label_count
        )));
    }
    if label_bytes.len() < 8 + n_items {
        return Err(Error::Idx(format!(
            "IDX label file declares {} labels but holds only {} bytes",
            n_items, label_bytes.len()
        )));
    }

    let data = image_bytes[16..16 + data_len]
        .iter()
        .map(|&px| px as f32 / 255.0)
        .collect();
    let labels = label_bytes[8..8 + n_items].to_vec();

    Split::new(Matrix::from_vec(n_items, n_pixels, data), labels)
}

/// Resolves `name` or `name.gz` inside `dir`.
fn locate(dir: &Path, name: &str) -> Result<PathBuf> {
    let plain = dir.join(name);
    if plain.is_file() {
        return Ok(plain);
    }
    let gz = dir.join(format!("{}.gz", name));
    if gz.is_file() {
        return Ok(gz);
    }
    Err(Error::NotFound { path: plain })
}

fn read_all(path: &Path) -> Result<Vec<u8>> {
    let mut reader = io::open_reader(path)?;
    let mut bytes = Vec::new();
    reader
        .read_to_end(&mut bytes)
        .map_err(|e| Error::io(path, e))?;
    Ok(bytes)
}

/// Loads one image/label file pair from `dir`.
pub fn load_idx_split(dir: &Path, images: &str, labels: &str) -> Result<Split> {
    let image_path = locate(dir, images)?;
    let label_path = locate(dir, labels)?;
    log::debug!("reading {} and {}", image_path.display(), label_path.display());
    parse_idx_pair(&read_all(&image_path)?, &read_all(&label_path)?)
}

/// Builds train/valid/test splits from a directory holding the four MNIST
/// IDX files. The last `validation_size` training rows become the validation split.
pub fn load_idx_dir(dir: &Path, validation_size: usize) -> Result<Dataset> {
    let full_train = load_idx_split(dir, TRAIN_IMAGES, TRAIN_LABELS)?;
    let test = load_idx_split(dir, TEST_IMAGES, TEST_LABELS)?;

    if validation_size >= full_train.len() {
        return Err(Error::Idx(format!(
            "validation size {} leaves no training rows out of {}",
            validation_size,
            full_train.len()
        )));
    }
    let cut = full_train.len() - validation_size;
    let train = full_train.slice(0, cut);
    let valid = full_train.slice(cut, full_train.len());

    Ok(Dataset { train, valid, test })
}

#[cfg(test)]
mod tests {
    use super::*;

    /// Encodes `images` (each `rows*cols` bytes) and `labels` as an IDX pair.
    fn encode_pair(images: &[Vec<u8>], labels: &[u8], rows: u32, cols: u32) -> (Vec<u8>, Vec<u8>) {
        let mut img = vec![0x00, 0x00, 0x08, 0x03];
        img.extend_from_slice(&(images.len() as u32).to_be_bytes());
        img.extend_from_slice(&rows.to_be_bytes());
        img.extend_from_slice(&cols.to_be_bytes());
        for image in images {
            img.extend_from_slice(image);
        }

        let mut lbl = vec![0x00, 0x00, 0x08, 0x01];
        lbl.extend_from_slice(&(labels.len() as u32).to_be_bytes());
        lbl.extend_from_slice(labels);
        (img, lbl)
    }

    #[test]
    fn parses_and_normalizes_pixels() {
        let (img, lbl) = encode_pair(&[vec![0, 255, 51, 0], vec![255, 255, 0, 0]], &[7, 2], 2, 2);
        let split = parse_idx_pair(&img, &lbl).unwrap();
        assert_eq!(split.len(), 2);
        assert_eq!(split.n_features(), 4);
        assert_eq!(split.inputs.row(0), &[0.0, 1.0, 0.2, 0.0]);
        assert_eq!(split.labels, vec![7, 2]);
    }

    #[test]
    fn rejects_wrong_dimension_byte() {
        let (mut img, lbl) = encode_pair(&[vec![0; 4]], &[1], 2, 2);
        img[3] = 0x01;
        assert!(matches!(parse_idx_pair(&img, &lbl), Err(Error::Idx(_))));
    }

    #[test]
    fn rejects_count_mismatch() {
        let (img, _) = encode_pair(&[vec![0; 4], vec![0; 4]], &[1, 2], 2, 2);
        let (_, lbl) = encode_pair(&[vec![0; 4]], &[1], 2, 2);
        assert!(matches!(parse_idx_pair(&img, &lbl), Err(Error::Idx(_))));
    }

    #[test]
    fn rejects_truncated_pixels() {
        let (mut img, lbl) = encode_pair(&[vec![0; 4]], &[1], 2, 2);
        img.pop();
        assert!(matches!(parse_idx_pair(&img, &lbl), Err(Error::Idx(_))));
    }

    #[test]
    fn directory_load_carves_validation_from_train() {
        use std::io::Write;

        let dir = tempfile::tempdir().unwrap();
        let train_imgs: Vec<Vec<u8>> = (0..5u8).map(|i| vec![i; 4]).collect();
        let (img, lbl) = encode_pair(&train_imgs, &[0, 1, 2, 3, 4], 2, 2);
        std::fs::write(dir.path().join(TRAIN_IMAGES), img).unwrap();
        // Labels stored compressed to exercise the `.gz` fallback.
        let gz = std::fs::File::create(dir.path().join(format!("{}.gz", TRAIN_LABELS))).unwrap();
        let mut enc = flate2::write::GzEncoder::new(gz, flate2::Compression::default());
        enc.write_all(&lbl).unwrap();
        enc.finish().unwrap();

        let (img, lbl) = encode_pair(&[vec![9; 4]], &[9], 2, 2);
        std::fs::write(dir.path().join(TEST_IMAGES), img).unwrap();
        std::fs::write(dir.path().join(TEST_LABELS), lbl).unwrap();

        let ds = load_idx_dir(dir.path(), 2).unwrap();
        assert_eq!(ds.train.labels, vec![0, 1, 2]);
        assert_eq!(ds.valid.labels, vec![3, 4]);
        assert_eq!(ds.test.labels, vec![9]);
    }
}
