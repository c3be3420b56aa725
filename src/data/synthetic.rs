use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

use crate::data::split::Split;
use crate::math::matrix::Matrix;

/// Seeded toy dataset of `n_classes` well-separated clusters.
///
/// Feature `j` of a class-`c` sample sits near 0.8 when `j % n_classes == c`
/// and near 0.2 otherwise, jittered uniformly by up to `spread`. With
/// `spread < 0.3` the classes are linearly separable. Rows cycle through the
/// classes so every contiguous batch is balanced.
pub fn blobs(per_class: usize, n_features: usize, n_classes: usize, spread: f32, seed: u64) -> Split {
    assert!(n_classes >= 2 && n_classes <= n_features, "need 2..=n_features classes");
    let mut rng = StdRng::seed_from_u64(seed);
    let n = per_class * n_classes;

    let mut data = Vec::with_capacity(n * n_features);
    let mut labels = Vec::with_capacity(n);
    for i in 0..n {
        let class = i % n_classes;
        for j in 0..n_features {
            let centre = if j % n_classes == class { 0.8 } else { 0.2 };
            let jitter = if spread > 0.0 { rng.gen_range(-spread..spread) } else { 0.0 };
            data.push((centre + jitter).clamp(0.0, 1.0));
        }
        labels.push(class as u8);
    }

    Split {
        inputs: Matrix::from_vec(n, n_features, data),
        labels,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn same_seed_same_data() {
        assert_eq!(blobs(4, 3, 3, 0.2, 7), blobs(4, 3, 3, 0.2, 7));
        assert_ne!(blobs(4, 3, 3, 0.2, 7), blobs(4, 3, 3, 0.2, 8));
    }

    #[test]
    fn values_stay_in_unit_interval_and_classes_cycle() {
        let s = blobs(5, 4, 2, 0.29, 3);
        assert_eq!(s.len(), 10);
        assert!(s.inputs.data.iter().all(|&v| (0.0..=1.0).contains(&v)));
        assert_eq!(&s.labels[..4], &[0, 1, 0, 1]);
    }
}
