//! K-means used to seed the HMM emission means.
//!
//! The first center is drawn with the caller's RNG; the rest are chosen by
//! farthest-point selection, then refined with Lloyd iterations.

use ndarray::{Array1, Array2, ArrayView1, ArrayView2, Axis};
use rand::rngs::StdRng;
use rand::Rng;

fn sq_dist(a: ArrayView1<'_, f64>, b: ArrayView1<'_, f64>) -> f64 {
    a.iter().zip(b).map(|(x, y)| (x - y).powi(2)).sum()
}

fn nearest(point: ArrayView1<'_, f64>, centers: &Array2<f64>) -> usize {
    let mut best = 0;
    let mut best_d = f64::INFINITY;
    for (c, center) in centers.outer_iter().enumerate() {
        let d = sq_dist(point, center);
        if d < best_d {
            best = c;
            best_d = d;
        }
    }
    best
}

/// Returns a `k x d` matrix of centers. `data` must hold at least one row.
pub fn kmeans(
    data: ArrayView2<'_, f64>,
    k: usize,
    max_iter: usize,
    rng: &mut StdRng,
) -> Array2<f64> {
    let (n, dims) = data.dim();
    if n == 0 || k == 0 {
        return Array2::zeros((0, dims));
    }

    let mut chosen = vec![rng.gen_range(0..n)];
    let mut min_d: Array1<f64> = data
        .outer_iter()
        .map(|p| sq_dist(p, data.row(chosen[0])))
        .collect();
    while chosen.len() < k {
        let mut far = 0;
        for (i, d) in min_d.iter().enumerate() {
            if *d > min_d[far] {
                far = i;
            }
        }
        let next = data.row(far);
        for (d, p) in min_d.iter_mut().zip(data.outer_iter()) {
            *d = d.min(sq_dist(p, next));
        }
        chosen.push(far);
    }
    let mut centers = data.select(Axis(0), &chosen);

    let mut assignment = vec![usize::MAX; n];
    for _ in 0..max_iter {
        let mut changed = false;
        for (slot, p) in assignment.iter_mut().zip(data.outer_iter()) {
            let c = nearest(p, &centers);
            if *slot != c {
                *slot = c;
                changed = true;
            }
        }
        if !changed {
            break;
        }

        let mut sums = Array2::<f64>::zeros((k, dims));
        let mut counts = vec![0usize; k];
        for (&c, p) in assignment.iter().zip(data.outer_iter()) {
            counts[c] += 1;
            let mut row = sums.row_mut(c);
            row += &p;
        }
        for (c, &count) in counts.iter().enumerate() {
            // Empty clusters keep their previous center.
            if count > 0 {
                centers.row_mut(c).assign(&(&sums.row(c) / count as f64));
            }
        }
    }

    centers
}
