use rand::Rng;
use std::f64::consts::PI;

/// Number of horizontal slices in the lookup table.
pub const ZIGGURAT_LAYERS: usize = 2048;

/// Inverse of the standard normal CDF (Acklam's rational approximation).
///
/// Relative error is below 1.15e-9 over the open interval (0, 1).
/// Returns `-inf`/`+inf` at the closed ends and `NaN` outside [0, 1].
pub fn norm_inv_cdf(p: f64) -> f64 {
    const A: [f64; 6] = [
        -39.69683028665376,
        220.9460984245205,
        -275.9285104469687,
        138.3577518672690,
        -30.66479806614716,
        2.506628277459239,
    ];
    const B: [f64; 5] = [
        -54.47609879822406,
        161.5858368580409,
        -155.6989798598866,
        66.80131188771972,
        -13.280681552885721,
    ];
    const C: [f64; 6] = [
        -0.007784894002430293,
        -0.3223964580411365,
        -2.400758277161838,
        -2.549732539343734,
        4.374664141464968,
        2.938163982698783,
    ];
    const D: [f64; 4] = [
        0.007784695709041462,
        0.3224671290700398,
        2.445134137142996,
        3.754408661907416,
    ];
    const P_LOW: f64 = 0.02425;
    const P_HIGH: f64 = 1.0 - P_LOW;

    if !(0.0..=1.0).contains(&p) {
        return f64::NAN;
    }
    if p == 0.0 {
        return f64::NEG_INFINITY;
    }
    if p == 1.0 {
        return f64::INFINITY;
    }

    let tail = |q: f64| {
        (((((C[0] * q + C[1]) * q + C[2]) * q + C[3]) * q + C[4]) * q + C[5])
            / ((((D[0] * q + D[1]) * q + D[2]) * q + D[3]) * q + 1.0)
    };

    if p < P_LOW {
        tail((-2.0 * p.ln()).sqrt())
    } else if p <= P_HIGH {
        let q = p - 0.5;
        let r = q * q;
        (((((A[0] * r + A[1]) * r + A[2]) * r + A[3]) * r + A[4]) * r + A[5]) * q
            / (((((B[0] * r + B[1]) * r + B[2]) * r + B[3]) * r + B[4]) * r + 1.0)
    } else {
        -tail((-2.0 * (1.0 - p).ln()).sqrt())
    }
}

/// Standard normal probability density.
pub fn normal_pdf(z: f64) -> f64 {
    (-(z * z) / 2.0).exp() / (2.0 * PI).sqrt()
}

/// Precomputed inverse-CDF ziggurat for approximate Gaussian sampling.
///
/// Slice `i` (1..2048) has its right edge at the normal quantile of
/// `1 - i / 4096`, so edges shrink from roughly 3.4 down to 0. Slice 0 stands
/// in for the tail and is always rejected, which bounds every sample by the
/// first edge.
#[derive(Debug, Clone)]
pub struct Ziggurat {
    edges: Vec<f64>,
}

impl Ziggurat {
    pub fn new() -> Ziggurat {
        let mut edges = vec![0.0; ZIGGURAT_LAYERS + 1];
        let step = 1.0 / (ZIGGURAT_LAYERS as f64 * 2.0);
        let mut cdf = 1.0;
        for edge in edges.iter_mut().take(ZIGGURAT_LAYERS).skip(1) {
            cdf -= step;
            *edge = norm_inv_cdf(cdf);
        }
        edges[0] = edges[1];
        edges[ZIGGURAT_LAYERS] = 0.0;
        Ziggurat { edges }
    }

    pub fn edges(&self) -> &[f64] {
        &self.edges
    }

    /// Draws the magnitude |z| of a standard normal sample.
    pub fn sample_magnitude<R: Rng + ?Sized>(&self, rng: &mut R) -> f64 {
        loop {
            let layer = rng.gen_range(0..ZIGGURAT_LAYERS);
            if layer == 0 {
                continue;
            }

            let right = self.edges[layer];
            let inner = self.edges[layer + 1];
            let candidate = rng.gen::<f64>() * right;

            // Inside the rectangle that lies fully under the curve.
            if candidate < inner {
                return candidate;
            }

            // Wedge: compare against the density between this slice's bounds.
            let low = normal_pdf(right);
            let high = normal_pdf(inner);
            let y = low + rng.gen::<f64>() * (high - low);
            if y < normal_pdf(candidate) {
                return candidate;
            }
        }
    }

    /// Draws a signed standard normal sample.
    pub fn sample<R: Rng + ?Sized>(&self, rng: &mut R) -> f64 {
        let magnitude = self.sample_magnitude(rng);
        if rng.gen::<bool>() {
            magnitude
        } else {
            -magnitude
        }
    }
}

impl Default for Ziggurat {
    fn default() -> Self {
        Ziggurat::new()
    }
}
