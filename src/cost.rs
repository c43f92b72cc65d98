use super::common::*;
use super::encoder_context::MAX_QP;

/// Lambda multipliers for every quantization parameter.
///
/// Built once per encoder and handed to the search by reference. The values
/// are in the SAD domain: the square root of the usual SSD lambda
/// `0.57 * 2^((qp - 12) / 3)`.
#[derive(Clone, Debug, PartialEq)]
pub struct LambdaTable {
    lambdas: [f64; MAX_QP + 1],
}

impl Default for LambdaTable {
    fn default() -> Self {
        Self::new()
    }
}

impl LambdaTable {
    pub fn new() -> LambdaTable {
        let mut lambdas = [0.0; MAX_QP + 1];
        for (qp, lambda) in lambdas.iter_mut().enumerate() {
            let ssd_lambda = 0.57 * 2.0f64.powf((qp as f64 - 12.0) / 3.0);
            *lambda = ssd_lambda.sqrt();
        }
        LambdaTable { lambdas }
    }

    #[inline(always)]
    pub fn lambda(&self, qp: usize) -> f64 {
        #[cfg(debug_assertions)]
        {
            assert!(qp <= MAX_QP, "qp {} is out of range", qp);
        }
        self.lambdas[qp]
    }

    pub fn cost_model(&self, qp: usize) -> CostModel {
        CostModel {
            lambda: self.lambda(qp),
        }
    }
}

/// Rate-distortion weighting for one quantization parameter.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct CostModel {
    pub lambda: f64,
}

impl CostModel {
    /// Converts an estimated bit count into distortion units.
    #[inline(always)]
    pub fn bits_to_cost(&self, bits: f64) -> u32 {
        (self.lambda * bits).round() as u32
    }

    /// Estimated cost of signalling a quad split.
    #[inline(always)]
    pub fn split_cost(&self) -> u32 {
        self.bits_to_cost(4.5)
    }

    /// Penalty that biases the inter search towards low reference indices.
    #[inline(always)]
    pub fn ref_idx_cost(&self, ref_idx: usize) -> u32 {
        self.bits_to_cost(ref_idx as f64)
    }

    /// Rough mode signalling estimate for a luma intra prediction mode.
    pub fn intra_mode_cost(&self, mode: IntraPredMode) -> u32 {
        let bits = match mode {
            IntraPredMode::PLANAR => 1.0,
            mode => 2.0 + 0.6 * (mode as usize as f64 + 2.3).log2(),
        };
        self.bits_to_cost(bits)
    }
}

/// Bit-cost penalty of a whole-sample candidate vector against the
/// quarter-sample predictor.
///
/// Compares magnitudes per component rather than the signed difference, so
/// `(-4, 0)` against `(4, 0)` costs nothing.
#[inline(always)]
pub fn mvd_cost(mv: MotionVector, pred: MotionVector) -> u32 {
    let dx = (mv.x.abs() - pred.x.abs()).unsigned_abs();
    let dy = (mv.y.abs() - pred.y.abs()).unsigned_abs();
    if dx == 0 && dy == 0 {
        0
    } else {
        // two extra bits for quarter-sample precision, doubled for exp-golomb
        2 * bit_length(dx.max(dy)) + 2
    }
}
