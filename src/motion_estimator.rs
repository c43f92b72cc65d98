use super::common::*;
use super::cost::*;
use super::picture::*;

/// Large hexagon around the center. The first two points are repeated at the
/// end so that any index in 1..=8 starts a run of three consecutive points.
///
/// ```text
///   6 o-o 1 / 7
///    /   \
/// 5 o  0  o 2 / 8
///    \   /
///   4 o-o 3
/// ```
pub const LARGE_HEXBS: [MotionVector; 9] = [
    MotionVector::new(0, 0),
    MotionVector::new(1, -2),
    MotionVector::new(2, 0),
    MotionVector::new(1, 2),
    MotionVector::new(-1, 2),
    MotionVector::new(-2, 0),
    MotionVector::new(-1, -2),
    MotionVector::new(1, -2),
    MotionVector::new(2, 0),
];

/// Unit diamond used for the last refinement step.
pub const SMALL_DIAMOND: [MotionVector; 5] = [
    MotionVector::new(0, 0),
    MotionVector::new(0, -1),
    MotionVector::new(-1, 0),
    MotionVector::new(1, 0),
    MotionVector::new(0, 1),
];

/// Sum of absolute differences between the source block of `pic` at (x, y)
/// and the reconstructed block of `reference` at (ref_x, ref_y). Reference
/// samples outside the picture repeat the nearest edge sample.
pub fn calc_sad(
    pic: &Picture,
    reference: &Picture,
    x: usize,
    y: usize,
    ref_x: isize,
    ref_y: isize,
    block_width: usize,
) -> u32 {
    let inside = ref_x >= 0
        && ref_y >= 0
        && ref_x as usize + block_width <= reference.width
        && ref_y as usize + block_width <= reference.height;
    let mut sad = 0u32;
    if inside {
        let (ref_x, ref_y) = (ref_x as usize, ref_y as usize);
        for dy in 0..block_width {
            let cur = &pic.luma[y + dy][x..x + block_width];
            let rec = &reference.reconst[ref_y + dy][ref_x..ref_x + block_width];
            sad += cur
                .iter()
                .zip(rec.iter())
                .map(|(&a, &b)| (a as i32 - b as i32).unsigned_abs())
                .sum::<u32>();
        }
    } else {
        for dy in 0..block_width {
            let cur = &pic.luma[y + dy][x..x + block_width];
            for (dx, &a) in cur.iter().enumerate() {
                let b = reference
                    .reconst
                    .get_clamped(ref_x + dx as isize, ref_y + dy as isize);
                sad += (a as i32 - b as i32).unsigned_abs();
            }
        }
    }
    sad
}

pub struct MotionEstimator {
    log2_lcu_width: usize,
}

impl MotionEstimator {
    pub fn new(log2_lcu_width: usize) -> MotionEstimator {
        MotionEstimator { log2_lcu_width }
    }

    /// Cost of the whole-sample vector `mv` for the block at `orig`. The bit
    /// cost is taken against `mv_pred` as given, in quarter samples.
    #[inline(always)]
    pub fn candidate_cost(
        &self,
        block_width: usize,
        pic: &Picture,
        reference: &Picture,
        orig: (usize, usize),
        mv: MotionVector,
        mv_pred: MotionVector,
    ) -> u32 {
        let (x, y) = orig;
        calc_sad(
            pic,
            reference,
            x,
            y,
            x as isize + mv.x as isize,
            y as isize + mv.y as isize,
            block_width,
        ) + mvd_cost(mv, mv_pred)
    }

    /// Hexagon based block matching around the predicted vector.
    ///
    /// `mv_pred` is in quarter samples; the returned vector is too, but always
    /// lands on whole samples. The search is a greedy descent and stops at the
    /// first local minimum.
    pub fn hexagon_search(
        &self,
        depth: usize,
        pic: &Picture,
        reference: &Picture,
        orig: (usize, usize),
        mv_pred: MotionVector,
    ) -> (MotionVector, u32) {
        let block_width = 1 << (self.log2_lcu_width - depth);
        let cost_at = |mv: MotionVector| {
            self.candidate_cost(block_width, pic, reference, orig, mv, mv_pred)
        };

        let mut mv = mv_pred.to_integer();
        let mut best_cost = COST_MAX;
        let mut best_index = 0;

        for (i, pattern) in LARGE_HEXBS.iter().enumerate().take(7) {
            let cost = cost_at(mv + *pattern);
            if cost < best_cost {
                best_cost = cost;
                best_index = i;
            }
        }

        if !mv.is_zero() {
            let cost = cost_at(MotionVector::ZERO);
            if cost < best_cost {
                // the predictor was off, start over around zero
                best_cost = cost;
                best_index = 0;
                mv = MotionVector::ZERO;
                for (i, pattern) in LARGE_HEXBS.iter().enumerate().take(7).skip(1) {
                    let cost = cost_at(*pattern);
                    if cost < best_cost {
                        best_cost = cost;
                        best_index = i;
                    }
                }
            }
        }

        while best_index != 0 {
            let start = match best_index {
                1 => 6,
                8 => 1,
                i => i - 1,
            };
            mv = mv + LARGE_HEXBS[best_index];
            best_index = 0;
            for (i, offset) in LARGE_HEXBS.iter().enumerate().skip(start).take(3) {
                let cost = cost_at(mv + *offset);
                if cost < best_cost {
                    best_cost = cost;
                    best_index = i;
                }
            }
        }

        for (i, offset) in SMALL_DIAMOND.iter().enumerate().skip(1) {
            let cost = cost_at(mv + *offset);
            if cost > 0 && cost < best_cost {
                best_cost = cost;
                best_index = i;
            }
        }
        mv = mv + SMALL_DIAMOND[best_index];

        (mv.to_quarter(), best_cost)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::encoder_context::*;
    use rand::{prelude::StdRng, Rng, SeedableRng};

    fn random_picture(rng: &mut StdRng, size: usize, ectx: &EncoderContext) -> Picture {
        let samples: Vec<u8> = (0..size * size).map(|_| rng.gen()).collect();
        Picture::from_luma(size, size, &samples, SliceType::SLICE_P, ectx).unwrap()
    }

    /// Picture whose source at (x, y) equals `reference` at (x + dx, y + dy).
    fn shifted_picture(reference: &Picture, dx: isize, dy: isize, ectx: &EncoderContext) -> Picture {
        let size = reference.width;
        let mut samples = vec![0u8; size * size];
        for y in 0..size {
            for x in 0..size {
                samples[y * size + x] = reference
                    .reconst
                    .get_clamped(x as isize + dx, y as isize + dy);
            }
        }
        Picture::from_luma(size, size, &samples, SliceType::SLICE_P, ectx).unwrap()
    }

    #[test]
    fn flat_block_converges_to_zero() {
        let ectx = EncoderContext::new();
        let samples = vec![77u8; 64 * 64];
        let pic = Picture::from_luma(64, 64, &samples, SliceType::SLICE_P, &ectx).unwrap();
        let reference = Picture::from_luma(64, 64, &samples, SliceType::SLICE_P, &ectx).unwrap();
        let me = MotionEstimator::new(6);
        let (mv, cost) = me.hexagon_search(0, &pic, &reference, (0, 0), MotionVector::ZERO);
        assert_eq!(mv, MotionVector::ZERO);
        assert_eq!(cost, 0);
    }

    #[test]
    fn finds_hexagon_point_displacement() {
        let ectx = EncoderContext::new();
        let mut rng: StdRng = SeedableRng::seed_from_u64(1);
        let reference = random_picture(&mut rng, 64, &ectx);
        let pic = shifted_picture(&reference, 2, 0, &ectx);
        let me = MotionEstimator::new(6);
        let (mv, cost) = me.hexagon_search(2, &pic, &reference, (16, 16), MotionVector::ZERO);
        assert_eq!(mv, MotionVector::new(8, 0));
        assert_eq!(cost, mvd_cost(MotionVector::new(2, 0), MotionVector::ZERO));
    }

    #[test]
    fn descends_over_several_hexagon_steps() {
        let ectx = EncoderContext::new();
        let samples: Vec<u8> = (0..64 * 64i32)
            .map(|i| {
                let (x, y) = (i % 64 - 30, i / 64 - 30);
                (250 - (x * x + y * y) / 4).max(0) as u8
            })
            .collect();
        let reference = Picture::from_luma(64, 64, &samples, SliceType::SLICE_P, &ectx).unwrap();
        let me = MotionEstimator::new(6);
        // (3, -4) moves through points 1 and 7, (4, -4) through 1, 7 and 8,
        // (5, -3) through 2, 1 and 8
        for (dx, dy) in [(3, -4), (4, -4), (5, -3)] {
            let pic = shifted_picture(&reference, dx, dy, &ectx);
            let (mv, cost) = me.hexagon_search(2, &pic, &reference, (24, 24), MotionVector::ZERO);
            let expected = MotionVector::new(dx as i32, dy as i32);
            assert_eq!(mv, expected.to_quarter());
            assert_eq!(cost, mvd_cost(expected, MotionVector::ZERO));
            assert_eq!(cost, 8);
        }
    }

    #[test]
    fn small_diamond_refines_unit_offset() {
        let ectx = EncoderContext::new();
        let mut samples = vec![0u8; 64 * 64];
        for y in 22..26 {
            for x in 22..26 {
                samples[y * 64 + x] = 255;
            }
        }
        let reference = Picture::from_luma(64, 64, &samples, SliceType::SLICE_P, &ectx).unwrap();
        let pic = shifted_picture(&reference, 0, 1, &ectx);
        let me = MotionEstimator::new(6);
        let (mv, cost) = me.hexagon_search(2, &pic, &reference, (16, 16), MotionVector::ZERO);
        assert_eq!(mv, MotionVector::new(0, 4));
        assert_eq!(cost, 4);
    }

    #[test]
    fn restarts_around_zero_when_predictor_is_off() {
        let ectx = EncoderContext::new();
        let mut rng: StdRng = SeedableRng::seed_from_u64(3);
        let reference = random_picture(&mut rng, 64, &ectx);
        let pic = shifted_picture(&reference, 0, 0, &ectx);
        let me = MotionEstimator::new(6);
        let pred = MotionVector::new(40 * 4, 40 * 4);
        let (mv, cost) = me.hexagon_search(2, &pic, &reference, (16, 16), pred);
        assert_eq!(mv, MotionVector::ZERO);
        assert_eq!(cost, mvd_cost(MotionVector::ZERO, pred));
    }

    #[test]
    fn never_worse_than_predicted_candidate() {
        let ectx = EncoderContext::new();
        let mut rng: StdRng = SeedableRng::seed_from_u64(4);
        let me = MotionEstimator::new(6);
        for _ in 0..20 {
            let reference = random_picture(&mut rng, 64, &ectx);
            let pic = shifted_picture(
                &reference,
                rng.gen_range(-6..=6),
                rng.gen_range(-6..=6),
                &ectx,
            );
            let depth = rng.gen_range(1..=3);
            let width = 64 >> depth;
            let orig = (
                rng.gen_range(0..64 / width) * width,
                rng.gen_range(0..64 / width) * width,
            );
            let pred = MotionVector::new(rng.gen_range(-40..=40), rng.gen_range(-40..=40));
            let initial = me.candidate_cost(
                width,
                &pic,
                &reference,
                orig,
                pred.to_integer(),
                pred,
            );
            let (mv, cost) = me.hexagon_search(depth, &pic, &reference, orig, pred);
            assert!(cost <= initial);
            assert_eq!(mv.x % 4, 0);
            assert_eq!(mv.y % 4, 0);
            assert_eq!(
                cost,
                me.candidate_cost(width, &pic, &reference, orig, mv.to_integer(), pred)
            );
        }
    }

    #[test]
    fn out_of_frame_reference_is_edge_padded() {
        let ectx = EncoderContext::new();
        let samples = vec![10u8; 16 * 16];
        let pic = Picture::from_luma(16, 16, &samples, SliceType::SLICE_P, &ectx).unwrap();
        let reference = Picture::from_luma(16, 16, &samples, SliceType::SLICE_P, &ectx).unwrap();
        assert_eq!(calc_sad(&pic, &reference, 0, 0, -100, 40, 16), 0);
    }
}
