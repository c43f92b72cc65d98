use super::common::*;
use super::cost::*;
use super::picture::*;
use lazy_static::lazy_static;

lazy_static! {
    /// invAngle for every angular mode, zero where the angle is not negative.
    pub static ref INTRA_INV_ANGLE_TABLE: [i32; 33] = {
        let mut inv_angle = [0; 33];
        for (inv, &angle) in inv_angle.iter_mut().zip(INTRA_ANGLE_TABLE.iter()) {
            if angle < 0 {
                *inv = -((8192.0 / -angle as f64).round() as i32);
            }
        }
        inv_angle
    };
}

/// Luma intra prediction with scratch buffers sized for the largest block.
///
/// `above[0]` and `left[0]` both hold the corner sample; `above[1 + i]` is the
/// sample above column `i` and `left[1 + j]` the sample left of row `j`.
pub struct IntraPredictor {
    pub above: Vec<i32>,
    pub left: Vec<i32>,
    ref_main: Vec<i32>,
    border_line: Vec<i32>,
    pub pred: Vec<u8>,
    log2_lcu_width: usize,
}

impl IntraPredictor {
    pub fn new(log2_lcu_width: usize) -> IntraPredictor {
        let lcu_width = 1 << log2_lcu_width;
        IntraPredictor {
            above: vec![0; 2 * lcu_width + 1],
            left: vec![0; 2 * lcu_width + 1],
            ref_main: vec![0; 3 * lcu_width + 1],
            border_line: vec![0; 4 * lcu_width + 1],
            pred: vec![0; lcu_width * lcu_width],
            log2_lcu_width,
        }
    }

    /// Collects the `2 * width + 1` samples above and left of the block at
    /// (x, y) from the working reconstruction of `pic`, substituting the ones
    /// that are outside the picture or not decided yet.
    pub fn build_reference_border(&mut self, pic: &Picture, x: usize, y: usize, width: usize) {
        #[cfg(debug_assertions)]
        {
            assert!(width <= 1 << self.log2_lcu_width, "block wider than an lcu");
        }
        let lcu_mask = !((1 << self.log2_lcu_width) - 1);
        let lcu_width = 1 << self.log2_lcu_width;
        let (lcu_x, lcu_y) = (x & lcu_mask, y & lcu_mask);
        let n = width;
        // bottom-left to corner to top-right
        let line = &mut self.border_line[..4 * n + 1];
        line.fill(-1);
        if x > 0 {
            let px = x - 1;
            for j in 0..2 * n {
                let py = y + j;
                let available =
                    py < pic.height && (j < n || (px < lcu_x && py < lcu_y + lcu_width));
                if available {
                    line[2 * n - 1 - j] = pic.reconst[py][px] as i32;
                }
            }
        }
        if x > 0 && y > 0 {
            line[2 * n] = pic.reconst[y - 1][x - 1] as i32;
        }
        if y > 0 {
            let py = y - 1;
            let row = &pic.reconst[py];
            for i in 0..2 * n {
                let px = x + i;
                let available = px < pic.width && (i < n || py < lcu_y || px < lcu_x + lcu_width);
                if available {
                    line[2 * n + 1 + i] = row[px] as i32;
                }
            }
        }

        if line.iter().all(|s| s < &0) {
            line.fill(PIXEL_MID as i32);
        } else {
            if line[0] < 0 {
                if let Some(&first) = line.iter().find(|s| **s >= 0) {
                    line[0] = first;
                }
            }
            for k in 1..line.len() {
                if line[k] < 0 {
                    line[k] = line[k - 1];
                }
            }
        }

        self.left[0] = line[2 * n];
        self.above[0] = line[2 * n];
        for j in 0..2 * n {
            self.left[1 + j] = line[2 * n - 1 - j];
        }
        self.above[1..=2 * n].copy_from_slice(&line[2 * n + 1..]);
    }

    /// Predicts a `width` x `width` block into `self.pred` from the current
    /// border.
    pub fn predict(&mut self, mode: IntraPredMode, width: usize) {
        match mode {
            IntraPredMode::PLANAR => self.predict_planar(width),
            IntraPredMode::DC => self.predict_dc(width),
            mode => self.predict_angular(mode as usize, width),
        }
    }

    fn predict_planar(&mut self, width: usize) {
        let n = width as i32;
        let shift = width.ilog2() + 1;
        let top_right = self.above[1 + width];
        let bottom_left = self.left[1 + width];
        for y in 0..width {
            let pred = &mut self.pred[y * width..(y + 1) * width];
            for x in 0..width {
                let (xi, yi) = (x as i32, y as i32);
                let v = (n - 1 - xi) * self.left[1 + y]
                    + (xi + 1) * top_right
                    + (n - 1 - yi) * self.above[1 + x]
                    + (yi + 1) * bottom_left
                    + n;
                pred[x] = (v >> shift) as u8;
            }
        }
    }

    fn predict_dc(&mut self, width: usize) {
        let sum: i32 = self.above[1..=width].iter().sum::<i32>()
            + self.left[1..=width].iter().sum::<i32>();
        let dc = ((sum + width as i32) >> (width.ilog2() + 1)) as u8;
        self.pred[..width * width].fill(dc);
    }

    fn predict_angular(&mut self, mode: usize, width: usize) {
        let n = width as i32;
        let angle = INTRA_ANGLE_TABLE[mode - 2];
        let inv_angle = INTRA_INV_ANGLE_TABLE[mode - 2];
        let is_vertical = mode >= 18;
        let (main, side) = if is_vertical {
            (&self.above, &self.left)
        } else {
            (&self.left, &self.above)
        };
        // ref_main[k + n] holds reference sample k for k in -n..=2n
        let offset = width as i32;
        let ref_main = &mut self.ref_main;
        for k in 0..=2 * n {
            ref_main[(k + offset) as usize] = main[k as usize];
        }
        let last = (n * angle) >> 5;
        if angle < 0 && last < -1 {
            for k in last..=-1 {
                ref_main[(k + offset) as usize] = side[((k * inv_angle + 128) >> 8) as usize];
            }
        }

        let pred = &mut self.pred[..width * width];
        for k in 0..width {
            let pos = (k as i32 + 1) * angle;
            let idx = pos >> 5;
            let fact = pos & 31;
            for l in 0..width {
                let base = (l as i32 + idx + 1 + offset) as usize;
                let v = if fact != 0 {
                    ((32 - fact) * ref_main[base] + fact * ref_main[base + 1] + 16) >> 5
                } else {
                    ref_main[base]
                };
                if is_vertical {
                    pred[k * width + l] = v as u8;
                } else {
                    pred[l * width + k] = v as u8;
                }
            }
        }
    }

    /// SAD between the source block at (x, y) and `self.pred`.
    pub fn prediction_sad(&self, pic: &Picture, x: usize, y: usize, width: usize) -> u32 {
        let mut sad = 0;
        for dy in 0..width {
            let orig = &pic.luma[y + dy][x..x + width];
            let pred = &self.pred[dy * width..(dy + 1) * width];
            sad += orig
                .iter()
                .zip(pred.iter())
                .map(|(&a, &b)| (a as i32 - b as i32).unsigned_abs())
                .sum::<u32>();
        }
        sad
    }

    /// Chooses the intra mode with the lowest SAD plus mode signalling cost
    /// for the block at (x, y). Ties keep the lower mode index.
    pub fn evaluate(
        &mut self,
        pic: &Picture,
        x: usize,
        y: usize,
        width: usize,
        cost_model: &CostModel,
    ) -> (IntraPredMode, u32) {
        self.build_reference_border(pic, x, y, width);
        let mut best_mode = IntraPredMode::PLANAR;
        let mut best_cost = COST_MAX;
        for index in 0..IntraPredMode::NUM_MODES {
            let mode = match IntraPredMode::from_index(index) {
                Some(mode) => mode,
                None => continue,
            };
            self.predict(mode, width);
            let cost = self.prediction_sad(pic, x, y, width) + cost_model.intra_mode_cost(mode);
            if cost < best_cost {
                best_cost = cost;
                best_mode = mode;
            }
        }
        (best_mode, best_cost)
    }

    /// Writes the prediction of `mode` for the block at (x, y) into the
    /// working reconstruction of `pic`.
    pub fn reconstruct(
        &mut self,
        pic: &mut Picture,
        mode: IntraPredMode,
        x: usize,
        y: usize,
        width: usize,
    ) {
        self.build_reference_border(pic, x, y, width);
        self.predict(mode, width);
        for dy in 0..width {
            pic.reconst[y + dy][x..x + width]
                .copy_from_slice(&self.pred[dy * width..(dy + 1) * width]);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::encoder_context::*;
    use rand::{prelude::StdRng, Rng, SeedableRng};

    fn picture_from_fn<F: Fn(usize, usize) -> u8>(size: usize, f: F) -> Picture {
        let ectx = EncoderContext::new();
        let samples: Vec<u8> = (0..size * size).map(|i| f(i % size, i / size)).collect();
        Picture::from_luma(size, size, &samples, SliceType::SLICE_I, &ectx).unwrap()
    }

    #[test]
    fn inverse_angles_match_hevc() {
        assert_eq!(INTRA_INV_ANGLE_TABLE[11 - 2], -4096);
        assert_eq!(INTRA_INV_ANGLE_TABLE[18 - 2], -256);
        assert_eq!(INTRA_INV_ANGLE_TABLE[13 - 2], -910);
        assert_eq!(INTRA_INV_ANGLE_TABLE[25 - 2], -4096);
        assert_eq!(INTRA_INV_ANGLE_TABLE[26 - 2], 0);
    }

    #[test]
    fn first_block_uses_mid_grey_border() {
        let pic = picture_from_fn(64, |_, _| 10);
        let mut predictor = IntraPredictor::new(6);
        predictor.build_reference_border(&pic, 0, 0, 8);
        assert!(predictor.above[..17].iter().all(|&s| s == 128));
        assert!(predictor.left[..17].iter().all(|&s| s == 128));
    }

    #[test]
    fn missing_samples_are_substituted() {
        let pic = picture_from_fn(64, |x, y| (x + 2 * y) as u8);
        let mut predictor = IntraPredictor::new(6);
        // top row of the picture: only the left column exists
        predictor.build_reference_border(&pic, 8, 0, 8);
        assert_eq!(predictor.left[1], 7);
        assert_eq!(predictor.left[8], 7 + 14);
        // corner and above row repeat the topmost left sample
        assert_eq!(predictor.left[0], 7);
        assert!(predictor.above[..17].iter().all(|&s| s == 7));
        // below-left inside the current lcu is not decided yet
        assert!(predictor.left[9..17].iter().all(|&s| s == 21));
    }

    #[test]
    fn above_right_of_previous_lcu_row_is_available() {
        let pic = picture_from_fn(128, |x, _| (x % 200) as u8);
        let mut predictor = IntraPredictor::new(6);
        predictor.build_reference_border(&pic, 56, 64, 8);
        assert_eq!(predictor.above[1 + 15], 71);
        predictor.build_reference_border(&pic, 56, 72, 8);
        // above-right crosses into the next lcu on the same row
        assert_eq!(predictor.above[1 + 15], 63);
    }

    #[test]
    fn dc_and_planar_of_flat_border_are_flat() {
        let pic = picture_from_fn(64, |_, _| 90);
        let mut predictor = IntraPredictor::new(6);
        predictor.build_reference_border(&pic, 16, 16, 16);
        predictor.predict(IntraPredMode::DC, 16);
        assert!(predictor.pred[..256].iter().all(|&s| s == 90));
        predictor.predict(IntraPredMode::PLANAR, 16);
        assert!(predictor.pred[..256].iter().all(|&s| s == 90));
    }

    #[test]
    fn pure_directions_copy_the_border() {
        let pic = picture_from_fn(64, |x, y| (3 * x + 5 * y) as u8);
        let mut predictor = IntraPredictor::new(6);
        predictor.build_reference_border(&pic, 8, 8, 8);
        predictor.predict(IntraPredMode::ANGULAR26, 8);
        for y in 0..8 {
            for x in 0..8 {
                assert_eq!(predictor.pred[y * 8 + x] as i32, predictor.above[1 + x]);
            }
        }
        predictor.predict(IntraPredMode::ANGULAR10, 8);
        for y in 0..8 {
            for x in 0..8 {
                assert_eq!(predictor.pred[y * 8 + x] as i32, predictor.left[1 + y]);
            }
        }
        // 45 degrees down-left uses the sample diagonally above-right
        predictor.predict(IntraPredMode::ANGULAR34, 8);
        assert_eq!(predictor.pred[0] as i32, predictor.above[2]);
        assert_eq!(predictor.pred[7 * 8 + 7] as i32, predictor.above[16]);
        // 45 degrees down-right uses the corner on the diagonal
        predictor.predict(IntraPredMode::ANGULAR18, 8);
        for i in 0..8 {
            assert_eq!(predictor.pred[i * 8 + i] as i32, predictor.above[0]);
        }
    }

    #[test]
    fn all_modes_stay_in_range() {
        let mut rng: StdRng = SeedableRng::seed_from_u64(5);
        let samples: Vec<u8> = (0..64 * 64).map(|_| rng.gen()).collect();
        let ectx = EncoderContext::new();
        let pic = Picture::from_luma(64, 64, &samples, SliceType::SLICE_I, &ectx).unwrap();
        let mut predictor = IntraPredictor::new(6);
        for width in [4, 8, 16, 32] {
            predictor.build_reference_border(&pic, 32, 32, width);
            let lo = *predictor.above[..2 * width + 1]
                .iter()
                .chain(predictor.left[..2 * width + 1].iter())
                .min()
                .unwrap();
            let hi = *predictor.above[..2 * width + 1]
                .iter()
                .chain(predictor.left[..2 * width + 1].iter())
                .max()
                .unwrap();
            for index in 0..IntraPredMode::NUM_MODES {
                predictor.predict(IntraPredMode::from_index(index).unwrap(), width);
                assert!(predictor.pred[..width * width]
                    .iter()
                    .all(|&s| (s as i32) >= lo && (s as i32) <= hi));
            }
        }
    }

    #[test]
    fn vertical_stripes_pick_vertical_mode() {
        let mut rng: StdRng = SeedableRng::seed_from_u64(6);
        let columns: Vec<u8> = (0..64).map(|_| rng.gen()).collect();
        let pic = picture_from_fn(64, |x, _| columns[x]);
        let mut predictor = IntraPredictor::new(6);
        let cost_model = LambdaTable::new().cost_model(22);
        let (mode, cost) = predictor.evaluate(&pic, 8, 8, 8, &cost_model);
        assert_eq!(mode, IntraPredMode::ANGULAR26);
        assert_eq!(cost, cost_model.intra_mode_cost(IntraPredMode::ANGULAR26));
    }

    #[test]
    fn reconstruct_writes_prediction() {
        let mut pic = picture_from_fn(64, |x, _| (x * 4) as u8);
        let mut predictor = IntraPredictor::new(6);
        pic.reconst.fill(0);
        for x in 0..64 {
            pic.reconst[15][x] = x as u8;
        }
        predictor.reconstruct(&mut pic, IntraPredMode::ANGULAR26, 8, 16, 8);
        for y in 16..24 {
            for x in 8..16 {
                assert_eq!(pic.reconst[y][x], x as u8);
            }
        }
    }
}
