use super::common::*;
use super::intra_predictor::*;
use super::picture::*;
use super::reference_picture::*;

/// Produces the reconstructed samples of a decided largest block, which later
/// blocks read for intra borders and later pictures for motion search.
pub trait LcuReconstructor {
    fn reconstruct_lcu(
        &mut self,
        pic: &mut Picture,
        refs: &ReferencePictureList,
        lcu_x: usize,
        lcu_y: usize,
    );
}

/// Leaves the source samples in the working reconstruction.
pub struct KeepSource;

impl LcuReconstructor for KeepSource {
    fn reconstruct_lcu(
        &mut self,
        _pic: &mut Picture,
        _refs: &ReferencePictureList,
        _lcu_x: usize,
        _lcu_y: usize,
    ) {
    }
}

/// Replaces every decided block with its prediction: the chosen intra mode,
/// or the whole-sample motion compensated block of the chosen reference.
pub struct PredictionReconstructor {
    intra_predictor: IntraPredictor,
}

impl PredictionReconstructor {
    pub fn new(log2_lcu_width: usize) -> PredictionReconstructor {
        PredictionReconstructor {
            intra_predictor: IntraPredictor::new(log2_lcu_width),
        }
    }

    fn reconstruct_node(
        &mut self,
        pic: &mut Picture,
        refs: &ReferencePictureList,
        x: usize,
        y: usize,
        depth: usize,
    ) {
        if x >= pic.width || y >= pic.height {
            return;
        }
        let width = pic.lcu_width() >> depth;
        let cu = *pic.cu_array.decision(x, y);
        let inside = x + width <= pic.width && y + width <= pic.height;
        if inside && cu.depth as usize == depth && cu.cu_type != CuType::CU_NOTSET {
            match cu.cu_type {
                CuType::CU_INTRA if cu.part_size == PartSize::SIZE_NxN => {
                    let half = width / 2;
                    for (i, candidate) in cu.intra.iter().enumerate() {
                        let (sx, sy) = (x + (i & 1) * half, y + (i >> 1) * half);
                        self.intra_predictor
                            .reconstruct(pic, candidate.mode, sx, sy, half);
                    }
                }
                CuType::CU_INTRA => {
                    self.intra_predictor
                        .reconstruct(pic, cu.intra[0].mode, x, y, width);
                }
                _ => {
                    if let Some(reference) = refs.get(cu.inter.mv_ref as usize) {
                        let mv = cu.inter.mv.to_integer();
                        for dy in 0..width {
                            let row = &mut pic.reconst[y + dy][x..x + width];
                            for (dx, sample) in row.iter_mut().enumerate() {
                                *sample = reference.reconst.get_clamped(
                                    (x + dx) as isize + mv.x as isize,
                                    (y + dy) as isize + mv.y as isize,
                                );
                            }
                        }
                    }
                }
            }
            return;
        }
        if depth < pic.cu_array.max_depth {
            let half = width / 2;
            for (cx, cy) in [(x, y), (x + half, y), (x, y + half), (x + half, y + half)] {
                self.reconstruct_node(pic, refs, cx, cy, depth + 1);
            }
        }
    }
}

impl LcuReconstructor for PredictionReconstructor {
    fn reconstruct_lcu(
        &mut self,
        pic: &mut Picture,
        refs: &ReferencePictureList,
        lcu_x: usize,
        lcu_y: usize,
    ) {
        self.reconstruct_node(pic, refs, lcu_x, lcu_y, 0);
    }
}
