use super::common::*;
use super::cost::*;
use super::cu::*;
use super::intra_predictor::*;
use super::motion_estimator::*;
use super::picture::*;
use super::reference_picture::*;

/// Per-block prediction searches. Results are written into the coding unit
/// of the searched block only.
pub struct ModeDecision {
    pub cost_model: CostModel,
    motion_estimator: MotionEstimator,
    intra_predictor: IntraPredictor,
    enable_intra_nxn: bool,
}

impl ModeDecision {
    pub fn new(log2_lcu_width: usize, cost_model: CostModel, enable_intra_nxn: bool) -> ModeDecision {
        ModeDecision {
            cost_model,
            motion_estimator: MotionEstimator::new(log2_lcu_width),
            intra_predictor: IntraPredictor::new(log2_lcu_width),
            enable_intra_nxn,
        }
    }

    /// Best (reference, vector) pair over every reference picture.
    pub fn search_inter(
        &mut self,
        pic: &mut Picture,
        refs: &ReferencePictureList,
        x: usize,
        y: usize,
        depth: usize,
    ) {
        let mut best = InterCandidate::UNSET;
        for (ref_idx, reference) in refs.iter().enumerate() {
            let colocated = reference.cu_array.decision(x, y);
            let mv_pred = if colocated.cu_type == CuType::CU_INTER {
                colocated.inter.mv
            } else {
                MotionVector::ZERO
            };
            let (mv, cost) =
                self.motion_estimator
                    .hexagon_search(depth, pic, reference, (x, y), mv_pred);
            let cost = cost.saturating_add(self.cost_model.ref_idx_cost(ref_idx));
            if cost < best.cost {
                best = InterCandidate {
                    mv,
                    mv_ref: ref_idx as u8,
                    mv_dir: 1,
                    cost,
                };
            }
        }
        pic.cu_array.get_mut(x, y, depth).inter = best;
    }

    /// Best intra mode of the block. With NxN enabled, blocks at the deepest
    /// level also try four quarter blocks with their own modes; `intra[0].cost`
    /// always holds the cost of the whole block.
    pub fn search_intra(&mut self, pic: &mut Picture, x: usize, y: usize, depth: usize) {
        let width = pic.lcu_width() >> depth;
        let (mode, cost) = self
            .intra_predictor
            .evaluate(pic, x, y, width, &self.cost_model);
        let mut intra = [IntraCandidate::UNSET; 4];
        intra[0] = IntraCandidate { mode, cost };
        let mut part_size = PartSize::SIZE_2Nx2N;

        if self.enable_intra_nxn && depth == pic.cu_array.max_depth && width >= 8 {
            let half = width / 2;
            let mut nxn = [IntraCandidate::UNSET; 4];
            let mut nxn_cost = self.cost_model.split_cost();
            for (i, candidate) in nxn.iter_mut().enumerate() {
                let (sx, sy) = (x + (i & 1) * half, y + (i >> 1) * half);
                let (mode, cost) = self
                    .intra_predictor
                    .evaluate(pic, sx, sy, half, &self.cost_model);
                *candidate = IntraCandidate { mode, cost };
                nxn_cost = nxn_cost.saturating_add(cost);
            }
            if nxn_cost < cost {
                nxn[0].cost = nxn_cost;
                intra = nxn;
                part_size = PartSize::SIZE_NxN;
            }
        }

        let cu = pic.cu_array.get_mut(x, y, depth);
        cu.intra = intra;
        cu.part_size = part_size;
    }
}

/// Resolves the quadtree below (x, y, depth) bottom-up and returns the cost of
/// the winning configuration.
///
/// A node keeps its own best mode unless its four children plus the split
/// overhead are strictly cheaper than both of its own costs. Kept nodes are
/// committed into the cu array; split nodes are left untouched. Nodes outside
/// the picture cost nothing and nodes crossing its edge are always split,
/// paying the split overhead like any other split.
pub fn search_best_mode(
    pic: &mut Picture,
    cost_model: &CostModel,
    x: usize,
    y: usize,
    depth: usize,
) -> u32 {
    let max_depth = pic.cu_array.max_depth;
    let width = pic.lcu_width() >> depth;
    if x >= pic.width || y >= pic.height {
        return 0;
    }
    let half = width / 2;
    let children = [(x, y), (x + half, y), (x, y + half), (x + half, y + half)];

    if x + width > pic.width || y + width > pic.height {
        #[cfg(debug_assertions)]
        {
            assert!(depth < max_depth, "picture is not padded to the smallest block");
        }
        return children
            .iter()
            .fold(cost_model.split_cost(), |sum, &(cx, cy)| {
                sum.saturating_add(search_best_mode(pic, cost_model, cx, cy, depth + 1))
            });
    }

    let cu = *pic.cu_array.get(x, y, depth);
    let intra_cost = cu.best_intra_cost();
    let inter_cost = cu.best_inter_cost();

    if depth < max_depth {
        let split_cost = children
            .iter()
            .fold(cost_model.split_cost(), |sum, &(cx, cy)| {
                sum.saturating_add(search_best_mode(pic, cost_model, cx, cy, depth + 1))
            });
        if split_cost < intra_cost && split_cost < inter_cost {
            return split_cost;
        }
    }

    #[cfg(debug_assertions)]
    {
        assert!(
            cu.is_evaluated(),
            "no mode was evaluated for ({}, {}) at depth {}",
            x,
            y,
            depth
        );
    }
    if !cu.is_evaluated() {
        return COST_MAX;
    }
    if inter_cost <= intra_cost {
        pic.cu_array.set_inter_block(x, y, depth);
        inter_cost
    } else {
        pic.cu_array.set_intra_block(x, y, depth);
        intra_cost
    }
}
