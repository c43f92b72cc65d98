use super::encoder_context::*;
use super::mode_decision::*;
use super::picture::*;
use super::reference_picture::*;

/// Exhaustive quadtree search over one largest block.
pub struct BlockSplitter<'a> {
    ectx: &'a EncoderContext,
    pub mode_decision: ModeDecision,
}

impl<'a> BlockSplitter<'a> {
    pub fn new(ectx: &'a EncoderContext, mode_decision: ModeDecision) -> BlockSplitter<'a> {
        BlockSplitter {
            ectx,
            mode_decision,
        }
    }

    /// Evaluates every node of the quadtree rooted at (x, y, depth) that lies
    /// inside the picture. Nodes crossing the picture edge are never evaluated
    /// and always split.
    pub fn search_tree(
        &mut self,
        pic: &mut Picture,
        refs: &ReferencePictureList,
        x: usize,
        y: usize,
        depth: usize,
    ) {
        let width = self.ectx.cu_width(depth);
        if x >= pic.width || y >= pic.height {
            return;
        }
        let half = width / 2;
        let partial = x + width > pic.width || y + width > pic.height;

        if !partial {
            if pic.slice_type.allows_inter()
                && !refs.is_empty()
                && self.ectx.inter_search_depths.contains(&depth)
            {
                self.mode_decision.search_inter(pic, refs, x, y, depth);
            }
            if self.ectx.intra_search_depths.contains(&depth) {
                self.mode_decision.search_intra(pic, x, y, depth);
            }
        }

        #[cfg(debug_assertions)]
        {
            assert!(
                !partial || depth < self.ectx.max_depth,
                "picture is not padded to the smallest block"
            );
        }
        if depth < self.ectx.max_depth {
            for (cx, cy) in [(x, y), (x + half, y), (x, y + half), (x + half, y + half)] {
                self.search_tree(pic, refs, cx, cy, depth + 1);
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::common::*;
    use crate::cost::*;
    use std::sync::Arc;

    fn splitter(ectx: &EncoderContext) -> BlockSplitter {
        let cost_model = LambdaTable::new().cost_model(ectx.qp);
        BlockSplitter::new(
            ectx,
            ModeDecision::new(ectx.log2_lcu_width(), cost_model, ectx.enable_intra_nxn),
        )
    }

    #[test]
    fn edge_block_is_never_evaluated() {
        let ectx = EncoderContext::new();
        let samples = vec![100u8; 66 * 66];
        let mut pic = Picture::from_luma(66, 66, &samples, SliceType::SLICE_I, &ectx).unwrap();
        let refs = ReferencePictureList::new(1);
        let mut block_splitter = splitter(&ectx);
        block_splitter.search_tree(&mut pic, &refs, 64, 0, 0);
        for depth in 0..3 {
            assert!(!pic.cu_array.get(64, 0, depth).is_evaluated());
        }
        for y in (0..64).step_by(8) {
            assert!(pic.cu_array.get(64, y, 3).is_evaluated());
        }
    }

    #[test]
    fn search_depth_ranges_are_honored() {
        let mut ectx = EncoderContext::new();
        ectx.inter_search_depths = 1..=2;
        ectx.intra_search_depths = 2..=3;
        let samples = vec![60u8; 64 * 64];
        let mut pic = Picture::from_luma(64, 64, &samples, SliceType::SLICE_P, &ectx).unwrap();
        let mut refs = ReferencePictureList::new(1);
        refs.push(Arc::new(
            Picture::from_luma(64, 64, &samples, SliceType::SLICE_P, &ectx).unwrap(),
        ));
        let mut block_splitter = splitter(&ectx);
        block_splitter.search_tree(&mut pic, &refs, 0, 0, 0);
        let cu = |depth| *pic.cu_array.get(0, 0, depth);
        assert!(!cu(0).is_evaluated());
        assert_eq!((cu(1).best_intra_cost(), cu(1).best_inter_cost() == 0), (COST_MAX, true));
        assert!(cu(2).best_intra_cost() != COST_MAX && cu(2).best_inter_cost() == 0);
        assert_eq!(cu(3).best_inter_cost(), COST_MAX);
        assert_ne!(cu(3).best_intra_cost(), COST_MAX);
    }

    #[test]
    fn intra_slice_skips_inter_search() {
        let ectx = EncoderContext::new();
        let samples = vec![60u8; 64 * 64];
        let mut pic = Picture::from_luma(64, 64, &samples, SliceType::SLICE_I, &ectx).unwrap();
        let mut refs = ReferencePictureList::new(1);
        refs.push(Arc::new(
            Picture::from_luma(64, 64, &samples, SliceType::SLICE_P, &ectx).unwrap(),
        ));
        let mut block_splitter = splitter(&ectx);
        block_splitter.search_tree(&mut pic, &refs, 0, 0, 0);
        assert!(pic
            .cu_array
            .depths
            .iter()
            .all(|grid| grid.iter().all(|cu| cu.inter.cost == COST_MAX)));
    }
}
