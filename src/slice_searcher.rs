use super::block_splitter::*;
use super::common::*;
use super::cost::*;
use super::encoder_context::*;
use super::error::*;
use super::mode_decision::*;
use super::picture::*;
use super::reconstruction::*;
use super::reference_picture::*;
use debug_print::*;

/// What the search decided for one picture.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct SliceSummary {
    pub cost: u64,
    pub intra_blocks: usize,
    pub inter_blocks: usize,
    pub intra_samples: usize,
    pub inter_samples: usize,
}

impl SliceSummary {
    /// Counts the committed blocks of a fully decided picture.
    pub fn collect(pic: &Picture, cost: u64) -> SliceSummary {
        let mut summary = SliceSummary {
            cost,
            ..Default::default()
        };
        let cu_array = &pic.cu_array;
        let log2_min_width = cu_array.log2_cu_width(cu_array.max_depth);
        let min_width = 1 << log2_min_width;
        for y in (0..pic.height).step_by(min_width) {
            for x in (0..pic.width).step_by(min_width) {
                let cu = cu_array.decision(x, y);
                let log2_width = cu_array.log2_cu_width(cu.depth as usize);
                let is_origin = x & ((1 << log2_width) - 1) == 0 && y & ((1 << log2_width) - 1) == 0;
                let area = min_width * min_width;
                match cu.cu_type {
                    CuType::CU_INTRA => {
                        summary.intra_samples += area;
                        summary.intra_blocks += is_origin as usize;
                    }
                    CuType::CU_INTER => {
                        summary.inter_samples += area;
                        summary.inter_blocks += is_origin as usize;
                    }
                    CuType::CU_NOTSET => {}
                }
            }
        }
        summary
    }
}

/// Runs the partition search and mode decision over whole pictures, one
/// largest block at a time in raster order.
pub struct SliceSearcher<'a> {
    ectx: &'a EncoderContext,
    cost_model: CostModel,
    block_splitter: BlockSplitter<'a>,
}

impl<'a> SliceSearcher<'a> {
    pub fn new(
        ectx: &'a EncoderContext,
        lambda_table: &LambdaTable,
    ) -> Result<SliceSearcher<'a>, SearchError> {
        ectx.validate()?;
        let cost_model = lambda_table.cost_model(ectx.qp);
        let mode_decision =
            ModeDecision::new(ectx.log2_lcu_width(), cost_model, ectx.enable_intra_nxn);
        Ok(SliceSearcher {
            ectx,
            cost_model,
            block_splitter: BlockSplitter::new(ectx, mode_decision),
        })
    }

    /// Decides partitioning and prediction for every block of `pic`.
    ///
    /// Previous decisions of `pic` are discarded. Each largest block is
    /// handed to `reconstructor` right after it is decided.
    pub fn search_slice_data(
        &mut self,
        pic: &mut Picture,
        refs: &ReferencePictureList,
        reconstructor: &mut dyn LcuReconstructor,
    ) -> Result<SliceSummary, SearchError> {
        if pic.log2_lcu_width != self.ectx.log2_lcu_width()
            || pic.cu_array.max_depth != self.ectx.max_depth
        {
            return Err(SearchError::LayoutMismatch {
                lcu_width: pic.lcu_width(),
                max_depth: pic.cu_array.max_depth,
            });
        }
        refs.validate_for(pic)?;
        debug_eprintln!(
            "search poc {} ({:?}, {} refs)",
            pic.picture_order_count,
            pic.slice_type,
            refs.len()
        );

        pic.cu_array.reset();
        let lcu_width = pic.lcu_width();
        let mut total_cost = 0u64;
        for lcu_row in 0..pic.height_in_lcu {
            for lcu_col in 0..pic.width_in_lcu {
                let (x, y) = (lcu_col * lcu_width, lcu_row * lcu_width);
                self.block_splitter.search_tree(pic, refs, x, y, 0);
                let cost = search_best_mode(pic, &self.cost_model, x, y, 0);
                debug_eprintln!("lcu {} {} cost {}", lcu_row, lcu_col, cost);
                total_cost += cost as u64;
                reconstructor.reconstruct_lcu(pic, refs, x, y);
            }
        }

        let summary = SliceSummary::collect(pic, total_cost);
        debug_eprintln!(
            "poc {} done: {} intra, {} inter blocks",
            pic.picture_order_count,
            summary.intra_blocks,
            summary.inter_blocks
        );
        Ok(summary)
    }
}
