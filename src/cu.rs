use super::common::*;
use super::error::*;

#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub struct IntraCandidate {
    pub mode: IntraPredMode,
    pub cost: u32,
}

impl IntraCandidate {
    pub const UNSET: IntraCandidate = IntraCandidate {
        mode: IntraPredMode::DC,
        cost: COST_MAX,
    };
}

#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub struct InterCandidate {
    pub mv: MotionVector,
    pub mv_ref: u8,
    pub mv_dir: u8,
    pub cost: u32,
}

impl InterCandidate {
    pub const UNSET: InterCandidate = InterCandidate {
        mv: MotionVector::ZERO,
        mv_ref: 0,
        mv_dir: 0,
        cost: COST_MAX,
    };
}

#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub struct CodingUnit {
    pub depth: u8,
    pub part_size: PartSize,
    pub cu_type: CuType,
    pub intra: [IntraCandidate; 4],
    pub inter: InterCandidate,
    pub coded: bool,
}

impl CodingUnit {
    pub const UNSET: CodingUnit = CodingUnit {
        depth: 0,
        part_size: PartSize::SIZE_NONE,
        cu_type: CuType::CU_NOTSET,
        intra: [IntraCandidate::UNSET; 4],
        inter: InterCandidate::UNSET,
        coded: false,
    };

    #[inline(always)]
    pub fn best_intra_cost(&self) -> u32 {
        self.intra[0].cost
    }

    #[inline(always)]
    pub fn best_inter_cost(&self) -> u32 {
        self.inter.cost
    }

    pub fn is_evaluated(&self) -> bool {
        self.intra[0].cost != COST_MAX || self.inter.cost != COST_MAX
    }
}

/// Coding units of one picture, one grid per quadtree depth.
///
/// The grid of depth `d` has one cell per `lcu_width >> d` block. The deepest
/// grid doubles as the decision map: every committed block stamps its final
/// type, depth and prediction data into all the smallest cells it covers.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct CuArray {
    pub log2_lcu_width: usize,
    pub max_depth: usize,
    pub width_in_lcu: usize,
    pub height_in_lcu: usize,
    pub depths: Vec<Vec<CodingUnit>>,
}

impl CuArray {
    pub fn new(
        width_in_lcu: usize,
        height_in_lcu: usize,
        log2_lcu_width: usize,
        max_depth: usize,
    ) -> Result<CuArray, SearchError> {
        let mut depths = Vec::with_capacity(max_depth + 1);
        for depth in 0..=max_depth {
            let cells = (width_in_lcu << depth) * (height_in_lcu << depth);
            let mut grid: Vec<CodingUnit> = Vec::new();
            grid.try_reserve_exact(cells)
                .map_err(|_| SearchError::AllocationFailed {
                    bytes: cells * std::mem::size_of::<CodingUnit>(),
                })?;
            grid.resize(cells, CodingUnit::UNSET);
            depths.push(grid);
        }
        Ok(CuArray {
            log2_lcu_width,
            max_depth,
            width_in_lcu,
            height_in_lcu,
            depths,
        })
    }

    /// Marks every candidate as not evaluated and drops all decisions.
    pub fn reset(&mut self) {
        for grid in self.depths.iter_mut() {
            grid.fill(CodingUnit::UNSET);
        }
    }

    #[inline(always)]
    pub fn log2_cu_width(&self, depth: usize) -> usize {
        self.log2_lcu_width - depth
    }

    #[inline(always)]
    fn index(&self, x: usize, y: usize, depth: usize) -> usize {
        #[cfg(debug_assertions)]
        {
            assert!(depth <= self.max_depth, "depth {} is out of range", depth);
        }
        let log2_width = self.log2_cu_width(depth);
        let stride = self.width_in_lcu << depth;
        let (cx, cy) = (x >> log2_width, y >> log2_width);
        #[cfg(debug_assertions)]
        {
            assert!(
                cx < stride && cy < (self.height_in_lcu << depth),
                "({}, {}) is outside the cu array at depth {}",
                x,
                y,
                depth
            );
        }
        cy * stride + cx
    }

    /// Coding unit covering sample (x, y) at `depth`.
    #[inline(always)]
    pub fn get(&self, x: usize, y: usize, depth: usize) -> &CodingUnit {
        &self.depths[depth][self.index(x, y, depth)]
    }

    #[inline(always)]
    pub fn get_mut(&mut self, x: usize, y: usize, depth: usize) -> &mut CodingUnit {
        let index = self.index(x, y, depth);
        &mut self.depths[depth][index]
    }

    /// Final decision covering sample (x, y).
    #[inline(always)]
    pub fn decision(&self, x: usize, y: usize) -> &CodingUnit {
        self.get(x, y, self.max_depth)
    }

    fn for_each_covered_cell<F: FnMut(&mut CodingUnit)>(
        &mut self,
        x: usize,
        y: usize,
        depth: usize,
        mut f: F,
    ) {
        let max_depth = self.max_depth;
        let cells = 1 << (max_depth - depth);
        let stride = self.width_in_lcu << max_depth;
        let log2_min_width = self.log2_cu_width(max_depth);
        let (cx, cy) = (x >> log2_min_width, y >> log2_min_width);
        let grid = &mut self.depths[max_depth];
        for row in grid.chunks_mut(stride).skip(cy).take(cells) {
            for cu in row[cx..cx + cells].iter_mut() {
                f(cu);
            }
        }
    }

    /// Commits an intra decision for the block at (x, y, depth).
    pub fn set_intra_block(&mut self, x: usize, y: usize, depth: usize) {
        let decided = {
            let cu = self.get_mut(x, y, depth);
            cu.cu_type = CuType::CU_INTRA;
            cu.depth = depth as u8;
            cu.coded = true;
            *cu
        };
        self.for_each_covered_cell(x, y, depth, |cell| {
            cell.depth = depth as u8;
            cell.cu_type = CuType::CU_INTRA;
            cell.part_size = decided.part_size;
            cell.intra[0].mode = decided.intra[0].mode;
            if decided.part_size == PartSize::SIZE_NxN {
                for i in 1..4 {
                    cell.intra[i].mode = decided.intra[i].mode;
                }
            }
            cell.coded = true;
        });
    }

    /// Commits an inter decision for the block at (x, y, depth).
    pub fn set_inter_block(&mut self, x: usize, y: usize, depth: usize) {
        let decided = {
            let cu = self.get_mut(x, y, depth);
            cu.cu_type = CuType::CU_INTER;
            cu.part_size = PartSize::SIZE_2Nx2N;
            cu.depth = depth as u8;
            cu.coded = true;
            *cu
        };
        self.for_each_covered_cell(x, y, depth, |cell| {
            cell.depth = depth as u8;
            cell.cu_type = CuType::CU_INTER;
            cell.part_size = PartSize::SIZE_2Nx2N;
            cell.inter.mv = decided.inter.mv;
            cell.inter.mv_ref = decided.inter.mv_ref;
            cell.inter.mv_dir = decided.inter.mv_dir;
            cell.coded = true;
        });
    }
}
