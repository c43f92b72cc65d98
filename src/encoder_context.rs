use super::error::*;
use std::collections::HashMap;
use std::ops::RangeInclusive;

pub const MAX_QP: usize = 51;
pub const MAX_REF_PIC_COUNT: usize = 16;
pub const DEFAULT_REF_PIC_COUNT: usize = 3;

/// Search parameters shared by every picture of a sequence.
#[derive(Clone, Debug)]
pub struct EncoderContext {
    pub qp: usize,
    pub lcu_width: usize,
    pub max_depth: usize,
    pub inter_search_depths: RangeInclusive<usize>,
    pub intra_search_depths: RangeInclusive<usize>,
    pub enable_intra_nxn: bool,
    pub max_ref_pics: usize,
    pub extra_params: HashMap<String, String>,
}

impl Default for EncoderContext {
    fn default() -> Self {
        Self::new()
    }
}

impl EncoderContext {
    pub fn new() -> EncoderContext {
        EncoderContext {
            qp: 22,
            lcu_width: 64,
            max_depth: 3,
            inter_search_depths: 0..=3,
            intra_search_depths: 1..=3,
            enable_intra_nxn: false,
            max_ref_pics: DEFAULT_REF_PIC_COUNT,
            extra_params: hashmap![],
        }
    }

    #[inline(always)]
    pub fn log2_lcu_width(&self) -> usize {
        self.lcu_width.ilog2() as usize
    }

    #[inline(always)]
    pub fn cu_width(&self, depth: usize) -> usize {
        self.lcu_width >> depth
    }

    #[inline(always)]
    pub fn min_cu_width(&self) -> usize {
        self.lcu_width >> self.max_depth
    }

    /// Moves the search depth limits so that they keep fitting a new max depth.
    pub fn set_max_depth(&mut self, max_depth: usize) {
        self.max_depth = max_depth;
        let inter_start = *self.inter_search_depths.start();
        let intra_start = *self.intra_search_depths.start();
        self.inter_search_depths = inter_start.min(max_depth)..=max_depth;
        self.intra_search_depths = intra_start.min(max_depth)..=max_depth;
    }

    /// Applies the recognized `extra_params` overrides.
    pub fn apply_extra_params(&mut self) -> Result<(), SearchError> {
        let mut params: Vec<(&String, &String)> = self.extra_params.iter().collect();
        params.sort();
        let invalid = |key: &String, value: &String| SearchError::InvalidExtraParam {
            key: key.clone(),
            value: value.clone(),
        };
        let mut inter = (
            *self.inter_search_depths.start(),
            *self.inter_search_depths.end(),
        );
        let mut intra = (
            *self.intra_search_depths.start(),
            *self.intra_search_depths.end(),
        );
        let mut enable_intra_nxn = self.enable_intra_nxn;
        for (key, value) in params {
            match key.as_str() {
                "nxn" => {
                    enable_intra_nxn = match value.as_str() {
                        "1" | "true" => true,
                        "0" | "false" => false,
                        _ => return Err(invalid(key, value)),
                    }
                }
                "min_inter_depth" | "max_inter_depth" | "min_intra_depth" | "max_intra_depth" => {
                    let depth = value.parse::<usize>().map_err(|_| invalid(key, value))?;
                    match key.as_str() {
                        "min_inter_depth" => inter.0 = depth,
                        "max_inter_depth" => inter.1 = depth,
                        "min_intra_depth" => intra.0 = depth,
                        _ => intra.1 = depth,
                    }
                }
                _ => return Err(invalid(key, value)),
            }
        }
        self.inter_search_depths = inter.0..=inter.1;
        self.intra_search_depths = intra.0..=intra.1;
        self.enable_intra_nxn = enable_intra_nxn;
        Ok(())
    }

    pub fn validate(&self) -> Result<(), SearchError> {
        if self.qp > MAX_QP {
            return Err(SearchError::InvalidQp(self.qp));
        }
        if !self.lcu_width.is_power_of_two() || !(16..=64).contains(&self.lcu_width) {
            return Err(SearchError::InvalidLcuWidth(self.lcu_width));
        }
        if self.max_depth >= self.log2_lcu_width() || self.min_cu_width() < 4 {
            return Err(SearchError::InvalidMaxDepth {
                lcu_width: self.lcu_width,
                max_depth: self.max_depth,
            });
        }
        let check_range = |name: &'static str, range: &RangeInclusive<usize>| {
            let (start, end) = (*range.start(), *range.end());
            if start > end || end > self.max_depth {
                Err(SearchError::InvalidDepthRange {
                    name,
                    start,
                    end,
                    max_depth: self.max_depth,
                })
            } else {
                Ok(())
            }
        };
        check_range("inter", &self.inter_search_depths)?;
        check_range("intra", &self.intra_search_depths)?;
        // leaves of the quadtree must always have at least one evaluated mode
        if *self.intra_search_depths.end() != self.max_depth {
            return Err(SearchError::InvalidDepthRange {
                name: "intra",
                start: *self.intra_search_depths.start(),
                end: *self.intra_search_depths.end(),
                max_depth: self.max_depth,
            });
        }
        if self.max_ref_pics == 0 || self.max_ref_pics > MAX_REF_PIC_COUNT {
            return Err(SearchError::InvalidRefPicCount(self.max_ref_pics));
        }
        Ok(())
    }
}
