use super::common::*;
use super::cu::*;
use super::encoder_context::*;
use super::error::*;

pub struct Picture {
    pub picture_order_count: usize,
    pub slice_type: SliceType,
    /// Coded size, padded up to a multiple of the smallest coding unit.
    pub width: usize,
    pub height: usize,
    /// Size of the source samples before padding.
    pub source_width: usize,
    pub source_height: usize,
    pub log2_lcu_width: usize,
    pub width_in_lcu: usize,
    pub height_in_lcu: usize,
    pub luma: Vec2d<u8>,
    /// Working reconstruction. Starts as a copy of `luma` and is overwritten
    /// block by block once decisions are reconstructed.
    pub reconst: Vec2d<u8>,
    pub cu_array: CuArray,
}

fn alloc_plane(height: usize, width: usize) -> Result<Vec2d<u8>, SearchError> {
    Vec2d::try_new(PIXEL_MID, height, width)
        .map_err(|_| SearchError::AllocationFailed { bytes: height * width })
}

impl Picture {
    pub fn new(
        width: usize,
        height: usize,
        slice_type: SliceType,
        ectx: &EncoderContext,
    ) -> Result<Picture, SearchError> {
        ectx.validate()?;
        if width == 0 || height == 0 || width > 8192 || height > 8192 {
            return Err(SearchError::InvalidDimensions { width, height });
        }
        let min_cu_width = ectx.min_cu_width();
        let padded_width = (width + min_cu_width - 1) / min_cu_width * min_cu_width;
        let padded_height = (height + min_cu_width - 1) / min_cu_width * min_cu_width;
        let width_in_lcu = (padded_width + ectx.lcu_width - 1) / ectx.lcu_width;
        let height_in_lcu = (padded_height + ectx.lcu_width - 1) / ectx.lcu_width;
        let cu_array = CuArray::new(
            width_in_lcu,
            height_in_lcu,
            ectx.log2_lcu_width(),
            ectx.max_depth,
        )?;
        Ok(Picture {
            picture_order_count: 0,
            slice_type,
            width: padded_width,
            height: padded_height,
            source_width: width,
            source_height: height,
            log2_lcu_width: ectx.log2_lcu_width(),
            width_in_lcu,
            height_in_lcu,
            luma: alloc_plane(padded_height, padded_width)?,
            reconst: alloc_plane(padded_height, padded_width)?,
            cu_array,
        })
    }

    /// Builds a picture from a tightly packed luma plane. Samples beyond the
    /// source size repeat the last source column and row.
    pub fn from_luma(
        width: usize,
        height: usize,
        samples: &[u8],
        slice_type: SliceType,
        ectx: &EncoderContext,
    ) -> Result<Picture, SearchError> {
        if samples.len() != width * height {
            return Err(SearchError::InvalidDimensions { width, height });
        }
        let mut picture = Picture::new(width, height, slice_type, ectx)?;
        for y in 0..picture.height {
            let src = &samples[y.min(height - 1) * width..][..width];
            let row = &mut picture.luma[y];
            row[..width].copy_from_slice(src);
            let last = src[width - 1];
            row[width..].fill(last);
        }
        picture.reconst.data.copy_from_slice(&picture.luma.data);
        Ok(picture)
    }

    #[inline(always)]
    pub fn lcu_width(&self) -> usize {
        1 << self.log2_lcu_width
    }

    pub fn same_geometry(&self, other: &Picture) -> Result<(), SearchError> {
        if self.width != other.width
            || self.height != other.height
            || self.log2_lcu_width != other.log2_lcu_width
            || self.cu_array.max_depth != other.cu_array.max_depth
        {
            Err(SearchError::GeometryMismatch {
                expected_w: self.width,
                expected_h: self.height,
                got_w: other.width,
                got_h: other.height,
            })
        } else {
            Ok(())
        }
    }

    /// Reconstructed samples of the source area, row by row.
    pub fn get_reconst_pixels(&self) -> Vec<u8> {
        let mut pixels = vec![0; self.source_width * self.source_height];
        for (y, row) in pixels.chunks_mut(self.source_width).enumerate() {
            row.copy_from_slice(&self.reconst[y][..self.source_width]);
        }
        pixels
    }
}
