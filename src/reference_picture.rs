use super::error::*;
use super::picture::*;
use std::sync::Arc;

/// Fully decided pictures available for inter prediction, newest first.
pub struct ReferencePictureList {
    pub max_num_pics: usize,
    pics: Vec<Arc<Picture>>,
}

impl ReferencePictureList {
    pub fn new(max_num_pics: usize) -> ReferencePictureList {
        #[cfg(debug_assertions)]
        {
            assert!(max_num_pics > 0, "max_num_pics must be greater than 0.");
        }
        ReferencePictureList {
            max_num_pics,
            pics: Vec::with_capacity(max_num_pics),
        }
    }

    /// Adds `picture` as reference index 0, dropping the oldest one when full.
    pub fn push(&mut self, picture: Arc<Picture>) {
        if self.pics.len() == self.max_num_pics {
            self.pics.pop();
        }
        self.pics.insert(0, picture);
    }

    pub fn get(&self, ref_idx: usize) -> Option<&Picture> {
        self.pics.get(ref_idx).map(|pic| pic.as_ref())
    }

    pub fn len(&self) -> usize {
        self.pics.len()
    }

    pub fn is_empty(&self) -> bool {
        self.pics.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &Picture> {
        self.pics.iter().map(|pic| pic.as_ref())
    }

    /// Checks that every reference can be addressed with the coordinates of
    /// `picture`.
    pub fn validate_for(&self, picture: &Picture) -> Result<(), SearchError> {
        for reference in self.iter() {
            picture.same_geometry(reference)?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::common::*;
    use crate::encoder_context::*;

    fn picture(poc: usize, ectx: &EncoderContext) -> Arc<Picture> {
        let mut picture = Picture::new(16, 16, SliceType::SLICE_P, ectx).unwrap();
        picture.picture_order_count = poc;
        Arc::new(picture)
    }

    #[test]
    fn newest_picture_is_index_zero() {
        let ectx = EncoderContext::new();
        let mut refs = ReferencePictureList::new(2);
        assert!(refs.is_empty());
        refs.push(picture(0, &ectx));
        refs.push(picture(1, &ectx));
        assert_eq!(refs.get(0).unwrap().picture_order_count, 1);
        assert_eq!(refs.get(1).unwrap().picture_order_count, 0);
        refs.push(picture(2, &ectx));
        assert_eq!(refs.len(), 2);
        let pocs: Vec<usize> = refs.iter().map(|p| p.picture_order_count).collect();
        assert_eq!(pocs, vec![2, 1]);
        assert!(refs.get(2).is_none());
    }

    #[test]
    fn mismatched_reference_is_rejected() {
        let ectx = EncoderContext::new();
        let mut refs = ReferencePictureList::new(2);
        refs.push(Arc::new(
            Picture::new(32, 16, SliceType::SLICE_P, &ectx).unwrap(),
        ));
        let current = Picture::new(16, 16, SliceType::SLICE_P, &ectx).unwrap();
        assert!(refs.validate_for(&current).is_err());
    }
}
