use std::fmt;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SearchError {
    InvalidQp(usize),
    InvalidLcuWidth(usize),
    InvalidMaxDepth { lcu_width: usize, max_depth: usize },
    InvalidDepthRange { name: &'static str, start: usize, end: usize, max_depth: usize },
    InvalidRefPicCount(usize),
    InvalidExtraParam { key: String, value: String },
    InvalidDimensions { width: usize, height: usize },
    GeometryMismatch { expected_w: usize, expected_h: usize, got_w: usize, got_h: usize },
    LayoutMismatch { lcu_width: usize, max_depth: usize },
    AllocationFailed { bytes: usize },
}

impl fmt::Display for SearchError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SearchError::InvalidQp(qp) => write!(f, "invalid qp {}: must be 0..=51", qp),
            SearchError::InvalidLcuWidth(width) => write!(
                f,
                "invalid lcu width {}: must be a power of two in 16..=64",
                width
            ),
            SearchError::InvalidMaxDepth {
                lcu_width,
                max_depth,
            } => write!(
                f,
                "invalid max depth {}: smallest block of a {}-sample lcu would be narrower than 4",
                max_depth, lcu_width
            ),
            SearchError::InvalidDepthRange {
                name,
                start,
                end,
                max_depth,
            } => write!(
                f,
                "invalid {} search depths {}..={} (max depth {})",
                name, start, end, max_depth
            ),
            SearchError::InvalidRefPicCount(n) => {
                write!(f, "invalid reference picture count {}: must be 1..=16", n)
            }
            SearchError::InvalidExtraParam { key, value } => {
                write!(f, "invalid extra param {}={}", key, value)
            }
            SearchError::InvalidDimensions { width, height } => {
                write!(f, "invalid dimensions {}x{}", width, height)
            }
            SearchError::GeometryMismatch {
                expected_w,
                expected_h,
                got_w,
                got_h,
            } => write!(
                f,
                "picture geometry mismatch: expected {}x{}, got {}x{}",
                expected_w, expected_h, got_w, got_h
            ),
            SearchError::LayoutMismatch {
                lcu_width,
                max_depth,
            } => write!(
                f,
                "picture was laid out for {}-sample lcus with max depth {}",
                lcu_width, max_depth
            ),
            SearchError::AllocationFailed { bytes } => {
                write!(f, "failed to allocate {} bytes for picture data", bytes)
            }
        }
    }
}

impl std::error::Error for SearchError {}
