#![allow(non_camel_case_types)]
use std::collections::TryReserveError;
use std::ops::{Add, Index, IndexMut};

#[macro_export]
macro_rules! hashmap {
    () => { std::collections::HashMap::new() };
    ($( $key: expr => $val: expr ),*) => {{
         let mut map = ::std::collections::HashMap::new();
         $( map.insert($key, $val); )*
         map
    }};
}

/// Cost of a candidate that has not been evaluated yet.
pub const COST_MAX: u32 = u32::MAX;

pub const PIXEL_MID: u8 = 128;

#[derive(Clone, Copy, PartialEq, Eq, Debug)]
#[allow(clippy::upper_case_acronyms)]
pub enum SliceType {
    SLICE_B = 0,
    SLICE_P = 1,
    SLICE_I = 2,
}

impl SliceType {
    pub fn allows_inter(&self) -> bool {
        self != &Self::SLICE_I
    }
}

#[derive(Clone, Copy, PartialEq, Eq, Debug)]
#[allow(clippy::upper_case_acronyms)]
pub enum PartSize {
    SIZE_2Nx2N = 0,
    SIZE_2NxN = 1,
    SIZE_Nx2N = 2,
    SIZE_NxN = 3,
    SIZE_NONE = 15,
}

#[derive(Clone, Copy, PartialEq, Eq, Debug)]
#[allow(clippy::upper_case_acronyms)]
pub enum CuType {
    CU_NOTSET = 0,
    CU_INTRA = 1,
    CU_INTER = 2,
}

#[derive(Clone, Copy, PartialEq, Eq, Debug, FromPrimitive)]
#[allow(clippy::upper_case_acronyms)]
pub enum IntraPredMode {
    PLANAR = 0,
    DC = 1,
    ANGULAR2 = 2,
    ANGULAR3 = 3,
    ANGULAR4 = 4,
    ANGULAR5 = 5,
    ANGULAR6 = 6,
    ANGULAR7 = 7,
    ANGULAR8 = 8,
    ANGULAR9 = 9,
    ANGULAR10 = 10,
    ANGULAR11 = 11,
    ANGULAR12 = 12,
    ANGULAR13 = 13,
    ANGULAR14 = 14,
    ANGULAR15 = 15,
    ANGULAR16 = 16,
    ANGULAR17 = 17,
    ANGULAR18 = 18,
    ANGULAR19 = 19,
    ANGULAR20 = 20,
    ANGULAR21 = 21,
    ANGULAR22 = 22,
    ANGULAR23 = 23,
    ANGULAR24 = 24,
    ANGULAR25 = 25,
    ANGULAR26 = 26,
    ANGULAR27 = 27,
    ANGULAR28 = 28,
    ANGULAR29 = 29,
    ANGULAR30 = 30,
    ANGULAR31 = 31,
    ANGULAR32 = 32,
    ANGULAR33 = 33,
    ANGULAR34 = 34,
}

impl IntraPredMode {
    pub const NUM_MODES: usize = 35;

    pub fn from_index(index: usize) -> Option<IntraPredMode> {
        num::FromPrimitive::from_usize(index)
    }
}

// intraPredAngle for modes 2..=34
pub const INTRA_ANGLE_TABLE: [i32; 33] = [
    32, 26, 21, 17, 13, 9, 5, 2, 0, -2, -5, -9, -13, -17, -21, -26, -32, -26, -21, -17, -13, -9,
    -5, -2, 0, 2, 5, 9, 13, 17, 21, 26, 32,
];

/// Displacement in quarter-sample units.
#[derive(Clone, Copy, PartialEq, Eq, Debug, Default, Hash)]
pub struct MotionVector {
    pub x: i32,
    pub y: i32,
}

impl MotionVector {
    pub const ZERO: MotionVector = MotionVector { x: 0, y: 0 };

    pub const fn new(x: i32, y: i32) -> MotionVector {
        MotionVector { x, y }
    }

    pub fn is_zero(&self) -> bool {
        self.x == 0 && self.y == 0
    }

    /// Truncates a quarter-sample vector to whole samples.
    pub fn to_integer(&self) -> MotionVector {
        MotionVector::new(self.x >> 2, self.y >> 2)
    }

    /// Scales a whole-sample vector back to quarter-sample precision.
    pub fn to_quarter(&self) -> MotionVector {
        MotionVector::new(self.x << 2, self.y << 2)
    }
}

impl Add for MotionVector {
    type Output = MotionVector;
    fn add(self, rhs: MotionVector) -> MotionVector {
        MotionVector::new(self.x + rhs.x, self.y + rhs.y)
    }
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Vec2d<T> {
    pub data: Vec<T>,
    pub height: usize,
    pub width: usize,
    pub log2_stride: usize,
}

impl<T: Copy> Vec2d<T> {
    #[inline(always)]
    pub fn new(v: T, height: usize, width: usize) -> Vec2d<T> {
        let log2_stride = (width * 2 - 1).ilog2() as usize;
        Vec2d {
            data: vec![v; height << log2_stride],
            height,
            width,
            log2_stride,
        }
    }

    /// Same as `new`, but reports a failed allocation instead of aborting.
    pub fn try_new(v: T, height: usize, width: usize) -> Result<Vec2d<T>, TryReserveError> {
        let log2_stride = (width * 2 - 1).ilog2() as usize;
        let len = height.saturating_mul(1 << log2_stride);
        let mut data = Vec::new();
        data.try_reserve_exact(len)?;
        data.resize(len, v);
        Ok(Vec2d {
            data,
            height,
            width,
            log2_stride,
        })
    }

    #[inline(always)]
    pub fn fill(&mut self, v: T) {
        self.data.fill(v);
    }

    /// Sample at (x, y) with coordinates clamped into the plane, which pads
    /// the plane by repeating its edge samples.
    #[inline(always)]
    pub fn get_clamped(&self, x: isize, y: isize) -> T {
        let x = x.clamp(0, self.width as isize - 1) as usize;
        let y = y.clamp(0, self.height as isize - 1) as usize;
        self.data[(y << self.log2_stride) + x]
    }
}

impl<T> Index<usize> for Vec2d<T> {
    type Output = [T];
    #[inline(always)]
    fn index(&self, index: usize) -> &Self::Output {
        let offset = index << self.log2_stride;
        &self.data[offset..offset + self.width]
    }
}

impl<T> IndexMut<usize> for Vec2d<T> {
    #[inline(always)]
    fn index_mut(&mut self, index: usize) -> &mut [T] {
        let offset = index << self.log2_stride;
        &mut self.data[offset..offset + self.width]
    }
}

#[macro_export]
macro_rules! vec2d {
    ($elem:expr; $h:expr; $w:expr) => {
        Vec2d::new($elem, $h, $w)
    };
}

/// Number of bits needed to represent `v`; 0 for 0.
#[inline(always)]
pub fn bit_length(v: u32) -> u32 {
    u32::BITS - v.leading_zeros()
}
