#![allow(clippy::comparison_chain)]
#![allow(clippy::too_many_arguments)]
extern crate num;
#[macro_use]
extern crate num_derive;
#[macro_use]
pub mod common;
pub mod block_splitter;
pub mod cost;
pub mod cu;
pub mod encoder_context;
pub mod error;
pub mod intra_predictor;
pub mod mode_decision;
pub mod motion_estimator;
pub mod picture;
pub mod reconstruction;
pub mod reference_picture;
pub mod slice_searcher;
pub mod yuv_io;
