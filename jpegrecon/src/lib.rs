// Copyright (c) the JPEG XL Project Authors. All rights reserved.
//
// Use of this source code is governed by a BSD-style
// license that can be found in the LICENSE file.

//! Reconstruction core of a baseline (sequential, Huffman-coded) JPEG
//! decoder: entropy-coded coefficients in, interleaved 8-bit samples out.
//!
//! Marker and segment parsing is left to the caller, which supplies
//! quantization tables, Huffman tables and component geometry.

#![deny(unsafe_code)]
pub mod bit_reader;
pub mod decode;
pub mod entropy_coding;
pub mod error;
pub mod image;
pub mod quant;
pub mod transform;
pub mod upsample;
pub mod util;
pub mod zigzag;

pub use jpegrecon_transforms::{BLOCK_DIM, BLOCK_SIZE};
