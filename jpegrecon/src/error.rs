// Copyright (c) the JPEG XL Project Authors. All rights reserved.
//
// Use of this source code is governed by a BSD-style
// license that can be found in the LICENSE file.

use std::collections::TryReserveError;

use thiserror::Error;

use crate::entropy_coding::huffman::{HUFFMAN_MAX_BITS, HUFFMAN_MAX_SYMBOLS};

#[derive(Error, Debug)]
pub enum Error {
    #[error("Read out of bounds")]
    OutOfBounds,
    #[error("Invalid coefficient category {0}, expected 1..=15")]
    InvalidCategory(u8),
    #[error("Invalid Huffman code")]
    InvalidHuffman,
    #[error("Invalid Huffman table: counts describe {0} symbols but {1} were given")]
    InvalidHuffmanTable(usize, usize),
    #[error("Huffman alphabet too large: {0}, max is {HUFFMAN_MAX_SYMBOLS}")]
    AlphabetTooLargeHuff(usize),
    #[error("Huffman code of length {0} overflows, max length is {HUFFMAN_MAX_BITS}")]
    HuffmanCodeOverflow(usize),
    #[error("Invalid Huffman table class {0}")]
    InvalidHuffmanClass(u8),
    #[error("AC run reaches coefficient {0}, past the end of the block")]
    AcOverflow(usize),
    #[error("Reconstructed DC coefficient {0} does not fit 16 bits")]
    DcOutOfRange(i32),
    #[error("Quantization value at position {0} is zero")]
    ZeroQuantValue(usize),
    #[error("Invalid sampling: {0}x{1}")]
    InvalidSampling(usize, usize),
    #[error("Sampling factor {0} does not divide maximum sampling factor {1}")]
    NonIntegralUpsampling(usize, usize),
    #[error("Invalid component {0} in an image with {1} components")]
    InvalidComponent(usize, usize),
    #[error("Invalid number of components: {0}")]
    InvalidComponentCount(usize),
    #[error("Image of {0}x{1} with {2} components does not match the frame layout")]
    ImageLayoutMismatch(usize, usize, usize),
    #[error("Invalid number of components in scan: {0}")]
    InvalidScanComponents(usize),
    #[error("Too many blocks per MCU: {0}")]
    TooManyBlocksInMcu(usize),
    #[error("Out of memory: {0}")]
    OutOfMemory(#[from] TryReserveError),
    #[error("Image size too large: {0}x{1}")]
    ImageSizeTooLarge(usize, usize),
    #[error("Invalid image size: {0}x{1}")]
    InvalidImageSize(usize, usize),
}

pub type Result<T> = std::result::Result<T, Error>;
