// Copyright (c) the JPEG XL Project Authors. All rights reserved.
//
// Use of this source code is governed by a BSD-style
// license that can be found in the LICENSE file.

use crate::BLOCK_SIZE;
use crate::error::{Error, Result};
use crate::zigzag::{to_natural, to_zigzag};

/// Multiplies each coefficient by the quantization value at the same position.
///
/// `table` and `block` must use the same coefficient order. Products are
/// exact: `|i16| * u16` always fits in `i32`.
#[inline]
pub fn dequantize(table: &[u16; BLOCK_SIZE], block: &[i16; BLOCK_SIZE]) -> [i32; BLOCK_SIZE] {
    array_init::array_init(|i| block[i] as i32 * table[i] as i32)
}

/// A quantization table, stored in natural (row-major) order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct QuantTable {
    natural: [u16; BLOCK_SIZE],
}

impl QuantTable {
    pub fn from_natural(natural: [u16; BLOCK_SIZE]) -> Result<QuantTable> {
        if let Some(pos) = natural.iter().position(|&q| q == 0) {
            return Err(Error::ZeroQuantValue(pos));
        }
        Ok(QuantTable { natural })
    }

    /// Builds the table from values in zigzag order, as carried by a DQT
    /// segment.
    pub fn from_zigzag(zigzag: &[u16; BLOCK_SIZE]) -> Result<QuantTable> {
        Self::from_natural(to_natural(zigzag))
    }

    /// A table of ones: dequantization leaves coefficients unchanged.
    pub fn identity() -> QuantTable {
        QuantTable {
            natural: [1; BLOCK_SIZE],
        }
    }

    pub fn natural(&self) -> &[u16; BLOCK_SIZE] {
        &self.natural
    }

    pub fn zigzag(&self) -> [u16; BLOCK_SIZE] {
        to_zigzag(&self.natural)
    }

    /// Dequantizes a block of natural-order coefficients.
    pub fn dequantize(&self, natural: &[i16; BLOCK_SIZE]) -> [i32; BLOCK_SIZE] {
        dequantize(&self.natural, natural)
    }
}
