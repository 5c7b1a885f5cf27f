// Copyright (c) the JPEG XL Project Authors. All rights reserved.
//
// Use of this source code is governed by a BSD-style
// license that can be found in the LICENSE file.

//! The zigzag scan order of an 8x8 block.

use crate::{BLOCK_DIM, BLOCK_SIZE};

/// `ZIGZAG_TO_NATURAL[k]` is the row-major position of the `k`-th coefficient
/// in scan order.
pub const ZIGZAG_TO_NATURAL: [u8; BLOCK_SIZE] = zigzag_order();

/// Inverse of [`ZIGZAG_TO_NATURAL`].
pub const NATURAL_TO_ZIGZAG: [u8; BLOCK_SIZE] = {
    let mut table = [0u8; BLOCK_SIZE];
    let mut k = 0;
    while k < BLOCK_SIZE {
        table[ZIGZAG_TO_NATURAL[k] as usize] = k as u8;
        k += 1;
    }
    table
};

// Walks the anti-diagonals x + y = d, going up-right on even d and down-left
// on odd d.
const fn zigzag_order() -> [u8; BLOCK_SIZE] {
    let mut out = [0u8; BLOCK_SIZE];
    let mut k = 0;
    let mut d = 0;
    while d < 2 * BLOCK_DIM - 1 {
        let lo = if d < BLOCK_DIM { 0 } else { d - BLOCK_DIM + 1 };
        let hi = if d < BLOCK_DIM { d } else { BLOCK_DIM - 1 };
        let mut i = lo;
        while i <= hi {
            // `i` is the row on odd diagonals and the column on even ones.
            let (x, y) = if d % 2 == 0 { (i, d - i) } else { (d - i, i) };
            out[k] = (y * BLOCK_DIM + x) as u8;
            k += 1;
            i += 1;
        }
        d += 1;
    }
    out
}

/// Returns the natural (row-major) order version of a zigzag-ordered block.
#[inline]
pub fn to_natural<T: Copy>(scan: &[T; BLOCK_SIZE]) -> [T; BLOCK_SIZE] {
    array_init::array_init(|i| scan[NATURAL_TO_ZIGZAG[i] as usize])
}

/// Returns the zigzag order version of a natural-order block.
#[inline]
pub fn to_zigzag<T: Copy>(natural: &[T; BLOCK_SIZE]) -> [T; BLOCK_SIZE] {
    array_init::array_init(|k| natural[ZIGZAG_TO_NATURAL[k] as usize])
}
