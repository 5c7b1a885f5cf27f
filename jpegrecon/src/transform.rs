// Copyright (c) the JPEG XL Project Authors. All rights reserved.
//
// Use of this source code is governed by a BSD-style
// license that can be found in the LICENSE file.

use crate::{BLOCK_SIZE, entropy_coding::coefficient::CoefficientBlock, quant::QuantTable, zigzag};

/// Turns a block of dequantized natural-order coefficients into level-shifted
/// spatial samples, in place.
pub trait InverseTransform {
    fn transform(&self, block: &mut [i32; BLOCK_SIZE]);
}

impl<F: Fn(&mut [i32; BLOCK_SIZE])> InverseTransform for F {
    fn transform(&self, block: &mut [i32; BLOCK_SIZE]) {
        self(block)
    }
}

/// Floating point 8x8 IDCT of ITU-T T.81 A.3.3, rounded, with the +128 level
/// shift. Output is not clamped.
#[derive(Debug, Clone, Copy, Default)]
pub struct Idct;

impl InverseTransform for Idct {
    fn transform(&self, block: &mut [i32; BLOCK_SIZE]) {
        jpegrecon_transforms::idct_8x8_level_shifted(block);
    }
}

/// Reorders, dequantizes and inverse transforms one entropy-decoded block.
pub fn reconstruct_block(
    coefficients: &CoefficientBlock,
    quant: &QuantTable,
    transform: &impl InverseTransform,
) -> [i32; BLOCK_SIZE] {
    let mut samples = quant.dequantize(&zigzag::to_natural(coefficients));
    transform.transform(&mut samples);
    samples
}
