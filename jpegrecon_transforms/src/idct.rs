// Copyright (c) the JPEG XL Project Authors. All rights reserved.
//
// Use of this source code is governed by a BSD-style
// license that can be found in the LICENSE file.

#![allow(clippy::needless_range_loop)]

use std::f64::consts::{FRAC_1_SQRT_2, PI};
use std::sync::LazyLock;

pub const BLOCK_DIM: usize = 8;
pub const BLOCK_SIZE: usize = BLOCK_DIM * BLOCK_DIM;

/// Offset added to every reconstructed sample to move it into the unsigned
/// 8-bit range.
pub const LEVEL_SHIFT: i32 = 128;

/// `IDCT_MATRIX[x][u] = C(u) / 2 * cos((2x + 1) * u * pi / 16)`, with
/// `C(0) = 1 / sqrt(2)` and `C(u) = 1` otherwise.
static IDCT_MATRIX: LazyLock<[[f32; BLOCK_DIM]; BLOCK_DIM]> = LazyLock::new(|| {
    let mut matrix = [[0.0f32; BLOCK_DIM]; BLOCK_DIM];
    for (x, row) in matrix.iter_mut().enumerate() {
        for (u, element) in row.iter_mut().enumerate() {
            let alpha = if u == 0 { FRAC_1_SQRT_2 } else { 1.0 };
            let angle = (2 * x + 1) as f64 * u as f64 * PI / (2 * BLOCK_DIM) as f64;
            *element = (alpha * 0.5 * angle.cos()) as f32;
        }
    }
    matrix
});

#[inline(always)]
fn idct1d(input: &[f32; BLOCK_DIM], output: &mut [f32; BLOCK_DIM]) {
    let matrix = &*IDCT_MATRIX;
    for x in 0..BLOCK_DIM {
        let mut sum = 0.0;
        for u in 0..BLOCK_DIM {
            sum += matrix[x][u] * input[u];
        }
        output[x] = sum;
    }
}

/// Separable 8x8 inverse DCT. Both buffers are row-major; the input holds
/// frequency coefficients with DC at index 0.
pub fn idct2d_8x8(coefficients: &[f32; BLOCK_SIZE], samples: &mut [f32; BLOCK_SIZE]) {
    let mut rows_done = [0.0f32; BLOCK_SIZE];
    let mut input = [0.0f32; BLOCK_DIM];
    let mut output = [0.0f32; BLOCK_DIM];

    for y in 0..BLOCK_DIM {
        input.copy_from_slice(&coefficients[y * BLOCK_DIM..(y + 1) * BLOCK_DIM]);
        idct1d(&input, &mut output);
        rows_done[y * BLOCK_DIM..(y + 1) * BLOCK_DIM].copy_from_slice(&output);
    }

    for x in 0..BLOCK_DIM {
        for v in 0..BLOCK_DIM {
            input[v] = rows_done[v * BLOCK_DIM + x];
        }
        idct1d(&input, &mut output);
        for y in 0..BLOCK_DIM {
            samples[y * BLOCK_DIM + x] = output[y];
        }
    }
}

/// Replaces the dequantized, natural-order coefficients in `block` with
/// level-shifted spatial samples, rounded to the nearest integer.
///
/// Samples are not clamped: a block may legitimately reconstruct slightly
/// outside `0..=255`.
pub fn idct_8x8_level_shifted(block: &mut [i32; BLOCK_SIZE]) {
    let mut coefficients = [0.0f32; BLOCK_SIZE];
    for (c, &v) in coefficients.iter_mut().zip(block.iter()) {
        *c = v as f32;
    }
    let mut samples = [0.0f32; BLOCK_SIZE];
    idct2d_8x8(&coefficients, &mut samples);
    for (out, s) in block.iter_mut().zip(samples.iter()) {
        *out = s.round() as i32 + LEVEL_SHIFT;
    }
}
