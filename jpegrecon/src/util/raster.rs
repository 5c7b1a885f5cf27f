// Copyright (c) the JPEG XL Project Authors. All rights reserved.
//
// Use of this source code is governed by a BSD-style
// license that can be found in the LICENSE file.

/// Calls `f(x, y)` for every position of a `size.0 x size.1` rectangle, rows
/// top to bottom and each row left to right.
#[inline]
pub fn for_each_position(size: (usize, usize), mut f: impl FnMut(usize, usize)) {
    let (xsize, ysize) = size;
    for y in 0..ysize {
        for x in 0..xsize {
            f(x, y);
        }
    }
}

/// Fallible variant of [`for_each_position`]; stops at the first error.
#[inline]
pub fn try_for_each_position<E>(
    size: (usize, usize),
    mut f: impl FnMut(usize, usize) -> Result<(), E>,
) -> Result<(), E> {
    let (xsize, ysize) = size;
    for y in 0..ysize {
        for x in 0..xsize {
            f(x, y)?;
        }
    }
    Ok(())
}
