// Copyright (c) the JPEG XL Project Authors. All rights reserved.
//
// Use of this source code is governed by a BSD-style
// license that can be found in the LICENSE file.

//! Sequential Huffman decoding of quantized coefficients, ITU-T T.81 F.2.2.

use crate::BLOCK_SIZE;
use crate::bit_reader::BitReader;
use crate::entropy_coding::huffman::SymbolDecoder;
use crate::error::{Error, Result};
use crate::util::tracing_wrappers::*;

pub const MAX_CATEGORY: u8 = 15;

/// One block of quantized coefficients in zigzag scan order.
pub type CoefficientBlock = [i16; BLOCK_SIZE];

/// Reads the `ssss` additional bits of a coefficient of category `ssss` and
/// returns its signed value.
///
/// A set leading bit gives a value in `2^(ssss-1)..=2^ssss-1`, a clear one a
/// value in `-(2^ssss-1)..=-2^(ssss-1)`; zero is never produced. Category 0
/// carries no bits and is handled by callers, so it is rejected here along
/// with categories above 15.
/// ```
/// # use jpegrecon::bit_reader::BitReader;
/// # use jpegrecon::entropy_coding::coefficient::decode_signed;
/// let mut br = BitReader::new(&[0b1010_0000]);
/// assert_eq!(decode_signed(&mut br, 3)?, 5);
/// assert_eq!(decode_signed(&mut br, 2)?, -3);
/// # Ok::<(), jpegrecon::error::Error>(())
/// ```
#[inline]
pub fn decode_signed(br: &mut BitReader, ssss: u8) -> Result<i32> {
    if ssss == 0 || ssss > MAX_CATEGORY {
        return Err(Error::InvalidCategory(ssss));
    }
    let data_range = 1i32 << (ssss - 1);
    let positive = br.read_bit()?;
    let w = br.read(ssss as usize - 1)? as i32;
    Ok(if positive {
        data_range + w
    } else {
        1 - 2 * data_range + w
    })
}

/// The two nibbles of an AC symbol.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RunCategory {
    /// Zero coefficients preceding the next non-zero one (RRRR).
    pub run: u8,
    /// Category of that coefficient (SSSS).
    pub category: u8,
}

impl RunCategory {
    /// End of block: all remaining coefficients are zero.
    pub fn is_eob(self) -> bool {
        self.category == 0 && self.run != 15
    }

    /// Zero run length: sixteen zero coefficients.
    pub fn is_zrl(self) -> bool {
        self.category == 0 && self.run == 15
    }
}

#[inline]
pub fn split_symbol(symbol: u8) -> RunCategory {
    RunCategory {
        run: (symbol >> 4) & 0xF,
        category: symbol & 0xF,
    }
}

/// Decodes a DC difference: a category symbol, then its additional bits.
pub fn decode_dc(dc_table: &impl SymbolDecoder, br: &mut BitReader) -> Result<i32> {
    let ssss = dc_table.decode_symbol(br)?;
    if ssss == 0 {
        return Ok(0);
    }
    decode_signed(br, ssss)
}

/// Running DC value of one component. Each block codes its DC coefficient as
/// a difference from the previous block of the same component in the scan.
#[derive(Debug, Clone, Copy, Default)]
pub struct DcPredictor {
    last: i32,
}

impl DcPredictor {
    pub fn new() -> DcPredictor {
        DcPredictor::default()
    }

    /// Applies `diff` and returns the new DC coefficient.
    pub fn apply(&mut self, diff: i32) -> Result<i16> {
        let dc = self.last + diff;
        let value = i16::try_from(dc).map_err(|_| Error::DcOutOfRange(dc))?;
        self.last = dc;
        Ok(value)
    }

    pub fn reset(&mut self) {
        self.last = 0;
    }
}

/// Decodes the 63 AC coefficients of a block into positions 1..64 of
/// `block`, which must be zero there.
pub fn decode_ac(
    ac_table: &impl SymbolDecoder,
    br: &mut BitReader,
    block: &mut CoefficientBlock,
) -> Result<()> {
    let mut k = 1;
    while k < BLOCK_SIZE {
        let rc = split_symbol(ac_table.decode_symbol(br)?);
        if rc.is_zrl() {
            k += 16;
            continue;
        }
        if rc.is_eob() {
            if rc.run != 0 {
                debug!(run = rc.run, "category 0 with non-zero run, treated as end of block");
            }
            break;
        }
        k += rc.run as usize;
        if k >= BLOCK_SIZE {
            return Err(Error::AcOverflow(k));
        }
        // Categories are at most 15, so the value fits 16 bits.
        block[k] = decode_signed(br, rc.category)? as i16;
        k += 1;
    }
    Ok(())
}

/// Decodes one block in zigzag order: the DC difference, resolved against
/// `predictor`, followed by the AC coefficients.
pub fn decode_block(
    dc_table: &impl SymbolDecoder,
    ac_table: &impl SymbolDecoder,
    br: &mut BitReader,
    predictor: &mut DcPredictor,
) -> Result<CoefficientBlock> {
    let mut block = [0i16; BLOCK_SIZE];
    block[0] = predictor.apply(decode_dc(dc_table, br)?)?;
    decode_ac(ac_table, br, &mut block)?;
    Ok(block)
}
