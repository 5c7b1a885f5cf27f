// Copyright (c) the JPEG XL Project Authors. All rights reserved.
//
// Use of this source code is governed by a BSD-style
// license that can be found in the LICENSE file.

use num_derive::FromPrimitive;
use num_traits::FromPrimitive;

use crate::bit_reader::BitReader;
use crate::error::{Error, Result};
use crate::util::tracing_wrappers::*;

pub const HUFFMAN_MAX_BITS: usize = 16;
pub const HUFFMAN_MAX_SYMBOLS: usize = 256;
const LOOKAHEAD_BITS: usize = 9;

/// Table class as stored in the high nibble of the DHT `Tc/Th` byte.
#[derive(Debug, Clone, Copy, PartialEq, Eq, FromPrimitive)]
pub enum HuffmanClass {
    Dc = 0,
    Ac = 1,
}

impl HuffmanClass {
    pub fn from_table_class(tc: u8) -> Result<HuffmanClass> {
        HuffmanClass::from_u8(tc).ok_or(Error::InvalidHuffmanClass(tc))
    }
}

/// Something that can decode one byte-valued symbol from a bit stream.
///
/// DC symbols carry a category, AC symbols a run/category pair.
pub trait SymbolDecoder {
    fn decode_symbol(&self, br: &mut BitReader) -> Result<u8>;
}

impl<T: SymbolDecoder + ?Sized> SymbolDecoder for &T {
    fn decode_symbol(&self, br: &mut BitReader) -> Result<u8> {
        (**self).decode_symbol(br)
    }
}

#[derive(Debug, Clone, Copy, Default)]
struct LookupEntry {
    symbol: u8,
    // 0 if the code is longer than LOOKAHEAD_BITS, or invalid.
    len: u8,
}

/// Canonical prefix code of ITU-T T.81 Annex C.
#[derive(Debug, Clone)]
pub struct HuffmanTable {
    class: HuffmanClass,
    values: Vec<u8>,
    // Largest code of each length, -1 if there is none. Index 0 is unused.
    max_code: [i32; HUFFMAN_MAX_BITS + 1],
    // Index into `values` of a code of each length, minus the code.
    value_offset: [i32; HUFFMAN_MAX_BITS + 1],
    lookup: Vec<LookupEntry>,
}

impl HuffmanTable {
    /// Builds the table from the number of codes of each length 1..=16 and
    /// the symbols in code order, as they appear in a DHT segment.
    pub fn new(
        class: HuffmanClass,
        counts: &[u8; HUFFMAN_MAX_BITS],
        values: &[u8],
    ) -> Result<Self> {
        let total: usize = counts.iter().map(|&c| c as usize).sum();
        if total > HUFFMAN_MAX_SYMBOLS {
            return Err(Error::AlphabetTooLargeHuff(total));
        }
        if total != values.len() {
            return Err(Error::InvalidHuffmanTable(total, values.len()));
        }

        let mut max_code = [-1i32; HUFFMAN_MAX_BITS + 1];
        let mut value_offset = [0i32; HUFFMAN_MAX_BITS + 1];
        let mut lookup = vec![LookupEntry::default(); 1 << LOOKAHEAD_BITS];

        let mut code = 0u32;
        let mut k = 0usize;
        for len in 1..=HUFFMAN_MAX_BITS {
            let count = counts[len - 1] as usize;
            if count > 0 {
                value_offset[len] = k as i32 - code as i32;
                for _ in 0..count {
                    if code >= 1 << len {
                        return Err(Error::HuffmanCodeOverflow(len));
                    }
                    if len <= LOOKAHEAD_BITS {
                        let shift = LOOKAHEAD_BITS - len;
                        let first = (code as usize) << shift;
                        let entry = LookupEntry {
                            symbol: values[k],
                            len: len as u8,
                        };
                        lookup[first..first + (1 << shift)].fill(entry);
                    }
                    code += 1;
                    k += 1;
                }
                max_code[len] = code as i32 - 1;
            }
            // The all-ones code of each length is reserved.
            if code >= 1 << len {
                return Err(Error::HuffmanCodeOverflow(len));
            }
            code <<= 1;
        }
        trace!(?class, num_symbols = total, "built Huffman table");

        Ok(HuffmanTable {
            class,
            values: values.to_vec(),
            max_code,
            value_offset,
            lookup,
        })
    }

    /// Builds the table from a DHT `Tc` nibble, counts and values.
    pub fn from_dht(
        table_class: u8,
        counts: &[u8; HUFFMAN_MAX_BITS],
        values: &[u8],
    ) -> Result<Self> {
        Self::new(HuffmanClass::from_table_class(table_class)?, counts, values)
    }

    pub fn class(&self) -> HuffmanClass {
        self.class
    }

    pub fn num_symbols(&self) -> usize {
        self.values.len()
    }

    #[inline(never)]
    fn decode_slow(&self, br: &mut BitReader) -> Result<u8> {
        let mut code = 0i32;
        for len in 1..=HUFFMAN_MAX_BITS {
            code = (code << 1) | br.read_bit()? as i32;
            if code <= self.max_code[len] {
                return Ok(self.values[(self.value_offset[len] + code) as usize]);
            }
        }
        Err(Error::InvalidHuffman)
    }
}

impl SymbolDecoder for HuffmanTable {
    #[inline]
    fn decode_symbol(&self, br: &mut BitReader) -> Result<u8> {
        let entry = self.lookup[br.peek_padded(LOOKAHEAD_BITS) as usize];
        if entry.len > 0 {
            br.consume(entry.len as usize)?;
            return Ok(entry.symbol);
        }
        self.decode_slow(br)
    }
}
