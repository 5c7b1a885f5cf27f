// Copyright (c) the JPEG XL Project Authors. All rights reserved.
//
// Use of this source code is governed by a BSD-style
// license that can be found in the LICENSE file.

use std::fmt::Debug;

use crate::{error::Error, util::tracing_wrappers::*};
use byteorder::{BigEndian, ByteOrder};

/// Reads bits, most significant first, from the entropy-coded data of a scan.
///
/// Stuffed zero bytes following `0xFF` are removed. Reading stops at the first
/// marker (`0xFF` followed by a non-zero byte): bits after it are never
/// returned, and requesting them fails with [`Error::OutOfBounds`].
#[derive(Clone)]
pub struct BitReader<'a> {
    data: &'a [u8],
    // The low `bits_in_buf` bits are valid; the next bit is the highest of them.
    bit_buf: u64,
    bits_in_buf: usize,
    total_bits_read: usize,
    marker: Option<u8>,
}

impl Debug for BitReader<'_> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "BitReader{{ data: [{} bytes], bit_buf: {:0width$b}, total_bits_read: {}, marker: {:?} }}",
            self.data.len(),
            self.bit_buf & low_mask(self.bits_in_buf),
            self.total_bits_read,
            self.marker,
            width = self.bits_in_buf
        )
    }
}

pub const MAX_BITS_PER_CALL: usize = 32;

// Refill keeps at most this many bits buffered.
const MAX_BUFFERED_BITS: usize = 56;

#[inline(always)]
fn low_mask(num: usize) -> u64 {
    if num >= 64 { u64::MAX } else { (1u64 << num) - 1 }
}

impl<'a> BitReader<'a> {
    /// Constructs a BitReader for the entropy-coded bytes of a scan.
    pub fn new(data: &'a [u8]) -> BitReader<'a> {
        BitReader {
            data,
            bit_buf: 0,
            bits_in_buf: 0,
            total_bits_read: 0,
            marker: None,
        }
    }

    /// Reads a single bit.
    /// ```
    /// # use jpegrecon::bit_reader::BitReader;
    /// let mut br = BitReader::new(&[0b1000_0000]);
    /// assert!(br.read_bit()?);
    /// assert!(!br.read_bit()?);
    /// # Ok::<(), jpegrecon::error::Error>(())
    /// ```
    #[inline]
    pub fn read_bit(&mut self) -> Result<bool, Error> {
        Ok(self.read(1)? != 0)
    }

    /// Reads `num` bits, the first one read ending up as the most significant.
    /// ```
    /// # use jpegrecon::bit_reader::BitReader;
    /// let mut br = BitReader::new(&[0xA5, 0x0F]);
    /// assert_eq!(br.read(4)?, 0xA);
    /// assert_eq!(br.read(8)?, 0x50);
    /// assert_eq!(br.read(4)?, 0xF);
    /// assert_eq!(br.total_bits_read(), 16);
    /// assert!(br.read(1).is_err());
    /// # Ok::<(), jpegrecon::error::Error>(())
    /// ```
    #[inline]
    pub fn read(&mut self, num: usize) -> Result<u32, Error> {
        debug_assert!(num <= MAX_BITS_PER_CALL);
        if num == 0 {
            return Ok(0);
        }
        if self.bits_in_buf < num {
            self.refill();
        }
        if self.bits_in_buf < num {
            return Err(Error::OutOfBounds);
        }
        self.bits_in_buf -= num;
        self.total_bits_read += num;
        Ok(((self.bit_buf >> self.bits_in_buf) & low_mask(num)) as u32)
    }

    /// Returns the next `num` bits without consuming them. If fewer bits are
    /// left before the end of the data, the missing low bits are zero.
    pub fn peek_padded(&mut self, num: usize) -> u32 {
        debug_assert!(num <= MAX_BITS_PER_CALL);
        if self.bits_in_buf < num {
            self.refill();
        }
        let bits = if self.bits_in_buf >= num {
            self.bit_buf >> (self.bits_in_buf - num)
        } else {
            self.bit_buf << (num - self.bits_in_buf)
        };
        (bits & low_mask(num)) as u32
    }

    /// Advances by `num` bits, which must have been made available by a
    /// previous peek.
    pub fn consume(&mut self, num: usize) -> Result<(), Error> {
        if self.bits_in_buf < num {
            return Err(Error::OutOfBounds);
        }
        self.bits_in_buf -= num;
        self.total_bits_read += num;
        Ok(())
    }

    /// Returns the total number of bits that have been read.
    pub fn total_bits_read(&self) -> usize {
        self.total_bits_read
    }

    /// Returns the code of the marker that terminated the entropy-coded data,
    /// once the reader has reached it.
    pub fn marker(&self) -> Option<u8> {
        self.marker
    }

    /// Returns the bytes that have not been buffered yet. After a marker was
    /// found, this starts at its `0xFF` prefix.
    pub fn remaining_bytes(&self) -> &'a [u8] {
        self.data
    }

    fn refill(&mut self) {
        if self.data.len() >= 8 && self.marker.is_none() {
            let num_bytes = (MAX_BUFFERED_BITS - self.bits_in_buf) / 8;
            if num_bytes == 0 {
                return;
            }
            let word = BigEndian::read_u64(self.data);
            if !word.to_be_bytes()[..num_bytes].contains(&0xFF) {
                let num_bits = num_bytes * 8;
                self.bit_buf = (self.bit_buf << num_bits) | (word >> (64 - num_bits));
                self.bits_in_buf += num_bits;
                self.data = &self.data[num_bytes..];
                return;
            }
        }
        self.refill_slow()
    }

    #[inline(never)]
    fn refill_slow(&mut self) {
        while self.bits_in_buf + 8 <= MAX_BUFFERED_BITS && self.marker.is_none() {
            let Some((&byte, rest)) = self.data.split_first() else {
                return;
            };
            if byte == 0xFF {
                match rest.first() {
                    Some(0x00) => self.data = &rest[1..],
                    // Fill byte in front of a marker.
                    Some(0xFF) => {
                        self.data = rest;
                        continue;
                    }
                    Some(&code) => {
                        trace!(code, total_bits_read = self.total_bits_read, "reached marker");
                        self.marker = Some(code);
                        return;
                    }
                    None => return,
                }
            } else {
                self.data = rest;
            }
            self.bit_buf = (self.bit_buf << 8) | byte as u64;
            self.bits_in_buf += 8;
        }
    }
}
