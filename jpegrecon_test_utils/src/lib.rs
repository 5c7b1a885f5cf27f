// Copyright (c) the JPEG XL Project Authors. All rights reserved.
//
// Use of this source code is governed by a BSD-style
// license that can be found in the LICENSE file.

#[macro_export]
macro_rules! assert_almost_eq {
    ($left:expr, $right:expr, $max_error:expr $(,)?) => {
        match (&$left, &$right) {
            (left_val, right_val) => {
                let diff = if *left_val > *right_val {
                    *left_val - *right_val
                } else {
                    *right_val - *left_val
                };
                if !(diff <= $max_error) {
                    panic!(
                        "assertion failed: `(left ≈ right)`\n  left: `{:?}`,\n right: `{:?}`,\n max_error: `{:?}`",
                        left_val, right_val, $max_error
                    );
                }
            }
        }
    };
}

/// Packs bit fields MSB-first into an entropy-coded segment, inserting the
/// `0x00` stuffing byte after every `0xFF` and padding the last byte with
/// ones.
#[derive(Default)]
pub struct BitWriter {
    bytes: Vec<u8>,
    acc: u64,
    nbits: usize,
}

impl BitWriter {
    pub fn new() -> BitWriter {
        BitWriter::default()
    }

    /// Appends the `nbits` low bits of `value`, most significant first.
    pub fn write(&mut self, nbits: usize, value: u32) -> &mut Self {
        assert!(nbits <= 32);
        for i in (0..nbits).rev() {
            self.acc = (self.acc << 1) | ((value >> i) & 1) as u64;
            self.nbits += 1;
            if self.nbits == 8 {
                self.push_byte(self.acc as u8);
                self.acc = 0;
                self.nbits = 0;
            }
        }
        self
    }

    /// Appends a bit string such as `"1 01"`; whitespace is ignored.
    pub fn write_str(&mut self, bits: &str) -> &mut Self {
        for c in bits.chars().filter(|c| !c.is_whitespace()) {
            match c {
                '0' => self.write(1, 0),
                '1' => self.write(1, 1),
                _ => panic!("invalid bit character {c:?}"),
            };
        }
        self
    }

    fn push_byte(&mut self, byte: u8) {
        self.bytes.push(byte);
        if byte == 0xFF {
            self.bytes.push(0x00);
        }
    }

    pub fn finish(mut self) -> Vec<u8> {
        if self.nbits > 0 {
            let pad = 8 - self.nbits;
            let byte = ((self.acc << pad) | ((1 << pad) - 1)) as u8;
            self.push_byte(byte);
        }
        self.bytes
    }
}

/// Returns the canonical JPEG Huffman code of `symbol` as `(code, length)`,
/// for a table given by its per-length counts and its values.
pub fn canonical_code(counts: &[u8; 16], values: &[u8], symbol: u8) -> Option<(u32, usize)> {
    let mut code = 0u32;
    let mut k = 0;
    for (i, &count) in counts.iter().enumerate() {
        for _ in 0..count {
            if values.get(k) == Some(&symbol) {
                return Some((code, i + 1));
            }
            code += 1;
            k += 1;
        }
        code <<= 1;
    }
    None
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_with_floats() {
        assert_almost_eq!(1.0000001f64, 1.0000002, 0.000001);
        assert_almost_eq!(1.0, 1.1, 0.2);
    }

    #[test]
    fn test_with_integers() {
        assert_almost_eq!(100, 101, 2);
        assert_almost_eq!(-5i32, -4, 1);
    }

    #[test]
    #[should_panic]
    fn test_panic() {
        assert_almost_eq!(1.0, 1.2, 0.1);
    }

    #[test]
    fn canonical_codes_of_small_table() {
        let counts = [0, 2, 1, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0];
        let values = [7, 3, 9];
        assert_eq!(canonical_code(&counts, &values, 7), Some((0b00, 2)));
        assert_eq!(canonical_code(&counts, &values, 3), Some((0b01, 2)));
        assert_eq!(canonical_code(&counts, &values, 9), Some((0b100, 3)));
        assert_eq!(canonical_code(&counts, &values, 1), None);
    }

    #[test]
    fn writer_packs_msb_first() {
        let mut w = BitWriter::new();
        w.write(3, 0b101).write(5, 0b00011);
        assert_eq!(w.finish(), vec![0b1010_0011]);
    }

    #[test]
    fn writer_pads_with_ones() {
        let mut w = BitWriter::new();
        w.write_str("0 10");
        assert_eq!(w.finish(), vec![0b0101_1111]);
    }

    #[test]
    fn writer_stuffs_ff() {
        let mut w = BitWriter::new();
        w.write(8, 0xFF).write(8, 0x12);
        assert_eq!(w.finish(), vec![0xFF, 0x00, 0x12]);
    }
}
