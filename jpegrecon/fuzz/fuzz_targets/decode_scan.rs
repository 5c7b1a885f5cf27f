// Copyright (c) the JPEG XL Project Authors. All rights reserved.
//
// Use of this source code is governed by a BSD-style
// license that can be found in the LICENSE file.
#![no_main]

use jpegrecon::bit_reader::BitReader;
use jpegrecon::decode::{FrameLayout, ScanComponent, decode_scan_to_image};
use jpegrecon::entropy_coding::huffman::HuffmanTable;
use jpegrecon::entropy_coding::standard_tables::StandardTable;
use jpegrecon::quant::QuantTable;
use jpegrecon::transform::Idct;
use libfuzzer_sys::fuzz_target;

// The first bytes pick the frame geometry; the rest is entropy-coded data.
fn fuzz_decode(data: &[u8]) -> Result<(), jpegrecon::error::Error> {
    if data.len() < 7 {
        return Ok(());
    }
    let (header, coded) = data.split_at(7);
    let size = (header[0] as usize % 64 + 1, header[1] as usize % 64 + 1);
    let num_components = header[2] as usize % 3 + 1;
    let sampling: Vec<(usize, usize)> = header[3..3 + num_components]
        .iter()
        .map(|f| ((f & 3) as usize + 1, ((f >> 2) & 3) as usize + 1))
        .collect();
    let layout = FrameLayout::new(size, &sampling)?;

    let luma = (
        StandardTable::LuminanceDc.build()?,
        StandardTable::LuminanceAc.build()?,
    );
    let chroma = (
        StandardTable::ChrominanceDc.build()?,
        StandardTable::ChrominanceAc.build()?,
    );
    let quant = QuantTable::from_natural([header[6] as u16 + 1; 64])?;
    let components: Vec<ScanComponent<HuffmanTable>> = (0..num_components)
        .map(|c| {
            let (dc_table, ac_table) = if c == 0 { &luma } else { &chroma };
            ScanComponent {
                component: c,
                quant_table: &quant,
                dc_table,
                ac_table,
            }
        })
        .collect();
    let mut br = BitReader::new(coded);
    decode_scan_to_image(&mut br, &layout, &components, &Idct)?;
    Ok(())
}

fuzz_target!(|data: &[u8]| {
    let _ = fuzz_decode(data);
});
