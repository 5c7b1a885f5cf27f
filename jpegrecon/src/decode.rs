// Copyright (c) the JPEG XL Project Authors. All rights reserved.
//
// Use of this source code is governed by a BSD-style
// license that can be found in the LICENSE file.

//! Decoding of one baseline scan into the destination image.

use crate::{
    BLOCK_DIM, BLOCK_SIZE,
    bit_reader::BitReader,
    entropy_coding::{
        coefficient::{CoefficientBlock, DcPredictor, decode_block},
        huffman::SymbolDecoder,
    },
    error::{Error, Result},
    image::{Image, MAX_COMPONENTS},
    quant::QuantTable,
    transform::{InverseTransform, reconstruct_block},
    upsample::{ComponentGeometry, scatter_block},
    util::{tracing_wrappers::*, try_for_each_position},
};

pub const MAX_SAMPLING_FACTOR: usize = 4;
/// Upper bound on the blocks contributed by all components of one MCU.
pub const MAX_BLOCKS_IN_MCU: usize = 10;

/// Image size and per-component sampling factors of a frame.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FrameLayout {
    size: (usize, usize),
    sampling: Vec<(usize, usize)>,
    max_sampling: (usize, usize),
}

impl FrameLayout {
    /// `sampling[c]` holds the horizontal and vertical sampling factors of
    /// component `c`, each in `1..=4`. The largest factors must be multiples
    /// of every component's factors.
    pub fn new(size: (usize, usize), sampling: &[(usize, usize)]) -> Result<FrameLayout> {
        if size.0 == 0 || size.1 == 0 {
            return Err(Error::InvalidImageSize(size.0, size.1));
        }
        // Keeps `size * factor` and MCU-aligned sizes within `usize`.
        let limit = MAX_SAMPLING_FACTOR * BLOCK_DIM;
        if size.0.checked_mul(limit).is_none() || size.1.checked_mul(limit).is_none() {
            return Err(Error::ImageSizeTooLarge(size.0, size.1));
        }
        if sampling.is_empty() || sampling.len() > MAX_COMPONENTS {
            return Err(Error::InvalidComponentCount(sampling.len()));
        }
        let valid = 1..=MAX_SAMPLING_FACTOR;
        if let Some(&(h, v)) = sampling
            .iter()
            .find(|(h, v)| !valid.contains(h) || !valid.contains(v))
        {
            return Err(Error::InvalidSampling(h, v));
        }
        let hmax = sampling.iter().map(|s| s.0).max().unwrap_or(1);
        let vmax = sampling.iter().map(|s| s.1).max().unwrap_or(1);
        for &(h, v) in sampling {
            if hmax % h != 0 {
                return Err(Error::NonIntegralUpsampling(h, hmax));
            }
            if vmax % v != 0 {
                return Err(Error::NonIntegralUpsampling(v, vmax));
            }
        }
        Ok(FrameLayout {
            size,
            sampling: sampling.to_vec(),
            max_sampling: (hmax, vmax),
        })
    }

    pub fn size(&self) -> (usize, usize) {
        self.size
    }

    pub fn num_components(&self) -> usize {
        self.sampling.len()
    }

    pub fn max_sampling(&self) -> (usize, usize) {
        self.max_sampling
    }

    pub fn sampling(&self, component: usize) -> Result<(usize, usize)> {
        self.sampling
            .get(component)
            .copied()
            .ok_or(Error::InvalidComponent(component, self.sampling.len()))
    }

    /// Size in pixels of the area covered by one MCU.
    pub fn mcu_size(&self) -> (usize, usize) {
        (
            self.max_sampling.0 * BLOCK_DIM,
            self.max_sampling.1 * BLOCK_DIM,
        )
    }

    pub fn mcu_count(&self) -> (usize, usize) {
        let (w, h) = self.mcu_size();
        (self.size.0.div_ceil(w), self.size.1.div_ceil(h))
    }

    /// Size in samples of a component's plane, before upsampling.
    pub fn component_size(&self, component: usize) -> Result<(usize, usize)> {
        let (h, v) = self.sampling(component)?;
        let (hmax, vmax) = self.max_sampling;
        Ok((
            (self.size.0 * h).div_ceil(hmax),
            (self.size.1 * v).div_ceil(vmax),
        ))
    }

    /// Blocks covering a component's plane, as coded in a non-interleaved
    /// scan.
    pub fn component_blocks(&self, component: usize) -> Result<(usize, usize)> {
        let (w, h) = self.component_size(component)?;
        Ok((w.div_ceil(BLOCK_DIM), h.div_ceil(BLOCK_DIM)))
    }

    pub fn geometry(&self, component: usize) -> Result<ComponentGeometry> {
        let (h, v) = self.sampling(component)?;
        let (hmax, vmax) = self.max_sampling;
        ComponentGeometry::new(self.num_components(), component, (hmax / h, vmax / v))
    }
}

/// A component taking part in a scan, with the tables its blocks are coded
/// and quantized with.
pub struct ScanComponent<'a, D> {
    pub component: usize,
    pub quant_table: &'a QuantTable,
    pub dc_table: &'a D,
    pub ac_table: &'a D,
}

struct DecodedBlock {
    scan_index: usize,
    position: (usize, usize),
    coefficients: CoefficientBlock,
}

fn reconstruct_batch<T: InverseTransform + Sync>(
    batch: &[DecodedBlock],
    quant_tables: &[&QuantTable],
    transform: &T,
) -> Vec<[i32; BLOCK_SIZE]> {
    let reconstruct = |block: &DecodedBlock| {
        reconstruct_block(
            &block.coefficients,
            quant_tables[block.scan_index],
            transform,
        )
    };
    #[cfg(feature = "parallel")]
    {
        use rayon::prelude::*;
        batch.par_iter().map(reconstruct).collect()
    }
    #[cfg(not(feature = "parallel"))]
    {
        batch.iter().map(reconstruct).collect()
    }
}

/// Entropy decodes the blocks of one scan from `br` and writes their samples
/// into `image`.
///
/// A single component is coded non-interleaved, block by block over its own
/// grid. Several components are coded as interleaved MCUs, each contributing
/// its `h x v` blocks in raster order. Blocks are entropy decoded in bitstream
/// order one MCU row at a time, then reconstructed (in parallel with the
/// `parallel` feature) and scattered.
///
/// On a bitstream error the blocks decoded so far stay in `image`.
pub fn decode_scan<D: SymbolDecoder, T: InverseTransform + Sync>(
    br: &mut BitReader,
    layout: &FrameLayout,
    components: &[ScanComponent<D>],
    transform: &T,
    image: &mut Image,
) -> Result<()> {
    if image.size() != layout.size() || image.num_components() != layout.num_components() {
        return Err(Error::ImageLayoutMismatch(
            image.size().0,
            image.size().1,
            image.num_components(),
        ));
    }
    if components.is_empty() || components.len() > MAX_COMPONENTS {
        return Err(Error::InvalidScanComponents(components.len()));
    }
    for (i, sc) in components.iter().enumerate() {
        if components[..i].iter().any(|o| o.component == sc.component) {
            return Err(Error::InvalidScanComponents(components.len()));
        }
    }
    let geometries = components
        .iter()
        .map(|sc| layout.geometry(sc.component))
        .collect::<Result<Vec<_>>>()?;
    let quant_tables: Vec<&QuantTable> = components.iter().map(|sc| sc.quant_table).collect();
    let mut predictors = vec![DcPredictor::new(); components.len()];

    // Each MCU row is decoded into `batch`, then reconstructed and scattered.
    let mut batch = vec![];
    let flush = |batch: &mut Vec<DecodedBlock>, image: &mut Image| -> Result<()> {
        let samples = reconstruct_batch(batch, &quant_tables, transform);
        for (block, samples) in batch.iter().zip(samples.iter()) {
            scatter_block(image, &geometries[block.scan_index], block.position, samples)?;
        }
        batch.clear();
        Ok(())
    };

    if let [sc] = components {
        let blocks = layout.component_blocks(sc.component)?;
        debug!(component = sc.component, ?blocks, "decoding non-interleaved scan");
        for by in 0..blocks.1 {
            let decoded: Result<()> = try_for_each_position((blocks.0, 1), |bx, _| {
                let coefficients = decode_block(sc.dc_table, sc.ac_table, br, &mut predictors[0])?;
                batch.push(DecodedBlock {
                    scan_index: 0,
                    position: (bx, by),
                    coefficients,
                });
                Ok(())
            });
            flush(&mut batch, image)?;
            decoded?;
        }
        return Ok(());
    }

    let sampling = components
        .iter()
        .map(|sc| layout.sampling(sc.component))
        .collect::<Result<Vec<_>>>()?;
    let blocks_in_mcu: usize = sampling.iter().map(|(h, v)| h * v).sum();
    if blocks_in_mcu > MAX_BLOCKS_IN_MCU {
        return Err(Error::TooManyBlocksInMcu(blocks_in_mcu));
    }
    let mcus = layout.mcu_count();
    debug!(?mcus, blocks_in_mcu, "decoding interleaved scan");
    batch.reserve(mcus.0 * blocks_in_mcu);
    for mcu_y in 0..mcus.1 {
        let decoded: Result<()> = try_for_each_position((mcus.0, 1), |mcu_x, _| {
            for (scan_index, sc) in components.iter().enumerate() {
                let (h, v) = sampling[scan_index];
                try_for_each_position((h, v), |bx, by| {
                    let coefficients =
                        decode_block(sc.dc_table, sc.ac_table, br, &mut predictors[scan_index])?;
                    batch.push(DecodedBlock {
                        scan_index,
                        position: (mcu_x * h + bx, mcu_y * v + by),
                        coefficients,
                    });
                    Ok::<(), Error>(())
                })?;
            }
            Ok(())
        });
        flush(&mut batch, image)?;
        decoded?;
    }
    trace!(bits = br.total_bits_read(), "scan done");
    Ok(())
}

/// Decodes a scan into a freshly allocated image of the layout's size.
pub fn decode_scan_to_image<D: SymbolDecoder, T: InverseTransform + Sync>(
    br: &mut BitReader,
    layout: &FrameLayout,
    components: &[ScanComponent<D>],
    transform: &T,
) -> Result<Image> {
    let mut image = Image::new(layout.size(), layout.num_components())?;
    decode_scan(br, layout, components, transform, &mut image)?;
    Ok(image)
}

#[cfg(test)]
mod test {
    use super::*;
    use crate::entropy_coding::{huffman::HuffmanTable, standard_tables::StandardTable};
    use jpegrecon_test_utils::{BitWriter, canonical_code};
    use test_log::test;

    fn identity(_: &mut [i32; BLOCK_SIZE]) {}

    /// Writes the code of `symbol` in `table`.
    fn write_symbol(w: &mut BitWriter, table: StandardTable, symbol: u8) {
        let (counts, values) = table.counts_and_values();
        let (code, len) = canonical_code(counts, values, symbol).unwrap();
        w.write(len, code);
    }

    /// Writes a block whose only non-zero coefficient is a DC difference of
    /// category 0..=2, coded with the standard luminance tables.
    fn write_dc_only(w: &mut BitWriter, diff: i32) {
        match diff {
            0 => write_symbol(w, StandardTable::LuminanceDc, 0),
            1 | -1 => {
                write_symbol(w, StandardTable::LuminanceDc, 1);
                w.write(1, (diff > 0) as u32);
            }
            _ => {
                write_symbol(w, StandardTable::LuminanceDc, 2);
                w.write(2, if diff > 0 { diff as u32 } else { (diff + 3) as u32 });
            }
        }
        write_symbol(w, StandardTable::LuminanceAc, 0x00);
    }

    struct Tables {
        dc: HuffmanTable,
        ac: HuffmanTable,
        quant: QuantTable,
    }

    fn tables() -> Result<Tables> {
        Ok(Tables {
            dc: StandardTable::LuminanceDc.build()?,
            ac: StandardTable::LuminanceAc.build()?,
            quant: QuantTable::identity(),
        })
    }

    fn scan_component(tables: &Tables, component: usize) -> ScanComponent<'_, HuffmanTable> {
        ScanComponent {
            component,
            quant_table: &tables.quant,
            dc_table: &tables.dc,
            ac_table: &tables.ac,
        }
    }

    #[test]
    fn layout_geometry() -> Result<()> {
        let layout = FrameLayout::new((35, 17), &[(2, 2), (1, 1), (1, 1)])?;
        assert_eq!(layout.max_sampling(), (2, 2));
        assert_eq!(layout.mcu_size(), (16, 16));
        assert_eq!(layout.mcu_count(), (3, 2));
        assert_eq!(layout.component_size(0)?, (35, 17));
        assert_eq!(layout.component_size(1)?, (18, 9));
        assert_eq!(layout.component_blocks(0)?, (5, 3));
        assert_eq!(layout.component_blocks(2)?, (3, 2));
        assert_eq!(layout.geometry(0)?.upsampling(), (1, 1));
        assert_eq!(layout.geometry(1)?.upsampling(), (2, 2));
        assert!(layout.geometry(3).is_err());
        Ok(())
    }

    #[test]
    fn oversized_layout_is_rejected() -> Result<()> {
        assert!(matches!(
            FrameLayout::new((usize::MAX, 1), &[(2, 2), (1, 1)]),
            Err(Error::ImageSizeTooLarge(usize::MAX, 1))
        ));
        assert!(matches!(
            FrameLayout::new((1, usize::MAX / 8), &[(1, 1)]),
            Err(Error::ImageSizeTooLarge(1, _))
        ));
        // The largest accepted size still has a block grid.
        let largest = usize::MAX / (MAX_SAMPLING_FACTOR * BLOCK_DIM);
        let layout = FrameLayout::new((largest, 1), &[(4, 1), (1, 1)])?;
        assert_eq!(layout.component_size(0)?, (largest, 1));
        assert_eq!(layout.component_blocks(1)?.0, largest.div_ceil(4).div_ceil(8));
        assert_eq!(layout.mcu_count().0, largest.div_ceil(32));
        Ok(())
    }

    #[test]
    fn invalid_layouts() {
        assert!(matches!(
            FrameLayout::new((8, 8), &[]),
            Err(Error::InvalidComponentCount(0))
        ));
        assert!(matches!(
            FrameLayout::new((8, 8), &[(1, 1); 5]),
            Err(Error::InvalidComponentCount(5))
        ));
        assert!(matches!(
            FrameLayout::new((8, 8), &[(5, 1)]),
            Err(Error::InvalidSampling(5, 1))
        ));
        assert!(matches!(
            FrameLayout::new((8, 8), &[(1, 0)]),
            Err(Error::InvalidSampling(1, 0))
        ));
        assert!(matches!(
            FrameLayout::new((8, 8), &[(3, 1), (2, 1)]),
            Err(Error::NonIntegralUpsampling(2, 3))
        ));
        assert!(matches!(
            FrameLayout::new((0, 8), &[(1, 1)]),
            Err(Error::InvalidImageSize(0, 8))
        ));
    }

    #[test]
    fn dc_only_block_with_identity_stages() -> Result<()> {
        // Category 3 (code "100" in the standard table), then "101" = 5, then EOB.
        let mut w = BitWriter::new();
        write_symbol(&mut w, StandardTable::LuminanceDc, 3);
        w.write_str("1 01");
        write_symbol(&mut w, StandardTable::LuminanceAc, 0x00);
        let data = w.finish();
        let tables = tables()?;
        let layout = FrameLayout::new((8, 8), &[(1, 1)])?;
        // Spreads the DC value over the whole block.
        let flat = |b: &mut [i32; BLOCK_SIZE]| *b = [b[0]; BLOCK_SIZE];
        let image = decode_scan_to_image(
            &mut BitReader::new(&data),
            &layout,
            &[scan_component(&tables, 0)],
            &flat,
        )?;
        assert_eq!(image.data(), [5; BLOCK_SIZE]);
        Ok(())
    }

    #[test]
    fn dc_prediction_runs_across_blocks() -> Result<()> {
        let mut w = BitWriter::new();
        for diff in [2, -1, 0, 3] {
            write_dc_only(&mut w, diff);
        }
        let data = w.finish();
        let tables = tables()?;
        let layout = FrameLayout::new((16, 16), &[(1, 1)])?;
        let dc = |b: &mut [i32; BLOCK_SIZE]| *b = [b[0]; BLOCK_SIZE];
        let image = decode_scan_to_image(
            &mut BitReader::new(&data),
            &layout,
            &[scan_component(&tables, 0)],
            &dc,
        )?;
        for (x, y, expected) in [(0, 0, 2), (8, 0, 1), (0, 8, 1), (8, 8, 4)] {
            assert_eq!(image.sample((x, y), 0).unwrap(), expected);
            assert_eq!(image.sample((x + 7, y + 7), 0).unwrap(), expected);
        }
        Ok(())
    }

    #[test]
    fn interleaved_420() -> Result<()> {
        // One 16x16 MCU: four luma blocks, then one block of each chroma.
        let mut w = BitWriter::new();
        for diff in [1, 1, 1, 1, 2, -2] {
            write_dc_only(&mut w, diff);
        }
        let data = w.finish();
        let tables = tables()?;
        let layout = FrameLayout::new((16, 16), &[(2, 2), (1, 1), (1, 1)])?;
        let dc = |b: &mut [i32; BLOCK_SIZE]| *b = [b[0]; BLOCK_SIZE];
        let components = [
            scan_component(&tables, 0),
            scan_component(&tables, 1),
            scan_component(&tables, 2),
        ];
        let mut br = BitReader::new(&data);
        let image = decode_scan_to_image(&mut br, &layout, &components, &dc)?;
        // Luma DC runs 1, 2, 3, 4 over the four blocks in raster order.
        for y in 0..16 {
            for x in 0..16 {
                let luma = 1 + x / 8 + 2 * (y / 8);
                assert_eq!(image.sample((x, y), 0).unwrap(), luma as u8);
                // Each chroma block covers the whole MCU; negative clamps to 0.
                assert_eq!(image.sample((x, y), 1).unwrap(), 2);
                assert_eq!(image.sample((x, y), 2).unwrap(), 0);
            }
        }
        Ok(())
    }

    #[test]
    fn non_interleaved_component_of_multi_component_frame() -> Result<()> {
        // The second component of a 4:2:0 frame of 24x8 is 12x4 samples: two
        // blocks, upsampled 2x2 into the image.
        let mut w = BitWriter::new();
        write_dc_only(&mut w, 1);
        write_dc_only(&mut w, 2);
        let data = w.finish();
        let tables = tables()?;
        let layout = FrameLayout::new((24, 8), &[(2, 2), (1, 1)])?;
        let mut image = Image::new((24, 8), 2)?;
        let dc = |b: &mut [i32; BLOCK_SIZE]| *b = [b[0]; BLOCK_SIZE];
        decode_scan(
            &mut BitReader::new(&data),
            &layout,
            &[scan_component(&tables, 1)],
            &dc,
            &mut image,
        )?;
        for y in 0..8 {
            for x in 0..24 {
                assert_eq!(image.sample((x, y), 0).unwrap(), 0);
                assert_eq!(image.sample((x, y), 1).unwrap(), if x < 16 { 1 } else { 3 });
            }
        }
        Ok(())
    }

    #[test]
    fn truncated_scan_keeps_decoded_rows() -> Result<()> {
        let mut w = BitWriter::new();
        write_dc_only(&mut w, 2);
        write_dc_only(&mut w, 0);
        let data = w.finish();
        let tables = tables()?;
        let layout = FrameLayout::new((16, 16), &[(1, 1)])?;
        let mut image = Image::new((16, 16), 1)?;
        let dc = |b: &mut [i32; BLOCK_SIZE]| *b = [b[0]; BLOCK_SIZE];
        let result = decode_scan(
            &mut BitReader::new(&data),
            &layout,
            &[scan_component(&tables, 0)],
            &dc,
            &mut image,
        );
        assert!(result.is_err());
        assert_eq!(image.sample((0, 0), 0).unwrap(), 2);
        assert_eq!(image.sample((15, 7), 0).unwrap(), 2);
        assert_eq!(image.sample((0, 8), 0).unwrap(), 0);
        Ok(())
    }

    #[test]
    fn invalid_scans() -> Result<()> {
        let tables = tables()?;
        let layout = FrameLayout::new((16, 16), &[(1, 1), (1, 1)])?;
        let mut image = Image::new((16, 16), 2)?;
        let run = |components: &[ScanComponent<HuffmanTable>], image: &mut Image| -> Result<()> {
            decode_scan(&mut BitReader::new(&[]), &layout, components, &identity, image)
        };
        assert!(matches!(
            run(&[], &mut image),
            Err(Error::InvalidScanComponents(0))
        ));
        assert!(matches!(
            run(&[scan_component(&tables, 2)], &mut image),
            Err(Error::InvalidComponent(2, 2))
        ));
        assert!(matches!(
            run(
                &[scan_component(&tables, 1), scan_component(&tables, 1)],
                &mut image
            ),
            Err(Error::InvalidScanComponents(2))
        ));
        assert!(matches!(
            run(&[scan_component(&tables, 0)], &mut Image::new((8, 16), 2)?),
            Err(Error::ImageLayoutMismatch(8, 16, 2))
        ));

        let layout = FrameLayout::new((16, 16), &[(4, 2), (2, 2), (1, 1)])?;
        let mut image = Image::new((16, 16), 3)?;
        let components = [
            scan_component(&tables, 0),
            scan_component(&tables, 1),
            scan_component(&tables, 2),
        ];
        assert!(matches!(
            decode_scan(&mut BitReader::new(&[]), &layout, &components, &identity, &mut image),
            Err(Error::TooManyBlocksInMcu(13))
        ));
        Ok(())
    }

    #[test]
    fn reference_idct_dc_only() -> Result<()> {
        // DC of 8 * 5 reconstructs to 128 + 5 everywhere.
        let mut w = BitWriter::new();
        write_symbol(&mut w, StandardTable::LuminanceDc, 6);
        w.write(6, 40);
        write_symbol(&mut w, StandardTable::LuminanceAc, 0x00);
        let data = w.finish();
        let tables = tables()?;
        let layout = FrameLayout::new((5, 5), &[(1, 1)])?;
        let image = decode_scan_to_image(
            &mut BitReader::new(&data),
            &layout,
            &[scan_component(&tables, 0)],
            &crate::transform::Idct,
        )?;
        assert_eq!(image.data(), [133; 25]);
        Ok(())
    }
}
