// Copyright (c) the JPEG XL Project Authors. All rights reserved.
//
// Use of this source code is governed by a BSD-style
// license that can be found in the LICENSE file.

//! Placement of reconstructed blocks into the interleaved image, with
//! pixel replication for subsampled components.

use crate::{
    BLOCK_DIM, BLOCK_SIZE,
    error::{Error, Result},
    image::Image,
    util::for_each_position,
};

/// Where the samples of one component land in the image.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ComponentGeometry {
    num_components: usize,
    component: usize,
    /// Horizontal and vertical replication of every sample.
    upsampling: (usize, usize),
}

impl ComponentGeometry {
    pub fn new(
        num_components: usize,
        component: usize,
        upsampling: (usize, usize),
    ) -> Result<ComponentGeometry> {
        if component >= num_components {
            return Err(Error::InvalidComponent(component, num_components));
        }
        if upsampling.0 == 0 || upsampling.1 == 0 {
            return Err(Error::InvalidSampling(upsampling.0, upsampling.1));
        }
        Ok(ComponentGeometry {
            num_components,
            component,
            upsampling,
        })
    }

    pub fn num_components(&self) -> usize {
        self.num_components
    }

    pub fn component(&self) -> usize {
        self.component
    }

    pub fn upsampling(&self) -> (usize, usize) {
        self.upsampling
    }
}

/// Writes the 64 spatial samples of the block at `block` (in block units of
/// the component's grid) into `image`.
///
/// Samples are clamped to `0..=255` and each one fills a
/// `upsampling.0 x upsampling.1` rectangle. Pixels outside the image are
/// skipped, including those whose coordinates do not fit `usize`.
pub fn scatter_block(
    image: &mut Image,
    geometry: &ComponentGeometry,
    block: (usize, usize),
    samples: &[i32; BLOCK_SIZE],
) -> Result<()> {
    if geometry.num_components != image.num_components() {
        return Err(Error::InvalidComponent(
            geometry.component,
            image.num_components(),
        ));
    }
    let (width, height) = image.size();
    let num_components = geometry.num_components;
    let component = geometry.component;
    let (wc, hc) = geometry.upsampling;
    let data = image.data_mut();
    let block_x = block.0.saturating_mul(BLOCK_DIM);
    let block_y = block.1.saturating_mul(BLOCK_DIM);

    for_each_position((BLOCK_DIM, BLOCK_DIM), |i, j| {
        let value = samples[j * BLOCK_DIM + i].clamp(0, 255) as u8;
        let x0 = block_x.saturating_add(i).saturating_mul(wc);
        let y0 = block_y.saturating_add(j).saturating_mul(hc);
        if x0 >= width || y0 >= height {
            return;
        }
        let visible = (wc.min(width - x0), hc.min(height - y0));
        for_each_position(visible, |dx, dy| {
            let (x, y) = (x0 + dx, y0 + dy);
            data[(x + y * width) * num_components + component] = value;
        });
    });
    Ok(())
}
