// Copyright (c) the JPEG XL Project Authors. All rights reserved.
//
// Use of this source code is governed by a BSD-style
// license that can be found in the LICENSE file.

use std::fmt::Debug;

use crate::{
    error::{Error, Result},
    util::tracing_wrappers::*,
};

pub const MAX_COMPONENTS: usize = 4;

/// 8-bit samples of all components, interleaved: the sample of component `c`
/// at `(x, y)` is at `(x + y * width) * num_components + c`.
#[derive(Clone, PartialEq, Eq)]
pub struct Image {
    size: (usize, usize),
    num_components: usize,
    data: Vec<u8>,
}

impl Debug for Image {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "u8 {}x{} with {} components",
            self.size.0, self.size.1, self.num_components
        )
    }
}

impl Image {
    pub fn new(size: (usize, usize), num_components: usize) -> Result<Image> {
        let (xsize, ysize) = size;
        if num_components == 0 || num_components > MAX_COMPONENTS {
            return Err(Error::InvalidComponentCount(num_components));
        }
        // These limits let us not worry about overflows.
        if xsize as u64 >= i64::MAX as u64 / 4 || ysize as u64 >= i64::MAX as u64 / 4 {
            return Err(Error::ImageSizeTooLarge(xsize, ysize));
        }
        let total_size = xsize
            .checked_mul(ysize)
            .and_then(|s| s.checked_mul(num_components))
            .ok_or(Error::ImageSizeTooLarge(xsize, ysize))?;
        if xsize == 0 || ysize == 0 {
            return Err(Error::InvalidImageSize(xsize, ysize));
        }
        debug!(xsize, ysize, num_components, "trying to allocate image");
        let mut data = vec![];
        data.try_reserve_exact(total_size)?;
        data.resize(total_size, 0);
        Ok(Image {
            size,
            num_components,
            data,
        })
    }

    pub fn size(&self) -> (usize, usize) {
        self.size
    }

    pub fn num_components(&self) -> usize {
        self.num_components
    }

    pub fn data(&self) -> &[u8] {
        &self.data
    }

    pub fn data_mut(&mut self) -> &mut [u8] {
        &mut self.data
    }

    pub fn into_data(self) -> Vec<u8> {
        self.data
    }

    /// Interleaved samples of row `y`.
    pub fn row(&self, y: usize) -> &[u8] {
        let stride = self.size.0 * self.num_components;
        &self.data[y * stride..(y + 1) * stride]
    }

    /// Returns `None` outside the image or for a missing component.
    pub fn sample(&self, (x, y): (usize, usize), component: usize) -> Option<u8> {
        if x >= self.size.0 || y >= self.size.1 || component >= self.num_components {
            return None;
        }
        Some(self.data[(x + y * self.size.0) * self.num_components + component])
    }

    /// Copies out the samples of one component.
    pub fn component_plane(&self, component: usize) -> Result<Vec<u8>> {
        if component >= self.num_components {
            return Err(Error::InvalidComponent(component, self.num_components));
        }
        Ok(self
            .data
            .iter()
            .skip(component)
            .step_by(self.num_components)
            .copied()
            .collect())
    }
}
