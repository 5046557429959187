/*
 * // Copyright (c) the yuvops contributors. All rights reserved.
 * //
 * // Use of this source code is governed by a BSD-style
 * // license that can be found in the LICENSE file.
 */
use crate::yuv_error::check_plane;
use crate::yuv_support::ChromaSubsampling;
use crate::ConvertError;
use std::fmt::Debug;

/// Destination plane storage: either borrowed caller memory or an owned
/// allocation made on the caller's behalf by [`BiPlanarImageMut::alloc`] and
/// friends. The kernels themselves never allocate.
#[derive(Debug)]
pub enum BufferStoreMut<'a, T: Copy + Debug> {
    Borrowed(&'a mut [T]),
    Owned(Vec<T>),
}

impl<T: Copy + Debug> BufferStoreMut<'_, T> {
    pub fn borrow(&self) -> &[T] {
        match self {
            Self::Borrowed(p_ref) => p_ref,
            Self::Owned(vec) => vec,
        }
    }

    pub fn as_mut(&mut self) -> &mut [T] {
        match self {
            Self::Borrowed(p_ref) => p_ref,
            Self::Owned(vec) => vec,
        }
    }
}

const fn interleaved_chroma_row(width: u32, subsampling: ChromaSubsampling) -> usize {
    match subsampling {
        ChromaSubsampling::Yuv420 => (width as usize).div_ceil(2) * 2,
        ChromaSubsampling::Yuv444 => width as usize * 2,
    }
}

const fn chroma_rows(height: u32, subsampling: ChromaSubsampling) -> usize {
    match subsampling {
        ChromaSubsampling::Yuv420 => (height as usize).div_ceil(2),
        ChromaSubsampling::Yuv444 => height as usize,
    }
}

#[derive(Debug, Clone)]
/// Non-mutable representation of a bi-planar (luma + interleaved chroma) image.
///
/// `T` is `u8` for NV12 and `u16` for P016.
pub struct BiPlanarImage<'a, T>
where
    T: Copy + Debug,
{
    pub y_plane: &'a [T],
    /// Stride here always means elements per row.
    pub y_stride: u32,
    pub uv_plane: &'a [T],
    /// Stride here always means elements per row.
    pub uv_stride: u32,
    pub width: u32,
    pub height: u32,
}

impl<T> BiPlanarImage<'_, T>
where
    T: Copy + Debug,
{
    pub fn check_constraints(&self, subsampling: ChromaSubsampling) -> Result<(), ConvertError> {
        check_plane(
            self.y_plane,
            self.y_stride,
            self.width as usize,
            self.height as usize,
        )?;
        check_plane(
            self.uv_plane,
            self.uv_stride,
            interleaved_chroma_row(self.width, subsampling),
            chroma_rows(self.height, subsampling),
        )?;
        Ok(())
    }
}

#[derive(Debug)]
/// Mutable representation of a bi-planar image.
pub struct BiPlanarImageMut<'a, T>
where
    T: Copy + Debug,
{
    pub y_plane: BufferStoreMut<'a, T>,
    /// Stride here always means elements per row.
    pub y_stride: u32,
    pub uv_plane: BufferStoreMut<'a, T>,
    /// Stride here always means elements per row.
    pub uv_stride: u32,
    pub width: u32,
    pub height: u32,
}

impl<T> BiPlanarImageMut<'_, T>
where
    T: Copy + Debug,
{
    pub fn check_constraints(&self, subsampling: ChromaSubsampling) -> Result<(), ConvertError> {
        check_plane(
            self.y_plane.borrow(),
            self.y_stride,
            self.width as usize,
            self.height as usize,
        )?;
        check_plane(
            self.uv_plane.borrow(),
            self.uv_stride,
            interleaved_chroma_row(self.width, subsampling),
            chroma_rows(self.height, subsampling),
        )?;
        Ok(())
    }
}

impl<'a, T> BiPlanarImageMut<'a, T>
where
    T: Default + Clone + Copy + Debug,
{
    /// Allocates a mutable bi-planar image with the required chroma subsampling.
    pub fn alloc(width: u32, height: u32, subsampling: ChromaSubsampling) -> Self {
        let chroma_width = interleaved_chroma_row(width, subsampling);
        let chroma_height = chroma_rows(height, subsampling);
        let y_target = vec![T::default(); width as usize * height as usize];
        let chroma_target = vec![T::default(); chroma_width * chroma_height];
        BiPlanarImageMut {
            y_plane: BufferStoreMut::Owned(y_target),
            y_stride: width,
            uv_plane: BufferStoreMut::Owned(chroma_target),
            uv_stride: chroma_width as u32,
            width,
            height,
        }
    }

    pub fn to_fixed(&'a self) -> BiPlanarImage<'a, T> {
        BiPlanarImage {
            y_plane: self.y_plane.borrow(),
            y_stride: self.y_stride,
            uv_plane: self.uv_plane.borrow(),
            uv_stride: self.uv_stride,
            width: self.width,
            height: self.height,
        }
    }
}

#[derive(Debug, Clone)]
/// Non-mutable representation of a three-plane YUV image.
pub struct PlanarImage<'a, T>
where
    T: Copy + Debug,
{
    pub y_plane: &'a [T],
    /// Stride here always means elements per row.
    pub y_stride: u32,
    pub u_plane: &'a [T],
    /// Stride here always means elements per row.
    pub u_stride: u32,
    pub v_plane: &'a [T],
    /// Stride here always means elements per row.
    pub v_stride: u32,
    pub width: u32,
    pub height: u32,
}

impl<T> PlanarImage<'_, T>
where
    T: Copy + Debug,
{
    pub fn check_constraints(&self, subsampling: ChromaSubsampling) -> Result<(), ConvertError> {
        check_plane(
            self.y_plane,
            self.y_stride,
            self.width as usize,
            self.height as usize,
        )?;
        let chroma_row = match subsampling {
            ChromaSubsampling::Yuv420 => (self.width as usize).div_ceil(2),
            ChromaSubsampling::Yuv444 => self.width as usize,
        };
        let rows = chroma_rows(self.height, subsampling);
        check_plane(self.u_plane, self.u_stride, chroma_row, rows)?;
        check_plane(self.v_plane, self.v_stride, chroma_row, rows)?;
        Ok(())
    }
}

#[derive(Debug)]
/// Mutable representation of a three-plane YUV image.
pub struct PlanarImageMut<'a, T>
where
    T: Copy + Debug,
{
    pub y_plane: BufferStoreMut<'a, T>,
    /// Stride here always means elements per row.
    pub y_stride: u32,
    pub u_plane: BufferStoreMut<'a, T>,
    /// Stride here always means elements per row.
    pub u_stride: u32,
    pub v_plane: BufferStoreMut<'a, T>,
    /// Stride here always means elements per row.
    pub v_stride: u32,
    pub width: u32,
    pub height: u32,
}

impl<T> PlanarImageMut<'_, T>
where
    T: Copy + Debug,
{
    pub fn check_constraints(&self, subsampling: ChromaSubsampling) -> Result<(), ConvertError> {
        check_plane(
            self.y_plane.borrow(),
            self.y_stride,
            self.width as usize,
            self.height as usize,
        )?;
        let chroma_row = match subsampling {
            ChromaSubsampling::Yuv420 => (self.width as usize).div_ceil(2),
            ChromaSubsampling::Yuv444 => self.width as usize,
        };
        let rows = chroma_rows(self.height, subsampling);
        check_plane(self.u_plane.borrow(), self.u_stride, chroma_row, rows)?;
        check_plane(self.v_plane.borrow(), self.v_stride, chroma_row, rows)?;
        Ok(())
    }
}

impl<'a, T> PlanarImageMut<'a, T>
where
    T: Default + Clone + Copy + Debug,
{
    /// Allocates a mutable three-plane image with the required chroma subsampling.
    pub fn alloc(width: u32, height: u32, subsampling: ChromaSubsampling) -> Self {
        let chroma_width = match subsampling {
            ChromaSubsampling::Yuv420 => (width as usize).div_ceil(2),
            ChromaSubsampling::Yuv444 => width as usize,
        };
        let chroma_height = chroma_rows(height, subsampling);
        let y_target = vec![T::default(); width as usize * height as usize];
        let u_target = vec![T::default(); chroma_width * chroma_height];
        let v_target = vec![T::default(); chroma_width * chroma_height];
        Self {
            y_plane: BufferStoreMut::Owned(y_target),
            y_stride: width,
            u_plane: BufferStoreMut::Owned(u_target),
            u_stride: chroma_width as u32,
            v_plane: BufferStoreMut::Owned(v_target),
            v_stride: chroma_width as u32,
            width,
            height,
        }
    }

    pub fn to_fixed(&'a self) -> PlanarImage<'a, T> {
        PlanarImage {
            y_plane: self.y_plane.borrow(),
            y_stride: self.y_stride,
            u_plane: self.u_plane.borrow(),
            u_stride: self.u_stride,
            v_plane: self.v_plane.borrow(),
            v_stride: self.v_stride,
            width: self.width,
            height: self.height,
        }
    }
}

#[derive(Debug)]
/// Mutable destination for the planar RGB converters: three independently
/// strided full-resolution 8-bit planes.
pub struct RgbPlanarImageMut<'a> {
    pub r_plane: BufferStoreMut<'a, u8>,
    /// Stride here always means elements per row.
    pub r_stride: u32,
    pub g_plane: BufferStoreMut<'a, u8>,
    /// Stride here always means elements per row.
    pub g_stride: u32,
    pub b_plane: BufferStoreMut<'a, u8>,
    /// Stride here always means elements per row.
    pub b_stride: u32,
    pub width: u32,
    pub height: u32,
}

impl RgbPlanarImageMut<'_> {
    pub fn check_constraints(&self) -> Result<(), ConvertError> {
        let width = self.width as usize;
        let rows = self.height as usize;
        check_plane(self.r_plane.borrow(), self.r_stride, width, rows)?;
        check_plane(self.g_plane.borrow(), self.g_stride, width, rows)?;
        check_plane(self.b_plane.borrow(), self.b_stride, width, rows)?;
        Ok(())
    }

    /// Allocates three tightly packed planes.
    pub fn alloc(width: u32, height: u32) -> Self {
        let size = width as usize * height as usize;
        Self {
            r_plane: BufferStoreMut::Owned(vec![0u8; size]),
            r_stride: width,
            g_plane: BufferStoreMut::Owned(vec![0u8; size]),
            g_stride: width,
            b_plane: BufferStoreMut::Owned(vec![0u8; size]),
            b_stride: width,
            width,
            height,
        }
    }
}
