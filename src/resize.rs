/*
 * // Copyright (c) the yuvops contributors. All rights reserved.
 * //
 * // Use of this source code is governed by a BSD-style
 * // license that can be found in the LICENSE file.
 */
use crate::images::{BiPlanarImage, BiPlanarImageMut};
use crate::yuv_error::check_even_dimensions;
use crate::yuv_support::ChromaSubsampling;
use crate::ConvertError;
use num_traits::AsPrimitive;
#[cfg(feature = "rayon")]
use rayon::iter::{IndexedParallelIterator, ParallelIterator};
#[cfg(feature = "rayon")]
use rayon::prelude::ParallelSliceMut;
use std::fmt::Debug;

/// One bilinear tap: the two source indices to blend and the Q16 weight of
/// the second one.
#[inline]
fn tap(dst_index: usize, src_size: usize, dst_size: usize) -> (usize, usize, u64) {
    // Destination pixel centers map through (d + 0.5) * scale - 0.5, kept in
    // Q16 so a unit scale produces a zero fraction and an exact copy.
    let pos = (((2 * dst_index as i128 + 1) * src_size as i128) << 15) / dst_size as i128
        - (1i128 << 15);
    let pos = pos.max(0) as u64;
    let i0 = ((pos >> 16) as usize).min(src_size - 1);
    let i1 = (i0 + 1).min(src_size - 1);
    (i0, i1, pos & 0xFFFF)
}

/// Resizes one strided component with a bilinear filter, clamping reads to
/// the source edges. `SRC_STEP`/`DST_STEP` select between planar traffic and
/// one half of an interleaved chroma plane.
pub(crate) fn resize_plane_bilinear<T, const SRC_STEP: usize, const DST_STEP: usize>(
    src: &[T],
    src_stride: usize,
    src_offset: usize,
    src_width: usize,
    src_height: usize,
    dst: &mut [T],
    dst_stride: usize,
    dst_offset: usize,
    dst_width: usize,
    dst_height: usize,
) where
    T: Copy + Debug + Send + Sync + 'static + AsPrimitive<u64>,
    u64: AsPrimitive<T>,
{
    let x_taps: Vec<(usize, usize, u64)> = (0..dst_width)
        .map(|x| tap(x, src_width, dst_width))
        .collect();

    let dst = &mut dst[..dst_stride * dst_height];

    let iter;
    #[cfg(feature = "rayon")]
    {
        iter = dst.par_chunks_exact_mut(dst_stride).enumerate();
    }
    #[cfg(not(feature = "rayon"))]
    {
        iter = dst.chunks_exact_mut(dst_stride).enumerate();
    }
    iter.for_each(|(dy, dst_row)| {
        let (y0, y1, fy) = tap(dy, src_height, dst_height);
        let wy1 = fy;
        let wy0 = 65536 - fy;
        let row0 = &src[y0 * src_stride..];
        let row1 = &src[y1 * src_stride..];
        for (dx, &(x0, x1, fx)) in x_taps.iter().enumerate() {
            let wx1 = fx;
            let wx0 = 65536 - fx;
            let s00: u64 = row0[src_offset + x0 * SRC_STEP].as_();
            let s01: u64 = row0[src_offset + x1 * SRC_STEP].as_();
            let s10: u64 = row1[src_offset + x0 * SRC_STEP].as_();
            let s11: u64 = row1[src_offset + x1 * SRC_STEP].as_();
            let top = s00 * wx0 + s01 * wx1;
            let bottom = s10 * wx0 + s11 * wx1;
            let value = top * wy0 + bottom * wy1;
            dst_row[dst_offset + dx * DST_STEP] = ((value + (1u64 << 31)) >> 32).as_();
        }
    });
}

fn resize_biplanar_impl<T>(
    src: &BiPlanarImage<T>,
    dst: &mut BiPlanarImageMut<T>,
) -> Result<(), ConvertError>
where
    T: Copy + Debug + Send + Sync + 'static + AsPrimitive<u64>,
    u64: AsPrimitive<T>,
{
    check_even_dimensions(src.width, src.height)?;
    check_even_dimensions(dst.width, dst.height)?;
    src.check_constraints(ChromaSubsampling::Yuv420)?;
    dst.check_constraints(ChromaSubsampling::Yuv420)?;

    resize_plane_bilinear::<T, 1, 1>(
        src.y_plane,
        src.y_stride as usize,
        0,
        src.width as usize,
        src.height as usize,
        dst.y_plane.as_mut(),
        dst.y_stride as usize,
        0,
        dst.width as usize,
        dst.height as usize,
    );

    // The chroma plane is resized independently at half resolution; each
    // interleaved component keeps its own taps so block alignment survives.
    let src_cw = src.width as usize / 2;
    let src_ch = src.height as usize / 2;
    let dst_cw = dst.width as usize / 2;
    let dst_ch = dst.height as usize / 2;
    for component in 0..2usize {
        resize_plane_bilinear::<T, 2, 2>(
            src.uv_plane,
            src.uv_stride as usize,
            component,
            src_cw,
            src_ch,
            dst.uv_plane.as_mut(),
            dst.uv_stride as usize,
            component,
            dst_cw,
            dst_ch,
        );
    }
    Ok(())
}

/// Resize a YUV NV12 image to arbitrary even dimensions with a bilinear
/// filter. Sampling outside the source clamps to the nearest edge pixel, and
/// a resize to identical dimensions is an exact copy.
///
/// The destination chroma plane may live in the same allocation right after
/// the luma rows or in a separate caller-supplied buffer; both are expressed
/// through [`BiPlanarImageMut`].
///
/// # Errors
///
/// Fails before any write if either geometry has odd or zero dimensions or a
/// plane inconsistent with its declared stride.
pub fn resize_nv12(
    src: &BiPlanarImage<u8>,
    dst: &mut BiPlanarImageMut<u8>,
) -> Result<(), ConvertError> {
    resize_biplanar_impl(src, dst)
}

/// Resize a YUV P016 image to arbitrary even dimensions with a bilinear
/// filter, 16-bit samples.
///
/// # Errors
///
/// Fails before any write if either geometry has odd or zero dimensions or a
/// plane inconsistent with its declared stride.
pub fn resize_p016(
    src: &BiPlanarImage<u16>,
    dst: &mut BiPlanarImageMut<u16>,
) -> Result<(), ConvertError> {
    resize_biplanar_impl(src, dst)
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::Rng;

    #[test]
    fn identity_resize_is_bit_exact() {
        let mut rng = rand::rng();
        let width = 32u32;
        let height = 24u32;
        let y_plane: Vec<u8> = (0..width * height).map(|_| rng.random()).collect();
        let uv_plane: Vec<u8> = (0..width * height / 2).map(|_| rng.random()).collect();
        let src = BiPlanarImage {
            y_plane: &y_plane,
            y_stride: width,
            uv_plane: &uv_plane,
            uv_stride: width,
            width,
            height,
        };
        let mut dst = BiPlanarImageMut::<u8>::alloc(width, height, ChromaSubsampling::Yuv420);
        resize_nv12(&src, &mut dst).unwrap();
        assert_eq!(dst.y_plane.borrow(), &y_plane[..]);
        assert_eq!(dst.uv_plane.borrow(), &uv_plane[..]);
    }

    #[test]
    fn identity_resize_is_bit_exact_p016() {
        let mut rng = rand::rng();
        let width = 16u32;
        let height = 8u32;
        let y_plane: Vec<u16> = (0..width * height).map(|_| rng.random()).collect();
        let uv_plane: Vec<u16> = (0..width * height / 2).map(|_| rng.random()).collect();
        let src = BiPlanarImage {
            y_plane: &y_plane,
            y_stride: width,
            uv_plane: &uv_plane,
            uv_stride: width,
            width,
            height,
        };
        let mut dst = BiPlanarImageMut::<u16>::alloc(width, height, ChromaSubsampling::Yuv420);
        resize_p016(&src, &mut dst).unwrap();
        assert_eq!(dst.y_plane.borrow(), &y_plane[..]);
        assert_eq!(dst.uv_plane.borrow(), &uv_plane[..]);
    }

    #[test]
    fn constant_frame_stays_constant_at_any_scale() {
        let width = 16u32;
        let height = 16u32;
        let y_plane = vec![180u8; (width * height) as usize];
        let uv_plane = vec![90u8; (width * height / 2) as usize];
        let src = BiPlanarImage {
            y_plane: &y_plane,
            y_stride: width,
            uv_plane: &uv_plane,
            uv_stride: width,
            width,
            height,
        };
        for (dw, dh) in [(32u32, 32u32), (8, 8), (24, 10), (4, 30)] {
            let mut dst = BiPlanarImageMut::<u8>::alloc(dw, dh, ChromaSubsampling::Yuv420);
            resize_nv12(&src, &mut dst).unwrap();
            assert!(dst.y_plane.borrow().iter().all(|&v| v == 180));
            assert!(dst.uv_plane.borrow().iter().all(|&v| v == 90));
        }
    }

    #[test]
    fn doubling_keeps_corner_pixels() {
        // With pixel-center mapping the outermost destination samples clamp
        // onto the source corners.
        let y_plane = [10u8, 20, 30, 40];
        let uv_plane = [100u8, 200];
        let src = BiPlanarImage {
            y_plane: &y_plane,
            y_stride: 2,
            uv_plane: &uv_plane,
            uv_stride: 2,
            width: 2,
            height: 2,
        };
        let mut dst = BiPlanarImageMut::<u8>::alloc(4, 4, ChromaSubsampling::Yuv420);
        resize_nv12(&src, &mut dst).unwrap();
        let y = dst.y_plane.borrow();
        assert_eq!(y[0], 10);
        assert_eq!(y[3], 20);
        assert_eq!(y[12], 30);
        assert_eq!(y[15], 40);
        // Interior samples interpolate between the corners.
        assert!(y[1] > 10 && y[1] < 20);
    }

    #[test]
    fn odd_destination_is_rejected() {
        let y_plane = [0u8; 4];
        let uv_plane = [0u8; 2];
        let src = BiPlanarImage {
            y_plane: &y_plane,
            y_stride: 2,
            uv_plane: &uv_plane,
            uv_stride: 2,
            width: 2,
            height: 2,
        };
        let mut y_dst = [0u8; 3 * 3];
        let mut uv_dst = [0u8; 4];
        let mut dst = BiPlanarImageMut {
            y_plane: crate::BufferStoreMut::Borrowed(&mut y_dst),
            y_stride: 3,
            uv_plane: crate::BufferStoreMut::Borrowed(&mut uv_dst),
            uv_stride: 4,
            width: 3,
            height: 3,
        };
        assert!(matches!(
            resize_nv12(&src, &mut dst),
            Err(ConvertError::InvalidDimensions { .. })
        ));
    }
}
