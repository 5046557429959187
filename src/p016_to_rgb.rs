/*
 * // Copyright (c) the yuvops contributors. All rights reserved.
 * //
 * // Use of this source code is governed by a BSD-style
 * // license that can be found in the LICENSE file.
 */
use crate::images::BiPlanarImage;
use crate::numerics::qrshr;
use crate::yuv_error::{check_even_dimensions, check_packed};
use crate::yuv_support::{
    get_inverse_transform, get_yuv_range, ChromaSubsampling, MatrixProfile, RgbPacking, YuvRange,
};
use crate::ConvertError;
use num_traits::AsPrimitive;
#[cfg(feature = "rayon")]
use rayon::iter::{IndexedParallelIterator, ParallelIterator};
#[cfg(feature = "rayon")]
use rayon::prelude::{ParallelSlice, ParallelSliceMut};
use std::fmt::Debug;

pub(crate) fn p016_to_rgbx_impl<
    V,
    const DESTINATION_CHANNELS: u8,
    const BIT_DEPTH: usize,
    const PRECISION: i32,
>(
    image: &BiPlanarImage<u16>,
    rgba: &mut [V],
    rgba_stride: u32,
    range: YuvRange,
    matrix: MatrixProfile,
) -> Result<(), ConvertError>
where
    V: Copy + Debug + Send + Sync + 'static,
    i32: AsPrimitive<V>,
{
    let dst_chans: RgbPacking = DESTINATION_CHANNELS.into();
    let channels = dst_chans.channels_count();

    check_even_dimensions(image.width, image.height)?;
    image.check_constraints(ChromaSubsampling::Yuv420)?;
    check_packed(rgba, rgba_stride, image.width, image.height, channels)?;

    let chroma_range = get_yuv_range(16, range);
    let kr_kb = matrix.kr_kb();
    let max_value: i32 = (1 << BIT_DEPTH) - 1;
    let transform = get_inverse_transform(
        max_value as u32,
        chroma_range.range_y,
        chroma_range.range_uv,
        kr_kb.kr,
        kr_kb.kb,
    )
    .to_integers(PRECISION as u32);
    let y_coef = transform.y_coef;
    let cr_coef = transform.cr_coef;
    let cb_coef = transform.cb_coef;
    let g_coef_1 = transform.g_coeff_1;
    let g_coef_2 = transform.g_coeff_2;

    let bias_y = chroma_range.bias_y as i32;
    let bias_uv = chroma_range.bias_uv as i32;

    let width = image.width as usize;
    let half_height = image.height as usize / 2;
    let y_stride = image.y_stride as usize;
    let uv_stride = image.uv_stride as usize;
    let rgba_stride = rgba_stride as usize;

    let y_plane = &image.y_plane[..y_stride * image.height as usize];
    let uv_plane = &image.uv_plane[..uv_stride * half_height];
    let rgba = &mut rgba[..rgba_stride * image.height as usize];

    let store_pixel = move |dst: &mut [V], y_vl: i32, cb: i32, cr: i32| {
        let y_value = (y_vl - bias_y) * y_coef;
        let r = qrshr::<PRECISION, BIT_DEPTH>(y_value + cr_coef * cr);
        let b = qrshr::<PRECISION, BIT_DEPTH>(y_value + cb_coef * cb);
        let g = qrshr::<PRECISION, BIT_DEPTH>(y_value - g_coef_1 * cr - g_coef_2 * cb);
        dst[dst_chans.r_offset()] = r.as_();
        dst[dst_chans.g_offset()] = g.as_();
        dst[dst_chans.b_offset()] = b.as_();
        if dst_chans.has_alpha() {
            dst[dst_chans.a_offset()] = max_value.as_();
        }
    };

    let iter;
    #[cfg(feature = "rayon")]
    {
        iter = y_plane
            .par_chunks_exact(y_stride * 2)
            .zip(uv_plane.par_chunks_exact(uv_stride))
            .zip(rgba.par_chunks_exact_mut(rgba_stride * 2));
    }
    #[cfg(not(feature = "rayon"))]
    {
        iter = y_plane
            .chunks_exact(y_stride * 2)
            .zip(uv_plane.chunks_exact(uv_stride))
            .zip(rgba.chunks_exact_mut(rgba_stride * 2));
    }
    iter.for_each(|((y_src, uv_src), rgba_rows)| {
        let (y_src0, y_src1) = y_src.split_at(y_stride);
        let (rgba0, rgba1) = rgba_rows.split_at_mut(rgba_stride);
        let y_src0 = &y_src0[..width];
        let y_src1 = &y_src1[..width];
        let uv_src = &uv_src[..width];
        let rgba0 = &mut rgba0[..width * channels];
        let rgba1 = &mut rgba1[..width * channels];

        for ((((rgba0, rgba1), y_src0), y_src1), uv) in rgba0
            .chunks_exact_mut(channels * 2)
            .zip(rgba1.chunks_exact_mut(channels * 2))
            .zip(y_src0.chunks_exact(2))
            .zip(y_src1.chunks_exact(2))
            .zip(uv_src.chunks_exact(2))
        {
            let cb = uv[0] as i32 - bias_uv;
            let cr = uv[1] as i32 - bias_uv;

            let (px00, px01) = rgba0.split_at_mut(channels);
            store_pixel(px00, y_src0[0] as i32, cb, cr);
            store_pixel(px01, y_src0[1] as i32, cb, cr);
            let (px10, px11) = rgba1.split_at_mut(channels);
            store_pixel(px10, y_src1[0] as i32, cb, cr);
            store_pixel(px11, y_src1[1] as i32, cb, cr);
        }
    });

    Ok(())
}

/// Convert YUV P016 format to RGB format.
///
/// This function takes YUV P016 data with 16-bit precision,
/// and converts it to RGB format with 8-bit per channel precision.
///
/// # Arguments
///
/// * `bi_planar_image` - Source bi-planar image.
/// * `rgb` - A mutable slice to store the converted RGB data.
/// * `rgb_stride` - The stride (components per row) for the RGB image data.
/// * `range` - The YUV range (limited or full).
/// * `matrix` - The conversion matrix profile.
///
/// # Errors
///
/// Fails before any write if the dimensions are odd or zero, or if any plane
/// or the destination is inconsistent with its declared stride.
pub fn p016_to_rgb(
    bi_planar_image: &BiPlanarImage<u16>,
    rgb: &mut [u8],
    rgb_stride: u32,
    range: YuvRange,
    matrix: MatrixProfile,
) -> Result<(), ConvertError> {
    p016_to_rgbx_impl::<u8, { RgbPacking::Rgb as u8 }, 8, 16>(
        bi_planar_image,
        rgb,
        rgb_stride,
        range,
        matrix,
    )
}

/// Convert YUV P016 format to BGRA format.
///
/// The narrowing from 16-bit samples runs through the conversion
/// coefficients, keeping full precision until the final rounding shift.
///
/// # Errors
///
/// Fails before any write if the dimensions are odd or zero, or if any plane
/// or the destination is inconsistent with its declared stride.
pub fn p016_to_bgra(
    bi_planar_image: &BiPlanarImage<u16>,
    bgra: &mut [u8],
    bgra_stride: u32,
    range: YuvRange,
    matrix: MatrixProfile,
) -> Result<(), ConvertError> {
    p016_to_rgbx_impl::<u8, { RgbPacking::Bgra as u8 }, 8, 16>(
        bi_planar_image,
        bgra,
        bgra_stride,
        range,
        matrix,
    )
}

/// Convert YUV P016 format to RGBA format.
///
/// # Errors
///
/// Fails before any write if the dimensions are odd or zero, or if any plane
/// or the destination is inconsistent with its declared stride.
pub fn p016_to_rgba(
    bi_planar_image: &BiPlanarImage<u16>,
    rgba: &mut [u8],
    rgba_stride: u32,
    range: YuvRange,
    matrix: MatrixProfile,
) -> Result<(), ConvertError> {
    p016_to_rgbx_impl::<u8, { RgbPacking::Rgba as u8 }, 8, 16>(
        bi_planar_image,
        rgba,
        rgba_stride,
        range,
        matrix,
    )
}

/// Convert YUV P016 format to ARGB format.
///
/// # Errors
///
/// Fails before any write if the dimensions are odd or zero, or if any plane
/// or the destination is inconsistent with its declared stride.
pub fn p016_to_argb(
    bi_planar_image: &BiPlanarImage<u16>,
    argb: &mut [u8],
    argb_stride: u32,
    range: YuvRange,
    matrix: MatrixProfile,
) -> Result<(), ConvertError> {
    p016_to_rgbx_impl::<u8, { RgbPacking::Argb as u8 }, 8, 16>(
        bi_planar_image,
        argb,
        argb_stride,
        range,
        matrix,
    )
}

/// Convert YUV P016 format to RGBA64 format (16 bits per channel).
///
/// # Errors
///
/// Fails before any write if the dimensions are odd or zero, or if any plane
/// or the destination is inconsistent with its declared stride.
pub fn p016_to_rgba64(
    bi_planar_image: &BiPlanarImage<u16>,
    rgba: &mut [u16],
    rgba_stride: u32,
    range: YuvRange,
    matrix: MatrixProfile,
) -> Result<(), ConvertError> {
    p016_to_rgbx_impl::<u16, { RgbPacking::Rgba as u8 }, 16, 13>(
        bi_planar_image,
        rgba,
        rgba_stride,
        range,
        matrix,
    )
}

/// Convert YUV P016 format to BGRA64 format (16 bits per channel).
///
/// # Errors
///
/// Fails before any write if the dimensions are odd or zero, or if any plane
/// or the destination is inconsistent with its declared stride.
pub fn p016_to_bgra64(
    bi_planar_image: &BiPlanarImage<u16>,
    bgra: &mut [u16],
    bgra_stride: u32,
    range: YuvRange,
    matrix: MatrixProfile,
) -> Result<(), ConvertError> {
    p016_to_rgbx_impl::<u16, { RgbPacking::Bgra as u8 }, 16, 13>(
        bi_planar_image,
        bgra,
        bgra_stride,
        range,
        matrix,
    )
}
