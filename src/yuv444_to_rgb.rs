/*
 * // Copyright (c) the yuvops contributors. All rights reserved.
 * //
 * // Use of this source code is governed by a BSD-style
 * // license that can be found in the LICENSE file.
 */
use crate::images::PlanarImage;
use crate::numerics::qrshr;
use crate::yuv_error::{check_dimensions, check_packed};
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

pub(crate) fn yuv444_to_rgbx_impl<
    V,
    const DESTINATION_CHANNELS: u8,
    const BIT_DEPTH: usize,
    const PRECISION: i32,
>(
    image: &PlanarImage<u8>,
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

    check_dimensions(image.width, image.height)?;
    image.check_constraints(ChromaSubsampling::Yuv444)?;
    check_packed(rgba, rgba_stride, image.width, image.height, channels)?;

    let chroma_range = get_yuv_range(8, range);
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
    let height = image.height as usize;
    let y_stride = image.y_stride as usize;
    let u_stride = image.u_stride as usize;
    let v_stride = image.v_stride as usize;
    let rgba_stride = rgba_stride as usize;

    let y_plane = &image.y_plane[..y_stride * height];
    let u_plane = &image.u_plane[..u_stride * height];
    let v_plane = &image.v_plane[..v_stride * height];
    let rgba = &mut rgba[..rgba_stride * height];

    let iter;
    #[cfg(feature = "rayon")]
    {
        iter = y_plane
            .par_chunks_exact(y_stride)
            .zip(u_plane.par_chunks_exact(u_stride))
            .zip(v_plane.par_chunks_exact(v_stride))
            .zip(rgba.par_chunks_exact_mut(rgba_stride));
    }
    #[cfg(not(feature = "rayon"))]
    {
        iter = y_plane
            .chunks_exact(y_stride)
            .zip(u_plane.chunks_exact(u_stride))
            .zip(v_plane.chunks_exact(v_stride))
            .zip(rgba.chunks_exact_mut(rgba_stride));
    }
    iter.for_each(|(((y_src, u_src), v_src), rgba_row)| {
        for (((&y_vl, &u_vl), &v_vl), px) in y_src[..width]
            .iter()
            .zip(u_src[..width].iter())
            .zip(v_src[..width].iter())
            .zip(rgba_row[..width * channels].chunks_exact_mut(channels))
        {
            let cb = u_vl as i32 - bias_uv;
            let cr = v_vl as i32 - bias_uv;
            let y_value = (y_vl as i32 - bias_y) * y_coef;
            let r = qrshr::<PRECISION, BIT_DEPTH>(y_value + cr_coef * cr);
            let b = qrshr::<PRECISION, BIT_DEPTH>(y_value + cb_coef * cb);
            let g = qrshr::<PRECISION, BIT_DEPTH>(y_value - g_coef_1 * cr - g_coef_2 * cb);
            px[dst_chans.r_offset()] = r.as_();
            px[dst_chans.g_offset()] = g.as_();
            px[dst_chans.b_offset()] = b.as_();
            if dst_chans.has_alpha() {
                px[dst_chans.a_offset()] = max_value.as_();
            }
        }
    });

    Ok(())
}

/// Convert YUV 4:4:4 planar format to RGB format.
///
/// This function takes three full-resolution 8-bit planes and converts them
/// to RGB format with 8-bit per channel precision. Chroma is sampled
/// directly, no upsampling is involved.
///
/// # Arguments
///
/// * `planar_image` - Source planar image.
/// * `rgb` - A mutable slice to store the converted RGB data.
/// * `rgb_stride` - The stride (components per row) for the RGB image data.
/// * `range` - The YUV range (limited or full).
/// * `matrix` - The conversion matrix profile.
///
/// # Errors
///
/// Fails before any write if any plane or the destination is inconsistent
/// with its declared stride.
pub fn yuv444_to_rgb(
    planar_image: &PlanarImage<u8>,
    rgb: &mut [u8],
    rgb_stride: u32,
    range: YuvRange,
    matrix: MatrixProfile,
) -> Result<(), ConvertError> {
    yuv444_to_rgbx_impl::<u8, { RgbPacking::Rgb as u8 }, 8, 13>(
        planar_image,
        rgb,
        rgb_stride,
        range,
        matrix,
    )
}

/// Convert YUV 4:4:4 planar format to BGRA format.
///
/// # Errors
///
/// Fails before any write if any plane or the destination is inconsistent
/// with its declared stride.
pub fn yuv444_to_bgra(
    planar_image: &PlanarImage<u8>,
    bgra: &mut [u8],
    bgra_stride: u32,
    range: YuvRange,
    matrix: MatrixProfile,
) -> Result<(), ConvertError> {
    yuv444_to_rgbx_impl::<u8, { RgbPacking::Bgra as u8 }, 8, 13>(
        planar_image,
        bgra,
        bgra_stride,
        range,
        matrix,
    )
}

/// Convert YUV 4:4:4 planar format to RGBA format.
///
/// # Errors
///
/// Fails before any write if any plane or the destination is inconsistent
/// with its declared stride.
pub fn yuv444_to_rgba(
    planar_image: &PlanarImage<u8>,
    rgba: &mut [u8],
    rgba_stride: u32,
    range: YuvRange,
    matrix: MatrixProfile,
) -> Result<(), ConvertError> {
    yuv444_to_rgbx_impl::<u8, { RgbPacking::Rgba as u8 }, 8, 13>(
        planar_image,
        rgba,
        rgba_stride,
        range,
        matrix,
    )
}

/// Convert YUV 4:4:4 planar format to ARGB format.
///
/// # Errors
///
/// Fails before any write if any plane or the destination is inconsistent
/// with its declared stride.
pub fn yuv444_to_argb(
    planar_image: &PlanarImage<u8>,
    argb: &mut [u8],
    argb_stride: u32,
    range: YuvRange,
    matrix: MatrixProfile,
) -> Result<(), ConvertError> {
    yuv444_to_rgbx_impl::<u8, { RgbPacking::Argb as u8 }, 8, 13>(
        planar_image,
        argb,
        argb_stride,
        range,
        matrix,
    )
}

/// Convert YUV 4:4:4 planar format to RGBA64 format (16 bits per channel).
///
/// # Errors
///
/// Fails before any write if any plane or the destination is inconsistent
/// with its declared stride.
pub fn yuv444_to_rgba64(
    planar_image: &PlanarImage<u8>,
    rgba: &mut [u16],
    rgba_stride: u32,
    range: YuvRange,
    matrix: MatrixProfile,
) -> Result<(), ConvertError> {
    yuv444_to_rgbx_impl::<u16, { RgbPacking::Rgba as u8 }, 16, 13>(
        planar_image,
        rgba,
        rgba_stride,
        range,
        matrix,
    )
}

/// Convert YUV 4:4:4 planar format to BGRA64 format (16 bits per channel).
///
/// # Errors
///
/// Fails before any write if any plane or the destination is inconsistent
/// with its declared stride.
pub fn yuv444_to_bgra64(
    planar_image: &PlanarImage<u8>,
    bgra: &mut [u16],
    bgra_stride: u32,
    range: YuvRange,
    matrix: MatrixProfile,
) -> Result<(), ConvertError> {
    yuv444_to_rgbx_impl::<u16, { RgbPacking::Bgra as u8 }, 16, 13>(
        planar_image,
        bgra,
        bgra_stride,
        range,
        matrix,
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn odd_dimensions_are_accepted_for_full_resolution_chroma() {
        let y = vec![120u8; 3 * 3];
        let u = vec![128u8; 3 * 3];
        let v = vec![128u8; 3 * 3];
        let image = PlanarImage {
            y_plane: &y,
            y_stride: 3,
            u_plane: &u,
            u_stride: 3,
            v_plane: &v,
            v_stride: 3,
            width: 3,
            height: 3,
        };
        let mut rgb = vec![0u8; 3 * 3 * 3];
        yuv444_to_rgb(&image, &mut rgb, 9, YuvRange::Limited, MatrixProfile::Bt709).unwrap();
        // Neutral chroma: all three channels agree.
        for px in rgb.chunks_exact(3) {
            assert_eq!(px[0], px[1]);
            assert_eq!(px[1], px[2]);
        }
    }

    #[test]
    fn repeated_calls_are_bit_identical() {
        let y: Vec<u8> = (0..64).map(|i| (i * 4) as u8).collect();
        let u: Vec<u8> = (0..64).map(|i| (255 - i * 3) as u8).collect();
        let v: Vec<u8> = (0..64).map(|i| (i * 2 + 40) as u8).collect();
        let image = PlanarImage {
            y_plane: &y,
            y_stride: 8,
            u_plane: &u,
            u_stride: 8,
            v_plane: &v,
            v_stride: 8,
            width: 8,
            height: 8,
        };
        let mut first = vec![0u8; 8 * 8 * 4];
        let mut second = vec![0u8; 8 * 8 * 4];
        yuv444_to_bgra(
            &image,
            &mut first,
            32,
            YuvRange::Limited,
            MatrixProfile::Bt601,
        )
        .unwrap();
        yuv444_to_bgra(
            &image,
            &mut second,
            32,
            YuvRange::Limited,
            MatrixProfile::Bt601,
        )
        .unwrap();
        assert_eq!(first, second);

        let mut other_profile = vec![0u8; 8 * 8 * 4];
        yuv444_to_bgra(
            &image,
            &mut other_profile,
            32,
            YuvRange::Limited,
            MatrixProfile::Bt709,
        )
        .unwrap();
        assert_ne!(first, other_profile);
    }
}
