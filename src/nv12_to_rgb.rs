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

pub(crate) fn nv12_to_rgbx_impl<
    V,
    const DESTINATION_CHANNELS: u8,
    const BIT_DEPTH: usize,
    const PRECISION: i32,
>(
    image: &BiPlanarImage<u8>,
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

        // One chroma pair is replicated across its 2x2 luma block.
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

/// Convert YUV NV12 format to RGB format.
///
/// This function takes YUV NV12 data with 8-bit precision,
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
pub fn nv12_to_rgb(
    bi_planar_image: &BiPlanarImage<u8>,
    rgb: &mut [u8],
    rgb_stride: u32,
    range: YuvRange,
    matrix: MatrixProfile,
) -> Result<(), ConvertError> {
    nv12_to_rgbx_impl::<u8, { RgbPacking::Rgb as u8 }, 8, 13>(
        bi_planar_image,
        rgb,
        rgb_stride,
        range,
        matrix,
    )
}

/// Convert YUV NV12 format to BGRA format.
///
/// # Arguments
///
/// * `bi_planar_image` - Source bi-planar image.
/// * `bgra` - A mutable slice to store the converted BGRA data.
/// * `bgra_stride` - The stride (components per row) for the BGRA image data.
/// * `range` - The YUV range (limited or full).
/// * `matrix` - The conversion matrix profile.
///
/// # Errors
///
/// Fails before any write if the dimensions are odd or zero, or if any plane
/// or the destination is inconsistent with its declared stride.
pub fn nv12_to_bgra(
    bi_planar_image: &BiPlanarImage<u8>,
    bgra: &mut [u8],
    bgra_stride: u32,
    range: YuvRange,
    matrix: MatrixProfile,
) -> Result<(), ConvertError> {
    nv12_to_rgbx_impl::<u8, { RgbPacking::Bgra as u8 }, 8, 13>(
        bi_planar_image,
        bgra,
        bgra_stride,
        range,
        matrix,
    )
}

/// Convert YUV NV12 format to RGBA format.
///
/// # Errors
///
/// Fails before any write if the dimensions are odd or zero, or if any plane
/// or the destination is inconsistent with its declared stride.
pub fn nv12_to_rgba(
    bi_planar_image: &BiPlanarImage<u8>,
    rgba: &mut [u8],
    rgba_stride: u32,
    range: YuvRange,
    matrix: MatrixProfile,
) -> Result<(), ConvertError> {
    nv12_to_rgbx_impl::<u8, { RgbPacking::Rgba as u8 }, 8, 13>(
        bi_planar_image,
        rgba,
        rgba_stride,
        range,
        matrix,
    )
}

/// Convert YUV NV12 format to ARGB format.
///
/// # Errors
///
/// Fails before any write if the dimensions are odd or zero, or if any plane
/// or the destination is inconsistent with its declared stride.
pub fn nv12_to_argb(
    bi_planar_image: &BiPlanarImage<u8>,
    argb: &mut [u8],
    argb_stride: u32,
    range: YuvRange,
    matrix: MatrixProfile,
) -> Result<(), ConvertError> {
    nv12_to_rgbx_impl::<u8, { RgbPacking::Argb as u8 }, 8, 13>(
        bi_planar_image,
        argb,
        argb_stride,
        range,
        matrix,
    )
}

/// Convert YUV NV12 format to RGBA64 format (16 bits per channel).
///
/// The 8-bit source is expanded through the conversion coefficients, not by a
/// post-hoc shift, so the full 16-bit output range is used.
///
/// # Errors
///
/// Fails before any write if the dimensions are odd or zero, or if any plane
/// or the destination is inconsistent with its declared stride.
pub fn nv12_to_rgba64(
    bi_planar_image: &BiPlanarImage<u8>,
    rgba: &mut [u16],
    rgba_stride: u32,
    range: YuvRange,
    matrix: MatrixProfile,
) -> Result<(), ConvertError> {
    nv12_to_rgbx_impl::<u16, { RgbPacking::Rgba as u8 }, 16, 13>(
        bi_planar_image,
        rgba,
        rgba_stride,
        range,
        matrix,
    )
}

/// Convert YUV NV12 format to BGRA64 format (16 bits per channel).
///
/// # Errors
///
/// Fails before any write if the dimensions are odd or zero, or if any plane
/// or the destination is inconsistent with its declared stride.
pub fn nv12_to_bgra64(
    bi_planar_image: &BiPlanarImage<u8>,
    bgra: &mut [u16],
    bgra_stride: u32,
    range: YuvRange,
    matrix: MatrixProfile,
) -> Result<(), ConvertError> {
    nv12_to_rgbx_impl::<u16, { RgbPacking::Bgra as u8 }, 16, 13>(
        bi_planar_image,
        bgra,
        bgra_stride,
        range,
        matrix,
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    fn reference_rgb(y: u8, cb: u8, cr: u8, matrix: MatrixProfile) -> [i32; 3] {
        let kr_kb = matrix.kr_kb();
        let kr = kr_kb.kr;
        let kb = kr_kb.kb;
        let kg = 1.0 - kr - kb;
        let y_f = (y as f32 - 16.0) * (255.0 / 219.0);
        let cb_f = cb as f32 - 128.0;
        let cr_f = cr as f32 - 128.0;
        let scale = 255.0 / 224.0;
        let r = y_f + 2.0 * (1.0 - kr) * scale * cr_f;
        let b = y_f + 2.0 * (1.0 - kb) * scale * cb_f;
        let g = y_f
            - 2.0 * ((1.0 - kr) * kr / kg) * scale * cr_f
            - 2.0 * ((1.0 - kb) * kb / kg) * scale * cb_f;
        [
            r.round().clamp(0.0, 255.0) as i32,
            g.round().clamp(0.0, 255.0) as i32,
            b.round().clamp(0.0, 255.0) as i32,
        ]
    }

    #[test]
    fn known_block_matches_reference_within_one() {
        let y_plane = [90u8, 140, 200, 40];
        let uv_plane = [148u8, 98];
        let image = BiPlanarImage {
            y_plane: &y_plane,
            y_stride: 2,
            uv_plane: &uv_plane,
            uv_stride: 2,
            width: 2,
            height: 2,
        };
        let mut rgb = [0u8; 2 * 2 * 3];
        nv12_to_rgb(&image, &mut rgb, 6, YuvRange::Limited, MatrixProfile::Bt601).unwrap();

        for (i, &y) in y_plane.iter().enumerate() {
            let expected = reference_rgb(y, uv_plane[0], uv_plane[1], MatrixProfile::Bt601);
            let got = &rgb[i * 3..i * 3 + 3];
            for c in 0..3 {
                assert!(
                    (got[c] as i32 - expected[c]).abs() <= 1,
                    "pixel {} channel {}: got {} expected {}",
                    i,
                    c,
                    got[c],
                    expected[c]
                );
            }
        }
    }

    #[test]
    fn zero_input_is_deterministic_black() {
        let y_plane = [0u8; 4 * 2];
        let uv_plane = [0u8; 4];
        let image = BiPlanarImage {
            y_plane: &y_plane,
            y_stride: 4,
            uv_plane: &uv_plane,
            uv_stride: 4,
            width: 4,
            height: 2,
        };
        for matrix in [MatrixProfile::Bt601, MatrixProfile::Bt709] {
            let mut first = [0xAAu8; 4 * 2 * 4];
            let mut second = [0x55u8; 4 * 2 * 4];
            nv12_to_bgra(&image, &mut first, 16, YuvRange::Limited, matrix).unwrap();
            nv12_to_bgra(&image, &mut second, 16, YuvRange::Limited, matrix).unwrap();
            assert_eq!(first, second);
            // All-zero YUV is far out of gamut: red and blue clamp to zero
            // while green keeps a residual from the chroma offsets. Every
            // pixel must land on that same color.
            let expected = reference_rgb(0, 0, 0, matrix);
            assert_eq!(expected[0], 0);
            assert_eq!(expected[2], 0);
            for px in first.chunks_exact(4) {
                assert_eq!(px[0] as i32, expected[2]);
                assert!((px[1] as i32 - expected[1]).abs() <= 1);
                assert_eq!(px[2] as i32, expected[0]);
                assert_eq!(px[3], 255);
            }
        }
    }

    #[test]
    fn profiles_diverge_on_colored_input() {
        let y_plane = [120u8; 8 * 4];
        let uv_plane = [
            90u8, 190, 90, 190, 90, 190, 90, 190, 90, 190, 90, 190, 90, 190, 90, 190,
        ];
        let image = BiPlanarImage {
            y_plane: &y_plane,
            y_stride: 8,
            uv_plane: &uv_plane,
            uv_stride: 8,
            width: 8,
            height: 4,
        };
        let mut sd = [0u8; 8 * 4 * 4];
        let mut hd = [0u8; 8 * 4 * 4];
        nv12_to_rgba(
            &image,
            &mut sd,
            32,
            YuvRange::Limited,
            MatrixProfile::Bt601,
        )
        .unwrap();
        nv12_to_rgba(
            &image,
            &mut hd,
            32,
            YuvRange::Limited,
            MatrixProfile::Bt709,
        )
        .unwrap();
        assert_ne!(sd, hd);
    }

    #[test]
    fn odd_dimensions_are_rejected() {
        let y_plane = [0u8; 9];
        let uv_plane = [0u8; 6];
        let image = BiPlanarImage {
            y_plane: &y_plane,
            y_stride: 3,
            uv_plane: &uv_plane,
            uv_stride: 3,
            width: 3,
            height: 3,
        };
        let mut rgb = [0u8; 27];
        let result = nv12_to_rgb(&image, &mut rgb, 9, YuvRange::Limited, MatrixProfile::Bt601);
        assert!(matches!(
            result,
            Err(ConvertError::InvalidDimensions { .. })
        ));
        assert!(rgb.iter().all(|&b| b == 0));
    }

    #[test]
    fn wide_output_tracks_narrow_output() {
        let y_plane = [70u8, 80, 90, 100, 60, 50, 40, 30];
        let uv_plane = [110u8, 150, 160, 100];
        let image = BiPlanarImage {
            y_plane: &y_plane,
            y_stride: 4,
            uv_plane: &uv_plane,
            uv_stride: 4,
            width: 4,
            height: 2,
        };
        let mut rgba8 = [0u8; 4 * 2 * 4];
        let mut rgba16 = [0u16; 4 * 2 * 4];
        nv12_to_rgba(
            &image,
            &mut rgba8,
            16,
            YuvRange::Limited,
            MatrixProfile::Bt601,
        )
        .unwrap();
        nv12_to_rgba64(
            &image,
            &mut rgba16,
            16,
            YuvRange::Limited,
            MatrixProfile::Bt601,
        )
        .unwrap();
        for (&narrow, &wide) in rgba8.iter().zip(rgba16.iter()) {
            // The deep output quantizes independently, so allow two 8-bit steps.
            assert!(((wide >> 8) as i32 - narrow as i32).abs() <= 2);
        }
    }
}
