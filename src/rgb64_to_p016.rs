/*
 * // Copyright (c) the yuvops contributors. All rights reserved.
 * //
 * // Use of this source code is governed by a BSD-style
 * // license that can be found in the LICENSE file.
 */
use crate::images::BiPlanarImageMut;
use crate::yuv_error::{check_even_dimensions, check_packed};
use crate::yuv_support::{
    get_forward_transform, get_yuv_range, ChromaSubsampling, MatrixProfile, RgbPacking, YuvRange,
};
use crate::ConvertError;
#[cfg(feature = "rayon")]
use rayon::iter::{IndexedParallelIterator, ParallelIterator};
#[cfg(feature = "rayon")]
use rayon::prelude::{ParallelSlice, ParallelSliceMut};

fn rgbx64_to_p016_impl<const ORIGIN_CHANNELS: u8>(
    image: &mut BiPlanarImageMut<u16>,
    rgba: &[u16],
    rgba_stride: u32,
    range: YuvRange,
    matrix: MatrixProfile,
) -> Result<(), ConvertError> {
    let src_chans: RgbPacking = ORIGIN_CHANNELS.into();
    let channels = src_chans.channels_count();

    check_even_dimensions(image.width, image.height)?;
    image.check_constraints(ChromaSubsampling::Yuv420)?;
    check_packed(rgba, rgba_stride, image.width, image.height, channels)?;

    let chroma_range = get_yuv_range(16, range);
    let kr_kb = matrix.kr_kb();
    const PRECISION: i32 = 13;
    const ROUNDING_CONST_BIAS: i32 = (1 << (PRECISION - 1)) - 1;
    let transform = get_forward_transform(
        65535,
        chroma_range.range_y,
        chroma_range.range_uv,
        kr_kb.kr,
        kr_kb.kb,
    )
    .to_integers(PRECISION as u32);

    let bias_y = chroma_range.bias_y as i32 * (1 << PRECISION) + ROUNDING_CONST_BIAS;
    let bias_uv = chroma_range.bias_uv as i32 * (1 << PRECISION) + ROUNDING_CONST_BIAS;
    let i_bias_y = chroma_range.bias_y as i32;
    let i_cap_y = i_bias_y + chroma_range.range_y as i32;
    let i_cap_uv = i_bias_y + chroma_range.range_uv as i32;

    let r_offset = src_chans.r_offset();
    let g_offset = src_chans.g_offset();
    let b_offset = src_chans.b_offset();

    let width = image.width as usize;
    let height = image.height as usize;
    let y_stride = image.y_stride as usize;
    let uv_stride = image.uv_stride as usize;
    let rgba_stride = rgba_stride as usize;

    let y_plane = &mut image.y_plane.as_mut()[..y_stride * height];
    let uv_plane = &mut image.uv_plane.as_mut()[..uv_stride * (height / 2)];
    let rgba = &rgba[..rgba_stride * height];

    let weigh_y = move |r: i32, g: i32, b: i32| -> u16 {
        let y = (r * transform.yr + g * transform.yg + b * transform.yb + bias_y) >> PRECISION;
        y.clamp(i_bias_y, i_cap_y) as u16
    };

    let iter;
    #[cfg(feature = "rayon")]
    {
        iter = rgba
            .par_chunks_exact(rgba_stride * 2)
            .zip(y_plane.par_chunks_exact_mut(y_stride * 2))
            .zip(uv_plane.par_chunks_exact_mut(uv_stride));
    }
    #[cfg(not(feature = "rayon"))]
    {
        iter = rgba
            .chunks_exact(rgba_stride * 2)
            .zip(y_plane.chunks_exact_mut(y_stride * 2))
            .zip(uv_plane.chunks_exact_mut(uv_stride));
    }
    iter.for_each(|((rgba_rows, y_rows), uv_row)| {
        let (rgba0, rgba1) = rgba_rows.split_at(rgba_stride);
        let (y0, y1) = y_rows.split_at_mut(y_stride);
        let rgba0 = &rgba0[..width * channels];
        let rgba1 = &rgba1[..width * channels];
        let y0 = &mut y0[..width];
        let y1 = &mut y1[..width];
        let uv_row = &mut uv_row[..width];

        // Luma per pixel; one chroma pair per 2x2 block from the averaged RGB.
        for ((((px0, px1), y0), y1), uv) in rgba0
            .chunks_exact(channels * 2)
            .zip(rgba1.chunks_exact(channels * 2))
            .zip(y0.chunks_exact_mut(2))
            .zip(y1.chunks_exact_mut(2))
            .zip(uv_row.chunks_exact_mut(2))
        {
            let (p00, p01) = px0.split_at(channels);
            let (p10, p11) = px1.split_at(channels);

            let r00 = p00[r_offset] as i32;
            let g00 = p00[g_offset] as i32;
            let b00 = p00[b_offset] as i32;
            let r01 = p01[r_offset] as i32;
            let g01 = p01[g_offset] as i32;
            let b01 = p01[b_offset] as i32;
            let r10 = p10[r_offset] as i32;
            let g10 = p10[g_offset] as i32;
            let b10 = p10[b_offset] as i32;
            let r11 = p11[r_offset] as i32;
            let g11 = p11[g_offset] as i32;
            let b11 = p11[b_offset] as i32;

            y0[0] = weigh_y(r00, g00, b00);
            y0[1] = weigh_y(r01, g01, b01);
            y1[0] = weigh_y(r10, g10, b10);
            y1[1] = weigh_y(r11, g11, b11);

            let r_avg = (r00 + r01 + r10 + r11 + 2) >> 2;
            let g_avg = (g00 + g01 + g10 + g11 + 2) >> 2;
            let b_avg = (b00 + b01 + b10 + b11 + 2) >> 2;

            let cb = (r_avg * transform.cb_r + g_avg * transform.cb_g + b_avg * transform.cb_b
                + bias_uv)
                >> PRECISION;
            let cr = (r_avg * transform.cr_r + g_avg * transform.cr_g + b_avg * transform.cr_b
                + bias_uv)
                >> PRECISION;
            uv[0] = cb.clamp(i_bias_y, i_cap_uv) as u16;
            uv[1] = cr.clamp(i_bias_y, i_cap_uv) as u16;
        }
    });

    Ok(())
}

/// Convert RGBA64 format (16 bits per channel) to YUV P016 format.
///
/// Luma is computed per pixel; each chroma pair is computed from the average
/// RGB of its 2x2 block, which is the only aggregation step in the crate.
///
/// # Arguments
///
/// * `bi_planar_image` - Destination bi-planar image.
/// * `rgba` - Source RGBA64 data.
/// * `rgba_stride` - The stride (components per row) for the RGBA64 data.
/// * `range` - The YUV range (limited or full).
/// * `matrix` - The conversion matrix profile.
///
/// # Errors
///
/// Fails before any write if the dimensions are odd or zero, or if any plane
/// or the source is inconsistent with its declared stride.
pub fn rgba64_to_p016(
    bi_planar_image: &mut BiPlanarImageMut<u16>,
    rgba: &[u16],
    rgba_stride: u32,
    range: YuvRange,
    matrix: MatrixProfile,
) -> Result<(), ConvertError> {
    rgbx64_to_p016_impl::<{ RgbPacking::Rgba as u8 }>(
        bi_planar_image,
        rgba,
        rgba_stride,
        range,
        matrix,
    )
}

/// Convert BGRA64 format (16 bits per channel) to YUV P016 format.
///
/// # Errors
///
/// Fails before any write if the dimensions are odd or zero, or if any plane
/// or the source is inconsistent with its declared stride.
pub fn bgra64_to_p016(
    bi_planar_image: &mut BiPlanarImageMut<u16>,
    bgra: &[u16],
    bgra_stride: u32,
    range: YuvRange,
    matrix: MatrixProfile,
) -> Result<(), ConvertError> {
    rgbx64_to_p016_impl::<{ RgbPacking::Bgra as u8 }>(
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
    use crate::p016_to_rgb::p016_to_rgbx_impl;
    use crate::BiPlanarImage;

    #[test]
    fn p016_round_trip_preserves_luma() {
        let width = 32u32;
        let height = 16u32;
        // Keep the frame comfortably inside the RGB gamut so no channel
        // clamps; clipped pixels cannot round-trip.
        let y_plane: Vec<u16> = (0..width * height)
            .map(|i| (20000 + (i * 97) % 20000) as u16)
            .collect();
        let uv_plane: Vec<u16> = (0..width * height / 2)
            .map(|i| (30000 + (i * 53) % 5000) as u16)
            .collect();
        let source = BiPlanarImage {
            y_plane: &y_plane,
            y_stride: width,
            uv_plane: &uv_plane,
            uv_stride: width,
            width,
            height,
        };

        let mut rgba = vec![0u16; (width * height * 4) as usize];
        p016_to_rgbx_impl::<u16, { RgbPacking::Rgba as u8 }, 16, 13>(
            &source,
            &mut rgba,
            width * 4,
            YuvRange::Limited,
            MatrixProfile::Bt709,
        )
        .unwrap();

        let mut round =
            BiPlanarImageMut::<u16>::alloc(width, height, ChromaSubsampling::Yuv420);
        rgba64_to_p016(
            &mut round,
            &rgba,
            width * 4,
            YuvRange::Limited,
            MatrixProfile::Bt709,
        )
        .unwrap();

        for (orig, got) in y_plane.iter().zip(round.y_plane.borrow().iter()) {
            assert!(
                (*orig as i32 - *got as i32).abs() <= 300,
                "luma drifted: {} vs {}",
                orig,
                got
            );
        }
        // Chroma tolerance is wider: the block average is lossy.
        for (orig, got) in uv_plane.iter().zip(round.uv_plane.borrow().iter()) {
            assert!(
                (*orig as i32 - *got as i32).abs() <= 900,
                "chroma drifted: {} vs {}",
                orig,
                got
            );
        }
    }

    #[test]
    fn red_maps_to_high_cr() {
        let width = 4u32;
        let height = 4u32;
        let mut rgba = vec![0u16; (width * height * 4) as usize];
        for px in rgba.chunks_exact_mut(4) {
            px[0] = u16::MAX;
            px[3] = u16::MAX;
        }
        let mut dest = BiPlanarImageMut::<u16>::alloc(width, height, ChromaSubsampling::Yuv420);
        rgba64_to_p016(
            &mut dest,
            &rgba,
            width * 4,
            YuvRange::Limited,
            MatrixProfile::Bt601,
        )
        .unwrap();
        for uv in dest.uv_plane.borrow().chunks_exact(2) {
            assert!(uv[1] > (1 << 15), "cr should sit above neutral for red");
            assert!(uv[0] < (1 << 15), "cb should sit below neutral for red");
        }
    }

    #[test]
    fn bgra_order_matches_rgba_order() {
        let width = 8u32;
        let height = 4u32;
        let mut rgba = vec![0u16; (width * height * 4) as usize];
        let mut bgra = vec![0u16; (width * height * 4) as usize];
        for (i, (r_px, b_px)) in rgba
            .chunks_exact_mut(4)
            .zip(bgra.chunks_exact_mut(4))
            .enumerate()
        {
            let r = (i * 2048) as u16;
            let g = (i * 1024) as u16;
            let b = 65535u16 - (i * 1500) as u16;
            r_px.copy_from_slice(&[r, g, b, u16::MAX]);
            b_px.copy_from_slice(&[b, g, r, u16::MAX]);
        }
        let mut from_rgba =
            BiPlanarImageMut::<u16>::alloc(width, height, ChromaSubsampling::Yuv420);
        let mut from_bgra =
            BiPlanarImageMut::<u16>::alloc(width, height, ChromaSubsampling::Yuv420);
        rgba64_to_p016(
            &mut from_rgba,
            &rgba,
            width * 4,
            YuvRange::Limited,
            MatrixProfile::Bt709,
        )
        .unwrap();
        bgra64_to_p016(
            &mut from_bgra,
            &bgra,
            width * 4,
            YuvRange::Limited,
            MatrixProfile::Bt709,
        )
        .unwrap();
        assert_eq!(from_rgba.y_plane.borrow(), from_bgra.y_plane.borrow());
        assert_eq!(from_rgba.uv_plane.borrow(), from_bgra.uv_plane.borrow());
    }
}
