/*
 * // Copyright (c) the yuvops contributors. All rights reserved.
 * //
 * // Use of this source code is governed by a BSD-style
 * // license that can be found in the LICENSE file.
 */
use crate::images::{BiPlanarImage, PlanarImage, RgbPlanarImageMut};
use crate::numerics::qrshr;
use crate::yuv_error::{check_dimensions, check_even_dimensions};
use crate::yuv_support::{
    get_inverse_transform, get_yuv_range, ChromaSubsampling, MatrixProfile, YuvRange,
};
use crate::ConvertError;
use num_traits::AsPrimitive;
#[cfg(feature = "rayon")]
use rayon::iter::{IndexedParallelIterator, ParallelIterator};
#[cfg(feature = "rayon")]
use rayon::prelude::{ParallelSlice, ParallelSliceMut};
use std::fmt::Debug;

fn check_matching_output(
    planes: &RgbPlanarImageMut<'_>,
    width: u32,
    height: u32,
) -> Result<(), ConvertError> {
    if planes.width != width || planes.height != height {
        return Err(ConvertError::InvalidDimensions {
            width: planes.width,
            height: planes.height,
            reason: "destination planes must match the source dimensions",
        });
    }
    planes.check_constraints()
}

fn biplanar_to_rgb_planar_impl<T, const SRC_DEPTH: u32, const PRECISION: i32>(
    image: &BiPlanarImage<T>,
    planes: &mut RgbPlanarImageMut<'_>,
    range: YuvRange,
    matrix: MatrixProfile,
) -> Result<(), ConvertError>
where
    T: Copy + Debug + Send + Sync + AsPrimitive<i32>,
{
    check_even_dimensions(image.width, image.height)?;
    image.check_constraints(ChromaSubsampling::Yuv420)?;
    check_matching_output(planes, image.width, image.height)?;

    let chroma_range = get_yuv_range(SRC_DEPTH, range);
    let kr_kb = matrix.kr_kb();
    let transform = get_inverse_transform(
        255,
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
    let uv_stride = image.uv_stride as usize;
    let r_stride = planes.r_stride as usize;
    let g_stride = planes.g_stride as usize;
    let b_stride = planes.b_stride as usize;

    let y_plane = &image.y_plane[..y_stride * height];
    let uv_plane = &image.uv_plane[..uv_stride * (height / 2)];
    let r_plane = &mut planes.r_plane.as_mut()[..r_stride * height];
    let g_plane = &mut planes.g_plane.as_mut()[..g_stride * height];
    let b_plane = &mut planes.b_plane.as_mut()[..b_stride * height];

    let iter;
    #[cfg(feature = "rayon")]
    {
        iter = y_plane
            .par_chunks_exact(y_stride * 2)
            .zip(uv_plane.par_chunks_exact(uv_stride))
            .zip(r_plane.par_chunks_exact_mut(r_stride * 2))
            .zip(g_plane.par_chunks_exact_mut(g_stride * 2))
            .zip(b_plane.par_chunks_exact_mut(b_stride * 2));
    }
    #[cfg(not(feature = "rayon"))]
    {
        iter = y_plane
            .chunks_exact(y_stride * 2)
            .zip(uv_plane.chunks_exact(uv_stride))
            .zip(r_plane.chunks_exact_mut(r_stride * 2))
            .zip(g_plane.chunks_exact_mut(g_stride * 2))
            .zip(b_plane.chunks_exact_mut(b_stride * 2));
    }
    iter.for_each(|((((y_src, uv_src), r_rows), g_rows), b_rows)| {
        let (y0, y1) = y_src.split_at(y_stride);
        let (r0, r1) = r_rows.split_at_mut(r_stride);
        let (g0, g1) = g_rows.split_at_mut(g_stride);
        let (b0, b1) = b_rows.split_at_mut(b_stride);

        for (x_pair, uv) in uv_src[..width].chunks_exact(2).enumerate() {
            let cb = uv[0].as_() - bias_uv;
            let cr = uv[1].as_() - bias_uv;
            let set = |row_r: &mut [u8], row_g: &mut [u8], row_b: &mut [u8], y_row: &[T], x: usize| {
                let y_value = (y_row[x].as_() - bias_y) * y_coef;
                row_r[x] = qrshr::<PRECISION, 8>(y_value + cr_coef * cr) as u8;
                row_g[x] =
                    qrshr::<PRECISION, 8>(y_value - g_coef_1 * cr - g_coef_2 * cb) as u8;
                row_b[x] = qrshr::<PRECISION, 8>(y_value + cb_coef * cb) as u8;
            };
            let x0 = x_pair * 2;
            let x1 = x0 + 1;
            set(r0, g0, b0, y0, x0);
            set(r0, g0, b0, y0, x1);
            set(r1, g1, b1, y1, x0);
            set(r1, g1, b1, y1, x1);
        }
    });

    Ok(())
}

fn planar444_to_rgb_planar_impl<T, const SRC_DEPTH: u32, const PRECISION: i32>(
    image: &PlanarImage<T>,
    planes: &mut RgbPlanarImageMut<'_>,
    range: YuvRange,
    matrix: MatrixProfile,
) -> Result<(), ConvertError>
where
    T: Copy + Debug + Send + Sync + AsPrimitive<i32>,
{
    check_dimensions(image.width, image.height)?;
    image.check_constraints(ChromaSubsampling::Yuv444)?;
    check_matching_output(planes, image.width, image.height)?;

    let chroma_range = get_yuv_range(SRC_DEPTH, range);
    let kr_kb = matrix.kr_kb();
    let transform = get_inverse_transform(
        255,
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
    let r_stride = planes.r_stride as usize;
    let g_stride = planes.g_stride as usize;
    let b_stride = planes.b_stride as usize;

    let y_plane = &image.y_plane[..y_stride * height];
    let u_plane = &image.u_plane[..u_stride * height];
    let v_plane = &image.v_plane[..v_stride * height];
    let r_plane = &mut planes.r_plane.as_mut()[..r_stride * height];
    let g_plane = &mut planes.g_plane.as_mut()[..g_stride * height];
    let b_plane = &mut planes.b_plane.as_mut()[..b_stride * height];

    let iter;
    #[cfg(feature = "rayon")]
    {
        iter = y_plane
            .par_chunks_exact(y_stride)
            .zip(u_plane.par_chunks_exact(u_stride))
            .zip(v_plane.par_chunks_exact(v_stride))
            .zip(r_plane.par_chunks_exact_mut(r_stride))
            .zip(g_plane.par_chunks_exact_mut(g_stride))
            .zip(b_plane.par_chunks_exact_mut(b_stride));
    }
    #[cfg(not(feature = "rayon"))]
    {
        iter = y_plane
            .chunks_exact(y_stride)
            .zip(u_plane.chunks_exact(u_stride))
            .zip(v_plane.chunks_exact(v_stride))
            .zip(r_plane.chunks_exact_mut(r_stride))
            .zip(g_plane.chunks_exact_mut(g_stride))
            .zip(b_plane.chunks_exact_mut(b_stride));
    }
    iter.for_each(|(((((y_src, u_src), v_src), r_row), g_row), b_row)| {
        for x in 0..width {
            let cb = u_src[x].as_() - bias_uv;
            let cr = v_src[x].as_() - bias_uv;
            let y_value = (y_src[x].as_() - bias_y) * y_coef;
            r_row[x] = qrshr::<PRECISION, 8>(y_value + cr_coef * cr) as u8;
            g_row[x] = qrshr::<PRECISION, 8>(y_value - g_coef_1 * cr - g_coef_2 * cb) as u8;
            b_row[x] = qrshr::<PRECISION, 8>(y_value + cb_coef * cb) as u8;
        }
    });

    Ok(())
}

/// Convert YUV NV12 format to planar RGB: the same per-pixel math as the
/// packed converter, scattered into three independently strided planes.
///
/// # Errors
///
/// Fails before any write if the dimensions are odd or zero, if destination
/// plane dimensions differ from the source, or if any plane is inconsistent
/// with its declared stride.
pub fn nv12_to_rgb_planar(
    bi_planar_image: &BiPlanarImage<u8>,
    planes: &mut RgbPlanarImageMut<'_>,
    range: YuvRange,
    matrix: MatrixProfile,
) -> Result<(), ConvertError> {
    biplanar_to_rgb_planar_impl::<u8, 8, 13>(bi_planar_image, planes, range, matrix)
}

/// Convert YUV P016 format to planar RGB (8-bit planes).
///
/// # Errors
///
/// Fails before any write if the dimensions are odd or zero, if destination
/// plane dimensions differ from the source, or if any plane is inconsistent
/// with its declared stride.
pub fn p016_to_rgb_planar(
    bi_planar_image: &BiPlanarImage<u16>,
    planes: &mut RgbPlanarImageMut<'_>,
    range: YuvRange,
    matrix: MatrixProfile,
) -> Result<(), ConvertError> {
    biplanar_to_rgb_planar_impl::<u16, 16, 16>(bi_planar_image, planes, range, matrix)
}

/// Convert YUV 4:4:4 planar format to planar RGB.
///
/// # Errors
///
/// Fails before any write if destination plane dimensions differ from the
/// source, or if any plane is inconsistent with its declared stride.
pub fn yuv444_to_rgb_planar(
    planar_image: &PlanarImage<u8>,
    planes: &mut RgbPlanarImageMut<'_>,
    range: YuvRange,
    matrix: MatrixProfile,
) -> Result<(), ConvertError> {
    planar444_to_rgb_planar_impl::<u8, 8, 13>(planar_image, planes, range, matrix)
}

/// Convert 16-bit YUV 4:4:4 planar format to planar RGB (8-bit planes).
///
/// # Errors
///
/// Fails before any write if destination plane dimensions differ from the
/// source, or if any plane is inconsistent with its declared stride.
pub fn yuv444_p16_to_rgb_planar(
    planar_image: &PlanarImage<u16>,
    planes: &mut RgbPlanarImageMut<'_>,
    range: YuvRange,
    matrix: MatrixProfile,
) -> Result<(), ConvertError> {
    planar444_to_rgb_planar_impl::<u16, 16, 16>(planar_image, planes, range, matrix)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::nv12_to_rgb::nv12_to_rgbx_impl;
    use crate::yuv_support::RgbPacking;

    #[test]
    fn planar_output_agrees_with_packed_output() {
        let y_plane: Vec<u8> = (0..64).map(|i| (i * 4) as u8).collect();
        let uv_plane: Vec<u8> = (0..32).map(|i| (i * 7 + 30) as u8).collect();
        let image = BiPlanarImage {
            y_plane: &y_plane,
            y_stride: 8,
            uv_plane: &uv_plane,
            uv_stride: 8,
            width: 8,
            height: 8,
        };

        let mut packed = vec![0u8; 8 * 8 * 3];
        nv12_to_rgbx_impl::<u8, { RgbPacking::Rgb as u8 }, 8, 13>(
            &image,
            &mut packed,
            24,
            YuvRange::Limited,
            MatrixProfile::Bt601,
        )
        .unwrap();

        let mut planes = RgbPlanarImageMut::alloc(8, 8);
        nv12_to_rgb_planar(&image, &mut planes, YuvRange::Limited, MatrixProfile::Bt601).unwrap();

        for y in 0..8usize {
            for x in 0..8usize {
                let px = &packed[y * 24 + x * 3..y * 24 + x * 3 + 3];
                assert_eq!(planes.r_plane.borrow()[y * 8 + x], px[0]);
                assert_eq!(planes.g_plane.borrow()[y * 8 + x], px[1]);
                assert_eq!(planes.b_plane.borrow()[y * 8 + x], px[2]);
            }
        }
    }

    #[test]
    fn mismatched_destination_dimensions_are_rejected() {
        let y_plane = vec![0u8; 8 * 8];
        let uv_plane = vec![0u8; 8 * 4];
        let image = BiPlanarImage {
            y_plane: &y_plane,
            y_stride: 8,
            uv_plane: &uv_plane,
            uv_stride: 8,
            width: 8,
            height: 8,
        };
        let mut planes = RgbPlanarImageMut::alloc(4, 4);
        let result = nv12_to_rgb_planar(&image, &mut planes, YuvRange::Limited, MatrixProfile::Bt601);
        assert!(matches!(
            result,
            Err(ConvertError::InvalidDimensions { .. })
        ));
    }
}
