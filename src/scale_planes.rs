/*
 * // Copyright (c) the yuvops contributors. All rights reserved.
 * //
 * // Use of this source code is governed by a BSD-style
 * // license that can be found in the LICENSE file.
 */
use crate::images::{BiPlanarImageMut, PlanarImage, PlanarImageMut};
use crate::resize::resize_plane_bilinear;
use crate::yuv_error::check_even_dimensions;
use crate::yuv_support::ChromaSubsampling;
use crate::ConvertError;

/// Resize a three-plane YUV 4:2:0 image, writing three separate planes.
///
/// Each plane is filtered with the same bilinear policy as [`resize_nv12`]:
/// luma at full resolution, both chroma planes independently at half
/// resolution so block alignment is preserved.
///
/// [`resize_nv12`]: crate::resize_nv12
///
/// # Errors
///
/// Fails before any write if either geometry has odd or zero dimensions or a
/// plane inconsistent with its declared stride.
pub fn scale_yuv420(
    src: &PlanarImage<u8>,
    dst: &mut PlanarImageMut<u8>,
) -> Result<(), ConvertError> {
    check_even_dimensions(src.width, src.height)?;
    check_even_dimensions(dst.width, dst.height)?;
    src.check_constraints(ChromaSubsampling::Yuv420)?;
    dst.check_constraints(ChromaSubsampling::Yuv420)?;

    resize_plane_bilinear::<u8, 1, 1>(
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
    resize_plane_bilinear::<u8, 1, 1>(
        src.u_plane,
        src.u_stride as usize,
        0,
        src.width as usize / 2,
        src.height as usize / 2,
        dst.u_plane.as_mut(),
        dst.u_stride as usize,
        0,
        dst.width as usize / 2,
        dst.height as usize / 2,
    );
    resize_plane_bilinear::<u8, 1, 1>(
        src.v_plane,
        src.v_stride as usize,
        0,
        src.width as usize / 2,
        src.height as usize / 2,
        dst.v_plane.as_mut(),
        dst.v_stride as usize,
        0,
        dst.width as usize / 2,
        dst.height as usize / 2,
    );
    Ok(())
}

/// Resize a three-plane YUV 4:2:0 image, interleaving the scaled chroma into
/// one semi-planar (NV12 layout) destination chroma plane.
///
/// # Errors
///
/// Fails before any write if either geometry has odd or zero dimensions or a
/// plane inconsistent with its declared stride.
pub fn scale_yuv420_to_semiplanar(
    src: &PlanarImage<u8>,
    dst: &mut BiPlanarImageMut<u8>,
) -> Result<(), ConvertError> {
    check_even_dimensions(src.width, src.height)?;
    check_even_dimensions(dst.width, dst.height)?;
    src.check_constraints(ChromaSubsampling::Yuv420)?;
    dst.check_constraints(ChromaSubsampling::Yuv420)?;

    resize_plane_bilinear::<u8, 1, 1>(
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

    let src_cw = src.width as usize / 2;
    let src_ch = src.height as usize / 2;
    let dst_cw = dst.width as usize / 2;
    let dst_ch = dst.height as usize / 2;
    resize_plane_bilinear::<u8, 1, 2>(
        src.u_plane,
        src.u_stride as usize,
        0,
        src_cw,
        src_ch,
        dst.uv_plane.as_mut(),
        dst.uv_stride as usize,
        0,
        dst_cw,
        dst_ch,
    );
    resize_plane_bilinear::<u8, 1, 2>(
        src.v_plane,
        src.v_stride as usize,
        0,
        src_cw,
        src_ch,
        dst.uv_plane.as_mut(),
        dst.uv_stride as usize,
        1,
        dst_cw,
        dst_ch,
    );
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn test_source() -> (Vec<u8>, Vec<u8>, Vec<u8>) {
        let y: Vec<u8> = (0..32 * 16).map(|i| (i * 13 % 251) as u8).collect();
        let u: Vec<u8> = (0..16 * 8).map(|i| (i * 29 % 251) as u8).collect();
        let v: Vec<u8> = (0..16 * 8).map(|i| (i * 41 % 251) as u8).collect();
        (y, u, v)
    }

    #[test]
    fn planar_and_semiplanar_outputs_agree() {
        let (y, u, v) = test_source();
        let src = PlanarImage {
            y_plane: &y,
            y_stride: 32,
            u_plane: &u,
            u_stride: 16,
            v_plane: &v,
            v_stride: 16,
            width: 32,
            height: 16,
        };

        let mut planar = PlanarImageMut::<u8>::alloc(20, 12, ChromaSubsampling::Yuv420);
        scale_yuv420(&src, &mut planar).unwrap();

        let mut semi = BiPlanarImageMut::<u8>::alloc(20, 12, ChromaSubsampling::Yuv420);
        scale_yuv420_to_semiplanar(&src, &mut semi).unwrap();

        assert_eq!(planar.y_plane.borrow(), semi.y_plane.borrow());
        let uv = semi.uv_plane.borrow();
        for row in 0..6usize {
            for x in 0..10usize {
                assert_eq!(
                    planar.u_plane.borrow()[row * 10 + x],
                    uv[row * 20 + x * 2],
                    "u mismatch at {},{}",
                    x,
                    row
                );
                assert_eq!(
                    planar.v_plane.borrow()[row * 10 + x],
                    uv[row * 20 + x * 2 + 1],
                    "v mismatch at {},{}",
                    x,
                    row
                );
            }
        }
    }

    #[test]
    fn identity_scale_copies_planes() {
        let (y, u, v) = test_source();
        let src = PlanarImage {
            y_plane: &y,
            y_stride: 32,
            u_plane: &u,
            u_stride: 16,
            v_plane: &v,
            v_stride: 16,
            width: 32,
            height: 16,
        };
        let mut dst = PlanarImageMut::<u8>::alloc(32, 16, ChromaSubsampling::Yuv420);
        scale_yuv420(&src, &mut dst).unwrap();
        assert_eq!(dst.y_plane.borrow(), &y[..]);
        assert_eq!(dst.u_plane.borrow(), &u[..]);
        assert_eq!(dst.v_plane.borrow(), &v[..]);
    }
}
