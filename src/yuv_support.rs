/*
 * // Copyright (c) the yuvops contributors. All rights reserved.
 * //
 * // Use of this source code is governed by a BSD-style
 * // license that can be found in the LICENSE file.
 */
use crate::ConvertError;

#[derive(Debug, Copy, Clone)]
pub(crate) struct CbCrInverseTransform<T> {
    pub y_coef: T,
    pub cr_coef: T,
    pub cb_coef: T,
    pub g_coeff_1: T,
    pub g_coeff_2: T,
}

impl CbCrInverseTransform<f32> {
    /// Integral transformation adds an error not less than 1%
    pub fn to_integers(self, precision: u32) -> CbCrInverseTransform<i32> {
        let precision_scale = (1i32 << precision) as f32;
        CbCrInverseTransform::<i32> {
            y_coef: (self.y_coef * precision_scale).round() as i32,
            cr_coef: (self.cr_coef * precision_scale).round() as i32,
            cb_coef: (self.cb_coef * precision_scale).round() as i32,
            g_coeff_1: (self.g_coeff_1 * precision_scale).round() as i32,
            g_coeff_2: (self.g_coeff_2 * precision_scale).round() as i32,
        }
    }
}

/// Transformation YUV to RGB with coefficients as specified in [ITU-R](https://www.itu.int/rec/T-REC-H.273/en)
pub(crate) fn get_inverse_transform(
    range_rgba: u32,
    range_y: u32,
    range_uv: u32,
    kr: f32,
    kb: f32,
) -> CbCrInverseTransform<f32> {
    let range_uv = range_rgba as f32 / range_uv as f32;
    let y_coef = range_rgba as f32 / range_y as f32;
    let cr_coef = (2f32 * (1f32 - kr)) * range_uv;
    let cb_coef = (2f32 * (1f32 - kb)) * range_uv;
    let kg = 1.0f32 - kr - kb;
    debug_assert!(kg != 0f32);
    let g_coeff_1 = (2f32 * ((1f32 - kr) * kr / kg)) * range_uv;
    let g_coeff_2 = (2f32 * ((1f32 - kb) * kb / kg)) * range_uv;
    CbCrInverseTransform {
        y_coef,
        cr_coef,
        cb_coef,
        g_coeff_1,
        g_coeff_2,
    }
}

#[derive(Debug, Copy, Clone)]
pub(crate) struct CbCrForwardTransform<T> {
    pub yr: T,
    pub yg: T,
    pub yb: T,
    pub cb_r: T,
    pub cb_g: T,
    pub cb_b: T,
    pub cr_r: T,
    pub cr_g: T,
    pub cr_b: T,
}

impl CbCrForwardTransform<f32> {
    pub fn to_integers(self, precision: u32) -> CbCrForwardTransform<i32> {
        let scale = (1i32 << precision) as f32;
        CbCrForwardTransform::<i32> {
            yr: (self.yr * scale).round() as i32,
            yg: (self.yg * scale).round() as i32,
            yb: (self.yb * scale).round() as i32,
            cb_r: (self.cb_r * scale).round() as i32,
            cb_g: (self.cb_g * scale).round() as i32,
            cb_b: (self.cb_b * scale).round() as i32,
            cr_r: (self.cr_r * scale).round() as i32,
            cr_g: (self.cr_g * scale).round() as i32,
            cr_b: (self.cr_b * scale).round() as i32,
        }
    }
}

/// Transformation RGB to YUV with coefficients as specified in [ITU-R](https://www.itu.int/rec/T-REC-H.273/en)
pub(crate) fn get_forward_transform(
    range_rgba: u32,
    range_y: u32,
    range_uv: u32,
    kr: f32,
    kb: f32,
) -> CbCrForwardTransform<f32> {
    let kg = 1.0f32 - kr - kb;

    let yr = kr * range_y as f32 / range_rgba as f32;
    let yg = kg * range_y as f32 / range_rgba as f32;
    let yb = kb * range_y as f32 / range_rgba as f32;

    let cb_r = -0.5f32 * kr / (1f32 - kb) * range_uv as f32 / range_rgba as f32;
    let cb_g = -0.5f32 * kg / (1f32 - kb) * range_uv as f32 / range_rgba as f32;
    let cb_b = 0.5f32 * range_uv as f32 / range_rgba as f32;

    let cr_r = 0.5f32 * range_uv as f32 / range_rgba as f32;
    let cr_g = -0.5f32 * kg / (1f32 - kr) * range_uv as f32 / range_rgba as f32;
    let cr_b = -0.5f32 * kb / (1f32 - kr) * range_uv as f32 / range_rgba as f32;
    CbCrForwardTransform {
        yr,
        yg,
        yb,
        cb_r,
        cb_g,
        cb_b,
        cr_r,
        cr_g,
        cr_b,
    }
}

#[repr(C)]
#[derive(Debug, Copy, Clone, PartialOrd, PartialEq, Eq)]
/// Declares YUV range TV (limited) or Full
pub enum YuvRange {
    /// Limited range Y ∈ [16 << (depth - 8), 235 << (depth - 8)], UV ∈ [16 << (depth - 8), 240 << (depth - 8)]
    Limited,
    /// Full range Y ∈ [0, 2^bit_depth - 1], UV ∈ [0, 2^bit_depth - 1]
    Full,
}

#[derive(Debug, Copy, Clone, PartialOrd, PartialEq)]
pub(crate) struct YuvChromaRange {
    pub bias_y: u32,
    pub bias_uv: u32,
    pub range_y: u32,
    pub range_uv: u32,
}

pub(crate) const fn get_yuv_range(depth: u32, range: YuvRange) -> YuvChromaRange {
    match range {
        YuvRange::Limited => YuvChromaRange {
            bias_y: 16 << (depth - 8),
            bias_uv: 1 << (depth - 1),
            range_y: 219 << (depth - 8),
            range_uv: 224 << (depth - 8),
        },
        YuvRange::Full => YuvChromaRange {
            bias_y: 0,
            bias_uv: 1 << (depth - 1),
            range_y: (1 << depth) - 1,
            range_uv: (1 << depth) - 1,
        },
    }
}

#[repr(C)]
#[derive(Debug, Copy, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
/// Declares the coefficient set applied when converting between YUV and RGB,
/// check [ITU-R](https://www.itu.int/rec/T-REC-H.273/en) information for more info.
///
/// Two profiles are in active use in the wire protocol this crate serves:
/// [`MatrixProfile::Bt601`] for 8-bit packed targets and [`MatrixProfile::Bt709`]
/// for 16-bit and 4:4:4 derived targets. The remaining profiles are recognized
/// for completeness.
pub enum MatrixProfile {
    Bt601,
    Bt709,
    Fcc,
    Bt470Bg,
    Smpte240,
    Bt2020,
}

#[derive(Debug, Copy, Clone, PartialOrd, PartialEq)]
pub(crate) struct YuvBias {
    pub kr: f32,
    pub kb: f32,
}

impl MatrixProfile {
    /// Default profile for a destination of the given bit depth: BT.601 for
    /// 8-bit packed targets, BT.709 for anything deeper.
    pub const fn default_for_bit_depth(bit_depth: u32) -> MatrixProfile {
        if bit_depth <= 8 {
            MatrixProfile::Bt601
        } else {
            MatrixProfile::Bt709
        }
    }

    /// Resolves a legacy wire index to a profile.
    ///
    /// Only the two indices observed at the protocol boundary are accepted:
    /// `0` (the 8-bit packed default) maps to BT.601 and `4` (the deep-color
    /// default) maps to BT.709. Any other value fails with
    /// [`ConvertError::InvalidMatrixProfile`].
    pub fn from_index(index: u32) -> Result<MatrixProfile, ConvertError> {
        match index {
            0 => Ok(MatrixProfile::Bt601),
            4 => Ok(MatrixProfile::Bt709),
            _ => Err(ConvertError::InvalidMatrixProfile(index)),
        }
    }

    pub(crate) const fn kr_kb(self) -> YuvBias {
        match self {
            MatrixProfile::Bt601 => YuvBias {
                kr: 0.299f32,
                kb: 0.114f32,
            },
            MatrixProfile::Bt709 => YuvBias {
                kr: 0.2126f32,
                kb: 0.0722f32,
            },
            MatrixProfile::Fcc => YuvBias {
                kr: 0.3f32,
                kb: 0.11f32,
            },
            MatrixProfile::Bt470Bg => YuvBias {
                kr: 0.2220f32,
                kb: 0.0713f32,
            },
            MatrixProfile::Smpte240 => YuvBias {
                kr: 0.212f32,
                kb: 0.087f32,
            },
            MatrixProfile::Bt2020 => YuvBias {
                kr: 0.2627f32,
                kb: 0.0593f32,
            },
        }
    }
}

#[repr(u8)]
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
/// Chroma plane geometry relative to the luma plane.
pub enum ChromaSubsampling {
    /// Chroma at half resolution in both axes, one sample pair per 2×2 luma block.
    Yuv420 = 0,
    /// Chroma at full resolution.
    Yuv444 = 2,
}

impl From<u8> for ChromaSubsampling {
    #[inline(always)]
    fn from(value: u8) -> Self {
        match value {
            0 => ChromaSubsampling::Yuv420,
            2 => ChromaSubsampling::Yuv444,
            _ => {
                panic!("Unknown value")
            }
        }
    }
}

#[repr(u8)]
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
/// Byte order of a packed RGB destination or source.
pub enum RgbPacking {
    Rgb = 0,
    Rgba = 1,
    Bgra = 2,
    Argb = 3,
}

impl From<u8> for RgbPacking {
    #[inline(always)]
    fn from(value: u8) -> Self {
        match value {
            0 => RgbPacking::Rgb,
            1 => RgbPacking::Rgba,
            2 => RgbPacking::Bgra,
            3 => RgbPacking::Argb,
            _ => {
                panic!("Unknown value")
            }
        }
    }
}

impl RgbPacking {
    #[inline(always)]
    pub const fn channels_count(self) -> usize {
        match self {
            RgbPacking::Rgb => 3,
            RgbPacking::Rgba | RgbPacking::Bgra | RgbPacking::Argb => 4,
        }
    }

    #[inline(always)]
    pub const fn has_alpha(self) -> bool {
        !matches!(self, RgbPacking::Rgb)
    }

    #[inline(always)]
    pub const fn r_offset(self) -> usize {
        match self {
            RgbPacking::Rgb | RgbPacking::Rgba => 0,
            RgbPacking::Bgra => 2,
            RgbPacking::Argb => 1,
        }
    }

    #[inline(always)]
    pub const fn g_offset(self) -> usize {
        match self {
            RgbPacking::Rgb | RgbPacking::Rgba | RgbPacking::Bgra => 1,
            RgbPacking::Argb => 2,
        }
    }

    #[inline(always)]
    pub const fn b_offset(self) -> usize {
        match self {
            RgbPacking::Rgb | RgbPacking::Rgba => 2,
            RgbPacking::Bgra => 0,
            RgbPacking::Argb => 3,
        }
    }

    #[inline(always)]
    pub const fn a_offset(self) -> usize {
        match self {
            RgbPacking::Rgb => 0,
            RgbPacking::Rgba | RgbPacking::Bgra => 3,
            RgbPacking::Argb => 0,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn legacy_index_mapping() {
        assert_eq!(MatrixProfile::from_index(0).unwrap(), MatrixProfile::Bt601);
        assert_eq!(MatrixProfile::from_index(4).unwrap(), MatrixProfile::Bt709);
        for index in [1u32, 2, 3, 5, 6, 7, 9, 100] {
            match MatrixProfile::from_index(index) {
                Err(ConvertError::InvalidMatrixProfile(i)) => assert_eq!(i, index),
                other => panic!("index {} resolved to {:?}", index, other),
            }
        }
    }

    #[test]
    fn depth_defaults() {
        assert_eq!(
            MatrixProfile::default_for_bit_depth(8),
            MatrixProfile::Bt601
        );
        assert_eq!(
            MatrixProfile::default_for_bit_depth(16),
            MatrixProfile::Bt709
        );
    }

    #[test]
    fn limited_range_scales_with_depth() {
        let r8 = get_yuv_range(8, YuvRange::Limited);
        assert_eq!(r8.bias_y, 16);
        assert_eq!(r8.range_y, 219);
        assert_eq!(r8.bias_uv, 128);
        let r16 = get_yuv_range(16, YuvRange::Limited);
        assert_eq!(r16.bias_y, 16 << 8);
        assert_eq!(r16.range_y, 219 << 8);
        assert_eq!(r16.bias_uv, 1 << 15);
    }
}
