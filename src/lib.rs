/*
 * // Copyright (c) the yuvops contributors. All rights reserved.
 * //
 * // Use of this source code is governed by a BSD-style
 * // license that can be found in the LICENSE file.
 */
#![forbid(unsafe_code)]

mod checksum;
mod images;
mod numerics;
mod nv12_to_rgb;
mod p016_to_rgb;
mod queue;
mod resize;
mod rgb64_to_p016;
mod scale_planes;
mod yuv444_p16_to_rgb;
mod yuv444_to_rgb;
mod yuv_error;
mod yuv_support;
mod yuv_to_planar;

pub use yuv_error::{ConvertError, MismatchedSize};
pub use yuv_support::ChromaSubsampling;
pub use yuv_support::MatrixProfile;
pub use yuv_support::YuvRange;

pub use images::{
    BiPlanarImage, BiPlanarImageMut, BufferStoreMut, PlanarImage, PlanarImageMut,
    RgbPlanarImageMut,
};

pub use nv12_to_rgb::nv12_to_argb;
pub use nv12_to_rgb::nv12_to_bgra;
pub use nv12_to_rgb::nv12_to_bgra64;
pub use nv12_to_rgb::nv12_to_rgb;
pub use nv12_to_rgb::nv12_to_rgba;
pub use nv12_to_rgb::nv12_to_rgba64;

pub use p016_to_rgb::p016_to_argb;
pub use p016_to_rgb::p016_to_bgra;
pub use p016_to_rgb::p016_to_bgra64;
pub use p016_to_rgb::p016_to_rgb;
pub use p016_to_rgb::p016_to_rgba;
pub use p016_to_rgb::p016_to_rgba64;

pub use yuv444_to_rgb::yuv444_to_argb;
pub use yuv444_to_rgb::yuv444_to_bgra;
pub use yuv444_to_rgb::yuv444_to_bgra64;
pub use yuv444_to_rgb::yuv444_to_rgb;
pub use yuv444_to_rgb::yuv444_to_rgba;
pub use yuv444_to_rgb::yuv444_to_rgba64;

pub use yuv444_p16_to_rgb::yuv444_p16_to_argb;
pub use yuv444_p16_to_rgb::yuv444_p16_to_bgra;
pub use yuv444_p16_to_rgb::yuv444_p16_to_bgra64;
pub use yuv444_p16_to_rgb::yuv444_p16_to_rgb;
pub use yuv444_p16_to_rgb::yuv444_p16_to_rgba;
pub use yuv444_p16_to_rgb::yuv444_p16_to_rgba64;

pub use yuv_to_planar::nv12_to_rgb_planar;
pub use yuv_to_planar::p016_to_rgb_planar;
pub use yuv_to_planar::yuv444_p16_to_rgb_planar;
pub use yuv_to_planar::yuv444_to_rgb_planar;

pub use rgb64_to_p016::bgra64_to_p016;
pub use rgb64_to_p016::rgba64_to_p016;

pub use resize::resize_nv12;
pub use resize::resize_p016;

pub use scale_planes::scale_yuv420;
pub use scale_planes::scale_yuv420_to_semiplanar;

pub use checksum::crc32_checksum;
pub use queue::{ChecksumTicket, ExecutionQueue};
