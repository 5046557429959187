/*
 * // Copyright (c) the yuvops contributors. All rights reserved.
 * //
 * // Use of this source code is governed by a BSD-style
 * // license that can be found in the LICENSE file.
 */
use thiserror::Error;

#[derive(Debug, Copy, Clone, Ord, PartialOrd, Eq, PartialEq)]
pub struct MismatchedSize {
    pub expected: usize,
    pub received: usize,
}

/// Error type shared by every operation in the crate.
///
/// All validation runs before any kernel is dispatched; when an error is
/// returned no destination byte has been written. The one exception is
/// [`ConvertError::LaunchFailure`], after which destination contents are
/// undefined.
#[derive(Debug, Error)]
pub enum ConvertError {
    #[error("invalid frame dimensions {width}x{height}: {reason}")]
    InvalidDimensions {
        width: u32,
        height: u32,
        reason: &'static str,
    },
    #[error("stride or plane size below minimum: expected at least {}, received {}", .0.expected, .0.received)]
    InvalidStride(MismatchedSize),
    #[error("unrecognized matrix profile index {0}")]
    InvalidMatrixProfile(u32),
    #[error("execution queue dispatch failed: {0}")]
    LaunchFailure(&'static str),
}

#[inline]
pub(crate) fn check_dimensions(width: u32, height: u32) -> Result<(), ConvertError> {
    if width == 0 || height == 0 {
        return Err(ConvertError::InvalidDimensions {
            width,
            height,
            reason: "zero sized frames are not supported",
        });
    }
    Ok(())
}

/// 4:2:0 surfaces address chroma per 2×2 luma block, so both axes must be even.
#[inline]
pub(crate) fn check_even_dimensions(width: u32, height: u32) -> Result<(), ConvertError> {
    check_dimensions(width, height)?;
    if width & 1 != 0 || height & 1 != 0 {
        return Err(ConvertError::InvalidDimensions {
            width,
            height,
            reason: "4:2:0 surfaces require even width and height",
        });
    }
    Ok(())
}

/// Validates one plane slice against its stride and the samples it must hold
/// per row. `stride` is in elements, like everywhere else in the crate.
#[inline]
pub(crate) fn check_plane<V>(
    plane: &[V],
    stride: u32,
    min_row_samples: usize,
    rows: usize,
) -> Result<(), ConvertError> {
    if (stride as usize) < min_row_samples {
        return Err(ConvertError::InvalidStride(MismatchedSize {
            expected: min_row_samples,
            received: stride as usize,
        }));
    }
    let required = (stride as usize)
        .checked_mul(rows)
        .ok_or(ConvertError::InvalidStride(MismatchedSize {
            expected: usize::MAX,
            received: plane.len(),
        }))?;
    if plane.len() < required {
        return Err(ConvertError::InvalidStride(MismatchedSize {
            expected: required,
            received: plane.len(),
        }));
    }
    Ok(())
}

/// Validates a packed (interleaved channel) buffer.
#[inline]
pub(crate) fn check_packed<V>(
    data: &[V],
    stride: u32,
    width: u32,
    height: u32,
    channels: usize,
) -> Result<(), ConvertError> {
    let row_samples = (width as usize)
        .checked_mul(channels)
        .ok_or(ConvertError::InvalidDimensions {
            width,
            height,
            reason: "frame size overflows addressable memory",
        })?;
    check_plane(data, stride, row_samples, height as usize)
}
