/*
 * // Copyright (c) the yuvops contributors. All rights reserved.
 * //
 * // Use of this source code is governed by a BSD-style
 * // license that can be found in the LICENSE file.
 */
#[cfg(feature = "rayon")]
use rayon::prelude::{ParallelIterator, ParallelSlice};

const fn build_crc32_table() -> [u32; 256] {
    let mut table = [0u32; 256];
    let mut n = 0usize;
    while n < 256 {
        let mut c = n as u32;
        let mut k = 0;
        while k < 8 {
            c = if c & 1 != 0 {
                0xEDB8_8320 ^ (c >> 1)
            } else {
                c >> 1
            };
            k += 1;
        }
        table[n] = c;
        n += 1;
    }
    table
}

static CRC32_TABLE: [u32; 256] = build_crc32_table();

fn crc32_update(crc: u32, data: &[u8]) -> u32 {
    let mut c = crc;
    for &byte in data {
        c = CRC32_TABLE[((c ^ byte as u32) & 0xFF) as usize] ^ (c >> 8);
    }
    c
}

fn crc32_of(data: &[u8]) -> u32 {
    crc32_update(0xFFFF_FFFF, data) ^ 0xFFFF_FFFF
}

fn gf2_matrix_times(mat: &[u32; 32], mut vec: u32) -> u32 {
    let mut sum = 0u32;
    let mut i = 0usize;
    while vec != 0 {
        if vec & 1 != 0 {
            sum ^= mat[i];
        }
        vec >>= 1;
        i += 1;
    }
    sum
}

fn gf2_matrix_square(square: &mut [u32; 32], mat: &[u32; 32]) {
    for n in 0..32 {
        square[n] = gf2_matrix_times(mat, mat[n]);
    }
}

/// Splices `crc2` (over `len2` trailing bytes) onto `crc1`, producing the CRC
/// of the concatenated stream. This is what makes the chunked reduction
/// independent of how the buffer was split.
fn crc32_combine(mut crc1: u32, crc2: u32, mut len2: u64) -> u32 {
    if len2 == 0 {
        return crc1;
    }
    let mut even = [0u32; 32];
    let mut odd = [0u32; 32];

    // Operator for one zero bit, then square up to one zero byte.
    odd[0] = 0xEDB8_8320;
    let mut row = 1u32;
    for cell in odd.iter_mut().skip(1) {
        *cell = row;
        row <<= 1;
    }
    gf2_matrix_square(&mut even, &odd);
    gf2_matrix_square(&mut odd, &even);

    loop {
        gf2_matrix_square(&mut even, &odd);
        if len2 & 1 != 0 {
            crc1 = gf2_matrix_times(&even, crc1);
        }
        len2 >>= 1;
        if len2 == 0 {
            break;
        }
        gf2_matrix_square(&mut odd, &even);
        if len2 & 1 != 0 {
            crc1 = gf2_matrix_times(&odd, crc1);
        }
        len2 >>= 1;
        if len2 == 0 {
            break;
        }
    }
    crc1 ^ crc2
}

/// Computes the CRC-32 (IEEE, reflected polynomial) of a buffer.
///
/// With the `rayon` feature the buffer is reduced in parallel chunks and the
/// partial CRCs are spliced back together, which yields the exact same value
/// as the sequential pass; the result depends only on the byte content.
pub fn crc32_checksum(data: &[u8]) -> u32 {
    #[cfg(feature = "rayon")]
    {
        const PARALLEL_CHUNK: usize = 256 * 1024;
        if data.len() >= PARALLEL_CHUNK * 2 {
            let parts: Vec<(u32, u64)> = data
                .par_chunks(PARALLEL_CHUNK)
                .map(|chunk| (crc32_of(chunk), chunk.len() as u64))
                .collect();
            let mut parts = parts.into_iter();
            if let Some((mut crc, _)) = parts.next() {
                for (chunk_crc, chunk_len) in parts {
                    crc = crc32_combine(crc, chunk_crc, chunk_len);
                }
                return crc;
            }
        }
    }
    crc32_of(data)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn matches_ieee_check_value() {
        assert_eq!(crc32_checksum(b"123456789"), 0xCBF4_3926);
        assert_eq!(crc32_checksum(b""), 0);
    }

    #[test]
    fn combine_equals_concatenation() {
        let a: Vec<u8> = (0..1031u32).map(|i| (i * 7) as u8).collect();
        let b: Vec<u8> = (0..2977u32).map(|i| (i * 13 + 5) as u8).collect();
        let whole: Vec<u8> = a.iter().chain(b.iter()).copied().collect();
        let combined = crc32_combine(crc32_checksum(&a), crc32_checksum(&b), b.len() as u64);
        assert_eq!(combined, crc32_checksum(&whole));
    }

    #[test]
    fn single_byte_mutation_changes_the_checksum() {
        let mut data = vec![0x5Au8; 1 << 20];
        let before = crc32_checksum(&data);
        data[517_331] ^= 0x01;
        let after = crc32_checksum(&data);
        assert_ne!(before, after);
        data[517_331] ^= 0x01;
        assert_eq!(crc32_checksum(&data), before);
    }

    #[test]
    fn large_buffer_matches_sequential_reference() {
        // Exercises the chunked reduction against the plain table walk.
        let data: Vec<u8> = (0..(3 << 19) + 77u32).map(|i| (i * 31 + 11) as u8).collect();
        assert_eq!(crc32_checksum(&data), crc32_of(&data));
    }
}
