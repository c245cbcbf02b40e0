// SPDX-License-Identifier: Parity-7.0.0 OR PolyForm-Noncommercial-1.0.0
//! Fixed sample-position tables for the supported sample counts.
//!
//! Positions are stored as pairs of 4-bit fixed-point coordinates and scaled
//! by 1/16 into the unit square on lookup.  Tables are process-wide immutable
//! constants; there is one per supported sample count and they never change at
//! runtime.

/// Single-sample position: pixel center.
const MS1: [[u8; 2]; 1] = [[0x8, 0x8]];

const MS2: [[u8; 2]; 2] = [
    [0x4, 0x4],
    [0xc, 0xc], //surface coords (0,0), (1,0)
];

const MS4: [[u8; 2]; 4] = [
    [0x6, 0x2],
    [0xe, 0x6], //(0,0), (1,0)
    [0x2, 0xa],
    [0xa, 0xe], //(0,1), (1,1)
];

const MS8: [[u8; 2]; 8] = [
    [0x1, 0x7],
    [0x5, 0x3], //(0,0), (1,0)
    [0x3, 0xd],
    [0x7, 0xb], //(0,1), (1,1)
    [0x9, 0x5],
    [0xf, 0x1], //(2,0), (3,0)
    [0xb, 0xf],
    [0xd, 0x9], //(2,1), (3,1)
];

/// Standard 16x pattern on the same 1/16 grid.
const MS16: [[u8; 2]; 16] = [
    [0x9, 0x9],
    [0x7, 0x5],
    [0x5, 0xa],
    [0xc, 0x7],
    [0x3, 0x6],
    [0xa, 0xd],
    [0xd, 0xb],
    [0xb, 0x3],
    [0x6, 0xe],
    [0x8, 0x1],
    [0x4, 0x2],
    [0x2, 0xc],
    [0x0, 0x8],
    [0xf, 0x4],
    [0xe, 0xf],
    [0x1, 0x0],
];

/// Position of `sample_index` within a pixel for the given sample count, in
/// `[0, 1)` square coordinates.
///
/// Returns `None` for a sample count with no table (anything other than
/// 0/1/2/4/8/16) or an index past the table; sample locations are undefined
/// there rather than invented.  A sample count of 0 is treated as 1.
pub fn sample_position(sample_count: u32, sample_index: u32) -> Option<(f32, f32)> {
    let table: &[[u8; 2]] = match sample_count {
        0 | 1 => &MS1,
        2 => &MS2,
        4 => &MS4,
        8 => &MS8,
        16 => &MS16,
        _ => return None,
    };
    let position = table.get(sample_index as usize)?;
    Some((position[0] as f32 * 0.0625, position[1] as f32 * 0.0625))
}
