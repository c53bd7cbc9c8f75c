// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// CCITT Group 4 (T.6) bi-level encoder.
//
// Every coding line is described by its changing elements (positions where the
// colour differs from the pixel to the left, with an imaginary white pixel
// before column 0) and coded relative to the previous line with pass,
// vertical and horizontal modes. The first reference line is all white. The
// stream ends with an EOFB marker and is padded with zero bits to a byte
// boundary, which is what a PDF `CCITTFaxDecode` filter with `K = -1` expects.

const PASS: &str = "0001";
const HORIZONTAL: &str = "001";
const EOL: &str = "000000000001";

/// Vertical mode codes indexed by `a1 - b1 + 3`.
const VERTICAL: [&str; 7] = [
    "0000010", // VL3
    "000010",  // VL2
    "010",     // VL1
    "1",       // V0
    "011",     // VR1
    "000011",  // VR2
    "0000011", // VR3
];

const WHITE_TERMINATING: [&str; 64] = [
    "00110101", "000111", "0111", "1000", "1011", "1100", "1110", "1111", //
    "10011", "10100", "00111", "01000", "001000", "000011", "110100", "110101", //
    "101010", "101011", "0100111", "0001100", "0001000", "0010111", "0000011", "0000100", //
    "0101000", "0101011", "0010011", "0100100", "0011000", "00000010", "00000011", "00011010", //
    "00011011", "00010010", "00010011", "00010100", "00010101", "00010110", "00010111", "00101000", //
    "00101001", "00101010", "00101011", "00101100", "00101101", "00000100", "00000101", "00001010", //
    "00001011", "01010010", "01010011", "01010100", "01010101", "00100100", "00100101", "01011000", //
    "01011001", "01011010", "01011011", "01001010", "01001011", "00110010", "00110011", "00110100", //
];

const BLACK_TERMINATING: [&str; 64] = [
    "0000110111", "010", "11", "10", "011", "0011", "0010", "00011", //
    "000101", "000100", "0000100", "0000101", "0000111", "00000100", "00000111", "000011000", //
    "0000010111", "0000011000", "0000001000", "00001100111", "00001101000", "00001101100", "00000110111", "00000101000", //
    "00000010111", "00000011000", "000011001010", "000011001011", "000011001100", "000011001101", "000001101000", "000001101001", //
    "000001101010", "000001101011", "000011010010", "000011010011", "000011010100", "000011010101", "000011010110", "000011010111", //
    "000001101100", "000001101101", "000011011010", "000011011011", "000001010100", "000001010101", "000001010110", "000001010111", //
    "000001100100", "000001100101", "000001010010", "000001010011", "000000100100", "000000110111", "000000111000", "000000100111", //
    "000000101000", "000001011000", "000001011001", "000000101011", "000000101100", "000001011010", "000001100110", "000001100111", //
];

/// Make-up codes for 64, 128, ..., 1728.
const WHITE_MAKEUP: [&str; 27] = [
    "11011", "10010", "010111", "0110111", "00110110", "00110111", "01100100", "01100101", //
    "01101000", "01100111", "011001100", "011001101", "011010010", "011010011", "011010100", "011010101", //
    "011010110", "011010111", "011011000", "011011001", "011011010", "011011011", "010011000", "010011001", //
    "010011010", "011000", "010011011",
];

const BLACK_MAKEUP: [&str; 27] = [
    "0000001111", "000011001000", "000011001001", "000001011011", "000000110011", "000000110100", "000000110101", "0000001101100", //
    "0000001101101", "0000001001010", "0000001001011", "0000001001100", "0000001001101", "0000001110010", "0000001110011", "0000001110100", //
    "0000001110101", "0000001110110", "0000001110111", "0000001010010", "0000001010011", "0000001010100", "0000001010101", "0000001011010", //
    "0000001011011", "0000001100100", "0000001100101",
];

/// Make-up codes shared by both colours for 1792, 1856, ..., 2560.
const EXTENDED_MAKEUP: [&str; 13] = [
    "00000001000", "00000001100", "00000001101", "000000010010", "000000010011", "000000010100", "000000010101", //
    "000000010110", "000000010111", "000000011100", "000000011101", "000000011110", "000000011111",
];

/// Encode a packed 1-bit image.
///
/// `rows` holds `height` rows of `stride` bytes, MSB first, where a 0 bit is
/// a black pixel (the `DeviceGray` convention, which is also what
/// `CCITTFaxDecode` produces with its default `BlackIs1 = false`).
pub fn encode(rows: &[u8], width: u32, height: u32, stride: usize) -> Vec<u8> {
    let mut writer = BitWriter::with_capacity(rows.len() / 8 + 16);
    let mut reference: Vec<u32> = Vec::new();
    let mut coding: Vec<u32> = Vec::new();

    for y in 0..height as usize {
        let start = y * stride;
        let row = rows.get(start..start + stride).unwrap_or(&[]);
        changing_elements(row, width, &mut coding);
        encode_line(&mut writer, &coding, &reference, width);
        std::mem::swap(&mut reference, &mut coding);
    }

    writer.put(EOL);
    writer.put(EOL);
    writer.finish()
}

/// Collect the positions where a row changes colour, starting from white.
fn changing_elements(row: &[u8], width: u32, out: &mut Vec<u32>) {
    out.clear();
    let mut previous_black = false;
    for x in 0..width {
        let byte = row.get((x / 8) as usize).copied().unwrap_or(0xFF);
        let black = byte & (0x80 >> (x % 8)) == 0;
        if black != previous_black {
            out.push(x);
            previous_black = black;
        }
    }
}

/// First changing element strictly right of `a0`, or `width`.
fn next_change(changes: &[u32], a0: i64, width: u32) -> u32 {
    let idx = changes.partition_point(|&c| i64::from(c) <= a0);
    changes.get(idx).copied().unwrap_or(width)
}

/// `b1` and `b2` on the reference line for the given `a0` and its colour.
///
/// Changes at even indices turn the line black, odd indices turn it white; `b1`
/// must have the colour opposite to `a0`.
fn reference_changes(reference: &[u32], a0: i64, a0_black: bool, width: u32) -> (u32, u32) {
    let mut idx = reference.partition_point(|&c| i64::from(c) <= a0);
    let turns_black = idx % 2 == 0;
    if turns_black == a0_black {
        idx += 1;
    }
    let b1 = reference.get(idx).copied().unwrap_or(width);
    let b2 = reference.get(idx + 1).copied().unwrap_or(width);
    (b1, b2)
}

fn encode_line(writer: &mut BitWriter, coding: &[u32], reference: &[u32], width: u32) {
    let mut a0: i64 = -1;
    let mut black = false;

    while a0 < i64::from(width) {
        let a1 = next_change(coding, a0, width);
        let (b1, b2) = reference_changes(reference, a0, black, width);

        if b2 < a1 {
            writer.put(PASS);
            a0 = i64::from(b2);
            continue;
        }

        let delta = i64::from(a1) - i64::from(b1);
        if (-3..=3).contains(&delta) {
            writer.put(VERTICAL[(delta + 3) as usize]);
            a0 = i64::from(a1);
            black = !black;
        } else {
            let a2 = next_change(coding, i64::from(a1), width);
            let first_run = i64::from(a1) - a0.max(0);
            writer.put(HORIZONTAL);
            put_run(writer, first_run as u32, black);
            put_run(writer, a2 - a1, !black);
            a0 = i64::from(a2);
        }
    }
}

fn put_run(writer: &mut BitWriter, mut run: u32, black: bool) {
    let (terminating, makeup) = if black {
        (&BLACK_TERMINATING, &BLACK_MAKEUP)
    } else {
        (&WHITE_TERMINATING, &WHITE_MAKEUP)
    };
    while run > 2560 {
        writer.put(EXTENDED_MAKEUP[12]);
        run -= 2560;
    }
    if run >= 1792 {
        writer.put(EXTENDED_MAKEUP[((run - 1792) / 64) as usize]);
        run %= 64;
    } else if run >= 64 {
        writer.put(makeup[(run / 64 - 1) as usize]);
        run %= 64;
    }
    writer.put(terminating[run as usize]);
}

/// MSB-first bit sink.
struct BitWriter {
    bytes: Vec<u8>,
    current: u8,
    filled: u8,
}

impl BitWriter {
    fn with_capacity(capacity: usize) -> Self {
        Self {
            bytes: Vec::with_capacity(capacity),
            current: 0,
            filled: 0,
        }
    }

    fn put(&mut self, code: &str) {
        for bit in code.bytes() {
            self.current = (self.current << 1) | u8::from(bit == b'1');
            self.filled += 1;
            if self.filled == 8 {
                self.bytes.push(self.current);
                self.current = 0;
                self.filled = 0;
            }
        }
    }

    fn finish(mut self) -> Vec<u8> {
        if self.filled > 0 {
            self.bytes.push(self.current << (8 - self.filled));
        }
        self.bytes
    }
}
