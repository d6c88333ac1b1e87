//! Reed-Solomon error correction codes.
//!
//! The error correction in a QR symbol is done using Reed-Solomon codes.
//!
//! Assuming you have never heard of coding theory: By putting some redundancy
//! into the symbol one can recover from, say, detection or printing errors
//! when trying to read a QR code. A clever way to add redundancy
//! is the Reed-Solomon code. The details are relatively
//! math heavy and involve, for example, "higher" algebra (Galois fields).
//! Any book about coding theory should cover it, for example
//! "Error Correction Coding: Mathematical Methods and Algorithms" by Moon.
//!
//! For the larger symbols the data does not go through the code as one
//! piece. It is first split into blocks, a code is computed per block, and
//! data and code blocks are interleaved into the transmission order defined
//! by the standard. [interleaved_codewords] does all three steps.
mod galois;

use alloc::{vec, vec::Vec};

use crate::version::{EcLevel, Version};
use galois::{ANTI_LOG, GF, LOG};

#[cfg(test)]
use pretty_assertions::assert_eq;

const MAX_ECC_PER_BLOCK: usize = 30;

/// Compute the generator polynomials of degree 1 to 30.
///
/// Row k holds the polynomial with the roots x^0, ..., x^(k-1), built up
/// by multiplying row k - 1 with (x - x^(k-1)). Coefficients are stored
/// as powers of the generator element, highest degree first, and the
/// leading coefficient (always 1) is left out.
const fn compute_generator_polynomials() -> [[u8; MAX_ECC_PER_BLOCK]; MAX_ECC_PER_BLOCK + 1] {
    let mut polys = [[0u8; MAX_ECC_PER_BLOCK]; MAX_ECC_PER_BLOCK + 1];
    let mut degree = 1;
    while degree <= MAX_ECC_PER_BLOCK {
        let mut j = 0;
        while j < degree {
            // The coefficient shifted in from the previous polynomial. Past
            // its end (the new lowest coefficient) there is nothing to shift.
            let carry = if j < degree - 1 {
                ANTI_LOG[polys[degree - 1][j] as usize]
            } else {
                0
            };
            let scaled = if j > 0 {
                polys[degree - 1][j - 1] as usize
            } else {
                0
            };
            let term = ANTI_LOG[(degree - 1 + scaled) % 255];
            polys[degree][j] = LOG[(carry ^ term) as usize];
            j += 1;
        }
        degree += 1;
    }
    polys
}

static GENERATOR_POLYNOMIALS: [[u8; MAX_ECC_PER_BLOCK]; MAX_ECC_PER_BLOCK + 1] =
    compute_generator_polynomials();

fn generator(len: usize) -> &'static [u8] {
    assert!(
        (1..=MAX_ECC_PER_BLOCK).contains(&len),
        "no generator polynomial of degree {}",
        len,
    );
    &GENERATOR_POLYNOMIALS[len][..len]
}

/// Split the data codewords into blocks, compute the Reed-Solomon code of
/// every block, and interleave everything into transmission order.
///
/// The block count and code length per block depend on the symbol version
/// and error correction level. When the data length does not divide evenly,
/// the first blocks are one codeword shorter than the rest.
pub fn interleaved_codewords(data: &[u8], version: Version, level: EcLevel) -> Vec<u8> {
    let ecc_len = version.ecc_per_block(level);
    let num_blocks = version.num_blocks(level);
    debug_assert_eq!(data.len(), version.num_data_codewords(level));
    let gen = generator(ecc_len);

    let base = data.len() / num_blocks;
    let pivot = num_blocks - data.len() % num_blocks;

    let mut blocks: Vec<&[u8]> = Vec::with_capacity(num_blocks);
    let mut offset = 0;
    for i in 0..num_blocks {
        let len = base + usize::from(i >= pivot);
        blocks.push(&data[offset..offset + len]);
        offset += len;
    }
    debug_assert_eq!(offset, data.len());

    let ecc: Vec<Vec<u8>> = blocks.iter().map(|block| ecc_block(block, gen)).collect();

    let mut out = Vec::with_capacity(data.len() + ecc_len * num_blocks);
    for i in 0..base {
        for block in &blocks {
            out.push(block[i]);
        }
    }
    // the longer blocks still have their last data codeword to give
    for block in &blocks[pivot..] {
        out.push(block[base]);
    }
    for i in 0..ecc_len {
        for code in &ecc {
            out.push(code[i]);
        }
    }
    out
}

/// Compute the Reed-Solomon code of a single block.
///
/// This is the remainder of the data polynomial times x^k divided by the
/// degree k generator polynomial, done as euclidean division with the
/// quotient thrown away. A zero leading coefficient has no logarithm and
/// contributes nothing, so that step is skipped.
fn ecc_block(data: &[u8], gen: &[u8]) -> Vec<u8> {
    let mut m = vec![0u8; data.len() + gen.len()];
    m[..data.len()].copy_from_slice(data);
    for i in 0..data.len() {
        if m[i] == 0 {
            continue;
        }
        let e = GF(m[i]).log();
        for (j, &g) in gen.iter().enumerate() {
            m[i + 1 + j] = (GF(m[i + 1 + j]) + GF::primitive_power(e + g as usize)).into();
        }
    }
    m.split_off(data.len())
}

#[test]
fn generator_polynomials_match_published_tables() {
    assert_eq!(generator(1), &[0]);
    assert_eq!(generator(2), &[25, 1]);
    assert_eq!(generator(7), &[87, 229, 146, 149, 238, 102, 21]);
    assert_eq!(
        generator(10),
        &[251, 67, 46, 61, 118, 70, 64, 94, 32, 45]
    );
}

#[test]
fn ecc_block_known_example() {
    // the worked numeric example from the standard, version 1 level M
    let data = [
        0x10, 0x20, 0x0C, 0x56, 0x61, 0x80, 0xEC, 0x11, 0xEC, 0x11, 0xEC, 0x11, 0xEC, 0x11, 0xEC,
        0x11,
    ];
    let ecc = ecc_block(&data, generator(10));
    assert_eq!(
        ecc,
        vec![0xA5, 0x24, 0xD4, 0xC1, 0xED, 0x36, 0xC7, 0x87, 0x2C, 0x55]
    );
}

#[test]
fn data_with_ecc_is_divisible_by_generator() {
    for degree in [7, 10, 18, 30] {
        let gen = generator(degree);
        let data: Vec<u8> = (0..40u8).map(|i| i.wrapping_mul(23).wrapping_add(7)).collect();
        let mut poly = data.clone();
        poly.extend(ecc_block(&data, gen));
        // the generator has the roots x^0 .. x^(degree-1)
        for root in 0..degree {
            let x = GF::primitive_power(root);
            let mut acc = GF(0);
            for &c in &poly {
                acc = acc * x + GF(c);
            }
            assert_eq!(acc, GF(0), "degree {} root {}", degree, root);
        }
    }
}

#[test]
fn interleave_uneven_blocks() {
    // version 5 level H splits 46 data codewords into blocks of
    // 11, 11, 12 and 12 codewords with 22 ecc codewords each
    let version = Version::new(5);
    let data: Vec<u8> = (0..46).collect();
    let stream = interleaved_codewords(&data, version, EcLevel::H);
    assert_eq!(stream.len(), 134);
    // data columns cycle through the block starts 0, 11, 22, 34
    assert_eq!(
        &stream[..12],
        &[0, 11, 22, 34, 1, 12, 23, 35, 2, 13, 24, 36]
    );
    // the long blocks contribute their tails before the ecc part
    assert_eq!(&stream[44..46], &[33, 45]);
    assert_eq!(&stream[46..50], &[24, 210, 75, 188]);
}

#[test]
fn interleave_single_block_appends_ecc() {
    let version = Version::new(1);
    let data: Vec<u8> = (0..16).collect();
    let stream = interleaved_codewords(&data, version, EcLevel::M);
    assert_eq!(stream.len(), 26);
    assert_eq!(&stream[..16], &data[..]);
    assert_eq!(&stream[16..], &ecc_block(&data, generator(10))[..]);
}
