// Copyright (c) 2024-2025 DeepGraph Inc.
// SPDX-License-Identifier: Apache-2.0
//
//! Hex digest and reduction primitives shared by key derivation and the
//! fingerprint engines.
//!
//! Tokens come in two widths: a 32 character (128-bit) "full" token and an
//! 8 character (32-bit) "short" token. The short token is always a string
//! prefix of the full token for the same input, so fingerprints computed at
//! either width remain comparable prefixes of one another.

use sha2::{Digest, Sha256};

/// Hex characters in a full token
pub const FULL_WIDTH: usize = 32;

/// Hex characters in a short token
pub const SHORT_WIDTH: usize = 8;

/// Lowercase hex digest of `input`, truncated to `width` characters.
pub fn digest_hex(input: &str, width: usize) -> String {
    let mut hasher = Sha256::new();
    hasher.update(input.as_bytes());
    let digest = hasher.finalize();

    let mut hex = String::with_capacity(width);
    for byte in digest.iter().take(width.div_ceil(2)) {
        hex.push_str(&format!("{:02x}", byte));
    }
    hex.truncate(width);
    hex
}

/// All-zero seed token of the given width, the XOR identity.
pub fn zero_token(width: usize) -> String {
    "0".repeat(width)
}

/// XOR two equal-width hex tokens, preserving the width of `a`.
///
/// XOR is commutative and associative, so reducing a set of row tokens with
/// it yields the same aggregate for any row ordering. Tokens up to 32 hex
/// characters fit in a `u128`.
pub fn hex_xor(a: &str, b: &str) -> String {
    let width = a.len();
    let x = u128::from_str_radix(a, 16).unwrap_or(0);
    let y = u128::from_str_radix(b, 16).unwrap_or(0);
    format!("{:0>width$x}", x ^ y, width = width)
}
