// SPDX-FileCopyrightText: 2025-2026 RAprogramm <andrey.rozanov.vl@gmail.com>
// SPDX-License-Identifier: MIT

//! Case and diacritic folding for `CONTAINS[cd]`.
//!
//! Text is decomposed (NFD) and combining marks are dropped, so accents of
//! any script fold away. Letters that carry their stroke or ligature in the
//! base code point (`ø`, `ł`, `æ`, `ß`, ...) have no decomposition and are
//! spelled out by hand.

use unicode_normalization::{UnicodeNormalization, char::is_combining_mark};

/// Lowercase `text` and strip diacritics.
pub(super) fn fold(text: &str) -> String {
    let mut folded = String::with_capacity(text.len());
    let letters = text
        .nfd()
        .filter(|ch| !is_combining_mark(*ch))
        .flat_map(char::to_lowercase);
    for ch in letters {
        match expand(ch) {
            Some(base) => folded.push_str(base),
            None => folded.push(ch)
        }
    }
    folded
}

fn expand(ch: char) -> Option<&'static str> {
    let base = match ch {
        'æ' => "ae",
        'œ' => "oe",
        'ß' => "ss",
        'ø' => "o",
        'đ' | 'ð' => "d",
        'ħ' => "h",
        'ı' => "i",
        'ł' | 'ŀ' => "l",
        'ŧ' => "t",
        _ => return None
    };
    Some(base)
}
