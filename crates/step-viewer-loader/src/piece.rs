// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Piece numbering from file paths

/// Piece number assumed when a path carries none
pub const DEFAULT_PIECE_INDEX: u32 = 1;

/// Extract the number following the first `Part` in a path
///
/// `/assets/Part12.stp` -> 12. Paths without `Part<digits>` (or with a number
/// that does not fit in `u32`) map to [`DEFAULT_PIECE_INDEX`].
pub fn parse_piece_index(path: &str) -> u32 {
    let mut rest = path;
    while let Some(pos) = rest.find("Part") {
        let after = &rest[pos + 4..];
        let digits_len = after
            .bytes()
            .take_while(|b| b.is_ascii_digit())
            .count();
        if digits_len > 0 {
            return after[..digits_len]
                .parse()
                .unwrap_or(DEFAULT_PIECE_INDEX);
        }
        rest = after;
    }
    DEFAULT_PIECE_INDEX
}
