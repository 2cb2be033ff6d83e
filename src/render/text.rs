// SPDX-FileCopyrightText: 2026 Bruno Meilick
// SPDX-License-Identifier: LicenseRef-Ganttline-FreeUse-NoCopy-NoDerivatives
//
// All rights reserved.
//
// This file is part of Ganttline and is proprietary software.
// Unauthorized copying, modification, or distribution is prohibited.

use super::Canvas;

pub(crate) fn truncate_with_ellipsis(text: &str, max_len: usize) -> String {
    if max_len == 0 {
        return String::new();
    }
    if text_len(text) <= max_len {
        return text.to_owned();
    }
    let mut out: String = text.chars().take(max_len - 1).collect();
    out.push('…');
    out
}

pub(crate) fn text_len(text: &str) -> usize {
    text.chars().count()
}

/// Canvas rows without trailing blanks or trailing empty rows.
pub(crate) fn canvas_to_string_trimmed(canvas: &Canvas) -> String {
    let mut lines = canvas
        .lines()
        .map(|line| line.trim_end_matches(' ').to_owned())
        .collect::<Vec<_>>();
    while matches!(lines.last(), Some(line) if line.is_empty()) {
        lines.pop();
    }
    lines.join("\n")
}

#[cfg(test)]
mod tests {
    use super::{canvas_to_string_trimmed, text_len, truncate_with_ellipsis};
    use crate::render::Canvas;

    #[test]
    fn truncate_with_ellipsis_handles_small_widths() {
        assert_eq!(truncate_with_ellipsis("3123", 0), "");
        assert_eq!(truncate_with_ellipsis("3123", 1), "…");
        assert_eq!(truncate_with_ellipsis("3123", 3), "31…");
        assert_eq!(truncate_with_ellipsis("3123", 4), "3123");
    }

    #[test]
    fn lengths_count_chars_not_bytes() {
        assert_eq!(text_len("mär"), 3);
        assert_eq!(truncate_with_ellipsis("März", 3), "Mä…");
    }

    #[test]
    fn trimming_drops_trailing_spaces_and_empty_rows() {
        let mut canvas = Canvas::new(3, 3).expect("canvas");
        canvas.set(0, 0, 'A').expect("set");
        canvas.set(1, 1, ' ').expect("set");
        assert_eq!(canvas_to_string_trimmed(&canvas), "A");
    }
}
