use unicode_segmentation::UnicodeSegmentation;
use unicode_width::UnicodeWidthStr;

/// Display width of a string in terminal cells.
///
/// Titles are sanitized on input (no tabs or control characters), so plain
/// Unicode width is exact.
pub fn display_width(s: &str) -> usize {
    UnicodeWidthStr::width(s)
}

/// Truncate `s` to at most `max_cells` terminal cells, appending `…` when
/// anything was cut.
pub fn truncate_to_width(s: &str, max_cells: usize) -> String {
    if max_cells == 0 {
        return String::new();
    }
    if display_width(s) <= max_cells {
        return s.to_string();
    }
    if max_cells == 1 {
        return "\u{2026}".to_string();
    }
    let budget = max_cells - 1;
    let mut out = String::new();
    let mut used = 0;
    for g in s.graphemes(true) {
        let gw = UnicodeWidthStr::width(g);
        if used + gw > budget {
            break;
        }
        used += gw;
        out.push_str(g);
    }
    out.push('\u{2026}');
    out
}

/// Pad `s` with trailing spaces to exactly `cells` terminal cells,
/// truncating first if it is too wide.
pub fn pad_to_width(s: &str, cells: usize) -> String {
    let mut out = truncate_to_width(s, cells);
    let w = display_width(&out);
    if w < cells {
        out.push_str(&" ".repeat(cells - w));
    }
    out
}

/// Byte offset of the grapheme boundary after `offset`, or `None` at the end.
pub fn next_grapheme(s: &str, offset: usize) -> Option<usize> {
    if offset >= s.len() {
        return None;
    }
    match s[offset..].grapheme_indices(true).nth(1) {
        Some((i, _)) => Some(offset + i),
        None => Some(s.len()),
    }
}

/// Byte offset of the grapheme boundary before `offset`, or `None` at the
/// start.
pub fn prev_grapheme(s: &str, offset: usize) -> Option<usize> {
    if offset == 0 {
        return None;
    }
    let mut last = 0;
    for (i, _) in s[..offset].grapheme_indices(true) {
        last = i;
    }
    Some(last)
}

/// Display column of the byte offset `offset` within `s`.
pub fn col_at(s: &str, offset: usize) -> usize {
    display_width(&s[..offset.min(s.len())])
}

/// Strip characters that would corrupt a single-line title: control
/// characters, tabs, and newlines become single spaces, runs collapsed.
pub fn sanitize_title(s: &str) -> String {
    let mut out = String::with_capacity(s.len());
    let mut pending_space = false;
    for c in s.chars() {
        if c.is_control() || c == '\t' {
            pending_space = !out.is_empty();
        } else {
            if pending_space {
                out.push(' ');
                pending_space = false;
            }
            out.push(c);
        }
    }
    out
}
