use pdf_writer::{Name, Pdf, Ref};

/// Name of the single base-14 font used for label text.
pub(crate) const LABEL_FONT: &str = "F1";

/// Ascender height as a fraction of the font size, used to place the first
/// baseline below the top of a field box.
pub(crate) const ASCENDER_RATIO: f64 = 0.75;
pub(crate) const LINE_HEIGHT_RATIO: f64 = 1.2;

const ELLIPSIS: char = '\u{2026}';

pub(crate) struct FontEntry {
    pub(crate) font_ref: Ref,
    widths_1000: Vec<f64>,
}

impl FontEntry {
    fn char_width_1000(&self, ch: char) -> f64 {
        let byte = char_to_winansi(ch);
        if byte >= 32 {
            self.widths_1000[(byte - 32) as usize]
        } else {
            0.0
        }
    }

    pub(crate) fn text_width(&self, text: &str, font_size: f64) -> f64 {
        text.chars()
            .map(|ch| self.char_width_1000(ch) * font_size / 1000.0)
            .sum()
    }

    /// Word-wrap `text` into lines no wider than `max_width`, keeping only as
    /// many lines as fit in `max_height`. When text is dropped the last kept
    /// line ends in an ellipsis. At least one line is always returned for
    /// non-empty text.
    pub(crate) fn fit_lines(&self, text: &str, font_size: f64, max_width: f64, max_height: f64) -> Vec<String> {
        let line_h = font_size * LINE_HEIGHT_RATIO;
        let max_lines = ((max_height / line_h).floor() as usize).max(1);

        let mut lines: Vec<String> = Vec::new();
        let mut current = String::new();
        let mut truncated = false;

        'words: for word in text.split_whitespace() {
            let candidate = if current.is_empty() {
                word.to_string()
            } else {
                format!("{current} {word}")
            };
            if current.is_empty() || self.text_width(&candidate, font_size) <= max_width {
                current = candidate;
                continue;
            }
            lines.push(std::mem::take(&mut current));
            if lines.len() == max_lines {
                truncated = true;
                break 'words;
            }
            current = word.to_string();
        }
        if !current.is_empty() {
            lines.push(current);
        }

        // A single word may still be wider than the box
        for line in &mut lines {
            if self.text_width(line, font_size) > max_width {
                *line = self.ellipsize(line, font_size, max_width);
            }
        }
        if truncated && let Some(last) = lines.last_mut() {
            let with_mark = format!("{last}{ELLIPSIS}");
            *last = if self.text_width(&with_mark, font_size) <= max_width {
                with_mark
            } else {
                self.ellipsize(last, font_size, max_width)
            };
        }
        lines
    }

    fn ellipsize(&self, text: &str, font_size: f64, max_width: f64) -> String {
        let budget = max_width - self.char_width_1000(ELLIPSIS) * font_size / 1000.0;
        let mut out = String::new();
        let mut width = 0.0;
        for ch in text.chars() {
            let w = self.char_width_1000(ch) * font_size / 1000.0;
            if width + w > budget {
                break;
            }
            width += w;
            out.push(ch);
        }
        out.push(ELLIPSIS);
        out
    }
}

/// WinAnsi bytes in 0x80..=0x9F, where the code page departs from Latin-1.
const WINANSI_HIGH: [(char, u8); 27] = [
    ('\u{20AC}', 0x80), ('\u{201A}', 0x82), ('\u{0192}', 0x83), ('\u{201E}', 0x84),
    ('\u{2026}', 0x85), ('\u{2020}', 0x86), ('\u{2021}', 0x87), ('\u{02C6}', 0x88),
    ('\u{2030}', 0x89), ('\u{0160}', 0x8A), ('\u{2039}', 0x8B), ('\u{0152}', 0x8C),
    ('\u{017D}', 0x8E), ('\u{2018}', 0x91), ('\u{2019}', 0x92), ('\u{201C}', 0x93),
    ('\u{201D}', 0x94), ('\u{2022}', 0x95), ('\u{2013}', 0x96), ('\u{2014}', 0x97),
    ('\u{02DC}', 0x98), ('\u{2122}', 0x99), ('\u{0161}', 0x9A), ('\u{203A}', 0x9B),
    ('\u{0153}', 0x9C), ('\u{017E}', 0x9E), ('\u{0178}', 0x9F),
];

/// WinAnsi byte for `c`, or 0 when the code page has no slot for it.
fn char_to_winansi(c: char) -> u8 {
    match c as u32 {
        0x20..=0x7E | 0xA0..=0xFF => c as u8,
        _ => WINANSI_HIGH
            .iter()
            .find(|(ch, _)| *ch == c)
            .map_or(0, |&(_, byte)| byte),
    }
}

/// Convert a UTF-8 string to WinAnsi bytes for a PDF string operand.
/// Characters outside the code page are dropped.
pub(crate) fn to_winansi_bytes(s: &str) -> Vec<u8> {
    s.chars()
        .map(char_to_winansi)
        .filter(|&b| b != 0)
        .collect()
}

/// Helvetica advance widths (1000 units/em) for WinAnsi bytes 32..=255.
/// Exact for what labels mostly carry (digits, price punctuation, the
/// ellipsis); letters use class averages.
fn helvetica_widths() -> Vec<f64> {
    (32u8..=255u8)
        .map(|b| match b {
            b' ' | b',' | b'.' | b':' | b';' | b'/' | b'!' => 278.0,
            b'$' | b'0'..=b'9' => 556.0,
            b'-' | b'(' | b')' => 333.0,
            b'%' => 889.0,
            b'\'' => 191.0,
            b'"' => 355.0,
            b'I' | b'J' | b'f' | b'i' | b'j' | b'l' | b't' => 278.0,
            b'r' => 333.0,
            b'M' | b'm' | b'w' => 833.0,
            b'W' => 944.0,
            b'A'..=b'Z' => 667.0,
            b'a'..=b'z' => 556.0,
            0x85 | 0x89 => 1000.0,
            0xD1 => 722.0, // Ñ
            0xC0..=0xDF => 667.0,
            0xE0..=0xFF => 556.0,
            _ => 556.0,
        })
        .collect()
}

/// Register base-14 Helvetica with WinAnsi encoding. No font file is embedded.
pub(crate) fn register_label_font(pdf: &mut Pdf, alloc: &mut impl FnMut() -> Ref) -> FontEntry {
    let font_ref = alloc();
    pdf.type1_font(font_ref)
        .base_font(Name(b"Helvetica"))
        .encoding_predefined(Name(b"WinAnsiEncoding"));
    FontEntry {
        font_ref,
        widths_1000: helvetica_widths(),
    }
}
