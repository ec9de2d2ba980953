//! Helvetica glyph widths for fitting overlay text into a field box.
//!
//! Width data is taken from the Adobe Helvetica AFM and indexed by
//! WinAnsiEncoding character codes, the encoding overlay text is drawn in.

/// Suffix appended to text cut short to fit its field.
pub const ELLIPSIS: &str = "...";

/// Glyph widths indexed by WinAnsi code (0-255), in 1/1000 em-square units.
#[rustfmt::skip]
static HELVETICA_WIDTHS: [u16; 256] = [
    // 0-31: control characters
    0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0,
    0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0,
    // 32-47: space ! " # $ % & ' ( ) * + , - . /
    278, 278, 355, 556, 556, 889, 667, 191, 333, 333, 389, 584, 278, 333, 278, 278,
    // 48-63: 0 1 2 3 4 5 6 7 8 9 : ; < = > ?
    556, 556, 556, 556, 556, 556, 556, 556, 556, 556, 278, 278, 584, 584, 584, 556,
    // 64-79: @ A B C D E F G H I J K L M N O
    1015, 667, 667, 722, 722, 667, 611, 778, 722, 278, 500, 667, 556, 833, 722, 778,
    // 80-95: P Q R S T U V W X Y Z [ \ ] ^ _
    667, 778, 722, 667, 611, 722, 667, 944, 667, 667, 611, 278, 278, 278, 469, 556,
    // 96-111: ` a b c d e f g h i j k l m n o
    333, 556, 556, 500, 556, 556, 278, 556, 556, 222, 222, 500, 222, 833, 556, 556,
    // 112-127: p q r s t u v w x y z { | } ~ DEL
    556, 556, 333, 500, 278, 556, 500, 722, 500, 500, 500, 334, 260, 334, 584, 0,
    // 128-143
    556, 0, 222, 556, 333, 1000, 556, 556, 333, 1000, 667, 333, 1000, 0, 611, 0,
    // 144-159
    0, 222, 222, 333, 333, 350, 556, 1000, 333, 1000, 500, 333, 944, 0, 500, 667,
    // 160-175
    278, 333, 556, 556, 556, 556, 260, 556, 333, 737, 370, 556, 584, 333, 737, 333,
    // 176-191
    400, 584, 333, 333, 333, 556, 537, 278, 333, 333, 365, 556, 834, 834, 834, 611,
    // 192-207
    667, 667, 667, 667, 667, 667, 1000, 722, 667, 667, 667, 667, 278, 278, 278, 278,
    // 208-223
    722, 722, 778, 778, 778, 778, 778, 584, 778, 722, 722, 722, 722, 667, 667, 611,
    // 224-239
    556, 556, 556, 556, 556, 556, 889, 500, 556, 556, 556, 556, 278, 278, 278, 278,
    // 240-255
    556, 556, 556, 556, 556, 556, 556, 584, 611, 556, 556, 556, 556, 500, 556, 500,
];

/// WinAnsi code for a character, or `None` when the encoding has no glyph.
fn win_ansi_code(c: char) -> Option<u8> {
    let code = match c {
        ' '..='~' | '\u{a0}'..='\u{ff}' => c as u32 as u8,
        '€' => 128,
        '‚' => 130,
        'ƒ' => 131,
        '„' => 132,
        '…' => 133,
        '†' => 134,
        '‡' => 135,
        'ˆ' => 136,
        '‰' => 137,
        'Š' => 138,
        '‹' => 139,
        'Œ' => 140,
        'Ž' => 142,
        '‘' => 145,
        '’' => 146,
        '“' => 147,
        '”' => 148,
        '•' => 149,
        '–' => 150,
        '—' => 151,
        '˜' => 152,
        '™' => 153,
        'š' => 154,
        '›' => 155,
        'œ' => 156,
        'ž' => 158,
        'Ÿ' => 159,
        _ => return None,
    };
    Some(code)
}

/// Advance width of one character in Helvetica, in 1/1000 em units.
///
/// Control characters are drawn as a space and characters outside WinAnsi
/// as `?`, so they are measured that way too.
pub fn char_width(c: char) -> u16 {
    let code = if c.is_control() {
        b' '
    } else {
        win_ansi_code(c).unwrap_or(b'?')
    };
    HELVETICA_WIDTHS[code as usize]
}

/// Width of `text` set in Helvetica at `font_size`, in points.
pub fn text_width(text: &str, font_size: f64) -> f64 {
    let units: u32 = text.chars().map(|c| u32::from(char_width(c))).sum();
    f64::from(units) * font_size / 1000.0
}

/// Cut `text` so that it fits in `max_width` points, marking the cut with
/// [`ELLIPSIS`].
///
/// Text that already fits is returned unchanged. A non-positive or
/// non-finite `max_width` means no limit. When not even the ellipsis fits,
/// the ellipsis alone is returned.
pub fn fit_text(text: &str, font_size: f64, max_width: f64) -> String {
    if !(max_width.is_finite() && max_width > 0.0) || text_width(text, font_size) <= max_width {
        return text.to_string();
    }
    let budget = max_width - text_width(ELLIPSIS, font_size);
    let mut used = 0.0;
    let mut end = 0;
    for (idx, c) in text.char_indices() {
        let w = f64::from(char_width(c)) * font_size / 1000.0;
        if used + w > budget {
            break;
        }
        used += w;
        end = idx + c.len_utf8();
    }
    let mut fitted = text[..end].trim_end().to_string();
    fitted.push_str(ELLIPSIS);
    fitted
}
