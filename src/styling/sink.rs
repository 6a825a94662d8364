use std::sync::{Arc, PoisonError, RwLock};

use crate::iface::SC_CP_UTF8;

/// The target of a styling pass: document bytes in, styles and per-line
/// state out
pub trait StyleSink {
    fn length(&self) -> usize;

    /// Byte at `pos`, 0 past the end
    fn safe_char_at(&self, pos: usize) -> u8;

    fn style_at(&self, pos: usize) -> u8;

    fn line_of(&self, pos: usize) -> usize;

    fn level_at(&self, line: usize) -> i64;

    fn set_level(&mut self, line: usize, level: i64);

    fn line_state(&self, line: usize) -> i64;

    fn set_line_state(&mut self, line: usize, state: i64);

    /// First byte of a two-byte character in a legacy double-byte code page
    fn is_lead_byte(&self, byte: u8) -> bool;

    fn start_at(&mut self, pos: usize, mask: u8);

    /// Begin a new pending run at `pos`
    fn start_segment(&mut self, pos: usize);

    /// Start of the pending (uncommitted) run
    fn start_segment_pos(&self) -> usize;

    /// Commit the pending run through `pos` inclusive with `style`
    fn colour_to(&mut self, pos: usize, style: i64);
}

/// Shared sinks: the script holds the cursor while the caller keeps the
/// buffer to read the results back
impl<T: StyleSink + ?Sized> StyleSink for Arc<RwLock<T>> {
    fn length(&self) -> usize {
        self.read().unwrap_or_else(PoisonError::into_inner).length()
    }

    fn safe_char_at(&self, pos: usize) -> u8 {
        self.read().unwrap_or_else(PoisonError::into_inner).safe_char_at(pos)
    }

    fn style_at(&self, pos: usize) -> u8 {
        self.read().unwrap_or_else(PoisonError::into_inner).style_at(pos)
    }

    fn line_of(&self, pos: usize) -> usize {
        self.read().unwrap_or_else(PoisonError::into_inner).line_of(pos)
    }

    fn level_at(&self, line: usize) -> i64 {
        self.read().unwrap_or_else(PoisonError::into_inner).level_at(line)
    }

    fn set_level(&mut self, line: usize, level: i64) {
        self.write().unwrap_or_else(PoisonError::into_inner).set_level(line, level)
    }

    fn line_state(&self, line: usize) -> i64 {
        self.read().unwrap_or_else(PoisonError::into_inner).line_state(line)
    }

    fn set_line_state(&mut self, line: usize, state: i64) {
        self.write().unwrap_or_else(PoisonError::into_inner).set_line_state(line, state)
    }

    fn is_lead_byte(&self, byte: u8) -> bool {
        self.read().unwrap_or_else(PoisonError::into_inner).is_lead_byte(byte)
    }

    fn start_at(&mut self, pos: usize, mask: u8) {
        self.write().unwrap_or_else(PoisonError::into_inner).start_at(pos, mask)
    }

    fn start_segment(&mut self, pos: usize) {
        self.write().unwrap_or_else(PoisonError::into_inner).start_segment(pos)
    }

    fn start_segment_pos(&self) -> usize {
        self.read().unwrap_or_else(PoisonError::into_inner).start_segment_pos()
    }

    fn colour_to(&mut self, pos: usize, style: i64) {
        self.write().unwrap_or_else(PoisonError::into_inner).colour_to(pos, style)
    }
}

/// How bytes group into characters
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Encoding {
    #[default]
    SingleByte,
    Utf8,
    /// Legacy DBCS: a lead byte starts a two-byte character
    DoubleByte,
}

impl Encoding {
    pub fn from_code_page(code_page: i64) -> Self {
        match code_page {
            0 => Encoding::SingleByte,
            SC_CP_UTF8 => Encoding::Utf8,
            _ => Encoding::DoubleByte,
        }
    }

    /// Byte length of the character starting with `lead`
    pub fn char_len(self, lead: u8, is_lead_byte: impl Fn(u8) -> bool) -> usize {
        match self {
            Encoding::SingleByte => 1,
            Encoding::Utf8 => match lead {
                0xF0.. => 4,
                0xE0.. => 3,
                0x80.. => 2,
                _ => 1,
            },
            Encoding::DoubleByte if is_lead_byte(lead) => 2,
            Encoding::DoubleByte => 1,
        }
    }
}

/// Lead-byte ranges of the common double-byte code pages
pub fn is_dbcs_lead_byte(code_page: i64, byte: u8) -> bool {
    match code_page {
        // Shift-JIS
        932 => matches!(byte, 0x81..=0x9F | 0xE0..=0xFC),
        // GBK, Korean Wansung, Big5
        936 | 949 | 950 => matches!(byte, 0x81..=0xFE),
        // Korean Johab
        1361 => matches!(byte, 0x84..=0xD3 | 0xD8..=0xDE | 0xE0..=0xF9),
        _ => false,
    }
}
