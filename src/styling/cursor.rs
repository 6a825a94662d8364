//! Character cursor driven by a script lexer

use tracing::trace;

use super::sink::{Encoding, StyleSink};

const EMPTY_SLOT: [u8; 4] = [0; 4];

/// Walks a range of the document one character at a time, keeping the
/// previous, current and next characters decoded and committing style runs
/// to the sink as the state changes.
///
/// The three slots rotate: slot `cursor % 3` is current, `+1` is next and
/// `+2` is previous.
#[derive(Debug)]
pub struct StylingCursor<S> {
    sink: S,
    encoding: Encoding,

    // Arguments of the styling request
    start_pos: usize,
    length_doc: usize,
    init_style: i64,

    end_pos: usize,
    end_doc: usize,
    current_pos: usize,
    at_line_start: bool,
    at_line_end: bool,
    state: i64,

    slots: [[u8; 4]; 3],
    cursor: usize,
    len_current: usize,
    len_next: usize,
}

impl<S: StyleSink> StylingCursor<S> {
    /// A cursor for the request `(start_pos, length_doc, init_style)`.
    /// Nothing is read until [`StylingCursor::start_styling`].
    pub fn new(sink: S, start_pos: usize, length_doc: usize, init_style: i64, code_page: i64) -> Self {
        Self {
            sink,
            encoding: Encoding::from_code_page(code_page),
            start_pos,
            length_doc,
            init_style,
            end_pos: 0,
            end_doc: 0,
            current_pos: 0,
            at_line_start: true,
            at_line_end: false,
            state: init_style,
            slots: [EMPTY_SLOT; 3],
            cursor: 0,
            len_current: 0,
            len_next: 0,
        }
    }

    pub fn sink(&self) -> &S {
        &self.sink
    }

    pub fn into_sink(self) -> S {
        self.sink
    }

    pub fn start_pos(&self) -> usize {
        self.start_pos
    }

    pub fn length_doc(&self) -> usize {
        self.length_doc
    }

    pub fn init_style(&self) -> i64 {
        self.init_style
    }

    pub fn start_styling(&mut self, pos: usize, length: usize, initial_state: i64) {
        self.end_doc = self.sink.length();
        self.end_pos = pos + length;
        // Leave room for one zero-width step past the last character
        if self.end_pos == self.end_doc {
            self.end_pos = self.end_doc + 1;
        }
        self.current_pos = pos;
        self.at_line_start = true;
        self.at_line_end = false;
        self.state = initial_state;
        self.cursor = 0;
        self.len_current = 0;
        self.len_next = 0;
        self.slots = [EMPTY_SLOT; 3];
        self.sink.start_at(pos, 0xff);
        self.sink.start_segment(pos);
        trace!(pos, length, initial_state, end_pos = self.end_pos, "start styling");

        self.read_next();
        self.cursor += 1;
        self.read_next();
    }

    /// Flush whatever is pending
    pub fn end_styling(&mut self) {
        self.colourize();
    }

    pub fn more(&self) -> bool {
        self.current_pos < self.end_pos
    }

    pub fn forward(&mut self) {
        if self.current_pos < self.end_pos {
            self.at_line_start = self.at_line_end;
            self.current_pos += self.len_current;
            self.cursor = (self.cursor + 1) % 3;
            self.read_next();
        } else {
            self.at_line_start = false;
            self.slots = [EMPTY_SLOT; 3];
            self.at_line_end = true;
        }
    }

    pub fn position(&self) -> usize {
        self.current_pos
    }

    pub fn at_line_start(&self) -> bool {
        self.at_line_start
    }

    pub fn at_line_end(&self) -> bool {
        self.at_line_end
    }

    pub fn state(&self) -> i64 {
        self.state
    }

    /// Commit the run so far under the old state, then switch
    pub fn set_state(&mut self, state: i64) {
        self.colourize();
        self.state = state;
    }

    pub fn forward_set_state(&mut self, state: i64) {
        self.forward();
        self.set_state(state);
    }

    /// Relabel the pending run without committing it
    pub fn change_state(&mut self, state: i64) {
        self.state = state;
    }

    pub fn current(&self) -> String {
        self.slot_text(self.cursor % 3)
    }

    pub fn next(&self) -> String {
        self.slot_text((self.cursor + 1) % 3)
    }

    pub fn previous(&self) -> String {
        self.slot_text((self.cursor + 2) % 3)
    }

    /// Text from the start of the pending run up to the character before
    /// the cursor, at least one byte
    pub fn token(&self) -> String {
        let start = self.sink.start_segment_pos();
        let len = (self.current_pos as isize - start as isize).max(1) as usize;
        let bytes: Vec<u8> = (0..len)
            .map(|i| self.sink.safe_char_at(start + i))
            .take_while(|&b| b != 0)
            .collect();
        String::from_utf8_lossy(&bytes).into_owned()
    }

    /// Whether the document continues with exactly `pattern` at the cursor
    pub fn matches(&self, pattern: &str) -> bool {
        pattern
            .bytes()
            .enumerate()
            .all(|(n, b)| self.sink.safe_char_at(self.current_pos + n) == b)
    }

    pub fn line(&self, pos: usize) -> usize {
        self.sink.line_of(pos)
    }

    pub fn char_at(&self, pos: usize) -> u8 {
        self.sink.safe_char_at(pos)
    }

    pub fn style_at(&self, pos: usize) -> u8 {
        self.sink.style_at(pos)
    }

    pub fn level_at(&self, line: usize) -> i64 {
        self.sink.level_at(line)
    }

    pub fn set_level_at(&mut self, line: usize, level: i64) {
        self.sink.set_level(line, level);
    }

    pub fn line_state(&self, line: usize) -> i64 {
        self.sink.line_state(line)
    }

    pub fn set_line_state(&mut self, line: usize, state: i64) {
        self.sink.set_line_state(line, state);
    }

    fn slot_text(&self, slot: usize) -> String {
        let bytes = &self.slots[slot];
        let len = bytes.iter().position(|&b| b == 0).unwrap_or(bytes.len());
        String::from_utf8_lossy(&bytes[..len]).into_owned()
    }

    fn colourize(&mut self) {
        let end = (self.current_pos as isize - 1).min(self.end_doc as isize - 1);
        if end >= 0 {
            self.sink.colour_to(end as usize, self.state);
        }
    }

    /// Decode the character after the current one into the next slot and
    /// recompute the line-end flag
    fn read_next(&mut self) {
        self.len_current = self.len_next;
        let next_pos = self.current_pos + self.len_current;
        let lead = self.sink.safe_char_at(next_pos);
        let sink = &self.sink;
        self.len_next = self.encoding.char_len(lead, |b| sink.is_lead_byte(b));

        let next_slot = (self.cursor + 1) % 3;
        let mut bytes = EMPTY_SLOT;
        for (i, byte) in bytes.iter_mut().enumerate().take(self.len_next) {
            *byte = self.sink.safe_char_at(next_pos + i);
        }
        self.slots[next_slot] = bytes;

        // CR alone or LF ends a line; CR before LF does not, so CRLF
        // triggers once. The last character of the document always ends
        // its line.
        let ch = self.slots[self.cursor % 3][0];
        self.at_line_end = ch == b'\n'
            || (ch == b'\r' && bytes[0] != b'\n')
            || self.current_pos >= self.end_pos
            || self.current_pos + self.len_current >= self.end_doc;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::iface::SC_CP_UTF8;
    use crate::styling::StyleBuffer;

    fn cursor(text: &str, code_page: i64) -> StylingCursor<StyleBuffer> {
        let mut c = StylingCursor::new(StyleBuffer::new(text, code_page), 0, text.len(), 0, code_page);
        c.start_styling(0, text.len(), 0);
        c
    }

    #[test]
    fn current_is_valid_after_start() {
        let c = cursor("ab", 0);
        assert_eq!(c.current(), "a");
        assert_eq!(c.next(), "b");
        assert_eq!(c.previous(), "");
        assert!(c.at_line_start());
    }

    #[test]
    fn crlf_line_end_triggers_once() {
        let mut c = cursor("a\r\nb", 0);
        let mut seen = Vec::new();
        while c.more() {
            seen.push((c.current(), c.at_line_end()));
            c.forward();
        }
        assert_eq!(
            seen[..4],
            [
                ("a".to_string(), false),
                ("\r".to_string(), false),
                ("\n".to_string(), true),
                ("b".to_string(), true),
            ]
        );
    }

    #[test]
    fn line_start_follows_line_end() {
        let mut c = cursor("x\ny", 0);
        c.forward();
        assert!(!c.at_line_start());
        c.forward();
        assert!(c.at_line_start());
        assert_eq!(c.current(), "y");
        assert_eq!(c.previous(), "\n");
    }

    #[test]
    fn forward_at_end_is_idempotent() {
        let mut c = cursor("ab", 0);
        while c.more() {
            c.forward();
        }
        let pos = c.position();
        c.forward();
        c.forward();
        assert_eq!(c.position(), pos);
        assert!(c.at_line_end());
        assert!(!c.at_line_start());
        assert_eq!(c.current(), "");
    }

    #[test]
    fn extra_zero_width_step_at_document_end() {
        let mut c = cursor("ab", 0);
        let mut steps = 0;
        while c.more() {
            c.forward();
            steps += 1;
        }
        assert_eq!(steps, 3);

        let mut partial = StylingCursor::new(StyleBuffer::new("abcd", 0), 0, 2, 0, 0);
        partial.start_styling(0, 2, 0);
        let mut steps = 0;
        while partial.more() {
            partial.forward();
            steps += 1;
        }
        assert_eq!(steps, 2);
    }

    #[test]
    fn utf8_characters_are_whole() {
        let mut c = cursor("é€😀a", SC_CP_UTF8);
        let mut chars = Vec::new();
        while c.more() {
            chars.push(c.current());
            c.forward();
        }
        assert_eq!(chars[..4], ["é", "€", "😀", "a"]);
        assert_eq!(c.position(), "é€😀a".len() + 1);
    }

    #[test]
    fn double_byte_characters_are_whole() {
        // Shift-JIS hiragana, ASCII, hiragana
        let text = vec![0x82, 0xA0, b'x', 0x82, 0xA2];
        let len = text.len();
        let mut c = StylingCursor::new(StyleBuffer::new(text, 932), 0, len, 0, 932);
        c.start_styling(0, len, 0);

        // Both bytes of the lead character sit in the current slot
        assert_eq!(c.current().chars().count(), 2);
        assert_eq!(c.next(), "x");

        c.forward();
        assert_eq!(c.position(), 2);
        assert_eq!(c.current(), "x");
        c.forward();
        assert_eq!(c.position(), 3);
        c.forward();
        assert_eq!(c.position(), 5);

        // The same bytes in a single-byte code page step one at a time
        let mut single = StylingCursor::new(StyleBuffer::new(vec![0x82, 0xA0, b'x'], 0), 0, 3, 0, 0);
        single.start_styling(0, 3, 0);
        single.forward();
        assert_eq!(single.position(), 1);
    }

    #[test]
    fn set_state_commits_change_state_does_not() {
        let mut c = cursor("abcd", 0);
        c.forward();
        c.forward();
        c.set_state(1);
        let boundary = c.sink().start_segment_pos();
        assert_eq!(boundary, 2);
        c.change_state(1);
        assert_eq!(c.sink().start_segment_pos(), boundary);
    }

    #[test]
    fn styles_runs_and_token() {
        let mut c = cursor("ab 12", 0);
        while c.more() {
            if c.position() == 2 {
                assert_eq!(c.token(), "ab");
            }
            match c.state() {
                0 if c.current() == " " => c.set_state(1),
                1 if c.current() != " " => c.set_state(2),
                _ => {}
            }
            c.forward();
        }
        c.end_styling();
        let buf = c.into_sink();
        assert_eq!(buf.styles(), &[0, 0, 1, 2, 2]);
    }

    #[test]
    fn token_is_at_least_one_byte() {
        let c = cursor("xyz", 0);
        assert_eq!(c.token(), "x");
    }

    #[test]
    fn forward_set_state_flushes_through_current() {
        let mut c = cursor("\"s\" x", 0);
        c.set_state(5);
        c.forward();
        while c.current() != "\"" {
            c.forward();
        }
        c.forward_set_state(0);
        assert_eq!(c.sink().start_segment_pos(), 3);
        c.end_styling();
        assert_eq!(&c.sink().styles()[..3], &[5, 5, 5]);
    }

    #[test]
    fn literal_match_at_cursor() {
        let mut c = cursor("let x", 0);
        assert!(c.matches("let"));
        assert!(!c.matches("lex"));
        c.forward();
        assert!(c.matches("et x"));
        assert!(!c.matches("et xy"));
    }

    #[test]
    fn sink_passthrough() {
        let mut c = cursor("a\nb", 0);
        assert_eq!(c.line(2), 1);
        assert_eq!(c.char_at(2), b'b');
        c.set_level_at(1, 0x401);
        assert_eq!(c.level_at(1), 0x401);
        c.set_line_state(0, 3);
        assert_eq!(c.line_state(0), 3);
        assert_eq!(c.style_at(0), 0);
    }
}
