//! In-memory host backed by ropes
//!
//! Implements the messages in [`Catalog::builtin`](crate::iface::Catalog::builtin)
//! over two panes. Used by the command-line driver and by the tests.

use std::collections::HashMap;

use ropey::Rope;
use tracing::trace;

use super::{Host, Pane, Param, TextToFind};
use crate::error::{BridgeError, BridgeResult};
use crate::iface::*;

/// State of one text surface
#[derive(Debug, Default)]
struct PaneState {
    text: Rope,
    styles: Vec<u8>,
    current_pos: isize,
    anchor: isize,
    target_start: isize,
    target_end: isize,
    search_flags: isize,
    code_page: isize,
    read_only: bool,
    line_states: HashMap<isize, isize>,
    fold_levels: HashMap<isize, isize>,
    style_fore: HashMap<isize, isize>,
    keywords: HashMap<isize, String>,
    cmd_keys: HashMap<isize, isize>,
    lexer_properties: HashMap<String, String>,
    lexer_language: String,
}

impl PaneState {
    fn len(&self) -> isize {
        self.text.len_bytes() as isize
    }

    fn clamp(&self, pos: isize) -> usize {
        pos.clamp(0, self.len()) as usize
    }

    fn bytes(&self, from: isize, to: isize) -> Vec<u8> {
        let from = self.clamp(from);
        let to = self.clamp(to);
        if to <= from {
            return Vec::new();
        }
        self.text.bytes_at(from).take(to - from).collect()
    }

    fn byte_at(&self, pos: isize) -> isize {
        if pos < 0 || pos >= self.len() {
            0
        } else {
            self.text.byte(pos as usize) as isize
        }
    }

    fn insert(&mut self, pos: isize, text: &[u8]) -> isize {
        if self.read_only || text.is_empty() {
            return 0;
        }
        let at = self.clamp(pos);
        let char_idx = self.text.byte_to_char(at);
        // Snap to the character boundary the rope inserted at
        let at = self.text.char_to_byte(char_idx);
        let text = String::from_utf8_lossy(text);
        self.text.insert(char_idx, &text);
        let added = text.len();
        self.styles.splice(at..at, std::iter::repeat(0).take(added));
        for pos in [&mut self.current_pos, &mut self.anchor] {
            if *pos >= at as isize {
                *pos += added as isize;
            }
        }
        added as isize
    }

    fn remove(&mut self, from: isize, to: isize) {
        if self.read_only {
            return;
        }
        let from_char = self.text.byte_to_char(self.clamp(from));
        let to_char = self.text.byte_to_char(self.clamp(to));
        if to_char <= from_char {
            return;
        }
        let from = self.text.char_to_byte(from_char);
        let to = self.text.char_to_byte(to_char);
        self.text.remove(from_char..to_char);
        self.styles.drain(from..to.min(self.styles.len()));
        let removed = (to - from) as isize;
        for pos in [&mut self.current_pos, &mut self.anchor] {
            if *pos >= to as isize {
                *pos -= removed;
            } else if *pos > from as isize {
                *pos = from as isize;
            }
        }
    }

    fn line_from_position(&self, pos: isize) -> isize {
        let char_idx = self.text.byte_to_char(self.clamp(pos));
        self.text.char_to_line(char_idx) as isize
    }

    fn line_start(&self, line: isize) -> isize {
        if line < 0 || line as usize > self.text.len_lines() {
            return -1;
        }
        if line as usize == self.text.len_lines() {
            return self.len();
        }
        self.text.char_to_byte(self.text.line_to_char(line as usize)) as isize
    }

    fn line_bytes(&self, line: isize) -> Vec<u8> {
        let start = self.line_start(line);
        if start < 0 {
            return Vec::new();
        }
        let end = self.line_start(line + 1);
        let end = if end < 0 { self.len() } else { end };
        self.bytes(start, end)
    }

    fn line_end(&self, line: isize) -> isize {
        let start = self.line_start(line);
        if start < 0 {
            return -1;
        }
        let bytes = self.line_bytes(line);
        let eol = bytes
            .iter()
            .rev()
            .take_while(|&&b| b == b'\n' || b == b'\r')
            .count();
        start + (bytes.len() - eol) as isize
    }

    fn set_text(&mut self, text: &[u8]) {
        if self.read_only {
            return;
        }
        self.text = Rope::from_str(&String::from_utf8_lossy(text));
        self.styles = vec![0; self.text.len_bytes()];
        self.current_pos = 0;
        self.anchor = 0;
    }

    fn selection(&self) -> (isize, isize) {
        (self.anchor.min(self.current_pos), self.anchor.max(self.current_pos))
    }

    fn find(&self, flags: isize, request: &mut TextToFind) -> isize {
        let min = self.clamp(request.min);
        let max = self.clamp(request.max);
        let needle = request.text.as_bytes();
        if max < min || max - min < needle.len() {
            return -1;
        }
        let haystack = self.bytes(min as isize, max as isize);
        let match_case = flags as i64 & SCFIND_MATCHCASE != 0;
        let whole_word = flags as i64 & SCFIND_WHOLEWORD != 0;
        let is_word = |b: u8| b.is_ascii_alphanumeric() || b == b'_';

        for offset in 0..=(haystack.len() - needle.len()) {
            let candidate = &haystack[offset..offset + needle.len()];
            let hit = if match_case {
                candidate == needle
            } else {
                candidate.eq_ignore_ascii_case(needle)
            };
            if !hit {
                continue;
            }
            let start = (min + offset) as isize;
            let end = start + needle.len() as isize;
            if whole_word {
                let before = start > 0 && is_word(self.byte_at(start - 1) as u8);
                let after = end < self.len() && is_word(self.byte_at(end) as u8);
                if before || after {
                    continue;
                }
            }
            request.found = (start, end);
            return start;
        }
        -1
    }
}

/// Copy `bytes` into a caller buffer, NUL-terminating when there is room.
/// Returns the number of text bytes copied.
fn copy_out(buf: &mut [u8], bytes: &[u8]) -> isize {
    let n = bytes.len().min(buf.len());
    buf[..n].copy_from_slice(&bytes[..n]);
    if n < buf.len() {
        buf[n] = 0;
    }
    n as isize
}

/// Two-phase string result: report the length when no buffer is given,
/// fill the buffer otherwise
fn string_result(lparam: Param<'_>, bytes: &[u8]) -> isize {
    match lparam {
        Param::Buffer(buf) => copy_out(buf, bytes),
        _ => bytes.len() as isize,
    }
}

/// Host with an editor pane and an output pane held in memory
#[derive(Debug)]
pub struct MemoryHost {
    panes: [PaneState; 2],
    properties: HashMap<String, String>,
}

impl MemoryHost {
    pub fn new() -> Self {
        let pane = || PaneState {
            lexer_language: "null".to_string(),
            ..PaneState::default()
        };
        Self {
            panes: [pane(), pane()],
            properties: HashMap::new(),
        }
    }

    /// Create a host whose editor pane holds `text`
    pub fn with_text(text: &str) -> Self {
        let mut host = Self::new();
        host.pane_mut(Pane::Editor).set_text(text.as_bytes());
        host
    }

    fn pane(&self, pane: Pane) -> &PaneState {
        match pane {
            Pane::Editor => &self.panes[0],
            Pane::Output => &self.panes[1],
        }
    }

    fn pane_mut(&mut self, pane: Pane) -> &mut PaneState {
        match pane {
            Pane::Editor => &mut self.panes[0],
            Pane::Output => &mut self.panes[1],
        }
    }

    /// Full contents of a pane
    pub fn text(&self, pane: Pane) -> String {
        self.pane(pane).text.to_string()
    }

    pub fn set_code_page(&mut self, pane: Pane, code_page: isize) {
        self.pane_mut(pane).code_page = code_page;
    }
}

impl Default for MemoryHost {
    fn default() -> Self {
        Self::new()
    }
}

impl Host for MemoryHost {
    fn send(&mut self, pane: Pane, message: i64, wparam: Param<'_>, lparam: Param<'_>) -> BridgeResult<isize> {
        trace!(pane = pane.name(), message, "send");
        let w = wparam.int();
        let state = self.pane_mut(pane);

        let result = match message {
            SCI_GETLENGTH | SCI_GETTEXTLENGTH => state.len(),
            SCI_GETCHARAT => {
                let b = state.byte_at(w);
                b as u8 as i8 as isize
            }
            SCI_GETSTYLEAT => state.styles.get(w.max(0) as usize).copied().unwrap_or(0) as isize,
            SCI_GETCURRENTPOS => state.current_pos,
            SCI_SETCURRENTPOS => {
                state.current_pos = state.clamp(w) as isize;
                0
            }
            SCI_GETANCHOR => state.anchor,
            SCI_SETANCHOR => {
                state.anchor = state.clamp(w) as isize;
                0
            }
            SCI_GOTOPOS => {
                state.current_pos = state.clamp(w) as isize;
                state.anchor = state.current_pos;
                0
            }
            SCI_SETSEL => {
                state.anchor = state.clamp(w) as isize;
                let caret = lparam.int();
                state.current_pos = if caret < 0 { state.len() } else { state.clamp(caret) as isize };
                0
            }
            SCI_SELECTALL => {
                state.anchor = 0;
                state.current_pos = state.len();
                0
            }
            SCI_GETSELTEXT => {
                let (from, to) = state.selection();
                let bytes = state.bytes(from, to);
                string_result(lparam, &bytes)
            }
            SCI_REPLACESEL => {
                let (from, to) = state.selection();
                state.remove(from, to);
                let added = state.insert(from, lparam.text());
                state.current_pos = from + added;
                state.anchor = state.current_pos;
                0
            }
            SCI_GETCODEPAGE => state.code_page,
            SCI_SETCODEPAGE => {
                state.code_page = w;
                0
            }
            SCI_GETREADONLY => state.read_only as isize,
            SCI_SETREADONLY => {
                state.read_only = w != 0;
                0
            }
            SCI_GETLINECOUNT => state.text.len_lines() as isize,
            SCI_LINEFROMPOSITION => state.line_from_position(w),
            SCI_POSITIONFROMLINE => state.line_start(w),
            SCI_GETLINEENDPOSITION => state.line_end(w),
            SCI_LINELENGTH => state.line_bytes(w).len() as isize,
            SCI_GETLINE => {
                let bytes = state.line_bytes(w);
                string_result(lparam, &bytes)
            }
            SCI_GETCURLINE => {
                let line = state.line_from_position(state.current_pos);
                let bytes = state.line_bytes(line);
                match lparam {
                    Param::Buffer(buf) => {
                        copy_out(buf, &bytes);
                        state.current_pos - state.line_start(line)
                    }
                    _ => bytes.len() as isize,
                }
            }
            SCI_GETTEXT => {
                let bytes = state.bytes(0, state.len());
                string_result(lparam, &bytes)
            }
            SCI_SETTEXT => {
                state.set_text(lparam.text());
                0
            }
            SCI_CLEARALL => {
                state.set_text(&[]);
                0
            }
            SCI_ADDTEXT => {
                let text = lparam.text();
                let text = &text[..(w.max(0) as usize).min(text.len())];
                let at = state.current_pos;
                let added = state.insert(at, text);
                state.current_pos = at + added;
                state.anchor = state.current_pos;
                0
            }
            SCI_INSERTTEXT => {
                let at = if w < 0 { state.current_pos } else { w };
                state.insert(at, lparam.text());
                0
            }
            SCI_APPENDTEXT => {
                let text = lparam.text();
                let text = &text[..(w.max(0) as usize).min(text.len())];
                let end = state.len();
                state.insert(end, text);
                0
            }
            SCI_GETTARGETSTART => state.target_start,
            SCI_SETTARGETSTART => {
                state.target_start = state.clamp(w) as isize;
                0
            }
            SCI_GETTARGETEND => state.target_end,
            SCI_SETTARGETEND => {
                state.target_end = state.clamp(w) as isize;
                0
            }
            SCI_REPLACETARGET => {
                let text = lparam.text();
                let text = if w < 0 { text } else { &text[..(w as usize).min(text.len())] };
                let (from, to) = (state.target_start, state.target_end.max(state.target_start));
                state.remove(from, to);
                let added = state.insert(from, text);
                state.target_end = from + added;
                added
            }
            SCI_GETSEARCHFLAGS => state.search_flags,
            SCI_SETSEARCHFLAGS => {
                state.search_flags = w;
                0
            }
            SCI_FINDTEXT => match lparam {
                Param::Find(request) => state.find(w, request),
                _ => return Err(BridgeError::Host("SCI_FINDTEXT requires a search request".into())),
            },
            SCI_GETLINESTATE => state.line_states.get(&w).copied().unwrap_or(0),
            SCI_SETLINESTATE => {
                state.line_states.insert(w, lparam.int());
                0
            }
            SCI_GETFOLDLEVEL => state.fold_levels.get(&w).copied().unwrap_or(SC_FOLDLEVELBASE as isize),
            SCI_SETFOLDLEVEL => {
                state.fold_levels.insert(w, lparam.int());
                0
            }
            SCI_STYLEGETFORE => state.style_fore.get(&w).copied().unwrap_or(0),
            SCI_STYLESETFORE => {
                state.style_fore.insert(w, lparam.int());
                0
            }
            SCI_SETKEYWORDS => {
                let words = String::from_utf8_lossy(lparam.text()).into_owned();
                state.keywords.insert(w, words);
                0
            }
            SCI_SETPROPERTY => {
                let key = String::from_utf8_lossy(wparam.text()).into_owned();
                let value = String::from_utf8_lossy(lparam.text()).into_owned();
                state.lexer_properties.insert(key, value);
                0
            }
            SCI_GETPROPERTY => {
                let key = String::from_utf8_lossy(wparam.text()).into_owned();
                let value = state.lexer_properties.get(&key).cloned().unwrap_or_default();
                string_result(lparam, value.as_bytes())
            }
            SCI_GETLEXERLANGUAGE => {
                let name = state.lexer_language.clone();
                string_result(lparam, name.as_bytes())
            }
            SCI_ASSIGNCMDKEY => {
                state.cmd_keys.insert(w, lparam.int());
                0
            }
            SCI_CLEARCMDKEY => {
                state.cmd_keys.remove(&w);
                0
            }
            _ => {
                return Err(BridgeError::Host(format!(
                    "message {} is not supported by the {} pane",
                    message,
                    pane.name()
                )));
            }
        };
        Ok(result)
    }

    fn insert(&mut self, pane: Pane, pos: isize, text: &str) -> BridgeResult<()> {
        self.pane_mut(pane).insert(pos, text.as_bytes());
        Ok(())
    }

    fn remove(&mut self, pane: Pane, from: isize, to: isize) -> BridgeResult<()> {
        self.pane_mut(pane).remove(from, to);
        Ok(())
    }

    fn range(&self, pane: Pane, from: isize, to: isize) -> BridgeResult<String> {
        let bytes = self.pane(pane).bytes(from, to);
        Ok(String::from_utf8_lossy(&bytes).into_owned())
    }

    fn trace(&mut self, text: &str) {
        let output = self.pane_mut(Pane::Output);
        let end = output.len();
        output.insert(end, text.as_bytes());
    }

    fn property(&self, key: &str) -> String {
        self.properties.get(key).cloned().unwrap_or_default()
    }

    fn set_property(&mut self, key: &str, value: &str) {
        self.properties.insert(key.to_string(), value.to_string());
    }

    fn unset_property(&mut self, key: &str) {
        self.properties.remove(key);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn length_and_range() {
        let mut host = MemoryHost::with_text("hello\nworld");
        assert_eq!(host.length(Pane::Editor).unwrap(), 11);
        assert_eq!(host.range(Pane::Editor, 6, 11).unwrap(), "world");
        assert_eq!(host.range(Pane::Editor, 6, 100).unwrap(), "world");
    }

    #[test]
    fn string_result_probe_then_fill() {
        let mut host = MemoryHost::with_text("abc");
        let len = host
            .send(Pane::Editor, SCI_GETTEXT, Param::Int(0), Param::Int(0))
            .unwrap();
        assert_eq!(len, 3);
        let mut buf = vec![0xffu8; 4];
        host.send(Pane::Editor, SCI_GETTEXT, Param::Int(len), Param::Buffer(&mut buf))
            .unwrap();
        assert_eq!(buf, b"abc\0");
    }

    #[test]
    fn insert_and_remove_track_caret() {
        let mut host = MemoryHost::with_text("world");
        host.send(Pane::Editor, SCI_GOTOPOS, Param::Int(5), Param::Int(0))
            .unwrap();
        host.insert(Pane::Editor, 0, "hello ").unwrap();
        assert_eq!(host.text(Pane::Editor), "hello world");
        assert_eq!(
            host.send(Pane::Editor, SCI_GETCURRENTPOS, Param::Int(0), Param::Int(0))
                .unwrap(),
            11
        );
        host.remove(Pane::Editor, 0, 6).unwrap();
        assert_eq!(host.text(Pane::Editor), "world");
    }

    #[test]
    fn find_respects_case_flag() {
        let mut host = MemoryHost::with_text("Foo foo");
        assert_eq!(
            host.find_text(Pane::Editor, 0, 0, 7, "foo").unwrap(),
            Some((0, 3))
        );
        assert_eq!(
            host.find_text(Pane::Editor, SCFIND_MATCHCASE, 0, 7, "foo").unwrap(),
            Some((4, 7))
        );
        assert_eq!(host.find_text(Pane::Editor, 0, 0, 7, "bar").unwrap(), None);
    }

    #[test]
    fn empty_pattern_matches_at_start() {
        let mut host = MemoryHost::with_text("abc");
        assert_eq!(host.find_text(Pane::Editor, 0, 1, 3, "").unwrap(), Some((1, 1)));
    }

    #[test]
    fn replace_target_reports_new_end() {
        let mut host = MemoryHost::with_text("xababx");
        host.send(Pane::Editor, SCI_SETTARGETSTART, Param::Int(1), Param::Int(0))
            .unwrap();
        host.send(Pane::Editor, SCI_SETTARGETEND, Param::Int(3), Param::Int(0))
            .unwrap();
        host.send(Pane::Editor, SCI_REPLACETARGET, Param::Int(4), Param::Str(b"WXYZ"))
            .unwrap();
        assert_eq!(host.text(Pane::Editor), "xWXYZabx");
        assert_eq!(
            host.send(Pane::Editor, SCI_GETTARGETEND, Param::Int(0), Param::Int(0))
                .unwrap(),
            5
        );
    }

    #[test]
    fn line_queries() {
        let mut host = MemoryHost::with_text("ab\r\ncd\nef");
        let send = |host: &mut MemoryHost, msg, w| {
            host.send(Pane::Editor, msg, Param::Int(w), Param::Int(0)).unwrap()
        };
        assert_eq!(send(&mut host, SCI_GETLINECOUNT, 0), 3);
        assert_eq!(send(&mut host, SCI_POSITIONFROMLINE, 1), 4);
        assert_eq!(send(&mut host, SCI_GETLINEENDPOSITION, 0), 2);
        assert_eq!(send(&mut host, SCI_LINEFROMPOSITION, 8), 2);
        assert_eq!(send(&mut host, SCI_LINELENGTH, 0), 4);
    }

    #[test]
    fn read_only_pane_ignores_edits() {
        let mut host = MemoryHost::with_text("fixed");
        host.send(Pane::Editor, SCI_SETREADONLY, Param::Int(1), Param::Int(0))
            .unwrap();
        host.insert(Pane::Editor, 0, "not ").unwrap();
        assert_eq!(host.text(Pane::Editor), "fixed");
    }

    #[test]
    fn trace_appends_to_output() {
        let mut host = MemoryHost::new();
        host.trace("one\n");
        host.trace("two\n");
        assert_eq!(host.text(Pane::Output), "one\ntwo\n");
    }

    #[test]
    fn unknown_message_is_a_host_error() {
        let mut host = MemoryHost::new();
        assert!(matches!(
            host.send(Pane::Editor, 1, Param::Int(0), Param::Int(0)),
            Err(BridgeError::Host(_))
        ));
    }
}
