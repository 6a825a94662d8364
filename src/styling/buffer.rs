//! In-memory style sink

use serde::Serialize;

use super::sink::{StyleSink, is_dbcs_lead_byte};
use crate::iface::SC_FOLDLEVELBASE;

/// A committed run of one style over `[start, end)`
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct StyleRun {
    pub start: usize,
    pub end: usize,
    pub style: u8,
}

/// Document bytes plus the styles, fold levels and line states a
/// styling pass writes
#[derive(Debug, Clone, Default)]
pub struct StyleBuffer {
    text: Vec<u8>,
    styles: Vec<u8>,
    line_starts: Vec<usize>,
    levels: Vec<i64>,
    line_states: Vec<i64>,
    code_page: i64,
    mask: u8,
    segment_start: usize,
    runs: Vec<StyleRun>,
}

impl StyleBuffer {
    pub fn new(text: impl Into<Vec<u8>>, code_page: i64) -> Self {
        let text = text.into();
        let line_starts = line_starts(&text);
        let lines = line_starts.len();
        Self {
            styles: vec![0; text.len()],
            text,
            line_starts,
            levels: vec![SC_FOLDLEVELBASE; lines],
            line_states: vec![0; lines],
            code_page,
            mask: 0xff,
            segment_start: 0,
            runs: Vec::new(),
        }
    }

    pub fn text(&self) -> &[u8] {
        &self.text
    }

    pub fn styles(&self) -> &[u8] {
        &self.styles
    }

    /// Runs in the order they were committed; adjacent runs of the same
    /// style are merged
    pub fn runs(&self) -> &[StyleRun] {
        &self.runs
    }

    pub fn line_count(&self) -> usize {
        self.line_starts.len()
    }

    pub fn levels(&self) -> &[i64] {
        &self.levels
    }

    fn push_run(&mut self, run: StyleRun) {
        if let Some(last) = self.runs.last_mut() {
            if last.end == run.start && last.style == run.style {
                last.end = run.end;
                return;
            }
        }
        self.runs.push(run);
    }
}

/// Byte offsets where each line begins. `\r\n`, `\n` and a lone `\r`
/// all end a line.
fn line_starts(text: &[u8]) -> Vec<usize> {
    let mut starts = vec![0];
    let mut i = 0;
    while i < text.len() {
        match text[i] {
            b'\r' if text.get(i + 1) == Some(&b'\n') => {
                i += 1;
                starts.push(i + 1);
            }
            b'\r' | b'\n' => starts.push(i + 1),
            _ => {}
        }
        i += 1;
    }
    starts
}

impl StyleSink for StyleBuffer {
    fn length(&self) -> usize {
        self.text.len()
    }

    fn safe_char_at(&self, pos: usize) -> u8 {
        self.text.get(pos).copied().unwrap_or(0)
    }

    fn style_at(&self, pos: usize) -> u8 {
        self.styles.get(pos).copied().unwrap_or(0)
    }

    fn line_of(&self, pos: usize) -> usize {
        match self.line_starts.binary_search(&pos) {
            Ok(line) => line,
            Err(next) => next.saturating_sub(1),
        }
    }

    fn level_at(&self, line: usize) -> i64 {
        self.levels.get(line).copied().unwrap_or(SC_FOLDLEVELBASE)
    }

    fn set_level(&mut self, line: usize, level: i64) {
        if let Some(slot) = self.levels.get_mut(line) {
            *slot = level;
        }
    }

    fn line_state(&self, line: usize) -> i64 {
        self.line_states.get(line).copied().unwrap_or(0)
    }

    fn set_line_state(&mut self, line: usize, state: i64) {
        if let Some(slot) = self.line_states.get_mut(line) {
            *slot = state;
        }
    }

    fn is_lead_byte(&self, byte: u8) -> bool {
        is_dbcs_lead_byte(self.code_page, byte)
    }

    fn start_at(&mut self, pos: usize, mask: u8) {
        self.mask = mask;
        self.segment_start = pos;
    }

    fn start_segment(&mut self, pos: usize) {
        self.segment_start = pos;
    }

    fn start_segment_pos(&self) -> usize {
        self.segment_start
    }

    fn colour_to(&mut self, pos: usize, style: i64) {
        if pos < self.segment_start {
            return;
        }
        let style = (style as u8) & self.mask;
        let end = (pos + 1).min(self.styles.len());
        let start = self.segment_start.min(end);
        self.styles[start..end].fill(style);
        if end > start {
            self.push_run(StyleRun { start, end, style });
        }
        self.segment_start = pos + 1;
    }
}
