//! Repeated literal search over a pane

use std::fmt;

use tracing::trace;

use super::session::Session;
use crate::error::{BridgeError, BridgeResult};
use crate::host::{Pane, Param};
use crate::iface::{SCI_GETTARGETEND, SCI_REPLACETARGET, SCI_SETTARGETEND, SCI_SETTARGETSTART};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MatchState {
    /// Created, nothing found yet
    Fresh,
    /// Positioned on a match
    Active,
    /// Terminal; every further use fails
    Exhausted,
}

/// One hit: byte bounds plus the text at the time it was found
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Match {
    pub start: isize,
    pub end: isize,
    pub text: String,
}

/// Pull-based search state machine.
///
/// Each [`MatchIterator::next`] resumes after the previous match; a
/// zero-length match forces the next search one byte further so the
/// iterator always makes progress.
#[derive(Debug, Clone)]
pub struct MatchIterator {
    pane: Pane,
    pattern: String,
    flags: i64,
    start_pos: isize,
    end_pos: isize,
    /// End of the match as found, before any replacement moved `end_pos`
    end_pos_orig: isize,
    state: MatchState,
}

impl MatchIterator {
    pub fn new(pane: Pane, pattern: &str, flags: i64, start: isize) -> BridgeResult<Self> {
        if start < 0 {
            return Err(BridgeError::InvalidArgument(
                "match start position must be zero or positive".into(),
            ));
        }
        Ok(Self {
            pane,
            pattern: pattern.to_string(),
            flags,
            start_pos: -1,
            end_pos: start,
            end_pos_orig: start,
            state: MatchState::Fresh,
        })
    }

    pub fn state(&self) -> MatchState {
        self.state
    }

    pub fn pane(&self) -> Pane {
        self.pane
    }

    pub fn pattern(&self) -> &str {
        &self.pattern
    }

    fn is_corrupt(&self) -> bool {
        self.start_pos < 0 || self.end_pos < self.start_pos
    }

    /// Usable for `text`, `pos`, `len` and `replace`
    fn check_active(&self) -> BridgeResult<()> {
        if self.state != MatchState::Active || self.is_corrupt() {
            return Err(BridgeError::InvalidatedObject);
        }
        Ok(())
    }

    fn invalidate(&mut self) {
        self.start_pos = -1;
        self.end_pos = -1;
        self.end_pos_orig = -1;
        self.state = MatchState::Exhausted;
    }

    /// Advance to the following match. `None` means the search ran off the
    /// end of the pane; the iterator is exhausted from then on.
    pub fn next(&mut self, session: &mut Session) -> BridgeResult<Option<Match>> {
        match self.state {
            MatchState::Exhausted => return Err(BridgeError::InvalidatedObject),
            MatchState::Active if self.is_corrupt() => return Err(BridgeError::InvalidatedObject),
            _ => {}
        }
        session.check_pane(self.pane)?;

        let mut search_pos = self.end_pos;
        if self.start_pos == self.end_pos_orig && self.end_pos_orig == self.end_pos {
            search_pos += 1;
        }

        let host = session.host_mut();
        let doc_end = host.length(self.pane)?;
        if search_pos >= doc_end {
            trace!(search_pos, doc_end, "match exhausted at document end");
            self.invalidate();
            return Ok(None);
        }

        match host.find_text(self.pane, self.flags, search_pos, doc_end, &self.pattern)? {
            Some((start, end)) => {
                trace!(start, end, pattern = %self.pattern, "match found");
                self.start_pos = start;
                self.end_pos = end;
                self.end_pos_orig = end;
                self.state = MatchState::Active;
                let text = host.range(self.pane, start, end)?;
                Ok(Some(Match { start, end, text }))
            }
            None => {
                trace!(search_pos, pattern = %self.pattern, "no further match");
                self.invalidate();
                Ok(None)
            }
        }
    }

    /// Current match text, read from the pane each time
    pub fn text(&self, session: &Session) -> BridgeResult<String> {
        self.check_active()?;
        session.check_pane(self.pane)?;
        session.host().range(self.pane, self.start_pos, self.end_pos)
    }

    pub fn pos(&self) -> BridgeResult<isize> {
        self.check_active()?;
        Ok(self.start_pos)
    }

    pub fn len(&self) -> BridgeResult<isize> {
        self.check_active()?;
        Ok(self.end_pos - self.start_pos)
    }

    /// Substitute the current match through the pane's target and resume
    /// the next search after the inserted text
    pub fn replace(&mut self, session: &mut Session, text: &str) -> BridgeResult<()> {
        self.check_active()?;
        session.check_pane(self.pane)?;

        let host = session.host_mut();
        host.send(self.pane, SCI_SETTARGETSTART, Param::Int(self.start_pos), Param::Int(0))?;
        host.send(self.pane, SCI_SETTARGETEND, Param::Int(self.end_pos), Param::Int(0))?;
        host.send(
            self.pane,
            SCI_REPLACETARGET,
            Param::Int(text.len() as isize),
            Param::Str(text.as_bytes()),
        )?;
        self.end_pos = host.send(self.pane, SCI_GETTARGETEND, Param::Int(0), Param::Int(0))?;
        trace!(start = self.start_pos, end = self.end_pos, "match replaced");
        Ok(())
    }

    /// Drive the iterator to exhaustion, handing each match to `f` along
    /// with the iterator itself so the callback can `replace`.
    /// Returns the number of matches visited.
    pub fn for_each<F>(&mut self, session: &mut Session, mut f: F) -> BridgeResult<usize>
    where
        F: FnMut(&mut Self, &mut Session, &Match) -> BridgeResult<()>,
    {
        let mut count = 0;
        while let Some(found) = self.next(session)? {
            f(self, session, &found)?;
            count += 1;
        }
        Ok(count)
    }
}

impl fmt::Display for MatchIterator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.check_active().is_ok() {
            write!(f, "match{{pos={},len={}}}", self.start_pos, self.end_pos - self.start_pos)
        } else {
            write!(f, "match(invalidated)")
        }
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use super::*;
    use crate::host::MemoryHost;
    use crate::iface::Catalog;

    fn session(text: &str) -> Session {
        let mut session = Session::new(Box::new(MemoryHost::with_text(text)), Arc::new(Catalog::builtin()));
        session.activate_buffer(0);
        session
    }

    #[test]
    fn finds_successive_matches_then_invalidates() {
        let mut s = session("xababx");
        let mut it = MatchIterator::new(Pane::Editor, "ab", 0, 0).unwrap();

        let first = it.next(&mut s).unwrap().unwrap();
        assert_eq!((first.start, first.end), (1, 3));
        assert_eq!(first.text, "ab");
        assert_eq!(it.to_string(), "match{pos=1,len=2}");

        let second = it.next(&mut s).unwrap().unwrap();
        assert_eq!((second.start, second.end), (3, 5));

        assert_eq!(it.next(&mut s).unwrap(), None);
        assert_eq!(it.state(), MatchState::Exhausted);
        assert_eq!(it.next(&mut s), Err(BridgeError::InvalidatedObject));
        assert_eq!(it.text(&s), Err(BridgeError::InvalidatedObject));
        assert_eq!(it.to_string(), "match(invalidated)");
    }

    #[test]
    fn empty_pattern_always_advances() {
        let mut s = session("abcd");
        let mut it = MatchIterator::new(Pane::Editor, "", 0, 0).unwrap();
        let mut positions = Vec::new();
        while let Some(m) = it.next(&mut s).unwrap() {
            positions.push(m.start);
            assert!(positions.len() <= 4, "iterator stalled");
        }
        assert_eq!(positions, vec![0, 1, 2, 3]);
        assert!(it.next(&mut s).is_err());
    }

    #[test]
    fn fresh_iterator_has_no_match() {
        let it = MatchIterator::new(Pane::Editor, "a", 0, 0).unwrap();
        assert_eq!(it.state(), MatchState::Fresh);
        assert_eq!(it.pos(), Err(BridgeError::InvalidatedObject));
        assert!(MatchIterator::new(Pane::Editor, "a", 0, -1).is_err());
    }

    #[test]
    fn replace_resumes_after_inserted_text() {
        let mut s = session("a-a-a");
        let mut it = MatchIterator::new(Pane::Editor, "a", 0, 0).unwrap();
        let visited = it
            .for_each(&mut s, |it, s, _| it.replace(s, "aa"))
            .unwrap();
        assert_eq!(visited, 3);
        assert_eq!(s.pane_text(Pane::Editor).unwrap(), "aa-aa-aa");
    }

    #[test]
    fn replace_keeps_start_and_moves_end() {
        let mut s = session("one two");
        let mut it = MatchIterator::new(Pane::Editor, "two", 0, 0).unwrap();
        it.next(&mut s).unwrap();
        it.replace(&mut s, "three").unwrap();
        assert_eq!(it.pos(), Ok(4));
        assert_eq!(it.len(), Ok(5));
        assert_eq!(it.text(&s).unwrap(), "three");
    }

    #[test]
    fn text_reflects_external_edits() {
        let mut s = session("hello world");
        let mut it = MatchIterator::new(Pane::Editor, "world", 0, 0).unwrap();
        it.next(&mut s).unwrap();
        s.host_mut().remove(Pane::Editor, 6, 7).unwrap();
        s.host_mut().insert(Pane::Editor, 6, "W").unwrap();
        assert_eq!(it.text(&s).unwrap(), "World");
    }

    #[test]
    fn editor_search_needs_active_buffer() {
        let mut s = session("abc");
        s.deactivate_buffer();
        let mut it = MatchIterator::new(Pane::Editor, "a", 0, 0).unwrap();
        assert_eq!(it.next(&mut s), Err(BridgeError::SurfaceNotAccessible));
    }
}
