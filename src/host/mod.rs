//! The native side of the bridge
//!
//! Everything the scripting layer does to a text surface reduces to
//! [`Host::send`], a two-word message call modelled on the Scintilla
//! message interface, plus a handful of bulk primitives that bypass
//! message ids.

mod memory;

pub use memory::MemoryHost;

use crate::error::BridgeResult;
use crate::iface::{SCI_FINDTEXT, SCI_GETLENGTH};

/// One of the two text surfaces a script can address
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Pane {
    /// The active document
    Editor,
    /// The log / output surface
    Output,
}

impl Pane {
    pub fn name(self) -> &'static str {
        match self {
            Pane::Editor => "editor",
            Pane::Output => "output",
        }
    }
}

/// Search request passed by pointer with `SCI_FINDTEXT`
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TextToFind {
    pub min: isize,
    pub max: isize,
    pub text: String,
    /// Filled in by the host on success
    pub found: (isize, isize),
}

/// A single native call word
#[derive(Debug)]
pub enum Param<'a> {
    Int(isize),
    /// Input text the callee only reads
    Str(&'a [u8]),
    /// Caller-allocated output buffer the callee fills
    Buffer(&'a mut [u8]),
    Find(&'a mut TextToFind),
}

impl Param<'_> {
    /// Integer view of the word; pointers read as 0
    pub fn int(&self) -> isize {
        match self {
            Param::Int(n) => *n,
            _ => 0,
        }
    }

    /// Text view of the word; non-text words read as empty
    pub fn text(&self) -> &[u8] {
        match self {
            Param::Str(s) => s,
            _ => &[],
        }
    }
}

/// Native primitives consumed by the bridge
pub trait Host {
    /// Send a message with two parameter words
    fn send(&mut self, pane: Pane, message: i64, wparam: Param<'_>, lparam: Param<'_>) -> BridgeResult<isize>;

    fn insert(&mut self, pane: Pane, pos: isize, text: &str) -> BridgeResult<()>;

    fn remove(&mut self, pane: Pane, from: isize, to: isize) -> BridgeResult<()>;

    /// Raw text between two byte positions
    fn range(&self, pane: Pane, from: isize, to: isize) -> BridgeResult<String>;

    /// Diagnostic text from scripts (print, trace, handler errors)
    fn trace(&mut self, text: &str);

    /// Host configuration properties; unset keys read as ""
    fn property(&self, key: &str) -> String;

    fn set_property(&mut self, key: &str, value: &str);

    fn unset_property(&mut self, key: &str);

    fn length(&mut self, pane: Pane) -> BridgeResult<isize> {
        self.send(pane, SCI_GETLENGTH, Param::Int(0), Param::Int(0))
    }

    /// One-shot search in `[min, max)`; returns the match bounds
    fn find_text(
        &mut self,
        pane: Pane,
        flags: i64,
        min: isize,
        max: isize,
        text: &str,
    ) -> BridgeResult<Option<(isize, isize)>> {
        let mut request = TextToFind {
            min,
            max,
            text: text.to_string(),
            found: (-1, -1),
        };
        let result = self.send(
            pane,
            SCI_FINDTEXT,
            Param::Int(flags as isize),
            Param::Find(&mut request),
        )?;
        Ok((result >= 0).then_some(request.found))
    }
}
