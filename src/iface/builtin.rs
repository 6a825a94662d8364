//! A representative slice of the Scintilla interface table
//!
//! Full tables can be loaded from JSON with [`Catalog::load`]; this one
//! covers the messages the in-memory host understands.

use super::catalog::Catalog;
use super::types::{ConstantDescriptor, FunctionDescriptor, PropertyDescriptor, TypeTag};

pub const SCI_ADDTEXT: i64 = 2001;
pub const SCI_INSERTTEXT: i64 = 2003;
pub const SCI_CLEARALL: i64 = 2004;
pub const SCI_GETLENGTH: i64 = 2006;
pub const SCI_GETCHARAT: i64 = 2007;
pub const SCI_GETCURRENTPOS: i64 = 2008;
pub const SCI_GETANCHOR: i64 = 2009;
pub const SCI_GETSTYLEAT: i64 = 2010;
pub const SCI_SELECTALL: i64 = 2013;
pub const SCI_GOTOPOS: i64 = 2025;
pub const SCI_SETANCHOR: i64 = 2026;
pub const SCI_GETCURLINE: i64 = 2027;
pub const SCI_SETCODEPAGE: i64 = 2037;
pub const SCI_STYLESETFORE: i64 = 2051;
pub const SCI_ASSIGNCMDKEY: i64 = 2070;
pub const SCI_CLEARCMDKEY: i64 = 2071;
pub const SCI_SETLINESTATE: i64 = 2092;
pub const SCI_GETLINESTATE: i64 = 2093;
pub const SCI_GETLINEENDPOSITION: i64 = 2136;
pub const SCI_GETCODEPAGE: i64 = 2137;
pub const SCI_GETREADONLY: i64 = 2140;
pub const SCI_SETCURRENTPOS: i64 = 2141;
pub const SCI_FINDTEXT: i64 = 2150;
pub const SCI_GETLINE: i64 = 2153;
pub const SCI_GETLINECOUNT: i64 = 2154;
pub const SCI_SETSEL: i64 = 2160;
pub const SCI_GETSELTEXT: i64 = 2161;
pub const SCI_LINEFROMPOSITION: i64 = 2166;
pub const SCI_POSITIONFROMLINE: i64 = 2167;
pub const SCI_REPLACESEL: i64 = 2170;
pub const SCI_SETREADONLY: i64 = 2171;
pub const SCI_SETTEXT: i64 = 2181;
pub const SCI_GETTEXT: i64 = 2182;
pub const SCI_GETTEXTLENGTH: i64 = 2183;
pub const SCI_SETTARGETSTART: i64 = 2190;
pub const SCI_GETTARGETSTART: i64 = 2191;
pub const SCI_SETTARGETEND: i64 = 2192;
pub const SCI_GETTARGETEND: i64 = 2193;
pub const SCI_REPLACETARGET: i64 = 2194;
pub const SCI_SETSEARCHFLAGS: i64 = 2198;
pub const SCI_GETSEARCHFLAGS: i64 = 2199;
pub const SCI_SETFOLDLEVEL: i64 = 2222;
pub const SCI_GETFOLDLEVEL: i64 = 2223;
pub const SCI_APPENDTEXT: i64 = 2282;
pub const SCI_LINELENGTH: i64 = 2350;
pub const SCI_STYLEGETFORE: i64 = 2481;
pub const SCI_SETPROPERTY: i64 = 4004;
pub const SCI_SETKEYWORDS: i64 = 4005;
pub const SCI_GETPROPERTY: i64 = 4008;
pub const SCI_GETLEXERLANGUAGE: i64 = 4012;

pub const SCFIND_WHOLEWORD: i64 = 0x2;
pub const SCFIND_MATCHCASE: i64 = 0x4;
pub const SCMOD_SHIFT: i64 = 1;
pub const SCMOD_CTRL: i64 = 2;
pub const SCMOD_ALT: i64 = 4;
pub const SC_CP_UTF8: i64 = 65001;
pub const SC_FOLDLEVELBASE: i64 = 0x400;
pub const SC_FOLDLEVELHEADERFLAG: i64 = 0x2000;

impl Catalog {
    /// The builtin table
    pub fn builtin() -> Self {
        use TypeTag::*;

        let f = FunctionDescriptor::new;
        let functions = vec![
            f("AddText", SCI_ADDTEXT, Void, [Length, String]),
            f("InsertText", SCI_INSERTTEXT, Void, [Position, String]),
            f("ClearAll", SCI_CLEARALL, Void, [Void, Void]),
            f("SelectAll", SCI_SELECTALL, Void, [Void, Void]),
            f("GotoPos", SCI_GOTOPOS, Void, [Position, Void]),
            f("GetCurLine", SCI_GETCURLINE, Int, [Length, StringResult]),
            f("AssignCmdKey", SCI_ASSIGNCMDKEY, Void, [KeyMod, Int]),
            f("ClearCmdKey", SCI_CLEARCMDKEY, Void, [KeyMod, Void]),
            f("FindText", SCI_FINDTEXT, Position, [Int, Opaque]),
            f("GetLine", SCI_GETLINE, Int, [Int, StringResult]),
            f("SetSel", SCI_SETSEL, Void, [Position, Position]),
            f("GetSelText", SCI_GETSELTEXT, Int, [Void, StringResult]),
            f("LineFromPosition", SCI_LINEFROMPOSITION, Int, [Position, Void]),
            f("PositionFromLine", SCI_POSITIONFROMLINE, Position, [Int, Void]),
            f("GetLineEndPosition", SCI_GETLINEENDPOSITION, Position, [Int, Void]),
            f("ReplaceSel", SCI_REPLACESEL, Void, [Void, String]),
            f("SetText", SCI_SETTEXT, Void, [Void, String]),
            f("GetText", SCI_GETTEXT, Int, [Length, StringResult]),
            f("ReplaceTarget", SCI_REPLACETARGET, Int, [Length, String]),
            f("AppendText", SCI_APPENDTEXT, Void, [Length, String]),
            f("LineLength", SCI_LINELENGTH, Int, [Int, Void]),
        ];

        let p = PropertyDescriptor::new;
        let properties = vec![
            p("Length", SCI_GETLENGTH, 0, Int, Void),
            p("TextLength", SCI_GETTEXTLENGTH, 0, Int, Void),
            p("CharAt", SCI_GETCHARAT, 0, Int, Position),
            p("StyleAt", SCI_GETSTYLEAT, 0, Int, Position),
            p("CurrentPos", SCI_GETCURRENTPOS, SCI_SETCURRENTPOS, Position, Void),
            p("Anchor", SCI_GETANCHOR, SCI_SETANCHOR, Position, Void),
            p("CodePage", SCI_GETCODEPAGE, SCI_SETCODEPAGE, Int, Void),
            p("ReadOnly", SCI_GETREADONLY, SCI_SETREADONLY, Bool, Void),
            p("LineCount", SCI_GETLINECOUNT, 0, Int, Void),
            p("TargetStart", SCI_GETTARGETSTART, SCI_SETTARGETSTART, Position, Void),
            p("TargetEnd", SCI_GETTARGETEND, SCI_SETTARGETEND, Position, Void),
            p("SearchFlags", SCI_GETSEARCHFLAGS, SCI_SETSEARCHFLAGS, Int, Void),
            p("LineState", SCI_GETLINESTATE, SCI_SETLINESTATE, Int, Int),
            p("FoldLevel", SCI_GETFOLDLEVEL, SCI_SETFOLDLEVEL, Int, Int),
            p("StyleFore", SCI_STYLEGETFORE, SCI_STYLESETFORE, Colour, Int),
            p("Property", SCI_GETPROPERTY, SCI_SETPROPERTY, StringResult, String),
            p("KeyWords", 0, SCI_SETKEYWORDS, String, Int),
            p("LexerLanguage", SCI_GETLEXERLANGUAGE, 0, StringResult, Void),
        ];

        let c = |name: &str, value: i64| ConstantDescriptor {
            name: name.to_string(),
            value,
        };
        let constants = vec![
            c("INVALID_POSITION", -1),
            c("SCFIND_WHOLEWORD", SCFIND_WHOLEWORD),
            c("SCFIND_MATCHCASE", SCFIND_MATCHCASE),
            c("SCMOD_NORM", 0),
            c("SCMOD_SHIFT", SCMOD_SHIFT),
            c("SCMOD_CTRL", SCMOD_CTRL),
            c("SCMOD_ALT", SCMOD_ALT),
            c("SC_CP_UTF8", SC_CP_UTF8),
            c("STYLE_DEFAULT", 32),
            c("SC_FOLDLEVELBASE", SC_FOLDLEVELBASE),
            c("SC_FOLDLEVELHEADERFLAG", SC_FOLDLEVELHEADERFLAG),
            c("SCK_DOWN", 300),
            c("SCK_UP", 301),
            c("SCK_LEFT", 302),
            c("SCK_RIGHT", 303),
        ];

        Catalog::new(functions, properties, constants)
    }
}
