//! Member resolution on a pane: functions, properties, assignment

use rhai::Dynamic;
use tracing::debug;

use super::marshal;
use super::matcher::MatchIterator;
use super::session::Session;
use crate::error::{BridgeError, BridgeResult};
use crate::host::{Pane, Param};
use crate::iface::{PropertyDescriptor, TypeTag};

/// Convert a script name to the catalog's convention: capitalize the first
/// character and the character after each underscore, dropping underscores.
/// `send_editor` → `SendEditor`, `a_b_c` → `ABC`, `x_` → `X`.
pub fn normalize_name(name: &str) -> String {
    let mut out = String::with_capacity(name.len());
    let mut chars = name.chars();
    if let Some(first) = chars.next() {
        out.extend(first.to_uppercase());
    }
    while let Some(c) = chars.next() {
        if c == '_' {
            if let Some(next) = chars.next() {
                out.extend(next.to_uppercase());
            }
        } else {
            out.push(c);
        }
    }
    out
}

/// The inverse used when publishing catalog names to scripts:
/// `GetLineCount` → `get_line_count`
pub fn script_name(name: &str) -> String {
    let mut out = String::with_capacity(name.len() + 4);
    for (i, c) in name.chars().enumerate() {
        if c.is_uppercase() {
            if i > 0 {
                out.push('_');
            }
            out.extend(c.to_lowercase());
        } else {
            out.push(c);
        }
    }
    out
}

/// What a member access produced
#[derive(Debug, Clone)]
pub enum Resolved {
    Value(Dynamic),
    /// Indexed properties yield a proxy instead of a value
    Proxy(PropertyProxy),
}

impl Resolved {
    /// The plain value, if this is not a proxy
    pub fn value(self) -> Option<Dynamic> {
        match self {
            Resolved::Value(v) => Some(v),
            Resolved::Proxy(_) => None,
        }
    }
}

/// An indexed property bound to a pane
#[derive(Debug, Clone)]
pub struct PropertyProxy {
    pane: Pane,
    property: PropertyDescriptor,
}

impl PropertyProxy {
    pub fn new(pane: Pane, property: PropertyDescriptor) -> Self {
        Self { pane, property }
    }

    pub fn pane(&self) -> Pane {
        self.pane
    }

    pub fn property(&self) -> &PropertyDescriptor {
        &self.property
    }

    /// Read the property at `args` (the key)
    pub fn get(&self, session: &mut Session, args: &[Dynamic]) -> BridgeResult<Dynamic> {
        session.check_pane(self.pane)?;
        if self.property.getter == 0 {
            return Err(BridgeError::WriteOnly(self.property.name.clone()));
        }
        marshal::call(session.host_mut(), self.pane, &self.property.getter_function(), args)
    }

    /// Write `value` at `key`
    pub fn set(&self, session: &mut Session, key: Dynamic, value: Dynamic) -> BridgeResult<Dynamic> {
        session.check_pane(self.pane)?;
        if self.property.setter == 0 {
            return Err(BridgeError::ReadOnly(self.property.name.clone()));
        }
        marshal::call(
            session.host_mut(),
            self.pane,
            &self.property.setter_function(),
            &[key, value],
        )
    }
}

/// Dynamic member resolver for one pane
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SurfaceBinding {
    pane: Pane,
}

impl SurfaceBinding {
    pub fn new(pane: Pane) -> Self {
        Self { pane }
    }

    pub fn pane(&self) -> Pane {
        self.pane
    }

    /// Resolve `member` as a call, a property read, or (with a trailing
    /// `=`) an assignment of `args[0]`
    pub fn resolve(&self, session: &mut Session, member: &str, args: &[Dynamic]) -> BridgeResult<Resolved> {
        session.check_pane(self.pane)?;

        if let Some(target) = member.strip_suffix('=') {
            let value = args.first().cloned().unwrap_or(Dynamic::UNIT);
            return self.assign(session, target, value).map(Resolved::Value);
        }

        let name = normalize_name(member);
        let catalog = session.catalog().clone();
        debug!(pane = self.pane.name(), member, %name, "resolve");

        if let Some(func) = catalog.function(&name) {
            if func.is_scriptable() {
                return marshal::call(session.host_mut(), self.pane, func, args).map(Resolved::Value);
            }
        }

        let Some(prop) = catalog.property(&name) else {
            return Err(BridgeError::NoSuchMember(member.to_string()));
        };
        if !prop.is_scriptable() {
            return Err(BridgeError::NotScriptable(prop.name.clone()));
        }

        match prop.param_type {
            _ if prop.getter == 0 && !prop.is_indexed() => Err(BridgeError::WriteOnly(prop.name.clone())),
            TypeTag::Void => {
                marshal::call(session.host_mut(), self.pane, &prop.getter_function(), args).map(Resolved::Value)
            }
            TypeTag::Bool => {
                if prop.getter == 0 {
                    return Err(BridgeError::WriteOnly(prop.name.clone()));
                }
                // Unverified protocol: a truthy probe with 1 means the
                // property does not apply
                let probe = session
                    .host_mut()
                    .send(self.pane, prop.getter, Param::Int(1), Param::Int(0))?;
                if probe != 0 {
                    Ok(Resolved::Value(Dynamic::UNIT))
                } else {
                    marshal::call(session.host_mut(), self.pane, &prop.getter_function(), args)
                        .map(Resolved::Value)
                }
            }
            _ => Ok(Resolved::Proxy(PropertyProxy::new(self.pane, prop.clone()))),
        }
    }

    fn assign(&self, session: &mut Session, member: &str, value: Dynamic) -> BridgeResult<Dynamic> {
        let name = normalize_name(member);
        let catalog = session.catalog().clone();
        let prop = catalog
            .property(&name)
            .filter(|p| p.is_scriptable())
            .ok_or_else(|| BridgeError::NotWritable(member.to_string()))?;

        if prop.setter == 0 {
            return Err(BridgeError::ReadOnly(prop.name.clone()));
        }
        if prop.is_indexed() {
            return Err(BridgeError::IndexedAssignment(prop.name.clone()));
        }
        debug!(pane = self.pane.name(), %name, "assign");
        marshal::call(session.host_mut(), self.pane, &prop.setter_function(), &[value])
    }

    /// Call by raw message id, checked against the catalog
    pub fn send(&self, session: &mut Session, message: i64, args: &[Dynamic]) -> BridgeResult<Dynamic> {
        session.check_pane(self.pane)?;
        let func = session
            .catalog()
            .message(message)
            .ok_or(BridgeError::UnknownMessage(message))?;
        marshal::call(session.host_mut(), self.pane, &func, args)
    }

    pub fn text_range(&self, session: &mut Session, from: isize, to: isize) -> BridgeResult<String> {
        session.check_pane(self.pane)?;
        if to < 0 {
            return Err(BridgeError::InvalidArgument(
                "text range end must be zero or positive".into(),
            ));
        }
        session.host().range(self.pane, from, to)
    }

    pub fn insert(&self, session: &mut Session, pos: isize, text: &str) -> BridgeResult<()> {
        session.check_pane(self.pane)?;
        session.host_mut().insert(self.pane, pos, text)
    }

    pub fn remove(&self, session: &mut Session, from: isize, to: isize) -> BridgeResult<()> {
        session.check_pane(self.pane)?;
        session.host_mut().remove(self.pane, from, to)
    }

    /// Insert at the current end of the pane
    pub fn append(&self, session: &mut Session, text: &str) -> BridgeResult<()> {
        session.check_pane(self.pane)?;
        let host = session.host_mut();
        let end = host.length(self.pane)?;
        host.insert(self.pane, end, text)
    }

    /// One-shot search; `end` defaults to the pane length
    pub fn find_text(
        &self,
        session: &mut Session,
        text: &str,
        flags: i64,
        start: isize,
        end: Option<isize>,
    ) -> BridgeResult<Option<(isize, isize)>> {
        session.check_pane(self.pane)?;
        let host = session.host_mut();
        let end = match end {
            Some(end) => end,
            None => host.length(self.pane)?,
        };
        host.find_text(self.pane, flags, start, end, text)
    }

    /// Start a repeated search
    pub fn match_text(
        &self,
        session: &mut Session,
        pattern: &str,
        flags: i64,
        start: isize,
    ) -> BridgeResult<MatchIterator> {
        session.check_pane(self.pane)?;
        MatchIterator::new(self.pane, pattern, flags, start)
    }
}
