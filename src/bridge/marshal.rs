//! Conversion between script values and the two-word native call
//!
//! A descriptor's type tags decide how the incoming dynamic arguments are
//! packed into `wparam` / `lparam` and how the integer result is handed
//! back. Three shapes exist:
//!
//! - `(length, string)`: one text argument sent as byte count + bytes
//! - string result: probe for the size, allocate, call again with a buffer
//! - everything else: each slot converted on its own

use rhai::{Dynamic, INT};
use tracing::trace;

use crate::error::{BridgeError, BridgeResult};
use crate::host::{Host, Pane, Param};
use crate::iface::{FunctionDescriptor, SCMOD_ALT, SCMOD_CTRL, SCMOD_SHIFT, TypeTag};

const MODIFIER_MASK: isize = (SCMOD_SHIFT | SCMOD_CTRL | SCMOD_ALT) as isize;

/// A parameter slot after conversion. Owns its text so the borrowed
/// [`Param`] views stay valid for the whole call.
#[derive(Debug, Clone)]
enum Slot {
    Int(isize),
    Text(Vec<u8>),
}

impl Slot {
    fn param(&self) -> Param<'_> {
        match self {
            Slot::Int(n) => Param::Int(*n),
            Slot::Text(t) => Param::Str(t),
        }
    }
}

/// Integer coercion: ints as-is, floats truncated
pub fn to_int(value: &Dynamic) -> BridgeResult<isize> {
    if let Ok(n) = value.as_int() {
        return Ok(n as isize);
    }
    if let Ok(f) = value.as_float() {
        return Ok(f as isize);
    }
    Err(BridgeError::InvalidArgument(format!(
        "number expected, got {}",
        value.type_name()
    )))
}

/// Only `()` and `false` are false
pub fn truthy(value: &Dynamic) -> bool {
    value.as_bool().unwrap_or(!value.is_unit())
}

/// String coercion: strings as-is, `()` as empty, anything else displayed
pub fn to_text(value: &Dynamic) -> String {
    if value.is_unit() {
        String::new()
    } else if value.is_string() {
        value.clone().into_string().unwrap_or_default()
    } else {
        value.to_string()
    }
}

/// `keycode & 0xFFFF | (modifiers & (shift|ctrl|alt)) << 16`
pub fn pack_key(keycode: isize, modifiers: isize) -> isize {
    (keycode & 0xFFFF) | ((modifiers & MODIFIER_MASK) << 16)
}

fn next_int<'a>(args: &mut impl Iterator<Item = &'a Dynamic>) -> BridgeResult<isize> {
    args.next().map(to_int).transpose().map(|n| n.unwrap_or(0))
}

fn next_text<'a>(args: &mut impl Iterator<Item = &'a Dynamic>) -> Vec<u8> {
    args.next().map(to_text).unwrap_or_default().into_bytes()
}

/// Call `func` on `pane` with script arguments.
///
/// Missing trailing arguments read as 0 / "". Extra arguments are ignored.
#[tracing::instrument(level = "trace", skip(host, func, args), fields(name = %func.name, id = func.id))]
pub fn call(
    host: &mut dyn Host,
    pane: Pane,
    func: &FunctionDescriptor,
    args: &[Dynamic],
) -> BridgeResult<Dynamic> {
    if !func.is_scriptable() {
        return Err(BridgeError::NotScriptable(func.name.clone()));
    }

    let mut args = args.iter();
    let mut slots = [Slot::Int(0), Slot::Int(0)];

    if func.is_bulk_text() {
        let text = next_text(&mut args);
        slots = [Slot::Int(text.len() as isize), Slot::Text(text)];
        let result = host.send(pane, func.id, slots[0].param(), slots[1].param())?;
        return Ok(map_result(func.return_type, result));
    }

    let string_result = func.wants_string_result();
    let converted = match (string_result, func.params[0]) {
        (true, TypeTag::Length) => 0,
        (true, _) => 1,
        (false, _) => 2,
    };

    for i in 0..converted {
        slots[i] = match func.params[i] {
            TypeTag::String => Slot::Text(next_text(&mut args)),
            TypeTag::KeyMod => {
                let keycode = next_int(&mut args)?;
                let modifiers = next_int(&mut args)?;
                Slot::Int(pack_key(keycode, modifiers))
            }
            TypeTag::Bool => Slot::Int(args.next().is_some_and(truthy) as isize),
            t if t.is_numeric() => Slot::Int(next_int(&mut args)?),
            TypeTag::Void if i > 0 => slots[0].clone(),
            _ => Slot::Int(0),
        };
    }

    if string_result {
        return call_for_string(host, pane, func, &mut slots);
    }

    let result = host.send(pane, func.id, slots[0].param(), slots[1].param())?;
    Ok(map_result(func.return_type, result))
}

/// Two-phase call: probe for the length, then fill a buffer of `len + 1`.
/// A negative probe is not an error and yields `()`.
fn call_for_string(
    host: &mut dyn Host,
    pane: Pane,
    func: &FunctionDescriptor,
    slots: &mut [Slot; 2],
) -> BridgeResult<Dynamic> {
    let len = host.send(pane, func.id, slots[0].param(), Param::Int(0))?;
    if len < 0 {
        trace!(len, "string result probe declined");
        return Ok(Dynamic::UNIT);
    }
    let len = len as usize;

    let mut buffer = Vec::new();
    buffer
        .try_reserve_exact(len + 1)
        .map_err(|_| BridgeError::InternalAllocationFailure(len + 1))?;
    buffer.resize(len + 1, 0u8);

    if func.params[0] == TypeTag::Length {
        slots[0] = Slot::Int(len as isize);
    }
    host.send(pane, func.id, slots[0].param(), Param::Buffer(&mut buffer))?;

    let mut end = len;
    if end > 0 && buffer[end - 1] == 0 {
        end -= 1;
    }
    buffer.truncate(end);
    Ok(Dynamic::from(String::from_utf8_lossy(&buffer).into_owned()))
}

fn map_result(return_type: TypeTag, result: isize) -> Dynamic {
    if return_type == TypeTag::Bool {
        Dynamic::from(result != 0)
    } else if return_type.is_numeric() {
        Dynamic::from(result as INT)
    } else {
        Dynamic::UNIT
    }
}
