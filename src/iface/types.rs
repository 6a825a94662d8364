//! Descriptor records for the host operation table

use serde::{Deserialize, Serialize};

/// Parameter / return type tags.
///
/// Declaration order matters: the scriptability rules and the numeric
/// check compare tags by position.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TypeTag {
    Void,
    Int,
    Length,
    Position,
    Colour,
    Bool,
    /// Key code plus modifier mask, packed into one word
    KeyMod,
    String,
    /// Text written by the callee into a caller-provided buffer
    StringResult,
    /// Structured pointers (cells, text ranges, find requests, ...)
    Opaque,
}

impl TypeTag {
    /// Int, Length, Position and Colour all travel as plain integers
    pub fn is_numeric(self) -> bool {
        self > TypeTag::Void && self < TypeTag::Bool
    }

    /// Whether a script can supply a value of this type at the given slot
    pub fn is_scriptable_at(self, slot: usize) -> bool {
        self < TypeTag::StringResult || (slot == 1 && self == TypeTag::StringResult)
    }
}

/// A callable host operation
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FunctionDescriptor {
    pub name: String,
    pub id: i64,
    #[serde(rename = "return")]
    pub return_type: TypeTag,
    pub params: [TypeTag; 2],
}

impl FunctionDescriptor {
    pub fn new(name: &str, id: i64, return_type: TypeTag, params: [TypeTag; 2]) -> Self {
        Self {
            name: name.to_string(),
            id,
            return_type,
            params,
        }
    }

    pub fn is_scriptable(&self) -> bool {
        self.params[0].is_scriptable_at(0) && self.params[1].is_scriptable_at(1)
    }

    /// Whether the call needs the two-phase string-result convention
    pub fn wants_string_result(&self) -> bool {
        self.params[1] == TypeTag::StringResult || self.return_type == TypeTag::StringResult
    }

    /// `(length, string)` parameters carry one text argument as a byte run
    pub fn is_bulk_text(&self) -> bool {
        self.params == [TypeTag::Length, TypeTag::String]
    }
}

/// A getter/setter pair. An id of 0 means the accessor is absent.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PropertyDescriptor {
    pub name: String,
    #[serde(default)]
    pub getter: i64,
    #[serde(default)]
    pub setter: i64,
    #[serde(rename = "value")]
    pub value_type: TypeTag,
    #[serde(rename = "index", default = "void_tag")]
    pub param_type: TypeTag,
}

fn void_tag() -> TypeTag {
    TypeTag::Void
}

impl PropertyDescriptor {
    pub fn new(name: &str, getter: i64, setter: i64, value_type: TypeTag, param_type: TypeTag) -> Self {
        Self {
            name: name.to_string(),
            getter,
            setter,
            value_type,
            param_type,
        }
    }

    /// Indexed properties need a key and are exposed through a proxy
    pub fn is_indexed(&self) -> bool {
        self.param_type != TypeTag::Void
    }

    pub fn is_scriptable(&self) -> bool {
        let value_ok = self.value_type > TypeTag::Void
            && self.value_type <= TypeTag::StringResult
            && self.value_type != TypeTag::KeyMod;
        let index_ok = self.param_type < TypeTag::Colour
            || self.param_type == TypeTag::String
            || self.param_type == TypeTag::Bool;
        value_ok && index_ok && (self.getter != 0 || self.setter != 0)
    }

    /// The getter expressed as a plain function
    pub fn getter_function(&self) -> FunctionDescriptor {
        FunctionDescriptor {
            name: self.name.clone(),
            id: self.getter,
            return_type: self.value_type,
            params: [self.param_type, TypeTag::Void],
        }
    }

    /// The setter expressed as a plain function: `(value)` for scalars,
    /// `(key, value)` for indexed properties
    pub fn setter_function(&self) -> FunctionDescriptor {
        let params = if self.is_indexed() {
            let value = if self.value_type == TypeTag::StringResult {
                TypeTag::String
            } else {
                self.value_type
            };
            [self.param_type, value]
        } else {
            [self.value_type, TypeTag::Void]
        };
        FunctionDescriptor {
            name: self.name.clone(),
            id: self.setter,
            return_type: TypeTag::Void,
            params,
        }
    }
}

/// A named integer constant
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ConstantDescriptor {
    pub name: String,
    pub value: i64,
}

#[cfg(test)]
mod tests {
    use super::*;
    use TypeTag::*;

    #[test]
    fn numeric_tags() {
        assert!(Int.is_numeric());
        assert!(Length.is_numeric());
        assert!(Position.is_numeric());
        assert!(Colour.is_numeric());
        assert!(!Void.is_numeric());
        assert!(!Bool.is_numeric());
        assert!(!String.is_numeric());
    }

    #[test]
    fn string_result_only_scriptable_in_second_slot() {
        assert!(!StringResult.is_scriptable_at(0));
        assert!(StringResult.is_scriptable_at(1));
        assert!(!Opaque.is_scriptable_at(1));
        assert!(KeyMod.is_scriptable_at(0));
    }

    #[test]
    fn function_scriptability() {
        let get_text = FunctionDescriptor::new("GetText", 2182, Int, [Length, StringResult]);
        assert!(get_text.is_scriptable());
        assert!(get_text.wants_string_result());

        let find_text = FunctionDescriptor::new("FindText", 2150, Position, [Int, Opaque]);
        assert!(!find_text.is_scriptable());

        let bad = FunctionDescriptor::new("Bad", 1, Void, [StringResult, Void]);
        assert!(!bad.is_scriptable());
    }

    #[test]
    fn property_scriptability() {
        let pos = PropertyDescriptor::new("CurrentPos", 2008, 2141, Position, Void);
        assert!(pos.is_scriptable());
        assert!(!pos.is_indexed());

        let keymod = PropertyDescriptor::new("Key", 1, 2, KeyMod, Void);
        assert!(!keymod.is_scriptable());

        let colour_indexed = PropertyDescriptor::new("X", 1, 2, Int, Colour);
        assert!(!colour_indexed.is_scriptable());

        let no_accessors = PropertyDescriptor::new("Y", 0, 0, Int, Void);
        assert!(!no_accessors.is_scriptable());
    }

    #[test]
    fn setter_shapes() {
        let scalar = PropertyDescriptor::new("CurrentPos", 2008, 2141, Position, Void);
        assert_eq!(scalar.setter_function().params, [Position, Void]);

        let indexed = PropertyDescriptor::new("StyleFont", 2486, 2056, StringResult, Int);
        assert_eq!(indexed.setter_function().params, [Int, String]);
        assert_eq!(indexed.getter_function().params, [Int, Void]);
        assert_eq!(indexed.getter_function().return_type, StringResult);
    }

    #[test]
    fn descriptors_deserialize() {
        let f: FunctionDescriptor = serde_json::from_str(
            r#"{"name":"GetLine","id":2153,"return":"int","params":["int","string_result"]}"#,
        )
        .unwrap();
        assert_eq!(f.params, [Int, StringResult]);

        let p: PropertyDescriptor =
            serde_json::from_str(r#"{"name":"Length","getter":2006,"value":"int"}"#).unwrap();
        assert_eq!(p.setter, 0);
        assert_eq!(p.param_type, Void);
    }
}
