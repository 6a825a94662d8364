//! Immutable lookup tables over the operation descriptors

use std::collections::HashMap;
use std::fs;
use std::path::Path;

use serde::{Deserialize, Serialize};

use super::types::{ConstantDescriptor, FunctionDescriptor, PropertyDescriptor, TypeTag};

/// On-disk shape of a catalog
#[derive(Debug, Default, Serialize, Deserialize)]
struct CatalogFile {
    #[serde(default)]
    functions: Vec<FunctionDescriptor>,
    #[serde(default)]
    properties: Vec<PropertyDescriptor>,
    #[serde(default)]
    constants: Vec<ConstantDescriptor>,
}

/// The function / property / constant tables, addressable by name and id.
///
/// Built once and then only read; share it behind an `Arc`.
#[derive(Debug, Default)]
pub struct Catalog {
    functions: Vec<FunctionDescriptor>,
    properties: Vec<PropertyDescriptor>,
    constants: Vec<ConstantDescriptor>,
    function_names: HashMap<String, usize>,
    function_ids: HashMap<i64, usize>,
    property_names: HashMap<String, usize>,
    constant_names: HashMap<String, usize>,
}

impl Catalog {
    pub fn new(
        functions: Vec<FunctionDescriptor>,
        properties: Vec<PropertyDescriptor>,
        constants: Vec<ConstantDescriptor>,
    ) -> Self {
        let mut function_names = HashMap::new();
        let mut function_ids = HashMap::new();
        for (idx, f) in functions.iter().enumerate() {
            function_names.entry(f.name.clone()).or_insert(idx);
            function_ids.entry(f.id).or_insert(idx);
        }
        let property_names = properties
            .iter()
            .enumerate()
            .map(|(idx, p)| (p.name.clone(), idx))
            .collect();
        let constant_names = constants
            .iter()
            .enumerate()
            .map(|(idx, c)| (c.name.clone(), idx))
            .collect();

        Self {
            functions,
            properties,
            constants,
            function_names,
            function_ids,
            property_names,
            constant_names,
        }
    }

    /// Parse a catalog from its JSON form
    pub fn from_json(json: &str) -> Result<Self, String> {
        let file: CatalogFile =
            serde_json::from_str(json).map_err(|e| format!("Failed to parse catalog: {}", e))?;
        Ok(Self::new(file.functions, file.properties, file.constants))
    }

    /// Load a catalog file from disk
    pub fn load(path: &Path) -> Result<Self, String> {
        let content = fs::read_to_string(path)
            .map_err(|e| format!("Failed to read catalog {}: {}", path.display(), e))?;
        Self::from_json(&content)
    }

    /// Serialize back to JSON (used to dump the builtin table)
    pub fn to_json(&self) -> Result<String, String> {
        let file = CatalogFile {
            functions: self.functions.clone(),
            properties: self.properties.clone(),
            constants: self.constants.clone(),
        };
        serde_json::to_string_pretty(&file).map_err(|e| format!("Failed to serialize catalog: {}", e))
    }

    pub fn functions(&self) -> &[FunctionDescriptor] {
        &self.functions
    }

    pub fn properties(&self) -> &[PropertyDescriptor] {
        &self.properties
    }

    pub fn constants(&self) -> &[ConstantDescriptor] {
        &self.constants
    }

    pub fn function(&self, name: &str) -> Option<&FunctionDescriptor> {
        self.function_names.get(name).map(|&i| &self.functions[i])
    }

    pub fn function_by_id(&self, id: i64) -> Option<&FunctionDescriptor> {
        self.function_ids.get(&id).map(|&i| &self.functions[i])
    }

    pub fn property(&self, name: &str) -> Option<&PropertyDescriptor> {
        self.property_names.get(name).map(|&i| &self.properties[i])
    }

    pub fn constant(&self, name: &str) -> Option<i64> {
        self.constant_names.get(name).map(|&i| self.constants[i].value)
    }

    /// Resolve a message id to a callable shape: plain functions first, then
    /// property getters and setters
    pub fn message(&self, id: i64) -> Option<FunctionDescriptor> {
        if id == 0 {
            return None;
        }
        if let Some(f) = self.function_by_id(id) {
            return Some(f.clone());
        }
        self.properties.iter().find_map(|p| {
            if p.getter == id {
                Some(p.getter_function())
            } else if p.setter == id {
                Some(p.setter_function())
            } else {
                None
            }
        })
    }

    /// Message id for a constant-style name such as `SCI_GETLENGTH`
    pub fn message_by_constant_name(&self, name: &str) -> Option<i64> {
        let rest = name.strip_prefix("SCI_")?;
        if let Some(f) = self.functions.iter().find(|f| f.name.to_uppercase() == rest) {
            return Some(f.id);
        }
        self.properties.iter().find_map(|p| {
            let (get, set) = accessor_constant_names(p);
            if p.getter != 0 && get == name {
                Some(p.getter)
            } else if p.setter != 0 && set == name {
                Some(p.setter)
            } else {
                None
            }
        })
    }

    /// Name for a numeric value: declared constants first, then message names
    pub fn constant_name(&self, value: i64) -> Option<String> {
        if let Some(c) = self.constants.iter().find(|c| c.value == value) {
            return Some(c.name.clone());
        }
        self.message_constants()
            .into_iter()
            .find(|(_, id)| *id == value)
            .map(|(name, _)| name)
    }

    /// Every message id under its `SCI_*` name
    pub fn message_constants(&self) -> Vec<(String, i64)> {
        let mut out: Vec<(String, i64)> = self
            .functions
            .iter()
            .map(|f| (format!("SCI_{}", f.name.to_uppercase()), f.id))
            .collect();
        for p in &self.properties {
            let (get, set) = accessor_constant_names(p);
            if p.getter != 0 {
                out.push((get, p.getter));
            }
            if p.setter != 0 {
                out.push((set, p.setter));
            }
        }
        out
    }
}

/// `SCI_GET*` / `SCI_SET*` names for a property. Per-style properties put
/// the verb after the `Style` prefix (`SCI_STYLEGETFORE`).
fn accessor_constant_names(property: &PropertyDescriptor) -> (String, String) {
    let upper = property.name.to_uppercase();
    match upper.strip_prefix("STYLE") {
        Some(rest) if !rest.is_empty() && property.param_type == TypeTag::Int => {
            (format!("SCI_STYLEGET{}", rest), format!("SCI_STYLESET{}", rest))
        }
        _ => (format!("SCI_GET{}", upper), format!("SCI_SET{}", upper)),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::iface::TypeTag::*;

    fn small() -> Catalog {
        Catalog::new(
            vec![
                FunctionDescriptor::new("GetText", 2182, Int, [Length, StringResult]),
                FunctionDescriptor::new("ClearAll", 2004, Void, [Void, Void]),
            ],
            vec![
                PropertyDescriptor::new("CurrentPos", 2008, 2141, Position, Void),
                PropertyDescriptor::new("StyleFore", 2481, 2051, Colour, Int),
            ],
            vec![ConstantDescriptor {
                name: "SCFIND_MATCHCASE".into(),
                value: 4,
            }],
        )
    }

    #[test]
    fn lookup_by_name_and_id() {
        let cat = small();
        assert_eq!(cat.function("GetText").map(|f| f.id), Some(2182));
        assert_eq!(cat.function_by_id(2004).map(|f| f.name.as_str()), Some("ClearAll"));
        assert!(cat.function("get_text").is_none());
        assert_eq!(cat.property("CurrentPos").map(|p| p.getter), Some(2008));
        assert_eq!(cat.constant("SCFIND_MATCHCASE"), Some(4));
    }

    #[test]
    fn message_falls_back_to_property_accessors() {
        let cat = small();
        let getter = cat.message(2008).unwrap();
        assert_eq!(getter.return_type, Position);
        let setter = cat.message(2141).unwrap();
        assert_eq!(setter.params, [Position, Void]);
        assert!(cat.message(9999).is_none());
        assert!(cat.message(0).is_none());
    }

    #[test]
    fn constant_style_names() {
        let cat = small();
        assert_eq!(cat.message_by_constant_name("SCI_GETTEXT"), Some(2182));
        assert_eq!(cat.message_by_constant_name("SCI_GETCURRENTPOS"), Some(2008));
        assert_eq!(cat.message_by_constant_name("SCI_STYLESETFORE"), Some(2051));
        assert_eq!(cat.message_by_constant_name("GETTEXT"), None);
    }

    #[test]
    fn constant_name_prefers_declared_constants() {
        let cat = small();
        assert_eq!(cat.constant_name(4).as_deref(), Some("SCFIND_MATCHCASE"));
        assert_eq!(cat.constant_name(2004).as_deref(), Some("SCI_CLEARALL"));
        assert_eq!(cat.constant_name(2141).as_deref(), Some("SCI_SETCURRENTPOS"));
        assert_eq!(cat.constant_name(12345), None);
    }

    #[test]
    fn json_round_trip_preserves_lookups() {
        let json = small().to_json().unwrap();
        let cat = Catalog::from_json(&json).unwrap();
        assert_eq!(cat.function("GetText").map(|f| f.id), Some(2182));
        assert!(Catalog::from_json("{ nope").is_err());
    }
}
