//! # Schema derivation (orientation)
//!
//! Turns a tool's declared parameter list into the JSON-Schema-like object
//! advertised to the model. Declarations come from three places: the
//! `#[function_tool]` macro (which hands over the textual Rust type of each
//! parameter), explicit [`ParamDecl`] lists, or any `schemars::JsonSchema`
//! argument struct via [`params_from_schema`].
//!
//! Derivation is total: an unrecognized or missing type degrades to
//! `string` instead of failing, so schema quality never blocks registration.

use std::collections::HashSet;
use std::fmt;

use schemars::JsonSchema;
use serde_json::{json, Map, Value};

use crate::error::ArgumentValidationError;

/// The JSON type advertised for a parameter.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SchemaKind {
    String,
    Integer,
    Number,
    Boolean,
    Array,
    Object,
}

impl SchemaKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            SchemaKind::String => "string",
            SchemaKind::Integer => "integer",
            SchemaKind::Number => "number",
            SchemaKind::Boolean => "boolean",
            SchemaKind::Array => "array",
            SchemaKind::Object => "object",
        }
    }

    fn from_json_type(name: &str) -> Option<Self> {
        match name {
            "string" => Some(SchemaKind::String),
            "integer" => Some(SchemaKind::Integer),
            "number" => Some(SchemaKind::Number),
            "boolean" => Some(SchemaKind::Boolean),
            "array" => Some(SchemaKind::Array),
            "object" => Some(SchemaKind::Object),
            _ => None,
        }
    }
}

impl fmt::Display for SchemaKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Declared type of a tool parameter, before it is mapped to a [`SchemaKind`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TypeHint {
    /// No annotation at all.
    Absent,
    String,
    Integer,
    Number,
    Boolean,
    /// A sequence, with its element type when known.
    Sequence(Option<Box<TypeHint>>),
    /// A key/value mapping. Values are not itemized.
    Mapping,
    /// A value that may be omitted or null.
    Optional(Box<TypeHint>),
    /// Anything else, kept by name for diagnostics.
    Other(String),
}

impl TypeHint {
    pub fn sequence_of(item: TypeHint) -> Self {
        TypeHint::Sequence(Some(Box::new(item)))
    }

    pub fn optional(inner: TypeHint) -> Self {
        TypeHint::Optional(Box::new(inner))
    }

    /// Parse the textual form of a Rust type, e.g. `"Vec<i64>"` or
    /// `"& 'a str"` (token spacing as produced by `quote!` is accepted).
    pub fn from_rust(text: &str) -> Self {
        let text = text.trim();
        if text.is_empty() {
            return TypeHint::Absent;
        }

        if let Some(rest) = text.strip_prefix('&') {
            let mut rest = rest.trim_start();
            if rest.starts_with('\'') {
                rest = rest
                    .split_once(char::is_whitespace)
                    .map(|(_, r)| r)
                    .unwrap_or("");
            }
            let rest = rest.trim_start();
            let rest = rest.strip_prefix("mut ").unwrap_or(rest);
            return TypeHint::from_rust(rest);
        }

        if text.starts_with('[') && text.ends_with(']') {
            let inner = &text[1..text.len() - 1];
            let element = split_top_level(inner, ';')
                .into_iter()
                .next()
                .unwrap_or_default();
            return TypeHint::sequence_of(TypeHint::from_rust(element));
        }

        if text.starts_with('(') {
            return TypeHint::Other(text.to_string());
        }

        let (base, args) = match text.find('<') {
            Some(open) if text.ends_with('>') => (
                &text[..open],
                split_top_level(&text[open + 1..text.len() - 1], ',')
                    .into_iter()
                    .map(str::trim)
                    .filter(|arg| !arg.is_empty() && !arg.starts_with('\''))
                    .collect::<Vec<_>>(),
            ),
            _ => (text, Vec::new()),
        };
        let ident = base.rsplit("::").next().unwrap_or(base).trim();

        match ident {
            "String" | "str" | "char" | "Cow" | "PathBuf" => TypeHint::String,
            "i8" | "i16" | "i32" | "i64" | "i128" | "isize" | "u8" | "u16" | "u32" | "u64"
            | "u128" | "usize" => TypeHint::Integer,
            "f32" | "f64" => TypeHint::Number,
            "bool" => TypeHint::Boolean,
            "Vec" | "VecDeque" | "LinkedList" | "HashSet" | "BTreeSet" | "BinaryHeap" => {
                TypeHint::Sequence(args.first().map(|arg| Box::new(TypeHint::from_rust(arg))))
            }
            "HashMap" | "BTreeMap" | "IndexMap" | "Map" => TypeHint::Mapping,
            "Option" => TypeHint::optional(
                args.first()
                    .map(|arg| TypeHint::from_rust(arg))
                    .unwrap_or(TypeHint::Absent),
            ),
            "Box" | "Arc" | "Rc" if !args.is_empty() => TypeHint::from_rust(args[0]),
            _ => TypeHint::Other(text.to_string()),
        }
    }

    /// Map this hint onto the advertised type schema.
    pub fn schema(&self) -> TypeSchema {
        match self {
            TypeHint::Absent | TypeHint::Other(_) | TypeHint::String => {
                TypeSchema::of(SchemaKind::String)
            }
            TypeHint::Integer => TypeSchema::of(SchemaKind::Integer),
            TypeHint::Number => TypeSchema::of(SchemaKind::Number),
            TypeHint::Boolean => TypeSchema::of(SchemaKind::Boolean),
            TypeHint::Mapping => TypeSchema::of(SchemaKind::Object),
            TypeHint::Sequence(item) => {
                let item = item
                    .as_deref()
                    .map(TypeHint::schema)
                    .unwrap_or_else(|| TypeSchema::of(SchemaKind::String));
                TypeSchema::array_of(item)
            }
            TypeHint::Optional(inner) => inner.schema(),
        }
    }

    pub fn is_optional(&self) -> bool {
        matches!(self, TypeHint::Optional(_))
    }
}

fn split_top_level(text: &str, separator: char) -> Vec<&str> {
    let mut parts = Vec::new();
    let mut depth = 0i32;
    let mut start = 0;
    for (idx, ch) in text.char_indices() {
        match ch {
            '<' | '(' | '[' => depth += 1,
            '>' | ')' | ']' => depth -= 1,
            c if c == separator && depth == 0 => {
                parts.push(&text[start..idx]);
                start = idx + c.len_utf8();
            }
            _ => {}
        }
    }
    parts.push(&text[start..]);
    parts
}

/// How a parameter participates in the call.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ParamKind {
    /// An ordinary named parameter.
    #[default]
    Named,
    /// The implicit receiver of a method; never advertised.
    Receiver,
    /// A positional catch-all. Rejected at registration.
    Variadic,
    /// A keyword catch-all. Rejected at registration.
    KeywordCatchAll,
}

impl ParamKind {
    pub fn is_catch_all(&self) -> bool {
        matches!(self, ParamKind::Variadic | ParamKind::KeywordCatchAll)
    }
}

/// One declared parameter of a callable.
#[derive(Debug, Clone, PartialEq)]
pub struct ParamDecl {
    pub name: String,
    pub hint: TypeHint,
    pub default: Option<Value>,
    pub kind: ParamKind,
}

impl ParamDecl {
    pub fn new(name: impl Into<String>, hint: TypeHint) -> Self {
        Self {
            name: name.into(),
            hint,
            default: None,
            kind: ParamKind::Named,
        }
    }

    /// A parameter declared without any type annotation.
    pub fn untyped(name: impl Into<String>) -> Self {
        Self::new(name, TypeHint::Absent)
    }

    pub fn receiver() -> Self {
        Self {
            kind: ParamKind::Receiver,
            ..Self::untyped("self")
        }
    }

    pub fn variadic(name: impl Into<String>) -> Self {
        Self {
            kind: ParamKind::Variadic,
            ..Self::untyped(name)
        }
    }

    pub fn keyword_catch_all(name: impl Into<String>) -> Self {
        Self {
            kind: ParamKind::KeywordCatchAll,
            ..Self::untyped(name)
        }
    }

    pub fn with_default(mut self, value: impl Into<Value>) -> Self {
        self.default = Some(value.into());
        self
    }
}

/// Type portion of a parameter schema; arrays nest their element type.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TypeSchema {
    pub kind: SchemaKind,
    pub items: Option<Box<TypeSchema>>,
}

impl TypeSchema {
    pub fn of(kind: SchemaKind) -> Self {
        Self { kind, items: None }
    }

    pub fn array_of(item: TypeSchema) -> Self {
        Self {
            kind: SchemaKind::Array,
            items: Some(Box::new(item)),
        }
    }

    fn to_json(&self) -> Map<String, Value> {
        let mut map = Map::new();
        map.insert("type".into(), json!(self.kind.as_str()));
        if let Some(items) = &self.items {
            map.insert("items".into(), Value::Object(items.to_json()));
        }
        map
    }

    fn accepts(&self, value: &Value) -> bool {
        match self.kind {
            SchemaKind::String => value.is_string(),
            SchemaKind::Integer => value.is_i64() || value.is_u64() || whole_float(value).is_some(),
            SchemaKind::Number => value.is_number(),
            SchemaKind::Boolean => value.is_boolean(),
            SchemaKind::Object => value.is_object(),
            SchemaKind::Array => match (value.as_array(), &self.items) {
                (Some(elements), Some(item)) => elements.iter().all(|e| item.accepts(e)),
                (Some(_), None) => true,
                (None, _) => false,
            },
        }
    }

    fn coerce_integers(&self, value: &mut Value) {
        match self.kind {
            SchemaKind::Integer => {
                if let Some(whole) = whole_float(value) {
                    *value = Value::from(whole);
                }
            }
            SchemaKind::Array => {
                if let (Some(item), Some(elements)) = (&self.items, value.as_array_mut()) {
                    for element in elements {
                        item.coerce_integers(element);
                    }
                }
            }
            _ => {}
        }
    }
}

/// A float such as `2.0`: no fractional part and within `i64` range.
fn whole_float(value: &Value) -> Option<i64> {
    match value {
        Value::Number(n) if n.is_f64() => {
            let f = n.as_f64()?;
            let fits = f.fract() == 0.0 && f >= i64::MIN as f64 && f < i64::MAX as f64;
            fits.then_some(f as i64)
        }
        _ => None,
    }
}

/// Schema entry for a single parameter.
#[derive(Debug, Clone, PartialEq)]
pub struct ParameterSchema {
    pub name: String,
    pub schema: TypeSchema,
    /// Present iff the declaration supplied a default.
    pub default: Option<Value>,
    /// True iff no default was supplied.
    pub required: bool,
}

impl ParameterSchema {
    pub fn kind(&self) -> SchemaKind {
        self.schema.kind
    }

    pub fn items(&self) -> Option<&TypeSchema> {
        self.schema.items.as_deref()
    }
}

/// Object schema describing all parameters of a tool.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct ParametersSchema {
    /// In declaration order.
    pub properties: Vec<ParameterSchema>,
    /// Names without a default, in declaration order.
    pub required: Vec<String>,
}

impl ParametersSchema {
    pub fn get(&self, name: &str) -> Option<&ParameterSchema> {
        self.properties.iter().find(|p| p.name == name)
    }

    pub fn is_empty(&self) -> bool {
        self.properties.is_empty()
    }

    /// Render as `{"type": "object", "properties": {...}, "required": [...]}`.
    pub fn to_json(&self) -> Value {
        let mut properties = Map::new();
        for param in &self.properties {
            let mut entry = param.schema.to_json();
            if let Some(default) = &param.default {
                entry.insert("default".into(), default.clone());
            }
            properties.insert(param.name.clone(), Value::Object(entry));
        }
        json!({
            "type": "object",
            "properties": properties,
            "required": self.required,
        })
    }

    /// Check an argument object against this schema.
    ///
    /// `null` is accepted for a parameter whose default is `null`.
    pub fn validate(&self, arguments: &Map<String, Value>) -> Result<(), ArgumentValidationError> {
        for name in arguments.keys() {
            if self.get(name).is_none() {
                return Err(ArgumentValidationError::Unexpected { name: name.clone() });
            }
        }
        for param in &self.properties {
            match arguments.get(&param.name) {
                None if param.required => {
                    return Err(ArgumentValidationError::Missing {
                        name: param.name.clone(),
                    })
                }
                None => {}
                Some(Value::Null) if param.default == Some(Value::Null) => {}
                Some(value) if !param.schema.accepts(value) => {
                    return Err(ArgumentValidationError::WrongType {
                        name: param.name.clone(),
                        expected: param.kind(),
                        found: json_type_name(value),
                    })
                }
                Some(_) => {}
            }
        }
        Ok(())
    }

    /// Rewrite whole floats as integers wherever an integer is declared, so
    /// a handler can decode `2.0` as an `i64`.
    pub fn coerce_integers(&self, arguments: &mut Map<String, Value>) {
        for param in &self.properties {
            if let Some(value) = arguments.get_mut(&param.name) {
                param.schema.coerce_integers(value);
            }
        }
    }

    /// Fill absent parameters with their declared defaults.
    pub fn apply_defaults(&self, arguments: &mut Map<String, Value>) {
        for param in &self.properties {
            if let Some(default) = &param.default {
                if !arguments.contains_key(&param.name) {
                    arguments.insert(param.name.clone(), default.clone());
                }
            }
        }
    }
}

pub(crate) fn json_type_name(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "boolean",
        Value::Number(n) if n.is_f64() => "number",
        Value::Number(_) => "integer",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}

/// Derive the parameter schema from declarations, in declaration order.
///
/// Receivers are skipped. Catch-all parameters are skipped here as well;
/// registration rejects them before derivation runs.
pub fn derive_parameters(params: &[ParamDecl]) -> ParametersSchema {
    let mut schema = ParametersSchema::default();
    for decl in params.iter().filter(|p| p.kind == ParamKind::Named) {
        let default = decl
            .default
            .clone()
            .or_else(|| decl.hint.is_optional().then_some(Value::Null));
        let required = default.is_none();
        if required {
            schema.required.push(decl.name.clone());
        }
        schema.properties.push(ParameterSchema {
            name: decl.name.clone(),
            schema: decl.hint.schema(),
            default,
            required,
        });
    }
    schema
}

/// Names that appear more than once among the advertised parameters.
pub(crate) fn duplicate_names(params: &[ParamDecl]) -> Vec<String> {
    let mut seen = HashSet::new();
    let mut dupes = Vec::new();
    for decl in params.iter().filter(|p| p.kind == ParamKind::Named) {
        if !seen.insert(decl.name.as_str()) && !dupes.contains(&decl.name) {
            dupes.push(decl.name.clone());
        }
    }
    dupes
}

/// Build parameter declarations from a `schemars` argument struct.
///
/// Properties keep their declaration order. A property outside `required`
/// without an explicit default becomes optional.
pub fn params_from_schema<A: JsonSchema>() -> Vec<ParamDecl> {
    let root = schemars::schema_for!(A);
    let value = serde_json::to_value(&root).unwrap_or(Value::Null);
    let required: HashSet<&str> = value
        .get("required")
        .and_then(Value::as_array)
        .map(|names| names.iter().filter_map(Value::as_str).collect())
        .unwrap_or_default();

    let Some(properties) = value.get("properties").and_then(Value::as_object) else {
        return Vec::new();
    };

    properties
        .iter()
        .map(|(name, prop)| {
            let mut hint = hint_from_json_schema(prop);
            let default = prop.get("default").cloned();
            if default.is_none() && !required.contains(name.as_str()) && !hint.is_optional() {
                hint = TypeHint::optional(hint);
            }
            ParamDecl {
                default,
                ..ParamDecl::new(name.clone(), hint)
            }
        })
        .collect()
}

fn hint_from_json_schema(prop: &Value) -> TypeHint {
    let (kind, nullable) = match prop.get("type") {
        Some(Value::String(name)) => (SchemaKind::from_json_type(name), false),
        Some(Value::Array(names)) => {
            let names: Vec<&str> = names.iter().filter_map(Value::as_str).collect();
            let kind = names
                .iter()
                .filter(|n| **n != "null")
                .find_map(|n| SchemaKind::from_json_type(n));
            (kind, names.contains(&"null"))
        }
        _ => (None, false),
    };
    let hint = match kind {
        Some(SchemaKind::String) => TypeHint::String,
        Some(SchemaKind::Integer) => TypeHint::Integer,
        Some(SchemaKind::Number) => TypeHint::Number,
        Some(SchemaKind::Boolean) => TypeHint::Boolean,
        Some(SchemaKind::Object) => TypeHint::Mapping,
        Some(SchemaKind::Array) => TypeHint::Sequence(
            prop.get("items")
                .filter(|items| items.is_object())
                .map(|items| Box::new(hint_from_json_schema(items))),
        ),
        None => TypeHint::Other(prop.to_string()),
    };
    if nullable {
        TypeHint::optional(hint)
    } else {
        hint
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use serde::Deserialize;

    #[test]
    fn test_primitive_mapping() {
        let cases = [
            ("String", SchemaKind::String),
            ("& str", SchemaKind::String),
            ("& 'a str", SchemaKind::String),
            ("i64", SchemaKind::Integer),
            ("usize", SchemaKind::Integer),
            ("f32", SchemaKind::Number),
            ("bool", SchemaKind::Boolean),
            ("std :: collections :: HashMap < String , f64 >", SchemaKind::Object),
            ("BTreeMap<String, Vec<u8>>", SchemaKind::Object),
            ("serde_json::Value", SchemaKind::String),
            ("MyStruct", SchemaKind::String),
            ("(i32, i32)", SchemaKind::String),
            ("", SchemaKind::String),
        ];
        for (text, kind) in cases {
            assert_eq!(TypeHint::from_rust(text).schema().kind, kind, "{text}");
        }
    }

    #[test]
    fn test_sequences_nest_items() {
        let schema = TypeHint::from_rust("Vec < Vec < i32 > >").schema();
        assert_eq!(
            schema,
            TypeSchema::array_of(TypeSchema::array_of(TypeSchema::of(SchemaKind::Integer)))
        );

        let slice = TypeHint::from_rust("& [f64]").schema();
        assert_eq!(
            slice,
            TypeSchema::array_of(TypeSchema::of(SchemaKind::Number))
        );

        let array = TypeHint::from_rust("[bool ; 4]").schema();
        assert_eq!(
            array,
            TypeSchema::array_of(TypeSchema::of(SchemaKind::Boolean))
        );
    }

    #[test]
    fn test_unspecified_or_unknown_items_default_to_string() {
        assert_eq!(
            TypeHint::Sequence(None).schema(),
            TypeSchema::array_of(TypeSchema::of(SchemaKind::String))
        );
        assert_eq!(
            TypeHint::from_rust("Vec<Widget>").schema(),
            TypeSchema::array_of(TypeSchema::of(SchemaKind::String))
        );
    }

    #[test]
    fn test_wrappers_are_transparent() {
        assert_eq!(TypeHint::from_rust("Box<i64>"), TypeHint::Integer);
        assert_eq!(
            TypeHint::from_rust("Option<Arc<String>>"),
            TypeHint::optional(TypeHint::String)
        );
        let borrowed = TypeHint::from_rust("& mut Vec<u8>");
        assert_eq!(borrowed.schema().kind, SchemaKind::Array);
    }

    #[test]
    fn test_required_and_optional_counts() {
        let params = vec![
            ParamDecl::new("query", TypeHint::String),
            ParamDecl::new("limit", TypeHint::Integer).with_default(10),
            ParamDecl::new("tags", TypeHint::sequence_of(TypeHint::String)),
            ParamDecl::new("verbose", TypeHint::Boolean)
                .with_default(false),
            ParamDecl::new("cursor", TypeHint::optional(TypeHint::String)),
        ];
        let schema = derive_parameters(&params);

        assert_eq!(schema.properties.len(), 5);
        assert_eq!(schema.required, ["query", "tags"]);
        for param in &schema.properties {
            assert_eq!(param.required, param.default.is_none(), "{}", param.name);
        }
        assert_eq!(schema.get("cursor").unwrap().default, Some(Value::Null));
    }

    #[test]
    fn test_zero_parameters_is_valid() {
        let schema = derive_parameters(&[]);
        assert!(schema.is_empty());
        assert_eq!(
            schema.to_json(),
            json!({"type": "object", "properties": {}, "required": []})
        );
    }

    #[test]
    fn test_receiver_is_skipped() {
        let schema = derive_parameters(&[
            ParamDecl::receiver(),
            ParamDecl::new("city", TypeHint::String),
        ]);
        assert_eq!(schema.properties.len(), 1);
        assert_eq!(schema.required, vec!["city".to_string()]);
    }

    #[test]
    fn test_untyped_defaults_to_string() {
        let schema = derive_parameters(&[ParamDecl::untyped("note")]);
        assert_eq!(schema.get("note").unwrap().kind(), SchemaKind::String);
    }

    #[test]
    fn test_json_rendering() {
        let schema = derive_parameters(&[
            ParamDecl::new("values", TypeHint::sequence_of(TypeHint::Number)),
            ParamDecl::new("unit", TypeHint::String)
                .with_default("celsius"),
        ]);
        assert_eq!(
            schema.to_json(),
            json!({
                "type": "object",
                "properties": {
                    "values": {"type": "array", "items": {"type": "number"}},
                    "unit": {"type": "string", "default": "celsius"}
                },
                "required": ["values"]
            })
        );
    }

    #[test]
    fn test_validate_accepts_and_rejects() {
        let schema = derive_parameters(&[
            ParamDecl::new("a", TypeHint::Integer),
            ParamDecl::new("xs", TypeHint::sequence_of(TypeHint::Integer))
                .with_default(json!([])),
            ParamDecl::new("label", TypeHint::optional(TypeHint::String)),
        ]);
        let args = |v: Value| v.as_object().cloned().unwrap();

        assert!(schema.validate(&args(json!({"a": 1}))).is_ok());
        assert!(schema
            .validate(&args(json!({"a": 1, "xs": [1, 2], "label": null})))
            .is_ok());

        assert_eq!(
            schema.validate(&args(json!({}))),
            Err(ArgumentValidationError::Missing { name: "a".into() })
        );
        assert_eq!(
            schema.validate(&args(json!({"a": 1, "b": 2}))),
            Err(ArgumentValidationError::Unexpected { name: "b".into() })
        );
        assert_eq!(
            schema.validate(&args(json!({"a": 1.5}))),
            Err(ArgumentValidationError::WrongType {
                name: "a".into(),
                expected: SchemaKind::Integer,
                found: "number",
            })
        );
        assert_eq!(
            schema.validate(&args(json!({"a": 1, "xs": [1, "two"]}))),
            Err(ArgumentValidationError::WrongType {
                name: "xs".into(),
                expected: SchemaKind::Array,
                found: "array",
            })
        );
    }

    #[test]
    fn test_apply_defaults_keeps_explicit_values() {
        let schema = derive_parameters(&[
            ParamDecl::new("a", TypeHint::Integer),
            ParamDecl::new("b", TypeHint::Integer).with_default(7),
        ]);
        let mut args = json!({"a": 1}).as_object().cloned().unwrap();
        schema.apply_defaults(&mut args);
        assert_eq!(Value::Object(args.clone()), json!({"a": 1, "b": 7}));

        args.insert("b".into(), json!(3));
        schema.apply_defaults(&mut args);
        assert_eq!(args["b"], json!(3));
    }

    #[test]
    fn test_whole_floats_count_as_integers() {
        let schema = derive_parameters(&[
            ParamDecl::new("n", TypeHint::Integer),
            ParamDecl::new("ids", TypeHint::sequence_of(TypeHint::Integer)),
            ParamDecl::new("ratio", TypeHint::Number),
        ]);
        let mut args = json!({"n": 2.0, "ids": [1, 3.0], "ratio": 4.0})
            .as_object()
            .cloned()
            .unwrap();
        assert_eq!(schema.validate(&args), Ok(()));

        schema.coerce_integers(&mut args);
        assert_eq!(args["n"], json!(2));
        assert!(args["n"].is_i64());
        assert_eq!(args["ids"], json!([1, 3]));
        assert!(args["ratio"].is_f64());

        let fractional = json!({"n": 2.5, "ids": [], "ratio": 1});
        assert_eq!(
            schema.validate(fractional.as_object().unwrap()),
            Err(ArgumentValidationError::WrongType {
                name: "n".into(),
                expected: SchemaKind::Integer,
                found: "number",
            })
        );
    }

    #[test]
    fn test_duplicate_names() {
        let params = vec![
            ParamDecl::new("a", TypeHint::Integer),
            ParamDecl::new("a", TypeHint::String),
            ParamDecl::receiver(),
        ];
        assert_eq!(duplicate_names(&params), vec!["a".to_string()]);
    }

    #[derive(Deserialize, JsonSchema)]
    #[allow(dead_code)]
    struct SearchArgs {
        query: String,
        #[serde(default = "default_limit")]
        limit: u32,
        tags: Vec<String>,
        cursor: Option<String>,
    }

    fn default_limit() -> u32 {
        5
    }

    #[test]
    fn test_params_from_schemars() {
        let params = params_from_schema::<SearchArgs>();
        let names: Vec<&str> = params.iter().map(|p| p.name.as_str()).collect();
        assert_eq!(names, vec!["query", "limit", "tags", "cursor"]);

        let schema = derive_parameters(&params);
        assert_eq!(schema.required, ["query", "tags"]);
        assert_eq!(schema.get("limit").unwrap().default, Some(json!(5)));
        assert_eq!(schema.get("limit").unwrap().kind(), SchemaKind::Integer);
        assert_eq!(
            schema.get("tags").unwrap().items(),
            Some(&TypeSchema::of(SchemaKind::String))
        );
        assert_eq!(schema.get("cursor").unwrap().kind(), SchemaKind::String);
        assert_eq!(schema.get("cursor").unwrap().default, Some(Value::Null));
    }
}
