//! Tool system for agents
//!
//! A tool is a callable exposed to the model with a name, description and
//! parameter schema. Callables are described by [`ToolFn`] (the handler plus
//! its declared signature) and turned into advertised tools by
//! [`register_tool`], which derives the [`ToolSpec`] exactly once. The
//! resulting [`ToolHandle`] is what an [`Agent`](crate::Agent) holds.
//!
//! Most callers never build a `ToolFn` by hand: `#[function_tool]` reads a
//! plain function's signature and generates the registration.

use std::collections::HashMap;
use std::fmt::Debug;
use std::future::Future;
use std::sync::{Arc, Mutex, PoisonError};

use async_trait::async_trait;
use futures::future::{self, BoxFuture, FutureExt};
use schemars::JsonSchema;
use serde::de::DeserializeOwned;
use serde::Serialize;
use serde_json::{json, Map, Value};

use crate::error::{AgentsError, Result, ToolError};
use crate::schema::{
    derive_parameters, duplicate_names, params_from_schema, ParamDecl, ParametersSchema,
};

/// Structured description of a tool sent to the completion API.
#[derive(Debug, Clone, PartialEq)]
pub struct ToolSpec {
    pub name: String,
    pub description: String,
    pub parameters: ParametersSchema,
}

impl ToolSpec {
    /// Chat-completions function-tool form:
    /// `{"type": "function", "function": {name, description, parameters}}`.
    pub fn to_json(&self) -> Value {
        json!({
            "type": "function",
            "function": {
                "name": self.name,
                "description": self.description,
                "parameters": self.parameters.to_json(),
            }
        })
    }
}

/// Value returned by a tool, ready to be placed in the conversation.
#[derive(Debug, Clone, PartialEq)]
pub enum ToolOutput {
    /// Natively serializable output.
    Json(Value),
    /// String rendering of a value that could not be serialized.
    Text(String),
}

impl ToolOutput {
    pub fn text(value: impl std::fmt::Display) -> Self {
        ToolOutput::Text(value.to_string())
    }

    /// JSON text for the tool-result message. `Text` is encoded as a JSON
    /// string.
    pub fn to_json_string(&self) -> String {
        match self {
            ToolOutput::Json(value) => value.to_string(),
            ToolOutput::Text(text) => Value::String(text.clone()).to_string(),
        }
    }
}

/// Conversion from a handler's return value into a [`ToolOutput`].
///
/// Serialization failures fall back to the `Debug` rendering. A bare NaN or
/// infinity keeps its `Debug` text too; nested inside a larger value it is
/// written as `null`.
pub trait IntoToolOutput {
    fn into_tool_output(self) -> ToolOutput;
}

impl<T> IntoToolOutput for T
where
    T: Serialize + Debug,
{
    fn into_tool_output(self) -> ToolOutput {
        match serde_json::to_value(&self) {
            Ok(Value::Null) => {
                // serde_json writes non-finite floats as null
                let rendered = format!("{:?}", self);
                if matches!(rendered.as_str(), "NaN" | "inf" | "-inf") {
                    ToolOutput::Text(rendered)
                } else {
                    ToolOutput::Json(Value::Null)
                }
            }
            Ok(value) => ToolOutput::Json(value),
            Err(err) => {
                tracing::debug!(error = %err, "tool output is not JSON-serializable, using Debug");
                ToolOutput::Text(format!("{:?}", self))
            }
        }
    }
}

/// Decoded argument object passed to a handler.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ToolArguments(Map<String, Value>);

impl ToolArguments {
    pub fn new(map: Map<String, Value>) -> Self {
        Self(map)
    }

    pub fn get(&self, name: &str) -> Option<&Value> {
        self.0.get(name)
    }

    /// Remove and decode one argument. An absent key decodes as `null`, so
    /// `Option<T>` parameters may be omitted.
    pub fn take<T: DeserializeOwned>(
        &mut self,
        name: &str,
    ) -> std::result::Result<T, ToolError> {
        let Some(value) = self.0.remove(name) else {
            return serde_json::from_value(Value::Null)
                .map_err(|_| ToolError::missing_argument(name));
        };
        serde_json::from_value(value)
            .map_err(|err| ToolError::invalid_argument(name, err))
    }

    pub fn as_map(&self) -> &Map<String, Value> {
        &self.0
    }

    pub fn into_inner(self) -> Map<String, Value> {
        self.0
    }
}

impl From<Map<String, Value>> for ToolArguments {
    fn from(map: Map<String, Value>) -> Self {
        Self(map)
    }
}

type Handler = Arc<
    dyn Fn(ToolArguments) -> BoxFuture<'static, std::result::Result<ToolOutput, ToolError>>
        + Send
        + Sync,
>;

/// A callable together with its declared signature.
///
/// Cloning shares the underlying handler, so clones are the same callable
/// for registry purposes.
#[derive(Clone)]
pub struct ToolFn {
    name: String,
    doc: Option<String>,
    params: Vec<ParamDecl>,
    handler: Handler,
}

impl std::fmt::Debug for ToolFn {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ToolFn")
            .field("name", &self.name)
            .field("params", &self.params)
            .finish()
    }
}

impl ToolFn {
    /// Wrap a synchronous handler.
    pub fn new<F>(name: impl Into<String>, handler: F) -> Self
    where
        F: Fn(ToolArguments) -> std::result::Result<ToolOutput, ToolError> + Send + Sync + 'static,
    {
        let handler: Handler = Arc::new(move |args: ToolArguments| {
            future::ready(handler(args)).boxed()
        });
        Self {
            name: name.into(),
            doc: None,
            params: Vec::new(),
            handler,
        }
    }

    /// Wrap an asynchronous handler.
    pub fn new_async<F, Fut>(name: impl Into<String>, handler: F) -> Self
    where
        F: Fn(ToolArguments) -> Fut + Send + Sync + 'static,
        Fut: Future<Output = std::result::Result<ToolOutput, ToolError>> + Send + 'static,
    {
        let handler: Handler = Arc::new(move |args: ToolArguments| handler(args).boxed());
        Self {
            name: name.into(),
            doc: None,
            params: Vec::new(),
            handler,
        }
    }

    /// Wrap a handler over a typed argument struct; parameters are taken
    /// from the struct's `JsonSchema`.
    pub fn typed<A, R, F>(name: impl Into<String>, handler: F) -> Self
    where
        A: DeserializeOwned + JsonSchema,
        R: IntoToolOutput,
        F: Fn(A) -> std::result::Result<R, ToolError> + Send + Sync + 'static,
    {
        let tool = Self::new(name, move |args: ToolArguments| {
            let value = Value::Object(args.into_inner());
            let parsed: A = serde_json::from_value(value)
                .map_err(|err| ToolError::invalid_argument("arguments", err))?;
            handler(parsed).map(IntoToolOutput::into_tool_output)
        });
        tool.params(params_from_schema::<A>())
    }

    /// Documentation string used as the description.
    pub fn doc(mut self, doc: impl Into<String>) -> Self {
        self.doc = Some(doc.into());
        self
    }

    pub fn param(mut self, decl: ParamDecl) -> Self {
        self.params.push(decl);
        self
    }

    pub fn params(mut self, decls: impl IntoIterator<Item = ParamDecl>) -> Self {
        self.params.extend(decls);
        self
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn declared_params(&self) -> &[ParamDecl] {
        &self.params
    }

    /// Invoke the callable directly, bypassing any tool machinery.
    pub async fn call(&self, args: ToolArguments) -> std::result::Result<ToolOutput, ToolError> {
        (self.handler)(args).await
    }

    fn identity(&self) -> usize {
        Arc::as_ptr(&self.handler) as *const () as usize
    }
}

/// Optional replacements applied at registration.
#[derive(Debug, Clone, Default)]
pub struct ToolOverrides {
    pub name: Option<String>,
    pub description: Option<String>,
}

impl ToolOverrides {
    pub fn name(mut self, name: impl Into<String>) -> Self {
        self.name = Some(name.into());
        self
    }

    pub fn description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }
}

/// Derive a [`ToolSpec`] for `callable` and bind the two together.
///
/// The description is the callable's doc, trimmed, or
/// `"Tool function <name>"` when that is empty. Catch-all parameters and
/// duplicate parameter names are rejected.
pub fn register_tool(callable: &ToolFn, overrides: ToolOverrides) -> Result<ToolHandle> {
    let name = overrides.name.unwrap_or_else(|| callable.name.clone());

    if let Some(bad) = callable.params.iter().find(|p| p.kind.is_catch_all()) {
        return Err(AgentsError::ToolRegistrationError {
            message: format!(
                "tool '{}' declares catch-all parameter '{}', which has no schema form",
                name, bad.name
            ),
        });
    }
    let dupes = duplicate_names(&callable.params);
    if !dupes.is_empty() {
        return Err(AgentsError::ToolRegistrationError {
            message: format!(
                "tool '{}' declares parameter(s) more than once: {}",
                name,
                dupes.join(", ")
            ),
        });
    }

    let doc = overrides.description.or_else(|| callable.doc.clone());
    let description = doc
        .as_deref()
        .map(str::trim)
        .filter(|d| !d.is_empty())
        .map(str::to_string)
        .unwrap_or_else(|| format!("Tool function {}", name));

    let spec = ToolSpec {
        name,
        description,
        parameters: derive_parameters(&callable.params),
    };
    tracing::debug!(
        tool = %spec.name,
        params = spec.parameters.properties.len(),
        "registered tool"
    );

    Ok(ToolHandle(Arc::new(RegisteredTool {
        spec,
        callable: callable.clone(),
    })))
}

/// Trait for all tools that can be used by agents
#[async_trait]
pub trait Tool: Send + Sync + Debug {
    /// Name the model uses to request this tool
    fn name(&self) -> &str;

    /// Advertised specification; tools without one are callable but never
    /// offered to the model
    fn spec(&self) -> Option<&ToolSpec> {
        None
    }

    /// Execute the tool with decoded arguments
    async fn call(&self, arguments: ToolArguments) -> std::result::Result<ToolOutput, ToolError>;
}

/// A callable bound to its derived specification.
#[derive(Debug)]
pub struct RegisteredTool {
    spec: ToolSpec,
    callable: ToolFn,
}

#[async_trait]
impl Tool for RegisteredTool {
    fn name(&self) -> &str {
        &self.spec.name
    }

    fn spec(&self) -> Option<&ToolSpec> {
        Some(&self.spec)
    }

    async fn call(&self, arguments: ToolArguments) -> std::result::Result<ToolOutput, ToolError> {
        let mut map = arguments.into_inner();
        self.spec.parameters.apply_defaults(&mut map);
        self.spec.parameters.coerce_integers(&mut map);
        self.callable.call(ToolArguments::new(map)).await
    }
}

/// Cheap, clonable handle to a registered tool.
#[derive(Debug, Clone)]
pub struct ToolHandle(Arc<RegisteredTool>);

impl ToolHandle {
    pub fn spec(&self) -> &ToolSpec {
        &self.0.spec
    }

    pub fn name(&self) -> &str {
        &self.0.spec.name
    }

    /// The wrapped callable, still directly invokable.
    pub fn callable(&self) -> &ToolFn {
        &self.0.callable
    }

    pub fn same_tool(&self, other: &ToolHandle) -> bool {
        Arc::ptr_eq(&self.0, &other.0)
    }
}

impl From<ToolHandle> for Arc<dyn Tool> {
    fn from(handle: ToolHandle) -> Self {
        handle.0
    }
}

/// Explicit registry keyed by callable identity.
///
/// Registering the same callable again returns the handle produced the
/// first time; derivation runs once per distinct callable.
#[derive(Debug, Default)]
pub struct ToolRegistry {
    handles: Mutex<HashMap<usize, ToolHandle>>,
}

impl ToolRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn register(&self, callable: &ToolFn) -> Result<ToolHandle> {
        self.register_with(callable, ToolOverrides::default())
    }

    /// Overrides only apply on first registration of a callable.
    pub fn register_with(&self, callable: &ToolFn, overrides: ToolOverrides) -> Result<ToolHandle> {
        let mut handles = self.handles.lock().unwrap_or_else(PoisonError::into_inner);
        if let Some(existing) = handles.get(&callable.identity()) {
            return Ok(existing.clone());
        }
        let handle = register_tool(callable, overrides)?;
        handles.insert(callable.identity(), handle.clone());
        Ok(handle)
    }

    pub fn len(&self) -> usize {
        self.handles
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::schema::{SchemaKind, TypeHint};
    use pretty_assertions::assert_eq;
    use serde::Deserialize;

    fn add_fn() -> ToolFn {
        ToolFn::new("add", |mut args: ToolArguments| {
            let a: i64 = args.take("a")?;
            let b: i64 = args.take("b")?;
            Ok((a + b).into_tool_output())
        })
        .doc("\n    Add two integers.\n  ")
        .param(ParamDecl::new("a", TypeHint::Integer))
        .param(ParamDecl::new("b", TypeHint::Integer).with_default(1))
    }

    fn args(value: Value) -> ToolArguments {
        ToolArguments::new(value.as_object().cloned().unwrap())
    }

    #[test]
    fn test_register_derives_spec() {
        let handle = register_tool(&add_fn(), ToolOverrides::default()).unwrap();
        let spec = handle.spec();
        assert_eq!(spec.name, "add");
        assert_eq!(spec.description, "Add two integers.");
        assert_eq!(spec.parameters.required, vec!["a".to_string()]);
        assert_eq!(spec.parameters.get("b").unwrap().default, Some(json!(1)));
        assert_eq!(
            spec.parameters.get("a").unwrap().kind(),
            SchemaKind::Integer
        );
    }

    #[test]
    fn test_missing_doc_synthesizes_description() {
        let tool = ToolFn::new("ping", |_| Ok(ToolOutput::text("pong")));
        let handle = register_tool(&tool, ToolOverrides::default()).unwrap();
        assert_eq!(handle.spec().description, "Tool function ping");

        let blank = ToolFn::new("ping", |_| Ok(ToolOutput::text("pong")))
            .doc("   \n ");
        let handle = register_tool(&blank, ToolOverrides::default()).unwrap();
        assert_eq!(handle.spec().description, "Tool function ping");
    }

    #[test]
    fn test_overrides() {
        let handle = register_tool(
            &add_fn(),
            ToolOverrides::default().name("sum").description(" Sums. "),
        )
        .unwrap();
        assert_eq!(handle.name(), "sum");
        assert_eq!(handle.spec().description, "Sums.");
        assert_eq!(handle.callable().name(), "add");
    }

    #[test]
    fn test_registration_is_idempotent() {
        let tool = add_fn();
        let first = register_tool(&tool, ToolOverrides::default()).unwrap();
        let second = register_tool(&tool, ToolOverrides::default()).unwrap();
        assert_eq!(first.spec(), second.spec());
        assert_eq!(first.spec().to_json(), second.spec().to_json());
    }

    #[test]
    fn test_registry_caches_by_identity() {
        let registry = ToolRegistry::new();
        let tool = add_fn();
        let first = registry.register(&tool).unwrap();
        let again = registry.register(&tool.clone()).unwrap();
        assert!(first.same_tool(&again));
        assert_eq!(registry.len(), 1);

        let other = registry.register(&add_fn()).unwrap();
        assert!(!first.same_tool(&other));
        assert_eq!(registry.len(), 2);
    }

    #[test]
    fn test_catch_all_parameters_are_rejected() {
        let tool = ToolFn::new("log", |_| Ok(ToolOutput::Json(Value::Null)))
            .param(ParamDecl::new("message", TypeHint::String))
            .param(ParamDecl::variadic("rest"));
        let err = register_tool(&tool, ToolOverrides::default()).unwrap_err();
        assert!(matches!(err, AgentsError::ToolRegistrationError { .. }));
        assert!(err.to_string().contains("rest"));

        let tool = ToolFn::new("log", |_| Ok(ToolOutput::Json(Value::Null)))
            .param(ParamDecl::keyword_catch_all("extra"));
        assert!(register_tool(&tool, ToolOverrides::default()).is_err());
    }

    #[test]
    fn test_duplicate_parameters_are_rejected() {
        let tool = ToolFn::new("dup", |_| Ok(ToolOutput::Json(Value::Null)))
            .param(ParamDecl::new("a", TypeHint::Integer))
            .param(ParamDecl::new("a", TypeHint::Integer));
        assert!(register_tool(&tool, ToolOverrides::default()).is_err());
    }

    #[tokio::test]
    async fn test_handle_applies_defaults() {
        let handle = register_tool(&add_fn(), ToolOverrides::default()).unwrap();
        let out = handle.0.call(args(json!({"a": 2}))).await.unwrap();
        assert_eq!(out, ToolOutput::Json(json!(3)));
    }

    #[tokio::test]
    async fn test_callable_remains_directly_invokable() {
        let handle = register_tool(&add_fn(), ToolOverrides::default()).unwrap();
        let out = handle
            .callable()
            .call(args(json!({"a": 2, "b": 3})))
            .await
            .unwrap();
        assert_eq!(out, ToolOutput::Json(json!(5)));

        let err = handle
            .callable()
            .call(args(json!({"b": 3})))
            .await
            .unwrap_err();
        assert_eq!(err.to_string(), "missing required argument 'a'");
    }

    #[tokio::test]
    async fn test_async_handler() {
        let tool = ToolFn::new_async("echo", |mut args: ToolArguments| async move {
            let text: String = args.take("text")?;
            Ok::<_, ToolError>(text.into_tool_output())
        })
        .param(ParamDecl::new("text", TypeHint::String));
        let out = tool.call(args(json!({"text": "hi"}))).await.unwrap();
        assert_eq!(out, ToolOutput::Json(json!("hi")));
    }

    #[test]
    fn test_take_decodes_optional_and_reports_bad_values() {
        let mut a = args(json!({"n": "x"}));
        let missing: Option<String> = a.take("absent").unwrap();
        assert_eq!(missing, None);

        let message = a.take::<i64>("n").unwrap_err().to_string();
        assert!(message.starts_with("invalid value for argument 'n'"));
    }

    #[test]
    fn test_non_serializable_output_falls_back_to_debug() {
        let mut map = HashMap::new();
        map.insert((1u8, 2u8), "x");
        let out = map.into_tool_output();
        assert_eq!(out, ToolOutput::Text(r#"{(1, 2): "x"}"#.to_string()));
        assert_eq!(out.to_json_string(), r#""{(1, 2): \"x\"}""#);
    }

    #[test]
    fn test_non_finite_floats_keep_their_rendering() {
        let nan = f64::NAN.into_tool_output();
        assert_eq!(nan, ToolOutput::text("NaN"));
        assert_eq!(nan.to_json_string(), r#""NaN""#);

        let inf = f32::NEG_INFINITY.into_tool_output();
        assert_eq!(inf, ToolOutput::text("-inf"));

        let none: Option<f64> = None;
        assert_eq!(none.into_tool_output(), ToolOutput::Json(Value::Null));
        assert_eq!(().into_tool_output(), ToolOutput::Json(Value::Null));

        let nested = vec![1.0, f64::INFINITY].into_tool_output();
        assert_eq!(nested, ToolOutput::Json(json!([1.0, null])));
    }

    #[derive(Deserialize, JsonSchema)]
    struct WeatherArgs {
        city: String,
        units: Option<String>,
    }

    #[tokio::test]
    async fn test_typed_tool() {
        let tool = ToolFn::typed("weather", |a: WeatherArgs| {
            let units = a.units.unwrap_or_else(|| "celsius".into());
            Ok(format!("{} in {}", a.city, units))
        })
        .doc("Current weather");
        let handle = register_tool(&tool, ToolOverrides::default()).unwrap();
        assert_eq!(handle.spec().parameters.required, vec!["city".to_string()]);

        let out = handle.0.call(args(json!({"city": "Oslo"}))).await.unwrap();
        assert_eq!(out, ToolOutput::Json(json!("Oslo in celsius")));
    }
}
