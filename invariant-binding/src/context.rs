//! Binding context: values, model metadata, model state and results

use std::collections::BTreeMap;

use rust_decimal::Decimal;

/// Target type of a binding
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ModelType {
    /// 32-bit float
    Single,
    /// 64-bit float
    Double,
    /// 128-bit decimal
    Decimal,
    /// 32-bit signed integer
    Int32,
    /// 64-bit signed integer
    Int64,
    /// Boolean
    Boolean,
    /// Text
    String,
}

impl ModelType {
    /// Name used in messages
    pub fn name(&self) -> &'static str {
        match self {
            Self::Single => "Single",
            Self::Double => "Double",
            Self::Decimal => "Decimal",
            Self::Int32 => "Int32",
            Self::Int64 => "Int64",
            Self::Boolean => "Boolean",
            Self::String => "String",
        }
    }
}

/// What is known about the model being bound
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ModelMetadata {
    /// Underlying type (the inner type of an optional model)
    pub model_type: ModelType,
    /// Whether the model accepts "no value"
    pub is_nullable: bool,
}

impl ModelMetadata {
    /// Required model of the given type
    pub fn new(model_type: ModelType) -> Self {
        Self {
            model_type,
            is_nullable: false,
        }
    }

    /// Optional model of the given type
    pub fn nullable(model_type: ModelType) -> Self {
        Self {
            model_type,
            is_nullable: true,
        }
    }
}

/// Raw values found under a key
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ValueProviderResult {
    values: Vec<String>,
}

impl ValueProviderResult {
    /// No value
    pub fn none() -> Self {
        Self::default()
    }

    /// Values found under the key
    pub fn new(values: Vec<String>) -> Self {
        Self { values }
    }

    /// Whether nothing was found
    pub fn is_none(&self) -> bool {
        self.values.is_empty()
    }

    /// First value, if any
    pub fn first_value(&self) -> Option<&str> {
        self.values.first().map(String::as_str)
    }

    /// Every value
    pub fn values(&self) -> &[String] {
        &self.values
    }
}

/// Source of raw request values
pub trait ValueProvider: Send + Sync {
    /// Values under `key`
    fn get_value(&self, key: &str) -> ValueProviderResult;
}

/// Value provider over decoded `key=value` pairs (query string or form body)
///
/// Keys are matched case-insensitively; repeated keys keep every value in
/// order.
#[derive(Debug, Clone, Default)]
pub struct PairsValueProvider {
    values: BTreeMap<String, Vec<String>>,
}

impl PairsValueProvider {
    /// Build from decoded pairs
    pub fn new<I, K, V>(pairs: I) -> Self
    where
        I: IntoIterator<Item = (K, V)>,
        K: AsRef<str>,
        V: Into<String>,
    {
        let mut values: BTreeMap<String, Vec<String>> = BTreeMap::new();
        for (key, value) in pairs {
            values
                .entry(key.as_ref().to_lowercase())
                .or_default()
                .push(value.into());
        }
        Self { values }
    }
}

impl ValueProvider for PairsValueProvider {
    fn get_value(&self, key: &str) -> ValueProviderResult {
        self.values
            .get(&key.to_lowercase())
            .map(|values| ValueProviderResult::new(values.clone()))
            .unwrap_or_default()
    }
}

/// Binding state of one key
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ModelStateEntry {
    /// Raw values seen for the key
    pub raw_value: Vec<String>,
    /// Values joined with `,`, as shown back to the user
    pub attempted_value: Option<String>,
    /// Binding errors
    pub errors: Vec<String>,
}

/// Binding state of every key of a request
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ModelStateDictionary {
    entries: BTreeMap<String, ModelStateEntry>,
}

impl ModelStateDictionary {
    /// Empty state
    pub fn new() -> Self {
        Self::default()
    }

    /// Record the raw values bound to `key`
    pub fn set_model_value(&mut self, key: &str, result: &ValueProviderResult) {
        let entry = self.entries.entry(key.to_string()).or_default();
        entry.raw_value = result.values().to_vec();
        entry.attempted_value = Some(result.values().join(","));
    }

    /// Record a binding error for `key`
    pub fn add_model_error(&mut self, key: &str, message: impl Into<String>) {
        self.entries
            .entry(key.to_string())
            .or_default()
            .errors
            .push(message.into());
    }

    /// State of `key`
    pub fn get(&self, key: &str) -> Option<&ModelStateEntry> {
        self.entries.get(key)
    }

    /// Whether no key has errors
    pub fn is_valid(&self) -> bool {
        self.entries.values().all(|e| e.errors.is_empty())
    }

    /// Total number of errors
    pub fn error_count(&self) -> usize {
        self.entries.values().map(|e| e.errors.len()).sum()
    }
}

/// A bound model value
#[derive(Debug, Clone, PartialEq)]
pub enum BoundValue {
    /// 32-bit float
    Single(f32),
    /// 64-bit float
    Double(f64),
    /// Decimal
    Decimal(Decimal),
    /// 32-bit integer
    Int32(i32),
    /// 64-bit integer
    Int64(i64),
    /// Boolean
    Boolean(bool),
    /// Text
    String(String),
}

/// Outcome of a binder that took responsibility for the key
#[derive(Debug, Clone, PartialEq)]
pub enum ModelBindingResult {
    /// Bound; `None` is the empty value of a nullable model
    Success(Option<BoundValue>),
    /// The value could not be bound; see model state
    Failed,
}

impl ModelBindingResult {
    /// Whether binding succeeded
    pub fn is_model_set(&self) -> bool {
        matches!(self, Self::Success(_))
    }
}

/// Everything a binder reads and writes
pub struct ModelBindingContext<'a> {
    /// Key the model is bound from
    pub model_name: String,
    /// Model metadata
    pub metadata: ModelMetadata,
    /// Raw request values
    pub value_provider: &'a dyn ValueProvider,
    /// Binding state
    pub model_state: ModelStateDictionary,
    /// Outcome; `None` until a binder takes responsibility
    pub result: Option<ModelBindingResult>,
}

impl<'a> ModelBindingContext<'a> {
    /// Fresh context for `model_name`
    pub fn new(
        model_name: impl Into<String>,
        metadata: ModelMetadata,
        value_provider: &'a dyn ValueProvider,
    ) -> Self {
        Self {
            model_name: model_name.into(),
            metadata,
            value_provider,
            model_state: ModelStateDictionary::new(),
            result: None,
        }
    }
}
