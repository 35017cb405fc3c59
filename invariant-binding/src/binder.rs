//! Model binders
//!
//! [`InvariantFloatingPointModelBinder`] accepts `/` as the decimal
//! separator (some client-side numeric widgets post it) and parses under
//! invariant rules. Anything it cannot parse goes to a fallback binder
//! chosen from the target type.

use crate::context::{BoundValue, ModelBindingContext, ModelBindingResult, ModelType};
use crate::parse::{parse_decimal, parse_f32, parse_f64, ParseError};
use crate::styles::NumberStyles;

/// Binds one model from the request values
pub trait ModelBinder: Send + Sync {
    /// Bind the model named by the context
    ///
    /// A binder that finds no value leaves `ctx.result` unset.
    fn bind_model(&self, ctx: &mut ModelBindingContext<'_>);
}

/// Read the value under the model name and record it in model state
///
/// Returns `None` when nothing was posted for the model.
fn attempted_value(ctx: &mut ModelBindingContext<'_>) -> Option<String> {
    let result = ctx.value_provider.get_value(&ctx.model_name);
    if result.is_none() {
        return None;
    }

    ctx.model_state.set_model_value(&ctx.model_name, &result);
    result.first_value().map(str::to_string)
}

/// Store a conversion outcome in the context
fn finish(ctx: &mut ModelBindingContext<'_>, value: &str, converted: Result<BoundValue, ParseError>) {
    match converted {
        Ok(bound) => ctx.result = Some(ModelBindingResult::Success(Some(bound))),
        Err(ParseError::Empty) if ctx.metadata.is_nullable => {
            ctx.result = Some(ModelBindingResult::Success(None));
        }
        Err(ParseError::Empty) => {
            ctx.model_state.add_model_error(
                &ctx.model_name,
                ParseError::Invalid(value.to_string()).to_string(),
            );
            ctx.result = Some(ModelBindingResult::Failed);
        }
        Err(e) => {
            tracing::debug!(model = %ctx.model_name, error = %e, "Model value rejected");
            ctx.model_state.add_model_error(&ctx.model_name, e.to_string());
            ctx.result = Some(ModelBindingResult::Failed);
        }
    }
}

macro_rules! floating_point_binder {
    ($(#[$doc:meta])* $name:ident, $parse:ident, $variant:ident) => {
        $(#[$doc])*
        #[derive(Debug, Clone, Copy)]
        pub struct $name {
            styles: NumberStyles,
        }

        impl $name {
            /// Binder accepting the given styles
            pub fn new(styles: NumberStyles) -> Self {
                Self { styles }
            }
        }

        impl ModelBinder for $name {
            fn bind_model(&self, ctx: &mut ModelBindingContext<'_>) {
                let Some(value) = attempted_value(ctx) else {
                    return;
                };
                let converted = $parse(&value, self.styles).map(BoundValue::$variant);
                finish(ctx, &value, converted);
            }
        }
    };
}

floating_point_binder!(
    /// Binds `f32` values
    FloatModelBinder,
    parse_f32,
    Single
);
floating_point_binder!(
    /// Binds `f64` values
    DoubleModelBinder,
    parse_f64,
    Double
);
floating_point_binder!(
    /// Binds [`rust_decimal::Decimal`] values
    DecimalModelBinder,
    parse_decimal,
    Decimal
);

/// Binds any [`ModelType`] through its plain string conversion
#[derive(Debug, Clone, Copy)]
pub struct SimpleTypeModelBinder {
    model_type: ModelType,
}

impl SimpleTypeModelBinder {
    /// Binder for the given type
    pub fn new(model_type: ModelType) -> Self {
        Self { model_type }
    }

    fn convert(&self, value: &str) -> Result<BoundValue, ParseError> {
        let invalid = || ParseError::Invalid(value.to_string());
        let trimmed = value.trim();

        if trimmed.is_empty() && self.model_type != ModelType::String {
            return Err(ParseError::Empty);
        }

        match self.model_type {
            ModelType::String => Ok(BoundValue::String(value.to_string())),
            ModelType::Boolean => match trimmed.to_ascii_lowercase().as_str() {
                "true" => Ok(BoundValue::Boolean(true)),
                "false" => Ok(BoundValue::Boolean(false)),
                _ => Err(invalid()),
            },
            ModelType::Int32 => trimmed.parse().map(BoundValue::Int32).map_err(|_| invalid()),
            ModelType::Int64 => trimmed.parse().map(BoundValue::Int64).map_err(|_| invalid()),
            ModelType::Single => trimmed.parse().map(BoundValue::Single).map_err(|_| invalid()),
            ModelType::Double => trimmed.parse().map(BoundValue::Double).map_err(|_| invalid()),
            ModelType::Decimal => trimmed.parse().map(BoundValue::Decimal).map_err(|_| invalid()),
        }
    }
}

impl ModelBinder for SimpleTypeModelBinder {
    fn bind_model(&self, ctx: &mut ModelBindingContext<'_>) {
        let Some(value) = attempted_value(ctx) else {
            return;
        };
        let converted = self.convert(&value);
        finish(ctx, &value, converted);
    }
}

/// Floating-point binder tolerant of `/` as the decimal separator
pub struct InvariantFloatingPointModelBinder {
    styles: NumberStyles,
    fallback: Box<dyn ModelBinder>,
}

impl std::fmt::Debug for InvariantFloatingPointModelBinder {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("InvariantFloatingPointModelBinder")
            .field("styles", &self.styles)
            .finish_non_exhaustive()
    }
}

impl InvariantFloatingPointModelBinder {
    /// Binder for `model_type`, falling back to that type's plain binder
    pub fn new(styles: NumberStyles, model_type: ModelType) -> Self {
        let fallback: Box<dyn ModelBinder> = match model_type {
            ModelType::Single => Box::new(FloatModelBinder::new(styles)),
            ModelType::Double => Box::new(DoubleModelBinder::new(styles)),
            ModelType::Decimal => Box::new(DecimalModelBinder::new(styles)),
            other => Box::new(SimpleTypeModelBinder::new(other)),
        };
        Self::with_fallback(styles, fallback)
    }

    /// Binder delegating unparsable values to `fallback`
    pub fn with_fallback(styles: NumberStyles, fallback: Box<dyn ModelBinder>) -> Self {
        Self { styles, fallback }
    }

    fn parse(&self, model_type: ModelType, value: &str) -> Option<BoundValue> {
        match model_type {
            ModelType::Single => parse_f32(value, self.styles).ok().map(BoundValue::Single),
            ModelType::Double => parse_f64(value, self.styles).ok().map(BoundValue::Double),
            ModelType::Decimal => parse_decimal(value, self.styles)
                .ok()
                .map(BoundValue::Decimal),
            ModelType::Int32 | ModelType::Int64 | ModelType::Boolean | ModelType::String => None,
        }
    }
}

impl ModelBinder for InvariantFloatingPointModelBinder {
    fn bind_model(&self, ctx: &mut ModelBindingContext<'_>) {
        let Some(value) = attempted_value(ctx) else {
            return;
        };

        let normalized = value.replace('/', ".");

        match self.parse(ctx.metadata.model_type, &normalized) {
            Some(bound) => ctx.result = Some(ModelBindingResult::Success(Some(bound))),
            None => {
                tracing::trace!(model = %ctx.model_name, "Delegating to fallback binder");
                self.fallback.bind_model(ctx);
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::context::{ModelMetadata, PairsValueProvider, ValueProvider};
    use rust_decimal::Decimal;
    use std::sync::{Arc, Mutex};

    const STYLES: NumberStyles = NumberStyles::FLOAT;

    fn styles() -> NumberStyles {
        STYLES | NumberStyles::ALLOW_THOUSANDS
    }

    fn bind(
        binder: &dyn ModelBinder,
        metadata: ModelMetadata,
        value: &str,
    ) -> (Option<ModelBindingResult>, usize) {
        let provider = PairsValueProvider::new([("Price", value)]);
        let mut ctx = ModelBindingContext::new("Price", metadata, &provider);
        binder.bind_model(&mut ctx);
        (ctx.result, ctx.model_state.error_count())
    }

    /// Records what it saw instead of binding
    struct RecordingBinder {
        seen: Arc<Mutex<Vec<(Option<String>, Option<ModelBindingResult>)>>>,
    }

    impl ModelBinder for RecordingBinder {
        fn bind_model(&self, ctx: &mut ModelBindingContext<'_>) {
            let value = ctx
                .value_provider
                .get_value(&ctx.model_name)
                .first_value()
                .map(str::to_string);
            self.seen.lock().unwrap().push((value, ctx.result.clone()));
        }
    }

    #[test]
    fn test_slash_separator_for_every_floating_type() {
        for (model_type, expected) in [
            (ModelType::Double, BoundValue::Double(1.23)),
            (ModelType::Single, BoundValue::Single(1.23)),
            (ModelType::Decimal, BoundValue::Decimal(Decimal::new(123, 2))),
        ] {
            let binder = InvariantFloatingPointModelBinder::new(styles(), model_type);
            let (result, errors) = bind(&binder, ModelMetadata::new(model_type), "1/23");
            assert_eq!(result, Some(ModelBindingResult::Success(Some(expected))));
            assert_eq!(errors, 0);
        }
    }

    #[test]
    fn test_invalid_value_reaches_fallback_untouched() {
        let seen = Arc::new(Mutex::new(Vec::new()));
        let binder = InvariantFloatingPointModelBinder::with_fallback(
            styles(),
            Box::new(RecordingBinder { seen: seen.clone() }),
        );

        let (result, _) = bind(&binder, ModelMetadata::new(ModelType::Double), "abc");

        assert_eq!(result, None);
        assert_eq!(*seen.lock().unwrap(), vec![(Some("abc".to_string()), None)]);
    }

    #[test]
    fn test_default_fallback_records_error() {
        let binder = InvariantFloatingPointModelBinder::new(styles(), ModelType::Double);
        let (result, errors) = bind(&binder, ModelMetadata::new(ModelType::Double), "abc");
        assert_eq!(result, Some(ModelBindingResult::Failed));
        assert_eq!(errors, 1);
    }

    #[test]
    fn test_missing_value_leaves_context_untouched() {
        let binder = InvariantFloatingPointModelBinder::new(styles(), ModelType::Decimal);
        let provider = PairsValueProvider::default();
        let mut ctx =
            ModelBindingContext::new("Price", ModelMetadata::new(ModelType::Decimal), &provider);

        binder.bind_model(&mut ctx);

        assert_eq!(ctx.result, None);
        assert!(ctx.model_state.get("Price").is_none());
    }

    #[test]
    fn test_attempted_value_is_recorded() {
        let binder = InvariantFloatingPointModelBinder::new(styles(), ModelType::Double);
        let provider = PairsValueProvider::new([("Price", "1/5")]);
        let mut ctx =
            ModelBindingContext::new("Price", ModelMetadata::new(ModelType::Double), &provider);

        binder.bind_model(&mut ctx);

        assert_eq!(
            ctx.model_state.get("Price").unwrap().attempted_value.as_deref(),
            Some("1/5")
        );
    }

    #[test]
    fn test_empty_value_for_nullable_model() {
        let binder = InvariantFloatingPointModelBinder::new(styles(), ModelType::Double);
        let (result, errors) = bind(&binder, ModelMetadata::nullable(ModelType::Double), "");
        assert_eq!(result, Some(ModelBindingResult::Success(None)));
        assert_eq!(errors, 0);

        let (result, errors) = bind(&binder, ModelMetadata::new(ModelType::Double), "");
        assert_eq!(result, Some(ModelBindingResult::Failed));
        assert_eq!(errors, 1);
    }

    #[test]
    fn test_group_separators_are_accepted() {
        let binder = InvariantFloatingPointModelBinder::new(styles(), ModelType::Decimal);
        let (result, _) = bind(&binder, ModelMetadata::new(ModelType::Decimal), "1,234/5");
        assert_eq!(
            result,
            Some(ModelBindingResult::Success(Some(BoundValue::Decimal(
                Decimal::new(12345, 1)
            ))))
        );
    }

    #[test]
    fn test_other_types_use_simple_binder() {
        let binder = InvariantFloatingPointModelBinder::new(styles(), ModelType::Int32);
        let (result, _) = bind(&binder, ModelMetadata::new(ModelType::Int32), "42");
        assert_eq!(
            result,
            Some(ModelBindingResult::Success(Some(BoundValue::Int32(42))))
        );

        let (result, errors) = bind(&binder, ModelMetadata::new(ModelType::Int32), "4/2");
        assert_eq!(result, Some(ModelBindingResult::Failed));
        assert_eq!(errors, 1);
    }

    #[test]
    fn test_simple_binder_conversions() {
        let provider = PairsValueProvider::new([("Flag", "True")]);
        let value_provider: &dyn ValueProvider = &provider;
        let mut ctx = ModelBindingContext::new(
            "Flag",
            ModelMetadata::new(ModelType::Boolean),
            value_provider,
        );
        SimpleTypeModelBinder::new(ModelType::Boolean).bind_model(&mut ctx);
        assert_eq!(
            ctx.result,
            Some(ModelBindingResult::Success(Some(BoundValue::Boolean(true))))
        );
    }
}
