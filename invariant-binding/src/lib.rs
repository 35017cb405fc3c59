//! # invariant-binding
//!
//! Model binding for `f32`, `f64` and decimal values posted from forms and
//! query strings, parsed under culture-invariant rules. A `/` in the posted
//! value is read as the decimal separator before parsing; values that still
//! do not parse go to the plain binder for the type, which records the
//! model error.
//!
//! ```
//! use invariant_binding::prelude::*;
//!
//! let providers: Vec<Box<dyn ModelBinderProvider>> =
//!     vec![Box::new(InvariantFloatingPointModelBinderProvider)];
//! let metadata = ModelMetadata::new(ModelType::Double);
//!
//! let values = PairsValueProvider::new([("Price", "1/23")]);
//! let mut ctx = ModelBindingContext::new("Price", metadata, &values);
//! if let Some(binder) = select_binder(&providers, &metadata) {
//!     binder.bind_model(&mut ctx);
//! }
//!
//! assert_eq!(
//!     ctx.result,
//!     Some(ModelBindingResult::Success(Some(BoundValue::Double(1.23))))
//! );
//! ```

pub mod binder;
pub mod context;
pub mod parse;
pub mod provider;
pub mod styles;

pub use binder::{
    DecimalModelBinder, DoubleModelBinder, FloatModelBinder, InvariantFloatingPointModelBinder,
    ModelBinder, SimpleTypeModelBinder,
};
pub use context::{
    BoundValue, ModelBindingContext, ModelBindingResult, ModelMetadata, ModelStateDictionary,
    ModelStateEntry, ModelType, PairsValueProvider, ValueProvider, ValueProviderResult,
};
pub use parse::{parse_decimal, parse_f32, parse_f64, ParseError};
pub use provider::{select_binder, InvariantFloatingPointModelBinderProvider, ModelBinderProvider};
pub use styles::NumberStyles;

/// Prelude module for convenient imports
pub mod prelude {
    pub use crate::binder::{InvariantFloatingPointModelBinder, ModelBinder};
    pub use crate::context::{
        BoundValue, ModelBindingContext, ModelBindingResult, ModelMetadata, ModelType,
        PairsValueProvider, ValueProvider,
    };
    pub use crate::provider::{
        select_binder, InvariantFloatingPointModelBinderProvider, ModelBinderProvider,
    };
    pub use crate::styles::NumberStyles;
}
