//! Binder providers

use crate::binder::{InvariantFloatingPointModelBinder, ModelBinder};
use crate::context::{ModelMetadata, ModelType};
use crate::styles::NumberStyles;

/// Chooses a binder for a model, or declines
pub trait ModelBinderProvider: Send + Sync {
    /// Binder for `metadata`, `None` to let the next provider decide
    fn get_binder(&self, metadata: &ModelMetadata) -> Option<Box<dyn ModelBinder>>;
}

/// Supplies [`InvariantFloatingPointModelBinder`] for `f32`, `f64` and decimal
/// models, optional or not
#[derive(Debug, Clone, Copy, Default)]
pub struct InvariantFloatingPointModelBinderProvider;

impl InvariantFloatingPointModelBinderProvider {
    /// Styles every supplied binder accepts
    pub const SUPPORTED_STYLES: NumberStyles =
        NumberStyles::FLOAT.union(NumberStyles::ALLOW_THOUSANDS);
}

impl ModelBinderProvider for InvariantFloatingPointModelBinderProvider {
    fn get_binder(&self, metadata: &ModelMetadata) -> Option<Box<dyn ModelBinder>> {
        match metadata.model_type {
            ModelType::Single | ModelType::Double | ModelType::Decimal => {
                Some(Box::new(InvariantFloatingPointModelBinder::new(
                    Self::SUPPORTED_STYLES,
                    metadata.model_type,
                )))
            }
            ModelType::Int32 | ModelType::Int64 | ModelType::Boolean | ModelType::String => None,
        }
    }
}

/// First binder any provider offers for `metadata`
pub fn select_binder(
    providers: &[Box<dyn ModelBinderProvider>],
    metadata: &ModelMetadata,
) -> Option<Box<dyn ModelBinder>> {
    providers.iter().find_map(|p| p.get_binder(metadata))
}
