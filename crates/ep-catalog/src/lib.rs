//! ep-catalog: device and symbol-type catalogs.
//!
//! Provides:
//! - Cabinet devices with their rail width and ratings
//! - The [`DeviceLookup`] seam used by the derivation engine, including
//!   closest-fit-above device selection
//! - Symbol-type definitions with their protection profiles
//! - A built-in catalog for demos and tests
//!
//! # Example
//!
//! ```
//! use ep_catalog::{builtin_devices, DeviceLookup};
//! use ep_core::{ProtectionRequirement, TripCharacteristic};
//!
//! let devices = builtin_devices();
//! let req = ProtectionRequirement::mcb(13, TripCharacteristic::B).with_poles(1);
//! let dev = devices.select_device(&req).unwrap();
//! assert_eq!(dev.rated_current_a, Some(16));
//! ```

pub mod builtin;
pub mod device;
pub mod lookup;
pub mod symbols;

pub use builtin::{builtin_devices, builtin_symbols};
pub use device::{CabinetDevice, DeviceCategory};
pub use lookup::{DeviceCatalog, DeviceLookup};
pub use symbols::{
    ArticleKind, ArticleLine, Attributes, KnxProperties, KnxVariant, SymbolCatalog,
    SymbolCategory, SymbolDefinition,
};

pub type CatalogResult<T> = Result<T, CatalogError>;

#[derive(thiserror::Error, Debug)]
pub enum CatalogError {
    #[error("Duplicate {what} in catalog: {id}")]
    Duplicate { what: &'static str, id: String },

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("YAML error: {0}")]
    Yaml(#[from] serde_yaml::Error),
}
