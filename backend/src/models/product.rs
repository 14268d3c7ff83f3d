//! Data product descriptors.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::error::{FetchError, FetchResult};

/// Descriptors shown in the standard availability report.
pub const DEFAULT_PRODUCTS: &[&str] = &[
    "solohi-1ft",
    "spice-n-exp",
    "spice-n-ras",
    "phi-hrt-blos",
    "phi-fdt-blos",
    "eui-hrieuv174-image",
    "eui-hrilya1216-image",
    "eui-fsi174-image",
    "eui-fsi304-image",
    "epd-step-rates",
    "epd-ept-sun-rates",
    "rpw-bia-density",
    "mag-rtn-normal",
    "swa-eas-pad-psd",
    "swa-pas-grnd-mom",
    "swa-pas-mom",
];

/// Which archive table a product is looked up in.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DataStream {
    /// Science data (`v_sc_data_item`)
    #[default]
    Science,
    /// Low latency data (`v_ll_data_item`)
    LowLatency,
}

impl DataStream {
    /// Catalog table holding the data items of this stream.
    pub fn table(&self) -> &'static str {
        match self {
            Self::Science => "v_sc_data_item",
            Self::LowLatency => "v_ll_data_item",
        }
    }

    /// Short name used in cache paths and log lines.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Science => "science",
            Self::LowLatency => "low_latency",
        }
    }
}

impl FromStr for DataStream {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "science" | "sc" => Ok(Self::Science),
            "low_latency" | "low-latency" | "ll" => Ok(Self::LowLatency),
            _ => Err(format!("Unknown data stream: {}", s)),
        }
    }
}

/// A named data product in the remote archive.
///
/// The descriptor is opaque: case and catalog membership are not checked.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct DataProduct {
    descriptor: String,
    #[serde(default)]
    stream: DataStream,
}

impl DataProduct {
    /// Science-data product for `descriptor`.
    pub fn new(descriptor: impl Into<String>) -> Self {
        Self {
            descriptor: descriptor.into(),
            stream: DataStream::Science,
        }
    }

    /// Low-latency product for `descriptor`.
    pub fn low_latency(descriptor: impl Into<String>) -> Self {
        Self {
            descriptor: descriptor.into(),
            stream: DataStream::LowLatency,
        }
    }

    pub fn with_stream(mut self, stream: DataStream) -> Self {
        self.stream = stream;
        self
    }

    pub fn descriptor(&self) -> &str {
        &self.descriptor
    }

    pub fn stream(&self) -> DataStream {
        self.stream
    }

    /// Check that the descriptor can be embedded in a query at all.
    ///
    /// Quotes are fine (they get escaped); empty strings and control
    /// characters are not.
    pub fn validate(&self) -> FetchResult<()> {
        let rejected = |message: String| {
            FetchError::validation(message)
                .with_operation("validate_descriptor")
                .with_product(self)
        };
        if self.descriptor.trim().is_empty() {
            return Err(rejected("descriptor is empty".to_string()));
        }
        if let Some(c) = self.descriptor.chars().find(|c| c.is_control()) {
            return Err(rejected(format!(
                "descriptor contains control character {:?}",
                c
            )));
        }
        Ok(())
    }

    /// Descriptor as an ADQL string literal body (single quotes doubled).
    pub fn escaped_descriptor(&self) -> FetchResult<String> {
        self.validate()?;
        Ok(self.descriptor.replace('\'', "''"))
    }
}

impl fmt::Display for DataProduct {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}[{}]", self.descriptor, self.stream.as_str())
    }
}

impl From<&str> for DataProduct {
    fn from(descriptor: &str) -> Self {
        DataProduct::new(descriptor)
    }
}

impl From<String> for DataProduct {
    fn from(descriptor: String) -> Self {
        DataProduct::new(descriptor)
    }
}

/// Science products for every entry of [`DEFAULT_PRODUCTS`].
pub fn default_products() -> Vec<DataProduct> {
    DEFAULT_PRODUCTS.iter().copied().map(DataProduct::from).collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::FetchErrorKind;

    #[test]
    fn test_streams_select_tables() {
        assert_eq!(DataProduct::new("MAG-RTN-NORMAL").stream().table(), "v_sc_data_item");
        assert_eq!(
            DataProduct::low_latency("MAG-RTN-NORMAL").stream().table(),
            "v_ll_data_item"
        );
    }

    #[test]
    fn test_data_stream_from_str() {
        assert_eq!("science".parse::<DataStream>().unwrap(), DataStream::Science);
        assert_eq!("LL".parse::<DataStream>().unwrap(), DataStream::LowLatency);
        assert!("raw".parse::<DataStream>().is_err());
    }

    #[test]
    fn test_escape_doubles_quotes() {
        let p = DataProduct::new("A'B");
        assert_eq!(p.escaped_descriptor().unwrap(), "A''B");
    }

    #[test]
    fn test_empty_descriptor_rejected() {
        let err = DataProduct::new("  ").validate().unwrap_err();
        assert_eq!(err.kind(), FetchErrorKind::Validation);
        assert_eq!(err.context().operation.as_deref(), Some("validate_descriptor"));
        assert_eq!(err.context().product.as_deref(), Some("  [science]"));
        assert!(!err.is_retryable());
    }

    #[test]
    fn test_control_characters_rejected() {
        let err = DataProduct::new("MAG\nRTN").escaped_descriptor().unwrap_err();
        assert_eq!(err.kind(), FetchErrorKind::Validation);
        assert!(err.to_string().contains("control character"));
    }

    #[test]
    fn test_display_names_stream() {
        assert_eq!(
            DataProduct::low_latency("eui-fsi174-image").to_string(),
            "eui-fsi174-image[low_latency]"
        );
    }

    #[test]
    fn test_default_products_are_science() {
        let products = default_products();
        assert_eq!(products.len(), DEFAULT_PRODUCTS.len());
        assert!(products.iter().all(|p| p.stream() == DataStream::Science));
    }
}
