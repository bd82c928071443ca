//! Catalog data models

use std::io::Cursor;

use image::{GenericImageView, ImageFormat, ImageReader, Limits};
use serde::{Deserialize, Serialize};

use crate::config;
use crate::error::{FetchError, Result};

/// One Pokemon record as sent by the catalog endpoint
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CatalogItem {
    /// Unique within a batch, also the sort key
    pub id: i64,
    pub name: String,
    #[serde(rename = "type")]
    pub category: String,
    pub description: String,
    /// Thumbnail URL
    #[serde(rename = "imageUrl", alias = "image")]
    pub image_ref: String,
    /// Set only after the thumbnail fetch for this item succeeded
    #[serde(skip)]
    pub image: Option<ItemImage>,
    #[serde(rename = "attack")]
    pub attack_stat: i64,
    #[serde(rename = "defense")]
    pub defense_stat: i64,
    #[serde(rename = "height")]
    pub height_stat: i64,
    #[serde(rename = "weight")]
    pub weight_stat: i64,
}

impl CatalogItem {
    pub fn has_image(&self) -> bool {
        self.image.is_some()
    }
}

/// A fetched thumbnail
///
/// `bytes` is the payload exactly as received. Format and dimensions come
/// from decoding it once to make sure it is a usable image.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ItemImage {
    pub format: ImageFormat,
    pub width: u32,
    pub height: u32,
    pub bytes: Vec<u8>,
}

impl ItemImage {
    /// Validate a thumbnail payload
    ///
    /// This is CPU-bound; async callers should run it on the blocking pool.
    pub fn decode(bytes: Vec<u8>) -> Result<Self> {
        Self::decode_within(bytes, config::catalog::MAX_IMAGE_DIMENSION)
    }

    /// Validate a thumbnail payload no wider or taller than `max_dimension`
    pub(crate) fn decode_within(bytes: Vec<u8>, max_dimension: u32) -> Result<Self> {
        let format = image::guess_format(&bytes)
            .map_err(|e| FetchError::InvalidImage(format!("unknown format: {}", e)))?;

        let mut limits = Limits::default();
        limits.max_image_width = Some(max_dimension);
        limits.max_image_height = Some(max_dimension);
        limits.max_alloc = Some(config::catalog::MAX_IMAGE_ALLOC);

        let mut reader = ImageReader::with_format(Cursor::new(&bytes), format);
        reader.limits(limits);
        let decoded = reader
            .decode()
            .map_err(|e| FetchError::InvalidImage(e.to_string()))?;
        let (width, height) = decoded.dimensions();

        Ok(Self {
            format,
            width,
            height,
            bytes,
        })
    }

    /// Short description like `png 120x120`
    pub fn summary(&self) -> String {
        let format = self
            .format
            .extensions_str()
            .first()
            .copied()
            .unwrap_or("image");
        format!("{} {}x{}", format, self.width, self.height)
    }
}
