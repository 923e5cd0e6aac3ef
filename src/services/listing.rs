//! HTML rendering of a device listing.
//!
//! Templates use tinytemplate syntax and receive a `{ devices: [...] }`
//! context, for example:
//!
//! ```text
//! <ul>
//! {{ for device in devices }}<li>{device.name} at {device.address}</li>
//! {{ endfor }}</ul>
//! ```
//!
//! Values are HTML-escaped unless piped through `unescaped`.

use serde::Serialize;
use tinytemplate::TinyTemplate;

use crate::data::cache::{TemplateError, TemplateResult};
use crate::data::registry::DeviceRecord;

const LISTING: &str = "listing";

/// Context handed to listing templates.
#[derive(Debug, Serialize)]
pub struct ListingContext<'a> {
    pub devices: &'a [DeviceRecord],
}

/// Render `source` against `devices`.
pub fn render_listing(source: &str, devices: &[DeviceRecord]) -> TemplateResult<String> {
    let mut tt = TinyTemplate::new();
    tt.add_template(LISTING, source)
        .map_err(|e| TemplateError::Render(e.to_string()))?;
    tt.render(LISTING, &ListingContext { devices })
        .map_err(|e| TemplateError::Render(e.to_string()))
}
