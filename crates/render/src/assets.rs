//! Embedded assets for rendering.
//!
//! This module provides access to the page template, stylesheet and client
//! script that are embedded into the binary at compile time using
//! [`rust-embed`](rust_embed).

use crate::error::{ErrorKind, Result};
use exn::{OptionExt, ResultExt};
use rust_embed::Embed;
use std::borrow::Cow;

#[derive(Embed)]
#[folder = "../../assets/"]
pub struct Builtins;
impl Builtins {
    /// Get the raw content of an embedded asset by path.
    pub fn load(name: impl AsRef<str>) -> Result<Cow<'static, [u8]>> {
        Self::get(name.as_ref())
            .map(|f| f.data)
            .ok_or_raise(|| ErrorKind::AssetNotFound(name.as_ref().to_string()))
    }

    /// Get an embedded asset as UTF-8 text.
    pub fn load_text(name: impl AsRef<str>) -> Result<String> {
        let data = Self::load(name.as_ref())?;
        String::from_utf8(data.into_owned()).or_raise(|| ErrorKind::AssetNotFound(name.as_ref().to_string()))
    }

    pub fn exists(name: impl AsRef<str>) -> bool {
        Self::get(name.as_ref()).is_some()
    }
}
