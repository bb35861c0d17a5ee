use std::collections::BTreeMap;

use serde::Deserialize;

use crate::encode::{Encode, EncodeError, ObjectWriter, EMPTY_OBJECT};
use crate::level::Level;
use crate::record::RenderedValue;

/// A single title/value pair inside an [`Attachment`].
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct Field {
    pub short: bool,
    pub title: String,
    pub value: String,
}

impl Field {
    pub fn new(title: impl Into<String>, value: impl Into<String>, short: bool) -> Self {
        Field {
            short,
            title: title.into(),
            value: value.into(),
        }
    }

    /// A field missing its title or its value is never sent.
    pub fn is_empty(&self) -> bool {
        self.title.is_empty() || self.value.is_empty()
    }
}

impl Encode for Field {
    fn encode(&self, buf: &mut Vec<u8>) -> Result<(), EncodeError> {
        if self.is_empty() {
            buf.extend_from_slice(EMPTY_OBJECT);
            return Ok(());
        }

        let mut obj = ObjectWriter::new(buf);
        obj.bool("short", self.short);
        obj.string("title", &self.title);
        obj.string("value", &self.value);
        obj.finish();
        Ok(())
    }
}

/// Ordered list of attachment fields.
///
/// Empty fields are dropped from the encoded array; the survivors keep their
/// relative order.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(transparent)]
pub struct Fields(pub Vec<Field>);

impl Fields {
    pub fn iter(&self) -> std::slice::Iter<'_, Field> {
        self.0.iter()
    }

    pub fn push(&mut self, field: Field) {
        self.0.push(field);
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// True when at least one field would appear in the encoded array.
    pub fn has_visible(&self) -> bool {
        self.iter().any(|f| !f.is_empty())
    }
}

impl From<Vec<Field>> for Fields {
    fn from(fields: Vec<Field>) -> Self {
        Fields(fields)
    }
}

impl Encode for Fields {
    fn encode(&self, buf: &mut Vec<u8>) -> Result<(), EncodeError> {
        buf.push(b'[');
        let mut first = true;
        for field in self.iter().filter(|f| !f.is_empty()) {
            if !first {
                buf.push(b',');
            }
            first = false;
            field.encode(buf)?;
        }
        buf.push(b']');
        Ok(())
    }
}

/// Mattermost message attachment.
///
/// Used two ways: as the template configured on the hook, and as the
/// per-event attachment derived from it by [`Attachment::for_event`].
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct Attachment {
    pub author_icon: String,
    pub author_link: String,
    pub author_name: String,
    pub color: String,
    pub fallback: String,
    pub fields: Fields,
    pub image_url: String,
    pub pretext: String,
    pub text: String,
    pub title: String,
    pub title_link: String,
}

impl Attachment {
    /// Build the attachment for one event from a template.
    ///
    /// Color, text and fields come from the event; everything else is
    /// copied from `template`.
    pub fn for_event(
        template: &Attachment,
        level: Level,
        message: &str,
        data: &BTreeMap<String, serde_json::Value>,
    ) -> Self {
        let fields = data
            .iter()
            .map(|(k, v)| Field::new(k.clone(), RenderedValue(v).to_string(), true))
            .collect::<Vec<_>>();

        Attachment {
            author_icon: template.author_icon.clone(),
            author_link: template.author_link.clone(),
            author_name: template.author_name.clone(),
            color: level.color().to_string(),
            fallback: template.fallback.clone(),
            fields: Fields(fields),
            image_url: template.image_url.clone(),
            pretext: template.pretext.clone(),
            text: format!("{} {}", level.icon(), message),
            title: template.title.clone(),
            title_link: template.title_link.clone(),
        }
    }
}

impl Encode for Attachment {
    fn encode(&self, buf: &mut Vec<u8>) -> Result<(), EncodeError> {
        let mut obj = ObjectWriter::new(buf);
        obj.string("author_icon", &self.author_icon);
        obj.string("author_link", &self.author_link);
        obj.string("author_name", &self.author_name);
        obj.string("color", &self.color);
        obj.string("fallback", &self.fallback);
        if self.fields.has_visible() {
            obj.raw("fields", |buf| self.fields.encode(buf))?;
        }
        obj.string("image_url", &self.image_url);
        obj.string("pretext", &self.pretext);
        obj.string("text", &self.text);
        obj.string("title", &self.title);
        obj.string("title_link", &self.title_link);
        obj.finish();
        Ok(())
    }
}
