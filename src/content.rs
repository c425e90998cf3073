use std::fmt;
use std::path::{Path, PathBuf};

use anyhow::{Context, bail};
use base64::{Engine as _, engine::general_purpose};
use clap::ValueEnum;
use serde::Serialize;

/// What the content-type page encodes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum ContentType {
    Text,
    Url,
    Image,
    Video,
    File,
    Wifi,
    Contact,
    Social,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum FieldId {
    Text,
    Url,
    File,
    Ssid,
    Password,
    Name,
    Phone,
    Email,
}

impl FieldId {
    pub fn name(&self) -> &'static str {
        match self {
            FieldId::Text => "text",
            FieldId::Url => "url",
            FieldId::File => "file",
            FieldId::Ssid => "ssid",
            FieldId::Password => "password",
            FieldId::Name => "name",
            FieldId::Phone => "phone",
            FieldId::Email => "email",
        }
    }

    fn required(&self) -> bool {
        matches!(
            self,
            FieldId::Text | FieldId::Url | FieldId::File | FieldId::Ssid | FieldId::Name
        )
    }
}

impl fmt::Display for FieldId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
enum FormFields {
    Single {
        field: FieldId,
        value: String,
    },
    Media {
        accept: &'static str,
        file: Option<PathBuf>,
    },
    Wifi {
        ssid: String,
        password: String,
    },
    Contact {
        name: String,
        phone: String,
        email: String,
    },
}

impl FormFields {
    fn empty(kind: ContentType) -> Self {
        match kind {
            ContentType::Text => FormFields::Single {
                field: FieldId::Text,
                value: String::new(),
            },
            ContentType::Url | ContentType::Social => FormFields::Single {
                field: FieldId::Url,
                value: String::new(),
            },
            ContentType::Image => FormFields::Media {
                accept: "image/*",
                file: None,
            },
            ContentType::Video => FormFields::Media {
                accept: "video/*",
                file: None,
            },
            ContentType::File => FormFields::Media {
                accept: "*/*",
                file: None,
            },
            ContentType::Wifi => FormFields::Wifi {
                ssid: String::new(),
                password: String::new(),
            },
            ContentType::Contact => FormFields::Contact {
                name: String::new(),
                phone: String::new(),
                email: String::new(),
            },
        }
    }
}

/// The form of the content-type page. Its only state is the selected
/// content type; switching types throws away every field value.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ContentForm {
    kind: ContentType,
    fields: FormFields,
}

impl Default for ContentForm {
    fn default() -> Self {
        Self::new(ContentType::Text)
    }
}

impl ContentForm {
    pub fn new(kind: ContentType) -> Self {
        Self {
            kind,
            fields: FormFields::empty(kind),
        }
    }

    pub fn kind(&self) -> ContentType {
        self.kind
    }

    pub fn select(&mut self, kind: ContentType) {
        tracing::debug!(from = ?self.kind, to = ?kind, "switching content type");
        self.kind = kind;
        self.fields = FormFields::empty(kind);
    }

    pub fn visible_fields(&self) -> Vec<FieldId> {
        match &self.fields {
            FormFields::Single { field, .. } => vec![*field],
            FormFields::Media { .. } => vec![FieldId::File],
            FormFields::Wifi { .. } => vec![FieldId::Ssid, FieldId::Password],
            FormFields::Contact { .. } => vec![FieldId::Name, FieldId::Phone, FieldId::Email],
        }
    }

    /// The accept filter of the file picker, when one is shown.
    pub fn accept(&self) -> Option<&'static str> {
        match &self.fields {
            FormFields::Media { accept, .. } => Some(accept),
            _ => None,
        }
    }

    pub fn value(&self, field: FieldId) -> Option<String> {
        match (&self.fields, field) {
            (FormFields::Single { field: f, value }, field) if *f == field => Some(value.clone()),
            (FormFields::Media { file, .. }, FieldId::File) => {
                file.as_ref().map(|p| p.display().to_string())
            }
            (FormFields::Wifi { ssid, .. }, FieldId::Ssid) => Some(ssid.clone()),
            (FormFields::Wifi { password, .. }, FieldId::Password) => Some(password.clone()),
            (FormFields::Contact { name, .. }, FieldId::Name) => Some(name.clone()),
            (FormFields::Contact { phone, .. }, FieldId::Phone) => Some(phone.clone()),
            (FormFields::Contact { email, .. }, FieldId::Email) => Some(email.clone()),
            _ => None,
        }
    }

    pub fn set(&mut self, field: FieldId, value: impl Into<String>) -> anyhow::Result<()> {
        let value = value.into();
        let slot = match (&mut self.fields, field) {
            (FormFields::Single { field: f, value: v }, field) if *f == field => v,
            (FormFields::Media { file, .. }, FieldId::File) => {
                *file = Some(PathBuf::from(value));
                return Ok(());
            }
            (FormFields::Wifi { ssid, .. }, FieldId::Ssid) => ssid,
            (FormFields::Wifi { password, .. }, FieldId::Password) => password,
            (FormFields::Contact { name, .. }, FieldId::Name) => name,
            (FormFields::Contact { phone, .. }, FieldId::Phone) => phone,
            (FormFields::Contact { email, .. }, FieldId::Email) => email,
            _ => bail!(
                "The {} field is not shown for {:?} content",
                field,
                self.kind
            ),
        };

        *slot = value;
        Ok(())
    }

    fn check_required(&self) -> anyhow::Result<()> {
        for field in self.visible_fields() {
            if !field.required() {
                continue;
            }
            if field == FieldId::File {
                if self.value(field).is_none() {
                    bail!("Please choose a file");
                }
            } else if self.value(field).is_none_or(|v| v.is_empty()) {
                bail!("Please fill out the {field} field");
            }
        }
        Ok(())
    }

    /// Builds the payload for the selected type. Media contents are read
    /// before this returns; nothing is generated when validation fails.
    pub async fn assemble(&self) -> anyhow::Result<ContentPayload> {
        self.check_required()?;

        let payload = match (&self.fields, self.kind) {
            (FormFields::Single { value, .. }, ContentType::Text) => {
                ContentPayload::Text(value.clone())
            }
            (FormFields::Single { value, .. }, ContentType::Url) => {
                ContentPayload::Url(value.clone())
            }
            (FormFields::Single { value, .. }, _) => ContentPayload::Social(value.clone()),
            (FormFields::Media { accept, file }, _) => {
                let path = file.as_deref().context("Please choose a file")?;
                ContentPayload::MediaDataUri(read_data_uri(path, accept).await?)
            }
            (FormFields::Wifi { ssid, password }, _) => ContentPayload::Wifi {
                ssid: ssid.clone(),
                password: password.clone(),
            },
            (FormFields::Contact { name, phone, email }, _) => ContentPayload::Contact {
                name: name.clone(),
                phone: phone.clone(),
                email: email.clone(),
            },
        };

        Ok(payload)
    }
}

/// A payload of one of the supported content types.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ContentPayload {
    Text(String),
    Url(String),
    MediaDataUri(String),
    Wifi {
        ssid: String,
        password: String,
    },
    Contact {
        name: String,
        phone: String,
        email: String,
    },
    Social(String),
}

impl ContentPayload {
    /// Serializes to the string stored in the symbol. Delimiters inside
    /// WiFi and contact values are written as they are.
    pub fn encode(&self) -> String {
        match self {
            ContentPayload::Text(value)
            | ContentPayload::Url(value)
            | ContentPayload::MediaDataUri(value)
            | ContentPayload::Social(value) => value.clone(),
            ContentPayload::Wifi { ssid, password } => {
                format!("WIFI:T:WPA;S:{ssid};P:{password};;")
            }
            ContentPayload::Contact { name, phone, email } => {
                format!("MECARD:N:{name};TEL:{phone};EMAIL:{email};;")
            }
        }
    }
}

pub fn data_uri(mime: &str, bytes: &[u8]) -> String {
    let encoded = general_purpose::STANDARD.encode(bytes);
    format!("data:{mime};base64,{encoded}")
}

async fn read_data_uri(path: &Path, accept: &str) -> anyhow::Result<String> {
    let mime = mime_guess::from_path(path).first_or_octet_stream();
    if let Some((kind, _)) = accept.split_once('/')
        && kind != "*"
        && mime.type_().as_str() != kind
    {
        tracing::warn!("{} is {mime}, expected {accept}", path.display());
    }

    let bytes = tokio::fs::read(path)
        .await
        .with_context(|| format!("Could not read {}", path.display()))?;
    tracing::debug!(bytes = bytes.len(), %mime, "read media file");

    Ok(data_uri(mime.essence_str(), &bytes))
}
