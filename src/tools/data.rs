use std::path::PathBuf;

use anyhow::Context;
use clap::{Command, CommandFactory, Parser};
use serde_json::json;

use crate::args::StringInput;
use crate::content::{ContentType, FieldId};
use crate::export::ExportFormat;
use crate::pages::DataPage;
use crate::pages::data::DEFAULT_SIZE;
use crate::render::BasicRenderer;
use crate::tool::{Output, Tool};
use crate::tools::{rng, save_downloads};

#[derive(Parser, Debug)]
#[command(
    name = "data",
    about = "Generate a QR code for text, links, files, WiFi or contact details",
    long_about = "Generate a QR code for text, links, files, WiFi or contact details.\n\
                  Only the fields of the selected type are accepted, the colors are\n\
                  picked at random from a fixed palette."
)]
pub struct DataTool {
    /// Kind of content to encode
    #[arg(short = 't', long = "type", value_enum, default_value = "text")]
    kind: ContentType,

    /// Text to encode, "-" reads from stdin
    #[arg(long)]
    text: Option<StringInput>,

    /// Link for url and social content
    #[arg(long)]
    url: Option<String>,

    /// File for image, video and file content, embedded as a data URI
    #[arg(long)]
    file: Option<PathBuf>,

    /// WiFi network name
    #[arg(long)]
    ssid: Option<String>,

    /// WiFi password
    #[arg(long)]
    password: Option<String>,

    /// Contact name
    #[arg(long)]
    name: Option<String>,

    /// Contact phone number
    #[arg(long)]
    phone: Option<String>,

    /// Contact email address
    #[arg(long)]
    email: Option<String>,

    /// Symbol size in pixels
    #[arg(short, long, default_value_t = DEFAULT_SIZE)]
    size: u32,

    /// Save the symbol in these formats
    #[arg(short, long, value_enum)]
    download: Vec<ExportFormat>,

    /// Directory downloads are written to
    #[arg(short, long, default_value = ".")]
    out_dir: PathBuf,

    /// Seed for a reproducible color theme
    #[arg(long)]
    seed: Option<u64>,
}

impl Tool for DataTool {
    fn cli() -> Command {
        DataTool::command()
    }

    fn execute(&self) -> anyhow::Result<Option<Output>> {
        tokio::runtime::Builder::new_current_thread()
            .enable_all()
            .build()
            .context("Could not create tokio runtime")?
            .block_on(self.run())
    }
}

impl DataTool {
    fn fields(&self) -> Vec<(FieldId, String)> {
        let file = self.file.as_ref().map(|p| p.to_string_lossy().into_owned());
        [
            (FieldId::Text, self.text.as_ref().map(|t| t.0.clone())),
            (FieldId::Url, self.url.clone()),
            (FieldId::File, file),
            (FieldId::Ssid, self.ssid.clone()),
            (FieldId::Password, self.password.clone()),
            (FieldId::Name, self.name.clone()),
            (FieldId::Phone, self.phone.clone()),
            (FieldId::Email, self.email.clone()),
        ]
        .into_iter()
        .filter_map(|(field, value)| value.map(|v| (field, v)))
        .collect()
    }

    fn fill(&self, page: &mut DataPage<BasicRenderer>) -> anyhow::Result<()> {
        page.select_type(self.kind);
        for (field, value) in self.fields() {
            page.form_mut().set(field, value)?;
        }
        Ok(())
    }

    async fn run(&self) -> anyhow::Result<Option<Output>> {
        let mut page = DataPage::new(BasicRenderer, rng(self.seed)).with_size(self.size);
        self.fill(&mut page)?;

        let generation = page.submit().await?;
        let files = save_downloads(&self.download, &self.out_dir, |f| page.download(f))?;

        Ok(Some(Output::JsonValue(json!({
            "type": generation.content_type,
            "fields": page.form().visible_fields(),
            "accept": page.form().accept(),
            "payload": generation.payload,
            "theme": generation.theme,
            "files": files,
        }))))
    }
}
