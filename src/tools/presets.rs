use crate::theme::PRESETS;
use crate::tool::{Output, Tool};
use clap::{Command, CommandFactory, Parser};

#[derive(Parser, Debug)]
#[command(name = "presets", about = "List the built-in style presets")]
pub struct PresetsTool {}

impl Tool for PresetsTool {
    fn cli() -> Command {
        PresetsTool::command()
    }

    fn execute(&self) -> anyhow::Result<Option<Output>> {
        Ok(Some(Output::JsonValue(serde_json::to_value(PRESETS)?)))
    }
}
