// Represents a tool under qrbloom.
pub trait Tool {
    // The contribution of this tool to the qrbloom CLI. The clap::Command
    // returned here will be set up as a subcommand on the qrbloom binary.
    fn cli() -> clap::Command;

    // Run the tool. All the context that the tool requires should be
    // using the cli above.
    fn execute(&self) -> anyhow::Result<Option<Output>>;
}

#[derive(Debug)]
pub enum Output {
    Text(String),
    JsonValue(serde_json::Value),
}
