//! forma command-line interface.

pub mod discovery;
pub mod pipeline;

use forma_error::Result;

pub use pipeline::process_files;

/// Options for running forma.
pub struct FormaOptions {
    pub files: Vec<String>,
    pub dirs: Vec<String>,
    pub output: Option<String>,
    pub pretty: bool,
    pub comments_only: bool,
    pub parallel: bool,
}

/// Main entry point: discover inputs, then normalize each one.
pub fn run_main(opts: &FormaOptions) -> Result<Option<String>> {
    let files = discovery::discover_files(opts)?;

    if files.is_empty() {
        return Ok(None);
    }

    process_files(opts, &files)
}
