//! Core processing pipeline: read fragments, parse, normalize, serialize.

use std::fs;
use std::time::Instant;

use rayon::prelude::*;
use serde_json::Value;
use tracing::info;

use forma_core::{value_to_json, Error, Normalizer, ParsedSource, Result};

use crate::FormaOptions;

/// Normalize a set of blueprint fragment files into one output string.
///
/// Each file is parsed and normalized independently; per-file documents are
/// concatenated in path order, each under a `// <path>` header when more than
/// one file is present. File order is fixed upstream, so output is stable
/// whether or not the parallel path runs.
pub fn process_files(opts: &FormaOptions, files: &[String]) -> Result<Option<String>> {
    let start = Instant::now();
    info!("Normalizing {} blueprint fragments", files.len());

    let docs: Vec<String> = if opts.parallel {
        files
            .par_iter()
            .map(|path| process_one(opts, path))
            .collect::<Result<_>>()?
    } else {
        files
            .iter()
            .map(|path| process_one(opts, path))
            .collect::<Result<_>>()?
    };

    info!("Normalization: {:.2}s", start.elapsed().as_secs_f64());

    if docs.len() == 1 {
        let Some(doc) = docs.into_iter().next() else {
            return Ok(None);
        };
        return Ok(Some(doc));
    }

    let mut out = String::new();
    for (path, doc) in files.iter().zip(docs) {
        out.push_str("// ");
        out.push_str(path);
        out.push('\n');
        out.push_str(&doc);
        out.push('\n');
    }
    Ok(Some(out))
}

/// Normalize one file to its JSON document (or just its comment records).
fn process_one(opts: &FormaOptions, path: &str) -> Result<String> {
    let source = fs::read_to_string(path)
        .map_err(|e| Error::from(e).with_operation("pipeline::process_one"))?;

    let parsed = ParsedSource::parse(source)
        .map_err(|e| e.with_operation("pipeline::process_one").with_context("path", path))?;
    let doc = Normalizer::new(&parsed).normalize()?;

    if opts.comments_only {
        value_to_json(&Value::Array(doc.comments), opts.pretty)
    } else {
        doc.to_json(opts.pretty)
    }
}
