//! Built-in program templates and chunks.
//!
//! Shipped sources live under `src/renderer/pipeline/shaders` and are embedded
//! at compile time:
//!
//! ```text
//! shaders/
//!   templates/<name>.vert   vertex template
//!   templates/<name>.frag   fragment template
//!   templates/<name>.json   option declarations ([{ "name": .., "min": .., "max": .. }])
//!   chunks/<name>.<ext>     partial, referenced as {{> name}}
//! ```

use std::path::Path;

use rust_embed::RustEmbed;
use rustc_hash::FxHashMap;

use super::program_lib::TemplateDecl;
use super::variant_key::OptionSpec;
use crate::errors::{ForwardError, Result};

#[derive(RustEmbed)]
#[folder = "src/renderer/pipeline/shaders"]
struct ShaderAssets;

fn read(path: &str) -> Result<String> {
    let file = ShaderAssets::get(path)
        .ok_or_else(|| ForwardError::Declaration(format!("missing built-in shader file {path}")))?;
    String::from_utf8(file.data.into_owned())
        .map_err(|e| ForwardError::Declaration(format!("{path}: {e}")))
}

/// Built-in template declarations, sorted by name.
pub fn templates() -> Result<Vec<TemplateDecl>> {
    let mut names: Vec<String> = ShaderAssets::iter()
        .filter_map(|path| {
            path.strip_prefix("templates/")
                .and_then(|file| file.strip_suffix(".vert"))
                .map(str::to_owned)
        })
        .collect();
    names.sort_unstable();

    names
        .into_iter()
        .map(|name| {
            let vert = read(&format!("templates/{name}.vert"))?;
            let frag = read(&format!("templates/{name}.frag"))?;
            let options: Vec<OptionSpec> =
                serde_json::from_str(&read(&format!("templates/{name}.json"))?)?;
            Ok(TemplateDecl {
                name,
                vert,
                frag,
                options,
            })
        })
        .collect()
}

/// Built-in chunks keyed by file stem.
pub fn chunks() -> Result<FxHashMap<String, String>> {
    let mut chunks = FxHashMap::default();
    for path in ShaderAssets::iter() {
        let Some(file) = path.strip_prefix("chunks/") else {
            continue;
        };
        let Some(stem) = Path::new(file).file_stem().and_then(|s| s.to_str()) else {
            continue;
        };
        chunks.insert(stem.to_owned(), read(&path)?);
    }
    Ok(chunks)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn simple_template_is_embedded() {
        let templates = templates().unwrap();
        let simple = templates.iter().find(|t| t.name == "simple").unwrap();
        assert_eq!(
            simple.options,
            vec![OptionSpec::flag("useTexture"), OptionSpec::flag("useColor")]
        );
        assert!(simple.vert.contains("gl_Position"));
    }

    #[test]
    fn chunks_are_keyed_by_stem() {
        let chunks = chunks().unwrap();
        assert!(chunks.contains_key("back_face"));
        assert!(chunks.contains_key("gamma"));
    }
}
