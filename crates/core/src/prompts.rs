use std::collections::HashMap;
use std::fs;
use std::path::Path;

use crate::error::PromptError;

const BUILTIN: [(&str, &str); 6] = [
    (
        "assistant_instructions",
        include_str!("../prompts/assistant_instructions.md"),
    ),
    ("assistant_greeting", include_str!("../prompts/assistant_greeting.md")),
    (
        "collections_instructions",
        include_str!("../prompts/collections_instructions.md"),
    ),
    ("collections_greeting", include_str!("../prompts/collections_greeting.md")),
    (
        "outbound_instructions",
        include_str!("../prompts/outbound_instructions.md"),
    ),
    ("outbound_greeting", include_str!("../prompts/outbound_greeting.md")),
];

/// Reads every `*.md` file in `dir_path`, keyed by file stem.
pub fn load_prompts(dir_path: &Path) -> Result<HashMap<String, String>, PromptError> {
    let io_err = |source| PromptError::Io {
        path: dir_path.to_path_buf(),
        source,
    };
    let mut prompts = HashMap::new();

    for entry in fs::read_dir(dir_path).map_err(io_err)? {
        let path = entry.map_err(io_err)?.path();
        if !path.is_file() || path.extension().and_then(|s| s.to_str()) != Some("md") {
            continue;
        }
        let Some(prompt_key) = path.file_stem().and_then(|s| s.to_str()) else {
            continue;
        };
        let content = fs::read_to_string(&path).map_err(|source| PromptError::Io {
            path: path.clone(),
            source,
        })?;
        prompts.insert(prompt_key.to_string(), content);
    }

    Ok(prompts)
}

/// Prompt and greeting templates, built in unless overridden from disk.
#[derive(Debug, Clone)]
pub struct Prompts {
    templates: HashMap<String, String>,
}

impl Default for Prompts {
    fn default() -> Self {
        Self::builtin()
    }
}

impl Prompts {
    pub fn builtin() -> Self {
        Self {
            templates: BUILTIN
                .iter()
                .map(|(k, v)| (k.to_string(), v.to_string()))
                .collect(),
        }
    }

    /// Built-in templates with any same-named files from `dir` taking precedence.
    pub fn with_overrides(dir: &Path) -> Result<Self, PromptError> {
        let mut prompts = Self::builtin();
        let overrides = load_prompts(dir)?;
        tracing::info!("Loaded {} prompt overrides from {}", overrides.len(), dir.display());
        prompts.templates.extend(overrides);
        Ok(prompts)
    }

    pub fn get(&self, key: &str) -> Result<&str, PromptError> {
        self.templates
            .get(key)
            .map(|s| s.trim())
            .ok_or_else(|| PromptError::Missing(key.to_string()))
    }

    /// The template under `key` with every `{name}` replaced from `vars`.
    pub fn render(&self, key: &str, vars: &[(&str, String)]) -> Result<String, PromptError> {
        Ok(render(self.get(key)?, vars))
    }
}

/// Single left-to-right pass: substituted values are never rescanned, and
/// braces that do not name a known variable are kept as written.
pub fn render(template: &str, vars: &[(&str, String)]) -> String {
    let mut out = String::with_capacity(template.len());
    let mut rest = template;
    while let Some(open) = rest.find('{') {
        out.push_str(&rest[..open]);
        let after = &rest[open + 1..];
        let value = after.find('}').and_then(|close| {
            let name = &after[..close];
            vars.iter()
                .find(|(var, _)| *var == name)
                .map(|(_, value)| (value, close))
        });
        match value {
            Some((value, close)) => {
                out.push_str(value);
                rest = &after[close + 1..];
            }
            None => {
                out.push('{');
                rest = after;
            }
        }
    }
    out.push_str(rest);
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs::File;
    use std::io::Write;
    use tempfile::tempdir;

    #[test]
    fn test_load_prompts_successfully() -> anyhow::Result<()> {
        // Arrange
        let dir = tempdir()?;
        let dir_path = dir.path();

        let mut file1 = File::create(dir_path.join("prompt1.md"))?;
        writeln!(file1, "This is prompt 1. Placeholder: {{placeholder1}}")?;
        let mut file2 = File::create(dir_path.join("prompt2.md"))?;
        writeln!(file2, "This is prompt 2.")?;
        let mut ignored_file = File::create(dir_path.join("config.txt"))?;
        writeln!(ignored_file, "some config")?;
        std::fs::create_dir(dir_path.join("subdir"))?;

        // Act
        let prompts = load_prompts(dir_path)?;

        // Assert
        assert_eq!(prompts.len(), 2, "Should only load .md files");
        assert_eq!(
            prompts.get("prompt1").unwrap(),
            "This is prompt 1. Placeholder: {placeholder1}\n"
        );
        assert_eq!(prompts.get("prompt2").unwrap(), "This is prompt 2.\n");
        assert!(prompts.get("config").is_none(), "Should not load .txt files");
        Ok(())
    }

    #[test]
    fn test_load_prompts_from_nonexistent_dir() {
        let result = load_prompts(Path::new("nonexistent_dir_for_testing_prompts"));
        assert!(matches!(result, Err(PromptError::Io { .. })));
    }

    #[test]
    fn test_overrides_replace_builtin_by_stem() -> anyhow::Result<()> {
        let dir = tempdir()?;
        let mut file = File::create(dir.path().join("assistant_greeting.md"))?;
        writeln!(file, "Hi, you've reached the front desk.")?;

        let prompts = Prompts::with_overrides(dir.path())?;
        assert_eq!(
            prompts.get("assistant_greeting")?,
            "Hi, you've reached the front desk."
        );
        assert!(prompts.get("collections_greeting")?.starts_with("Hello, this is Sarah"));
        Ok(())
    }

    #[test]
    fn test_builtin_templates_present() {
        let prompts = Prompts::builtin();
        for (key, _) in BUILTIN {
            assert!(!prompts.get(key).unwrap().is_empty(), "{key} is empty");
        }
        assert!(matches!(prompts.get("nope"), Err(PromptError::Missing(_))));
    }

    #[test]
    fn test_render_fills_every_occurrence() {
        let text = render(
            "Pay ${amount_owed} by {date}. Again: ${amount_owed}",
            &[
                ("amount_owed", "12.50".to_string()),
                ("date", "2026-11-01".to_string()),
            ],
        );
        assert_eq!(text, "Pay $12.50 by 2026-11-01. Again: $12.50");
    }

    #[test]
    fn test_render_keeps_placeholders_inside_values() {
        let text = render(
            "Name: {customer_name}. Owed: ${amount_owed}",
            &[
                ("customer_name", "{amount_owed}".to_string()),
                ("amount_owed", "12.50".to_string()),
            ],
        );
        assert_eq!(text, "Name: {amount_owed}. Owed: $12.50");
    }

    #[test]
    fn test_render_leaves_unknown_braces() {
        let text = render("{greeting} {x {customer_name}} {", &[("customer_name", "Ana".into())]);
        assert_eq!(text, "{greeting} {x Ana} {");
    }
}
