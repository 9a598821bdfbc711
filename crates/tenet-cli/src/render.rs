//! The template collaborator supplied by the CLI.
//!
//! A deliberately small renderer: each `{{name}}` token in the template is
//! replaced with the JSON value bound under `name` in the data context.
//! String values are inserted as-is; structured values are pretty-printed.
//! Core never renders; it only hands over the resolved context.

use anyhow::bail;
use serde_json::Value;
use tenet_core::document::{DataContext, TemplateEngine};

pub struct ContextRenderer;

impl TemplateEngine for ContextRenderer {
    fn render(&self, template: &str, context: &DataContext) -> anyhow::Result<String> {
        let mut out = template.to_string();
        for (name, value) in context {
            let token = format!("{{{{{}}}}}", name);
            if !out.contains(&token) {
                continue;
            }
            let rendered = match value {
                Value::String(s) => s.clone(),
                other => serde_json::to_string_pretty(other)?,
            };
            out = out.replace(&token, &rendered);
        }
        if let Some(start) = out.find("{{") {
            let rest = &out[start..];
            let token: String = rest.chars().take(40).collect();
            bail!("unresolved template token: {}", token);
        }
        Ok(out)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn substitutes_bound_values() {
        let mut ctx = DataContext::new();
        ctx.insert("title".into(), json!("System Security Plan"));
        ctx.insert("components".into(), json!([{ "key": "app1" }]));
        let text = ContextRenderer
            .render("# {{title}}\n\n{{components}}\n", &ctx)
            .unwrap();
        assert!(text.starts_with("# System Security Plan"));
        assert!(text.contains("app1"));
    }

    #[test]
    fn unresolved_token_is_an_error() {
        let ctx = DataContext::new();
        let err = ContextRenderer.render("{{missing}}", &ctx).unwrap_err();
        assert!(err.to_string().contains("unresolved template token"));
    }
}
