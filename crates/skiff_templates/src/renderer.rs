//! Text template rendering.
//!
//! Templates use `{{name}}` placeholders and `{{#if flag}} ... {{else}} ... {{/if}}`
//! conditional sections. Everything is resolved from a [`TemplateParams`] record.

use std::collections::BTreeMap;

use regex::Regex;
use tracing::debug;

use crate::error::{TemplateError, TemplateResult};

/// Parameter record for a template.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TemplateParams {
    variables: BTreeMap<String, String>,
    flags: BTreeMap<String, bool>,
}

impl TemplateParams {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_variable(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.variables.insert(name.into(), value.into());
        self
    }

    pub fn with_flag(mut self, name: impl Into<String>, enabled: bool) -> Self {
        self.flags.insert(name.into(), enabled);
        self
    }

    pub fn variable(&self, name: &str) -> Option<&str> {
        self.variables.get(name).map(String::as_str)
    }

    /// Unset flags are false.
    pub fn flag(&self, name: &str) -> bool {
        self.flags.get(name).copied().unwrap_or(false)
    }
}

struct Block {
    parent_active: bool,
    condition: bool,
    in_else: bool,
}

impl Block {
    fn active(&self) -> bool {
        self.parent_active && (self.condition != self.in_else)
    }
}

/// Template renderer.
pub struct TemplateRenderer {
    variable_pattern: Regex,
    block_pattern: Regex,
}

impl Default for TemplateRenderer {
    fn default() -> Self {
        Self::new()
    }
}

impl TemplateRenderer {
    /// Create a new template renderer.
    pub fn new() -> Self {
        Self {
            // Match {{variable_name}} pattern
            variable_pattern: Regex::new(r"\{\{([a-zA-Z_][a-zA-Z0-9_]*)\}\}").unwrap(),
            block_pattern: Regex::new(r"\{\{(?:#if\s+([a-zA-Z_][a-zA-Z0-9_]*)|(else)|(/if))\}\}")
                .unwrap(),
        }
    }

    /// Render a named template.
    pub fn render(
        &self,
        template_name: &str,
        template: &str,
        params: &TemplateParams,
    ) -> TemplateResult<String> {
        let selected = self.resolve_blocks(template_name, template, params)?;
        let rendered = self.substitute(template_name, &selected, params)?;
        debug!("Rendered template {} ({} bytes)", template_name, rendered.len());
        Ok(rendered)
    }

    fn resolve_blocks(
        &self,
        template_name: &str,
        template: &str,
        params: &TemplateParams,
    ) -> TemplateResult<String> {
        let unbalanced = |message: &str| TemplateError::UnbalancedBlock {
            template: template_name.to_string(),
            message: message.to_string(),
        };

        let mut output = String::with_capacity(template.len());
        let mut stack: Vec<Block> = Vec::new();
        let mut cursor = 0;

        for caps in self.block_pattern.captures_iter(template) {
            let Some(token) = caps.get(0) else {
                continue;
            };
            let active = stack.last().map_or(true, Block::active);
            if active {
                output.push_str(&template[cursor..token.start()]);
            }
            cursor = token.end();

            if let Some(flag) = caps.get(1) {
                stack.push(Block {
                    parent_active: active,
                    condition: params.flag(flag.as_str()),
                    in_else: false,
                });
            } else if caps.get(2).is_some() {
                let block = stack
                    .last_mut()
                    .ok_or_else(|| unbalanced("{{else}} outside of {{#if}}"))?;
                if block.in_else {
                    return Err(unbalanced("duplicate {{else}}"));
                }
                block.in_else = true;
            } else {
                stack
                    .pop()
                    .ok_or_else(|| unbalanced("{{/if}} without {{#if}}"))?;
            }
        }

        if !stack.is_empty() {
            return Err(unbalanced("missing {{/if}}"));
        }
        output.push_str(&template[cursor..]);
        Ok(output)
    }

    fn substitute(
        &self,
        template_name: &str,
        content: &str,
        params: &TemplateParams,
    ) -> TemplateResult<String> {
        let mut output = String::with_capacity(content.len());
        let mut cursor = 0;
        for caps in self.variable_pattern.captures_iter(content) {
            let (Some(whole), Some(name)) = (caps.get(0), caps.get(1)) else {
                continue;
            };
            let value = params
                .variable(name.as_str())
                .ok_or_else(|| TemplateError::UnknownPlaceholder {
                    template: template_name.to_string(),
                    placeholder: name.as_str().to_string(),
                })?;
            let literal = &content[cursor..whole.start()];
            check_literal(template_name, literal)?;
            output.push_str(literal);
            output.push_str(value);
            cursor = whole.end();
        }
        let tail = &content[cursor..];
        check_literal(template_name, tail)?;
        output.push_str(tail);
        Ok(output)
    }
}

/// Reject brace markers left in literal text, e.g. `{{ name }}` or an unclosed `{{name`.
fn check_literal(template_name: &str, literal: &str) -> TemplateResult<()> {
    let Some(start) = [literal.find("{{"), literal.find("}}")]
        .into_iter()
        .flatten()
        .min()
    else {
        return Ok(());
    };
    let line_start = literal[..start].rfind('\n').map_or(0, |i| i + 1);
    let rest = &literal[start..];
    let token = if rest.starts_with("{{") {
        let line = &rest[..rest.find('\n').unwrap_or(rest.len())];
        match line.find("}}") {
            Some(end) => &line[..end + 2],
            None => line,
        }
    } else {
        &literal[line_start..start + 2]
    };
    Err(TemplateError::MalformedToken {
        template: template_name.to_string(),
        token: token.trim().to_string(),
    })
}
