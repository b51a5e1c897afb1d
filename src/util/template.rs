//! Named-placeholder template rendering
//!
//! Task specifications and prompts are written as format strings with named
//! fields such as `{component}` or `{time_period}`. Literal braces are
//! written doubled (`{{` and `}}`). A format spec after a colon
//! (`{num:d}`) is accepted and ignored.

use std::collections::HashMap;
use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum TemplateError {
    #[error("missing substitution key '{0}'")]
    MissingKey(String),
    #[error("malformed template at byte {position}: {reason}")]
    Malformed { position: usize, reason: String },
}

/// Values available to a template render
#[derive(Debug, Clone, Default)]
pub struct TemplateVars {
    values: HashMap<String, String>,
}

impl TemplateVars {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with(mut self, key: &str, value: impl ToString) -> Self {
        self.values.insert(key.to_string(), value.to_string());
        self
    }

    pub fn get(&self, key: &str) -> Option<&str> {
        self.values.get(key).map(String::as_str)
    }
}

/// Render `template`, substituting every `{name}` with its value.
///
/// Extra values that the template does not reference are ignored.
pub fn render(template: &str, vars: &TemplateVars) -> Result<String, TemplateError> {
    let mut out = String::with_capacity(template.len());
    let mut chars = template.char_indices().peekable();

    while let Some((pos, c)) = chars.next() {
        match c {
            '{' => {
                if matches!(chars.peek(), Some((_, '{'))) {
                    chars.next();
                    out.push('{');
                    continue;
                }

                let mut field = String::new();
                let mut closed = false;
                for (_, fc) in chars.by_ref() {
                    if fc == '}' {
                        closed = true;
                        break;
                    }
                    field.push(fc);
                }
                if !closed {
                    return Err(TemplateError::Malformed {
                        position: pos,
                        reason: "unclosed '{'".to_string(),
                    });
                }

                let name = field
                    .split([':', '!'])
                    .next()
                    .unwrap_or_default()
                    .trim();
                if name.is_empty() {
                    return Err(TemplateError::Malformed {
                        position: pos,
                        reason: "positional fields are not supported".to_string(),
                    });
                }

                let value = vars
                    .get(name)
                    .ok_or_else(|| TemplateError::MissingKey(name.to_string()))?;
                out.push_str(value);
            }
            '}' => {
                if matches!(chars.peek(), Some((_, '}'))) {
                    chars.next();
                    out.push('}');
                } else {
                    return Err(TemplateError::Malformed {
                        position: pos,
                        reason: "single '}' encountered".to_string(),
                    });
                }
            }
            _ => out.push(c),
        }
    }

    Ok(out)
}
