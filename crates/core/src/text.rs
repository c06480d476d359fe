//! Text producers: line templates and small expansion grammars.
//!
//! Templates use `{name}` placeholders filled from the slide context, with an
//! optional `.title`, `.upper` or `.lower` case modifier. Grammars are JSON
//! objects mapping a rule name to alternatives; `#rule#` inside an
//! alternative expands that rule, `#rule.capitalize#` upper-cases the first
//! letter of the result.

use rand::rngs::StdRng;
use rand::seq::SliceRandom;
use regex::{Captures, Regex};
use std::collections::HashMap;
use std::sync::LazyLock;

use crate::error::{Error, Result};
use crate::generator::Generator;
use crate::normalize::title_case;
use crate::types::Context;

/// `{name}` or `{name.modifier}`.
static PLACEHOLDER_REGEX: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\{([a-z_]+)(?:\.(title|upper|lower))?\}").unwrap());

/// `#rule#` or `#rule.capitalize#`.
static RULE_REGEX: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"#([A-Za-z_][A-Za-z0-9_]*)(\.capitalize)?#").unwrap());

/// Maximum nesting of grammar rules before expansion stops.
const MAX_EXPANSION_DEPTH: usize = 12;

/// Whether every placeholder in `template` has a value in `ctx`.
fn is_satisfiable(template: &str, ctx: &Context) -> bool {
    PLACEHOLDER_REGEX
        .captures_iter(template)
        .all(|caps| ctx.var(&caps[1]).is_some_and(|value| !value.is_empty()))
}

/// Fill placeholders from `ctx`. Unknown placeholders are left as written.
pub fn fill_placeholders(template: &str, ctx: &Context) -> String {
    PLACEHOLDER_REGEX
        .replace_all(template, |caps: &Captures| {
            let Some(value) = ctx.var(&caps[1]) else {
                return caps[0].to_string();
            };
            match caps.get(2).map(|m| m.as_str()) {
                Some("title") => title_case(value),
                Some("upper") => value.to_uppercase(),
                Some("lower") => value.to_lowercase(),
                _ => value.to_string(),
            }
        })
        .into_owned()
}

fn capitalize_first(text: &str) -> String {
    let mut chars = text.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars).collect(),
        None => String::new(),
    }
}

/// A set of one-line templates, one of which is picked per call.
#[derive(Debug, Clone)]
pub struct TemplatedText {
    templates: Vec<String>,
}

impl TemplatedText {
    /// Load templates from text, one per line.
    ///
    /// Blank lines and lines starting with `//` are skipped.
    pub fn from_lines(source: &str) -> Result<Self> {
        let templates: Vec<String> = source
            .lines()
            .map(str::trim)
            .filter(|line| !line.is_empty() && !line.starts_with("//"))
            .map(str::to_string)
            .collect();

        if templates.is_empty() {
            return Err(Error::TemplateError("template file has no templates".to_string()));
        }

        Ok(Self { templates })
    }

    pub fn len(&self) -> usize {
        self.templates.len()
    }

    pub fn is_empty(&self) -> bool {
        self.templates.is_empty()
    }
}

impl Generator<String> for TemplatedText {
    /// Pick a template whose placeholders `ctx` can fill, and fill it.
    fn generate(&self, ctx: &Context, rng: &mut StdRng) -> Option<String> {
        let usable: Vec<&String> = self
            .templates
            .iter()
            .filter(|template| is_satisfiable(template, ctx))
            .collect();
        let template = usable.choose(rng)?;
        Some(fill_placeholders(template, ctx))
    }
}

/// A small expansion grammar with a fixed start rule.
#[derive(Debug, Clone)]
pub struct Grammar {
    rules: HashMap<String, Vec<String>>,
    origin: String,
}

impl Grammar {
    /// Parse a grammar from JSON, expanding from `origin`.
    pub fn from_json(source: &str, origin: &str) -> Result<Self> {
        let rules: HashMap<String, Vec<String>> = serde_json::from_str(source)
            .map_err(|e| Error::TemplateError(format!("invalid grammar: {}", e)))?;

        match rules.get(origin) {
            Some(alternatives) if !alternatives.is_empty() => {}
            _ => {
                return Err(Error::TemplateError(format!(
                    "grammar has no alternatives for rule '{}'",
                    origin
                )))
            }
        }

        Ok(Self {
            rules,
            origin: origin.to_string(),
        })
    }

    /// The same rules, expanding from a different start rule.
    pub fn with_origin(&self, origin: &str) -> Result<Self> {
        match self.rules.get(origin) {
            Some(alternatives) if !alternatives.is_empty() => Ok(Self {
                rules: self.rules.clone(),
                origin: origin.to_string(),
            }),
            _ => Err(Error::TemplateError(format!(
                "grammar has no alternatives for rule '{}'",
                origin
            ))),
        }
    }

    /// Expand the start rule.
    pub fn expand(&self, rng: &mut StdRng) -> Option<String> {
        self.expand_rule(&self.origin, rng, 0)
    }

    fn expand_rule(&self, rule: &str, rng: &mut StdRng, depth: usize) -> Option<String> {
        let alternative = self.rules.get(rule)?.choose(rng)?;
        Some(self.expand_text(alternative, rng, depth + 1))
    }

    fn expand_text(&self, text: &str, rng: &mut StdRng, depth: usize) -> String {
        if depth > MAX_EXPANSION_DEPTH {
            log::warn!("Grammar expansion too deep, stopping at: {}", text);
            return text.to_string();
        }

        RULE_REGEX
            .replace_all(text, |caps: &Captures| {
                match self.expand_rule(&caps[1], rng, depth) {
                    Some(expanded) if caps.get(2).is_some() => capitalize_first(&expanded),
                    Some(expanded) => expanded,
                    None => caps[0].to_string(),
                }
            })
            .into_owned()
    }
}

impl Generator<String> for Grammar {
    fn generate(&self, ctx: &Context, rng: &mut StdRng) -> Option<String> {
        let expanded = self.expand(rng)?;
        if is_satisfiable(&expanded, ctx) {
            Some(fill_placeholders(&expanded, ctx))
        } else {
            None
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::SeedableRng;

    fn rng() -> StdRng {
        StdRng::seed_from_u64(3)
    }

    #[test]
    fn test_from_lines_skips_blank_and_comments() {
        let text = TemplatedText::from_lines("// header\n\nA {topic}\n  \nB {topic}\n").unwrap();
        assert_eq!(text.len(), 2);
    }

    #[test]
    fn test_from_lines_rejects_empty() {
        assert!(TemplatedText::from_lines("\n// only a comment\n").is_err());
    }

    #[test]
    fn test_fill_placeholders_with_modifiers() {
        let ctx = Context::new("black cat", 0, "Ada Lovelace");
        assert_eq!(
            fill_placeholders("The {topic.title} by {presenter.upper}", &ctx),
            "The Black Cat by ADA LOVELACE"
        );
        assert_eq!(fill_placeholders("{unknown} {topic}", &ctx), "{unknown} black cat");
    }

    #[test]
    fn test_templated_text_skips_unsatisfiable_templates() {
        let text = TemplatedText::from_lines("How to {action}\nAll about {topic}").unwrap();
        let ctx = Context::new("cat", 0, "Ada");
        let mut rng = rng();
        for _ in 0..20 {
            assert_eq!(text.generate(&ctx, &mut rng), Some("All about cat".to_string()));
        }

        let ctx = ctx.with_var("action", "Pet A Cat");
        let mut seen_action = false;
        for _ in 0..50 {
            if text.generate(&ctx, &mut rng) == Some("How to Pet A Cat".to_string()) {
                seen_action = true;
            }
        }
        assert!(seen_action);
    }

    #[test]
    fn test_templated_text_empty_topic_is_empty() {
        let text = TemplatedText::from_lines("All about {topic}").unwrap();
        let ctx = Context::new("", 0, "Ada");
        assert_eq!(text.generate(&ctx, &mut rng()), None);
    }

    #[test]
    fn test_grammar_expands_nested_rules() {
        let grammar = Grammar::from_json(
            r##"{"origin": ["#greeting.capitalize#, #name#"], "greeting": ["hello"], "name": ["#first# #last#"], "first": ["Ada"], "last": ["Lovelace"]}"##,
            "origin",
        )
        .unwrap();
        assert_eq!(grammar.expand(&mut rng()), Some("Hello, Ada Lovelace".to_string()));
    }

    #[test]
    fn test_grammar_leaves_unknown_rules() {
        let grammar = Grammar::from_json(r##"{"origin": ["#missing# thing"]}"##, "origin").unwrap();
        assert_eq!(grammar.expand(&mut rng()), Some("#missing# thing".to_string()));
    }

    #[test]
    fn test_grammar_stops_on_recursion() {
        let grammar = Grammar::from_json(r#"{"origin": ["a #origin#"]}"#, "origin").unwrap();
        let expanded = grammar.expand(&mut rng()).unwrap();
        assert!(expanded.starts_with("a a a"));
    }

    #[test]
    fn test_grammar_requires_origin() {
        assert!(Grammar::from_json(r#"{"other": ["x"]}"#, "origin").is_err());
        assert!(Grammar::from_json("not json", "origin").is_err());
    }

    #[test]
    fn test_grammar_fills_context() {
        let grammar = Grammar::from_json(r##"{"origin": ["#adj# {topic}"], "adj": ["strange"]}"##, "origin").unwrap();
        let ctx = Context::new("cat", 0, "Ada");
        assert_eq!(grammar.generate(&ctx, &mut rng()), Some("strange cat".to_string()));
    }

    #[test]
    fn test_grammar_with_origin() {
        let grammar = Grammar::from_json(r#"{"origin": ["x"], "job": ["baker"]}"#, "origin").unwrap();
        let jobs = grammar.with_origin("job").unwrap();
        assert_eq!(jobs.expand(&mut rng()), Some("baker".to_string()));
        assert!(grammar.with_origin("missing").is_err());
    }
}
