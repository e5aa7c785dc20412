use std::{collections::BTreeMap, fs, path::Path};

use anyhow::{Context, Result, anyhow};
use jsonschema::{JSONSchema, ValidationError};
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::{
    consumes::{
        Candidate, CandidateSet, ConsumesDeclaration, GROUP_DECLARATION_RANK,
        HANDLER_DECLARATION_RANK,
    },
    media::MediaType,
    negotiate::{FormatMappings, NegotiationPolicy},
};

const CONFIG_SCHEMA: &str = include_str!("../accord.schema.json");

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub negotiation: NegotiationConfig,
    #[serde(default)]
    pub groups: Vec<GroupConfig>,
    #[serde(default)]
    pub handlers: Vec<HandlerConfig>,
    #[serde(default)]
    pub formats: BTreeMap<String, String>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct NegotiationConfig {
    #[serde(default)]
    pub respect_browser_accept: bool,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GroupConfig {
    pub id: String,
    #[serde(default)]
    pub consumes: Vec<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HandlerConfig {
    pub id: String,
    #[serde(default)]
    pub group: Option<String>,
    #[serde(default)]
    pub consumes: Vec<String>,
}

impl Config {
    pub fn load(config_path: &Path) -> Result<Self> {
        let config_content = fs::read_to_string(config_path)
            .with_context(|| format!("failed to read {}", config_path.display()))?;
        let config_value: Value = json5::from_str(&config_content)
            .with_context(|| format!("failed to parse {}", config_path.display()))?;

        validate_against_schema(&config_value)?;

        serde_json::from_value(config_value).context("failed to deserialize accord config")
    }

    pub fn policy(&self) -> NegotiationPolicy {
        NegotiationPolicy {
            respect_browser_accept: self.negotiation.respect_browser_accept,
        }
    }

    /// Builds the ordered candidate set. A group `consumes` list becomes a
    /// rank-0 declaration on each member handler; a handler's own list is the
    /// rank-1 declaration that fully replaces it for matching purposes.
    pub fn candidate_set(&self) -> Result<CandidateSet> {
        let mut groups_by_id: BTreeMap<&str, &GroupConfig> = BTreeMap::new();
        for group in &self.groups {
            if groups_by_id.insert(group.id.as_str(), group).is_some() {
                return Err(anyhow!("duplicate group id '{}' in config", group.id));
            }
        }

        let mut seen_handlers: Vec<&str> = Vec::new();
        let mut candidates = Vec::with_capacity(self.handlers.len());
        for handler in &self.handlers {
            if seen_handlers.contains(&handler.id.as_str()) {
                return Err(anyhow!("duplicate handler id '{}' in config", handler.id));
            }
            seen_handlers.push(handler.id.as_str());

            let mut declarations = Vec::new();
            if let Some(group_id) = &handler.group {
                let group = groups_by_id.get(group_id.as_str()).ok_or_else(|| {
                    anyhow!(
                        "handler '{}' references unknown group '{}'",
                        handler.id,
                        group_id
                    )
                })?;
                if !group.consumes.is_empty() {
                    declarations.push(ConsumesDeclaration::new(
                        parse_content_types(&group.consumes)
                            .with_context(|| format!("in group '{}'", group.id))?,
                        GROUP_DECLARATION_RANK,
                    ));
                }
            }
            if !handler.consumes.is_empty() {
                declarations.push(ConsumesDeclaration::new(
                    parse_content_types(&handler.consumes)
                        .with_context(|| format!("in handler '{}'", handler.id))?,
                    HANDLER_DECLARATION_RANK,
                ));
            }

            candidates.push(Candidate {
                handler: handler.id.clone(),
                declarations,
            });
        }

        Ok(CandidateSet::new(candidates))
    }

    /// Default format mappings overlaid with the configured ones.
    pub fn format_mappings(&self) -> Result<FormatMappings> {
        let mut mappings = FormatMappings::default();
        for (key, content_type) in &self.formats {
            let parsed = MediaType::parse(content_type)
                .with_context(|| format!("in format mapping '{key}'"))?;
            mappings.insert(key.clone(), parsed);
        }
        Ok(mappings)
    }
}

fn parse_content_types(texts: &[String]) -> Result<Vec<MediaType>> {
    texts
        .iter()
        .map(|text| MediaType::parse(text).map_err(anyhow::Error::from))
        .collect()
}

fn validate_against_schema(config_value: &Value) -> Result<()> {
    let schema: Value =
        serde_json::from_str(CONFIG_SCHEMA).context("failed to parse embedded config schema")?;

    let compiled =
        JSONSchema::compile(&schema).map_err(|e| anyhow!("failed to compile schema: {e}"))?;

    match compiled.validate(config_value) {
        Ok(()) => Ok(()),
        Err(errors_iter) => {
            let validation_errors: Vec<ValidationError> = errors_iter.collect();
            let messages: Vec<String> = validation_errors
                .into_iter()
                .map(|error| error.to_string())
                .collect();
            Err(anyhow!("config validation failed: {}", messages.join("; ")))
        }
    }
}
