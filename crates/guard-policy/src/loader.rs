//! Policy document loading.
//!
//! Documents may be YAML, JSON or TOML. Each is first parsed into a generic
//! `serde_json::Value` tree (the same tree `guard-schema` validates), then the
//! `kind` discriminator is checked and the tree is deserialized into a
//! `PolicySet`, filling documented defaults on the way.

use std::path::Path;

use serde_json::Value;
use tracing::info;

use guard_contracts::{
    error::{GuardError, GuardResult},
    policy::POLICY_SET_KIND,
    PolicySet,
};

/// Serialization format of a policy document.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DocumentFormat {
    Yaml,
    Json,
    Toml,
}

impl DocumentFormat {
    /// Pick a format from the file extension (`yaml`/`yml`, `json`, `toml`).
    pub fn from_path(path: &Path) -> GuardResult<Self> {
        let ext = path
            .extension()
            .and_then(|e| e.to_str())
            .map(str::to_ascii_lowercase);

        match ext.as_deref() {
            Some("yaml") | Some("yml") => Ok(Self::Yaml),
            Some("json") => Ok(Self::Json),
            Some("toml") => Ok(Self::Toml),
            Some(other) => Err(GuardError::ConfigError {
                reason: format!(
                    "unsupported policy document extension '{}' for '{}' (expected yaml, yml, json or toml)",
                    other,
                    path.display()
                ),
            }),
            None => Err(GuardError::ConfigError {
                reason: format!(
                    "cannot determine policy document format of '{}': no file extension",
                    path.display()
                ),
            }),
        }
    }
}

/// Parse `text` into a generic value tree. The top level must be a mapping.
pub fn parse_document(text: &str, format: DocumentFormat) -> GuardResult<Value> {
    let parsed: Result<Value, String> = match format {
        DocumentFormat::Yaml => serde_yaml::from_str(text).map_err(|e| e.to_string()),
        DocumentFormat::Json => serde_json::from_str(text).map_err(|e| e.to_string()),
        DocumentFormat::Toml => toml::from_str(text).map_err(|e| e.to_string()),
    };

    let value = parsed.map_err(|reason| GuardError::ParseError {
        reason: format!("invalid {:?} document: {}", format, reason),
    })?;

    if !value.is_object() {
        return Err(GuardError::ParseError {
            reason: "expected a mapping at the top level".to_string(),
        });
    }
    Ok(value)
}

/// Check the `kind` discriminator and deserialize a value tree into a
/// `PolicySet`.
///
/// A missing `kind` is accepted as `PolicySet`. Top-level keys written as
/// null (e.g. an empty `defaults:` in YAML) are treated as absent.
pub fn policy_set_from_value(mut value: Value) -> GuardResult<PolicySet> {
    let Some(document) = value.as_object_mut() else {
        return Err(GuardError::ParseError {
            reason: "expected a mapping at the top level".to_string(),
        });
    };
    document.retain(|_, v| !v.is_null());

    match document.get("kind") {
        None => {}
        Some(Value::String(kind)) if kind == POLICY_SET_KIND => {}
        Some(Value::String(kind)) => {
            return Err(GuardError::UnsupportedKind { kind: kind.clone() });
        }
        Some(other) => {
            return Err(GuardError::UnsupportedKind {
                kind: other.to_string(),
            });
        }
    }

    serde_json::from_value(value).map_err(|e| GuardError::ParseError {
        reason: e.to_string(),
    })
}

/// Parse a policy set from a string in the given format.
pub fn policy_set_from_str(text: &str, format: DocumentFormat) -> GuardResult<PolicySet> {
    policy_set_from_value(parse_document(text, format)?)
}

/// Read the document at `path` into a value tree without interpreting it.
///
/// This is the form schema validation works on.
pub fn read_document(path: &Path) -> GuardResult<Value> {
    let format = DocumentFormat::from_path(path)?;
    let contents = std::fs::read_to_string(path).map_err(|e| GuardError::ConfigError {
        reason: format!("failed to read policy file '{}': {}", path.display(), e),
    })?;
    parse_document(&contents, format)
}

/// Read and parse the policy document at `path`.
pub fn load_policy_set(path: &Path) -> GuardResult<PolicySet> {
    let set = policy_set_from_value(read_document(path)?)?;
    info!(
        path = %path.display(),
        policy_set = %set.metadata.name,
        policies = set.policies.len(),
        "policy document read"
    );
    Ok(set)
}

#[cfg(test)]
mod tests {
    use guard_contracts::{Channel, Effect};

    use super::*;

    #[test]
    fn format_from_extension() {
        assert_eq!(DocumentFormat::from_path(Path::new("p.yaml")).unwrap(), DocumentFormat::Yaml);
        assert_eq!(DocumentFormat::from_path(Path::new("p.YML")).unwrap(), DocumentFormat::Yaml);
        assert_eq!(DocumentFormat::from_path(Path::new("p.json")).unwrap(), DocumentFormat::Json);
        assert_eq!(DocumentFormat::from_path(Path::new("p.toml")).unwrap(), DocumentFormat::Toml);

        match DocumentFormat::from_path(Path::new("policies.ini")) {
            Err(GuardError::ConfigError { reason }) => assert!(reason.contains("ini")),
            other => panic!("expected ConfigError, got {:?}", other),
        }
        assert!(DocumentFormat::from_path(Path::new("policies")).is_err());
    }

    #[test]
    fn yaml_document_with_all_sections() {
        let yaml = r#"
apiVersion: agent-policy/v1
kind: PolicySet
metadata:
  name: workstation
  version: "1.2"
  labels:
    team: platform
defaults:
  effect: deny
  channel: phone
context_fallbacks:
  scheduler: background
policies:
  - id: allow-read
    name: Read-only tools
    effect: allow
    priority: 10
    condition:
      tools: [view, grep, glob]
  - id: call-owner
    effect: pitl
    enabled: false
    channel: phone
"#;

        let set = policy_set_from_str(yaml, DocumentFormat::Yaml).unwrap();

        assert_eq!(set.metadata.name, "workstation");
        assert_eq!(set.metadata.version.as_deref(), Some("1.2"));
        assert_eq!(set.metadata.labels.get("team").map(String::as_str), Some("platform"));
        assert_eq!(set.defaults.effect, Some(Effect::DENY));
        assert_eq!(set.defaults.channel, Some(Channel::PHONE));
        assert_eq!(set.context_fallbacks.get("scheduler").map(String::as_str), Some("background"));

        assert_eq!(set.policies.len(), 2);
        assert_eq!(set.policies[0].priority, 10);
        assert_eq!(set.policies[0].name.as_deref(), Some("Read-only tools"));
        assert_eq!(
            set.policies[0].condition.as_ref().and_then(|c| c.tools.clone()),
            Some(vec!["view".to_string(), "grep".to_string(), "glob".to_string()])
        );
        assert!(!set.policies[1].enabled);
        assert_eq!(set.policies[1].priority, 100);
        assert_eq!(set.policies[1].effect, Effect::PITL);
    }

    #[test]
    fn missing_kind_and_null_sections_are_defaulted() {
        let yaml = r#"
metadata:
  name: sparse
defaults:
context_fallbacks:
policies:
  - id: p1
    effect: my-org-mfa
"#;

        let set = policy_set_from_str(yaml, DocumentFormat::Yaml).unwrap();

        assert_eq!(set.kind, "PolicySet");
        assert_eq!(set.api_version, "agent-policy/v1");
        assert_eq!(set.defaults.effect, None);
        assert!(set.context_fallbacks.is_empty());
        assert_eq!(set.policies[0].effect, Effect::new("my-org-mfa"));
    }

    #[test]
    fn empty_condition_list_is_kept_distinct_from_absent() {
        let yaml = r#"
metadata: { name: lists }
policies:
  - id: empty
    effect: deny
    condition:
      tools: []
  - id: absent
    effect: deny
    condition:
      modes: [background]
"#;

        let set = policy_set_from_str(yaml, DocumentFormat::Yaml).unwrap();
        let empty = set.policies[0].condition.as_ref().unwrap();
        let absent = set.policies[1].condition.as_ref().unwrap();

        assert_eq!(empty.tools, Some(vec![]));
        assert_eq!(absent.tools, None);
    }

    #[test]
    fn unsupported_kind_is_rejected() {
        let yaml = r#"
kind: RoleBinding
metadata: { name: wrong }
"#;

        match policy_set_from_str(yaml, DocumentFormat::Yaml) {
            Err(GuardError::UnsupportedKind { kind }) => assert_eq!(kind, "RoleBinding"),
            other => panic!("expected UnsupportedKind, got {:?}", other),
        }
    }

    #[test]
    fn missing_required_fields_are_parse_errors() {
        let no_name = "policies: []";
        assert!(matches!(
            policy_set_from_str(no_name, DocumentFormat::Yaml),
            Err(GuardError::ParseError { .. })
        ));

        let no_effect = r#"{ "metadata": { "name": "x" }, "policies": [ { "id": "p1" } ] }"#;
        match policy_set_from_str(no_effect, DocumentFormat::Json) {
            Err(GuardError::ParseError { reason }) => assert!(reason.contains("effect")),
            other => panic!("expected ParseError, got {:?}", other),
        }
    }

    #[test]
    fn non_mapping_document_is_rejected() {
        match policy_set_from_str("- just\n- a list\n", DocumentFormat::Yaml) {
            Err(GuardError::ParseError { reason }) => assert!(reason.contains("mapping")),
            other => panic!("expected ParseError, got {:?}", other),
        }
    }

    #[test]
    fn malformed_toml_is_a_parse_error() {
        match policy_set_from_str("this is not valid toml ][[[", DocumentFormat::Toml) {
            Err(GuardError::ParseError { reason }) => assert!(reason.contains("Toml")),
            other => panic!("expected ParseError, got {:?}", other),
        }
    }

    #[test]
    fn toml_document() {
        let toml = r#"
            kind = "PolicySet"

            [metadata]
            name = "toml-set"

            [defaults]
            effect = "allow"

            [context_fallbacks]
            bot_processor = "background"

            [[policies]]
            id = "deny-bg"
            effect = "deny"
            priority = 5

            [policies.condition]
            modes = ["background"]
        "#;

        let set = policy_set_from_str(toml, DocumentFormat::Toml).unwrap();

        assert_eq!(set.metadata.name, "toml-set");
        assert_eq!(set.defaults.effect, Some(Effect::ALLOW));
        assert_eq!(set.policies[0].priority, 5);
        assert_eq!(
            set.context_fallbacks.get("bot_processor").map(String::as_str),
            Some("background")
        );
    }

    #[test]
    fn missing_file_is_a_config_error() {
        match load_policy_set(Path::new("/nonexistent/guard/policies.yaml")) {
            Err(GuardError::ConfigError { reason }) => {
                assert!(reason.contains("failed to read policy file"))
            }
            other => panic!("expected ConfigError, got {:?}", other),
        }
    }
}
