//! Data model for the control panel tree.
//!
//! Three levels with strict single-parent ownership:
//!
//! ```text
//! Location ──► Endpoint ──► Function
//! ```
//!
//! Locations group endpoints by physical place, endpoints are the
//! addressable devices on the broker, and functions are their individual
//! switchable capabilities. The whole tree is one serde-serializable value;
//! [`super::store::ConfigStore`] persists it as a single JSON document.

use serde::{Deserialize, Serialize};
use std::fmt;

/// A physical place grouping a set of controllable endpoints.
///
/// Names are operator-supplied and not required to be unique; duplicates
/// are told apart by position.
#[derive(Deserialize, Serialize, Clone, Debug, Default, PartialEq, Eq)]
pub struct Location {
    pub name: String,
    pub endpoints: Vec<Endpoint>,
}

/// A controllable device, addressed on the broker by its identifier.
///
/// The identifier is the leading topic segment for every function the
/// endpoint carries, so it must be non-empty for publishing to be
/// well-formed. The store rejects empty identifiers at creation.
#[derive(Deserialize, Serialize, Clone, Debug, Default, PartialEq, Eq)]
pub struct Endpoint {
    pub name: String,
    pub identifier: String,
    pub functions: Vec<Function>,
}

/// One switchable capability of an endpoint.
#[derive(Deserialize, Serialize, Clone, Debug, PartialEq, Eq)]
pub struct Function {
    pub name: String,
    /// Topic segment below the endpoint identifier, e.g. `light/set`.
    pub topic_suffix: String,
    /// Opaque token forwarded verbatim in every command payload.
    pub auth_token: String,
    #[serde(flatten)]
    pub kind: FunctionKind,
}

/// Interaction kind together with its kind-specific configuration.
///
/// The pairing is one enum so a function can never carry configuration
/// inconsistent with its kind. Serialized adjacently tagged, which keeps
/// the stored shape as a `kind` discriminant plus a `config` object:
///
/// ```json
/// { "kind": "toggle", "config": { "on_value": "1", "off_value": "0" } }
/// ```
///
/// `input` and `time` take their value from the operator at publish time
/// and store no configuration.
#[derive(Deserialize, Serialize, Clone, Debug, PartialEq, Eq)]
#[serde(tag = "kind", content = "config", rename_all = "lowercase")]
pub enum FunctionKind {
    Push { value: String },
    Toggle { on_value: String, off_value: String },
    Input,
    Time,
}

impl FunctionKind {
    pub fn label(&self) -> &'static str {
        match self {
            FunctionKind::Push { .. } => "push",
            FunctionKind::Toggle { .. } => "toggle",
            FunctionKind::Input => "input",
            FunctionKind::Time => "time",
        }
    }
}

impl fmt::Display for Function {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "{} ({})", self.name, self.kind.label())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn push_function() -> Function {
        Function {
            name: "Ceiling light".to_string(),
            topic_suffix: "light/set".to_string(),
            auth_token: "t0k3n".to_string(),
            kind: FunctionKind::Push {
                value: "on".to_string(),
            },
        }
    }

    #[test]
    fn function_serializes_with_kind_and_config_keys() {
        let json = serde_json::to_value(push_function()).expect("serialize");
        assert_eq!(json["kind"], "push");
        assert_eq!(json["config"]["value"], "on");
        assert_eq!(json["topic_suffix"], "light/set");
        assert_eq!(json["auth_token"], "t0k3n");
    }

    #[test]
    fn input_kind_stores_no_config() {
        let function = Function {
            name: "Dim level".to_string(),
            topic_suffix: "dim/set".to_string(),
            auth_token: String::new(),
            kind: FunctionKind::Input,
        };
        let json = serde_json::to_value(&function).expect("serialize");
        assert_eq!(json["kind"], "input");
        assert!(json.get("config").is_none());
    }

    #[test]
    fn tree_round_trips_through_json() {
        let tree = vec![Location {
            name: "Living room".to_string(),
            endpoints: vec![Endpoint {
                name: "Main controller".to_string(),
                identifier: "dev1".to_string(),
                functions: vec![
                    push_function(),
                    Function {
                        name: "Fan".to_string(),
                        topic_suffix: "fan/set".to_string(),
                        auth_token: "abc".to_string(),
                        kind: FunctionKind::Toggle {
                            on_value: "1".to_string(),
                            off_value: "0".to_string(),
                        },
                    },
                ],
            }],
        }];

        let json = serde_json::to_string(&tree).expect("serialize");
        let restored: Vec<Location> = serde_json::from_str(&json).expect("deserialize");
        assert_eq!(restored, tree);
    }
}
