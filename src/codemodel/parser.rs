use serde::Deserialize;
use serde_json::Value;
use tracing::debug;

use crate::codemodel::error::{AggregatedError, ResponseError};
use crate::codemodel::model::{Configuration, ProjectModel, Target, TargetType};
use crate::fileapi::{CLIENT_ID, ReplyLoader};

#[derive(Debug, Deserialize)]
struct ResponseRef {
    kind: String,
    #[serde(rename = "jsonFile")]
    json_file: String,
}

#[derive(Debug, Deserialize)]
struct CodemodelDoc {
    configurations: Vec<ConfigurationDoc>,
}

#[derive(Debug, Deserialize)]
struct ConfigurationDoc {
    name: String,
    #[serde(default)]
    targets: Vec<TargetRef>,
}

#[derive(Debug, Deserialize)]
struct TargetRef {
    #[serde(rename = "jsonFile")]
    json_file: String,
}

#[derive(Debug, Deserialize)]
struct TargetDoc {
    name: String,
    #[serde(rename = "type")]
    kind: String,
    #[serde(rename = "nameOnDisk", default)]
    name_on_disk: Option<String>,
    #[serde(default)]
    artifacts: Vec<ArtifactRef>,
}

#[derive(Debug, Deserialize)]
struct ArtifactRef {
    path: String,
}

/// Generator name recorded in the reply index, when CMake wrote one.
pub fn generator_name(index: &Value) -> Option<String> {
    index["cmake"]["generator"]["name"]
        .as_str()
        .map(str::to_string)
}

/// Translate a reply index into the normalized project model.
///
/// Every response in the index is handled independently: a failure in one is
/// recorded and the rest are still processed, so a single malformed document
/// reports one aggregated error instead of hiding the others. Response kinds
/// with no handler are skipped (newer CMake versions may answer with kinds
/// this tool never asked for).
pub fn parse(index: &Value, loader: &dyn ReplyLoader) -> Result<ProjectModel, AggregatedError> {
    let mut model = ProjectModel {
        generator: generator_name(index),
        ..ProjectModel::default()
    };
    let mut errors = Vec::new();

    match responses(index) {
        Ok(list) => {
            for raw in list {
                let response: ResponseRef = match serde_json::from_value(raw.clone()) {
                    Ok(response) => response,
                    Err(e) => {
                        errors.push(ResponseError::Malformed {
                            kind: "index",
                            reason: e.to_string(),
                        });
                        continue;
                    }
                };
                match response.kind.as_str() {
                    "codemodel" => {
                        if let Err(e) = handle_codemodel(&response, loader, &mut model) {
                            errors.push(e);
                        }
                    }
                    other => {
                        debug!(kind = other, "no response handler installed");
                    }
                }
            }
        }
        Err(e) => errors.push(e),
    }

    if errors.is_empty() {
        Ok(model)
    } else {
        Err(AggregatedError { errors })
    }
}

fn responses(index: &Value) -> Result<&Vec<Value>, ResponseError> {
    index["reply"][CLIENT_ID]["query.json"]["responses"]
        .as_array()
        .ok_or_else(|| ResponseError::Malformed {
            kind: "index",
            reason: format!("no responses recorded for {CLIENT_ID}"),
        })
}

fn handle_codemodel(
    response: &ResponseRef,
    loader: &dyn ReplyLoader,
    model: &mut ProjectModel,
) -> Result<(), ResponseError> {
    let raw = loader
        .load(&response.json_file)
        .map_err(|source| ResponseError::Load {
            json_file: response.json_file.clone(),
            source,
        })?;
    let doc: CodemodelDoc =
        serde_json::from_value(raw).map_err(|e| ResponseError::Malformed {
            kind: "codemodel",
            reason: e.to_string(),
        })?;

    for configuration in doc.configurations {
        // Single-configuration generators report an empty name unless
        // CMAKE_BUILD_TYPE was set.
        let name = if configuration.name.is_empty() {
            "Default".to_string()
        } else {
            configuration.name
        };
        let mut targets = Vec::new();
        for target_ref in configuration.targets {
            targets.push(load_target(&target_ref, loader, &name)?);
        }
        model.configurations.push(Configuration { name, targets });
    }
    Ok(())
}

fn load_target(
    target_ref: &TargetRef,
    loader: &dyn ReplyLoader,
    config: &str,
) -> Result<Target, ResponseError> {
    let raw = loader
        .load(&target_ref.json_file)
        .map_err(|source| ResponseError::Load {
            json_file: target_ref.json_file.clone(),
            source,
        })?;
    let doc: TargetDoc = serde_json::from_value(raw).map_err(|e| ResponseError::Malformed {
        kind: "target",
        reason: e.to_string(),
    })?;
    debug!(target = %doc.name, config, "parsed target");
    Ok(Target {
        name: doc.name,
        kind: TargetType::from_reply(&doc.kind),
        name_on_disk: doc.name_on_disk,
        artifacts: doc.artifacts.into_iter().map(|a| a.path).collect(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fileapi::FileApiError;
    use serde_json::json;
    use std::collections::HashMap;

    struct MapLoader(HashMap<String, Value>);

    impl MapLoader {
        fn new(entries: &[(&str, Value)]) -> Self {
            Self(
                entries
                    .iter()
                    .map(|(k, v)| (k.to_string(), v.clone()))
                    .collect(),
            )
        }
    }

    impl ReplyLoader for MapLoader {
        fn load(&self, relative: &str) -> Result<Value, FileApiError> {
            self.0.get(relative).cloned().ok_or(FileApiError::NotFound {
                path: relative.to_string(),
            })
        }
    }

    fn index_with_responses(responses: Value) -> Value {
        json!({
            "cmake": {"generator": {"name": "Ninja"}},
            "reply": {CLIENT_ID: {"query.json": {"responses": responses}}}
        })
    }

    #[test]
    fn parses_configurations_and_targets() {
        let index = index_with_responses(json!([
            {"kind": "codemodel", "jsonFile": "codemodel-v2.json"}
        ]));
        let loader = MapLoader::new(&[
            (
                "codemodel-v2.json",
                json!({"configurations": [
                    {"name": "Debug", "targets": [
                        {"jsonFile": "target-app.json"},
                        {"jsonFile": "target-lib.json"}
                    ]}
                ]}),
            ),
            (
                "target-app.json",
                json!({"name": "app", "type": "EXECUTABLE", "nameOnDisk": "app",
                       "artifacts": [{"path": "bin/app"}]}),
            ),
            (
                "target-lib.json",
                json!({"name": "lib", "type": "STATIC_LIBRARY", "nameOnDisk": "liblib.a",
                       "artifacts": [{"path": "lib/liblib.a"}]}),
            ),
        ]);

        let model = parse(&index, &loader).unwrap();
        assert_eq!(model.generator.as_deref(), Some("Ninja"));
        assert_eq!(model.configurations.len(), 1);
        let config = &model.configurations[0];
        assert_eq!(config.name, "Debug");
        assert_eq!(config.targets.len(), 2);
        assert_eq!(config.targets[0].name, "app");
        assert_eq!(config.targets[0].kind, TargetType::Executable);
        assert_eq!(config.targets[0].artifacts, vec!["bin/app".to_string()]);
        assert_eq!(config.targets[1].name, "lib");
    }

    #[test]
    fn empty_configuration_name_becomes_default() {
        let index = index_with_responses(json!([
            {"kind": "codemodel", "jsonFile": "codemodel-v2.json"}
        ]));
        let loader = MapLoader::new(&[(
            "codemodel-v2.json",
            json!({"configurations": [{"name": "", "targets": []}]}),
        )]);

        let model = parse(&index, &loader).unwrap();
        assert_eq!(model.configurations[0].name, "Default");
    }

    #[test]
    fn unknown_response_kind_is_skipped() {
        let index = index_with_responses(json!([
            {"kind": "toolchains", "jsonFile": "toolchains-v1.json"},
            {"kind": "codemodel", "jsonFile": "codemodel-v2.json"}
        ]));
        let loader = MapLoader::new(&[(
            "codemodel-v2.json",
            json!({"configurations": [{"name": "Release", "targets": []}]}),
        )]);

        let model = parse(&index, &loader).unwrap();
        assert_eq!(model.configurations.len(), 1);
        assert_eq!(model.configurations[0].name, "Release");
    }

    #[test]
    fn missing_target_document_fails_the_parse() {
        let index = index_with_responses(json!([
            {"kind": "codemodel", "jsonFile": "codemodel-v2.json"}
        ]));
        let loader = MapLoader::new(&[(
            "codemodel-v2.json",
            json!({"configurations": [
                {"name": "Debug", "targets": [{"jsonFile": "target-gone.json"}]}
            ]}),
        )]);

        let error = parse(&index, &loader).unwrap_err();
        assert_eq!(error.errors.len(), 1);
        assert!(matches!(&error.errors[0], ResponseError::Load { json_file, .. }
            if json_file == "target-gone.json"));
    }

    #[test]
    fn malformed_index_structure_is_reported() {
        let index = json!({"reply": {}});
        let error = parse(&index, &MapLoader::new(&[])).unwrap_err();
        assert!(matches!(
            &error.errors[0],
            ResponseError::Malformed { kind: "index", .. }
        ));
    }

    #[test]
    fn one_bad_response_does_not_hide_the_rest() {
        let index = index_with_responses(json!([
            {"kind": "codemodel", "jsonFile": "missing.json"},
            {"kind": "codemodel", "jsonFile": "codemodel-v2.json"}
        ]));
        let loader = MapLoader::new(&[(
            "codemodel-v2.json",
            json!({"configurations": "not a list"}),
        )]);

        let error = parse(&index, &loader).unwrap_err();
        assert_eq!(error.errors.len(), 2);
    }

    #[test]
    fn generator_name_absent_when_index_lacks_it() {
        assert_eq!(generator_name(&json!({})), None);
        let index = json!({"cmake": {"generator": {"name": "Unix Makefiles"}}});
        assert_eq!(generator_name(&index).as_deref(), Some("Unix Makefiles"));
    }
}
