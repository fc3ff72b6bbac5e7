use serde::{Deserialize, Serialize};

/// Stable client identifier; queries and replies for this tool live under
/// `.cmake/api/v1/{query,reply}/<CLIENT_ID>/`.
pub const CLIENT_ID: &str = "client-cmake-builder";

/// The query descriptor staged before every configure invocation.
///
/// Written once per cycle and never mutated afterwards; CMake answers with
/// one reply document per requested kind.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Query {
    pub requests: Vec<QueryRequest>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct QueryRequest {
    pub kind: String,
    pub version: u32,
}

impl Default for Query {
    fn default() -> Self {
        Self {
            requests: vec![QueryRequest {
                kind: "codemodel".to_string(),
                version: 2,
            }],
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn query_round_trips_through_json() {
        let query = Query::default();
        let json = serde_json::to_string(&query).unwrap();
        let parsed: Query = serde_json::from_str(&json).unwrap();
        assert_eq!(query, parsed);
    }

    #[test]
    fn query_wire_shape_is_fixed() {
        let json = serde_json::to_value(Query::default()).unwrap();
        assert_eq!(
            json,
            serde_json::json!({"requests": [{"kind": "codemodel", "version": 2}]})
        );
    }
}
