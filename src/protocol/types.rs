//! Wire types: data request and result envelope.

use crate::database::result::{CellValue, QueryResult};
use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Request consumed by the handler, transport-agnostic.
///
/// Every field is defaulted so partial requests still decode; missing
/// pieces surface as adapter errors downstream rather than decode errors.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct DataRequest {
    pub command: String,
    pub database: String,
    pub connection_string: String,
    pub query_string: String,
}

impl DataRequest {
    pub fn command(&self) -> DataCommand {
        DataCommand::parse(&self.command)
    }
}

/// Commands the handler dispatches on.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DataCommand {
    ListSupportedAdapters,
    TestConnection,
    Execute,
}

impl DataCommand {
    /// Any command that is neither an adapter listing nor a connection
    /// test executes the query string.
    pub fn parse(s: &str) -> Self {
        match s {
            "GetSupportedAdapters" | "ListSupportedAdapters" => Self::ListSupportedAdapters,
            "TestConnection" => Self::TestConnection,
            _ => Self::Execute,
        }
    }
}

/// Uniform result envelope for every operation.
///
/// `success == false` implies `message` is present; absent fields are
/// omitted from the serialized JSON entirely.
#[derive(Debug, Clone, Default, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DataResponse {
    pub success: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub count: Option<usize>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub columns: Option<Vec<String>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub types: Option<Vec<String>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub rows: Option<Vec<Vec<CellValue>>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub handler_version: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub adapter_version: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub check_version: Option<bool>,
}

impl DataResponse {
    pub fn ok() -> Self {
        Self {
            success: true,
            ..Self::default()
        }
    }

    pub fn error(message: impl Into<String>) -> Self {
        Self {
            success: false,
            message: Some(message.into()),
            ..Self::default()
        }
    }

    /// Listing of supported database identifiers.
    pub fn adapter_list(types: Vec<String>) -> Self {
        Self {
            success: true,
            types: Some(types),
            ..Self::default()
        }
    }

    pub fn from_query_result(result: QueryResult) -> Self {
        Self {
            success: true,
            count: Some(result.count),
            columns: Some(result.columns),
            types: Some(
                result
                    .types
                    .iter()
                    .map(|logical| logical.as_str().to_string())
                    .collect(),
            ),
            rows: Some(result.rows),
            ..Self::default()
        }
    }

    pub fn with_handler_version(mut self, version: &str) -> Self {
        self.handler_version = Some(version.to_string());
        self
    }

    pub fn with_versions(mut self, handler: &str, adapter: &str, check_version: bool) -> Self {
        self.handler_version = Some(handler.to_string());
        self.adapter_version = Some(adapter.to_string());
        self.check_version = Some(check_version);
        self
    }

    /// Serialized form, for transports and logging.
    pub fn to_json(&self) -> Value {
        serde_json::to_value(self).unwrap_or_else(|error| {
            serde_json::json!({ "success": false, "message": error.to_string() })
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::database::types::LogicalType;

    #[test]
    fn test_request_decoding() {
        let json = r#"{
            "command": "ExecuteQuery",
            "database": "PostgreSQL",
            "connectionString": "pgsql:host=x",
            "queryString": "SELECT 1"
        }"#;
        let request: DataRequest = serde_json::from_str(json).unwrap();
        assert_eq!(request.command(), DataCommand::Execute);
        assert_eq!(request.database, "PostgreSQL");
        assert_eq!(request.connection_string, "pgsql:host=x");
    }

    #[test]
    fn test_partial_request_decodes() {
        let request: DataRequest = serde_json::from_str(r#"{"command":"TestConnection"}"#).unwrap();
        assert_eq!(request.command(), DataCommand::TestConnection);
        assert!(request.database.is_empty());
    }

    #[test]
    fn test_command_parsing() {
        assert_eq!(
            DataCommand::parse("GetSupportedAdapters"),
            DataCommand::ListSupportedAdapters
        );
        assert_eq!(
            DataCommand::parse("ListSupportedAdapters"),
            DataCommand::ListSupportedAdapters
        );
        assert_eq!(DataCommand::parse("TestConnection"), DataCommand::TestConnection);
        assert_eq!(DataCommand::parse("Execute"), DataCommand::Execute);
        assert_eq!(DataCommand::parse("anything else"), DataCommand::Execute);
    }

    #[test]
    fn test_error_envelope_shape() {
        let json = DataResponse::error("[08006] unreachable").to_json();
        assert_eq!(json["success"], false);
        assert_eq!(json["message"], "[08006] unreachable");
        assert!(json.get("rows").is_none());
        assert!(json.get("count").is_none());
    }

    #[test]
    fn test_success_envelope_omits_message() {
        let result = QueryResult::new(
            vec!["one".into()],
            vec![LogicalType::Int],
            vec![vec![CellValue::Int(1)]],
        );
        let json = DataResponse::from_query_result(result)
            .with_versions("1.0.0", "1.0.0", true)
            .to_json();

        assert_eq!(json["success"], true);
        assert!(json.get("message").is_none());
        assert_eq!(json["count"], 1);
        assert_eq!(json["columns"][0], "one");
        assert_eq!(json["types"][0], "int");
        assert_eq!(json["rows"][0][0], 1);
        assert_eq!(json["handlerVersion"], "1.0.0");
        assert_eq!(json["checkVersion"], true);
    }

    #[test]
    fn test_adapter_list_envelope() {
        let json = DataResponse::adapter_list(vec!["MySQL".into(), "ODBC".into()]).to_json();
        assert_eq!(json["success"], true);
        assert_eq!(json["types"][0], "MySQL");
        assert_eq!(json["types"][1], "ODBC");
    }
}
