//! Tool provider for the PowerSchool MCP server
//!
//! Every tool wraps one API client call and converts its outcome into a
//! tagged envelope: `{"success": true, "data": ...}` on success and
//! `{"success": false, "error": ...}` on failure. Client errors never escape
//! past this boundary; only an unknown tool name is reported as an MCP error.

use std::sync::Arc;

use pulseengine_mcp_protocol::{Content, Tool};
use serde_json::{json, Value};
use tracing::{debug, error};

use powerschool_mcp_shared::{PowerSchoolClient, PowerSchoolError, Result};

pub struct ToolProvider {
    client: Arc<PowerSchoolClient>,
}

impl ToolProvider {
    pub fn new(client: Arc<PowerSchoolClient>) -> Self {
        Self { client }
    }

    pub fn list_tools(&self) -> Vec<Tool> {
        vec![
            Tool {
                name: "get_student_info".to_string(),
                description:
                    "Get current student information including name, grade level, school, and student ID"
                        .to_string(),
                input_schema: json!({
                    "type": "object",
                    "required": []
                }),
                output_schema: None,
            },
            Tool {
                name: "get_current_grades".to_string(),
                description: "Get current grades for all courses".to_string(),
                input_schema: json!({
                    "type": "object",
                    "required": []
                }),
                output_schema: None,
            },
            Tool {
                name: "get_assignments".to_string(),
                description: "Get list of assignments, optionally filtered by course section ID"
                    .to_string(),
                input_schema: json!({
                    "type": "object",
                    "properties": {
                        "section_id": {
                            "type": "integer",
                            "description": "Optional course section ID to filter assignments for a specific class"
                        }
                    },
                    "required": []
                }),
                output_schema: None,
            },
            Tool {
                name: "get_grade_history".to_string(),
                description: "Get historical grade data with optional date range filtering"
                    .to_string(),
                input_schema: json!({
                    "type": "object",
                    "properties": {
                        "start_date": {
                            "type": "string",
                            "description": "Optional start date in YYYY-MM-DD format"
                        },
                        "end_date": {
                            "type": "string",
                            "description": "Optional end date in YYYY-MM-DD format"
                        }
                    },
                    "required": []
                }),
                output_schema: None,
            },
            Tool {
                name: "get_courses".to_string(),
                description: "Get list of current courses/sections the student is enrolled in"
                    .to_string(),
                input_schema: json!({
                    "type": "object",
                    "required": []
                }),
                output_schema: None,
            },
            Tool {
                name: "get_attendance".to_string(),
                description: "Get student attendance records".to_string(),
                input_schema: json!({
                    "type": "object",
                    "required": []
                }),
                output_schema: None,
            },
            Tool {
                name: "get_server_info".to_string(),
                description: "Get server status and configuration check".to_string(),
                input_schema: json!({
                    "type": "object",
                    "required": []
                }),
                output_schema: None,
            },
        ]
    }

    pub async fn call_tool(&self, name: &str, arguments: Option<Value>) -> Result<Vec<Content>> {
        debug!("Calling tool: {} with args: {:?}", name, arguments);
        let args = arguments.unwrap_or(Value::Object(serde_json::Map::new()));

        match name {
            "get_student_info" => self.get_student_info().await,
            "get_current_grades" => self.get_current_grades().await,
            "get_assignments" => self.get_assignments(args).await,
            "get_grade_history" => self.get_grade_history(args).await,
            "get_courses" => self.get_courses().await,
            "get_attendance" => self.get_attendance().await,
            "get_server_info" => self.get_server_info(),
            _ => {
                error!("Unknown tool: {}", name);
                Err(PowerSchoolError::InvalidOperation(format!(
                    "Tool '{name}' not found"
                )))
            }
        }
    }

    async fn get_student_info(&self) -> Result<Vec<Content>> {
        let response = match self.client.get_student_info().await {
            Ok(data) => json!({
                "success": true,
                "data": data
            }),
            Err(e) => failure_envelope("Failed to retrieve student information", e),
        };
        text_content(&response)
    }

    async fn get_current_grades(&self) -> Result<Vec<Content>> {
        let response = match self.client.get_grades().await {
            Ok(data) => json!({
                "success": true,
                "data": data
            }),
            Err(e) => failure_envelope("Failed to retrieve current grades", e),
        };
        text_content(&response)
    }

    async fn get_assignments(&self, args: Value) -> Result<Vec<Content>> {
        let section_id = args.get("section_id").and_then(|v| v.as_i64());

        let response = match self.client.get_assignments(section_id).await {
            Ok(data) => json!({
                "success": true,
                "data": data,
                "section_id": section_id
            }),
            Err(e) => failure_envelope("Failed to retrieve assignments", e),
        };
        text_content(&response)
    }

    async fn get_grade_history(&self, args: Value) -> Result<Vec<Content>> {
        let start_date = args.get("start_date").and_then(|v| v.as_str());
        let end_date = args.get("end_date").and_then(|v| v.as_str());

        let response = match self.client.get_grade_history(start_date, end_date).await {
            Ok(data) => json!({
                "success": true,
                "data": data,
                "start_date": start_date,
                "end_date": end_date
            }),
            Err(e) => failure_envelope("Failed to retrieve grade history", e),
        };
        text_content(&response)
    }

    async fn get_courses(&self) -> Result<Vec<Content>> {
        let response = match self.client.get_courses().await {
            Ok(data) => json!({
                "success": true,
                "data": data
            }),
            Err(e) => failure_envelope("Failed to retrieve courses", e),
        };
        text_content(&response)
    }

    async fn get_attendance(&self) -> Result<Vec<Content>> {
        let response = match self.client.get_attendance().await {
            Ok(data) => json!({
                "success": true,
                "data": data
            }),
            Err(e) => failure_envelope("Failed to retrieve attendance records", e),
        };
        text_content(&response)
    }

    fn get_server_info(&self) -> Result<Vec<Content>> {
        let configuration = self.client.config().status();
        let configured = ["powerschool_url_set", "client_id_set", "client_secret_set"]
            .iter()
            .all(|key| configuration[key].as_bool().unwrap_or(false));

        let info = json!({
            "server_name": "PowerSchool MCP Server",
            "version": env!("CARGO_PKG_VERSION"),
            "configuration": configuration,
            "configured": configured
        });
        text_content(&info)
    }
}

fn failure_envelope(message: &str, e: PowerSchoolError) -> Value {
    error!("{}: {}", message, e);
    json!({
        "success": false,
        "error": e.to_string()
    })
}

fn text_content(value: &Value) -> Result<Vec<Content>> {
    Ok(vec![Content::Text {
        text: serde_json::to_string_pretty(value)?,
    }])
}

#[cfg(test)]
mod tests {
    use super::*;
    use powerschool_mcp_shared::PowerSchoolConfig;
    use wiremock::matchers::{method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn provider_for(base_url: &str) -> ToolProvider {
        let config =
            PowerSchoolConfig::new(base_url, "test-client-id", "test-client-secret", None, None)
                .unwrap();
        ToolProvider::new(Arc::new(PowerSchoolClient::new(config).unwrap()))
    }

    fn envelope_of(content: &[Content]) -> Value {
        match content {
            [Content::Text { text }] => serde_json::from_str(text).unwrap(),
            other => panic!("expected one text content, got {other:?}"),
        }
    }

    async fn mount_token_endpoint(server: &MockServer) {
        Mock::given(method("POST"))
            .and(path("/oauth/access_token"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "access_token": "abc123",
                "expires_in": 3600
            })))
            .mount(server)
            .await;
    }

    #[test]
    fn all_tools_are_listed() {
        let provider = provider_for("https://sis.example.test");
        let names: Vec<String> = provider.list_tools().into_iter().map(|t| t.name).collect();
        assert_eq!(
            names,
            vec![
                "get_student_info",
                "get_current_grades",
                "get_assignments",
                "get_grade_history",
                "get_courses",
                "get_attendance",
                "get_server_info"
            ]
        );
    }

    #[tokio::test]
    async fn unknown_tool_is_an_invalid_operation() {
        let provider = provider_for("https://sis.example.test");
        let err = provider.call_tool("get_lunch_menu", None).await.unwrap_err();
        assert!(
            matches!(err, PowerSchoolError::InvalidOperation(_)),
            "got {err:?}"
        );
    }

    #[tokio::test]
    async fn successful_call_returns_a_success_envelope() {
        let server = MockServer::start().await;
        mount_token_endpoint(&server).await;
        Mock::given(method("GET"))
            .and(path("/ws/v1/student/grades"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({"grades": [90, 85]})))
            .mount(&server)
            .await;

        let provider = provider_for(&server.uri());
        let content = provider.call_tool("get_current_grades", None).await.unwrap();

        let envelope = envelope_of(&content);
        assert_eq!(envelope["success"], true);
        assert_eq!(envelope["data"]["grades"][0], 90);
    }

    #[tokio::test]
    async fn client_failure_becomes_a_failure_envelope_not_an_error() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/oauth/access_token"))
            .respond_with(ResponseTemplate::new(401))
            .mount(&server)
            .await;

        let provider = provider_for(&server.uri());
        let content = provider.call_tool("get_attendance", None).await.unwrap();

        let envelope = envelope_of(&content);
        assert_eq!(envelope["success"], false);
        assert!(envelope["error"].as_str().unwrap().contains("Authentication"));
    }

    #[tokio::test]
    async fn assignments_section_argument_is_forwarded() {
        let server = MockServer::start().await;
        mount_token_endpoint(&server).await;
        Mock::given(method("GET"))
            .and(path("/ws/v1/student/assignments/section/42"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!([])))
            .expect(1)
            .mount(&server)
            .await;

        let provider = provider_for(&server.uri());
        let content = provider
            .call_tool("get_assignments", Some(json!({"section_id": 42})))
            .await
            .unwrap();

        let envelope = envelope_of(&content);
        assert_eq!(envelope["success"], true);
        assert_eq!(envelope["section_id"], 42);
    }

    #[tokio::test]
    async fn grade_history_echoes_the_requested_range() {
        let server = MockServer::start().await;
        mount_token_endpoint(&server).await;
        Mock::given(method("GET"))
            .and(path("/ws/v1/student/grades/history"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({})))
            .mount(&server)
            .await;

        let provider = provider_for(&server.uri());
        let content = provider
            .call_tool(
                "get_grade_history",
                Some(json!({"start_date": "2024-01-01", "end_date": "2024-06-01"})),
            )
            .await
            .unwrap();

        let envelope = envelope_of(&content);
        assert_eq!(envelope["success"], true);
        assert_eq!(envelope["start_date"], "2024-01-01");
        assert_eq!(envelope["end_date"], "2024-06-01");
    }

    #[tokio::test]
    async fn server_info_reports_configuration_without_secrets() {
        let provider = provider_for("https://sis.example.test");
        let content = provider.call_tool("get_server_info", None).await.unwrap();

        let info = envelope_of(&content);
        assert_eq!(info["server_name"], "PowerSchool MCP Server");
        assert_eq!(info["configured"], true);
        assert_eq!(info["configuration"]["username_set"], false);
        assert!(info["configuration"].get("client_secret").is_none());
    }
}
