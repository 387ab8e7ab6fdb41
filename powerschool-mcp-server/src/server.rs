//! MCP server implementation using the PulseEngine MCP framework

use std::sync::Arc;

use async_trait::async_trait;
use tracing::debug;

use pulseengine_mcp_protocol::*;
use pulseengine_mcp_server::{McpBackend, McpServer, ServerConfig};

use powerschool_mcp_shared::{PowerSchoolClient, PowerSchoolConfig, PowerSchoolError, Result};

use crate::tools::ToolProvider;

pub struct PowerSchoolMcpServer {
    tool_provider: Arc<ToolProvider>,
}

impl PowerSchoolMcpServer {
    pub fn new(config: PowerSchoolConfig) -> Result<Self> {
        let client = Arc::new(PowerSchoolClient::new(config)?);
        let tool_provider = Arc::new(ToolProvider::new(client));

        Ok(Self { tool_provider })
    }

    pub async fn run(self) -> Result<()> {
        let backend = PowerSchoolBackend {
            inner: Arc::new(self),
        };

        // stdio transport with the framework defaults
        let server_config = ServerConfig::default();
        let mut server = McpServer::new(backend, server_config)
            .await
            .map_err(|e| PowerSchoolError::Mcp(format!("Failed to create server: {e}")))?;

        server
            .run()
            .await
            .map_err(|e| PowerSchoolError::Mcp(format!("Server run error: {e}")))
    }
}

#[derive(Clone)]
struct PowerSchoolBackend {
    inner: Arc<PowerSchoolMcpServer>,
}

#[async_trait]
impl McpBackend for PowerSchoolBackend {
    type Config = ();
    type Error = PowerSchoolError;

    async fn initialize(_: Self::Config) -> std::result::Result<Self, Self::Error> {
        Err(PowerSchoolError::Config(
            "Use PowerSchoolMcpServer::new() instead".to_string(),
        ))
    }

    fn get_server_info(&self) -> ServerInfo {
        ServerInfo {
            protocol_version: ProtocolVersion::default(),
            server_info: Implementation {
                name: "powerschool-mcp-server".to_string(),
                version: env!("CARGO_PKG_VERSION").to_string(),
            },
            capabilities: ServerCapabilities {
                resources: None,
                tools: Some(ToolsCapability { list_changed: None }),
                prompts: None,
                sampling: None,
                ..Default::default()
            },
            instructions: Some(
                "PowerSchool MCP Server exposing student information, grades, assignments, \
                 courses and attendance as tools."
                    .to_string(),
            ),
        }
    }

    async fn list_tools(
        &self,
        _params: PaginatedRequestParam,
    ) -> std::result::Result<ListToolsResult, Self::Error> {
        debug!("Listing tools");

        let tools = self.inner.tool_provider.list_tools();

        debug!("Found {} tools", tools.len());
        Ok(ListToolsResult {
            tools,
            next_cursor: None,
        })
    }

    async fn call_tool(
        &self,
        params: CallToolRequestParam,
    ) -> std::result::Result<CallToolResult, Self::Error> {
        debug!("Calling tool: {}", params.name);

        let content = self
            .inner
            .tool_provider
            .call_tool(&params.name, params.arguments)
            .await?;

        debug!("Successfully called tool: {}", params.name);
        Ok(CallToolResult {
            content,
            is_error: Some(false),
            structured_content: None,
        })
    }

    async fn list_resources(
        &self,
        _params: PaginatedRequestParam,
    ) -> std::result::Result<ListResourcesResult, Self::Error> {
        Ok(ListResourcesResult {
            resources: Vec::new(),
            next_cursor: None,
        })
    }

    async fn read_resource(
        &self,
        params: ReadResourceRequestParam,
    ) -> std::result::Result<ReadResourceResult, Self::Error> {
        Err(PowerSchoolError::InvalidOperation(format!(
            "Resource '{}' not found",
            params.uri
        )))
    }

    async fn health_check(&self) -> std::result::Result<(), Self::Error> {
        Ok(())
    }

    async fn list_prompts(
        &self,
        _params: PaginatedRequestParam,
    ) -> std::result::Result<ListPromptsResult, Self::Error> {
        Ok(ListPromptsResult {
            prompts: Vec::new(),
            next_cursor: None,
        })
    }

    async fn get_prompt(
        &self,
        params: GetPromptRequestParam,
    ) -> std::result::Result<GetPromptResult, Self::Error> {
        Err(PowerSchoolError::InvalidOperation(format!(
            "Prompt '{}' not found",
            params.name
        )))
    }
}
