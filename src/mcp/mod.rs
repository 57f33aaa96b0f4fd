//! MCP server exposing Zoho Projects tools.

mod http;
pub mod routes;
pub mod shape;
mod types;

pub use http::{create_router, run_http_server};
pub use types::*;

use rmcp::{
    handler::server::{tool::ToolRouter, wrapper::Parameters},
    model::{CallToolResult, Content, ServerInfo},
    tool, tool_handler, tool_router, ErrorData as McpError, ServerHandler, ServiceExt,
};

use crate::client::{ClientError, Endpoint, ZohoClient};

#[derive(Clone)]
pub struct ZohoMcpServer {
    client: ZohoClient,
    portal_id: String,
    tool_router: ToolRouter<Self>,
}

impl ZohoMcpServer {
    pub fn new(client: ZohoClient, portal_id: impl Into<String>) -> Self {
        Self {
            client,
            portal_id: portal_id.into(),
            tool_router: Self::tool_router(),
        }
    }

    /// Report a client failure to the caller as a tool error rather than a protocol error.
    fn tool_error(tool: &str, e: ClientError) -> CallToolResult {
        tracing::error!("{} failed: {}", tool, e);
        CallToolResult::error(vec![Content::text(format!(
            "{} failed ({}): {}",
            tool,
            e.kind(),
            e
        ))])
    }

    /// Dispatch `endpoint` and render the JSON response, optionally summarising lists.
    async fn call_json(
        &self,
        tool: &str,
        endpoint: Endpoint,
        summarize: bool,
    ) -> Result<CallToolResult, McpError> {
        let value = match self.client.dispatch(endpoint).await {
            Ok(value) => value,
            Err(e) => return Ok(Self::tool_error(tool, e)),
        };

        let value = if summarize {
            shape::project_minimal(value)
        } else {
            value
        };

        let content = shape::json_content(&value, &format!("{} completed", tool))
            .map_err(|e| McpError::internal_error(e.to_string(), None))?;

        Ok(CallToolResult::success(vec![content]))
    }

    async fn call_binary(&self, tool: &str, url: &str) -> Result<CallToolResult, McpError> {
        match self.client.fetch_binary(url).await {
            Ok(binary) => Ok(CallToolResult::success(vec![shape::binary_content(binary)])),
            Err(e) => Ok(Self::tool_error(tool, e)),
        }
    }
}

#[tool_router]
impl ZohoMcpServer {
    // ============================================================
    // Portals & Projects
    // ============================================================

    #[tool(
        description = "List the Zoho Projects portals the authenticated user belongs to. Use this to find the portal id if you are unsure which portal is configured."
    )]
    async fn list_portals(&self) -> Result<CallToolResult, McpError> {
        self.call_json("list_portals", routes::list_portals(), false).await
    }

    #[tool(
        description = "List projects in the configured portal. Returns a summary of each project (id, name, status, owner, dates) unless full=true. Supports page and per_page."
    )]
    async fn list_projects(
        &self,
        params: Parameters<ListProjectsRequest>,
    ) -> Result<CallToolResult, McpError> {
        let req = params.0;
        let endpoint = routes::list_projects(&self.portal_id, &req);
        self.call_json("list_projects", endpoint, !req.full).await
    }

    #[tool(description = "Get full details of a project by id.")]
    async fn get_project(
        &self,
        params: Parameters<ProjectRequest>,
    ) -> Result<CallToolResult, McpError> {
        let endpoint = routes::get_project(&self.portal_id, &params.0);
        self.call_json("get_project", endpoint, false).await
    }

    #[tool(description = "Create a new project in the configured portal.")]
    async fn create_project(
        &self,
        params: Parameters<CreateProjectRequest>,
    ) -> Result<CallToolResult, McpError> {
        let endpoint = routes::create_project(&self.portal_id, &params.0);
        self.call_json("create_project", endpoint, false).await
    }

    // ============================================================
    // Tasks
    // ============================================================

    #[tool(
        description = "List tasks in a project. Returns a summary of each task unless full=true. Supports page and per_page."
    )]
    async fn list_tasks(
        &self,
        params: Parameters<ListTasksRequest>,
    ) -> Result<CallToolResult, McpError> {
        let req = params.0;
        let endpoint = routes::list_tasks(&self.portal_id, &req);
        self.call_json("list_tasks", endpoint, !req.full).await
    }

    #[tool(
        description = "Get full details of a task, including its description. Inline images in the description can be fetched with get_image."
    )]
    async fn get_task(&self, params: Parameters<TaskRequest>) -> Result<CallToolResult, McpError> {
        let endpoint = routes::get_task(&self.portal_id, &params.0);
        self.call_json("get_task", endpoint, false).await
    }

    #[tool(
        description = "Create a task in a project. Optionally place it in a task list, set priority, dates and owners."
    )]
    async fn create_task(
        &self,
        params: Parameters<CreateTaskRequest>,
    ) -> Result<CallToolResult, McpError> {
        let endpoint = routes::create_task(&self.portal_id, &params.0);
        self.call_json("create_task", endpoint, false).await
    }

    #[tool(
        description = "Update a task. Only the fields you pass are changed. Use status_id to move the task to another status."
    )]
    async fn update_task(
        &self,
        params: Parameters<UpdateTaskRequest>,
    ) -> Result<CallToolResult, McpError> {
        let endpoint = routes::update_task(&self.portal_id, &params.0).ok_or_else(|| {
            McpError::invalid_params(
                "Nothing to update: pass at least one of name, description, priority, start_date, end_date, status_id",
                None,
            )
        })?;
        self.call_json("update_task", endpoint, false).await
    }

    #[tool(description = "Delete a task permanently.")]
    async fn delete_task(
        &self,
        params: Parameters<TaskRequest>,
    ) -> Result<CallToolResult, McpError> {
        let endpoint = routes::delete_task(&self.portal_id, &params.0);
        self.call_json("delete_task", endpoint, false).await
    }

    #[tool(description = "List comments on a task. Supports page and per_page.")]
    async fn list_task_comments(
        &self,
        params: Parameters<TaskCommentsRequest>,
    ) -> Result<CallToolResult, McpError> {
        let endpoint = routes::list_task_comments(&self.portal_id, &params.0);
        self.call_json("list_task_comments", endpoint, false).await
    }

    #[tool(description = "Add a comment to a task.")]
    async fn add_task_comment(
        &self,
        params: Parameters<AddTaskCommentRequest>,
    ) -> Result<CallToolResult, McpError> {
        let endpoint = routes::add_task_comment(&self.portal_id, &params.0);
        self.call_json("add_task_comment", endpoint, false).await
    }

    #[tool(
        description = "List the task lists of a project. Use the ids as tasklist_id when creating tasks."
    )]
    async fn list_tasklists(
        &self,
        params: Parameters<ProjectPageRequest>,
    ) -> Result<CallToolResult, McpError> {
        let endpoint = routes::project_collection(&self.portal_id, "tasklists", &params.0);
        self.call_json("list_tasklists", endpoint, false).await
    }

    #[tool(description = "List the milestones of a project.")]
    async fn list_milestones(
        &self,
        params: Parameters<ProjectPageRequest>,
    ) -> Result<CallToolResult, McpError> {
        let endpoint = routes::project_collection(&self.portal_id, "milestones", &params.0);
        self.call_json("list_milestones", endpoint, false).await
    }

    // ============================================================
    // Issues
    // ============================================================

    #[tool(
        description = "List issues (bugs) in a project. Returns a summary of each issue unless full=true. Supports page and per_page."
    )]
    async fn list_issues(
        &self,
        params: Parameters<ListIssuesRequest>,
    ) -> Result<CallToolResult, McpError> {
        let req = params.0;
        let endpoint = routes::list_issues(&self.portal_id, &req);
        self.call_json("list_issues", endpoint, !req.full).await
    }

    #[tool(description = "Get full details of an issue.")]
    async fn get_issue(
        &self,
        params: Parameters<IssueRequest>,
    ) -> Result<CallToolResult, McpError> {
        let endpoint = routes::get_issue(&self.portal_id, &params.0);
        self.call_json("get_issue", endpoint, false).await
    }

    #[tool(description = "Report a new issue in a project.")]
    async fn create_issue(
        &self,
        params: Parameters<CreateIssueRequest>,
    ) -> Result<CallToolResult, McpError> {
        let endpoint = routes::create_issue(&self.portal_id, &params.0);
        self.call_json("create_issue", endpoint, false).await
    }

    // ============================================================
    // People, Search & Files
    // ============================================================

    #[tool(
        description = "List the users of a project. Use their zpuid values as owner or assignee ids."
    )]
    async fn list_project_users(
        &self,
        params: Parameters<ProjectPageRequest>,
    ) -> Result<CallToolResult, McpError> {
        let endpoint = routes::project_collection(&self.portal_id, "users", &params.0);
        self.call_json("list_project_users", endpoint, false).await
    }

    #[tool(
        description = "Search the portal for projects, tasks, issues and more. Optionally restrict to one module."
    )]
    async fn search(&self, params: Parameters<SearchRequest>) -> Result<CallToolResult, McpError> {
        let endpoint = routes::search(&self.portal_id, &params.0);
        self.call_json("search", endpoint, false).await
    }

    #[tool(
        description = "Fetch an inline image referenced in a task or issue description and return it as image content. Only Zoho-hosted URLs are fetched."
    )]
    async fn get_image(
        &self,
        params: Parameters<DownloadRequest>,
    ) -> Result<CallToolResult, McpError> {
        self.call_binary("get_image", &params.0.url).await
    }

    #[tool(
        description = "Download a file attachment from a Zoho-hosted URL. Images are returned as image content, text files as text, anything else as base64 with its MIME type."
    )]
    async fn download_attachment(
        &self,
        params: Parameters<DownloadRequest>,
    ) -> Result<CallToolResult, McpError> {
        self.call_binary("download_attachment", &params.0.url).await
    }
}

#[tool_handler]
impl ServerHandler for ZohoMcpServer {
    fn get_info(&self) -> ServerInfo {
        ServerInfo {
            server_info: rmcp::model::Implementation {
                name: "zoho-projects-mcp".into(),
                version: env!("CARGO_PKG_VERSION").into(),
                title: None,
                icons: None,
                website_url: None,
            },
            capabilities: rmcp::model::ServerCapabilities::builder()
                .enable_tools()
                .build(),
            instructions: Some(
                r#"Tools for reading and updating Zoho Projects.

DISCOVERY:
- list_projects: find project ids
- list_tasks / list_issues: browse work in a project (summaries; pass full=true for everything)
- get_task / get_issue: full details of one item
- search: find anything in the portal by text

CHANGES:
- create_task, update_task, delete_task, add_task_comment
- create_issue, create_project

LOOKUPS:
- list_tasklists: ids for create_task's tasklist_id
- list_project_users: zpuid values for owners and assignees
- list_milestones

FILES:
- get_image: fetch an image URL found in a description
- download_attachment: fetch an attachment URL

Paged tools accept page (from 1) and per_page (up to 100). Authentication is handled by the server; if a tool reports missing_credential or refresh_failed, the server's Zoho credentials need fixing."#
                    .into(),
            ),
            ..Default::default()
        }
    }
}

pub async fn run_stdio_server(client: ZohoClient, portal_id: String) -> anyhow::Result<()> {
    use tokio::io::{stdin, stdout};

    tracing::info!("Starting MCP server via stdio");

    let service = ZohoMcpServer::new(client, portal_id);
    let server = service.serve((stdin(), stdout())).await?;

    let quit_reason = server.waiting().await?;
    tracing::info!("MCP server stopped: {:?}", quit_reason);

    Ok(())
}
