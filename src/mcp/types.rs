//! Request types for MCP tools.

use rmcp::schemars::JsonSchema;
use serde::Deserialize;
use serde_json::{Map, Value};

// ============================================================
// Projects
// ============================================================

#[derive(Debug, Default, Deserialize, JsonSchema)]
pub struct ListProjectsRequest {
    #[schemars(description = "Page number, starting at 1")]
    #[serde(default)]
    pub page: Option<u32>,
    #[schemars(description = "Records per page (Zoho allows up to 100)")]
    #[serde(default)]
    pub per_page: Option<u32>,
    #[schemars(
        description = "Return every field Zoho sends. Defaults to false, which keeps only id, name, status, owner and dates."
    )]
    #[serde(default)]
    pub full: bool,
}

#[derive(Debug, Deserialize, JsonSchema)]
pub struct ProjectRequest {
    #[schemars(description = "The Zoho project id")]
    pub project_id: String,
}

#[derive(Debug, Deserialize, JsonSchema)]
pub struct CreateProjectRequest {
    #[schemars(description = "Project name")]
    pub name: String,
    #[schemars(description = "Project description (HTML allowed)")]
    #[serde(default)]
    pub description: Option<String>,
    #[schemars(description = "Start date, YYYY-MM-DD")]
    #[serde(default)]
    pub start_date: Option<String>,
    #[schemars(description = "End date, YYYY-MM-DD")]
    #[serde(default)]
    pub end_date: Option<String>,
}

impl CreateProjectRequest {
    pub fn body(&self) -> Value {
        let mut body = Map::new();
        body.insert("name".into(), Value::String(self.name.clone()));
        insert_opt(&mut body, "description", &self.description);
        insert_opt(&mut body, "start_date", &self.start_date);
        insert_opt(&mut body, "end_date", &self.end_date);
        Value::Object(body)
    }
}

/// Paged listing scoped to one project (tasklists, milestones, users).
#[derive(Debug, Deserialize, JsonSchema)]
pub struct ProjectPageRequest {
    #[schemars(description = "The Zoho project id")]
    pub project_id: String,
    #[schemars(description = "Page number, starting at 1")]
    #[serde(default)]
    pub page: Option<u32>,
    #[schemars(description = "Records per page (Zoho allows up to 100)")]
    #[serde(default)]
    pub per_page: Option<u32>,
}

// ============================================================
// Tasks
// ============================================================

#[derive(Debug, Deserialize, JsonSchema)]
pub struct ListTasksRequest {
    #[schemars(description = "The Zoho project id")]
    pub project_id: String,
    #[schemars(description = "Page number, starting at 1")]
    #[serde(default)]
    pub page: Option<u32>,
    #[schemars(description = "Records per page (Zoho allows up to 100)")]
    #[serde(default)]
    pub per_page: Option<u32>,
    #[schemars(description = "Return every field Zoho sends instead of a summary")]
    #[serde(default)]
    pub full: bool,
}

#[derive(Debug, Deserialize, JsonSchema)]
pub struct TaskRequest {
    #[schemars(description = "The Zoho project id")]
    pub project_id: String,
    #[schemars(description = "The Zoho task id")]
    pub task_id: String,
}

#[derive(Debug, Deserialize, JsonSchema)]
pub struct CreateTaskRequest {
    #[schemars(description = "The Zoho project id")]
    pub project_id: String,
    #[schemars(description = "Task name")]
    pub name: String,
    #[schemars(description = "Task description (HTML allowed)")]
    #[serde(default)]
    pub description: Option<String>,
    #[schemars(description = "Task list to add the task to. Omit for the project's default list.")]
    #[serde(default)]
    pub tasklist_id: Option<String>,
    #[schemars(description = "Priority: none, low, medium or high")]
    #[serde(default)]
    pub priority: Option<String>,
    #[schemars(description = "Start date, YYYY-MM-DD")]
    #[serde(default)]
    pub start_date: Option<String>,
    #[schemars(description = "Due date, YYYY-MM-DD")]
    #[serde(default)]
    pub end_date: Option<String>,
    #[schemars(description = "User ids (zpuid) to assign as owners")]
    #[serde(default)]
    pub owner_ids: Vec<String>,
}

impl CreateTaskRequest {
    pub fn body(&self) -> Value {
        let mut body = Map::new();
        body.insert("name".into(), Value::String(self.name.clone()));
        insert_opt(&mut body, "description", &self.description);
        insert_opt(&mut body, "priority", &self.priority);
        insert_opt(&mut body, "start_date", &self.start_date);
        insert_opt(&mut body, "end_date", &self.end_date);
        if let Some(ref id) = self.tasklist_id {
            body.insert("tasklist".into(), serde_json::json!({ "id": id }));
        }
        if !self.owner_ids.is_empty() {
            let owners: Vec<Value> = self
                .owner_ids
                .iter()
                .map(|id| serde_json::json!({ "zpuid": id }))
                .collect();
            body.insert(
                "owners_and_work".into(),
                serde_json::json!({ "owners": owners }),
            );
        }
        Value::Object(body)
    }
}

#[derive(Debug, Deserialize, JsonSchema)]
pub struct UpdateTaskRequest {
    #[schemars(description = "The Zoho project id")]
    pub project_id: String,
    #[schemars(description = "The Zoho task id")]
    pub task_id: String,
    #[schemars(description = "New task name")]
    #[serde(default)]
    pub name: Option<String>,
    #[schemars(description = "New description (HTML allowed)")]
    #[serde(default)]
    pub description: Option<String>,
    #[schemars(description = "Priority: none, low, medium or high")]
    #[serde(default)]
    pub priority: Option<String>,
    #[schemars(description = "Start date, YYYY-MM-DD")]
    #[serde(default)]
    pub start_date: Option<String>,
    #[schemars(description = "Due date, YYYY-MM-DD")]
    #[serde(default)]
    pub end_date: Option<String>,
    #[schemars(description = "Id of the status to move the task to")]
    #[serde(default)]
    pub status_id: Option<String>,
}

impl UpdateTaskRequest {
    /// Fields to patch, or `None` when the request changes nothing.
    pub fn body(&self) -> Option<Value> {
        let mut body = Map::new();
        insert_opt(&mut body, "name", &self.name);
        insert_opt(&mut body, "description", &self.description);
        insert_opt(&mut body, "priority", &self.priority);
        insert_opt(&mut body, "start_date", &self.start_date);
        insert_opt(&mut body, "end_date", &self.end_date);
        if let Some(ref id) = self.status_id {
            body.insert("status".into(), serde_json::json!({ "id": id }));
        }
        if body.is_empty() {
            None
        } else {
            Some(Value::Object(body))
        }
    }
}

#[derive(Debug, Deserialize, JsonSchema)]
pub struct TaskCommentsRequest {
    #[schemars(description = "The Zoho project id")]
    pub project_id: String,
    #[schemars(description = "The Zoho task id")]
    pub task_id: String,
    #[schemars(description = "Page number, starting at 1")]
    #[serde(default)]
    pub page: Option<u32>,
    #[schemars(description = "Records per page (Zoho allows up to 100)")]
    #[serde(default)]
    pub per_page: Option<u32>,
}

#[derive(Debug, Deserialize, JsonSchema)]
pub struct AddTaskCommentRequest {
    #[schemars(description = "The Zoho project id")]
    pub project_id: String,
    #[schemars(description = "The Zoho task id")]
    pub task_id: String,
    #[schemars(description = "Comment text (HTML allowed)")]
    pub comment: String,
}

// ============================================================
// Issues
// ============================================================

#[derive(Debug, Deserialize, JsonSchema)]
pub struct ListIssuesRequest {
    #[schemars(description = "The Zoho project id")]
    pub project_id: String,
    #[schemars(description = "Page number, starting at 1")]
    #[serde(default)]
    pub page: Option<u32>,
    #[schemars(description = "Records per page (Zoho allows up to 100)")]
    #[serde(default)]
    pub per_page: Option<u32>,
    #[schemars(description = "Return every field Zoho sends instead of a summary")]
    #[serde(default)]
    pub full: bool,
}

#[derive(Debug, Deserialize, JsonSchema)]
pub struct IssueRequest {
    #[schemars(description = "The Zoho project id")]
    pub project_id: String,
    #[schemars(description = "The Zoho issue id")]
    pub issue_id: String,
}

#[derive(Debug, Deserialize, JsonSchema)]
pub struct CreateIssueRequest {
    #[schemars(description = "The Zoho project id")]
    pub project_id: String,
    #[schemars(description = "Issue title")]
    pub name: String,
    #[schemars(description = "Issue description (HTML allowed)")]
    #[serde(default)]
    pub description: Option<String>,
    #[schemars(description = "Id of the severity to set")]
    #[serde(default)]
    pub severity_id: Option<String>,
    #[schemars(description = "User id (zpuid) to assign the issue to")]
    #[serde(default)]
    pub assignee_id: Option<String>,
    #[schemars(description = "Due date, YYYY-MM-DD")]
    #[serde(default)]
    pub due_date: Option<String>,
}

impl CreateIssueRequest {
    pub fn body(&self) -> Value {
        let mut body = Map::new();
        body.insert("name".into(), Value::String(self.name.clone()));
        insert_opt(&mut body, "description", &self.description);
        insert_opt(&mut body, "due_date", &self.due_date);
        if let Some(ref id) = self.severity_id {
            body.insert("severity".into(), serde_json::json!({ "id": id }));
        }
        if let Some(ref id) = self.assignee_id {
            body.insert("assignee".into(), serde_json::json!({ "zpuid": id }));
        }
        Value::Object(body)
    }
}

// ============================================================
// Search & Downloads
// ============================================================

#[derive(Debug, Deserialize, JsonSchema)]
pub struct SearchRequest {
    #[schemars(description = "Text to search for")]
    pub search_term: String,
    #[schemars(
        description = "Restrict to one module: all, projects, tasks, issues, milestones, forums, events. Defaults to all."
    )]
    #[serde(default)]
    pub module: Option<String>,
    #[schemars(description = "Page number, starting at 1")]
    #[serde(default)]
    pub page: Option<u32>,
    #[schemars(description = "Records per page (Zoho allows up to 100)")]
    #[serde(default)]
    pub per_page: Option<u32>,
}

#[derive(Debug, Deserialize, JsonSchema)]
pub struct DownloadRequest {
    #[schemars(
        description = "URL of the image or attachment as it appears in Zoho content. Relative paths are resolved against the API domain."
    )]
    pub url: String,
}

fn insert_opt(body: &mut Map<String, Value>, key: &str, value: &Option<String>) {
    if let Some(v) = value {
        body.insert(key.to_string(), Value::String(v.clone()));
    }
}
