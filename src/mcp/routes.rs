//! Endpoint construction for each tool. Paths are relative to `/api/v3`.

use super::shape::paginate;
use super::types::*;
use crate::client::Endpoint;

fn portal(portal_id: &str, path: &str) -> String {
    format!("/portal/{}{}", portal_id, path)
}

fn project(portal_id: &str, project_id: &str, path: &str) -> String {
    portal(portal_id, &format!("/projects/{}{}", project_id, path))
}

pub fn list_portals() -> Endpoint {
    Endpoint::get("/portals")
}

pub fn list_projects(portal_id: &str, req: &ListProjectsRequest) -> Endpoint {
    paginate(
        Endpoint::get(portal(portal_id, "/projects")),
        req.page,
        req.per_page,
    )
}

pub fn get_project(portal_id: &str, req: &ProjectRequest) -> Endpoint {
    Endpoint::get(project(portal_id, &req.project_id, ""))
}

pub fn create_project(portal_id: &str, req: &CreateProjectRequest) -> Endpoint {
    Endpoint::post(portal(portal_id, "/projects")).json(req.body())
}

pub fn list_tasks(portal_id: &str, req: &ListTasksRequest) -> Endpoint {
    paginate(
        Endpoint::get(project(portal_id, &req.project_id, "/tasks")),
        req.page,
        req.per_page,
    )
}

pub fn get_task(portal_id: &str, req: &TaskRequest) -> Endpoint {
    Endpoint::get(project(
        portal_id,
        &req.project_id,
        &format!("/tasks/{}", req.task_id),
    ))
}

pub fn create_task(portal_id: &str, req: &CreateTaskRequest) -> Endpoint {
    Endpoint::post(project(portal_id, &req.project_id, "/tasks")).json(req.body())
}

/// `None` when the request has nothing to change.
pub fn update_task(portal_id: &str, req: &UpdateTaskRequest) -> Option<Endpoint> {
    let body = req.body()?;
    Some(
        Endpoint::patch(project(
            portal_id,
            &req.project_id,
            &format!("/tasks/{}", req.task_id),
        ))
        .json(body),
    )
}

pub fn delete_task(portal_id: &str, req: &TaskRequest) -> Endpoint {
    Endpoint::delete(project(
        portal_id,
        &req.project_id,
        &format!("/tasks/{}", req.task_id),
    ))
}

pub fn list_task_comments(portal_id: &str, req: &TaskCommentsRequest) -> Endpoint {
    paginate(
        Endpoint::get(project(
            portal_id,
            &req.project_id,
            &format!("/tasks/{}/comments", req.task_id),
        )),
        req.page,
        req.per_page,
    )
}

pub fn add_task_comment(portal_id: &str, req: &AddTaskCommentRequest) -> Endpoint {
    Endpoint::post(project(
        portal_id,
        &req.project_id,
        &format!("/tasks/{}/comments", req.task_id),
    ))
    .json(serde_json::json!({ "comment": req.comment }))
}

/// Paged listing of a project sub-collection such as `/tasklists` or `/users`.
pub fn project_collection(portal_id: &str, collection: &str, req: &ProjectPageRequest) -> Endpoint {
    paginate(
        Endpoint::get(project(
            portal_id,
            &req.project_id,
            &format!("/{}", collection),
        )),
        req.page,
        req.per_page,
    )
}

pub fn list_issues(portal_id: &str, req: &ListIssuesRequest) -> Endpoint {
    paginate(
        Endpoint::get(project(portal_id, &req.project_id, "/issues")),
        req.page,
        req.per_page,
    )
}

pub fn get_issue(portal_id: &str, req: &IssueRequest) -> Endpoint {
    Endpoint::get(project(
        portal_id,
        &req.project_id,
        &format!("/issues/{}", req.issue_id),
    ))
}

pub fn create_issue(portal_id: &str, req: &CreateIssueRequest) -> Endpoint {
    Endpoint::post(project(portal_id, &req.project_id, "/issues")).json(req.body())
}

pub fn search(portal_id: &str, req: &SearchRequest) -> Endpoint {
    let endpoint = Endpoint::get(portal(portal_id, "/search"))
        .query("search_term", &req.search_term)
        .query("module", req.module.as_deref().unwrap_or("all"));
    paginate(endpoint, req.page, req.per_page)
}

#[cfg(test)]
mod tests {
    use super::*;
    use reqwest::Method;

    #[test]
    fn list_projects_is_portal_scoped_and_paged() {
        let endpoint = list_projects(
            "acme",
            &ListProjectsRequest {
                page: Some(2),
                per_page: Some(10),
                full: false,
            },
        );
        assert_eq!(endpoint.method, Method::GET);
        assert_eq!(endpoint.path, "/portal/acme/projects");
        assert_eq!(
            endpoint.query,
            vec![
                ("page".to_string(), "2".to_string()),
                ("per_page".to_string(), "10".to_string()),
            ]
        );
    }

    #[test]
    fn task_paths_nest_under_project() {
        let req = TaskRequest {
            project_id: "11".to_string(),
            task_id: "22".to_string(),
        };
        assert_eq!(get_task("acme", &req).path, "/portal/acme/projects/11/tasks/22");

        let endpoint = delete_task("acme", &req);
        assert_eq!(endpoint.method, Method::DELETE);
        assert!(endpoint.body.is_none());
    }

    #[test]
    fn empty_update_builds_no_endpoint() {
        let req: UpdateTaskRequest = serde_json::from_value(serde_json::json!({
            "project_id": "11",
            "task_id": "22"
        }))
        .unwrap();
        assert!(update_task("acme", &req).is_none());
    }

    #[test]
    fn update_task_patches_with_body() {
        let req: UpdateTaskRequest = serde_json::from_value(serde_json::json!({
            "project_id": "11",
            "task_id": "22",
            "priority": "low"
        }))
        .unwrap();
        let endpoint = update_task("acme", &req).expect("endpoint");
        assert_eq!(endpoint.method, Method::PATCH);
        assert_eq!(endpoint.body, Some(serde_json::json!({ "priority": "low" })));
    }

    #[test]
    fn search_defaults_to_all_modules() {
        let endpoint = search(
            "acme",
            &SearchRequest {
                search_term: "login bug".to_string(),
                module: None,
                page: None,
                per_page: None,
            },
        );
        assert_eq!(endpoint.path, "/portal/acme/search");
        assert_eq!(
            endpoint.query,
            vec![
                ("search_term".to_string(), "login bug".to_string()),
                ("module".to_string(), "all".to_string()),
            ]
        );
    }

    #[test]
    fn collections_share_one_builder() {
        let req = ProjectPageRequest {
            project_id: "11".to_string(),
            page: None,
            per_page: None,
        };
        assert_eq!(
            project_collection("acme", "milestones", &req).path,
            "/portal/acme/projects/11/milestones"
        );
    }
}
