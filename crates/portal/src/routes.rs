// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! The Web Portal's routes (C11): read-only HTTP views over the Shared
//! Supervisor State (C6), the Fitness Log (C3), and the skill catalog.
//! `/`, `/skill/<name>`, and `/reports` render HTML; `/api/skills` and
//! `/api/status` return JSON; `/reports/<file>` streams an allow-listed
//! report file. No route accepts a mutation.

use std::collections::BTreeMap;
use std::path::{Component, Path, PathBuf};

use axum::extract::{Path as PathExtractor, State};
use axum::http::header;
use axum::response::{Html, IntoResponse, Response};
use axum::routing::get;
use axum::{Json, Router};
use serde::Serialize;

use protea_core::{Clock, SupervisorSnapshot};
use protea_storage::Skill;

use crate::error::HandlerError;
use crate::state::PortalState;

const ALLOWED_REPORT_EXTENSIONS: [&str; 3] = ["html", "md", "pdf"];
const TOP_GENERATIONS_SHOWN: usize = 5;

pub fn build_router<C>(state: PortalState<C>) -> Router
where
    C: Clock,
{
    Router::new()
        .route("/", get(dashboard::<C>))
        .route("/api/skills", get(api_skills::<C>))
        .route("/api/status", get(api_status::<C>))
        .route("/skill/:name", get(skill_detail::<C>))
        .route("/reports", get(reports_index::<C>))
        .route("/reports/*path", get(report_file::<C>))
        .with_state(state)
}

#[derive(Debug, Serialize)]
struct StatusDto {
    #[serde(flatten)]
    snapshot: SupervisorSnapshot,
    uptime_sec: f64,
}

fn uptime_sec<C: Clock>(clock: &C, snapshot: &SupervisorSnapshot) -> f64 {
    (clock.now() - snapshot.start_wall_time).max(0.0)
}

async fn api_status<C: Clock>(State(state): State<PortalState<C>>) -> Json<StatusDto> {
    let snapshot = state.supervisor.snapshot();
    let uptime_sec = uptime_sec(&state.clock, &snapshot);
    Json(StatusDto { snapshot, uptime_sec })
}

async fn api_skills<C>(State(state): State<PortalState<C>>) -> Json<Vec<Skill>> {
    Json(state.skills.all().into_iter().cloned().collect())
}

async fn dashboard<C: Clock>(State(state): State<PortalState<C>>) -> Html<String> {
    let snapshot = state.supervisor.snapshot();
    let status_html = snapshot
        .to_markdown(uptime_sec(&state.clock, &snapshot))
        .replace('\n', "<br>");

    let skills_html: String = state
        .skills
        .all()
        .iter()
        .map(|s| {
            format!(
                r#"<li><a href="/skill/{name}">{name}</a> &mdash; {usage} uses</li>"#,
                name = html_escape(&s.name),
                usage = s.usage_count
            )
        })
        .collect();

    let top_html: String = {
        let fitness = state.fitness.lock();
        fitness
            .top(TOP_GENERATIONS_SHOWN)
            .iter()
            .map(|e| format!("<li>gen {} &mdash; score {:.2}</li>", e.generation_id, e.score))
            .collect()
    };

    let body = format!(
        "<h1>Protea</h1>\
         <section><h2>Status</h2>{status_html}</section>\
         <section><h2>Top generations</h2><ul>{top_html}</ul></section>\
         <section><h2>Skills</h2><ul>{skills_html}</ul></section>\
         <p><a href=\"/reports\">Reports</a></p>"
    );
    Html(render_page("Protea Dashboard", &body))
}

async fn skill_detail<C>(
    PathExtractor(name): PathExtractor<String>,
    State(state): State<PortalState<C>>,
) -> Result<Html<String>, HandlerError> {
    let skill = state
        .skills
        .get(&name)
        .ok_or_else(|| HandlerError::not_found(format!("no such skill: {name}")))?;

    let iframe = match skill.serving_port {
        Some(port) => format!(
            r#"<iframe src="http://localhost:{port}" title="{name}"></iframe>"#,
            name = html_escape(&skill.name)
        ),
        None => "<p>not currently serving</p>".to_string(),
    };

    let body = format!(
        "<h1>{name}</h1><p>{description}</p><p>tags: {tags}</p><p>usage: {usage}</p>{iframe}",
        name = html_escape(&skill.name),
        description = html_escape(&skill.description),
        tags = html_escape(&skill.tags.join(", ")),
        usage = skill.usage_count,
    );
    Ok(Html(render_page(&skill.name, &body)))
}

async fn reports_index<C>(State(state): State<PortalState<C>>) -> Result<Html<String>, HandlerError> {
    let mut entries = tokio::fs::read_dir(&state.reports_dir)
        .await
        .map_err(|e| HandlerError::not_found(format!("reports directory: {e}")))?;

    let mut groups: BTreeMap<String, Vec<String>> = BTreeMap::new();
    while let Some(entry) = entries
        .next_entry()
        .await
        .map_err(|e| HandlerError::bad_request(e.to_string()))?
    {
        let path = entry.path();
        let Some(extension) = path.extension().and_then(|e| e.to_str()) else {
            continue;
        };
        if !ALLOWED_REPORT_EXTENSIONS.contains(&extension) {
            continue;
        }
        let (Some(stem), Some(file_name)) = (
            path.file_stem().and_then(|s| s.to_str()),
            path.file_name().and_then(|s| s.to_str()),
        ) else {
            continue;
        };
        groups.entry(stem.to_string()).or_default().push(file_name.to_string());
    }

    let mut body = String::from("<h1>Reports</h1><ul>");
    for (stem, mut files) in groups {
        files.sort();
        let links = files
            .iter()
            .map(|f| format!(r#"<a href="/reports/{f}">{f}</a>"#, f = html_escape(f)))
            .collect::<Vec<_>>()
            .join(" | ");
        body.push_str(&format!("<li>{} &mdash; {links}</li>", html_escape(&stem)));
    }
    body.push_str("</ul>");
    Ok(Html(render_page("Reports", &body)))
}

async fn report_file<C>(
    PathExtractor(raw_path): PathExtractor<String>,
    State(state): State<PortalState<C>>,
) -> Result<Response, HandlerError> {
    let relative = sanitize_relative_path(&raw_path)?;
    let extension = relative.extension().and_then(|e| e.to_str()).unwrap_or("");
    if !ALLOWED_REPORT_EXTENSIONS.contains(&extension) {
        return Err(HandlerError::bad_request(format!("extension .{extension} is not served")));
    }

    let full_path = state.reports_dir.join(&relative);
    let bytes = tokio::fs::read(&full_path)
        .await
        .map_err(|_| HandlerError::not_found("report not found"))?;

    let content_type = match extension {
        "html" => "text/html; charset=utf-8",
        "md" => "text/markdown; charset=utf-8",
        "pdf" => "application/pdf",
        _ => "application/octet-stream",
    };
    Ok(([(header::CONTENT_TYPE, content_type)], bytes).into_response())
}

/// Reject any path segment that could escape the reports directory —
/// `..`, an absolute root, or a Windows drive prefix — keeping only plain
/// path segments, mirroring the original's flat `reports/<file>` layout.
fn sanitize_relative_path(raw: &str) -> Result<PathBuf, HandlerError> {
    let mut out = PathBuf::new();
    for component in Path::new(raw).components() {
        match component {
            Component::Normal(part) => out.push(part),
            Component::CurDir => {}
            Component::ParentDir | Component::RootDir | Component::Prefix(_) => {
                return Err(HandlerError::bad_request("path escapes the reports directory"));
            }
        }
    }
    Ok(out)
}

fn render_page(title: &str, body: &str) -> String {
    format!(
        "<!DOCTYPE html><html><head><meta charset=\"utf-8\"><title>{}</title></head><body>{body}</body></html>",
        html_escape(title)
    )
}

fn html_escape(raw: &str) -> String {
    raw.replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
        .replace('"', "&quot;")
}

#[cfg(test)]
#[path = "routes_tests.rs"]
mod tests;
