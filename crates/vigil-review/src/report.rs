//! Report body composition.
//!
//! Pure functions from review facts to a markdown comment body; no network
//! or I/O. Three shapes, selected by classification: additions carry no
//! authorization section (there is no prior owner to check against),
//! removals carry no screenshot, content changes carry both. Identity lines
//! appear only when the verdict is unauthorized.

use crate::model::{AuthorizationVerdict, ChangedFile};

const REPORT_HEADER: &str = "# 🔍 Vigil Review";

/// Fallback for absent description/repository fields.
const NOT_AVAILABLE: &str = "N/A";

/// Compose the report for an added record file.
#[must_use]
pub fn added(
    file: &ChangedFile,
    target_url: &str,
    description: Option<&str>,
    repo: Option<&str>,
    image_url: &str,
) -> String {
    let mut body = content_header(file, target_url, description, repo);
    body.push_str(&screenshot_section(&file.path, image_url));
    body
}

/// Compose the report for a modified, renamed, or changed record file.
#[must_use]
pub fn content_change(
    file: &ChangedFile,
    target_url: &str,
    description: Option<&str>,
    repo: Option<&str>,
    verdict: &AuthorizationVerdict,
    image_url: &str,
) -> String {
    let mut body = content_header(file, target_url, description, repo);
    body.push_str("\n## 🔒 Authorization\n");
    if !verdict.authorized {
        push_identity(&mut body, "Prior Owner", verdict.prior_owner.as_deref());
        push_identity(&mut body, "New Owner", verdict.new_owner.as_deref());
        push_identity(&mut body, "PR Author", Some(&verdict.author));
    }
    body.push_str(&marker(verdict));
    body.push_str(&screenshot_section(&file.path, image_url));
    body
}

/// Compose the report for a removed record file.
#[must_use]
pub fn removed(file: &ChangedFile, verdict: &AuthorizationVerdict) -> String {
    let mut body = format!(
        "{REPORT_HEADER}\n🗑️ **File Deleted**: [{path}]({diff})\n\n## 🔒 Authorization\n",
        path = file.path,
        diff = file.diff_url,
    );
    if !verdict.authorized {
        push_identity(&mut body, "File Owner", verdict.prior_owner.as_deref());
        push_identity(&mut body, "PR Author", Some(&verdict.author));
    }
    body.push_str(&marker(verdict));
    body
}

fn content_header(
    file: &ChangedFile,
    target_url: &str,
    description: Option<&str>,
    repo: Option<&str>,
) -> String {
    format!(
        "{REPORT_HEADER}\nFile: [{path}]({diff})\nContent URL: {target_url}\nDescription: {description}\nRepository: {repo}\n",
        path = file.path,
        diff = file.diff_url,
        description = description.unwrap_or(NOT_AVAILABLE),
        repo = repo.unwrap_or(NOT_AVAILABLE),
    )
}

fn push_identity(body: &mut String, label: &str, identity: Option<&str>) {
    body.push_str(&format!(
        "- {label}: {}\n",
        identity.unwrap_or(NOT_AVAILABLE)
    ));
}

fn marker(verdict: &AuthorizationVerdict) -> String {
    let symbol = if verdict.authorized { "✅" } else { "❌" };
    format!("\n**Authorized**: {symbol}\n")
}

fn screenshot_section(path: &str, image_url: &str) -> String {
    format!("\n## 📸 Screenshot\n![Screenshot of {path}]({image_url})\n")
}
