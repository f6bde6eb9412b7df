//! Changed-file and record document model.
//!
//! `ChangedFile` entries come from the diff-listing collaborator once per
//! pull request and are read-only for the duration of a run. Record
//! documents are the parsed JSON content of a registry file at a single
//! revision and live only while that file is being processed.

use serde::Deserialize;

/// Change classification for a file within a pull request's diff.
///
/// The diff source reports free-form status strings; `modified`, `renamed`
/// and `changed` collapse into [`ChangeKind::ContentChange`], which is also
/// the documented default for any unrecognized status.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ChangeKind {
    /// The file exists on the trunk branch and its content changed.
    ContentChange,
    /// The file is new in this pull request.
    Added,
    /// The file was deleted in this pull request.
    Removed,
}

impl ChangeKind {
    /// Map a diff-source status string onto a classification.
    #[must_use]
    pub fn from_status(status: &str) -> Self {
        match status {
            "added" => Self::Added,
            "removed" => Self::Removed,
            _ => Self::ContentChange,
        }
    }
}

/// One entry from the pull request's diff listing.
///
/// The trunk-content location is supplied by the diff source as a structured
/// field rather than derived from the revision-scoped URL.
#[derive(Debug, Clone)]
pub struct ChangedFile {
    /// Repository-relative path of the record file.
    pub path: String,
    /// Classification, fixed at pipeline start.
    pub kind: ChangeKind,
    /// Location of the file's content at the pull request's revision.
    pub raw_url: String,
    /// Location of the file's content on the trunk branch.
    pub trunk_url: String,
    /// Link to the rendered diff view.
    pub diff_url: String,
    /// Whether the diff source reported this path as newly tracked
    /// (added or renamed). Consumed by the merge-time activation sweep only.
    pub newly_tracked: bool,
}

/// Registrant identity declared by a record file.
#[derive(Debug, Clone, Deserialize)]
pub struct RecordOwner {
    /// Owner account name, when declared.
    pub username: Option<String>,
}

/// Delegation data carried by a record file.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct RecordData {
    /// Alias-name target form.
    #[serde(rename = "CNAME")]
    pub cname: Option<String>,
    /// Direct-address target form.
    #[serde(rename = "URL")]
    pub url: Option<String>,
    /// Resolved address list, used by the hosting activation sweep.
    #[serde(rename = "A", default)]
    pub addresses: Vec<String>,
}

/// Parsed JSON content of a record file at a given revision.
#[derive(Debug, Clone, Deserialize)]
pub struct RecordDocument {
    /// Declared owner identity.
    pub owner: Option<RecordOwner>,
    /// Target declaration, possibly absent in both forms.
    #[serde(default)]
    pub record: RecordData,
    /// Free-text description.
    pub description: Option<String>,
    /// Upstream repository reference.
    pub repo: Option<String>,
}

impl RecordDocument {
    /// Declared owner account name, when present.
    #[must_use]
    pub fn owner_username(&self) -> Option<&str> {
        self.owner.as_ref().and_then(|owner| owner.username.as_deref())
    }

    /// Screenshot target, when the document declares one.
    ///
    /// The alias form wins when both are present. A document with neither
    /// form is not screenshot-eligible and the pipeline skips it.
    #[must_use]
    pub fn target(&self) -> Option<Target> {
        if let Some(cname) = &self.record.cname {
            return Some(Target::Alias(cname.clone()));
        }
        self.record.url.clone().map(Target::Direct)
    }
}

/// Screenshot target declared by a record document.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Target {
    /// Alias-name form; fetched over plain HTTP.
    Alias(String),
    /// Direct-address form, used verbatim.
    Direct(String),
}

impl Target {
    /// Fetchable URL for this target.
    #[must_use]
    pub fn url(&self) -> String {
        match self {
            Self::Alias(name) => format!("http://{name}"),
            Self::Direct(url) => url.clone(),
        }
    }
}

/// Authorization outcome plus the identities that were compared.
#[derive(Debug, Clone)]
pub struct AuthorizationVerdict {
    /// Whether the prior owner matches the pull-request author.
    pub authorized: bool,
    /// Owner declared by the trunk revision of the record.
    pub prior_owner: Option<String>,
    /// Owner declared by the pull request's revision, when one exists.
    pub new_owner: Option<String>,
    /// Pull-request author identity.
    pub author: String,
}
