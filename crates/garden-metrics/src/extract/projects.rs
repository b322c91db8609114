//! Project status and user counts.

use std::collections::BTreeSet;
use std::sync::Arc;

use garden_state::{Project, ProjectMember, ResourceKind};

use crate::catalog::{PROJECTS_STATUS, USERS_TOTAL};
use crate::error::ExtractError;
use crate::failures::ScrapeFailures;
use crate::sample::Sample;

use super::{require_name, skip_object};

const SERVICE_ACCOUNT_PREFIX: &str = "system:serviceaccount:";

pub(crate) const SCHEMA: &[(&str, &[&str])] = &[
    (PROJECTS_STATUS, &["name", "cluster", "phase"]),
    (USERS_TOTAL, &["kind"]),
];

/// Lifecycle phase of a project.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ProjectPhase {
    Unknown,
    Pending,
    Ready,
    Terminating,
    Failed,
}

impl ProjectPhase {
    pub fn from_phase(raw: &str) -> Self {
        match raw {
            "Pending" => ProjectPhase::Pending,
            "Ready" => ProjectPhase::Ready,
            "Terminating" => ProjectPhase::Terminating,
            "Failed" => ProjectPhase::Failed,
            _ => ProjectPhase::Unknown,
        }
    }

    pub fn value(self) -> f64 {
        match self {
            ProjectPhase::Unknown => -1.0,
            ProjectPhase::Pending => 0.0,
            ProjectPhase::Ready => 1.0,
            ProjectPhase::Terminating => 2.0,
            ProjectPhase::Failed => 3.0,
        }
    }
}

/// Distinct project members across all projects, by subject kind.
#[derive(Debug, Default)]
struct Members {
    users: BTreeSet<String>,
    groups: BTreeSet<String>,
    service_accounts: BTreeSet<String>,
}

impl Members {
    fn add(&mut self, project: &Project, member: &ProjectMember) {
        if member.name.is_empty() {
            return;
        }
        match member.kind.as_str() {
            "User" if member.name.starts_with(SERVICE_ACCOUNT_PREFIX) => {
                self.service_accounts.insert(member.name.clone());
            }
            "User" => {
                self.users.insert(member.name.clone());
            }
            "Group" => {
                self.groups.insert(member.name.clone());
            }
            "ServiceAccount" => {
                let namespace = member
                    .namespace
                    .as_deref()
                    .or(project.namespace.as_deref())
                    .unwrap_or_default();
                self.service_accounts
                    .insert(format!("{SERVICE_ACCOUNT_PREFIX}{namespace}:{}", member.name));
            }
            _ => {}
        }
    }

    fn samples(&self) -> [Sample; 3] {
        [
            Sample::new(USERS_TOTAL, &["user"], self.users.len() as f64),
            Sample::new(USERS_TOTAL, &["group"], self.groups.len() as f64),
            Sample::new(USERS_TOTAL, &["serviceaccount"], self.service_accounts.len() as f64),
        ]
    }
}

/// Emit project status samples and, if any project was usable, user counts.
pub fn collect_project_metrics(projects: &[Arc<Project>], failures: &ScrapeFailures) -> Vec<Sample> {
    let mut samples = Vec::with_capacity(projects.len() + 3);
    let mut members = Members::default();
    let mut processed = 0usize;

    for project in projects {
        match project_sample(project) {
            Ok(sample) => {
                samples.push(sample);
                for member in &project.members {
                    members.add(project, member);
                }
                processed += 1;
            }
            Err(e) => skip_object(failures, ResourceKind::Project, &project.name, &e),
        }
    }

    if processed > 0 {
        samples.extend(members.samples());
    }
    samples
}

fn project_sample(project: &Project) -> Result<Sample, ExtractError> {
    require_name(&project.name)?;
    let cluster = project
        .namespace
        .as_deref()
        .filter(|ns| !ns.is_empty())
        .ok_or(ExtractError::MissingNamespace)?;

    Ok(Sample::new(
        PROJECTS_STATUS,
        &[project.name.as_str(), cluster, project.phase.as_str()],
        ProjectPhase::from_phase(&project.phase).value(),
    ))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::*;

    fn member(kind: &str, name: &str) -> ProjectMember {
        ProjectMember {
            kind: kind.to_string(),
            name: name.to_string(),
            namespace: None,
        }
    }

    fn collect(projects: Vec<Project>) -> (Vec<Sample>, ScrapeFailures) {
        let failures = ScrapeFailures::new();
        let projects: Vec<Arc<Project>> = projects.into_iter().map(Arc::new).collect();
        (collect_project_metrics(&projects, &failures), failures)
    }

    #[test]
    fn status_sample_per_project() {
        let mut pending = project("team-b");
        pending.phase = "Pending".into();

        let (samples, _) = collect(vec![project("team-a"), pending]);
        let status = named(&samples, PROJECTS_STATUS);
        assert_eq!(status.len(), 2);
        assert_eq!(status[0].labels, vec!["team-a", "garden-team-a", "Ready"]);
        assert_eq!(status[0].value, 1.0);
        assert_eq!(status[1].value, 0.0);
    }

    #[test]
    fn unknown_phase_keeps_raw_label() {
        let mut p = project("team-a");
        p.phase = "Migrating".into();

        let (samples, _) = collect(vec![p]);
        let status = only(&samples, PROJECTS_STATUS);
        assert_eq!(status.labels[2], "Migrating");
        assert_eq!(status.value, -1.0);
    }

    #[test]
    fn users_are_counted_once_per_kind() {
        let mut a = project("team-a");
        a.members = vec![
            member("User", "alice@example.com"),
            member("User", "bob@example.com"),
            member("Group", "admins"),
            member("User", "system:serviceaccount:garden-team-a:robot"),
        ];
        let mut b = project("team-b");
        b.members = vec![
            member("User", "alice@example.com"),
            member("ServiceAccount", "robot"),
            member("ServiceAccount", "ci"),
            member("Bot", "ignored"),
            member("User", ""),
        ];

        let (samples, _) = collect(vec![a, b]);
        let users = named(&samples, USERS_TOTAL);
        let by_kind: Vec<(&str, f64)> = users
            .iter()
            .map(|s| (s.labels[0].as_str(), s.value))
            .collect();
        assert_eq!(
            by_kind,
            vec![("user", 2.0), ("group", 1.0), ("serviceaccount", 3.0)]
        );
    }

    #[test]
    fn service_account_member_uses_project_namespace() {
        let mut p = project("team-a");
        p.members = vec![
            member("ServiceAccount", "robot"),
            member("User", "system:serviceaccount:garden-team-a:robot"),
        ];

        let (samples, _) = collect(vec![p]);
        let sa = named(&samples, USERS_TOTAL)
            .into_iter()
            .find(|s| s.labels[0] == "serviceaccount")
            .unwrap();
        assert_eq!(sa.value, 1.0);
    }

    #[test]
    fn project_without_namespace_is_skipped() {
        let mut broken = project("broken");
        broken.namespace = None;

        let (samples, failures) = collect(vec![broken, project("team-a")]);
        assert_eq!(named(&samples, PROJECTS_STATUS).len(), 1);
        assert_eq!(failures.count(ResourceKind::Project, "missing_namespace"), 1);
    }

    #[test]
    fn no_user_counts_without_usable_projects() {
        let (samples, _) = collect(Vec::new());
        assert!(samples.is_empty());

        let mut broken = project("broken");
        broken.namespace = Some(String::new());
        let (samples, _) = collect(vec![broken]);
        assert!(samples.is_empty());
    }
}
