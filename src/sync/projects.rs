// src/sync/projects.rs

//! Project hierarchy reconciliation
//!
//! Runs in two phases inside one transaction:
//!
//! 1. every project node is upserted as a project maintainer;
//! 2. every project's member list (subprojects first, then people) is
//!    resolved by email and replaces the stored member edges.
//!
//! Members dropped from a project lose the edge only; their maintainer row
//! stays. Cycles in the membership graph are not rejected. After commit the
//! stored graph is checked and any cycle is reported as a warning.

use crate::db;
use crate::db::models::{Maintainer, MemberEdge};
use crate::error::Result;
use crate::sync::client::{Fetch, Sources, fetch_document};
use crate::sync::maintainers::MaintainerResolver;
use crate::sync::parsers::MaintainerKind;
use crate::sync::parsers::projects::{ProjectRecord, parse_projects};
use rusqlite::Connection;
use std::collections::HashMap;
use tracing::{info, warn};

/// Outcome of a project sync
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ProjectStats {
    pub projects: usize,
    pub member_edges: usize,
    pub maintainers_created: usize,
    pub cycles: usize,
}

/// Fetch the project hierarchy and reconcile it in one transaction
pub fn sync_projects(
    conn: &mut Connection,
    fetcher: &dyn Fetch,
    sources: &Sources,
) -> Result<ProjectStats> {
    info!("Syncing projects from {}", sources.projects);

    let body = fetch_document(fetcher, &sources.projects)?;
    let projects = parse_projects(&body)?;

    let mut stats = db::transaction(conn, |tx| apply_projects(tx, &projects))?;

    let cycles = find_membership_cycles(conn)?;
    for cycle in &cycles {
        warn!("Project membership cycle: {}", describe_cycle(conn, cycle)?);
    }
    stats.cycles = cycles.len();

    info!(
        "Projects: {} synced, {} member edges, {} maintainers created",
        stats.projects, stats.member_edges, stats.maintainers_created
    );
    Ok(stats)
}

/// Write parsed project records: upsert phase, then membership phase
pub fn apply_projects(conn: &Connection, projects: &[ProjectRecord]) -> Result<ProjectStats> {
    let mut resolver = MaintainerResolver::new();
    let mut stats = ProjectStats::default();

    let mut project_ids = Vec::with_capacity(projects.len());
    for project in projects {
        project_ids.push(resolver.upsert_project(conn, project)?);
    }

    for (project, project_id) in projects.iter().zip(project_ids) {
        let mut edges = Vec::with_capacity(project.subprojects.len() + project.members.len());

        // inherit_members is deliberately ignored: membership stays direct
        for subproject in &project.subprojects {
            let member_id =
                resolver.resolve(conn, &subproject.email, MaintainerKind::Project, None)?;
            edges.push(MemberEdge {
                member_id,
                is_lead: false,
            });
        }
        for member in &project.members {
            let member_id = resolver.resolve(
                conn,
                &member.email,
                MaintainerKind::Person,
                member.name.as_deref(),
            )?;
            edges.push(MemberEdge {
                member_id,
                is_lead: member.is_lead,
            });
        }

        Maintainer::set_members(conn, project_id, &edges)?;
        stats.member_edges += edges.len();
        stats.projects += 1;
    }

    stats.maintainers_created = resolver.created();
    Ok(stats)
}

/// Find cycles in the stored project membership graph
///
/// Each cycle is returned once, as the maintainer IDs along it starting from
/// the first node reached by the search.
pub fn find_membership_cycles(conn: &Connection) -> Result<Vec<Vec<i64>>> {
    let mut graph: HashMap<i64, Vec<i64>> = HashMap::new();
    for (project, member) in Maintainer::membership_edges(conn)? {
        graph.entry(project).or_default().push(member);
    }

    let mut nodes: Vec<i64> = graph.keys().copied().collect();
    nodes.sort_unstable();

    #[derive(Clone, Copy, PartialEq, Eq)]
    enum Mark {
        Visiting,
        Done,
    }

    let mut marks: HashMap<i64, Mark> = HashMap::new();
    let mut cycles = Vec::new();

    for start in nodes {
        if marks.contains_key(&start) {
            continue;
        }

        // Iterative DFS: (node, index of next child to visit)
        let mut path: Vec<i64> = vec![start];
        let mut stack: Vec<(i64, usize)> = vec![(start, 0)];
        marks.insert(start, Mark::Visiting);

        while let Some(&(node, next)) = stack.last() {
            let children = graph.get(&node).map(Vec::as_slice).unwrap_or_default();
            if let Some(&child) = children.get(next) {
                if let Some(top) = stack.last_mut() {
                    top.1 += 1;
                }
                match marks.get(&child) {
                    Some(Mark::Visiting) => {
                        if let Some(pos) = path.iter().position(|&n| n == child) {
                            cycles.push(path[pos..].to_vec());
                        }
                    }
                    Some(Mark::Done) => {}
                    None => {
                        marks.insert(child, Mark::Visiting);
                        path.push(child);
                        stack.push((child, 0));
                    }
                }
            } else {
                marks.insert(node, Mark::Done);
                path.pop();
                stack.pop();
            }
        }
    }

    Ok(cycles)
}

fn describe_cycle(conn: &Connection, cycle: &[i64]) -> Result<String> {
    let mut emails = Vec::with_capacity(cycle.len() + 1);
    for id in cycle.iter().chain(cycle.first()) {
        let email = Maintainer::find_by_id(conn, *id)?
            .map(|m| m.email)
            .unwrap_or_else(|| format!("#{id}"));
        emails.push(email);
    }
    Ok(emails.join(" -> "))
}
