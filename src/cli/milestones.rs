use super::{print_response, App};
use crate::github::repos::MilestoneSpec;

/// List a repository's milestones, or dump them as JSON.
pub async fn list(app: &App, repository: &str, dump: bool) -> anyhow::Result<()> {
    let repo = app.repository(repository).await?;
    let milestones = app.gh.milestones(&repo).await?;

    if dump {
        println!("{}", serde_json::to_string_pretty(&milestones)?);
        return Ok(());
    }
    if milestones.is_empty() {
        println!("No milestones in {}.", repo.full_name);
        return Ok(());
    }

    println!("{:<8} {:<8} {:<22} TITLE", "NUMBER", "STATE", "DUE");
    println!("{}", "-".repeat(80));
    for m in &milestones {
        let due = m
            .due_on
            .map(|d| d.format("%Y-%m-%dT%H:%M:%SZ").to_string())
            .unwrap_or_else(|| "-".to_string());
        println!("{:<8} {:<8} {:<22} {}", m.number, m.state, due, m.title);
    }
    Ok(())
}

pub async fn create(app: &App, repository: &str, spec: &MilestoneSpec) -> anyhow::Result<()> {
    let repo = app.repository(repository).await?;
    let (status, body) = app.gh.create_milestone(&repo, spec).await?;
    print_response(&format!("{} milestone {:?}", repo.name, spec.title), status, &body)
}

pub async fn update(app: &App, repository: &str, number: u64, spec: &MilestoneSpec) -> anyhow::Result<()> {
    let repo = app.repository(repository).await?;
    let (status, body) = app.gh.update_milestone(&repo, number, spec).await?;
    print_response(&format!("{} milestone #{number}", repo.name), status, &body)
}

pub async fn delete(app: &App, repository: &str, number: u64) -> anyhow::Result<()> {
    let repo = app.repository(repository).await?;
    let status = app.gh.delete_milestone(&repo, number).await?;
    println!("{} milestone #{number}: {status}", repo.name);
    Ok(())
}
