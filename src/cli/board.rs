use super::App;
use crate::board::{repository_urls, Issue};
use futures::TryStreamExt;

/// Crawl each named project and print its issues, then its repositories.
///
/// Without `deps` each issue is printed as soon as it is fetched. Dependency
/// resolution needs the whole board, so `deps` prints after the crawl.
pub async fn issues(app: &App, projects: &[String], deps: bool) -> anyhow::Result<()> {
    let crawler = app.org.crawler();
    for project in app.org.projects_named(projects).await? {
        tracing::debug!(project = %project.name, workers = crawler.workers(), "fetching issues");
        let issues: Vec<Issue> = if deps {
            let issues = crawler.issues_with_dependencies(&project).await?;
            for issue in &issues {
                print_issue(issue)?;
            }
            issues
        } else {
            let mut issues = Vec::new();
            let mut stream = crawler.issues(&project);
            while let Some(issue) = stream.try_next().await? {
                print_issue(&issue)?;
                issues.push(issue);
            }
            issues
        };

        let open = issues.iter().filter(|i| i.is_open()).count();
        let closed = issues.iter().filter(|i| i.is_closed()).count();
        tracing::debug!(project = %project.name, open, closed, "crawl finished");

        println!("---");
        for url in repository_urls(&issues) {
            println!("{url}");
        }
    }
    Ok(())
}

fn print_issue(issue: &Issue) -> anyhow::Result<()> {
    println!("{}", serde_json::to_string_pretty(issue)?);
    Ok(())
}

/// List the organization's projects.
pub async fn projects(app: &App) -> anyhow::Result<()> {
    let projects = app.org.projects().await?;
    if projects.is_empty() {
        println!("No projects found for {}.", app.org.name());
        return Ok(());
    }

    println!("{:<10} {:<40} URL", "ID", "NAME");
    println!("{}", "-".repeat(80));
    for project in &projects {
        println!("{:<10} {:<40} {}", project.id, project.name, project.html_url);
    }
    Ok(())
}

/// List repositories, all of them or only the named ones.
pub async fn repos(app: &App, names: &[String]) -> anyhow::Result<()> {
    let repos = app.org.repositories(Some(names)).await?;
    println!("{:<40} URL", "REPOSITORY");
    println!("{}", "-".repeat(80));
    for repo in &repos {
        println!("{:<40} {}", repo.full_name, repo.html_url);
    }
    Ok(())
}
