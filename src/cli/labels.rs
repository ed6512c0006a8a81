//! Label synchronisation from a JSON definitions file.

use super::{print_response, App};
use crate::github::repos::DEFAULT_LABEL_COLOR;
use anyhow::Context;
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;
use std::path::Path;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LabelDefinition {
    pub name: String,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub color: Option<String>,
}

impl LabelDefinition {
    fn color(&self) -> &str {
        self.color
            .as_deref()
            .map(|c| c.trim_start_matches('#'))
            .filter(|c| !c.is_empty())
            .unwrap_or(DEFAULT_LABEL_COLOR)
    }
}

/// What a sync will do to one repository.
#[derive(Debug, Default, PartialEq, Eq)]
pub struct LabelPlan {
    pub create: Vec<LabelDefinition>,
    pub delete: Vec<String>,
}

/// Every definition is (re)created; with `delete`, existing labels that are
/// not defined are removed.
pub fn plan_label_sync(definitions: &[LabelDefinition], existing: &[String], delete: bool) -> LabelPlan {
    let defined: BTreeSet<&str> = definitions.iter().map(|d| d.name.as_str()).collect();
    let delete = if delete {
        existing
            .iter()
            .filter(|name| !defined.contains(name.as_str()))
            .cloned()
            .collect::<BTreeSet<_>>()
            .into_iter()
            .collect()
    } else {
        Vec::new()
    };
    LabelPlan {
        create: definitions.to_vec(),
        delete,
    }
}

pub fn load_definitions(path: &Path) -> anyhow::Result<Vec<LabelDefinition>> {
    let content =
        std::fs::read_to_string(path).with_context(|| format!("reading {}", path.display()))?;
    let definitions: Vec<LabelDefinition> =
        serde_json::from_str(&content).with_context(|| format!("parsing {}", path.display()))?;
    if definitions.is_empty() {
        anyhow::bail!("no label definitions in {}", path.display());
    }
    Ok(definitions)
}

/// Apply the definitions file to each repository.
pub async fn sync(app: &App, repositories: &[String], file: &Path, delete: bool) -> anyhow::Result<()> {
    let definitions = load_definitions(file)?;
    let mut created = Vec::new();
    let mut deleted = Vec::new();

    for repo in app.org.repositories(Some(repositories)).await? {
        let existing: Vec<String> = app
            .gh
            .labels(&repo)
            .await?
            .into_iter()
            .map(|l| l.name)
            .collect();
        let plan = plan_label_sync(&definitions, &existing, delete);
        tracing::info!(
            repo = %repo.full_name,
            create = plan.create.len(),
            delete = plan.delete.len(),
            "syncing labels"
        );

        for label in plan.create {
            let (status, _) = app
                .gh
                .create_label(&repo, &label.name, label.color(), label.description.as_deref())
                .await?;
            tracing::debug!(repo = %repo.full_name, label = %label.name, %status, "label created");
            created.push(format!("{}:{}", repo.name, label.name));
        }
        for name in plan.delete {
            app.gh.delete_label(&repo, &name).await?;
            deleted.push(format!("{}:{name}", repo.name));
        }
    }

    println!("Created: {}", created.join(", "));
    println!("Deleted: {}", deleted.join(", "));
    Ok(())
}

/// Create labels by name on one repository.
pub async fn add(
    app: &App,
    repository: &str,
    names: &[String],
    color: Option<&str>,
    description: Option<&str>,
) -> anyhow::Result<()> {
    let repo = app.repository(repository).await?;
    let color = color.unwrap_or(DEFAULT_LABEL_COLOR).trim_start_matches('#');
    for name in names {
        let (status, body) = app.gh.create_label(&repo, name, color, description).await?;
        print_response(&format!("{}:{name}", repo.name), status, &body)?;
    }
    Ok(())
}
