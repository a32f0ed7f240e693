//! cri init - Create the database, a starter config and the site nodes

use std::collections::BTreeSet;
use std::fs;
use std::path::Path;

use clap::Args;
use console::style;
use serde::Serialize;

use crate::app::AppContext;
use crate::cli::output::{HumanLayout, emit_human, emit_json};
use crate::content::{
    ContentContext, ContentRepository, NewNode, NodeRef, UNSTRUCTURED_NODE_TYPE, ensure_path,
    path,
};
use crate::error::Result;

/// Node type given to site nodes created by `init`.
pub const SITE_NODE_TYPE: &str = "site";

const STARTER_CONFIG: &str = r#"# cri configuration
#
# [context]
# workspace_name = "live"
# invisible_content_shown = true
#
# [presets.catalog]
# label = "Catalog"
#
# [[presets.catalog.parts]]
# name = "products"
# batchSize = 100
# source = "products.jsonl"
# siteNodePath = "/sites/demo"
# storagePath = "products"
# nodeType = "product"
# identifierField = "sku"
# labelField = "title"
#
# [presets.catalog.parts.properties]
# title = "title"
"#;

#[derive(Args, Debug)]
pub struct InitArgs {
    /// Site node to create (repeatable); defaults to every configured siteNodePath
    #[arg(long = "site", value_name = "PATH")]
    pub sites: Vec<String>,
}

#[derive(Serialize)]
struct InitReport {
    status: &'static str,
    root: String,
    database: Option<String>,
    config: String,
    config_created: bool,
    workspace: String,
    sites: Vec<SiteReport>,
}

#[derive(Serialize)]
struct SiteReport {
    path: String,
    identifier: String,
    created: bool,
}

pub fn run(ctx: &AppContext, args: &InitArgs) -> Result<()> {
    let config_created = write_starter_config(&ctx.config_path)?;

    let site_paths: BTreeSet<String> = if args.sites.is_empty() {
        ctx.config
            .presets
            .values()
            .flat_map(|preset| preset.parts.iter())
            .map(|part| part.site_node_path.clone())
            .collect()
    } else {
        args.sites.iter().cloned().collect()
    };

    let context = &ctx.config.context;
    let mut sites = Vec::new();
    for site_path in &site_paths {
        let (node, created) = ensure_site(&ctx.db, context, site_path)?;
        sites.push(SiteReport {
            path: node.path,
            identifier: node.identifier,
            created,
        });
    }

    let report = InitReport {
        status: "ok",
        root: ctx.root.display().to_string(),
        database: ctx.db.path().map(|path| path.display().to_string()),
        config: ctx.config_path.display().to_string(),
        config_created,
        workspace: context.workspace_name.clone(),
        sites,
    };

    if ctx.robot_mode {
        return emit_json(&report);
    }

    let mut layout = HumanLayout::new();
    layout
        .title("cri initialized")
        .kv("Root", &report.root)
        .kv("Database", report.database.as_deref().unwrap_or("(memory)"))
        .kv(
            "Config",
            &if config_created {
                format!("{} (created)", report.config)
            } else {
                report.config.clone()
            },
        )
        .kv("Workspace", &report.workspace);
    if !report.sites.is_empty() {
        layout.blank().section("Sites");
        for site in &report.sites {
            let marker = if site.created {
                style("+").green().to_string()
            } else {
                style("=").dim().to_string()
            };
            layout.push_line(format!("{marker} {}", site.path));
        }
    }
    emit_human(layout);
    Ok(())
}

fn write_starter_config(config_path: &Path) -> Result<bool> {
    if config_path.exists() {
        return Ok(false);
    }
    if let Some(parent) = config_path.parent() {
        fs::create_dir_all(parent)?;
    }
    fs::write(config_path, STARTER_CONFIG)?;
    tracing::info!(path = %config_path.display(), "starter config written");
    Ok(true)
}

/// Make sure the node at `site_path` exists, creating missing ancestors as
/// unstructured nodes and the site itself as a site node.
fn ensure_site(
    repository: &dyn ContentRepository,
    context: &ContentContext,
    site_path: &str,
) -> Result<(NodeRef, bool)> {
    let normalized = path::normalize(site_path)?;
    let root = repository.root_node(context)?;
    if let Some(existing) = repository.node(context, &normalized)? {
        return Ok((existing, false));
    }

    let parent_path = path::parent(&normalized).unwrap_or(path::ROOT_PATH);
    let parent = ensure_path(repository, context, &root, parent_path, UNSTRUCTURED_NODE_TYPE)?;
    let name = normalized.rsplit('/').next().unwrap_or_default();
    let site = repository.create_child(&parent, name, NewNode::new(SITE_NODE_TYPE))?;
    tracing::info!(path = %site.path, "site node created");
    Ok((site, true))
}
