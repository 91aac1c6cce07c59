use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use std::process::Command;

use serde::Serialize;
use tracing::{info, warn};

use crate::catalog::{
    CatalogApi, CatalogEntry, HttpCatalogClient, HttpCatalogConfig, collect_catalog,
};
use crate::error::{Error, Result};
use crate::identifier::derive_identifier;
use crate::mapping::{GeneratedMapping, MappingRow};
use crate::runtime::{ResolvedPaths, Runtime};
use crate::store::{AssetRecord, AssetStore, write_atomic};

#[derive(Debug, Clone, Default)]
pub struct SyncOptions {
    /// Argv run with the mapping path appended once the mapping is written.
    pub format_command: Vec<String>,
}

#[derive(Debug, Clone, Serialize)]
pub struct IdentifierCollision {
    pub id: String,
    pub titles: Vec<String>,
}

#[derive(Debug, Clone, Serialize)]
pub struct SyncReport {
    pub catalog_entries: usize,
    pub downloaded: usize,
    pub mapping_members: usize,
    pub mapping_rows: usize,
    pub collisions: Vec<IdentifierCollision>,
    pub mapping_path: PathBuf,
    pub formatted: bool,
    pub request_count: usize,
}

/// Mirror the remote catalog into the asset store and regenerate the mapping.
pub fn sync_catalog(runtime: &Runtime) -> Result<SyncReport> {
    let mut client = HttpCatalogClient::new(HttpCatalogConfig::from_config(&runtime.config))?;
    let options = SyncOptions {
        format_command: runtime.config.mapping.format_command.clone(),
    };
    sync_catalog_with_api(&runtime.paths, &options, &mut client)
}

pub fn sync_catalog_with_api<A: CatalogApi>(
    paths: &ResolvedPaths,
    options: &SyncOptions,
    api: &mut A,
) -> Result<SyncReport> {
    let mut entries = collect_catalog(api)?;
    for entry in &mut entries {
        entry.id = derive_identifier(&entry.title);
    }
    let collisions = find_collisions(&entries);
    for collision in &collisions {
        warn!(
            id = %collision.id,
            titles = ?collision.titles,
            "titles share an identifier; the last one wins"
        );
    }

    let mut sorted = entries.clone();
    sorted.sort_by(|left, right| left.id.cmp(&right.id));

    let store = AssetStore::new(&paths.assets_dir);
    store.ensure_root()?;

    let mut records: Vec<AssetRecord> = Vec::with_capacity(entries.len());
    for entry in &entries {
        info!(id = %entry.id, "downloading illustration");
        let bytes = api.fetch_asset(&entry.image_url)?;
        records.push(store.write_asset(&entry.id, &bytes)?);
    }

    let rows = records
        .iter()
        .map(|record| MappingRow {
            id: record.id.clone(),
            asset_path: paths.display_relative(&record.path),
        })
        .collect();
    let mapping = GeneratedMapping::build(&sorted, rows);
    write_atomic(&paths.mapping_path, mapping.render().as_bytes())?;
    info!(path = %paths.mapping_path.display(), "wrote generated mapping");

    let formatted = run_formatter(&options.format_command, &paths.mapping_path)?;

    Ok(SyncReport {
        catalog_entries: entries.len(),
        downloaded: records.len(),
        mapping_members: mapping.members.len(),
        mapping_rows: mapping.rows.len(),
        collisions,
        mapping_path: paths.mapping_path.clone(),
        formatted,
        request_count: api.request_count(),
    })
}

fn find_collisions(entries: &[CatalogEntry]) -> Vec<IdentifierCollision> {
    let mut titles_by_id: BTreeMap<&str, Vec<String>> = BTreeMap::new();
    for entry in entries {
        titles_by_id
            .entry(entry.id.as_str())
            .or_default()
            .push(entry.title.clone());
    }
    titles_by_id
        .into_iter()
        .filter(|(_, titles)| titles.len() > 1)
        .map(|(id, titles)| IdentifierCollision {
            id: id.to_string(),
            titles,
        })
        .collect()
}

fn run_formatter(command: &[String], target: &Path) -> Result<bool> {
    let Some((program, args)) = command.split_first() else {
        return Ok(false);
    };
    let rendered = command.join(" ");
    let status = Command::new(program)
        .args(args)
        .arg(target)
        .status()
        .map_err(|error| Error::Format {
            command: rendered.clone(),
            detail: error.to_string(),
        })?;
    if !status.success() {
        return Err(Error::Format {
            command: rendered,
            detail: format!("exited with {status}"),
        });
    }
    Ok(true)
}
