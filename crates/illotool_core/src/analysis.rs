use std::collections::{BTreeMap, BTreeSet};
use std::path::Path;

use serde::Serialize;
use tracing::info;

use crate::colors::extract_colors;
use crate::error::{Error, Result};
use crate::runtime::ResolvedPaths;
use crate::store::{AssetStore, write_atomic};

/// Color token -> number of distinct assets that contain it.
pub type ColorTally = BTreeMap<String, usize>;

/// Asset file name -> number of distinct color tokens in it.
pub type PerAssetColorCount = BTreeMap<String, usize>;

#[derive(Debug, Clone, Default, Serialize, PartialEq, Eq)]
pub struct AnalysisReport {
    pub assets_scanned: usize,
    pub colors: ColorTally,
    pub colors_per_asset: PerAssetColorCount,
}

impl AnalysisReport {
    /// Fold one asset's distinct tokens into both aggregates.
    pub fn record_asset(&mut self, name: &str, tokens: &BTreeSet<String>) {
        self.assets_scanned += 1;
        if tokens.is_empty() {
            return;
        }
        for token in tokens {
            *self.colors.entry(token.clone()).or_insert(0) += 1;
        }
        self.colors_per_asset.insert(name.to_string(), tokens.len());
    }

    pub fn colors_json(&self) -> Result<String> {
        to_pretty_json(&self.colors)
    }

    pub fn colors_per_asset_json(&self) -> Result<String> {
        to_pretty_json(&self.colors_per_asset)
    }
}

pub fn analyze_corpus(store: &AssetStore) -> Result<AnalysisReport> {
    let mut report = AnalysisReport::default();
    for name in store.list_assets()? {
        info!(asset = %name, "reading asset");
        let content = store.read_asset(&name)?;
        report.record_asset(&name, &extract_colors(&content));
    }
    Ok(report)
}

#[derive(Debug, Clone, Serialize)]
pub struct AnalysisOutput {
    pub report: AnalysisReport,
    pub colors_json: String,
    pub colors_per_asset_json: String,
}

/// Analyze the asset store and write both reports.
pub fn run_analysis(paths: &ResolvedPaths) -> Result<AnalysisOutput> {
    let store = AssetStore::new(&paths.assets_dir);
    let report = analyze_corpus(&store)?;
    let colors_json = report.colors_json()?;
    let colors_per_asset_json = report.colors_per_asset_json()?;

    write_report(&paths.colors_report_path, &colors_json)?;
    write_report(&paths.colors_per_asset_report_path, &colors_per_asset_json)?;

    Ok(AnalysisOutput {
        report,
        colors_json,
        colors_per_asset_json,
    })
}

fn write_report(path: &Path, json: &str) -> Result<()> {
    write_atomic(path, json.as_bytes())?;
    info!(path = %path.display(), "wrote report");
    Ok(())
}

fn to_pretty_json(value: &BTreeMap<String, usize>) -> Result<String> {
    serde_json::to_string_pretty(value).map_err(Error::Encode)
}
