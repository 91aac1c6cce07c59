//! Dart source that maps every mirrored illustration to its asset path.

use crate::catalog::CatalogEntry;

pub const ENUM_NAME: &str = "UnDrawIllustration";
pub const MAP_NAME: &str = "unDrawIllustrations";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MappingMember {
    pub id: String,
    pub title: String,
    pub image_url: String,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MappingRow {
    pub id: String,
    pub asset_path: String,
}

/// Enum declarations plus the member-to-path table.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct GeneratedMapping {
    pub members: Vec<MappingMember>,
    pub rows: Vec<MappingRow>,
}

impl GeneratedMapping {
    /// `sorted_entries` must already be ordered by id; `rows` are in download order.
    ///
    /// Entries sharing an id collapse to one member and one row; the later one wins.
    pub fn build(sorted_entries: &[CatalogEntry], rows: Vec<MappingRow>) -> Self {
        let mut members: Vec<MappingMember> = Vec::with_capacity(sorted_entries.len());
        for entry in sorted_entries {
            let member = MappingMember {
                id: entry.id.clone(),
                title: entry.title.clone(),
                image_url: entry.image_url.clone(),
            };
            if members.last().is_some_and(|last| last.id == member.id) {
                members.pop();
            }
            members.push(member);
        }

        let mut deduped: Vec<MappingRow> = Vec::with_capacity(rows.len());
        for row in rows {
            match deduped.iter().position(|existing| existing.id == row.id) {
                Some(index) => deduped[index] = row,
                None => deduped.push(row),
            }
        }

        Self {
            members,
            rows: deduped,
        }
    }

    pub fn render(&self) -> String {
        let mut out = String::new();
        out.push_str("// GENERATED CODE - DO NOT MODIFY BY HAND\n");
        out.push_str("// ignore_for_file: unused_field\n\n");
        out.push_str("/// Enums to help locate the correct illustration\n");
        out.push_str(&format!("enum {ENUM_NAME} {{\n"));
        for member in &self.members {
            let title = single_line(&member.title);
            out.push_str(&format!("  /// Title: {title}\n"));
            out.push_str("  /// <br/>\n");
            out.push_str(&format!(
                "  /// <img src=\"{}\" alt=\"{title}\" width=\"200\"/>\n",
                single_line(&member.image_url)
            ));
            out.push_str(&format!("  {},\n", member.id));
        }
        out.push_str("}\n\n");

        out.push_str("/// Map of illustrations with url to download\n");
        out.push_str(&format!("const Map<{ENUM_NAME}, String> {MAP_NAME} = {{\n"));
        for row in &self.rows {
            out.push_str(&format!(
                "  {ENUM_NAME}.{}: \"{}\",\n",
                row.id,
                escape_dart_string(&row.asset_path)
            ));
        }
        out.push_str("};\n");
        out
    }
}

/// Doc comments are line comments, so embedded line breaks become spaces.
fn single_line(value: &str) -> String {
    value.replace(['\r', '\n'], " ")
}

fn escape_dart_string(value: &str) -> String {
    let mut escaped = String::with_capacity(value.len());
    for ch in value.chars() {
        match ch {
            '\\' => escaped.push_str("\\\\"),
            '"' => escaped.push_str("\\\""),
            '$' => escaped.push_str("\\$"),
            _ => escaped.push(ch),
        }
    }
    escaped
}
