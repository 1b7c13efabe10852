//! Exact-id, R1, R2, and URL-canonical dedup passes.

use std::collections::HashMap;

use jobtable_schema::JobRow;

/// Which optional dedup steps to run; exact-id always runs.
#[derive(Debug, Clone, Copy)]
pub struct DedupSettings {
    pub r1_dedup: bool,
    pub r2_dedup: bool,
    pub url_dedup: bool,
}

impl Default for DedupSettings {
    fn default() -> Self {
        Self {
            r1_dedup: true,
            r2_dedup: true,
            url_dedup: true,
        }
    }
}

#[derive(Debug, Default, Clone)]
pub struct DedupReport {
    pub exact_id_removed: usize,
    pub r1_filtered: usize,
    pub r2_filtered: usize,
    pub url_filtered: usize,
}

/// Step 1: group by `id.job`, keep last. Fresh rows are appended after
/// memory rows, so "last" means fresh wins when both exist.
fn dedup_exact_id(rows: Vec<JobRow>) -> Vec<JobRow> {
    let mut by_id: HashMap<String, usize> = HashMap::new();
    let mut kept: Vec<JobRow> = Vec::with_capacity(rows.len());

    for row in rows {
        if let Some(&idx) = by_id.get(&row.id.job) {
            kept[idx] = row;
        } else {
            by_id.insert(row.id.job.clone(), kept.len());
            kept.push(row);
        }
    }
    kept
}

fn mark_filtered(row: &mut JobRow, reason: &str) {
    row.route.filtered = true;
    row.route.final_status = format!("filtered: {}", reason);
    row.route.ready_for_ai = false;
}

/// Step 2/3: group by `key_fn`, keep the first row in each group, mark the
/// rest filtered with `reason`. Rows already filtered are left untouched.
fn dedup_by_key(
    rows: &mut [JobRow],
    reason: &str,
    key_fn: impl Fn(&JobRow) -> String,
) -> usize {
    let mut seen: HashMap<String, usize> = HashMap::new();
    let mut filtered_count = 0;
    for (i, row) in rows.iter_mut().enumerate() {
        if row.route.filtered {
            continue;
        }
        let key = key_fn(row);
        if key.is_empty() {
            continue;
        }
        if seen.contains_key(&key) {
            mark_filtered(row, reason);
            filtered_count += 1;
        } else {
            seen.insert(key, i);
        }
    }
    filtered_count
}

/// Step 4: group by `clean_apply_url`, preferring `id.source = "indeed"`
/// over `"google"` within a group.
fn dedup_by_url(rows: &mut [JobRow]) -> usize {
    let mut best_for_key: HashMap<String, (usize, u8)> = HashMap::new();
    let rank = |source: &str| -> u8 {
        match source {
            "indeed" => 0,
            "google" => 1,
            _ => 2,
        }
    };

    for (i, row) in rows.iter().enumerate() {
        if row.route.filtered || row.rules.clean_apply_url.is_empty() {
            continue;
        }
        let key = row.rules.clean_apply_url.clone();
        let this_rank = rank(&row.id.source);
        match best_for_key.get(&key) {
            Some(&(_, best_rank)) if best_rank <= this_rank => {}
            _ => {
                best_for_key.insert(key, (i, this_rank));
            }
        }
    }

    let keep: std::collections::HashSet<usize> = best_for_key.values().map(|&(i, _)| i).collect();
    let mut filtered_count = 0;
    for (i, row) in rows.iter_mut().enumerate() {
        if row.route.filtered || row.rules.clean_apply_url.is_empty() {
            continue;
        }
        if !keep.contains(&i) {
            mark_filtered(row, "URL duplicate");
            filtered_count += 1;
        }
    }
    filtered_count
}

/// Runs all enabled dedup passes in order, then physically drops every row
/// left with `route.filtered = true`.
pub fn deduplicate(rows: Vec<JobRow>, settings: DedupSettings) -> (Vec<JobRow>, DedupReport) {
    let mut report = DedupReport::default();

    let before_exact = rows.len();
    let mut rows = dedup_exact_id(rows);
    report.exact_id_removed = before_exact - rows.len();

    if settings.r1_dedup {
        report.r1_filtered = dedup_by_key(&mut rows, "R1 collapse", |r| r.rules.duplicate_r1.clone());
    }
    if settings.r2_dedup {
        report.r2_filtered = dedup_by_key(&mut rows, "R2 collapse", |r| r.rules.duplicate_r2.clone());
    }
    if settings.url_dedup {
        report.url_filtered = dedup_by_url(&mut rows);
    }

    rows.retain(|r| !r.route.filtered);
    tracing::debug!(
        exact_id = report.exact_id_removed,
        r1 = report.r1_filtered,
        r2 = report.r2_filtered,
        url = report.url_filtered,
        remaining = rows.len(),
        "dedup passes complete"
    );
    (rows, report)
}
