//! Aggregation engine
//!
//! Computes utilization and breakdown statistics over a date-filtered,
//! multi-machine union of usage records. Numeric cells that fail to parse
//! count as 0 toward totals while the record still counts toward the record
//! count; records whose start date fails to parse are excluded by any date
//! range filter but retained in unfiltered totals. Both behaviors are
//! deliberate and asserted by tests.

use std::collections::HashSet;

use chrono::NaiveDate;
use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use crate::{
    error::AppResult,
    models::{
        company::CompanyDirectory,
        enums::{CompanySize, ProcessCategory},
        record::UsageRecord,
    },
    services::{records::RecordsService, reference::ReferenceService},
};

/// Grouping axis for breakdown statistics
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "snake_case")]
pub enum GroupBy {
    Equipment,
    CompanySize,
    Process,
}

/// Totals for one group bucket
#[derive(Debug, Clone, PartialEq, Serialize, ToSchema)]
pub struct GroupSummary {
    pub group_key: String,
    pub total_hours: f64,
    pub record_count: i64,
    /// Omitted when no record in the group carried a fee column
    #[serde(skip_serializing_if = "Option::is_none")]
    pub total_fee: Option<i64>,
}

/// Utilization figures for one machine over a period
#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct UtilizationSummary {
    pub equipment_name: String,
    pub total_hours: f64,
    pub record_count: i64,
    pub average_hours: f64,
    /// Monthly target the percentage is computed against
    pub target_hours: f64,
    pub utilization_percent: f64,
}

/// Pass filter: machine set (empty = no restriction) and inclusive date
/// range. An unparseable start date matches no range.
fn passes(
    record: &UsageRecord,
    range: Option<(NaiveDate, NaiveDate)>,
    machines: &HashSet<String>,
) -> bool {
    if !machines.is_empty() && !machines.contains(record.equipment_name.trim()) {
        return false;
    }
    match range {
        None => true,
        Some((start, end)) => match record.start_date() {
            Some(d) => d >= start && d <= end,
            None => false,
        },
    }
}

/// Order group keys: fixed members first in their mandated order, anything
/// else after them in first-seen order.
fn bucket_rank(fixed: &[&str], key: &str) -> usize {
    fixed
        .iter()
        .position(|f| *f == key)
        .unwrap_or(fixed.len())
}

/// Aggregate a record union into ordered group summaries.
pub fn aggregate(
    records: &[UsageRecord],
    range: Option<(NaiveDate, NaiveDate)>,
    machines: &HashSet<String>,
    group_by: GroupBy,
    companies: &CompanyDirectory,
) -> Vec<GroupSummary> {
    // accumulator preserves first-seen order for out-of-set buckets
    let mut groups: IndexMap<String, GroupSummary> = IndexMap::new();

    for record in records.iter().filter(|r| passes(r, range, machines)) {
        let key = match group_by {
            GroupBy::Equipment => record.equipment_name.trim().to_string(),
            GroupBy::CompanySize => companies.bucket_for(&record.company_name),
            GroupBy::Process => {
                let process = record.process_category.trim().to_string();
                // rows with no process classification stay out of the
                // process breakdown (matching the source views)
                if process.is_empty() {
                    continue;
                }
                process
            }
        };

        let entry = groups.entry(key.clone()).or_insert(GroupSummary {
            group_key: key,
            total_hours: 0.0,
            record_count: 0,
            total_fee: None,
        });
        entry.total_hours += record.hours();
        entry.record_count += 1;
        if let Some(fee) = record.fee() {
            *entry.total_fee.get_or_insert(0) += fee;
        }
    }

    let mut summaries: Vec<GroupSummary> = groups.into_values().collect();
    match group_by {
        GroupBy::Equipment => {
            summaries.sort_by(|a, b| {
                b.total_hours
                    .partial_cmp(&a.total_hours)
                    .unwrap_or(std::cmp::Ordering::Equal)
            });
        }
        GroupBy::CompanySize => {
            summaries.sort_by_key(|s| bucket_rank(&CompanySize::DISPLAY_ORDER, &s.group_key));
        }
        GroupBy::Process => {
            summaries
                .sort_by_key(|s| bucket_rank(&ProcessCategory::DISPLAY_ORDER, &s.group_key));
        }
    }
    summaries
}

/// Utilization over an already-filtered record set.
pub fn utilization(
    equipment_name: &str,
    records: &[UsageRecord],
    range: Option<(NaiveDate, NaiveDate)>,
    target_hours: f64,
) -> UtilizationSummary {
    let machines: HashSet<String> = [equipment_name.to_string()].into_iter().collect();
    let mut total_hours = 0.0;
    let mut record_count = 0i64;
    for record in records.iter().filter(|r| passes(r, range, &machines)) {
        total_hours += record.hours();
        record_count += 1;
    }
    let average_hours = if record_count > 0 {
        total_hours / record_count as f64
    } else {
        0.0
    };
    let utilization_percent = if target_hours > 0.0 {
        total_hours / target_hours * 100.0
    } else {
        0.0
    };
    UtilizationSummary {
        equipment_name: equipment_name.to_string(),
        total_hours,
        record_count,
        average_hours,
        target_hours,
        utilization_percent,
    }
}

#[derive(Clone)]
pub struct StatsService {
    records: RecordsService,
    reference: ReferenceService,
}

impl StatsService {
    pub fn new(records: RecordsService, reference: ReferenceService) -> Self {
        Self { records, reference }
    }

    /// Union the selected equipment tables. A machine whose table is missing
    /// is skipped with a warning rather than failing the whole analysis.
    async fn union_records(&self, equipment: &[String]) -> AppResult<Vec<UsageRecord>> {
        let mut all = Vec::new();
        for name in equipment {
            match self.records.read_records(name).await {
                Ok(mut records) => all.append(&mut records),
                Err(e) => {
                    tracing::warn!(table = %name, "skipping machine in analysis: {}", e);
                }
            }
        }
        Ok(all)
    }

    /// Breakdown statistics over a multi-machine union.
    pub async fn breakdown(
        &self,
        equipment: &[String],
        range: Option<(NaiveDate, NaiveDate)>,
        group_by: GroupBy,
    ) -> AppResult<Vec<GroupSummary>> {
        let records = self.union_records(equipment).await?;
        let machines: HashSet<String> = equipment.iter().map(|e| e.trim().to_string()).collect();
        let companies = self.reference.load_companies().await;
        Ok(aggregate(&records, range, &machines, group_by, &companies))
    }

    /// Utilization for one machine over a period.
    pub async fn utilization(
        &self,
        equipment_name: &str,
        range: Option<(NaiveDate, NaiveDate)>,
        target_hours: f64,
    ) -> AppResult<UtilizationSummary> {
        let records = self.records.read_records(equipment_name).await?;
        Ok(utilization(equipment_name, &records, range, target_hours))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn record(
        equipment: &str,
        company: &str,
        start: &str,
        hours: &str,
        fee: Option<&str>,
        process: &str,
    ) -> UsageRecord {
        UsageRecord {
            equipment_name: equipment.to_string(),
            company_name: company.to_string(),
            usage_start: start.to_string(),
            usage_hours: hours.to_string(),
            usage_fee: fee.map(String::from),
            process_category: process.to_string(),
            ..UsageRecord::default()
        }
    }

    fn directory() -> CompanyDirectory {
        let mut dir = CompanyDirectory::default();
        for (name, size) in [
            ("Daehan Heavy", "large"),
            ("Acme Plasma", "SME"),
            ("KNU Lab", "school"),
        ] {
            dir.names.push(name.to_string());
            dir.sizes.insert(name.to_string(), size.to_string());
        }
        dir
    }

    fn no_machines() -> HashSet<String> {
        HashSet::new()
    }

    #[test]
    fn company_size_buckets_keep_mandated_order() {
        // input deliberately ordered against the display order
        let records = vec![
            record("A", "KNU Lab", "2026-01-01", "1", None, ""),
            record("A", "Unknown Co", "2026-01-02", "1", None, ""),
            record("A", "Acme Plasma", "2026-01-03", "1", None, ""),
            record("A", "Daehan Heavy", "2026-01-04", "1", None, ""),
        ];
        let summaries = aggregate(
            &records,
            None,
            &no_machines(),
            GroupBy::CompanySize,
            &directory(),
        );
        let keys: Vec<&str> = summaries.iter().map(|s| s.group_key.as_str()).collect();
        assert_eq!(keys, vec!["large", "SME", "school", "other"]);
    }

    #[test]
    fn out_of_set_buckets_follow_in_first_seen_order() {
        let mut dir = directory();
        dir.sizes.insert("Gov A".to_string(), "government".to_string());
        dir.sizes.insert("Foreign B".to_string(), "overseas".to_string());
        let records = vec![
            record("A", "Gov A", "2026-01-01", "1", None, ""),
            record("A", "Acme Plasma", "2026-01-02", "1", None, ""),
            record("A", "Foreign B", "2026-01-03", "1", None, ""),
        ];
        let summaries = aggregate(&records, None, &no_machines(), GroupBy::CompanySize, &dir);
        let keys: Vec<&str> = summaries.iter().map(|s| s.group_key.as_str()).collect();
        assert_eq!(keys, vec!["SME", "government", "overseas"]);
    }

    #[test]
    fn process_buckets_keep_mandated_order_and_skip_blank() {
        let records = vec![
            record("A", "", "2026-01-01", "1", None, "measurement-analysis"),
            record("A", "", "2026-01-02", "1", None, ""),
            record("A", "", "2026-01-03", "1", None, "unit-process"),
            record("A", "", "2026-01-04", "1", None, "module-process"),
        ];
        let summaries = aggregate(
            &records,
            None,
            &no_machines(),
            GroupBy::Process,
            &CompanyDirectory::default(),
        );
        let keys: Vec<&str> = summaries.iter().map(|s| s.group_key.as_str()).collect();
        assert_eq!(
            keys,
            vec!["unit-process", "module-process", "measurement-analysis"]
        );
        let total: i64 = summaries.iter().map(|s| s.record_count).sum();
        assert_eq!(total, 3);
    }

    #[test]
    fn unparseable_hours_count_as_zero_but_record_counts() {
        let records = vec![
            record("A", "", "2026-01-01", "2.5", Some("1000"), ""),
            record("A", "", "2026-01-02", "abc", Some("500"), ""),
        ];
        let summaries = aggregate(
            &records,
            None,
            &no_machines(),
            GroupBy::Equipment,
            &CompanyDirectory::default(),
        );
        assert_eq!(summaries.len(), 1);
        assert_eq!(summaries[0].total_hours, 2.5);
        assert_eq!(summaries[0].record_count, 2);
        assert_eq!(summaries[0].total_fee, Some(1500));
    }

    #[test]
    fn unparseable_start_date_fails_even_unbounded_ranges() {
        let records = vec![
            record("A", "", "2026-01-01", "1", None, ""),
            record("A", "", "not a date", "1", None, ""),
        ];
        let range = Some((
            NaiveDate::from_ymd_opt(1970, 1, 1).unwrap(),
            NaiveDate::from_ymd_opt(9999, 12, 31).unwrap(),
        ));
        let filtered = aggregate(
            &records,
            range,
            &no_machines(),
            GroupBy::Equipment,
            &CompanyDirectory::default(),
        );
        assert_eq!(filtered[0].record_count, 1);

        // retained for unfiltered totals
        let unfiltered = aggregate(
            &records,
            None,
            &no_machines(),
            GroupBy::Equipment,
            &CompanyDirectory::default(),
        );
        assert_eq!(unfiltered[0].record_count, 2);
    }

    #[test]
    fn fee_total_is_omitted_when_no_record_has_a_fee_column() {
        let records = vec![
            record("A", "", "2026-01-01", "1", None, ""),
            record("A", "", "2026-01-02", "1", None, ""),
        ];
        let summaries = aggregate(
            &records,
            None,
            &no_machines(),
            GroupBy::Equipment,
            &CompanyDirectory::default(),
        );
        assert_eq!(summaries[0].total_fee, None);

        // a present-but-unparseable fee still yields a (zero) total
        let records = vec![record("A", "", "2026-01-01", "1", Some("n/a"), "")];
        let summaries = aggregate(
            &records,
            None,
            &no_machines(),
            GroupBy::Equipment,
            &CompanyDirectory::default(),
        );
        assert_eq!(summaries[0].total_fee, Some(0));
    }

    #[test]
    fn machine_filter_restricts_and_empty_filter_does_not() {
        let records = vec![
            record("A", "", "2026-01-01", "1", None, ""),
            record("B", "", "2026-01-02", "2", None, ""),
        ];
        let machines: HashSet<String> = ["A".to_string()].into_iter().collect();
        let filtered = aggregate(
            &records,
            None,
            &machines,
            GroupBy::Equipment,
            &CompanyDirectory::default(),
        );
        assert_eq!(filtered.len(), 1);
        assert_eq!(filtered[0].group_key, "A");

        let all = aggregate(
            &records,
            None,
            &no_machines(),
            GroupBy::Equipment,
            &CompanyDirectory::default(),
        );
        assert_eq!(all.len(), 2);
    }

    #[test]
    fn equipment_grouping_orders_by_hours_descending() {
        let records = vec![
            record("A", "", "2026-01-01", "1", None, ""),
            record("B", "", "2026-01-02", "5", None, ""),
            record("C", "", "2026-01-03", "3", None, ""),
        ];
        let summaries = aggregate(
            &records,
            None,
            &no_machines(),
            GroupBy::Equipment,
            &CompanyDirectory::default(),
        );
        let keys: Vec<&str> = summaries.iter().map(|s| s.group_key.as_str()).collect();
        assert_eq!(keys, vec!["B", "C", "A"]);
    }

    #[test]
    fn utilization_matches_the_posted_formula() {
        let records = vec![
            record("A", "", "2026-01-01", "400", None, ""),
            record("A", "", "2026-01-02", "350", None, ""),
        ];
        let summary = utilization("A", &records, None, 1000.0);
        assert_eq!(summary.total_hours, 750.0);
        assert_eq!(summary.record_count, 2);
        assert_eq!(summary.average_hours, 375.0);
        assert_eq!(summary.utilization_percent, 75.0);
    }
}
