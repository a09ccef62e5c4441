//! Partitioning of expected records into (name, type) groups.

use std::collections::BTreeMap;

use crate::types::{ExpectedRecord, RecordGroup, RecordType, Zone};

/// Turn a zone-relative name into an absolute one.
///
/// `"@"` maps to the bare domain; any other name is prefixed to it.
pub fn absolutize(domain: &str, name: &str) -> String {
    if name == "@" {
        return domain.to_string();
    }
    format!("{name}.{domain}")
}

/// Group the records of one zone by (absolute name, type).
///
/// No record is dropped or duplicated; an empty input yields no groups.
/// Groups come back ordered by name, then type.
pub fn group_records(domain: &str, records: &[ExpectedRecord]) -> Vec<RecordGroup> {
    let mut groups: BTreeMap<(String, RecordType), RecordGroup> = BTreeMap::new();

    for record in records {
        let name = absolutize(domain, &record.name);
        let key = (name, record.record_type.clone());
        if let Some(group) = groups.get_mut(&key) {
            group.push(record.clone());
        } else {
            let group = RecordGroup::new(domain, key.0.clone(), record.clone());
            groups.insert(key, group);
        }
    }

    let groups: Vec<RecordGroup> = groups.into_values().collect();
    for group in &groups {
        if group.has_divergent_ttl() {
            log::warn!(
                "{} {} declares differing TTL ceilings; using {} from the first record",
                group.record_type(),
                group.name(),
                group.ttl_ceiling()
            );
        }
    }
    groups
}

/// Group every zone of a dataset.
pub fn group_zones(zones: &[Zone]) -> Vec<RecordGroup> {
    zones
        .iter()
        .flat_map(|zone| group_records(&zone.name, &zone.records))
        .collect()
}
