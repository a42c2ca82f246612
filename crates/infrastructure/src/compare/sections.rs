use std::collections::BTreeMap;

use hickory_proto::rr::rdata::SOA;
use hickory_proto::rr::{Record, RecordType};

use super::canonical::{canonical_cmp, has_type, matching_key};
use super::report::DiffReport;

/// Result of diffing one Answer or Authority section.
pub(crate) struct SectionDiff {
    pub reference_only: Vec<Record>,
    pub shadow_only: Vec<Record>,
    pub reference_root_soa: Option<SOA>,
    pub shadow_root_soa: Option<SOA>,
}

/// Answer/Authority rule: drop RRSIGs, route the root SOA to the field-level
/// diff, then match the rest one-to-one by case-insensitive text.
pub(crate) fn compare_section(reference: &[Record], shadow: &[Record]) -> SectionDiff {
    let mut shadow_only: Vec<Record> = Vec::with_capacity(shadow.len());
    let mut shadow_root_soa = None;
    for record in shadow {
        if let Some(soa) = root_soa(record) {
            shadow_root_soa = Some(soa.clone());
            continue;
        }
        if !has_type(record, RecordType::RRSIG) {
            shadow_only.push(record.clone());
        }
    }

    let mut reference_only = Vec::new();
    let mut reference_root_soa = None;
    for record in reference {
        if has_type(record, RecordType::RRSIG) {
            continue;
        }
        if let Some(soa) = root_soa(record) {
            reference_root_soa = Some(soa.clone());
            continue;
        }
        let key = matching_key(record);
        if let Some(pos) = shadow_only.iter().position(|s| matching_key(s) == key) {
            // one match consumes exactly one occurrence on each side
            shadow_only.remove(pos);
        } else {
            reference_only.push(record.clone());
        }
    }

    SectionDiff {
        reference_only,
        shadow_only,
        reference_root_soa,
        shadow_root_soa,
    }
}

/// Additional-section rule: group into RRsets keyed by (type, lowercased
/// owner), drop OPT and RRSIG sets, and require the sets present on BOTH
/// sides to be deeply equal; one-sided sets (EDNS/glue variation) pass.
pub(crate) fn compare_additional(
    reference: &[Record],
    shadow: &[Record],
) -> (Vec<Record>, Vec<Record>) {
    let reference_sets = group_rrsets(reference);
    let mut shadow_sets = group_rrsets(shadow);

    let mut reference_only = Vec::new();
    let mut shadow_only = Vec::new();
    for (key, reference_set) in reference_sets {
        if key.0 == u16::from(RecordType::OPT) || key.0 == u16::from(RecordType::RRSIG) {
            continue;
        }
        let Some(shadow_set) = shadow_sets.remove(&key) else {
            continue;
        };
        if reference_set != shadow_set {
            reference_only.extend(reference_set);
            shadow_only.extend(shadow_set);
        }
    }
    (reference_only, shadow_only)
}

/// RRsets keyed by numeric type and lowercased owner, each sorted into
/// canonical order. The BTreeMap keeps report output deterministic.
fn group_rrsets(records: &[Record]) -> BTreeMap<(u16, String), Vec<Record>> {
    let mut sets: BTreeMap<(u16, String), Vec<Record>> = BTreeMap::new();
    for record in records {
        let key = (
            u16::from(record.record_type()),
            record.name().to_utf8().to_ascii_lowercase(),
        );
        sets.entry(key).or_default().push(record.clone());
    }
    for set in sets.values_mut() {
        set.sort_by(canonical_cmp);
    }
    sets
}

fn root_soa(record: &Record) -> Option<&SOA> {
    if has_type(record, RecordType::SOA) && record.name().is_root() {
        record.data().as_soa()
    } else {
        None
    }
}

/// Field-level diff of the two root SOAs. MNAME and RNAME differences are
/// deliberately ignored.
pub(crate) fn compare_soa(report: &mut DiffReport, reference: Option<&SOA>, shadow: Option<&SOA>) {
    match (reference, shadow) {
        (None, None) => {}
        (Some(soa), None) => report.push(format!("SOA only for reference: {soa}")),
        (None, Some(soa)) => report.push(format!("SOA only for shadow: {soa}")),
        (Some(reference), Some(shadow)) => {
            if reference.serial() != shadow.serial() {
                report.push(format!(
                    "SOA serial mismatch: reference {} vs shadow {}",
                    reference.serial(),
                    shadow.serial()
                ));
            }
            if reference.refresh() != shadow.refresh() {
                report.push(format!(
                    "SOA refresh mismatch: reference {} vs shadow {}",
                    reference.refresh(),
                    shadow.refresh()
                ));
            }
            if reference.retry() != shadow.retry() {
                report.push(format!(
                    "SOA retry mismatch: reference {} vs shadow {}",
                    reference.retry(),
                    shadow.retry()
                ));
            }
            if reference.expire() != shadow.expire() {
                report.push(format!(
                    "SOA expiry mismatch: reference {} vs shadow {}",
                    reference.expire(),
                    shadow.expire()
                ));
            }
            if reference.minimum() != shadow.minimum() {
                report.push(format!(
                    "SOA negative TTL mismatch: reference {} vs shadow {}",
                    reference.minimum(),
                    shadow.minimum()
                ));
            }
        }
    }
}
