//! Response comparator: normalizes two DNS responses for the same question
//! and reports the differences that matter, tolerating the ones that do not
//! (record order, signatures, EDNS payload, glue present on only one side).

mod canonical;
mod report;
mod sections;

pub use canonical::{canonical_cmp, canonical_text};
pub use report::DiffReport;

use hickory_proto::op::{Message, MessageType};
use hickory_proto::rr::Record;

use canonical::{opcode_to_str, rcode_to_str};
use sections::{compare_additional, compare_section, compare_soa};

/// Which optional header bits participate in the comparison.
#[derive(Debug, Clone, Copy, Default)]
pub struct CompareOptions {
    /// Compare the CD bit as well. Disabled by default.
    pub compare_checking_disabled: bool,
}

/// Compare a reference response against a shadow response obtained for
/// semantically the same query.
pub fn compare_responses(
    reference: &Message,
    shadow: &Message,
    options: CompareOptions,
) -> DiffReport {
    let mut report = DiffReport::new();

    if skip_comparison(reference) {
        report.push("Skipping query");
        return report;
    }

    compare_headers(&mut report, reference, shadow, options);

    let reference_answer = sorted(reference.answers());
    let shadow_answer = sorted(shadow.answers());
    let diff = compare_section(&reference_answer, &shadow_answer);
    push_section_diff(
        &mut report,
        "Answer section",
        &diff.reference_only,
        &diff.shadow_only,
        "only",
    );
    compare_soa(
        &mut report,
        diff.reference_root_soa.as_ref(),
        diff.shadow_root_soa.as_ref(),
    );

    let reference_authority = sorted(reference.name_servers());
    let shadow_authority = sorted(shadow.name_servers());
    let diff = compare_section(&reference_authority, &shadow_authority);
    push_section_diff(
        &mut report,
        "Authority section",
        &diff.reference_only,
        &diff.shadow_only,
        "only",
    );
    compare_soa(
        &mut report,
        diff.reference_root_soa.as_ref(),
        diff.shadow_root_soa.as_ref(),
    );

    let (reference_extra, shadow_extra) =
        compare_additional(reference.additionals(), shadow.additionals());
    push_section_diff(
        &mut report,
        "Additional section",
        &reference_extra,
        &shadow_extra,
        "mismatch",
    );

    report
}

/// Question names whose comparison is meaningless by construction: the root
/// zone itself, server-identity queries, the root servers' own names, and
/// `arpa.` (where some reference root servers are themselves authoritative).
fn skip_comparison(reference: &Message) -> bool {
    let Some(question) = reference.queries().first() else {
        return true;
    };
    let name = question.name().to_utf8().to_ascii_lowercase();
    name == "."
        || name == "id.server."
        || name == "hostname.bind."
        || name.ends_with(".root-servers.net.")
        || name.ends_with(".arpa.")
}

fn compare_headers(
    report: &mut DiffReport,
    reference: &Message,
    shadow: &Message,
    options: CompareOptions,
) {
    flag_mismatch(
        report,
        "Response",
        reference.message_type() == MessageType::Response,
        shadow.message_type() == MessageType::Response,
    );
    if reference.op_code() != shadow.op_code() {
        report.push(format!(
            "Opcode mismatch: reference {} vs shadow {}",
            opcode_to_str(reference.op_code()),
            opcode_to_str(shadow.op_code())
        ));
    }
    flag_mismatch(
        report,
        "Authoritative",
        reference.authoritative(),
        shadow.authoritative(),
    );
    // the TC bit is never compared: truncation is a transport artifact
    flag_mismatch(
        report,
        "Recursion desired",
        reference.recursion_desired(),
        shadow.recursion_desired(),
    );
    flag_mismatch(
        report,
        "Recursion available",
        reference.recursion_available(),
        shadow.recursion_available(),
    );
    flag_mismatch(
        report,
        "Authenticated data",
        reference.authentic_data(),
        shadow.authentic_data(),
    );
    if options.compare_checking_disabled {
        flag_mismatch(
            report,
            "Checking disabled",
            reference.checking_disabled(),
            shadow.checking_disabled(),
        );
    }
    if reference.response_code() != shadow.response_code() {
        report.push(format!(
            "Rcode mismatch: reference {} vs shadow {}",
            rcode_to_str(reference.response_code()),
            rcode_to_str(shadow.response_code())
        ));
    }
}

fn flag_mismatch(report: &mut DiffReport, label: &str, reference: bool, shadow: bool) {
    if reference != shadow {
        report.push(format!(
            "{label} flag mismatch: reference {reference} vs shadow {shadow}"
        ));
    }
}

fn sorted(records: &[Record]) -> Vec<Record> {
    let mut out = records.to_vec();
    out.sort_by(canonical_cmp);
    out
}

fn push_section_diff(
    report: &mut DiffReport,
    section: &str,
    reference_only: &[Record],
    shadow_only: &[Record],
    suffix: &str,
) {
    if !reference_only.is_empty() {
        report.push(format!("{section}, reference {suffix}"));
        for record in reference_only {
            report.push(record.to_string());
        }
    }
    if !shadow_only.is_empty() {
        report.push(format!("{section}, shadow {suffix}"));
        for record in shadow_only {
            report.push(record.to_string());
        }
    }
}
