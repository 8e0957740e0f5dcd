use super::report::SchemaVariant;
use super::ParseError;
use serde_json::Value;

const CURRENT_CONTAINER: &str = "CCRResponse";
const CURRENT_LIST: &[&str] = &["CIRReportDataLst"];
const LEGACY_CONTAINER: &str = "InquiryResponse";
const LEGACY_LIST: &[&str] = &["ReportData", "ReportDataLst"];
const HEADER: &str = "InquiryResponseHeader";
const REPORT: &str = "CIRReportData";

/// The blocks of a payload that downstream parsing reads, located once.
///
/// Everything after [`detect`] works against this shape only; the variant is
/// carried for reporting and never inspected by business logic.
#[derive(Debug, Clone, Copy)]
pub(crate) struct ReportEnvelope<'a> {
    pub(crate) variant: SchemaVariant,
    pub(crate) container: &'a Value,
    pub(crate) entry: &'a Value,
    pub(crate) report: &'a Value,
    pub(crate) header: Option<&'a Value>,
}

pub(crate) fn detect(payload: &Value) -> Result<ReportEnvelope<'_>, ParseError> {
    let candidates = [
        (SchemaVariant::Current, CURRENT_CONTAINER, CURRENT_LIST),
        (SchemaVariant::Legacy, LEGACY_CONTAINER, LEGACY_LIST),
    ];

    for (variant, container_key, list_path) in candidates {
        let Some(container) = payload.get(container_key) else {
            continue;
        };
        let Some(entries) = walk(container, list_path).and_then(Value::as_array) else {
            continue;
        };
        if entries.is_empty() {
            continue;
        }

        let entry = entries
            .iter()
            .find(|entry| entry.get(REPORT).is_some_and(Value::is_object))
            .unwrap_or(&entries[0]);
        let report = entry.get(REPORT).unwrap_or(entry);
        let header = [entry, container, payload]
            .into_iter()
            .find_map(|block| block.get(HEADER).filter(|header| header.is_object()));

        tracing::debug!(?variant, entries = entries.len(), "bureau report container located");

        return Ok(ReportEnvelope {
            variant,
            container,
            entry,
            report,
            header,
        });
    }

    Err(ParseError::ContainerNotFound)
}

impl<'a> ReportEnvelope<'a> {
    /// Score blocks in priority order: container, report entry, report score card.
    pub(crate) fn score_blocks(&self) -> [Option<&'a Value>; 3] {
        [
            self.container.get("ScoreDetails"),
            self.entry.get("ScoreDetails"),
            self.report
                .get("ScoreDetails")
                .or_else(|| self.report.get("ScoreCard")),
        ]
    }
}

fn walk<'a>(value: &'a Value, path: &[&str]) -> Option<&'a Value> {
    path.iter().try_fold(value, |current, key| current.get(*key))
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn prefers_current_container() {
        let payload = json!({
            "CCRResponse": { "CIRReportDataLst": [ { "CIRReportData": { "marker": "current" } } ] },
            "InquiryResponse": { "ReportData": { "ReportDataLst": [ { "CIRReportData": { "marker": "legacy" } } ] } }
        });
        let envelope = detect(&payload).expect("container found");
        assert_eq!(envelope.variant, SchemaVariant::Current);
        assert_eq!(envelope.report["marker"], "current");
    }

    #[test]
    fn falls_back_to_legacy_when_current_list_empty() {
        let payload = json!({
            "CCRResponse": { "CIRReportDataLst": [] },
            "InquiryResponse": {
                "InquiryResponseHeader": { "HitCode": "10" },
                "ReportData": { "ReportDataLst": [ { "CIRReportData": { "marker": "legacy" } } ] }
            }
        });
        let envelope = detect(&payload).expect("legacy container found");
        assert_eq!(envelope.variant, SchemaVariant::Legacy);
        assert_eq!(envelope.report["marker"], "legacy");
        assert_eq!(envelope.header.expect("header")["HitCode"], "10");
    }

    #[test]
    fn missing_container_is_fatal() {
        let error = detect(&json!({ "Status": "ok" })).expect_err("no container");
        assert_eq!(error.to_string(), "container not found");
        assert!(detect(&json!([1, 2, 3])).is_err());
    }
}
