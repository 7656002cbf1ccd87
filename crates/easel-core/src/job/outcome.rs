//! Terminal outcome classification for generation attempts.

use crate::error::JobError;
use crate::types::ServerEvent;

/// Fixed failure-reason code to human message table.
///
/// Unmapped codes fall back to a generic `原因: <code>` message.
const FAILURE_REASONS: &[(&str, &str)] = &[
    ("output_moderation", "违反使用政策（生成内容）"),
    ("input_moderation", "违反使用政策（输入内容）"),
    ("error", "其他错误"),
];

/// Classify a terminal server record into the attempt's outcome.
///
/// Applies uniformly whether the record came from a single JSON document or
/// was the captured terminal stream event. Returns the first result's URL on
/// success; subsequent results, if any, are not surfaced. Every failure path
/// maps to a retry-eligible [`JobError`].
pub fn classify(event: &ServerEvent) -> Result<String, JobError> {
    if event.status.as_deref() == Some("succeeded") {
        if let Some(first) = event.results.first() {
            return Ok(first.url.clone());
        }
    }

    if event.status.as_deref() == Some("failed") {
        let reason = match &event.failure_reason {
            Some(code) => FAILURE_REASONS
                .iter()
                .find(|(known, _)| *known == code.as_str())
                .map(|(_, text)| (*text).to_string())
                .unwrap_or_else(|| format!("原因: {code}")),
            None => "原因未知".to_string(),
        };
        let message = match &event.error {
            Some(detail) => format!("{reason}（详情: {detail}）"),
            None => reason,
        };
        return Err(JobError::ServerFailure { message });
    }

    if let Some(error) = &event.error {
        return Err(JobError::ServerFailure {
            message: error.clone(),
        });
    }

    // Includes a nominally still-running task whose transport closed, and a
    // "succeeded" record with an empty result list.
    let status = event.status.as_deref().unwrap_or("无");
    Err(JobError::UnknownOutcome {
        message: format!("任务未完成或状态未知: {status}"),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::GeneratedImage;

    fn succeeded(urls: &[&str]) -> ServerEvent {
        ServerEvent {
            status: Some("succeeded".to_string()),
            results: urls
                .iter()
                .map(|u| GeneratedImage {
                    url: (*u).to_string(),
                })
                .collect(),
            ..Default::default()
        }
    }

    fn failed(reason: Option<&str>, detail: Option<&str>) -> ServerEvent {
        ServerEvent {
            status: Some("failed".to_string()),
            failure_reason: reason.map(String::from),
            error: detail.map(String::from),
            ..Default::default()
        }
    }

    #[test]
    fn test_success_surfaces_first_result_only() {
        let url = classify(&succeeded(&["https://x/1.png", "https://x/2.png"])).unwrap();
        assert_eq!(url, "https://x/1.png");
    }

    #[test]
    fn test_success_with_empty_results_is_unknown_outcome() {
        let err = classify(&succeeded(&[])).unwrap_err();
        match err {
            JobError::UnknownOutcome { message } => {
                assert!(message.contains("succeeded"), "got: {message}");
            }
            other => panic!("expected UnknownOutcome, got {other:?}"),
        }
    }

    #[test]
    fn test_mapped_failure_reason() {
        let err = classify(&failed(Some("output_moderation"), None)).unwrap_err();
        match err {
            JobError::ServerFailure { message } => {
                assert_eq!(message, "违反使用政策（生成内容）");
            }
            other => panic!("expected ServerFailure, got {other:?}"),
        }
    }

    #[test]
    fn test_unmapped_failure_reason_falls_back_to_code() {
        let err = classify(&failed(Some("gpu_on_fire"), None)).unwrap_err();
        match err {
            JobError::ServerFailure { message } => {
                assert_eq!(message, "原因: gpu_on_fire");
            }
            other => panic!("expected ServerFailure, got {other:?}"),
        }
    }

    #[test]
    fn test_missing_failure_reason() {
        let err = classify(&failed(None, None)).unwrap_err();
        match err {
            JobError::ServerFailure { message } => assert_eq!(message, "原因未知"),
            other => panic!("expected ServerFailure, got {other:?}"),
        }
    }

    #[test]
    fn test_failure_detail_appended_verbatim() {
        let err = classify(&failed(Some("input_moderation"), Some("nsfw input"))).unwrap_err();
        match err {
            JobError::ServerFailure { message } => {
                assert_eq!(message, "违反使用政策（输入内容）（详情: nsfw input）");
            }
            other => panic!("expected ServerFailure, got {other:?}"),
        }
    }

    #[test]
    fn test_bare_error_without_status() {
        let event = ServerEvent {
            error: Some("quota exceeded".to_string()),
            ..Default::default()
        };
        let err = classify(&event).unwrap_err();
        match err {
            JobError::ServerFailure { message } => assert_eq!(message, "quota exceeded"),
            other => panic!("expected ServerFailure, got {other:?}"),
        }
    }

    #[test]
    fn test_unknown_status_carries_raw_value() {
        let event = ServerEvent {
            status: Some("running".to_string()),
            ..Default::default()
        };
        let err = classify(&event).unwrap_err();
        match err {
            JobError::UnknownOutcome { message } => {
                assert_eq!(message, "任务未完成或状态未知: running");
            }
            other => panic!("expected UnknownOutcome, got {other:?}"),
        }
    }

    #[test]
    fn test_empty_record_reports_missing_status() {
        let err = classify(&ServerEvent::default()).unwrap_err();
        match err {
            JobError::UnknownOutcome { message } => {
                assert_eq!(message, "任务未完成或状态未知: 无");
            }
            other => panic!("expected UnknownOutcome, got {other:?}"),
        }
    }
}
