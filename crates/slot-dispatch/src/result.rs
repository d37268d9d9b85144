use device_link::TransportError;
use serde::{Deserialize, Serialize};
use slot_intent::{ClassifyError, Intent, ParseError};
use slot_registry::TranslateError;
use std::time::Duration;
use thiserror::Error;
use voice_local::VoiceError;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Outcome {
    Success,
    Fail,
}

/// Failure categories surfaced to callers.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ErrorKind {
    MissingSlotNumber,
    MissingItemName,
    UnrecognizedItem,
    SlotNotFound,
    UnknownSlotCode,
    TransportFailure,
    RecognitionFailure,
    ClassificationFailure,
    Timeout,
    Aborted,
}

impl ErrorKind {
    pub fn as_str(self) -> &'static str {
        match self {
            ErrorKind::MissingSlotNumber => "missing_slot_number",
            ErrorKind::MissingItemName => "missing_item_name",
            ErrorKind::UnrecognizedItem => "unrecognized_item",
            ErrorKind::SlotNotFound => "slot_not_found",
            ErrorKind::UnknownSlotCode => "unknown_slot_code",
            ErrorKind::TransportFailure => "transport_failure",
            ErrorKind::RecognitionFailure => "recognition_failure",
            ErrorKind::ClassificationFailure => "classification_failure",
            ErrorKind::Timeout => "timeout",
            ErrorKind::Aborted => "aborted",
        }
    }
}

#[derive(Debug, Error)]
pub enum DispatchError {
    #[error(transparent)]
    Parse(#[from] ParseError),
    #[error(transparent)]
    Classify(#[from] ClassifyError),
    #[error(transparent)]
    Translate(#[from] TranslateError),
    #[error(transparent)]
    Transport(#[from] TransportError),
    #[error(transparent)]
    Voice(#[from] VoiceError),
    #[error("no slot recorded for {0}")]
    SlotNotFound(String),
    #[error("request timed out after {0:?}")]
    Timeout(Duration),
    #[error("request task aborted: {0}")]
    Aborted(String),
}

impl DispatchError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            DispatchError::Parse(ParseError::MissingSlotNumber) => ErrorKind::MissingSlotNumber,
            DispatchError::Parse(ParseError::MissingItemName) => ErrorKind::MissingItemName,
            DispatchError::Parse(ParseError::UnrecognizedItem) => ErrorKind::UnrecognizedItem,
            DispatchError::Classify(_) => ErrorKind::ClassificationFailure,
            DispatchError::Translate(TranslateError::UnknownSlotCode(_)) => {
                ErrorKind::UnknownSlotCode
            }
            DispatchError::Transport(_) => ErrorKind::TransportFailure,
            DispatchError::Voice(_) => ErrorKind::RecognitionFailure,
            DispatchError::SlotNotFound(_) => ErrorKind::SlotNotFound,
            DispatchError::Timeout(_) => ErrorKind::Timeout,
            DispatchError::Aborted(_) => ErrorKind::Aborted,
        }
    }

    /// Spoken prompt telling the user what to correct.
    pub fn user_message(&self) -> String {
        match self {
            DispatchError::Parse(ParseError::MissingSlotNumber) => {
                "슬롯 번호가 인식되지 않았습니다.".to_string()
            }
            DispatchError::Parse(ParseError::MissingItemName) => {
                "슬롯 이름이 인식되지 않았습니다.".to_string()
            }
            DispatchError::Parse(ParseError::UnrecognizedItem) => {
                "등록된 카드 이름을 찾지 못했습니다. 다시 말씀해 주세요.".to_string()
            }
            DispatchError::Classify(_) => {
                "명령을 분류하지 못했습니다. 잠시 후 다시 시도해 주세요.".to_string()
            }
            DispatchError::Translate(TranslateError::UnknownSlotCode(slot)) => {
                format!("{slot}번 슬롯에 해당하는 장치 명령이 없습니다.")
            }
            DispatchError::Transport(_) => "장치에 명령을 전달하지 못했습니다.".to_string(),
            DispatchError::Voice(_) => "음성 인식에 실패했습니다. 다시 시도해 주세요.".to_string(),
            DispatchError::SlotNotFound(name) => format!("{name} 슬롯이 없습니다."),
            DispatchError::Timeout(_) => "처리 시간이 초과되었습니다.".to_string(),
            DispatchError::Aborted(_) => "명령 처리 중 오류가 발생했습니다.".to_string(),
        }
    }
}

/// What a caller gets back for one request. Serializes as
/// `{"result": "success"|"fail", "message": ..., ...}`.
#[derive(Debug, Clone, Serialize)]
pub struct DispatchResult {
    #[serde(rename = "result")]
    pub outcome: Outcome,
    pub message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<ErrorKind>,
    pub intent: Intent,
    /// Commands the transport accepted, in send order.
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub commands: Vec<String>,
}

impl DispatchResult {
    pub fn success(intent: Intent, message: impl Into<String>, commands: Vec<String>) -> Self {
        Self {
            outcome: Outcome::Success,
            message: message.into(),
            error: None,
            intent,
            commands,
        }
    }

    pub fn failure(intent: Intent, err: &DispatchError) -> Self {
        Self {
            outcome: Outcome::Fail,
            message: err.user_message(),
            error: Some(err.kind()),
            intent,
            commands: Vec::new(),
        }
    }

    pub fn is_success(&self) -> bool {
        self.outcome == Outcome::Success
    }
}
