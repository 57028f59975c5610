use portal_core::PortalError;

#[derive(Debug, thiserror::Error)]
pub enum ClientError {
    #[error("invalid request url: {0}")]
    InvalidUrl(String),
    #[error("request to {endpoint} failed: {source}")]
    Request {
        endpoint: String,
        #[source]
        source: reqwest::Error,
    },
    #[error("{endpoint} returned {status}: {}", status_text(.status, .message))]
    Status {
        endpoint: String,
        status: u16,
        /// `message` of the JSON error body, when the API sent one.
        message: Option<String>,
    },
    #[error("unexpected response from {endpoint} at {path}: {message}")]
    Decode {
        endpoint: String,
        path: String,
        message: String,
    },
    #[error(transparent)]
    Core(#[from] PortalError),
}

pub type ClientResult<T> = std::result::Result<T, ClientError>;

fn status_text(status: &u16, message: &Option<String>) -> String {
    match message {
        Some(message) => message.clone(),
        None => reqwest::StatusCode::from_u16(*status)
            .ok()
            .and_then(|s| s.canonical_reason())
            .unwrap_or("unknown status")
            .to_string(),
    }
}

impl ClientError {
    /// Message shown inline by a page when this fetch fails.
    pub fn user_message(&self) -> String {
        match self {
            ClientError::Status {
                message: Some(message),
                ..
            } => message.clone(),
            ClientError::Status { status: 404, .. } => "المحتوى المطلوب غير موجود.".into(),
            ClientError::Request { source, .. } if source.is_timeout() => {
                "انتهت مهلة الاتصال بالخادم. يرجى المحاولة لاحقًا.".into()
            }
            ClientError::Request { .. } => "تعذر الاتصال بالخادم. يرجى المحاولة لاحقًا.".into(),
            _ => "حدث خطأ في تحميل البيانات.".into(),
        }
    }

    /// Upstream HTTP status, when the API answered.
    pub fn status(&self) -> Option<u16> {
        match self {
            ClientError::Status { status, .. } => Some(*status),
            _ => None,
        }
    }
}
