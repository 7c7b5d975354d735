use crate::models::NoticeKind;

/// User-facing dialogs provided by the host.
pub trait Notifier {
    /// Shows a blocking message.
    fn notify(&mut self, kind: NoticeKind, title: &str, message: &str);

    /// Asks a yes/no question. Returns `true` for yes.
    fn confirm(&mut self, title: &str, message: &str) -> bool;
}

/// A recorded notification, used by [`RecordingNotifier`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Notice {
    pub kind: NoticeKind,
    pub title: String,
    pub message: String,
}

/// Notifier that records every message and answers confirmations with a
/// fixed reply. Useful for headless sessions and tests.
#[derive(Debug, Clone, Default)]
pub struct RecordingNotifier {
    pub notices: Vec<Notice>,
    pub questions: Vec<String>,
    pub answer: bool,
}

impl RecordingNotifier {
    pub fn answering(answer: bool) -> Self {
        Self {
            answer,
            ..Default::default()
        }
    }

    pub fn last(&self) -> Option<&Notice> {
        self.notices.last()
    }
}

impl Notifier for RecordingNotifier {
    fn notify(&mut self, kind: NoticeKind, title: &str, message: &str) {
        self.notices.push(Notice {
            kind,
            title: title.to_string(),
            message: message.to_string(),
        });
    }

    fn confirm(&mut self, _title: &str, message: &str) -> bool {
        self.questions.push(message.to_string());
        self.answer
    }
}
