//! Host-side collaborators of the paste orchestrator.

/// The editable region content is pasted into.
///
/// The selection handle is owned by the surface and only valid during the
/// current event turn; the orchestrator passes it back untouched.
pub trait EditableSurface {
    type Selection;

    fn save_selection(&self) -> Self::Selection;

    fn restore_selection(&self, selection: &Self::Selection);

    fn delete_selected_content(&self);

    /// Insert serialized content at the caret, leaving the caret just after
    /// the inserted content.
    fn insert_at(&self, content: &str);

    fn focus(&self);
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum NotifyLevel {
    Info,
    Success,
    Warning,
    Error,
}

/// Fire-and-forget user notifications.
pub trait Notifier: Send + Sync {
    fn notify(&self, level: NotifyLevel, title: &str, message: &str);
}

/// [`Notifier`] that only logs through `tracing`. Used when the host does not
/// provide one.
#[derive(Clone, Copy, Debug, Default)]
pub struct TracingNotifier;

impl Notifier for TracingNotifier {
    fn notify(&self, level: NotifyLevel, title: &str, message: &str) {
        match level {
            NotifyLevel::Info | NotifyLevel::Success => tracing::info!("{title}: {message}"),
            NotifyLevel::Warning => tracing::warn!("{title}: {message}"),
            NotifyLevel::Error => tracing::error!("{title}: {message}"),
        }
    }
}
