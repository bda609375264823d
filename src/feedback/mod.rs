use std::sync::{Arc, RwLock, RwLockReadGuard, RwLockWriteGuard};

use gpui::SharedString;
use log::debug;

/// Surface that reports the terminal outcome of a submission. Owned by the
/// page; form controllers only hold a shared handle to it.
pub trait FeedbackChannel: Send + Sync {
    fn show_success(&self);
    fn show_failure(&self, message: SharedString);
}

#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum FeedbackKind {
    Success,
    Error,
}

#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum ModalCloseReason {
    Programmatic,
    OverlayClick,
    CloseButton,
    EscapeKey,
}

#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum ModalStateChange {
    Opened(FeedbackKind),
    Closed(ModalCloseReason),
}

/// Where a pointer click landed relative to an open modal.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum ClickTarget {
    Overlay,
    Panel,
}

#[derive(Clone, Debug, Eq, PartialEq)]
pub struct ModalContent {
    pub title: SharedString,
    pub body: SharedString,
}

impl ModalContent {
    pub fn new(title: impl Into<SharedString>, body: impl Into<SharedString>) -> Self {
        Self {
            title: title.into(),
            body: body.into(),
        }
    }
}

#[derive(Clone, Debug, Eq, PartialEq)]
pub struct ModalSnapshot {
    pub opened: bool,
    pub kind: FeedbackKind,
    pub content: ModalContent,
    pub open_count: u32,
    pub last_close: Option<ModalCloseReason>,
}

type StateChangeHandler = Arc<dyn Fn(ModalStateChange) + Send + Sync>;

struct ModalState {
    opened: bool,
    kind: FeedbackKind,
    content: ModalContent,
    open_count: u32,
    last_close: Option<ModalCloseReason>,
}

/// Dismissible modal used as the form's feedback channel. Closes through its
/// close control, the escape key, or a click on the overlay around the panel.
#[derive(Clone)]
pub struct SuccessModal {
    success: ModalContent,
    failure_title: SharedString,
    close_on_click_outside: bool,
    state: Arc<RwLock<ModalState>>,
    on_state_change: Option<StateChangeHandler>,
}

impl SuccessModal {
    pub fn new(success: ModalContent) -> Self {
        Self {
            state: Arc::new(RwLock::new(ModalState {
                opened: false,
                kind: FeedbackKind::Success,
                content: success.clone(),
                open_count: 0,
                last_close: None,
            })),
            success,
            failure_title: "Something went wrong".into(),
            close_on_click_outside: true,
            on_state_change: None,
        }
    }

    pub fn failure_title(mut self, value: impl Into<SharedString>) -> Self {
        self.failure_title = value.into();
        self
    }

    pub fn close_on_click_outside(mut self, value: bool) -> Self {
        self.close_on_click_outside = value;
        self
    }

    pub fn on_state_change(
        mut self,
        handler: impl Fn(ModalStateChange) + Send + Sync + 'static,
    ) -> Self {
        self.on_state_change = Some(Arc::new(handler));
        self
    }

    pub fn is_open(&self) -> bool {
        self.read_state().opened
    }

    pub fn snapshot(&self) -> ModalSnapshot {
        let state = self.read_state();
        ModalSnapshot {
            opened: state.opened,
            kind: state.kind,
            content: state.content.clone(),
            open_count: state.open_count,
            last_close: state.last_close,
        }
    }

    /// Returns false when the modal was already closed.
    pub fn close(&self, reason: ModalCloseReason) -> bool {
        {
            let mut state = self.write_state();
            if !state.opened {
                return false;
            }
            state.opened = false;
            state.last_close = Some(reason);
        }
        debug!("feedback modal closed: {reason:?}");
        self.notify(ModalStateChange::Closed(reason));
        true
    }

    /// Clicks on the overlay close the modal; clicks inside the panel do not.
    pub fn click(&self, target: ClickTarget) -> bool {
        match target {
            ClickTarget::Overlay if self.close_on_click_outside => {
                self.close(ModalCloseReason::OverlayClick)
            }
            ClickTarget::Overlay | ClickTarget::Panel => false,
        }
    }

    fn open(&self, kind: FeedbackKind, content: ModalContent) {
        {
            let mut state = self.write_state();
            state.opened = true;
            state.kind = kind;
            state.content = content;
            state.open_count = state.open_count.saturating_add(1);
            state.last_close = None;
        }
        debug!("feedback modal opened: {kind:?}");
        self.notify(ModalStateChange::Opened(kind));
    }

    fn notify(&self, change: ModalStateChange) {
        if let Some(handler) = self.on_state_change.as_ref() {
            handler(change);
        }
    }

    fn read_state(&self) -> RwLockReadGuard<'_, ModalState> {
        match self.state.read() {
            Ok(guard) => guard,
            Err(poisoned) => poisoned.into_inner(),
        }
    }

    fn write_state(&self) -> RwLockWriteGuard<'_, ModalState> {
        match self.state.write() {
            Ok(guard) => guard,
            Err(poisoned) => poisoned.into_inner(),
        }
    }
}

impl FeedbackChannel for SuccessModal {
    fn show_success(&self) {
        self.open(FeedbackKind::Success, self.success.clone());
    }

    fn show_failure(&self, message: SharedString) {
        self.open(
            FeedbackKind::Error,
            ModalContent::new(self.failure_title.clone(), message),
        );
    }
}
