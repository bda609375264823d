use std::collections::HashMap;
use std::sync::{LazyLock, Mutex};

use gpui::{
    ClickEvent, Div, FocusHandle, Hsla, InteractiveElement, IntoElement, KeyDownEvent,
    MouseButton, ParentElement, RenderOnce, SharedString, Stateful, StatefulInteractiveElement,
    Styled, Window, div, hsla, px,
};
use log::warn;

use crate::contact::{ContactForm, ContactFormHandle, SERVICE_OPTIONS};
use crate::feedback::{ClickTarget, FeedbackKind, ModalCloseReason, SuccessModal};
use crate::form::{
    FieldDisplay, FieldKey, FieldKind, FieldSpec, FormEvent, FormId, FormModel, SubmitContent,
    SubmitControl,
};

static FIELD_FOCUS_HANDLES: LazyLock<Mutex<HashMap<String, FocusHandle>>> =
    LazyLock::new(|| Mutex::new(HashMap::new()));

fn field_focus_handle(form: FormId, spec: &FieldSpec, cx: &gpui::App) -> FocusHandle {
    let id = format!("{}-{}", form.0, spec.key);
    if let Ok(mut handles) = FIELD_FOCUS_HANDLES.lock() {
        return handles
            .entry(id)
            .or_insert_with(|| cx.focus_handle())
            .clone();
    }
    cx.focus_handle()
}

/// Applies one key press to a text field's value. `None` means the key does
/// not edit text.
fn edit_text(value: &str, key: &str, key_char: Option<&str>, multiline: bool) -> Option<String> {
    match key {
        "backspace" => {
            let mut next = value.to_string();
            next.pop()?;
            Some(next)
        }
        "enter" if multiline => Some(format!("{value}\n")),
        "enter" | "tab" | "escape" => None,
        _ => key_char
            .filter(|text| !text.is_empty() && !text.chars().any(char::is_control))
            .map(|text| format!("{value}{text}")),
    }
}

fn close_on_escape(modal: &SuccessModal, key: &str) -> bool {
    key == "escape" && modal.close(ModalCloseReason::EscapeKey)
}

fn is_editing_shortcut(event: &KeyDownEvent) -> bool {
    let modifiers = &event.keystroke.modifiers;
    modifiers.control || modifiers.platform || modifiers.function || modifiers.alt
}

fn h_stack() -> Div {
    div().flex().flex_row().items_center()
}

fn v_stack() -> Div {
    div().flex().flex_col()
}

fn text_primary() -> Hsla {
    hsla(0.0, 0.0, 0.13, 1.0)
}

fn text_muted() -> Hsla {
    hsla(0.0, 0.0, 0.45, 1.0)
}

fn border_default() -> Hsla {
    hsla(0.0, 0.0, 0.82, 1.0)
}

fn border_error() -> Hsla {
    hsla(0.0, 0.72, 0.51, 1.0)
}

fn accent() -> Hsla {
    hsla(0.62, 0.7, 0.5, 1.0)
}

fn display_value(model: &ContactForm, spec: &FieldSpec) -> SharedString {
    model
        .field_text(spec.key)
        .map(|text| SharedString::from(text.to_string()))
        .unwrap_or_default()
}

/// The contact form: one row per declared field and the submit control.
#[derive(IntoElement)]
pub struct ContactFormPanel {
    handle: ContactFormHandle,
    submit_label: SharedString,
}

impl ContactFormPanel {
    pub fn new(handle: ContactFormHandle) -> Self {
        Self {
            handle,
            submit_label: "Send Message".into(),
        }
    }

    pub fn submit_label(mut self, value: impl Into<SharedString>) -> Self {
        self.submit_label = value.into();
        self
    }

    fn render_field(
        &self,
        form: FormId,
        spec: &FieldSpec,
        value: SharedString,
        display: FieldDisplay,
        window: &Window,
        cx: &gpui::App,
    ) -> Div {
        let key = spec.key;
        let label = if spec.required {
            SharedString::from(format!("{} *", spec.display_label()))
        } else {
            spec.display_label()
        };
        let focus_handle = field_focus_handle(form, spec, cx);
        let border = if display.highlighted {
            border_error()
        } else if focus_handle.is_focused(window) {
            accent()
        } else {
            border_default()
        };

        let control = div()
            .id(SharedString::from(format!("contact-{key}")))
            .px_3()
            .py_2()
            .rounded_md()
            .border_1()
            .border_color(border)
            .text_color(text_primary());
        let control = match spec.kind {
            FieldKind::Select => control.child(self.render_service_options(value)),
            FieldKind::Text | FieldKind::Email | FieldKind::MultilineText => {
                let multiline = spec.kind == FieldKind::MultilineText;
                let control = if multiline {
                    control.min_h(px(96.0))
                } else {
                    control
                };
                self.wire_text_entry(control, key, value, multiline, focus_handle)
            }
        };

        let mut row = v_stack()
            .gap_1()
            .child(div().text_sm().text_color(text_muted()).child(label))
            .child(control);
        if let Some(error) = display.error {
            row = row.child(div().text_xs().text_color(border_error()).child(error));
        }
        row
    }

    /// Focus on press, edit through the event table on key down, validate
    /// when focus leaves the field.
    fn wire_text_entry(
        &self,
        control: Stateful<Div>,
        key: FieldKey,
        value: SharedString,
        multiline: bool,
        focus_handle: FocusHandle,
    ) -> Stateful<Div> {
        let focus_for_press = focus_handle.clone();
        let focus_for_blur = focus_handle.clone();
        let events_for_keys = self.handle.events().clone();
        let events_for_blur = self.handle.events().clone();
        let value_for_keys = value.clone();

        control
            .cursor_text()
            .track_focus(&focus_handle)
            .child(value)
            .on_mouse_down(MouseButton::Left, move |_, window, cx| {
                window.focus(&focus_for_press);
                window.refresh();
            })
            .on_key_down(move |event: &KeyDownEvent, window, cx| {
                if is_editing_shortcut(event) {
                    return;
                }
                let Some(next) = edit_text(
                    &value_for_keys,
                    event.keystroke.key.as_str(),
                    event.keystroke.key_char.as_deref(),
                    multiline,
                ) else {
                    return;
                };
                if let Err(error) = events_for_keys.input(key, next.into()) {
                    warn!("could not update `{key}`: {error}");
                }
                cx.stop_propagation();
                window.refresh();
            })
            .on_mouse_down_out(move |_, window, _cx| {
                if !focus_for_blur.is_focused(window) {
                    return;
                }
                if let Err(error) = events_for_blur.blur(key) {
                    warn!("could not validate `{key}`: {error}");
                }
                window.refresh();
            })
    }

    fn render_service_options(&self, selected: SharedString) -> Div {
        let service = ContactForm::fields().service();
        let mut options = h_stack().gap_2();
        for option in SERVICE_OPTIONS {
            let controller = self.handle.controller().clone();
            let mut chip = div()
                .id(SharedString::from(format!("contact-service-{option}")))
                .px_2()
                .rounded_sm()
                .cursor_pointer();
            chip = if selected.as_ref() == option {
                chip.bg(accent()).text_color(hsla(0.0, 0.0, 1.0, 1.0))
            } else {
                chip.border_1().border_color(border_default())
            };
            options = options.child(chip.child(option).on_click(
                move |_: &ClickEvent, window: &mut Window, _cx: &mut gpui::App| {
                    if let Err(error) = controller.input(service, option.into()) {
                        warn!("could not select service `{option}`: {error}");
                    }
                    window.refresh();
                },
            ));
        }
        options
    }

    fn render_submit(&self, control: SubmitControl) -> Stateful<Div> {
        let content: SharedString = match control.content {
            SubmitContent::Label => self.submit_label.clone(),
            SubmitContent::Loading => "Sending...".into(),
            SubmitContent::Retry => "Retry".into(),
        };

        let mut button = div()
            .id("contact-submit")
            .px_4()
            .py_2()
            .rounded_md()
            .bg(accent())
            .text_color(hsla(0.0, 0.0, 1.0, 1.0))
            .child(content);
        if control.disabled {
            return button.opacity(0.6);
        }

        let events = self.handle.events().clone();
        button = button.cursor_pointer().on_click(
            move |_: &ClickEvent, window: &mut Window, cx: &mut gpui::App| {
                let events = events.clone();
                let window_handle = window.window_handle();
                cx.spawn(async move |cx| {
                    if let Err(error) = events.dispatch(FormEvent::Submit).await {
                        warn!("contact form submit failed: {error}");
                    }
                    let _ = window_handle.update(cx, |_, window, _| {
                        window.refresh();
                    });
                })
                .detach();
                window.refresh();
            },
        );
        button
    }
}

impl RenderOnce for ContactFormPanel {
    fn render(self, window: &mut Window, cx: &mut gpui::App) -> impl IntoElement {
        let controller = self.handle.controller();
        let snapshot = match controller.snapshot() {
            Ok(snapshot) => snapshot,
            Err(error) => {
                warn!("contact form unavailable: {error}");
                return v_stack().child(SharedString::from(error.to_string()));
            }
        };

        let mut panel = v_stack().gap_4().p_6().w(px(480.0));
        for spec in ContactForm::field_specs() {
            let display = controller.field_display(spec.key).unwrap_or_default();
            let value = display_value(&snapshot.model, &spec);
            panel = panel.child(self.render_field(
                snapshot.id,
                &spec,
                value,
                display,
                window,
                cx,
            ));
        }
        let control = SubmitControl::for_state(snapshot.submit_state);
        panel.child(self.render_submit(control))
    }
}

/// Overlay and panel for the feedback modal. Renders nothing while closed.
#[derive(IntoElement)]
pub struct SuccessModalView {
    modal: SuccessModal,
    close_label: SharedString,
}

impl SuccessModalView {
    pub fn new(modal: SuccessModal) -> Self {
        Self {
            modal,
            close_label: "Close".into(),
        }
    }

    pub fn close_label(mut self, value: impl Into<SharedString>) -> Self {
        self.close_label = value.into();
        self
    }
}

impl RenderOnce for SuccessModalView {
    fn render(self, _window: &mut Window, _cx: &mut gpui::App) -> impl IntoElement {
        let snapshot = self.modal.snapshot();
        if !snapshot.opened {
            return div().into_any_element();
        }

        let title_color = match snapshot.kind {
            FeedbackKind::Success => accent(),
            FeedbackKind::Error => border_error(),
        };

        let overlay_modal = self.modal.clone();
        let overlay = div()
            .id("feedback-overlay")
            .absolute()
            .top_0()
            .left_0()
            .size_full()
            .bg(hsla(0.0, 0.0, 0.0, 0.5))
            .on_click(
                move |_: &ClickEvent, window: &mut Window, _cx: &mut gpui::App| {
                    if overlay_modal.click(ClickTarget::Overlay) {
                        window.refresh();
                    }
                },
            );

        let close_modal = self.modal.clone();
        let close = div()
            .id("feedback-close")
            .px_4()
            .py_2()
            .rounded_md()
            .cursor_pointer()
            .bg(accent())
            .text_color(hsla(0.0, 0.0, 1.0, 1.0))
            .child(self.close_label)
            .on_click(
                move |_: &ClickEvent, window: &mut Window, _cx: &mut gpui::App| {
                    if close_modal.close(ModalCloseReason::CloseButton) {
                        window.refresh();
                    }
                },
            );

        let panel = v_stack()
            .id("feedback-panel")
            .occlude()
            .gap_3()
            .p_6()
            .w(px(400.0))
            .rounded_lg()
            .bg(hsla(0.0, 0.0, 1.0, 1.0))
            .child(
                div()
                    .text_lg()
                    .text_color(title_color)
                    .child(snapshot.content.title),
            )
            .child(
                div()
                    .text_color(text_primary())
                    .child(snapshot.content.body),
            )
            .child(h_stack().justify_end().child(close));

        let escape_modal = self.modal.clone();
        div()
            .absolute()
            .top_0()
            .left_0()
            .size_full()
            .on_key_down(move |event: &KeyDownEvent, window, _cx| {
                if close_on_escape(&escape_modal, event.keystroke.key.as_str()) {
                    window.refresh();
                }
            })
            .child(overlay)
            .child(
                div()
                    .absolute()
                    .top_0()
                    .left_0()
                    .size_full()
                    .flex()
                    .items_center()
                    .justify_center()
                    .child(panel),
            )
            .into_any_element()
    }
}
