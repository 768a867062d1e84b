use std::path::PathBuf;

use iced::{
    Alignment::Center,
    Element, Length, Task,
    widget::{
        Column, button, column, container, image as image_widget, image::Handle, row, scrollable,
        text,
    },
};
use rfd::AsyncFileDialog;
use tracing::warn;

use crate::{
    client::{DetectionOutcome, FailureKind},
    gui::{
        AppState,
        screens::{Screen, ScreenMessage},
        widgets::{Step, drop_zone_style, error_banner_style, layout},
    },
    intake::FileCandidate,
    models::{DetectionResult, IntakeSource, NO_DETECTION_TIPS, PendingImage},
    session::{Submission, SubmissionSession, SubmissionState},
};

const IMAGE_EXTENSIONS: [&str; 7] = ["png", "jpg", "jpeg", "gif", "bmp", "webp", "tiff"];

#[derive(Debug, Default)]
pub struct DetectionScreen {
    session: SubmissionSession,
    preview: Option<Handle>,
    hovering: bool,
    /// Set when a dropped file could not be read from disk.
    read_error: Option<String>,
}

#[derive(Debug, Clone)]
pub enum DetectionMessage {
    PickFile,
    Picked(Option<FileCandidate>),
    Dropped(PathBuf),
    Loaded(Result<FileCandidate, String>),
    Submit,
    Finished(Submission, DetectionOutcome),
    Reset,
}

#[derive(Debug, Clone)]
pub enum ParentMessage {
    SignInRequired,
}

impl DetectionScreen {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn session(&self) -> &SubmissionSession {
        &self.session
    }

    /// Banner text: a read failure, else the session's validation notice.
    pub fn notice(&self) -> Option<&str> {
        self.read_error.as_deref().or_else(|| self.session.notice())
    }

    pub fn set_hovering(&mut self, hovering: bool) {
        self.hovering = hovering;
    }

    fn select(&mut self, candidate: FileCandidate) {
        if self.session.select(candidate).is_ok() {
            self.preview = self
                .session
                .pending_image()
                .map(|pending| Handle::from_bytes(pending.bytes().to_vec()));
        }
    }

    fn view_drop_zone(&self) -> Element<'_, ScreenMessage<Self>> {
        let content = column![
            text("Drop your product image here, or click to browse").size(18),
            text("Any product image works: the detection service will find what it can."),
            button("Select Image")
                .on_press(ScreenMessage::ScreenMessage(DetectionMessage::PickFile)),
        ]
        .spacing(12)
        .align_x(Center);

        container(content)
            .style(drop_zone_style(self.hovering))
            .padding(40)
            .center_x(Length::Fill)
            .into()
    }

    fn view_selected<'a>(
        &'a self,
        pending: &'a PendingImage,
        submitting: bool,
    ) -> Element<'a, ScreenMessage<Self>> {
        let file_row = row![
            column![
                text(pending.name()).size(18),
                text(format!("{:.2} MB", pending.size_mb())),
            ]
            .width(Length::Fill),
            button("Remove").on_press_maybe(
                (!submitting).then_some(ScreenMessage::ScreenMessage(DetectionMessage::Reset))
            ),
        ]
        .spacing(20)
        .align_y(Center);

        let submit_label = if submitting {
            "AI Processing..."
        } else {
            "Detect with Real AI"
        };
        let actions = row![
            button(submit_label)
                .on_press_maybe(
                    (!submitting).then_some(ScreenMessage::ScreenMessage(DetectionMessage::Submit))
                )
                .width(Length::Fill),
            button("Cancel").on_press_maybe(
                (!submitting).then_some(ScreenMessage::ScreenMessage(DetectionMessage::Reset))
            ),
        ]
        .spacing(12);

        let mut content = Column::new().spacing(16).push(file_row);
        if let Some(handle) = &self.preview {
            content = content.push(image_widget(handle.clone()).height(Length::Fixed(240.0)));
        }
        content.push(actions).into()
    }

    fn view_result<'a>(&'a self, result: &'a DetectionResult) -> Element<'a, ScreenMessage<Self>> {
        let header = row![
            text("AI Detection Results").size(24).width(Length::Fill),
            text(result.provider_label.as_str()),
        ]
        .align_y(Center);

        let body: Element<'a, ScreenMessage<Self>> = if result.item_count == 0 {
            let tips = NO_DETECTION_TIPS
                .iter()
                .map(|tip| text(format!("• {}", tip)).into());
            column![
                text("No Objects Detected").size(20),
                text("The AI couldn't detect any recognizable objects in this image."),
                text("Tips for better detection:"),
                Column::with_children(tips).spacing(4),
            ]
            .spacing(10)
            .into()
        } else {
            let stats = row![
                stat(
                    "Total Objects",
                    result
                        .reported_total
                        .unwrap_or_else(|| result.total_units())
                        .to_string()
                ),
                stat(
                    "Processing Time",
                    format!("{:.1}s", result.processing_seconds)
                ),
                stat("Object Types", result.item_count.to_string()),
            ]
            .spacing(20);

            let items = result.items.iter().map(|item| {
                row![
                    text(item.count.to_string()).size(20).width(Length::Fixed(40.0)),
                    column![
                        text(item.label.as_str()),
                        text(format!("Category: {}", item.category)).size(14),
                    ]
                    .width(Length::Fill),
                    text(format!("Confidence: {:.1}%", item.confidence * 100.0)),
                ]
                .spacing(12)
                .align_y(Center)
                .into()
            });

            column![
                stats,
                text("Detected Objects").size(18),
                scrollable(Column::with_children(items).spacing(8)).height(Length::Fill),
            ]
            .spacing(16)
            .into()
        };

        let again = if result.item_count > 0 {
            "Detect Another Image"
        } else {
            "Try Another Image"
        };

        column![
            header,
            body,
            button(again).on_press(ScreenMessage::ScreenMessage(DetectionMessage::Reset)),
        ]
        .spacing(20)
        .into()
    }

    fn view_error<'a>(&'a self, message: &'a str) -> Element<'a, ScreenMessage<Self>> {
        column![
            container(text(message))
                .style(error_banner_style)
                .padding(16)
                .width(Length::Fill),
            button("Try Again").on_press(ScreenMessage::ScreenMessage(DetectionMessage::Reset)),
        ]
        .spacing(16)
        .into()
    }
}

fn stat<'a, M: 'a>(label: &'a str, value: String) -> Element<'a, M> {
    column![text(label).size(14), text(value).size(24)]
        .spacing(4)
        .into()
}

impl Screen for DetectionScreen {
    type Message = DetectionMessage;
    type ParentMessage = ParentMessage;

    fn view(&self) -> Element<'_, ScreenMessage<Self>> {
        let main: Element<'_, ScreenMessage<Self>> = match self.session.state() {
            SubmissionState::Idle => self.view_drop_zone(),
            SubmissionState::Selected(pending) => self.view_selected(pending, false),
            SubmissionState::Submitting(pending) => self.view_selected(pending, true),
            SubmissionState::Success { result, .. } | SubmissionState::Empty { result, .. } => {
                self.view_result(result)
            }
            SubmissionState::Error { message, .. } => self.view_error(message),
        };

        let mut content = column![text("Computer Vision").size(32)].spacing(20);
        if let Some(notice) = self.notice() {
            content = content.push(
                container(text(notice))
                    .style(error_banner_style)
                    .padding(12)
                    .width(Length::Fill),
            );
        }
        content = content.push(main);

        let sidebar = match self.session.pending_image() {
            Some(pending) => column![text("Current file"), text(pending.name()).size(14)],
            None => column![text("No file selected")],
        };

        layout(sidebar.spacing(6), content, Step::from(self.session.kind()))
    }

    fn update(
        &mut self,
        message: Self::Message,
        state: &mut AppState,
    ) -> Task<ScreenMessage<Self>> {
        self.read_error = None;
        match message {
            DetectionMessage::PickFile => Task::perform(
                async {
                    let handle = AsyncFileDialog::new()
                        .set_title("Select Product Image")
                        .add_filter("Images", &IMAGE_EXTENSIONS)
                        .pick_file()
                        .await?;
                    let bytes = handle.read().await;
                    Some(FileCandidate::new(
                        handle.file_name(),
                        bytes,
                        IntakeSource::Picked,
                    ))
                },
                |candidate| ScreenMessage::ScreenMessage(DetectionMessage::Picked(candidate)),
            ),
            DetectionMessage::Picked(Some(candidate)) => {
                self.select(candidate);
                Task::none()
            }
            DetectionMessage::Picked(None) => Task::none(),
            DetectionMessage::Dropped(path) => {
                self.hovering = false;
                Task::perform(
                    async move {
                        FileCandidate::from_path(path, IntakeSource::Dropped)
                            .await
                            .map_err(|e| e.to_string())
                    },
                    |loaded| ScreenMessage::ScreenMessage(DetectionMessage::Loaded(loaded)),
                )
            }
            DetectionMessage::Loaded(Ok(candidate)) => {
                self.select(candidate);
                Task::none()
            }
            DetectionMessage::Loaded(Err(e)) => {
                warn!("Could not read dropped file: {}", e);
                self.read_error = Some(format!("Could not read the dropped file: {}", e));
                Task::none()
            }
            DetectionMessage::Submit => match self.session.begin_submit() {
                Some(submission) => {
                    let request = submission.run(&state.client);
                    Task::perform(
                        async move {
                            let outcome = request.await;
                            (submission, outcome)
                        },
                        |(submission, outcome)| {
                            ScreenMessage::ScreenMessage(DetectionMessage::Finished(
                                submission, outcome,
                            ))
                        },
                    )
                }
                None => Task::none(),
            },
            DetectionMessage::Finished(submission, outcome) => {
                let unauthorized = matches!(
                    &outcome,
                    DetectionOutcome::TransportFailure(failure)
                        if failure.kind == FailureKind::HttpStatus && failure.status_code == Some(401)
                );
                self.session.resolve(submission, outcome);
                if unauthorized {
                    Task::done(ScreenMessage::ParentMessage(ParentMessage::SignInRequired))
                } else {
                    Task::none()
                }
            }
            DetectionMessage::Reset => {
                self.session.reset();
                if self.session.pending_image().is_none() {
                    self.preview = None;
                }
                Task::none()
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{client::DetectionClient, config::ClientConfig};

    fn app_state() -> AppState {
        let client = DetectionClient::from_config(&ClientConfig::default())
            .expect("default config builds a client");
        AppState::new(client)
    }

    #[test]
    fn unreadable_drop_shows_a_notice() {
        let mut screen = DetectionScreen::new();
        let mut state = app_state();

        let _ = screen.update(
            DetectionMessage::Loaded(Err("permission denied".to_string())),
            &mut state,
        );
        let notice = screen.notice().expect("read failure is shown");
        assert!(notice.contains("permission denied"));
        assert_eq!(screen.session().kind(), crate::session::StateKind::Idle);

        // The next action clears it.
        let _ = screen.update(DetectionMessage::Reset, &mut state);
        assert!(screen.notice().is_none());
    }

    #[test]
    fn rejected_drop_uses_the_same_notice() {
        let mut screen = DetectionScreen::new();
        let mut state = app_state();
        let candidate = FileCandidate::new("notes.txt", b"hello".to_vec(), IntakeSource::Dropped);

        let _ = screen.update(DetectionMessage::Loaded(Ok(candidate)), &mut state);
        assert_eq!(screen.notice(), Some("Please select a valid image file."));
    }
}
