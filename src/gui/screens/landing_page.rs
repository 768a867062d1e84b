use iced::{
    Alignment::Center,
    Element, Task,
    widget::{button, column, container, row, text},
};
use tracing::warn;

use crate::{
    error::ApiError,
    gui::{
        AppState,
        screens::{Screen, ScreenMessage},
    },
};

#[derive(Debug, Clone, PartialEq)]
pub enum BackendStatus {
    Checking,
    Online(String),
    Degraded(String),
    Offline(String),
    SignInRequired,
}

impl BackendStatus {
    fn describe(&self) -> String {
        match self {
            BackendStatus::Checking => "Checking backend...".to_string(),
            BackendStatus::Online(message) => format!("Backend online: {}", message),
            BackendStatus::Degraded(message) => format!("Backend degraded: {}", message),
            BackendStatus::Offline(reason) => format!("Backend unreachable: {}", reason),
            BackendStatus::SignInRequired => {
                "Your session has expired. Sign in again and restart with a new token.".to_string()
            }
        }
    }
}

#[derive(Debug)]
pub struct LandingPageScreen {
    backend: BackendStatus,
}

#[derive(Debug, Clone)]
pub enum LandingPageMessage {
    CheckBackend,
    Checked(BackendStatus),
    StartDetecting,
}

#[derive(Debug, Clone)]
pub enum ParentMessage {
    StartDetecting,
}

impl LandingPageScreen {
    pub fn new() -> Self {
        Self {
            backend: BackendStatus::Checking,
        }
    }

    pub fn sign_in_required() -> Self {
        Self {
            backend: BackendStatus::SignInRequired,
        }
    }

    pub fn backend(&self) -> &BackendStatus {
        &self.backend
    }
}

impl Default for LandingPageScreen {
    fn default() -> Self {
        Self::new()
    }
}

impl Screen for LandingPageScreen {
    type Message = LandingPageMessage;
    type ParentMessage = ParentMessage;

    fn view(&self) -> Element<'_, ScreenMessage<Self>> {
        let content = column![
            text("Shelfscan").size(32),
            text("Computer Vision Product Detection"),
            text(self.backend.describe()),
            row![
                button("Start Detecting").on_press(ScreenMessage::ScreenMessage(
                    LandingPageMessage::StartDetecting
                )),
                button("Check Backend").on_press_maybe(
                    (self.backend != BackendStatus::Checking).then_some(
                        ScreenMessage::ScreenMessage(LandingPageMessage::CheckBackend)
                    )
                ),
            ]
            .spacing(20),
        ]
        .spacing(20)
        .padding(20)
        .align_x(Center);

        container(content)
            .center_x(iced::Length::Fill)
            .center_y(iced::Length::Fill)
            .into()
    }

    fn update(
        &mut self,
        message: Self::Message,
        state: &mut AppState,
    ) -> Task<ScreenMessage<Self>> {
        match message {
            LandingPageMessage::CheckBackend => {
                self.backend = BackendStatus::Checking;
                let api = state.client.api().clone();
                Task::perform(
                    async move {
                        match api.health().await {
                            Ok(health) if health.is_healthy() => BackendStatus::Online(
                                health.message.unwrap_or_else(|| health.status.clone()),
                            ),
                            Ok(health) => BackendStatus::Degraded(
                                health.message.unwrap_or_else(|| health.status.clone()),
                            ),
                            Err(ApiError::Unauthorized) => BackendStatus::SignInRequired,
                            Err(e) => {
                                warn!("Health check failed: {}", e);
                                BackendStatus::Offline(e.to_string())
                            }
                        }
                    },
                    |status| ScreenMessage::ScreenMessage(LandingPageMessage::Checked(status)),
                )
            }
            LandingPageMessage::Checked(status) => {
                self.backend = status;
                Task::none()
            }
            LandingPageMessage::StartDetecting => {
                Task::done(ScreenMessage::ParentMessage(ParentMessage::StartDetecting))
            }
        }
    }
}
