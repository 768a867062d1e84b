use iced::{Element, Event, Subscription, Task, event, window};

use super::{
    AppState, Message,
    screens::{
        Screen, ScreenData, ScreenMessage,
        landing_page::{LandingPageMessage, LandingPageScreen},
    },
};
use crate::client::DetectionClient;

pub struct DashboardApp {
    state: AppState,
    screen: ScreenData,
}

impl DashboardApp {
    pub fn new(client: DetectionClient) -> (Self, Task<Message>) {
        (
            Self {
                state: AppState::new(client),
                screen: ScreenData::LandingPage(LandingPageScreen::new()),
            },
            Task::done(Message::LandingPage(ScreenMessage::ScreenMessage(
                LandingPageMessage::CheckBackend,
            ))),
        )
    }

    pub fn update(&mut self, message: Message) -> Task<Message> {
        self.screen
            .update(message, &mut self.state)
            .map(|message| match message {
                ScreenMessage::ScreenMessage(message) => message,
                ScreenMessage::ParentMessage(never) => match never {},
            })
    }

    pub fn view(&self) -> Element<'_, Message> {
        self.screen.view().map(|message| match message {
            ScreenMessage::ScreenMessage(message) => message,
            ScreenMessage::ParentMessage(never) => match never {},
        })
    }

    /// Window file-drop events feed the same intake as the file picker.
    pub fn subscription(&self) -> Subscription<Message> {
        event::listen_with(|event, _status, _window| match event {
            Event::Window(window::Event::FileHovered(_)) => Some(Message::FileHovered(true)),
            Event::Window(window::Event::FilesHoveredLeft) => Some(Message::FileHovered(false)),
            Event::Window(window::Event::FileDropped(path)) => Some(Message::FileDropped(path)),
            _ => None,
        })
    }
}

pub fn run(client: DetectionClient) -> iced::Result {
    iced::application(
        move || DashboardApp::new(client.clone()),
        DashboardApp::update,
        DashboardApp::view,
    )
    .title("Shelfscan - Computer Vision")
    .subscription(DashboardApp::subscription)
    .run()
}
