pub mod detection;
pub mod landing_page;

use iced::{Element, Task};

use crate::gui::{AppState, Message};

#[derive(Debug)]
pub enum ScreenMessage<S: Screen> {
    ScreenMessage(S::Message),
    ParentMessage(S::ParentMessage),
}

// Manual impl: screens own non-clonable state, only their messages need Clone.
impl<S: Screen> Clone for ScreenMessage<S>
where
    S::Message: Clone,
    S::ParentMessage: Clone,
{
    fn clone(&self) -> Self {
        match self {
            ScreenMessage::ScreenMessage(msg) => ScreenMessage::ScreenMessage(msg.clone()),
            ScreenMessage::ParentMessage(msg) => ScreenMessage::ParentMessage(msg.clone()),
        }
    }
}

pub trait Screen: Sized {
    type Message: std::fmt::Debug;
    type ParentMessage: std::fmt::Debug;
    fn view(&self) -> Element<'_, ScreenMessage<Self>>;
    fn update(&mut self, message: Self::Message, state: &mut AppState)
    -> Task<ScreenMessage<Self>>;
}

#[derive(Debug)]
pub enum ScreenData {
    LandingPage(landing_page::LandingPageScreen),
    Detection(detection::DetectionScreen),
}

impl Screen for ScreenData {
    type Message = Message;
    type ParentMessage = std::convert::Infallible;

    fn view(&self) -> Element<'_, ScreenMessage<Self>> {
        match self {
            ScreenData::LandingPage(screen) => screen.view().map(Message::LandingPage),
            ScreenData::Detection(screen) => screen.view().map(Message::Detection),
        }
        .map(ScreenMessage::ScreenMessage)
    }

    fn update(
        &mut self,
        message: Self::Message,
        state: &mut AppState,
    ) -> Task<ScreenMessage<Self>> {
        match (self, message) {
            (ScreenData::LandingPage(page), Message::LandingPage(msg)) => match msg {
                ScreenMessage::ScreenMessage(msg) => page
                    .update(msg, state)
                    .map(Message::LandingPage)
                    .map(ScreenMessage::ScreenMessage),
                ScreenMessage::ParentMessage(landing_page::ParentMessage::StartDetecting) => {
                    Task::done(ScreenMessage::ScreenMessage(Message::OpenDetection))
                }
            },
            (ScreenData::Detection(page), Message::Detection(msg)) => match msg {
                ScreenMessage::ScreenMessage(msg) => page
                    .update(msg, state)
                    .map(Message::Detection)
                    .map(ScreenMessage::ScreenMessage),
                ScreenMessage::ParentMessage(detection::ParentMessage::SignInRequired) => {
                    Task::done(ScreenMessage::ScreenMessage(Message::SignInRequired))
                }
            },
            (x, Message::OpenDetection) => {
                *x = ScreenData::Detection(detection::DetectionScreen::new());
                Task::none()
            }
            (x, Message::SignInRequired) => {
                *x = ScreenData::LandingPage(landing_page::LandingPageScreen::sign_in_required());
                Task::none()
            }
            (ScreenData::Detection(page), Message::FileHovered(hovering)) => {
                page.set_hovering(hovering);
                Task::none()
            }
            (ScreenData::Detection(page), Message::FileDropped(path)) => page
                .update(detection::DetectionMessage::Dropped(path), state)
                .map(Message::Detection)
                .map(ScreenMessage::ScreenMessage),
            _ => Task::none(),
        }
    }
}
