use std::path::PathBuf;

use crate::gui::screens::{
    ScreenMessage, detection::DetectionScreen, landing_page::LandingPageScreen,
};

#[derive(Debug, Clone)]
pub enum Message {
    LandingPage(ScreenMessage<LandingPageScreen>),
    Detection(ScreenMessage<DetectionScreen>),
    OpenDetection,
    SignInRequired,
    FileHovered(bool),
    FileDropped(PathBuf),
}
