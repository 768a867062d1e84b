use iced::{
    Color, Element, Length, Theme, border,
    widget::{column, container, container::Style, row, text},
};
use iced_widget::container::bordered_box;

use crate::session::StateKind;

/// Progress marker shown in the sidebar.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum Step {
    SelectImage,
    Detect,
    Review,
}

impl From<StateKind> for Step {
    fn from(kind: StateKind) -> Self {
        match kind {
            StateKind::Idle => Step::SelectImage,
            StateKind::Selected | StateKind::Submitting => Step::Detect,
            StateKind::Success | StateKind::Empty | StateKind::Error => Step::Review,
        }
    }
}

impl Step {
    fn label(self) -> &'static str {
        match self {
            Step::SelectImage => "Select Image",
            Step::Detect => "Detect",
            Step::Review => "Review Results",
        }
    }

    fn style(self, other: Self) -> impl Fn(&Theme) -> Style {
        move |theme: &Theme| {
            let style = bordered_box(theme).border(border::width(5));
            // steps already reached get a darkened background
            if self >= other {
                let mut color_rgba = theme.palette().background.into_rgba8();
                color_rgba[0] /= 2;
                color_rgba[1] /= 2;
                color_rgba[2] /= 2;
                style.background(Color::from_rgb8(color_rgba[0], color_rgba[1], color_rgba[2]))
            } else {
                style.background(theme.palette().background)
            }
        }
    }
}

/// Highlighted box around the drop zone while a file hovers the window.
pub fn drop_zone_style(active: bool) -> impl Fn(&Theme) -> Style {
    move |theme: &Theme| {
        let style = bordered_box(theme).border(border::width(2).rounded(12));
        if active {
            style.background(theme.palette().primary.scale_alpha(0.15))
        } else {
            style
        }
    }
}

/// Red box for error banners.
pub fn error_banner_style(theme: &Theme) -> Style {
    bordered_box(theme)
        .border(border::width(1).rounded(8).color(theme.palette().danger))
        .background(theme.palette().danger.scale_alpha(0.15))
}

pub fn layout<'a, Message>(
    sidebar: impl Into<Element<'a, Message>>,
    main_content: impl Into<Element<'a, Message>>,
    step: Step,
) -> Element<'a, Message>
where
    Message: 'a,
{
    let steps = [Step::SelectImage, Step::Detect, Step::Review]
        .into_iter()
        .map(|s| {
            container(text(s.label()))
                .style(step.style(s))
                .padding(10)
                .width(Length::Fill)
                .into()
        });

    container(row![
        container(column![
            iced::widget::Column::with_children(steps),
            container(sidebar.into()).height(Length::Fill).padding(10),
        ])
        .width(Length::FillPortion(1)),
        container(main_content.into())
            .width(Length::FillPortion(4))
            .padding(20),
    ])
    .center_x(Length::Fill)
    .center_y(Length::Fill)
    .into()
}
