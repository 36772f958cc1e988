/// Start screen: pick an image to open a session
use iced::event::{self, Event};
use iced::widget::{button, column, container, text, Column};
use iced::{window, Alignment, Element, Length};

use crate::Message;

pub fn view<'a>(status: &'a str, loading: bool, has_api_key: bool) -> Element<'a, Message> {
    let pick = button(if loading { "Loading..." } else { "Choose Image" })
        .on_press_maybe((!loading).then_some(Message::PickImage))
        .padding(10);

    let mut content: Column<Message> = column![
        text("NanoEdit").size(48),
        text("Choose an image or drop one onto this window, then describe the change you want.").size(16),
        pick,
        text(status).size(16),
    ]
    .spacing(20)
    .padding(40)
    .align_x(Alignment::Center);

    if !has_api_key {
        content = content.push(
            text("No API key configured. Set GEMINI_API_KEY to enable editing.")
                .size(14)
                .style(text::danger),
        );
    }

    container(content)
        .width(Length::Fill)
        .height(Length::Fill)
        .center_x(Length::Fill)
        .center_y(Length::Fill)
        .into()
}

/// A file dropped onto the window opens like a picked one
pub fn dropped_file(event: Event, _status: event::Status, _window: window::Id) -> Option<Message> {
    match event {
        Event::Window(window::Event::FileDropped(path)) => Some(Message::ImagePicked(Some(path))),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::PathBuf;

    #[test]
    fn test_dropped_file_opens_image() {
        let path = PathBuf::from("/tmp/cat.png");
        let message = dropped_file(
            Event::Window(window::Event::FileDropped(path.clone())),
            event::Status::Ignored,
            window::Id::unique(),
        );
        assert!(matches!(message, Some(Message::ImagePicked(Some(p))) if p == path));
    }

    #[test]
    fn test_other_window_events_are_ignored() {
        let hovered = dropped_file(
            Event::Window(window::Event::FileHovered(PathBuf::from("/tmp/cat.png"))),
            event::Status::Ignored,
            window::Id::unique(),
        );
        assert!(hovered.is_none());

        let closed = dropped_file(
            Event::Window(window::Event::CloseRequested),
            event::Status::Ignored,
            window::Id::unique(),
        );
        assert!(closed.is_none());
    }
}
