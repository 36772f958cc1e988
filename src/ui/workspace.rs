use std::collections::HashMap;

use iced::widget::image::Handle;
use iced::widget::{
    button, column, container, horizontal_space, image, mouse_area, row, scrollable, text,
    text_input, Column, Row,
};
use iced::{Alignment, ContentFit, Element, Length, Theme};

use nanoedit::codec::InlineImage;
use nanoedit::error::RequestError;
use nanoedit::state::session::Completion;
use nanoedit::state::{EditSession, EditStatus, ImageAsset, RequestTicket};
use crate::Message;

const THUMBNAIL_SIZE: f32 = 64.0;
const THUMBNAIL_LABEL_CHARS: usize = 16;

/// Editor screen for one session
pub struct Workspace {
    pub session: EditSession,
    /// Decoded preview handles keyed by asset id, so iced caches them
    previews: HashMap<u64, Handle>,
    /// True while "hold to compare" is pressed
    pub comparing: bool,
    /// Outcome of the last download
    pub notice: Option<String>,
}

impl Workspace {
    pub fn new(original: ImageAsset) -> Self {
        let mut workspace = Self {
            session: EditSession::new(original),
            previews: HashMap::new(),
            comparing: false,
            notice: None,
        };
        let original = workspace.session.original().clone();
        workspace.remember(&original);
        workspace
    }

    /// Register a preview for an asset that will be shown
    pub fn remember(&mut self, asset: &ImageAsset) {
        self.previews
            .entry(asset.id())
            .or_insert_with(|| Handle::from_bytes(asset.raw_bytes().to_vec()));
    }

    /// Apply an edit response; the compare overlay ends with it
    pub fn finish_edit(
        &mut self,
        ticket: RequestTicket,
        outcome: Result<InlineImage, RequestError>,
    ) -> Completion {
        self.comparing = false;
        let completion = self.session.complete(ticket, outcome);
        if let Completion::Applied(entry) = &completion {
            self.remember(&entry.result);
        }
        completion
    }

    pub fn restore_original(&mut self) {
        self.comparing = false;
        self.session.restore_original();
    }

    pub fn restore_entry(&mut self, entry_id: u64) -> bool {
        self.comparing = false;
        self.session.restore_entry(entry_id)
    }

    fn preview(&self, asset: &ImageAsset) -> Handle {
        self.previews
            .get(&asset.id())
            .cloned()
            .unwrap_or_else(|| Handle::from_bytes(asset.raw_bytes().to_vec()))
    }

    pub fn view(&self) -> Element<'_, Message> {
        column![
            self.top_bar(),
            self.canvas(),
            self.history_strip(),
            self.prompt_box(),
        ]
        .spacing(12)
        .padding(16)
        .into()
    }

    fn top_bar(&self) -> Element<'_, Message> {
        let session = &self.session;
        let idle = !session.is_processing();

        let reset = (!session.is_showing_original()).then(|| {
            button("Reset to Original")
                .style(button::secondary)
                .on_press_maybe(idle.then_some(Message::RestoreOriginal))
        });
        let download = (session.current().is_some() && idle)
            .then(|| button("Download").on_press(Message::Download));

        Row::new()
            .push(button("Close Editor").style(button::text).on_press(Message::CloseEditor))
            .push(horizontal_space())
            .push_maybe(self.notice.as_deref().map(|n| text(n).size(14)))
            .push_maybe(reset)
            .push_maybe(download)
            .spacing(8)
            .align_y(Alignment::Center)
            .into()
    }

    fn canvas(&self) -> Element<'_, Message> {
        let session = &self.session;
        let shown = if self.comparing {
            session.original()
        } else {
            session.displayed_asset()
        };

        let badge = if self.comparing || session.is_showing_original() {
            "Original"
        } else {
            "Edited"
        };

        let picture = image(self.preview(shown))
            .content_fit(ContentFit::Contain)
            .width(Length::Fill)
            .height(Length::Fill);

        let status_line: Element<'_, Message> = match session.status() {
            EditStatus::Processing => text("Processing...").size(16).into(),
            EditStatus::Error => text(session.last_error().unwrap_or_default())
                .size(14)
                .style(text::danger)
                .into(),
            EditStatus::Idle | EditStatus::Success => horizontal_space().into(),
        };

        let compare = (!session.is_showing_original() && !session.is_processing()).then(|| {
            mouse_area(
                container(text("Hold to Compare Original").size(14))
                    .padding(8)
                    .style(container::rounded_box),
            )
            .on_press(Message::CompareStart)
            .on_release(Message::CompareEnd)
            .on_exit(Message::CompareEnd)
        });

        let header = Row::new()
            .push(container(text(badge).size(12)).padding(6).style(container::rounded_box))
            .push(horizontal_space())
            .push(status_line)
            .push_maybe(compare)
            .spacing(8)
            .align_y(Alignment::Center);

        column![header, picture]
            .spacing(8)
            .width(Length::Fill)
            .height(Length::Fill)
            .into()
    }

    fn history_strip(&self) -> Element<'_, Message> {
        let session = &self.session;
        if session.history().is_empty() {
            return column![].into();
        }

        let idle = !session.is_processing();
        let original = thumbnail(
            self.preview(session.original()),
            "Original".to_string(),
            session.is_showing_original(),
            idle.then_some(Message::RestoreOriginal),
        );

        let strip = session.history().all().fold(
            Row::new().push(original).spacing(8),
            |strip, entry| {
                strip.push(thumbnail(
                    self.preview(&entry.result),
                    truncate(&entry.instruction),
                    session.is_entry_displayed(entry),
                    idle.then_some(Message::RestoreEntry(entry.id)),
                ))
            },
        );

        scrollable(strip)
            .direction(scrollable::Direction::Horizontal(
                scrollable::Scrollbar::new(),
            ))
            .width(Length::Fill)
            .into()
    }

    fn prompt_box(&self) -> Element<'_, Message> {
        let session = &self.session;

        let input = text_input("Describe the change...", session.pending_instruction()).padding(10);
        let input = if session.is_processing() {
            input
        } else {
            input
                .on_input(Message::InstructionChanged)
                .on_submit(Message::Submit)
        };

        let generate = button(if session.is_processing() {
            "Generating..."
        } else {
            "Generate"
        })
        .padding(10)
        .on_press_maybe(session.can_submit().then_some(Message::Submit));

        let content: Column<Message> = column![
            text("What would you like to change?").size(14),
            row![input, generate].spacing(8).align_y(Alignment::Center),
        ]
        .spacing(6);

        content.into()
    }
}

fn thumbnail<'a>(
    handle: Handle,
    label: String,
    selected: bool,
    on_press: Option<Message>,
) -> Element<'a, Message> {
    let content = column![
        image(handle)
            .content_fit(ContentFit::Cover)
            .width(THUMBNAIL_SIZE)
            .height(THUMBNAIL_SIZE),
        text(label).size(10),
    ]
    .align_x(Alignment::Center)
    .spacing(2);

    let style: fn(&Theme, button::Status) -> button::Style = if selected {
        button::primary
    } else {
        button::secondary
    };

    button(content)
        .padding(2)
        .style(style)
        .on_press_maybe(on_press)
        .into()
}

fn truncate(instruction: &str) -> String {
    if instruction.chars().count() <= THUMBNAIL_LABEL_CHARS {
        instruction.to_string()
    } else {
        let mut short: String = instruction.chars().take(THUMBNAIL_LABEL_CHARS - 1).collect();
        short.push('…');
        short
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_truncate() {
        assert_eq!(truncate("add a hat"), "add a hat");
        assert_eq!(truncate("make the whole sky purple"), "make the whole …");
    }

    #[test]
    fn test_new_workspace_caches_original() {
        let workspace = Workspace::new(ImageAsset::new(b"cat".to_vec(), "image/png"));
        let id = workspace.session.original().id();
        assert!(workspace.previews.contains_key(&id));
        assert!(!workspace.comparing);
    }

    #[test]
    fn test_restore_ends_compare() {
        let mut workspace = Workspace::new(ImageAsset::new(b"cat".to_vec(), "image/png"));
        workspace.comparing = true;
        workspace.restore_original();
        assert!(!workspace.comparing);

        workspace.comparing = true;
        assert!(!workspace.restore_entry(42));
        assert!(!workspace.comparing);
    }

    #[test]
    fn test_finished_edit_ends_compare() {
        let mut workspace = Workspace::new(ImageAsset::new(b"cat".to_vec(), "image/png"));
        workspace.session.set_instruction("add a hat");
        let request = workspace.session.begin_submit().unwrap();
        workspace.comparing = true;

        let inline = InlineImage::new(nanoedit::codec::text_encode(b"hat"), "image/png");
        let Completion::Applied(entry) = workspace.finish_edit(request.ticket, Ok(inline)) else {
            panic!("expected the edit to apply");
        };

        assert!(!workspace.comparing);
        assert!(workspace.previews.contains_key(&entry.result.id()));
        assert!(workspace.session.is_entry_displayed(&entry));

        workspace.session.set_instruction("make it blue");
        let request = workspace.session.begin_submit().unwrap();
        workspace.comparing = true;
        workspace.finish_edit(request.ticket, Err(RequestError::NoContent));
        assert!(!workspace.comparing);
    }
}
