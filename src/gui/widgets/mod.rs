use iced::{
    Element, Length, Theme,
    widget::{Column, column, container, text},
};
use iced_widget::container::bordered_box;

use crate::session::{EntryKind, LogEntry};

impl EntryKind {
    fn style(self) -> impl Fn(&Theme) -> text::Style {
        move |theme: &Theme| {
            let palette = theme.palette();
            let color = match self {
                EntryKind::Output => None,
                EntryKind::Failure => Some(palette.danger),
                EntryKind::Warning => Some(palette.primary),
            };
            text::Style { color }
        }
    }
}

/// Titled, bordered frame around a block of controls
pub fn section<'a, Message>(
    title: &'a str,
    content: impl Into<Element<'a, Message>>,
) -> Element<'a, Message>
where
    Message: 'a,
{
    container(column![text(title).size(16), content.into()].spacing(8))
        .style(bordered_box)
        .padding(10)
        .width(Length::Fill)
        .into()
}

/// One line per log entry, coloured by kind
pub fn log_lines<'a, Message>(entries: &'a [LogEntry]) -> Element<'a, Message>
where
    Message: 'a,
{
    Column::with_children(
        entries
            .iter()
            .map(|entry| text(entry.line()).style(entry.kind().style()).into()),
    )
    .spacing(4)
    .width(Length::Fill)
    .into()
}
