use super::messages::{Component, Message, Tab};
use super::state::{
    App, MAX_FONT_SIZE, MAX_PLAYBACK_RATE, MAX_SYNC_OFFSET_SECS, MIN_FONT_SIZE, MIN_PLAYBACK_RATE,
    TRANSCRIPT_SCROLL_ID,
};
use crate::config::HighlightColor;
use crate::mindmap::MindMapLayout;
use crate::transcript::format_timestamp;
use iced::alignment::Vertical;
use iced::widget::canvas::{self, Canvas};
use iced::widget::text::{LineHeight, Wrapping};
use iced::widget::{
    Column, Row, button, checkbox, column, container, horizontal_space, mouse_area, row,
    scrollable, slider, text,
};
use iced::{Background, Color, Element, Length, Point};

impl App {
    pub fn view(&self) -> Element<'_, Message> {
        let playback = self.controller.state();

        let play_button = button(if playback.is_playing { "Pause" } else { "Play" })
            .on_press(Message::TogglePlayPause);
        let jump_button = if self.active_segment.is_some() {
            button("Jump to Active").on_press(Message::JumpToActiveSegment)
        } else {
            button("Jump to Active")
        };

        let time_label = format!(
            "{} / {}",
            format_timestamp(playback.current_time),
            format_timestamp(playback.duration)
        );

        let transcript_tab = tab_button("Transcript", self.active_tab == Tab::Transcript)
            .on_press(Message::TabSelected(Tab::Transcript));
        let mind_map_tab = tab_button("Mind Map", self.active_tab == Tab::MindMap)
            .on_press(Message::TabSelected(Tab::MindMap));

        let theme_label = if matches!(self.config.theme, crate::config::ThemeMode::Night) {
            "Day Mode"
        } else {
            "Night Mode"
        };

        let controls = row![
            button("⏮").on_press(Message::SeekBackward),
            play_button,
            button("⏭").on_press(Message::SeekForward),
            jump_button,
            text(time_label),
            horizontal_space(),
            transcript_tab,
            mind_map_tab,
            button(if self.config.show_video {
                "Hide Video"
            } else {
                "Show Video"
            })
            .on_press(Message::ToggleVideo),
            button(theme_label).on_press(Message::ToggleTheme),
            button(if self.config.show_settings {
                "Hide Settings"
            } else {
                "Show Settings"
            })
            .on_press(Message::ToggleSettings),
        ]
        .spacing(10)
        .align_y(Vertical::Center)
        .width(Length::Fill);

        let body: Element<'_, Message> = match self.active_tab {
            Tab::Transcript => self.transcript_view(),
            Tab::MindMap => self.mind_map_view(),
        };

        let mut content: Column<'_, Message> = column![controls]
            .padding(16)
            .spacing(12)
            .height(Length::Fill);

        if self.config.show_video {
            content = content.push(self.video_panel());
        }
        content = content.push(body);

        let mut layout: Row<'_, Message> = row![container(content).width(Length::Fill)].spacing(16);
        if self.config.show_settings {
            layout = layout.push(self.settings_panel());
        }

        layout.into()
    }

    /// Status strip standing in for the embedded player surface.
    fn video_panel(&self) -> Element<'_, Message> {
        let playback = self.controller.state();
        let status = if playback.is_loading {
            "Buffering"
        } else if playback.is_playing {
            "Playing"
        } else {
            "Paused"
        };
        let label = format!(
            "{} | {} | {} | {:.2}x | vol {}%",
            self.title, self.video_id, status, playback.playback_rate, playback.volume
        );
        container(text(label).size(14.0))
            .padding(8)
            .width(Length::Fill)
            .into()
    }

    fn transcript_view(&self) -> Element<'_, Message> {
        if self.segments.is_empty() {
            return container(text("No transcript available for this lesson."))
                .padding(24)
                .width(Length::Fill)
                .height(Length::FillPortion(1))
                .into();
        }

        let highlight = self.highlight_color();
        let font_size = self.config.font_size as f32;
        let line_height = LineHeight::Relative(self.config.line_spacing);

        let mut rows: Column<'_, Message> = column![].spacing(4).width(Length::Fill);
        for segment in self.segments.segments() {
            let stamp = segment
                .timestamp
                .clone()
                .unwrap_or_else(|| format_timestamp(segment.start));
            let is_active = Some(segment.global_index) == self.active_segment;

            let body = row![
                text(stamp).size(font_size * 0.85).width(Length::Fixed(64.0)),
                text(segment.text.as_str())
                    .size(font_size)
                    .line_height(line_height)
                    .wrapping(Wrapping::WordOrGlyph)
                    .width(Length::Fill),
            ]
            .spacing(8);

            let styled = container(body).padding(4).width(Length::Fill).style(
                move |_theme| container::Style {
                    background: is_active.then_some(Background::Color(highlight)),
                    ..container::Style::default()
                },
            );

            rows = rows.push(
                mouse_area(styled).on_press(Message::SegmentClicked(segment.global_index)),
            );
        }

        scrollable(container(rows).width(Length::Fill).padding([
            self.config.margin_vertical,
            self.config.margin_horizontal,
        ]))
        .on_scroll(|viewport| Message::Scrolled {
            offset: viewport.relative_offset(),
            viewport_height: viewport.bounds().height,
            content_height: viewport.content_bounds().height,
        })
        .id(TRANSCRIPT_SCROLL_ID.clone())
        .height(Length::FillPortion(1))
        .into()
    }

    fn mind_map_view(&self) -> Element<'_, Message> {
        if self.mind_map.nodes.is_empty() {
            return container(text("This lesson has no mind map."))
                .padding(24)
                .width(Length::Fill)
                .height(Length::FillPortion(1))
                .into();
        }

        Canvas::new(MindMapCanvas {
            layout: &self.mind_map,
            night: matches!(self.config.theme, crate::config::ThemeMode::Night),
        })
        .width(Length::Fill)
        .height(Length::FillPortion(1))
        .into()
    }

    fn color_row<'a>(
        &self,
        label: &'a str,
        color: HighlightColor,
        msg: impl Fn(Component, f32) -> Message + Copy + 'a,
    ) -> Row<'a, Message> {
        row![
            text(label),
            slider(0.0..=1.0, color.r, move |v| msg(Component::R, v)).step(0.01),
            slider(0.0..=1.0, color.g, move |v| msg(Component::G, v)).step(0.01),
            slider(0.0..=1.0, color.b, move |v| msg(Component::B, v)).step(0.01),
            slider(0.0..=1.0, color.a, move |v| msg(Component::A, v)).step(0.01),
        ]
        .spacing(6)
        .align_y(Vertical::Center)
    }

    fn settings_panel(&self) -> Element<'_, Message> {
        let playback = self.controller.state();

        let panel = column![
            text("Reader Settings").size(20.0),
            row![
                text(format!("Font: {}", self.config.font_size)),
                slider(
                    MIN_FONT_SIZE as f32..=MAX_FONT_SIZE as f32,
                    self.config.font_size as f32,
                    |value| Message::FontSizeChanged(value.round() as u32),
                )
            ]
            .spacing(8)
            .align_y(Vertical::Center),
            row![
                text(format!("Sync offset: {:+.2} s", self.config.sync_offset_secs)),
                slider(
                    -MAX_SYNC_OFFSET_SECS..=MAX_SYNC_OFFSET_SECS,
                    self.config.sync_offset_secs,
                    Message::SyncOffsetChanged,
                )
                .step(0.05)
            ]
            .spacing(8)
            .align_y(Vertical::Center),
            row![
                text(format!("Speed: {:.2}x", self.config.playback_rate)),
                slider(
                    MIN_PLAYBACK_RATE..=MAX_PLAYBACK_RATE,
                    self.config.playback_rate,
                    Message::PlaybackRateChanged,
                )
                .step(0.05)
            ]
            .spacing(8)
            .align_y(Vertical::Center),
            row![
                text(format!("Volume: {}%", playback.volume)),
                slider(0.0..=100.0, self.config.volume as f32, |value| {
                    Message::VolumeChanged(value.round() as u8)
                })
            ]
            .spacing(8)
            .align_y(Vertical::Center),
            checkbox("Auto-scroll to active segment", self.config.auto_scroll)
                .on_toggle(Message::AutoScrollChanged),
            checkbox(
                "Center active segment while tracking",
                self.config.center_active_segment,
            )
            .on_toggle(Message::CenterActiveChanged),
            text("Highlight Colors").size(18.0),
            self.color_row("Day highlight", self.config.day_highlight, |c, v| {
                Message::DayHighlightChanged(c, v)
            }),
            self.color_row("Night highlight", self.config.night_highlight, |c, v| {
                Message::NightHighlightChanged(c, v)
            }),
        ]
        .spacing(12)
        .width(Length::Fixed(280.0));

        container(panel).padding(12).into()
    }
}

fn tab_button(label: &str, active: bool) -> iced::widget::Button<'_, Message> {
    if active {
        button(text(label)).style(button::primary)
    } else {
        button(text(label)).style(button::secondary)
    }
}

/// Canvas renderer for the laid-out mind map. Layout coordinates are in
/// abstract canvas units anchored at the synthetic root; a fixed margin shifts
/// everything into view.
struct MindMapCanvas<'a> {
    layout: &'a MindMapLayout,
    night: bool,
}

const CANVAS_MARGIN_X: f32 = 40.0;
const CANVAS_MARGIN_Y: f32 = 30.0;
const NODE_RADIUS: f32 = 5.0;

impl MindMapCanvas<'_> {
    fn position_of(&self, id: &str) -> Option<Point> {
        self.layout
            .nodes
            .iter()
            .find(|node| node.id == id)
            .map(|node| Point::new(node.x + CANVAS_MARGIN_X, node.y + CANVAS_MARGIN_Y))
    }
}

impl canvas::Program<Message> for MindMapCanvas<'_> {
    type State = ();

    fn draw(
        &self,
        _state: &Self::State,
        renderer: &iced::Renderer,
        _theme: &iced::Theme,
        bounds: iced::Rectangle,
        _cursor: iced::mouse::Cursor,
    ) -> Vec<canvas::Geometry> {
        let mut frame = canvas::Frame::new(renderer, bounds.size());

        let (edge_color, node_color, label_color) = if self.night {
            (
                Color::from_rgb(0.45, 0.45, 0.5),
                Color::from_rgb(0.55, 0.7, 0.95),
                Color::from_rgb(0.9, 0.9, 0.9),
            )
        } else {
            (
                Color::from_rgb(0.6, 0.6, 0.65),
                Color::from_rgb(0.2, 0.4, 0.75),
                Color::from_rgb(0.1, 0.1, 0.15),
            )
        };

        for edge in &self.layout.edges {
            if let (Some(from), Some(to)) =
                (self.position_of(&edge.source), self.position_of(&edge.target))
            {
                frame.stroke(
                    &canvas::Path::line(from, to),
                    canvas::Stroke::default()
                        .with_width(1.5)
                        .with_color(edge_color),
                );
            }
        }

        for node in &self.layout.nodes {
            let center = Point::new(node.x + CANVAS_MARGIN_X, node.y + CANVAS_MARGIN_Y);
            frame.fill(&canvas::Path::circle(center, NODE_RADIUS), node_color);
            frame.fill_text(canvas::Text {
                content: node.label.clone(),
                position: Point::new(center.x + NODE_RADIUS + 4.0, center.y),
                color: label_color,
                size: 14.0.into(),
                vertical_alignment: Vertical::Center,
                ..canvas::Text::default()
            });
        }

        vec![frame.into_geometry()]
    }
}
