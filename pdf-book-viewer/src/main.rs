use clap::Parser;
use iced::keyboard::{self, key};
use iced::widget::image::Handle;
use iced::widget::{
    button, column, container, horizontal_space, pick_list, progress_bar, row, text, text_input,
    Canvas,
};
use iced::{window, Element, Length, Subscription, Task, Theme};
use pdf_book_core::page_map::parse_page_number;
use pdf_book_core::{
    ContentBox, Direction, GestureRecognizer, PageMapper, PointerEvent, Size, Vector,
    ViewerConfig, ViewportTransform, ZoomLevels,
};
use std::fmt;
use std::path::{Path, PathBuf};
use std::time::{Duration, Instant};
use tracing_subscriber::EnvFilter;

mod book;
mod canvas;
mod renderer;

use book::PdfBook;
use canvas::PageCanvas;
use renderer::PdfRenderer;

#[derive(Parser, Debug)]
#[command(name = "pdf-book", version, about = "Page through a PDF book, splitting two-page spreads")]
struct Args {
    /// PDF file to open
    file: PathBuf,

    /// JSON file overriding viewer settings
    #[arg(long)]
    config: Option<PathBuf>,
}

fn main() -> iced::Result {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new("pdf_book_viewer=debug,pdf_book_core=debug,info")),
        )
        .init();

    let args = Args::parse();
    let config = match &args.config {
        Some(path) => ViewerConfig::load(path).unwrap_or_else(|e| {
            tracing::error!("Failed to load config {}: {}", path.display(), e);
            ViewerConfig::default()
        }),
        None => ViewerConfig::default(),
    };

    iced::application("PDF Book", BookViewer::update, BookViewer::view)
        .theme(|_| Theme::Dark)
        .subscription(BookViewer::subscription)
        .run_with(move || BookViewer::new(args.file, config))
}

#[derive(Debug, Clone)]
pub enum Message {
    OpenDocument(PathBuf),
    Pointer(PointerEvent),
    Scrolled(Vector),
    ContainerResized(Size),
    Frame(Instant),
    Navigate(Direction),
    PageInputChanged(String),
    PageInputSubmitted,
    ZoomStep(Direction),
    ZoomSelected(ZoomChoice),
}

/// Zoom value as offered by the zoom selector.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ZoomChoice(f32);

impl fmt::Display for ZoomChoice {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&ZoomLevels::label(self.0))
    }
}

struct BookViewer {
    book: Option<PdfBook>,
    status: Option<String>,
    mapper: PageMapper,
    viewport: ViewportTransform,
    gestures: GestureRecognizer,
    zoom_levels: ZoomLevels,
    page_spacing: f32,
    render_scale: f32,
    page_index: usize,
    page_input: String,
    current_image: Option<Handle>,
    last_frame: Option<Instant>,
}

impl BookViewer {
    fn new(path: PathBuf, config: ViewerConfig) -> (Self, Task<Message>) {
        let viewer = Self {
            book: None,
            status: Some(format!("Loading {}...", path.display())),
            mapper: PageMapper::new(config.split_threshold),
            viewport: ViewportTransform::new(&config),
            gestures: GestureRecognizer::new(),
            zoom_levels: config.zoom_levels.clone(),
            page_spacing: config.page_spacing,
            render_scale: config.render_scale,
            page_index: 0,
            page_input: String::new(),
            current_image: None,
            last_frame: None,
        };

        // pdfium documents are not Send, so the load runs in `update` once the
        // loading screen is up rather than on a worker.
        (viewer, Task::done(Message::OpenDocument(path)))
    }

    fn load(&mut self, path: &Path) {
        match PdfRenderer::new().and_then(|renderer| PdfBook::load(&renderer, path, self.render_scale)) {
            Ok(book) => {
                self.status = None;
                self.open(book);
            }
            Err(e) => {
                tracing::error!("Failed to open PDF: {:#}", e);
                self.status = Some(format!("Failed to open {}: {:#}", path.display(), e));
            }
        }
    }

    /// Replace the current document; everything derived from the old one is
    /// dropped before the new geometry is applied.
    fn open(&mut self, book: PdfBook) {
        self.gestures.reset();
        self.viewport.clear_content();
        self.mapper.reset();
        self.mapper.build_from_sizes(book.page_sizes());
        self.book = Some(book);
        self.set_page_index(0);
    }

    fn set_page_index(&mut self, index: usize) {
        self.page_index = index;
        self.page_input = (index + 1).to_string();
        self.show_page();
    }

    fn show_page(&mut self) {
        let map = self.mapper.map();
        let Some(position) = map.display_position(self.page_index) else {
            self.current_image = None;
            return;
        };
        if let Some(unit) = map.render_unit(position) {
            self.viewport
                .set_content_box(ContentBox::new(position, unit.content_size()));
        }
        self.current_image = self
            .book
            .as_mut()
            .and_then(|book| book.rendered_unit(&self.mapper, position));
    }

    fn update(&mut self, message: Message) -> Task<Message> {
        match message {
            Message::OpenDocument(path) => {
                self.load(&path);
            }
            Message::Pointer(event) => {
                if let Some(gesture) = self.gestures.handle(event) {
                    self.viewport.apply(gesture);
                }
            }
            Message::Scrolled(delta) => {
                self.viewport.on_scroll(delta);
            }
            Message::ContainerResized(size) => {
                self.gestures.reset();
                self.viewport.on_container_resize(size);
            }
            Message::Frame(now) => {
                let elapsed = self
                    .last_frame
                    .map_or(Duration::ZERO, |last| now.saturating_duration_since(last));
                self.last_frame = self.viewport.tick(elapsed).then_some(now);
            }
            Message::Navigate(direction) => {
                if self.mapper.can_navigate(self.page_index, direction) {
                    let next = self.mapper.navigate_by(self.page_index, direction);
                    self.set_page_index(next);
                }
            }
            Message::PageInputChanged(input) => {
                if parse_page_number(&input, self.mapper.total_logical_pages()).is_some() {
                    self.page_input = input;
                }
            }
            Message::PageInputSubmitted => {
                match parse_page_number(&self.page_input, self.mapper.total_logical_pages()) {
                    Some(Some(number)) => {
                        let index = self.mapper.clamp_index(number as i64 - 1);
                        self.set_page_index(index);
                    }
                    _ => self.page_input = (self.page_index + 1).to_string(),
                }
            }
            Message::ZoomStep(direction) => {
                if let Some(zoom) = self.zoom_levels.step(self.viewport.goal().zoom, direction) {
                    self.viewport.set_zoom(zoom);
                }
            }
            Message::ZoomSelected(ZoomChoice(zoom)) => {
                self.viewport.set_zoom(zoom);
            }
        }
        Task::none()
    }

    fn subscription(&self) -> Subscription<Message> {
        let keys = keyboard::on_key_press(|key, modifiers| match key.as_ref() {
            keyboard::Key::Named(key::Named::ArrowLeft) => Some(Message::Navigate(Direction::Decrement)),
            keyboard::Key::Named(key::Named::ArrowRight) => Some(Message::Navigate(Direction::Increment)),
            keyboard::Key::Character("+" | "=") if modifiers.command() => {
                Some(Message::ZoomStep(Direction::Increment))
            }
            keyboard::Key::Character("-") if modifiers.command() => {
                Some(Message::ZoomStep(Direction::Decrement))
            }
            _ => None,
        });

        if self.viewport.is_animating() {
            Subscription::batch([keys, window::frames().map(Message::Frame)])
        } else {
            keys
        }
    }

    fn view(&self) -> Element<Message> {
        let Some(book) = &self.book else {
            let status = self
                .status
                .clone()
                .unwrap_or_else(|| "No document loaded".to_string());
            return container(text(status).size(16))
                .width(Length::Fill)
                .height(Length::Fill)
                .center_x(Length::Fill)
                .center_y(Length::Fill)
                .into();
        };

        let page = Canvas::new(PageCanvas {
            image: self.current_image.clone(),
            target: self.viewport.content_rect(),
            container: self.viewport.container(),
            content: self.viewport.content().map(|content| content.size),
            page_spacing: self.page_spacing,
        })
        .width(Length::Fill)
        .height(Length::Fill);

        let total = self.mapper.total_logical_pages();
        let zoom = self.viewport.goal().zoom;
        let choices: Vec<ZoomChoice> = self
            .zoom_levels
            .as_slice()
            .iter()
            .copied()
            .map(ZoomChoice)
            .collect();
        let navigate = |direction| {
            self.mapper
                .can_navigate(self.page_index, direction)
                .then_some(Message::Navigate(direction))
        };
        let zoom_step = |direction| {
            self.zoom_levels
                .can_step(zoom, direction)
                .then_some(Message::ZoomStep(direction))
        };

        let controls = row![
            text(book.file_name()).size(14),
            horizontal_space(),
            button("◀").on_press_maybe(navigate(Direction::Decrement)),
            text_input("", &self.page_input)
                .on_input(Message::PageInputChanged)
                .on_submit(Message::PageInputSubmitted)
                .width(Length::Fixed(64.0)),
            text(format!("/ {total}")),
            button("▶").on_press_maybe(navigate(Direction::Increment)),
            horizontal_space(),
            button("−").on_press_maybe(zoom_step(Direction::Decrement)),
            pick_list(choices, Some(ZoomChoice(zoom)), Message::ZoomSelected),
            button("+").on_press_maybe(zoom_step(Direction::Increment)),
        ]
        .spacing(10)
        .padding(10)
        .align_y(iced::Alignment::Center);

        column![
            page,
            progress_bar(0.0..=100.0, self.mapper.progress(self.page_index))
                .height(Length::Fixed(4.0)),
            controls,
        ]
        .into()
    }
}
