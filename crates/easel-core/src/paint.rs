//! The paint widget: one surface, the selected tool and the toolbar state.

use crate::color::Rgba;
use crate::config::EaselConfig;
use crate::controls::{ControlAction, LoadRequest, Toolbar};
use crate::drag::{DragTracker, Instant};
use crate::imaging::{
    DecodedImage, ExportResult, ImageLocation, ImageOrigin, ImageResult, SaveLink, decode_image,
    load_image,
};
use crate::input::{MouseButton, PointerEvent};
use crate::surface::{Surface, SurfaceResult};
use crate::text::{FontFace, TextRasterizer, TextResult};
use crate::tools::{ToolKind, ToolStart, stamp_text, start_tool};
use kurbo::Point;

/// What happened to a pointer event.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum PointerOutcome {
    /// Not for the paint widget.
    Ignored,
    /// A drag session started.
    Started,
    /// The text tool wants input for this position.
    NeedsText(Point),
    /// An active drag session took the event.
    Consumed,
}

/// A paint widget.
pub struct Paint {
    surface: Surface,
    tool: ToolKind,
    drag: DragTracker,
    config: EaselConfig,
    toolbar: Toolbar,
    font: Option<Box<dyn TextRasterizer>>,
    pending_text: Option<Point>,
}

impl std::fmt::Debug for Paint {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Paint")
            .field("surface", &self.surface)
            .field("tool", &self.tool)
            .field("drag", &self.drag)
            .field("toolbar", &self.toolbar)
            .field("pending_text", &self.pending_text)
            .finish_non_exhaustive()
    }
}

impl Paint {
    /// Create a widget with a blank surface of the configured size.
    pub fn new(config: EaselConfig) -> SurfaceResult<Self> {
        let surface = Surface::new(config.canvas.width, config.canvas.height)?;
        log::info!(
            "Created {}x{} paint surface",
            surface.width(),
            surface.height()
        );
        Ok(Self {
            surface,
            tool: ToolKind::default(),
            drag: DragTracker::new(),
            config,
            toolbar: Toolbar::new(),
            font: None,
            pending_text: None,
        })
    }

    pub fn surface(&self) -> &Surface {
        &self.surface
    }

    pub fn config(&self) -> &EaselConfig {
        &self.config
    }

    pub fn toolbar(&self) -> &Toolbar {
        &self.toolbar
    }

    pub fn toolbar_mut(&mut self) -> &mut Toolbar {
        &mut self.toolbar
    }

    /// Tool used by the next pointer-down.
    pub fn tool(&self) -> ToolKind {
        self.tool
    }

    /// Current fill (and stroke) color.
    pub fn color(&self) -> Rgba {
        self.surface.state.fill
    }

    pub fn line_width(&self) -> f64 {
        self.surface.state.line_width
    }

    /// Raster revision; changes whenever pixels change.
    pub fn revision(&self) -> u64 {
        self.surface.revision()
    }

    pub fn is_dragging(&self) -> bool {
        self.drag.is_active()
    }

    /// Position waiting for text from the host, if the text tool was used.
    pub fn pending_text(&self) -> Option<Point> {
        self.pending_text
    }

    /// Use `font` for the text tool instead of loading one on first use.
    pub fn set_font(&mut self, font: Box<dyn TextRasterizer>) {
        self.font = Some(font);
    }

    /// Dispatch a pointer event.
    pub fn handle(&mut self, event: &PointerEvent, now: Instant) -> PointerOutcome {
        match *event {
            PointerEvent::Down { position, button } => self.pointer_down(position, button, now),
            PointerEvent::Move { position } => Self::outcome(self.pointer_move(position)),
            PointerEvent::Up { position, .. } => Self::outcome(self.pointer_up(position)),
            PointerEvent::Lost => Self::outcome(self.pointer_lost()),
        }
    }

    /// Start the selected tool. Only the primary button starts tools, and
    /// nothing starts while a drag or text prompt is in progress.
    pub fn pointer_down(&mut self, pos: Point, button: MouseButton, now: Instant) -> PointerOutcome {
        if button != MouseButton::Left || self.drag.is_active() || self.pending_text.is_some() {
            return PointerOutcome::Ignored;
        }
        match start_tool(self.tool, &mut self.surface, pos, now, &self.config.spray) {
            ToolStart::Drag(session) => {
                if self.drag.begin(session) {
                    PointerOutcome::Started
                } else {
                    PointerOutcome::Ignored
                }
            }
            ToolStart::PromptText(at) => {
                self.pending_text = Some(at);
                PointerOutcome::NeedsText(at)
            }
        }
    }

    /// Forward a move to the active session. Returns true if consumed.
    pub fn pointer_move(&mut self, pos: Point) -> bool {
        self.drag.pointer_move(&mut self.surface, pos)
    }

    /// End the active session on release of any button.
    pub fn pointer_up(&mut self, pos: Point) -> bool {
        self.drag.pointer_up(&mut self.surface, pos)
    }

    /// The host lost the pointer; treated as a release.
    pub fn pointer_lost(&mut self) -> bool {
        self.drag.cancel(&mut self.surface)
    }

    /// Drive timed work (spraying). Returns true if the surface changed.
    pub fn tick(&mut self, now: Instant) -> bool {
        self.drag.tick(&mut self.surface, now)
    }

    /// Complete a text prompt. `None` or empty text cancels it.
    pub fn finish_text_prompt(&mut self, text: Option<&str>) -> TextResult<bool> {
        let Some(pos) = self.pending_text.take() else {
            return Ok(false);
        };
        match text {
            Some(text) => self.stamp_text(pos, text),
            None => Ok(false),
        }
    }

    /// Stamp `text` at `pos` with the current fill color and brush size.
    pub fn stamp_text(&mut self, pos: Point, text: &str) -> TextResult<bool> {
        if text.is_empty() {
            return Ok(false);
        }
        if self.font.is_none() {
            self.font = Some(self.load_font()?);
        }
        let Some(font) = self.font.as_deref() else {
            return Ok(false);
        };
        Ok(stamp_text(
            &mut self.surface,
            font,
            pos,
            text,
            self.config.text.min_font_px,
        ))
    }

    /// Apply a toolbar action.
    pub fn apply(&mut self, action: ControlAction) {
        match action {
            ControlAction::SelectTool(tool) => {
                log::debug!("Tool selected: {}", tool.name());
                self.tool = tool;
            }
            ControlAction::SetColor(color) => {
                self.surface.state.fill = color;
                self.surface.state.stroke = color;
            }
            ControlAction::SetBrushSize(width) => {
                if width.is_finite() && width > 0.0 {
                    self.surface.state.line_width = width;
                } else {
                    log::warn!("Ignoring invalid brush size {}", width);
                }
            }
            ControlAction::EditUrl(text) => self.toolbar.url_input = text,
        }
    }

    /// Recompute the save link from the current picture.
    pub fn refresh_save_link(&mut self) -> ExportResult<&SaveLink> {
        let link = SaveLink::refresh(&self.surface)?;
        match &link {
            SaveLink::Blocked { message } => self.toolbar.set_status(message.clone()),
            SaveLink::Ready { .. } => {
                // Only drop a status the previous link put there.
                if let Some(SaveLink::Blocked { message }) = &self.toolbar.save_link {
                    if self.toolbar.status.as_deref() == Some(message.as_str()) {
                        self.toolbar.clear_status();
                    }
                }
            }
        }
        Ok(&*self.toolbar.save_link.insert(link))
    }

    /// Submit the open-URL field.
    ///
    /// `data:` URLs are loaded right away. Remote and file locations are
    /// handed back to the host to read.
    pub fn open_url(&mut self) -> ImageResult<Option<LoadRequest>> {
        let location = match ImageLocation::parse(&self.toolbar.url_input) {
            Ok(location) => location,
            Err(e) => {
                self.toolbar.set_status(e.to_string());
                return Err(e);
            }
        };
        match location {
            ImageLocation::Inline(bytes) => {
                self.load_bytes(&bytes, ImageOrigin::Inline)?;
                Ok(None)
            }
            ImageLocation::Remote(url) => Ok(Some(LoadRequest::Fetch(url))),
            ImageLocation::File(path) => Ok(Some(LoadRequest::ReadFile(path))),
        }
    }

    /// Decode and load image bytes.
    pub fn load_bytes(&mut self, bytes: &[u8], origin: ImageOrigin) -> ImageResult<()> {
        let image = decode_image(bytes, origin);
        self.report(image).and_then(|image| self.load_decoded(&image))
    }

    /// Replace the picture with a decoded image.
    pub fn load_decoded(&mut self, image: &DecodedImage) -> ImageResult<()> {
        if let Some(name) = self.drag.active_name() {
            log::debug!("Image load cancels the {} drag", name);
            self.drag.cancel(&mut self.surface);
        }
        let result = load_image(&mut self.surface, image, &self.config);
        self.report(result)
    }

    /// Record an error from the host side (failed fetch, unreadable file).
    pub fn report_error(&mut self, error: &dyn std::fmt::Display) {
        log::error!("{}", error);
        self.toolbar.set_status(error.to_string());
    }

    fn report<T>(&mut self, result: ImageResult<T>) -> ImageResult<T> {
        match &result {
            Ok(_) => self.toolbar.clear_status(),
            Err(e) => self.report_error(e),
        }
        result
    }

    fn load_font(&self) -> TextResult<Box<dyn TextRasterizer>> {
        let face = match &self.config.text.font_path {
            Some(path) => FontFace::from_file(path)?,
            None => FontFace::system_sans_serif()?,
        };
        log::info!("Loaded font for text tool");
        Ok(Box::new(face))
    }

    fn outcome(consumed: bool) -> PointerOutcome {
        if consumed {
            PointerOutcome::Consumed
        } else {
            PointerOutcome::Ignored
        }
    }
}
