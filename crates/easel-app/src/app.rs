//! Core application state and lifecycle.

use easel_core::input::MouseButton as PaintButton;
use easel_core::{
    ControlAction, EaselConfig, Instant, Paint, PointerEvent, PointerOutcome, Rgba, SaveLink,
    SurfaceError, ToolKind, Viewport,
};
use easel_render::{BrushPreview, RenderContext, Renderer, RendererError, SurfaceRenderer};
use kurbo::{Point, Size};
use peniko::Color;
use std::sync::Arc;
use thiserror::Error;
use vello::util::RenderSurface;
use vello::wgpu::PresentMode;
use vello::{AaConfig, RenderParams, RendererOptions};
use winit::application::ApplicationHandler;
#[cfg(not(target_arch = "wasm32"))]
use winit::dpi::LogicalSize;
use winit::event::{ElementState, MouseButton, WindowEvent};
use winit::event_loop::{ActiveEventLoop, EventLoop};
use winit::keyboard::{Key, ModifiersState};
use winit::window::{Window, WindowId};

use crate::file_ops;
use crate::loader::ImageLoader;
use crate::shortcuts::ShortcutRegistry;
use crate::ui::{MARGIN, UiAction, UiState, render_ui};

/// Application startup errors.
#[derive(Debug, Error)]
pub enum AppError {
    #[error("Failed to create window: {0}")]
    Window(String),
    #[error(transparent)]
    Renderer(#[from] RendererError),
    #[error(transparent)]
    Surface(#[from] SurfaceError),
}

fn map_button(button: MouseButton) -> Option<PaintButton> {
    match button {
        MouseButton::Left => Some(PaintButton::Left),
        MouseButton::Right => Some(PaintButton::Right),
        MouseButton::Middle => Some(PaintButton::Middle),
        _ => None,
    }
}

/// Pointer state when a button changes, in surface pixels.
#[derive(Debug, Clone, Copy, Default)]
struct ButtonContext {
    /// Pointer position while it is over the window.
    cursor: Option<Point>,
    /// Last position seen, kept after the pointer leaves the window.
    last_cursor: Option<Point>,
    over_picture: bool,
    egui_wants_input: bool,
    dragging: bool,
}

/// Translate a button change into an event for the paint widget.
fn button_event(pressed: bool, button: PaintButton, cx: ButtonContext) -> Option<PointerEvent> {
    if pressed {
        let position = cx.cursor?;
        return (cx.over_picture && !cx.egui_wants_input)
            .then_some(PointerEvent::Down { position, button });
    }
    if !cx.dragging {
        return None;
    }
    // Releases end the drag wherever they happen.
    Some(match cx.cursor.or(cx.last_cursor) {
        Some(position) => PointerEvent::Up { position, button },
        None => PointerEvent::Lost,
    })
}

/// Runtime state for the application.
struct AppState {
    // Windowing
    window: Arc<Window>,
    surface: RenderSurface<'static>,

    // Rendering
    vello_renderer: vello::Renderer,
    surface_renderer: SurfaceRenderer,
    /// Texture blitter for RGBA->surface format conversion (needed for WebGPU/WASM)
    texture_blitter: vello::wgpu::util::TextureBlitter,
    background: Color,

    // egui
    egui_ctx: egui::Context,
    egui_state: egui_winit::State,
    egui_renderer: egui_wgpu::Renderer,
    ui_state: UiState,

    // Paint
    paint: Paint,
    loader: ImageLoader,
    /// Last pointer position in physical pixels, while over the window.
    cursor: Option<Point>,
    /// Last pointer position in physical pixels, kept after it leaves.
    last_cursor: Option<Point>,
    modifiers: ModifiersState,
    /// Raster revision the current save link was built from.
    save_link_revision: Option<u64>,
}

impl AppState {
    /// Where the picture sits: below the toolbar, one logical pixel per
    /// surface pixel.
    fn viewport(&self) -> Viewport {
        let scale = self.egui_ctx.pixels_per_point() as f64;
        let top = self.ui_state.toolbar_bottom.max(0.0) + MARGIN;
        Viewport::new(Point::new(MARGIN as f64 * scale, top as f64 * scale), scale)
    }

    fn cursor_over_picture(&self) -> Option<Point> {
        let cursor = self.cursor?;
        let surface = self.paint.surface();
        let viewport = self.viewport();
        viewport
            .contains(cursor, surface.width(), surface.height())
            .then(|| viewport.to_surface(cursor))
    }

    fn dispatch(&mut self, event: PointerEvent) {
        match self.paint.handle(&event, Instant::now()) {
            PointerOutcome::Started => log::debug!("Drag started at {:?}", event.position()),
            PointerOutcome::NeedsText(at) => {
                log::debug!("Text prompt at {:?}", at);
                self.ui_state.text_input.clear();
            }
            PointerOutcome::Consumed | PointerOutcome::Ignored => {}
        }
        self.window.request_redraw();
    }

    fn pointer_moved(&mut self, position: Point) {
        self.cursor = Some(position);
        self.last_cursor = Some(position);
        if self.paint.is_dragging() {
            let position = self.viewport().to_surface(position);
            self.dispatch(PointerEvent::Move { position });
        } else {
            // Brush outline follows the pointer.
            self.window.request_redraw();
        }
    }

    fn mouse_input(&mut self, pressed: bool, button: MouseButton, egui_wants_input: bool) {
        let Some(button) = map_button(button) else {
            return;
        };
        let viewport = self.viewport();
        let cx = ButtonContext {
            cursor: self.cursor.map(|p| viewport.to_surface(p)),
            last_cursor: self.last_cursor.map(|p| viewport.to_surface(p)),
            over_picture: self.cursor_over_picture().is_some(),
            egui_wants_input,
            dragging: self.paint.is_dragging(),
        };
        if let Some(event) = button_event(pressed, button, cx) {
            self.dispatch(event);
        }
    }

    fn key_pressed(&mut self, key: &Key) {
        let Key::Character(c) = key else {
            return;
        };
        let ctrl = self.modifiers.control_key() || self.modifiers.super_key();
        if let Some(tool) = ShortcutRegistry::tool_for_key(c.as_str(), ctrl) {
            self.paint.apply(ControlAction::SelectTool(tool));
            self.window.request_redraw();
        }
    }

    /// Apply results of loads that finished since the last frame.
    fn drain_loads(&mut self) {
        while let Some(result) = self.loader.try_next() {
            match result {
                Ok(image) => {
                    if self.paint.load_decoded(&image).is_ok() {
                        log::info!("Loaded {}x{} image", image.width(), image.height());
                    }
                }
                Err(e) => self.paint.report_error(&e),
            }
        }
    }

    /// Rebuild the save link unless it already reflects the current raster.
    fn refresh_save_link(&mut self) {
        let revision = self.paint.revision();
        if self.save_link_revision == Some(revision) && self.paint.toolbar().save_link.is_some() {
            return;
        }
        match self.paint.refresh_save_link().map(|_| ()) {
            Ok(()) => self.save_link_revision = Some(revision),
            Err(e) => self.paint.report_error(&e),
        }
    }

    fn save(&mut self) {
        self.refresh_save_link();
        let Some(SaveLink::Ready { href, download }) = self.paint.toolbar().save_link.clone()
        else {
            return;
        };
        if let Err(e) = file_ops::save_image(&href, &download) {
            self.paint.report_error(&e);
        }
    }

    fn handle_ui_action(&mut self, action: UiAction) {
        match action {
            UiAction::Control(action) => self.paint.apply(action),
            UiAction::RefreshSaveLink => self.refresh_save_link(),
            UiAction::Save => self.save(),
            UiAction::OpenFile => self.loader.open_file(),
            UiAction::LoadUrl => {
                // Errors are already in the status line.
                if let Ok(Some(request)) = self.paint.open_url() {
                    self.loader.request(request);
                }
            }
            UiAction::FinishText(text) => {
                if let Err(e) = self.paint.finish_text_prompt(text.as_deref()) {
                    self.paint.report_error(&e);
                }
            }
        }
    }

    fn brush_preview(&self) -> Option<BrushPreview> {
        if self.paint.tool() == ToolKind::Text || self.paint.pending_text().is_some() {
            return None;
        }
        self.cursor_over_picture().map(|center| BrushPreview {
            center,
            width: self.paint.line_width(),
        })
    }
}

/// Main application struct.
pub struct App {
    config: EaselConfig,
    state: Option<AppState>,
    render_cx: Option<vello::util::RenderContext>,
    /// Window waiting for async surface creation (WASM only)
    pending_window: Option<Arc<Window>>,
    /// Flag to indicate async init is in progress
    #[cfg(target_arch = "wasm32")]
    init_in_progress: std::cell::Cell<bool>,
}

impl App {
    /// Create the application with the platform's configuration.
    pub fn new() -> Self {
        #[cfg(not(target_arch = "wasm32"))]
        let config = EaselConfig::load_or_default();
        #[cfg(target_arch = "wasm32")]
        let config = EaselConfig::default();
        Self::with_config(config)
    }

    /// Create the application with a custom configuration.
    pub fn with_config(config: EaselConfig) -> Self {
        Self {
            config,
            state: None,
            render_cx: None,
            pending_window: None,
            #[cfg(target_arch = "wasm32")]
            init_in_progress: std::cell::Cell::new(false),
        }
    }

    /// Run the application.
    pub async fn run() {
        let event_loop = match EventLoop::new() {
            Ok(event_loop) => event_loop,
            Err(e) => {
                log::error!("Failed to create event loop: {}", e);
                return;
            }
        };
        let app = App::new();

        #[cfg(target_arch = "wasm32")]
        {
            use winit::platform::web::EventLoopExtWebSys;
            event_loop.spawn_app(app);
        }

        #[cfg(not(target_arch = "wasm32"))]
        {
            let mut app = app;
            if let Err(e) = event_loop.run_app(&mut app) {
                log::error!("Event loop error: {}", e);
            }
        }
    }

    /// Finish initialization after surface is created.
    fn finish_init(
        &mut self,
        window: Arc<Window>,
        surface: RenderSurface<'static>,
    ) -> Result<(), AppError> {
        let render_cx = self
            .render_cx
            .as_ref()
            .ok_or_else(|| RendererError::InitFailed("render context missing".to_string()))?;
        let device = &render_cx.devices[surface.dev_id].device;

        let vello_renderer = vello::Renderer::new(device, RendererOptions::default())
            .map_err(|e| RendererError::InitFailed(e.to_string()))?;

        // Vello renders to Rgba8Unorm (for compute shader compatibility) but
        // the surface format on WebGPU is typically Bgra8Unorm
        let texture_blitter =
            vello::wgpu::util::TextureBlitter::new(device, surface.config.format);

        // Initialize egui
        let egui_ctx = egui::Context::default();
        let egui_state = egui_winit::State::new(
            egui_ctx.clone(),
            egui::ViewportId::ROOT,
            &window,
            Some(window.scale_factor() as f32),
            None,
            None,
        );
        let egui_renderer = egui_wgpu::Renderer::new(
            device,
            surface.config.format,
            egui_wgpu::RendererOptions::default(),
        );

        #[allow(unused_mut)]
        let mut paint = Paint::new(self.config.clone())?;

        // No system fonts on the web: text goes through a 2D canvas.
        #[cfg(target_arch = "wasm32")]
        match crate::web::CanvasTextRasterizer::new() {
            Ok(rasterizer) => paint.set_font(Box::new(rasterizer)),
            Err(e) => log::warn!("Canvas text unavailable: {:?}", e),
        }

        let background: Color = Rgba::parse_hex(&self.config.window.background)
            .unwrap_or(Rgba::rgb(244, 244, 245))
            .into();

        log::info!(
            "Easel initialized - {}x{}",
            surface.config.width,
            surface.config.height
        );

        self.state = Some(AppState {
            window: window.clone(),
            surface,
            vello_renderer,
            surface_renderer: SurfaceRenderer::new(),
            texture_blitter,
            background,
            egui_ctx,
            egui_state,
            egui_renderer,
            ui_state: UiState::default(),
            paint,
            loader: ImageLoader::new(),
            cursor: None,
            last_cursor: None,
            modifiers: ModifiersState::empty(),
            save_link_revision: None,
        });

        self.pending_window = None;

        // Request initial redraw
        window.request_redraw();
        Ok(())
    }

    fn redraw(&mut self) {
        let Some(state) = &mut self.state else {
            return;
        };

        state.drain_loads();
        state.paint.tick(Instant::now());

        // Run egui and collect actions
        let egui_input = state.egui_state.take_egui_input(&state.window);
        let mut actions = Vec::new();
        let egui_output = state.egui_ctx.run(egui_input, |ctx| {
            actions.extend(render_ui(ctx, &mut state.ui_state, &state.paint));
        });
        for action in actions {
            state.handle_ui_action(action);
        }

        state
            .egui_state
            .handle_platform_output(&state.window, egui_output.platform_output);
        let egui_primitives = state
            .egui_ctx
            .tessellate(egui_output.shapes, egui_output.pixels_per_point);

        let width = state.surface.config.width;
        let height = state.surface.config.height;

        let render_ctx = RenderContext::new(
            state.paint.surface(),
            Size::new(width as f64, height as f64),
        )
        .with_viewport(state.viewport())
        .with_background(state.background)
        .with_brush_preview(state.brush_preview());
        state.surface_renderer.build_scene(&render_ctx);
        let base_color = state.surface_renderer.background_color(&render_ctx);

        // Render
        let Some(render_cx) = self.render_cx.as_ref() else {
            return;
        };

        let device_handle = &render_cx.devices[state.surface.dev_id];
        let device = &device_handle.device;
        let queue = &device_handle.queue;

        let surface_texture = match state.surface.surface.get_current_texture() {
            Ok(t) => t,
            Err(e) => {
                log::warn!("{}", RendererError::Surface(e.to_string()));
                return;
            }
        };

        let params = RenderParams {
            base_color,
            width,
            height,
            antialiasing_method: AaConfig::Area,
        };

        // Vello's compute shaders need StorageBinding, which WebGPU only
        // offers for Rgba8Unorm. The result is blitted to the surface.
        let render_texture = device.create_texture(&vello::wgpu::TextureDescriptor {
            label: Some("vello render texture"),
            size: vello::wgpu::Extent3d {
                width,
                height,
                depth_or_array_layers: 1,
            },
            mip_level_count: 1,
            sample_count: 1,
            dimension: vello::wgpu::TextureDimension::D2,
            format: vello::wgpu::TextureFormat::Rgba8Unorm,
            usage: vello::wgpu::TextureUsages::STORAGE_BINDING
                | vello::wgpu::TextureUsages::COPY_SRC
                | vello::wgpu::TextureUsages::TEXTURE_BINDING,
            view_formats: &[],
        });

        let render_texture_view =
            render_texture.create_view(&vello::wgpu::TextureViewDescriptor::default());

        if let Err(e) = state.vello_renderer.render_to_texture(
            device,
            queue,
            state.surface_renderer.scene(),
            &render_texture_view,
            &params,
        ) {
            log::error!("{}", RendererError::RenderFailed(e.to_string()));
            return;
        }

        let surface_view = surface_texture
            .texture
            .create_view(&vello::wgpu::TextureViewDescriptor::default());

        {
            let mut blit_encoder =
                device.create_command_encoder(&vello::wgpu::CommandEncoderDescriptor {
                    label: Some("blit encoder"),
                });
            state.texture_blitter.copy(
                device,
                &mut blit_encoder,
                &render_texture_view,
                &surface_view,
            );
            queue.submit(std::iter::once(blit_encoder.finish()));
        }

        for (id, image_delta) in &egui_output.textures_delta.set {
            state
                .egui_renderer
                .update_texture(device, queue, *id, image_delta);
        }

        // Render egui on top
        let screen_descriptor = egui_wgpu::ScreenDescriptor {
            size_in_pixels: [width, height],
            pixels_per_point: egui_output.pixels_per_point,
        };

        {
            let mut egui_encoder =
                device.create_command_encoder(&vello::wgpu::CommandEncoderDescriptor {
                    label: Some("egui encoder"),
                });

            state.egui_renderer.update_buffers(
                device,
                queue,
                &mut egui_encoder,
                &egui_primitives,
                &screen_descriptor,
            );

            let render_pass = egui_encoder.begin_render_pass(&vello::wgpu::RenderPassDescriptor {
                label: Some("egui render pass"),
                color_attachments: &[Some(vello::wgpu::RenderPassColorAttachment {
                    view: &surface_view,
                    resolve_target: None,
                    ops: vello::wgpu::Operations {
                        load: vello::wgpu::LoadOp::Load,
                        store: vello::wgpu::StoreOp::Store,
                    },
                    depth_slice: None,
                })],
                depth_stencil_attachment: None,
                timestamp_writes: None,
                occlusion_query_set: None,
            });

            // egui-wgpu wants a 'static render pass
            let mut render_pass = render_pass.forget_lifetime();
            state
                .egui_renderer
                .render(&mut render_pass, &egui_primitives, &screen_descriptor);
            drop(render_pass);

            queue.submit(std::iter::once(egui_encoder.finish()));
        }

        for id in &egui_output.textures_delta.free {
            state.egui_renderer.free_texture(id);
        }
        surface_texture.present();

        // Spray ticks and pending loads need frames.
        state.window.request_redraw();
    }
}

impl Default for App {
    fn default() -> Self {
        Self::new()
    }
}

impl ApplicationHandler for App {
    fn resumed(&mut self, event_loop: &ActiveEventLoop) {
        if self.state.is_some() || self.pending_window.is_some() {
            return;
        }

        log::info!("Creating window...");

        #[cfg(not(target_arch = "wasm32"))]
        let window_attrs = Window::default_attributes()
            .with_title(&self.config.window.title)
            .with_inner_size(LogicalSize::new(
                self.config.window.width,
                self.config.window.height,
            ));

        // On WASM, render into the canvas of the picture panel
        #[cfg(target_arch = "wasm32")]
        let window_attrs = {
            use winit::platform::web::WindowAttributesExtWebSys;

            let canvas = match crate::web::mount_canvas() {
                Ok(canvas) => canvas,
                Err(e) => {
                    log::error!("Failed to create canvas: {:?}", e);
                    return;
                }
            };
            let (width, height) = browser_viewport_size(&self.config);
            canvas.set_width(width);
            canvas.set_height(height);
            let style = canvas.style();
            let _ = style.set_property("width", "100%");
            let _ = style.set_property("height", "100%");
            let _ = style.set_property("display", "block");

            Window::default_attributes()
                .with_title(&self.config.window.title)
                .with_canvas(Some(canvas))
        };

        let window = match event_loop.create_window(window_attrs) {
            Ok(window) => Arc::new(window),
            Err(e) => {
                log::error!("{}", AppError::Window(e.to_string()));
                event_loop.exit();
                return;
            }
        };

        // On native, block on async surface creation
        #[cfg(not(target_arch = "wasm32"))]
        {
            let size = window.inner_size();
            let (width, height) = if size.width == 0 || size.height == 0 {
                (self.config.window.width, self.config.window.height)
            } else {
                (size.width, size.height)
            };
            log::info!("Surface size: {}x{}", width, height);

            let render_cx = self
                .render_cx
                .get_or_insert_with(vello::util::RenderContext::new);
            let surface = match pollster::block_on(render_cx.create_surface(
                window.clone(),
                width,
                height,
                PresentMode::AutoVsync,
            )) {
                Ok(surface) => surface,
                Err(e) => {
                    log::error!("Failed to create surface: {:?}", e);
                    event_loop.exit();
                    return;
                }
            };

            if let Err(e) = self.finish_init(window, surface) {
                log::error!("{}", e);
                event_loop.exit();
            }
        }

        // On WASM, store window for later async initialization
        #[cfg(target_arch = "wasm32")]
        {
            self.pending_window = Some(window);
        }
    }

    fn window_event(
        &mut self,
        event_loop: &ActiveEventLoop,
        _window_id: WindowId,
        event: WindowEvent,
    ) {
        // On WASM, handle async initialization
        #[cfg(target_arch = "wasm32")]
        if self.state.is_none() {
            if let Some(window) = self.pending_window.clone() {
                if !self.init_in_progress.get() {
                    self.init_in_progress.set(true);

                    let (width, height) = browser_viewport_size(&self.config);
                    let self_ptr = self as *mut Self;
                    let window_clone = window.clone();

                    wasm_bindgen_futures::spawn_local(async move {
                        log::info!("Creating surface asynchronously...");
                        let mut render_cx = vello::util::RenderContext::new();

                        let surface = render_cx
                            .create_surface(
                                window_clone.clone(),
                                width,
                                height,
                                PresentMode::AutoVsync,
                            )
                            .await;

                        // SAFETY: WASM is single-threaded and the event loop
                        // keeps the App alive for the lifetime of the page.
                        let app = unsafe { &mut *self_ptr };
                        match surface {
                            Ok(surface) => {
                                app.render_cx = Some(render_cx);
                                if let Err(e) = app.finish_init(window_clone, surface) {
                                    log::error!("{}", e);
                                }
                            }
                            Err(e) => {
                                log::error!("Failed to create surface: {:?}", e);
                                app.init_in_progress.set(false);
                            }
                        }
                    });
                }

                // Request redraw to keep the event loop running
                window.request_redraw();
            }
            return;
        }

        let Some(state) = &mut self.state else {
            return;
        };

        // Let egui process the event first
        let egui_response = state.egui_state.on_window_event(&state.window, &event);
        let egui_wants_input = egui_response.consumed
            || state.egui_ctx.is_pointer_over_area()
            || state.egui_ctx.wants_pointer_input()
            || state.egui_ctx.wants_keyboard_input();
        if egui_response.repaint {
            state.window.request_redraw();
        }

        match event {
            WindowEvent::CloseRequested => {
                event_loop.exit();
            }

            WindowEvent::Resized(size) => {
                if size.width == 0 || size.height == 0 {
                    return;
                }
                if let Some(render_cx) = self.render_cx.as_mut() {
                    render_cx.resize_surface(&mut state.surface, size.width, size.height);
                }
                state.window.request_redraw();
            }

            WindowEvent::RedrawRequested => self.redraw(),

            WindowEvent::CursorMoved { position, .. } => {
                state.pointer_moved(Point::new(position.x, position.y));
            }

            // A drag keeps going outside the window; only the preview hides.
            WindowEvent::CursorLeft { .. } => {
                state.cursor = None;
                state.window.request_redraw();
            }

            WindowEvent::MouseInput {
                state: btn_state,
                button,
                ..
            } => {
                state.mouse_input(btn_state == ElementState::Pressed, button, egui_wants_input);
            }

            WindowEvent::Focused(false) => {
                if state.paint.is_dragging() {
                    state.dispatch(PointerEvent::Lost);
                }
            }

            WindowEvent::ModifiersChanged(modifiers) => {
                state.modifiers = modifiers.state();
            }

            WindowEvent::KeyboardInput { event, .. } => {
                if egui_wants_input || event.state != ElementState::Pressed || event.repeat {
                    return;
                }
                state.key_pressed(&event.logical_key);
            }

            _ => {}
        }
    }
}

/// Canvas size in physical pixels for the browser viewport.
#[cfg(target_arch = "wasm32")]
fn browser_viewport_size(config: &EaselConfig) -> (u32, u32) {
    let Some(web_window) = web_sys::window() else {
        return (config.window.width, config.window.height);
    };
    let dpr = web_window.device_pixel_ratio();
    let viewport_width = web_window
        .inner_width()
        .ok()
        .and_then(|v| v.as_f64())
        .unwrap_or(config.window.width as f64);
    let viewport_height = web_window
        .inner_height()
        .ok()
        .and_then(|v| v.as_f64())
        .unwrap_or(config.window.height as f64);
    ((viewport_width * dpr) as u32, (viewport_height * dpr) as u32)
}
