// Course map window: markers, route line and the per-checkpoint results modal

pub mod modal;

use std::sync::mpsc::{self, Receiver, TryRecvError};
use std::thread;

use egui::{Align2, Color32, FontId, Pos2, Rect, RichText, Vec2, Visuals};
use egui_plot::{Line, LineStyle, MarkerShape, Plot, PlotPoint, PlotPoints, PlotTransform, Points, Text};
use log::{debug, error, info};

use crate::NikromeError;
use crate::checkpoint::ModalViewState;
use crate::config::{AppConfig, RoutingConfig};
use crate::geo::LatLng;
use crate::map::{self, MapSurface, MarkerIcon};
use crate::results::{DatasetSource, RunnerDataset, load_dataset};
use crate::route::{self, PolylineStyle, RoutePolyline};
use crate::runtime;

use modal::{ModalEvent, ResultsModal};

const MARKER_RADIUS: f32 = 8.0;
/// Pointer distance, in pixels, within which a click selects a marker
const MARKER_HIT_RADIUS: f32 = 14.0;
const POPUP_SIZE: Vec2 = Vec2::new(120.0, 22.0);

const CHECKPOINT_COLOR: Color32 = Color32::from_rgb(41, 128, 185);
const ARRIVAL_COLOR: Color32 = Color32::from_rgb(192, 57, 43);

pub enum UiState {
    Loading,
    Error { message: String },
    Ready { dataset: RunnerDataset },
}

enum RouteState {
    Pending(Receiver<RoutePolyline>),
    Settled,
}

pub struct RaceMapApp {
    config: AppConfig,
    surface: MapSurface,
    ui_state: UiState,
    dataset_receiver: Option<Receiver<Result<RunnerDataset, NikromeError>>>,
    route_state: RouteState,
    modal: Option<ModalViewState>,
    modal_open: bool,
    reset_view: bool,
}

/// Load the dataset on a worker thread, waking the UI once it is done
fn spawn_dataset_load(
    source: DatasetSource,
    ctx: egui::Context,
) -> Receiver<Result<RunnerDataset, NikromeError>> {
    let (tx, rx) = mpsc::channel();
    thread::spawn(move || {
        let result = runtime::try_block_on(load_dataset(&source));
        if tx.send(result).is_err() {
            debug!("Map window closed before results were loaded");
        }
        ctx.request_repaint();
    });
    rx
}

/// Look up the course route on a worker thread; always delivers a polyline
fn spawn_route_lookup(
    config: RoutingConfig,
    points: Vec<LatLng>,
    ctx: egui::Context,
) -> Receiver<RoutePolyline> {
    let (tx, rx) = mpsc::channel();
    thread::spawn(move || {
        let polyline = route::lookup_course_route(&config, &points);
        if tx.send(polyline).is_err() {
            debug!("Map window closed before the route was resolved");
        }
        ctx.request_repaint();
    });
    rx
}

impl RaceMapApp {
    pub fn new(cc: &eframe::CreationContext<'_>, config: AppConfig, source: DatasetSource) -> Self {
        cc.egui_ctx.set_visuals(Visuals::light());

        let course = map::semi_ventoux();
        let surface = map::course_surface(&config, &course);

        let dataset_receiver = Some(spawn_dataset_load(source, cc.egui_ctx.clone()));
        let route_state = RouteState::Pending(spawn_route_lookup(
            config.routing.clone(),
            map::course::positions(&course),
            cc.egui_ctx.clone(),
        ));

        Self {
            config,
            surface,
            ui_state: UiState::Loading,
            dataset_receiver,
            route_state,
            modal: None,
            modal_open: false,
            reset_view: false,
        }
    }

    fn poll_workers(&mut self) {
        if let Some(receiver) = &self.dataset_receiver {
            match receiver.try_recv() {
                Ok(Ok(dataset)) => {
                    info!("Results ready: {} runners", dataset.total_runners());
                    self.ui_state = UiState::Ready { dataset };
                    self.dataset_receiver = None;
                }
                Ok(Err(e)) => {
                    error!("Could not load results: {}", e);
                    self.ui_state = UiState::Error {
                        message: e.to_string(),
                    };
                    self.dataset_receiver = None;
                }
                Err(TryRecvError::Empty) => {}
                Err(TryRecvError::Disconnected) => {
                    self.ui_state = UiState::Error {
                        message: "results loader stopped".to_string(),
                    };
                    self.dataset_receiver = None;
                }
            }
        }

        if let RouteState::Pending(receiver) = &self.route_state {
            match receiver.try_recv() {
                Ok(polyline) => {
                    self.surface.add_polyline(polyline);
                    self.route_state = RouteState::Settled;
                }
                Err(TryRecvError::Empty) => {}
                Err(TryRecvError::Disconnected) => {
                    error!("Route lookup stopped without a result");
                    self.route_state = RouteState::Settled;
                }
            }
        }
    }

    fn reload_results(&mut self, source: DatasetSource, ctx: &egui::Context) {
        info!("Reloading results from {}", source);
        self.ui_state = UiState::Loading;
        self.modal = None;
        self.modal_open = false;
        self.dataset_receiver = Some(spawn_dataset_load(source, ctx.clone()));
    }

    /// Run the checkpoint filter and open the modal; no-op without results
    fn open_checkpoint(&mut self, checkpoint_name: &str) {
        let UiState::Ready { dataset } = &self.ui_state else {
            debug!("Ignoring click on {}, results not loaded", checkpoint_name);
            return;
        };

        match self.config.filter.apply(dataset, checkpoint_name) {
            Ok(Some(view)) => {
                self.modal = Some(view);
                self.modal_open = true;
            }
            Ok(None) => debug!("No results column for checkpoint {}", checkpoint_name),
            Err(e) => error!("Could not build results for {}: {}", checkpoint_name, e),
        }
    }

    fn show_toolbar(&mut self, ctx: &egui::Context) {
        egui::TopBottomPanel::top("toolbar")
            .frame(egui::Frame::new().inner_margin(4))
            .show(ctx, |ui| {
                ui.horizontal_wrapped(|ui| {
                    if ui.button("📂 Load results").clicked()
                        && let Some(path) = rfd::FileDialog::new()
                            .add_filter("JSON", &["json"])
                            .pick_file()
                    {
                        self.reload_results(DatasetSource::File(path), ctx);
                    }
                    if ui.button("⟲ Fit course").clicked() {
                        self.reset_view = true;
                    }
                    ui.separator();

                    match &self.ui_state {
                        UiState::Loading => {
                            ui.spinner();
                            ui.label("Loading results…");
                        }
                        UiState::Error { message } => {
                            ui.label(
                                RichText::new(format!("Results unavailable: {}", message))
                                    .color(Color32::RED),
                            );
                        }
                        UiState::Ready { dataset } => {
                            ui.label(format!("{} runners", dataset.total_runners()));
                        }
                    }

                    ui.separator();
                    match &self.route_state {
                        RouteState::Pending(_) => {
                            ui.label("Looking up route…");
                        }
                        RouteState::Settled => {
                            if self.surface.polylines().iter().any(RoutePolyline::is_fallback) {
                                ui.label(
                                    RichText::new("Approximate route").color(Color32::DARK_GRAY),
                                );
                            }
                        }
                    }
                });
            });
    }

    fn show_map(&mut self, ctx: &egui::Context) {
        let interactive = matches!(self.ui_state, UiState::Ready { .. });

        let clicked = egui::CentralPanel::default()
            .show(ctx, |ui| {
                let center = self.surface.center();
                let mut plot = Plot::new("course_map")
                    .data_aspect((1.0 / center.lat.to_radians().cos()) as f32)
                    .show_axes(false)
                    .show_grid(false)
                    .allow_double_click_reset(true);
                if let Some(view) = self.surface.view_bounds() {
                    plot = plot
                        .include_x(view.south_west.lng)
                        .include_x(view.north_east.lng)
                        .include_y(view.south_west.lat)
                        .include_y(view.north_east.lat);
                }
                if self.reset_view {
                    plot = plot.reset();
                    self.reset_view = false;
                }

                let plot_response = plot.show(ui, |plot_ui| {
                    for (index, polyline) in self.surface.polylines().iter().enumerate() {
                        let points: Vec<[f64; 2]> =
                            polyline.coordinates.iter().map(|p| [p.lng, p.lat]).collect();
                        let (color, width, dash) = line_stroke(&polyline.style);
                        plot_ui.line(
                            Line::new(format!("route_{}", index), PlotPoints::new(points))
                                .color(color)
                                .width(width)
                                .style(dash),
                        );
                    }
                    for marker in self.surface.markers() {
                        let (shape, color) = match marker.icon {
                            MarkerIcon::Arrival => (MarkerShape::Diamond, ARRIVAL_COLOR),
                            MarkerIcon::Checkpoint => (MarkerShape::Circle, CHECKPOINT_COLOR),
                        };
                        let position = [marker.position.lng, marker.position.lat];
                        plot_ui.points(
                            Points::new(marker.title.clone(), PlotPoints::new(vec![position]))
                                .shape(shape)
                                .filled(true)
                                .radius(MARKER_RADIUS)
                                .color(color),
                        );
                        plot_ui.text(
                            Text::new(
                                marker.popup.content.clone(),
                                PlotPoint::new(position[0], position[1]),
                                RichText::new(&marker.popup.content)
                                    .strong()
                                    .background_color(Color32::WHITE),
                            )
                            .anchor(Align2::CENTER_BOTTOM),
                        );
                    }
                });

                // tile provider attribution stays visible whatever the view
                ui.painter().text(
                    plot_response.response.rect.right_bottom() - Vec2::new(4.0, 4.0),
                    Align2::RIGHT_BOTTOM,
                    &self.surface.tile_layer().attribution,
                    FontId::proportional(11.0),
                    Color32::DARK_GRAY,
                );

                if !interactive {
                    return None;
                }
                let pointer = plot_response.response.interact_pointer_pos()?;
                if !plot_response.response.clicked() {
                    return None;
                }
                checkpoint_at(&self.surface, &plot_response.transform, pointer)
            })
            .inner;

        if let Some(checkpoint_name) = clicked {
            self.open_checkpoint(&checkpoint_name);
        }
    }
}

/// Plot stroke for a route style: color with opacity, width and dash pattern
fn line_stroke(style: &PolylineStyle) -> (Color32, f32, LineStyle) {
    let (r, g, b) = style.rgb().unwrap_or((0x2C, 0x3E, 0x50));
    let alpha = (style.opacity.clamp(0.0, 1.0) * 255.0).round() as u8;
    let dash = match style.dash_array {
        Some([dash, _gap]) => LineStyle::Dashed { length: dash },
        None => LineStyle::Solid,
    };
    (
        Color32::from_rgba_unmultiplied(r, g, b, alpha),
        style.weight,
        dash,
    )
}

/// Checkpoint under `pointer`, from either the marker or its popup label
fn checkpoint_at(surface: &MapSurface, transform: &PlotTransform, pointer: Pos2) -> Option<String> {
    hit_checkpoint(surface, pointer, |position| {
        transform.position_from_point(&PlotPoint::new(position.lng, position.lat))
    })
}

fn hit_checkpoint(
    surface: &MapSurface,
    pointer: Pos2,
    to_screen: impl Fn(LatLng) -> Pos2,
) -> Option<String> {
    surface
        .markers()
        .iter()
        .filter_map(|marker| {
            let anchor = to_screen(marker.position);
            let popup = Rect::from_center_size(
                anchor - Vec2::new(0.0, POPUP_SIZE.y / 2.0),
                POPUP_SIZE,
            );
            let distance = anchor.distance(pointer);
            (distance <= MARKER_HIT_RADIUS || popup.contains(pointer))
                .then_some((marker, distance))
        })
        .min_by(|a, b| a.1.total_cmp(&b.1))
        .map(|(marker, _)| marker.checkpoint_name().to_string())
}

impl eframe::App for RaceMapApp {
    fn update(&mut self, ctx: &egui::Context, _frame: &mut eframe::Frame) {
        self.poll_workers();
        self.show_toolbar(ctx);
        self.show_map(ctx);

        if let Some(view) = &self.modal
            && ResultsModal::new(view).show(ctx, self.modal_open) == Some(ModalEvent::Close)
        {
            self.modal_open = false;
        }
    }
}

/// Open the map window and block until it is closed
pub fn run(config: AppConfig, source: DatasetSource) -> Result<(), NikromeError> {
    let mut native_options = eframe::NativeOptions::default();
    native_options.viewport = native_options
        .viewport
        .with_title("Semi Ventoux")
        .with_inner_size(Vec2::new(1024., 768.));

    eframe::run_native(
        "Nikrome",
        native_options,
        Box::new(|cc| Ok(Box::new(RaceMapApp::new(cc, config, source)))),
    )
    .map_err(|e| NikromeError::UiError {
        reason: e.to_string(),
    })
}
