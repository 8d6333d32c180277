//! The splitter window: menu, controls panel, waveform and status line.

use crate::jobs::{self, JobHandle, JobKind, JobMessage};
use crate::settings::Settings;
use autosplit_audio::{decode_file, Player, Waveform};
use autosplit_core::{format_timecode, AudioSession, ExportedSegment, SplitterError};
use autosplit_media::{write_segments, AudioCodec, EncodeParams, ExportOutcome, FfmpegEngine};
use autosplit_ui::{InteractionEvent, Theme, WaveformView};
use eframe::egui;
use std::path::{Path, PathBuf};
use std::time::{Duration, Instant};
use tracing::{error, info, warn};

const AUDIO_EXTENSIONS: [&str; 8] = ["mp3", "wav", "flac", "ogg", "m4a", "aac", "aiff", "aif"];

/// How long non-error status messages stay up.
const STATUS_TIMEOUT: Duration = Duration::from_secs(8);

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StatusKind {
    Info,
    Success,
    Warning,
    Error,
}

impl StatusKind {
    fn color(self) -> egui::Color32 {
        match self {
            Self::Info => Theme::t2(),
            Self::Success => Theme::green(),
            Self::Warning => Theme::amber(),
            Self::Error => Theme::red(),
        }
    }
}

/// One line in the status bar.
#[derive(Debug, Clone)]
pub struct StatusMessage {
    pub kind: StatusKind,
    pub text: String,
    pub at: Instant,
}

impl StatusMessage {
    fn is_expired(&self) -> bool {
        self.kind != StatusKind::Error && self.at.elapsed() > STATUS_TIMEOUT
    }
}

/// Where a running export writes its files.
struct ExportTarget {
    dir: PathBuf,
    codec: AudioCodec,
}

pub struct AutosplitApp {
    settings: Settings,
    settings_path: PathBuf,
    session: Option<AudioSession>,
    waveform_view: WaveformView,
    player: Option<Player>,
    job: Option<JobHandle>,
    export_target: Option<ExportTarget>,
    status: Option<StatusMessage>,
}

impl AutosplitApp {
    pub fn new(
        cc: &eframe::CreationContext<'_>,
        settings: Settings,
        settings_path: PathBuf,
        audio_path: Option<PathBuf>,
    ) -> Self {
        Theme::apply(&cc.egui_ctx);

        let mut app = Self {
            settings,
            settings_path,
            session: None,
            waveform_view: WaveformView::new(),
            player: None,
            job: None,
            export_target: None,
            status: None,
        };

        match Player::new() {
            Ok(player) => app.player = Some(player),
            Err(e) => {
                warn!("Playback unavailable: {e}");
                app.set_status(StatusKind::Warning, format!("Playback unavailable: {e}"));
            }
        }

        if let Some(path) = audio_path {
            app.open(&path);
        }
        app
    }

    fn set_status(&mut self, kind: StatusKind, text: impl Into<String>) {
        self.status = Some(StatusMessage {
            kind,
            text: text.into(),
            at: Instant::now(),
        });
    }

    fn report_error(&mut self, context: &str, e: &SplitterError) {
        error!(category = e.category(), "{context}: {e}");
        self.set_status(StatusKind::Error, format!("{context}: {e}"));
    }

    fn is_busy(&self) -> bool {
        self.job.is_some()
    }

    // ── File handling ─────────────────────────────────────────

    fn pick_and_open(&mut self) {
        let picked = rfd::FileDialog::new()
            .add_filter("Audio", &AUDIO_EXTENSIONS)
            .pick_file();
        if let Some(path) = picked {
            self.open(&path);
        }
    }

    fn open(&mut self, path: &Path) {
        if !path.exists() {
            self.report_error(
                "Open failed",
                &SplitterError::NotFound(format!("File not found: {}", path.display())),
            );
            return;
        }

        let audio = match decode_file(path) {
            Ok(audio) => audio,
            Err(e) => {
                self.report_error("Could not decode audio", &e);
                return;
            }
        };

        let session = AudioSession::new(Some(path.to_path_buf()), audio);
        self.waveform_view
            .set_waveform(Waveform::from_audio(session.audio()));
        if let Some(player) = &self.player {
            player.load(session.audio().clone());
        }
        info!(
            path = %path.display(),
            duration = session.duration(),
            "Opened audio"
        );
        self.set_status(
            StatusKind::Info,
            format!(
                "Loaded {} ({})",
                session.base_name(),
                format_timecode(session.duration())
            ),
        );
        self.session = Some(session);
    }

    fn close(&mut self) {
        if let Some(player) = &self.player {
            player.pause();
        }
        self.session = None;
        self.waveform_view.clear();
    }

    fn engine(&mut self) -> Option<FfmpegEngine> {
        match FfmpegEngine::locate(self.settings.ffmpeg_path.as_deref()) {
            Ok(engine) => Some(engine),
            Err(e) => {
                self.report_error("FFmpeg unavailable", &e);
                None
            }
        }
    }

    // ── Jobs ──────────────────────────────────────────────────

    fn start_detection(&mut self) {
        let Some((source, trim)) = self
            .session
            .as_ref()
            .and_then(|s| Some((s.source_path()?.to_path_buf(), s.trim_range())))
        else {
            return;
        };
        let Some(engine) = self.engine() else {
            return;
        };

        match jobs::spawn_detection(engine, source, self.settings.track_count, trim) {
            Ok(handle) => {
                self.job = Some(handle);
                self.set_status(StatusKind::Info, "Detecting silence...");
            }
            Err(e) => self.report_error("Could not start detection", &e),
        }
    }

    fn start_export(&mut self) {
        let Some((source, boundaries, revision)) = self.session.as_ref().and_then(|s| {
            Some((s.source_path()?.to_path_buf(), s.boundaries(), s.revision()))
        }) else {
            return;
        };

        let mut dialog = rfd::FileDialog::new().set_title("Export tracks to");
        if let Some(dir) = &self.settings.last_output_dir {
            dialog = dialog.set_directory(dir);
        }
        let Some(dir) = dialog.pick_folder() else {
            return;
        };
        let Some(engine) = self.engine() else {
            return;
        };

        let params = self.settings.encode_params();
        match jobs::spawn_export(engine, source, boundaries, params, revision) {
            Ok(handle) => {
                self.settings.last_output_dir = Some(dir.clone());
                self.export_target = Some(ExportTarget {
                    dir,
                    codec: params.codec,
                });
                self.job = Some(handle);
                self.set_status(StatusKind::Info, "Exporting...");
            }
            Err(e) => self.report_error("Could not start export", &e),
        }
    }

    fn poll_job(&mut self) {
        let Some(job) = self.job.as_mut() else {
            return;
        };
        let (messages, finished) = job.poll();
        if finished {
            self.job = None;
        }
        for message in messages {
            self.handle_job_message(message);
        }
    }

    fn handle_job_message(&mut self, message: JobMessage) {
        match message {
            JobMessage::Detected(None) => {
                self.set_status(StatusKind::Info, "Detection cancelled");
            }
            JobMessage::Detected(Some(report)) => {
                let Some(session) = self.session.as_mut() else {
                    return;
                };
                let dropped = session.set_split_points(report.split_points);
                let count = session.split_points().len();
                if dropped > 0 {
                    warn!(dropped, "Detected splits fell outside the current trim");
                }
                let (kind, text) = if report.satisfied {
                    (
                        StatusKind::Success,
                        format!(
                            "Placed {count} split(s) from {} silences ({} dB, {} s)",
                            report.silences_found,
                            report.pass.noise_threshold_db,
                            report.pass.min_duration
                        ),
                    )
                } else {
                    (
                        StatusKind::Warning,
                        format!(
                            "Only {} silences found; placed {count} split(s), some at equal spacing",
                            report.silences_found
                        ),
                    )
                };
                self.set_status(kind, text);
            }
            JobMessage::ExportProgress(_) => {}
            JobMessage::Exported { revision, outcome } => {
                let target = self.export_target.take();
                match outcome {
                    ExportOutcome::Cancelled => {
                        self.set_status(StatusKind::Info, "Export cancelled");
                    }
                    ExportOutcome::Completed(segments) => {
                        self.finish_export(revision, segments, target);
                    }
                }
            }
            JobMessage::Failed { kind, error } => {
                if kind == JobKind::Export {
                    self.export_target = None;
                }
                let context = match kind {
                    JobKind::Detect => "Silence detection failed",
                    JobKind::Export => "Export failed",
                };
                self.report_error(context, &error);
            }
        }
    }

    fn finish_export(
        &mut self,
        revision: u64,
        segments: Vec<ExportedSegment>,
        target: Option<ExportTarget>,
    ) {
        let (Some(session), Some(target)) = (self.session.as_mut(), target) else {
            return;
        };
        if !session.store_export(revision, segments) {
            self.set_status(
                StatusKind::Warning,
                "Splits changed during export; export again to write tracks",
            );
            return;
        }

        let base_name = session.base_name().to_string();
        let written = session
            .exported()
            .map(|segments| write_segments(&target.dir, &base_name, target.codec, segments));
        match written {
            Some(Ok(files)) => {
                let bytes: usize = files.iter().map(|f| f.bytes).sum();
                self.set_status(
                    StatusKind::Success,
                    format!(
                        "Wrote {} track(s), {:.1} MB, to {}",
                        files.len(),
                        bytes as f64 / 1_048_576.0,
                        target.dir.display()
                    ),
                );
            }
            Some(Err(e)) => self.report_error("Could not write tracks", &e),
            None => {}
        }
    }

    // ── Editing ───────────────────────────────────────────────

    fn apply_events(&mut self, events: Vec<InteractionEvent>) {
        for event in events {
            if let InteractionEvent::Seek(t) = event {
                if let Some(player) = &self.player {
                    player.seek(t);
                }
            }
        }
    }

    fn add_split_at_playhead(&mut self) {
        let Some(session) = self.session.as_mut() else {
            return;
        };
        let t = session.playhead();
        match session.add_split_at(t) {
            Ok(index) => {
                let text = format!("Added split {} at {}", index + 1, format_timecode(t));
                self.set_status(StatusKind::Info, text);
            }
            Err(reason) => {
                warn!(time = t, ?reason, "Split rejected");
                self.set_status(StatusKind::Warning, reason.message());
            }
        }
    }

    fn remove_nearest_split(&mut self) {
        let Some(session) = self.session.as_mut() else {
            return;
        };
        if let Some(index) = session.nearest_split(session.playhead()) {
            session.remove_split(index);
        }
    }

    fn toggle_playback(&mut self) {
        let (Some(player), Some(session)) = (&self.player, &self.session) else {
            return;
        };
        if !player.is_playing() {
            player.seek(session.playhead());
        }
        player.toggle();
    }

    fn sync_playhead(&mut self) {
        let (Some(player), Some(session)) = (&self.player, self.session.as_mut()) else {
            return;
        };
        if player.is_playing() {
            let t = session.seek(player.position());
            session.viewport.ensure_visible(t);
        } else if player.position() >= session.duration() && session.playhead() < session.duration()
        {
            // Reached the end since the last frame.
            session.seek(session.duration());
        }
    }

    // ── Panels ────────────────────────────────────────────────

    fn menu_bar(&mut self, ctx: &egui::Context) {
        egui::TopBottomPanel::top("menu_bar")
            .frame(Theme::bar_frame())
            .show(ctx, |ui| {
                egui::menu::bar(ui, |ui| {
                    ui.menu_button("File", |ui| {
                        if ui
                            .add_enabled(!self.is_busy(), egui::Button::new("Open..."))
                            .clicked()
                        {
                            ui.close_menu();
                            self.pick_and_open();
                        }
                        if ui
                            .add_enabled(
                                self.session.is_some() && !self.is_busy(),
                                egui::Button::new("Close"),
                            )
                            .clicked()
                        {
                            ui.close_menu();
                            self.close();
                        }
                        ui.separator();
                        if ui.button("Quit").clicked() {
                            ctx.send_viewport_cmd(egui::ViewportCommand::Close);
                        }
                    });
                    ui.menu_button("Edit", |ui| {
                        let loaded = self.session.is_some();
                        if ui
                            .add_enabled(loaded, egui::Button::new("Add Split at Playhead"))
                            .clicked()
                        {
                            ui.close_menu();
                            self.add_split_at_playhead();
                        }
                        if ui
                            .add_enabled(loaded, egui::Button::new("Remove Nearest Split"))
                            .clicked()
                        {
                            ui.close_menu();
                            self.remove_nearest_split();
                        }
                        if ui
                            .add_enabled(loaded, egui::Button::new("Clear Splits"))
                            .clicked()
                        {
                            ui.close_menu();
                            if let Some(session) = self.session.as_mut() {
                                session.clear_splits();
                            }
                        }
                        if ui
                            .add_enabled(loaded, egui::Button::new("Reset Trim"))
                            .clicked()
                        {
                            ui.close_menu();
                            if let Some(session) = self.session.as_mut() {
                                session.reset_trim();
                            }
                        }
                    });
                    ui.menu_button("View", |ui| {
                        if ui
                            .add_enabled(self.session.is_some(), egui::Button::new("Zoom to Fit"))
                            .clicked()
                        {
                            ui.close_menu();
                            if let Some(session) = self.session.as_mut() {
                                session.viewport.reset();
                            }
                        }
                    });
                });
            });
    }

    fn status_bar(&mut self, ctx: &egui::Context) {
        if self.status.as_ref().is_some_and(StatusMessage::is_expired) {
            self.status = None;
        }
        egui::TopBottomPanel::bottom("status_bar")
            .frame(Theme::bar_frame())
            .show(ctx, |ui| {
                ui.horizontal(|ui| match &self.status {
                    Some(status) => {
                        ui.colored_label(status.kind.color(), &status.text);
                    }
                    None => {
                        ui.colored_label(Theme::t3(), "Ready");
                    }
                });
            });
    }

    fn controls_panel(&mut self, ctx: &egui::Context) {
        egui::SidePanel::left("controls_panel")
            .resizable(true)
            .default_width(260.0)
            .frame(Theme::panel_frame())
            .show(ctx, |ui| {
                ui.heading("Split");
                ui.add_space(Theme::SPACE_XS);
                ui.horizontal(|ui| {
                    ui.label("Tracks");
                    ui.add(
                        egui::DragValue::new(&mut self.settings.track_count)
                            .range(Settings::MIN_TRACKS..=Settings::MAX_TRACKS),
                    );
                });
                let can_run = self.session.is_some() && !self.is_busy();
                if ui
                    .add_enabled(can_run, egui::Button::new("Detect Splits"))
                    .on_hover_text("Place splits at the quietest gaps near equal spacing")
                    .clicked()
                {
                    self.start_detection();
                }

                ui.add_space(Theme::SPACE_SM);
                Theme::draw_separator(ui);
                ui.add_space(Theme::SPACE_SM);

                ui.heading("Export");
                ui.add_space(Theme::SPACE_XS);
                self.format_controls(ui);
                if ui
                    .add_enabled(can_run, egui::Button::new("Export Tracks..."))
                    .clicked()
                {
                    self.start_export();
                }

                self.job_progress(ui);

                ui.add_space(Theme::SPACE_SM);
                Theme::draw_separator(ui);
                ui.add_space(Theme::SPACE_SM);

                self.segment_list(ui);
            });
    }

    fn format_controls(&mut self, ui: &mut egui::Ui) {
        ui.horizontal(|ui| {
            ui.label("Format");
            egui::ComboBox::from_id_salt("codec")
                .selected_text(self.settings.codec.label())
                .show_ui(ui, |ui| {
                    for codec in AudioCodec::ALL {
                        ui.selectable_value(&mut self.settings.codec, codec, codec.label());
                    }
                });
        });
        if self.settings.codec.is_lossy() {
            ui.horizontal(|ui| {
                ui.label("Bitrate");
                egui::ComboBox::from_id_salt("bitrate")
                    .selected_text(format!("{} kbps", self.settings.bitrate_kbps))
                    .show_ui(ui, |ui| {
                        for rate in EncodeParams::BITRATES {
                            ui.selectable_value(
                                &mut self.settings.bitrate_kbps,
                                rate,
                                format!("{rate} kbps"),
                            );
                        }
                    });
            });
        }
    }

    fn job_progress(&mut self, ui: &mut egui::Ui) {
        let Some(job) = &self.job else {
            return;
        };
        ui.add_space(Theme::SPACE_SM);
        match (job.kind(), job.progress()) {
            (JobKind::Export, Some(progress)) => {
                ui.add(
                    egui::ProgressBar::new(progress.fraction())
                        .text(format!("{} / {}", progress.completed, progress.total)),
                );
            }
            (kind, _) => {
                ui.horizontal(|ui| {
                    ui.spinner();
                    ui.label(kind.label());
                });
            }
        }
        let cancelling = job.is_cancelled();
        let label = if cancelling { "Cancelling..." } else { "Cancel" };
        if ui
            .add_enabled(!cancelling, egui::Button::new(label))
            .clicked()
        {
            job.cancel();
        }
    }

    fn segment_list(&mut self, ui: &mut egui::Ui) {
        let Some(session) = &self.session else {
            ui.colored_label(Theme::t3(), "No file loaded");
            return;
        };
        let segments = session.segments();
        ui.label(format!("{} track(s)", segments.len()));
        ui.add_space(Theme::SPACE_XS);

        egui::ScrollArea::vertical().show(ui, |ui| {
            egui::Grid::new("segments")
                .num_columns(4)
                .striped(true)
                .show(ui, |ui| {
                    for header in ["#", "Start", "End", "Length"] {
                        ui.colored_label(Theme::t3(), header);
                    }
                    ui.end_row();
                    for (i, segment) in segments.iter().enumerate() {
                        ui.label(format!("{}", i + 1));
                        ui.label(format_timecode(segment.start));
                        ui.label(format_timecode(segment.end));
                        ui.label(format_timecode(segment.duration()));
                        ui.end_row();
                    }
                });
        });
    }

    fn transport(&mut self, ui: &mut egui::Ui) {
        let playing = self.player.as_ref().is_some_and(Player::is_playing);
        let Some(session) = &self.session else {
            return;
        };
        let (playhead, duration) = (session.playhead(), session.duration());
        let zoom = session.viewport.zoom;

        let mut toggle = false;
        let mut fit = false;
        ui.horizontal(|ui| {
            let label = if playing { "Pause" } else { "Play" };
            toggle = ui
                .add_enabled(self.player.is_some(), egui::Button::new(label))
                .on_hover_text("Space")
                .clicked();
            ui.monospace(format!(
                "{} / {}",
                format_timecode(playhead),
                format_timecode(duration)
            ));
            ui.separator();
            ui.colored_label(Theme::t2(), format!("{zoom:.1}x"));
            fit = ui.button("Fit").clicked();
        });

        if toggle {
            self.toggle_playback();
        }
        if fit {
            if let Some(session) = self.session.as_mut() {
                session.viewport.reset();
            }
        }
    }

    fn waveform_panel(&mut self, ctx: &egui::Context) {
        egui::CentralPanel::default().show(ctx, |ui| {
            self.transport(ui);
            ui.add_space(Theme::SPACE_XS);

            let events = match self.session.as_mut() {
                Some(session) => self.waveform_view.show(ui, session),
                None => {
                    ui.centered_and_justified(|ui| {
                        ui.colored_label(
                            Theme::t3(),
                            "No audio loaded\nUse File > Open to load a recording",
                        );
                    });
                    Vec::new()
                }
            };
            self.apply_events(events);
        });
    }

    fn handle_shortcuts(&mut self, ctx: &egui::Context) {
        if ctx.wants_keyboard_input() {
            return;
        }
        let (space, add, delete) = ctx.input(|i| {
            (
                i.key_pressed(egui::Key::Space),
                i.key_pressed(egui::Key::S),
                i.key_pressed(egui::Key::Delete) || i.key_pressed(egui::Key::Backspace),
            )
        });
        if space {
            self.toggle_playback();
        }
        if add {
            self.add_split_at_playhead();
        }
        if delete {
            self.remove_nearest_split();
        }
    }
}

impl eframe::App for AutosplitApp {
    fn update(&mut self, ctx: &egui::Context, _frame: &mut eframe::Frame) {
        self.poll_job();
        self.sync_playhead();
        self.handle_shortcuts(ctx);

        self.menu_bar(ctx);
        self.status_bar(ctx);
        self.controls_panel(ctx);
        self.waveform_panel(ctx);

        if self.player.as_ref().is_some_and(Player::is_playing) {
            ctx.request_repaint();
        } else if self.job.is_some() {
            ctx.request_repaint_after(Duration::from_millis(100));
        } else if self.status.as_ref().is_some_and(|s| s.kind != StatusKind::Error) {
            ctx.request_repaint_after(Duration::from_secs(1));
        }
    }

    fn on_exit(&mut self) {
        if let Some(job) = &self.job {
            job.cancel();
        }
        match self.settings.save(&self.settings_path) {
            Ok(()) => info!(path = %self.settings_path.display(), "Saved settings"),
            Err(e) => warn!("Could not save settings: {e}"),
        }
    }
}
