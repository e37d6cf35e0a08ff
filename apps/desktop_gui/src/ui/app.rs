use std::collections::{HashMap, HashSet};
use std::time::{Duration, Instant};

use arboard::Clipboard;
use crossbeam_channel::{Receiver, Sender};
use eframe::egui;
use shared::domain::{ExportFormat, FollowUpStep, GenerationStep};

use crate::backend_bridge::commands::BackendCommand;
use crate::controller::events::{UiError, UiErrorCategory, UiErrorContext, UiEvent};
use crate::controller::orchestration::dispatch_backend_command;

const LOADING_MESSAGES: [&str; 5] = [
    "Crafting cinematic vision...",
    "Writing emotional dialogue...",
    "Designing soundscape...",
    "Planning cinematography...",
    "Finalizing script...",
];
const LOADING_MESSAGE_INTERVAL: Duration = Duration::from_millis(1500);

const GENRES: [&str; 6] = ["Drama", "Thriller", "Sci-Fi", "Romance", "Horror", "Noir"];

pub struct StartupConfig {
    pub server_url: String,
}

impl Default for StartupConfig {
    fn default() -> Self {
        Self {
            server_url: "http://127.0.0.1:5000".to_string(),
        }
    }
}

/// One UI region showing one category of studio content. Exactly one panel
/// is active at a time; a locked panel's navigation control is inert.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum StudioPanel {
    StoryInput,
    Screenplay,
    Characters,
    DirectorNotes,
    SoundDesign,
    PitchDeck,
}

impl StudioPanel {
    const NAV_ORDER: [StudioPanel; 6] = [
        StudioPanel::StoryInput,
        StudioPanel::Screenplay,
        StudioPanel::Characters,
        StudioPanel::DirectorNotes,
        StudioPanel::SoundDesign,
        StudioPanel::PitchDeck,
    ];

    fn nav_label(self) -> &'static str {
        match self {
            StudioPanel::StoryInput => "Story Concept",
            StudioPanel::Screenplay => "Screenplay",
            StudioPanel::Characters => "Characters",
            StudioPanel::DirectorNotes => "Director's Notes",
            StudioPanel::SoundDesign => "Sound Design",
            StudioPanel::PitchDeck => "Pitch Deck",
        }
    }

    fn for_step(step: GenerationStep) -> StudioPanel {
        match step {
            GenerationStep::Screenplay => StudioPanel::Screenplay,
            GenerationStep::Characters => StudioPanel::Characters,
            GenerationStep::DirectorMode => StudioPanel::DirectorNotes,
            GenerationStep::SoundDesign => StudioPanel::SoundDesign,
            GenerationStep::PitchDeck => StudioPanel::PitchDeck,
        }
    }

    fn content_step(self) -> Option<GenerationStep> {
        match self {
            StudioPanel::StoryInput => None,
            StudioPanel::Screenplay => Some(GenerationStep::Screenplay),
            StudioPanel::Characters => Some(GenerationStep::Characters),
            StudioPanel::DirectorNotes => Some(GenerationStep::DirectorMode),
            StudioPanel::SoundDesign => Some(GenerationStep::SoundDesign),
            StudioPanel::PitchDeck => Some(GenerationStep::PitchDeck),
        }
    }
}

/// Loading overlay state, owned by the app. `Some` means a request is in
/// flight and the overlay is visible; dropping back to `None` is the timer
/// cancellation and is safe to repeat.
struct LoadingState {
    message_index: usize,
    last_rotated: Instant,
}

impl LoadingState {
    fn new() -> Self {
        Self {
            message_index: 0,
            last_rotated: Instant::now(),
        }
    }

    fn message(&self) -> &'static str {
        LOADING_MESSAGES[self.message_index % LOADING_MESSAGES.len()]
    }

    fn tick(&mut self, now: Instant) {
        if now.duration_since(self.last_rotated) >= LOADING_MESSAGE_INTERVAL {
            self.message_index = (self.message_index + 1) % LOADING_MESSAGES.len();
            self.last_rotated = now;
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum StatusBannerSeverity {
    Error,
}

#[derive(Debug, Clone)]
struct StatusBanner {
    severity: StatusBannerSeverity,
    message: String,
}

fn err_label(category: UiErrorCategory) -> &'static str {
    match category {
        UiErrorCategory::Validation => "Validation",
        UiErrorCategory::Transport => "Transport",
        UiErrorCategory::Generation => "Generation",
        UiErrorCategory::Unknown => "Unexpected",
    }
}

pub struct StudioApp {
    cmd_tx: Sender<BackendCommand>,
    ui_rx: Receiver<UiEvent>,

    server_url: String,
    story_input: String,
    genre: String,
    genre_label: Option<String>,

    content: HashMap<GenerationStep, String>,
    unlocked: HashSet<StudioPanel>,
    active_panel: StudioPanel,

    loading: Option<LoadingState>,
    status: String,
    status_banner: Option<StatusBanner>,
}

impl StudioApp {
    pub fn new(
        cmd_tx: Sender<BackendCommand>,
        ui_rx: Receiver<UiEvent>,
        startup: StartupConfig,
    ) -> Self {
        let mut unlocked = HashSet::new();
        unlocked.insert(StudioPanel::StoryInput);
        Self {
            cmd_tx,
            ui_rx,
            server_url: startup.server_url,
            story_input: String::new(),
            genre: GENRES[0].to_string(),
            genre_label: None,
            content: HashMap::new(),
            unlocked,
            active_panel: StudioPanel::StoryInput,
            loading: None,
            status: "Enter a story concept to begin".to_string(),
            status_banner: None,
        }
    }

    fn is_unlocked(&self, panel: StudioPanel) -> bool {
        self.unlocked.contains(&panel)
    }

    fn is_busy(&self) -> bool {
        self.loading.is_some()
    }

    /// Navigation entry point. Clicking a locked control is ignored; an
    /// unlocked one becomes the single active panel.
    fn select_panel(&mut self, panel: StudioPanel) {
        if !self.is_unlocked(panel) {
            return;
        }
        self.active_panel = panel;
    }

    fn start_loading(&mut self) {
        self.loading = Some(LoadingState::new());
    }

    fn stop_loading(&mut self) {
        self.loading = None;
    }

    fn submit_story(&mut self) {
        let story = self.story_input.trim().to_string();
        if story.is_empty() {
            let error = UiError::validation(
                UiErrorContext::GenerateScreenplay,
                "Please enter a story concept.",
            );
            self.show_error(error);
            return;
        }

        let queued = dispatch_backend_command(
            &self.cmd_tx,
            BackendCommand::GenerateScreenplay {
                story,
                genre: self.genre.clone(),
            },
            &mut self.status,
        );
        if queued {
            self.start_loading();
        }
    }

    fn request_follow_up(&mut self, step: FollowUpStep) {
        let queued = dispatch_backend_command(
            &self.cmd_tx,
            BackendCommand::GenerateFollowUp { step },
            &mut self.status,
        );
        if queued {
            self.start_loading();
        }
    }

    fn request_export(&mut self, format: ExportFormat) {
        let default_name = format!(
            "project_bible_{}.{}",
            chrono::Local::now().format("%Y-%m-%d"),
            format.path_segment()
        );
        let Some(destination) = rfd::FileDialog::new()
            .set_file_name(default_name)
            .save_file()
        else {
            return;
        };

        let queued = dispatch_backend_command(
            &self.cmd_tx,
            BackendCommand::ExportBible {
                format,
                destination,
            },
            &mut self.status,
        );
        if queued {
            self.start_loading();
        }
    }

    fn show_error(&mut self, error: UiError) {
        self.status_banner = Some(StatusBanner {
            severity: StatusBannerSeverity::Error,
            message: format!("{}: {}", err_label(error.category()), error.message()),
        });
    }

    fn process_ui_events(&mut self) {
        while let Ok(event) = self.ui_rx.try_recv() {
            match event {
                UiEvent::Info(message) => {
                    self.status = message;
                }
                UiEvent::ScreenplayGenerated { content, genre } => {
                    self.stop_loading();
                    self.content.insert(GenerationStep::Screenplay, content);
                    self.genre_label = Some(genre.to_uppercase());
                    self.unlocked.insert(StudioPanel::Screenplay);
                    self.unlocked.insert(StudioPanel::Characters);
                    self.select_panel(StudioPanel::Screenplay);
                    self.status_banner = None;
                    self.status = "Screenplay ready".to_string();
                }
                UiEvent::FollowUpGenerated { step, content } => {
                    self.stop_loading();
                    let panel = StudioPanel::for_step(step.step());
                    self.content.insert(step.step(), content);
                    self.unlocked.insert(panel);
                    self.select_panel(panel);
                    self.status_banner = None;
                    self.status = format!("{} ready", step.step());
                }
                UiEvent::BibleExported(path) => {
                    self.stop_loading();
                    self.status = format!("Project bible saved to {}", path.display());
                }
                UiEvent::Error(error) => {
                    self.stop_loading();
                    self.show_error(error);
                }
            }
        }
    }

    /// Which follow-up a panel offers: an unlocked-but-empty panel generates
    /// itself (the pre-unlocked Characters case); a filled panel offers the
    /// next step in the chain; the pitch deck offers nothing further.
    fn follow_up_action(&self, panel: StudioPanel) -> Option<FollowUpStep> {
        let step = panel.content_step()?;
        match self.content.get(&step) {
            None => FollowUpStep::from_step(step),
            Some(_) => match FollowUpStep::from_step(step) {
                None => Some(FollowUpStep::Characters),
                Some(follow_up) => follow_up.next(),
            },
        }
    }

    fn copy_to_clipboard(&mut self, text: String) {
        if let Ok(mut clipboard) = Clipboard::new() {
            let _ = clipboard.set_text(text);
            self.status = "Copied to clipboard".to_string();
        }
    }

    fn show_top_bar(&mut self, ctx: &egui::Context) {
        egui::TopBottomPanel::top("studio_top_bar").show(ctx, |ui| {
            ui.add_space(4.0);
            ui.label(egui::RichText::new("AI Cinematic Studio").heading());
            self.show_status_banner(ui);
            ui.add_space(4.0);
        });
    }

    fn show_status_banner(&mut self, ui: &mut egui::Ui) {
        let Some(banner) = self.status_banner.clone() else {
            return;
        };
        let color = match banner.severity {
            StatusBannerSeverity::Error => egui::Color32::from_rgb(220, 80, 80),
        };
        ui.add_space(2.0);
        ui.horizontal(|ui| {
            ui.colored_label(color, banner.message);
            if ui.small_button("Dismiss").clicked() {
                self.status_banner = None;
            }
        });
    }

    fn show_status_bar(&mut self, ctx: &egui::Context) {
        egui::TopBottomPanel::bottom("studio_status_bar").show(ctx, |ui| {
            ui.horizontal(|ui| {
                ui.label(&self.status);
                ui.with_layout(egui::Layout::right_to_left(egui::Align::Center), |ui| {
                    ui.weak(&self.server_url);
                });
            });
        });
    }

    fn show_navigation(&mut self, ctx: &egui::Context) {
        egui::SidePanel::left("studio_navigation")
            .default_width(200.0)
            .show(ctx, |ui| {
                egui::TopBottomPanel::bottom("nav_export_strip").show_inside(ui, |ui| {
                    ui.add_space(6.0);
                    ui.label(egui::RichText::new("Export project bible").strong());
                    let exportable = !self.content.is_empty();
                    ui.horizontal(|ui| {
                        let text_btn = egui::Button::new("Text");
                        if ui.add_enabled(exportable && !self.is_busy(), text_btn).clicked() {
                            self.request_export(ExportFormat::Text);
                        }
                        let md_btn = egui::Button::new("Markdown");
                        if ui.add_enabled(exportable && !self.is_busy(), md_btn).clicked() {
                            self.request_export(ExportFormat::Markdown);
                        }
                    });
                    ui.add_space(6.0);
                });

                ui.add_space(4.0);
                ui.heading("Workflow");
                ui.add_space(8.0);
                for panel in StudioPanel::NAV_ORDER {
                    let selected = self.active_panel == panel;
                    let mut button = egui::Button::new(panel.nav_label())
                        .min_size(egui::vec2(ui.available_width(), 28.0));
                    if selected {
                        button = button.fill(ui.visuals().selection.bg_fill);
                    }
                    if ui.add_enabled(self.is_unlocked(panel), button).clicked() {
                        self.select_panel(panel);
                    }
                    ui.add_space(4.0);
                }
            });
    }

    fn show_active_panel(&mut self, ctx: &egui::Context) {
        egui::CentralPanel::default().show(ctx, |ui| match self.active_panel {
            StudioPanel::StoryInput => self.show_story_panel(ui),
            panel => {
                // Unlock gating guarantees content_step is present here.
                if let Some(step) = panel.content_step() {
                    self.show_content_panel(ui, panel, step);
                }
            }
        });
    }

    fn show_story_panel(&mut self, ui: &mut egui::Ui) {
        ui.heading("Story Concept");
        ui.label("Describe your film idea; the studio drafts everything else from it.");
        ui.add_space(6.0);
        ui.add(
            egui::TextEdit::multiline(&mut self.story_input)
                .hint_text("A lighthouse keeper finds a message in a bottle...")
                .desired_rows(10)
                .desired_width(f32::INFINITY),
        );
        ui.add_space(6.0);
        egui::ComboBox::from_label("Genre")
            .selected_text(self.genre.clone())
            .show_ui(ui, |ui| {
                for genre in GENRES {
                    ui.selectable_value(&mut self.genre, genre.to_string(), genre);
                }
            });
        ui.add_space(8.0);
        let generate = egui::Button::new("Generate Screenplay").min_size(egui::vec2(180.0, 32.0));
        if ui.add_enabled(!self.is_busy(), generate).clicked() {
            self.submit_story();
        }
    }

    fn show_content_panel(&mut self, ui: &mut egui::Ui, panel: StudioPanel, step: GenerationStep) {
        ui.heading(step.title());
        if step == GenerationStep::Screenplay {
            if let Some(label) = &self.genre_label {
                ui.label(egui::RichText::new(format!("Genre: {label}")).strong());
            }
        }
        ui.add_space(6.0);

        let text = self.content.get(&step).cloned();
        let mut follow_up_clicked: Option<FollowUpStep> = None;
        let mut copy_clicked = false;

        match &text {
            Some(text) => {
                egui::ScrollArea::vertical()
                    .id_salt(step.title())
                    .auto_shrink([false, false])
                    .max_height(ui.available_height() - 48.0)
                    .show(ui, |ui| {
                        ui.label(egui::RichText::new(text).monospace());
                    });
            }
            None => {
                ui.label("Nothing generated here yet.");
            }
        }

        ui.add_space(8.0);
        ui.horizontal(|ui| {
            if let Some(step) = self.follow_up_action(panel) {
                let label = format!("Generate {}", step.step().title());
                if ui
                    .add_enabled(!self.is_busy(), egui::Button::new(label))
                    .clicked()
                {
                    follow_up_clicked = Some(step);
                }
            }
            let copy_btn = egui::Button::new("Copy to clipboard");
            if ui.add_enabled(text.is_some(), copy_btn).clicked() {
                copy_clicked = true;
            }
        });

        if let Some(step) = follow_up_clicked {
            self.request_follow_up(step);
        }
        if copy_clicked {
            if let Some(text) = text {
                self.copy_to_clipboard(text);
            }
        }
    }

    fn show_loading_overlay(&mut self, ctx: &egui::Context) {
        let Some(loading) = &self.loading else {
            return;
        };
        egui::Area::new(egui::Id::new("loading_overlay"))
            .anchor(egui::Align2::CENTER_CENTER, egui::vec2(0.0, 0.0))
            .show(ctx, |ui| {
                egui::Frame::popup(ui.style()).show(ui, |ui| {
                    ui.vertical_centered(|ui| {
                        ui.add(egui::Spinner::new().size(28.0));
                        ui.add_space(6.0);
                        ui.label(loading.message());
                    });
                });
            });
    }
}

impl eframe::App for StudioApp {
    fn update(&mut self, ctx: &egui::Context, _frame: &mut eframe::Frame) {
        self.process_ui_events();

        if let Some(loading) = &mut self.loading {
            loading.tick(Instant::now());
            ctx.request_repaint_after(Duration::from_millis(100));
        } else {
            ctx.request_repaint_after(Duration::from_millis(250));
        }

        self.show_top_bar(ctx);
        self.show_status_bar(ctx);
        self.show_navigation(ctx);
        self.show_active_panel(ctx);
        self.show_loading_overlay(ctx);
    }
}

#[cfg(test)]
mod tests {
    use crossbeam_channel::bounded;

    use super::*;

    fn test_app() -> (
        StudioApp,
        Receiver<BackendCommand>,
        Sender<UiEvent>,
    ) {
        let (cmd_tx, cmd_rx) = bounded(8);
        let (ui_tx, ui_rx) = bounded(8);
        let app = StudioApp::new(cmd_tx, ui_rx, StartupConfig::default());
        (app, cmd_rx, ui_tx)
    }

    #[test]
    fn only_story_panel_is_unlocked_initially() {
        let (app, _cmd_rx, _ui_tx) = test_app();
        assert_eq!(app.active_panel, StudioPanel::StoryInput);
        for panel in StudioPanel::NAV_ORDER {
            assert_eq!(app.is_unlocked(panel), panel == StudioPanel::StoryInput);
        }
    }

    #[test]
    fn selecting_a_locked_panel_leaves_the_active_panel_unchanged() {
        let (mut app, _cmd_rx, _ui_tx) = test_app();
        app.select_panel(StudioPanel::Screenplay);
        assert_eq!(app.active_panel, StudioPanel::StoryInput);
    }

    #[test]
    fn blank_story_raises_validation_banner_without_dispatching() {
        let (mut app, cmd_rx, _ui_tx) = test_app();
        app.story_input = "   ".to_string();
        app.submit_story();

        assert!(cmd_rx.try_recv().is_err());
        assert!(app.loading.is_none());
        let banner = app.status_banner.as_ref().expect("banner");
        assert!(banner.message.contains("Please enter a story concept."));
    }

    #[test]
    fn submitting_a_story_dispatches_trimmed_body_and_starts_loading() {
        let (mut app, cmd_rx, _ui_tx) = test_app();
        app.story_input = "  A lighthouse keeper finds a message in a bottle  ".to_string();
        app.genre = "Drama".to_string();
        app.submit_story();

        assert!(app.loading.is_some());
        match cmd_rx.try_recv().expect("command") {
            BackendCommand::GenerateScreenplay { story, genre } => {
                assert_eq!(story, "A lighthouse keeper finds a message in a bottle");
                assert_eq!(genre, "Drama");
            }
            _ => panic!("unexpected command"),
        }
    }

    #[test]
    fn screenplay_success_unlocks_exactly_screenplay_and_characters() {
        let (mut app, _cmd_rx, ui_tx) = test_app();
        app.start_loading();
        ui_tx
            .try_send(UiEvent::ScreenplayGenerated {
                content: "INT. LIGHTHOUSE...".to_string(),
                genre: "drama".to_string(),
            })
            .expect("send");
        app.process_ui_events();

        assert!(app.loading.is_none());
        assert_eq!(app.active_panel, StudioPanel::Screenplay);
        assert_eq!(app.genre_label.as_deref(), Some("DRAMA"));
        assert_eq!(
            app.content.get(&GenerationStep::Screenplay).map(String::as_str),
            Some("INT. LIGHTHOUSE...")
        );

        let unlocked: HashSet<StudioPanel> = StudioPanel::NAV_ORDER
            .into_iter()
            .filter(|panel| app.is_unlocked(*panel))
            .collect();
        let expected: HashSet<StudioPanel> = [
            StudioPanel::StoryInput,
            StudioPanel::Screenplay,
            StudioPanel::Characters,
        ]
        .into_iter()
        .collect();
        assert_eq!(unlocked, expected);
    }

    #[test]
    fn follow_up_error_leaves_target_locked_and_inactive() {
        let (mut app, _cmd_rx, ui_tx) = test_app();
        app.start_loading();
        ui_tx
            .try_send(UiEvent::Error(UiError::validation(
                UiErrorContext::GenerateFollowUp,
                "No screenplay found in draft",
            )))
            .expect("send");
        app.process_ui_events();

        assert!(app.loading.is_none());
        assert!(!app.is_unlocked(StudioPanel::DirectorNotes));
        assert_eq!(app.active_panel, StudioPanel::StoryInput);
        assert!(app.status_banner.is_some());
    }

    #[test]
    fn follow_up_success_unlocks_and_activates_its_panel() {
        let (mut app, _cmd_rx, ui_tx) = test_app();
        app.start_loading();
        ui_tx
            .try_send(UiEvent::FollowUpGenerated {
                step: FollowUpStep::Characters,
                content: "**Detective Miller**".to_string(),
            })
            .expect("send");
        app.process_ui_events();

        assert!(app.loading.is_none());
        assert!(app.is_unlocked(StudioPanel::Characters));
        assert_eq!(app.active_panel, StudioPanel::Characters);
    }

    #[test]
    fn stopping_loading_twice_is_harmless() {
        let (mut app, _cmd_rx, _ui_tx) = test_app();
        app.start_loading();
        app.stop_loading();
        app.stop_loading();
        assert!(app.loading.is_none());
    }

    #[test]
    fn loading_messages_rotate_on_interval_and_wrap() {
        let start = Instant::now();
        let mut loading = LoadingState {
            message_index: 0,
            last_rotated: start,
        };

        loading.tick(start + Duration::from_millis(100));
        assert_eq!(loading.message(), LOADING_MESSAGES[0]);

        let mut now = start;
        for expected in [1, 2, 3, 4, 0] {
            now += LOADING_MESSAGE_INTERVAL;
            loading.tick(now);
            assert_eq!(loading.message_index, expected);
        }
    }

    #[test]
    fn panels_offer_the_right_follow_up() {
        let (mut app, _cmd_rx, _ui_tx) = test_app();
        assert_eq!(app.follow_up_action(StudioPanel::StoryInput), None);

        // Empty but reachable characters panel generates itself.
        assert_eq!(
            app.follow_up_action(StudioPanel::Characters),
            Some(FollowUpStep::Characters)
        );

        app.content
            .insert(GenerationStep::Screenplay, "script".to_string());
        assert_eq!(
            app.follow_up_action(StudioPanel::Screenplay),
            Some(FollowUpStep::Characters)
        );

        app.content
            .insert(GenerationStep::Characters, "cast".to_string());
        assert_eq!(
            app.follow_up_action(StudioPanel::Characters),
            Some(FollowUpStep::DirectorMode)
        );

        app.content
            .insert(GenerationStep::PitchDeck, "deck".to_string());
        assert_eq!(app.follow_up_action(StudioPanel::PitchDeck), None);
    }
}
