use crate::assemble::assemble;
use crate::buffers::{BufferKind, BufferSnapshot, SourceBufferSet};
use crate::catalog::ChallengeCatalog;
use crate::event::PlaygroundAction;
use crate::problems::{self, ProblemSet, TestResult, TestSuite};
use crate::project::store;
use crate::sandbox::{SandboxPolicy, SandboxRunner};
use crate::share;
use crate::theme::Theme;
use eframe::egui::{self, RichText, ScrollArea};
use std::collections::BTreeSet;
use std::time::{SystemTime, UNIX_EPOCH};

pub struct PlaygroundApp {
    buffers: SourceBufferSet,
    catalog: ChallengeCatalog,
    problems: ProblemSet,
    runner: SandboxRunner,
    theme: Theme,
    diagnostics_log: Vec<String>,
    pending: Vec<PlaygroundAction>,
    share_token: Option<String>,
    import_buffer: String,
    observed_buffer: String,
    active_problem: Option<String>,
    suite: Option<TestSuite>,
    solved: BTreeSet<String>,
}

impl PlaygroundApp {
    pub fn new(initial_token: Option<String>) -> Self {
        let (catalog, catalog_diagnostics) = ChallengeCatalog::load_builtin();
        let (problems, problem_diagnostics) = ProblemSet::load_builtin();

        let (restored, restore_warning) = store::load();
        let seed = restored
            .as_ref()
            .map(|project| project.snapshot())
            .unwrap_or_else(BufferSnapshot::seed);

        let (solved, solved_warning) = store::solved_ids();

        let runner = SandboxRunner::new(
            std::env::temp_dir().join("tinkerpad_runs"),
            SandboxPolicy::default(),
        );

        let mut app = Self {
            buffers: SourceBufferSet::new(seed),
            catalog,
            problems,
            runner,
            theme: Theme::default(),
            diagnostics_log: Vec::new(),
            pending: Vec::new(),
            share_token: None,
            import_buffer: String::new(),
            observed_buffer: String::new(),
            active_problem: None,
            suite: None,
            solved,
        };

        for diagnostic in &catalog_diagnostics {
            log::warn!("{}", diagnostic.to_log_line());
            app.log_diagnostic(diagnostic.to_log_line());
        }
        for diagnostic in &problem_diagnostics {
            log::warn!("{}", diagnostic.to_log_line());
            app.log_diagnostic(diagnostic.to_log_line());
        }
        if let Some(warning) = restore_warning {
            log::warn!("project restore skipped: {warning}");
            app.log_diagnostic(format!("project restore skipped: {warning}"));
        } else if restored.is_some() {
            app.log_diagnostic("restored saved project");
        }
        if let Some(warning) = solved_warning {
            app.log_diagnostic(format!("solved list unavailable: {warning}"));
        }

        if app.catalog.is_empty() {
            log::warn!("challenge catalog is empty");
            app.log_diagnostic("challenge catalog is empty");
        } else {
            app.log_diagnostic(format!(
                "loaded {} challenges and {} problems",
                app.catalog.len(),
                app.problems.all().len()
            ));
        }

        if let Some(raw) = initial_token {
            app.apply_action(PlaygroundAction::ImportShareToken(raw));
        }

        app
    }

    pub fn theme(&self) -> &Theme {
        &self.theme
    }

    fn timestamp() -> String {
        match SystemTime::now().duration_since(UNIX_EPOCH) {
            Ok(duration) => duration.as_secs().to_string(),
            Err(_) => "0".to_string(),
        }
    }

    fn log_diagnostic(&mut self, message: impl Into<String>) {
        self.diagnostics_log
            .push(format!("[{}] {}", Self::timestamp(), message.into()));
    }

    fn apply_action(&mut self, action: PlaygroundAction) {
        match action {
            PlaygroundAction::Run => {
                // assembled from the buffer values at the moment the action
                // fires; the previous run is discarded by the remount
                let document = assemble(
                    self.buffers.text(BufferKind::Markup),
                    self.buffers.text(BufferKind::Style),
                    self.buffers.text(BufferKind::Behavior),
                );
                match self.runner.render(&document) {
                    Ok(host_path) => {
                        self.log_diagnostic(format!("run mounted at {}", host_path.display()));
                    }
                    Err(err) => {
                        log::warn!("run failed: {err}");
                        self.log_diagnostic(format!("run failed: {err}"));
                    }
                }
            }
            PlaygroundAction::SaveProject => {
                let snapshot = self.buffers.snapshot();
                match store::save(&snapshot) {
                    Ok(()) => self.log_diagnostic("project saved"),
                    Err(err) => {
                        log::warn!("save skipped, continuing in memory: {err}");
                        self.log_diagnostic(format!("save skipped, continuing in memory: {err}"));
                    }
                }
            }
            PlaygroundAction::ShareProject => {
                let token = share::encode_for_sharing(&self.buffers.snapshot());
                self.log_diagnostic("share token generated");
                self.share_token = Some(token);
            }
            PlaygroundAction::ResetBuffers => {
                self.buffers.reset_to_default();
                self.runner.discard();
                self.log_diagnostic("buffers reset to session defaults");
            }
            PlaygroundAction::LoadChallenge(id) => match self.catalog.get(&id).cloned() {
                Some(challenge) => {
                    self.buffers.load_challenge(&challenge);
                    self.runner.discard();
                    self.active_problem = None;
                    self.suite = None;
                    self.log_diagnostic(format!("loaded challenge {}", challenge.id));
                }
                None => self.log_diagnostic(format!("unknown challenge id {id}")),
            },
            PlaygroundAction::ImportShareToken(raw) => {
                let token = share::token_from_link(&raw);
                match share::decode_from_sharing(token) {
                    Ok(snapshot) => {
                        self.buffers.load_snapshot(&snapshot);
                        self.runner.discard();
                        self.log_diagnostic("imported shared project");
                    }
                    Err(err) => {
                        self.log_diagnostic(format!("could not load shared project: {err}"));
                    }
                }
            }
            PlaygroundAction::OpenProblem(id) => match self.problems.get(&id).cloned() {
                Some(problem) => {
                    let (saved, warning) = store::load_solution(&problem.id);
                    if let Some(warning) = warning {
                        self.log_diagnostic(format!("saved solution unavailable: {warning}"));
                    }
                    let code = saved
                        .map(|solution| solution.code)
                        .unwrap_or_else(|| problem.starter_code.clone());

                    self.buffers.set_text(BufferKind::Behavior, code);
                    self.buffers.set_active(BufferKind::Behavior);
                    self.suite = Some(TestSuite::for_problem(&problem));
                    self.active_problem = Some(problem.id.clone());
                    self.observed_buffer.clear();
                    self.log_diagnostic(format!("opened problem {}", problem.id));
                }
                None => self.log_diagnostic(format!("unknown problem id {id}")),
            },
            PlaygroundAction::RunProblemTests => {
                let Some(problem) = self
                    .active_problem
                    .as_deref()
                    .and_then(|id| self.problems.get(id))
                    .cloned()
                else {
                    self.log_diagnostic("no problem open");
                    return;
                };

                if let Some(suite) = self.suite.as_mut() {
                    suite.reset();
                }
                let document = problems::harness_document(
                    &problem,
                    self.buffers.text(BufferKind::Behavior),
                );
                match self.runner.render(&document) {
                    Ok(host_path) => self.log_diagnostic(format!(
                        "test harness mounted at {}",
                        host_path.display()
                    )),
                    Err(err) => self.log_diagnostic(format!("test run failed: {err}")),
                }
            }
            PlaygroundAction::RecordObservedOutputs(outputs) => {
                let Some(suite) = self.suite.as_mut() else {
                    self.log_diagnostic("no problem open");
                    return;
                };
                suite.record_run(&outputs);
                let passed = suite
                    .cases()
                    .iter()
                    .filter(|case| case.result == TestResult::Passed)
                    .count();
                let total = suite.cases().len();
                self.log_diagnostic(format!("recorded results: {passed}/{total} passed"));
            }
            PlaygroundAction::SubmitProblem => {
                let Some(suite) = self.suite.as_ref() else {
                    self.log_diagnostic("no problem open");
                    return;
                };
                if !suite.all_passed() {
                    self.log_diagnostic("submit rejected: not all tests passed");
                    return;
                }

                let problem_id = suite.problem_id().to_string();
                let code = self.buffers.text(BufferKind::Behavior).to_string();
                if let Err(err) = store::save_solution(&problem_id, &code) {
                    self.log_diagnostic(format!("solution save skipped: {err}"));
                }
                match store::mark_solved(&problem_id) {
                    Ok(()) => {
                        self.solved.insert(problem_id.clone());
                        self.log_diagnostic(format!("problem {problem_id} solved"));
                    }
                    Err(err) => {
                        self.solved.insert(problem_id.clone());
                        self.log_diagnostic(format!("solved list save skipped: {err}"));
                    }
                }
            }
        }
    }

    fn render_top_bar(&mut self, ctx: &egui::Context) {
        egui::TopBottomPanel::top("top_bar").show(ctx, |ui| {
            ui.horizontal(|ui| {
                ui.strong("Tinkerpad");
                ui.separator();
                if ui.button(RichText::new("▶ Run").color(self.theme.success)).clicked() {
                    self.pending.push(PlaygroundAction::Run);
                }
                if ui.button("Save").clicked() {
                    self.pending.push(PlaygroundAction::SaveProject);
                }
                if ui.button("Share").clicked() {
                    self.pending.push(PlaygroundAction::ShareProject);
                }
                if ui.button("Reset").clicked() {
                    self.pending.push(PlaygroundAction::ResetBuffers);
                }
                ui.separator();
                ui.label(
                    RichText::new(format!("sandbox: {}", self.runner.policy().tokens()))
                        .color(self.theme.text_muted),
                );
                if self.runner.mounted().is_some() {
                    ui.label(RichText::new("run mounted").color(self.theme.accent_primary));
                }
            });
        });
    }

    fn render_left_panel(&mut self, ctx: &egui::Context) {
        egui::SidePanel::left("library_panel")
            .resizable(true)
            .show(ctx, |ui| {
                ui.heading("Challenges");
                ScrollArea::vertical()
                    .id_salt("challenge_list")
                    .show(ui, |ui| {
                        for category in self.catalog.categories() {
                            egui::CollapsingHeader::new(&category)
                                .default_open(false)
                                .show(ui, |ui| {
                                    for challenge in self.catalog.list_by_category(&category) {
                                        if ui.button(&challenge.title).clicked() {
                                            self.pending.push(PlaygroundAction::LoadChallenge(
                                                challenge.id.clone(),
                                            ));
                                        }
                                    }
                                });
                        }

                        ui.separator();
                        ui.heading("Problems");
                        for difficulty in self.problems.difficulties() {
                            ui.label(RichText::new(difficulty.as_str()).color(self.theme.text_muted));
                            for problem in self
                                .problems
                                .all()
                                .iter()
                                .filter(|problem| problem.difficulty == difficulty)
                            {
                                let solved = self.solved.contains(&problem.id);
                                let text = if solved {
                                    RichText::new(format!("✓ {}", problem.title))
                                        .color(self.theme.success)
                                } else {
                                    RichText::new(problem.title.clone())
                                };
                                if ui.button(text).clicked() {
                                    self.pending
                                        .push(PlaygroundAction::OpenProblem(problem.id.clone()));
                                }
                            }
                        }
                    });
            });
    }

    fn render_right_panel(&mut self, ctx: &egui::Context) {
        let Some(problem) = self
            .active_problem
            .as_deref()
            .and_then(|id| self.problems.get(id))
            .cloned()
        else {
            return;
        };

        egui::SidePanel::right("problem_panel")
            .resizable(true)
            .show(ctx, |ui| {
                ui.heading(&problem.title);
                ui.label(
                    RichText::new(format!("difficulty: {}", problem.difficulty))
                        .color(self.theme.text_muted),
                );
                ui.separator();
                self.theme.card_frame().show(ui, |ui| {
                    ui.label(&problem.description);
                });
                ui.separator();

                if let Some(suite) = &self.suite {
                    for case in suite.cases() {
                        let color = match case.result {
                            TestResult::Passed => self.theme.success,
                            TestResult::Failed => self.theme.danger,
                            TestResult::Unset => self.theme.text_muted,
                        };
                        ui.horizontal(|ui| {
                            ui.monospace(&case.input);
                            ui.label("→");
                            ui.monospace(&case.expected_output);
                            if let Some(actual) = &case.actual_output {
                                ui.label(RichText::new(format!("got {actual}")).color(color));
                            }
                            ui.label(RichText::new(case.result.as_str()).color(color));
                        });
                    }
                }

                ui.separator();
                if ui.button("Run tests in sandbox").clicked() {
                    self.pending.push(PlaygroundAction::RunProblemTests);
                }
                ui.label(
                    RichText::new("Observed outputs, one line per case:")
                        .color(self.theme.text_muted),
                );
                ui.add(
                    egui::TextEdit::multiline(&mut self.observed_buffer)
                        .desired_rows(3)
                        .font(egui::TextStyle::Monospace),
                );
                if ui.button("Record results").clicked() {
                    let outputs: Vec<String> = self
                        .observed_buffer
                        .lines()
                        .map(str::to_string)
                        .collect();
                    self.pending
                        .push(PlaygroundAction::RecordObservedOutputs(outputs));
                }

                let submittable = self
                    .suite
                    .as_ref()
                    .map(TestSuite::all_passed)
                    .unwrap_or(false);
                if ui
                    .add_enabled(submittable, egui::Button::new("Submit"))
                    .clicked()
                {
                    self.pending.push(PlaygroundAction::SubmitProblem);
                }
            });
    }

    fn render_center_panel(&mut self, ctx: &egui::Context) {
        egui::CentralPanel::default().show(ctx, |ui| {
            ui.horizontal(|ui| {
                for kind in BufferKind::ALL {
                    let selected = self.buffers.active() == kind;
                    let label = if self.buffers.last_edited() == Some(kind) {
                        format!("{} •", kind.label())
                    } else {
                        kind.label().to_string()
                    };
                    if ui.selectable_label(selected, label).clicked() {
                        self.buffers.set_active(kind);
                    }
                }
            });

            let active = self.buffers.active();
            let editor_height = (ui.available_height() - 220.0).max(160.0);
            self.theme.editor_frame().show(ui, |ui| {
                ScrollArea::vertical()
                    .id_salt("editor")
                    .max_height(editor_height)
                    .show(ui, |ui| {
                        let response = ui.add_sized(
                            [ui.available_width(), editor_height],
                            egui::TextEdit::multiline(self.buffers.text_mut(active))
                                .code_editor()
                                .desired_width(f32::INFINITY),
                        );
                        if response.changed() {
                            self.buffers.mark_edited(active);
                        }
                    });
            });

            ui.separator();
            ui.horizontal(|ui| {
                ui.label("Import share token or link:");
                ui.add(
                    egui::TextEdit::singleline(&mut self.import_buffer)
                        .desired_width(280.0)
                        .hint_text("paste token..."),
                );
                let import_enabled = !self.import_buffer.trim().is_empty();
                if ui.add_enabled(import_enabled, egui::Button::new("Import")).clicked() {
                    let raw = std::mem::take(&mut self.import_buffer);
                    self.pending.push(PlaygroundAction::ImportShareToken(raw));
                }
            });

            if let Some(token) = &self.share_token {
                let token = token.clone();
                ui.horizontal(|ui| {
                    ui.label(RichText::new("Share token:").color(self.theme.text_muted));
                    let preview: String = token.chars().take(48).collect();
                    ui.monospace(format!("{preview}..."));
                    if ui.button("Copy").clicked() {
                        ui.ctx().copy_text(token.clone());
                    }
                });
            }

            ui.separator();
            egui::CollapsingHeader::new("Diagnostics")
                .default_open(false)
                .show(ui, |ui| {
                    ScrollArea::vertical()
                        .id_salt("diagnostics_log")
                        .max_height(90.0)
                        .stick_to_bottom(true)
                        .show(ui, |ui| {
                            for entry in &self.diagnostics_log {
                                ui.label(RichText::new(entry.as_str()).color(self.theme.text_muted));
                            }
                        });
                });
        });
    }
}

impl eframe::App for PlaygroundApp {
    fn update(&mut self, ctx: &egui::Context, _frame: &mut eframe::Frame) {
        for action in std::mem::take(&mut self.pending) {
            self.apply_action(action);
        }
        self.render_top_bar(ctx);
        self.render_left_panel(ctx);
        self.render_right_panel(ctx);
        self.render_center_panel(ctx);
    }
}
