use std::path::{Path, PathBuf};
use std::time::Duration;

use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};
use tracing::{debug, info, warn};

use crate::config::Config;
use crate::editor::{FormState, MenuDraft};
use crate::locale::Locale;
use crate::menu_csv;
use crate::session::{SessionEvent, SessionPhase, SessionRunner};
use crate::storage::KeyValueStore;
use crate::store::MenuStore;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum View {
    List,
    Form,
    Runner,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Overlay {
    ConfirmDelete { menu_id: String },
    ImportPrompt { path: String },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StatusKind {
    Info,
    Error,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StatusLine {
    pub text: String,
    pub kind: StatusKind,
}

/// Everything the UI shows, plus the store it edits
#[derive(Debug)]
pub struct App<S: KeyValueStore> {
    pub store: MenuStore<S>,
    pub config: Config,
    pub locale: Locale,
    pub view: View,
    pub list_cursor: usize,
    pub form: Option<FormState>,
    pub session: Option<SessionRunner>,
    pub overlay: Option<Overlay>,
    pub status: Option<StatusLine>,
    pub should_quit: bool,
}

impl<S: KeyValueStore> App<S> {
    pub fn new(store: MenuStore<S>, config: Config) -> Self {
        let locale = store.language();
        let list_cursor = store
            .current_id()
            .and_then(|id| store.position(id))
            .unwrap_or(0);

        Self {
            store,
            config,
            locale,
            view: View::List,
            list_cursor,
            form: None,
            session: None,
            overlay: None,
            status: None,
            should_quit: false,
        }
    }

    pub fn t<'a>(&self, key: &'a str) -> &'a str {
        self.locale.t(key)
    }

    pub fn set_locale(&mut self, locale: Locale) {
        self.locale = locale;
        self.store.set_language(locale);
    }

    pub fn cycle_locale(&mut self) {
        self.set_locale(self.locale.next());
        info!(locale = %self.locale, "language changed");
    }

    fn info(&mut self, text: impl Into<String>) {
        self.status = Some(StatusLine {
            text: text.into(),
            kind: StatusKind::Info,
        });
    }

    fn error(&mut self, text: impl Into<String>) {
        self.status = Some(StatusLine {
            text: text.into(),
            kind: StatusKind::Error,
        });
    }

    fn switch_view(&mut self, view: View) {
        debug!(from = ?self.view, to = ?view, "view change");
        if view != View::Runner {
            self.session = None;
        }
        if view != View::Form {
            self.form = None;
        }
        self.view = view;
        self.status = None;
        self.overlay = None;
    }

    /// Feed elapsed time to the running session, if any
    pub fn on_tick(&mut self, elapsed: Duration) -> Vec<SessionEvent> {
        let Some(session) = self.session.as_mut() else {
            return Vec::new();
        };
        let events = session.on_tick(elapsed);
        for event in &events {
            debug!(?event, "session event");
        }
        events
    }

    // ---------------------------
    // List view actions
    // ---------------------------

    pub fn cursor_menu_id(&self) -> Option<String> {
        self.store
            .menus()
            .get(self.list_cursor)
            .map(|m| m.id.clone())
    }

    pub fn move_cursor(&mut self, delta: isize) {
        let len = self.store.menus().len();
        if len == 0 {
            self.list_cursor = 0;
            return;
        }
        self.list_cursor = self
            .list_cursor
            .saturating_add_signed(delta)
            .min(len - 1);
    }

    pub fn move_menu(&mut self, delta: isize) {
        let from = self.list_cursor;
        let Some(to) = from.checked_add_signed(delta) else {
            return;
        };
        if to >= self.store.menus().len() {
            return;
        }
        self.store.move_menu(from, to);
        self.list_cursor = to;
    }

    pub fn open_runner(&mut self, menu_id: &str) {
        self.store.set_current(Some(menu_id));
        let Some(menu) = self.store.current().cloned() else {
            self.error(self.t("noMenuSelected").to_string());
            return;
        };
        if let Some(pos) = self.store.position(&menu.id) {
            self.list_cursor = pos;
        }
        let session = SessionRunner::new(menu, self.config.session_config());
        self.switch_view(View::Runner);
        self.session = Some(session);
    }

    pub fn open_new_form(&mut self) {
        self.switch_view(View::Form);
        self.form = Some(FormState::new(MenuDraft::new()));
    }

    /// Edit the menu being run, or the one under the list cursor
    pub fn open_edit_form(&mut self) {
        let menu = match self.view {
            View::Runner => self.session.as_ref().map(|s| s.menu().id.clone()),
            _ => self.cursor_menu_id(),
        }
        .and_then(|id| self.store.get(&id).cloned());

        if let Some(menu) = menu {
            self.switch_view(View::Form);
            self.form = Some(FormState::new(MenuDraft::from_menu(&menu)));
        }
    }

    pub fn save_form(&mut self) {
        let Some(form) = self.form.as_ref() else {
            return;
        };
        let editing = form.draft.is_editing();
        match form.draft.build() {
            Ok(menu) => {
                let id = menu.id.clone();
                if editing {
                    self.store.update(menu);
                } else {
                    self.store.add(menu);
                    self.store.set_current(Some(&id));
                }
                info!(menu = %id, editing, "menu saved");
                self.switch_view(View::List);
                if let Some(pos) = self.store.position(&id) {
                    self.list_cursor = pos;
                }
            }
            Err(e) => {
                debug!(error = %e, "form rejected");
                self.error(self.t(e.message_key()).to_string());
            }
        }
    }

    pub fn request_delete(&mut self) {
        if let Some(menu_id) = self.cursor_menu_id() {
            self.overlay = Some(Overlay::ConfirmDelete { menu_id });
        }
    }

    pub fn confirm_delete(&mut self) {
        if let Some(Overlay::ConfirmDelete { menu_id }) = self.overlay.take() {
            self.store.delete(&menu_id);
            self.move_cursor(0);
        }
    }

    pub fn export_cursor_menu(&mut self) -> Option<PathBuf> {
        let menu = self
            .cursor_menu_id()
            .and_then(|id| self.store.get(&id).cloned())?;
        match menu_csv::export_to_dir(&menu, &self.config.export_dir()) {
            Ok(path) => {
                self.info(format!("{} {}", self.t("exportSuccess"), path.display()));
                Some(path)
            }
            Err(e) => {
                warn!(menu = %menu.id, error = %e, "export failed");
                self.error(self.t("exportError").to_string());
                None
            }
        }
    }

    /// Import a CSV file as a new menu; failures leave the list unchanged
    pub fn import_file(&mut self, path: &Path) -> bool {
        let result = std::fs::read_to_string(path)
            .map_err(Into::into)
            .and_then(|text| self.store.import_csv(&text).map(|m| m.id.clone()));

        match result {
            Ok(id) => {
                if let Some(pos) = self.store.position(&id) {
                    self.list_cursor = pos;
                }
                self.info(self.t("importSuccess").to_string());
                true
            }
            Err(e) => {
                warn!(path = %path.display(), error = %e, "import failed");
                self.error(self.t("importError").to_string());
                false
            }
        }
    }

    // ---------------------------
    // Key handling
    // ---------------------------

    pub fn handle_key(&mut self, key: KeyEvent) {
        if key.modifiers.contains(KeyModifiers::CONTROL) && key.code == KeyCode::Char('c') {
            self.should_quit = true;
            return;
        }

        if self.overlay.is_some() {
            self.handle_overlay_key(key);
            return;
        }

        match self.view {
            View::List => self.handle_list_key(key),
            View::Form => self.handle_form_key(key),
            View::Runner => self.handle_runner_key(key),
        }
    }

    fn handle_overlay_key(&mut self, key: KeyEvent) {
        match self.overlay.as_mut() {
            Some(Overlay::ConfirmDelete { .. }) => match key.code {
                KeyCode::Char('y') | KeyCode::Enter => self.confirm_delete(),
                KeyCode::Char('n') | KeyCode::Esc => self.overlay = None,
                _ => {}
            },
            Some(Overlay::ImportPrompt { path }) => match key.code {
                KeyCode::Char(c) => path.push(c),
                KeyCode::Backspace => {
                    path.pop();
                }
                KeyCode::Enter => {
                    let path = PathBuf::from(path.trim());
                    self.overlay = None;
                    self.import_file(&path);
                }
                KeyCode::Esc => self.overlay = None,
                _ => {}
            },
            None => {}
        }
    }

    fn handle_list_key(&mut self, key: KeyEvent) {
        let shifted = key.modifiers.contains(KeyModifiers::SHIFT);
        match key.code {
            KeyCode::Esc | KeyCode::Char('q') => self.should_quit = true,
            KeyCode::Up if shifted => self.move_menu(-1),
            KeyCode::Down if shifted => self.move_menu(1),
            KeyCode::Char('K') => self.move_menu(-1),
            KeyCode::Char('J') => self.move_menu(1),
            KeyCode::Up | KeyCode::Char('k') => self.move_cursor(-1),
            KeyCode::Down | KeyCode::Char('j') => self.move_cursor(1),
            KeyCode::Enter => {
                if let Some(id) = self.cursor_menu_id() {
                    self.open_runner(&id);
                }
            }
            KeyCode::Char('n') => self.open_new_form(),
            KeyCode::Char('e') => self.open_edit_form(),
            KeyCode::Char('d') | KeyCode::Delete => self.request_delete(),
            KeyCode::Char('x') => {
                self.export_cursor_menu();
            }
            KeyCode::Char('i') => {
                self.overlay = Some(Overlay::ImportPrompt {
                    path: String::new(),
                })
            }
            KeyCode::Char('l') => self.cycle_locale(),
            _ => {}
        }
    }

    fn handle_form_key(&mut self, key: KeyEvent) {
        let ctrl = key.modifiers.contains(KeyModifiers::CONTROL);
        if key.code == KeyCode::Esc {
            self.switch_view(View::List);
            return;
        }
        if ctrl && key.code == KeyCode::Char('s') {
            self.save_form();
            return;
        }

        let Some(form) = self.form.as_mut() else {
            return;
        };
        match key.code {
            KeyCode::Char('n') if ctrl => form.add_item(),
            KeyCode::Char('d') if ctrl => form.remove_focused_item(),
            KeyCode::Up if ctrl => form.move_focused_item(-1),
            KeyCode::Down if ctrl => form.move_focused_item(1),
            KeyCode::Tab | KeyCode::Down | KeyCode::Enter => form.next_field(),
            KeyCode::BackTab | KeyCode::Up => form.prev_field(),
            KeyCode::Backspace => form.backspace(),
            KeyCode::Char(c) if !ctrl => form.insert_char(c),
            _ => {}
        }
    }

    fn handle_runner_key(&mut self, key: KeyEvent) {
        match key.code {
            KeyCode::Esc | KeyCode::Char('b') => {
                self.switch_view(View::List);
                return;
            }
            KeyCode::Char('e') => {
                self.open_edit_form();
                return;
            }
            KeyCode::Char('l') => {
                self.cycle_locale();
                return;
            }
            _ => {}
        }

        let Some(session) = self.session.as_mut() else {
            return;
        };
        let events = match (key.code, session.phase()) {
            (KeyCode::Char(' '), SessionPhase::Item) => session.toggle_active(),
            (KeyCode::Char('c'), SessionPhase::Item) => session.complete_active(),
            (KeyCode::Char('s') | KeyCode::Enter, SessionPhase::Interval) => {
                session.skip_interval()
            }
            (KeyCode::Char('r'), _) | (KeyCode::Enter, SessionPhase::Completed) => {
                session.reset();
                Vec::new()
            }
            (KeyCode::Char('a'), _) => {
                session.toggle_auto_start();
                Vec::new()
            }
            // the interval length only matters while auto start is on
            (KeyCode::Char('+') | KeyCode::Char('='), _) if session.config().auto_start => {
                session.adjust_interval_secs(1);
                Vec::new()
            }
            (KeyCode::Char('-'), _) if session.config().auto_start => {
                session.adjust_interval_secs(-1);
                Vec::new()
            }
            _ => Vec::new(),
        };
        for event in &events {
            debug!(?event, "session event");
        }
    }
}
