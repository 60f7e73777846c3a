use tracing::{debug, info, warn};

use crate::errors::AppResult;
use crate::locale::Locale;
use crate::menu::TrainingMenu;
use crate::menu_csv;
use crate::storage::{KeyValueStore, CURRENT_MENU_KEY, LANGUAGE_KEY, MENUS_KEY};

/// Ordered menu list plus the current selection, mirrored to durable storage
/// after every change.
#[derive(Debug)]
pub struct MenuStore<S: KeyValueStore> {
    storage: S,
    menus: Vec<TrainingMenu>,
    current_id: Option<String>,
}

impl<S: KeyValueStore> MenuStore<S> {
    /// Read failures fall back to an empty list and no selection
    pub fn load(storage: S) -> Self {
        let menus = match storage.get(MENUS_KEY) {
            Ok(Some(raw)) => serde_json::from_str::<Vec<TrainingMenu>>(&raw).unwrap_or_else(|e| {
                warn!(error = %e, "stored menus unreadable, starting empty");
                Vec::new()
            }),
            Ok(None) => Vec::new(),
            Err(e) => {
                warn!(error = %e, "failed to read menus");
                Vec::new()
            }
        };

        let stored_id = storage.get(CURRENT_MENU_KEY).unwrap_or_else(|e| {
            warn!(error = %e, "failed to read current menu id");
            None
        });
        let current_id = match stored_id {
            Some(id) => menus.iter().find(|m| m.id == id).map(|m| m.id.clone()),
            None => menus.first().map(|m| m.id.clone()),
        };

        info!(menus = menus.len(), current = ?current_id, "menu store loaded");
        Self {
            storage,
            menus,
            current_id,
        }
    }

    pub fn storage(&self) -> &S {
        &self.storage
    }

    pub fn menus(&self) -> &[TrainingMenu] {
        &self.menus
    }

    pub fn get(&self, id: &str) -> Option<&TrainingMenu> {
        self.menus.iter().find(|m| m.id == id)
    }

    pub fn position(&self, id: &str) -> Option<usize> {
        self.menus.iter().position(|m| m.id == id)
    }

    pub fn current(&self) -> Option<&TrainingMenu> {
        self.current_id.as_deref().and_then(|id| self.get(id))
    }

    pub fn current_id(&self) -> Option<&str> {
        self.current_id.as_deref()
    }

    pub fn add(&mut self, menu: TrainingMenu) {
        debug!(menu = %menu.id, "menu added");
        self.menus.push(menu);
        self.persist_menus();
    }

    /// Replace the menu with the same id; unknown ids change nothing
    pub fn update(&mut self, menu: TrainingMenu) {
        if let Some(slot) = self.menus.iter_mut().find(|m| m.id == menu.id) {
            debug!(menu = %menu.id, "menu updated");
            *slot = menu;
        }
        self.persist_menus();
    }

    pub fn delete(&mut self, menu_id: &str) {
        self.menus.retain(|m| m.id != menu_id);
        debug!(menu = %menu_id, "menu deleted");
        self.persist_menus();

        if self.current_id.as_deref() == Some(menu_id) {
            self.current_id = self.menus.first().map(|m| m.id.clone());
            self.persist_current();
        }
    }

    /// Unknown ids clear the selection
    pub fn set_current(&mut self, menu_id: Option<&str>) {
        self.current_id = menu_id.and_then(|id| self.get(id)).map(|m| m.id.clone());
        self.persist_current();
    }

    pub fn reorder(&mut self, menus: Vec<TrainingMenu>) {
        self.menus = menus;
        self.persist_menus();
    }

    /// Move one menu to a new position, shifting the ones in between
    pub fn move_menu(&mut self, from: usize, to: usize) {
        if from >= self.menus.len() || to >= self.menus.len() || from == to {
            return;
        }
        let mut menus = self.menus.clone();
        let menu = menus.remove(from);
        menus.insert(to, menu);
        self.reorder(menus);
    }

    /// Decode a CSV export and append it. Nothing changes on failure.
    pub fn import_csv(&mut self, text: &str) -> AppResult<&TrainingMenu> {
        let menu = menu_csv::decode(text)?;
        menu_csv::validate_durations(&menu)?;
        info!(menu = %menu.id, items = menu.items.len(), "menu imported");
        self.add(menu);
        let last = self.menus.len() - 1;
        Ok(&self.menus[last])
    }

    pub fn language(&self) -> Locale {
        match self.storage.get(LANGUAGE_KEY) {
            Ok(Some(code)) => code.parse().unwrap_or_default(),
            Ok(None) => Locale::default(),
            Err(e) => {
                warn!(error = %e, "failed to read language");
                Locale::default()
            }
        }
    }

    pub fn set_language(&mut self, locale: Locale) {
        if let Err(e) = self.storage.set(LANGUAGE_KEY, locale.code()) {
            warn!(error = %e, "failed to save language");
        }
    }

    fn persist_menus(&mut self) {
        let json = match serde_json::to_string(&self.menus) {
            Ok(json) => json,
            Err(e) => {
                warn!(error = %e, "failed to serialize menus");
                return;
            }
        };
        if let Err(e) = self.storage.set(MENUS_KEY, &json) {
            warn!(error = %e, "failed to save menus");
        }
    }

    fn persist_current(&mut self) {
        let result = match &self.current_id {
            Some(id) => self.storage.set(CURRENT_MENU_KEY, id),
            None => self.storage.remove(CURRENT_MENU_KEY),
        };
        if let Err(e) = result {
            warn!(error = %e, "failed to save current menu id");
        }
    }
}
