use thiserror::Error;

use crate::menu::{new_item_id, new_menu_id, TrainingMenu, TrainingMenuItem};
use crate::menu_csv::parse_leading_int;

pub const DEFAULT_ITEM_SECS: u32 = 300;

#[derive(Error, Debug, Clone, Copy, PartialEq, Eq)]
pub enum ValidationError {
    #[error("menu title is empty")]
    EmptyTitle,

    #[error("menu has no items")]
    NoItems,

    #[error("an item has no name")]
    EmptyItemName,

    #[error("an item lasts less than a minute")]
    NonPositiveDuration,
}

impl ValidationError {
    /// Translation key of the user-facing message
    pub fn message_key(self) -> &'static str {
        match self {
            ValidationError::EmptyTitle => "errorEnterTitle",
            ValidationError::NoItems => "errorAddMenuItem",
            ValidationError::EmptyItemName => "errorEnterItemName",
            ValidationError::NonPositiveDuration => "errorItemDuration",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ItemDraft {
    pub id: String,
    pub name: String,
    pub description: String,
    pub duration_in_seconds: u32,
}

impl ItemDraft {
    fn blank() -> Self {
        Self {
            id: new_item_id(),
            name: String::new(),
            description: String::new(),
            duration_in_seconds: DEFAULT_ITEM_SECS,
        }
    }

    /// Whole minutes shown in the duration field
    pub fn minutes(&self) -> u32 {
        self.duration_in_seconds / 60
    }

    /// Durations are entered in minutes; anything after the leading integer
    /// is dropped, so `"1.5"` means one minute. Empty or unparseable text
    /// counts as zero, which `MenuDraft::validate` rejects.
    pub fn set_minutes(&mut self, text: &str) {
        let secs = parse_leading_int(text)
            .unwrap_or(0)
            .saturating_mul(60)
            .clamp(0, i64::from(u32::MAX));
        self.duration_in_seconds = u32::try_from(secs).unwrap_or(u32::MAX);
    }
}

/// In-progress form state for creating or editing a menu
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MenuDraft {
    existing_id: Option<String>,
    pub title: String,
    pub description: String,
    pub items: Vec<ItemDraft>,
}

impl Default for MenuDraft {
    fn default() -> Self {
        Self::new()
    }
}

impl MenuDraft {
    pub fn new() -> Self {
        Self {
            existing_id: None,
            title: String::new(),
            description: String::new(),
            items: vec![ItemDraft::blank()],
        }
    }

    pub fn from_menu(menu: &TrainingMenu) -> Self {
        Self {
            existing_id: Some(menu.id.clone()),
            title: menu.title.clone(),
            description: menu.description.clone(),
            items: menu
                .items
                .iter()
                .map(|item| ItemDraft {
                    id: item.id.clone(),
                    name: item.name.clone(),
                    description: item.description.clone(),
                    duration_in_seconds: item.duration_in_seconds,
                })
                .collect(),
        }
    }

    pub fn is_editing(&self) -> bool {
        self.existing_id.is_some()
    }

    pub fn add_item(&mut self) -> usize {
        self.items.push(ItemDraft::blank());
        self.items.len() - 1
    }

    pub fn remove_item(&mut self, idx: usize) {
        if idx < self.items.len() {
            self.items.remove(idx);
        }
    }

    pub fn move_item(&mut self, from: usize, to: usize) {
        if from < self.items.len() && to < self.items.len() && from != to {
            let item = self.items.remove(from);
            self.items.insert(to, item);
        }
    }

    pub fn validate(&self) -> Result<(), ValidationError> {
        if self.title.trim().is_empty() {
            return Err(ValidationError::EmptyTitle);
        }
        if self.items.is_empty() {
            return Err(ValidationError::NoItems);
        }
        if self.items.iter().any(|item| item.name.trim().is_empty()) {
            return Err(ValidationError::EmptyItemName);
        }
        if self.items.iter().any(|item| item.duration_in_seconds == 0) {
            return Err(ValidationError::NonPositiveDuration);
        }
        Ok(())
    }

    pub fn build(&self) -> Result<TrainingMenu, ValidationError> {
        self.validate()?;
        Ok(TrainingMenu {
            id: self.existing_id.clone().unwrap_or_else(new_menu_id),
            title: self.title.clone(),
            description: self.description.clone(),
            items: self
                .items
                .iter()
                .map(|item| TrainingMenuItem {
                    id: item.id.clone(),
                    name: item.name.clone(),
                    description: item.description.clone(),
                    duration_in_seconds: item.duration_in_seconds,
                })
                .collect(),
        })
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FormField {
    Title,
    Description,
    ItemName(usize),
    ItemDescription(usize),
    ItemMinutes(usize),
}

impl FormField {
    pub fn item_index(self) -> Option<usize> {
        match self {
            FormField::Title | FormField::Description => None,
            FormField::ItemName(i) | FormField::ItemDescription(i) | FormField::ItemMinutes(i) => {
                Some(i)
            }
        }
    }
}

const MENU_FIELDS: usize = 2;
const ITEM_FIELDS: usize = 3;

/// A draft plus the focused field and the raw text of each minutes box
#[derive(Debug, Clone)]
pub struct FormState {
    pub draft: MenuDraft,
    minutes: Vec<String>,
    focus: usize,
}

impl FormState {
    pub fn new(draft: MenuDraft) -> Self {
        let minutes = draft
            .items
            .iter()
            .map(|item| item.minutes().to_string())
            .collect();
        Self {
            draft,
            minutes,
            focus: 0,
        }
    }

    pub fn field_count(&self) -> usize {
        MENU_FIELDS + ITEM_FIELDS * self.draft.items.len()
    }

    pub fn focused(&self) -> FormField {
        match self.focus {
            0 => FormField::Title,
            1 => FormField::Description,
            n => {
                let idx = (n - MENU_FIELDS) / ITEM_FIELDS;
                match (n - MENU_FIELDS) % ITEM_FIELDS {
                    0 => FormField::ItemName(idx),
                    1 => FormField::ItemDescription(idx),
                    _ => FormField::ItemMinutes(idx),
                }
            }
        }
    }

    pub fn is_focused(&self, field: FormField) -> bool {
        self.focused() == field
    }

    pub fn next_field(&mut self) {
        self.focus = (self.focus + 1) % self.field_count();
    }

    pub fn prev_field(&mut self) {
        let count = self.field_count();
        self.focus = (self.focus + count - 1) % count;
    }

    /// Current text of any field, as typed
    pub fn text(&self, field: FormField) -> &str {
        match field {
            FormField::Title => &self.draft.title,
            FormField::Description => &self.draft.description,
            FormField::ItemName(i) => self.draft.items.get(i).map_or("", |it| it.name.as_str()),
            FormField::ItemDescription(i) => self
                .draft
                .items
                .get(i)
                .map_or("", |it| it.description.as_str()),
            FormField::ItemMinutes(i) => self.minutes.get(i).map_or("", String::as_str),
        }
    }

    pub fn insert_char(&mut self, c: char) {
        self.edit_focused(|text| text.push(c));
    }

    pub fn backspace(&mut self) {
        self.edit_focused(|text| {
            text.pop();
        });
    }

    fn edit_focused(&mut self, edit: impl FnOnce(&mut String)) {
        match self.focused() {
            FormField::Title => edit(&mut self.draft.title),
            FormField::Description => edit(&mut self.draft.description),
            FormField::ItemName(i) => {
                if let Some(item) = self.draft.items.get_mut(i) {
                    edit(&mut item.name);
                }
            }
            FormField::ItemDescription(i) => {
                if let Some(item) = self.draft.items.get_mut(i) {
                    edit(&mut item.description);
                }
            }
            FormField::ItemMinutes(i) => {
                if let (Some(text), Some(item)) =
                    (self.minutes.get_mut(i), self.draft.items.get_mut(i))
                {
                    edit(&mut *text);
                    item.set_minutes(text);
                }
            }
        }
    }

    /// Append an item and focus its name
    pub fn add_item(&mut self) {
        let idx = self.draft.add_item();
        self.minutes.push(self.draft.items[idx].minutes().to_string());
        self.focus = MENU_FIELDS + ITEM_FIELDS * idx;
    }

    pub fn remove_focused_item(&mut self) {
        let Some(idx) = self.focused().item_index() else {
            return;
        };
        self.draft.remove_item(idx);
        self.minutes.remove(idx);
        self.focus = self.focus.min(self.field_count() - 1);
    }

    /// Shift the focused item up (negative) or down, keeping focus on it
    pub fn move_focused_item(&mut self, delta: isize) {
        let Some(idx) = self.focused().item_index() else {
            return;
        };
        let Some(target) = idx.checked_add_signed(delta) else {
            return;
        };
        if target >= self.draft.items.len() {
            return;
        }
        self.draft.move_item(idx, target);
        let text = self.minutes.remove(idx);
        self.minutes.insert(target, text);
        let offset = (self.focus - MENU_FIELDS) % ITEM_FIELDS;
        self.focus = MENU_FIELDS + ITEM_FIELDS * target + offset;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use assert_matches::assert_matches;

    fn filled() -> MenuDraft {
        let mut draft = MenuDraft::new();
        draft.title = "Aim Drills".into();
        draft.items[0].name = "Tracking".into();
        draft
    }

    #[test]
    fn new_draft_has_one_five_minute_item() {
        let draft = MenuDraft::new();
        assert_eq!(draft.items.len(), 1);
        assert_eq!(draft.items[0].duration_in_seconds, 300);
        assert_eq!(draft.items[0].minutes(), 5);
        assert!(!draft.is_editing());
    }

    #[test]
    fn validation_order_and_messages() {
        let mut draft = MenuDraft::new();
        draft.title = "   ".into();
        assert_matches!(draft.build(), Err(ValidationError::EmptyTitle));

        draft.title = "Aim".into();
        assert_matches!(draft.build(), Err(ValidationError::EmptyItemName));

        draft.remove_item(0);
        assert_matches!(draft.build(), Err(ValidationError::NoItems));
        assert_eq!(ValidationError::NoItems.message_key(), "errorAddMenuItem");
    }

    #[test]
    fn build_new_menu_gets_fresh_id() {
        let menu = filled().build().unwrap();
        assert!(menu.id.starts_with("menu_"));
        assert_eq!(menu.items[0].name, "Tracking");
        assert_eq!(menu.total_duration(), 300);
    }

    #[test]
    fn editing_keeps_menu_and_item_ids() {
        let original = filled().build().unwrap();
        let mut draft = MenuDraft::from_menu(&original);
        assert!(draft.is_editing());
        draft.title = "Renamed".into();

        let edited = draft.build().unwrap();
        assert_eq!(edited.id, original.id);
        assert_eq!(edited.items[0].id, original.items[0].id);
        assert_eq!(edited.title, "Renamed");
    }

    #[test]
    fn minutes_truncate_to_whole_minutes() {
        let mut draft = filled();
        draft.items[0].set_minutes("1.5");
        assert_eq!(draft.items[0].duration_in_seconds, 60);
        draft.items[0].set_minutes("12");
        assert_eq!(draft.items[0].duration_in_seconds, 720);
        draft.items[0].set_minutes("-3");
        assert_eq!(draft.items[0].duration_in_seconds, 0);
        draft.items[0].set_minutes("12");
        draft.items[0].set_minutes("abc");
        assert_eq!(draft.items[0].duration_in_seconds, 0);
    }

    #[test]
    fn zero_minute_items_cannot_be_built() {
        for text in ["0", "-3", "", "abc"] {
            let mut draft = filled();
            draft.items[0].set_minutes(text);
            assert_matches!(draft.build(), Err(ValidationError::NonPositiveDuration));
        }
        assert_eq!(
            ValidationError::NonPositiveDuration.message_key(),
            "errorItemDuration"
        );

        let mut draft = filled();
        draft.items[0].set_minutes("1");
        let menu = draft.build().unwrap();
        assert_eq!(menu.items[0].duration_in_seconds, 60);
        assert!(crate::menu_csv::validate_durations(&menu).is_ok());
    }

    #[test]
    fn add_remove_and_move_items() {
        let mut draft = filled();
        let idx = draft.add_item();
        draft.items[idx].name = "Flicks".into();
        draft.move_item(1, 0);
        assert_eq!(draft.items[0].name, "Flicks");
        draft.remove_item(5);
        assert_eq!(draft.items.len(), 2);
        draft.remove_item(0);
        assert_eq!(draft.items[0].name, "Tracking");
    }

    #[test]
    fn form_focus_walks_menu_then_item_fields() {
        let mut form = FormState::new(MenuDraft::new());
        assert_eq!(form.field_count(), 5);
        assert_eq!(form.focused(), FormField::Title);
        form.next_field();
        assert_eq!(form.focused(), FormField::Description);
        form.next_field();
        assert_eq!(form.focused(), FormField::ItemName(0));
        form.next_field();
        form.next_field();
        assert_eq!(form.focused(), FormField::ItemMinutes(0));
        form.next_field();
        assert_eq!(form.focused(), FormField::Title);
        form.prev_field();
        assert_eq!(form.focused(), FormField::ItemMinutes(0));
    }

    #[test]
    fn typing_edits_focused_field() {
        let mut form = FormState::new(MenuDraft::new());
        for c in "Aim".chars() {
            form.insert_char(c);
        }
        form.backspace();
        assert_eq!(form.draft.title, "Ai");

        form.add_item();
        assert_eq!(form.focused(), FormField::ItemName(1));
        form.insert_char('X');
        assert_eq!(form.draft.items[1].name, "X");
    }

    #[test]
    fn minutes_field_updates_duration() {
        let mut form = FormState::new(MenuDraft::new());
        while form.focused() != FormField::ItemMinutes(0) {
            form.next_field();
        }
        assert_eq!(form.text(FormField::ItemMinutes(0)), "5");
        form.backspace();
        // what is on screen is what gets saved
        assert_eq!(form.text(FormField::ItemMinutes(0)), "");
        assert_eq!(form.draft.items[0].duration_in_seconds, 0);
        assert_matches!(form.draft.build(), Err(ValidationError::NonPositiveDuration));
        form.insert_char('1');
        form.insert_char('2');
        assert_eq!(form.text(FormField::ItemMinutes(0)), "12");
        assert_eq!(form.draft.items[0].duration_in_seconds, 720);
    }

    #[test]
    fn remove_and_move_focused_item() {
        let mut form = FormState::new(MenuDraft::new());
        form.draft.items[0].name = "first".into();
        form.add_item();
        form.insert_char('s');
        form.move_focused_item(-1);
        assert_eq!(form.draft.items[0].name, "s");
        assert_eq!(form.focused(), FormField::ItemName(0));
        form.move_focused_item(-1);
        assert_eq!(form.draft.items[0].name, "s");

        form.remove_focused_item();
        assert_eq!(form.draft.items.len(), 1);
        assert_eq!(form.draft.items[0].name, "first");

        form.remove_focused_item();
        assert!(form.draft.items.is_empty());
        assert_eq!(form.field_count(), 2);
        assert_eq!(form.focused(), FormField::Description);
    }
}
