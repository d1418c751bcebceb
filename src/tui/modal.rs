// Modal system for TUI overlays
//
// Self-contained modal dialogs that handle their own input and return
// actions. App just holds Option<Modal>; input routing acts on the
// returned ModalAction.

use crate::record::DreamRecord;
use crossterm::event::KeyCode;

/// Actions returned by modal input handling
#[derive(Debug)]
pub enum ModalAction {
    /// Input consumed, no state change needed
    None,
    /// Close the modal without side effects
    Close,
    /// Delete the record with this id
    DeleteConfirmed(String),
    /// Write the edited record through to the store
    SaveEdit(Box<DreamRecord>),
}

/// The record fields that are editable in place. Everything else
/// (id, timestamp, date, stress score, illustration) is fixed at creation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EditField {
    Content,
    Analysis,
    Advice,
}

impl EditField {
    pub fn next(self) -> Self {
        match self {
            EditField::Content => EditField::Analysis,
            EditField::Analysis => EditField::Advice,
            EditField::Advice => EditField::Content,
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            EditField::Content => "Dream",
            EditField::Analysis => "Analysis",
            EditField::Advice => "Advice",
        }
    }
}

/// In-place editor state over a working copy of the record
#[derive(Debug, Clone)]
pub struct EditBuffer {
    pub record: DreamRecord,
    pub field: EditField,
}

impl EditBuffer {
    pub fn new(record: DreamRecord) -> Self {
        Self {
            record,
            field: EditField::Content,
        }
    }

    pub fn active_text(&self) -> &str {
        match self.field {
            EditField::Content => &self.record.dream_content,
            EditField::Analysis => &self.record.analysis,
            EditField::Advice => &self.record.advice,
        }
    }

    fn active_text_mut(&mut self) -> &mut String {
        match self.field {
            EditField::Content => &mut self.record.dream_content,
            EditField::Analysis => &mut self.record.analysis,
            EditField::Advice => &mut self.record.advice,
        }
    }

    pub fn push(&mut self, ch: char) {
        self.active_text_mut().push(ch);
    }

    pub fn backspace(&mut self) {
        self.active_text_mut().pop();
    }
}

/// Available modal types
#[derive(Debug, Clone)]
pub enum Modal {
    /// Help overlay - keyboard shortcuts
    Help,
    /// Delete confirmation for the record with this id
    ConfirmDelete { id: String, summary: String },
    /// In-place edit of dream content, analysis and advice
    Edit(EditBuffer),
}

impl Modal {
    pub fn help() -> Self {
        Modal::Help
    }

    pub fn confirm_delete(record: &DreamRecord) -> Self {
        Modal::ConfirmDelete {
            id: record.id.clone(),
            summary: crate::util::clip(&crate::util::one_line(&record.dream_content), 48),
        }
    }

    pub fn edit(record: DreamRecord) -> Self {
        Modal::Edit(EditBuffer::new(record))
    }

    /// Handle keyboard input, return an action for the caller to execute
    pub fn handle_input(&mut self, key: KeyCode) -> ModalAction {
        match self {
            Modal::Help => match key {
                KeyCode::Esc | KeyCode::Char('?') | KeyCode::Char('q') => ModalAction::Close,
                _ => ModalAction::None,
            },
            Modal::ConfirmDelete { id, .. } => match key {
                KeyCode::Char('y') | KeyCode::Char('Y') | KeyCode::Enter => {
                    ModalAction::DeleteConfirmed(id.clone())
                }
                KeyCode::Char('n') | KeyCode::Char('N') | KeyCode::Esc => ModalAction::Close,
                _ => ModalAction::None,
            },
            Modal::Edit(buffer) => match key {
                KeyCode::Esc => ModalAction::Close,
                KeyCode::Enter => ModalAction::SaveEdit(Box::new(buffer.record.clone())),
                KeyCode::Tab => {
                    buffer.field = buffer.field.next();
                    ModalAction::None
                }
                KeyCode::Backspace => {
                    buffer.backspace();
                    ModalAction::None
                }
                KeyCode::Char(c) => {
                    buffer.push(c);
                    ModalAction::None
                }
                _ => ModalAction::None,
            },
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::record::DreamAnalysis;

    fn record() -> DreamRecord {
        DreamRecord::new(
            "a locked garden".to_string(),
            DreamAnalysis {
                analysis: "Privacy under pressure.".to_string(),
                stress_level: 5,
                advice: "Guard an hour for yourself.".to_string(),
            },
            None,
        )
    }

    #[test]
    fn confirm_delete_requires_explicit_yes() {
        let rec = record();
        let mut modal = Modal::confirm_delete(&rec);

        assert!(matches!(modal.handle_input(KeyCode::Char('x')), ModalAction::None));
        assert!(matches!(modal.handle_input(KeyCode::Esc), ModalAction::Close));
        match modal.handle_input(KeyCode::Char('y')) {
            ModalAction::DeleteConfirmed(id) => assert_eq!(id, rec.id),
            other => panic!("expected delete, got {other:?}"),
        }
    }

    #[test]
    fn edit_types_into_the_active_field_only() {
        let mut modal = Modal::edit(record());

        modal.handle_input(KeyCode::Char('!'));
        modal.handle_input(KeyCode::Tab); // -> Analysis
        modal.handle_input(KeyCode::Char('?'));

        match modal.handle_input(KeyCode::Enter) {
            ModalAction::SaveEdit(edited) => {
                assert_eq!(edited.dream_content, "a locked garden!");
                assert_eq!(edited.analysis, "Privacy under pressure.?");
                assert_eq!(edited.advice, "Guard an hour for yourself.");
            }
            other => panic!("expected save, got {other:?}"),
        }
    }

    #[test]
    fn edit_escape_discards_changes() {
        let original = record();
        let mut modal = Modal::edit(original.clone());
        modal.handle_input(KeyCode::Char('z'));
        assert!(matches!(modal.handle_input(KeyCode::Esc), ModalAction::Close));
        // The caller keeps its own copy; nothing to roll back
        assert_eq!(original.dream_content, "a locked garden");
    }

    #[test]
    fn field_cycle_wraps() {
        assert_eq!(EditField::Content.next(), EditField::Analysis);
        assert_eq!(EditField::Analysis.next(), EditField::Advice);
        assert_eq!(EditField::Advice.next(), EditField::Content);
    }
}
