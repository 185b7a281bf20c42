use super::input::AppTextArea;
use crate::domain::models::{EntityInfo, InfoPanel, RecordRef, UserInfo};
use std::sync::Arc;

pub const ENTITY_TIP: &str = "Not seeing the entity you need? Try refreshing the metadata";
pub const OPEN_TIP: &str = "Tip: Press Ctrl+Shift+P to open this window.";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Step {
    Commands,
    OpenRecordEntity,
    OpenRecordId,
    OpenListEntity,
    NewRecordEntity,
    ImpersonateSearch,
    FetchXml,
    EntityInfoDisplay,
    EnvironmentInfoDisplay,
}

impl Step {
    #[must_use]
    pub fn placeholder(self) -> &'static str {
        match self {
            Step::Commands => "Search commands...",
            Step::OpenRecordEntity | Step::OpenListEntity | Step::NewRecordEntity => "Search entity...",
            Step::OpenRecordId => "Enter GUID or start typing the name of the entity",
            Step::ImpersonateSearch => "Search user...",
            Step::FetchXml | Step::EntityInfoDisplay | Step::EnvironmentInfoDisplay => "",
        }
    }

    #[must_use]
    pub fn is_entity_search(self) -> bool {
        matches!(
            self,
            Step::OpenRecordEntity | Step::OpenListEntity | Step::NewRecordEntity
        )
    }

    #[must_use]
    pub fn is_info(self) -> bool {
        matches!(self, Step::EntityInfoDisplay | Step::EnvironmentInfoDisplay)
    }

    /// Whether the query field is shown and takes keystrokes.
    #[must_use]
    pub fn has_query(self) -> bool {
        !matches!(
            self,
            Step::FetchXml | Step::EntityInfoDisplay | Step::EnvironmentInfoDisplay
        )
    }
}

/// Keyboard focus inside the FetchXML step.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum FetchFocus {
    #[default]
    Editor,
    Results,
}

/// Identifies one async request; a result is applied only while its ticket
/// is the one awaited.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Ticket(pub u64);

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Pending {
    pub metadata: Option<Ticket>,
    pub records: Option<Ticket>,
    pub fetch: Option<Ticket>,
    pub info: Option<Ticket>,
}

/// One open palette session. Dropped when the palette closes.
#[derive(Debug, Clone, PartialEq)]
pub struct PaletteState<'a> {
    pub step: Step,
    /// Breadcrumb labels, one per forward transition.
    pub pills: Vec<String>,
    pub query: AppTextArea<'a>,
    pub fetch_editor: AppTextArea<'a>,
    pub fetch_focus: FetchFocus,
    pub selected: usize,
    pub selected_entity: Option<EntityInfo>,
    pub metadata: Arc<Vec<EntityInfo>>,
    pub records: Vec<RecordRef>,
    pub users: Vec<UserInfo>,
    pub fetch_results: Vec<RecordRef>,
    pub fetch_entity: Option<EntityInfo>,
    pub info: Option<InfoPanel>,
    pub progress: Option<String>,
    pub tip: Option<String>,
    /// Set between selecting Impersonate and the background's first reply.
    pub checking_impersonation: bool,
    pub pending: Pending,
}

impl PaletteState<'_> {
    #[must_use]
    pub fn new(tip: Option<String>) -> Self {
        Self {
            step: Step::Commands,
            pills: Vec::new(),
            query: AppTextArea::single_line(Step::Commands.placeholder()),
            fetch_editor: AppTextArea::editor(),
            fetch_focus: FetchFocus::Editor,
            selected: 0,
            selected_entity: None,
            metadata: Arc::new(Vec::new()),
            records: Vec::new(),
            users: Vec::new(),
            fetch_results: Vec::new(),
            fetch_entity: None,
            info: None,
            progress: None,
            tip,
            checking_impersonation: false,
            pending: Pending::default(),
        }
    }

    /// Trimmed query text.
    #[must_use]
    pub fn query_text(&self) -> String {
        self.query.text().trim().to_string()
    }

    /// Moves to `step` with a cleared query. Results awaited by the previous
    /// step are no longer wanted.
    pub fn enter_step(&mut self, step: Step) {
        self.step = step;
        self.query = AppTextArea::single_line(step.placeholder());
        self.selected = 0;
        self.progress = None;
        self.pending = Pending::default();
        self.checking_impersonation = false;
    }

    /// Forward transition: pushes a pill and enters `step`.
    pub fn push_step(&mut self, pill: impl Into<String>, step: Step) {
        self.pills.push(pill.into());
        self.enter_step(step);
    }

    /// Back to the command list, dropping everything the flow collected.
    /// Pills are left to the caller.
    pub fn return_to_commands(&mut self) {
        self.enter_step(Step::Commands);
        self.selected_entity = None;
        self.records.clear();
        self.users.clear();
        self.fetch_results.clear();
        self.fetch_entity = None;
        self.fetch_editor = AppTextArea::editor();
        self.fetch_focus = FetchFocus::Editor;
        self.info = None;
        self.tip = None;
    }

    pub fn reset_to_commands(&mut self) {
        self.pills.clear();
        self.return_to_commands();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_push_step_clears_query_and_pending() {
        let mut palette = PaletteState::new(None);
        palette.query.insert_str("open");
        palette.pending.metadata = Some(Ticket(1));
        palette.selected = 3;

        palette.push_step("Open", Step::OpenRecordEntity);
        assert_eq!(palette.pills, ["Open"]);
        assert_eq!(palette.query_text(), "");
        assert_eq!(palette.query.placeholder_text(), "Search entity...");
        assert_eq!(palette.pending, Pending::default());
        assert_eq!(palette.selected, 0);
    }

    #[test]
    fn test_query_visibility() {
        assert!(Step::Commands.has_query());
        assert!(Step::OpenRecordId.has_query());
        assert!(!Step::FetchXml.has_query());
        assert!(!Step::EnvironmentInfoDisplay.has_query());
    }
}
