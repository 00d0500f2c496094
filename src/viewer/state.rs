use crate::mesh::ModelInfo;

/// Load status shown in the status line.
#[derive(Debug, Clone, PartialEq)]
pub enum Status {
    /// Waiting for a selection
    Idle,
    /// A load is in flight
    Loading { name: String },
    /// The named model is on screen
    Ready { name: String },
    /// The last load failed; the idle visual with an error message
    Failed { name: String, message: String },
}

impl Status {
    pub fn label(&self) -> String {
        match self {
            Status::Idle => "Waiting for selection".to_string(),
            Status::Loading { name } => format!("Loading {}...", name),
            Status::Ready { name } => format!("Showing {}", name),
            Status::Failed { name, message } => format!("Failed to load {}: {}", name, message),
        }
    }

    pub fn is_loading(&self) -> bool {
        matches!(self, Status::Loading { .. })
    }
}

/// Mutable viewer state owned by the application.
#[derive(Debug)]
pub struct ViewerState {
    pub show_wireframe: bool,
    pub show_grid: bool,
    pub light_background: bool,
    pub show_ui: bool,
    pub status: Status,
    /// Live search filter over the catalog
    pub search: String,
    /// Search input captures keystrokes while active
    pub search_active: bool,
    /// Keyboard highlight, a position within the filtered list
    pub cursor: usize,
    /// The single active catalog entry (index into the full catalog)
    pub selected: Option<usize>,
    pub info: Option<ModelInfo>,
    /// Id handed to the most recent load request; completions for any
    /// earlier id are stale and must be discarded
    current_request: u64,
}

impl Default for ViewerState {
    fn default() -> Self {
        Self {
            show_wireframe: false,
            show_grid: true,
            light_background: false,
            show_ui: true,
            status: Status::Idle,
            search: String::new(),
            search_active: false,
            cursor: 0,
            selected: None,
            info: None,
            current_request: 0,
        }
    }
}

impl ViewerState {
    /// Hand out the id for a new load request, superseding all prior ones
    pub fn begin_load(&mut self, name: &str) -> u64 {
        self.current_request += 1;
        self.status = Status::Loading {
            name: name.to_string(),
        };
        self.info = None;
        self.current_request
    }

    /// True when a completion belongs to a superseded request
    pub fn is_stale(&self, request_id: u64) -> bool {
        request_id != self.current_request
    }

    pub fn finish_load(&mut self, name: &str, info: ModelInfo) {
        self.status = Status::Ready {
            name: name.to_string(),
        };
        self.info = Some(info);
    }

    pub fn fail_load(&mut self, name: &str, message: String) {
        self.status = Status::Failed {
            name: name.to_string(),
            message,
        };
        self.info = None;
    }

    pub fn toggle_wireframe(&mut self) -> bool {
        self.show_wireframe = !self.show_wireframe;
        self.show_wireframe
    }

    pub fn toggle_grid(&mut self) -> bool {
        self.show_grid = !self.show_grid;
        self.show_grid
    }

    pub fn toggle_background(&mut self) -> bool {
        self.light_background = !self.light_background;
        self.light_background
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_toggles_alternate_and_return_new_value() {
        let mut state = ViewerState::default();

        assert!(!state.show_wireframe);
        assert!(state.toggle_wireframe());
        assert!(!state.toggle_wireframe());
        assert!(state.toggle_wireframe());

        assert!(state.show_grid);
        assert!(!state.toggle_grid());
        assert!(state.toggle_grid());

        assert!(!state.light_background);
        assert!(state.toggle_background());
        assert!(!state.toggle_background());
    }

    #[test]
    fn test_new_request_supersedes_previous() {
        let mut state = ViewerState::default();

        let first = state.begin_load("Teapot");
        let second = state.begin_load("Temple");

        assert!(state.is_stale(first));
        assert!(!state.is_stale(second));
    }

    #[test]
    fn test_status_transitions() {
        let mut state = ViewerState::default();
        assert_eq!(state.status, Status::Idle);

        state.begin_load("Teapot");
        assert!(state.status.is_loading());

        state.finish_load("Teapot", ModelInfo::default());
        assert_eq!(
            state.status,
            Status::Ready {
                name: "Teapot".to_string()
            }
        );
        assert!(state.info.is_some());
    }

    #[test]
    fn test_failure_surfaces_asset_name_and_clears_info() {
        let mut state = ViewerState::default();

        state.begin_load("Temple");
        state.fail_load("Temple", "no geometry".to_string());

        assert!(state.status.label().contains("Temple"));
        assert!(state.status.label().contains("no geometry"));
        assert!(state.info.is_none());

        // A later successful load is unaffected by the failure
        state.begin_load("Teapot");
        state.finish_load("Teapot", ModelInfo::default());
        assert_eq!(
            state.status,
            Status::Ready {
                name: "Teapot".to_string()
            }
        );
    }
}
