/// A master row that owns a collection of detail rows.
pub trait HasDetails {
    type Detail;

    fn details(&self) -> &[Self::Detail];
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SelectionState {
    Unselected,
    Selected(usize),
}

/// Master/detail selection for one view instance.
///
/// Starts on the first master row when there is one. Only `select_row` changes it.
#[derive(Debug, Clone)]
pub struct MasterDetailSelection<M> {
    rows: Vec<M>,
    state: SelectionState,
}

impl<M: HasDetails> MasterDetailSelection<M> {
    pub fn new(rows: Vec<M>) -> Self {
        let state = if rows.is_empty() {
            SelectionState::Unselected
        } else {
            SelectionState::Selected(0)
        };
        MasterDetailSelection { rows, state }
    }

    pub fn rows(&self) -> &[M] {
        &self.rows
    }

    pub fn state(&self) -> SelectionState {
        self.state
    }

    pub fn selected_row(&self) -> Option<&M> {
        match self.state {
            SelectionState::Selected(idx) => self.rows.get(idx),
            SelectionState::Unselected => None,
        }
    }

    pub fn current_detail_rows(&self) -> &[M::Detail] {
        self.selected_row().map(HasDetails::details).unwrap_or(&[])
    }

    /// Selects the master row at `index` and returns its details.
    /// An index past the end leaves the selection untouched and returns `None`.
    pub fn select_row(&mut self, index: usize) -> Option<&[M::Detail]> {
        if index >= self.rows.len() {
            return None;
        }
        self.state = SelectionState::Selected(index);
        Some(self.rows[index].details())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    struct Row(Vec<&'static str>);

    impl HasDetails for Row {
        type Detail = &'static str;
        fn details(&self) -> &[&'static str] {
            &self.0
        }
    }

    #[test]
    fn starts_on_first_row() {
        let selection = MasterDetailSelection::new(vec![Row(vec!["e1", "e2"]), Row(vec![])]);
        assert_eq!(selection.state(), SelectionState::Selected(0));
        assert_eq!(selection.current_detail_rows(), &["e1", "e2"]);
    }

    #[test]
    fn selecting_replaces_details() {
        let mut selection = MasterDetailSelection::new(vec![Row(vec!["e1", "e2"]), Row(vec![])]);
        let details = selection.select_row(1).unwrap();
        assert!(details.is_empty());
        assert_eq!(selection.state(), SelectionState::Selected(1));
        assert!(selection.current_detail_rows().is_empty());
    }

    #[test]
    fn empty_rows_are_unselected() {
        let mut selection: MasterDetailSelection<Row> = MasterDetailSelection::new(vec![]);
        assert_eq!(selection.state(), SelectionState::Unselected);
        assert!(selection.current_detail_rows().is_empty());
        assert!(selection.select_row(0).is_none());
        assert_eq!(selection.state(), SelectionState::Unselected);
    }

    #[test]
    fn out_of_range_keeps_selection() {
        let mut selection = MasterDetailSelection::new(vec![Row(vec!["e1"])]);
        assert!(selection.select_row(5).is_none());
        assert_eq!(selection.state(), SelectionState::Selected(0));
    }
}
