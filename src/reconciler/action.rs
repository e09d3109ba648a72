//! Pure decision table for the pre-release pull request.
use std::fmt;

/// How the freshly computed diff relates to the pending pull request.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DiffState {
    /// Published package and repository folder match.
    Empty,
    /// Rendered title and body are byte-equal to the pending PR.
    Unchanged,
    /// There is a diff and it is not what the pending PR shows, or there is
    /// no pending PR.
    Changed,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Action {
    /// No pending PR and nothing to release.
    Nothing,
    /// Comment on and close the pending PR.
    Close,
    /// Branch from HEAD, commit the bumped manifest, open a PR.
    Create,
    /// Pending PR already shows the current diff.
    UpToDate,
    /// Rebuild the release commit from HEAD and force-move the pending PR's
    /// branch onto it.
    Rebase,
}

impl fmt::Display for Action {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            Action::Nothing => "nothing to release",
            Action::Close => "close pending PR",
            Action::Create => "create PR",
            Action::UpToDate => "PR already up to date",
            Action::Rebase => "rebase pending PR",
        };
        write!(f, "{label}")
    }
}

/// Decide what to do given whether a pre-release PR is open and how the
/// current diff compares with it.
pub fn decide(has_pending_pr: bool, diff: DiffState) -> Action {
    match (has_pending_pr, diff) {
        (false, DiffState::Empty) => Action::Nothing,
        (true, DiffState::Empty) => Action::Close,
        (false, _) => Action::Create,
        (true, DiffState::Unchanged) => Action::UpToDate,
        (true, DiffState::Changed) => Action::Rebase,
    }
}
