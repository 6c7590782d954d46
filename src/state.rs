use serde::Serialize;

/// Lifecycle of one recommendation flow
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Status {
    #[default]
    Idle,
    Loading,
    Success,
    Error,
}

/// Tri-state async snapshot shared by both recommendation flows
///
/// `data` is only populated in `Success` and `error` only in `Error`.
/// Fields are private so the pairing cannot be broken from outside.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AsyncState<T> {
    status: Status,
    data: Option<T>,
    error: Option<String>,
}

impl<T> Default for AsyncState<T> {
    fn default() -> Self {
        Self::idle()
    }
}

impl<T> AsyncState<T> {
    pub fn idle() -> Self {
        Self {
            status: Status::Idle,
            data: None,
            error: None,
        }
    }

    pub fn begin_loading(&mut self) {
        self.status = Status::Loading;
        self.data = None;
        self.error = None;
    }

    pub fn succeed(&mut self, data: T) {
        self.status = Status::Success;
        self.data = Some(data);
        self.error = None;
    }

    pub fn fail(&mut self, message: impl Into<String>) {
        self.status = Status::Error;
        self.data = None;
        self.error = Some(message.into());
    }

    pub fn reset(&mut self) {
        *self = Self::idle();
    }

    pub fn status(&self) -> Status {
        self.status
    }

    pub fn data(&self) -> Option<&T> {
        self.data.as_ref()
    }

    pub fn error(&self) -> Option<&str> {
        self.error.as_deref()
    }

    pub fn is_loading(&self) -> bool {
        self.status == Status::Loading
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_starts_idle() {
        let state: AsyncState<Vec<u32>> = AsyncState::default();
        assert_eq!(state.status(), Status::Idle);
        assert!(state.data().is_none());
        assert!(state.error().is_none());
    }

    #[test]
    fn test_loading_clears_previous_error() {
        let mut state: AsyncState<Vec<u32>> = AsyncState::idle();
        state.fail("boom");
        state.begin_loading();
        assert!(state.is_loading());
        assert!(state.error().is_none());
    }

    #[test]
    fn test_success_then_error_drops_data() {
        let mut state = AsyncState::idle();
        state.begin_loading();
        state.succeed(vec![1, 2]);
        assert_eq!(state.data(), Some(&vec![1, 2]));

        state.begin_loading();
        state.fail("service unavailable");
        assert_eq!(state.status(), Status::Error);
        assert!(state.data().is_none());
        assert_eq!(state.error(), Some("service unavailable"));
    }

    #[test]
    fn test_reset_returns_to_idle() {
        let mut state = AsyncState::idle();
        state.succeed(vec![1]);
        state.reset();
        assert_eq!(state, AsyncState::idle());
    }
}
