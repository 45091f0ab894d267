pub type RequestId = u64;

/// What started a navigation.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum NavTrigger {
    /// An intercepted same-origin link activation.
    Click,
    /// Browser back/forward; the platform has already moved the history cursor.
    Popstate,
}

impl NavTrigger {
    pub fn as_str(self) -> &'static str {
        match self {
            NavTrigger::Click => "click",
            NavTrigger::Popstate => "popstate",
        }
    }
}
