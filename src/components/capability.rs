/// Scheduling requirement of a save component.
///
/// Decides which registry group a component joins and therefore on which
/// scheduling context its `save` runs.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Capability {
    /// Must run on the single logical UI context, serialized with other UI work.
    UiBound,
    /// May run on any worker of the background pool.
    Background,
}

impl Capability {
    /// Returns a short stable label (snake_case) for use in logs/metrics.
    pub fn as_label(&self) -> &'static str {
        match self {
            Capability::UiBound => "ui_bound",
            Capability::Background => "background",
        }
    }
}
