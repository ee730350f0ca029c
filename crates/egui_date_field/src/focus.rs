//! Tab order inside the popover.

/// The widgets Tab cycles through while keyboard focus is inside the popover, in order.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub(crate) enum FocusTarget {
    PreviousMonth,
    MonthSelect,
    YearSelect,
    NextMonth,

    /// The one focusable day cell.
    Cursor,
}

impl FocusTarget {
    pub const ORDER: [Self; 5] = [
        Self::PreviousMonth,
        Self::MonthSelect,
        Self::YearSelect,
        Self::NextMonth,
        Self::Cursor,
    ];

    /// The target Tab (or Shift+Tab if `backwards`) moves to from `self`.
    ///
    /// Targets for which `is_enabled` returns `false` are skipped.
    /// Focus never leaves the popover: if nothing else is enabled, it stays put.
    pub fn cycle(self, backwards: bool, is_enabled: impl Fn(Self) -> bool) -> Self {
        let n = Self::ORDER.len();
        let start = Self::ORDER.iter().position(|t| *t == self).unwrap_or(0);
        (1..n)
            .map(|step| {
                let index = if backwards {
                    (start + n - step) % n
                } else {
                    (start + step) % n
                };
                Self::ORDER[index]
            })
            .find(|target| is_enabled(*target))
            .unwrap_or(self)
    }
}
