// src/task/compose.rs

/// A runnable composition of tasks.
///
/// A unit is either a reference to a registered task by name, or an ordered
/// group of sub-units with a composition mode fixed at construction:
///
/// - `Series` runs members in order and aborts on the first failure.
/// - `Parallel` starts all members concurrently and always lets started
///   members run to completion, even when siblings fail.
///
/// Units nest to unrestricted depth; building one never executes anything.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Unit {
    Task(String),
    Series(Vec<Unit>),
    Parallel(Vec<Unit>),
}

impl Unit {
    /// Reference a registered task by name.
    pub fn task(name: impl Into<String>) -> Self {
        Unit::Task(name.into())
    }
}

/// Build a sequential, fail-fast composition of the given units.
pub fn series<I>(units: I) -> Unit
where
    I: IntoIterator<Item = Unit>,
{
    Unit::Series(units.into_iter().collect())
}

/// Build a concurrent, non-cancelling composition of the given units.
pub fn parallel<I>(units: I) -> Unit
where
    I: IntoIterator<Item = Unit>,
{
    Unit::Parallel(units.into_iter().collect())
}
